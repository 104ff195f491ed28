//! Unit tests for session configuration parsing.

use super::*;
use mockable::MockEnv;
use rstest::rstest;
use std::collections::HashMap;

fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
        .collect();
    let mut env = MockEnv::new();
    env.expect_string()
        .times(0..)
        .returning(move |key| vars.get(key).cloned());
    env
}

fn long_secret() -> String {
    "s".repeat(SECRET_KEY_MIN_LEN)
}

fn expect_error(
    result: Result<SessionSettings, SessionConfigError>,
    label: &str,
) -> SessionConfigError {
    match result {
        Ok(_) => panic!("{label}"),
        Err(error) => error,
    }
}

#[rstest]
fn release_requires_a_secret() {
    let env = mock_env(&[]);
    let err = expect_error(
        session_settings_from_env(&env, BuildMode::Release),
        "expected missing secret to fail",
    );
    assert_eq!(
        err,
        SessionConfigError::MissingEnv {
            name: SECRET_KEY_ENV
        }
    );
}

#[rstest]
fn release_rejects_short_secrets() {
    let env = mock_env(&[(SECRET_KEY_ENV, "short")]);
    let err = expect_error(
        session_settings_from_env(&env, BuildMode::Release),
        "expected short secret to fail",
    );
    assert_eq!(
        err,
        SessionConfigError::SecretTooShort {
            length: 5,
            min_len: SECRET_KEY_MIN_LEN
        }
    );
}

#[rstest]
#[case("maybe")]
#[case("")]
fn release_invalid_cookie_secure_is_rejected(#[case] value: &str) {
    let secret = long_secret();
    let env = mock_env(&[(SECRET_KEY_ENV, &secret), (COOKIE_SECURE_ENV, value)]);

    let err = expect_error(
        session_settings_from_env(&env, BuildMode::Release),
        "expected invalid cookie secure to fail",
    );
    assert!(matches!(
        err,
        SessionConfigError::InvalidEnv {
            name: COOKIE_SECURE_ENV,
            ..
        }
    ));
}

#[rstest]
fn release_insecure_none_same_site_is_rejected() {
    let secret = long_secret();
    let env = mock_env(&[
        (SECRET_KEY_ENV, &secret),
        (COOKIE_SECURE_ENV, "0"),
        (SAMESITE_ENV, "None"),
    ]);

    let err = expect_error(
        session_settings_from_env(&env, BuildMode::Release),
        "expected insecure SameSite=None to fail",
    );
    assert_eq!(err, SessionConfigError::InsecureSameSiteNone);
}

#[rstest]
fn release_defaults_to_secure_lax_cookies() {
    let secret = long_secret();
    let env = mock_env(&[(SECRET_KEY_ENV, &secret)]);

    let settings =
        session_settings_from_env(&env, BuildMode::Release).expect("expected valid settings");
    assert!(settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_defaults_use_insecure_cookies_and_a_temporary_key() {
    let env = mock_env(&[]);
    let settings =
        session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults should succeed");
    assert!(!settings.cookie_secure);
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn debug_tolerates_short_secrets_and_bad_same_site() {
    let env = mock_env(&[(SECRET_KEY_ENV, "dev"), (SAMESITE_ENV, "unexpected")]);
    let settings = session_settings_from_env(&env, BuildMode::Debug)
        .expect("debug should fall back to defaults");
    assert_eq!(settings.same_site, SameSite::Lax);
}

#[rstest]
fn same_secret_derives_the_same_key() {
    let secret = long_secret();
    let env = mock_env(&[(SECRET_KEY_ENV, &secret)]);
    let first = session_settings_from_env(&env, BuildMode::Release).expect("first");
    let second = session_settings_from_env(&env, BuildMode::Release).expect("second");
    assert_eq!(first.key.signing(), second.key.signing());
}

#[rstest]
#[case(&[("APP_ENV", "production")], BuildMode::Release)]
#[case(&[("FLASK_ENV", "Production")], BuildMode::Release)]
#[case(&[("APP_ENV", "development")], BuildMode::from_debug_assertions())]
#[case(&[], BuildMode::from_debug_assertions())]
fn production_environment_forces_release(
    #[case] vars: &[(&str, &str)],
    #[case] expected: BuildMode,
) {
    assert_eq!(BuildMode::from_env(&mock_env(vars)), expected);
}
