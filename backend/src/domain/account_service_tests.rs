//! Tests for the account service.

use std::sync::Arc;

use chrono::Utc;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::MockUserRepository;
use crate::domain::{EmailAddress, ErrorCode, Password, UserCredentials, Username};

#[fixture]
fn stored_user() -> User {
    User {
        id: UserId::new(5).expect("valid id"),
        username: Username::new("dr_smith").expect("valid username"),
        email: EmailAddress::new("smith@hospital.com").expect("valid email"),
        created_at: Utc::now(),
    }
}

fn credentials_for(user: &User, password: &str) -> UserCredentials {
    UserCredentials {
        user: user.clone(),
        password_hash: Password::new(password)
            .expect("valid password")
            .hash()
            .expect("hashing succeeds"),
    }
}

fn service(repo: MockUserRepository) -> AccountService<MockUserRepository> {
    AccountService::new(Arc::new(repo))
}

#[rstest]
#[tokio::test]
async fn authenticate_returns_user_for_matching_password(stored_user: User) {
    let creds = credentials_for(&stored_user, "secret1");
    let mut repo = MockUserRepository::new();
    repo.expect_find_credentials_by_username()
        .withf(|username| username == "dr_smith")
        .times(1)
        .return_once(move |_| Ok(Some(creds)));

    let login = LoginCredentials::try_from_parts("dr_smith", "secret1").expect("credentials");
    let user = service(repo).authenticate(&login).await.expect("login succeeds");
    assert_eq!(user, stored_user);
}

#[rstest]
#[case::wrong_password(true)]
#[case::unknown_user(false)]
#[tokio::test]
async fn authenticate_rejects_bad_credentials(stored_user: User, #[case] user_exists: bool) {
    let creds = credentials_for(&stored_user, "secret1");
    let mut repo = MockUserRepository::new();
    repo.expect_find_credentials_by_username()
        .times(1)
        .return_once(move |_| Ok(user_exists.then_some(creds)));

    let login = LoginCredentials::try_from_parts("dr_smith", "secret2").expect("credentials");
    let err = service(repo).authenticate(&login).await.expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), "Invalid username or password");
}

#[rstest]
#[tokio::test]
async fn register_stores_a_verifiable_hash(stored_user: User) {
    let returned = stored_user.clone();
    let mut repo = MockUserRepository::new();
    repo.expect_create()
        .withf(|new_user| {
            new_user.username.as_ref() == "dr_smith"
                && new_user.password_hash.verify("secret1").unwrap_or(false)
        })
        .times(1)
        .return_once(move |_| Ok(returned));

    let registration =
        Registration::try_from_parts("dr_smith", "smith@hospital.com", "secret1", "secret1")
            .expect("valid registration");
    let user = service(repo).register(registration).await.expect("registered");
    assert_eq!(user.id, stored_user.id);
}

#[rstest]
#[case(UserPersistenceError::duplicate_username("dr_smith"), "Username already exists", "username")]
#[case(UserPersistenceError::duplicate_email("smith@hospital.com"), "Email already registered", "email")]
#[tokio::test]
async fn register_maps_duplicates_to_conflicts(
    #[case] failure: UserPersistenceError,
    #[case] message: &str,
    #[case] field: &str,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_create().times(1).return_once(move |_| Err(failure));

    let registration =
        Registration::try_from_parts("dr_smith", "smith@hospital.com", "secret1", "secret1")
            .expect("valid registration");
    let err = service(repo).register(registration).await.expect_err("conflict");
    assert_eq!(err.code(), ErrorCode::Conflict);
    assert_eq!(err.message(), message);
    let details = err.details().expect("details present");
    assert_eq!(details["field"], field);
}

#[rstest]
#[tokio::test]
async fn connection_failures_are_service_unavailable() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .times(1)
        .return_once(|_| Err(UserPersistenceError::connection("pool exhausted")));

    let err = service(repo)
        .fetch_profile(UserId::new(1).expect("valid id"))
        .await
        .expect_err("unavailable");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);
}

#[rstest]
#[tokio::test]
async fn missing_profile_requires_login() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().times(1).return_once(|_| Ok(None));

    let err = service(repo)
        .fetch_profile(UserId::new(9).expect("valid id"))
        .await
        .expect_err("stale session");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}
