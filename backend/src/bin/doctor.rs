//! Print a diagnostics report: configuration, database health, uploads, and
//! the most recent cases.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use mockable::{DefaultEnv, Env};
use tokio::runtime::Builder;
use url::Url;

use diagnoseai::domain::status_label;
use diagnoseai::outbound::persistence::{DatabaseDiagnostics, DbPool, PoolConfig, RecentCase};
use diagnoseai::outbound::storage::FsImageStore;

const REPORTED_VARS: &[&str] = &[
    "APP_ENV",
    "FLASK_ENV",
    "BIND_ADDR",
    "PORT",
    "WORKERS",
    "DATABASE_URL",
    "UPLOAD_FOLDER",
    "MAX_CONTENT_LENGTH",
    "HOSPITAL_NAME",
    "SECRET_KEY",
    "OPENAI_API_KEY",
    "OPENAI_MODEL",
    "OPENAI_BASE_URL",
];
const SECRET_VARS: &[&str] = &["SECRET_KEY", "OPENAI_API_KEY"];
const RECENT_CASES: i64 = 5;

/// `diagnoseai-doctor` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "diagnoseai-doctor",
    about = "Report configuration, database, and upload storage health",
    version
)]
struct CliArgs {
    /// PostgreSQL connection URL; database checks are skipped when absent.
    #[arg(long = "database-url", env = "DATABASE_URL", value_name = "url")]
    database_url: Option<String>,
    /// Upload directory to inspect.
    #[arg(
        long = "upload-folder",
        env = "UPLOAD_FOLDER",
        default_value = "static/uploads",
        value_name = "path"
    )]
    upload_folder: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    println!("== Environment ==");
    for line in environment_lines(&DefaultEnv::new()) {
        println!("{line}");
    }

    println!("\n== Database ==");
    match &args.database_url {
        Some(url) => report_database(url).await,
        None => println!("DATABASE_URL not set; the server would use in-memory storage"),
    }

    println!("\n== Uploads ==");
    if args.upload_folder.is_dir() {
        let usage = FsImageStore::open(&args.upload_folder)
            .and_then(|store| store.usage())
            .wrap_err_with(|| format!("inspect {}", args.upload_folder.display()))?;
        println!(
            "{}: {} user directories, {} files",
            args.upload_folder.display(),
            usage.directories,
            usage.files
        );
    } else {
        println!("{}: missing", args.upload_folder.display());
    }
    Ok(())
}

async fn report_database(url: &str) {
    let pool = match DbPool::new(PoolConfig::new(url).with_max_size(1)).await {
        Ok(pool) => pool,
        Err(error) => {
            println!("connection: FAILED ({error})");
            return;
        }
    };
    let diagnostics = DatabaseDiagnostics::new(pool);
    if let Err(error) = diagnostics.ping().await {
        println!("connection: FAILED ({error})");
        return;
    }
    println!("connection: ok");

    match diagnostics.table_counts().await {
        Ok(counts) => println!(
            "users: {}, cases: {}, reports: {}",
            counts.users, counts.cases, counts.reports
        ),
        Err(error) => println!("table counts: FAILED ({error})"),
    }

    match diagnostics.recent_cases(RECENT_CASES).await {
        Ok(cases) if cases.is_empty() => println!("no cases yet"),
        Ok(cases) => {
            println!("recent cases:");
            for case in &cases {
                println!("  {}", describe_case(case));
            }
        }
        Err(error) => println!("recent cases: FAILED ({error})"),
    }
}

fn environment_lines<E: Env>(env: &E) -> Vec<String> {
    REPORTED_VARS
        .iter()
        .map(|name| match env.string(name) {
            Some(value) => format!("{name}={}", mask_value(name, &value)),
            None => format!("{name} (unset)"),
        })
        .collect()
}

/// Hide secrets and database passwords.
fn mask_value(name: &str, value: &str) -> String {
    if SECRET_VARS.contains(&name) {
        return if value.is_empty() {
            String::new()
        } else {
            format!("****** ({} chars)", value.chars().count())
        };
    }
    if name == "DATABASE_URL" {
        if let Ok(mut url) = Url::parse(value) {
            if url.password().is_some() && url.set_password(Some("******")).is_ok() {
                return url.to_string();
            }
        }
    }
    value.to_owned()
}

fn describe_case(case: &RecentCase) -> String {
    let report = match case.report_finalized {
        None => "no report",
        Some(true) => "report finalized",
        Some(false) => "draft report",
    };
    format!(
        "#{} {} by {} at {} ({report})",
        case.id,
        status_label(&case.status),
        case.username,
        case.created_at.format("%Y-%m-%d %H:%M")
    )
}
