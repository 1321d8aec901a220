//! `user-admin` entry point: loads settings, wires the HTTP adapter, and runs
//! the requested command.

use std::ffi::OsString;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{self, WrapErr, eyre};
use ortho_config::OrthoConfig;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

use user_admin::inbound::cli::{self, Cli, CliContext, CliError};
use user_admin::outbound::http::HttpUserDirectory;
use user_admin::settings::AdminSettings;

#[tokio::main]
async fn main() -> eyre::Result<ExitCode> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let context = build_context()?;

    let mut stdout = io::stdout().lock();
    match cli::run(cli, &context, &mut stdout).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(CliError::Output(source)) => Err(source).wrap_err("failed to write output"),
        Err(failure) => {
            error!(error = %failure, "command failed");
            let _ = writeln!(io::stderr().lock(), "{failure}");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn build_context() -> eyre::Result<CliContext> {
    let settings = AdminSettings::load_from_iter([OsString::from("user-admin")])
        .map_err(|error| eyre!("failed to load settings: {error}"))?;
    let base_url = settings.base_url()?;
    let timeout = settings.request_timeout()?;
    let directory = HttpUserDirectory::new(base_url, timeout)
        .wrap_err("failed to build the HTTP client")?;

    Ok(CliContext {
        directory: Arc::new(directory),
        page_limit: settings.page_limit()?,
        refetch_after_save: settings.refetch_after_save,
    })
}
