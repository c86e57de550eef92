use color_eyre::eyre::{Result, eyre};
use dicetray::app::{self, AppConfig};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: dicetray [--seed <n>] [--log-file <path>]\n\
         \n\
         Flags:\n\
           --seed <n>         Seed the dice RNG for a reproducible session\n\
           --log-file <path>  Append tracing output to the given file"
    );
    std::process::exit(0);
}

fn parse_cli_args() -> Result<AppConfig> {
    let mut args = std::env::args().skip(1);
    let mut seed: Option<u64> = None;
    let mut log_file: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => {
                let raw = args
                    .next()
                    .ok_or_else(|| eyre!("--seed requires a number argument"))?;
                if seed.is_some() {
                    return Err(eyre!("--seed may only be specified once"));
                }
                seed = Some(
                    raw.parse()
                        .map_err(|_| eyre!("--seed expects an unsigned integer, got {raw:?}"))?,
                );
            }
            "--log-file" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--log-file requires a path argument"))?;
                if log_file.is_some() {
                    return Err(eyre!("--log-file may only be specified once"));
                }
                log_file = Some(PathBuf::from(path));
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }

    Ok(AppConfig { seed, log_file })
}

/// File-only logging: the terminal itself belongs to the UI. The returned
/// guard must outlive the app so buffered lines get flushed.
fn init_tracing(config: &AppConfig) -> Result<Option<WorkerGuard>> {
    let Some(path) = &config.log_file else {
        return Ok(None);
    };
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| eyre!("--log-file needs a file name, got {}", path.display()))?;
    let appender = rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let config = parse_cli_args()?;
    let _log_guard = init_tracing(&config)?;
    tracing::info!(seed = ?config.seed, "starting dicetray");
    app::run_app(config).await
}
