use clap::Parser;
use quietrun::app;
use quietrun::commands::cli;
use quietrun_core::error;
use quietrun_core::runner::SENTINEL_EXIT_CODE;
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

static LOG_GUARD: Mutex<Option<tracing_appender::non_blocking::WorkerGuard>> = Mutex::new(None);

#[tokio::main]
async fn main() {
    let exit = match real_main().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("quietrun: {e}");
            exit_code_for_error(&e)
        }
    };

    // process::exit skips destructors; flush the file log first.
    if let Ok(mut guard) = LOG_GUARD.lock() {
        guard.take();
    }
    std::process::exit(exit);
}

async fn real_main() -> Result<i32, error::CliError> {
    // Usage errors end the program here, before anything is spawned.
    let args = cli::Args::parse();
    let cfg =
        quietrun_core::config::load_default().map_err(|e| error::CliError::Config(e.to_string()))?;
    init_tracing(&cfg.logging).map_err(error::CliError::Config)?;

    let exit = app::run_app(args, &cfg).await?;
    Ok(exit)
}

fn exit_code_for_error(e: &error::CliError) -> i32 {
    // 2: config / usage error (clap uses the same code)
    // 255: the command could not be run, so it has no exit code of its own
    match e {
        error::CliError::Config(_) => 2,
        error::CliError::Runner(re) => match re {
            error::RunnerError::Config(_) => 2,
            error::RunnerError::Spawn(_) => SENTINEL_EXIT_CODE,
            error::RunnerError::StreamIo { .. } => SENTINEL_EXIT_CODE,
        },
    }
}

fn init_tracing(logging: &quietrun_core::config::LoggingConfig) -> Result<(), String> {
    if !logging.enabled {
        return Ok(());
    }

    let filter = match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => EnvFilter::from_default_env(),
        _ => EnvFilter::try_new(logging.level.clone()).map_err(|e| e.to_string())?,
    };

    let mut maybe_writer = None;

    if logging.file {
        let dir = match logging
            .directory
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            Some(d) => std::path::PathBuf::from(d),
            None => std::env::temp_dir().join("quietrun"),
        };

        std::fs::create_dir_all(&dir).map_err(|e| format!("create log dir failed: {e}"))?;
        let file_name = format!("quietrun.{}.log", std::process::id());
        let appender = tracing_appender::rolling::never(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);
        if let Ok(mut slot) = LOG_GUARD.lock() {
            *slot = Some(guard);
        }
        maybe_writer = Some(non_blocking);
    }

    if !logging.console && maybe_writer.is_none() {
        return Err("logging disabled for both console and file".to_string());
    }

    let console_layer = logging.console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(atty::is(atty::Stream::Stderr))
    });

    let file_layer = maybe_writer.map(|w| {
        tracing_subscriber::fmt::layer()
            .with_writer(w)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(())
}
