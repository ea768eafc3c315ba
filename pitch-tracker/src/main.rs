// Pitch tracker entry point.
//
// Startup sequence:
// 1. Initialize tracing (log to file, the terminal is the shell)
// 2. Load config
// 3. Open storage and recover teams and pitchers
// 4. Spawn the persistence writer (or run memory-only)
// 5. Run the command shell on stdin/stdout
// 6. Flush pending writes and shut down

use pitch_tracker::app::{self, Tracker};
use pitch_tracker::command;
use pitch_tracker::config;
use pitch_tracker::persistence::{self, PersistHandle, PersistenceGateway, SqliteGateway};

use anyhow::Context;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Pitch tracker starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: {} teams x {} pitchers, daily budget {}",
        config.roster.max_teams,
        config.roster.max_pitchers_per_team,
        config.roster.daily_pitch_budget
    );

    // 3. Open storage and recover
    let mut gateway = SqliteGateway::new(config.db_path.clone());
    let available = gateway.init();
    let roster = app::recover_from_store(&config, &gateway);

    // 4. Persistence writer
    let (persist, writer) = if available {
        let (handle, task) = persistence::spawn_writer(Box::new(gateway));
        (handle, Some(task))
    } else {
        (PersistHandle::detached(), None)
    };
    if persist.is_detached() {
        warn!("Storage unavailable at {}; running in memory-only mode", config.db_path);
    }

    let mut tracker = Tracker::new(config, roster, persist.clone());

    // 5. Shell blocks on stdin, so keep it off the runtime threads.
    let shell = tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        command::run_shell(&mut tracker, stdin.lock(), stdout.lock())
    });
    match shell.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!("Shell error: {:#}", e),
        Err(e) => error!("Shell task panicked: {}", e),
    }

    // 6. Cleanup: drain the writer (with timeout)
    persist.flush().await;
    drop(persist);
    if let Some(task) = writer {
        match tokio::time::timeout(std::time::Duration::from_secs(5), task).await {
            Ok(Ok(report)) if report.degraded => {
                warn!("Some changes were not saved ({} writes skipped)", report.skipped)
            }
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Persistence writer failed: {}", e),
            Err(_) => warn!("Timed out waiting for persistence writer"),
        }
    }

    info!("Pitch tracker shut down cleanly");
    Ok(())
}

/// Initialize tracing to log to a file (stdout belongs to the shell).
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = std::env::current_dir()?.join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let log_file = std::fs::File::create(log_dir.join("pitch-tracker.log"))?;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("pitch_tracker=info,warn")),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
