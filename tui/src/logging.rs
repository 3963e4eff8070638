use eyre::{
    Context as _,
    Result,
};
use room_client_config::get_data_dir;
use tracing_subscriber::prelude::*;
use tui_logger::TuiLoggerFile;

lazy_static::lazy_static! {
    static ref LOG_FILE: String = "room-client.log".to_string();
}

/// Route `tracing` into the logs tab and into a fresh log file in the data
/// directory. `debug` lowers the default level from info to trace.
pub fn log_init(debug: bool) -> Result<()> {
    let directory = get_data_dir();
    std::fs::create_dir_all(&directory).context("Failed to create directory")?;
    let log_path = directory.join(LOG_FILE.as_str());
    if log_path.exists() {
        std::fs::remove_file(&log_path).context("Failed to remove existing log file")?;
    }

    let level = if debug {
        tui_logger::LevelFilter::Trace
    } else {
        tui_logger::LevelFilter::Info
    };
    tui_logger::init_logger(level).context("Failed to initialize tui logger")?;
    tui_logger::set_default_level(level);
    // The SDK's own logging is very chatty.
    tui_logger::set_level_for_target("libwebrtc", tui_logger::LevelFilter::Warn);
    tui_logger::set_log_file(TuiLoggerFile::new(&log_path.to_string_lossy()));

    tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(tui_logger::TuiTracingSubscriberLayer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    info!(path = %log_path.display(), "Logging initialized");
    Ok(())
}
