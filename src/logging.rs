use chrono::Local;
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;
use yansi::Paint;

/// Initializes the global logger.
///
/// `RUST_LOG` takes precedence over `level`. Calling this twice is harmless; the second call
/// is ignored.
pub fn init(level: LevelFilter) {
    let env = Env::default()
        .filter_or("RUST_LOG", level.as_str().to_lowercase())
        .write_style_or("RUST_LOG_STYLE", "auto");

    let _ = Builder::from_env(env)
        .format(|buf, record| writeln!(buf, "{}", format_log(record)))
        .try_init();
}

/// Maps the number of `-v` flags to a level; `quiet` wins over verbosity
pub fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Formats a record as `[timestamp] LEVEL [target] message`
pub fn format_log(record: &log::Record) -> String {
    let level = match record.level() {
        log::Level::Error => Paint::red("ERROR").bold(),
        log::Level::Warn => Paint::yellow("WARN ").bold(),
        log::Level::Info => Paint::cyan("INFO ").bold(),
        log::Level::Debug => Paint::blue("DEBUG").bold(),
        log::Level::Trace => Paint::new("TRACE"),
    };

    let target = if record.target().is_empty() {
        record.module_path().unwrap_or("gitorbit")
    } else {
        record.target()
    };

    format!(
        "[{}] {} [{}] {}",
        Local::now().format("%H:%M:%S%.3f"),
        level,
        target,
        record.args()
    )
}

/// Parses a log level name, defaulting to `Info` for unknown input
pub fn parse_log_level(level: &str) -> LevelFilter {
    level.trim().parse().unwrap_or(LevelFilter::Info)
}
