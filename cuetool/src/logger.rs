use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

struct Logger;

static LOGGER: Logger = Logger;

/// Install the process-wide logger. Repeated `-v` flags raise the level
/// from info through debug to trace.
pub fn init(verbose: u8) -> Result<(), SetLoggerError> {
    let filter = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    log::set_logger(&LOGGER)?;
    log::set_max_level(filter);
    Ok(())
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    // Everything goes to stderr, stdout carries the converted subtitles.
    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        if log::max_level() >= LevelFilter::Debug {
            eprintln!(
                "{} {} {}",
                label(record.level()),
                record.target().dimmed(),
                record.args()
            );
        } else if record.level() == Level::Info {
            eprintln!("{}", record.args());
        } else {
            eprintln!("{} {}", label(record.level()), record.args());
        }
    }

    fn flush(&self) {}
}

fn label(level: Level) -> ColoredString {
    match level {
        Level::Debug => "[DEBUG]".bold().blue(),
        Level::Error => "[ERROR]".bold().red(),
        Level::Info => "[INFO]".bold().green(),
        Level::Trace => "[TRACE]".bold().purple(),
        Level::Warn => "[WARN]".bold().yellow(),
    }
}
