use colored::Colorize;
use log::{Level, LevelFilter, Log, Metadata, Record};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    Normal,
    Verbose,
}

impl LogLevel {
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => LogLevel::Quiet,
            (false, true) => LogLevel::Verbose,
            (false, false) => LogLevel::Normal,
        }
    }

    pub fn filter(self) -> LevelFilter {
        match self {
            LogLevel::Quiet => LevelFilter::Warn,
            LogLevel::Normal => LevelFilter::Info,
            LogLevel::Verbose => LevelFilter::Debug,
        }
    }
}

/// Prints library records with the `[sfat]` prefix, colored by level.
struct CtlLogger;

impl Log for CtlLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format!("[sfat] {}", record.args());
        match record.level() {
            Level::Error => eprintln!("{}", line.red().bold()),
            Level::Warn => eprintln!("{}", line.yellow()),
            Level::Info => println!("{}", line.cyan()),
            Level::Debug => println!("{}", line.bright_black()),
            Level::Trace => println!("{}", line.dimmed()),
        }
    }

    fn flush(&self) {}
}

static LOGGER: CtlLogger = CtlLogger;

pub fn init(level: LogLevel) -> anyhow::Result<()> {
    log::set_logger(&LOGGER).map_err(|e| anyhow::anyhow!("logger already installed: {e}"))?;
    log::set_max_level(level.filter());
    Ok(())
}

#[macro_export]
macro_rules! log_normal {
    ($($arg:tt)*) => {
        println!("[sfat] {}", format_args!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_to_level() {
        assert_eq!(LogLevel::from_flags(true, true), LogLevel::Quiet);
        assert_eq!(LogLevel::from_flags(false, true).filter(), LevelFilter::Debug);
        assert_eq!(LogLevel::from_flags(false, false).filter(), LevelFilter::Info);
    }
}
