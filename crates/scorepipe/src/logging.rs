use clap::ValueEnum;
use scorepipe_transport::GUI_STDERR_TARGET;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Controller events at `level`; lines relayed from the GUI's stderr at
/// `gui_level`, independent of the controller's own verbosity.
pub fn log_targets(level: LogLevel, gui_level: LogLevel) -> Targets {
    Targets::new()
        .with_default(level.as_filter())
        .with_target(GUI_STDERR_TARGET, gui_level.as_filter())
}

/// Log to stderr. Targets are printed so relayed GUI lines stay
/// distinguishable from controller events.
pub fn init_logging(format: LogFormat, level: LogLevel, gui_level: LogLevel) {
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(true);
    let registry = tracing_subscriber::registry().with(log_targets(level, gui_level));

    let _ = match format {
        LogFormat::Text => registry.with(layer).try_init(),
        LogFormat::Json => registry.with(layer.json()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use tracing::Level;

    use super::*;

    #[test]
    fn gui_lines_follow_their_own_level() {
        let targets = log_targets(LogLevel::Error, LogLevel::Warn);
        assert!(targets.would_enable(GUI_STDERR_TARGET, &Level::WARN));
        assert!(!targets.would_enable("scorepipe::commands", &Level::WARN));
        assert!(targets.would_enable("scorepipe::commands", &Level::ERROR));
    }

    #[test]
    fn gui_lines_can_be_silenced() {
        let targets = log_targets(LogLevel::Debug, LogLevel::Off);
        assert!(!targets.would_enable(GUI_STDERR_TARGET, &Level::ERROR));
        assert!(targets.would_enable("scorepipe_peer::dispatcher", &Level::DEBUG));
    }
}
