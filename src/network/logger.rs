use std::{fmt::Display, sync::Arc};

use log::{Level, LevelFilter};
use serde::Deserialize;
use strum_macros::EnumIter;

use super::config::LogConfig;

#[derive(EnumIter, Debug, PartialEq, Eq, Hash, Clone, Copy, Deserialize)]
pub enum Source {
    HAL,
    NET,
    ARP,
}

impl Source {
    pub fn default_level(&self) -> LevelFilter {
        match self {
            Source::HAL => LevelFilter::Info,
            Source::NET => LevelFilter::Debug,
            Source::ARP => LevelFilter::Debug,
        }
    }

    /// `log` target, so `RUST_LOG=arp_resolver::arp=debug` selects one component.
    pub fn target(&self) -> &'static str {
        match self {
            Source::HAL => "arp_resolver::hal",
            Source::NET => "arp_resolver::net",
            Source::ARP => "arp_resolver::arp",
        }
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Source::HAL => "HAL",
            Source::NET => "NET",
            Source::ARP => "ARP",
        };
        write!(f, "{}", str)
    }
}

/// Component-tagged front end over the `log` facade.
#[derive(Debug, Clone)]
pub struct Logger {
    levels: Arc<LogConfig>,
    filters: Arc<Vec<Source>>,
}

impl Logger {
    /// Does not install a backend, for unit tests.
    pub fn start_test() -> Logger {
        Logger::new(LogConfig::default(), vec![])
    }

    /// Only messages from the given components get through. An empty list lets everything through.
    pub fn start_with_filters(config: LogConfig, filters: Vec<Source>) -> Logger {
        Self::init_backend(&config);
        Logger::new(config, filters)
    }

    fn new(levels: LogConfig, filters: Vec<Source>) -> Logger {
        Logger {
            levels: Arc::new(levels),
            filters: Arc::new(filters),
        }
    }

    fn init_backend(config: &LogConfig) {
        use strum::IntoEnumIterator;

        // RUST_LOG still wins when set
        let loudest = Source::iter()
            .map(|src| config.level(src))
            .max()
            .unwrap_or(LevelFilter::Info);
        let env = env_logger::Env::default().default_filter_or(loudest.to_string());
        // a second initialisation is harmless, keep the first backend
        let _ = env_logger::Builder::from_env(env).try_init();
    }

    pub fn enabled(&self, src: Source, level: Level) -> bool {
        if !self.filters.is_empty() && !self.filters.contains(&src) {
            return false;
        }
        level <= self.levels.level(src)
    }

    pub fn log(&self, src: Source, level: Level, msg: String) {
        if self.enabled(src, level) {
            log::log!(target: src.target(), level, "[{}] {}", src, msg);
        }
    }

    pub fn error(&self, src: Source, msg: String) {
        self.log(src, Level::Error, msg)
    }

    pub fn warn(&self, src: Source, msg: String) {
        self.log(src, Level::Warn, msg)
    }

    pub fn info(&self, src: Source, msg: String) {
        self.log(src, Level::Info, msg)
    }

    pub fn debug(&self, src: Source, msg: String) {
        self.log(src, Level::Debug, msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_levels() {
        let logger = Logger::start_test();
        assert!(logger.enabled(Source::HAL, Level::Info));
        assert!(!logger.enabled(Source::HAL, Level::Debug));
        assert!(logger.enabled(Source::ARP, Level::Debug));
        assert!(!logger.enabled(Source::ARP, Level::Trace));

        let mut config = LogConfig::default();
        config.set_level(Source::NET, LevelFilter::Off);
        let logger = Logger::new(config, vec![]);
        assert!(!logger.enabled(Source::NET, Level::Error));
    }

    #[test]
    fn test_source_filters() {
        let logger = Logger::start_with_filters(LogConfig::default(), vec![Source::ARP]);
        assert!(logger.enabled(Source::ARP, Level::Info));
        assert!(!logger.enabled(Source::NET, Level::Error));
        assert!(!logger.enabled(Source::HAL, Level::Error));
        assert_eq!(Source::ARP.to_string(), "ARP");

        let everything = Logger::start_with_filters(LogConfig::default(), vec![]);
        assert!(everything.enabled(Source::HAL, Level::Error));
        assert!(everything.enabled(Source::NET, Level::Debug));
    }
}
