use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::Config;

use crate::log::LogConfiguration;

// ISO 8601 timestamp, color coded level, module path.
const LOG_PATTERN: &str = "{d(%Y-%m-%dT%H:%M:%SZ)} {h({l})} {t} - {m}{n}";
const APPENDER: &str = "stderr";

impl LogConfiguration {
    fn build_config(&self) -> Result<Config, log4rs::config::runtime::ConfigErrors> {
        let console = ConsoleAppender::builder()
            .target(Target::Stderr)
            .encoder(Box::new(PatternEncoder::new(LOG_PATTERN)))
            .build();

        let loggers = self
            .module_filters
            .iter()
            .map(|(module, level)| Logger::builder().build(module.clone(), *level));

        Config::builder()
            .appender(Appender::builder().build(APPENDER, Box::new(console)))
            .loggers(loggers)
            .build(Root::builder().appender(APPENDER).build(self.global_log_level))
    }

    /// Installs this configuration on the `log4rs` logger, initializing it on first use.
    pub(in crate::log) fn apply(&mut self) {
        let config = match self.build_config() {
            Ok(config) => config,
            Err(errors) => {
                eprintln!("invalid logging configuration: {errors}");
                return;
            }
        };

        if let Some(handle) = &self.handle {
            handle.set_config(config);
            return;
        }
        match log4rs::init_config(config) {
            Ok(handle) => self.handle = Some(handle),
            Err(error) => eprintln!("could not install logger: {error}"),
        }
    }
}
