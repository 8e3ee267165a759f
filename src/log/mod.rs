//! Diagnostic logging.
//!
//! Every module logs through the `log` facade macros, re-exported here: `info!` marks the start
//! and end of a run, `debug!` records individual draws (contacts, recoveries, exhausted rewires)
//! and `trace!` marks phase entry. This is separate from the per-step CSV output of
//! [`report`](crate::report), which records model data rather than program behavior.
//!
//! Logging is off by default. The `epigraph` binary turns it on with `--log-level <level>`;
//! library users call the functions below, which can be used at any time during a run:
//!
//! ```rust
//! use epigraph::log::{set_log_level, set_module_filter, LevelFilter};
//!
//! // Run start and end only...
//! set_log_level(LevelFilter::Info);
//! // ...except for the contact network, which logs every exhausted rewire.
//! set_module_filter("epigraph::network", LevelFilter::Debug);
//! ```
//!
//! Messages go to a `log4rs` console appender when the `logging` feature is enabled. Without the
//! feature the functions still track the configuration but nothing is printed.
#[cfg(feature = "logging")]
mod standard_logger;

#[cfg(not(feature = "logging"))]
mod null_logger;

pub use log::{debug, error, info, trace, warn, LevelFilter};
use std::collections::hash_map::Entry;
use std::sync::{LazyLock, Mutex, MutexGuard};

use crate::HashMap;

const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Off;
// Per-contact detail from the disease rules drowns everything else at `debug`.
const DEFAULT_MODULE_FILTERS: [(&str, LevelFilter); 1] =
    [("epigraph::disease", LevelFilter::Info)];

static LOG_CONFIGURATION: LazyLock<Mutex<LogConfiguration>> = LazyLock::new(Mutex::default);

/// Global level filter plus per-module overrides keyed by module path (`"epigraph::network"`).
///
/// There is a single instance behind `LOG_CONFIGURATION`; every change rebuilds and installs the
/// backend configuration through `apply`.
#[derive(Debug)]
pub(in crate::log) struct LogConfiguration {
    pub(in crate::log) global_log_level: LevelFilter,
    pub(in crate::log) module_filters: HashMap<String, LevelFilter>,

    #[cfg(feature = "logging")]
    handle: Option<log4rs::Handle>,
}

impl Default for LogConfiguration {
    fn default() -> Self {
        Self {
            global_log_level: DEFAULT_LOG_LEVEL,
            module_filters: DEFAULT_MODULE_FILTERS
                .iter()
                .map(|(module, level)| ((*module).to_string(), *level))
                .collect(),

            #[cfg(feature = "logging")]
            handle: None,
        }
    }
}

impl LogConfiguration {
    fn set_log_level(&mut self, level: LevelFilter) {
        self.global_log_level = level;
        self.apply();
    }

    /// Returns whether the filter changed.
    fn insert_module_filter(&mut self, module: &str, level: LevelFilter) -> bool {
        match self.module_filters.entry(module.to_string()) {
            Entry::Occupied(mut entry) => {
                if *entry.get() == level {
                    return false;
                }
                entry.insert(level);
            }
            Entry::Vacant(entry) => {
                entry.insert(level);
            }
        }
        true
    }

    fn set_module_filters(&mut self, filters: &[(&str, LevelFilter)]) {
        let mut changed = false;
        for (module, level) in filters {
            changed |= self.insert_module_filter(module, *level);
        }
        if changed {
            self.apply();
        }
    }

    fn remove_module_filter(&mut self, module: &str) {
        if self.module_filters.remove(module).is_some() {
            self.apply();
        }
    }
}

/// Emits everything. Equivalent to `set_log_level(LevelFilter::Trace)`.
pub fn enable_logging() {
    set_log_level(LevelFilter::Trace);
}

/// Equivalent to `set_log_level(LevelFilter::Off)`.
pub fn disable_logging() {
    set_log_level(LevelFilter::Off);
}

/// Sets the level for modules without their own filter. `LevelFilter::Off` disables logging.
pub fn set_log_level(level: LevelFilter) {
    log_configuration().set_log_level(level);
}

pub fn set_module_filter(module_path: &str, level: LevelFilter) {
    log_configuration().set_module_filters(&[(module_path, level)]);
}

/// Sets several module filters with a single reconfiguration of the backend.
pub fn set_module_filters(filters: &[(&str, LevelFilter)]) {
    log_configuration().set_module_filters(filters);
}

/// The module falls back to the global level.
pub fn remove_module_filter(module_path: &str) {
    log_configuration().remove_module_filter(module_path);
}

fn log_configuration() -> MutexGuard<'static, LogConfiguration> {
    // A panic while holding the lock leaves the filters intact.
    LOG_CONFIGURATION
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
