#![cfg(feature = "std")]

//! Stderr backend for the `log` facade.
//!
//! Game output owns stdout, so log lines go to stderr. `SINKSHIPS_LOG` sets
//! the level for this crate's own targets; dependencies are held to `warn`
//! unless a stricter level is asked for.

use std::env;

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable holding the log level filter.
pub const LOG_ENV: &str = "SINKSHIPS_LOG";

/// Target prefix of every record this crate emits.
const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Ceiling applied to records from other crates.
const FOREIGN_CEILING: LevelFilter = LevelFilter::Warn;

/// Effective level for records logged under `target` when `max` is configured.
pub fn target_filter(target: &str, max: LevelFilter) -> LevelFilter {
    let own = target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"));
    if own {
        max
    } else {
        max.min(FOREIGN_CEILING)
    }
}

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= target_filter(metadata.target(), log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

/// Parse a level such as `debug` or `WARN`; `None` for anything else.
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

/// Install the stderr logger at the level from [`LOG_ENV`], `info` by default.
///
/// Only the first call installs anything.
pub fn init_logging() {
    let level = env::var(LOG_ENV)
        .ok()
        .and_then(|lvl| parse_level(&lvl))
        .unwrap_or(LevelFilter::Info);
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
