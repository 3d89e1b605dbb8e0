use log::LevelFilter;
use sinkships::{parse_level, target_filter};

#[test]
fn levels_parse_case_insensitively() {
    assert_eq!(parse_level("debug"), Some(LevelFilter::Debug));
    assert_eq!(parse_level(" WARN "), Some(LevelFilter::Warn));
    assert_eq!(parse_level("off"), Some(LevelFilter::Off));
    assert_eq!(parse_level("chatty"), None);
}

#[test]
fn own_targets_follow_the_configured_level() {
    assert_eq!(target_filter("sinkships", LevelFilter::Trace), LevelFilter::Trace);
    assert_eq!(
        target_filter("sinkships::session", LevelFilter::Debug),
        LevelFilter::Debug
    );
}

#[test]
fn other_crates_are_held_to_warn() {
    assert_eq!(target_filter("tokio::net", LevelFilter::Trace), LevelFilter::Warn);
    assert_eq!(target_filter("sinkshipsx", LevelFilter::Debug), LevelFilter::Warn);
    assert_eq!(target_filter("mio", LevelFilter::Error), LevelFilter::Error);
}
