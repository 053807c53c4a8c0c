use super::*;

#[test]
fn levels_parse_case_insensitively() {
    assert_eq!(parse_level("debug"), Some(Level::DEBUG));
    assert_eq!(parse_level(" WARN "), Some(Level::WARN));
    assert_eq!(parse_level("trace"), Some(Level::TRACE));
}

#[test]
fn unknown_level_is_rejected() {
    assert_eq!(parse_level("loud"), None);
    assert_eq!(parse_level(""), None);
}

#[test]
fn init_twice_is_harmless() {
    let config = BridgeConfig { log_level: "nonsense".into(), ..BridgeConfig::default() };
    init(&config);
    init(&BridgeConfig::default());
}

#[cfg(not(target_arch = "wasm32"))]
#[test]
fn native_builds_log_to_stdout() {
    assert_eq!(sink(), Sink::Stdout);
}

#[cfg(feature = "wasm")]
#[test]
fn console_levels_follow_tracing_levels() {
    assert_eq!(console_level(Level::ERROR), log::Level::Error);
    assert_eq!(console_level(Level::WARN), log::Level::Warn);
    assert_eq!(console_level(Level::INFO), log::Level::Info);
    assert_eq!(console_level(Level::DEBUG), log::Level::Debug);
    assert_eq!(console_level(Level::TRACE), log::Level::Trace);
}
