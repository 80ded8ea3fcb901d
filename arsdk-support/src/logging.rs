//! Structured logging, built the way `flux::logging` sets it up: `slog`
//! for the call sites, `sloggers` + `serdeconv` for building a logger out of
//! a small TOML-ish config at startup.

pub use slog::{debug, error, info, o, warn, Discard, Logger};

/// Build a root logger that throws everything away. Components default to
/// this when constructed without an explicit logger, so unit tests never
/// need to wire one up.
#[inline]
pub fn discard() -> Logger {
    Logger::root(Discard, o!())
}

/// Build a terminal logger at the given level (one of sloggers' level
/// strings: "trace", "debug", "info", "warning", "error", "critical").
///
/// Mirrors the config literal in the teacher's `flux::logging::init`, just
/// with the level made a parameter instead of hardcoded.
pub fn init_terminal(level: &str) -> Logger {
    use sloggers::{Config, LoggerConfig};

    let toml = format!(
        "type = \"terminal\"\nlevel = \"{}\"\ndestination = \"stderr\"\n",
        level
    );

    let config: LoggerConfig =
        serdeconv::from_toml_str(&toml).expect("logger config must parse");
    config.build_logger().expect("logger must build")
}
