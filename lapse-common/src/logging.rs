use std::str::FromStr;

use tracing::metadata::LevelFilter;
use tracing_subscriber::{
    Layer, filter::FilterFn, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

/// Events raised by the policy itself (decisions, configuration)
#[macro_export]
macro_rules! internal {
    (level = $level:ident, $($msg:expr),*) => {{
        let span = $crate::tracing::span!($crate::tracing::Level::$level, "internal");
        let _enter = span.enter();

        $crate::tracing::event!($crate::tracing::Level::$level, $($msg),*)
    }};

    ($($msg:expr),*) => {
        $crate::internal!(level = TRACE, $($msg),*)
    };
}

/// Events about messages handed on to the next broker in the chain
#[macro_export]
macro_rules! forwarded {
    (level = $level:ident, $($msg:expr),*) => {{
        let span = $crate::tracing::span!($crate::tracing::Level::$level, "forwarded");
        let _enter = span.enter();

        $crate::tracing::event!($crate::tracing::Level::$level, $($msg),*)
    }};

    ($($msg:expr),*) => {
        $crate::forwarded!(level = TRACE, $($msg),*)
    };
}

fn level_from(value: Option<&str>, default: LevelFilter) -> LevelFilter {
    value.map_or(default, |level| {
        LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level specified {level}, defaulting to {default}");
            default
        })
    })
}

/// Install the global subscriber.
///
/// The level is read from `LOG_LEVEL`, falling back to `TRACE` in debug builds
/// and `INFO` otherwise. Only events from `lapse*` targets are emitted.
pub fn init() {
    let default = if cfg!(debug_assertions) {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };

    let level = level_from(std::env::var("LOG_LEVEL").ok().as_deref(), default);

    tracing_subscriber::Registry::default()
        .with(
            tracing_subscriber::fmt::layer()
                .with_file(false)
                .with_line_number(false)
                .compact()
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc_3339())
                .with_filter(level)
                .with_filter(FilterFn::new(|metadata| {
                    metadata.target().starts_with("lapse")
                })),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_env_value() {
        assert_eq!(level_from(Some("debug"), LevelFilter::INFO), LevelFilter::DEBUG);
        assert_eq!(level_from(Some("WARN"), LevelFilter::INFO), LevelFilter::WARN);
        assert_eq!(level_from(Some("off"), LevelFilter::INFO), LevelFilter::OFF);
    }

    #[test]
    fn test_level_falls_back_to_default() {
        assert_eq!(level_from(None, LevelFilter::INFO), LevelFilter::INFO);
        assert_eq!(
            level_from(Some("chatty"), LevelFilter::TRACE),
            LevelFilter::TRACE
        );
    }
}
