use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "SUBCLIP_LOG";

/// Level used when `SUBCLIP_LOG` is unset, empty, or unparsable.
///
/// Warnings still surface skipped cues and cleanup failures.
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::WARN;

/// Build the filter from a directive string such as `subclip=debug`.
///
/// Invalid directives are dropped; if none survive, [`DEFAULT_LEVEL`] applies.
pub fn filter_from(directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(DEFAULT_LEVEL.into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Install JSON logs on stderr, filtered by `SUBCLIP_LOG`.
///
/// Stdout belongs to the CLI's progress output. Calling this more than once is harmless.
pub fn init() {
    let directives = std::env::var(LOG_ENV).ok();

    let _ = tracing_subscriber::registry()
        .with(filter_from(directives.as_deref()))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_or_empty_falls_back_to_warn() {
        assert_eq!(filter_from(None).max_level_hint(), Some(LevelFilter::WARN));
        assert_eq!(filter_from(Some("")).max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn directives_override_the_default() {
        let filter = filter_from(Some("subclip=debug"));
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }
}
