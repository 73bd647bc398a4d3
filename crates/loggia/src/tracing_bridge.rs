//! crates/loggia/src/tracing_bridge.rs
//! Bridge between the tracing crate and loggia loggers.
//!
//! The layer lets code written against the standard tracing macros (trace!,
//! debug!, info!, warn!, error!) flow into a [`Logger`]'s destinations and
//! format. Only the five tracing levels exist on that side; the extended
//! levels (SUCCESS, TASK) remain reachable through the logger facade itself.

use tracing::Subscriber;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

use crate::levels::Level;
use crate::logger::Logger;

/// A tracing-subscriber layer that forwards events to a [`Logger`].
///
/// Each event's message field becomes the log message; the tracing level is
/// mapped onto the logger's level table. Events without a message field are
/// dropped.
pub struct LoggiaLayer {
    logger: Logger,
}

impl LoggiaLayer {
    /// Creates a layer that forwards events to `logger`.
    #[must_use]
    pub const fn new(logger: Logger) -> Self {
        Self { logger }
    }

    /// Maps a tracing level onto the logger's level table.
    #[must_use]
    pub const fn map_level(level: &tracing::Level) -> Level {
        match *level {
            tracing::Level::ERROR => Level::Error,
            tracing::Level::WARN => Level::Warning,
            tracing::Level::INFO => Level::Info,
            tracing::Level::DEBUG => Level::Debug,
            tracing::Level::TRACE => Level::Trace,
        }
    }
}

impl<S> Layer<S> for LoggiaLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let level = Self::map_level(event.metadata().level());
        if !self.logger.enabled_for(level) {
            return;
        }
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.logger.log(level, message);
        }
    }
}

/// Visitor extracting the message field from a tracing event.
#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl tracing::field::Visit for MessageVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        }
    }
}

/// Installs a global tracing subscriber forwarding every event to `logger`.
///
/// # Example
///
/// ```rust,ignore
/// let logger = loggia::get_logger("app")?;
/// loggia::tracing_bridge::init_tracing(logger);
///
/// tracing::info!("now routed through loggia");
/// ```
pub fn init_tracing(logger: Logger) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(LoggiaLayer::new(logger))
        .init();
}

/// Installs the forwarding layer together with an additional filter layer,
/// such as an `EnvFilter` built from `RUST_LOG`.
///
/// # Example
///
/// ```rust,ignore
/// use tracing_subscriber::EnvFilter;
///
/// let logger = loggia::get_logger("app")?;
/// loggia::tracing_bridge::init_tracing_with_filter(logger, EnvFilter::from_default_env());
/// ```
pub fn init_tracing_with_filter<F>(logger: Logger, filter: F)
where
    F: Layer<tracing_subscriber::Registry> + Send + Sync + 'static,
{
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(filter)
        .with(LoggiaLayer::new(logger))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_levels_map_onto_the_extended_table() {
        assert_eq!(LoggiaLayer::map_level(&tracing::Level::ERROR), Level::Error);
        assert_eq!(
            LoggiaLayer::map_level(&tracing::Level::WARN),
            Level::Warning
        );
        assert_eq!(LoggiaLayer::map_level(&tracing::Level::INFO), Level::Info);
        assert_eq!(LoggiaLayer::map_level(&tracing::Level::DEBUG), Level::Debug);
        assert_eq!(LoggiaLayer::map_level(&tracing::Level::TRACE), Level::Trace);
    }

    fn file_logger(dir: &std::path::Path, name: &str) -> Logger {
        let registry = crate::Registry::new(dir).expect("registry builds");
        let logger = registry.get(name).expect("name is valid");
        logger
            .set_format(Some("%(levelname)s %(message)s"))
            .expect("pattern compiles");
        logger
    }

    #[test]
    fn events_flow_into_the_logger_file() {
        use tracing_subscriber::layer::SubscriberExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let logger = file_logger(dir.path(), "bridge");

        let subscriber = tracing_subscriber::registry().with(LoggiaLayer::new(logger));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("via tracing");
            tracing::trace!("fine grained");
        });

        let contents =
            std::fs::read_to_string(dir.path().join("bridge.log")).expect("log file readable");
        assert!(contents.contains("INFO via tracing"));
        assert!(contents.contains("TRACE fine grained"));
    }

    #[test]
    fn logger_threshold_filters_forwarded_events() {
        use tracing_subscriber::layer::SubscriberExt;

        let dir = tempfile::tempdir().expect("tempdir");
        let logger = file_logger(dir.path(), "filtered");
        logger.set_level(Level::Warning).expect("level is valid");

        let subscriber = tracing_subscriber::registry().with(LoggiaLayer::new(logger));
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("dropped");
            tracing::error!("kept");
        });

        let contents =
            std::fs::read_to_string(dir.path().join("filtered.log")).expect("log file readable");
        assert!(!contents.contains("dropped"));
        assert!(contents.contains("ERROR kept"));
    }
}
