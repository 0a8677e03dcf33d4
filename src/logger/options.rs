use std::path::PathBuf;

use crate::dispatcher::Dispatcher;
use crate::formatter::{Formatter, MessageTemplate};
use crate::globals::GLOBAL_LOGGER;
use crate::level::LogLevel;
use crate::receiver::{
    CollectorReceiver, ConsoleReceiver, HtmlFileReceiver, Receiver, ReceiverConfig, SeverityBridgeReceiver,
};
use crate::text::RenderProfile;

use super::Logger;

/// Builder for a globally-registered [`Logger`] and the receivers it fans
/// out to. Created by [`Logger::init()`], finalized with
/// [`build()`](LoggerOptions::build).
///
/// Receivers are a pluggable trait-based capability set (spec.md §4.5), not
/// a closed enum: besides the four built-in sinks below, [`with_receiver`]
/// registers any hand-written [`Receiver`] implementation.
#[derive(Default)]
pub struct LoggerOptions {
    sender_name: Option<String>,
    sender_type: Option<String>,
    console: Option<LogLevel>,
    collector: Option<(CollectorReceiver, LogLevel)>,
    html_file: Option<(PathBuf, LogLevel)>,
    severity_bridge: Option<(usize, LogLevel)>,
    custom: Vec<Box<dyn FnOnce(&Dispatcher) + Send>>,
}

impl LoggerOptions {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Name attached to every message this logger emits. Default `"app"`.
    pub fn sender_name(mut self, sender_name: impl Into<String>) -> Self {
        self.sender_name = Some(sender_name.into());
        self
    }

    pub fn sender_type(mut self, sender_type: impl Into<String>) -> Self {
        self.sender_type = Some(sender_type.into());
        self
    }

    /// Register a terminal receiver over `stderr`, `DefaultColored`/ANSI.
    pub fn with_console(mut self, level: LogLevel) -> Self {
        self.console = Some(level);
        self
    }

    /// Register an in-memory [`CollectorReceiver`] of the given capacity.
    ///
    /// The instance is constructed up front, not at [`build()`](Self::build)
    /// time, so it can be retrieved with [`collector()`](Self::collector)
    /// before `build()` is called: `CollectorReceiver`'s storage is shared
    /// (`Arc`-backed), so that clone keeps reading whatever the copy wired
    /// into the dispatcher accumulates.
    pub fn with_collector(mut self, max_items: usize, level: LogLevel) -> Self {
        self.collector = Some((CollectorReceiver::new(max_items), level));
        self
    }

    /// The [`CollectorReceiver`] configured by [`with_collector`](Self::with_collector),
    /// if any, for reading back what it accumulates after `build()`.
    pub fn collector(&self) -> Option<CollectorReceiver> {
        self.collector.as_ref().map(|(collector, _)| collector.clone())
    }

    /// Register an [`HtmlFileReceiver`] writing to `path`.
    pub fn with_html_file(mut self, path: impl Into<PathBuf>, level: LogLevel) -> Self {
        self.html_file = Some((path.into(), level));
        self
    }

    /// Register a [`SeverityBridgeReceiver`] targeting a scale of
    /// `target_levels` ordinals.
    pub fn with_severity_bridge(mut self, target_levels: usize, level: LogLevel) -> Self {
        self.severity_bridge = Some((target_levels, level));
        self
    }

    /// Register any hand-written [`Receiver`] implementation, for sinks this
    /// crate doesn't ship a dedicated builder method for.
    pub fn with_receiver<R: Receiver>(mut self, sink: R, config: ReceiverConfig) -> Self {
        self.custom.push(Box::new(move |dispatcher| {
            dispatcher.register(sink, config);
        }));
        self
    }

    /// Register the configured receivers and install the global logger.
    ///
    /// Calling `build()` a second time is a no-op: it warns and returns the
    /// already-initialized instance, since receivers are only ever wired up
    /// once per process.
    pub fn build(self) -> &'static Logger {
        if let Some(logger) = GLOBAL_LOGGER.get() {
            eprintln!("WARNING - LOGGER ALREADY INITIALIZED! ANY NEW SETTINGS WILL NOT BE APPLIED.");
            return logger;
        }

        let dispatcher = Dispatcher::global();

        if let Some(level) = self.console {
            dispatcher.register(
                ConsoleReceiver::stderr(),
                ReceiverConfig {
                    level,
                    formatter: Formatter::new(MessageTemplate::DefaultColored),
                    profile: RenderProfile::Ansi,
                    ..Default::default()
                },
            );
        }

        if let Some((collector, level)) = self.collector {
            dispatcher.register(
                collector,
                ReceiverConfig {
                    level,
                    ..Default::default()
                },
            );
        }

        if let Some((path, level)) = self.html_file {
            dispatcher.register(
                HtmlFileReceiver::new(path),
                ReceiverConfig {
                    level,
                    formatter: Formatter::new(MessageTemplate::DefaultColored),
                    profile: RenderProfile::Html,
                    ..Default::default()
                },
            );
        }

        if let Some((target_levels, level)) = self.severity_bridge {
            dispatcher.register(
                SeverityBridgeReceiver::new(target_levels),
                ReceiverConfig {
                    level,
                    ..Default::default()
                },
            );
        }

        for register in self.custom {
            register(dispatcher);
        }

        let logger = Logger {
            sender_name: self.sender_name.unwrap_or_else(|| "app".to_string()),
            sender_type: self.sender_type,
        };

        match GLOBAL_LOGGER.set(logger) {
            Ok(()) => GLOBAL_LOGGER.get().expect("just set"),
            // Race with another thread's build(): return whichever won.
            Err(_) => GLOBAL_LOGGER.get().expect("set by the winning thread"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SinkError;
    use crate::message::LogMessage;
    use serial_test::serial;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    #[test]
    fn collector_getter_shares_storage_with_the_instance_build_will_register() {
        let options = LoggerOptions::new().with_collector(10, LogLevel::Information);
        let collector = options.collector().expect("collector was configured");
        assert_eq!(collector.item_count(), 0);
        assert!(LoggerOptions::new().collector().is_none());
    }

    struct FlagSink(Arc<AtomicUsize>);

    impl Receiver for FlagSink {
        fn write_one(&mut self, _message: &Arc<LogMessage>, _styled: &str) -> Result<(), SinkError> {
            self.0.fetch_add(1, AtomicOrdering::Relaxed);
            Ok(())
        }

        fn flush(&mut self) -> Result<(), SinkError> {
            Ok(())
        }

        fn close(&mut self) -> Result<(), SinkError> {
            Ok(())
        }
    }

    /// The only test in the crate that calls `build()`: it touches the
    /// process-wide `GLOBAL_LOGGER` singleton, so it must run alone.
    #[test]
    #[serial]
    fn with_receiver_registers_a_hand_written_sink() {
        let writes = Arc::new(AtomicUsize::new(0));
        let options = LoggerOptions::new().with_receiver(
            FlagSink(Arc::clone(&writes)),
            ReceiverConfig {
                level: LogLevel::Verbose,
                ..Default::default()
            },
        );
        let logger = options.build();

        logger.info("hello");
        logger.flush();

        assert!(writes.load(AtomicOrdering::Relaxed) >= 1);
    }
}
