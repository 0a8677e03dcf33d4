//! In-memory collector sink (spec §4.7).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::SinkError;
use crate::message::LogMessage;

use super::Receiver;

/// A `message_received` event fired synchronously, before insertion.
/// Setting `handled = true` suppresses storage of that message.
pub struct MessageReceivedEvent<'a> {
    pub message: &'a Arc<LogMessage>,
    pub handled: bool,
}

type MessageReceivedHandler = Arc<dyn Fn(&mut MessageReceivedEvent<'_>) + Send + Sync>;

/// An in-memory receiver storing the last `max_items` delivered messages in
/// arrival order, evicting the oldest on overflow.
///
/// Cheap to clone: the backing storage is shared, so a clone taken before
/// registering with the dispatcher serves as a read handle into what the
/// registered copy accumulates.
#[derive(Clone)]
pub struct CollectorReceiver {
    max_items: usize,
    items: Arc<Mutex<VecDeque<Arc<LogMessage>>>>,
    messages_removed: Arc<AtomicU64>,
    on_message_received: Option<MessageReceivedHandler>,
}

impl Default for CollectorReceiver {
    /// `max_items = 100` (spec §4.7's default ring size).
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_COLLECTOR_CAPACITY)
    }
}

impl CollectorReceiver {
    pub fn new(max_items: usize) -> Self {
        Self {
            max_items,
            items: Arc::new(Mutex::new(VecDeque::with_capacity(max_items))),
            messages_removed: Arc::new(AtomicU64::new(0)),
            on_message_received: None,
        }
    }

    /// Install a handler invoked synchronously before each insertion; set
    /// `handled = true` on the event to suppress storing that message.
    pub fn on_message_received(
        mut self,
        handler: impl Fn(&mut MessageReceivedEvent<'_>) + Send + Sync + 'static,
    ) -> Self {
        self.on_message_received = Some(Arc::new(handler));
        self
    }

    /// FIFO dequeue. Returns `None` if nothing is stored.
    pub fn try_take(&self) -> Option<Arc<LogMessage>> {
        self.items.lock().expect("collector lock poisoned").pop_front()
    }

    /// All currently stored messages, oldest first, without removing them.
    pub fn snapshot(&self) -> Vec<Arc<LogMessage>> {
        self.items.lock().expect("collector lock poisoned").iter().cloned().collect()
    }

    pub fn item_count(&self) -> usize {
        self.items.lock().expect("collector lock poisoned").len()
    }

    pub fn messages_removed(&self) -> u64 {
        self.messages_removed.load(Ordering::Relaxed)
    }
}

impl Receiver for CollectorReceiver {
    fn write_one(&mut self, message: &Arc<LogMessage>, _styled: &str) -> Result<(), SinkError> {
        if let Some(handler) = &self.on_message_received {
            let mut event = MessageReceivedEvent {
                message,
                handled: false,
            };
            handler(&mut event);
            if event.handled {
                return Ok(());
            }
        }

        let mut items = self.items.lock().expect("collector lock poisoned");
        items.push_back(Arc::clone(message));
        while items.len() > self.max_items {
            items.pop_front();
            self.messages_removed.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LogLevel;
    use crate::message::CallSite;
    use crate::text::LogText;

    fn message(content: &str) -> Arc<LogMessage> {
        Arc::new(
            LogMessage::new(
                "Worker",
                None::<String>,
                LogLevel::Information,
                LogText::parse(content),
                None,
                CallSite::default(),
            )
            .unwrap(),
        )
    }

    #[test]
    fn default_capacity_is_100() {
        assert_eq!(CollectorReceiver::default().max_items, 100);
    }

    #[test]
    fn evicts_oldest_past_capacity() {
        let mut collector = CollectorReceiver::new(100);
        for i in 0..200 {
            collector.write_one(&message(&format!("Message {i}")), "").unwrap();
        }
        assert_eq!(collector.item_count(), 100);
        assert_eq!(collector.messages_removed(), 100);
        let first = collector.try_take().unwrap();
        assert_eq!(first.content.render_plain(), "Message 100");
    }

    #[test]
    fn snapshot_does_not_remove() {
        let mut collector = CollectorReceiver::new(10);
        collector.write_one(&message("a"), "").unwrap();
        collector.write_one(&message("b"), "").unwrap();
        assert_eq!(collector.snapshot().len(), 2);
        assert_eq!(collector.item_count(), 2);
    }

    #[test]
    fn message_received_handler_can_suppress_storage() {
        let mut collector = CollectorReceiver::new(10).on_message_received(|event| {
            if event.message.content.render_plain() == "drop me" {
                event.handled = true;
            }
        });
        collector.write_one(&message("keep me"), "").unwrap();
        collector.write_one(&message("drop me"), "").unwrap();
        assert_eq!(collector.item_count(), 1);
        assert_eq!(collector.snapshot()[0].content.render_plain(), "keep me");
    }
}
