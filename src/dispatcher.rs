//! Process-wide dispatch singleton (spec §4.4).
//!
//! Exactly one worker thread owns fan-out. Producers never block on it: the
//! inbound channel is unbounded, so `enqueue` is wait-free and backpressure
//! only ever happens downstream, on a receiver's own bounded queue.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::JoinHandle;

use chrono::Local;
use crossbeam_channel::Sender;

use crate::level::LogLevel;
use crate::message::LogMessage;
use crate::receiver::{Receiver, ReceiverConfig, ReceiverCore};

const STATE_RUNNING: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// No receiver wants anything: the fast-path sentinel for
/// `global_min_level` when the receiver set is empty.
const NO_RECEIVERS: u8 = 255;

enum InboundMessage {
    Emit(Arc<LogMessage>),
    Flush(Sender<()>),
    Close(Sender<()>),
}

/// Identifies a previously-registered receiver for `Dispatcher::unregister`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverHandle(usize);

pub(crate) struct Dispatcher {
    tx: Sender<InboundMessage>,
    state: AtomicU8,
    global_min_level: AtomicU8,
    receivers: Arc<Mutex<Vec<Option<ReceiverCore>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Dispatcher {
    fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let receivers = Arc::new(Mutex::new(Vec::new()));
        let worker_receivers = Arc::clone(&receivers);
        let worker = std::thread::spawn(move || run_worker(rx, worker_receivers));

        Self {
            tx,
            state: AtomicU8::new(STATE_RUNNING),
            global_min_level: AtomicU8::new(NO_RECEIVERS),
            receivers,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// The process-wide instance. Constructing it (on first call) is itself
    /// the `Stopped → Running` transition: before anything calls `global()`
    /// there is no dispatcher and nothing is logged.
    pub(crate) fn global() -> &'static Dispatcher {
        static INSTANCE: OnceLock<Dispatcher> = OnceLock::new();
        INSTANCE.get_or_init(Dispatcher::new)
    }

    pub(crate) fn register<R: Receiver>(&self, sink: R, config: ReceiverConfig) -> ReceiverHandle {
        let core = ReceiverCore::new(sink, config);
        let mut guard = self.receivers.lock().expect("receivers lock poisoned");
        let index = match guard.iter().position(Option::is_none) {
            Some(index) => {
                guard[index] = Some(core);
                index
            }
            None => {
                guard.push(Some(core));
                guard.len() - 1
            }
        };
        self.global_min_level.store(recompute_min_level(&guard), Ordering::Release);
        ReceiverHandle(index)
    }

    pub(crate) fn unregister(&self, handle: ReceiverHandle) {
        let mut guard = self.receivers.lock().expect("receivers lock poisoned");
        if let Some(slot) = guard.get_mut(handle.0) {
            if let Some(mut core) = slot.take() {
                core.close();
            }
        }
        self.global_min_level.store(recompute_min_level(&guard), Ordering::Release);
    }

    /// The loosest level any registered receiver accepts, or `None` if no
    /// receiver could possibly want the message — the fast-path check a
    /// producer makes before building a `LogMessage` at all.
    pub(crate) fn global_min_level(&self) -> Option<LogLevel> {
        LogLevel::from_ordinal(self.global_min_level.load(Ordering::Acquire))
    }

    pub(crate) fn enqueue(&self, message: Arc<LogMessage>) {
        if self.state.load(Ordering::Acquire) != STATE_RUNNING {
            return;
        }
        let _ = self.tx.send(InboundMessage::Emit(message));
    }

    pub(crate) fn flush(&self) {
        if self.state.load(Ordering::Acquire) == STATE_CLOSED {
            return;
        }
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(InboundMessage::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    pub(crate) fn close(&self) {
        match self.state.compare_exchange(
            STATE_RUNNING,
            STATE_CLOSING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {
                let (done_tx, done_rx) = crossbeam_channel::bounded(1);
                if self.tx.send(InboundMessage::Close(done_tx)).is_ok() {
                    let _ = done_rx.recv();
                }
                self.state.store(STATE_CLOSED, Ordering::Release);
            }
            Err(_) => {
                // Already `Closing` or `Closed`: idempotent no-op.
            }
        }
    }
}

impl Drop for Dispatcher {
    fn drop(&mut self) {
        self.close();
        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }
    }
}

fn recompute_min_level(receivers: &[Option<ReceiverCore>]) -> u8 {
    receivers
        .iter()
        .flatten()
        .map(|core| core.level() as u8)
        .max()
        .unwrap_or(NO_RECEIVERS)
}

fn fan_out(
    receivers: &Arc<Mutex<Vec<Option<ReceiverCore>>>>,
    seq: u64,
    message: &Arc<LogMessage>,
    now: chrono::DateTime<Local>,
) {
    let guard = receivers.lock().expect("receivers lock poisoned");
    for core in guard.iter().flatten() {
        if core.accepts(message.level) {
            core.try_enqueue(seq, Arc::clone(message), now);
        }
    }
}

fn run_worker(
    rx: crossbeam_channel::Receiver<InboundMessage>,
    receivers: Arc<Mutex<Vec<Option<ReceiverCore>>>>,
) {
    let mut seq: u64 = 0;

    for message in rx.iter() {
        match message {
            InboundMessage::Emit(message) => {
                seq += 1;
                fan_out(&receivers, seq, &message, Local::now());
            }
            InboundMessage::Flush(done) => {
                let guard = receivers.lock().expect("receivers lock poisoned");
                for core in guard.iter().flatten() {
                    core.flush();
                }
                drop(guard);
                let _ = done.send(());
            }
            InboundMessage::Close(done) => {
                while let Ok(pending) = rx.try_recv() {
                    match pending {
                        InboundMessage::Emit(message) => {
                            seq += 1;
                            fan_out(&receivers, seq, &message, Local::now());
                        }
                        InboundMessage::Flush(inner_done) => {
                            let guard = receivers.lock().expect("receivers lock poisoned");
                            for core in guard.iter().flatten() {
                                core.flush();
                            }
                            drop(guard);
                            let _ = inner_done.send(());
                        }
                        InboundMessage::Close(inner_done) => {
                            let _ = inner_done.send(());
                        }
                    }
                }
                let mut guard = receivers.lock().expect("receivers lock poisoned");
                for core in guard.iter_mut().flatten() {
                    core.close();
                }
                let _ = done.send(());
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CallSite;
    use crate::receiver::CollectorReceiver;
    use crate::text::LogText;
    use serial_test::serial;

    fn message(level: LogLevel, content: &str) -> Arc<LogMessage> {
        Arc::new(
            LogMessage::new(
                "Worker",
                None::<String>,
                level,
                LogText::parse(content),
                None,
                CallSite::default(),
            )
            .unwrap(),
        )
    }

    #[test]
    #[serial]
    fn register_recomputes_fast_path_threshold() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.global_min_level(), None);

        let handle = dispatcher.register(
            CollectorReceiver::new(10),
            ReceiverConfig {
                level: LogLevel::Warning,
                ..Default::default()
            },
        );
        assert_eq!(dispatcher.global_min_level(), Some(LogLevel::Warning));

        dispatcher.unregister(handle);
        assert_eq!(dispatcher.global_min_level(), None);
    }

    #[test]
    #[serial]
    fn flush_waits_for_all_prior_emissions() {
        let dispatcher = Dispatcher::new();
        let collector = CollectorReceiver::new(1000);
        let handle = collector.clone();
        dispatcher.register(
            collector,
            ReceiverConfig {
                level: LogLevel::Verbose,
                ..Default::default()
            },
        );

        for i in 0..200 {
            dispatcher.enqueue(message(LogLevel::Information, &format!("msg {i}")));
        }
        dispatcher.flush();
        assert_eq!(handle.item_count(), 200);
        dispatcher.close();
    }

    /// Spec §8 scenario 1: capacity eviction.
    #[test]
    #[serial]
    fn scenario_capacity_eviction() {
        let dispatcher = Dispatcher::new();
        let collector = CollectorReceiver::new(100);
        let handle = collector.clone();
        dispatcher.register(
            collector,
            ReceiverConfig {
                level: LogLevel::Information,
                ..Default::default()
            },
        );

        for i in 0..200 {
            dispatcher.enqueue(message(LogLevel::Verbose, &format!("Verbose Message <cyan>{i}")));
            dispatcher.enqueue(message(LogLevel::Information, &format!("Message <cyan>{i}")));
        }
        dispatcher.flush();

        assert_eq!(handle.item_count(), 100);
        assert_eq!(handle.messages_removed(), 100);
        for i in 100..200 {
            let msg = handle.try_take().unwrap();
            assert_eq!(msg.level, LogLevel::Information);
            assert_eq!(msg.content, LogText::parse(&format!("Message <cyan>{i}")));
        }
        dispatcher.close();
    }

    /// Spec §8 scenario 2: level filtering.
    #[test]
    #[serial]
    fn scenario_level_filtering() {
        let dispatcher = Dispatcher::new();
        let collector = CollectorReceiver::new(300);
        let handle = collector.clone();
        dispatcher.register(
            collector,
            ReceiverConfig {
                level: LogLevel::Information,
                ..Default::default()
            },
        );

        for i in 0..200 {
            dispatcher.enqueue(message(LogLevel::Verbose, &format!("v{i}")));
            dispatcher.enqueue(message(LogLevel::Debug, &format!("d{i}")));
            dispatcher.enqueue(message(LogLevel::Information, &format!("i{i}")));
        }
        dispatcher.flush();

        assert_eq!(handle.item_count(), 200);
        for msg in handle.snapshot() {
            assert_eq!(msg.level, LogLevel::Information);
        }
        dispatcher.close();
    }

    /// Spec §8 scenario 3: flush correctness under parallelism.
    #[test]
    #[serial]
    fn scenario_flush_correctness_under_parallelism() {
        let dispatcher = Dispatcher::new();
        let collector = CollectorReceiver::new(1000);
        let handle = collector.clone();
        dispatcher.register(
            collector,
            ReceiverConfig {
                level: LogLevel::Information,
                ..Default::default()
            },
        );

        std::thread::scope(|scope| {
            for n in 0..1000 {
                let dispatcher = &dispatcher;
                scope.spawn(move || {
                    dispatcher.enqueue(message(LogLevel::Information, &format!("Test {n}")));
                });
            }
        });
        dispatcher.flush();

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.len(), 1000);
        let mut seen: Vec<u32> = snapshot
            .iter()
            .map(|m| {
                m.content
                    .render_plain()
                    .strip_prefix("Test ")
                    .unwrap()
                    .parse()
                    .unwrap()
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..1000).collect::<Vec<u32>>());
        dispatcher.close();
    }

    /// Spec §8 scenario 7: a message-received handler filters one collector
    /// without affecting a sibling collector receiving the same stream.
    #[test]
    #[serial]
    fn scenario_filtered_collector_matches_unfiltered_subset() {
        let dispatcher = Dispatcher::new();

        let c1 = CollectorReceiver::new(1000).on_message_received(|event| {
            if event.message.sender_name == "FilteredSender" {
                event.handled = true;
            }
        });
        let c1_handle = c1.clone();
        dispatcher.register(
            c1,
            ReceiverConfig {
                level: LogLevel::Warning,
                ..Default::default()
            },
        );

        let c2 = CollectorReceiver::new(1000);
        let c2_handle = c2.clone();
        dispatcher.register(
            c2,
            ReceiverConfig {
                level: LogLevel::Verbose,
                ..Default::default()
            },
        );

        for sender in ["NormalSender", "FilteredSender", "OtherSender"] {
            for level in [
                LogLevel::Critical,
                LogLevel::Warning,
                LogLevel::Information,
                LogLevel::Verbose,
            ] {
                let msg = Arc::new(
                    LogMessage::new(
                        sender,
                        None::<String>,
                        level,
                        LogText::parse("hi"),
                        None,
                        CallSite::default(),
                    )
                    .unwrap(),
                );
                dispatcher.enqueue(msg);
            }
        }
        dispatcher.flush();

        let expected: Vec<_> = c2_handle
            .snapshot()
            .into_iter()
            .filter(|m| m.level <= LogLevel::Warning && m.sender_name != "FilteredSender")
            .collect();
        assert_eq!(c1_handle.snapshot(), expected);
        dispatcher.close();
    }
}
