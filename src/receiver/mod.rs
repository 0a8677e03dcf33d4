//! Generic receiver harness (spec §4.5).
//!
//! Every sink gets a dedicated worker thread and a bounded backlog.
//! [`ReceiverCore`] owns the backlog, the thread, and the watermarks; a
//! boxed [`Receiver`] implementation owns only the sink-specific side
//! effect. The backlog is a plain `Mutex<VecDeque<QueuedMessage>>` rather
//! than a `crossbeam_channel` because the default backpressure policy
//! (spec §4.5: drop the lowest-severity message when the queue is full)
//! requires comparing the incoming message against whatever is already
//! queued and evicting from the middle — something a channel's FIFO ring
//! cannot do. A small unbounded `crossbeam_channel` carries only wake-ups
//! and the `Flush`/`Close` handshakes; since it is sent from a single
//! producer thread (the dispatcher's worker), it preserves the relative
//! order of those control messages against the backlog pushes that
//! precede them.

mod collector;
mod console;
mod html;
mod severity_bridge;

pub use collector::{CollectorReceiver, MessageReceivedEvent};
pub use console::ConsoleReceiver;
pub use html::HtmlFileReceiver;
pub use severity_bridge::SeverityBridgeReceiver;

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use chrono::{DateTime, Local};
use crossbeam_channel::{Receiver as ChannelReceiver, Sender};

use crate::error::SinkError;
use crate::formatter::Formatter;
use crate::level::LogLevel;
use crate::message::LogMessage;
use crate::text::RenderProfile;

/// Batch size threshold above which an opportunistic worker starts
/// coalescing (dropping all but the newest message in the backlog) instead
/// of writing every queued message.
const OPPORTUNISTIC_COALESCE_THRESHOLD: usize = 8;

const STATE_OPEN: u8 = 0;
const STATE_CLOSING: u8 = 1;
const STATE_CLOSED: u8 = 2;

/// Worker scheduling discipline (spec §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReceiverMode {
    /// Process every message exactly once, in arrival order.
    #[default]
    Continuous,
    /// Allowed to batch-drain and coalesce when `write_one` falls behind.
    Opportunistic,
}

/// Backpressure / late-message policy (spec §4.5).
#[derive(Debug, Clone, Copy)]
pub struct LatePolicy {
    /// Queue depth above which the receiver is considered "late". Negative
    /// disables the check.
    pub late_threshold: i64,
    /// Timestamp lag in milliseconds above which the receiver is considered
    /// "late". Negative disables the check.
    pub late_ms: i64,
    /// While late, messages numerically greater than (i.e. less severe
    /// than) this level are demoted to drops rather than enqueued.
    pub demote_above: LogLevel,
}

impl Default for LatePolicy {
    fn default() -> Self {
        Self {
            late_threshold: -1,
            late_ms: -1,
            demote_above: LogLevel::None,
        }
    }
}

/// Configuration for a [`ReceiverCore`].
#[derive(Clone)]
pub struct ReceiverConfig {
    pub level: LogLevel,
    pub capacity: usize,
    pub mode: ReceiverMode,
    pub late_policy: LatePolicy,
    pub formatter: Formatter,
    pub profile: RenderProfile,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Information,
            capacity: crate::constants::DEFAULT_RECEIVER_CAPACITY,
            mode: ReceiverMode::default(),
            late_policy: LatePolicy::default(),
            formatter: Formatter::default(),
            profile: RenderProfile::Plain,
        }
    }
}

/// The sink-specific half of a receiver: the side effect, flush, and close
/// (spec §4.5's "receiver contract"). Implemented by each concrete sink;
/// scheduled and protected by [`ReceiverCore`].
pub trait Receiver: Send + 'static {
    /// Perform the side effect for one message. `styled` is the formatted,
    /// already-rendered line for this receiver's render profile.
    fn write_one(&mut self, message: &Arc<LogMessage>, styled: &str) -> Result<(), SinkError>;
    /// Make prior writes visible/durable, to the extent the sink supports.
    fn flush(&mut self) -> Result<(), SinkError>;
    /// Release resources. Called exactly once, after the final flush.
    fn close(&mut self) -> Result<(), SinkError>;
}

/// A message waiting in a receiver's backlog.
struct QueuedMessage {
    seq: u64,
    message: Arc<LogMessage>,
}

/// Wake-up/control traffic on a receiver's signal channel. Carries no log
/// data itself; the backlog (a `Mutex<VecDeque<QueuedMessage>>`) is where
/// `Deliver`-equivalent payloads actually live.
enum WorkerSignal {
    Data,
    Flush(Sender<()>),
    Close(Sender<()>),
}

#[derive(Default)]
struct Counters {
    offered: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    errors: AtomicU64,
}

struct SharedState {
    counters: Counters,
    state: AtomicU8,
    last_processed_seq: AtomicU64,
    last_processed_at: Mutex<Option<DateTime<Local>>>,
}

impl SharedState {
    fn new() -> Self {
        Self {
            counters: Counters::default(),
            state: AtomicU8::new(STATE_OPEN),
            last_processed_seq: AtomicU64::new(0),
            last_processed_at: Mutex::new(None),
        }
    }
}

/// Generic per-receiver harness: bounded queue, dedicated worker thread,
/// lifecycle flags, and drop/delivery counters, wrapped around a concrete
/// [`Receiver`] sink.
pub struct ReceiverCore {
    tx: Sender<WorkerSignal>,
    queue: Arc<Mutex<VecDeque<QueuedMessage>>>,
    capacity: usize,
    worker: Option<JoinHandle<()>>,
    shared: Arc<SharedState>,
    level: LogLevel,
    late_policy: LatePolicy,
}

impl ReceiverCore {
    pub fn new<R: Receiver>(sink: R, config: ReceiverConfig) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        let queue = Arc::new(Mutex::new(VecDeque::with_capacity(config.capacity)));
        let shared = Arc::new(SharedState::new());
        let worker_shared = Arc::clone(&shared);
        let worker_queue = Arc::clone(&queue);
        let formatter = config.formatter;
        let profile = config.profile;
        let mode = config.mode;

        let worker = std::thread::spawn(move || {
            run_worker(sink, rx, worker_queue, worker_shared, &formatter, profile, mode);
        });

        Self {
            tx,
            queue,
            capacity: config.capacity,
            worker: Some(worker),
            shared,
            level: config.level,
            late_policy: config.late_policy,
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Whether this receiver is open and its configured level accepts
    /// `level`. Checked by the dispatcher before attempting enqueue.
    pub fn accepts(&self, level: LogLevel) -> bool {
        level <= self.level && self.shared.state.load(Ordering::Acquire) == STATE_OPEN
    }

    pub fn is_closed(&self) -> bool {
        self.shared.state.load(Ordering::Acquire) == STATE_CLOSED
    }

    /// Attempt to enqueue a message, applying the late/backpressure policy.
    /// Called only from the dispatcher's worker thread.
    pub fn try_enqueue(&self, seq: u64, message: Arc<LogMessage>, now: DateTime<Local>) {
        if self.shared.state.load(Ordering::Acquire) != STATE_OPEN {
            return;
        }
        self.shared.counters.offered.fetch_add(1, Ordering::Relaxed);

        let queue_depth = {
            let queue = self.queue.lock().expect("receiver queue lock poisoned");
            queue.len()
        } as i64;
        let lag_ms = now.signed_duration_since(message.date_time).num_milliseconds();
        let is_late = (self.late_policy.late_threshold >= 0 && queue_depth > self.late_policy.late_threshold)
            || (self.late_policy.late_ms >= 0 && lag_ms > self.late_policy.late_ms);

        if is_late && message.level > self.late_policy.demote_above {
            self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }

        let admitted = self.admit(seq, message);
        if admitted {
            let _ = self.tx.send(WorkerSignal::Data);
        } else {
            self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Push onto the backlog, applying the default drop-lowest-severity-first
    /// policy (spec §4.5) once it is full: the least severe message among
    /// {already queued, incoming} is the one that does not make it in. When
    /// the incoming message itself is the least severe, it is dropped and
    /// the backlog is left untouched.
    fn admit(&self, seq: u64, message: Arc<LogMessage>) -> bool {
        let mut queue = self.queue.lock().expect("receiver queue lock poisoned");

        if queue.len() < self.capacity {
            queue.push_back(QueuedMessage { seq, message });
            return true;
        }

        let worst = queue
            .iter()
            .enumerate()
            .max_by_key(|(_, queued)| queued.message.level)
            .map(|(index, queued)| (index, queued.message.level));

        match worst {
            Some((index, worst_level)) if message.level < worst_level => {
                queue.remove(index);
                queue.push_back(QueuedMessage { seq, message });
                drop(queue);
                self.shared.counters.dropped.fetch_add(1, Ordering::Relaxed);
                true
            }
            _ => false,
        }
    }

    /// Block until every message enqueued before this call has been
    /// delivered to the sink and the sink has flushed.
    pub fn flush(&self) {
        if self.is_closed() {
            return;
        }
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(WorkerSignal::Flush(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
    }

    /// Stop accepting new messages (lifecycle `Open` → `Closing`).
    pub fn begin_close(&self) {
        let _ = self.shared.state.compare_exchange(
            STATE_OPEN,
            STATE_CLOSING,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Drain, flush, close the sink, and join the worker thread. Idempotent.
    pub fn close(&mut self) {
        if self.shared.state.load(Ordering::Acquire) == STATE_CLOSED && self.worker.is_none() {
            return;
        }
        self.begin_close();
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        if self.tx.send(WorkerSignal::Close(done_tx)).is_ok() {
            let _ = done_rx.recv();
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
    }

    pub fn items_offered(&self) -> u64 {
        self.shared.counters.offered.load(Ordering::Relaxed)
    }

    pub fn items_delivered(&self) -> u64 {
        self.shared.counters.delivered.load(Ordering::Relaxed)
    }

    pub fn items_dropped(&self) -> u64 {
        self.shared.counters.dropped.load(Ordering::Relaxed)
    }

    pub fn items_errored(&self) -> u64 {
        self.shared.counters.errors.load(Ordering::Relaxed)
    }

    pub fn last_processed_seq(&self) -> u64 {
        self.shared.last_processed_seq.load(Ordering::Relaxed)
    }
}

impl Drop for ReceiverCore {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.close();
        }
    }
}

fn run_worker(
    mut sink: impl Receiver,
    rx: ChannelReceiver<WorkerSignal>,
    queue: Arc<Mutex<VecDeque<QueuedMessage>>>,
    shared: Arc<SharedState>,
    formatter: &Formatter,
    profile: RenderProfile,
    mode: ReceiverMode,
) {
    for signal in rx.iter() {
        match signal {
            WorkerSignal::Data => {
                drain_queue(&mut sink, &queue, &shared, formatter, profile, mode);
            }
            WorkerSignal::Flush(done) => {
                drain_queue(&mut sink, &queue, &shared, formatter, profile, mode);
                if let Err(err) = sink.flush() {
                    report_sink_error(&shared, &err);
                }
                let _ = done.send(());
            }
            WorkerSignal::Close(done) => {
                shared.state.store(STATE_CLOSING, Ordering::Release);
                drain_queue(&mut sink, &queue, &shared, formatter, profile, mode);
                if let Err(err) = sink.flush() {
                    report_sink_error(&shared, &err);
                }
                if let Err(err) = sink.close() {
                    report_sink_error(&shared, &err);
                }
                shared.state.store(STATE_CLOSED, Ordering::Release);
                let _ = done.send(());
                break;
            }
        }
    }
}

/// Drain every message currently in the backlog, in arrival order. Under
/// [`ReceiverMode::Opportunistic`], a backlog deeper than the coalesce
/// threshold is collapsed to just its newest entry first.
fn drain_queue(
    sink: &mut impl Receiver,
    queue: &Mutex<VecDeque<QueuedMessage>>,
    shared: &SharedState,
    formatter: &Formatter,
    profile: RenderProfile,
    mode: ReceiverMode,
) {
    let batch: Vec<QueuedMessage> = {
        let mut guard = queue.lock().expect("receiver queue lock poisoned");
        match mode {
            ReceiverMode::Continuous => guard.drain(..).collect(),
            ReceiverMode::Opportunistic => {
                if guard.len() > OPPORTUNISTIC_COALESCE_THRESHOLD {
                    let newest = guard.pop_back();
                    let discarded = guard.len() as u64;
                    guard.clear();
                    shared.counters.dropped.fetch_add(discarded, Ordering::Relaxed);
                    newest.into_iter().collect()
                } else {
                    guard.drain(..).collect()
                }
            }
        }
    };

    for item in batch {
        deliver_one(sink, formatter, profile, shared, item.seq, item.message);
    }
}

fn deliver_one(
    sink: &mut impl Receiver,
    formatter: &Formatter,
    profile: RenderProfile,
    shared: &SharedState,
    seq: u64,
    message: Arc<LogMessage>,
) {
    let styled = formatter.format(&message).render(profile);
    if let Err(err) = sink.write_one(&message, &styled) {
        report_sink_error(shared, &err);
    }
    shared.counters.delivered.fetch_add(1, Ordering::Relaxed);
    shared.last_processed_seq.store(seq, Ordering::Relaxed);
    if let Ok(mut last) = shared.last_processed_at.lock() {
        *last = Some(Local::now());
    }
}

/// Absorb a sink failure: count it and surface it once, synchronously, so
/// a misbehaving sink can never halt its worker or escape into the host
/// (spec §7).
fn report_sink_error(shared: &SharedState, err: &SinkError) {
    shared.counters.errors.fetch_add(1, Ordering::Relaxed);
    eprintln!("log receiver sink error: {err}");
}
