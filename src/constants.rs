/// Default bounded capacity of a receiver's queue.
pub const DEFAULT_RECEIVER_CAPACITY: usize = 1024;

/// Default `Collector` ring buffer size (spec §4.7).
pub const DEFAULT_COLLECTOR_CAPACITY: usize = 100;

/// Default format for timestamps in the `Default`/`DefaultColored`
/// formatter presets: `2025-10-23 15:30:45.123`.
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Default format for the `ShortColored` preset's time-only header.
pub const SHORT_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.3f";
