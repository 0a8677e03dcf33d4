//! Severity-bridge reference sink (spec §6's "OS bridges" mapping rule).
//!
//! Maps `LogLevel` onto a smaller ordinal scale the way a syslog or Windows
//! event-log sink would, without talking to any real OS service — it only
//! demonstrates the mapping rule and the receiver contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::SinkError;
use crate::level::LogLevel;
use crate::message::LogMessage;

use super::Receiver;

/// A receiver that records each message's mapped target-scale ordinal,
/// computed by linear compression of `LogLevel`'s nine-point scale onto
/// `target_levels`, saturating at both ends.
pub struct SeverityBridgeReceiver {
    target_levels: usize,
    mapped: Arc<Mutex<Vec<(Arc<LogMessage>, usize)>>>,
    write_count: AtomicUsize,
}

impl SeverityBridgeReceiver {
    /// `target_levels` is the size of the destination severity scale (e.g.
    /// `8` for syslog's `LOG_EMERG..LOG_DEBUG`). Must be at least 1.
    pub fn new(target_levels: usize) -> Self {
        assert!(target_levels >= 1, "a severity scale needs at least one level");
        Self {
            target_levels,
            mapped: Arc::new(Mutex::new(Vec::new())),
            write_count: AtomicUsize::new(0),
        }
    }

    /// Ordinal on the target scale for the given level: linear compression
    /// of `LogLevel`'s `Emergency=0..Verbose=8` range onto
    /// `0..target_levels-1` via `round()`, saturating at both ends.
    pub fn map_ordinal(&self, level: LogLevel) -> usize {
        map_ordinal(level, self.target_levels)
    }

    pub fn recorded(&self) -> Vec<(Arc<LogMessage>, usize)> {
        self.mapped.lock().expect("mapped lock poisoned").clone()
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::Relaxed)
    }
}

fn map_ordinal(level: LogLevel, target_levels: usize) -> usize {
    const SOURCE_LEVELS: u32 = LogLevel::Verbose as u32 + 1;
    if target_levels == 1 {
        return 0;
    }
    let source_ordinal = (level as u32).min(LogLevel::Verbose as u32);
    let scaled =
        (source_ordinal as f64 * (target_levels as f64 - 1.0) / (SOURCE_LEVELS as f64 - 1.0)).round();
    scaled.clamp(0.0, target_levels as f64 - 1.0) as usize
}

impl Receiver for SeverityBridgeReceiver {
    fn write_one(&mut self, message: &Arc<LogMessage>, _styled: &str) -> Result<(), SinkError> {
        let ordinal = self.map_ordinal(message.level);
        self.mapped
            .lock()
            .expect("mapped lock poisoned")
            .push((Arc::clone(message), ordinal));
        self.write_count.fetch_add(1, Ordering::Relaxed);
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

    #[test]
    fn maps_endpoints_exactly() {
        let bridge = SeverityBridgeReceiver::new(8);
        assert_eq!(bridge.map_ordinal(LogLevel::Emergency), 0);
        assert_eq!(bridge.map_ordinal(LogLevel::Verbose), 7);
    }

    #[test]
    fn saturates_when_target_scale_is_smaller() {
        let bridge = SeverityBridgeReceiver::new(3);
        assert_eq!(bridge.map_ordinal(LogLevel::Emergency), 0);
        assert_eq!(bridge.map_ordinal(LogLevel::Alert), 0);
        assert_eq!(bridge.map_ordinal(LogLevel::Verbose), 2);
    }

    #[test]
    fn single_level_scale_maps_everything_to_zero() {
        let bridge = SeverityBridgeReceiver::new(1);
        assert_eq!(bridge.map_ordinal(LogLevel::Emergency), 0);
        assert_eq!(bridge.map_ordinal(LogLevel::Verbose), 0);
    }

    #[test]
    fn rounds_to_nearest_rather_than_flooring() {
        // target_levels=4 puts Notice (ordinal 5 of 9) at 5*3/8 = 1.875,
        // which rounds up to 2; flooring would wrongly give 1.
        let bridge = SeverityBridgeReceiver::new(4);
        assert_eq!(bridge.map_ordinal(LogLevel::Notice), 2);
    }

    #[test]
    fn is_monotonic_with_severity() {
        let bridge = SeverityBridgeReceiver::new(4);
        let mut prev = 0;
        for level in [
            LogLevel::Emergency,
            LogLevel::Alert,
            LogLevel::Critical,
            LogLevel::Error,
            LogLevel::Warning,
            LogLevel::Notice,
            LogLevel::Information,
            LogLevel::Debug,
            LogLevel::Verbose,
        ] {
            let ordinal = bridge.map_ordinal(level);
            assert!(ordinal >= prev);
            prev = ordinal;
        }
    }
}
