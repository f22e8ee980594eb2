//! Quality-of-service prefetch counter.
//!
//! The prefetch count caps how many unacknowledged units of work the worker
//! may hold at once. The worker runtime owns the real counter; this module
//! defines the contract the control handlers adjust it through, plus an
//! atomic in-process implementation.
use std::sync::{
    Arc,
    atomic::{AtomicU32, Ordering},
};

use crate::error::{ControlError, ControlResult};

/// Largest delta a single adjust call may apply.
///
/// The control plane nudges prefetch in small steps; a huge delta is a
/// client bug, not a tuning request.
pub const MAX_PREFETCH_DELTA: u32 = 1_000;

/// Contract for adjusting the worker's prefetch counter.
pub trait QosControl: Send + Sync + 'static {
    /// Current prefetch count.
    fn prefetch(&self) -> u32;

    /// Raise the prefetch count by `n`, returning the new value.
    fn increment(&self, n: u32) -> ControlResult<u32>;

    /// Lower the prefetch count by `n`, returning the new value.
    fn decrement(&self, n: u32) -> ControlResult<u32>;
}

/// Shared handle to the worker's QoS component.
pub type QosHandle = Arc<dyn QosControl>;

/// Atomic prefetch counter.
///
/// Adjustments are validated before they are applied: the delta must be
/// non-zero and at most [`MAX_PREFETCH_DELTA`], a decrement may not take
/// the counter below zero, and an increment may not overflow.
#[derive(Debug, Default)]
pub struct PrefetchCounter {
    value: AtomicU32,
}

impl PrefetchCounter {
    /// Create a counter starting at the given prefetch count.
    pub fn new(initial: u32) -> Self {
        Self {
            value: AtomicU32::new(initial),
        }
    }

    fn check_delta(n: u32) -> ControlResult<()> {
        if n == 0 {
            return Err(ControlError::CounterAdjust(
                "prefetch delta must be non-zero".to_string(),
            ));
        }
        if n > MAX_PREFETCH_DELTA {
            return Err(ControlError::CounterAdjust(format!(
                "prefetch delta {n} exceeds the allowed maximum {MAX_PREFETCH_DELTA}"
            )));
        }
        Ok(())
    }
}

impl QosControl for PrefetchCounter {
    fn prefetch(&self) -> u32 {
        self.value.load(Ordering::SeqCst)
    }

    fn increment(&self, n: u32) -> ControlResult<u32> {
        Self::check_delta(n)?;
        self.value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_add(n)
            })
            .map(|previous| previous + n)
            .map_err(|current| {
                ControlError::CounterAdjust(format!(
                    "incrementing prefetch {current} by {n} would overflow"
                ))
            })
    }

    fn decrement(&self, n: u32) -> ControlResult<u32> {
        Self::check_delta(n)?;
        self.value
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                current.checked_sub(n)
            })
            .map(|previous| previous - n)
            .map_err(|current| {
                ControlError::CounterAdjust(format!(
                    "cannot decrement prefetch {current} by {n}: counter would drop below zero"
                ))
            })
    }
}
