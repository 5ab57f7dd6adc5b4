//! Resource limits applied to value-heap allocation.
//!
//! Hosts embedding the runtime decide how much the script side may allocate.
//! Every heap allocation goes through a [`ResourceTracker`], so a host can run
//! untrusted argument payloads under strict caps ([`LimitedTracker`]) or waive
//! tracking entirely ([`NoLimitTracker`]). The argument binder itself never
//! allocates on the tracked heap; these limits exist for the surrounding call
//! plumbing and for hosts building argument values.

use std::fmt;

use crate::exception::{ExcType, RunError, SimpleException};

/// Error returned when a resource limit is exceeded.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ResourceError {
    /// Maximum number of heap allocations exceeded.
    Allocation { limit: usize, count: usize },
    /// Maximum tracked memory usage exceeded.
    Memory { limit: usize, used: usize },
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allocation { limit, count } => {
                write!(f, "allocation limit exceeded: {count} > {limit}")
            }
            Self::Memory { limit, used } => {
                write!(f, "memory limit exceeded: {used} bytes > {limit} bytes")
            }
        }
    }
}

impl std::error::Error for ResourceError {}

impl From<ResourceError> for RunError {
    fn from(err: ResourceError) -> Self {
        SimpleException::new_msg(ExcType::MemoryError, err).into()
    }
}

/// Tracks heap allocations so resource limits can be enforced.
///
/// Implementations must be cheap: `track_allocation` is called once per heap
/// allocation with an estimated object size in bytes.
pub trait ResourceTracker {
    /// Records one allocation of approximately `estimated_size` bytes.
    fn track_allocation(&mut self, estimated_size: usize) -> Result<(), ResourceError>;
}

/// Tracker that imposes no limits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLimitTracker;

impl ResourceTracker for NoLimitTracker {
    #[inline]
    fn track_allocation(&mut self, _estimated_size: usize) -> Result<(), ResourceError> {
        Ok(())
    }
}

/// Tracker enforcing allocation-count and memory caps.
#[derive(Debug, Clone, Default)]
pub struct LimitedTracker {
    max_allocations: Option<usize>,
    max_memory: Option<usize>,
    allocations: usize,
    memory: usize,
}

impl LimitedTracker {
    /// Creates a tracker with the given caps. `None` disables that cap.
    #[must_use]
    pub fn new(max_allocations: Option<usize>, max_memory: Option<usize>) -> Self {
        Self {
            max_allocations,
            max_memory,
            allocations: 0,
            memory: 0,
        }
    }

    /// Number of allocations recorded so far.
    #[must_use]
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Estimated bytes recorded so far.
    #[must_use]
    pub fn memory_used(&self) -> usize {
        self.memory
    }
}

impl ResourceTracker for LimitedTracker {
    fn track_allocation(&mut self, estimated_size: usize) -> Result<(), ResourceError> {
        self.allocations += 1;
        self.memory += estimated_size;
        if let Some(limit) = self.max_allocations
            && self.allocations > limit
        {
            return Err(ResourceError::Allocation {
                limit,
                count: self.allocations,
            });
        }
        if let Some(limit) = self.max_memory
            && self.memory > limit
        {
            return Err(ResourceError::Memory {
                limit,
                used: self.memory,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limited_tracker_allocation_cap() {
        let mut tracker = LimitedTracker::new(Some(2), None);
        assert!(tracker.track_allocation(8).is_ok());
        assert!(tracker.track_allocation(8).is_ok());
        let err = tracker.track_allocation(8).unwrap_err();
        assert_eq!(err, ResourceError::Allocation { limit: 2, count: 3 });
    }

    #[test]
    fn limited_tracker_memory_cap() {
        let mut tracker = LimitedTracker::new(None, Some(100));
        assert!(tracker.track_allocation(60).is_ok());
        let err = tracker.track_allocation(60).unwrap_err();
        assert_eq!(err, ResourceError::Memory { limit: 100, used: 120 });
    }
}
