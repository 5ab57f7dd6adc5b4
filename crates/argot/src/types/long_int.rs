//! LongInt wrapper for arbitrary precision integer support.
//!
//! The runtime has one integer type: values that fit use `Value::Int(i64)`
//! for performance, and everything larger is a heap-allocated `LongInt`.
//! Named `LongInt` to avoid confusion with the external `BigInt` type.

use std::fmt::{self, Display};

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::{
    hashing::long_hash,
    heap::{Heap, HeapData},
    resource::{ResourceError, ResourceTracker},
    value::Value,
};

/// Wrapper around `num_bigint::BigInt` for integers outside the `i64` range.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct LongInt(pub BigInt);

impl LongInt {
    /// Creates a new `LongInt` from a `BigInt`.
    #[must_use]
    pub fn new(bi: BigInt) -> Self {
        Self(bi)
    }

    /// Returns the inner `BigInt`.
    #[must_use]
    pub fn inner(&self) -> &BigInt {
        &self.0
    }

    /// Narrows to `i64` if the value fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        self.0.to_i64()
    }

    /// Converts to `f64`.
    ///
    /// Returns `None` when the magnitude exceeds the finite `f64` range, so
    /// callers can surface an overflow instead of silently producing infinity.
    #[must_use]
    pub fn to_finite_f64(&self) -> Option<f64> {
        match self.0.to_f64() {
            Some(f) if f.is_finite() => Some(f),
            _ => None,
        }
    }

    /// Converts to a `Value`, demoting to `i64` if it fits.
    pub fn into_value(self, heap: &mut Heap<impl ResourceTracker>) -> Result<Value, ResourceError> {
        if let Some(i) = self.0.to_i64() {
            Ok(Value::Int(i))
        } else {
            let heap_id = heap.allocate(HeapData::LongInt(self))?;
            Ok(Value::Ref(heap_id))
        }
    }

    /// Hash consistent with the `i64` integer hash.
    #[must_use]
    pub fn hash(&self) -> u64 {
        long_hash(&self.0)
    }

    /// Rough size in bytes for allocation tracking.
    #[must_use]
    pub fn estimate_size(&self) -> usize {
        (self.0.bits() as usize).div_ceil(8).max(8)
    }
}

impl Display for LongInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<BigInt> for LongInt {
    fn from(bi: BigInt) -> Self {
        Self(bi)
    }
}
