//! Arena storage for heap-allocated runtime values.
//!
//! Heap objects (strings, lists, dicts, big integers) live in a dense arena
//! owned by the runtime; `Value::Ref` holds a [`HeapId`] index into it. The
//! arena is the runtime's memory manager boundary: native code — the argument
//! binder included — only ever borrows `&Heap` during a call and never owns
//! or frees objects. Reclamation happens wholesale via [`Heap::clear`] when
//! the host tears the runtime down.

use crate::{
    resource::{ResourceError, ResourceTracker},
    types::{Dict, List, LongInt, Str, Type},
    value::Value,
};

/// Index of an object in the heap arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct HeapId(usize);

/// A heap-allocated runtime object.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum HeapData {
    Str(Str),
    List(List),
    Dict(Dict),
    LongInt(LongInt),
}

impl HeapData {
    /// The runtime type tag of this object.
    #[must_use]
    pub fn type_of(&self) -> Type {
        match self {
            Self::Str(_) => Type::Str,
            Self::List(_) => Type::List,
            Self::Dict(_) => Type::Dict,
            Self::LongInt(_) => Type::Int,
        }
    }

    /// Rough size in bytes for allocation tracking.
    fn estimate_size(&self) -> usize {
        match self {
            Self::Str(s) => 24 + s.byte_len(),
            Self::List(l) => 24 + l.len() * size_of::<Value>(),
            Self::Dict(d) => 48 + d.len() * (2 * size_of::<Value>() + 16),
            Self::LongInt(li) => li.estimate_size(),
        }
    }
}

/// The arena of live heap objects, gated by a resource tracker.
#[derive(Debug)]
pub struct Heap<T: ResourceTracker> {
    slots: Vec<HeapData>,
    tracker: T,
}

impl<T: ResourceTracker> Heap<T> {
    /// Creates an empty heap.
    pub fn new(tracker: T) -> Self {
        Self {
            slots: Vec::new(),
            tracker,
        }
    }

    /// Allocates an object, returning its id.
    ///
    /// # Errors
    /// Returns a `ResourceError` when the tracker's limits are exceeded; the
    /// object is not stored in that case.
    pub fn allocate(&mut self, data: HeapData) -> Result<HeapId, ResourceError> {
        self.tracker.track_allocation(data.estimate_size())?;
        let id = HeapId(self.slots.len());
        self.slots.push(data);
        Ok(id)
    }

    /// Allocates a heap string and returns a `Value` referencing it.
    pub fn allocate_str(&mut self, s: &str) -> Result<Value, ResourceError> {
        Ok(Value::Ref(self.allocate(HeapData::Str(Str::from(s)))?))
    }

    /// Allocates a list and returns a `Value` referencing it.
    pub fn allocate_list(&mut self, values: Vec<Value>) -> Result<Value, ResourceError> {
        Ok(Value::Ref(self.allocate(HeapData::List(List::new(values)))?))
    }

    /// Allocates a dict and returns a `Value` referencing it.
    pub fn allocate_dict(&mut self, dict: Dict) -> Result<Value, ResourceError> {
        Ok(Value::Ref(self.allocate(HeapData::Dict(dict))?))
    }

    /// Returns the object for an id.
    ///
    /// # Panics
    /// Panics if the id did not come from this heap or the heap has been
    /// cleared since; both indicate a host bug.
    #[must_use]
    pub fn get(&self, id: HeapId) -> &HeapData {
        &self.slots[id.0]
    }

    /// Mutable access to the object for an id.
    ///
    /// # Panics
    /// Panics under the same conditions as [`Heap::get`].
    #[must_use]
    pub fn get_mut(&mut self, id: HeapId) -> &mut HeapData {
        &mut self.slots[id.0]
    }

    /// Number of live objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no objects are allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Frees every object at once.
    ///
    /// All outstanding `HeapId`s become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
