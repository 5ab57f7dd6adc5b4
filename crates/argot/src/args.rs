//! Argument packaging for native function calls.
//!
//! The runtime assembles the arguments of a script-level call into an
//! [`ArgValues`] immediately before invoking a native function and discards
//! it right after the call returns. Specific variants cover the common cases
//! (0-2 positional arguments) so most calls never touch a `Vec`.

use crate::{
    exception::{ExcType, RunResult},
    heap::Heap,
    intern::{Interns, StringId},
    resource::ResourceTracker,
    types::{Dict, DictIter},
    value::Value,
};

/// Arguments of one native call.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum ArgValues {
    Empty,
    One(Value),
    Two(Value, Value),
    Kwargs(KwargsValues),
    ArgsKargs { args: Vec<Value>, kwargs: KwargsValues },
}

impl ArgValues {
    /// Number of positional arguments.
    #[must_use]
    pub fn pos_count(&self) -> usize {
        match self {
            Self::Empty | Self::Kwargs(_) => 0,
            Self::One(_) => 1,
            Self::Two(_, _) => 2,
            Self::ArgsKargs { args, .. } => args.len(),
        }
    }

    /// The positional argument at `index`, if supplied.
    #[must_use]
    pub fn get_pos(&self, index: usize) -> Option<Value> {
        match self {
            Self::Empty | Self::Kwargs(_) => None,
            Self::One(a) => (index == 0).then_some(*a),
            Self::Two(a, b) => match index {
                0 => Some(*a),
                1 => Some(*b),
                _ => None,
            },
            Self::ArgsKargs { args, .. } => args.get(index).copied(),
        }
    }

    /// Number of keyword arguments.
    #[must_use]
    pub fn kwarg_count(&self) -> usize {
        match self {
            Self::Kwargs(kwargs) | Self::ArgsKargs { kwargs, .. } => kwargs.len(),
            _ => 0,
        }
    }

    /// Looks up a keyword argument by parameter name.
    #[must_use]
    pub fn get_kwarg(
        &self,
        name: &str,
        heap: &Heap<impl ResourceTracker>,
        interns: &Interns,
    ) -> Option<Value> {
        match self {
            Self::Kwargs(kwargs) | Self::ArgsKargs { kwargs, .. } => kwargs.get(name, heap, interns),
            _ => None,
        }
    }

    /// Iterates over keyword `(key, value)` pairs in call-site order.
    pub fn kwargs_iter(&self) -> KwargsIter<'_> {
        match self {
            Self::Kwargs(kwargs) | Self::ArgsKargs { kwargs, .. } => kwargs.iter(),
            _ => KwargsIter::Empty,
        }
    }

    /// Checks that no arguments were passed.
    pub fn check_zero_args(self, name: &str) -> RunResult<()> {
        match self {
            Self::Empty => Ok(()),
            other => Err(ExcType::type_error_no_args(name, other.total_count())),
        }
    }

    /// Checks that exactly one positional argument was passed, returning it.
    pub fn get_one_arg(self, name: &str) -> RunResult<Value> {
        match self {
            Self::One(a) => Ok(a),
            other => Err(ExcType::type_error_arg_count(name, 1, other.total_count())),
        }
    }

    /// Checks that exactly two positional arguments were passed, returning
    /// them as a tuple.
    pub fn get_two_args(self, name: &str) -> RunResult<(Value, Value)> {
        match self {
            Self::Two(a, b) => Ok((a, b)),
            other => Err(ExcType::type_error_arg_count(name, 2, other.total_count())),
        }
    }

    /// Positional plus keyword argument count, used in arity diagnostics.
    fn total_count(&self) -> usize {
        self.pos_count() + self.kwarg_count()
    }
}

/// Keyword arguments of one native call.
///
/// Captures both inline keywords (`f(a=1, b=2)`), which arrive with interned
/// keys in call-site order, and a mapping unpacked at the call site
/// (`f(**kwargs)`), which arrives as a dict.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum KwargsValues {
    Empty,
    Inline(Vec<(StringId, Value)>),
    Dict(Dict),
}

impl KwargsValues {
    /// Number of keyword arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Inline(kvs) => kvs.len(),
            Self::Dict(dict) => dict.len(),
        }
    }

    /// Returns true if there are no keyword arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a keyword by name.
    ///
    /// Inline keys may repeat when the caller allows duplicates; the last
    /// write wins, so the scan runs back to front.
    #[must_use]
    pub fn get(&self, name: &str, heap: &Heap<impl ResourceTracker>, interns: &Interns) -> Option<Value> {
        match self {
            Self::Empty => None,
            Self::Inline(kvs) => kvs
                .iter()
                .rev()
                .find(|(id, _)| interns.get_str(*id) == name)
                .map(|(_, v)| *v),
            Self::Dict(dict) => dict.get_str(name, heap, interns),
        }
    }

    /// Iterates over `(key, value)` pairs in call-site order.
    ///
    /// Inline keys are yielded as interned string values so both shapes can
    /// be consumed uniformly.
    pub fn iter(&self) -> KwargsIter<'_> {
        match self {
            Self::Empty => KwargsIter::Empty,
            Self::Inline(kvs) => KwargsIter::Inline(kvs.iter()),
            Self::Dict(dict) => KwargsIter::Dict(dict.iter()),
        }
    }
}

/// Iterator over keyword argument `(key, value)` pairs.
#[derive(Debug)]
pub enum KwargsIter<'a> {
    Empty,
    Inline(std::slice::Iter<'a, (StringId, Value)>),
    Dict(DictIter<'a>),
}

impl Iterator for KwargsIter<'_> {
    type Item = (Value, Value);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Self::Empty => None,
            Self::Inline(iter) => iter.next().map(|(k, v)| (Value::InternString(*k), *v)),
            Self::Dict(iter) => iter.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::Empty => (0, Some(0)),
            Self::Inline(iter) => iter.size_hint(),
            Self::Dict(iter) => iter.size_hint(),
        }
    }
}

impl ExactSizeIterator for KwargsIter<'_> {}
