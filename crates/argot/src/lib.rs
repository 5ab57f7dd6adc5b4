//! Native-function argument binding for an embeddable scripting runtime.
//!
//! `argot` is the layer a host application uses to expose Rust functions to
//! script code. When script code calls a native function, the runtime
//! packages the call's positional and keyword arguments into an
//! [`ArgValues`]; the native function hands those to [`parse_args`] together
//! with a compact format string (`"O!|z$d"`-style), the parameter names, and
//! an ordered list of typed [`OutputSlot`] destinations. The binder validates
//! arity and types, applies conversions, and either populates the slots or
//! returns a script-visible error for the runtime to raise.
//!
//! The [`Vm`] context owns the value [`Heap`], the string [`Interns`], and
//! named namespaces of globals and registered native functions — an explicit
//! object passed to every call rather than a process-wide singleton. Heap
//! allocation is gated by a [`ResourceTracker`], so untrusted workloads can
//! run under allocation and memory caps.
//!
//! This crate deliberately stops at the native-call boundary: there is no
//! compiler, interpreter, or garbage collector here, only the value model and
//! binding protocol those systems call into.

mod args;
mod bind;
mod exception;
mod format;
mod hashing;
mod heap;
mod intern;
mod resource;
mod runtime;
mod types;
mod value;

pub use crate::{
    args::{ArgValues, KwargsIter, KwargsValues},
    bind::{BindError, OutputSlot, TrailingArgs, parse_args},
    exception::{ExcType, RunError, RunResult, SimpleException},
    format::{ConvKind, FormatSpec, SpecError},
    heap::{Heap, HeapData, HeapId},
    intern::{Interns, StringId},
    resource::{LimitedTracker, NoLimitTracker, ResourceError, ResourceTracker},
    runtime::{NativeFn, Vm},
    types::{Dict, DictIter, List, LongInt, Str, Type},
    value::Value,
};
