//! The host-facing runtime context.
//!
//! A [`Vm`] owns everything a native call needs: the value heap, the string
//! interner, and the namespaces holding globals and registered native
//! functions. It is an explicit context object passed to every call — there
//! is no global or thread-local instance, so hosts can run several runtimes
//! side by side or one per thread without coordination.

use ahash::AHashMap;

use crate::{
    args::ArgValues,
    bind::{OutputSlot, parse_args},
    exception::{ExcType, RunResult},
    heap::Heap,
    intern::{Interns, StringId},
    resource::ResourceTracker,
    value::Value,
};

/// A native function callable from script code.
///
/// Receives the runtime context and the packaged call arguments, and returns
/// a value or an error to be propagated as a script exception.
pub type NativeFn<T> = fn(&mut Vm<T>, ArgValues) -> RunResult<Value>;

/// A named table of globals and native functions.
#[derive(Debug)]
struct Namespace<T: ResourceTracker> {
    globals: AHashMap<String, Value>,
    functions: AHashMap<String, NativeFn<T>>,
}

impl<T: ResourceTracker> Namespace<T> {
    fn new() -> Self {
        Self {
            globals: AHashMap::new(),
            functions: AHashMap::new(),
        }
    }
}

/// The runtime context for native calls.
#[derive(Debug)]
pub struct Vm<T: ResourceTracker> {
    heap: Heap<T>,
    interns: Interns,
    namespaces: AHashMap<String, Namespace<T>>,
}

impl<T: ResourceTracker> Vm<T> {
    /// Creates a runtime with the given resource tracker.
    pub fn new(tracker: T) -> Self {
        Self {
            heap: Heap::new(tracker),
            interns: Interns::new(),
            namespaces: AHashMap::new(),
        }
    }

    /// Creates a namespace, or leaves an existing one untouched.
    pub fn start_namespace(&mut self, name: &str) {
        self.namespaces.entry(name.to_owned()).or_insert_with(Namespace::new);
    }

    /// Registers a native function in a namespace.
    pub fn bind_function(&mut self, namespace: &str, name: &str, function: NativeFn<T>) -> RunResult<()> {
        let ns = self
            .namespaces
            .get_mut(namespace)
            .ok_or_else(|| ExcType::key_error_namespace(namespace))?;
        ns.functions.insert(name.to_owned(), function);
        Ok(())
    }

    /// Calls a registered native function with the given arguments.
    pub fn call_function(&mut self, namespace: &str, name: &str, args: ArgValues) -> RunResult<Value> {
        let ns = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| ExcType::key_error_namespace(namespace))?;
        let function = ns
            .functions
            .get(name)
            .copied()
            .ok_or_else(|| ExcType::attribute_error_namespace(namespace, name))?;
        function(self, args)
    }

    /// Sets a global in a namespace, creating or replacing it.
    pub fn set_global(&mut self, namespace: &str, name: &str, value: Value) -> RunResult<()> {
        let ns = self
            .namespaces
            .get_mut(namespace)
            .ok_or_else(|| ExcType::key_error_namespace(namespace))?;
        ns.globals.insert(name.to_owned(), value);
        Ok(())
    }

    /// Reads a global from a namespace.
    pub fn get_global(&self, namespace: &str, name: &str) -> RunResult<Value> {
        let ns = self
            .namespaces
            .get(namespace)
            .ok_or_else(|| ExcType::key_error_namespace(namespace))?;
        ns.globals
            .get(name)
            .copied()
            .ok_or_else(|| ExcType::attribute_error_namespace(namespace, name))
    }

    /// Binds a call's arguments against a format string.
    ///
    /// Convenience wrapper over [`parse_args`] for use inside native
    /// functions; see the binder docs for the format grammar.
    pub fn parse_args<'rt>(
        &'rt self,
        func: &str,
        format: &str,
        names: &[&str],
        args: &ArgValues,
        outputs: &mut [OutputSlot<'_, 'rt>],
    ) -> RunResult<()> {
        parse_args(func, format, names, args, outputs, &self.heap, &self.interns)
    }

    /// The value heap.
    pub fn heap(&self) -> &Heap<T> {
        &self.heap
    }

    /// Mutable access to the value heap.
    pub fn heap_mut(&mut self) -> &mut Heap<T> {
        &mut self.heap
    }

    /// The string interner.
    pub fn interns(&self) -> &Interns {
        &self.interns
    }

    /// Interns a string, returning its id.
    pub fn intern(&mut self, s: &str) -> StringId {
        self.interns.intern(s)
    }

    /// Allocates a heap string value.
    pub fn alloc_str(&mut self, s: &str) -> RunResult<Value> {
        Ok(self.heap.allocate_str(s)?)
    }

    /// Releases every heap object and namespace at once.
    ///
    /// The runtime can be reused afterwards, but any `Value` or `HeapId`
    /// obtained earlier is invalid.
    pub fn free_all(&mut self) {
        self.heap.clear();
        self.namespaces.clear();
    }
}
