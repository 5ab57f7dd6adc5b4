//! The argument binder: validates and converts the arguments of a native
//! call against a format string, writing results into typed output slots.
//!
//! Callers build an ordered slot list matching the format string and hand it
//! to [`parse_args`] together with the call's [`ArgValues`]:
//!
//! ```
//! use argot::{ArgValues, Heap, Interns, NoLimitTracker, OutputSlot, Value, parse_args};
//!
//! let heap: Heap<NoLimitTracker> = Heap::new(NoLimitTracker);
//! let interns = Interns::new();
//! let args = ArgValues::Two(Value::Int(7), Value::Float(0.5));
//!
//! let mut a = 0i64;
//! let mut b = 0f64;
//! parse_args(
//!     "scale",
//!     "id",
//!     &["a", "b"],
//!     &args,
//!     &mut [OutputSlot::Int(&mut a), OutputSlot::Float(&mut b)],
//!     &heap,
//!     &interns,
//! )
//! .unwrap();
//! assert_eq!((a, b), (7, 0.5));
//! ```
//!
//! Slots are written strictly in format order. When binding fails, slots
//! before the failing parameter may already be populated and slots at or
//! after it are untouched; the `Err` return is the only success signal, so
//! callers must not read any slot after a failure.

use smallvec::SmallVec;
use std::fmt;

use crate::{
    args::ArgValues,
    exception::{ExcType, RunError, RunResult, SimpleException},
    format::{ConvKind, FormatSpec, SpecError},
    heap::{Heap, HeapData, HeapId},
    intern::Interns,
    resource::ResourceTracker,
    types::Type,
    value::Value,
};

/// Trailing positional arguments collected by a `*` specifier.
///
/// Holds copies of the value handles, not the objects themselves; like every
/// other output it borrows nothing and owns nothing on the heap.
#[derive(Debug, Default)]
pub struct TrailingArgs {
    values: SmallVec<[Value; 8]>,
}

impl TrailingArgs {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of collected arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no trailing arguments were collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The collected arguments in call order.
    #[must_use]
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }

    fn fill(&mut self, values: impl Iterator<Item = Value>) {
        self.values.clear();
        self.values.extend(values);
    }
}

/// One typed output destination for the binder.
///
/// The slot list must match the format string positionally: one slot per
/// named specifier plus one `Remainder` slot at the position of `*`. The
/// binder validates the pairing before touching any destination.
///
/// `'out` is the lifetime of the caller's destinations; `'rt` is the
/// runtime borrow (`&Heap`, `&Interns`) that string outputs point into.
#[derive(Debug)]
pub enum OutputSlot<'out, 'rt> {
    /// Destination for `V`.
    Value(&'out mut Value),
    /// Destination for `i`.
    Int(&'out mut i64),
    /// Destination for `d`.
    Float(&'out mut f64),
    /// Destination for `s`. The written `&str` is valid only for the call.
    Str(&'out mut &'rt str),
    /// Destination for `z`; none becomes `None`.
    OptStr(&'out mut Option<&'rt str>),
    /// Destination for `O`; none becomes `None`.
    Object(&'out mut Option<HeapId>),
    /// Destination for `O!`: the required class plus the object destination.
    ClassChecked {
        class: Type,
        out: &'out mut Option<HeapId>,
    },
    /// Destination for `N`: the presence flag plus the value destination.
    ///
    /// The flag is written whenever the binder reaches this parameter; the
    /// value is written only when the argument was actually supplied.
    PresenceValue {
        present: &'out mut bool,
        value: &'out mut Value,
    },
    /// Destination for `*`.
    Remainder(&'out mut TrailingArgs),
}

impl OutputSlot<'_, '_> {
    /// Whether this slot variant can receive the given specifier.
    fn accepts(&self, kind: ConvKind) -> bool {
        matches!(
            (self, kind),
            (Self::Value(_), ConvKind::Value)
                | (Self::Int(_), ConvKind::Int)
                | (Self::Float(_), ConvKind::Float)
                | (Self::Str(_), ConvKind::Str)
                | (Self::OptStr(_), ConvKind::StrOrNone)
                | (Self::Object(_), ConvKind::Object)
                | (Self::ClassChecked { .. }, ConvKind::ClassChecked)
                | (Self::PresenceValue { .. }, ConvKind::PresenceValue)
        )
    }
}

/// A failed binding, one variant per distinct failure condition.
///
/// `Spec` failures are host bugs and surface as internal errors; everything
/// else converts to a script-visible exception via [`BindError::into_run_error`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// Malformed format string or mismatched slot list.
    Spec(SpecError),
    /// A required parameter was supplied neither positionally nor by keyword.
    MissingRequiredArgument { param: String },
    /// More positional arguments than positional parameters, with no `*`.
    TooManyPositional { expected_max: usize, actual: usize },
    /// A keyword argument matching no declared parameter.
    UnexpectedKeyword { name: String },
    /// A keyword argument whose key is not a string.
    NonStringKeyword,
    /// A value of the wrong kind for its specifier.
    TypeMismatch {
        param: String,
        expected: &'static str,
        actual: Type,
    },
    /// A value failing the `O!` instance check.
    TypeMismatchClass {
        param: String,
        expected: Type,
        actual: Type,
    },
    /// A value of an acceptable kind whose magnitude cannot be represented.
    ConversionFailure { param: String, repr: String },
    /// The same parameter supplied both positionally and by keyword.
    DuplicateBinding { param: String },
}

impl BindError {
    /// Converts into the runtime error reported for the named function.
    #[must_use]
    pub fn into_run_error(self, func: &str) -> RunError {
        match self {
            Self::Spec(err) => RunError::internal(format!("{func}: {err}")),
            Self::MissingRequiredArgument { param } => {
                ExcType::type_error(format!("{func}() missing required argument: '{param}'"))
            }
            Self::TooManyPositional { expected_max, actual } => ExcType::type_error(format!(
                "{func}() takes at most {expected_max} positional argument{} ({actual} given)",
                if expected_max == 1 { "" } else { "s" },
            )),
            Self::UnexpectedKeyword { name } => ExcType::type_error_unexpected_keyword(func, &name),
            Self::NonStringKeyword => ExcType::type_error_kwargs_nonstring_key(),
            Self::TypeMismatch {
                param,
                expected,
                actual,
            } => ExcType::type_error(format!(
                "{func}() argument '{param}' must be {expected}, not {actual}"
            )),
            Self::TypeMismatchClass {
                param,
                expected,
                actual,
            } => ExcType::type_error(format!(
                "{func}() argument '{param}' must be {expected} or None, not {actual}"
            )),
            Self::ConversionFailure { param, repr } => SimpleException::new_msg(
                ExcType::OverflowError,
                format!("{func}() argument '{param}' is out of range ({repr})"),
            )
            .into(),
            Self::DuplicateBinding { param } => ExcType::type_error_duplicate_arg(func, &param),
        }
    }
}

impl From<SpecError> for BindError {
    fn from(err: SpecError) -> Self {
        Self::Spec(err)
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spec(err) => err.fmt(f),
            Self::MissingRequiredArgument { param } => {
                write!(f, "missing required argument: '{param}'")
            }
            Self::TooManyPositional { expected_max, actual } => {
                write!(f, "takes at most {expected_max} positional arguments ({actual} given)")
            }
            Self::UnexpectedKeyword { name } => {
                write!(f, "got an unexpected keyword argument '{name}'")
            }
            Self::NonStringKeyword => write!(f, "keywords must be strings"),
            Self::TypeMismatch {
                param,
                expected,
                actual,
            } => write!(f, "argument '{param}' must be {expected}, not {actual}"),
            Self::TypeMismatchClass {
                param,
                expected,
                actual,
            } => write!(f, "argument '{param}' must be {expected} or None, not {actual}"),
            Self::ConversionFailure { param, repr } => {
                write!(f, "argument '{param}' is out of range ({repr})")
            }
            Self::DuplicateBinding { param } => {
                write!(f, "got multiple values for argument '{param}'")
            }
        }
    }
}

impl std::error::Error for BindError {}

impl FormatSpec {
    /// Binds a call's arguments into the output slots.
    ///
    /// Sources each named parameter from the positional list or the keyword
    /// map, converts it according to its specifier, and writes the result.
    /// Optional parameters that were not supplied leave their slot untouched
    /// (presence flags are still written). See the module docs for the
    /// partial-write guarantee on failure.
    pub fn bind<'rt, T: ResourceTracker>(
        &self,
        names: &[&str],
        args: &ArgValues,
        outputs: &mut [OutputSlot<'_, 'rt>],
        heap: &'rt Heap<T>,
        interns: &'rt Interns,
    ) -> Result<(), BindError> {
        if names.len() != self.param_count() {
            return Err(SpecError::NameCountMismatch {
                specifiers: self.param_count(),
                names: names.len(),
            }
            .into());
        }
        self.validate_slots(outputs)?;

        let pos_count = args.pos_count();
        let capacity = self.positional_capacity();
        if !self.has_remainder() && pos_count > capacity {
            return Err(BindError::TooManyPositional {
                expected_max: capacity,
                actual: pos_count,
            });
        }

        // Slot index of named parameter `i`: the remainder slot, when
        // present, sits between the parameters before and after `*`.
        let slot_index = |i: usize| match self.remainder() {
            Some(r) if i >= r => i + 1,
            _ => i,
        };

        for (i, kind) in self.specs().iter().copied().enumerate() {
            // collect the remainder at its position in format order
            if self.remainder() == Some(i) {
                self.fill_remainder(&mut outputs[i], args, pos_count)?;
            }

            let name = names[i];
            let keyword = args.get_kwarg(name, heap, interns);
            let source = if i < pos_count.min(capacity) {
                if keyword.is_some() {
                    return Err(BindError::DuplicateBinding { param: name.to_owned() });
                }
                args.get_pos(i)
            } else {
                keyword
            };

            let slot = &mut outputs[slot_index(i)];
            match source {
                Some(value) => convert(kind, slot, value, name, heap, interns)?,
                None => {
                    if i < self.optional_start() {
                        return Err(BindError::MissingRequiredArgument { param: name.to_owned() });
                    }
                    // absent optional: leave the destination untouched, but
                    // presence flags are always reported
                    if let OutputSlot::PresenceValue { present, .. } = slot {
                        **present = false;
                    }
                }
            }
        }

        // a trailing '*' sits past every named parameter
        if self.remainder() == Some(self.param_count()) {
            let last = outputs.len() - 1;
            self.fill_remainder(&mut outputs[last], args, pos_count)?;
        }

        // every keyword must have matched a declared parameter; report the
        // first offender in call-site order
        for (key, _) in args.kwargs_iter() {
            let Some(key_name) = key.as_str(heap, interns) else {
                return Err(BindError::NonStringKeyword);
            };
            if !names.contains(&key_name) {
                return Err(BindError::UnexpectedKeyword {
                    name: key_name.to_owned(),
                });
            }
        }

        Ok(())
    }

    /// Fails fast when the slot list does not match the format string.
    fn validate_slots(&self, outputs: &[OutputSlot<'_, '_>]) -> Result<(), BindError> {
        let expected = self.param_count() + usize::from(self.has_remainder());
        if outputs.len() != expected {
            return Err(SpecError::SlotCountMismatch {
                expected,
                slots: outputs.len(),
            }
            .into());
        }
        let mut slots = outputs.iter().enumerate();
        for (i, kind) in self.specs().iter().copied().enumerate() {
            if self.remainder() == Some(i) {
                let (index, slot) = slots.next().expect("slot count validated");
                if !matches!(slot, OutputSlot::Remainder(_)) {
                    return Err(SpecError::SlotKindMismatch { index, specifier: "*" }.into());
                }
            }
            let (index, slot) = slots.next().expect("slot count validated");
            if !slot.accepts(kind) {
                return Err(SpecError::SlotKindMismatch {
                    index,
                    specifier: kind.token(),
                }
                .into());
            }
        }
        if let Some((index, slot)) = slots.next() {
            if !matches!(slot, OutputSlot::Remainder(_)) {
                return Err(SpecError::SlotKindMismatch { index, specifier: "*" }.into());
            }
        }
        Ok(())
    }

    /// Copies every positional argument past the named parameters into the
    /// remainder slot.
    fn fill_remainder(
        &self,
        slot: &mut OutputSlot<'_, '_>,
        args: &ArgValues,
        pos_count: usize,
    ) -> Result<(), BindError> {
        let start = self.positional_capacity();
        match slot {
            OutputSlot::Remainder(out) => {
                out.fill((start..pos_count).filter_map(|j| args.get_pos(j)));
                Ok(())
            }
            _ => Err(SpecError::SlotKindMismatch {
                index: self.remainder().unwrap_or(self.param_count()),
                specifier: "*",
            }
            .into()),
        }
    }
}

/// Converts one sourced value according to its specifier and writes it.
fn convert<'rt, T: ResourceTracker>(
    kind: ConvKind,
    slot: &mut OutputSlot<'_, 'rt>,
    value: Value,
    param: &str,
    heap: &'rt Heap<T>,
    interns: &'rt Interns,
) -> Result<(), BindError> {
    let mismatch = |expected: &'static str| BindError::TypeMismatch {
        param: param.to_owned(),
        expected,
        actual: value.type_of(heap),
    };

    match (kind, slot) {
        (ConvKind::Value, OutputSlot::Value(out)) => {
            **out = value;
            Ok(())
        }
        (ConvKind::PresenceValue, OutputSlot::PresenceValue { present, value: out }) => {
            **present = true;
            **out = value;
            Ok(())
        }
        (ConvKind::Int, OutputSlot::Int(out)) => {
            **out = match value {
                Value::Bool(b) => i64::from(b),
                Value::Int(i) => i,
                Value::Ref(id) => match heap.get(id) {
                    HeapData::LongInt(li) => li.to_i64().ok_or_else(|| BindError::ConversionFailure {
                        param: param.to_owned(),
                        repr: value.repr(heap, interns),
                    })?,
                    _ => return Err(mismatch("int")),
                },
                _ => return Err(mismatch("int")),
            };
            Ok(())
        }
        (ConvKind::Float, OutputSlot::Float(out)) => {
            **out = match value {
                Value::Bool(b) => f64::from(b),
                Value::Int(i) => i as f64,
                Value::Float(f) => f,
                Value::Ref(id) => match heap.get(id) {
                    HeapData::LongInt(li) => {
                        li.to_finite_f64().ok_or_else(|| BindError::ConversionFailure {
                            param: param.to_owned(),
                            repr: value.repr(heap, interns),
                        })?
                    }
                    _ => return Err(mismatch("float")),
                },
                _ => return Err(mismatch("float")),
            };
            Ok(())
        }
        (ConvKind::Str, OutputSlot::Str(out)) => {
            **out = value.as_str(heap, interns).ok_or_else(|| mismatch("str"))?;
            Ok(())
        }
        (ConvKind::StrOrNone, OutputSlot::OptStr(out)) => {
            **out = match value {
                Value::None => None,
                _ => Some(value.as_str(heap, interns).ok_or_else(|| mismatch("str or None"))?),
            };
            Ok(())
        }
        (ConvKind::Object, OutputSlot::Object(out)) => {
            **out = match value {
                Value::None => None,
                Value::Ref(id) => Some(id),
                _ => return Err(mismatch("a heap object or None")),
            };
            Ok(())
        }
        (ConvKind::ClassChecked, OutputSlot::ClassChecked { class, out }) => {
            let class = *class;
            **out = match value {
                Value::None => None,
                Value::Ref(id) if heap.get(id).type_of().is_instance_of(class) => Some(id),
                _ => {
                    return Err(BindError::TypeMismatchClass {
                        param: param.to_owned(),
                        expected: class,
                        actual: value.type_of(heap),
                    });
                }
            };
            Ok(())
        }
        // slot kinds were validated before binding started
        (kind, _) => Err(SpecError::SlotKindMismatch {
            index: 0,
            specifier: kind.token(),
        }
        .into()),
    }
}

/// Parses a format string and binds a call's arguments in one step.
///
/// This is the call shape native functions use at their entry point. `func`
/// names the function for diagnostics. On failure the native function should
/// propagate the error immediately and perform no further work.
pub fn parse_args<'rt, T: ResourceTracker>(
    func: &str,
    format: &str,
    names: &[&str],
    args: &ArgValues,
    outputs: &mut [OutputSlot<'_, 'rt>],
    heap: &'rt Heap<T>,
    interns: &'rt Interns,
) -> RunResult<()> {
    let spec = FormatSpec::parse(format, names).map_err(|err| BindError::from(err).into_run_error(func))?;
    spec.bind(names, args, outputs, heap, interns)
        .map_err(|err| err.into_run_error(func))
}
