//! The runtime value representation.
//!
//! `Value` uses a hybrid design: small immediate values (ints, floats, bools,
//! none) are stored inline, while heap-allocated objects live in the arena and
//! are referenced via `Ref(HeapId)`. Values are cheap `Copy` handles — copying
//! one never copies heap content and never transfers ownership, which is what
//! lets native code pass them around freely while the runtime's heap retains
//! sole ownership of the underlying objects.

use std::fmt::{self, Write};

use num_traits::FromPrimitive;

use crate::{
    hashing::{NONE_HASH, float_hash, int_hash, str_hash},
    heap::{Heap, HeapData, HeapId},
    intern::{Interns, StringId},
    resource::ResourceTracker,
    types::{Type, string_repr_fmt},
};

/// Primary value type representing script objects at runtime.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub enum Value {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// An interned string. The id references the string in the interner.
    InternString(StringId),
    /// A heap-allocated object.
    Ref(HeapId),
}

impl Value {
    /// The runtime type of this value.
    #[must_use]
    pub fn type_of(&self, heap: &Heap<impl ResourceTracker>) -> Type {
        match self {
            Self::None => Type::NoneType,
            Self::Bool(_) => Type::Bool,
            Self::Int(_) => Type::Int,
            Self::Float(_) => Type::Float,
            Self::InternString(_) => Type::Str,
            Self::Ref(id) => heap.get(*id).type_of(),
        }
    }

    /// The script-level type name, for diagnostics.
    #[must_use]
    pub fn type_name(&self, heap: &Heap<impl ResourceTracker>) -> &'static str {
        self.type_of(heap).name()
    }

    /// Returns the string content if this value is a string.
    ///
    /// The returned slice borrows from the heap or the interner and is valid
    /// only while those borrows live — i.e. for the duration of the current
    /// native call.
    #[must_use]
    pub fn as_str<'rt>(
        &self,
        heap: &'rt Heap<impl ResourceTracker>,
        interns: &'rt Interns,
    ) -> Option<&'rt str> {
        match self {
            Self::InternString(id) => Some(interns.get_str(*id)),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => Some(s.as_str()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Builds the script-level repr of this value.
    #[must_use]
    pub fn repr(&self, heap: &Heap<impl ResourceTracker>, interns: &Interns) -> String {
        let mut out = String::new();
        self.repr_fmt(&mut out, heap, interns).expect("writing to String cannot fail");
        out
    }

    fn repr_fmt(
        &self,
        f: &mut impl Write,
        heap: &Heap<impl ResourceTracker>,
        interns: &Interns,
    ) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => f.write_str(&float_repr(*v)),
            Self::InternString(id) => string_repr_fmt(interns.get_str(*id), f),
            Self::Ref(id) => match heap.get(*id) {
                HeapData::Str(s) => string_repr_fmt(s.as_str(), f),
                HeapData::LongInt(li) => write!(f, "{li}"),
                HeapData::List(list) => {
                    f.write_char('[')?;
                    for (i, item) in list.into_iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        item.repr_fmt(f, heap, interns)?;
                    }
                    f.write_char(']')
                }
                HeapData::Dict(dict) => {
                    f.write_char('{')?;
                    for (i, (key, value)) in dict.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        key.repr_fmt(f, heap, interns)?;
                        f.write_str(": ")?;
                        value.repr_fmt(f, heap, interns)?;
                    }
                    f.write_char('}')
                }
            },
        }
    }

    /// Equality following script semantics: numeric values compare across
    /// int/bool/float, strings compare by content regardless of interning.
    /// Containers compare by identity here — full deep equality belongs to
    /// the interpreter, and dict keys are never containers.
    #[must_use]
    pub(crate) fn equals(
        self,
        other: Self,
        heap: &Heap<impl ResourceTracker>,
        interns: &Interns,
    ) -> bool {
        if let (Some(a), Some(b)) = (self.as_str(heap, interns), other.as_str(heap, interns)) {
            return a == b;
        }
        if let (Some(a), Some(b)) = (self.numeric_value(heap), other.numeric_value(heap)) {
            return a.eq_mixed(&b);
        }
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Ref(a), Self::Ref(b)) => a == b,
            _ => false,
        }
    }

    /// Numeric view used for cross-type equality.
    fn numeric_value(self, heap: &Heap<impl ResourceTracker>) -> Option<NumericKey<'_>> {
        match self {
            Self::Bool(b) => Some(NumericKey::Int(i64::from(b))),
            Self::Int(i) => Some(NumericKey::Int(i)),
            Self::Float(f) => Some(NumericKey::Float(f)),
            Self::Ref(id) => match heap.get(id) {
                // demote when the host allocated a LongInt that fits i64
                HeapData::LongInt(li) => Some(match li.to_i64() {
                    Some(small) => NumericKey::Int(small),
                    None => NumericKey::Big(li.inner()),
                }),
                _ => None,
            },
            _ => None,
        }
    }

    /// Hash used for dict keys.
    ///
    /// Returns `None` for unhashable types (list, dict).
    #[must_use]
    pub(crate) fn key_hash(
        self,
        heap: &Heap<impl ResourceTracker>,
        interns: &Interns,
    ) -> Option<u64> {
        match self {
            Self::None => Some(NONE_HASH),
            Self::Bool(b) => Some(int_hash(i64::from(b))),
            Self::Int(i) => Some(int_hash(i)),
            Self::Float(f) => Some(float_hash(f)),
            Self::InternString(id) => Some(str_hash(interns.get_str(id))),
            Self::Ref(id) => match heap.get(id) {
                HeapData::Str(s) => Some(str_hash(s.as_str())),
                HeapData::LongInt(li) => Some(li.hash()),
                HeapData::List(_) | HeapData::Dict(_) => None,
            },
        }
    }
}

/// Comparison key for cross-type numeric equality.
enum NumericKey<'a> {
    Int(i64),
    Float(f64),
    /// A big integer outside the i64 range.
    Big(&'a num_bigint::BigInt),
}

impl NumericKey<'_> {
    fn eq_mixed(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => (*a as f64) == *b,
            (Self::Big(a), Self::Big(b)) => a == b,
            // an integral float beyond the i64 range can still equal a big
            // integer; a Big never equals an i64 at that magnitude
            (Self::Big(bi), Self::Float(f)) | (Self::Float(f), Self::Big(bi)) => {
                f.is_finite()
                    && *f == f.trunc()
                    && num_bigint::BigInt::from_f64(*f).as_ref() == Some(*bi)
            }
            _ => false,
        }
    }
}

/// Returns a string representation of a float matching the script's `repr`.
///
/// Uses the `ryu` crate, which produces the shortest decimal representation
/// that round-trips through `f64` parsing. Key behaviors:
/// - special values render as `inf`, `-inf`, `nan` (lowercase)
/// - integral values keep a trailing `.0`
/// - positive exponents gain an explicit sign (`1e+20`)
pub(crate) fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f.is_sign_negative() {
            "-inf".to_string()
        } else {
            "inf".to_string()
        };
    }

    let mut buffer = ryu::Buffer::new();
    let s = buffer.format(f);
    fix_ryu_exponent(s)
}

/// Fixes ryu's exponent format: `1e20` becomes `1e+20`.
fn fix_ryu_exponent(s: &str) -> String {
    if let Some(e_pos) = s.find('e') {
        let (mantissa, exp_part) = s.split_at(e_pos);
        let exp = &exp_part[1..];
        if !exp.starts_with('-') {
            return format!("{mantissa}e+{exp}");
        }
    }
    s.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::NoLimitTracker;

    #[test]
    fn float_repr_matches_script_conventions() {
        assert_eq!(float_repr(3.0), "3.0");
        assert_eq!(float_repr(-0.5), "-0.5");
        assert_eq!(float_repr(1e20), "1e+20");
        assert_eq!(float_repr(1e-7), "1e-7");
        assert_eq!(float_repr(f64::NAN), "nan");
        assert_eq!(float_repr(f64::NEG_INFINITY), "-inf");
    }

    #[test]
    fn repr_covers_all_shapes() {
        let mut heap = Heap::new(NoLimitTracker);
        let mut interns = Interns::new();
        let s = Value::InternString(interns.intern("it's"));
        assert_eq!(Value::None.repr(&heap, &interns), "None");
        assert_eq!(Value::Bool(true).repr(&heap, &interns), "True");
        assert_eq!(Value::Int(-3).repr(&heap, &interns), "-3");
        assert_eq!(s.repr(&heap, &interns), "\"it's\"");

        let list = heap.allocate_list(vec![Value::Int(1), s]).unwrap();
        assert_eq!(list.repr(&heap, &interns), "[1, \"it's\"]");
    }

    #[test]
    fn cross_type_numeric_equality() {
        let heap: Heap<NoLimitTracker> = Heap::new(NoLimitTracker);
        let interns = Interns::new();
        assert!(Value::Int(1).equals(Value::Bool(true), &heap, &interns));
        assert!(Value::Int(2).equals(Value::Float(2.0), &heap, &interns));
        assert!(!Value::Int(2).equals(Value::Float(2.5), &heap, &interns));
        assert!(!Value::None.equals(Value::Int(0), &heap, &interns));
    }

    #[test]
    fn string_equality_ignores_interning() {
        let mut heap = Heap::new(NoLimitTracker);
        let mut interns = Interns::new();
        let interned = Value::InternString(interns.intern("abc"));
        let heaped = heap.allocate_str("abc").unwrap();
        assert!(interned.equals(heaped, &heap, &interns));
    }
}
