//! Format-string scanning for native argument binding.
//!
//! A format string describes the expected shape of a native function's
//! parameters, one character per parameter:
//!
//! | token | meaning |
//! |---|---|
//! | `V` | any value, no conversion |
//! | `i` | integer-convertible, delivered as `i64` |
//! | `d` | float-convertible, delivered as `f64` |
//! | `s` | string, delivered as a borrowed `&str` |
//! | `z` | string or none |
//! | `O` | heap object or none |
//! | `N` | any value paired with a "was provided" flag; may be written `N?` |
//! | `*` | collects trailing positional arguments; consumes no parameter name |
//! | `!` | modifier after `O`: require an instance of a caller-supplied class |
//! | `\|` | marker: parameters after this point are optional |
//! | `$` | marker: parameters after this point are keyword-only |
//!
//! Named parameters after `*` are keyword-only, as in a `def f(a, *args, b)`
//! signature. The scanner validates the parameter-name list length against
//! the named specifier count up front, so a mismatch is caught before any
//! argument is examined.

use smallvec::SmallVec;
use std::fmt;

/// Conversion applied to one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvKind {
    /// `V`: any value.
    Value,
    /// `i`: integer-convertible.
    Int,
    /// `d`: float-convertible.
    Float,
    /// `s`: string.
    Str,
    /// `z`: string or none.
    StrOrNone,
    /// `O`: heap object or none.
    Object,
    /// `O!`: heap object checked against a caller-supplied class, or none.
    ClassChecked,
    /// `N`: any value plus a presence flag.
    PresenceValue,
}

impl ConvKind {
    /// The specifier spelling, for diagnostics.
    pub(crate) fn token(self) -> &'static str {
        match self {
            Self::Value => "V",
            Self::Int => "i",
            Self::Float => "d",
            Self::Str => "s",
            Self::StrOrNone => "z",
            Self::Object => "O",
            Self::ClassChecked => "O!",
            Self::PresenceValue => "N",
        }
    }
}

/// A parsed format string.
///
/// `specs` holds the named specifiers in order. The markers are indices into
/// that ordering: parameters at `optional_start` and later are optional,
/// parameters at `kwonly_start` and later cannot be supplied positionally,
/// and `remainder` records where `*` occurred (if anywhere).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    specs: SmallVec<[ConvKind; 8]>,
    optional_start: usize,
    kwonly_start: usize,
    remainder: Option<usize>,
}

impl FormatSpec {
    /// Scans a format string, validating it against the parameter names.
    pub fn parse(format: &str, names: &[&str]) -> Result<Self, SpecError> {
        let mut specs: SmallVec<[ConvKind; 8]> = SmallVec::new();
        let mut optional_start = None;
        let mut kwonly_start = None;
        let mut remainder = None;

        for c in format.chars() {
            match c {
                'V' => specs.push(ConvKind::Value),
                'i' => specs.push(ConvKind::Int),
                'd' => specs.push(ConvKind::Float),
                's' => specs.push(ConvKind::Str),
                'z' => specs.push(ConvKind::StrOrNone),
                'O' => specs.push(ConvKind::Object),
                'N' => specs.push(ConvKind::PresenceValue),
                '!' => match specs.last_mut() {
                    Some(last @ ConvKind::Object) => *last = ConvKind::ClassChecked,
                    _ => return Err(SpecError::MisplacedTypeCheck),
                },
                '?' => {
                    if specs.last() != Some(&ConvKind::PresenceValue) {
                        return Err(SpecError::MisplacedPresenceMarker);
                    }
                    // `N` always pairs a presence flag; `?` just spells it out
                }
                '|' => {
                    if optional_start.replace(specs.len()).is_some() {
                        return Err(SpecError::DuplicateMarker('|'));
                    }
                }
                '$' => {
                    if kwonly_start.replace(specs.len()).is_some() {
                        return Err(SpecError::DuplicateMarker('$'));
                    }
                }
                '*' => {
                    if remainder.is_some() {
                        return Err(SpecError::DuplicateMarker('*'));
                    }
                    if kwonly_start.is_some_and(|k| k <= specs.len()) {
                        return Err(SpecError::RemainderAfterKeywordOnly);
                    }
                    remainder = Some(specs.len());
                }
                c => return Err(SpecError::UnknownSpecifier(c)),
            }
        }

        if names.len() != specs.len() {
            return Err(SpecError::NameCountMismatch {
                specifiers: specs.len(),
                names: names.len(),
            });
        }

        Ok(Self {
            optional_start: optional_start.unwrap_or(specs.len()),
            kwonly_start: kwonly_start.unwrap_or(specs.len()),
            remainder,
            specs,
        })
    }

    /// The named specifiers in order.
    pub(crate) fn specs(&self) -> &[ConvKind] {
        &self.specs
    }

    /// Number of named parameters.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.specs.len()
    }

    /// Index of the first optional parameter.
    pub(crate) fn optional_start(&self) -> usize {
        self.optional_start
    }

    /// Position of the `*` specifier, if present.
    pub(crate) fn remainder(&self) -> Option<usize> {
        self.remainder
    }

    /// Whether trailing positional arguments are collected by `*`.
    #[must_use]
    pub fn has_remainder(&self) -> bool {
        self.remainder.is_some()
    }

    /// Number of parameters that may be supplied positionally.
    ///
    /// Parameters after `$` or `*` are keyword-only.
    pub(crate) fn positional_capacity(&self) -> usize {
        let cap = self.kwonly_start.min(self.specs.len());
        match self.remainder {
            Some(r) => r.min(cap),
            None => cap,
        }
    }
}

/// A malformed format string or a mismatched output-slot list.
///
/// These are host programming errors, not script errors: they surface as
/// internal errors rather than script exceptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// A character that is not a specifier, modifier, or marker.
    UnknownSpecifier(char),
    /// `!` not directly after `O`.
    MisplacedTypeCheck,
    /// `?` not directly after `N`.
    MisplacedPresenceMarker,
    /// A `|`, `$`, or `*` appearing twice.
    DuplicateMarker(char),
    /// `*` after the `$` marker; the remainder collects positional arguments
    /// so it cannot sit in the keyword-only section.
    RemainderAfterKeywordOnly,
    /// Parameter-name list length differs from the named specifier count.
    NameCountMismatch { specifiers: usize, names: usize },
    /// Output-slot list length differs from the expected slot count.
    SlotCountMismatch { expected: usize, slots: usize },
    /// Output slot at `index` has the wrong variant for its specifier.
    SlotKindMismatch { index: usize, specifier: &'static str },
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSpecifier(c) => write!(f, "unknown format specifier {c:?}"),
            Self::MisplacedTypeCheck => write!(f, "'!' must directly follow 'O'"),
            Self::MisplacedPresenceMarker => write!(f, "'?' must directly follow 'N'"),
            Self::DuplicateMarker(c) => write!(f, "duplicate {c:?} in format string"),
            Self::RemainderAfterKeywordOnly => write!(f, "'*' cannot appear after '$'"),
            Self::NameCountMismatch { specifiers, names } => write!(
                f,
                "format string has {specifiers} named specifiers but {names} parameter names were supplied"
            ),
            Self::SlotCountMismatch { expected, slots } => write!(
                f,
                "format string requires {expected} output slots but {slots} were supplied"
            ),
            Self::SlotKindMismatch { index, specifier } => write!(
                f,
                "output slot {index} does not match format specifier '{specifier}'"
            ),
        }
    }
}

impl std::error::Error for SpecError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_required_specs() {
        let spec = FormatSpec::parse("Vis", &["a", "b", "c"]).unwrap();
        assert_eq!(spec.specs(), [ConvKind::Value, ConvKind::Int, ConvKind::Str]);
        assert_eq!(spec.optional_start(), 3);
        assert_eq!(spec.positional_capacity(), 3);
        assert!(!spec.has_remainder());
    }

    #[test]
    fn parses_markers_and_modifiers() {
        let spec = FormatSpec::parse("O!|z$d", &["a", "b", "c"]).unwrap();
        assert_eq!(
            spec.specs(),
            [ConvKind::ClassChecked, ConvKind::StrOrNone, ConvKind::Float]
        );
        assert_eq!(spec.optional_start(), 1);
        assert_eq!(spec.positional_capacity(), 2);
    }

    #[test]
    fn parses_presence_and_remainder() {
        let spec = FormatSpec::parse("Vi|N?*", &["a", "b", "c"]).unwrap();
        assert_eq!(
            spec.specs(),
            [ConvKind::Value, ConvKind::Int, ConvKind::PresenceValue]
        );
        assert_eq!(spec.optional_start(), 2);
        assert_eq!(spec.remainder(), Some(3));
        // all three named params precede '*', so all are positional-capable
        assert_eq!(spec.positional_capacity(), 3);
    }

    #[test]
    fn remainder_makes_following_params_keyword_only() {
        let spec = FormatSpec::parse("V*i", &["a", "b"]).unwrap();
        assert_eq!(spec.positional_capacity(), 1);
        assert_eq!(spec.remainder(), Some(1));
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!(
            FormatSpec::parse("x", &["a"]),
            Err(SpecError::UnknownSpecifier('x'))
        );
        assert_eq!(FormatSpec::parse("i!", &["a"]), Err(SpecError::MisplacedTypeCheck));
        assert_eq!(FormatSpec::parse("V?", &["a"]), Err(SpecError::MisplacedPresenceMarker));
        assert_eq!(FormatSpec::parse("V||", &["a"]), Err(SpecError::DuplicateMarker('|')));
        assert_eq!(FormatSpec::parse("$V*", &["a"]), Err(SpecError::RemainderAfterKeywordOnly));
        assert_eq!(
            FormatSpec::parse("Vi", &["a"]),
            Err(SpecError::NameCountMismatch { specifiers: 2, names: 1 })
        );
    }
}
