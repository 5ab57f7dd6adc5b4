//! Runtime type tags.

use strum::{Display, EnumString, IntoStaticStr};

/// The runtime type of a value.
///
/// This enum doubles as the class registry for type-checked argument
/// specifiers: a host passes a `Type` alongside a class-checked output slot
/// and the binder verifies the supplied object is an instance of it.
///
/// Uses strum derives so the script-level spelling (`"int"`, `"dict"`, ...)
/// is available both for display and parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Type {
    #[strum(serialize = "NoneType")]
    NoneType,
    Bool,
    Int,
    Float,
    Str,
    List,
    Dict,
}

impl Type {
    /// Instance-of check used by class-checked argument specifiers.
    ///
    /// `bool` is a subclass of `int`; every other type matches only itself.
    #[must_use]
    pub fn is_instance_of(self, expected: Self) -> bool {
        self == expected || (self == Self::Bool && expected == Self::Int)
    }

    /// The script-level type name as a static string.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}
