//! Runtime object types stored on the value heap.

pub mod dict;
pub mod list;
pub mod long_int;
pub mod str;
pub mod r#type;

pub use dict::{Dict, DictIter};
pub use list::List;
pub use long_int::LongInt;
pub use r#type::Type;
pub use str::Str;

pub(crate) use str::string_repr_fmt;
