//! Emitted Rust types.

use std::fmt;

/// The Rust type a shape maps to in generated code.
///
/// `Display` renders the type as it appears in emitted source. Paths are
/// absolute, so generated structs named `Option` or `String` cannot shadow
/// them and generated files need no imports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RustType {
    /// A generated struct, by exported name.
    Named(String),
    /// `i64`, for both `integer` and `long` shapes.
    I64,
    /// `f64`.
    F64,
    /// `String`.
    String,
    /// `bool`.
    Bool,
    /// `Vec<u8>`.
    Bytes,
    /// `chrono::DateTime<chrono::Utc>`.
    Timestamp,
    /// `Vec<T>`.
    List(Box<RustType>),
    /// `std::collections::HashMap<K, V>`.
    Map(Box<RustType>, Box<RustType>),
    /// `Option<T>`, for members that may be absent on the wire.
    Optional(Box<RustType>),
    /// `Box<T>`, for members that lead back to their own struct.
    Boxed(Box<RustType>),
}

impl RustType {
    /// Wraps `self` in `Option`.
    pub fn optional(self) -> Self { RustType::Optional(Box::new(self)) }

    /// Wraps `self` in `Box`.
    pub fn boxed(self) -> Self { RustType::Boxed(Box::new(self)) }

    /// Whether this is `Option<_>`.
    pub fn is_optional(&self) -> bool { matches!(self, RustType::Optional(_)) }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RustType::Named(name) => f.write_str(name),
            RustType::I64 => f.write_str("i64"),
            RustType::F64 => f.write_str("f64"),
            RustType::String => f.write_str("::std::string::String"),
            RustType::Bool => f.write_str("bool"),
            RustType::Bytes => f.write_str("::std::vec::Vec<u8>"),
            RustType::Timestamp => f.write_str("::chrono::DateTime<::chrono::Utc>"),
            RustType::List(inner) => write!(f, "::std::vec::Vec<{inner}>"),
            RustType::Map(key, value) => write!(f, "::std::collections::HashMap<{key}, {value}>"),
            RustType::Optional(inner) => write!(f, "::std::option::Option<{inner}>"),
            RustType::Boxed(inner) => write!(f, "::std::boxed::Box<{inner}>"),
        }
    }
}
