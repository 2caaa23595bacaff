//! Declaration IR.
//!
//! The emitter first lowers a [`model::Service`] into these plain
//! declarations and then prints them. Everything here is already resolved:
//! identifiers are final, types are mapped and docs are rendered, so the
//! printer makes no decisions of its own.

use model::RustType;

use crate::protocol::Protocol;

/// The generated client module.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientDecl {
    /// Client type name, e.g. `CloudTrail`.
    pub name: String,
    /// Display name of the service.
    pub full_name: String,
    /// Rendered module documentation (`//!` lines, without the prefix).
    pub docs: String,
    /// Path of the runtime crate the generated code calls into.
    pub runtime: String,
    /// Wire protocol.
    pub protocol: Protocol,
    /// Service name the endpoint is looked up with.
    pub endpoint_prefix: String,
    /// Protocol settings passed to the transport client, as
    /// `(field, value)` pairs.
    pub settings: Vec<(&'static str, String)>,
    /// One method per operation, sorted by operation name.
    pub methods: Vec<MethodDecl>,
    /// Request/response types, sorted by type name.
    pub structs: Vec<StructDecl>,
}

/// One client method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    /// Rust method name.
    pub ident: String,
    /// Operation name as sent on the wire.
    pub op_name: String,
    /// Rendered `///` doc block.
    pub docs: String,
    /// HTTP method.
    pub http_method: String,
    /// Request URI template.
    pub request_uri: String,
    /// Request type, if the operation takes input.
    pub input: Option<String>,
    /// Response type, if the operation returns output.
    pub output: Option<String>,
}

/// One generated struct.
#[derive(Debug, Clone, PartialEq)]
pub struct StructDecl {
    /// Type name.
    pub name: String,
    /// Rendered `///` doc block.
    pub docs: String,
    /// Element name the whole struct is serialized under, if any.
    pub rename: Option<String>,
    /// Fields, sorted by wire member name.
    pub fields: Vec<FieldDecl>,
}

/// One struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecl {
    /// Rust field name.
    pub ident: String,
    /// Name on the wire.
    pub wire_name: String,
    /// Field type, `Option<_>` for members that may be absent.
    pub ty: RustType,
    /// Rendered `///` doc block; empty when the member is undocumented.
    pub docs: String,
}
