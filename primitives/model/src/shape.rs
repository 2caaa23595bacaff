//! Shapes, shape references and the type mapping.

use std::collections::{BTreeMap, BTreeSet};

use normalization::exportable;

use crate::raw::{RawShape, RawShapeRef};
use crate::{ModelError, Result, RustType, Service};

/// A by-name link to a shape in the owning service's registry.
///
/// Holding only the name keeps the graph acyclic in memory no matter how the
/// shapes refer to each other; the target is looked up on every read through
/// [`Service::resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShapeRef {
    /// Name of the referenced shape.
    pub shape: String,
    /// Documentation local to this use of the shape.
    pub documentation: String,
    /// Where the value travels (`uri`, `querystring`, `header`, ...), if not the body.
    pub location: String,
    /// Wire name when it differs from the member name.
    pub location_name: String,
    /// Whether the value is wrapped on the wire.
    pub wrapper: bool,
    /// Name of the element wrapping an operation result (query protocol).
    pub result_wrapper: String,
    /// Whether the value is a byte stream.
    pub streaming: bool,
}

impl ShapeRef {
    /// A reference to `shape` with no local overrides.
    pub fn to(shape: impl Into<String>) -> Self {
        ShapeRef { shape: shape.into(), ..ShapeRef::default() }
    }
}

impl From<RawShapeRef> for ShapeRef {
    fn from(raw: RawShapeRef) -> Self {
        ShapeRef {
            shape: raw.shape,
            documentation: raw.documentation,
            location: raw.location,
            location_name: raw.location_name,
            wrapper: raw.wrapper,
            result_wrapper: raw.result_wrapper,
            streaming: raw.streaming,
        }
    }
}

/// Members of a structure shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureShape {
    /// Member name → referenced shape.
    pub members: BTreeMap<String, ShapeRef>,
    /// Names of members that must be present.
    pub required: BTreeSet<String>,
    /// Member carried as the HTTP payload, for REST protocols.
    pub payload: Option<String>,
}

/// The kind of a shape, with the references that kind carries.
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeKind {
    /// A record with named members.
    Structure(StructureShape),
    /// An ordered sequence.
    List {
        /// Element shape.
        member: ShapeRef,
    },
    /// A key/value mapping.
    Map {
        /// Key shape.
        key: ShapeRef,
        /// Value shape.
        value: ShapeRef,
    },
    /// UTF-8 text.
    String,
    /// 32-bit integer on the wire.
    Integer,
    /// 64-bit integer on the wire.
    Long,
    /// Double-precision float.
    Double,
    /// Boolean.
    Boolean,
    /// Raw bytes.
    Blob,
    /// Point in time.
    Timestamp,
}

impl ShapeKind {
    /// The kind as spelled in the description document.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Structure(_) => "structure",
            ShapeKind::List { .. } => "list",
            ShapeKind::Map { .. } => "map",
            ShapeKind::String => "string",
            ShapeKind::Integer => "integer",
            ShapeKind::Long => "long",
            ShapeKind::Double => "double",
            ShapeKind::Boolean => "boolean",
            ShapeKind::Blob => "blob",
            ShapeKind::Timestamp => "timestamp",
        }
    }
}

/// Error metadata attached to exception shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Service error code.
    pub code: String,
    /// HTTP status the error is returned with.
    pub http_status_code: u16,
    /// Whether the caller is at fault.
    pub sender_fault: bool,
}

/// A named type definition.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    /// Registry key of this shape.
    pub name: String,
    /// Kind and kind-specific references.
    pub kind: ShapeKind,
    /// Raw (HTML) documentation.
    pub documentation: String,
    /// Lower bound on length or value.
    pub min: Option<f64>,
    /// Upper bound on length or value.
    pub max: Option<f64>,
    /// Regular expression string values must match.
    pub pattern: Option<String>,
    /// Whether this structure describes an error response.
    pub exception: bool,
    /// Error metadata for exception shapes.
    pub error: Option<ErrorInfo>,
    /// Whether values must not be logged.
    pub sensitive: bool,
    /// Whether the shape is wrapped on the wire.
    pub wrapper: bool,
}

impl Shape {
    /// A shape of the given kind with every other attribute defaulted.
    pub fn new(name: impl Into<String>, kind: ShapeKind) -> Self {
        Shape {
            name: name.into(),
            kind,
            documentation: String::new(),
            min: None,
            max: None,
            pattern: None,
            exception: false,
            error: None,
            sensitive: false,
            wrapper: false,
        }
    }

    pub(crate) fn from_raw(name: String, raw: RawShape) -> Result<Self> {
        let kind = match raw.kind.as_str() {
            "structure" => ShapeKind::Structure(StructureShape {
                members: raw.members.into_iter().map(|(k, v)| (k, v.into())).collect(),
                required: raw.required.into_iter().collect(),
                payload: raw.payload,
            }),
            "list" => ShapeKind::List {
                member: raw
                    .member
                    .ok_or_else(|| missing(&name, "list", "member"))?
                    .into(),
            },
            "map" => ShapeKind::Map {
                key: raw.key.ok_or_else(|| missing(&name, "map", "key"))?.into(),
                value: raw.value.ok_or_else(|| missing(&name, "map", "value"))?.into(),
            },
            "string" => ShapeKind::String,
            "integer" => ShapeKind::Integer,
            "long" => ShapeKind::Long,
            "double" => ShapeKind::Double,
            "boolean" => ShapeKind::Boolean,
            "blob" => ShapeKind::Blob,
            "timestamp" => ShapeKind::Timestamp,
            other => {
                return Err(ModelError::UnknownShapeKind { shape: name, kind: other.to_string() })
            }
        };

        Ok(Shape {
            name,
            kind,
            documentation: raw.documentation,
            min: raw.min,
            max: raw.max,
            pattern: raw.pattern,
            exception: raw.exception,
            error: raw.error.map(|e| ErrorInfo {
                code: e.code,
                http_status_code: e.http_status_code,
                sender_fault: e.sender_fault,
            }),
            sensitive: raw.sensitive,
            wrapper: raw.wrapper,
        })
    }

    /// Public type name of this shape.
    pub fn exported_name(&self) -> String { exportable(&self.name) }

    /// Whether this is a structure shape.
    pub fn is_structure(&self) -> bool { matches!(self.kind, ShapeKind::Structure(_)) }

    /// Structure details, if this is a structure.
    pub fn as_structure(&self) -> Option<&StructureShape> {
        match &self.kind {
            ShapeKind::Structure(s) => Some(s),
            _ => None,
        }
    }

    /// Whether `member` is in this structure's required set.
    pub fn is_required(&self, member: &str) -> bool {
        self.as_structure().is_some_and(|s| s.required.contains(member))
    }

    /// Every reference held by this shape, labelled for error messages.
    pub fn references(&self) -> Vec<(String, &ShapeRef)> {
        match &self.kind {
            ShapeKind::Structure(s) => s
                .members
                .iter()
                .map(|(name, r)| (format!("member {name} of shape {}", self.name), r))
                .collect(),
            ShapeKind::List { member } => vec![(format!("list {} member", self.name), member)],
            ShapeKind::Map { key, value } => vec![
                (format!("map {} key", self.name), key),
                (format!("map {} value", self.name), value),
            ],
            _ => Vec::new(),
        }
    }

    /// Resolves the members of a structure, sorted by name.
    ///
    /// The projection is rebuilt on every call from the member references and
    /// the required set; nothing is cached. Non-structures have no members.
    pub fn members<'a>(&'a self, service: &'a Service) -> Result<Vec<Member<'a>>> {
        let Some(structure) = self.as_structure() else {
            return Ok(Vec::new());
        };

        structure
            .members
            .iter()
            .map(|(name, shape_ref)| {
                let shape = service
                    .resolve_in(|| format!("member {name} of shape {}", self.name), shape_ref)?;
                Ok(Member {
                    name: name.as_str(),
                    shape_ref,
                    shape,
                    required: structure.required.contains(name),
                })
            })
            .collect()
    }

    /// Element shape of a list.
    pub fn list_member<'a>(&'a self, service: &'a Service) -> Result<Option<&'a Shape>> {
        match &self.kind {
            ShapeKind::List { member } => service
                .resolve_in(|| format!("list {} member", self.name), member)
                .map(Some),
            _ => Ok(None),
        }
    }

    /// Key shape of a map.
    pub fn map_key<'a>(&'a self, service: &'a Service) -> Result<Option<&'a Shape>> {
        match &self.kind {
            ShapeKind::Map { key, .. } => {
                service.resolve_in(|| format!("map {} key", self.name), key).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Value shape of a map.
    pub fn map_value<'a>(&'a self, service: &'a Service) -> Result<Option<&'a Shape>> {
        match &self.kind {
            ShapeKind::Map { value, .. } => {
                service.resolve_in(|| format!("map {} value", self.name), value).map(Some)
            }
            _ => Ok(None),
        }
    }

    /// Maps this shape to the Rust type used in generated code.
    ///
    /// Structures map to their exported name without looking at their
    /// members, so reference cycles through structures end there. A list or
    /// map that contains itself with no structure in between has no finite
    /// type and is reported as [`ModelError::UnboundedType`].
    pub fn rust_type(&self, service: &Service) -> Result<RustType> {
        let mut expanding = Vec::new();
        self.rust_type_inner(service, &mut expanding)
    }

    fn rust_type_inner<'a>(
        &'a self,
        service: &'a Service,
        expanding: &mut Vec<&'a str>,
    ) -> Result<RustType> {
        let ty = match &self.kind {
            ShapeKind::Structure(_) => RustType::Named(self.exported_name()),
            ShapeKind::Integer | ShapeKind::Long => RustType::I64,
            ShapeKind::Double => RustType::F64,
            ShapeKind::String => RustType::String,
            ShapeKind::Boolean => RustType::Bool,
            ShapeKind::Blob => RustType::Bytes,
            ShapeKind::Timestamp => RustType::Timestamp,
            ShapeKind::List { member } => {
                RustType::List(Box::new(self.expand(service, "member", member, expanding)?))
            }
            ShapeKind::Map { key, value } => RustType::Map(
                Box::new(self.expand(service, "key", key, expanding)?),
                Box::new(self.expand(service, "value", value, expanding)?),
            ),
        };
        Ok(ty)
    }

    fn expand<'a>(
        &'a self,
        service: &'a Service,
        role: &str,
        element: &'a ShapeRef,
        expanding: &mut Vec<&'a str>,
    ) -> Result<RustType> {
        if expanding.contains(&self.name.as_str()) {
            return Err(ModelError::UnboundedType { shape: self.name.clone() });
        }
        let target = service.resolve_in(
            || format!("{} {} {role}", self.kind.as_str(), self.name),
            element,
        )?;

        expanding.push(&self.name);
        let ty = target.rust_type_inner(service, expanding);
        expanding.pop();
        ty
    }
}

fn missing(shape: &str, kind: &'static str, role: &'static str) -> ModelError {
    ModelError::MissingElementRef { shape: shape.to_string(), kind, role }
}

/// A structure member resolved against the registry.
#[derive(Debug, Clone, Copy)]
pub struct Member<'a> {
    /// Member name as it appears on the wire.
    pub name: &'a str,
    /// The reference the member was declared with.
    pub shape_ref: &'a ShapeRef,
    /// The resolved shape.
    pub shape: &'a Shape,
    /// Whether the member is in the structure's required set.
    pub required: bool,
}

impl Member<'_> {
    /// Public name of the member.
    pub fn exported_name(&self) -> String { exportable(self.name) }

    /// Member-local documentation, falling back to the shape's own.
    pub fn documentation(&self) -> &str {
        if self.shape_ref.documentation.is_empty() {
            &self.shape.documentation
        } else {
            &self.shape_ref.documentation
        }
    }
}
