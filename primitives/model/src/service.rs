//! The service model and its loader.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use normalization::exportable;

use crate::raw::{RawMetadata, RawOperation, RawService};
use crate::{ModelError, Result, Shape, ShapeKind, ShapeRef};

/// Service-wide settings from the description document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// API version, e.g. `2013-11-01`.
    pub api_version: String,
    /// Host prefix of the service endpoint, e.g. `cloudtrail`.
    pub endpoint_prefix: String,
    /// JSON protocol version, e.g. `1.1`.
    pub json_version: String,
    /// Short display name.
    pub service_abbreviation: String,
    /// Full display name, e.g. `AWS CloudTrail`.
    pub service_full_name: String,
    /// Request signature version, e.g. `v4`.
    pub signature_version: String,
    /// Prefix of the operation target header (JSON protocol).
    pub target_prefix: String,
    /// Wire protocol, selects the emission template.
    pub protocol: String,
    /// Checksum format, when the service uses one.
    pub checksum_format: String,
    /// Host of the global endpoint, when there is one.
    pub global_endpoint: String,
    /// Wire format of timestamps.
    pub timestamp_format: String,
}

impl From<RawMetadata> for Metadata {
    fn from(raw: RawMetadata) -> Self {
        Metadata {
            api_version: raw.api_version,
            endpoint_prefix: raw.endpoint_prefix,
            json_version: raw.json_version,
            service_abbreviation: raw.service_abbreviation,
            service_full_name: raw.service_full_name,
            signature_version: raw.signature_version,
            target_prefix: raw.target_prefix,
            protocol: raw.protocol,
            checksum_format: raw.checksum_format,
            global_endpoint: raw.global_endpoint,
            timestamp_format: raw.timestamp_format,
        }
    }
}

/// HTTP binding of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpBinding {
    /// HTTP method, e.g. `POST`.
    pub method: String,
    /// Request URI template, e.g. `/`.
    pub request_uri: String,
}

/// A remote procedure exposed by the service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Operation {
    /// Operation name as sent on the wire.
    pub name: String,
    /// Raw (HTML) documentation.
    pub documentation: String,
    /// HTTP binding.
    pub http: HttpBinding,
    /// Request shape, if the operation takes input.
    pub input: Option<ShapeRef>,
    /// Response shape, if the operation returns output.
    pub output: Option<ShapeRef>,
    /// Error shapes the operation may return.
    pub errors: Vec<ShapeRef>,
}

impl Operation {
    fn from_raw(key: &str, raw: RawOperation) -> Self {
        Operation {
            name: if raw.name.is_empty() { key.to_string() } else { raw.name },
            documentation: raw.documentation,
            http: HttpBinding { method: raw.http.method, request_uri: raw.http.request_uri },
            input: raw.input.map(Into::into),
            output: raw.output.map(Into::into),
            errors: raw.errors.into_iter().map(Into::into).collect(),
        }
    }

    /// Public name of the operation.
    pub fn exported_name(&self) -> String { exportable(&self.name) }

    /// Resolved input shape.
    pub fn input_shape<'a>(&'a self, service: &'a Service) -> Result<Option<&'a Shape>> {
        self.input
            .as_ref()
            .map(|r| service.resolve_in(|| format!("operation {} input", self.name), r))
            .transpose()
    }

    /// Resolved output shape.
    pub fn output_shape<'a>(&'a self, service: &'a Service) -> Result<Option<&'a Shape>> {
        self.output
            .as_ref()
            .map(|r| service.resolve_in(|| format!("operation {} output", self.name), r))
            .transpose()
    }
}

/// A service described by one description document.
///
/// The service owns every shape; everything else refers to shapes by name.
/// It is built once by [`Service::load`] and only read afterwards, so several
/// services can be generated side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Service {
    /// Identifier prefix of the generated client type, e.g. `CloudTrail`.
    pub name: String,
    /// Display name, from `metadata.serviceFullName`.
    pub full_name: String,
    /// Name of the generated module, the lower-cased `name`.
    pub package_name: String,
    /// Service-wide settings.
    pub metadata: Metadata,
    /// Raw (HTML) service documentation.
    pub documentation: String,
    /// Operations by name.
    pub operations: BTreeMap<String, Operation>,
    /// Shapes by name.
    pub shapes: BTreeMap<String, Shape>,
}

impl Service {
    /// Decodes a description document into a service model.
    ///
    /// `name` becomes the client type name verbatim and, lower-cased, the
    /// module name. Missing optional fields take their defaults. Decode
    /// failures are returned as-is and no partial model is kept.
    pub fn load<R: Read>(name: &str, reader: R) -> Result<Self> {
        let raw: RawService = serde_json::from_reader(reader)?;
        Self::from_raw(name, raw)
    }

    /// [`Service::load`] from an in-memory document.
    pub fn from_json(name: &str, document: &str) -> Result<Self> {
        let raw: RawService = serde_json::from_str(document)?;
        Self::from_raw(name, raw)
    }

    /// [`Service::load`] from a file.
    pub fn from_path<P: AsRef<Path>>(name: &str, path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::load(name, BufReader::new(file))
    }

    fn from_raw(name: &str, raw: RawService) -> Result<Self> {
        let shapes = raw
            .shapes
            .into_iter()
            .map(|(key, shape)| Ok((key.clone(), Shape::from_raw(key, shape)?)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        let operations = raw
            .operations
            .into_iter()
            .map(|(key, op)| {
                let op = Operation::from_raw(&key, op);
                (key, op)
            })
            .collect();

        let metadata = Metadata::from(raw.metadata);
        Ok(Service {
            name: name.to_string(),
            full_name: metadata.service_full_name.clone(),
            package_name: name.to_lowercase(),
            metadata,
            documentation: raw.documentation,
            operations,
            shapes,
        })
    }

    /// Looks a shape up by name.
    pub fn shape(&self, name: &str) -> Option<&Shape> { self.shapes.get(name) }

    /// Follows a shape reference.
    pub fn resolve(&self, shape_ref: &ShapeRef) -> Result<&Shape> {
        self.resolve_in(|| "shape reference".to_string(), shape_ref)
    }

    pub(crate) fn resolve_in(
        &self,
        referrer: impl FnOnce() -> String,
        shape_ref: &ShapeRef,
    ) -> Result<&Shape> {
        self.shapes.get(&shape_ref.shape).ok_or_else(|| ModelError::DanglingShapeRef {
            referrer: referrer(),
            target: shape_ref.shape.clone(),
        })
    }

    /// Checks that every shape reference in the model resolves.
    ///
    /// Returns the first dangling reference found, visiting operations and
    /// then shapes in name order.
    pub fn validate(&self) -> Result<()> {
        for op in self.operations.values() {
            op.input_shape(self)?;
            op.output_shape(self)?;
            for error in &op.errors {
                self.resolve_in(|| format!("operation {} error", op.name), error)?;
            }
        }
        for shape in self.shapes.values() {
            for (referrer, shape_ref) in shape.references() {
                self.resolve_in(|| referrer, shape_ref)?;
            }
        }
        Ok(())
    }

    /// Structure shapes that are not exceptions, in name order.
    pub fn structures(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values().filter(|s| s.is_structure() && !s.exception)
    }

    /// Result-wrapper types that have no shape of their own.
    ///
    /// Query-protocol operations may wrap their input or output in an element
    /// named by `resultWrapper`. Each such name that is not already a shape
    /// maps to the shape it wraps.
    pub fn wrappers(&self) -> Result<BTreeMap<String, &Shape>> {
        let mut wrappers = BTreeMap::new();
        for op in self.operations.values() {
            for (shape_ref, shape) in [
                (op.input.as_ref(), op.input_shape(self)?),
                (op.output.as_ref(), op.output_shape(self)?),
            ] {
                if let (Some(shape_ref), Some(shape)) = (shape_ref, shape) {
                    if !shape_ref.result_wrapper.is_empty()
                        && !self.shapes.contains_key(&shape_ref.result_wrapper)
                    {
                        wrappers.insert(shape_ref.result_wrapper.clone(), shape);
                    }
                }
            }
        }
        Ok(wrappers)
    }

    /// Whether a structure member of type `target` must be boxed inside
    /// `owner`.
    ///
    /// That is the case when `target` leads back to `owner` through structure
    /// members alone; lists and maps already allocate. The walk keeps a
    /// visited set, so it ends on any graph.
    pub fn needs_indirection(&self, owner: &Shape, target: &Shape) -> Result<bool> {
        if !target.is_structure() {
            return Ok(false);
        }

        let mut visited = BTreeSet::new();
        let mut stack = vec![target];
        while let Some(shape) = stack.pop() {
            if shape.name == owner.name {
                return Ok(true);
            }
            if !visited.insert(shape.name.as_str()) {
                continue;
            }
            if let ShapeKind::Structure(structure) = &shape.kind {
                for (name, shape_ref) in &structure.members {
                    let next = self.resolve_in(
                        || format!("member {name} of shape {}", shape.name),
                        shape_ref,
                    )?;
                    if next.is_structure() {
                        stack.push(next);
                    }
                }
            }
        }
        Ok(false)
    }
}
