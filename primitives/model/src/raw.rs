//! Raw service-description document.
//!
//! These types mirror the JSON layout one to one and are only used to decode
//! it; [`crate::Service::load`] converts them into the model. Every field is
//! optional on the wire, so absent fields fall back to their defaults and
//! unknown fields are ignored.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawService {
    pub metadata: RawMetadata,
    pub documentation: String,
    pub operations: BTreeMap<String, RawOperation>,
    pub shapes: BTreeMap<String, RawShape>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawMetadata {
    pub api_version: String,
    pub endpoint_prefix: String,
    pub json_version: String,
    pub service_abbreviation: String,
    pub service_full_name: String,
    pub signature_version: String,
    pub target_prefix: String,
    pub protocol: String,
    pub checksum_format: String,
    pub global_endpoint: String,
    pub timestamp_format: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawOperation {
    pub name: String,
    pub documentation: String,
    pub http: RawHttp,
    pub input: Option<RawShapeRef>,
    pub output: Option<RawShapeRef>,
    pub errors: Vec<RawShapeRef>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawHttp {
    pub method: String,
    pub request_uri: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawShapeRef {
    pub shape: String,
    pub documentation: String,
    pub location: String,
    pub location_name: String,
    pub wrapper: bool,
    pub result_wrapper: String,
    pub streaming: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawShape {
    #[serde(rename = "type")]
    pub kind: String,
    pub required: Vec<String>,
    pub members: BTreeMap<String, RawShapeRef>,
    pub member: Option<RawShapeRef>,
    pub key: Option<RawShapeRef>,
    pub value: Option<RawShapeRef>,
    pub error: Option<RawError>,
    pub exception: bool,
    pub documentation: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub pattern: Option<String>,
    pub sensitive: bool,
    pub wrapper: bool,
    pub payload: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct RawError {
    pub code: String,
    pub http_status_code: u16,
    pub sender_fault: bool,
}
