//! Wire protocols and what each one changes in the emitted client.

use std::fmt;

use model::{Member, Metadata};

/// Wire protocols the emitter has a template for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// `json`: JSON bodies addressed through a target header.
    Json,
    /// `rest-json`: REST routing with JSON bodies.
    RestJson,
    /// `rest-xml`: REST routing with XML bodies.
    RestXml,
    /// `query`: form-encoded requests with XML responses.
    Query,
    /// `ec2`: the EC2 dialect of the query protocol.
    Ec2,
}

impl Protocol {
    /// All supported protocols.
    pub const ALL: [Protocol; 5] =
        [Protocol::Json, Protocol::RestJson, Protocol::RestXml, Protocol::Query, Protocol::Ec2];

    /// Parses the `metadata.protocol` identifier.
    pub fn from_name(name: &str) -> Option<Self> {
        Protocol::ALL.into_iter().find(|p| p.as_str() == name)
    }

    /// The protocol identifier as spelled in description documents.
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Json => "json",
            Protocol::RestJson => "rest-json",
            Protocol::RestXml => "rest-xml",
            Protocol::Query => "query",
            Protocol::Ec2 => "ec2",
        }
    }

    /// Transport client type in the runtime crate.
    pub fn client_type(self) -> &'static str {
        match self {
            Protocol::Json => "JsonClient",
            Protocol::RestJson => "RestJsonClient",
            Protocol::RestXml => "RestXmlClient",
            Protocol::Query => "QueryClient",
            Protocol::Ec2 => "Ec2Client",
        }
    }

    /// Protocol settings handed to the transport client.
    pub fn settings(self, metadata: &Metadata) -> Vec<(&'static str, String)> {
        match self {
            Protocol::Json => vec![
                ("json_version", metadata.json_version.clone()),
                ("target_prefix", metadata.target_prefix.clone()),
            ],
            _ => vec![("api_version", metadata.api_version.clone())],
        }
    }

    /// Whether operation input/output may be wrapped in a result element.
    pub fn uses_result_wrappers(self) -> bool { self == Protocol::Query }

    /// Name a member is serialized under.
    ///
    /// JSON protocols use the member name. XML protocols prefer the
    /// reference's `locationName`. EC2 does too, except when it starts with a
    /// lower-case letter, which EC2 documents use for element names that do
    /// not match the query parameter.
    pub fn wire_name(self, member: &Member<'_>) -> String {
        let location_name = member.shape_ref.location_name.as_str();
        let use_location = match self {
            Protocol::Json | Protocol::RestJson => false,
            Protocol::RestXml | Protocol::Query => !location_name.is_empty(),
            Protocol::Ec2 => location_name.chars().next().is_some_and(char::is_uppercase),
        };
        if use_location {
            location_name.to_string()
        } else {
            member.name.to_string()
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
