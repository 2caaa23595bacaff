//! Compiles endpoint rules into a Rust `lookup` function.

use std::fmt::Write as _;
use std::io::Write;

use normalization::format_rust;

use crate::rules::{Endpoint, Endpoints};
use crate::Result;

const PRELUDE: &str = r#"
//! Lookups for all service endpoints.

/// A resolved service endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Endpoint URI.
    pub uri: String,
    /// Service name to sign requests with.
    pub signing_service: String,
    /// Region to sign requests with.
    pub signing_region: String,
}

/// No endpoint rule matched the service and region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEndpoint {
    /// The service that was looked up.
    pub service: String,
    /// The region that was looked up.
    pub region: String,
}

impl std::fmt::Display for UnknownEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown endpoint for {} in {}", self.service, self.region)
    }
}

impl std::error::Error for UnknownEndpoint {}

fn endpoint(
    uri: &str,
    service: &str,
    region: &str,
    signing_service: &str,
    signing_region: &str,
) -> Endpoint {
    Endpoint {
        uri: uri
            .replace("{scheme}", "https")
            .replace("{service}", service)
            .replace("{region}", region),
        signing_service: signing_service.to_string(),
        signing_region: signing_region.to_string(),
    }
}
"#;

impl Endpoints {
    /// Compiles the rules into a formatted Rust module and writes it.
    ///
    /// The generated `lookup(service, region)` tries the service's own rules
    /// in declared order, then the `_default` rules, and returns the first
    /// match. When nothing matches it returns `Err(UnknownEndpoint)`. Nothing
    /// is written unless the module formats cleanly.
    pub fn render<W: Write>(&self, writer: &mut W) -> Result<()> {
        let text = self.render_unformatted()?;
        let formatted = format_rust(&text).map_err(|err| {
            tracing::error!(error = %err, text = %err.text, "endpoint lookup failed to format");
            err
        })?;
        writer.write_all(formatted.as_bytes())?;
        Ok(())
    }

    /// The generated module before formatting.
    pub fn render_unformatted(&self) -> Result<String> {
        let mut out = String::from(PRELUDE);

        writeln!(out, "/// Returns the endpoint for the given service in the given region.")?;
        writeln!(
            out,
            "pub fn lookup(service: &str, region: &str) -> Result<Endpoint, UnknownEndpoint> {{"
        )?;

        let mut services = self.services().peekable();
        if services.peek().is_some() {
            writeln!(out, "match service {{")?;
            for (name, rules) in services {
                writeln!(out, "{name:?} => {{")?;
                write_rules(&mut out, rules)?;
                writeln!(out, "}}")?;
            }
            writeln!(out, "_ => {{}}")?;
            writeln!(out, "}}")?;
        }

        if !write_rules(&mut out, self.defaults())? {
            writeln!(
                out,
                "Err(UnknownEndpoint {{ service: service.to_string(), region: region.to_string() }})"
            )?;
        }
        writeln!(out, "}}")?;
        Ok(out)
    }
}

/// Writes one bucket's rules as early returns. Returns `true` when a rule
/// without constraints ended the bucket; later rules could never be reached
/// and are left out.
fn write_rules(out: &mut String, rules: &[Endpoint]) -> Result<bool> {
    for rule in rules {
        let scope = &rule.properties.credential_scope;
        let signing_service = scope.service.as_ref().map_or("service".to_string(), |s| format!("{s:?}"));
        let signing_region = scope.region.as_ref().map_or("region".to_string(), |r| format!("{r:?}"));
        let call = format!(
            "Ok(endpoint({:?}, service, region, {signing_service}, {signing_region}))",
            rule.uri
        );

        let guard = match rule.constraints.as_slice() {
            [] => {
                writeln!(out, "return {call};")?;
                return Ok(true);
            }
            [only] => only.condition(),
            _ => rule.conditions(),
        };
        writeln!(out, "if {guard} {{ return {call}; }}")?;
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_services_skips_match() {
        let endpoints = Endpoints::from_json(
            r#"{"_default": [{"uri": "{scheme}://{service}.{region}.amazonaws.com"}]}"#,
        )
        .expect("valid rules");
        let text = endpoints.render_unformatted().expect("renders");
        assert!(!text.contains("match service"));
        assert!(text.contains("return Ok(endpoint("));
        assert!(!text.contains("Err(UnknownEndpoint"));
    }

    #[test]
    fn test_unconstrained_rule_ends_bucket() {
        let endpoints = Endpoints::from_json(
            r#"{"iam": [
                {"uri": "https://iam.amazonaws.com"},
                {"uri": "https://unreachable.example"}
            ]}"#,
        )
        .expect("valid rules");
        let text = endpoints.render_unformatted().expect("renders");
        assert!(!text.contains("unreachable"));
        assert!(text.contains("Err(UnknownEndpoint"));
    }

    #[test]
    fn test_credential_scope_overrides_signing() {
        let endpoints = Endpoints::from_json(
            r#"{"cloudfront": [{
                "uri": "https://cloudfront.amazonaws.com",
                "properties": {"credentialScope": {"region": "us-east-1"}},
                "constraints": [["region", "notStartsWith", "cn-"]]
            }]}"#,
        )
        .expect("valid rules");
        let text = endpoints.render_unformatted().expect("renders");
        assert!(text.contains(r#"service, region, service, "us-east-1")"#));
    }
}
