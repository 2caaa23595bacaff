//! Endpoint rules and their in-process evaluation.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::Result;

/// Bucket consulted when a service has no matching rule of its own.
pub const DEFAULT_BUCKET: &str = "_default";

/// The lookup argument a constraint tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    /// The service name.
    Service,
    /// The region name.
    Region,
}

impl Field {
    /// Name of the lookup parameter in generated code.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Service => "service",
            Field::Region => "region",
        }
    }

    fn pick<'a>(self, service: &'a str, region: &'a str) -> &'a str {
        match self {
            Field::Service => service,
            Field::Region => region,
        }
    }
}

/// Comparison applied by a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    /// The field begins with the literal.
    StartsWith,
    /// The field does not begin with the literal.
    NotStartsWith,
    /// The field is exactly the literal.
    Equals,
    /// Compiled exactly like [`Operator::Equals`]; existing rule documents
    /// depend on that behavior.
    NotEquals,
    /// The field equals one of the listed literals.
    OneOf,
}

/// Right-hand side of a constraint.
///
/// A `null` in the document, alone or inside a list, reads as `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A single string.
    Literal(String),
    /// A list of strings, for [`Operator::OneOf`].
    List(Vec<String>),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOperand {
    Literal(Option<String>),
    List(Vec<Option<String>>),
}

impl From<RawOperand> for Operand {
    fn from(raw: RawOperand) -> Self {
        match raw {
            RawOperand::Literal(lit) => Operand::Literal(lit.unwrap_or_default()),
            RawOperand::List(values) => {
                Operand::List(values.into_iter().map(Option::unwrap_or_default).collect())
            }
        }
    }
}

#[derive(Deserialize)]
struct RawConstraint(Field, Operator, RawOperand);

/// A single `(field, operator, operand)` test.
///
/// Decoded from a three-element array such as `["region", "startsWith",
/// "cn-"]`. `oneOf` takes a list operand, every other operator a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    /// What is tested.
    pub field: Field,
    /// How it is tested.
    pub operator: Operator,
    /// What it is tested against.
    pub operand: Operand,
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let RawConstraint(field, operator, operand) = RawConstraint::deserialize(deserializer)?;
        let operand = Operand::from(operand);
        match (operator, &operand) {
            (Operator::OneOf, Operand::Literal(_)) => {
                Err(D::Error::custom("oneOf constraint needs a list operand"))
            }
            (Operator::OneOf, Operand::List(_)) | (_, Operand::Literal(_)) => {
                Ok(Constraint { field, operator, operand })
            }
            (_, Operand::List(_)) => {
                Err(D::Error::custom(format!("{operator:?} constraint needs a string operand")))
            }
        }
    }
}

impl Constraint {
    /// The Rust boolean expression this constraint compiles to.
    ///
    /// ```
    /// use endpoints::{Constraint, Field, Operand, Operator};
    /// let c = Constraint {
    ///     field: Field::Region,
    ///     operator: Operator::StartsWith,
    ///     operand: Operand::Literal("cn-".into()),
    /// };
    /// assert_eq!(c.condition(), r#"region.starts_with("cn-")"#);
    /// ```
    pub fn condition(&self) -> String {
        let field = self.field.as_str();
        match (&self.operand, self.operator) {
            (Operand::Literal(lit), Operator::StartsWith) => format!("{field}.starts_with({lit:?})"),
            (Operand::Literal(lit), Operator::NotStartsWith) => {
                format!("!{field}.starts_with({lit:?})")
            }
            (Operand::Literal(lit), _) => format!("{field} == {lit:?}"),
            (Operand::List(values), _) if values.is_empty() => "false".to_string(),
            (Operand::List(values), _) => values
                .iter()
                .map(|v| format!("{field} == {v:?}"))
                .collect::<Vec<_>>()
                .join(" || "),
        }
    }

    /// Evaluates the constraint against a lookup.
    pub fn matches(&self, service: &str, region: &str) -> bool {
        let value = self.field.pick(service, region);
        match (&self.operand, self.operator) {
            (Operand::Literal(lit), Operator::StartsWith) => value.starts_with(lit.as_str()),
            (Operand::Literal(lit), Operator::NotStartsWith) => !value.starts_with(lit.as_str()),
            (Operand::Literal(lit), _) => value == lit,
            (Operand::List(values), _) => values.iter().any(|v| v == value),
        }
    }
}

/// Signing overrides for an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CredentialScope {
    /// Region to sign requests with, instead of the lookup region.
    pub region: Option<String>,
    /// Service name to sign requests with, instead of the lookup service.
    pub service: Option<String>,
    /// Signature version, carried but not interpreted.
    pub signature_version: Option<String>,
}

/// Extra endpoint properties.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Properties {
    /// Signing overrides.
    pub credential_scope: CredentialScope,
}

/// One rule: a URI template guarded by constraints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Endpoint {
    /// Optional rule name.
    pub name: String,
    /// URI template with `{scheme}`, `{service}` and `{region}` placeholders.
    pub uri: String,
    /// Extra properties.
    pub properties: Properties,
    /// Conditions that must all hold; none means the rule always applies.
    pub constraints: Vec<Constraint>,
}

impl Endpoint {
    /// The conjunction of all constraints as a Rust expression, each one
    /// parenthesized. Empty when the rule has no constraints.
    pub fn conditions(&self) -> String {
        self.constraints
            .iter()
            .map(|c| format!("({})", c.condition()))
            .collect::<Vec<_>>()
            .join(" && ")
    }

    /// Whether every constraint holds.
    pub fn matches(&self, service: &str, region: &str) -> bool {
        self.constraints.iter().all(|c| c.matches(service, region))
    }

    /// The URI with its placeholders filled in.
    pub fn expand(&self, service: &str, region: &str) -> String {
        expand_uri(&self.uri, service, region)
    }
}

/// Substitutes `{scheme}`, `{service}` and `{region}` in a URI template.
pub fn expand_uri(uri: &str, service: &str, region: &str) -> String {
    uri.replace("{scheme}", "https").replace("{service}", service).replace("{region}", region)
}

/// Outcome of an in-process lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint {
    /// Endpoint URI.
    pub uri: String,
    /// Service name to sign with.
    pub signing_service: String,
    /// Region to sign with.
    pub signing_region: String,
}

impl fmt::Display for ResolvedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (signing {} in {})", self.uri, self.signing_service, self.signing_region)
    }
}

/// Endpoint rules by service name, plus the `_default` bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Endpoints {
    rules: BTreeMap<String, Vec<Endpoint>>,
}

impl Endpoints {
    /// Decodes a rule document.
    ///
    /// Unknown constraint fields or operators and mistyped operands are decode
    /// errors. Rules using `notEquals` are accepted and logged.
    pub fn parse<R: Read>(reader: R) -> Result<Self> {
        let endpoints: Endpoints = serde_json::from_reader(reader)?;
        endpoints.warn_not_equals();
        Ok(endpoints)
    }

    /// [`Endpoints::parse`] from an in-memory document.
    pub fn from_json(document: &str) -> Result<Self> {
        let endpoints: Endpoints = serde_json::from_str(document)?;
        endpoints.warn_not_equals();
        Ok(endpoints)
    }

    fn warn_not_equals(&self) {
        for (service, rules) in &self.rules {
            for rule in rules {
                for c in rule.constraints.iter().filter(|c| c.operator == Operator::NotEquals) {
                    tracing::warn!(
                        service = %service,
                        field = c.field.as_str(),
                        "notEquals constraint compiles as an equality test"
                    );
                }
            }
        }
    }

    /// Rules of one bucket, in declared order.
    pub fn rules(&self, service: &str) -> &[Endpoint] {
        self.rules.get(service).map(Vec::as_slice).unwrap_or_default()
    }

    /// Buckets other than `_default`, sorted by service name.
    pub fn services(&self) -> impl Iterator<Item = (&str, &[Endpoint])> {
        self.rules
            .iter()
            .filter(|(name, _)| name.as_str() != DEFAULT_BUCKET)
            .map(|(name, rules)| (name.as_str(), rules.as_slice()))
    }

    /// Rules of the `_default` bucket.
    pub fn defaults(&self) -> &[Endpoint] { self.rules(DEFAULT_BUCKET) }

    /// Evaluates the rules the way the generated `lookup` does: the service's
    /// own bucket first, then `_default`, first match wins.
    pub fn resolve(&self, service: &str, region: &str) -> Option<ResolvedEndpoint> {
        let own = self.rules.get(service).filter(|_| service != DEFAULT_BUCKET);
        own.into_iter()
            .flatten()
            .chain(self.defaults())
            .find(|rule| rule.matches(service, region))
            .map(|rule| {
                let scope = &rule.properties.credential_scope;
                ResolvedEndpoint {
                    uri: rule.expand(service, region),
                    signing_service: scope.service.clone().unwrap_or_else(|| service.to_string()),
                    signing_region: scope.region.clone().unwrap_or_else(|| region.to_string()),
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(operator: Operator, operand: Operand) -> Constraint {
        Constraint { field: Field::Region, operator, operand }
    }

    #[test]
    fn test_conditions() {
        let lit = |s: &str| Operand::Literal(s.to_string());
        assert_eq!(region(Operator::StartsWith, lit("cn-")).condition(), r#"region.starts_with("cn-")"#);
        assert_eq!(
            region(Operator::NotStartsWith, lit("cn-")).condition(),
            r#"!region.starts_with("cn-")"#
        );
        assert_eq!(region(Operator::Equals, lit("local")).condition(), r#"region == "local""#);
        assert_eq!(region(Operator::NotEquals, lit("local")).condition(), r#"region == "local""#);
    }

    #[test]
    fn test_one_of_keeps_order() {
        let c = region(Operator::OneOf, Operand::List(vec!["us-east-1".into(), "us-west-2".into()]));
        assert_eq!(c.condition(), r#"region == "us-east-1" || region == "us-west-2""#);
        assert!(c.matches("s3", "us-east-1"));
        assert!(c.matches("s3", "us-west-2"));
        assert!(!c.matches("s3", "eu-west-1"));
    }

    #[test]
    fn test_empty_one_of_never_matches() {
        let c = region(Operator::OneOf, Operand::List(Vec::new()));
        assert_eq!(c.condition(), "false");
        assert!(!c.matches("s3", "us-east-1"));
    }

    #[test]
    fn test_not_equals_matches_like_equals() {
        let c = region(Operator::NotEquals, Operand::Literal("local".into()));
        assert!(c.matches("dynamodb", "local"));
        assert!(!c.matches("dynamodb", "us-east-1"));
    }

    #[test]
    fn test_conditions_are_joined() {
        let rule = Endpoint {
            uri: "{scheme}://{service}.{region}.amazonaws.com".into(),
            constraints: vec![
                Constraint {
                    field: Field::Service,
                    operator: Operator::Equals,
                    operand: Operand::Literal("s3".into()),
                },
                region(Operator::StartsWith, Operand::Literal("us-".into())),
            ],
            ..Endpoint::default()
        };
        assert_eq!(rule.conditions(), r#"(service == "s3") && (region.starts_with("us-"))"#);
        assert_eq!(rule.expand("s3", "us-east-1"), "https://s3.us-east-1.amazonaws.com");
    }

    #[test]
    fn test_null_operand_reads_as_empty_string() {
        let rules = Endpoints::from_json(
            r#"{"sts": [
                {"uri": "a", "constraints": [["region", "oneOf", ["us-east-1", null]]]},
                {"uri": "b", "constraints": [["region", "notEquals", null]]}
            ]}"#,
        )
        .expect("null operands decode");

        let one_of = &rules.rules("sts")[0].constraints[0];
        assert_eq!(one_of.operand, Operand::List(vec!["us-east-1".to_string(), String::new()]));
        assert_eq!(one_of.condition(), r#"region == "us-east-1" || region == """#);
        assert!(one_of.matches("sts", ""));
        assert!(!one_of.matches("sts", "eu-west-1"));

        let not_equals = &rules.rules("sts")[1].constraints[0];
        assert_eq!(not_equals.operand, Operand::Literal(String::new()));
        assert_eq!(not_equals.condition(), r#"region == """#);
        assert!(not_equals.matches("sts", ""));
        assert!(!not_equals.matches("sts", "us-east-1"));
    }

    #[test]
    fn test_decode_rejects_bad_constraints() {
        assert!(Endpoints::from_json(r#"{"x": [{"constraints": [["zone", "equals", "a"]]}]}"#).is_err());
        assert!(Endpoints::from_json(r#"{"x": [{"constraints": [["region", "like", "a"]]}]}"#).is_err());
        assert!(Endpoints::from_json(r#"{"x": [{"constraints": [["region", "oneOf", "a"]]}]}"#).is_err());
        assert!(
            Endpoints::from_json(r#"{"x": [{"constraints": [["region", "equals", ["a"]]]}]}"#).is_err()
        );
    }
}
