use std::fs::File;
use std::io::Write;

use endpoints::{EndpointError, Endpoints, ResolvedEndpoint};
use quote::ToTokens;
use syn::{Expr, Lit, Stmt};

const RULES: &str = r#"{
  "_default": [
    {
      "uri": "{scheme}://{service}.{region}.amazonaws.com.cn",
      "constraints": [["region", "startsWith", "cn-"]]
    },
    {
      "uri": "{scheme}://{service}.{region}.amazonaws.com"
    }
  ],
  "cloudfront": [
    {
      "uri": "https://cloudfront.amazonaws.com",
      "properties": { "credentialScope": { "region": "us-east-1" } },
      "constraints": [["region", "notStartsWith", "cn-"]]
    }
  ],
  "dynamodb": [
    {
      "uri": "http://localhost:8000",
      "properties": { "credentialScope": { "region": "us-east-1", "service": "dynamodb" } },
      "constraints": [["region", "equals", "local"]]
    }
  ],
  "s3": [
    {
      "uri": "https://s3.amazonaws.com",
      "constraints": [["region", "oneOf", ["us-east-1", "us-west-2"]]]
    }
  ]
}"#;

fn rules() -> Endpoints { Endpoints::from_json(RULES).expect("valid rules") }

fn resolved(uri: &str, service: &str, region: &str) -> Option<ResolvedEndpoint> {
    Some(ResolvedEndpoint {
        uri: uri.to_string(),
        signing_service: service.to_string(),
        signing_region: region.to_string(),
    })
}

#[test]
fn first_matching_rule_wins() {
    let endpoints = rules();
    assert_eq!(
        endpoints.resolve("sqs", "cn-north-1"),
        resolved("https://sqs.cn-north-1.amazonaws.com.cn", "sqs", "cn-north-1")
    );
    assert_eq!(
        endpoints.resolve("sqs", "us-west-2"),
        resolved("https://sqs.us-west-2.amazonaws.com", "sqs", "us-west-2")
    );
}

#[test]
fn service_rules_apply_credential_scope() {
    let endpoints = rules();
    assert_eq!(
        endpoints.resolve("cloudfront", "eu-west-1"),
        resolved("https://cloudfront.amazonaws.com", "cloudfront", "us-east-1")
    );
    assert_eq!(
        endpoints.resolve("dynamodb", "local"),
        resolved("http://localhost:8000", "dynamodb", "us-east-1")
    );
}

#[test]
fn unmatched_service_rules_fall_through_to_default() {
    let endpoints = rules();
    assert_eq!(
        endpoints.resolve("cloudfront", "cn-north-1"),
        resolved("https://cloudfront.cn-north-1.amazonaws.com.cn", "cloudfront", "cn-north-1")
    );
    assert_eq!(
        endpoints.resolve("s3", "eu-west-1"),
        resolved("https://s3.eu-west-1.amazonaws.com", "s3", "eu-west-1")
    );
    assert_eq!(
        endpoints.resolve("s3", "us-west-2"),
        resolved("https://s3.amazonaws.com", "s3", "us-west-2")
    );
}

#[test]
fn no_rule_means_no_endpoint() {
    let endpoints = Endpoints::from_json(
        r#"{"iam": [{"uri": "https://iam.amazonaws.com", "constraints": [["region", "startsWith", "us-"]]}]}"#,
    )
    .expect("valid rules");
    assert_eq!(endpoints.resolve("iam", "eu-west-1"), None);
    assert_eq!(endpoints.resolve("sqs", "us-east-1"), None);
}

#[test]
fn render_emits_lookup_in_service_order() {
    let mut out = Vec::new();
    rules().render(&mut out).expect("renders");
    let text = String::from_utf8(out).expect("utf-8");

    assert!(text.starts_with(normalization::GENERATED_HEADER));
    assert!(text.contains("pub fn lookup(service: &str, region: &str) -> Result<Endpoint, UnknownEndpoint>"));
    assert!(text.contains(r#"region == "us-east-1" || region == "us-west-2""#));
    assert!(text.contains(r#"!region.starts_with("cn-")"#));

    let cloudfront = text.find(r#""cloudfront" =>"#).expect("cloudfront arm");
    let dynamodb = text.find(r#""dynamodb" =>"#).expect("dynamodb arm");
    let s3 = text.find(r#""s3" =>"#).expect("s3 arm");
    assert!(cloudfront < dynamodb && dynamodb < s3);
    assert!(!text.contains(r#""_default" =>"#));
}

#[test]
fn render_is_deterministic() {
    let endpoints = rules();
    let mut first = Vec::new();
    let mut second = Vec::new();
    endpoints.render(&mut first).expect("renders");
    endpoints.render(&mut second).expect("renders");
    assert_eq!(first, second);
}

#[test]
fn empty_rules_always_fail_lookup() {
    let mut out = Vec::new();
    Endpoints::default().render(&mut out).expect("renders");
    let text = String::from_utf8(out).expect("utf-8");
    assert!(text.contains("Err(UnknownEndpoint"));
    assert!(!text.contains("match service"));
}

#[test]
fn parses_from_reader() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("endpoints.json");
    File::create(&path).and_then(|mut f| f.write_all(RULES.as_bytes())).expect("write fixture");

    let endpoints = Endpoints::parse(File::open(&path).expect("open")).expect("valid rules");
    assert_eq!(endpoints.defaults().len(), 2);
    assert_eq!(endpoints.rules("s3").len(), 1);
    assert_eq!(endpoints.services().count(), 3);
}

#[test]
fn malformed_rules_are_decode_errors() {
    let err = Endpoints::from_json(r#"{"x": [{"constraints": [["region"]]}]}"#).expect_err("short");
    assert!(matches!(err, EndpointError::Decode(_)));
}

/// One compiled rule: its `if` guard, `None` for an unconditional return,
/// and the URI it returns.
type Guarded = (Option<String>, String);

/// The `lookup` body as seen by a reader: the service arms in order, the
/// default rules, and whether it ends in `Err(UnknownEndpoint ..)`.
#[derive(Debug, Default)]
struct Lookup {
    arms: Vec<(String, Vec<Guarded>)>,
    defaults: Vec<Guarded>,
    fails: bool,
}

fn tokens(t: impl ToTokens) -> String { t.to_token_stream().to_string().replace(' ', "") }

fn returned_uri(expr: &Expr) -> String {
    let Expr::Return(ret) = expr else { panic!("expected return, got {}", tokens(expr)) };
    let Some(Expr::Call(ok)) = ret.expr.as_deref() else { panic!("expected Ok(..)") };
    let Some(Expr::Call(call)) = ok.args.first() else { panic!("expected endpoint(..)") };
    match call.args.first() {
        Some(Expr::Lit(lit)) => match &lit.lit {
            Lit::Str(uri) => uri.value(),
            other => panic!("unexpected uri literal {}", tokens(other)),
        },
        _ => panic!("unexpected endpoint call {}", tokens(call)),
    }
}

fn guarded(stmts: &[Stmt]) -> Vec<Guarded> {
    let mut rules = Vec::new();
    for stmt in stmts {
        match stmt {
            Stmt::Expr(Expr::If(guard), _) => {
                let [Stmt::Expr(ret, _)] = guard.then_branch.stmts.as_slice() else {
                    panic!("guard body is not a single return")
                };
                rules.push((Some(tokens(&guard.cond)), returned_uri(ret)));
            }
            Stmt::Expr(ret @ Expr::Return(_), _) => rules.push((None, returned_uri(ret))),
            _ => {}
        }
    }
    rules
}

fn lookup_of(endpoints: &Endpoints) -> Lookup {
    let mut out = Vec::new();
    endpoints.render(&mut out).expect("renders");
    let file = syn::parse_file(&String::from_utf8(out).expect("utf-8")).expect("lookup parses");
    let lookup = file
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Fn(f) if f.sig.ident == "lookup" => Some(f),
            _ => None,
        })
        .expect("lookup generated");

    let stmts = &lookup.block.stmts;
    let mut parsed = Lookup { defaults: guarded(stmts), ..Lookup::default() };
    for stmt in stmts {
        match stmt {
            Stmt::Expr(Expr::Match(service), _) => {
                for arm in &service.arms {
                    let Expr::Block(body) = arm.body.as_ref() else { panic!("arm body is not a block") };
                    parsed.arms.push((tokens(&arm.pat), guarded(&body.block.stmts)));
                }
            }
            Stmt::Expr(Expr::Call(call), None) => {
                parsed.fails = tokens(&call.func) == "Err";
            }
            _ => {}
        }
    }
    parsed
}

fn rule(guard: &str, uri: &str) -> Guarded { (Some(guard.to_string()), uri.to_string()) }

fn fallback(uri: &str) -> Guarded { (None, uri.to_string()) }

#[test]
fn lookup_guards_follow_declared_order() {
    let endpoints = Endpoints::from_json(
        r#"{
          "_default": [
            { "uri": "{scheme}://{service}.{region}.amazonaws.com.cn", "constraints": [["region", "startsWith", "cn-"]] },
            { "uri": "{scheme}://{service}.{region}.amazonaws.com" },
            { "uri": "https://after-default.example", "constraints": [["region", "equals", "local"]] }
          ],
          "sqs": [
            { "uri": "https://queue.amazonaws.com", "constraints": [["region", "oneOf", ["us-east-1", "us-west-2"]]] },
            { "uri": "https://sqs.global.example", "constraints": [["region", "notStartsWith", "cn-"]] }
          ],
          "ec2": [
            {
              "uri": "https://ec2.us-gov.amazonaws.com",
              "constraints": [["region", "startsWith", "us-gov"], ["service", "equals", "ec2"]]
            },
            { "uri": "https://ec2.amazonaws.com" },
            { "uri": "https://after-ec2.example", "constraints": [["region", "equals", "local"]] }
          ]
        }"#,
    )
    .expect("valid rules");
    let lookup = lookup_of(&endpoints);

    assert_eq!(
        lookup.arms,
        [
            (
                r#""ec2""#.to_string(),
                vec![
                    rule(
                        r#"(region.starts_with("us-gov"))&&(service=="ec2")"#,
                        "https://ec2.us-gov.amazonaws.com"
                    ),
                    fallback("https://ec2.amazonaws.com"),
                ]
            ),
            (
                r#""sqs""#.to_string(),
                vec![
                    rule(r#"region=="us-east-1"||region=="us-west-2""#, "https://queue.amazonaws.com"),
                    rule(r#"!region.starts_with("cn-")"#, "https://sqs.global.example"),
                ]
            ),
            ("_".to_string(), vec![]),
        ]
    );
    assert_eq!(
        lookup.defaults,
        [
            rule(
                r#"region.starts_with("cn-")"#,
                "{scheme}://{service}.{region}.amazonaws.com.cn"
            ),
            fallback("{scheme}://{service}.{region}.amazonaws.com"),
        ]
    );
    assert!(!lookup.fails);

    let mut out = Vec::new();
    endpoints.render(&mut out).expect("renders");
    let text = String::from_utf8(out).expect("utf-8");
    assert!(!text.contains("after-ec2.example"));
    assert!(!text.contains("after-default.example"));
}

#[test]
fn lookup_without_fallback_ends_in_error() {
    let endpoints = Endpoints::from_json(
        r#"{"iam": [{"uri": "https://iam.amazonaws.com", "constraints": [["region", "startsWith", "us-"]]}]}"#,
    )
    .expect("valid rules");
    let lookup = lookup_of(&endpoints);

    assert_eq!(
        lookup.arms,
        [
            (r#""iam""#.to_string(), vec![rule(r#"region.starts_with("us-")"#, "https://iam.amazonaws.com")]),
            ("_".to_string(), vec![]),
        ]
    );
    assert!(lookup.defaults.is_empty());
    assert!(lookup.fails);
}
