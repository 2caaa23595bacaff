use std::fs;
use std::path::{Path, PathBuf};

use apigen_cli::{execute, Cli, CliError, Command};
use clap::Parser;

const TRAILS: &str = r#"{
  "metadata": {
    "apiVersion": "2013-11-01",
    "endpointPrefix": "cloudtrail",
    "jsonVersion": "1.1",
    "serviceFullName": "AWS CloudTrail",
    "targetPrefix": "CloudTrail_20131101",
    "protocol": "json"
  },
  "operations": {
    "StopLogging": {
      "name": "StopLogging",
      "http": { "method": "POST", "requestUri": "/" },
      "input": { "shape": "StopLoggingRequest" }
    }
  },
  "shapes": {
    "String": { "type": "string" },
    "StopLoggingRequest": {
      "type": "structure",
      "required": ["Name"],
      "members": { "Name": { "shape": "String" } }
    }
  }
}"#;

const RULES: &str = r#"{
  "_default": [
    { "uri": "{scheme}://{service}.{region}.amazonaws.com", "constraints": [["region", "startsWith", "us-"]] }
  ],
  "iam": [
    {
      "uri": "https://iam.amazonaws.com",
      "properties": { "credentialScope": { "region": "us-east-1" } }
    }
  ]
}"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

fn run(command: Command) -> Result<String, CliError> {
    let mut out = Vec::new();
    execute(command, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8"))
}

#[test]
fn parses_service_command() {
    let cli = Cli::try_parse_from([
        "apigen",
        "-vv",
        "service",
        "CloudTrail",
        "apis/cloudtrail.json",
        "-o",
        "gen/cloudtrail.rs",
    ])
    .expect("valid arguments");
    assert_eq!(cli.verbose, 2);
    assert_eq!(
        cli.command,
        Command::Service {
            name: "CloudTrail".to_string(),
            input: PathBuf::from("apis/cloudtrail.json"),
            output: Some(PathBuf::from("gen/cloudtrail.rs")),
            runtime_crate: "aws".to_string(),
        }
    );
}

#[test]
fn parses_global_log_level_after_subcommand() {
    let cli = Cli::try_parse_from(["apigen", "batch", "--config", "jobs.toml", "--log-level", "warn"])
        .expect("valid arguments");
    assert_eq!(cli.log_level.as_deref(), Some("warn"));
    assert_eq!(cli.command, Command::Batch { config: Some(PathBuf::from("jobs.toml")) });
}

#[test]
fn rejects_missing_arguments() {
    assert!(Cli::try_parse_from(["apigen", "lookup", "rules.json", "sqs"]).is_err());
    assert!(Cli::try_parse_from(["apigen"]).is_err());
}

#[test]
fn service_without_output_prints_module() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "cloudtrail.json", TRAILS);

    let text = run(Command::Service {
        name: "CloudTrail".to_string(),
        input,
        output: None,
        runtime_crate: "crate::aws".to_string(),
    })
    .expect("generates");
    assert!(text.contains("pub fn stop_logging("));
    assert!(text.contains("req: StopLoggingRequest"));
    assert!(text.contains("crate::aws::JsonClient"));
}

#[test]
fn service_with_output_writes_file_only() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "cloudtrail.json", TRAILS);
    let output = dir.path().join("cloudtrail.rs");

    let text = run(Command::Service {
        name: "CloudTrail".to_string(),
        input,
        output: Some(output.clone()),
        runtime_crate: "aws".to_string(),
    })
    .expect("generates");
    assert!(text.is_empty());
    assert!(fs::read_to_string(output).expect("written").contains("pub struct CloudTrail"));
}

#[test]
fn lookup_prints_resolved_endpoint() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "_endpoints.json", RULES);

    let text = run(Command::Lookup {
        input: input.clone(),
        service: "iam".to_string(),
        region: "eu-west-1".to_string(),
    })
    .expect("resolves");
    assert_eq!(text, "https://iam.amazonaws.com (signing iam in us-east-1)\n");

    let text = run(Command::Lookup {
        input,
        service: "sqs".to_string(),
        region: "us-west-2".to_string(),
    })
    .expect("resolves");
    assert_eq!(text, "https://sqs.us-west-2.amazonaws.com (signing sqs in us-west-2)\n");
}

#[test]
fn lookup_without_match_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input = write(dir.path(), "_endpoints.json", RULES);

    let err = run(Command::Lookup {
        input,
        service: "sqs".to_string(),
        region: "eu-west-1".to_string(),
    })
    .expect_err("no rule matches");
    assert_eq!(err.to_string(), "no endpoint for service sqs in region eu-west-1");
}

#[test]
fn batch_reports_written_files() {
    let dir = tempfile::tempdir().expect("temp dir");
    let rules = write(dir.path(), "_endpoints.json", RULES);
    let trails = write(dir.path(), "cloudtrail.json", TRAILS);
    let out_dir = dir.path().join("out");
    let config = write(
        dir.path(),
        "apigen.toml",
        &format!(
            "[codegen]\noutput_dir = {:?}\n\n[endpoints]\ninput = {:?}\noutput = \"endpoints.rs\"\n\n[[services]]\nname = \"CloudTrail\"\ninput = {:?}\n",
            out_dir.display().to_string(),
            rules.display().to_string(),
            trails.display().to_string(),
        ),
    );

    let text = run(Command::Batch { config: Some(config) }).expect("batch runs");
    let lines: Vec<_> = text.lines().collect();
    assert_eq!(
        lines,
        [
            format!("wrote {}", out_dir.join("endpoints.rs").display()),
            format!("wrote {}", out_dir.join("cloudtrail.rs").display()),
        ]
    );
    assert!(out_dir.join("cloudtrail.rs").exists());
}

#[test]
fn batch_with_missing_config_fails() {
    let dir = tempfile::tempdir().expect("temp dir");
    let err = run(Command::Batch { config: Some(dir.path().join("absent.toml")) })
        .expect_err("no config");
    assert!(matches!(err, CliError::Config(config::ConfigError::NotFound(_))));
}
