use crate::common::{TestProject, standard_toolkit};
use aikit_cli::test_utils::ToolkitFixture;
use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_validate_valid_project() -> Result<()> {
    let config = r#"{"modules": ["tailwind"], "editors": ["claude", "windsurf"]}"#;
    let project = TestProject::with(config, &standard_toolkit())?;

    project
        .run_aikit(&["validate"])?
        .assert_success()
        .assert_stdout_contains("Configuration is valid")
        .assert_stdout_contains("claude, windsurf")
        .assert_stdout_contains("base, tailwind");

    assert!(!project.project_path().join("CLAUDE.md").exists(), "validate must not write");
    Ok(())
}

#[test]
fn test_validate_json_output() -> Result<()> {
    let config = r#"{"modules": ["tailwind"], "agents": ["reviewer"]}"#;
    let project = TestProject::with(config, &standard_toolkit())?;

    let output = project.run_aikit(&["validate", "--format", "json"])?;
    output.assert_success();

    let results: Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(results["valid"], true);
    assert_eq!(results["editors"], serde_json::json!(["claude"]));
    assert_eq!(results["modules"], serde_json::json!(["base", "tailwind"]));
    assert_eq!(results["agents"], serde_json::json!(["reviewer"]));
    assert_eq!(results["errors"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_validate_reports_every_config_issue() -> Result<()> {
    let config = r#"{"standards": {"indentation": 99, "lineLength": 5}}"#;
    let project = TestProject::with(config, &standard_toolkit())?;

    project
        .command()
        .arg("validate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration validation failed"))
        .stderr(predicate::str::contains("standards.indentation"))
        .stderr(predicate::str::contains("standards.lineLength"));
    Ok(())
}

#[test]
fn test_validate_json_failure() -> Result<()> {
    let toolkit = ToolkitFixture::new().template("claude", "{{ undefinedThing }}\n");
    let project = TestProject::with("{}", &toolkit)?;

    let output = project.run_aikit(&["validate", "--format", "json"])?;
    output.assert_failure();

    let results: Value = serde_json::from_str(&output.stdout)?;
    assert_eq!(results["valid"], false);
    let error = results["errors"][0].as_str().unwrap_or_default();
    assert!(error.contains("undefinedThing"), "{error}");
    Ok(())
}

#[test]
fn test_validate_missing_template() -> Result<()> {
    let toolkit = ToolkitFixture::new().template("claude", "# {{ project.name }}\n");
    let project = TestProject::with(r#"{"editors": ["claude", "copilot"]}"#, &toolkit)?;

    project
        .run_aikit(&["validate"])?
        .assert_failure()
        .assert_stderr_contains("Template 'copilot.md' not found");
    Ok(())
}
