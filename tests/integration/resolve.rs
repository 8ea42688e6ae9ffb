use crate::common::{TestProject, standard_toolkit};
use anyhow::Result;
use predicates::prelude::*;
use serde_json::Value;

#[test]
fn test_resolve_lists_dependencies_first() -> Result<()> {
    let project = TestProject::with(r#"{"modules": ["tailwind"]}"#, &standard_toolkit())?;

    let output = project.run_aikit(&["resolve"])?;
    output.assert_success().assert_stdout_contains("Modules (dependencies first):");

    let base = output.stdout.find("base").expect("base listed");
    let tailwind = output.stdout.find("tailwind").expect("tailwind listed");
    assert!(base < tailwind, "{}", output.stdout);
    assert!(output.stdout.contains("requires base"));
    Ok(())
}

#[test]
fn test_resolve_json() -> Result<()> {
    let project = TestProject::with(r#"{"modules": ["frontend/tailwind", "ghost"]}"#, &standard_toolkit())?;

    let output = project.run_aikit(&["resolve", "--format", "json"])?;
    output.assert_success();

    let resolved: Value = serde_json::from_str(&output.stdout)?;
    let names: Vec<&str> =
        resolved["modules"].as_array().into_iter().flatten().filter_map(|m| m["name"].as_str()).collect();
    assert_eq!(names, vec!["base", "tailwind"]);
    assert_eq!(resolved["modules"][1]["version"], "3.4.0");
    assert_eq!(resolved["modules"][1]["category"], "frontend");
    assert_eq!(resolved["missing"], serde_json::json!(["ghost"]));
    assert_eq!(resolved["conflicts"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_resolve_fails_on_conflicts() -> Result<()> {
    let project = TestProject::with(r#"{"modules": ["tailwind", "bootstrap"]}"#, &standard_toolkit())?;

    project
        .command()
        .arg("resolve")
        .assert()
        .failure()
        .stdout(predicate::str::contains("conflicts with 'bootstrap'"))
        .stderr(predicate::str::contains("Module resolution failed"));
    Ok(())
}
