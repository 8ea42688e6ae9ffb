use crate::common::{TestProject, standard_toolkit};
use anyhow::Result;
use serde_json::Value;

#[test]
fn test_list_shows_modules_and_agents() -> Result<()> {
    let project = TestProject::with("{}", &standard_toolkit())?;

    project
        .run_aikit(&["list"])?
        .assert_success()
        .assert_stdout_contains("modules")
        .assert_stdout_contains("tailwind")
        .assert_stdout_contains("Utility-first CSS")
        .assert_stdout_contains("agents")
        .assert_stdout_contains("reviewer");
    Ok(())
}

#[test]
fn test_list_agents_json() -> Result<()> {
    let project = TestProject::with("{}", &standard_toolkit())?;

    let output = project.run_aikit(&["list", "agents", "--format", "json"])?;
    output.assert_success();

    let items: Value = serde_json::from_str(&output.stdout)?;
    let items = items.as_array().expect("array");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "agent");
    assert_eq!(items[0]["name"], "reviewer");
    assert_eq!(items[0]["description"], "Reviews changes");
    Ok(())
}

#[test]
fn test_list_works_without_project_config() -> Result<()> {
    let project = TestProject::new()?;
    standard_toolkit().write_into(project.toolkit_path());

    let output = project.run_aikit(&["list", "modules", "--format", "json"])?;
    output.assert_success();

    let items: Value = serde_json::from_str(&output.stdout)?;
    let names: Vec<&str> = items.as_array().into_iter().flatten().filter_map(|i| i["name"].as_str()).collect();
    for expected in ["base", "tailwind", "bootstrap", "craft-cms"] {
        assert!(names.contains(&expected), "{names:?}");
    }
    Ok(())
}

#[test]
fn test_list_empty_toolkit() -> Result<()> {
    let project = TestProject::new()?;

    project.run_aikit(&["list"])?.assert_success().assert_stdout_contains("No modules or agents found.");
    Ok(())
}
