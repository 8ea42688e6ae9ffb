use crate::common::{FileAssert, TestProject, standard_toolkit};
use aikit_cli::test_utils::ToolkitFixture;
use anyhow::Result;
use predicates::prelude::*;

const CONFIG: &str = r#"{
    "project": {"name": "shop"},
    "modules": ["frontend/tailwind"],
    "agents": ["reviewer"],
    "editors": ["claude", "cursor"]
}"#;

#[test]
fn test_generate_writes_every_selected_editor() -> Result<()> {
    let project = TestProject::with(CONFIG, &standard_toolkit())?;

    project.run_aikit(&["generate"])?.assert_success().assert_stdout_contains("written, 0 unchanged");

    let claude = project.read_file("CLAUDE.md")?;
    assert!(claude.starts_with("# shop"));
    assert!(claude.contains("Uses a CSS framework."));
    assert!(claude.contains("Indent with 2 spaces."));
    assert!(claude.contains("Styles live in src/css."));

    let base = claude.find("## base (1.0.0)").expect("base section");
    let tailwind = claude.find("## tailwind (3.4.0)").expect("tailwind section");
    assert!(base < tailwind, "dependencies come first:\n{claude}");

    let cursor = project.project_path().join(".cursor/rules/project.mdc");
    FileAssert::contains(&cursor, "- base\n- tailwind");
    FileAssert::contains(project.project_path().join(".claude/agents/reviewer.md"), "Review shop carefully.");

    FileAssert::not_exists(project.project_path().join(".github/copilot-instructions.md"));
    FileAssert::not_exists(project.project_path().join("AGENTS.md"));
    Ok(())
}

#[test]
fn test_second_run_writes_nothing() -> Result<()> {
    let project = TestProject::with(CONFIG, &standard_toolkit())?;

    project.run_aikit(&["generate"])?.assert_success();
    let first = project.read_file("CLAUDE.md")?;

    project.run_aikit(&["generate"])?.assert_success().assert_stdout_contains("✓ 0 written");
    assert_eq!(project.read_file("CLAUDE.md")?, first);
    Ok(())
}

#[test]
fn test_conflicting_modules_abort_before_writing() -> Result<()> {
    let config = r#"{"modules": ["tailwind", "bootstrap"]}"#;
    let project = TestProject::with(config, &standard_toolkit())?;

    project
        .command()
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Module 'tailwind' conflicts with 'bootstrap'"));

    FileAssert::not_exists(project.project_path().join("CLAUDE.md"));
    Ok(())
}

#[test]
fn test_unbound_variables_are_all_reported() -> Result<()> {
    let toolkit = ToolkitFixture::new()
        .template("claude", "{{ project.name }} {{ ghost.one }}\n")
        .template("agents", "{{ block.title }}\n");
    let project = TestProject::with(r#"{"editors": ["claude", "codex"]}"#, &toolkit)?;

    let output = project.run_aikit(&["generate"])?;
    output
        .assert_failure()
        .assert_stderr_contains("Template validation failed")
        .assert_stderr_contains("Template 'claude.md' references undefined variables: ghost")
        .assert_stderr_contains("Template 'agents.md' references undefined variables: block");

    FileAssert::not_exists(project.project_path().join("CLAUDE.md"));
    FileAssert::not_exists(project.project_path().join("AGENTS.md"));
    Ok(())
}

#[test]
fn test_unknown_editor_flag() -> Result<()> {
    let project = TestProject::with("{}", &standard_toolkit())?;

    project
        .command()
        .args(["generate", "--editor", "cursr"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown editor 'cursr'"));
    Ok(())
}

#[test]
fn test_editor_flag_replaces_configured_editors() -> Result<()> {
    let project = TestProject::with(CONFIG, &standard_toolkit())?;

    project.run_aikit(&["generate", "--editor", "copilot"])?.assert_success();

    FileAssert::contains(project.project_path().join(".github/copilot-instructions.md"), "# shop for Copilot");
    FileAssert::not_exists(project.project_path().join("CLAUDE.md"));
    Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
    let project = TestProject::with(CONFIG, &standard_toolkit())?;

    project
        .run_aikit(&["generate", "--dry-run"])?
        .assert_success()
        .assert_stdout_contains("Dry run")
        .assert_stdout_contains("would write")
        .assert_stdout_contains("CLAUDE.md");

    FileAssert::not_exists(project.project_path().join("CLAUDE.md"));
    FileAssert::not_exists(project.project_path().join(".cursor"));
    Ok(())
}

#[test]
fn test_missing_module_is_a_warning() -> Result<()> {
    let project = TestProject::with(r#"{"modules": ["base", "ghost"]}"#, &standard_toolkit())?;

    project
        .run_aikit(&["generate"])?
        .assert_success()
        .assert_stderr_contains("Module 'ghost' not found in any search root");

    FileAssert::contains(project.project_path().join("CLAUDE.md"), "## base");
    Ok(())
}

#[test]
fn test_deselected_editor_rules_are_removed() -> Result<()> {
    let project = TestProject::with(CONFIG, &standard_toolkit())?;
    project.run_aikit(&["generate"])?.assert_success();
    FileAssert::exists(project.project_path().join(".cursor/rules/project.mdc"));

    project.write_config(r#"{"project": {"name": "shop"}, "editors": ["claude"]}"#)?;
    project.run_aikit(&["generate"])?.assert_success().assert_stdout_contains("removed");

    FileAssert::not_exists(project.project_path().join(".cursor/rules"));
    FileAssert::exists(project.project_path().join("CLAUDE.md"));
    Ok(())
}

#[test]
fn test_project_override_shadows_toolkit_module() -> Result<()> {
    let project = TestProject::with(r#"{"modules": ["base"]}"#, &standard_toolkit())?;
    project.write_file(".aikit/modules/base.md", "---\nversion: 9.9.9\n---\nLocal house rules.\n")?;

    project.run_aikit(&["generate"])?.assert_success();

    let claude = project.read_file("CLAUDE.md")?;
    assert!(claude.contains("## base (9.9.9)"));
    assert!(claude.contains("Local house rules."));
    assert!(!claude.contains("Indent with"));
    Ok(())
}

#[test]
fn test_engine_syntax_in_module_body_survives() -> Result<()> {
    let project = TestProject::with(r#"{"modules": ["core/*"]}"#, &standard_toolkit())?;

    project.run_aikit(&["generate"])?.assert_success();

    let claude = project.read_file("CLAUDE.md")?;
    assert!(claude.contains("## craft-cms"));
    assert!(claude.contains("Twig: {{ entry.title }}"), "{claude}");
    Ok(())
}

#[test]
fn test_yaml_project_config() -> Result<()> {
    let project = TestProject::new()?;
    standard_toolkit().write_into(project.toolkit_path());
    project.write_file("aikit.yaml", "project:\n  name: yaml-shop\nmodules:\n  - base\n")?;

    project.run_aikit(&["generate"])?.assert_success();

    FileAssert::contains(project.project_path().join("CLAUDE.md"), "# yaml-shop");
    Ok(())
}

#[test]
fn test_project_rules_are_included() -> Result<()> {
    let config = r#"{"project": {"name": "shop"}, "context": "docs/rules.md"}"#;
    let project = TestProject::with(config, &standard_toolkit())?;
    project.write_file("docs/rules.md", "Never edit vendor/.")?;

    project.run_aikit(&["generate"])?.assert_success();

    FileAssert::contains(project.project_path().join("CLAUDE.md"), "## Project rules\nNever edit vendor/.");
    Ok(())
}

#[test]
fn test_missing_project_config() -> Result<()> {
    let project = TestProject::new()?;

    project
        .run_aikit(&["generate"])?
        .assert_failure()
        .assert_stderr_contains("Project configuration not found");
    Ok(())
}

#[test]
fn test_missing_toolkit_directory() -> Result<()> {
    let project = TestProject::with("{}", &standard_toolkit())?;
    let nowhere = project.project_path().join("no-such-toolkit");

    project
        .command()
        .arg("--toolkit")
        .arg(&nowhere)
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Toolkit directory not found"));
    Ok(())
}
