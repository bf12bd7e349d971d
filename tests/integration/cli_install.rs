//! End-to-end tests for the `ck install` command.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::{TestSpace, agent_item, rule_item};

#[test]
fn test_install_writes_per_file_agent() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claude-code"))
        .stdout(predicate::str::contains("Install complete!"));

    let content = space.read_project_file(".claude/agents/helper.md")?;
    assert!(content.starts_with("---\n"), "expected frontmatter, got: {content}");
    assert!(content.contains("You are the helper agent."));
    Ok(())
}

#[test]
fn test_install_reports_each_provider_on_its_own_line() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code,codex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("claude-code:"))
        .stdout(predicate::str::contains("codex:"));

    assert!(space.project_path().join(".claude/agents/helper.md").exists());
    assert!(space.project_path().join("AGENTS.md").exists());
    Ok(())
}

#[test]
fn test_install_json_output_is_parseable() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    let output = space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--json"])
        .output()?;

    assert!(output.status.success());
    let results: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let results = results.as_array().expect("JSON output should be an array");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["provider"], "claude-code");
    assert_eq!(results[0]["success"], true);
    assert!(results[0]["path"].as_str().unwrap_or_default().ends_with(".claude/agents"));
    Ok(())
}

#[test]
fn test_install_unknown_provider_suggests_closest_name() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "codx"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'codex'?"));
    Ok(())
}

#[test]
fn test_install_unknown_artifact_suggests_closest_name() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agnet", "--provider", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'agent'?"));
    Ok(())
}

#[test]
fn test_install_missing_items_file_fails() -> Result<()> {
    let space = TestSpace::new()?;

    space
        .ck_command()
        .args(["install", "--items", "no-such-items.json", "--type", "agent", "--provider", "all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read items file"));
    Ok(())
}

#[test]
fn test_install_exits_nonzero_when_every_provider_fails() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    // Cursor has no skill mapping, so the lone provider fails.
    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "skill", "--provider", "cursor"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not support skill artifacts"));
    Ok(())
}

#[test]
fn test_install_partial_failure_still_exits_zero() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    // Claude Code supports skills, cursor does not; one success is enough.
    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "skill", "--provider", "claude-code,cursor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("does not support skill artifacts"))
        .stdout(predicate::str::contains("Install complete!"));

    assert!(space.project_path().join(".claude/skills/helper.md").exists());
    Ok(())
}

#[test]
fn test_install_global_writes_into_home() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--global"])
        .assert()
        .success();

    assert!(space.home_path().join(".claude/agents/helper.md").exists());
    assert!(!space.project_path().join(".claude").exists());
    Ok(())
}

#[test]
fn test_codex_commands_install_globally_without_flag() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[rule_item("ship-it", "Run the release.")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "command", "--provider", "codex"])
        .assert()
        .success();

    assert!(space.home_path().join(".codex/prompts/ship-it.md").exists());
    Ok(())
}

#[test]
fn test_install_records_registry_in_config_dir() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--source", "starter-kit"])
        .assert()
        .success();

    let registry = std::fs::read_to_string(space.registry_path())?;
    assert!(registry.contains("\"helper\""));
    assert!(registry.contains("starter-kit"));
    Ok(())
}

#[test]
fn test_reinstall_keeps_merge_target_byte_identical() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[rule_item("style", "Prefer small functions.")])?;

    let install = |space: &TestSpace| {
        space
            .ck_command()
            .args(["install", "--items"])
            .arg(&items)
            .args(["--type", "rules", "--provider", "codex"])
            .assert()
            .success();
    };

    install(&space);
    let first = space.read_project_file("AGENTS.md")?;
    install(&space);
    let second = space.read_project_file("AGENTS.md")?;

    assert_eq!(first, second);
    Ok(())
}

#[test]
fn test_install_skips_item_already_at_target() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code"])
        .assert()
        .success();

    // Re-point the item's source at the file the first run installed.
    let installed = space.project_path().join(".claude/agents/helper.md");
    let resident = agent_item("helper").with_source_path(&installed);
    let items = space.write_items("resident.json", &[resident])?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists at source location"));
    Ok(())
}
