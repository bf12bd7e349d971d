//! Tests for global configuration loading and precedence in the CLI.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::{TestSpace, agent_item};

#[test]
fn test_config_flag_disables_provider() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;
    let config = space.write_config("disabled_providers = [\"claude-code\"]\n")?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("provider is disabled in configuration"));

    assert!(!space.project_path().join(".claude").exists());
    Ok(())
}

#[test]
fn test_ck_config_env_is_honored() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;
    let config = space.write_config("disabled_providers = [\"claude-code\"]\n")?;

    space
        .ck_command()
        .env("CK_CONFIG", &config)
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code"])
        .assert()
        .success()
        .stdout(predicate::str::contains("provider is disabled in configuration"));
    Ok(())
}

#[test]
fn test_config_flag_wins_over_env() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;
    let disabling = space.write_config("disabled_providers = [\"claude-code\"]\n")?;
    let permissive = space.scratch_path().join("permissive.toml");
    std::fs::write(&permissive, "disabled_providers = []\n")?;

    space
        .ck_command()
        .env("CK_CONFIG", &disabling)
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--config"])
        .arg(&permissive)
        .assert()
        .success()
        .stdout(predicate::str::contains("Install complete!"));

    assert!(space.project_path().join(".claude/agents/helper.md").exists());
    Ok(())
}

#[test]
fn test_path_override_redirects_project_target() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;
    let config = space.write_config("[paths.claude-code.agent]\nproject = \"custom/agents\"\n")?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--config"])
        .arg(&config)
        .assert()
        .success();

    assert!(space.project_path().join("custom/agents/helper.md").exists());
    assert!(!space.project_path().join(".claude").exists());
    Ok(())
}

#[test]
fn test_default_scope_global_installs_into_home() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;
    let config = space.write_config("default_scope = \"global\"\n")?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--config"])
        .arg(&config)
        .assert()
        .success();

    assert!(space.home_path().join(".claude/agents/helper.md").exists());
    assert!(!space.project_path().join(".claude").exists());
    Ok(())
}

#[test]
fn test_broken_config_file_fails_with_context() -> Result<()> {
    let space = TestSpace::new()?;
    let items = space.write_items("items.json", &[agent_item("helper")])?;
    let config = space.write_config("default_scope = [broken\n")?;

    space
        .ck_command()
        .args(["install", "--items"])
        .arg(&items)
        .args(["--type", "agent", "--provider", "claude-code", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
    Ok(())
}
