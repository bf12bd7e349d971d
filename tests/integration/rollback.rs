//! Failure handling: snapshots must restore merge targets to their exact
//! prior bytes, and failures before any write must leave targets untouched.

use anyhow::Result;
use std::fs;

use codekit_cli::convert::DefaultConverter;
use codekit_cli::installer::Installer;
use codekit_cli::models::{ArtifactType, InstallOptions, PortableItem, ProviderType};
use codekit_cli::registry::JsonFileRegistry;
use codekit_cli::test_utils::{FailingConverter, init_test_logging, rule_item};

use crate::common::TestSpace;

#[tokio::test]
async fn test_failed_conversion_leaves_merge_target_untouched() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let target = space.project_path().join("AGENTS.md");
    let existing = "# Agents\n\nPrecious user content.\n";
    fs::write(&target, existing)?;

    let converter = FailingConverter::new("render exploded");
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = Installer::new(space.project_path(), &converter, &registry);

    let result = installer
        .install_portable_item(
            &[rule_item("style", "Never lands.")],
            ProviderType::Codex,
            ArtifactType::Rules,
            &InstallOptions::default(),
        )
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap_or_default().contains("render exploded"));
    assert_eq!(fs::read_to_string(&target)?, existing, "failed install must not modify bytes");
    Ok(())
}

#[tokio::test]
async fn test_json_merge_failure_restores_every_written_file() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let root = space.project_path().join(".kilocodemodes");
    let existing = serde_json::to_string_pretty(&serde_json::json!({
        "customModes": [{
            "slug": "keeper",
            "name": "Keeper",
            "roleDefinition": "Holds the fort.",
            "groups": ["read"]
        }]
    }))?;
    fs::write(&root, &existing)?;

    // A directory squatting on the second rule-file path makes its snapshot
    // fail after the root and the first rule file were already written.
    fs::create_dir_all(space.project_path().join("rules/bad.md"))?;

    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = Installer::new(space.project_path(), &converter, &registry);

    let result = installer
        .install_portable_item(
            &[
                PortableItem::new("good", "You are the good agent."),
                PortableItem::new("bad", "You are the bad agent."),
            ],
            ProviderType::Kilo,
            ArtifactType::Agent,
            &InstallOptions::default(),
        )
        .await;

    assert!(!result.success);
    assert_eq!(
        fs::read_to_string(&root)?,
        existing,
        "mode root must be restored to its exact prior bytes"
    );
    assert!(
        !space.project_path().join("rules/good.md").exists(),
        "files written before the failure must be removed"
    );
    assert!(
        fs::read_to_string(space.scratch_path().join("installs.json")).is_err(),
        "nothing may be registered for a rolled-back install"
    );
    Ok(())
}

#[tokio::test]
async fn test_yaml_schema_failure_leaves_file_untouched() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let target = space.project_path().join(".roomodes");
    let existing = "modes:\n  - wrong: root\n";
    fs::write(&target, existing)?;

    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = Installer::new(space.project_path(), &converter, &registry);

    let result = installer
        .install_portable_item(
            &[PortableItem::new("architect", "You design systems.")],
            ProviderType::Roo,
            ArtifactType::Agent,
            &InstallOptions::default(),
        )
        .await;

    assert!(!result.success);
    assert!(result.error.unwrap_or_default().contains("customModes"));
    assert_eq!(fs::read_to_string(&target)?, existing);
    Ok(())
}
