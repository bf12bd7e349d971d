//! Merge strategy behavior across installs: ownership isolation, foreign
//! content preservation, and registry provenance.

use anyhow::Result;
use std::fs;

use codekit_cli::convert::DefaultConverter;
use codekit_cli::installer::Installer;
use codekit_cli::markdown::{SectionKind, SectionedDocument};
use codekit_cli::models::{ArtifactType, InstallOptions, PortableItem, ProviderType};
use codekit_cli::registry::JsonFileRegistry;
use codekit_cli::test_utils::init_test_logging;

use crate::common::{TestSpace, rule_item};

fn installer_for<'a>(
    space: &TestSpace,
    converter: &'a DefaultConverter,
    registry: &'a JsonFileRegistry,
) -> Installer<'a> {
    Installer::new(space.project_path(), converter, registry)
}

#[tokio::test]
async fn test_updating_one_section_leaves_the_other_byte_identical() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = installer_for(&space, &converter, &registry);

    let alpha = rule_item("alpha", "Alpha, first draft.");
    let beta = rule_item("beta", "Beta stays put.");
    let result = installer
        .install_portable_item(
            &[alpha, beta],
            ProviderType::Codex,
            ArtifactType::Rules,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);

    let before = space.read_project_file("AGENTS.md")?;
    let beta_section = "## Rule: beta\n\nBeta stays put.";
    assert!(before.contains(beta_section));

    let alpha = rule_item("alpha", "Alpha, rewritten.");
    let result = installer
        .install_portable_item(
            &[alpha],
            ProviderType::Codex,
            ArtifactType::Rules,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);

    let after = space.read_project_file("AGENTS.md")?;
    assert!(after.contains("Alpha, rewritten."));
    assert!(!after.contains("Alpha, first draft."));
    assert!(after.contains(beta_section), "beta's section must survive unchanged");
    Ok(())
}

#[tokio::test]
async fn test_merge_single_preserves_user_preamble_and_sections() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let target = space.project_path().join("AGENTS.md");
    let existing = "# Agents\n\nHand-written intro.\n\n## Notes\n\nKeep me around.\n";
    fs::write(&target, existing)?;

    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = installer_for(&space, &converter, &registry);

    let result = installer
        .install_portable_item(
            &[rule_item("style", "Prefer small functions.")],
            ProviderType::Codex,
            ArtifactType::Rules,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);
    assert!(result.overwritten);

    let merged = space.read_project_file("AGENTS.md")?;
    assert!(merged.contains("Hand-written intro."));
    assert!(merged.contains("## Notes\n\nKeep me around."));
    assert!(merged.contains("## Rule: style"));

    let document = SectionedDocument::parse(&merged);
    assert!(document.section(SectionKind::Rule, "style").is_some());
    Ok(())
}

#[tokio::test]
async fn test_yaml_merge_preserves_foreign_entry_with_comments() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let foreign_entry = concat!(
        "  - slug: \"hand-rolled\"\n",
        "    name: Hand Rolled\n",
        "    # tuned by hand, do not touch\n",
        "    roleDefinition: |-\n",
        "      Stays exactly as written.\n",
    );
    let existing = format!("customModes:\n{foreign_entry}");
    fs::write(space.project_path().join(".roomodes"), &existing)?;

    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = installer_for(&space, &converter, &registry);

    let result = installer
        .install_portable_item(
            &[PortableItem::new("architect", "You design systems.")],
            ProviderType::Roo,
            ArtifactType::Agent,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);

    let merged = space.read_project_file(".roomodes")?;
    assert!(merged.contains(foreign_entry), "foreign entry must survive byte-for-byte");
    assert!(merged.contains("- slug: \"architect\""));
    Ok(())
}

#[tokio::test]
async fn test_json_merge_replaces_own_slug_and_keeps_vendor_fields() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let existing = serde_json::json!({
        "customModes": [
            {
                "slug": "architect",
                "name": "Old Architect",
                "roleDefinition": "Old definition.",
                "groups": ["read"]
            },
            {
                "slug": "vendor-mode",
                "name": "Vendor Mode",
                "roleDefinition": "Vendor-defined.",
                "groups": ["read", "edit"],
                "vendorExtension": {"priority": 7}
            }
        ]
    });
    fs::write(
        space.project_path().join(".kilocodemodes"),
        serde_json::to_string_pretty(&existing)?,
    )?;

    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = installer_for(&space, &converter, &registry);

    let result = installer
        .install_portable_item(
            &[PortableItem::new("architect", "You design systems.")],
            ProviderType::Kilo,
            ArtifactType::Agent,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);

    let merged: serde_json::Value =
        serde_json::from_str(&space.read_project_file(".kilocodemodes")?)?;
    let modes = merged["customModes"].as_array().expect("customModes array");
    assert_eq!(modes.len(), 2, "same slug must replace, not accumulate");
    assert_eq!(modes[0]["slug"], "architect");
    assert!(modes[0]["roleDefinition"].as_str().unwrap().contains("You design systems."));
    assert_eq!(modes[1]["vendorExtension"]["priority"], 7);

    assert!(space.project_path().join("rules/architect.md").exists());
    Ok(())
}

#[tokio::test]
async fn test_merge_registry_records_section_ownership() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let converter = DefaultConverter;
    let registry_path = space.scratch_path().join("installs.json");
    let registry = JsonFileRegistry::new(&registry_path);
    let installer = installer_for(&space, &converter, &registry);

    let result = installer
        .install_portable_item(
            &[rule_item("alpha", "First."), rule_item("beta", "Second.")],
            ProviderType::Codex,
            ArtifactType::Rules,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);

    let records: serde_json::Value = serde_json::from_str(&fs::read_to_string(&registry_path)?)?;
    let records = records.as_array().expect("registry array");
    assert_eq!(records.len(), 2);
    for record in records {
        let name = record["name"].as_str().unwrap();
        let owned: Vec<&str> = record["owned_sections"]
            .as_array()
            .expect("owned_sections")
            .iter()
            .filter_map(|value| value.as_str())
            .collect();
        assert_eq!(owned, vec![name], "each item owns exactly its own section");
        assert!(record["target_checksum"].as_str().unwrap().starts_with("sha256:"));
    }
    Ok(())
}
