//! Merge-lock behavior under contention.

use anyhow::Result;
use std::time::Duration;

use serial_test::serial;

use codekit_cli::convert::DefaultConverter;
use codekit_cli::installer::Installer;
use codekit_cli::installer::merge_lock::MergeLock;
use codekit_cli::markdown::SectionedDocument;
use codekit_cli::models::{ArtifactType, InstallOptions, ProviderType};
use codekit_cli::registry::JsonFileRegistry;
use codekit_cli::test_utils::init_test_logging;

use crate::common::{TestSpace, rule_item};

#[tokio::test]
#[serial]
async fn test_concurrent_merges_into_one_file_both_land() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = Installer::new(space.project_path(), &converter, &registry);

    let options = InstallOptions::default();
    let alpha_items = [rule_item("alpha", "First writer.")];
    let beta_items = [rule_item("beta", "Second writer.")];
    let (first, second) = tokio::join!(
        installer.install_portable_item(
            &alpha_items,
            ProviderType::Codex,
            ArtifactType::Rules,
            &options,
        ),
        installer.install_portable_item(
            &beta_items,
            ProviderType::Codex,
            ArtifactType::Rules,
            &options,
        ),
    );

    assert!(first.success, "{:?}", first.error);
    assert!(second.success, "{:?}", second.error);

    // Locking serializes the read-merge-write cycles, so neither write may
    // clobber the other.
    let merged = space.read_project_file("AGENTS.md")?;
    let document = SectionedDocument::parse(&merged);
    assert_eq!(document.sections.len(), 2, "both sections must land:\n{merged}");
    assert!(merged.contains("First writer."));
    assert!(merged.contains("Second writer."));
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_held_lock_times_out_with_clear_error() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let target = space.project_path().join("AGENTS.md");
    let guard = MergeLock::acquire(&target, None).await?;

    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = Installer::new(space.project_path(), &converter, &registry);

    let options = InstallOptions {
        lock_timeout: Some(Duration::from_millis(120)),
        ..Default::default()
    };
    let result = installer
        .install_portable_item(
            &[rule_item("blocked", "Never lands.")],
            ProviderType::Codex,
            ArtifactType::Rules,
            &options,
        )
        .await;

    assert!(!result.success);
    let error = result.error.unwrap_or_default();
    assert!(error.contains("failed to acquire merge lock"), "{error}");
    assert!(!target.exists(), "timed-out install must not create the target");

    drop(guard);
    Ok(())
}

#[tokio::test]
#[serial]
async fn test_lock_is_released_after_install() -> Result<()> {
    init_test_logging();
    let space = TestSpace::new()?;
    let converter = DefaultConverter;
    let registry = JsonFileRegistry::new(space.scratch_path().join("installs.json"));
    let installer = Installer::new(space.project_path(), &converter, &registry);

    let result = installer
        .install_portable_item(
            &[rule_item("alpha", "First.")],
            ProviderType::Codex,
            ArtifactType::Rules,
            &InstallOptions::default(),
        )
        .await;
    assert!(result.success, "{:?}", result.error);

    // The marker is cleaned up and the lock is immediately re-acquirable.
    let target = space.project_path().join("AGENTS.md");
    assert!(!space.project_path().join(".AGENTS.md.ck-merge.lock").exists());
    let reacquired = MergeLock::acquire(&target, Some(Duration::from_millis(500))).await;
    assert!(reacquired.is_ok());
    Ok(())
}
