//! End-to-end tests for the `ck providers` support matrix.

use anyhow::Result;
use predicates::prelude::*;

use crate::common::TestSpace;

#[test]
fn test_providers_lists_every_provider() -> Result<()> {
    let space = TestSpace::new()?;

    let assert = space.ck_command().arg("providers").assert().success();
    let output = assert.get_output();
    let stdout = String::from_utf8_lossy(&output.stdout);

    for provider in
        ["claude-code", "cursor", "windsurf", "cline", "roo", "kilo", "codex", "copilot"]
    {
        assert!(stdout.contains(provider), "matrix should list {provider}:\n{stdout}");
    }
    assert!(stdout.contains("per-file"));
    assert!(stdout.contains("merge-single"));
    assert!(stdout.contains("yaml-merge"));
    assert!(stdout.contains("json-merge"));
    assert!(stdout.contains("single-file"));
    Ok(())
}

#[test]
fn test_providers_type_filter_narrows_output() -> Result<()> {
    let space = TestSpace::new()?;

    space
        .ck_command()
        .args(["providers", "--type", "rules"])
        .assert()
        .success()
        .stdout(predicate::str::contains("copilot"))
        .stdout(predicate::str::contains(".github/copilot-instructions.md"))
        // Cursor supports rules but not skills; no skill rows may appear.
        .stdout(predicate::str::contains("skill").not());
    Ok(())
}

#[test]
fn test_providers_unknown_type_suggests_closest_name() -> Result<()> {
    let space = TestSpace::new()?;

    space
        .ck_command()
        .args(["providers", "--type", "ruless"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Did you mean 'rules'?"));
    Ok(())
}
