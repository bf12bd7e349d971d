//! Common test utilities and fixtures for CodeKit integration tests
//!
//! This module consolidates frequently used test patterns to reduce
//! duplication and improve test maintainability.

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use codekit_cli::models::PortableItem;

/// An isolated workspace for one test: a project tree, a fake home
/// directory, and a scratch area for items files.
///
/// Commands built by [`ck_command`](Self::ck_command) run with `HOME` and
/// `XDG_CONFIG_HOME` pointing into the fake home, so global installs and the
/// install registry never touch the real user environment.
pub struct TestSpace {
    temp: TempDir,
    project: PathBuf,
    home: PathBuf,
}

impl TestSpace {
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create test directory")?;
        let project = temp.path().join("project");
        let home = temp.path().join("home");
        fs::create_dir_all(&project)?;
        fs::create_dir_all(&home)?;
        Ok(Self { temp, project, home })
    }

    pub fn project_path(&self) -> &Path {
        &self.project
    }

    pub fn home_path(&self) -> &Path {
        &self.home
    }

    /// Scratch path outside both the project tree and the fake home.
    pub fn scratch_path(&self) -> &Path {
        self.temp.path()
    }

    /// Serialize `items` to a JSON file and return its path.
    pub fn write_items(&self, name: &str, items: &[PortableItem]) -> Result<PathBuf> {
        let path = self.temp.path().join(name);
        let json = serde_json::to_string_pretty(items)?;
        fs::write(&path, json)?;
        Ok(path)
    }

    /// Write a global config file and return its path.
    pub fn write_config(&self, content: &str) -> Result<PathBuf> {
        let path = self.temp.path().join("config.toml");
        fs::write(&path, content)?;
        Ok(path)
    }

    /// A `ck` command scoped to this test space.
    ///
    /// The environment is pinned per command, so parallel tests never race
    /// on process-global state.
    pub fn ck_command(&self) -> Command {
        let mut cmd = Command::cargo_bin("ck").expect("ck binary should build");
        cmd.current_dir(&self.project)
            .env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", self.home.join(".config"))
            .env_remove("CK_CONFIG")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Read a file under the project tree.
    pub fn read_project_file(&self, relative: &str) -> Result<String> {
        let path = self.project.join(relative);
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// Read a file under the fake home tree.
    pub fn read_home_file(&self, relative: &str) -> Result<String> {
        let path = self.home.join(relative);
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
    }

    /// The install registry file inside the fake home, if written.
    pub fn registry_path(&self) -> PathBuf {
        self.home.join(".config/ck/installs.json")
    }
}

// Item builders shared with the unit tests
pub use codekit_cli::test_utils::{agent_item, rule_item};
