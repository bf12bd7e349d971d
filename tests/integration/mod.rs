//! Integration test suite for CodeKit
//!
//! This test suite contains end-to-end tests that verify the complete
//! functionality of CodeKit installs across providers, scopes, and write
//! strategies. These tests run relatively quickly and are executed in CI on
//! every commit.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! cargo nextest run --test integration
//! ```
//!
//! # Test Organization
//!
//! Tests are organized by functionality area:
//! - **cli_install**: The `ck install` command end to end
//! - **cli_providers**: The `ck providers` support matrix
//! - **concurrency**: Merge-lock serialization and timeouts
//! - **config_behavior**: Global config loading, overrides, and precedence
//! - **merge_behavior**: Idempotence, ownership isolation, foreign content
//! - **rollback**: Failure handling and byte-exact restoration

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

// Integration tests
mod cli_install;
mod cli_providers;
mod concurrency;
mod config_behavior;
mod merge_behavior;
mod rollback;
