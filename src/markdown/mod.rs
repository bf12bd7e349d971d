//! Markdown machinery for shared config files.
//!
//! The [`sections`] module implements the managed-section document model
//! used by the merge-single strategy: one Markdown file (CLAUDE.md,
//! AGENTS.md) holding user prose alongside sections we own and rewrite.

pub mod sections;

pub use sections::{AGENTS_BANNER, Section, SectionKind, SectionedDocument};
