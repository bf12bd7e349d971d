//! Managed-section parsing and serialization for shared Markdown files.
//!
//! Files like CLAUDE.md and AGENTS.md mix two kinds of content: prose the
//! user wrote, and sections installed by us. This module gives those files
//! a stable document model:
//!
//! ```text
//! <preamble (user prose, optional)>
//!
//! ---
//!
//! ## Agent: reviewer        <- managed section
//! ...
//!
//! ---
//!
//! <anything unrecognized>   <- unknown section, preserved verbatim
//! ```
//!
//! Sections are separated by a bare `---` line. Managed sections start with
//! a case-insensitive `## Agent: <name>`, `## Rule: <name>`, or `## Config`
//! heading; everything else between separators is kept as an unknown
//! section and written back untouched, so re-running an install never
//! destroys user content.
//!
//! The parser is a single-pass line scanner with a fence state machine:
//! heading and separator lines inside ``` or ~~~ code fences are plain
//! text, so documentation that quotes our own heading syntax doesn't get
//! sliced apart.
//!
//! Line endings are normalized to LF on rewrite; section bodies are stored
//! trimmed and re-joined with canonical separators, which makes
//! parse-serialize-parse idempotent.

use regex::Regex;
use std::sync::LazyLock;

/// Canonical separator written between sections.
pub const SECTION_SEPARATOR: &str = "\n\n---\n\n";

/// Header block written at the top of a file we created ourselves.
///
/// Only added when the file has no user preamble and every section is an
/// agent definition (the fresh AGENTS.md case). The parser strips it back
/// out by exact prefix match, so it never leaks into user preamble text.
/// It must not contain a bare `---` line or a managed heading.
pub const AGENTS_BANNER: &str = "# Agents\n\n> Agent definitions below are managed by ck. \
Content outside managed sections is preserved on update.";

static AGENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^##\s+agent:\s*(.+?)\s*$").unwrap());
static RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^##\s+rule:\s*(.+?)\s*$").unwrap());
static CONFIG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^##\s+config\s*$").unwrap());

/// What a section represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    /// `## Agent: <name>` section
    Agent,
    /// `## Rule: <name>` section
    Rule,
    /// `## Config` section (at most one per document)
    Config,
    /// Unrecognized fragment, preserved verbatim
    Unknown,
}

/// One section of a managed Markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Kind parsed from the section heading (or [`SectionKind::Unknown`])
    pub kind: SectionKind,
    /// Identity within the kind: the heading name, `config`, or `unknown-N`
    pub key: String,
    /// Trimmed section text, heading line included
    pub content: String,
}

/// A parsed shared Markdown file: optional user preamble plus sections.
#[derive(Debug, Clone, Default)]
pub struct SectionedDocument {
    /// User prose that appeared before the first managed heading
    pub preamble: Option<String>,
    /// Sections in document order
    pub sections: Vec<Section>,
    /// Non-fatal notes from parsing (duplicate headings)
    pub warnings: Vec<String>,
}

enum LineClass {
    Separator,
    Heading(SectionKind, String),
    Text,
}

fn classify_lines(lines: &[&str]) -> Vec<LineClass> {
    let mut classes = Vec::with_capacity(lines.len());
    let mut fence: Option<&'static str> = None;

    for line in lines {
        let trimmed = line.trim_start();

        if let Some(marker) = fence {
            // Only the marker that opened the fence closes it; the other
            // marker is literal content inside.
            if trimmed.starts_with(marker) {
                fence = None;
            }
            classes.push(LineClass::Text);
            continue;
        }
        if trimmed.starts_with("```") {
            fence = Some("```");
            classes.push(LineClass::Text);
            continue;
        }
        if trimmed.starts_with("~~~") {
            fence = Some("~~~");
            classes.push(LineClass::Text);
            continue;
        }

        if line.trim() == "---" {
            classes.push(LineClass::Separator);
            continue;
        }

        if let Some(caps) = AGENT_RE.captures(line) {
            classes.push(LineClass::Heading(SectionKind::Agent, caps[1].to_string()));
        } else if let Some(caps) = RULE_RE.captures(line) {
            classes.push(LineClass::Heading(SectionKind::Rule, caps[1].to_string()));
        } else if CONFIG_RE.is_match(line) {
            classes.push(LineClass::Heading(SectionKind::Config, "config".to_string()));
        } else {
            classes.push(LineClass::Text);
        }
    }

    classes
}

fn clean_preamble(raw: &str) -> Option<String> {
    let without_banner = raw.strip_prefix(AGENTS_BANNER).unwrap_or(raw);
    let mut text = without_banner.trim_end();

    // A trailing bare `---` line belongs to the separator, not the prose.
    if text == "---" {
        text = "";
    } else if let Some(stripped) = text.strip_suffix("\n---") {
        text = stripped;
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl SectionedDocument {
    /// Parses a shared Markdown file into preamble and sections.
    ///
    /// Everything before the first managed heading is preamble. After it,
    /// the document is split on bare `---` lines (and on managed headings,
    /// so two sections pasted together without a separator still parse as
    /// two). Fragments that don't start with a managed heading become
    /// unknown sections, keyed `unknown-1`, `unknown-2`, ...
    ///
    /// A repeated `(kind, name)` heading keeps the later content in the
    /// earlier position and records a warning.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let lines: Vec<&str> = content.lines().collect();
        let classes = classify_lines(&lines);

        let first_heading = classes
            .iter()
            .position(|c| matches!(c, LineClass::Heading(..)));

        let Some(first_heading) = first_heading else {
            return Self {
                preamble: clean_preamble(content),
                sections: Vec::new(),
                warnings: Vec::new(),
            };
        };

        let preamble = clean_preamble(&lines[..first_heading].join("\n"));

        let mut doc = Self {
            preamble,
            sections: Vec::new(),
            warnings: Vec::new(),
        };

        let mut unknown_counter = 0usize;
        let mut block: Vec<&str> = Vec::new();
        let mut block_heading: Option<(SectionKind, String)> = None;

        let flush =
            |block: &mut Vec<&str>,
             heading: &mut Option<(SectionKind, String)>,
             doc: &mut SectionedDocument,
             unknown_counter: &mut usize| {
                let content = block.join("\n").trim().to_string();
                block.clear();
                let heading = heading.take();
                if content.is_empty() {
                    return;
                }

                let (kind, key) = match heading {
                    Some((kind, key)) => (kind, key),
                    None => {
                        *unknown_counter += 1;
                        (SectionKind::Unknown, format!("unknown-{unknown_counter}"))
                    }
                };

                if kind != SectionKind::Unknown
                    && let Some(existing) = doc
                        .sections
                        .iter_mut()
                        .find(|s| s.kind == kind && s.key == key)
                {
                    doc.warnings.push(format!(
                        "duplicate section '{key}': keeping the later occurrence"
                    ));
                    existing.content = content;
                    return;
                }

                doc.sections.push(Section { kind, key, content });
            };

        for (idx, class) in classes.iter().enumerate().skip(first_heading) {
            match class {
                LineClass::Separator => {
                    flush(&mut block, &mut block_heading, &mut doc, &mut unknown_counter);
                }
                LineClass::Heading(kind, key) => {
                    // A heading starts a new section even without a separator
                    // in front of it.
                    flush(&mut block, &mut block_heading, &mut doc, &mut unknown_counter);
                    block_heading = Some((*kind, key.clone()));
                    block.push(lines[idx]);
                }
                LineClass::Text => block.push(lines[idx]),
            }
        }
        flush(&mut block, &mut block_heading, &mut doc, &mut unknown_counter);

        doc
    }

    /// Inserts or replaces the section identified by `(kind, key)`.
    ///
    /// Returns `true` when an existing section was replaced in place,
    /// `false` when the section was appended.
    pub fn upsert(&mut self, kind: SectionKind, key: &str, content: String) -> bool {
        if let Some(existing) = self
            .sections
            .iter_mut()
            .find(|s| s.kind == kind && s.key == key)
        {
            existing.content = content.trim().to_string();
            true
        } else {
            self.sections.push(Section {
                kind,
                key: key.to_string(),
                content: content.trim().to_string(),
            });
            false
        }
    }

    /// Looks up a section by identity.
    #[must_use]
    pub fn section(&self, kind: SectionKind, key: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.kind == kind && s.key == key)
    }

    /// Serializes the document back to Markdown.
    ///
    /// Sections are joined with the canonical separator. A user preamble
    /// leads the file; absent one, a document that is purely agent
    /// definitions gets the [`AGENTS_BANNER`] header so a fresh AGENTS.md
    /// explains itself.
    #[must_use]
    pub fn serialize(&self) -> String {
        if self.sections.is_empty() {
            return match &self.preamble {
                Some(preamble) => format!("{preamble}\n"),
                None => String::new(),
            };
        }

        let body = self
            .sections
            .iter()
            .map(|s| s.content.as_str())
            .collect::<Vec<_>>()
            .join(SECTION_SEPARATOR);

        match &self.preamble {
            Some(preamble) => format!("{preamble}{SECTION_SEPARATOR}{body}\n"),
            None => {
                let all_agents = self.sections.iter().all(|s| s.kind == SectionKind::Agent);
                if all_agents {
                    format!("{AGENTS_BANNER}{SECTION_SEPARATOR}{body}\n")
                } else {
                    format!("{body}\n")
                }
            }
        }
    }
}
