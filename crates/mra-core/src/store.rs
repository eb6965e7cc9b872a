//! Append-only log and artifact stores
//!
//! Both stores only ever grow: entries are appended in insertion order and
//! never mutated or deleted. Convenience reads cover the derived views the
//! presentation layer needs - the full transcript, a bounded trailing
//! window, and "the current artifact of a kind" (first match, as the
//! reference views resolve it).

use crate::types::AgentRole;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Unique log entry identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LogId(pub Ulid);

impl LogId {
    /// Generate new log id
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for LogId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who authored a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRole {
    /// The human who started the run
    User,
    /// An agent handler reporting its result
    Agent,
    /// The orchestrator itself
    System,
}

/// One entry in the run transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Unique identifier
    pub id: LogId,
    /// Author class
    pub role: LogRole,
    /// Agent role the entry is attributed to, if any
    #[serde(rename = "agentRole", skip_serializing_if = "Option::is_none")]
    pub agent_role: Option<AgentRole>,
    /// Entry text
    pub content: String,
    /// Wall-clock instant of insertion
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Create an entry stamped with the current instant
    #[inline]
    #[must_use]
    pub fn new(role: LogRole, content: impl Into<String>, agent_role: Option<AgentRole>) -> Self {
        Self {
            id: LogId::new(),
            role,
            agent_role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Append-only, insertion-ordered run transcript
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogStore {
    entries: Vec<LogEntry>,
}

impl LogStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, returning its id
    pub fn append(&mut self, entry: LogEntry) -> LogId {
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// All entries, in insertion order
    #[inline]
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The trailing window of at most `n` entries, in insertion order
    #[must_use]
    pub fn tail(&self, n: usize) -> &[LogEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the transcript is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The closed set of artifact kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Generated plan
    Plan,
    /// Gathered research data
    Data,
    /// Produced script/source
    Code,
    /// Environment configuration
    Env,
    /// Result analysis
    Analysis,
    /// Final documentation
    Doc,
}

/// A typed, titled textual work product of a step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Artifact kind
    #[serde(rename = "type")]
    pub kind: ArtifactKind,
    /// Display title
    pub title: String,
    /// Artifact body
    pub content: String,
    /// Source language, when the content is code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Artifact {
    /// Create a new artifact
    #[inline]
    #[must_use]
    pub fn new(kind: ArtifactKind, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            content: content.into(),
            language: None,
        }
    }

    /// With source language
    #[inline]
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Append-only artifact collection
///
/// Multiple artifacts of the same kind may coexist; consumers that need
/// "the current one" take the first match by kind.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArtifactStore {
    artifacts: Vec<Artifact>,
}

impl ArtifactStore {
    /// Create an empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an artifact
    pub fn append(&mut self, artifact: Artifact) {
        self.artifacts.push(artifact);
    }

    /// All artifacts, in insertion order
    #[inline]
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// First artifact of the given kind, if any
    #[must_use]
    pub fn first_of(&self, kind: ArtifactKind) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    /// Number of artifacts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the store is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}
