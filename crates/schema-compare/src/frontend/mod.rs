//! Schema frontends.
//!
//! A frontend turns a source descriptor into a validated
//! [`SchemaGraph`]. Two sources are supported:
//!
//! - SQLite databases, read through a read-only `sqlx` connection
//! - JSON schema documents (see [`crate::schema`])
//!
//! Descriptors are resolved by [`SourceDescriptor::parse`]: a `sqlite:` or
//! `sqlite://` prefix selects SQLite explicitly, otherwise an existing file
//! is sniffed for the SQLite header and treated as a JSON document if it
//! lacks one.

pub mod json;
pub mod sqlite;

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use schema_compare_core::SchemaGraph;
use tracing::debug;

use crate::error::{FrontendError, Result};

/// First 16 bytes of every SQLite 3 database file.
const SQLITE_HEADER: &[u8; 16] = b"SQLite format 3\0";

/// The kind of artifact a descriptor points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A SQLite database file.
    Sqlite,
    /// A JSON schema document.
    Json,
}

/// A parsed schema source descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    raw: String,
    kind: SourceKind,
    path: PathBuf,
}

impl SourceDescriptor {
    /// Parses a descriptor.
    ///
    /// Empty descriptors and plain paths that do not name an existing file
    /// are rejected with [`FrontendError::InvalidSource`].
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FrontendError::InvalidSource(
                "empty source descriptor".to_string(),
            ));
        }

        if let Some(rest) = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
        {
            if rest.is_empty() {
                return Err(FrontendError::InvalidSource(format!(
                    "'{trimmed}' names no database file"
                )));
            }
            return Ok(Self {
                raw: trimmed.to_string(),
                kind: SourceKind::Sqlite,
                path: PathBuf::from(rest),
            });
        }

        let path = Path::new(trimmed);
        if !path.is_file() {
            return Err(FrontendError::InvalidSource(format!(
                "'{trimmed}' is not an existing file"
            )));
        }
        let kind = if has_sqlite_header(path)? {
            SourceKind::Sqlite
        } else {
            SourceKind::Json
        };
        debug!(source = trimmed, ?kind, "resolved schema source");

        Ok(Self {
            raw: trimmed.to_string(),
            kind,
            path: path.to_path_buf(),
        })
    }

    /// Returns the source kind.
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Returns the path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the descriptor as given (trimmed).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn has_sqlite_header(path: &Path) -> Result<bool> {
    let mut header = Vec::with_capacity(SQLITE_HEADER.len());
    File::open(path)?
        .take(SQLITE_HEADER.len() as u64)
        .read_to_end(&mut header)?;
    Ok(header == SQLITE_HEADER)
}

/// Builds and validates the schema graph of a source.
///
/// Parse errors, database errors and graph invariant violations are all
/// reported as [`FrontendError::SchemaExtraction`].
pub async fn build_schema_graph(descriptor: &SourceDescriptor) -> Result<SchemaGraph> {
    let graph = match descriptor.kind {
        SourceKind::Sqlite => sqlite::load(descriptor).await?,
        SourceKind::Json => json::load(descriptor).await?,
    };
    graph
        .validate()
        .map_err(|e| FrontendError::extraction(descriptor.as_str(), e))?;
    Ok(graph)
}

/// Parses a descriptor and builds its schema graph.
pub async fn load_schema(raw: &str) -> Result<SchemaGraph> {
    let descriptor = SourceDescriptor::parse(raw)?;
    build_schema_graph(&descriptor).await
}
