//! Compare relational schema snapshots.
//!
//! `schema-compare` reads two (or more) schema snapshots, builds their
//! schema graphs and reports what changed between them: created, deleted and
//! renamed tables, created, deleted, renamed and moved columns, changed
//! column types and changed foreign key relations.
//!
//! # Architecture
//!
//! - **Frontends** - Read a snapshot from a SQLite database or a JSON
//!   schema document into a validated graph
//! - **Schema documents** - The serde model of a snapshot, used by the JSON
//!   frontend and for exporting any snapshot
//! - **Core** - Matching, diffing and reporting, provided by
//!   `schema-compare-core`
//!
//! # Example
//!
//! ```rust,ignore
//! use schema_compare::prelude::*;
//!
//! let old = load_schema("sqlite:hrm.sqlite").await?;
//! let new = load_schema("hrm_refactored.json").await?;
//! let result = SchemaComparer::new().compare(&old, &new)?;
//! println!("{result}");
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Compare two snapshots
//! schema-compare compare hrm.sqlite hrm_refactored.sqlite
//!
//! # Same, as JSON
//! schema-compare compare hrm.sqlite hrm_refactored.sqlite --format json
//!
//! # Show what a snapshot contains
//! schema-compare inspect hrm.sqlite
//!
//! # Compare a sequence of snapshots
//! schema-compare history v1.json v2.json v3.json
//! ```

pub mod error;
pub mod frontend;
pub mod schema;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{FrontendError, Result};
    pub use crate::frontend::{
        SourceDescriptor, SourceKind, build_schema_graph, load_schema,
    };
    pub use crate::schema::{ColumnSchema, DatabaseSchema, ForeignKeySchema, TableSchema};
    pub use schema_compare_core::{
        ComparisonResult, MatcherOptions, ModificationKind, SchemaComparer, SchemaGraph,
        compare_history_with,
    };
}
