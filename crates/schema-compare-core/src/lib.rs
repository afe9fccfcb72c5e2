//! # schema-compare-core
//!
//! Structural comparison of two relational schema snapshots.
//!
//! This crate provides:
//! - A graph model of a schema: tables, columns, column types, constraints
//!   and foreign key relations
//! - A heuristic matcher that recognizes renamed tables, renamed columns
//!   and moved columns instead of reporting them as drop + create
//! - A diff engine producing a classified, deterministic change set and a
//!   fixed-format text report
//!
//! Snapshots are built by a frontend (see the `schema-compare` crate); this
//! crate performs no I/O.
//!
//! ## Comparing two snapshots
//!
//! ```rust
//! use schema_compare_core::{ColumnDef, ModificationKind, SchemaGraph, compare};
//!
//! let old = SchemaGraph::builder()
//!     .table("employees")
//!     .column("employees", ColumnDef::new("id", "INTEGER").primary_key())
//!     .column("employees", ColumnDef::new("telephone", "TEXT"))
//!     .build();
//! let new = SchemaGraph::builder()
//!     .table("employees")
//!     .column("employees", ColumnDef::new("id", "INTEGER").primary_key())
//!     .column("employees", ColumnDef::new("phone", "TEXT"))
//!     .build();
//!
//! let result = compare(&old, &new).unwrap();
//! assert_eq!(result.modifications()[0].kind, ModificationKind::RenameColumn);
//! println!("{result}");
//! ```

pub mod element;
pub mod engine;
pub mod error;
pub mod graph;
pub mod history;
pub mod matcher;
pub mod result;

pub use element::{Column, ColumnRef, ColumnType, Constraint, ConstraintKind, Element, ElementKind, Table};
pub use engine::{SchemaComparer, compare};
pub use error::{CompareError, Result};
pub use graph::{ColumnDef, ForeignKeyRelation, SchemaGraph, SchemaGraphBuilder};
pub use history::{compare_history, compare_history_with};
pub use matcher::{DEFAULT_TABLE_RENAME_THRESHOLD, ElementMatcher, MatcherOptions};
pub use result::{ComparisonResult, Modification, ModificationKind};
