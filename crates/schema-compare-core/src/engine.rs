//! The diff engine: turns two schema snapshots into a classified change set.
//!
//! A comparison runs in four steps:
//!
//! 1. identity matching of tables and columns, with type changes and moves
//!    detected on the matched pairs
//! 2. rename/move resolution of the unmatched pools
//! 3. foreign key diffing on *resolved* column identities, so a relation
//!    whose endpoint was renamed or moved is recognized as unchanged
//! 4. assembly of the [`ComparisonResult`]
//!
//! Both inputs are validated first; an invalid graph aborts the comparison
//! and no partial result is returned.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::element::{Column, ColumnRef, ColumnType, Table};
use crate::error::{CompareError, Result};
use crate::graph::{ForeignKeyRelation, SchemaGraph};
use crate::matcher::{ColumnChange, ColumnMatching, ElementMatcher, MatcherOptions, TableMatching};
use crate::result::{ComparisonResult, ModificationKind};

/// Compares two snapshots with default matcher options.
pub fn compare(old: &SchemaGraph, new: &SchemaGraph) -> Result<ComparisonResult> {
    SchemaComparer::new().compare(old, new)
}

/// Compares schema snapshots.
#[derive(Debug, Clone, Default)]
pub struct SchemaComparer {
    matcher: ElementMatcher,
}

impl SchemaComparer {
    /// Creates a comparer with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a comparer with custom matcher options.
    #[must_use]
    pub fn with_options(options: MatcherOptions) -> Self {
        Self {
            matcher: ElementMatcher::with_options(options),
        }
    }

    /// Returns the matcher options.
    #[must_use]
    pub fn options(&self) -> &MatcherOptions {
        self.matcher.options()
    }

    /// Compares `old` against `new`.
    ///
    /// The computation is pure: the same pair of graphs always yields the
    /// same result.
    pub fn compare(&self, old: &SchemaGraph, new: &SchemaGraph) -> Result<ComparisonResult> {
        old.validate().map_err(|e| in_snapshot(e, "old"))?;
        new.validate().map_err(|e| in_snapshot(e, "new"))?;

        debug!(
            old_tables = old.table_count(),
            old_columns = old.column_count(),
            new_tables = new.table_count(),
            new_columns = new.column_count(),
            "comparing schemas"
        );

        let tables = self.matcher.match_tables(old, new)?;
        let columns = self.matcher.match_columns(old, new, &tables)?;

        let mut result = ComparisonResult::new();
        record_tables(&mut result, old, new, &tables);
        record_columns(&mut result, old, new, &columns)?;

        let (added, removed) = diff_foreign_keys(old, new, &columns);
        result.set_added_foreign_key_relations(added);
        result.set_removed_foreign_key_relations(removed);

        info!(
            modifications = result.len(),
            added_foreign_keys = result.added_foreign_key_relations().len(),
            removed_foreign_keys = result.removed_foreign_key_relations().len(),
            "schema comparison finished"
        );
        Ok(result)
    }
}

/// Prefixes invariant violations with the snapshot they were found in.
fn in_snapshot(err: CompareError, side: &str) -> CompareError {
    match err {
        CompareError::InvalidGraph(msg) => {
            CompareError::InvalidGraph(format!("{side} schema: {msg}"))
        }
        CompareError::Multiple(errors) => CompareError::Multiple(
            errors.into_iter().map(|e| in_snapshot(e, side)).collect(),
        ),
        other @ CompareError::MatchContradiction(_) => other,
    }
}

// ================================================================
// Recording
// ================================================================

/// Looks up the representative table node, falling back to a bare node.
fn table_element(graph: &SchemaGraph, name: &str) -> Table {
    graph.table(name).cloned().unwrap_or_else(|| Table::new(name))
}

/// Looks up the representative column node.
fn column_element(graph: &SchemaGraph, column: &ColumnRef) -> Result<Column> {
    graph
        .column(&column.qualified_name())
        .cloned()
        .ok_or_else(|| {
            CompareError::MatchContradiction(format!(
                "matched column '{column}' is missing from its snapshot"
            ))
        })
}

/// Looks up the new type marker of a column. A column whose type was
/// dropped is represented by an empty literal.
fn type_element(graph: &SchemaGraph, column: &ColumnRef) -> ColumnType {
    graph
        .column_type(&column.qualified_name())
        .cloned()
        .unwrap_or_else(|| ColumnType::new(column.clone(), ""))
}

fn record_tables(
    result: &mut ComparisonResult,
    old: &SchemaGraph,
    new: &SchemaGraph,
    tables: &TableMatching,
) {
    for pair in &tables.renamed {
        result.add_modification(table_element(new, &pair.new), ModificationKind::RenameTable);
    }
    for name in &tables.created {
        result.add_modification(table_element(new, name), ModificationKind::CreateTable);
    }
    for name in &tables.deleted {
        result.add_modification(table_element(old, name), ModificationKind::DeleteTable);
    }
}

fn record_columns(
    result: &mut ComparisonResult,
    old: &SchemaGraph,
    new: &SchemaGraph,
    columns: &ColumnMatching,
) -> Result<()> {
    for change in &columns.changes {
        match change {
            ColumnChange::Retyped { column } => {
                result.add_modification(type_element(new, column), ModificationKind::ChangeColumnType);
            }
            ColumnChange::Moved { to, .. } => {
                result.add_modification(column_element(new, to)?, ModificationKind::MoveColumn);
            }
            ColumnChange::Renamed { to, retyped, .. } => {
                result.add_modification(column_element(new, to)?, ModificationKind::RenameColumn);
                if *retyped {
                    result.add_modification(
                        type_element(new, to),
                        ModificationKind::ChangeColumnType,
                    );
                }
            }
            ColumnChange::Created(column) => {
                result.add_modification(column_element(new, column)?, ModificationKind::CreateColumn);
            }
            ColumnChange::Deleted(column) => {
                result.add_modification(column_element(old, column)?, ModificationKind::DeleteColumn);
            }
        }
    }
    Ok(())
}

// ================================================================
// Foreign keys
// ================================================================

/// Diffs foreign key relations after column resolution.
///
/// An old relation is carried into the new snapshot's namespace by
/// resolving both endpoints; it is unchanged when the resolved pair exists
/// in the new snapshot. Relations with an endpoint that did not survive are
/// removed. Returns `(added, removed)`, each in declaration order.
fn diff_foreign_keys(
    old: &SchemaGraph,
    new: &SchemaGraph,
    columns: &ColumnMatching,
) -> (Vec<ForeignKeyRelation>, Vec<ForeignKeyRelation>) {
    let resolve = |relation: &ForeignKeyRelation| -> Option<ForeignKeyRelation> {
        Some(ForeignKeyRelation {
            referencing: columns.resolve(&relation.referencing)?.clone(),
            referenced: columns.resolve(&relation.referenced)?.clone(),
        })
    };

    let current: BTreeSet<&ForeignKeyRelation> = new.foreign_keys().iter().collect();
    let carried: BTreeSet<ForeignKeyRelation> =
        old.foreign_keys().iter().filter_map(resolve).collect();

    let removed: Vec<ForeignKeyRelation> = old
        .foreign_keys()
        .iter()
        .filter(|fk| !resolve(fk).is_some_and(|r| current.contains(&r)))
        .cloned()
        .collect();
    let added: Vec<ForeignKeyRelation> = new
        .foreign_keys()
        .iter()
        .filter(|fk| !carried.contains(*fk))
        .cloned()
        .collect();

    for fk in &added {
        debug!(relation = %fk, "foreign key added");
    }
    for fk in &removed {
        debug!(relation = %fk, "foreign key removed");
    }
    (added, removed)
}
