//! Comparison across a sequence of snapshots.
//!
//! Consecutive snapshots are compared pairwise. A table that became the
//! target of a rename and is dropped in a later step is reported as
//! [`ModificationKind::DeleteAfterRenameTable`] instead of a plain delete,
//! so the same physical table is not counted twice across the sequence.

use std::collections::BTreeSet;

use tracing::debug;

use crate::element::Element;
use crate::engine::SchemaComparer;
use crate::error::Result;
use crate::graph::SchemaGraph;
use crate::result::{ComparisonResult, ModificationKind};

/// Compares consecutive snapshots with default matcher options.
///
/// Returns one result per step, i.e. `snapshots.len() - 1` results. Fewer
/// than two snapshots yield no results.
pub fn compare_history(snapshots: &[SchemaGraph]) -> Result<Vec<ComparisonResult>> {
    compare_history_with(&SchemaComparer::new(), snapshots)
}

/// Compares consecutive snapshots with the given comparer.
pub fn compare_history_with(
    comparer: &SchemaComparer,
    snapshots: &[SchemaGraph],
) -> Result<Vec<ComparisonResult>> {
    let mut rename_targets: BTreeSet<String> = BTreeSet::new();
    let mut results = Vec::with_capacity(snapshots.len().saturating_sub(1));

    for (step, pair) in snapshots.windows(2).enumerate() {
        let (old, new) = (&pair[0], &pair[1]);
        let mut result = comparer.compare(old, new)?;

        let revised: Vec<Element> = result
            .modifications_of(ModificationKind::DeleteTable)
            .filter(|e| rename_targets.contains(&*e.name()))
            .cloned()
            .collect();
        for element in revised {
            debug!(step, table = %element.name(), "renamed table dropped");
            result.add_modification(element, ModificationKind::DeleteAfterRenameTable);
        }

        rename_targets.retain(|t| new.table(t).is_some());
        rename_targets.extend(
            result
                .modifications_of(ModificationKind::RenameTable)
                .map(|e| e.name().into_owned()),
        );

        results.push(result);
    }
    Ok(results)
}
