//! Heuristic element matching between two schema snapshots.
//!
//! Elements are first matched by identity. Whatever is left over on either
//! side forms a *removed* pool (old only) and an *added* pool (new only);
//! pairs drawn from those pools are resolved as renames or moves instead of
//! being reported as independent drop + create.
//!
//! All pairings are committed greedily, best candidate first. Candidates are
//! ordered by score (descending), then by the name of the added element, then
//! by the name of the removed element. That order is total, so the outcome
//! never depends on container iteration order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use crate::element::{Column, ColumnRef, ConstraintKind};
use crate::error::{CompareError, Result};
use crate::graph::SchemaGraph;

/// Default minimum column overlap for pairing a dropped and an added table
/// as a rename.
pub const DEFAULT_TABLE_RENAME_THRESHOLD: f64 = 0.7;

/// Options for the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherOptions {
    /// Whether to pair removed and added tables/columns as renames.
    pub detect_renames: bool,
    /// Whether to detect columns that changed position or table.
    pub detect_moves: bool,
    /// Minimum overlap ratio (0.0 to 1.0) of column names for a table
    /// rename.
    pub table_rename_threshold: f64,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            detect_renames: true,
            detect_moves: true,
            table_rename_threshold: DEFAULT_TABLE_RENAME_THRESHOLD,
        }
    }
}

impl MatcherOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the table rename threshold, clamped to `[0.0, 1.0]`.
    #[must_use]
    pub fn with_rename_threshold(mut self, threshold: f64) -> Self {
        self.table_rename_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Disables rename detection. Every unmatched element becomes a
    /// create or delete.
    #[must_use]
    pub fn without_rename_detection(mut self) -> Self {
        self.detect_renames = false;
        self
    }

    /// Disables move detection.
    #[must_use]
    pub fn without_move_detection(mut self) -> Self {
        self.detect_moves = false;
        self
    }
}

// ================================================================
// Scores
// ================================================================

/// Overlap of two column-name sets, kept as an exact fraction
/// `shared / total` (intersection over union).
#[derive(Debug, Clone, Copy)]
pub struct Overlap {
    /// Names present in both sets.
    pub shared: usize,
    /// Names present in either set.
    pub total: usize,
}

impl Overlap {
    /// Computes the overlap of two name sets.
    #[must_use]
    pub fn of(a: &BTreeSet<&str>, b: &BTreeSet<&str>) -> Self {
        Self {
            shared: a.intersection(b).count(),
            total: a.union(b).count(),
        }
    }

    /// Returns the ratio in `[0.0, 1.0]`. Two empty sets have ratio 0.
    #[must_use]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.shared as f64 / self.total as f64
    }

    /// Whether the overlap reaches `threshold`. An empty overlap never does.
    #[must_use]
    pub fn meets(&self, threshold: f64) -> bool {
        self.shared > 0 && self.ratio() >= threshold
    }
}

impl PartialEq for Overlap {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Overlap {}

impl PartialOrd for Overlap {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Overlap {
    fn cmp(&self, other: &Self) -> Ordering {
        // Cross-multiplied so that equal ratios compare equal exactly.
        let lhs = self.shared * other.total.max(1);
        let rhs = other.shared * self.total.max(1);
        lhs.cmp(&rhs)
    }
}

/// A possible pairing of a removed element with an added one.
#[derive(Debug, Clone)]
struct Candidate<R> {
    old: String,
    new: String,
    rank: R,
}

/// Sorts candidates into commit order and keeps every candidate whose
/// endpoints are both still unused.
fn assign_greedy<R: Ord>(mut candidates: Vec<Candidate<R>>) -> Result<Vec<Candidate<R>>> {
    let order = |a: &Candidate<R>, b: &Candidate<R>| {
        b.rank
            .cmp(&a.rank)
            .then_with(|| a.new.cmp(&b.new))
            .then_with(|| a.old.cmp(&b.old))
    };
    candidates.sort_by(order);

    if let Some(pair) = candidates
        .windows(2)
        .find(|pair| order(&pair[0], &pair[1]) == Ordering::Equal)
    {
        return Err(CompareError::MatchContradiction(format!(
            "cannot order pairing '{}' -> '{}' against '{}' -> '{}'",
            pair[0].old, pair[0].new, pair[1].old, pair[1].new
        )));
    }

    let mut used_old = BTreeSet::new();
    let mut used_new = BTreeSet::new();
    let mut committed = Vec::new();
    for candidate in candidates {
        if used_old.contains(&candidate.old) || used_new.contains(&candidate.new) {
            continue;
        }
        used_old.insert(candidate.old.clone());
        used_new.insert(candidate.new.clone());
        committed.push(candidate);
    }
    Ok(committed)
}

// ================================================================
// Matching results
// ================================================================

/// A removed table paired with an added table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePair {
    /// Name in the old snapshot.
    pub old: String,
    /// Name in the new snapshot.
    pub new: String,
    /// Column overlap that justified the pairing.
    pub overlap: Overlap,
}

/// Outcome of table matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableMatching {
    /// Tables present under the same name in both snapshots.
    pub unchanged: Vec<String>,
    /// Tables paired as renames.
    pub renamed: Vec<TablePair>,
    /// Tables only in the new snapshot.
    pub created: Vec<String>,
    /// Tables only in the old snapshot.
    pub deleted: Vec<String>,
}

impl TableMatching {
    /// Maps an old table name to its name in the new snapshot.
    #[must_use]
    pub fn resolve(&self, old: &str) -> Option<&str> {
        if let Some(table) = self.unchanged.iter().find(|t| *t == old) {
            return Some(table.as_str());
        }
        self.renamed
            .iter()
            .find(|pair| pair.old == old)
            .map(|pair| pair.new.as_str())
    }

    /// Returns `(old, new)` names of every table present in both snapshots,
    /// ordered by new name.
    #[must_use]
    pub fn surviving(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<(&str, &str)> = self
            .unchanged
            .iter()
            .map(|t| (t.as_str(), t.as_str()))
            .chain(
                self.renamed
                    .iter()
                    .map(|p| (p.old.as_str(), p.new.as_str())),
            )
            .collect();
        pairs.sort_by(|a, b| a.1.cmp(b.1));
        pairs
    }
}

/// A classified column difference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnChange {
    /// The column kept its identity but its declared type changed.
    Retyped {
        /// The column in the new snapshot.
        column: ColumnRef,
    },
    /// The column kept its name but changed position or table.
    Moved {
        /// The column in the old snapshot.
        from: ColumnRef,
        /// The column in the new snapshot.
        to: ColumnRef,
    },
    /// The column was renamed in place, possibly with a new type.
    Renamed {
        /// The column in the old snapshot.
        from: ColumnRef,
        /// The column in the new snapshot.
        to: ColumnRef,
        /// Whether the type changed too.
        retyped: bool,
    },
    /// The column only exists in the new snapshot.
    Created(ColumnRef),
    /// The column only exists in the old snapshot.
    Deleted(ColumnRef),
}

/// Outcome of column matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMatching {
    /// Classified differences, in detection order.
    pub changes: Vec<ColumnChange>,
    resolved: BTreeMap<ColumnRef, ColumnRef>,
}

impl ColumnMatching {
    /// Maps a column of the old snapshot to its counterpart in the new one,
    /// following table renames, column renames and moves.
    #[must_use]
    pub fn resolve(&self, old: &ColumnRef) -> Option<&ColumnRef> {
        self.resolved.get(old)
    }

    fn pair(&mut self, old: ColumnRef, new: ColumnRef) {
        self.resolved.insert(old, new);
    }

    fn is_target(&self, new: &ColumnRef) -> bool {
        self.resolved.values().any(|r| r == new)
    }
}

// ================================================================
// Matcher
// ================================================================

/// Resolves which element of the new snapshot corresponds to which element
/// of the old one.
#[derive(Debug, Clone, Default)]
pub struct ElementMatcher {
    options: MatcherOptions,
}

impl ElementMatcher {
    /// Creates a matcher with default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a matcher with custom options.
    #[must_use]
    pub fn with_options(options: MatcherOptions) -> Self {
        Self { options }
    }

    /// Returns the matcher options.
    #[must_use]
    pub fn options(&self) -> &MatcherOptions {
        &self.options
    }

    /// Matches tables by name, then pairs leftover tables whose column name
    /// sets overlap at least the rename threshold.
    pub fn match_tables(&self, old: &SchemaGraph, new: &SchemaGraph) -> Result<TableMatching> {
        let old_names = old.table_names();
        let new_names = new.table_names();

        let dropped: Vec<&str> = old_names.difference(&new_names).copied().collect();
        let added: Vec<&str> = new_names.difference(&old_names).copied().collect();
        let unchanged: Vec<String> = old_names
            .intersection(&new_names)
            .map(|t| (*t).to_string())
            .collect();

        let mut renamed = Vec::new();
        if self.options.detect_renames && !dropped.is_empty() && !added.is_empty() {
            let mut candidates = Vec::new();
            for &d in &dropped {
                let old_cols = column_names(old, d);
                for &a in &added {
                    let overlap = Overlap::of(&old_cols, &column_names(new, a));
                    trace!(old = d, new = a, ratio = overlap.ratio(), "table overlap");
                    if overlap.meets(self.options.table_rename_threshold) {
                        candidates.push(Candidate {
                            old: d.to_string(),
                            new: a.to_string(),
                            rank: overlap,
                        });
                    }
                }
            }

            for c in assign_greedy(candidates)? {
                debug!(old = %c.old, new = %c.new, ratio = c.rank.ratio(), "table renamed");
                renamed.push(TablePair {
                    old: c.old,
                    new: c.new,
                    overlap: c.rank,
                });
            }
        }

        let created = added
            .iter()
            .filter(|a| !renamed.iter().any(|p| p.new == **a))
            .map(|a| (*a).to_string())
            .collect();
        let deleted = dropped
            .iter()
            .filter(|d| !renamed.iter().any(|p| p.old == **d))
            .map(|d| (*d).to_string())
            .collect();

        Ok(TableMatching {
            unchanged,
            renamed,
            created,
            deleted,
        })
    }

    /// Matches the columns of every surviving table.
    ///
    /// Columns of created or deleted tables are not examined; the table
    /// change covers them.
    pub fn match_columns(
        &self,
        old: &SchemaGraph,
        new: &SchemaGraph,
        tables: &TableMatching,
    ) -> Result<ColumnMatching> {
        let surviving = tables.surviving();
        let mut matching = ColumnMatching::default();

        // ---- Exact pass: same name in the resolved table ---------------
        for &(old_table, new_table) in &surviving {
            for old_col in old.columns_of(old_table) {
                let target = ColumnRef::new(new_table, &old_col.name);
                if let Some(new_col) = new.column(&target.qualified_name()) {
                    if type_changed(old, old_col, new, new_col) {
                        debug!(column = %target, "column type changed");
                        matching.changes.push(ColumnChange::Retyped {
                            column: target.clone(),
                        });
                    }
                    matching.pair(old_col.column_ref(), target);
                }
            }
        }

        // ---- Unmatched pools, keyed by resolved table ------------------
        let mut removed: BTreeMap<&str, Vec<&Column>> = BTreeMap::new();
        let mut added: BTreeMap<&str, Vec<&Column>> = BTreeMap::new();
        for &(old_table, new_table) in &surviving {
            let gone: Vec<&Column> = old
                .columns_of(old_table)
                .into_iter()
                .filter(|c| matching.resolve(&c.column_ref()).is_none())
                .collect();
            let fresh: Vec<&Column> = new
                .columns_of(new_table)
                .into_iter()
                .filter(|c| !matching.is_target(&c.column_ref()))
                .collect();
            removed.insert(new_table, gone);
            added.insert(new_table, fresh);
        }

        // A column that kept its name follows its name before any ordinal
        // pairing can claim its slot.
        if self.options.detect_moves {
            self.pair_moved_columns(old, new, &mut removed, &mut added, &mut matching)?;
        }

        if self.options.detect_renames {
            self.pair_renamed_columns(old, new, &mut removed, &mut added, &mut matching)?;
        }

        if self.options.detect_moves {
            detect_reordered_columns(old, new, &surviving, &mut matching);
        }

        // ---- Leftovers ------------------------------------------------
        for columns in added.values() {
            for col in columns {
                matching.changes.push(ColumnChange::Created(col.column_ref()));
            }
        }
        for columns in removed.values() {
            for col in columns {
                matching.changes.push(ColumnChange::Deleted(col.column_ref()));
            }
        }

        Ok(matching)
    }

    /// Pairs a removed and an added column of the same table that occupy the
    /// same ordinal and agree on the NOT NULL flag. Equal types make a plain
    /// rename; differing types still pair when the constraint sets agree.
    fn pair_renamed_columns<'g>(
        &self,
        old: &SchemaGraph,
        new: &SchemaGraph,
        removed: &mut BTreeMap<&'g str, Vec<&'g Column>>,
        added: &mut BTreeMap<&'g str, Vec<&'g Column>>,
        matching: &mut ColumnMatching,
    ) -> Result<()> {
        for (table, gone) in removed.iter_mut() {
            let Some(fresh) = added.get_mut(table) else {
                continue;
            };

            let mut candidates = Vec::new();
            for r in gone.iter() {
                for a in fresh.iter() {
                    if r.ordinal != a.ordinal || r.mandatory != a.mandatory {
                        continue;
                    }
                    let rank: u8 = if !type_changed(old, r, new, a) {
                        2
                    } else if constraint_signature(old, r) == constraint_signature(new, a) {
                        1
                    } else {
                        continue;
                    };
                    candidates.push(Candidate {
                        old: r.name.clone(),
                        new: a.name.clone(),
                        rank,
                    });
                }
            }

            for c in assign_greedy(candidates)? {
                let from = ColumnRef::new(
                    gone.iter()
                        .find(|col| col.name == c.old)
                        .map_or(*table, |col| col.table.as_str()),
                    &c.old,
                );
                let to = ColumnRef::new(*table, &c.new);
                let retyped = c.rank < 2;
                debug!(from = %from, to = %to, retyped, "column renamed");
                gone.retain(|col| col.name != c.old);
                fresh.retain(|col| col.name != c.new);
                matching.changes.push(ColumnChange::Renamed {
                    from: from.clone(),
                    to: to.clone(),
                    retyped,
                });
                matching.pair(from, to);
            }
        }
        Ok(())
    }

    /// Pairs a removed column of one table with an added column of the same
    /// name in another table.
    fn pair_moved_columns<'g>(
        &self,
        old: &SchemaGraph,
        new: &SchemaGraph,
        removed: &mut BTreeMap<&'g str, Vec<&'g Column>>,
        added: &mut BTreeMap<&'g str, Vec<&'g Column>>,
        matching: &mut ColumnMatching,
    ) -> Result<()> {
        let mut candidates = Vec::new();
        let mut columns: BTreeMap<String, (&Column, &Column)> = BTreeMap::new();
        for (from_table, gone) in removed.iter() {
            for (to_table, fresh) in added.iter() {
                if from_table == to_table {
                    continue;
                }
                for r in gone {
                    for a in fresh.iter().filter(|a| a.name == r.name) {
                        let rank = u8::from(!type_changed(old, r, new, a))
                            + u8::from(r.mandatory == a.mandatory);
                        let key = format!("{}|{}", r.qualified_name(), a.qualified_name());
                        columns.insert(key, (*r, *a));
                        candidates.push(Candidate {
                            old: r.qualified_name(),
                            new: a.qualified_name(),
                            rank,
                        });
                    }
                }
            }
        }

        for c in assign_greedy(candidates)? {
            let Some(&(r, a)) = columns.get(&format!("{}|{}", c.old, c.new)) else {
                continue;
            };
            let (from, to) = (r.column_ref(), a.column_ref());
            debug!(from = %from, to = %to, "column moved");
            for gone in removed.values_mut() {
                gone.retain(|col| col.column_ref() != from);
            }
            for fresh in added.values_mut() {
                fresh.retain(|col| col.column_ref() != to);
            }
            matching.changes.push(ColumnChange::Moved {
                from: from.clone(),
                to: to.clone(),
            });
            if type_changed(old, r, new, a) {
                matching
                    .changes
                    .push(ColumnChange::Retyped { column: to.clone() });
            }
            matching.pair(from, to);
        }
        Ok(())
    }
}

// ================================================================
// Helpers
// ================================================================

/// Column names of a table.
fn column_names<'g>(graph: &'g SchemaGraph, table: &str) -> BTreeSet<&'g str> {
    graph
        .columns_of(table)
        .into_iter()
        .map(|c| c.name.as_str())
        .collect()
}

/// Whether the declared type differs between two columns.
fn type_changed(old: &SchemaGraph, a: &Column, new: &SchemaGraph, b: &Column) -> bool {
    match (
        old.column_type(&a.qualified_name()),
        new.column_type(&b.qualified_name()),
    ) {
        (Some(x), Some(y)) => !x.same_type(y),
        (None, None) => false,
        _ => true,
    }
}

/// Sorted constraint kinds and expressions of a column.
fn constraint_signature(graph: &SchemaGraph, col: &Column) -> Vec<(ConstraintKind, Option<String>)> {
    let mut signature: Vec<(ConstraintKind, Option<String>)> = graph
        .constraints_of(&col.qualified_name())
        .into_iter()
        .map(|c| (c.kind, c.expression.clone()))
        .collect();
    signature.sort();
    signature
}

/// Marks as moved the columns of a surviving table whose relative order
/// changed.
///
/// Only columns present in both versions of the table take part. The
/// longest common subsequence of the old and new orderings stays in place,
/// everything outside it moved. Ordinal shifts caused by dropped or added
/// neighbours therefore do not count as moves.
fn detect_reordered_columns(
    old: &SchemaGraph,
    new: &SchemaGraph,
    surviving: &[(&str, &str)],
    matching: &mut ColumnMatching,
) {
    for &(old_table, new_table) in surviving {
        let old_order: Vec<(ColumnRef, ColumnRef)> = old
            .columns_of(old_table)
            .into_iter()
            .filter_map(|c| {
                let from = c.column_ref();
                let to = matching.resolve(&from)?.clone();
                (to.table == new_table).then_some((from, to))
            })
            .collect();
        let targets: BTreeSet<&ColumnRef> = old_order.iter().map(|(_, to)| to).collect();
        let new_order: Vec<ColumnRef> = new
            .columns_of(new_table)
            .into_iter()
            .map(Column::column_ref)
            .filter(|r| targets.contains(r))
            .collect();

        let old_seq: Vec<&ColumnRef> = old_order.iter().map(|(_, to)| to).collect();
        let new_seq: Vec<&ColumnRef> = new_order.iter().collect();
        let stable = longest_common_subsequence(&old_seq, &new_seq);

        let mut moved = Vec::new();
        for (from, to) in &old_order {
            if !stable.contains(to) {
                moved.push((from.clone(), to.clone()));
            }
        }
        // Report in new-table order.
        moved.sort_by_key(|(_, to)| new.column(&to.qualified_name()).map(|c| c.ordinal));
        for (from, to) in moved {
            debug!(from = %from, to = %to, "column reordered");
            matching.changes.push(ColumnChange::Moved { from, to });
        }
    }
}

/// Returns the elements of the longest common subsequence of `a` and `b`.
/// Ties prefer skipping elements of `a` first, which keeps the result
/// deterministic.
fn longest_common_subsequence<'a, T: Ord>(a: &[&'a T], b: &[&'a T]) -> BTreeSet<&'a T> {
    let (n, m) = (a.len(), b.len());
    // lengths[i][j] = LCS length of a[i..] and b[j..]
    let mut lengths = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lengths[i][j] = if a[i] == b[j] {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }

    let mut kept = BTreeSet::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            kept.insert(a[i]);
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            i += 1;
        } else {
            j += 1;
        }
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ColumnDef;

    fn overlap(shared: usize, total: usize) -> Overlap {
        Overlap { shared, total }
    }

    #[test]
    fn test_overlap_compares_fractions_exactly() {
        assert_eq!(overlap(1, 2), overlap(2, 4));
        assert!(overlap(2, 3) > overlap(1, 2));
        assert!(overlap(0, 0) < overlap(1, 5));
        assert!(!overlap(0, 0).meets(0.0));
        assert!(overlap(7, 10).meets(0.7));
        assert!(!overlap(6, 10).meets(0.7));
    }

    #[test]
    fn test_greedy_prefers_score_then_added_name() {
        let candidates = vec![
            Candidate {
                old: "a".to_string(),
                new: "y".to_string(),
                rank: 1u8,
            },
            Candidate {
                old: "a".to_string(),
                new: "x".to_string(),
                rank: 1u8,
            },
            Candidate {
                old: "b".to_string(),
                new: "x".to_string(),
                rank: 2u8,
            },
        ];
        let committed = assign_greedy(candidates).unwrap();
        let pairs: Vec<(&str, &str)> = committed
            .iter()
            .map(|c| (c.old.as_str(), c.new.as_str()))
            .collect();
        // b->x wins on score, leaving a->y.
        assert_eq!(pairs, vec![("b", "x"), ("a", "y")]);
    }

    #[test]
    fn test_greedy_rejects_indistinguishable_candidates() {
        let candidate = Candidate {
            old: "a".to_string(),
            new: "b".to_string(),
            rank: 1u8,
        };
        let err = assign_greedy(vec![candidate.clone(), candidate]).unwrap_err();
        assert!(matches!(err, CompareError::MatchContradiction(_)));
    }

    #[test]
    fn test_lcs_keeps_longest_stable_run() {
        let (a, b, c, d) = (1, 2, 3, 4);
        let old = vec![&a, &b, &c, &d];
        let new = vec![&b, &c, &d, &a];
        let kept = longest_common_subsequence(&old, &new);
        assert_eq!(kept.len(), 3);
        assert!(!kept.contains(&a));
    }

    fn people(columns: &[(&str, &str)]) -> SchemaGraph {
        let mut builder = SchemaGraph::builder().table("people");
        for (name, ty) in columns {
            builder = builder.column("people", ColumnDef::new(*name, *ty));
        }
        builder.build()
    }

    fn two_tables(a: &[(&str, &str)], b: &[(&str, &str)]) -> SchemaGraph {
        let mut builder = SchemaGraph::builder().table("a").table("b");
        for (name, ty) in a {
            builder = builder.column("a", ColumnDef::new(*name, *ty));
        }
        for (name, ty) in b {
            builder = builder.column("b", ColumnDef::new(*name, *ty));
        }
        builder.build()
    }

    #[test]
    fn test_rename_pairs_same_ordinal_and_type() {
        let old = people(&[("id", "INTEGER"), ("telephone", "TEXT")]);
        let new = people(&[("id", "INTEGER"), ("phone", "TEXT")]);
        let matcher = ElementMatcher::new();
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert_eq!(
            columns.changes,
            vec![ColumnChange::Renamed {
                from: ColumnRef::new("people", "telephone"),
                to: ColumnRef::new("people", "phone"),
                retyped: false,
            }]
        );
        assert_eq!(
            columns.resolve(&ColumnRef::new("people", "telephone")),
            Some(&ColumnRef::new("people", "phone"))
        );
    }

    #[test]
    fn test_dropped_neighbour_is_not_a_move() {
        let old = people(&[("id", "INTEGER"), ("a", "TEXT"), ("b", "TEXT"), ("c", "TEXT")]);
        let new = people(&[("id", "INTEGER"), ("b", "TEXT"), ("c", "TEXT")]);
        let matcher = ElementMatcher::new();
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert_eq!(
            columns.changes,
            vec![ColumnChange::Deleted(ColumnRef::new("people", "a"))]
        );
    }

    #[test]
    fn test_reordered_column_is_a_move() {
        let old = people(&[("id", "INTEGER"), ("a", "TEXT"), ("b", "TEXT"), ("c", "TEXT")]);
        let new = people(&[("id", "INTEGER"), ("b", "TEXT"), ("c", "TEXT"), ("a", "TEXT")]);
        let matcher = ElementMatcher::new();
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert_eq!(
            columns.changes,
            vec![ColumnChange::Moved {
                from: ColumnRef::new("people", "a"),
                to: ColumnRef::new("people", "a"),
            }]
        );
    }

    #[test]
    fn test_disabled_moves_ignore_reordering() {
        let old = people(&[("id", "INTEGER"), ("a", "TEXT"), ("b", "TEXT"), ("c", "TEXT")]);
        let new = people(&[("id", "INTEGER"), ("b", "TEXT"), ("c", "TEXT"), ("a", "TEXT")]);
        let matcher = ElementMatcher::with_options(MatcherOptions::new().without_move_detection());
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert!(columns.changes.is_empty());
        assert_eq!(
            columns.resolve(&ColumnRef::new("people", "a")),
            Some(&ColumnRef::new("people", "a"))
        );
    }

    #[test]
    fn test_disabled_moves_split_a_cross_table_move() {
        let old = two_tables(&[("id", "INTEGER"), ("x", "TEXT")], &[("id", "INTEGER")]);
        let new = two_tables(&[("id", "INTEGER")], &[("id", "INTEGER"), ("x", "TEXT")]);
        let matcher = ElementMatcher::with_options(MatcherOptions::new().without_move_detection());
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert_eq!(
            columns.changes,
            vec![
                ColumnChange::Created(ColumnRef::new("b", "x")),
                ColumnChange::Deleted(ColumnRef::new("a", "x")),
            ]
        );
    }

    #[test]
    fn test_same_name_move_wins_over_ordinal_rename() {
        let old = two_tables(
            &[("id", "INTEGER"), ("x", "TEXT")],
            &[("id", "INTEGER"), ("y", "TEXT")],
        );
        let new = two_tables(&[("id", "INTEGER")], &[("id", "INTEGER"), ("x", "TEXT")]);
        let matcher = ElementMatcher::new();
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert_eq!(
            columns.changes,
            vec![
                ColumnChange::Moved {
                    from: ColumnRef::new("a", "x"),
                    to: ColumnRef::new("b", "x"),
                },
                ColumnChange::Deleted(ColumnRef::new("b", "y")),
            ]
        );
        assert_eq!(
            columns.resolve(&ColumnRef::new("a", "x")),
            Some(&ColumnRef::new("b", "x"))
        );
        assert_eq!(columns.resolve(&ColumnRef::new("b", "y")), None);
    }

    #[test]
    fn test_disabled_renames_yield_create_and_delete() {
        let old = people(&[("id", "INTEGER"), ("telephone", "TEXT")]);
        let new = people(&[("id", "INTEGER"), ("phone", "TEXT")]);
        let matcher =
            ElementMatcher::with_options(MatcherOptions::new().without_rename_detection());
        let tables = matcher.match_tables(&old, &new).unwrap();
        let columns = matcher.match_columns(&old, &new, &tables).unwrap();
        assert_eq!(
            columns.changes,
            vec![
                ColumnChange::Created(ColumnRef::new("people", "phone")),
                ColumnChange::Deleted(ColumnRef::new("people", "telephone")),
            ]
        );
    }

    #[test]
    fn test_table_rename_needs_threshold_overlap() {
        let old = SchemaGraph::builder()
            .table("staff")
            .column("staff", ColumnDef::new("id", "INTEGER"))
            .column("staff", ColumnDef::new("name", "TEXT"))
            .column("staff", ColumnDef::new("rate", "REAL"))
            .build();
        let new = SchemaGraph::builder()
            .table("employees")
            .column("employees", ColumnDef::new("id", "INTEGER"))
            .column("employees", ColumnDef::new("name", "TEXT"))
            .column("employees", ColumnDef::new("rate", "REAL"))
            .table("offices")
            .column("offices", ColumnDef::new("id", "INTEGER"))
            .column("offices", ColumnDef::new("city", "TEXT"))
            .build();

        let tables = ElementMatcher::new().match_tables(&old, &new).unwrap();
        assert_eq!(tables.renamed.len(), 1);
        assert_eq!(tables.renamed[0].old, "staff");
        assert_eq!(tables.renamed[0].new, "employees");
        assert_eq!(tables.created, vec!["offices".to_string()]);
        assert!(tables.deleted.is_empty());
        assert_eq!(tables.resolve("staff"), Some("employees"));
    }

    #[test]
    fn test_equal_candidates_resolve_by_added_name() {
        let old = SchemaGraph::builder()
            .table("t")
            .column("t", ColumnDef::new("id", "INTEGER"))
            .build();
        let new = SchemaGraph::builder()
            .table("b")
            .column("b", ColumnDef::new("id", "INTEGER"))
            .table("a")
            .column("a", ColumnDef::new("id", "INTEGER"))
            .build();
        let tables = ElementMatcher::new().match_tables(&old, &new).unwrap();
        assert_eq!(tables.renamed[0].new, "a");
        assert_eq!(tables.created, vec!["b".to_string()]);
    }
}
