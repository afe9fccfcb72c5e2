#![allow(dead_code)]

use schema_compare_core::{ColumnDef, ColumnRef, ComparisonResult, ModificationKind, SchemaGraph};

/// Editable description of a schema, refactored by the scenario helpers and
/// turned into a [`SchemaGraph`] with [`Fixture::build`].
#[derive(Debug, Clone)]
pub struct Fixture {
    tables: Vec<(String, Vec<ColumnDef>)>,
    foreign_keys: Vec<(ColumnRef, ColumnRef)>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            tables: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn table(mut self, name: &str, columns: Vec<ColumnDef>) -> Self {
        self.tables.push((name.to_string(), columns));
        self
    }

    pub fn foreign_key(mut self, from: (&str, &str), to: (&str, &str)) -> Self {
        self.foreign_keys.push((from.into(), to.into()));
        self
    }

    fn columns_mut(&mut self, table: &str) -> &mut Vec<ColumnDef> {
        self.tables
            .iter_mut()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns)
            .unwrap_or_else(|| panic!("No table '{table}' in fixture"))
    }

    fn touches(fk: &(ColumnRef, ColumnRef), table: &str, column: Option<&str>) -> bool {
        [&fk.0, &fk.1]
            .iter()
            .any(|r| r.table == table && (column.is_none() || column == Some(r.column.as_str())))
    }

    pub fn drop_column(mut self, table: &str, column: &str) -> Self {
        self.columns_mut(table).retain(|c| c.name != column);
        self.foreign_keys
            .retain(|fk| !Self::touches(fk, table, Some(column)));
        self
    }

    pub fn drop_table(mut self, table: &str) -> Self {
        self.tables.retain(|(name, _)| name != table);
        self.foreign_keys.retain(|fk| !Self::touches(fk, table, None));
        self
    }

    pub fn rename_column(mut self, table: &str, from: &str, to: &str) -> Self {
        for column in self.columns_mut(table).iter_mut() {
            if column.name == from {
                column.name = to.to_string();
            }
        }
        for (a, b) in &mut self.foreign_keys {
            for r in [a, b] {
                if r.table == table && r.column == from {
                    r.column = to.to_string();
                }
            }
        }
        self
    }

    pub fn rename_table(mut self, from: &str, to: &str) -> Self {
        for (name, _) in &mut self.tables {
            if name == from {
                *name = to.to_string();
            }
        }
        for (a, b) in &mut self.foreign_keys {
            for r in [a, b] {
                if r.table == from {
                    r.table = to.to_string();
                }
            }
        }
        self
    }

    /// Moves a column to the end of another table.
    pub fn move_column(mut self, from: &str, column: &str, to: &str) -> Self {
        let columns = self.columns_mut(from);
        let index = columns
            .iter()
            .position(|c| c.name == column)
            .unwrap_or_else(|| panic!("No column '{from}.{column}' in fixture"));
        let def = columns.remove(index);
        self.columns_mut(to).push(def);
        self
    }

    /// Replaces a column in place by a new definition.
    pub fn replace_column(mut self, table: &str, column: &str, def: ColumnDef) -> Self {
        for existing in self.columns_mut(table).iter_mut() {
            if existing.name == column {
                *existing = def.clone();
            }
        }
        self
    }

    pub fn build(&self) -> SchemaGraph {
        let mut builder = SchemaGraph::builder();
        for (name, columns) in &self.tables {
            builder = builder.table(name.as_str());
            for def in columns {
                builder = builder.column(name.as_str(), def.clone());
            }
        }
        for (from, to) in &self.foreign_keys {
            builder = builder.foreign_key(from.clone(), to.clone());
        }
        builder.build()
    }
}

pub fn pk(name: &str) -> ColumnDef {
    ColumnDef::new(name, "INTEGER").primary_key()
}

pub fn int(name: &str) -> ColumnDef {
    ColumnDef::new(name, "INTEGER")
}

pub fn text(name: &str) -> ColumnDef {
    ColumnDef::new(name, "TEXT")
}

/// The human resources schema: 8 tables, 31 columns, 7 primary keys,
/// 1 mandatory column and 7 foreign keys.
pub fn hrm() -> Fixture {
    Fixture::new()
        .table(
            "departments",
            vec![pk("id"), text("name").not_null(), int("manager")],
        )
        .table(
            "employees",
            vec![
                pk("id"),
                text("first_name"),
                text("last_name"),
                text("telephone"),
                int("department"),
                int("boss"),
                text("account"),
            ],
        )
        .table(
            "accounts",
            vec![pk("id"), text("bank"), text("iban"), int("employee")],
        )
        .table(
            "customers",
            vec![
                pk("id"),
                ColumnDef::new("firm", "VARCHAR(255)"),
                ColumnDef::new("address", "BLOB"),
                int("contact"),
            ],
        )
        .table(
            "projects",
            vec![
                pk("id"),
                text("title"),
                int("customer"),
                ColumnDef::new("budget", "REAL"),
            ],
        )
        .table(
            "assignments",
            vec![int("employee"), int("project"), text("role")],
        )
        .table(
            "external_staff",
            vec![
                pk("id"),
                text("name"),
                text("agency"),
                ColumnDef::new("rate", "REAL"),
            ],
        )
        .table("offices", vec![pk("id"), text("city")])
        .foreign_key(("employees", "department"), ("departments", "id"))
        .foreign_key(("employees", "boss"), ("employees", "id"))
        .foreign_key(("accounts", "employee"), ("employees", "id"))
        .foreign_key(("customers", "contact"), ("employees", "id"))
        .foreign_key(("projects", "customer"), ("customers", "id"))
        .foreign_key(("assignments", "employee"), ("employees", "id"))
        .foreign_key(("assignments", "project"), ("projects", "id"))
}

/// The hrm schema with the `customers.address` large object split out into
/// its own table.
pub fn hrm_replace_lob_with_table() -> Fixture {
    hrm()
        .drop_column("customers", "address")
        .table(
            "customer_address",
            vec![pk("id"), int("customer"), text("street"), text("city")],
        )
        .foreign_key(("customer_address", "customer"), ("customers", "id"))
}

/// Returns `(KIND, element)` pairs of a result for compact assertions,
/// e.g. `(DeleteColumn, "[Column] employees.boss")`.
pub fn entries(result: &ComparisonResult) -> Vec<(ModificationKind, String)> {
    result
        .modifications()
        .iter()
        .map(|m| (m.kind, m.element.to_string()))
        .collect()
}
