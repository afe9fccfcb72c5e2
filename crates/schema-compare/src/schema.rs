//! Schema document types.
//!
//! These types describe a schema snapshot as a serde document. The JSON
//! frontend reads them from disk, and `inspect --format json` writes them,
//! so any source the tool can read can be frozen into a document and
//! compared later.

use schema_compare_core::{ColumnDef, ConstraintKind, SchemaGraph, Table};
use serde::{Deserialize, Serialize};

use crate::error::{FrontendError, Result};

/// Schema definition for a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name.
    pub name: String,
    /// Declared type literal. Empty when the source declares none.
    #[serde(rename = "type", default)]
    pub sql_type: String,
    /// Whether the column is declared NOT NULL.
    #[serde(default)]
    pub not_null: bool,
    /// Whether this column is (part of) the primary key.
    #[serde(default)]
    pub primary_key: bool,
    /// Whether this column has a UNIQUE constraint.
    #[serde(default)]
    pub unique: bool,
    /// Whether this column auto-increments.
    #[serde(default)]
    pub auto_increment: bool,
    /// Default value expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Check constraint expression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
}

impl ColumnSchema {
    /// Creates a new nullable column.
    #[must_use]
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            not_null: false,
            primary_key: false,
            unique: false,
            auto_increment: false,
            default: None,
            check: None,
        }
    }

    /// Sets the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Sets the column as the primary key. Nullability is left as declared.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Sets the column as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the column to auto-increment.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Sets the default value expression.
    #[must_use]
    pub fn default(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Sets a check constraint.
    #[must_use]
    pub fn check(mut self, expr: impl Into<String>) -> Self {
        self.check = Some(expr.into());
        self
    }

    fn to_def(&self) -> ColumnDef {
        let mut def = ColumnDef::new(&self.name, &self.sql_type);
        if self.not_null {
            def = def.not_null();
        }
        if self.primary_key {
            def = def.primary_key();
        }
        if self.unique {
            def = def.unique();
        }
        if self.auto_increment {
            def = def.auto_increment();
        }
        if let Some(expr) = &self.default {
            def = def.default_expr(expr);
        }
        if let Some(expr) = &self.check {
            def = def.check(expr);
        }
        def
    }
}

/// Schema definition for a single-column foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ForeignKeySchema {
    /// Column in the referencing table.
    pub column: String,
    /// Referenced table name.
    pub references_table: String,
    /// Referenced column. Defaults to the referenced table's primary key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references_column: Option<String>,
}

impl ForeignKeySchema {
    /// Creates a foreign key referencing an explicit column.
    #[must_use]
    pub fn new(
        column: impl Into<String>,
        references_table: impl Into<String>,
        references_column: impl Into<String>,
    ) -> Self {
        Self {
            column: column.into(),
            references_table: references_table.into(),
            references_column: Some(references_column.into()),
        }
    }
}

/// Complete schema definition for a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Table name.
    pub name: String,
    /// Column definitions, in declaration order.
    #[serde(default)]
    pub columns: Vec<ColumnSchema>,
    /// Foreign key definitions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKeySchema>,
}

impl TableSchema {
    /// Creates a new table schema.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    /// Adds a column to the table.
    #[must_use]
    pub fn column(mut self, column: ColumnSchema) -> Self {
        self.columns.push(column);
        self
    }

    /// Adds a foreign key.
    #[must_use]
    pub fn foreign_key(mut self, fk: ForeignKeySchema) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    /// Gets a column by name.
    #[must_use]
    pub fn get_column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns the first primary key column.
    #[must_use]
    pub fn primary_key(&self) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.primary_key)
    }
}

/// The complete database schema (all tables).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSchema {
    /// All tables in the database.
    pub tables: Vec<TableSchema>,
}

impl DatabaseSchema {
    /// Creates a new empty database schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table to the schema.
    #[must_use]
    pub fn table(mut self, table: TableSchema) -> Self {
        self.tables.push(table);
        self
    }

    /// Gets a table by name.
    #[must_use]
    pub fn get_table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Builds the schema graph of this document.
    ///
    /// `origin` names the document; every element gets the source reference
    /// `origin#table` or `origin#table.column`. The graph is not validated
    /// here.
    pub fn to_graph(&self, origin: &str) -> Result<SchemaGraph> {
        let mut builder = SchemaGraph::builder();

        for table in &self.tables {
            builder = builder
                .add_table(Table::new(&table.name).with_source_ref(format!("{origin}#{}", table.name)));
            for column in &table.columns {
                let def = column
                    .to_def()
                    .source_ref(format!("{origin}#{}.{}", table.name, column.name));
                builder = builder.column(&table.name, def);
            }
        }

        for table in &self.tables {
            for fk in &table.foreign_keys {
                let referenced = match &fk.references_column {
                    Some(column) => column.clone(),
                    None => self
                        .get_table(&fk.references_table)
                        .and_then(TableSchema::primary_key)
                        .map(|c| c.name.clone())
                        .ok_or_else(|| {
                            FrontendError::extraction(
                                origin,
                                format!(
                                    "foreign key {}.{} references '{}', which has no primary key",
                                    table.name, fk.column, fk.references_table
                                ),
                            )
                        })?,
                };
                builder = builder.foreign_key(
                    (table.name.as_str(), fk.column.as_str()),
                    (fk.references_table.as_str(), referenced),
                );
            }
        }

        Ok(builder.build())
    }

    /// Describes a schema graph as a document.
    #[must_use]
    pub fn from_graph(graph: &SchemaGraph) -> Self {
        let tables = graph
            .tables()
            .map(|table| {
                let columns = graph
                    .columns_of(&table.name)
                    .into_iter()
                    .map(|column| {
                        let qualified = column.qualified_name();
                        let mut schema = ColumnSchema::new(
                            &column.name,
                            graph
                                .column_type(&qualified)
                                .map(|t| t.literal.clone())
                                .unwrap_or_default(),
                        );
                        schema.not_null = column.mandatory;
                        for constraint in graph.constraints_of(&qualified) {
                            match constraint.kind {
                                ConstraintKind::PrimaryKey => schema.primary_key = true,
                                ConstraintKind::Unique => schema.unique = true,
                                ConstraintKind::AutoIncrement => schema.auto_increment = true,
                                ConstraintKind::Default => {
                                    schema.default.clone_from(&constraint.expression);
                                }
                                ConstraintKind::Check => {
                                    schema.check.clone_from(&constraint.expression);
                                }
                            }
                        }
                        schema
                    })
                    .collect();
                let foreign_keys = graph
                    .foreign_keys()
                    .iter()
                    .filter(|fk| fk.referencing.table == table.name)
                    .map(|fk| {
                        ForeignKeySchema::new(
                            &fk.referencing.column,
                            &fk.referenced.table,
                            &fk.referenced.column,
                        )
                    })
                    .collect();
                TableSchema {
                    name: table.name.clone(),
                    columns,
                    foreign_keys,
                }
            })
            .collect();
        Self { tables }
    }
}
