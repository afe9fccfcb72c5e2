#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Table definitions of a SQLite schema, edited by the scenario helpers and
/// written to disk with [`create_database`].
#[derive(Debug, Clone)]
pub struct Ddl {
    tables: Vec<(String, String)>,
}

impl Ddl {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }

    pub fn table(mut self, name: &str, body: &str) -> Self {
        self.tables.push((name.to_string(), body.to_string()));
        self
    }

    /// Replaces `from` by `to` in the column list of `table`.
    pub fn edit(mut self, table: &str, from: &str, to: &str) -> Self {
        let (_, body) = self
            .tables
            .iter_mut()
            .find(|(name, _)| name == table)
            .unwrap_or_else(|| panic!("No table '{table}' in DDL"));
        assert!(body.contains(from), "'{from}' not found in {table}");
        *body = body.replace(from, to);
        self
    }

    pub fn drop_table(mut self, table: &str) -> Self {
        self.tables.retain(|(name, _)| name != table);
        self
    }

    pub fn rename_table(mut self, from: &str, to: &str) -> Self {
        for (name, _) in &mut self.tables {
            if name == from {
                *name = to.to_string();
            }
        }
        self
    }

    pub fn statements(&self) -> Vec<String> {
        self.tables
            .iter()
            .map(|(name, body)| format!("CREATE TABLE {name} ({body})"))
            .collect()
    }
}

/// The human resources schema: 8 tables, 31 columns, 7 primary keys,
/// 1 mandatory column and 7 foreign keys.
pub fn hrm() -> Ddl {
    Ddl::new()
        .table(
            "departments",
            "id INTEGER PRIMARY KEY, name TEXT NOT NULL, manager INTEGER",
        )
        .table(
            "employees",
            "id INTEGER PRIMARY KEY, first_name TEXT, last_name TEXT, telephone TEXT, \
             department INTEGER REFERENCES departments(id), \
             boss INTEGER REFERENCES employees(id), account TEXT",
        )
        .table(
            "accounts",
            "id INTEGER PRIMARY KEY, bank TEXT, iban TEXT, \
             employee INTEGER REFERENCES employees(id)",
        )
        .table(
            "customers",
            "id INTEGER PRIMARY KEY, firm VARCHAR(255), address BLOB, \
             contact INTEGER REFERENCES employees(id)",
        )
        .table(
            "projects",
            "id INTEGER PRIMARY KEY, title TEXT, \
             customer INTEGER REFERENCES customers(id), budget REAL",
        )
        .table(
            "assignments",
            "employee INTEGER REFERENCES employees(id), \
             project INTEGER REFERENCES projects(id), role TEXT",
        )
        .table(
            "external_staff",
            "id INTEGER PRIMARY KEY, name TEXT, agency TEXT, rate REAL",
        )
        .table("offices", "id INTEGER PRIMARY KEY, city TEXT")
}

pub fn hrm_drop_column() -> Ddl {
    hrm().edit(
        "employees",
        ", boss INTEGER REFERENCES employees(id)",
        "",
    )
}

pub fn hrm_drop_table() -> Ddl {
    hrm().drop_table("external_staff")
}

pub fn hrm_move_column() -> Ddl {
    hrm()
        .edit("employees", ", account TEXT", "")
        .edit("offices", "city TEXT", "city TEXT, account TEXT")
}

pub fn hrm_rename_column() -> Ddl {
    hrm().edit("employees", "telephone TEXT", "phone TEXT")
}

pub fn hrm_rename_table() -> Ddl {
    hrm().rename_table("external_staff", "external_employees")
}

pub fn hrm_replace_column() -> Ddl {
    hrm().edit("customers", "firm VARCHAR(255)", "company TEXT")
}

pub fn hrm_replace_lob_with_table() -> Ddl {
    hrm().edit("customers", ", address BLOB", "").table(
        "customer_address",
        "id INTEGER PRIMARY KEY, customer INTEGER REFERENCES customers(id), \
         street TEXT, city TEXT",
    )
}

/// Creates a SQLite database file `file` in `dir` from the DDL.
pub async fn create_database(dir: &Path, file: &str, ddl: &Ddl) -> PathBuf {
    let path = dir.join(file);
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create SQLite database");
    for sql in ddl.statements() {
        sqlx::query(&sql)
            .execute(&pool)
            .await
            .unwrap_or_else(|e| panic!("Failed to execute: {sql}\nError: {e:?}"));
    }
    pool.close().await;
    path
}

pub fn descriptor(path: &Path) -> String {
    path.to_str().expect("temp path is UTF-8").to_string()
}
