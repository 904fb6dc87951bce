//! Dialect grammars: one blueprint in, dialect-specific DDL strings out.
//!
//! Statements are parameter-free; defaults and CHECK values are rendered as
//! escaped literals. Statement shape differs per dialect in three places:
//! the autoincrement primary key, foreign-key placement, and how multiple
//! added columns combine into ALTER statements.

use tracing::warn;

use crate::connection::Dialect;
use crate::schema::column::{ColumnDef, ColumnType};
use crate::schema::table::{Blueprint, BlueprintMode, ForeignKey, IndexDef};

pub(crate) fn for_dialect(dialect: Dialect) -> &'static dyn Grammar {
    match dialect {
        Dialect::Mysql => &MysqlGrammar,
        Dialect::Postgres => &PostgresGrammar,
        Dialect::Sqlite => &SqliteGrammar,
    }
}

pub(crate) trait Grammar {
    /// SQL for the autoincrement primary key, constraints included.
    fn increments_sql(&self) -> &'static str;

    /// Base SQL type for a non-increments column.
    fn type_sql(&self, column: &ColumnDef) -> String;

    /// SQLite only supports foreign keys inside the CREATE TABLE body.
    fn inline_foreign_keys(&self) -> bool {
        false
    }

    /// Whether several added columns fold into one ALTER TABLE statement.
    fn combined_alter(&self) -> bool {
        true
    }

    /// Inline comment clause, where the dialect has one.
    fn inline_comment(&self, _text: &str) -> Option<String> {
        None
    }

    /// Standalone comment statement, where comments live outside the DDL.
    fn comment_statement(&self, _table: &str, _column: &ColumnDef) -> Option<String> {
        None
    }

    fn column_sql(&self, column: &ColumnDef) -> String {
        if column.ty == ColumnType::Increments {
            return format!("{} {}", column.name, self.increments_sql());
        }

        let mut sql = format!("{} {}", column.name, self.type_sql(column));
        if !column.nullable {
            sql.push_str(" NOT NULL");
        }
        if let Some(default) = &column.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_literal());
        }
        if column.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(text) = &column.comment {
            if let Some(clause) = self.inline_comment(text) {
                sql.push(' ');
                sql.push_str(&clause);
            }
        }
        sql
    }

    fn foreign_key_clause(&self, fk: &ForeignKey) -> String {
        let mut sql = format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            fk.column, fk.on, fk.references
        );
        if let Some(action) = &fk.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(&action.to_uppercase());
        }
        sql
    }

    fn foreign_key_statement(&self, table: &str, fk: &ForeignKey) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {}_{}_foreign {}",
            table,
            table,
            fk.column,
            self.foreign_key_clause(fk)
        )
    }

    fn index_statement(&self, table: &str, index: &IndexDef) -> String {
        let kind = if index.unique { "UNIQUE INDEX" } else { "INDEX" };
        format!(
            "CREATE {} {} ON {} ({})",
            kind,
            index.name,
            table,
            index.columns.join(", ")
        )
    }

    fn compile(&self, blueprint: &Blueprint) -> Vec<String> {
        let table = blueprint.table.as_str();
        let mut statements = Vec::new();

        match blueprint.mode {
            BlueprintMode::Create => {
                let mut body: Vec<String> = blueprint
                    .columns
                    .iter()
                    .map(|column| self.column_sql(column))
                    .collect();
                if self.inline_foreign_keys() {
                    for fk in &blueprint.foreign_keys {
                        body.push(self.foreign_key_clause(fk));
                    }
                }
                statements.push(format!("CREATE TABLE {} ({})", table, body.join(", ")));

                if !self.inline_foreign_keys() {
                    for fk in &blueprint.foreign_keys {
                        statements.push(self.foreign_key_statement(table, fk));
                    }
                }
            }
            BlueprintMode::Alter => {
                if self.combined_alter() {
                    if !blueprint.columns.is_empty() {
                        let adds: Vec<String> = blueprint
                            .columns
                            .iter()
                            .map(|column| format!("ADD COLUMN {}", self.column_sql(column)))
                            .collect();
                        statements.push(format!("ALTER TABLE {} {}", table, adds.join(", ")));
                    }
                } else {
                    for column in &blueprint.columns {
                        statements.push(format!(
                            "ALTER TABLE {} ADD COLUMN {}",
                            table,
                            self.column_sql(column)
                        ));
                    }
                }

                for fk in &blueprint.foreign_keys {
                    if self.inline_foreign_keys() {
                        // SQLite cannot add a constraint to an existing table.
                        warn!(table, column = %fk.column, "skipping foreign key unsupported in ALTER");
                        continue;
                    }
                    statements.push(self.foreign_key_statement(table, fk));
                }
            }
        }

        for index in &blueprint.indexes {
            statements.push(self.index_statement(table, index));
        }
        for column in &blueprint.columns {
            if column.comment.is_some() {
                if let Some(stmt) = self.comment_statement(table, column) {
                    statements.push(stmt);
                }
            }
        }

        statements
    }
}

pub(crate) struct MysqlGrammar;

impl Grammar for MysqlGrammar {
    fn increments_sql(&self) -> &'static str {
        "BIGINT NOT NULL AUTO_INCREMENT PRIMARY KEY"
    }

    fn type_sql(&self, column: &ColumnDef) -> String {
        match &column.ty {
            ColumnType::Increments => unreachable!("handled by column_sql"),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Integer => "INT".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::String(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Float => "DOUBLE".to_string(),
            ColumnType::Decimal(p, s) => format!("DECIMAL({}, {})", p, s),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Enum(values) => format!("ENUM({})", quote_list(values)),
        }
    }

    fn inline_comment(&self, text: &str) -> Option<String> {
        Some(format!("COMMENT '{}'", text.replace('\'', "''")))
    }
}

pub(crate) struct PostgresGrammar;

impl Grammar for PostgresGrammar {
    fn increments_sql(&self) -> &'static str {
        "BIGSERIAL PRIMARY KEY"
    }

    fn type_sql(&self, column: &ColumnDef) -> String {
        match &column.ty {
            ColumnType::Increments => unreachable!("handled by column_sql"),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::String(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Decimal(p, s) => format!("NUMERIC({}, {})", p, s),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Json => "JSONB".to_string(),
            ColumnType::Binary => "BYTEA".to_string(),
            // No native CREATE TYPE here; a CHECK keeps the DDL self-contained.
            ColumnType::Enum(values) => format!(
                "VARCHAR(255) CHECK ({} IN ({}))",
                column.name,
                quote_list(values)
            ),
        }
    }

    fn comment_statement(&self, table: &str, column: &ColumnDef) -> Option<String> {
        column.comment.as_ref().map(|text| {
            format!(
                "COMMENT ON COLUMN {}.{} IS '{}'",
                table,
                column.name,
                text.replace('\'', "''")
            )
        })
    }
}

pub(crate) struct SqliteGrammar;

impl Grammar for SqliteGrammar {
    fn increments_sql(&self) -> &'static str {
        "INTEGER PRIMARY KEY AUTOINCREMENT"
    }

    fn type_sql(&self, column: &ColumnDef) -> String {
        match &column.ty {
            ColumnType::Increments => unreachable!("handled by column_sql"),
            ColumnType::BigInteger => "BIGINT".to_string(),
            ColumnType::Integer => "INTEGER".to_string(),
            ColumnType::SmallInteger => "SMALLINT".to_string(),
            ColumnType::String(n) => format!("VARCHAR({})", n),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Decimal(p, s) => format!("DECIMAL({}, {})", p, s),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Timestamp => "DATETIME".to_string(),
            ColumnType::Json => "TEXT".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Enum(values) => format!(
                "TEXT CHECK ({} IN ({}))",
                column.name,
                quote_list(values)
            ),
        }
    }

    fn inline_foreign_keys(&self) -> bool {
        true
    }

    fn combined_alter(&self) -> bool {
        false
    }

    // Column comments are silently dropped; SQLite has no syntax for them.
}

fn quote_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v.replace('\'', "''")))
        .collect::<Vec<_>>()
        .join(", ")
}
