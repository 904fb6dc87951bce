//! Declarative table blueprint.

use crate::connection::Dialect;
use crate::schema::column::{ColumnDef, ColumnType};
use crate::schema::grammar;

/// Whether the blueprint creates a table or alters an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlueprintMode {
    Create,
    Alter,
}

/// A single or compound index declaration.
#[derive(Debug, Clone)]
pub struct IndexDef {
    pub(crate) name: String,
    pub(crate) columns: Vec<String>,
    pub(crate) unique: bool,
}

/// A foreign-key declaration, chained as
/// `t.foreign("user_id").references("id").on("users").on_delete("cascade")`.
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub(crate) column: String,
    pub(crate) references: String,
    pub(crate) on: String,
    pub(crate) on_delete: Option<String>,
}

impl ForeignKey {
    /// Referenced column (defaults to `id`).
    pub fn references(&mut self, column: &str) -> &mut Self {
        self.references = column.to_string();
        self
    }

    /// Referenced table.
    pub fn on(&mut self, table: &str) -> &mut Self {
        self.on = table.to_string();
        self
    }

    /// ON DELETE action (`cascade`, `set null`, ...).
    pub fn on_delete(&mut self, action: &str) -> &mut Self {
        self.on_delete = Some(action.to_string());
        self
    }
}

/// Accumulated table definition, rendered to dialect-specific DDL by
/// [`Blueprint::build`]. Execution is the caller's job (see
/// [`Schema`](crate::schema::Schema)).
#[derive(Debug, Clone)]
pub struct Blueprint {
    pub(crate) table: String,
    pub(crate) mode: BlueprintMode,
    pub(crate) columns: Vec<ColumnDef>,
    pub(crate) indexes: Vec<IndexDef>,
    pub(crate) foreign_keys: Vec<ForeignKey>,
}

impl Blueprint {
    pub(crate) fn create(table: &str) -> Self {
        Self::new(table, BlueprintMode::Create)
    }

    pub(crate) fn alter(table: &str) -> Self {
        Self::new(table, BlueprintMode::Alter)
    }

    fn new(table: &str, mode: BlueprintMode) -> Self {
        Self {
            table: table.to_string(),
            mode,
            columns: Vec::new(),
            indexes: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    fn column(&mut self, name: &str, ty: ColumnType) -> &mut ColumnDef {
        self.columns.push(ColumnDef::new(name, ty));
        self.columns.last_mut().unwrap()
    }

    // ==================== Columns ====================

    /// `id` primary key with autoincrement.
    pub fn id(&mut self) -> &mut ColumnDef {
        self.column("id", ColumnType::Increments)
    }

    pub fn big_integer(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::BigInteger)
    }

    pub fn integer(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Integer)
    }

    pub fn small_integer(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::SmallInteger)
    }

    pub fn string(&mut self, name: &str, length: u32) -> &mut ColumnDef {
        self.column(name, ColumnType::String(length))
    }

    pub fn text(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Text)
    }

    pub fn boolean(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Boolean)
    }

    pub fn float(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Float)
    }

    pub fn decimal(&mut self, name: &str, precision: u8, scale: u8) -> &mut ColumnDef {
        self.column(name, ColumnType::Decimal(precision, scale))
    }

    pub fn date(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Date)
    }

    pub fn timestamp(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Timestamp)
    }

    pub fn json(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Json)
    }

    pub fn binary(&mut self, name: &str) -> &mut ColumnDef {
        self.column(name, ColumnType::Binary)
    }

    /// Enumerated-value column.
    pub fn enumeration(&mut self, name: &str, values: &[&str]) -> &mut ColumnDef {
        let values = values.iter().map(|v| v.to_string()).collect();
        self.column(name, ColumnType::Enum(values))
    }

    // ==================== Composites ====================

    /// Nullable `created_at`/`updated_at` timestamp pair.
    pub fn timestamps(&mut self) {
        self.timestamp("created_at").nullable();
        self.timestamp("updated_at").nullable();
    }

    /// Nullable `deleted_at` soft-delete marker.
    pub fn soft_deletes(&mut self) {
        self.timestamp("deleted_at").nullable();
    }

    /// Nullable `remember_token` column.
    pub fn remember_token(&mut self) {
        self.string("remember_token", 100).nullable();
    }

    /// Polymorphic relation pair: `{name}_id` + `{name}_type`, indexed.
    pub fn morphs(&mut self, name: &str) {
        let id_column = format!("{}_id", name);
        let type_column = format!("{}_type", name);
        self.big_integer(&id_column);
        self.string(&type_column, 255);
        self.index(&[&id_column, &type_column]);
    }

    // ==================== Constraints ====================

    /// Single or compound index.
    pub fn index(&mut self, columns: &[&str]) {
        self.push_index(columns, false);
    }

    /// Single or compound unique index.
    pub fn unique_index(&mut self, columns: &[&str]) {
        self.push_index(columns, true);
    }

    fn push_index(&mut self, columns: &[&str], unique: bool) {
        let suffix = if unique { "unique" } else { "index" };
        let name = format!("{}_{}_{}", self.table, columns.join("_"), suffix);
        self.indexes.push(IndexDef {
            name,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
        });
    }

    /// Declare a foreign key on a local column.
    pub fn foreign(&mut self, column: &str) -> &mut ForeignKey {
        self.foreign_keys.push(ForeignKey {
            column: column.to_string(),
            references: "id".to_string(),
            on: String::new(),
            on_delete: None,
        });
        self.foreign_keys.last_mut().unwrap()
    }

    /// Render this blueprint as one or more parameter-free DDL statements
    /// for the given dialect.
    pub fn build(&self, dialect: Dialect) -> Vec<String> {
        grammar::for_dialect(dialect).compile(self)
    }
}
