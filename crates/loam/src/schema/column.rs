//! Column definitions for the table DSL.

use crate::value::Value;

/// Logical column type, mapped to dialect-specific SQL by the grammars.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    /// Primary-key-with-autoincrement shorthand.
    Increments,
    BigInteger,
    Integer,
    SmallInteger,
    String(u32),
    Text,
    Boolean,
    Float,
    Decimal(u8, u8),
    Date,
    Timestamp,
    Json,
    Binary,
    /// Enumerated values; emulated with CHECK constraints where there is no
    /// native ENUM type.
    Enum(Vec<String>),
}

/// One column declaration with its modifiers.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub(crate) name: String,
    pub(crate) ty: ColumnType,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) unique: bool,
    pub(crate) comment: Option<String>,
}

impl ColumnDef {
    pub(crate) fn new(name: &str, ty: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            nullable: false,
            default: None,
            unique: false,
            comment: None,
        }
    }

    /// Allow NULL values (columns are NOT NULL by default).
    pub fn nullable(&mut self) -> &mut Self {
        self.nullable = true;
        self
    }

    /// Set a literal default.
    pub fn default_to(&mut self, value: impl Into<Value>) -> &mut Self {
        self.default = Some(value.into());
        self
    }

    /// Add a single-column UNIQUE constraint.
    pub fn unique(&mut self) -> &mut Self {
        self.unique = true;
        self
    }

    /// Attach a column comment (rendered where the dialect supports one).
    pub fn comment(&mut self, text: &str) -> &mut Self {
        self.comment = Some(text.to_string());
        self
    }
}
