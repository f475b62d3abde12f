//! Command templates: boilerplate DDL/DML text keyed by a symbolic operation.
//!
//! Every dialect inherits the shared defaults and may override any kind with its
//! own text. An override replaces the default outright; the two are never merged.
//!
//! ```text
//! CreateIndex  ->  CREATE INDEX #INDEXNAME# ON #TABLENAME# (#FIELDS#)
//!                               ─────┬────    ─────┬─────   ───┬────
//!                                    └─────────────┴───────────┴── caller tokens
//! ```

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectResult};
use crate::placeholder::DELIMITER;
use crate::rewriter::scanner;

macro_rules! command_kinds {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Symbolic identifier for a category of DDL/DML template text.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum CommandKind {
            $(
                #[serde(rename = $name)]
                $variant,
            )+
        }

        impl CommandKind {
            /// Every command kind, in declaration order.
            pub const ALL: &'static [CommandKind] = &[$(CommandKind::$variant),+];

            /// The snake_case name used in configuration and on the command line.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(CommandKind::$variant => $name),+
                }
            }
        }
    };
}

command_kinds! {
    CreateTable => "create_table",
    DropTable => "drop_table",
    RenameTable => "rename_table",
    TableExists => "table_exists",
    CreateDatabase => "create_database",
    DatabaseExists => "database_exists",
    ViewExists => "view_exists",
    AddField => "add_field",
    DropField => "drop_field",
    AlterField => "alter_field",
    FieldExists => "field_exists",
    FieldDefinition => "field_definition",
    FieldDefinitionNotNull => "field_definition_not_null",
    PrimaryKeyConstraint => "primary_key_constraint",
    ForeignKeyConstraint => "foreign_key_constraint",
    CreateIndex => "create_index",
    CreateUniqueIndex => "create_unique_index",
    DropIndex => "drop_index",
    IndexExists => "index_exists",
    CreateTrigger => "create_trigger",
    DropTrigger => "drop_trigger",
    TriggerExists => "trigger_exists",
    TriggerEventInsert => "trigger_event_insert",
    TriggerEventUpdate => "trigger_event_update",
    TriggerEventDelete => "trigger_event_delete",
    Select => "select",
    SelectWhere => "select_where",
    SelectCount => "select_count",
    SelectTop => "select_top",
    Insert => "insert",
    InsertReturningKey => "insert_returning_key",
    Update => "update",
    Delete => "delete",
    DeleteAll => "delete_all",
    FieldTypeString => "field_type_string",
    FieldTypeText => "field_type_text",
    FieldTypeByte => "field_type_byte",
    FieldTypeShort => "field_type_short",
    FieldTypeInt => "field_type_int",
    FieldTypeLong => "field_type_long",
    FieldTypeBool => "field_type_bool",
    FieldTypeFloat => "field_type_float",
    FieldTypeDouble => "field_type_double",
    FieldTypeDecimal => "field_type_decimal",
    FieldTypeDate => "field_type_date",
    FieldTypeTime => "field_type_time",
    FieldTypeDateTime => "field_type_datetime",
    FieldTypeGuid => "field_type_guid",
    FieldTypeBinary => "field_type_binary",
    FieldTypeAutoIncrement => "field_type_auto_increment",
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        CommandKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| DialectError::Config(format!("unknown command kind '{}'", s)))
    }
}

/// Shared defaults. Kinds missing here (existence checks, guid and
/// auto-increment column types, ...) only exist where a dialect provides them.
pub const DEFAULT_TEMPLATES: &[(CommandKind, &str)] = &[
    (
        CommandKind::CreateTable,
        "CREATE TABLE #TABLENAME# (#FIELDS#, PRIMARY KEY (#FIELDNAMEKEY#))",
    ),
    (CommandKind::DropTable, "DROP TABLE #TABLENAME#"),
    (CommandKind::RenameTable, "ALTER TABLE #TABLENAME# RENAME TO #NEWNAME#"),
    (CommandKind::CreateDatabase, "CREATE DATABASE #DATABASE#"),
    (CommandKind::AddField, "ALTER TABLE #TABLENAME# ADD #FIELDNAME# #FIELDTYPE#"),
    (CommandKind::DropField, "ALTER TABLE #TABLENAME# DROP COLUMN #FIELDNAME#"),
    (CommandKind::FieldDefinition, "#FIELDNAME# #FIELDTYPE#"),
    (CommandKind::FieldDefinitionNotNull, "#FIELDNAME# #FIELDTYPE# NOT NULL"),
    (
        CommandKind::PrimaryKeyConstraint,
        "CONSTRAINT #NAME# PRIMARY KEY (#FIELDNAMEKEY#)",
    ),
    (
        CommandKind::ForeignKeyConstraint,
        "CONSTRAINT #NAME# FOREIGN KEY (#FIELDNAME#) REFERENCES #REFTABLE# (#REFFIELD#)",
    ),
    (CommandKind::CreateIndex, "CREATE INDEX #INDEXNAME# ON #TABLENAME# (#FIELDS#)"),
    (
        CommandKind::CreateUniqueIndex,
        "CREATE UNIQUE INDEX #INDEXNAME# ON #TABLENAME# (#FIELDS#)",
    ),
    (CommandKind::DropIndex, "DROP INDEX #INDEXNAME#"),
    (
        CommandKind::CreateTrigger,
        "CREATE TRIGGER #TRIGGERNAME# AFTER #EVENT# ON #TABLENAME# FOR EACH ROW #BODY#",
    ),
    (CommandKind::DropTrigger, "DROP TRIGGER #TRIGGERNAME#"),
    (CommandKind::TriggerEventInsert, "INSERT"),
    (CommandKind::TriggerEventUpdate, "UPDATE"),
    (CommandKind::TriggerEventDelete, "DELETE"),
    (CommandKind::Select, "SELECT #FIELDS# FROM #TABLENAME#"),
    (CommandKind::SelectWhere, "SELECT #FIELDS# FROM #TABLENAME# WHERE #WHERE#"),
    (CommandKind::SelectCount, "SELECT count(*) FROM #TABLENAME#"),
    (CommandKind::SelectTop, "SELECT #FIELDS# FROM #TABLENAME# LIMIT #COUNT#"),
    (CommandKind::Insert, "INSERT INTO #TABLENAME# (#FIELDS#) VALUES (#VALUES#)"),
    (CommandKind::Update, "UPDATE #TABLENAME# SET #ASSIGNMENTS# WHERE #WHERE#"),
    (CommandKind::Delete, "DELETE FROM #TABLENAME# WHERE #WHERE#"),
    (CommandKind::DeleteAll, "DELETE FROM #TABLENAME#"),
    (CommandKind::FieldTypeString, "VARCHAR(#SIZE#)"),
    (CommandKind::FieldTypeText, "TEXT"),
    (CommandKind::FieldTypeByte, "SMALLINT"),
    (CommandKind::FieldTypeShort, "SMALLINT"),
    (CommandKind::FieldTypeInt, "INTEGER"),
    (CommandKind::FieldTypeLong, "BIGINT"),
    (CommandKind::FieldTypeBool, "BOOLEAN"),
    (CommandKind::FieldTypeFloat, "REAL"),
    (CommandKind::FieldTypeDouble, "DOUBLE PRECISION"),
    (CommandKind::FieldTypeDecimal, "DECIMAL(#PRECISION#, #SCALE#)"),
    (CommandKind::FieldTypeDate, "DATE"),
    (CommandKind::FieldTypeTime, "TIME"),
    (CommandKind::FieldTypeDateTime, "TIMESTAMP"),
    (CommandKind::FieldTypeBinary, "BLOB"),
];

/// Engine identity substituted into templates after lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineIdentity {
    pub charset: String,
    pub collation: String,
    pub database: String,
}

impl EngineIdentity {
    fn get(&self, token: &str) -> Option<&str> {
        match token {
            "#CHARSET#" => Some(&self.charset),
            "#COLLATION#" => Some(&self.collation),
            "#DATABASE#" => Some(&self.database),
            _ => None,
        }
    }
}

/// Replace `#NAME#` tokens in one left-to-right pass. Substituted text is
/// never rescanned; tokens `lookup` does not know are kept.
fn fill_tokens<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(DELIMITER) {
        out.push_str(&rest[..start]);
        let at = &rest[start..];
        let hit = scanner::placeholder_token(at)
            .ok()
            .and_then(|(_, token)| lookup(token).map(|value| (token.len(), value)));
        match hit {
            Some((len, value)) => {
                out.push_str(value);
                rest = &at[len..];
            }
            None => {
                out.push(DELIMITER);
                rest = &at[DELIMITER.len_utf8()..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Default-plus-override template table for one dialect.
#[derive(Debug, Clone, Default)]
pub struct CommandTemplateRegistry {
    defaults: HashMap<CommandKind, String>,
    overrides: HashMap<CommandKind, String>,
    identity: EngineIdentity,
}

impl CommandTemplateRegistry {
    /// Create a registry seeded with [`DEFAULT_TEMPLATES`].
    pub fn new(identity: EngineIdentity) -> Self {
        let defaults = DEFAULT_TEMPLATES
            .iter()
            .map(|(kind, text)| (*kind, (*text).to_string()))
            .collect();
        Self {
            defaults,
            overrides: HashMap::new(),
            identity,
        }
    }

    /// Register a dialect override, replacing any earlier override for `kind`.
    pub fn register(&mut self, kind: CommandKind, text: impl Into<String>) {
        self.overrides.insert(kind, text.into());
    }

    /// Replace a shared default.
    pub fn register_default(&mut self, kind: CommandKind, text: impl Into<String>) {
        self.defaults.insert(kind, text.into());
    }

    pub fn is_overridden(&self, kind: CommandKind) -> bool {
        self.overrides.contains_key(&kind)
    }

    pub fn identity(&self) -> &EngineIdentity {
        &self.identity
    }

    /// Resolve the effective template for `kind`.
    ///
    /// The override wins over the default. Identity tokens (`#CHARSET#`,
    /// `#COLLATION#`, `#DATABASE#`) are substituted on the resolved text.
    pub fn template(&self, kind: CommandKind) -> DialectResult<String> {
        let raw = self.raw(kind)?;
        Ok(fill_tokens(raw, |token| self.identity.get(token)))
    }

    /// Resolve `kind` and fill in caller tokens.
    ///
    /// Token names are given with their delimiters, e.g. `("#TABLENAME#", "users")`.
    /// Identity and caller tokens are filled in the same pass, so a value
    /// that itself looks like a token is kept as written.
    pub fn render(&self, kind: CommandKind, tokens: &[(&str, &str)]) -> DialectResult<String> {
        let raw = self.raw(kind)?;
        Ok(fill_tokens(raw, |token| {
            self.identity.get(token).or_else(|| {
                tokens
                    .iter()
                    .find(|(name, _)| *name == token)
                    .map(|(_, value)| *value)
            })
        }))
    }

    fn raw(&self, kind: CommandKind) -> DialectResult<&str> {
        self.overrides
            .get(&kind)
            .or_else(|| self.defaults.get(&kind))
            .map(String::as_str)
            .ok_or(DialectError::UnknownCommand(kind))
    }

    /// All kinds that resolve to a template, with their effective text.
    pub fn effective(&self) -> Vec<(CommandKind, String)> {
        CommandKind::ALL
            .iter()
            .filter_map(|kind| self.template(*kind).ok().map(|text| (*kind, text)))
            .collect()
    }
}
