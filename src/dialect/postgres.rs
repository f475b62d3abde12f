use chrono::{NaiveDate, NaiveDateTime};

use super::{Dialect, DialectCapabilities};
use crate::catalog::FunctionDef;
use crate::codec::GuidStorage;
use crate::command::{CommandKind, EngineIdentity};
use crate::placeholder::DateLiterals;

pub struct PostgresCapabilities;

const TEMPLATES: &[(CommandKind, &str)] = &[
    (CommandKind::CreateDatabase, "CREATE DATABASE #DATABASE# ENCODING '#CHARSET#'"),
    (
        CommandKind::TableExists,
        "SELECT count(*) FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = '#TABLENAME#'",
    ),
    (
        CommandKind::DatabaseExists,
        "SELECT count(*) FROM pg_database WHERE datname = '#DATABASE#'",
    ),
    (
        CommandKind::ViewExists,
        "SELECT count(*) FROM information_schema.views WHERE table_schema = current_schema() AND table_name = '#VIEWNAME#'",
    ),
    (
        CommandKind::FieldExists,
        "SELECT count(*) FROM information_schema.columns WHERE table_schema = current_schema() AND table_name = '#TABLENAME#' AND column_name = '#FIELDNAME#'",
    ),
    (
        CommandKind::IndexExists,
        "SELECT count(*) FROM pg_indexes WHERE schemaname = current_schema() AND indexname = '#INDEXNAME#'",
    ),
    (
        CommandKind::TriggerExists,
        "SELECT count(*) FROM information_schema.triggers WHERE trigger_name = '#TRIGGERNAME#'",
    ),
    (
        CommandKind::AlterField,
        "ALTER TABLE #TABLENAME# ALTER COLUMN #FIELDNAME# TYPE #FIELDTYPE#",
    ),
    (
        CommandKind::InsertReturningKey,
        "INSERT INTO #TABLENAME# (#FIELDS#) VALUES (#VALUES#) RETURNING #FIELDNAMEKEY#",
    ),
    (
        CommandKind::CreateTrigger,
        "CREATE TRIGGER #TRIGGERNAME# AFTER #EVENT# ON #TABLENAME# FOR EACH ROW EXECUTE FUNCTION #BODY#",
    ),
    (CommandKind::DropTrigger, "DROP TRIGGER #TRIGGERNAME# ON #TABLENAME#"),
    (CommandKind::FieldTypeBinary, "BYTEA"),
    (CommandKind::FieldTypeGuid, "UUID"),
    (CommandKind::FieldTypeAutoIncrement, "SERIAL"),
];

const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("AFToString", 1, "cast(<p1> as text)", "Convert to text"),
    FunctionDef::new(
        "AFDiffDays",
        2,
        "(<p2>::date - <p1>::date)",
        "Whole days from the first date to the second",
    ),
    FunctionDef::new("AFNewGuid", 0, "gen_random_uuid()", "New random identifier"),
];

fn date_literal(d: NaiveDate) -> String {
    format!("DATE '{}'", d.format("%Y-%m-%d"))
}

fn timestamp_literal(t: NaiveDateTime) -> String {
    format!("TIMESTAMP '{}'", t.format("%Y-%m-%d %H:%M:%S"))
}

impl DialectCapabilities for PostgresCapabilities {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn command_templates(&self) -> &'static [(CommandKind, &'static str)] {
        TEMPLATES
    }

    fn function_overrides(&self) -> &'static [FunctionDef] {
        FUNCTIONS
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "true" } else { "false" }
    }

    fn date_literals(&self) -> DateLiterals {
        DateLiterals {
            date: date_literal,
            timestamp: timestamp_literal,
        }
    }

    fn guid_storage(&self) -> GuidStorage {
        GuidStorage::Native
    }

    fn default_identity(&self) -> EngineIdentity {
        EngineIdentity {
            charset: "UTF8".into(),
            ..EngineIdentity::default()
        }
    }
}
