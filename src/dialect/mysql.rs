use super::{Dialect, DialectCapabilities};
use crate::catalog::FunctionDef;
use crate::codec::GuidStorage;
use crate::command::{CommandKind, EngineIdentity};

pub struct MySqlCapabilities;

const TEMPLATES: &[(CommandKind, &str)] = &[
    (
        CommandKind::CreateTable,
        "CREATE TABLE #TABLENAME# (#FIELDS#, PRIMARY KEY (#FIELDNAMEKEY#)) DEFAULT CHARSET=#CHARSET# COLLATE=#COLLATION#",
    ),
    (
        CommandKind::CreateDatabase,
        "CREATE DATABASE #DATABASE# CHARACTER SET #CHARSET# COLLATE #COLLATION#",
    ),
    (CommandKind::RenameTable, "RENAME TABLE #TABLENAME# TO #NEWNAME#"),
    (
        CommandKind::TableExists,
        "SELECT count(*) FROM information_schema.tables WHERE table_schema = '#DATABASE#' AND table_name = '#TABLENAME#'",
    ),
    (
        CommandKind::DatabaseExists,
        "SELECT count(*) FROM information_schema.schemata WHERE schema_name = '#DATABASE#'",
    ),
    (
        CommandKind::ViewExists,
        "SELECT count(*) FROM information_schema.views WHERE table_schema = '#DATABASE#' AND table_name = '#VIEWNAME#'",
    ),
    (
        CommandKind::FieldExists,
        "SELECT count(*) FROM information_schema.columns WHERE table_schema = '#DATABASE#' AND table_name = '#TABLENAME#' AND column_name = '#FIELDNAME#'",
    ),
    (
        CommandKind::IndexExists,
        "SELECT count(*) FROM information_schema.statistics WHERE table_schema = '#DATABASE#' AND table_name = '#TABLENAME#' AND index_name = '#INDEXNAME#'",
    ),
    (
        CommandKind::TriggerExists,
        "SELECT count(*) FROM information_schema.triggers WHERE trigger_schema = '#DATABASE#' AND trigger_name = '#TRIGGERNAME#'",
    ),
    (
        CommandKind::AlterField,
        "ALTER TABLE #TABLENAME# MODIFY COLUMN #FIELDNAME# #FIELDTYPE#",
    ),
    (CommandKind::DropIndex, "DROP INDEX #INDEXNAME# ON #TABLENAME#"),
    (
        CommandKind::InsertReturningKey,
        "INSERT INTO #TABLENAME# (#FIELDS#) VALUES (#VALUES#); SELECT LAST_INSERT_ID()",
    ),
    (CommandKind::FieldTypeText, "LONGTEXT"),
    (CommandKind::FieldTypeByte, "TINYINT UNSIGNED"),
    (CommandKind::FieldTypeBool, "TINYINT(1)"),
    (CommandKind::FieldTypeFloat, "FLOAT"),
    (CommandKind::FieldTypeDouble, "DOUBLE"),
    (CommandKind::FieldTypeDateTime, "DATETIME"),
    (CommandKind::FieldTypeBinary, "LONGBLOB"),
    (CommandKind::FieldTypeGuid, "BINARY(16)"),
    (CommandKind::FieldTypeAutoIncrement, "INT AUTO_INCREMENT"),
];

const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("AFLength", 1, "char_length(<p1>)", "Length in characters"),
    FunctionDef::new("AFConcat", 2, "concat(<p1>, <p2>)", "Concatenate strings"),
    FunctionDef::new("AFConcat", 3, "concat(<p1>, <p2>, <p3>)", "Concatenate strings"),
    FunctionDef::new("AFConcat", 4, "concat(<p1>, <p2>, <p3>, <p4>)", "Concatenate strings"),
    FunctionDef::new(
        "AFConcat",
        5,
        "concat(<p1>, <p2>, <p3>, <p4>, <p5>)",
        "Concatenate strings",
    ),
    FunctionDef::new(
        "AFPosition",
        2,
        "locate(<p1>, <p2>)",
        "1-based position of a needle, 0 if absent",
    ),
    FunctionDef::new("AFRandom", 0, "rand()", "Random number"),
    FunctionDef::new("AFAddDays", 2, "date_add(<p1>, interval <p2> day)", "Shift a date by days"),
    FunctionDef::new(
        "AFAddMonths",
        2,
        "date_add(<p1>, interval <p2> month)",
        "Shift a date by months",
    ),
    FunctionDef::new(
        "AFDiffDays",
        2,
        "datediff(<p2>, <p1>)",
        "Whole days from the first date to the second",
    ),
    FunctionDef::new("AFToString", 1, "cast(<p1> as char)", "Convert to text"),
    FunctionDef::new("AFToInt", 1, "cast(<p1> as signed)", "Convert to an integer"),
];

impl DialectCapabilities for MySqlCapabilities {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }

    fn command_templates(&self) -> &'static [(CommandKind, &'static str)] {
        TEMPLATES
    }

    fn function_overrides(&self) -> &'static [FunctionDef] {
        FUNCTIONS
    }

    fn guid_storage(&self) -> GuidStorage {
        GuidStorage::Bytes
    }

    fn default_identity(&self) -> EngineIdentity {
        EngineIdentity {
            charset: "utf8mb4".into(),
            collation: "utf8mb4_unicode_ci".into(),
            database: String::new(),
        }
    }
}
