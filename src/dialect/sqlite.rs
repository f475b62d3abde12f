use super::{Dialect, DialectCapabilities};
use crate::catalog::FunctionDef;
use crate::codec::GuidStorage;
use crate::command::CommandKind;

/// SQLite has no `ALTER COLUMN`, so [`CommandKind::AlterField`] stays unresolved.
pub struct SqliteCapabilities;

const TEMPLATES: &[(CommandKind, &str)] = &[
    (
        CommandKind::TableExists,
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = '#TABLENAME#'",
    ),
    (
        CommandKind::ViewExists,
        "SELECT count(*) FROM sqlite_master WHERE type = 'view' AND name = '#VIEWNAME#'",
    ),
    (
        CommandKind::IndexExists,
        "SELECT count(*) FROM sqlite_master WHERE type = 'index' AND name = '#INDEXNAME#'",
    ),
    (
        CommandKind::TriggerExists,
        "SELECT count(*) FROM sqlite_master WHERE type = 'trigger' AND name = '#TRIGGERNAME#'",
    ),
    (
        CommandKind::FieldExists,
        "SELECT count(*) FROM pragma_table_info('#TABLENAME#') WHERE name = '#FIELDNAME#'",
    ),
    (
        CommandKind::InsertReturningKey,
        "INSERT INTO #TABLENAME# (#FIELDS#) VALUES (#VALUES#) RETURNING #FIELDNAMEKEY#",
    ),
    (
        CommandKind::CreateTrigger,
        "CREATE TRIGGER #TRIGGERNAME# AFTER #EVENT# ON #TABLENAME# FOR EACH ROW BEGIN #BODY#; END",
    ),
    (CommandKind::FieldTypeString, "TEXT"),
    (CommandKind::FieldTypeByte, "INTEGER"),
    (CommandKind::FieldTypeShort, "INTEGER"),
    (CommandKind::FieldTypeLong, "INTEGER"),
    (CommandKind::FieldTypeBool, "INTEGER"),
    (CommandKind::FieldTypeDecimal, "NUMERIC"),
    (CommandKind::FieldTypeDateTime, "DATETIME"),
    (CommandKind::FieldTypeGuid, "TEXT"),
    (
        CommandKind::FieldTypeAutoIncrement,
        "INTEGER PRIMARY KEY AUTOINCREMENT",
    ),
];

const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("AFSubstring", 2, "substr(<p1>, <p2>)", "Suffix starting at a 1-based position"),
    FunctionDef::new(
        "AFSubstring",
        3,
        "substr(<p1>, <p2>, <p3>)",
        "Substring by 1-based position and length",
    ),
    FunctionDef::new("AFLeft", 2, "substr(<p1>, 1, <p2>)", "Leading characters"),
    FunctionDef::new("AFRight", 2, "substr(<p1>, -(<p2>))", "Trailing characters"),
    FunctionDef::new(
        "AFPosition",
        2,
        "instr(<p2>, <p1>)",
        "1-based position of a needle, 0 if absent",
    ),
    FunctionDef::new(
        "AFCeiling",
        1,
        "(cast(<p1> as integer) + (<p1> > cast(<p1> as integer)))",
        "Smallest integer not below the value",
    ),
    FunctionDef::new(
        "AFFloor",
        1,
        "(cast(<p1> as integer) - (<p1> < cast(<p1> as integer)))",
        "Largest integer not above the value",
    ),
    FunctionDef::new("AFMod", 2, "(<p1> % <p2>)", "Remainder of a division"),
    FunctionDef::new("AFNow", 0, "datetime('now')", "Current timestamp"),
    FunctionDef::new("AFToday", 0, "date('now')", "Current date"),
    FunctionDef::new("AFYear", 1, "cast(strftime('%Y', <p1>) as integer)", "Year part"),
    FunctionDef::new("AFMonth", 1, "cast(strftime('%m', <p1>) as integer)", "Month part"),
    FunctionDef::new("AFDay", 1, "cast(strftime('%d', <p1>) as integer)", "Day-of-month part"),
    FunctionDef::new("AFHour", 1, "cast(strftime('%H', <p1>) as integer)", "Hour part"),
    FunctionDef::new("AFMinute", 1, "cast(strftime('%M', <p1>) as integer)", "Minute part"),
    FunctionDef::new(
        "AFAddDays",
        2,
        "date(<p1>, (<p2>) || ' days')",
        "Shift a date by days",
    ),
    FunctionDef::new(
        "AFAddMonths",
        2,
        "date(<p1>, (<p2>) || ' months')",
        "Shift a date by months",
    ),
    FunctionDef::new(
        "AFDiffDays",
        2,
        "cast(julianday(<p2>) - julianday(<p1>) as integer)",
        "Whole days from the first date to the second",
    ),
    FunctionDef::new("AFDateOnly", 1, "date(<p1>)", "Drop the time of day"),
    FunctionDef::new("AFToString", 1, "cast(<p1> as text)", "Convert to text"),
    FunctionDef::new(
        "AFToDecimal",
        3,
        "round(cast(<p1> as real), <p3>)",
        "Convert to a decimal of given precision and scale",
    ),
    FunctionDef::new("AFNewGuid", 0, "lower(hex(randomblob(16)))", "New random identifier"),
];

impl DialectCapabilities for SqliteCapabilities {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn command_templates(&self) -> &'static [(CommandKind, &'static str)] {
        TEMPLATES
    }

    fn function_overrides(&self) -> &'static [FunctionDef] {
        FUNCTIONS
    }

    fn guid_storage(&self) -> GuidStorage {
        GuidStorage::Text
    }
}
