use chrono::{NaiveDate, NaiveDateTime};

use super::{Dialect, DialectCapabilities};
use crate::catalog::FunctionDef;
use crate::codec::GuidStorage;
use crate::command::{CommandKind, EngineIdentity};
use crate::placeholder::DateLiterals;

pub struct SqlServerCapabilities;

const TEMPLATES: &[(CommandKind, &str)] = &[
    (CommandKind::CreateDatabase, "CREATE DATABASE #DATABASE# COLLATE #COLLATION#"),
    (CommandKind::RenameTable, "EXEC sp_rename '#TABLENAME#', '#NEWNAME#'"),
    (
        CommandKind::TableExists,
        "SELECT count(*) FROM INFORMATION_SCHEMA.TABLES WHERE TABLE_NAME = '#TABLENAME#'",
    ),
    (
        CommandKind::DatabaseExists,
        "SELECT count(*) FROM sys.databases WHERE name = '#DATABASE#'",
    ),
    (
        CommandKind::ViewExists,
        "SELECT count(*) FROM INFORMATION_SCHEMA.VIEWS WHERE TABLE_NAME = '#VIEWNAME#'",
    ),
    (
        CommandKind::FieldExists,
        "SELECT count(*) FROM INFORMATION_SCHEMA.COLUMNS WHERE TABLE_NAME = '#TABLENAME#' AND COLUMN_NAME = '#FIELDNAME#'",
    ),
    (
        CommandKind::IndexExists,
        "SELECT count(*) FROM sys.indexes WHERE name = '#INDEXNAME#' AND object_id = OBJECT_ID('#TABLENAME#')",
    ),
    (
        CommandKind::TriggerExists,
        "SELECT count(*) FROM sys.triggers WHERE name = '#TRIGGERNAME#'",
    ),
    (
        CommandKind::AlterField,
        "ALTER TABLE #TABLENAME# ALTER COLUMN #FIELDNAME# #FIELDTYPE#",
    ),
    (CommandKind::DropIndex, "DROP INDEX #INDEXNAME# ON #TABLENAME#"),
    (
        CommandKind::CreateTrigger,
        "CREATE TRIGGER #TRIGGERNAME# ON #TABLENAME# AFTER #EVENT# AS BEGIN #BODY# END",
    ),
    (CommandKind::SelectTop, "SELECT TOP #COUNT# #FIELDS# FROM #TABLENAME#"),
    (
        CommandKind::InsertReturningKey,
        "INSERT INTO #TABLENAME# (#FIELDS#) OUTPUT INSERTED.#FIELDNAMEKEY# VALUES (#VALUES#)",
    ),
    (CommandKind::FieldTypeString, "NVARCHAR(#SIZE#)"),
    (CommandKind::FieldTypeText, "NVARCHAR(MAX)"),
    (CommandKind::FieldTypeByte, "TINYINT"),
    (CommandKind::FieldTypeBool, "BIT"),
    (CommandKind::FieldTypeDouble, "FLOAT"),
    (CommandKind::FieldTypeDateTime, "DATETIME2"),
    (CommandKind::FieldTypeBinary, "VARBINARY(MAX)"),
    (CommandKind::FieldTypeGuid, "UNIQUEIDENTIFIER"),
    (CommandKind::FieldTypeAutoIncrement, "INT IDENTITY(1,1)"),
];

const FUNCTIONS: &[FunctionDef] = &[
    FunctionDef::new("AFTrim", 1, "ltrim(rtrim(<p1>))", "Strip leading and trailing spaces"),
    FunctionDef::new("AFLength", 1, "len(<p1>)", "Length in characters"),
    FunctionDef::new(
        "AFSubstring",
        2,
        "substring(<p1>, <p2>, len(<p1>))",
        "Suffix starting at a 1-based position",
    ),
    FunctionDef::new(
        "AFSubstring",
        3,
        "substring(<p1>, <p2>, <p3>)",
        "Substring by 1-based position and length",
    ),
    FunctionDef::new("AFLeft", 2, "left(<p1>, <p2>)", "Leading characters"),
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
        "charindex(<p1>, <p2>)",
        "1-based position of a needle, 0 if absent",
    ),
    FunctionDef::new("AFIsNull", 2, "isnull(<p1>, <p2>)", "Fallback for a null value"),
    FunctionDef::new("AFRound", 1, "round(<p1>, 0)", "Round to an integer"),
    FunctionDef::new("AFMod", 2, "(<p1> % <p2>)", "Remainder of a division"),
    FunctionDef::new("AFRandom", 0, "rand()", "Random number"),
    FunctionDef::new("AFNow", 0, "getdate()", "Current timestamp"),
    FunctionDef::new("AFToday", 0, "cast(getdate() as date)", "Current date"),
    FunctionDef::new("AFYear", 1, "year(<p1>)", "Year part"),
    FunctionDef::new("AFMonth", 1, "month(<p1>)", "Month part"),
    FunctionDef::new("AFDay", 1, "day(<p1>)", "Day-of-month part"),
    FunctionDef::new("AFHour", 1, "datepart(hour, <p1>)", "Hour part"),
    FunctionDef::new("AFMinute", 1, "datepart(minute, <p1>)", "Minute part"),
    FunctionDef::new("AFAddDays", 2, "dateadd(day, <p2>, <p1>)", "Shift a date by days"),
    FunctionDef::new("AFAddMonths", 2, "dateadd(month, <p2>, <p1>)", "Shift a date by months"),
    FunctionDef::new(
        "AFDiffDays",
        2,
        "datediff(day, <p1>, <p2>)",
        "Whole days from the first date to the second",
    ),
    FunctionDef::new("AFToString", 1, "cast(<p1> as nvarchar(max))", "Convert to text"),
    FunctionDef::new("AFNewGuid", 0, "newid()", "New random identifier"),
];

// Unseparated dates and `T`-separated timestamps parse the same under every
// DATEFORMAT/LANGUAGE setting.
fn date_literal(d: NaiveDate) -> String {
    format!("'{}'", d.format("%Y%m%d"))
}

fn timestamp_literal(t: NaiveDateTime) -> String {
    format!("'{}'", t.format("%Y-%m-%dT%H:%M:%S"))
}

impl DialectCapabilities for SqlServerCapabilities {
    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("[{}]", name.replace(']', "]]"))
    }

    fn command_templates(&self) -> &'static [(CommandKind, &'static str)] {
        TEMPLATES
    }

    fn function_overrides(&self) -> &'static [FunctionDef] {
        FUNCTIONS
    }

    fn date_literals(&self) -> DateLiterals {
        DateLiterals {
            date: date_literal,
            timestamp: timestamp_literal,
        }
    }

    fn guid_storage(&self) -> GuidStorage {
        GuidStorage::MixedEndianBytes
    }

    fn default_identity(&self) -> EngineIdentity {
        EngineIdentity {
            collation: "SQL_Latin1_General_CP1_CI_AS".into(),
            ..EngineIdentity::default()
        }
    }
}
