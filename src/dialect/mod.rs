//! Supported engines and the capability set each one contributes.

mod mysql;
mod postgres;
mod sqlite;
mod sqlserver;
pub mod vocabulary;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::FunctionDef;
use crate::codec::GuidStorage;
use crate::command::{CommandKind, EngineIdentity};
use crate::error::DialectError;
use crate::placeholder::DateLiterals;

pub use mysql::MySqlCapabilities;
pub use postgres::PostgresCapabilities;
pub use sqlite::SqliteCapabilities;
pub use sqlserver::SqlServerCapabilities;

/// Supported database engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    #[serde(alias = "mariadb")]
    MySql,
    Sqlite,
    #[serde(alias = "mssql")]
    SqlServer,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::SqlServer,
    ];

    pub fn capabilities(&self) -> Box<dyn DialectCapabilities> {
        match self {
            Dialect::Postgres => Box::new(PostgresCapabilities),
            Dialect::MySql => Box::new(MySqlCapabilities),
            Dialect::Sqlite => Box::new(SqliteCapabilities),
            Dialect::SqlServer => Box::new(SqlServerCapabilities),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = DialectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "sqlserver" | "mssql" | "tsql" => Ok(Dialect::SqlServer),
            other => Err(DialectError::Config(format!("unknown dialect '{}'", other))),
        }
    }
}

/// What an engine contributes on top of the shared defaults.
///
/// Every method except [`dialect`](DialectCapabilities::dialect) has a
/// default; an engine overrides only where it differs.
pub trait DialectCapabilities: Send + Sync {
    fn dialect(&self) -> Dialect;

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{}\"", name.replace('"', "\"\""))
    }

    /// Command template overrides, each replacing the shared default.
    fn command_templates(&self) -> &'static [(CommandKind, &'static str)] {
        &[]
    }

    /// Expression templates registered after [`vocabulary::BASE`].
    fn function_overrides(&self) -> &'static [FunctionDef] {
        &[]
    }

    fn bool_literal(&self, value: bool) -> &'static str {
        if value { "1" } else { "0" }
    }

    fn date_literals(&self) -> DateLiterals {
        DateLiterals::ISO
    }

    fn guid_storage(&self) -> GuidStorage {
        GuidStorage::Native
    }

    fn default_identity(&self) -> EngineIdentity {
        EngineIdentity::default()
    }
}
