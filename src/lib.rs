//! # afdialect: portable SQL for multi-database ORMs
//!
//! Two jobs, one translator per engine:
//!
//! 1. Rewrite portable pseudo-functions (`AFUpper(name)`) and placeholders
//!    (`#TODAY#`) into engine-native SQL.
//! 2. Convert typed application values to and from each engine's stored
//!    representation.
//!
//! ## Quick Example
//!
//! ```
//! use afdialect::prelude::*;
//!
//! let pg = DialectTranslator::new(Dialect::Postgres);
//! let sql = pg
//!     .translate("select * from t where AFUpper(name) = AFConcat('A','B')")
//!     .unwrap();
//! assert_eq!(sql, "select * from t where upper(name) = 'A' || 'B'");
//!
//! let ms = DialectTranslator::new(Dialect::SqlServer);
//! assert_eq!(ms.translate("AFConcat(a, b)").unwrap(), "concat(a, b)");
//! ```
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`PlaceholderRegistry`](placeholder::PlaceholderRegistry) | `#NAME#` token values |
//! | [`PortableFunctionCatalog`](catalog::PortableFunctionCatalog) | `(name, arity)` to expression template |
//! | [`CommandTemplateRegistry`](command::CommandTemplateRegistry) | DDL/DML boilerplate per command kind |
//! | [`ValueCodec`](codec::ValueCodec) | value to stored representation and back |
//! | [`QueryRewriter`](rewriter::QueryRewriter) | recursive call rewriting |
//! | [`DialectTranslator`](translator::DialectTranslator) | per-engine composition root |

pub mod catalog;
pub mod codec;
pub mod command;
pub mod config;
pub mod dialect;
pub mod error;
pub mod placeholder;
pub mod rewriter;
pub mod translator;

pub mod prelude {
    pub use crate::catalog::{FunctionDef, FunctionTemplate, PortableFunctionCatalog};
    pub use crate::codec::{
        CodecOptions, DbValue, Direction, GuidStorage, SemanticType, StoredType, TextPolicy,
        Value, ValueCodec,
    };
    pub use crate::command::{CommandKind, CommandTemplateRegistry, EngineIdentity};
    pub use crate::config::TranslatorConfig;
    pub use crate::dialect::{Dialect, DialectCapabilities};
    pub use crate::error::*;
    pub use crate::placeholder::PlaceholderRegistry;
    pub use crate::rewriter::QueryRewriter;
    pub use crate::translator::{DialectTranslator, TranslatorOptions};
}

/// Translate one portable query for `dialect` with default engine options.
///
/// # Example
///
/// ```
/// use afdialect::{translate, dialect::Dialect};
///
/// let sql = translate(Dialect::MySql, "select AFLength(name) from users").unwrap();
/// assert_eq!(sql, "select char_length(name) from users");
/// ```
pub fn translate(dialect: dialect::Dialect, query: &str) -> error::DialectResult<String> {
    translator::DialectTranslator::new(dialect).translate(query)
}
