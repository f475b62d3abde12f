//! Error types for afdialect.

use thiserror::Error;

use crate::codec::{Direction, SemanticType, StoredType};
use crate::command::CommandKind;

/// The main error type for dialect translation and value marshalling.
#[derive(Debug, Error)]
pub enum DialectError {
    /// Neither the dialect nor the shared defaults define a template for the command.
    #[error("Unknown command: no template registered for '{0}'")]
    UnknownCommand(CommandKind),

    /// Unbalanced parentheses or quotes in a portable query.
    #[error("Malformed function call at position {position}: {message} near '{snippet}'")]
    MalformedFunctionCall {
        position: usize,
        message: String,
        snippet: String,
    },

    /// The function name is known to the catalog but not at this arity.
    #[error("Unknown overload: {name}/{arity} at position {position} in '{snippet}'")]
    UnknownFunctionOverload {
        name: String,
        arity: usize,
        position: usize,
        snippet: String,
    },

    /// Portable calls nested deeper than the rewriter allows.
    #[error("Rewrite depth exceeded: nesting deeper than {limit} at position {position} near '{snippet}'")]
    RewriteDepthExceeded {
        limit: usize,
        position: usize,
        snippet: String,
    },

    /// Placeholder names must be wrapped in the delimiter on both ends.
    #[error("Invalid placeholder name: '{name}' (expected {delimiter}NAME{delimiter})")]
    InvalidPlaceholderName { name: String, delimiter: char },

    /// A value could not be converted to or from its stored representation.
    #[error("Value translation failed ({direction}, declared {declared}, stored {stored}): {reason}")]
    ValueTranslation {
        direction: Direction,
        declared: SemanticType,
        stored: StoredType,
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialectError {
    /// Create a malformed call error at the given position.
    ///
    /// `rest` is the query text starting at `position`; its first
    /// [`SNIPPET_CHARS`] characters are kept as the snippet.
    pub fn malformed(position: usize, rest: &str, message: impl Into<String>) -> Self {
        Self::MalformedFunctionCall {
            position,
            message: message.into(),
            snippet: snippet(rest),
        }
    }

    /// Create a value translation error.
    pub fn value(
        direction: Direction,
        declared: &SemanticType,
        stored: StoredType,
        reason: impl Into<String>,
    ) -> Self {
        Self::ValueTranslation {
            direction,
            declared: declared.clone(),
            stored,
            reason: reason.into(),
        }
    }
}

/// Longest query excerpt carried by rewrite errors.
pub const SNIPPET_CHARS: usize = 32;

pub(crate) fn snippet(rest: &str) -> String {
    rest.chars().take(SNIPPET_CHARS).collect()
}

/// Result type alias for afdialect operations.
pub type DialectResult<T> = Result<T, DialectError>;
