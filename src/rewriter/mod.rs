//! Portable query rewriter.
//!
//! Rewrites portable function calls into dialect SQL by recursive descent over
//! the argument lists, innermost call first, then substitutes `#NAME#`
//! placeholders in a final pass.
//!
//! ```text
//! AFUpper(AFConcat(a, 'x,y'))
//! ───┬─── ────────┬──────────
//!    │            └── argument rewritten first: a || 'x,y'
//!    └── outer call resolved last: upper(a || 'x,y')
//! ```
//!
//! This is shallow tokenization only. Anything that is not an identifier
//! immediately followed by `(` passes through untouched. String literals,
//! quoted identifiers and `--` line comments are opaque.

pub(crate) mod scanner;


use tracing::trace;

use crate::catalog::PortableFunctionCatalog;
use crate::error::{DialectError, DialectResult, snippet};
use crate::placeholder::PlaceholderRegistry;

/// Default bound on portable call nesting.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Rewrites portable queries against one function catalog and placeholder table.
#[derive(Debug, Clone, Copy)]
pub struct QueryRewriter<'a> {
    functions: &'a PortableFunctionCatalog,
    placeholders: &'a PlaceholderRegistry,
    max_depth: usize,
}

/// One argument of a call: its text and its offset in the original query.
struct Arg<'q> {
    text: &'q str,
    offset: usize,
}

impl<'a> QueryRewriter<'a> {
    pub fn new(functions: &'a PortableFunctionCatalog, placeholders: &'a PlaceholderRegistry) -> Self {
        Self {
            functions,
            placeholders,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Rewrite a portable query into dialect SQL.
    pub fn rewrite(&self, query: &str) -> DialectResult<String> {
        let calls_resolved = self.rewrite_segment(query, 0, 0)?;
        Ok(self.placeholders.substitute(&calls_resolved))
    }

    /// Rewrite every portable call in `text`. `base` is the offset of `text`
    /// within the original query, `depth` the portable call nesting level.
    fn rewrite_segment(&self, text: &str, base: usize, depth: usize) -> DialectResult<String> {
        if depth > self.max_depth {
            return Err(DialectError::RewriteDepthExceeded {
                limit: self.max_depth,
                position: base,
                snippet: snippet(text),
            });
        }

        let mut out = String::with_capacity(text.len());
        let mut open_parens: Vec<usize> = Vec::new();
        let mut pos = 0;

        while let Some(c) = text[pos..].chars().next() {
            let rest = &text[pos..];

            if scanner::is_quote(c) {
                let len = scanner::quoted_len(rest).ok_or_else(|| {
                    DialectError::malformed(base + pos, rest, format!("unterminated {} literal", c))
                })?;
                out.push_str(&rest[..len]);
                pos += len;
                continue;
            }

            if let Ok((_, comment)) = scanner::line_comment(rest) {
                out.push_str(comment);
                pos += comment.len();
                continue;
            }

            if let Ok((_, word)) = scanner::number(rest) {
                out.push_str(word);
                pos += word.len();
                continue;
            }

            if let Ok((after, ident)) = scanner::identifier(rest) {
                pos += ident.len();
                if after.starts_with('(') && self.functions.contains_name(ident) {
                    let (sql, consumed) = self.rewrite_call(ident, text, pos, base, depth)?;
                    out.push_str(&sql);
                    pos += consumed;
                } else {
                    out.push_str(ident);
                }
                continue;
            }

            match c {
                '(' => open_parens.push(base + pos),
                ')' => {
                    if open_parens.pop().is_none() {
                        return Err(DialectError::malformed(base + pos, rest, "unbalanced ')'"));
                    }
                }
                _ => {}
            }
            out.push(c);
            pos += c.len_utf8();
        }

        if let Some(position) = open_parens.pop() {
            return Err(DialectError::malformed(position, &text[position - base..], "unclosed '('"));
        }
        Ok(out)
    }

    /// Rewrite the call to `name` whose `(` sits at `text[open]`.
    ///
    /// Returns the substituted SQL and the number of bytes consumed,
    /// parentheses included.
    fn rewrite_call(
        &self,
        name: &str,
        text: &str,
        open: usize,
        base: usize,
        depth: usize,
    ) -> DialectResult<(String, usize)> {
        let (args, close) = split_args(name, text, open, base)?;

        let mut rewritten = Vec::with_capacity(args.len());
        for arg in &args {
            rewritten.push(self.rewrite_segment(arg.text, arg.offset, depth + 1)?);
        }

        let function = self.functions.resolve(name, args.len()).ok_or_else(|| {
            let start = open - name.len();
            DialectError::UnknownFunctionOverload {
                name: name.to_string(),
                arity: args.len(),
                position: base + start,
                snippet: text[start..=close].to_string(),
            }
        })?;

        let sql = function.expand(&rewritten);
        trace!(function = %function.name, arity = args.len(), %sql, "rewrote portable call");
        Ok((sql, close + 1 - open))
    }
}

/// Split the argument list opened at `text[open]` on top-level commas.
///
/// Returns the trimmed arguments and the index of the closing `)`. An empty or
/// all-whitespace list is zero arguments.
fn split_args<'q>(
    name: &str,
    text: &'q str,
    open: usize,
    base: usize,
) -> DialectResult<(Vec<Arg<'q>>, usize)> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut start = open + 1;
    let mut pos = open + 1;

    let mut comment_end = None;

    // An argument ending in a line comment keeps its newline so the comment
    // cannot swallow the rest of the template.
    let push_arg = move |args: &mut Vec<Arg<'q>>,
                         from: usize,
                         to: usize,
                         comment_end: Option<usize>|
          -> DialectResult<()> {
        let raw = &text[from..to];
        if raw.trim().is_empty() {
            return Err(DialectError::malformed(
                base + from,
                &text[from..],
                format!("empty argument in call to {}", name),
            ));
        }
        let mut end = raw.trim_end().len();
        if comment_end == Some(from + end) && raw[end..].starts_with('\n') {
            end += 1;
        }
        let leading = raw.len() - raw.trim_start().len();
        args.push(Arg {
            text: &raw[leading..end],
            offset: base + from + leading,
        });
        Ok(())
    };

    while let Some(c) = text[pos..].chars().next() {
        match c {
            '\'' | '"' => {
                let rest = &text[pos..];
                let len = scanner::quoted_len(rest).ok_or_else(|| {
                    DialectError::malformed(base + pos, rest, format!("unterminated {} literal", c))
                })?;
                pos += len;
                continue;
            }
            '-' if text[pos..].starts_with("--") => {
                let len = scanner::line_comment(&text[pos..]).map_or(2, |(_, c)| c.len());
                pos += len;
                comment_end = Some(pos);
                continue;
            }
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            ')' => {
                let is_empty_list = args.is_empty() && text[start..pos].trim().is_empty();
                if !is_empty_list {
                    push_arg(&mut args, start, pos, comment_end)?;
                }
                return Ok((args, pos));
            }
            ',' if depth == 0 => {
                push_arg(&mut args, start, pos, comment_end)?;
                start = pos + 1;
            }
            _ => {}
        }
        pos += c.len_utf8();
    }

    Err(DialectError::malformed(
        base + open,
        &text[open..],
        format!("unclosed '(' in call to {}", name),
    ))
}
