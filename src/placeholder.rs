//! Placeholder registry: `#NAME#` tokens for non-parameterized values.
//!
//! Values are either fixed text or computed lazily. A computed value is
//! evaluated once, at first access, and then memoized for the life of the
//! registry; [`PlaceholderRegistry::reset_computed`] drops the memoized values.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime};

use crate::error::{DialectError, DialectResult};
use crate::rewriter::scanner;

/// Delimiter wrapping every placeholder name.
pub const DELIMITER: char = '#';

/// Source of "now" for date placeholders.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// The local system clock.
pub fn system_clock() -> Clock {
    Arc::new(|| Local::now().naive_local())
}

type Compute = Box<dyn Fn() -> String + Send + Sync>;

enum PlaceholderValue {
    Fixed(String),
    Computed {
        compute: Compute,
        cached: OnceLock<String>,
    },
}

impl PlaceholderValue {
    fn get(&self) -> &str {
        match self {
            PlaceholderValue::Fixed(v) => v,
            PlaceholderValue::Computed { compute, cached } => cached.get_or_init(|| compute()),
        }
    }
}

impl fmt::Debug for PlaceholderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaceholderValue::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            PlaceholderValue::Computed { cached, .. } => f
                .debug_struct("Computed")
                .field("cached", &cached.get())
                .finish(),
        }
    }
}

/// Name to value table for `#NAME#` tokens.
#[derive(Debug, Default)]
pub struct PlaceholderRegistry {
    entries: HashMap<String, PlaceholderValue>,
}

fn validate_name(name: &str) -> DialectResult<()> {
    let inner = name
        .strip_prefix(DELIMITER)
        .and_then(|rest| rest.strip_suffix(DELIMITER));
    match inner {
        Some(inner) if !inner.is_empty() && inner.chars().all(scanner::is_ident_char) => Ok(()),
        _ => Err(DialectError::InvalidPlaceholderName {
            name: name.to_string(),
            delimiter: DELIMITER,
        }),
    }
}

impl PlaceholderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed value. `name` includes its delimiters: `#TRUE#`.
    pub fn register(&mut self, name: &str, value: impl Into<String>) -> DialectResult<()> {
        validate_name(name)?;
        self.entries
            .insert(name.to_string(), PlaceholderValue::Fixed(value.into()));
        Ok(())
    }

    /// Register a value computed on first access.
    pub fn register_computed<F>(&mut self, name: &str, compute: F) -> DialectResult<()>
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        validate_name(name)?;
        self.insert_computed(name, compute);
        Ok(())
    }

    fn insert_computed<F>(&mut self, name: &str, compute: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.entries.insert(
            name.to_string(),
            PlaceholderValue::Computed {
                compute: Box::new(compute),
                cached: OnceLock::new(),
            },
        );
    }

    /// Exact, case-sensitive lookup of a delimited token.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.entries.get(token).map(PlaceholderValue::get)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.entries.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Forget memoized computed values; the next access recomputes them.
    pub fn reset_computed(&mut self) {
        for value in self.entries.values_mut() {
            if let PlaceholderValue::Computed { cached, .. } = value {
                *cached = OnceLock::new();
            }
        }
    }

    /// Replace every registered token in `text`.
    ///
    /// String literals, quoted identifiers and line comments are copied verbatim. Unregistered
    /// tokens are left in place. Substituted values are not rescanned.
    pub fn substitute(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while let Some(c) = text[pos..].chars().next() {
            let rest = &text[pos..];
            if scanner::is_quote(c) {
                let len = scanner::quoted_len(rest).unwrap_or(rest.len());
                out.push_str(&rest[..len]);
                pos += len;
                continue;
            }
            if let Ok((_, comment)) = scanner::line_comment(rest) {
                out.push_str(comment);
                pos += comment.len();
                continue;
            }
            if c == DELIMITER {
                if let Ok((_, token)) = scanner::placeholder_token(rest) {
                    if let Some(value) = self.resolve(token) {
                        out.push_str(value);
                        pos += token.len();
                        continue;
                    }
                }
            }
            out.push(c);
            pos += c.len_utf8();
        }
        out
    }
}

/// Dialect-specific rendering of date and timestamp literals.
#[derive(Debug, Clone, Copy)]
pub struct DateLiterals {
    pub date: fn(NaiveDate) -> String,
    pub timestamp: fn(NaiveDateTime) -> String,
}

fn iso_date(d: NaiveDate) -> String {
    format!("'{}'", d.format("%Y-%m-%d"))
}

fn iso_timestamp(t: NaiveDateTime) -> String {
    format!("'{}'", t.format("%Y-%m-%d %H:%M:%S"))
}

impl DateLiterals {
    /// Quoted ISO-8601 text: `'2024-03-01'`, `'2024-03-01 08:30:00'`.
    pub const ISO: DateLiterals = DateLiterals {
        date: iso_date,
        timestamp: iso_timestamp,
    };
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

fn last_of_month(d: NaiveDate) -> NaiveDate {
    first_of_month(d)
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .unwrap_or(d)
}

/// Register the date placeholders every dialect carries.
pub fn register_builtin_dates(registry: &mut PlaceholderRegistry, clock: &Clock, literals: DateLiterals) {
    let dates: [(&str, fn(NaiveDate) -> NaiveDate); 7] = [
        ("#TODAY#", |d| d),
        ("#YESTERDAY#", |d| d.checked_sub_days(Days::new(1)).unwrap_or(d)),
        ("#TOMORROW#", |d| d.checked_add_days(Days::new(1)).unwrap_or(d)),
        ("#FIRSTDAYOFMONTH#", first_of_month),
        ("#LASTDAYOFMONTH#", last_of_month),
        ("#FIRSTDAYOFYEAR#", |d| d.with_ordinal(1).unwrap_or(d)),
        ("#LASTDAYOFYEAR#", |d| {
            NaiveDate::from_ymd_opt(d.year(), 12, 31).unwrap_or(d)
        }),
    ];
    for (name, shift) in dates {
        let clock = Arc::clone(clock);
        registry.insert_computed(name, move || (literals.date)(shift(clock().date())));
    }
    let clock = Arc::clone(clock);
    registry.insert_computed("#NOW#", move || (literals.timestamp)(clock()));
}

/// Register `#TRUE#` and `#FALSE#` as the dialect's boolean literals.
pub fn register_builtin_booleans(registry: &mut PlaceholderRegistry, yes: &str, no: &str) {
    for (name, literal) in [("#TRUE#", yes), ("#FALSE#", no)] {
        registry
            .entries
            .insert(name.to_string(), PlaceholderValue::Fixed(literal.to_string()));
    }
}
