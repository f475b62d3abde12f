//! Portable function catalog: `(name, arity)` to dialect expression template.
//!
//! Templates carry positional tokens `<p1>..<pN>`. Different arities of one
//! name are independent overloads.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

/// One catalog entry as declared by a dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDef {
    pub name: &'static str,
    pub arity: usize,
    pub template: &'static str,
    pub description: &'static str,
}

impl FunctionDef {
    pub const fn new(
        name: &'static str,
        arity: usize,
        template: &'static str,
        description: &'static str,
    ) -> Self {
        Self {
            name,
            arity,
            template,
            description,
        }
    }
}

/// A resolved expression template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionTemplate {
    /// Name as registered (display casing).
    pub name: String,
    pub arity: usize,
    pub template: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FunctionTemplate {
    /// Substitute `<pN>` tokens with `args[N - 1]`.
    ///
    /// Single pass: argument text that itself looks like `<p2>` is not
    /// substituted again. Tokens outside `1..=args.len()` are left as written.
    pub fn expand(&self, args: &[String]) -> String {
        let template = self.template.as_str();
        let mut out = String::with_capacity(template.len() + args.iter().map(String::len).sum::<usize>());
        let mut rest = template;
        while let Some(start) = rest.find("<p") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let digits = after.bytes().take_while(u8::is_ascii_digit).count();
            let index = match after[..digits].parse::<usize>() {
                Ok(n) if digits > 0 && after[digits..].starts_with('>') => Some(n),
                _ => None,
            };
            match index.and_then(|n| n.checked_sub(1)).and_then(|i| args.get(i)) {
                Some(arg) => {
                    out.push_str(arg);
                    rest = &after[digits + 1..];
                }
                None => {
                    out.push_str("<p");
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// `(name, arity)` keyed catalog. Name lookup ignores ASCII case.
#[derive(Debug, Clone, Default)]
pub struct PortableFunctionCatalog {
    entries: BTreeMap<(String, usize), FunctionTemplate>,
    names: HashSet<String>,
}

impl PortableFunctionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the template for `(name, arity)`.
    ///
    /// Returns the template previously registered under the same key.
    pub fn register(
        &mut self,
        name: &str,
        arity: usize,
        template: impl Into<String>,
        description: Option<&str>,
    ) -> Option<FunctionTemplate> {
        let key = name.to_ascii_lowercase();
        self.names.insert(key.clone());
        self.entries.insert(
            (key, arity),
            FunctionTemplate {
                name: name.to_string(),
                arity,
                template: template.into(),
                description: description.map(str::to_string),
            },
        )
    }

    pub fn register_all(&mut self, defs: &[FunctionDef]) {
        for def in defs {
            let description = (!def.description.is_empty()).then_some(def.description);
            self.register(def.name, def.arity, def.template, description);
        }
    }

    /// Whether `name` is registered at any arity.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(&name.to_ascii_lowercase())
    }

    pub fn resolve(&self, name: &str, arity: usize) -> Option<&FunctionTemplate> {
        self.entries.get(&(name.to_ascii_lowercase(), arity))
    }

    /// Registered arities of `name`, ascending.
    pub fn arities(&self, name: &str) -> Vec<usize> {
        let key = name.to_ascii_lowercase();
        self.entries
            .keys()
            .filter(|(n, _)| *n == key)
            .map(|(_, arity)| *arity)
            .collect()
    }

    /// All entries ordered by name, then arity.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionTemplate> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expand_positional_tokens() {
        let f = FunctionTemplate {
            name: "AFSubstring".into(),
            arity: 3,
            template: "substr(<p1>, <p2>, <p3>)".into(),
            description: None,
        };
        assert_eq!(f.expand(&args(&["name", "1", "3"])), "substr(name, 1, 3)");
    }

    #[test]
    fn test_expand_is_single_pass() {
        let f = FunctionTemplate {
            name: "F".into(),
            arity: 2,
            template: "<p1> - <p2> <px> <p9>".into(),
            description: None,
        };
        assert_eq!(f.expand(&args(&["<p2>", "b"])), "<p2> - b <px> <p9>");
    }

    #[test]
    fn test_expand_multi_digit_index() {
        let template: Vec<String> = (1..=11).map(|i| format!("<p{}>", i)).collect();
        let f = FunctionTemplate {
            name: "F".into(),
            arity: 11,
            template: template.join(","),
            description: None,
        };
        let values: Vec<String> = (1..=11).map(|i| format!("v{}", i)).collect();
        assert_eq!(f.expand(&values), values.join(","));
    }

    #[test]
    fn test_overloads_are_independent() {
        let mut catalog = PortableFunctionCatalog::new();
        catalog.register("AFConcat", 2, "<p1> || <p2>", None);
        catalog.register("AFConcat", 3, "<p1> || <p2> || <p3>", None);

        assert!(catalog.contains_name("afconcat"));
        assert_eq!(catalog.arities("AFConcat"), vec![2, 3]);
        assert_eq!(
            catalog.resolve("AFCONCAT", 3).map(|f| f.template.as_str()),
            Some("<p1> || <p2> || <p3>")
        );
        assert!(catalog.resolve("AFConcat", 4).is_none());
    }

    #[test]
    fn test_register_replaces_same_key() {
        let mut catalog = PortableFunctionCatalog::new();
        assert!(catalog.register("AFNow", 0, "now()", None).is_none());
        let previous = catalog.register("AFNow", 0, "getdate()", Some("current timestamp"));
        assert_eq!(previous.map(|f| f.template), Some("now()".to_string()));
        assert_eq!(catalog.len(), 1);
        assert_eq!(
            catalog.resolve("AFNow", 0).and_then(|f| f.description.clone()),
            Some("current timestamp".to_string())
        );
    }
}
