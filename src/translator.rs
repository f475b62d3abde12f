//! Per-engine composition root.
//!
//! A [`DialectTranslator`] owns its catalogs outright. They are built from the
//! engine's [`DialectCapabilities`] on first use and are read-only afterwards,
//! except through the `&mut self` registration methods.

use std::fmt;
use std::sync::OnceLock;

use tracing::{debug, trace};

use crate::catalog::{FunctionTemplate, PortableFunctionCatalog};
use crate::codec::{CodecOptions, DbValue, SemanticType, StoredType, TextPolicy, Value, ValueCodec};
use crate::command::{CommandKind, CommandTemplateRegistry, EngineIdentity};
use crate::dialect::{Dialect, DialectCapabilities, vocabulary};
use crate::error::DialectResult;
use crate::placeholder::{
    Clock, PlaceholderRegistry, register_builtin_booleans, register_builtin_dates, system_clock,
};
use crate::rewriter::{DEFAULT_MAX_DEPTH, QueryRewriter};

/// Engine options for one translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatorOptions {
    pub identity: EngineIdentity,
    pub codec: CodecOptions,
    pub max_rewrite_depth: usize,
}

impl TranslatorOptions {
    /// The engine's own defaults.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let caps = dialect.capabilities();
        Self {
            identity: caps.default_identity(),
            codec: CodecOptions {
                guid_storage: caps.guid_storage(),
                text_policy: TextPolicy::Unbounded,
            },
            max_rewrite_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

struct Catalogs {
    templates: CommandTemplateRegistry,
    functions: PortableFunctionCatalog,
    placeholders: PlaceholderRegistry,
}

pub struct DialectTranslator {
    dialect: Dialect,
    capabilities: Box<dyn DialectCapabilities>,
    options: TranslatorOptions,
    codec: ValueCodec,
    clock: Clock,
    catalogs: OnceLock<Catalogs>,
}

impl fmt::Debug for DialectTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DialectTranslator")
            .field("dialect", &self.dialect)
            .field("options", &self.options)
            .field("initialized", &self.catalogs.get().is_some())
            .finish()
    }
}

impl DialectTranslator {
    pub fn new(dialect: Dialect) -> Self {
        Self::with_options(dialect, TranslatorOptions::for_dialect(dialect))
    }

    pub fn with_options(dialect: Dialect, options: TranslatorOptions) -> Self {
        Self {
            dialect,
            capabilities: dialect.capabilities(),
            codec: ValueCodec::new(options.codec),
            options,
            clock: system_clock(),
            catalogs: OnceLock::new(),
        }
    }

    /// Replace the clock behind the date placeholders.
    ///
    /// Catalogs already built are discarded, including custom registrations.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self.catalogs = OnceLock::new();
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    fn build_catalogs(&self) -> Catalogs {
        let caps = &self.capabilities;

        let mut templates = CommandTemplateRegistry::new(self.options.identity.clone());
        for (kind, text) in caps.command_templates() {
            templates.register(*kind, *text);
        }

        let mut functions = PortableFunctionCatalog::new();
        functions.register_all(vocabulary::BASE);
        functions.register_all(caps.function_overrides());

        let mut placeholders = PlaceholderRegistry::new();
        register_builtin_dates(&mut placeholders, &self.clock, caps.date_literals());
        register_builtin_booleans(&mut placeholders, caps.bool_literal(true), caps.bool_literal(false));

        debug!(
            dialect = %self.dialect,
            overrides = caps.command_templates().len(),
            functions = functions.len(),
            placeholders = placeholders.len(),
            "initialized dialect catalogs"
        );
        Catalogs {
            templates,
            functions,
            placeholders,
        }
    }

    fn catalogs(&self) -> &Catalogs {
        self.catalogs.get_or_init(|| self.build_catalogs())
    }

    fn with_catalogs_mut<R>(&mut self, f: impl FnOnce(&mut Catalogs) -> R) -> R {
        let mut catalogs = self.catalogs.take().unwrap_or_else(|| self.build_catalogs());
        let out = f(&mut catalogs);
        self.catalogs = OnceLock::from(catalogs);
        out
    }

    /// Rewrite portable function calls and placeholders into engine SQL.
    pub fn translate(&self, query: &str) -> DialectResult<String> {
        let catalogs = self.catalogs();
        let sql = QueryRewriter::new(&catalogs.functions, &catalogs.placeholders)
            .with_max_depth(self.options.max_rewrite_depth)
            .rewrite(query)?;
        trace!(dialect = %self.dialect, %query, %sql, "translated query");
        Ok(sql)
    }

    pub fn template(&self, kind: CommandKind) -> DialectResult<String> {
        self.catalogs().templates.template(kind)
    }

    pub fn render(&self, kind: CommandKind, tokens: &[(&str, &str)]) -> DialectResult<String> {
        self.catalogs().templates.render(kind, tokens)
    }

    pub fn to_database(
        &self,
        value: &Value,
        declared: &SemanticType,
        compress: bool,
    ) -> DialectResult<(DbValue, StoredType)> {
        self.codec.to_database(value, declared, compress)
    }

    pub fn from_database(&self, raw: &DbValue, target: &SemanticType) -> DialectResult<Value> {
        self.codec.from_database(raw, target)
    }

    pub fn quote_identifier(&self, name: &str) -> String {
        self.capabilities.quote_identifier(name)
    }

    pub fn templates(&self) -> &CommandTemplateRegistry {
        &self.catalogs().templates
    }

    pub fn functions(&self) -> &PortableFunctionCatalog {
        &self.catalogs().functions
    }

    pub fn placeholders(&self) -> &PlaceholderRegistry {
        &self.catalogs().placeholders
    }

    /// Override the command template for `kind`.
    pub fn register_template(&mut self, kind: CommandKind, text: impl Into<String>) {
        let text = text.into();
        self.with_catalogs_mut(|c| c.templates.register(kind, text));
    }

    /// Register or replace the expression template for `(name, arity)`.
    pub fn register_function(
        &mut self,
        name: &str,
        arity: usize,
        template: impl Into<String>,
    ) -> Option<FunctionTemplate> {
        let template = template.into();
        self.with_catalogs_mut(|c| c.functions.register(name, arity, template, None))
    }

    pub fn register_placeholder(&mut self, name: &str, value: impl Into<String>) -> DialectResult<()> {
        let value = value.into();
        self.with_catalogs_mut(|c| c.placeholders.register(name, value))
    }

    /// Recompute date placeholders on next use.
    pub fn refresh_placeholders(&mut self) {
        if let Some(catalogs) = self.catalogs.get_mut() {
            catalogs.placeholders.reset_computed();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use uuid::Uuid;

    use super::*;
    use crate::codec::GuidStorage;
    use crate::error::DialectError;

    fn fixed_clock() -> Clock {
        Arc::new(|| {
            NaiveDate::from_ymd_opt(2024, 3, 15)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap()
        })
    }

    fn translator(dialect: Dialect) -> DialectTranslator {
        DialectTranslator::new(dialect).with_clock(fixed_clock())
    }

    #[test]
    fn test_translator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DialectTranslator>();
    }

    #[test]
    fn test_example_query_on_postgres() {
        assert_eq!(
            translator(Dialect::Postgres)
                .translate("select * from t where AFUpper(name) = AFConcat('A','B')")
                .unwrap(),
            "select * from t where upper(name) = 'A' || 'B'"
        );
    }

    #[test]
    fn test_same_query_per_engine() {
        let query = "select AFConcat(first, last), AFNow() from people where active = #TRUE#";
        let expected = [
            (Dialect::Postgres, "select first || last, current_timestamp from people where active = true"),
            (Dialect::MySql, "select concat(first, last), current_timestamp from people where active = 1"),
            (Dialect::Sqlite, "select first || last, datetime('now') from people where active = 1"),
            (Dialect::SqlServer, "select concat(first, last), getdate() from people where active = 1"),
        ];
        for (dialect, sql) in expected {
            assert_eq!(translator(dialect).translate(query).unwrap(), sql, "{dialect}");
        }
    }

    #[test]
    fn test_date_placeholders_use_engine_literals() {
        let query = "due < #TOMORROW#";
        assert_eq!(
            translator(Dialect::Postgres).translate(query).unwrap(),
            "due < DATE '2024-03-16'"
        );
        assert_eq!(
            translator(Dialect::SqlServer).translate(query).unwrap(),
            "due < '20240316'"
        );
        assert_eq!(
            translator(Dialect::Sqlite).translate(query).unwrap(),
            "due < '2024-03-16'"
        );
    }

    #[test]
    fn test_template_overrides_per_engine() {
        let tokens = [("#TABLENAME#", "users"), ("#FIELDS#", "id, name"), ("#COUNT#", "10")];
        assert_eq!(
            translator(Dialect::SqlServer).render(CommandKind::SelectTop, &tokens).unwrap(),
            "SELECT TOP 10 id, name FROM users"
        );
        assert_eq!(
            translator(Dialect::Postgres).render(CommandKind::SelectTop, &tokens).unwrap(),
            "SELECT id, name FROM users LIMIT 10"
        );
        assert!(matches!(
            translator(Dialect::Sqlite).template(CommandKind::AlterField),
            Err(DialectError::UnknownCommand(CommandKind::AlterField))
        ));
    }

    #[test]
    fn test_identity_tokens_from_options() {
        let mut options = TranslatorOptions::for_dialect(Dialect::MySql);
        options.identity.database = "shop".into();
        let mysql = DialectTranslator::with_options(Dialect::MySql, options);
        assert_eq!(
            mysql.template(CommandKind::CreateDatabase).unwrap(),
            "CREATE DATABASE shop CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
        );
    }

    #[test]
    fn test_registrations_after_first_use() {
        let mut pg = translator(Dialect::Postgres);
        assert_eq!(pg.translate("AFUpper(x)").unwrap(), "upper(x)");

        let previous = pg.register_function("AFUpper", 1, "upper(<p1>::text)");
        assert_eq!(previous.map(|p| p.template), Some("upper(<p1>)".to_string()));
        pg.register_function("AFInitials", 1, "left(<p1>, 1)");
        pg.register_placeholder("#TENANT#", "42").unwrap();
        pg.register_template(CommandKind::DeleteAll, "TRUNCATE #TABLENAME#");

        assert_eq!(
            pg.translate("AFUpper(AFInitials(x)) and t = #TENANT#").unwrap(),
            "upper(left(x, 1)::text) and t = 42"
        );
        assert_eq!(pg.template(CommandKind::DeleteAll).unwrap(), "TRUNCATE #TABLENAME#");
        assert!(matches!(
            pg.register_placeholder("TENANT", "1"),
            Err(DialectError::InvalidPlaceholderName { .. })
        ));
    }

    #[test]
    fn test_translators_do_not_share_catalogs() {
        let mut a = translator(Dialect::Postgres);
        let b = translator(Dialect::Postgres);
        a.register_function("AFUpper", 1, "custom(<p1>)");
        assert_eq!(a.translate("AFUpper(x)").unwrap(), "custom(x)");
        assert_eq!(b.translate("AFUpper(x)").unwrap(), "upper(x)");
    }

    #[test]
    fn test_quote_identifier_per_engine() {
        assert_eq!(translator(Dialect::Postgres).quote_identifier("order"), "\"order\"");
        assert_eq!(translator(Dialect::MySql).quote_identifier("order"), "`order`");
        assert_eq!(translator(Dialect::SqlServer).quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_sqlserver_guid_quirk() {
        let ms = translator(Dialect::SqlServer);
        assert_eq!(ms.codec().options().guid_storage, GuidStorage::MixedEndianBytes);
        let id = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let (raw, stored) = ms
            .to_database(&Value::Guid(id), &SemanticType::Guid, false)
            .unwrap();
        assert_eq!(stored, StoredType::Bytes);
        assert_eq!(ms.from_database(&raw, &SemanticType::Guid).unwrap(), Value::Guid(id));
    }

    #[test]
    fn test_custom_depth_limit() {
        let mut options = TranslatorOptions::for_dialect(Dialect::Postgres);
        options.max_rewrite_depth = 1;
        let pg = DialectTranslator::with_options(Dialect::Postgres, options);
        assert!(pg.translate("AFUpper(x)").is_ok());
        assert!(matches!(
            pg.translate("AFUpper(AFLower(x))"),
            Err(DialectError::RewriteDepthExceeded { limit: 1, .. })
        ));
    }
}
