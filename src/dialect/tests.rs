//! Per-engine capability tests.

use pretty_assertions::assert_eq;

use super::*;
use crate::catalog::PortableFunctionCatalog;
use crate::command::{CommandTemplateRegistry, DEFAULT_TEMPLATES};

fn catalog_for(dialect: Dialect) -> PortableFunctionCatalog {
    let mut catalog = PortableFunctionCatalog::new();
    catalog.register_all(vocabulary::BASE);
    catalog.register_all(dialect.capabilities().function_overrides());
    catalog
}

fn registry_for(dialect: Dialect) -> CommandTemplateRegistry {
    let caps = dialect.capabilities();
    let mut registry = CommandTemplateRegistry::new(caps.default_identity());
    for (kind, text) in caps.command_templates() {
        registry.register(*kind, *text);
    }
    registry
}

fn expand(dialect: Dialect, name: &str, args: &[&str]) -> String {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    catalog_for(dialect)
        .resolve(name, args.len())
        .map(|f| f.expand(&args))
        .unwrap_or_else(|| panic!("{name}/{} missing on {dialect}", args.len()))
}

#[test]
fn test_dialect_names() {
    for dialect in Dialect::ALL {
        assert_eq!(dialect.as_str().parse::<Dialect>().unwrap(), dialect);
        assert_eq!(dialect.capabilities().dialect(), dialect);
    }
    assert_eq!("MSSQL".parse::<Dialect>().unwrap(), Dialect::SqlServer);
    assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
    assert!("oracle".parse::<Dialect>().is_err());
}

#[test]
fn test_every_engine_covers_the_vocabulary() {
    for dialect in Dialect::ALL {
        let catalog = catalog_for(dialect);
        for def in vocabulary::BASE {
            assert!(
                catalog.resolve(def.name, def.arity).is_some(),
                "{}/{} on {dialect}",
                def.name,
                def.arity
            );
        }
        assert_eq!(catalog.len(), vocabulary::BASE.len(), "{dialect} adds no arities");
    }
}

#[test]
fn test_overrides_only_touch_known_keys() {
    let base: Vec<(&str, usize)> = vocabulary::BASE.iter().map(|d| (d.name, d.arity)).collect();
    for dialect in Dialect::ALL {
        for def in dialect.capabilities().function_overrides() {
            assert!(
                base.contains(&(def.name, def.arity)),
                "{dialect} overrides unknown {}/{}",
                def.name,
                def.arity
            );
        }
    }
}

#[test]
fn test_templates_only_use_known_positions() {
    for dialect in Dialect::ALL {
        for f in catalog_for(dialect).functions() {
            let args: Vec<String> = (0..f.arity).map(|i| format!("a{}", i + 1)).collect();
            let sql = f.expand(&args);
            assert!(!sql.contains("<p"), "{dialect} {}/{}: {sql}", f.name, f.arity);
        }
    }
}

#[test]
fn test_concat_per_engine() {
    assert_eq!(expand(Dialect::Postgres, "AFConcat", &["a", "b", "c"]), "a || b || c");
    assert_eq!(expand(Dialect::Sqlite, "AFConcat", &["a", "b"]), "a || b");
    assert_eq!(expand(Dialect::MySql, "AFConcat", &["a", "b", "c"]), "concat(a, b, c)");
    assert_eq!(expand(Dialect::SqlServer, "AFConcat", &["a", "b"]), "concat(a, b)");
}

#[test]
fn test_date_arithmetic_per_engine() {
    assert_eq!(
        expand(Dialect::Postgres, "AFAddDays", &["d", "3"]),
        "(d + 3 * interval '1 day')"
    );
    assert_eq!(
        expand(Dialect::MySql, "AFAddDays", &["d", "3"]),
        "date_add(d, interval 3 day)"
    );
    assert_eq!(
        expand(Dialect::Sqlite, "AFAddDays", &["d", "3"]),
        "date(d, (3) || ' days')"
    );
    assert_eq!(
        expand(Dialect::SqlServer, "AFAddDays", &["d", "3"]),
        "dateadd(day, 3, d)"
    );
    assert_eq!(
        expand(Dialect::SqlServer, "AFDiffDays", &["a", "b"]),
        "datediff(day, a, b)"
    );
}

#[test]
fn test_zero_arity_functions() {
    assert_eq!(expand(Dialect::Postgres, "AFNewGuid", &[]), "gen_random_uuid()");
    assert_eq!(expand(Dialect::SqlServer, "AFNewGuid", &[]), "newid()");
    assert_eq!(expand(Dialect::Sqlite, "AFToday", &[]), "date('now')");
}

#[test]
fn test_template_overrides_replace_defaults() {
    let pg = registry_for(Dialect::Postgres);
    assert_eq!(pg.template(CommandKind::FieldTypeGuid).unwrap(), "UUID");
    assert_eq!(pg.template(CommandKind::FieldTypeInt).unwrap(), "INTEGER");
    assert!(!pg.is_overridden(CommandKind::FieldTypeInt));

    let ms = registry_for(Dialect::SqlServer);
    assert_eq!(ms.template(CommandKind::FieldTypeBool).unwrap(), "BIT");
    assert_eq!(
        ms.template(CommandKind::DropIndex).unwrap(),
        "DROP INDEX #INDEXNAME# ON #TABLENAME#"
    );
}

#[test]
fn test_identity_in_mysql_create_table() {
    assert_eq!(
        registry_for(Dialect::MySql)
            .render(CommandKind::CreateTable, &[
                ("#TABLENAME#", "users"),
                ("#FIELDS#", "id INT"),
                ("#FIELDNAMEKEY#", "id"),
            ])
            .unwrap(),
        "CREATE TABLE users (id INT, PRIMARY KEY (id)) DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"
    );
}

#[test]
fn test_existence_checks_resolve_where_supported() {
    let existence = [
        CommandKind::TableExists,
        CommandKind::ViewExists,
        CommandKind::FieldExists,
        CommandKind::IndexExists,
        CommandKind::TriggerExists,
    ];
    for dialect in Dialect::ALL {
        let registry = registry_for(dialect);
        for kind in existence {
            assert!(registry.template(kind).is_ok(), "{kind} on {dialect}");
        }
    }
    assert!(DEFAULT_TEMPLATES.iter().all(|(kind, _)| *kind != CommandKind::TableExists));
}

#[test]
fn test_capability_defaults() {
    let caps = Dialect::Sqlite.capabilities();
    assert_eq!(caps.quote_identifier("a\"b"), "\"a\"\"b\"");
    assert_eq!(caps.bool_literal(true), "1");
    assert_eq!(caps.guid_storage(), GuidStorage::Text);
    assert_eq!(Dialect::Postgres.capabilities().bool_literal(false), "false");
    assert_eq!(Dialect::MySql.capabilities().guid_storage(), GuidStorage::Bytes);
}

#[test]
fn test_dialect_serde_names() {
    #[derive(Deserialize)]
    struct Wrapper {
        dialect: Dialect,
    }
    let parsed: Wrapper = toml::from_str("dialect = \"mssql\"").unwrap();
    assert_eq!(parsed.dialect, Dialect::SqlServer);
    let parsed: Wrapper = toml::from_str("dialect = \"sqlite\"").unwrap();
    assert_eq!(parsed.dialect, Dialect::Sqlite);
}
