#[cfg(test)]
mod tests {
    use crate::config::{Config, TransferConfig};
    use crate::error::ConfigError;
    use crate::flavor::Flavor;
    use crate::gateway::IsolationLevel;
    use crate::modifiers::Builder;
    use crate::rules::{FieldRule, TypeRule};
    use crate::transfer::{ExistsAction, SourceSpec};
    use pretty_assertions::assert_eq;

    const FULL: &str = r#"
source:
  dsn: "mysql:host=localhost;dbname=news"
  username: root
  password: secret
destination:
  dsn: "sqlsrv:Server=backup;Database=news"
transfer:
  batch_size: 500
  exists_action: rewriteOrClear
  isolation_level: read committed
tables:
  - table: author
    destination: author2
  - table: like
    fields: { rule: blacklist, fields: [created] }
    types: { rule: whitelist, types: [{ pattern: int }] }
  - sql: "SELECT id, COUNT(*) AS total FROM like GROUP BY id"
    destination: like_totals
    columns:
      - { name: id, type: "int(11)", primary: true }
      - { name: total, type: bigint }
"#;

    #[test]
    fn load_full_config() {
        let config = Config::from_yaml(FULL).unwrap();

        assert_eq!(config.source.flavor(), Flavor::MySQL);
        assert_eq!(config.destination.flavor(), Flavor::SQLServer);
        assert_eq!(config.source.username.as_deref(), Some("root"));
        assert_eq!(
            config.transfer,
            TransferConfig {
                batch_size: 500,
                exists_action: ExistsAction::RewriteOrClear,
                isolation_level: Some(IsolationLevel::ReadCommitted),
            }
        );
        assert_eq!(config.tables.len(), 3);
    }

    #[test]
    fn table_specs_follow_entries() {
        let specs = Config::from_yaml(FULL).unwrap().table_specs();

        assert!(matches!(&specs[0].source, SourceSpec::Table(t) if t == "author"));
        assert_eq!(specs[0].destination, "author2");

        assert_eq!(specs[1].destination, "like");
        assert!(matches!(&specs[1].fields, Some(FieldRule::Blacklist(f)) if f == &["created"]));
        assert_eq!(
            specs[1].types,
            Some(TypeRule::Whitelist(vec![("int".to_string(), None)]))
        );

        match &specs[2].source {
            SourceSpec::Query { query, columns } => {
                assert_eq!(
                    query.build().0,
                    "SELECT *\nFROM (SELECT id, COUNT(*) AS total FROM like GROUP BY id) AS `src`"
                );
                let columns = columns.as_ref().unwrap();
                assert_eq!(columns.names().collect::<Vec<_>>(), vec!["id", "total"]);
                assert_eq!(columns.primary_keys().count(), 1);
            }
            other => panic!("expected a query source, got {other:?}"),
        }
        assert_eq!(specs[2].source_name(), "<query>");
    }

    #[test]
    fn defaults_apply_when_transfer_is_omitted() {
        let config = Config::from_yaml(
            "source: { dsn: 'mysql:host=a' }\ndestination: { dsn: 'mysql:host=b', flavor: mssql }\n",
        )
        .unwrap();

        assert_eq!(config.transfer, TransferConfig::default());
        assert_eq!(config.transfer.batch_size, 100);
        assert_eq!(config.transfer.exists_action, ExistsAction::Rewrite);
        assert_eq!(config.destination.flavor(), Flavor::SQLServer);
        assert!(config.tables.is_empty());
    }

    #[test]
    fn validation_errors() {
        let missing_dsn = "source: { dsn: '' }\ndestination: { dsn: 'mysql:' }\n";
        assert!(matches!(
            Config::from_yaml(missing_dsn),
            Err(ConfigError::MissingDsn { side: "source" })
        ));

        let zero_batch =
            "source: { dsn: 'mysql:' }\ndestination: { dsn: 'mysql:' }\ntransfer: { batch_size: 0 }\n";
        assert!(matches!(
            Config::from_yaml(zero_batch),
            Err(ConfigError::InvalidBatchSize)
        ));

        let no_source = "source: { dsn: 'mysql:' }\ndestination: { dsn: 'mysql:' }\ntables: [{ destination: x }]\n";
        assert!(matches!(
            Config::from_yaml(no_source),
            Err(ConfigError::MissingSource { index: 0 })
        ));

        let no_destination =
            "source: { dsn: 'mysql:' }\ndestination: { dsn: 'mysql:' }\ntables: [{ table: a }, { sql: 'SELECT 1' }]\n";
        assert!(matches!(
            Config::from_yaml(no_destination),
            Err(ConfigError::MissingDestination { index: 1 })
        ));
    }

    #[test]
    fn invalid_names_are_rejected() {
        let bad_action = "source: { dsn: 'mysql:' }\ndestination: { dsn: 'mysql:' }\ntransfer: { exists_action: overwrite }\n";
        let err = Config::from_yaml(bad_action).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("unknown exists action `overwrite`"));

        let bad_level = "source: { dsn: 'mysql:' }\ndestination: { dsn: 'mysql:' }\ntransfer: { isolation_level: snapshot }\n";
        assert!(Config::from_yaml(bad_level).is_err());
    }

    #[test]
    fn exists_action_and_isolation_parse() {
        let cases = vec![
            ("rewrite", ExistsAction::Rewrite),
            ("REWRITEORCLEAR", ExistsAction::RewriteOrClear),
            ("truncate", ExistsAction::RewriteOrClear),
            (" Skip ", ExistsAction::Skip),
            ("stop", ExistsAction::Stop),
            ("Append", ExistsAction::Append),
        ];
        for (name, expected) in cases {
            assert_eq!(name.parse::<ExistsAction>().unwrap(), expected, "name: {name}");
        }
        assert_eq!(ExistsAction::RewriteOrClear.to_string(), "rewriteOrClear");

        assert_eq!(
            "repeatable_read".parse::<IsolationLevel>().unwrap(),
            IsolationLevel::RepeatableRead
        );
        assert_eq!(IsolationLevel::ReadUncommitted.to_string(), "READ UNCOMMITTED");
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let yaml = r#"
source: { dsn: "mysql:" }
destination: { dsn: "mysql:" }
tables:
  - sql: "SELECT 1 AS id"
    destination: one
    columns:
      - { name: id, type: int }
      - { name: id, type: bigint }
"#;
        let err = Config::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
        assert!(err.to_string().contains("column `id` would be produced more than once"));
    }

    #[test]
    fn load_reports_missing_file() {
        assert!(matches!(
            Config::load("/nonexistent/transfer.yaml"),
            Err(ConfigError::Io(_))
        ));
    }
}
