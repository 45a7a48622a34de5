//! 配置：源端、目标端连接信息，复制参数与表清单，从 YAML 加载。
//!
//! ```yaml
//! source:
//!   dsn: "mysql:host=localhost;dbname=test"
//!   username: root
//! destination:
//!   dsn: "sqlsrv:Server=localhost;Database=test"
//! transfer:
//!   batch_size: 500
//!   exists_action: rewriteOrClear
//! tables:
//!   - table: author
//!     destination: author2
//!   - table: like
//!     fields: { rule: whitelist, fields: { id: ~, newsId: news_id } }
//!     types: { rule: blacklist, types: [varchar] }
//! ```

use crate::error::ConfigError;
use crate::expr::Expr;
use crate::flavor::Flavor;
use crate::gateway::IsolationLevel;
use crate::rules::{FieldRuleConfig, TypeRuleConfig};
use crate::schema::Columns;
use crate::select::SelectBuilder;
use crate::transfer::{ExistsAction, TableSpec};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 原样 SQL 来源在外层查询中的别名。
const RAW_SOURCE_ALIAS: &str = "src";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub source: ConnectionConfig,
    pub destination: ConnectionConfig,
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub tables: Vec<TableConfig>,
}

impl Config {
    /// 从 YAML 文件加载。
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// 解析 YAML 字符串并校验。
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.dsn.trim().is_empty() {
            return Err(ConfigError::MissingDsn { side: "source" });
        }
        if self.destination.dsn.trim().is_empty() {
            return Err(ConfigError::MissingDsn {
                side: "destination",
            });
        }
        self.transfer.validate()?;
        for (index, table) in self.tables.iter().enumerate() {
            table.validate(index)?;
        }
        Ok(())
    }

    /// 把表清单转成复制请求，查询按源端方言构造。
    pub fn table_specs(&self) -> Vec<TableSpec> {
        let flavor = self.source.flavor();
        self.tables.iter().map(|t| t.to_spec(flavor)).collect()
    }
}

/// 一条数据库连接的参数。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub dsn: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// 未设置时由 DSN 前缀推断。
    #[serde(default)]
    pub flavor: Option<Flavor>,
}

impl ConnectionConfig {
    pub fn flavor(&self) -> Flavor {
        self.flavor.unwrap_or_else(|| Flavor::from_dsn(&self.dsn))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// 每次从源端读取的行数。
    pub batch_size: usize,
    pub exists_action: ExistsAction,
    pub isolation_level: Option<IsolationLevel>,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            exists_action: ExistsAction::default(),
            isolation_level: None,
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        Ok(())
    }
}

/// 表清单中的一项：`table` 与 `sql` 二选一。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableConfig {
    #[serde(default)]
    pub table: Option<String>,
    /// 原样 SQL 查询，作为子查询读取。
    #[serde(default)]
    pub sql: Option<String>,
    /// 目标表名，缺省与 `table` 相同。
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub fields: Option<FieldRuleConfig>,
    #[serde(default)]
    pub types: Option<TypeRuleConfig>,
    #[serde(default)]
    pub columns: Option<Columns>,
}

impl TableConfig {
    fn validate(&self, index: usize) -> Result<(), ConfigError> {
        match (&self.table, &self.sql) {
            (None, None) => Err(ConfigError::MissingSource { index }),
            (None, Some(_)) if self.destination.is_none() => {
                Err(ConfigError::MissingDestination { index })
            }
            _ => Ok(()),
        }
    }

    fn to_spec(&self, flavor: Flavor) -> TableSpec {
        let table = self.table.as_deref().unwrap_or_default();
        let destination = self.destination.as_deref().unwrap_or(table);
        let mut spec = match &self.sql {
            Some(sql) => {
                let mut query = SelectBuilder::with_flavor(flavor);
                query.from((Expr::raw(sql.as_str()), RAW_SOURCE_ALIAS));
                let spec = TableSpec::query(query, destination);
                match &self.columns {
                    Some(columns) => spec.with_columns(columns.clone()),
                    None => spec,
                }
            }
            None => TableSpec::rename(table, destination),
        };
        if let Some(fields) = &self.fields {
            spec = spec.with_fields(fields.clone().into());
        }
        if let Some(types) = &self.types {
            spec = spec.with_types(types.clone().into());
        }
        spec
    }
}
