//! 错误类型：按出错阶段分层（配置、结构推导、SQL 构造、网关执行、单行写入）。

use thiserror::Error;

/// 顶层 Result。
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// 配置错误：加载阶段或设置选项时出现。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown exists action `{name}`, expected one of: {expected}")]
    InvalidAction { name: String, expected: &'static str },
    #[error("no dsn configured for {side} connection")]
    MissingDsn { side: &'static str },
    #[error("table entry #{index} has neither `table` nor `sql`")]
    MissingSource { index: usize },
    #[error("table entry #{index} reads from `sql` but names no `destination`")]
    MissingDestination { index: usize },
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,
    #[error("unknown flavor `{0}`")]
    UnknownFlavor(String),
    #[error("unknown isolation level `{0}`")]
    UnknownIsolationLevel(String),
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// 结构错误：源表列无法确定，或推导出的目标列集合不合法。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("source table `{table}` does not exist")]
    SourceTableMissing { table: String },
    #[error("column `{column}` would be produced more than once")]
    DuplicateColumn { column: String },
    #[error("can not determine the structure of column `{column}`: {reason}")]
    UnresolvableColumn { column: String, reason: &'static str },
    #[error("no column of `{table}` survives the column rules")]
    NoColumns { table: String },
}

/// SQL 构造错误。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("operator `{operator}` expects {expected} operand(s), got {found}")]
    InvalidArity {
        operator: String,
        expected: &'static str,
        found: usize,
    },
    #[error("{clause} already contains `{key}`")]
    FieldConflict { clause: &'static str, key: String },
    #[error("{statement} statement has no table")]
    MissingTable { statement: &'static str },
}

/// 网关（Gateway 实现方）返回的错误，可附带出错的 SQL。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}{}", sql_suffix(.sql))]
pub struct GatewayError {
    pub message: String,
    pub sql: Option<String>,
}

impl GatewayError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            sql: None,
        }
    }

    pub fn with_sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }
}

fn sql_suffix(sql: &Option<String>) -> String {
    sql.as_deref()
        .map(|s| format!(" (sql: {s})"))
        .unwrap_or_default()
}

/// 向目标表写入单行失败。
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("row can not be written into `{table}`: {source}")]
pub struct RowWriteError {
    pub table: String,
    pub sql: String,
    #[source]
    pub source: GatewayError,
}

/// 传输引擎的顶层错误。
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Build(#[from] BuildError),
    #[error("gateway failed on `{table}`: {source}")]
    Gateway {
        table: String,
        #[source]
        source: GatewayError,
    },
    #[error(transparent)]
    RowWrite(#[from] RowWriteError),
    #[error("copying `{source_table}` stopped: destination `{destination}` already exists")]
    Stopped {
        source_table: String,
        destination: String,
    },
}

impl Error {
    pub(crate) fn gateway(table: &str) -> impl FnOnce(GatewayError) -> Self + '_ {
        move |source| Self::Gateway {
            table: table.to_string(),
            source,
        }
    }
}
