//! SQL Flavor（方言）：控制标识符转义、分页、Upsert 与占位符行为。

use crate::dialect::Dialect;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 支持的数据库方言。
///
/// 每个 builder 都持有自己的 Flavor，不存在进程级的默认值。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Flavor {
    #[default]
    MySQL,
    SQLServer,
}

impl Flavor {
    /// 该 Flavor 对应的渲染策略。
    pub const fn dialect(self) -> Dialect {
        match self {
            Self::MySQL => Dialect::MYSQL,
            Self::SQLServer => Dialect::MSSQL,
        }
    }

    /// 为标识符加引号，`a.b` 会逐段转义，`*` 保持原样。
    pub fn quote(self, name: &str) -> String {
        self.dialect().quote_ident(name)
    }

    /// 按 DSN 前缀（`mysql:`、`mssql:`、`odbc:`、`sqlsrv:`）选择 Flavor，未识别时为 MySQL。
    pub fn from_dsn(dsn: &str) -> Self {
        let prefix = dsn
            .split_once(':')
            .map_or(dsn, |(p, _)| p)
            .trim()
            .to_ascii_lowercase();
        match prefix.as_str() {
            "mssql" | "odbc" | "sqlsrv" | "sqlserver" => Self::SQLServer,
            _ => Self::MySQL,
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::MySQL => "MySQL",
            Self::SQLServer => "SQLServer",
        };
        f.write_str(s)
    }
}

impl FromStr for Flavor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Self::MySQL),
            "sqlserver" | "mssql" => Ok(Self::SQLServer),
            _ => Err(ConfigError::UnknownFlavor(s.to_string())),
        }
    }
}

impl TryFrom<String> for Flavor {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Flavor> for String {
    fn from(value: Flavor) -> Self {
        value.to_string()
    }
}
