//! 数据库网关：传输引擎对一条数据库连接所需的全部能力。
//!
//! 连接、预处理、执行与取数由实现方负责；建表、删表、清表及隔离级别
//! 有基于本 crate builder 的默认实现，实现方只需提供 `query` / `execute`
//! 与结构探查即可工作。

use crate::create_table::{CreateTableBuilder, DropTableBuilder, TruncateTableBuilder};
use crate::dialect::Upsert;
use crate::error::{ConfigError, GatewayError};
use crate::flavor::Flavor;
use crate::modifiers::Builder;
use crate::quote::quote_value;
use crate::schema::Columns;
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 结果集中的一行：列名与值，保持 SELECT 列顺序。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    fields: Vec<(String, SqlValue)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一列；同名列会被覆盖。
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<SqlValue>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl IntoIterator for Row {
    type Item = (String, SqlValue);
    type IntoIter = std::vec::IntoIter<(String, SqlValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

impl<K: Into<String>, V: Into<SqlValue>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.push(k, v);
        }
        row
    }
}

/// 源端读取方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// 每批一条带 LIMIT/OFFSET（或 ROW_NUMBER）的 SELECT。
    #[default]
    Paginated,
    /// 一条 SELECT，通过只进游标分批读取。
    Cursor,
}

/// 只进游标。
pub trait RowCursor {
    /// 读取至多 `max_rows` 行；返回空表示读完。
    fn next_batch(&mut self, max_rows: usize) -> Result<Vec<Row>, GatewayError>;
}

/// 事务隔离级别。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

impl fmt::Display for IsolationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for IsolationLevel {
    type Err = ConfigError;

    /// 接受 `serializable`、`read committed`、`read_committed` 等写法。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "readuncommitted" => Ok(Self::ReadUncommitted),
            "readcommitted" => Ok(Self::ReadCommitted),
            "repeatableread" => Ok(Self::RepeatableRead),
            "serializable" => Ok(Self::Serializable),
            _ => Err(ConfigError::UnknownIsolationLevel(s.to_string())),
        }
    }
}

impl TryFrom<String> for IsolationLevel {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IsolationLevel> for String {
    fn from(value: IsolationLevel) -> Self {
        value.as_sql().to_string()
    }
}

/// 一条数据库连接。
///
/// 传输引擎独占持有源端与目标端各一个网关，所有方法都是同步阻塞的。
pub trait Gateway {
    /// 该连接使用的 SQL 方言。
    fn flavor(&self) -> Flavor;

    fn is_table_exists(&mut self, table: &str) -> Result<bool, GatewayError>;

    /// 读取表的列结构，包括主键与索引标记。
    fn get_columns(&mut self, table: &str) -> Result<Columns, GatewayError>;

    /// 执行查询并返回全部结果行。
    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, GatewayError>;

    /// 执行语句并返回受影响的行数。
    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, GatewayError>;

    fn create_table(
        &mut self,
        table: &str,
        columns: &Columns,
        if_not_exists: bool,
    ) -> Result<(), GatewayError> {
        let mut ctb = CreateTableBuilder::with_flavor(self.flavor());
        ctb.create_table(table).columns(columns.clone());
        if if_not_exists {
            ctb.if_not_exists();
        }
        let (sql, args) = ctb.build();
        self.execute(&sql, &args).map(|_| ())
    }

    fn drop_table(&mut self, table: &str, if_exists: bool) -> Result<(), GatewayError> {
        let mut dtb = DropTableBuilder::with_flavor(self.flavor());
        dtb.drop_table(table);
        if if_exists {
            dtb.if_exists();
        }
        let (sql, args) = dtb.build();
        self.execute(&sql, &args).map(|_| ())
    }

    fn truncate_table(&mut self, table: &str) -> Result<(), GatewayError> {
        let mut ttb = TruncateTableBuilder::with_flavor(self.flavor());
        ttb.truncate_table(table);
        let (sql, args) = ttb.build();
        self.execute(&sql, &args).map(|_| ())
    }

    fn fetch_mode(&self) -> FetchMode {
        FetchMode::Paginated
    }

    /// 以只进游标执行查询；`fetch_mode()` 返回 [`FetchMode::Cursor`] 的实现需要覆盖。
    fn open_cursor<'a>(
        &'a mut self,
        sql: &str,
        _params: &[SqlValue],
    ) -> Result<Box<dyn RowCursor + 'a>, GatewayError> {
        Err(GatewayError::new("forward cursors are not supported by this gateway").with_sql(sql))
    }

    fn set_isolation_level(&mut self, level: IsolationLevel) -> Result<(), GatewayError> {
        let sql = format!("SET TRANSACTION ISOLATION LEVEL {level}");
        self.execute(&sql, &[]).map(|_| ())
    }

    /// 目标端能否执行本方言的 upsert 语法。
    fn supports_upsert(&self) -> bool {
        self.flavor().dialect().upsert != Upsert::Unsupported
    }

    /// 把一个值编码成 SQL 字面量。
    fn quote(&self, value: &SqlValue) -> String {
        quote_value(self.flavor(), value)
    }
}

impl<G: Gateway + ?Sized> Gateway for Box<G> {
    fn flavor(&self) -> Flavor {
        (**self).flavor()
    }

    fn is_table_exists(&mut self, table: &str) -> Result<bool, GatewayError> {
        (**self).is_table_exists(table)
    }

    fn get_columns(&mut self, table: &str) -> Result<Columns, GatewayError> {
        (**self).get_columns(table)
    }

    fn query(&mut self, sql: &str, params: &[SqlValue]) -> Result<Vec<Row>, GatewayError> {
        (**self).query(sql, params)
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, GatewayError> {
        (**self).execute(sql, params)
    }

    fn create_table(
        &mut self,
        table: &str,
        columns: &Columns,
        if_not_exists: bool,
    ) -> Result<(), GatewayError> {
        (**self).create_table(table, columns, if_not_exists)
    }

    fn drop_table(&mut self, table: &str, if_exists: bool) -> Result<(), GatewayError> {
        (**self).drop_table(table, if_exists)
    }

    fn truncate_table(&mut self, table: &str) -> Result<(), GatewayError> {
        (**self).truncate_table(table)
    }

    fn fetch_mode(&self) -> FetchMode {
        (**self).fetch_mode()
    }

    fn open_cursor<'a>(
        &'a mut self,
        sql: &str,
        params: &[SqlValue],
    ) -> Result<Box<dyn RowCursor + 'a>, GatewayError> {
        (**self).open_cursor(sql, params)
    }

    fn set_isolation_level(&mut self, level: IsolationLevel) -> Result<(), GatewayError> {
        (**self).set_isolation_level(level)
    }

    fn supports_upsert(&self) -> bool {
        (**self).supports_upsert()
    }

    fn quote(&self, value: &SqlValue) -> String {
        (**self).quote(value)
    }
}
