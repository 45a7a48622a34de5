//! 测试用的内存网关：理解本 crate 生成的单表 SELECT（含两种方言的分页）、INSERT 与建表/删表/清表。

use crate::error::GatewayError;
use crate::flavor::Flavor;
use crate::gateway::{FetchMode, Gateway, Row, RowCursor};
use crate::schema::Columns;
use crate::value::SqlValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryTable {
    pub columns: Columns,
    pub rows: Vec<Row>,
}

#[derive(Debug, Default)]
pub(crate) struct MemoryGateway {
    pub flavor: Flavor,
    pub fetch_mode: FetchMode,
    pub tables: BTreeMap<String, MemoryTable>,
    /// 包含该片段的查询直接返回给定行，再做分页。
    pub canned: Vec<(String, Vec<Row>)>,
    /// DDL 与会话语句，按执行顺序。
    pub log: Vec<String>,
    pub queries: Vec<String>,
    pub inserts: usize,
    /// 向该表写入时返回错误。
    pub fail_writes_to: Option<String>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flavor(flavor: Flavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    pub fn with_table(mut self, name: &str, columns: Columns, rows: Vec<Row>) -> Self {
        self.tables
            .insert(name.to_string(), MemoryTable { columns, rows });
        self
    }

    pub fn with_canned(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.canned.push((needle.to_string(), rows));
        self
    }

    pub fn rows(&self, table: &str) -> &[Row] {
        self.tables
            .get(table)
            .map(|t| t.rows.as_slice())
            .unwrap_or_default()
    }

    pub fn columns(&self, table: &str) -> Option<&Columns> {
        self.tables.get(table).map(|t| &t.columns)
    }

    fn select_all(&self, sql: &str) -> Result<Vec<Row>, GatewayError> {
        if let Some((_, rows)) = self.canned.iter().find(|(needle, _)| sql.contains(needle)) {
            return Ok(rows.clone());
        }
        let from = sql
            .lines()
            .find_map(|l| l.trim().strip_prefix("FROM ").filter(|t| *t != "("))
            .ok_or_else(|| GatewayError::new("no FROM clause").with_sql(sql))?;
        let table = unquote(from);
        self.tables
            .get(&table)
            .map(|t| t.rows.clone())
            .ok_or_else(|| GatewayError::new(format!("no table `{table}`")).with_sql(sql))
    }

    fn insert_row(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, GatewayError> {
        let rest = sql.strip_prefix("INSERT INTO ").unwrap_or_default();
        let (table, rest) = rest
            .split_once(" (")
            .ok_or_else(|| GatewayError::new("malformed insert").with_sql(sql))?;
        let table = unquote(table);
        if self.fail_writes_to.as_deref() == Some(table.as_str()) {
            return Err(GatewayError::new("duplicate entry").with_sql(sql));
        }
        let (cols, _) = rest
            .split_once(')')
            .ok_or_else(|| GatewayError::new("malformed insert").with_sql(sql))?;
        let row: Row = cols
            .split(", ")
            .map(unquote)
            .zip(params.iter().cloned())
            .collect();
        let upsert = sql.contains("ON DUPLICATE KEY UPDATE");

        let target = self
            .tables
            .get_mut(&table)
            .ok_or_else(|| GatewayError::new(format!("no table `{table}`")).with_sql(sql))?;
        let keys: Vec<String> = target.columns.primary_keys().map(|c| c.name.clone()).collect();
        if upsert && !keys.is_empty() {
            let same_key = |r: &Row| keys.iter().all(|k| r.get(k) == row.get(k));
            if let Some(slot) = target.rows.iter_mut().find(|r| same_key(r)) {
                *slot = row;
                self.inserts += 1;
                return Ok(2);
            }
        }
        target.rows.push(row);
        self.inserts += 1;
        Ok(1)
    }
}

fn unquote(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| !matches!(c, '`' | '[' | ']'))
        .collect()
}

/// SQL Server 分页改写时附加的行号列。
const ROW_NUMBER_COLUMN: &str = "__row_number";

/// 读取分页片段，返回 `(offset, limit, numbered)`。
///
/// MySQL 为末尾的 `LIMIT n` / `LIMIT off, n`；SQL Server 为首行的 `TOP n`
/// 与外层的 `WHERE [__row_number] > k`，后者的结果带行号列。
fn page_of(sql: &str) -> (usize, usize, bool) {
    if let Some((_, limit)) = sql.rsplit_once("\nLIMIT ") {
        let (offset, count) = limit.split_once(", ").unwrap_or(("0", limit));
        return (
            offset.trim().parse().unwrap(),
            count.trim().parse().unwrap(),
            false,
        );
    }
    let limit = sql
        .strip_prefix("SELECT TOP ")
        .and_then(|rest| rest.split_once(' '))
        .map_or(usize::MAX, |(n, _)| n.parse().unwrap());
    let filter = format!("\nWHERE [{ROW_NUMBER_COLUMN}] > ");
    match sql.split_once(filter.as_str()) {
        Some((_, rest)) => {
            let offset = rest.lines().next().unwrap_or_default();
            (offset.trim().parse().unwrap(), limit, true)
        }
        None => (0, limit, false),
    }
}

fn page(rows: Vec<Row>, sql: &str) -> Vec<Row> {
    let (offset, limit, numbered) = page_of(sql);
    rows.into_iter()
        .enumerate()
        .skip(offset)
        .take(limit)
        .map(|(index, row)| {
            if numbered {
                row.with(ROW_NUMBER_COLUMN, index as i64 + 1)
            } else {
                row
            }
        })
        .collect()
}

struct MemoryCursor {
    rows: std::vec::IntoIter<Row>,
}

impl RowCursor for MemoryCursor {
    fn next_batch(&mut self, max_rows: usize) -> Result<Vec<Row>, GatewayError> {
        Ok(self.rows.by_ref().take(max_rows).collect())
    }
}

impl Gateway for MemoryGateway {
    fn flavor(&self) -> Flavor {
        self.flavor
    }

    fn is_table_exists(&mut self, table: &str) -> Result<bool, GatewayError> {
        Ok(self.tables.contains_key(table))
    }

    fn get_columns(&mut self, table: &str) -> Result<Columns, GatewayError> {
        self.tables
            .get(table)
            .map(|t| t.columns.clone())
            .ok_or_else(|| GatewayError::new(format!("no table `{table}`")))
    }

    fn query(&mut self, sql: &str, _params: &[SqlValue]) -> Result<Vec<Row>, GatewayError> {
        self.queries.push(sql.to_string());
        let rows = self.select_all(sql)?;
        Ok(page(rows, sql))
    }

    fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64, GatewayError> {
        if sql.starts_with("INSERT INTO ") {
            return self.insert_row(sql, params);
        }
        self.log.push(sql.to_string());
        Ok(0)
    }

    fn create_table(
        &mut self,
        table: &str,
        columns: &Columns,
        _if_not_exists: bool,
    ) -> Result<(), GatewayError> {
        self.log.push(format!("create {table}"));
        self.tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable {
                columns: columns.clone(),
                rows: Vec::new(),
            });
        Ok(())
    }

    fn drop_table(&mut self, table: &str, _if_exists: bool) -> Result<(), GatewayError> {
        self.log.push(format!("drop {table}"));
        self.tables.remove(table);
        Ok(())
    }

    fn truncate_table(&mut self, table: &str) -> Result<(), GatewayError> {
        self.log.push(format!("truncate {table}"));
        match self.tables.get_mut(table) {
            Some(t) => {
                t.rows.clear();
                Ok(())
            }
            None => Err(GatewayError::new(format!("no table `{table}`"))),
        }
    }

    fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    fn open_cursor<'a>(
        &'a mut self,
        sql: &str,
        _params: &[SqlValue],
    ) -> Result<Box<dyn RowCursor + 'a>, GatewayError> {
        self.queries.push(sql.to_string());
        let rows = page(self.select_all(sql)?, sql);
        Ok(Box::new(MemoryCursor {
            rows: rows.into_iter(),
        }))
    }
}
