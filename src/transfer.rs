//! 表复制引擎：把源表（或任意源查询）逐表复制到目标库。
//!
//! 每张表依次经过 `resolve source → reconcile destination → stream copy → done`，
//! 任何阶段出错都会中止整个 `copy` 调用；之前已完成的表不会回滚。

use crate::condition::is_verbatim;
use crate::config::TransferConfig;
use crate::error::{ConfigError, Error, Result, RowWriteError, SchemaError};
use crate::gateway::{FetchMode, Gateway, Row};
use crate::insert::{insert, insert_on_duplicate_update};
use crate::modifiers::Builder;
use crate::rules::{ColumnPlan, FieldHandler, FieldRule, TypeRule};
use crate::schema::{ColumnDescriptor, Columns};
use crate::select::{FieldRef, SelectBuilder, SelectItem, SelectSource, TableRef};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

const EXISTS_ACTIONS: &str = "rewrite, rewriteOrClear, skip, stop, append";

/// 目标表已存在时的处理方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ExistsAction {
    /// 删除后重建。
    #[default]
    Rewrite,
    /// 结构一致时清空，否则删除后重建。
    RewriteOrClear,
    /// 跳过这张表。
    Skip,
    /// 中止整个复制。
    Stop,
    /// 不动表结构，直接追加。
    Append,
}

impl ExistsAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rewrite => "rewrite",
            Self::RewriteOrClear => "rewriteOrClear",
            Self::Skip => "skip",
            Self::Stop => "stop",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for ExistsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExistsAction {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rewrite" => Ok(Self::Rewrite),
            "rewriteorclear" | "truncate" => Ok(Self::RewriteOrClear),
            "skip" => Ok(Self::Skip),
            "stop" => Ok(Self::Stop),
            "append" => Ok(Self::Append),
            _ => Err(ConfigError::InvalidAction {
                name: s.to_string(),
                expected: EXISTS_ACTIONS,
            }),
        }
    }
}

impl TryFrom<String> for ExistsAction {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ExistsAction> for String {
    fn from(value: ExistsAction) -> Self {
        value.as_str().to_string()
    }
}

/// 每张表的处理阶段，用于日志。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    ResolveSource,
    ReconcileDestination,
    StreamCopy,
    Done,
    Failed,
}

impl fmt::Display for CopyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ResolveSource => "resolve source",
            Self::ReconcileDestination => "reconcile destination",
            Self::StreamCopy => "stream copy",
            Self::Done => "done",
            Self::Failed => "failed",
        })
    }
}

/// 数据来源。
#[derive(Debug, Clone)]
pub enum SourceSpec {
    Table(String),
    /// 任意查询；`columns` 为空时从查询涉及的表推导。
    Query {
        query: SelectBuilder,
        columns: Option<Columns>,
    },
}

/// 一张表的复制请求。
#[derive(Clone)]
pub struct TableSpec {
    pub source: SourceSpec,
    pub destination: String,
    pub fields: Option<FieldRule>,
    pub types: Option<TypeRule>,
    pub handler: Option<FieldHandler>,
}

impl TableSpec {
    /// 源表与目标表同名。
    pub fn table(name: &str) -> Self {
        Self::rename(name, name)
    }

    pub fn rename(source: &str, destination: &str) -> Self {
        Self::new(SourceSpec::Table(source.to_string()), destination)
    }

    pub fn query(query: SelectBuilder, destination: &str) -> Self {
        Self::new(
            SourceSpec::Query {
                query,
                columns: None,
            },
            destination,
        )
    }

    fn new(source: SourceSpec, destination: &str) -> Self {
        Self {
            source,
            destination: destination.to_string(),
            fields: None,
            types: None,
            handler: None,
        }
    }

    pub fn with_fields(mut self, fields: FieldRule) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_types(mut self, types: TypeRule) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, Option<&str>, SqlValue) -> SqlValue + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// 为查询来源指定列结构；对表来源无效。
    pub fn with_columns(mut self, columns: Columns) -> Self {
        if let SourceSpec::Query { columns: slot, .. } = &mut self.source {
            *slot = Some(columns);
        }
        self
    }

    /// 日志与错误里用来指代源的名字。
    pub fn source_name(&self) -> &str {
        match &self.source {
            SourceSpec::Table(name) => name,
            SourceSpec::Query { .. } => "<query>",
        }
    }
}

impl fmt::Debug for TableSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableSpec")
            .field("source", &self.source)
            .field("destination", &self.destination)
            .field("fields", &self.fields)
            .field("types", &self.types)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .finish()
    }
}

impl From<&str> for TableSpec {
    fn from(name: &str) -> Self {
        Self::table(name)
    }
}

/// `(source, destination)`
impl From<(&str, &str)> for TableSpec {
    fn from((source, destination): (&str, &str)) -> Self {
        Self::rename(source, destination)
    }
}

/// 没有单独设置规则的表使用的默认规则。
#[derive(Clone, Default)]
pub struct CopyOptions {
    pub fields: Option<FieldRule>,
    pub types: Option<TypeRule>,
    pub handler: Option<FieldHandler>,
}

impl CopyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, fields: FieldRule) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_types(mut self, types: TypeRule) -> Self {
        self.types = Some(types);
        self
    }

    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, Option<&str>, SqlValue) -> SqlValue + Send + Sync + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }
}

impl fmt::Debug for CopyOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CopyOptions")
            .field("fields", &self.fields)
            .field("types", &self.types)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableOutcome {
    Copied { rows: u64 },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReport {
    pub source: String,
    pub destination: String,
    pub outcome: TableOutcome,
}

/// `copy` 的结果，按请求顺序排列。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopySummary {
    pub tables: Vec<TableReport>,
}

impl CopySummary {
    pub fn get(&self, destination: &str) -> Option<TableOutcome> {
        self.tables
            .iter()
            .find(|t| t.destination == destination)
            .map(|t| t.outcome)
    }

    pub fn total_rows(&self) -> u64 {
        self.tables
            .iter()
            .map(|t| match t.outcome {
                TableOutcome::Copied { rows } => rows,
                TableOutcome::Skipped => 0,
            })
            .sum()
    }
}

/// 复制引擎，独占源端与目标端网关。
#[derive(Debug)]
pub struct Transfer<S, D> {
    source: S,
    destination: D,
    config: TransferConfig,
}

impl<S: Gateway, D: Gateway> Transfer<S, D> {
    pub fn new(source: S, destination: D) -> Self {
        Self {
            source,
            destination,
            config: TransferConfig::default(),
        }
    }

    pub fn with_config(source: S, destination: D, config: TransferConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            source,
            destination,
            config,
        })
    }

    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    pub fn exists_action(&self) -> ExistsAction {
        self.config.exists_action
    }

    /// 按名字设置目标表已存在时的处理方式，名字忽略大小写。
    pub fn set_exists_action(&mut self, name: &str) -> Result<&mut Self, ConfigError> {
        self.config.exists_action = name.parse()?;
        Ok(self)
    }

    pub fn set_batch_size(&mut self, batch_size: usize) -> Result<&mut Self, ConfigError> {
        if batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        self.config.batch_size = batch_size;
        Ok(self)
    }

    pub fn destination_mut(&mut self) -> &mut D {
        &mut self.destination
    }

    pub fn into_parts(self) -> (S, D) {
        (self.source, self.destination)
    }

    /// 按顺序复制每张表。
    pub fn copy<I>(&mut self, specs: I, options: &CopyOptions) -> Result<CopySummary>
    where
        I: IntoIterator,
        I::Item: Into<TableSpec>,
    {
        if let Some(level) = self.config.isolation_level {
            debug!("Setting isolation level: {}", level);
            self.source
                .set_isolation_level(level)
                .map_err(Error::gateway("<source session>"))?;
            self.destination
                .set_isolation_level(level)
                .map_err(Error::gateway("<destination session>"))?;
        }

        let mut summary = CopySummary::default();
        for spec in specs {
            let spec = spec.into();
            let outcome = match self.copy_table(&spec, options) {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("{}: {} ({})", spec.destination, CopyState::Failed, e);
                    return Err(e);
                }
            };
            debug!("{}: {}", spec.destination, CopyState::Done);
            summary.tables.push(TableReport {
                source: spec.source_name().to_string(),
                destination: spec.destination.clone(),
                outcome,
            });
        }
        info!(
            "Copied {} table(s), {} row(s) total",
            summary.tables.len(),
            summary.total_rows()
        );
        Ok(summary)
    }

    fn copy_table(&mut self, spec: &TableSpec, options: &CopyOptions) -> Result<TableOutcome> {
        let destination = spec.destination.as_str();

        debug!("{}: {}", destination, CopyState::ResolveSource);
        let (select, source_columns) = self.resolve_source(spec)?;
        let default_fields = FieldRule::default();
        let default_types = TypeRule::default();
        let fields = spec
            .fields
            .as_ref()
            .or(options.fields.as_ref())
            .unwrap_or(&default_fields);
        let types = spec
            .types
            .as_ref()
            .or(options.types.as_ref())
            .unwrap_or(&default_types);
        let plan = ColumnPlan::resolve(&source_columns, fields, types)?;
        if plan.columns.is_empty() {
            return Err(SchemaError::NoColumns {
                table: destination.to_string(),
            }
            .into());
        }

        debug!("{}: {}", destination, CopyState::ReconcileDestination);
        if !self.reconcile_destination(spec.source_name(), destination, &plan.columns)? {
            return Ok(TableOutcome::Skipped);
        }

        debug!("{}: {}", destination, CopyState::StreamCopy);
        let handler = spec.handler.as_ref().or(options.handler.as_ref());
        let rows = self.stream_copy(destination, select, &source_columns, &plan, handler)?;
        info!("{}: completed ({} rows)", destination, rows);
        Ok(TableOutcome::Copied { rows })
    }

    /// 确定源查询与源列结构；表来源按主键排序。
    fn resolve_source(&mut self, spec: &TableSpec) -> Result<(SelectBuilder, Columns)> {
        match &spec.source {
            SourceSpec::Table(table) => {
                let exists = self
                    .source
                    .is_table_exists(table)
                    .map_err(Error::gateway(table))?;
                if !exists {
                    return Err(SchemaError::SourceTableMissing {
                        table: table.clone(),
                    }
                    .into());
                }
                let columns = self.source.get_columns(table).map_err(Error::gateway(table))?;
                let mut select = SelectBuilder::with_flavor(self.source.flavor());
                select
                    .from(TableRef::name(table))
                    .order(columns.primary_keys().map(|c| c.name.clone()));
                Ok((select, columns))
            }
            SourceSpec::Query { query, columns } => {
                let mut select = query.clone();
                select.set_flavor(self.source.flavor());
                let columns = match columns {
                    Some(columns) => columns.clone(),
                    None => self.derive_columns(&mut select)?,
                };
                Ok((select, columns))
            }
        }
    }

    /// 由查询涉及的表推导结果列结构。`SELECT *` 会被改写成显式列清单，
    /// 后出现的重名列改名为 `{alias}_{name}` 并去掉主键标记。
    fn derive_columns(&mut self, select: &mut SelectBuilder) -> Result<Columns> {
        let refs: Vec<&TableRef> = select
            .from_tables()
            .iter()
            .chain(select.joins().iter().map(|j| &j.table))
            .collect();
        let mut sources: Vec<(String, Option<Columns>)> = Vec::with_capacity(refs.len());
        for table in refs {
            let key = table.key().unwrap_or_default().to_string();
            let columns = match table.table_name() {
                Some(name) => Some(self.source.get_columns(name).map_err(Error::gateway(name))?),
                None => None,
            };
            sources.push((key, columns));
        }

        let mut derived = Columns::new();
        if select.items().is_empty() {
            let mut items = Vec::with_capacity(sources.len());
            for (key, columns) in &sources {
                let columns = source_columns(key, columns.as_ref(), "*")?;
                let fields = expand_all(&mut derived, key, columns)?;
                items.push(SelectItem::fields(key.clone(), fields));
            }
            select.select(items);
            return Ok(derived);
        }

        for item in select.items() {
            match &item.source {
                SelectSource::Column(column) => {
                    let (alias, field) = match column.rsplit_once('.') {
                        Some((alias, field)) => (Some(alias), field),
                        None => (None, column.as_str()),
                    };
                    if field == "*" && item.alias.is_none() {
                        for (key, columns) in &sources {
                            if alias.is_some_and(|a| a != key.as_str()) {
                                continue;
                            }
                            let columns = source_columns(key, columns.as_ref(), column)?;
                            for c in columns {
                                add_derived(&mut derived, c.clone())?;
                            }
                        }
                        continue;
                    }
                    if is_verbatim(column) {
                        return Err(computed_column(item).into());
                    }
                    let found = find_column(&sources, alias, field).ok_or_else(|| {
                        SchemaError::UnresolvableColumn {
                            column: column.clone(),
                            reason: "no source table has this column",
                        }
                    })?;
                    let name = item.alias.as_deref().unwrap_or(field);
                    add_derived(&mut derived, found.clone().renamed(name))?;
                }
                SelectSource::Fields { table, fields } => {
                    for f in fields {
                        let found = find_column(&sources, Some(table.as_str()), &f.field)
                            .ok_or_else(|| SchemaError::UnresolvableColumn {
                                column: format!("{table}.{}", f.field),
                                reason: "no source table has this column",
                            })?;
                        add_derived(&mut derived, found.clone().renamed(f.output_name()))?;
                    }
                }
                SelectSource::Query(_) | SelectSource::Raw(_) => {
                    return Err(computed_column(item).into());
                }
            }
        }
        Ok(derived)
    }

    /// 按 `exists_action` 准备目标表；返回 `false` 表示跳过这张表。
    fn reconcile_destination(
        &mut self,
        source: &str,
        destination: &str,
        columns: &Columns,
    ) -> Result<bool> {
        let gateway = &mut self.destination;
        let exists = gateway
            .is_table_exists(destination)
            .map_err(Error::gateway(destination))?;
        if !exists {
            debug!("Creating table: {}", destination);
            gateway
                .create_table(destination, columns, true)
                .map_err(Error::gateway(destination))?;
            return Ok(true);
        }

        match self.config.exists_action {
            ExistsAction::Rewrite => {
                recreate(gateway, destination, columns)?;
            }
            ExistsAction::RewriteOrClear => {
                let current = gateway
                    .get_columns(destination)
                    .map_err(Error::gateway(destination))?;
                if current.structurally_eq(columns) {
                    debug!("Truncating table: {}", destination);
                    gateway
                        .truncate_table(destination)
                        .map_err(Error::gateway(destination))?;
                } else {
                    recreate(gateway, destination, columns)?;
                }
            }
            ExistsAction::Skip => {
                info!("Table `{}` skipped because `{}` exists", source, destination);
                return Ok(false);
            }
            ExistsAction::Stop => {
                return Err(Error::Stopped {
                    source_table: source.to_string(),
                    destination: destination.to_string(),
                });
            }
            ExistsAction::Append => {
                let current = gateway
                    .get_columns(destination)
                    .map_err(Error::gateway(destination))?;
                if !current.structurally_eq(columns) {
                    warn!(
                        "Appending into `{}` although its structure differs from the source",
                        destination
                    );
                }
            }
        }
        Ok(true)
    }

    /// 分页（或游标）读取源数据，逐行写入目标表，返回写入行数。
    fn stream_copy(
        &mut self,
        destination: &str,
        mut select: SelectBuilder,
        source_columns: &Columns,
        plan: &ColumnPlan,
        handler: Option<&FieldHandler>,
    ) -> Result<u64> {
        let Self {
            source,
            destination: target,
            config,
        } = self;
        let batch_size = config.batch_size;
        let upsert = target.supports_upsert();
        let mut written = 0u64;

        match source.fetch_mode() {
            FetchMode::Paginated => {
                let mut offset = 0u64;
                loop {
                    select.limit(batch_size as u64);
                    if offset > 0 {
                        select.offset(offset);
                    } else {
                        select.clear_offset();
                    }
                    let (sql, params) = select.build();
                    let rows = source
                        .query(&sql, &params)
                        .map_err(Error::gateway(destination))?;
                    if rows.is_empty() {
                        break;
                    }
                    debug!(
                        "{}: fetched {} row(s) at offset {}",
                        destination,
                        rows.len(),
                        offset
                    );
                    for row in rows {
                        let row = plan.apply_row(row, source_columns, handler);
                        write_row(target, destination, row, upsert)?;
                        written += 1;
                    }
                    offset += batch_size as u64;
                }
            }
            FetchMode::Cursor => {
                let (sql, params) = select.build();
                let mut cursor = source
                    .open_cursor(&sql, &params)
                    .map_err(Error::gateway(destination))?;
                loop {
                    let rows = cursor
                        .next_batch(batch_size)
                        .map_err(Error::gateway(destination))?;
                    if rows.is_empty() {
                        break;
                    }
                    for row in rows {
                        let row = plan.apply_row(row, source_columns, handler);
                        write_row(target, destination, row, upsert)?;
                        written += 1;
                    }
                }
            }
        }
        Ok(written)
    }
}

fn recreate<D: Gateway>(gateway: &mut D, table: &str, columns: &Columns) -> Result<()> {
    debug!("Dropping table: {}", table);
    gateway.drop_table(table, true).map_err(Error::gateway(table))?;
    debug!("Creating table: {}", table);
    gateway
        .create_table(table, columns, true)
        .map_err(Error::gateway(table))?;
    Ok(())
}

fn write_row<D: Gateway>(gateway: &mut D, table: &str, row: Row, upsert: bool) -> Result<()> {
    let mut ib = if upsert {
        insert_on_duplicate_update(table, row)
    } else {
        insert(table, row)
    };
    ib.set_flavor(gateway.flavor());
    let (sql, params) = ib.try_build()?;
    gateway
        .execute(&sql, &params)
        .map_err(|source| RowWriteError {
            table: table.to_string(),
            sql,
            source,
        })?;
    Ok(())
}

fn source_columns<'a>(
    key: &str,
    columns: Option<&'a Columns>,
    column: &str,
) -> Result<&'a Columns, SchemaError> {
    columns.ok_or_else(|| SchemaError::UnresolvableColumn {
        column: if key.is_empty() {
            column.to_string()
        } else {
            format!("{key}.{column}")
        },
        reason: "source is not a plain table",
    })
}

fn computed_column(item: &SelectItem) -> SchemaError {
    SchemaError::UnresolvableColumn {
        column: item.keys().join(", "),
        reason: "computed columns need explicit column descriptors",
    }
}

fn find_column<'a>(
    sources: &'a [(String, Option<Columns>)],
    alias: Option<&str>,
    field: &str,
) -> Option<&'a ColumnDescriptor> {
    sources
        .iter()
        .filter(|(key, _)| alias.is_none_or(|a| a == key.as_str()))
        .find_map(|(_, columns)| columns.as_ref()?.get(field))
}

fn add_derived(derived: &mut Columns, column: ColumnDescriptor) -> Result<(), SchemaError> {
    if derived.contains(&column.name) {
        return Err(SchemaError::DuplicateColumn {
            column: column.name,
        });
    }
    derived.insert(column);
    Ok(())
}

/// 展开一张表的全部列；与已有列重名的改名为 `{key}_{name}`。
fn expand_all(
    derived: &mut Columns,
    key: &str,
    columns: &Columns,
) -> Result<Vec<FieldRef>, SchemaError> {
    let mut fields = Vec::with_capacity(columns.len());
    for c in columns {
        if derived.contains(&c.name) {
            let alias = format!("{key}_{}", c.name);
            let mut renamed = c.clone().renamed(alias.clone());
            renamed.primary = false;
            add_derived(derived, renamed)?;
            fields.push(FieldRef {
                alias: Some(alias),
                field: c.name.clone(),
            });
        } else {
            add_derived(derived, c.clone())?;
            fields.push(FieldRef::from(c.name.as_str()));
        }
    }
    Ok(fields)
}
