//! SelectBuilder：构建 SELECT 语句，并按方言渲染分页。
//!
//! 渲染时每个子句单独一行，行首按层级缩进；子查询比外层多缩进一级。
//! SQL Server 没有 `LIMIT`：只有 limit 时写成 `TOP n`，带 offset 时改写为
//! `ROW_NUMBER()` 窗口子查询，外层按行号过滤；窗口排序里的 SELECT 别名换回原表达式。

use crate::args::{Args, indent};
use crate::condition::{Condition, IntoCondition, Node, render_scalar};
use crate::dialect::Pagination;
use crate::error::BuildError;
use crate::expr::Expr;
use crate::flavor::Flavor;
use crate::modifiers::Builder;
use crate::string_builder::{StringBuilder, join_non_empty};
use std::collections::HashSet;

/// MySQL 只有 offset 没有 limit 时使用的行数上限。
const MYSQL_MAX_ROWS: u64 = u64::MAX;
const ROW_NUMBER_COLUMN: &str = "__row_number";
const PAGED_ALIAS: &str = "__paged";

/// JOIN 的类型；默认 LEFT。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    Inner,
    #[default]
    Left,
    Right,
    Cross,
}

impl JoinKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "INNER",
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Cross => "CROSS",
        }
    }
}

/// FROM / JOIN 的数据来源。
#[derive(Debug, Clone)]
pub enum TableSource {
    Name(String),
    Raw(Expr),
    Query(Box<SelectBuilder>),
}

/// 带可选别名的数据来源。
#[derive(Debug, Clone)]
pub struct TableRef {
    pub source: TableSource,
    pub alias: Option<String>,
}

impl TableRef {
    /// 表名；`"news n"` 与 `"news AS n"` 会拆出别名。
    pub fn name(name: &str) -> Self {
        let name = name.trim();
        match name.split_once(char::is_whitespace) {
            Some((table, rest)) => {
                let rest = rest.trim();
                let alias = match rest.split_once(char::is_whitespace) {
                    Some((kw, alias)) if kw.eq_ignore_ascii_case("as") => alias.trim(),
                    _ => rest,
                };
                Self::aliased(TableSource::Name(table.to_string()), alias)
            }
            None => Self {
                source: TableSource::Name(name.to_string()),
                alias: None,
            },
        }
    }

    pub fn aliased(source: TableSource, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        Self {
            source,
            alias: (!alias.is_empty()).then_some(alias),
        }
    }

    /// 来源是普通表时返回表名。
    pub fn table_name(&self) -> Option<&str> {
        match &self.source {
            TableSource::Name(n) => Some(n),
            _ => None,
        }
    }

    /// 语句里引用这个来源时用的名字：别名优先，其次表名。
    pub fn key(&self) -> Option<&str> {
        self.alias.as_deref().or(self.table_name())
    }

    fn render(&self, args: &mut Args, level: usize) -> String {
        let mut out = match &self.source {
            TableSource::Name(n) => args.quote(n),
            TableSource::Raw(e) => format!("({})", e.render(args)),
            TableSource::Query(q) => {
                format!("(\n{}\n{})", q.render(args, level + 1), indent(level))
            }
        };
        if let Some(alias) = &self.alias {
            if self.table_name() != Some(alias.as_str()) {
                out.push_str(" AS ");
                out.push_str(&args.quote(alias));
            }
        }
        out
    }
}

impl From<&str> for TableRef {
    fn from(v: &str) -> Self {
        Self::name(v)
    }
}

impl From<String> for TableRef {
    fn from(v: String) -> Self {
        Self::name(&v)
    }
}

impl From<(&str, &str)> for TableRef {
    fn from((table, alias): (&str, &str)) -> Self {
        Self::aliased(TableSource::Name(table.to_string()), alias)
    }
}

impl From<(Expr, &str)> for TableRef {
    fn from((expr, alias): (Expr, &str)) -> Self {
        Self::aliased(TableSource::Raw(expr), alias)
    }
}

impl From<(SelectBuilder, &str)> for TableRef {
    fn from((query, alias): (SelectBuilder, &str)) -> Self {
        Self::aliased(TableSource::Query(Box::new(query)), alias)
    }
}

/// 来源表里的一个字段，可带输出别名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRef {
    pub alias: Option<String>,
    pub field: String,
}

impl From<&str> for FieldRef {
    fn from(v: &str) -> Self {
        Self {
            alias: None,
            field: v.to_string(),
        }
    }
}

/// `(alias, field)`
impl From<(&str, &str)> for FieldRef {
    fn from((alias, field): (&str, &str)) -> Self {
        Self {
            alias: Some(alias.to_string()),
            field: field.to_string(),
        }
    }
}

impl FieldRef {
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.field)
    }
}

#[derive(Debug, Clone)]
pub enum SelectSource {
    /// 列名，或 `COUNT(*)` 之类的原样文本（判断规则同条件树的字符串标量）。
    Column(String),
    /// `{table: [field, ...]}`：逐个渲染为 `table.field [AS alias]`。
    Fields { table: String, fields: Vec<FieldRef> },
    Query(Box<SelectBuilder>),
    Raw(Expr),
}

/// SELECT 列表中的一项。
#[derive(Debug, Clone)]
pub struct SelectItem {
    pub alias: Option<String>,
    pub source: SelectSource,
}

impl SelectItem {
    pub fn column(column: impl Into<String>) -> Self {
        Self {
            alias: None,
            source: SelectSource::Column(column.into()),
        }
    }

    pub fn fields<I>(table: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<FieldRef>,
    {
        Self {
            alias: None,
            source: SelectSource::Fields {
                table: table.into(),
                fields: fields.into_iter().map(Into::into).collect(),
            },
        }
    }

    pub fn query(alias: impl Into<String>, query: SelectBuilder) -> Self {
        Self {
            alias: Some(alias.into()),
            source: SelectSource::Query(Box::new(query)),
        }
    }

    pub fn raw(expr: Expr) -> Self {
        Self {
            alias: None,
            source: SelectSource::Raw(expr),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// 该项在结果集中占用的列名，用于 `add_select` 的冲突检查。
    pub fn keys(&self) -> Vec<String> {
        if let SelectSource::Fields { fields, .. } = &self.source {
            return fields.iter().map(|f| f.output_name().to_string()).collect();
        }
        if let Some(alias) = &self.alias {
            return vec![alias.clone()];
        }
        match &self.source {
            SelectSource::Column(c) => vec![c.clone()],
            SelectSource::Raw(e) => vec![e.to_string()],
            _ => Vec::new(),
        }
    }

    fn render(&self, args: &mut Args, level: usize) -> String {
        let body = match &self.source {
            SelectSource::Fields { table, fields } => {
                let parts: Vec<String> = fields
                    .iter()
                    .map(|f| {
                        let mut s = args.quote(&format!("{table}.{}", f.field));
                        if let Some(alias) = &f.alias {
                            s.push_str(" AS ");
                            s.push_str(&args.quote(alias));
                        }
                        s
                    })
                    .collect();
                return parts.join(", ");
            }
            _ => self.render_expr(args, level).unwrap_or_default(),
        };
        match &self.alias {
            Some(alias) => format!("{body} AS {}", args.quote(alias)),
            None => body,
        }
    }

    /// 不带别名的表达式；`Fields` 项没有单一的表达式。
    fn render_expr(&self, args: &mut Args, level: usize) -> Option<String> {
        match &self.source {
            SelectSource::Column(c) => Some(render_scalar(c, args)),
            SelectSource::Fields { .. } => None,
            SelectSource::Query(q) => Some(format!(
                "(\n{}\n{})",
                q.render(args, level + 1),
                indent(level)
            )),
            SelectSource::Raw(e) => Some(e.render(args)),
        }
    }
}

impl From<&str> for SelectItem {
    fn from(v: &str) -> Self {
        Self::column(v)
    }
}

impl From<String> for SelectItem {
    fn from(v: String) -> Self {
        Self::column(v)
    }
}

/// `(alias, column)`
impl From<(&str, &str)> for SelectItem {
    fn from((alias, column): (&str, &str)) -> Self {
        Self::column(column).alias(alias)
    }
}

impl From<Expr> for SelectItem {
    fn from(v: Expr) -> Self {
        Self::raw(v)
    }
}

impl From<(&str, Expr)> for SelectItem {
    fn from((alias, expr): (&str, Expr)) -> Self {
        Self::raw(expr).alias(alias)
    }
}

impl From<(&str, SelectBuilder)> for SelectItem {
    fn from((alias, query): (&str, SelectBuilder)) -> Self {
        Self::query(alias, query)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// GROUP BY / ORDER BY 的一项。
#[derive(Debug, Clone)]
pub struct Term {
    pub expr: TermExpr,
    pub direction: Option<Direction>,
}

#[derive(Debug, Clone)]
pub enum TermExpr {
    Column(String),
    Raw(Expr),
}

impl Term {
    /// 解析 `"col"`、`"col DESC"`、`"col asc"`。
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some((col, dir)) = text.rsplit_once(char::is_whitespace) {
            let direction = if dir.eq_ignore_ascii_case("asc") {
                Some(Direction::Asc)
            } else if dir.eq_ignore_ascii_case("desc") {
                Some(Direction::Desc)
            } else {
                None
            };
            if direction.is_some() {
                return Self {
                    expr: TermExpr::Column(col.trim_end().to_string()),
                    direction,
                };
            }
        }
        Self {
            expr: TermExpr::Column(text.to_string()),
            direction: None,
        }
    }

    pub fn asc(mut self) -> Self {
        self.direction = Some(Direction::Asc);
        self
    }

    pub fn desc(mut self) -> Self {
        self.direction = Some(Direction::Desc);
        self
    }

    fn key(&self) -> String {
        match &self.expr {
            TermExpr::Column(c) => c.to_ascii_lowercase(),
            TermExpr::Raw(e) => e.to_string(),
        }
    }

    fn render(&self, args: &mut Args) -> String {
        let out = match &self.expr {
            TermExpr::Column(c) => render_scalar(c, args),
            TermExpr::Raw(e) => e.render(args),
        };
        self.with_direction(out)
    }

    fn with_direction(&self, mut expr: String) -> String {
        match self.direction {
            Some(Direction::Asc) => expr.push_str(" ASC"),
            Some(Direction::Desc) => expr.push_str(" DESC"),
            None => {}
        }
        expr
    }
}

impl From<&str> for Term {
    fn from(v: &str) -> Self {
        Self::parse(v)
    }
}

impl From<String> for Term {
    fn from(v: String) -> Self {
        Self::parse(&v)
    }
}

impl From<Expr> for Term {
    fn from(v: Expr) -> Self {
        Self {
            expr: TermExpr::Raw(v),
            direction: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Join {
    pub kind: JoinKind,
    pub table: TableRef,
    pub on: Option<Condition>,
}

#[derive(Debug, Clone, Default)]
pub struct SelectBuilder {
    flavor: Flavor,
    distinct: bool,
    items: Vec<SelectItem>,
    from: Vec<TableRef>,
    joins: Vec<Join>,
    where_cond: Option<Condition>,
    group: Vec<Term>,
    having: Option<Condition>,
    order: Vec<Term>,
    limit: Option<u64>,
    offset: Option<u64>,
}

/// 渲染时对语句主体的调整（分页改写用）。
#[derive(Debug, Clone, Copy, Default)]
struct RenderOptions<'a> {
    top: Option<u64>,
    extra_column: Option<&'a str>,
    without_order: bool,
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flavor(flavor: Flavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    pub fn set_flavor(&mut self, flavor: Flavor) -> Flavor {
        std::mem::replace(&mut self.flavor, flavor)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    /// 替换 SELECT 列表；空列表表示 `SELECT *`。
    pub fn select<I>(&mut self, items: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<SelectItem>,
    {
        self.items = items.into_iter().map(Into::into).collect();
        self
    }

    /// 追加 SELECT 项；与已有列名冲突时报错且不修改状态。
    pub fn add_select<I>(&mut self, items: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<SelectItem>,
    {
        let items: Vec<SelectItem> = items.into_iter().map(Into::into).collect();
        let mut seen: HashSet<String> = self
            .items
            .iter()
            .flat_map(SelectItem::keys)
            .map(|k| k.to_ascii_lowercase())
            .collect();
        for key in items.iter().flat_map(SelectItem::keys) {
            if !seen.insert(key.to_ascii_lowercase()) {
                return Err(BuildError::FieldConflict {
                    clause: "select",
                    key,
                });
            }
        }
        self.items.extend(items);
        Ok(self)
    }

    pub fn distinct(&mut self) -> &mut Self {
        self.distinct = true;
        self
    }

    /// 替换 FROM 为单个来源。
    pub fn from(&mut self, table: impl Into<TableRef>) -> &mut Self {
        self.from = vec![table.into()];
        self
    }

    /// 追加 FROM 来源（隐式交叉连接）；同名来源已存在时报错。
    pub fn add_from(&mut self, table: impl Into<TableRef>) -> Result<&mut Self, BuildError> {
        let table = table.into();
        if let Some(key) = table.key() {
            let conflict = self
                .from
                .iter()
                .filter_map(TableRef::key)
                .any(|k| k.eq_ignore_ascii_case(key));
            if conflict {
                return Err(BuildError::FieldConflict {
                    clause: "from",
                    key: key.to_string(),
                });
            }
        }
        self.from.push(table);
        Ok(self)
    }

    pub fn join(
        &mut self,
        kind: JoinKind,
        table: impl Into<TableRef>,
        on: impl IntoCondition,
    ) -> Result<&mut Self, BuildError> {
        let on = on.into_condition()?;
        self.joins.push(Join {
            kind,
            table: table.into(),
            on: Some(on),
        });
        Ok(self)
    }

    pub fn inner_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl IntoCondition,
    ) -> Result<&mut Self, BuildError> {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl IntoCondition,
    ) -> Result<&mut Self, BuildError> {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(
        &mut self,
        table: impl Into<TableRef>,
        on: impl IntoCondition,
    ) -> Result<&mut Self, BuildError> {
        self.join(JoinKind::Right, table, on)
    }

    pub fn cross_join(&mut self, table: impl Into<TableRef>) -> &mut Self {
        self.joins.push(Join {
            kind: JoinKind::Cross,
            table: table.into(),
            on: None,
        });
        self
    }

    pub fn where_(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        self.where_cond = Some(cond.into_condition()?);
        Ok(self)
    }

    /// 已有条件存在时组合为 `(old AND new)`。
    pub fn and_where(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        let cond = cond.into_condition()?;
        let combined = combine(self.where_cond.take(), cond, |items| Condition::and(items));
        self.where_cond = Some(combined);
        Ok(self)
    }

    /// 已有条件存在时组合为 `(old OR new)`。
    pub fn or_where(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        let cond = cond.into_condition()?;
        let combined = combine(self.where_cond.take(), cond, |items| Condition::or(items));
        self.where_cond = Some(combined);
        Ok(self)
    }

    pub fn group<I>(&mut self, terms: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        self.group = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_group<I>(&mut self, terms: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let terms = merge_terms(&self.group, terms, "group by")?;
        self.group.extend(terms);
        Ok(self)
    }

    pub fn having(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        self.having = Some(cond.into_condition()?);
        Ok(self)
    }

    pub fn add_having(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        let cond = cond.into_condition()?;
        let combined = combine(self.having.take(), cond, |items| Condition::and(items));
        self.having = Some(combined);
        Ok(self)
    }

    pub fn order<I>(&mut self, terms: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        self.order = terms.into_iter().map(Into::into).collect();
        self
    }

    pub fn add_order<I>(&mut self, terms: I) -> Result<&mut Self, BuildError>
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        let terms = merge_terms(&self.order, terms, "order by")?;
        self.order.extend(terms);
        Ok(self)
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    /// 去掉 offset，回到从第一行开始读取。
    pub fn clear_offset(&mut self) -> &mut Self {
        self.offset = None;
        self
    }

    pub fn items(&self) -> &[SelectItem] {
        &self.items
    }

    pub fn from_tables(&self) -> &[TableRef] {
        &self.from
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    pub fn order_terms(&self) -> &[Term] {
        &self.order
    }

    pub fn where_condition(&self) -> Option<&Condition> {
        self.where_cond.as_ref()
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }

    /// 以自身 Flavor 渲染，`level` 为缩进层级。
    pub fn to_sql(&self, level: usize) -> (String, Vec<crate::SqlValue>) {
        let mut args = Args::new(self.flavor);
        let sql = self.render(&mut args, level);
        (sql, args.into_values())
    }

    fn render_body(&self, args: &mut Args, level: usize, opts: RenderOptions<'_>) -> StringBuilder {
        let mut buf = StringBuilder::new();

        let mut head = String::from("SELECT ");
        if self.distinct {
            head.push_str("DISTINCT ");
        }
        if let Some(top) = opts.top {
            head.push_str(&format!("TOP {top} "));
        }
        let mut cols: Vec<String> = self
            .items
            .iter()
            .map(|item| item.render(args, level))
            .collect();
        if cols.is_empty() {
            cols.push("*".to_string());
        }
        if let Some(extra) = opts.extra_column {
            cols.push(extra.to_string());
        }
        head.push_str(&join_non_empty(&cols, ", "));
        buf.write_line(level, &head);

        if !self.from.is_empty() {
            let tables: Vec<String> = self.from.iter().map(|t| t.render(args, level)).collect();
            buf.write_line(level, &format!("FROM {}", tables.join(", ")));
        }

        for join in &self.joins {
            let mut line = format!("{} JOIN {}", join.kind.as_str(), join.table.render(args, level));
            if join.kind != JoinKind::Cross {
                if let Some(on) = join.on.as_ref().filter(|c| !c.is_empty()) {
                    line.push_str(" ON ");
                    line.push_str(&on.render(args, level));
                }
            }
            buf.write_line(level, &line);
        }

        if let Some(cond) = self.where_cond.as_ref().filter(|c| !c.is_empty()) {
            let rendered = cond.render(args, level);
            buf.write_line(level, &format!("WHERE {rendered}"));
        }

        if !self.group.is_empty() {
            let terms = self.render_terms(&self.group, args);
            buf.write_line(level, &format!("GROUP BY {terms}"));
        }

        if let Some(cond) = self.having.as_ref().filter(|c| !c.is_empty()) {
            let rendered = cond.render(args, level);
            buf.write_line(level, &format!("HAVING {rendered}"));
        }

        if !opts.without_order && !self.order.is_empty() {
            let terms = self.render_terms(&self.order, args);
            buf.write_line(level, &format!("ORDER BY {terms}"));
        }

        buf
    }

    fn render_terms(&self, terms: &[Term], args: &mut Args) -> String {
        let parts: Vec<String> = terms.iter().map(|t| t.render(args)).collect();
        parts.join(", ")
    }

    fn render_limit_offset(&self, args: &mut Args, level: usize) -> String {
        let mut buf = self.render_body(args, level, RenderOptions::default());
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                buf.write_line(level, &format!("LIMIT {offset}, {limit}"));
            }
            (Some(limit), None) => buf.write_line(level, &format!("LIMIT {limit}")),
            (None, Some(offset)) => {
                buf.write_line(level, &format!("LIMIT {offset}, {MYSQL_MAX_ROWS}"));
            }
            (None, None) => {}
        }
        buf.into_string()
    }

    fn render_top_row_number(&self, args: &mut Args, level: usize) -> String {
        let Some(offset) = self.offset else {
            let opts = RenderOptions {
                top: self.limit,
                ..RenderOptions::default()
            };
            return self.render_body(args, level, opts).into_string();
        };

        let window_order = self.window_order(args, level + 1);
        let row_number = args.quote(ROW_NUMBER_COLUMN);
        let extra = format!("ROW_NUMBER() OVER (ORDER BY {window_order}) AS {row_number}");
        let inner = self
            .render_body(
                args,
                level + 1,
                RenderOptions {
                    top: None,
                    extra_column: Some(&extra),
                    without_order: true,
                },
            )
            .into_string();

        let mut buf = StringBuilder::new();
        match self.limit {
            Some(limit) => buf.write_line(level, &format!("SELECT TOP {limit} *")),
            None => buf.write_line(level, "SELECT *"),
        }
        buf.write_line(level, "FROM (");
        buf.write_str("\n");
        buf.write_str(&inner);
        buf.write_line(level, &format!(") AS {}", args.quote(PAGED_ALIAS)));
        buf.write_line(level, &format!("WHERE {row_number} > {offset}"));
        buf.write_line(level, &format!("ORDER BY {row_number}"));
        buf.into_string()
    }

    /// 窗口函数的排序：调用方的 ORDER BY，否则取选中的普通列，再否则 `(SELECT NULL)`。
    fn window_order(&self, args: &mut Args, level: usize) -> String {
        if !self.order.is_empty() {
            let parts: Vec<String> = self
                .order
                .iter()
                .map(|term| self.window_term(term, args, level))
                .collect();
            return parts.join(", ");
        }
        let mut columns = Vec::new();
        for item in &self.items {
            match &item.source {
                SelectSource::Column(c) if !c.contains('*') => {
                    columns.push(render_scalar(c, args));
                }
                SelectSource::Fields { table, fields } => {
                    columns.extend(
                        fields
                            .iter()
                            .map(|f| args.quote(&format!("{table}.{}", f.field))),
                    );
                }
                _ => {}
            }
        }
        if columns.is_empty() {
            "(SELECT NULL)".to_string()
        } else {
            columns.join(", ")
        }
    }

    /// 窗口里看不到 SELECT 别名：按别名排序时换成该项的表达式。
    fn window_term(&self, term: &Term, args: &mut Args, level: usize) -> String {
        if let TermExpr::Column(name) = &term.expr {
            let aliased = self
                .items
                .iter()
                .filter(|item| {
                    item.alias
                        .as_deref()
                        .is_some_and(|a| a.eq_ignore_ascii_case(name))
                })
                .find_map(|item| item.render_expr(args, level));
            if let Some(expr) = aliased {
                return term.with_direction(expr);
            }
        }
        term.render(args)
    }
}

fn combine(
    existing: Option<Condition>,
    cond: Condition,
    group: fn(Vec<Condition>) -> Condition,
) -> Condition {
    match existing.filter(|c| !c.is_empty()) {
        Some(old) => group(vec![old, cond]),
        None => group(vec![cond]),
    }
}

fn merge_terms<I>(existing: &[Term], terms: I, clause: &'static str) -> Result<Vec<Term>, BuildError>
where
    I: IntoIterator,
    I::Item: Into<Term>,
{
    let terms: Vec<Term> = terms.into_iter().map(Into::into).collect();
    let mut seen: HashSet<String> = existing.iter().map(Term::key).collect();
    for term in &terms {
        let key = term.key();
        if !seen.insert(key.clone()) {
            return Err(BuildError::FieldConflict { clause, key });
        }
    }
    Ok(terms)
}

impl Builder for SelectBuilder {
    fn render(&self, args: &mut Args, level: usize) -> String {
        match args.dialect().pagination {
            Pagination::LimitOffset => self.render_limit_offset(args, level),
            Pagination::TopRowNumber => self.render_top_row_number(args, level),
        }
    }

    fn flavor(&self) -> Flavor {
        self.flavor
    }
}

impl From<SelectBuilder> for Node {
    fn from(v: SelectBuilder) -> Self {
        Node::Query(Box::new(v))
    }
}

impl From<SelectBuilder> for Condition {
    fn from(v: SelectBuilder) -> Self {
        Condition::SubQuery(Box::new(v))
    }
}
