//! 条件树：WHERE / HAVING / JOIN ON 共用的条件 DSL。
//!
//! 输入侧是弱类型的 [`Node`] 树（通常用 [`tree!`](crate::tree) 宏书写），
//! 交给 builder 时经一次递归解析成强类型的 [`Condition`]；
//! 运算符的元数错误在解析阶段就会报出，渲染阶段不再做类型推断。
//!
//! 数组的解释规则：
//! - 首元素是已知运算符（大小写不敏感）时，按运算符的元数解释其余元素；
//! - 全部是 `"key" => value` 的映射表示隐式 AND 的等值条件；
//! - 顶层的其它数组同样按隐式 AND 处理，非顶层的则是 `IN` 用的值列表。
//!
//! 字符串标量的解释：数字和含 `()+-/*=><:'"?@` 或空白的文本原样输出，其余视为标识符并转义。
//! 需要绑定参数的值用 [`bind`] 或 [`Condition::value`] 显式标出。

use crate::args::{Args, indent};
use crate::error::BuildError;
use crate::expr::Expr;
use crate::modifiers::Builder;
use crate::value::SqlValue;

/// 运算符的元数分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// `x IS NULL`
    Postfix,
    /// `NOT x`、`EXISTS (...)`
    Prefix,
    /// `a = b`
    Binary,
    /// `(a AND b AND ...)`
    Variadic,
}

/// 条件运算符。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    IsNull,
    IsNotNull,
    Not,
    Exists,
    NotExists,
    Is,
    IsNot,
    Eq,
    NotEq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    Like,
    NotLike,
    In,
    NotIn,
    And,
    Or,
}

const OPERATORS: &[(&str, Operator)] = &[
    ("is null", Operator::IsNull),
    ("is not null", Operator::IsNotNull),
    ("not", Operator::Not),
    ("exists", Operator::Exists),
    ("not exists", Operator::NotExists),
    ("is", Operator::Is),
    ("is not", Operator::IsNot),
    ("=", Operator::Eq),
    ("!=", Operator::NotEq),
    ("<>", Operator::Ne),
    (">", Operator::Gt),
    ("<", Operator::Lt),
    (">=", Operator::Ge),
    ("<=", Operator::Le),
    ("like", Operator::Like),
    ("not like", Operator::NotLike),
    ("in", Operator::In),
    ("not in", Operator::NotIn),
    ("and", Operator::And),
    ("or", Operator::Or),
];

impl Operator {
    /// 识别运算符名；大小写与多余空白不敏感。
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_lowercase();
        OPERATORS
            .iter()
            .find(|(n, _)| *n == normalized)
            .map(|(_, op)| *op)
    }

    /// 规范化的小写名称。
    pub fn name(self) -> &'static str {
        OPERATORS
            .iter()
            .find(|(_, op)| *op == self)
            .map_or("", |(n, _)| n)
    }

    pub fn arity(self) -> Arity {
        match self {
            Self::IsNull | Self::IsNotNull => Arity::Postfix,
            Self::Not | Self::Exists | Self::NotExists => Arity::Prefix,
            Self::And | Self::Or => Arity::Variadic,
            _ => Arity::Binary,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::IsNull => "IS NULL",
            Self::IsNotNull => "IS NOT NULL",
            Self::Not => "NOT",
            Self::Exists => "EXISTS",
            Self::NotExists => "NOT EXISTS",
            Self::Is => "IS",
            Self::IsNot => "IS NOT",
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// 弱类型的条件树节点。
#[derive(Debug, Clone)]
pub enum Node {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// 标识符或原样文本，见模块文档。
    Str(String),
    Raw(Expr),
    /// 绑定参数。
    Bind(SqlValue),
    Query(Box<dyn Builder>),
    /// 已经是强类型的条件，解析时原样保留。
    Condition(Condition),
    Array(Vec<Entry>),
}

/// 数组元素：位置元素或 `"key" => value`。
#[derive(Debug, Clone)]
pub struct Entry {
    pub key: Option<String>,
    pub value: Node,
}

impl Entry {
    pub fn positional(value: impl Into<Node>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }

    pub fn keyed(key: impl Into<String>, value: impl Into<Node>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }

    fn operator(&self) -> Option<Operator> {
        match (&self.key, &self.value) {
            (None, Node::Str(s)) => Operator::parse(s),
            _ => None,
        }
    }
}

/// 标出一个需要绑定的值。
pub fn bind(value: impl Into<SqlValue>) -> Node {
    Node::Bind(value.into())
}

impl From<&str> for Node {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Node {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<i64> for Node {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Node {
    fn from(v: i32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<u32> for Node {
    fn from(v: u32) -> Self {
        Self::Int(v as i64)
    }
}

impl From<f64> for Node {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Node {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<()> for Node {
    fn from(_: ()) -> Self {
        Self::Null
    }
}

impl From<Expr> for Node {
    fn from(v: Expr) -> Self {
        Self::Raw(v)
    }
}

impl From<SqlValue> for Node {
    fn from(v: SqlValue) -> Self {
        Self::Bind(v)
    }
}

impl From<Box<dyn Builder>> for Node {
    fn from(v: Box<dyn Builder>) -> Self {
        Self::Query(v)
    }
}

impl From<Condition> for Node {
    fn from(v: Condition) -> Self {
        Self::Condition(v)
    }
}

impl<T: Into<Node>> From<Vec<T>> for Node {
    fn from(v: Vec<T>) -> Self {
        Self::Array(v.into_iter().map(Entry::positional).collect())
    }
}

/// 解析后的条件。
#[derive(Debug, Clone)]
pub enum Condition {
    Null,
    Bool(bool),
    /// 数字字面量。
    Literal(String),
    /// 标识符或原样文本。
    Scalar(String),
    Raw(Expr),
    Bind(SqlValue),
    SubQuery(Box<dyn Builder>),
    Unary {
        op: Operator,
        operand: Box<Condition>,
    },
    Binary {
        op: Operator,
        left: Box<Condition>,
        right: Box<Condition>,
    },
    Group {
        op: Operator,
        items: Vec<Condition>,
    },
    List(Vec<Condition>),
}

/// 能作为条件交给 builder 的输入。
pub trait IntoCondition {
    fn into_condition(self) -> Result<Condition, BuildError>;
}

impl<T: Into<Node>> IntoCondition for T {
    fn into_condition(self) -> Result<Condition, BuildError> {
        Condition::parse(self.into())
    }
}

impl Condition {
    /// 把一棵顶层条件树解析成强类型条件。
    pub fn parse(node: Node) -> Result<Self, BuildError> {
        resolve(node, true)
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self::Scalar(name.into())
    }

    pub fn value(v: impl Into<SqlValue>) -> Self {
        Self::Bind(v.into())
    }

    pub fn raw(sql: impl Into<String>) -> Self {
        Self::Raw(Expr::raw(sql))
    }

    pub fn binary(op: Operator, left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::Binary {
            op,
            left: Box::new(left.into()),
            right: Box::new(right.into()),
        }
    }

    pub fn eq(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::Eq, left, right)
    }

    pub fn ne(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::NotEq, left, right)
    }

    pub fn gt(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::Gt, left, right)
    }

    pub fn ge(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::Ge, left, right)
    }

    pub fn lt(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::Lt, left, right)
    }

    pub fn le(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::Le, left, right)
    }

    pub fn like(left: impl Into<Condition>, right: impl Into<Condition>) -> Self {
        Self::binary(Operator::Like, left, right)
    }

    pub fn in_<I>(left: impl Into<Condition>, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Condition>,
    {
        Self::binary(
            Operator::In,
            left,
            Self::List(items.into_iter().map(Into::into).collect()),
        )
    }

    pub fn not_in<I>(left: impl Into<Condition>, items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Condition>,
    {
        Self::binary(
            Operator::NotIn,
            left,
            Self::List(items.into_iter().map(Into::into).collect()),
        )
    }

    pub fn is_null(operand: impl Into<Condition>) -> Self {
        Self::unary(Operator::IsNull, operand)
    }

    pub fn is_not_null(operand: impl Into<Condition>) -> Self {
        Self::unary(Operator::IsNotNull, operand)
    }

    pub fn not(operand: impl Into<Condition>) -> Self {
        Self::unary(Operator::Not, operand)
    }

    pub fn exists(query: impl Builder + 'static) -> Self {
        Self::unary(Operator::Exists, Self::SubQuery(Box::new(query)))
    }

    pub fn not_exists(query: impl Builder + 'static) -> Self {
        Self::unary(Operator::NotExists, Self::SubQuery(Box::new(query)))
    }

    fn unary(op: Operator, operand: impl Into<Condition>) -> Self {
        Self::Unary {
            op,
            operand: Box::new(operand.into()),
        }
    }

    pub fn and(items: impl IntoIterator<Item = Condition>) -> Self {
        Self::Group {
            op: Operator::And,
            items: items.into_iter().collect(),
        }
    }

    pub fn or(items: impl IntoIterator<Item = Condition>) -> Self {
        Self::Group {
            op: Operator::Or,
            items: items.into_iter().collect(),
        }
    }

    /// 空的条件（没有任何子项的 AND/OR）不会渲染出子句。
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Group { items, .. } if items.is_empty())
    }

    /// 渲染到 `args`；`level` 是所在语句的缩进层级。
    pub fn render(&self, args: &mut Args, level: usize) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Bool(true) => "TRUE".to_string(),
            Self::Bool(false) => "FALSE".to_string(),
            Self::Literal(s) => s.clone(),
            Self::Scalar(s) => render_scalar(s, args),
            Self::Raw(e) => e.render(args),
            Self::Bind(v) => args.add(v.clone()),
            Self::SubQuery(q) => format!("(\n{}\n{})", q.render(args, level + 1), indent(level)),
            Self::Unary { op, operand } => {
                let operand = operand.render(args, level);
                match op.arity() {
                    Arity::Postfix => format!("{operand} {}", op.as_sql()),
                    _ => format!("{} {operand}", op.as_sql()),
                }
            }
            Self::Binary { op, left, right } => {
                if let Self::List(items) = right.as_ref() {
                    if items.is_empty() {
                        match op {
                            Operator::In => return "1=0".to_string(),
                            Operator::NotIn => return "1=1".to_string(),
                            _ => {}
                        }
                    }
                }
                let left = left.render(args, level);
                let right = right.render(args, level);
                format!("{left} {} {right}", op.as_sql())
            }
            Self::Group { op, items } => {
                if items.is_empty() {
                    return String::new();
                }
                let sep = format!("\n{}\t {} ", indent(level), op.as_sql());
                let parts: Vec<String> = items.iter().map(|c| c.render(args, level)).collect();
                format!("({})", parts.join(&sep))
            }
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|c| c.render(args, level)).collect();
                format!("({})", parts.join(", "))
            }
        }
    }
}

fn resolve(node: Node, top_level: bool) -> Result<Condition, BuildError> {
    Ok(match node {
        Node::Null => Condition::Null,
        Node::Bool(b) => Condition::Bool(b),
        Node::Int(i) => Condition::Literal(i.to_string()),
        Node::Float(f) => Condition::Literal(f.to_string()),
        Node::Str(s) => Condition::Scalar(s),
        Node::Raw(e) => Condition::Raw(e),
        Node::Bind(v) => Condition::Bind(v),
        Node::Query(q) => Condition::SubQuery(q),
        Node::Condition(c) => c,
        Node::Array(entries) => return resolve_array(entries, top_level),
    })
}

fn resolve_array(mut entries: Vec<Entry>, top_level: bool) -> Result<Condition, BuildError> {
    if let Some(op) = entries.first().and_then(Entry::operator) {
        let operands = entries.split_off(1);
        return resolve_operator(op, operands);
    }

    let all_keyed = !entries.is_empty() && entries.iter().all(|e| e.key.is_some());
    if !top_level && !all_keyed {
        let items = entries
            .into_iter()
            .map(resolve_operand)
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Condition::List(items));
    }

    let items = entries
        .into_iter()
        .map(resolve_operand)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(match <[Condition; 1]>::try_from(items) {
        Ok([only]) => only,
        Err(items) => Condition::and(items),
    })
}

fn resolve_operator(op: Operator, operands: Vec<Entry>) -> Result<Condition, BuildError> {
    let found = operands.len();
    let arity_error = |expected: &'static str| BuildError::InvalidArity {
        operator: op.name().to_string(),
        expected,
        found,
    };

    match op.arity() {
        Arity::Postfix | Arity::Prefix => {
            let [only] = <[Entry; 1]>::try_from(operands).map_err(|_| arity_error("exactly 1"))?;
            Ok(Condition::Unary {
                op,
                operand: Box::new(resolve_operand(only)?),
            })
        }
        Arity::Binary => {
            let mut it = operands.into_iter();
            match (it.next(), it.next(), it.next()) {
                (
                    Some(Entry {
                        key: Some(field),
                        value,
                    }),
                    None,
                    None,
                ) => Ok(Condition::binary(
                    op,
                    Condition::Scalar(field),
                    resolve(value, false)?,
                )),
                (Some(left), Some(right), None) if left.key.is_none() && right.key.is_none() => {
                    Ok(Condition::binary(
                        op,
                        resolve(left.value, false)?,
                        resolve(right.value, false)?,
                    ))
                }
                _ => Err(arity_error("2")),
            }
        }
        Arity::Variadic => {
            if operands.is_empty() {
                return Err(arity_error("at least 1"));
            }
            let items = operands
                .into_iter()
                .map(resolve_operand)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Condition::Group { op, items })
        }
    }
}

/// 位置元素递归解析；`"key" => value` 成为 `key = value`。
fn resolve_operand(entry: Entry) -> Result<Condition, BuildError> {
    match entry.key {
        Some(field) => Ok(Condition::eq(
            Condition::Scalar(field),
            resolve(entry.value, false)?,
        )),
        None => resolve(entry.value, false),
    }
}

const VERBATIM_MARKERS: &[char] = &[
    '(', ')', '+', '-', '/', '*', '=', '>', '<', ':', '\'', '"', '?', '@',
];

/// 字符串标量：数字或带运算符号的文本原样输出，其余按标识符转义。
pub(crate) fn render_scalar(s: &str, args: &Args) -> String {
    if s.is_empty() {
        return "''".to_string();
    }
    if is_verbatim(s) {
        s.to_string()
    } else {
        args.quote(s)
    }
}

/// 字符串标量是否原样输出（而不是当作标识符）。
pub(crate) fn is_verbatim(s: &str) -> bool {
    is_numeric(s)
        || s
            .chars()
            .any(|c| c.is_whitespace() || VERBATIM_MARKERS.contains(&c))
}

fn is_numeric(s: &str) -> bool {
    let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
    let mut parts = digits.splitn(2, '.');
    let int = parts.next().unwrap_or_default();
    let frac = parts.next();
    let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
    match frac {
        Some(frac) => (!int.is_empty() || !frac.is_empty()) && all_digits(int) && all_digits(frac),
        None => !int.is_empty() && all_digits(int),
    }
}

impl From<&str> for Condition {
    fn from(v: &str) -> Self {
        Self::Scalar(v.to_string())
    }
}

impl From<String> for Condition {
    fn from(v: String) -> Self {
        Self::Scalar(v)
    }
}

impl From<i64> for Condition {
    fn from(v: i64) -> Self {
        Self::Literal(v.to_string())
    }
}

impl From<i32> for Condition {
    fn from(v: i32) -> Self {
        Self::Literal(v.to_string())
    }
}

impl From<u64> for Condition {
    fn from(v: u64) -> Self {
        Self::Literal(v.to_string())
    }
}

impl From<f64> for Condition {
    fn from(v: f64) -> Self {
        Self::Literal(v.to_string())
    }
}

impl From<bool> for Condition {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Expr> for Condition {
    fn from(v: Expr) -> Self {
        Self::Raw(v)
    }
}

impl From<SqlValue> for Condition {
    fn from(v: SqlValue) -> Self {
        Self::Bind(v)
    }
}
