//! 列规则：由源表列与字段规则、类型规则推导目标列集合，以及源列到目标列的映射。
//!
//! 字段规则决定保留哪些列、改成什么名字；类型规则决定保留哪些类型、改成什么类型。
//! 两条规则独立生效，一列只有同时通过两者才会出现在目标表中。

use crate::error::SchemaError;
use crate::gateway::Row;
use crate::schema::{ColumnDescriptor, Columns};
use crate::value::SqlValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// 字段回调：`(序号, 源列名, 源列描述)`，返回该源列产出的目标列；`None` 或空集合表示丢弃。
pub type FieldCallback =
    Arc<dyn Fn(usize, &str, &ColumnDescriptor) -> Option<Columns> + Send + Sync>;

/// 行处理回调：`(目标列名, 源列类型, 值)`，返回写入目标表的值。
pub type FieldHandler = Arc<dyn Fn(&str, Option<&str>, SqlValue) -> SqlValue + Send + Sync>;

#[derive(Clone)]
pub enum FieldRule {
    /// 保留全部列，按映射改名。
    Default(Vec<(String, String)>),
    /// 只保留映射中出现的列，并改名。
    Whitelist(Vec<(String, String)>),
    /// 丢弃列出的列。
    Blacklist(Vec<String>),
    Callback(FieldCallback),
}

impl FieldRule {
    pub fn rename<I, K, V>(renames: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Default(pairs(renames))
    }

    pub fn whitelist<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Whitelist(pairs(fields))
    }

    pub fn blacklist<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::Blacklist(fields.into_iter().map(Into::into).collect())
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(usize, &str, &ColumnDescriptor) -> Option<Columns> + Send + Sync + 'static,
    {
        Self::Callback(Arc::new(f))
    }

    fn produce(&self, index: usize, column: &ColumnDescriptor) -> Vec<ColumnDescriptor> {
        match self {
            Self::Default(renames) => {
                let name = lookup(renames, &column.name).unwrap_or(&column.name);
                vec![column.clone().renamed(name)]
            }
            Self::Whitelist(fields) => lookup(fields, &column.name)
                .map(|name| vec![column.clone().renamed(name)])
                .unwrap_or_default(),
            Self::Blacklist(fields) => {
                if fields.iter().any(|f| *f == column.name) {
                    Vec::new()
                } else {
                    vec![column.clone()]
                }
            }
            Self::Callback(f) => f(index, &column.name, column)
                .map(|cols| cols.into_iter().collect())
                .unwrap_or_default(),
        }
    }
}

impl Default for FieldRule {
    fn default() -> Self {
        Self::Default(Vec::new())
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default(r) => f.debug_tuple("Default").field(r).finish(),
            Self::Whitelist(r) => f.debug_tuple("Whitelist").field(r).finish(),
            Self::Blacklist(r) => f.debug_tuple("Blacklist").field(r).finish(),
            Self::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

fn pairs<I, K, V>(items: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    items.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
}

/// 类型规则。模式按声明顺序做忽略大小写的子串匹配，第一个命中的生效；
/// 改写只替换命中的那一段。空模式不匹配任何类型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRule {
    /// 保留全部列，命中的类型按映射改写。
    Default(Vec<(String, String)>),
    /// 只保留命中的类型，可选改写。
    Whitelist(Vec<(String, Option<String>)>),
    /// 丢弃命中的类型。
    Blacklist(Vec<String>),
}

impl TypeRule {
    pub fn remap<I, K, V>(types: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Default(pairs(types))
    }

    pub fn whitelist<I, K>(types: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self::Whitelist(types.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn blacklist<I>(types: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::Blacklist(types.into_iter().map(Into::into).collect())
    }

    /// 返回改写后的类型；`None` 表示该列被丢弃。
    pub fn apply(&self, sql_type: &str) -> Option<String> {
        match self {
            Self::Default(map) => Some(
                map.iter()
                    .find_map(|(pat, new)| replace_match(sql_type, pat, new))
                    .unwrap_or_else(|| sql_type.to_string()),
            ),
            Self::Whitelist(map) => map.iter().find_map(|(pat, new)| match new {
                Some(new) => replace_match(sql_type, pat, new),
                None => find_match(sql_type, pat).map(|_| sql_type.to_string()),
            }),
            Self::Blacklist(pats) => {
                if pats.iter().any(|p| find_match(sql_type, p).is_some()) {
                    None
                } else {
                    Some(sql_type.to_string())
                }
            }
        }
    }
}

impl Default for TypeRule {
    fn default() -> Self {
        Self::Default(Vec::new())
    }
}

fn find_match(haystack: &str, pattern: &str) -> Option<usize> {
    if pattern.is_empty() {
        return None;
    }
    haystack
        .to_ascii_lowercase()
        .find(&pattern.to_ascii_lowercase())
}

fn replace_match(sql_type: &str, pattern: &str, new: &str) -> Option<String> {
    let start = find_match(sql_type, pattern)?;
    let end = start + pattern.len();
    Some(format!("{}{new}{}", &sql_type[..start], &sql_type[end..]))
}

/// 源列到目标列的映射，保持源列顺序；一个源列可以产出多个目标列。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap(Vec<(String, Vec<String>)>);

impl ColumnMap {
    pub fn get(&self, source: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(s, _)| s == source)
            .map(|(_, d)| d.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(s, d)| (s.as_str(), d.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, source: &str, dest: String) {
        match self.0.iter_mut().find(|(s, _)| s == source) {
            Some((_, dests)) => dests.push(dest),
            None => self.0.push((source.to_string(), vec![dest])),
        }
    }
}

/// 一次表复制的列计划：目标列集合与列映射。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPlan {
    pub columns: Columns,
    pub map: ColumnMap,
}

impl ColumnPlan {
    pub fn resolve(
        source: &Columns,
        fields: &FieldRule,
        types: &TypeRule,
    ) -> Result<Self, SchemaError> {
        let mut plan = Self::default();
        for (index, column) in source.iter().enumerate() {
            for mut dest in fields.produce(index, column) {
                let Some(sql_type) = types.apply(&dest.sql_type) else {
                    continue;
                };
                dest.sql_type = sql_type;
                if plan.columns.contains(&dest.name) {
                    return Err(SchemaError::DuplicateColumn { column: dest.name });
                }
                plan.map.push(&column.name, dest.name.clone());
                plan.columns.insert(dest);
            }
        }
        Ok(plan)
    }

    /// 把源行转换成目标行：丢弃未映射的列，按映射改名或扇出，再交给 `handler`。
    pub fn apply_row(&self, row: Row, source: &Columns, handler: Option<&FieldHandler>) -> Row {
        let mut out = Row::new();
        for (name, value) in row {
            let Some(dests) = self.map.get(&name) else {
                continue;
            };
            let source_type = source.get(&name).map(|c| c.sql_type.as_str());
            for dest in dests {
                let value = match handler {
                    Some(h) => h(dest, source_type, value.clone()),
                    None => value.clone(),
                };
                out.push(dest.clone(), value);
            }
        }
        out
    }
}

/// 配置文件中的字段规则。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum FieldRuleConfig {
    Default {
        #[serde(default)]
        rename: BTreeMap<String, String>,
    },
    /// 值为空时保留原名。
    Whitelist {
        fields: BTreeMap<String, Option<String>>,
    },
    Blacklist {
        fields: Vec<String>,
    },
}

impl From<FieldRuleConfig> for FieldRule {
    fn from(config: FieldRuleConfig) -> Self {
        match config {
            FieldRuleConfig::Default { rename } => Self::Default(rename.into_iter().collect()),
            FieldRuleConfig::Whitelist { fields } => Self::Whitelist(
                fields
                    .into_iter()
                    .map(|(k, v)| {
                        let v = v.unwrap_or_else(|| k.clone());
                        (k, v)
                    })
                    .collect(),
            ),
            FieldRuleConfig::Blacklist { fields } => Self::Blacklist(fields),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypePattern {
    pub pattern: String,
    #[serde(default)]
    pub replace: Option<String>,
}

/// 配置文件中的类型规则；模式是有序列表，保留声明顺序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "lowercase")]
pub enum TypeRuleConfig {
    Default { types: Vec<TypePattern> },
    Whitelist { types: Vec<TypePattern> },
    Blacklist { types: Vec<String> },
}

impl From<TypeRuleConfig> for TypeRule {
    fn from(config: TypeRuleConfig) -> Self {
        match config {
            TypeRuleConfig::Default { types } => Self::Default(
                types
                    .into_iter()
                    .filter_map(|t| t.replace.map(|r| (t.pattern, r)))
                    .collect(),
            ),
            TypeRuleConfig::Whitelist { types } => {
                Self::Whitelist(types.into_iter().map(|t| (t.pattern, t.replace)).collect())
            }
            TypeRuleConfig::Blacklist { types } => Self::Blacklist(types),
        }
    }
}
