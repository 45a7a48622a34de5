//! 列结构：[`ColumnDescriptor`] 与按声明顺序保存、按列名去重的 [`Columns`]。
//!
//! 结构相等（决定 `rewriteOrClear` 走 TRUNCATE 还是重建）的比较规则：
//! - 列名逐字相等；
//! - 类型去掉空白后忽略大小写比较（`INT(11)` 与 `int( 11 )` 相等）；
//! - `nullable`、`primary`、`indexed` 逐字相等；
//! - 默认值先归一：`None`、空串、`NULL` 视为无默认值，去掉外层引号与括号；
//! - `extra` 去掉首尾空白后忽略大小写比较；
//! - 两个集合的列名集合相同即可，不要求顺序一致。

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// 一列的结构描述。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            ..Self::default()
        }
    }

    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }

    pub fn renamed(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 按模块文档中的规则比较两列。
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.name == other.name
            && normalize_type(&self.sql_type) == normalize_type(&other.sql_type)
            && self.nullable == other.nullable
            && self.primary == other.primary
            && self.indexed == other.indexed
            && normalize_default(self.default.as_deref())
                == normalize_default(other.default.as_deref())
            && self.extra.trim().eq_ignore_ascii_case(other.extra.trim())
    }
}

fn normalize_type(t: &str) -> String {
    t.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

fn normalize_default(d: Option<&str>) -> Option<String> {
    let mut d = d?.trim();
    loop {
        let stripped = d
            .strip_prefix('(')
            .and_then(|s| s.strip_suffix(')'))
            .or_else(|| d.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
            .or_else(|| d.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
            .or_else(|| d.strip_prefix("N'").and_then(|s| s.strip_suffix('\'')));
        match stripped {
            Some(s) => d = s.trim(),
            None => break,
        }
    }
    if d.is_empty() || d.eq_ignore_ascii_case("null") {
        None
    } else {
        Some(d.to_string())
    }
}

/// 有序、列名唯一的列集合。反序列化时列名重复视为错误。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnDescriptor>", into = "Vec<ColumnDescriptor>")]
pub struct Columns(Vec<ColumnDescriptor>);

impl Columns {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入一列；同名列已存在时原位替换并返回旧值。
    pub fn insert(&mut self, column: ColumnDescriptor) -> Option<ColumnDescriptor> {
        match self.0.iter_mut().find(|c| c.name == column.name) {
            Some(slot) => Some(std::mem::replace(slot, column)),
            None => {
                self.0.push(column);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColumnDescriptor> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 主键列，保持声明顺序。
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.0.iter().filter(|c| c.primary)
    }

    /// 按模块文档中的规则比较两个集合，与列顺序无关。
    pub fn structurally_eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self.iter().all(|c| {
                other
                    .get(&c.name)
                    .is_some_and(|o| c.structurally_eq(o))
            })
    }
}

impl FromIterator<ColumnDescriptor> for Columns {
    fn from_iter<T: IntoIterator<Item = ColumnDescriptor>>(iter: T) -> Self {
        let mut columns = Self::new();
        for c in iter {
            columns.insert(c);
        }
        columns
    }
}

impl TryFrom<Vec<ColumnDescriptor>> for Columns {
    type Error = SchemaError;

    fn try_from(list: Vec<ColumnDescriptor>) -> Result<Self, Self::Error> {
        let mut columns = Self::new();
        for c in list {
            let name = c.name.clone();
            if columns.insert(c).is_some() {
                return Err(SchemaError::DuplicateColumn { column: name });
            }
        }
        Ok(columns)
    }
}

impl From<Columns> for Vec<ColumnDescriptor> {
    fn from(columns: Columns) -> Self {
        columns.0
    }
}

impl IntoIterator for Columns {
    type Item = ColumnDescriptor;
    type IntoIter = std::vec::IntoIter<ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Columns {
    type Item = &'a ColumnDescriptor;
    type IntoIter = std::slice::Iter<'a, ColumnDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{ColumnDescriptor, Columns};

    fn news() -> Columns {
        [
            ColumnDescriptor::new("id", "int(11)").primary().extra("auto_increment"),
            ColumnDescriptor::new("title", "varchar(255)").nullable(true),
            ColumnDescriptor::new("status", "tinyint(1)").default_value("'0'"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn structural_eq_ignores_order_and_cosmetics() {
        let reordered: Columns = [
            ColumnDescriptor::new("status", "TINYINT( 1 )").default_value("0"),
            ColumnDescriptor::new("title", "VARCHAR(255)")
                .nullable(true)
                .default_value("NULL"),
            ColumnDescriptor::new("id", "INT(11)").primary().extra(" AUTO_INCREMENT "),
        ]
        .into_iter()
        .collect();

        assert!(news().structurally_eq(&reordered));
    }

    #[test]
    fn structural_eq_detects_attribute_changes() {
        let mut changed = news();
        changed.insert(ColumnDescriptor::new("title", "varchar(255)"));
        assert!(!news().structurally_eq(&changed));

        let mut extra_col = news();
        extra_col.insert(ColumnDescriptor::new("body", "text"));
        assert!(!news().structurally_eq(&extra_col));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut cols = news();
        let old = cols.insert(ColumnDescriptor::new("title", "text"));
        assert_eq!(old.map(|c| c.sql_type), Some("varchar(255)".to_string()));
        assert_eq!(cols.names().collect::<Vec<_>>(), vec!["id", "title", "status"]);
        assert_eq!(cols.primary_keys().count(), 1);
    }
}
