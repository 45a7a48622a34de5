//! InsertBuilder：构建 INSERT 语句，MySQL 下可附加 `ON DUPLICATE KEY UPDATE`。

use crate::args::Args;
use crate::dialect::Upsert;
use crate::error::BuildError;
use crate::flavor::Flavor;
use crate::modifiers::{Arg, Builder};
use crate::string_builder::StringBuilder;

#[derive(Debug, Clone, Default)]
pub struct InsertBuilder {
    flavor: Flavor,
    table: Option<String>,
    cols: Vec<String>,
    values: Vec<Vec<Arg>>,
    update_cols: Vec<String>,
}

impl InsertBuilder {
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

    pub fn insert_into(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn cols<I>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.cols = cols.into_iter().map(Into::into).collect();
        self
    }

    /// 追加一行值，顺序与 `cols` 一致。
    pub fn values(&mut self, values: impl IntoIterator<Item = impl Into<Arg>>) -> &mut Self {
        self.values.push(values.into_iter().map(Into::into).collect());
        self
    }

    /// 主键或唯一键冲突时更新这些列为新插入的值（仅 MySQL 生效）。
    pub fn on_duplicate_update<I>(&mut self, cols: I) -> &mut Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.update_cols = cols.into_iter().map(Into::into).collect();
        self
    }

    /// 构建前检查：必须有表名。
    pub fn try_build(&self) -> Result<(String, Vec<crate::SqlValue>), BuildError> {
        if self.table.is_none() {
            return Err(BuildError::MissingTable { statement: "insert" });
        }
        Ok(self.build())
    }
}

impl Builder for InsertBuilder {
    fn render(&self, args: &mut Args, _level: usize) -> String {
        let mut buf = StringBuilder::new();
        buf.write_leading("INSERT INTO");
        if let Some(table) = &self.table {
            buf.write_leading(&args.quote(table));
        }

        if !self.cols.is_empty() {
            let cols: Vec<String> = self.cols.iter().map(|c| args.quote(c)).collect();
            buf.write_leading(&format!("({})", cols.join(", ")));
        }

        if !self.values.is_empty() {
            let rows: Vec<String> = self
                .values
                .iter()
                .map(|row| {
                    let vals: Vec<String> = row.iter().map(|v| args.write_arg(v)).collect();
                    format!("({})", vals.join(", "))
                })
                .collect();
            buf.write_leading("VALUES");
            buf.write_leading(&rows.join(", "));
        }

        if !self.update_cols.is_empty() && args.dialect().upsert == Upsert::OnDuplicateKeyUpdate {
            let sets: Vec<String> = self
                .update_cols
                .iter()
                .map(|c| {
                    let c = args.quote(c);
                    format!("{c} = VALUES({c})")
                })
                .collect();
            buf.write_leading("ON DUPLICATE KEY UPDATE");
            buf.write_leading(&sets.join(", "));
        }

        buf.into_string()
    }

    fn flavor(&self) -> Flavor {
        self.flavor
    }
}

/// 单行 INSERT：`fields` 是列名到值（占位符、原样片段或绑定值）的有序映射。
pub fn insert<I, K, V>(table: &str, fields: I) -> InsertBuilder
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Arg>,
{
    let (cols, values): (Vec<String>, Vec<Arg>) = fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .unzip();
    let mut ib = InsertBuilder::new();
    ib.insert_into(table).cols(cols).values(values);
    ib
}

/// 单行 INSERT，冲突时更新全部列。
pub fn insert_on_duplicate_update<I, K, V>(table: &str, fields: I) -> InsertBuilder
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Arg>,
{
    let mut ib = insert(table, fields);
    let cols = ib.cols.clone();
    ib.on_duplicate_update(cols);
    ib
}
