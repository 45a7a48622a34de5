//! SQL 表达式片段：原样拼入 SQL 的文本，可以穿插绑定参数。

use crate::args::Args;
use crate::value::SqlValue;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Part {
    Sql(String),
    Arg(SqlValue),
}

/// 一个可组合的 SQL 片段表达式。
///
/// 文本部分不做任何转义或引号处理。
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub(crate) parts: Vec<Part>,
}

impl Expr {
    /// 直接插入一段 SQL 文本（不会变成参数）。
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Sql(sql.into())],
        }
    }

    /// 创建一个恒为 TRUE 的表达式（`TRUE`）。
    pub fn true_() -> Self {
        Self::raw("TRUE")
    }

    /// 创建一个恒为 FALSE 的表达式（`FALSE`）。
    pub fn false_() -> Self {
        Self::raw("FALSE")
    }

    /// 追加 SQL 文本。
    pub fn push_raw(&mut self, sql: impl Into<String>) {
        self.parts.push(Part::Sql(sql.into()));
    }

    /// 追加一个参数（构建时会生成占位符）。
    pub fn push_arg(&mut self, v: impl Into<SqlValue>) {
        self.parts.push(Part::Arg(v.into()));
    }

    /// 将当前表达式与另一个表达式连接（不自动添加空格）。
    pub fn concat(mut self, other: Expr) -> Self {
        self.parts.extend(other.parts);
        self
    }

    pub(crate) fn render(&self, args: &mut Args) -> String {
        let mut sql = String::new();
        for part in &self.parts {
            match part {
                Part::Sql(s) => sql.push_str(s),
                Part::Arg(v) => sql.push_str(&args.add(v.clone())),
            }
        }
        sql
    }
}

/// 文本形式；参数位置写作 `?`。
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                Part::Sql(s) => f.write_str(s)?,
                Part::Arg(_) => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::Expr;
    use crate::SqlValue;
    use crate::args::Args;
    use crate::flavor::Flavor;

    #[test]
    fn raw_is_not_parameterized() {
        let e = Expr::raw("a = 1");
        let mut args = Args::new(Flavor::MySQL);
        assert_eq!(e.render(&mut args), "a = 1");
        assert!(args.is_empty());
    }

    #[test]
    fn push_arg_generates_placeholder_per_flavor() {
        let mut e = Expr::raw("id = ");
        e.push_arg(7_i64);

        let mut args = Args::new(Flavor::MySQL);
        assert_eq!(e.render(&mut args), "id = ?");
        assert_eq!(args.into_values(), vec![SqlValue::I64(7)]);

        let mut args = Args::new(Flavor::SQLServer);
        assert_eq!(e.render(&mut args), "id = @p1");
    }

    #[test]
    fn concat_keeps_arg_order() {
        let mut a = Expr::raw("a = ");
        a.push_arg(1_i64);
        let mut b = Expr::raw(" AND b = ");
        b.push_arg(2_i64);

        let e = a.concat(b);
        assert_eq!(e.to_string(), "a = ? AND b = ?");
        let mut args = Args::new(Flavor::MySQL);
        e.render(&mut args);
        assert_eq!(args.into_values(), vec![SqlValue::I64(1), SqlValue::I64(2)]);
    }
}
