//! 参数修饰与 [`Builder`] trait。

use crate::args::Args;
use crate::expr::Expr;
use crate::flavor::Flavor;
use crate::value::SqlValue;
use dyn_clone::DynClone;
use std::fmt;

/// Raw：标记为原样拼入 SQL（不会成为参数占位符），例如 `raw(":id")` 或 `raw("NOW()")`。
pub fn raw(expr: impl Into<String>) -> Arg {
    Arg::Raw(Expr::raw(expr))
}

/// 值位置上的参数：要么绑定，要么原样输出。
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(SqlValue),
    Raw(Expr),
}

impl Arg {
    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

/// 可嵌套构建 SQL 的语句。
pub trait Builder: DynClone + fmt::Debug {
    fn build(&self) -> (String, Vec<SqlValue>) {
        self.build_with_flavor(self.flavor())
    }

    /// 以指定 Flavor 构建，返回 SQL 文本和按占位符顺序排列的绑定值。
    fn build_with_flavor(&self, flavor: Flavor) -> (String, Vec<SqlValue>) {
        let mut args = Args::new(flavor);
        let sql = self.render(&mut args, 0);
        (sql, args.into_values())
    }

    /// 在缩进层级 `level` 上渲染；嵌套子查询共享同一个 `args`。
    fn render(&self, args: &mut Args, level: usize) -> String;

    fn flavor(&self) -> Flavor;
}

dyn_clone::clone_trait_object!(Builder);

impl Builder for Box<dyn Builder> {
    fn render(&self, args: &mut Args, level: usize) -> String {
        (**self).render(args, level)
    }

    fn flavor(&self) -> Flavor {
        (**self).flavor()
    }
}

impl From<SqlValue> for Arg {
    fn from(v: SqlValue) -> Self {
        Self::Value(v)
    }
}

impl From<Expr> for Arg {
    fn from(v: Expr) -> Self {
        Self::Raw(v)
    }
}

impl From<i64> for Arg {
    fn from(v: i64) -> Self {
        SqlValue::I64(v).into()
    }
}
impl From<i32> for Arg {
    fn from(v: i32) -> Self {
        SqlValue::I64(v as i64).into()
    }
}
impl From<u64> for Arg {
    fn from(v: u64) -> Self {
        SqlValue::U64(v).into()
    }
}
impl From<u32> for Arg {
    fn from(v: u32) -> Self {
        SqlValue::U64(v as u64).into()
    }
}
impl From<bool> for Arg {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v).into()
    }
}
impl From<f64> for Arg {
    fn from(v: f64) -> Self {
        SqlValue::F64(v).into()
    }
}
impl From<&'static str> for Arg {
    fn from(v: &'static str) -> Self {
        SqlValue::from(v).into()
    }
}
impl From<String> for Arg {
    fn from(v: String) -> Self {
        SqlValue::from(v).into()
    }
}
impl From<Vec<u8>> for Arg {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Bytes(v).into()
    }
}
impl From<time::OffsetDateTime> for Arg {
    fn from(v: time::OffsetDateTime) -> Self {
        SqlValue::DateTime(v).into()
    }
}

impl<T> From<Option<T>> for Arg
where
    T: Into<SqlValue>,
{
    fn from(v: Option<T>) -> Self {
        SqlValue::from_option(v).into()
    }
}
