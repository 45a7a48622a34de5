//! Args：渲染期的参数收集器。负责生成占位符，并按出现顺序保存绑定值。

use crate::dialect::Dialect;
use crate::flavor::Flavor;
use crate::modifiers::Arg;
use crate::value::SqlValue;

/// 一次渲染过程中共享的上下文。
///
/// 同一条语句（包括其中的子查询）使用同一个 `Args`，
/// 所以 SQL Server 的 `@pN` 编号在整条语句内连续。
#[derive(Debug, Clone)]
pub struct Args {
    flavor: Flavor,
    values: Vec<SqlValue>,
}

impl Args {
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            values: Vec::new(),
        }
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub fn dialect(&self) -> Dialect {
        self.flavor.dialect()
    }

    /// Add：追加一个绑定值并返回它的占位符。
    pub fn add(&mut self, value: impl Into<SqlValue>) -> String {
        self.values.push(value.into());
        let mut out = String::new();
        self.dialect()
            .placeholder
            .write_placeholder(self.values.len(), &mut out);
        out
    }

    /// 渲染一个值位置：普通值成为占位符，Raw 原样输出。
    pub fn write_arg(&mut self, arg: &Arg) -> String {
        match arg {
            Arg::Value(v) => self.add(v.clone()),
            Arg::Raw(expr) => expr.render(self),
        }
    }

    /// 以当前方言转义标识符。
    pub fn quote(&self, ident: &str) -> String {
        self.dialect().quote_ident(ident)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

/// 缩进前缀：每层一个制表符。
pub(crate) fn indent(level: usize) -> String {
    "\t".repeat(level)
}
