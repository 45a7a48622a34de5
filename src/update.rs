//! UpdateBuilder：构建 UPDATE 语句。

use crate::args::Args;
use crate::condition::{Condition, IntoCondition};
use crate::error::BuildError;
use crate::flavor::Flavor;
use crate::modifiers::{Arg, Builder};
use crate::string_builder::StringBuilder;

#[derive(Debug, Clone, Default)]
pub struct UpdateBuilder {
    flavor: Flavor,
    table: Option<String>,
    assignments: Vec<(String, Arg)>,
    where_cond: Option<Condition>,
}

impl UpdateBuilder {
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

    pub fn update(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    /// 追加赋值 `field = value`。
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<Arg>) -> &mut Self {
        self.assignments.push((field.into(), value.into()));
        self
    }

    pub fn where_(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        self.where_cond = Some(cond.into_condition()?);
        Ok(self)
    }

    pub fn num_assignment(&self) -> usize {
        self.assignments.len()
    }
}

impl Builder for UpdateBuilder {
    fn render(&self, args: &mut Args, level: usize) -> String {
        let mut buf = StringBuilder::new();
        buf.write_leading("UPDATE");
        if let Some(table) = &self.table {
            buf.write_leading(&args.quote(table));
        }

        if !self.assignments.is_empty() {
            let sets: Vec<String> = self
                .assignments
                .iter()
                .map(|(field, value)| {
                    let field = args.quote(field);
                    let value = args.write_arg(value);
                    format!("{field} = {value}")
                })
                .collect();
            buf.write_leading("SET");
            buf.write_leading(&sets.join(", "));
        }

        if let Some(cond) = self.where_cond.as_ref().filter(|c| !c.is_empty()) {
            buf.write_leading("WHERE");
            buf.write_leading(&cond.render(args, level));
        }

        buf.into_string()
    }

    fn flavor(&self) -> Flavor {
        self.flavor
    }
}

/// `UPDATE table SET ... WHERE ...`
pub fn update<I, K, V>(
    table: &str,
    fields: I,
    cond: impl IntoCondition,
) -> Result<UpdateBuilder, BuildError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Arg>,
{
    let mut ub = UpdateBuilder::new();
    ub.update(table);
    for (k, v) in fields {
        ub.set(k, v);
    }
    ub.where_(cond)?;
    Ok(ub)
}
