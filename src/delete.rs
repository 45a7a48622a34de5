//! DeleteBuilder：构建 DELETE 语句。

use crate::args::Args;
use crate::condition::{Condition, IntoCondition};
use crate::error::BuildError;
use crate::flavor::Flavor;
use crate::modifiers::Builder;
use crate::string_builder::StringBuilder;

#[derive(Debug, Clone, Default)]
pub struct DeleteBuilder {
    flavor: Flavor,
    table: Option<String>,
    where_cond: Option<Condition>,
}

impl DeleteBuilder {
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

    pub fn delete_from(&mut self, table: &str) -> &mut Self {
        self.table = Some(table.to_string());
        self
    }

    pub fn where_(&mut self, cond: impl IntoCondition) -> Result<&mut Self, BuildError> {
        self.where_cond = Some(cond.into_condition()?);
        Ok(self)
    }
}

impl Builder for DeleteBuilder {
    fn render(&self, args: &mut Args, level: usize) -> String {
        let mut buf = StringBuilder::new();
        buf.write_leading("DELETE FROM");
        if let Some(table) = &self.table {
            buf.write_leading(&args.quote(table));
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

/// `DELETE FROM table WHERE ...`
pub fn delete(table: &str, cond: impl IntoCondition) -> Result<DeleteBuilder, BuildError> {
    let mut db = DeleteBuilder::new();
    db.delete_from(table).where_(cond)?;
    Ok(db)
}
