//! 表级 DDL：CREATE TABLE（由 [`Columns`] 生成列定义）、DROP TABLE 与 TRUNCATE TABLE。

use crate::args::Args;
use crate::flavor::Flavor;
use crate::modifiers::Builder;
use crate::quote::quote_str;
use crate::schema::{ColumnDescriptor, Columns};
use crate::string_builder::StringBuilder;

/// 默认值里原样输出、不加引号的关键字。
const DEFAULT_KEYWORDS: &[&str] = &[
    "CURRENT_TIMESTAMP",
    "CURRENT_TIMESTAMP()",
    "NOW()",
    "GETDATE()",
];

#[derive(Debug, Clone, Default)]
pub struct CreateTableBuilder {
    flavor: Flavor,
    table: String,
    if_not_exists: bool,
    columns: Columns,
}

impl CreateTableBuilder {
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

    pub fn create_table(&mut self, table: &str) -> &mut Self {
        self.table = table.to_string();
        self
    }

    pub fn if_not_exists(&mut self) -> &mut Self {
        self.if_not_exists = true;
        self
    }

    pub fn columns(&mut self, columns: Columns) -> &mut Self {
        self.columns = columns;
        self
    }

    fn column_definition(&self, column: &ColumnDescriptor, args: &Args) -> String {
        let mut def = format!("{} {}", args.quote(&column.name), column.sql_type);
        let default = column
            .default
            .as_deref()
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("null"));
        if !column.nullable {
            def.push_str(" NOT NULL");
        }
        match default {
            Some(d) => {
                def.push_str(" DEFAULT ");
                def.push_str(&render_default(d, args.flavor()));
            }
            None if column.nullable => def.push_str(" DEFAULT NULL"),
            None => {}
        }
        let extra = column.extra.trim();
        if !extra.is_empty() {
            def.push(' ');
            def.push_str(&translate_extra(extra, args.flavor()));
        }
        def
    }
}

fn render_default(d: &str, flavor: Flavor) -> String {
    let verbatim = d.parse::<f64>().is_ok()
        || DEFAULT_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(d))
        || (d.starts_with('\'') && d.ends_with('\'') && d.len() >= 2);
    if verbatim {
        d.to_string()
    } else {
        quote_str(flavor, d)
    }
}

/// MySQL 的 `auto_increment` 在 SQL Server 上写作 `IDENTITY(1,1)`。
fn translate_extra(extra: &str, flavor: Flavor) -> String {
    match flavor {
        Flavor::SQLServer if extra.eq_ignore_ascii_case("auto_increment") => {
            "IDENTITY(1,1)".to_string()
        }
        _ => extra.to_string(),
    }
}

impl Builder for CreateTableBuilder {
    fn render(&self, args: &mut Args, _level: usize) -> String {
        let table = args.quote(&self.table);
        let mut defs: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("\t{}", self.column_definition(c, args)))
            .collect();

        let pk: Vec<String> = self.columns.primary_keys().map(|c| args.quote(&c.name)).collect();
        if !pk.is_empty() {
            defs.push(format!("\tPRIMARY KEY ({})", pk.join(", ")));
        }
        for c in self.columns.iter().filter(|c| c.indexed && !c.primary) {
            let col = args.quote(&c.name);
            match args.flavor() {
                Flavor::MySQL => defs.push(format!("\tKEY {col} ({col})")),
                Flavor::SQLServer => {
                    let name = format!("ix_{}_{}", self.table.replace('.', "_"), c.name);
                    let index = args.quote(&name);
                    defs.push(format!("\tINDEX {index} ({col})"));
                }
            }
        }

        let mut buf = StringBuilder::new();
        match args.flavor() {
            Flavor::MySQL => {
                buf.write_leading("CREATE TABLE");
                if self.if_not_exists {
                    buf.write_leading("IF NOT EXISTS");
                }
                buf.write_leading(&table);
                buf.write_str(" (\n");
                buf.write_str(&defs.join(",\n"));
                buf.write_str("\n) ENGINE=InnoDB DEFAULT CHARSET=utf8");
            }
            Flavor::SQLServer => {
                if self.if_not_exists {
                    let name = quote_str(Flavor::SQLServer, &self.table);
                    buf.write_leading(&format!("IF OBJECT_ID({name}, N'U') IS NULL"));
                }
                buf.write_leading("CREATE TABLE");
                buf.write_leading(&table);
                buf.write_str(" (\n");
                buf.write_str(&defs.join(",\n"));
                buf.write_str("\n)");
            }
        }
        buf.into_string()
    }

    fn flavor(&self) -> Flavor {
        self.flavor
    }
}

/// `CREATE TABLE [IF NOT EXISTS] table (...)`
pub fn create_table(table: &str, columns: Columns) -> CreateTableBuilder {
    let mut ctb = CreateTableBuilder::new();
    ctb.create_table(table).columns(columns);
    ctb
}

#[derive(Debug, Clone, Default)]
pub struct DropTableBuilder {
    flavor: Flavor,
    table: String,
    if_exists: bool,
}

impl DropTableBuilder {
    pub fn with_flavor(flavor: Flavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    pub fn drop_table(&mut self, table: &str) -> &mut Self {
        self.table = table.to_string();
        self
    }

    pub fn if_exists(&mut self) -> &mut Self {
        self.if_exists = true;
        self
    }
}

impl Builder for DropTableBuilder {
    fn render(&self, args: &mut Args, _level: usize) -> String {
        let mut buf = StringBuilder::new();
        buf.write_leading("DROP TABLE");
        if self.if_exists {
            buf.write_leading("IF EXISTS");
        }
        buf.write_leading(&args.quote(&self.table));
        buf.into_string()
    }

    fn flavor(&self) -> Flavor {
        self.flavor
    }
}

/// `DROP TABLE [IF EXISTS] table`
pub fn drop_table(table: &str) -> DropTableBuilder {
    let mut dtb = DropTableBuilder::default();
    dtb.drop_table(table);
    dtb
}

#[derive(Debug, Clone, Default)]
pub struct TruncateTableBuilder {
    flavor: Flavor,
    table: String,
}

impl TruncateTableBuilder {
    pub fn with_flavor(flavor: Flavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    pub fn truncate_table(&mut self, table: &str) -> &mut Self {
        self.table = table.to_string();
        self
    }
}

impl Builder for TruncateTableBuilder {
    fn render(&self, args: &mut Args, _level: usize) -> String {
        format!("TRUNCATE TABLE {}", args.quote(&self.table))
    }

    fn flavor(&self) -> Flavor {
        self.flavor
    }
}

/// `TRUNCATE TABLE table`
pub fn truncate_table(table: &str) -> TruncateTableBuilder {
    let mut ttb = TruncateTableBuilder::default();
    ttb.truncate_table(table);
    ttb
}
