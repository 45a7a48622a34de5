//! halo-sql-transfer：按方言渲染的 SQL builder，以及基于它的跨库表复制引擎。

pub mod args;
pub mod condition;
pub mod config;
#[cfg(test)]
mod config_tests;
pub mod create_table;
#[cfg(test)]
mod create_table_tests;
pub mod delete;
pub mod dialect;
pub mod error;
pub mod expr;
pub mod flavor;
pub mod gateway;
pub mod insert;
pub mod macros;
#[cfg(test)]
mod macros_tests;
#[cfg(test)]
mod memory_gateway;
pub mod modifiers;
pub mod quote;
pub mod rules;
pub mod schema;
pub mod select;
#[cfg(test)]
mod select_tests;
pub mod string_builder;
pub mod transfer;
pub mod update;
pub mod value;

pub use crate::args::Args;
pub use crate::condition::{Condition, Entry, IntoCondition, Node, Operator, bind};
pub use crate::config::{Config, ConnectionConfig, TableConfig, TransferConfig};
pub use crate::create_table::{
    CreateTableBuilder, DropTableBuilder, TruncateTableBuilder, create_table, drop_table,
    truncate_table,
};
pub use crate::delete::{DeleteBuilder, delete};
pub use crate::dialect::{Dialect, Pagination, Placeholder, Upsert};
pub use crate::error::{
    BuildError, ConfigError, Error, GatewayError, Result, RowWriteError, SchemaError,
};
pub use crate::expr::Expr;
pub use crate::flavor::Flavor;
pub use crate::gateway::{FetchMode, Gateway, IsolationLevel, Row, RowCursor};
pub use crate::insert::{InsertBuilder, insert, insert_on_duplicate_update};
pub use crate::modifiers::{Arg, Builder, raw};
pub use crate::quote::{quote_str, quote_value};
pub use crate::rules::{
    ColumnMap, ColumnPlan, FieldCallback, FieldHandler, FieldRule, FieldRuleConfig, TypePattern,
    TypeRule, TypeRuleConfig,
};
pub use crate::schema::{ColumnDescriptor, Columns};
pub use crate::select::{
    Direction, FieldRef, Join, JoinKind, SelectBuilder, SelectItem, SelectSource, TableRef,
    TableSource, Term, TermExpr,
};
pub use crate::transfer::{
    CopyOptions, CopyState, CopySummary, ExistsAction, SourceSpec, TableOutcome, TableReport,
    TableSpec, Transfer,
};
pub use crate::update::{UpdateBuilder, update};
pub use crate::value::SqlValue;
