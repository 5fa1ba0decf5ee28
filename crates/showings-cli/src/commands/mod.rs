//! CLI subcommand implementations.

pub mod coalesce;
pub mod create;
pub mod delete;
pub mod list;
pub mod properties;
pub mod select;
pub mod slots;
pub mod util;
pub mod week;
