//! Data cleaning for bulk ingestion
//!
//! Raw CSV files are read into loosely-typed [`Table`]s, passed through the
//! validation [`rules`] in an entity-specific order by the [`pipeline`], and
//! finally converted into typed, load-ready records.

pub mod csv_source;
pub mod pipeline;
pub mod rules;
pub mod table;

pub use csv_source::{read_table, read_table_from_reader, HeaderCase};
pub use pipeline::{
    clean_all, clean_members, clean_payments, clean_plans, clean_trainers, CleanedBatches,
    CleaningReport, EntityReport, EntityTables,
};
pub use table::{Cell, Table, Value};
