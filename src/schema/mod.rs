//! Schema definitions for the warehouse
//!
//! Source-to-warehouse column maps for every dimension and fact table. The
//! raw I94 names are already snake case and are kept as-is; the CSV sources
//! use title-case headers that are renamed on projection.

mod tables;

pub use tables::{
    ColumnMapping,
    TableDefinition,
    ARRIVAL_DATE_FIELD,
    CASE_ID_FIELD,
    DAY_FIELD,
    DIM_CALENDAR,
    DIM_IMMIGRANT,
    DIM_TEMPERATURES,
    DIM_USA_DEMOGRAPHICS,
    FACT_IMMIGRATION,
    MONTH_FIELD,
    SURROGATE_ID_FIELD,
    WEEKDAY_FIELD,
    WEEK_FIELD,
    YEAR_FIELD,
};
