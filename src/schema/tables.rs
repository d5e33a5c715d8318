//! Warehouse table definitions
//!
//! Each table is described by its name, the source columns it projects (with
//! the canonical name each one is stored under) and its physical partition
//! columns.

/// Raw I94 arrival date column, a day offset from 1960-01-01
pub const ARRIVAL_DATE_FIELD: &str = "arrdate";
/// Raw I94 case identifier
pub const CASE_ID_FIELD: &str = "cicid";
/// Surrogate key column shared by dimensions that carry one
pub const SURROGATE_ID_FIELD: &str = "id";

pub const YEAR_FIELD: &str = "year";
pub const MONTH_FIELD: &str = "month";
pub const DAY_FIELD: &str = "day";
pub const WEEK_FIELD: &str = "week";
pub const WEEKDAY_FIELD: &str = "weekday";

/// Maps a source column onto its canonical warehouse name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    /// Column name in the raw dataset
    pub source: &'static str,
    /// Column name in the warehouse table
    pub target: &'static str,
}

impl ColumnMapping {
    pub const fn new(source: &'static str, target: &'static str) -> Self {
        Self { source, target }
    }

    /// Keep a column under its source name
    pub const fn keep(name: &'static str) -> Self {
        Self {
            source: name,
            target: name,
        }
    }
}

/// Static description of a warehouse table
#[derive(Debug, Clone, Copy)]
pub struct TableDefinition {
    /// Directory name under the destination root
    pub name: &'static str,
    /// Projected columns, in output order
    pub columns: &'static [ColumnMapping],
    /// Columns encoded as `col=value` directories instead of file data
    pub partition_by: &'static [&'static str],
}

impl TableDefinition {
    /// Canonical column names in output order
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.target).collect()
    }

    pub fn is_partitioned(&self) -> bool {
        !self.partition_by.is_empty()
    }
}

pub const DIM_CALENDAR: TableDefinition = TableDefinition {
    name: "dim_calendar",
    columns: &[
        ColumnMapping::keep(SURROGATE_ID_FIELD),
        ColumnMapping::keep(ARRIVAL_DATE_FIELD),
        ColumnMapping::keep(YEAR_FIELD),
        ColumnMapping::keep(MONTH_FIELD),
        ColumnMapping::keep(DAY_FIELD),
        ColumnMapping::keep(WEEK_FIELD),
        ColumnMapping::keep(WEEKDAY_FIELD),
    ],
    partition_by: &[YEAR_FIELD, MONTH_FIELD],
};

pub const DIM_IMMIGRANT: TableDefinition = TableDefinition {
    name: "dim_immigrant",
    columns: &[
        ColumnMapping::keep(CASE_ID_FIELD),
        ColumnMapping::keep("i94cit"),
        ColumnMapping::keep("i94res"),
        ColumnMapping::keep("i94mode"),
        ColumnMapping::keep("depdate"),
        ColumnMapping::keep("i94bir"),
        ColumnMapping::keep("gender"),
    ],
    partition_by: &[],
};

pub const FACT_IMMIGRATION: TableDefinition = TableDefinition {
    name: "fact_i94_immigration",
    columns: &[
        ColumnMapping::keep(CASE_ID_FIELD),
        ColumnMapping::keep(ARRIVAL_DATE_FIELD),
        ColumnMapping::keep("count"),
        ColumnMapping::keep("visapost"),
        ColumnMapping::keep("entdepa"),
        ColumnMapping::keep("entdepd"),
        ColumnMapping::keep("biryear"),
        ColumnMapping::keep("dtaddto"),
        ColumnMapping::keep("airline"),
        ColumnMapping::keep("fltno"),
        ColumnMapping::keep("visatype"),
        ColumnMapping::keep("i94addr"),
        ColumnMapping::keep("i94visa"),
    ],
    partition_by: &[],
};

/// US city demographics. The surrogate `id` is added by the builder and is
/// not part of the source projection.
pub const DIM_USA_DEMOGRAPHICS: TableDefinition = TableDefinition {
    name: "dim_usa_demographics",
    columns: &[
        ColumnMapping::new("City", "city"),
        ColumnMapping::new("State", "state"),
        ColumnMapping::new("Median Age", "median_age"),
        ColumnMapping::new("Male Population", "male_pop"),
        ColumnMapping::new("Female Population", "female_pop"),
        ColumnMapping::new("Total Population", "total_pop"),
        ColumnMapping::new("Number of Veterans", "veteran_number"),
        ColumnMapping::new("Foreign-born", "foreign_born"),
        ColumnMapping::new("Average Household Size", "avg_household_size"),
        ColumnMapping::new("Race", "race"),
        ColumnMapping::new("Count", "count"),
    ],
    partition_by: &[],
};

pub const DIM_TEMPERATURES: TableDefinition = TableDefinition {
    name: "dim_temperatures",
    columns: &[
        ColumnMapping::keep("dt"),
        ColumnMapping::new("AverageTemperature", "avg_temp"),
        ColumnMapping::new("AverageTemperatureUncertainty", "avg_temp_uncertainty"),
        ColumnMapping::new("City", "city"),
        ColumnMapping::new("Country", "country"),
        ColumnMapping::new("Latitude", "latitude"),
        ColumnMapping::new("Longitude", "longitude"),
    ],
    partition_by: &[],
};
