use serde::{Deserialize, Serialize};

/// One CSV row as it comes out of the reader. Every field is optional so
/// a short row or a missing header does not abort the whole file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
    #[serde(rename = "tienda")]
    pub store: Option<String>,
    #[serde(rename = "semana")]
    pub week: Option<String>,
    #[serde(rename = "nombre")]
    pub name: Option<String>,
    #[serde(rename = "horas")]
    pub hours: Option<String>,
}

/// A typed shift observation. `hours` is NaN when the source value was not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftRecord {
    pub store: String,
    pub week: String,
    pub name: String,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSummary {
    pub week: String,
    pub employee_count: usize,
    pub total_hours: f64,
    pub average_hours_per_employee: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekEntry {
    pub name: String,
    pub hours: f64,
}

/// Employees listed under one week, in the order they were loaded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekRoster {
    pub week: String,
    pub entries: Vec<WeekEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeAggregate {
    pub name: String,
    pub total_hours: f64,
    pub distinct_weeks_worked: usize,
    pub mean_hours_per_week: f64,
    pub median_hours_per_week: f64,
    pub variance_hours_per_week: f64,
    pub std_dev_hours_per_week: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub name: String,
    /// Hours per week, aligned with `EmployeeWeekMatrix::weeks`.
    pub hours: Vec<f64>,
}

impl MatrixRow {
    pub fn total(&self) -> f64 {
        self.hours.iter().sum()
    }
}

/// Employee x week pivot of hours. Missing pairs are 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeWeekMatrix {
    pub weeks: Vec<String>,
    pub rows: Vec<MatrixRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub total_employees: usize,
    pub total_stores: usize,
    pub total_weeks: usize,
    pub total_hours: f64,
}
