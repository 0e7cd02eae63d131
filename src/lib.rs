//! Workforce statistics over shift exports.
//!
//! `loader` turns `tienda;semana;nombre;horas` rows into deduplicated
//! [`types::ShiftRecord`]s, `reports` derives the weekly, ranking and
//! pivot views, `document` lays them out as sheets and `output` writes
//! the workbook.
pub mod document;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;

pub use document::ReportDocument;
pub use error::{ReportError, ReportResult};
pub use reports::{aggregate, AggregateOutcome};
