// Report layout.
//
// Turns the aggregated views into sheet-shaped tables: header labels,
// column widths, typed cells and vertical merges. Nothing here touches a
// file; `output` renders the result.
use crate::reports::Aggregates;
use crate::util::round2;
use serde::Serialize;

pub const GENERAL_SHEET: &str = "Reporte General";
pub const ROSTER_SHEET: &str = "Semana y horas por empleado";
pub const RANKING_SHEET: &str = "Ranking empleados";
pub const MATRIX_SHEET: &str = "Horas por empleado y semana";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// A statistic shown with two decimals but kept numeric.
    pub fn stat(n: f64) -> Self {
        Cell::Number(round2(n))
    }

    pub fn display(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<usize> for Cell {
    fn from(n: usize) -> Self {
        Cell::Number(n as f64)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub header: String,
    pub width: u16,
}

impl Column {
    fn new(header: impl Into<String>, width: u16) -> Self {
        Column {
            header: header.into(),
            width,
        }
    }
}

/// Inclusive span of data rows (0 = first row after the header) in one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeRange {
    pub column: usize,
    pub first_row: usize,
    pub last_row: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<MergeRange>,
}

impl Sheet {
    fn new(name: &str, columns: Vec<Column>) -> Self {
        Sheet {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
            merges: Vec::new(),
        }
    }

    /// Merge runs of equal adjacent values in `column`.
    pub fn merge_column<F>(&mut self, column: usize, eq: F)
    where
        F: Fn(&Cell, &Cell) -> bool,
    {
        self.merges.extend(merge_adjacent(&self.rows, column, eq));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportDocument {
    pub sheets: Vec<Sheet>,
}

impl ReportDocument {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }
}

/// Find every run of two or more consecutive rows whose `column` cells are equal under `eq`.
pub fn merge_adjacent<F>(rows: &[Vec<Cell>], column: usize, eq: F) -> Vec<MergeRange>
where
    F: Fn(&Cell, &Cell) -> bool,
{
    let mut merges = Vec::new();
    let mut start = 0usize;
    for i in 1..=rows.len() {
        let continues = i < rows.len()
            && match (rows[start].get(column), rows[i].get(column)) {
                (Some(a), Some(b)) => eq(a, b),
                _ => false,
            };
        if !continues {
            if i - start > 1 {
                merges.push(MergeRange {
                    column,
                    first_row: start,
                    last_row: i - 1,
                });
            }
            start = i;
        }
    }
    merges
}

fn general_sheet(agg: &Aggregates) -> Sheet {
    let mut sheet = Sheet::new(
        GENERAL_SHEET,
        vec![
            Column::new("Semana", 10),
            Column::new("Empleados", 13),
            Column::new("Horas Totales", 15),
            Column::new("Media de horas por empleado", 30),
        ],
    );
    sheet.rows = agg
        .week_summaries
        .iter()
        .map(|w| {
            vec![
                Cell::text(&w.week),
                w.employee_count.into(),
                w.total_hours.into(),
                Cell::stat(w.average_hours_per_employee),
            ]
        })
        .collect();
    sheet
}

fn roster_sheet(agg: &Aggregates) -> Sheet {
    let mut sheet = Sheet::new(
        ROSTER_SHEET,
        vec![
            Column::new("Semana", 10),
            Column::new("Nombre", 35),
            Column::new("Horas", 10),
        ],
    );
    sheet.rows = agg
        .rosters
        .iter()
        .flat_map(|roster| {
            roster.entries.iter().map(move |e| {
                vec![
                    Cell::text(&roster.week),
                    Cell::text(&e.name),
                    e.hours.into(),
                ]
            })
        })
        .collect();
    sheet.merge_column(0, |a, b| a == b);
    sheet
}

fn ranking_sheet(agg: &Aggregates) -> Sheet {
    let mut sheet = Sheet::new(
        RANKING_SHEET,
        vec![
            Column::new("Nombre", 35),
            Column::new("Horas Totales", 15),
            Column::new("Semanas con turno", 20),
            Column::new("Media de horas", 15),
            Column::new("Mediana de horas", 16),
            Column::new("Desviación estandar de los turnos", 30),
        ],
    );
    sheet.rows = agg
        .ranking
        .iter()
        .map(|e| {
            vec![
                Cell::text(&e.name),
                e.total_hours.into(),
                e.distinct_weeks_worked.into(),
                Cell::stat(e.mean_hours_per_week),
                Cell::stat(e.median_hours_per_week),
                Cell::stat(e.std_dev_hours_per_week),
            ]
        })
        .collect();
    sheet
}

fn matrix_sheet(agg: &Aggregates) -> Sheet {
    let columns = std::iter::once(Column::new("Nombre", 35))
        .chain(
            agg.matrix
                .weeks
                .iter()
                .map(|w| Column::new(format!("Semana {}", w), 10)),
        )
        .collect();
    let mut sheet = Sheet::new(MATRIX_SHEET, columns);
    sheet.rows = agg
        .matrix
        .rows
        .iter()
        .map(|row| {
            std::iter::once(Cell::text(&row.name))
                .chain(row.hours.iter().map(|h| Cell::from(*h)))
                .collect()
        })
        .collect();
    sheet
}

/// Lay out the four report sheets in workbook order.
pub fn build(agg: &Aggregates) -> ReportDocument {
    ReportDocument {
        sheets: vec![
            general_sheet(agg),
            roster_sheet(agg),
            ranking_sheet(agg),
            matrix_sheet(agg),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::compute;
    use crate::types::ShiftRecord;

    fn rec(week: &str, name: &str, hours: f64) -> ShiftRecord {
        ShiftRecord {
            store: "1".into(),
            week: week.into(),
            name: name.into(),
            hours,
        }
    }

    fn sample() -> Vec<ShiftRecord> {
        vec![
            rec("1", "Ana", 40.0),
            rec("1", "Luis", 20.0),
            rec("1", "Eva", 10.0),
            rec("2", "Ana", 30.0),
            rec("2", "Eva", 0.0),
            rec("3", "Luis", 25.0),
            rec("3", "Ana", 35.0),
        ]
    }

    fn texts(column: usize, rows: &[Vec<Cell>]) -> Vec<String> {
        rows.iter().map(|r| r[column].display()).collect()
    }

    #[test]
    fn merge_adjacent_finds_runs() {
        let rows: Vec<Vec<Cell>> = ["a", "a", "b", "c", "c", "c"]
            .iter()
            .map(|s| vec![Cell::text(*s)])
            .collect();
        let merges = merge_adjacent(&rows, 0, |a, b| a == b);
        assert_eq!(
            merges,
            vec![
                MergeRange { column: 0, first_row: 0, last_row: 1 },
                MergeRange { column: 0, first_row: 3, last_row: 5 },
            ]
        );
    }

    #[test]
    fn merge_adjacent_skips_singletons_and_empty_input() {
        let rows: Vec<Vec<Cell>> = ["a", "b", "a"].iter().map(|s| vec![Cell::text(*s)]).collect();
        assert!(merge_adjacent(&rows, 0, |a, b| a == b).is_empty());
        assert!(merge_adjacent(&[], 0, |a, b| a == b).is_empty());
    }

    #[test]
    fn merge_adjacent_honours_custom_predicate() {
        let rows: Vec<Vec<Cell>> = ["x", "X", "y"].iter().map(|s| vec![Cell::text(*s)]).collect();
        let merges = merge_adjacent(&rows, 0, |a, b| {
            a.display().eq_ignore_ascii_case(&b.display())
        });
        assert_eq!(merges, vec![MergeRange { column: 0, first_row: 0, last_row: 1 }]);
    }

    #[test]
    fn document_has_four_sheets_in_order() {
        let doc = build(&compute(&sample()));
        let names: Vec<&str> = doc.sheets.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec![GENERAL_SHEET, ROSTER_SHEET, RANKING_SHEET, MATRIX_SHEET]);
    }

    #[test]
    fn general_sheet_rows_per_week() {
        let doc = build(&compute(&sample()));
        let sheet = doc.sheet(GENERAL_SHEET).unwrap();
        assert_eq!(texts(0, &sheet.rows), vec!["1", "2", "3"]);
        assert_eq!(
            sheet.rows[0],
            vec![Cell::text("1"), Cell::Number(3.0), Cell::Number(70.0), Cell::Number(23.33)]
        );
        assert_eq!(sheet.rows[1][1], Cell::Number(1.0));
    }

    #[test]
    fn roster_sheet_merges_week_blocks() {
        let doc = build(&compute(&sample()));
        let sheet = doc.sheet(ROSTER_SHEET).unwrap();
        assert_eq!(sheet.rows.len(), 6);
        assert_eq!(
            sheet.merges,
            vec![
                MergeRange { column: 0, first_row: 0, last_row: 2 },
                MergeRange { column: 0, first_row: 4, last_row: 5 },
            ]
        );
    }

    #[test]
    fn ranking_sheet_rounds_statistics() {
        let doc = build(&compute(&sample()));
        let sheet = doc.sheet(RANKING_SHEET).unwrap();
        assert_eq!(sheet.columns.len(), 6);
        assert_eq!(texts(0, &sheet.rows), vec!["Ana", "Luis", "Eva"]);
        // Ana: 40, 30, 35
        assert_eq!(
            sheet.rows[0],
            vec![
                Cell::text("Ana"),
                Cell::Number(105.0),
                Cell::Number(3.0),
                Cell::Number(35.0),
                Cell::Number(35.0),
                Cell::Number(4.08),
            ]
        );
        // Eva: 10 and 0, dispersion over the 10 only.
        assert_eq!(sheet.rows[2][3], Cell::Number(5.0));
        assert_eq!(sheet.rows[2][5], Cell::Number(0.0));
    }

    #[test]
    fn matrix_sheet_has_week_headers_and_zero_fill() {
        let doc = build(&compute(&sample()));
        let sheet = doc.sheet(MATRIX_SHEET).unwrap();
        let headers: Vec<&str> = sheet.columns.iter().map(|c| c.header.as_str()).collect();
        assert_eq!(headers, vec!["Nombre", "Semana 1", "Semana 2", "Semana 3"]);
        assert_eq!(
            sheet.rows[1],
            vec![Cell::text("Luis"), Cell::Number(20.0), Cell::Number(0.0), Cell::Number(25.0)]
        );
    }

    #[test]
    fn rebuilding_yields_identical_document() {
        let first = build(&compute(&sample()));
        let second = build(&compute(&sample()));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
