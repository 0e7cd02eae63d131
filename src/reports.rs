use crate::document::{self, ReportDocument};
use crate::loader::{dedup_rows, LoadReport};
use crate::types::{
    EmployeeAggregate, EmployeeWeekMatrix, MatrixRow, RawRow, ShiftRecord, SummaryStats,
    WeekEntry, WeekRoster, WeekSummary,
};
use crate::util::{average, desc, median, population_variance};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Records that count towards the weekly views. NaN fails the comparison and is dropped too.
fn worked(records: &[ShiftRecord]) -> impl Iterator<Item = &ShiftRecord> + '_ {
    records.iter().filter(|r| r.hours > 0.0)
}

/// Group `items` by `key`, keeping groups in first-seen order.
fn group_ordered<'a, T, F>(items: impl Iterator<Item = &'a T>, key: F) -> Vec<(&'a str, Vec<&'a T>)>
where
    T: 'a,
    F: Fn(&'a T) -> &'a str,
{
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut groups: Vec<(&'a str, Vec<&'a T>)> = Vec::new();
    for item in items {
        let k = key(item);
        let slot = *index.entry(k).or_insert_with(|| {
            groups.push((k, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(item);
    }
    groups
}

/// Weeks with at least one worked shift, in discovery order.
pub fn distinct_weeks(records: &[ShiftRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    worked(records)
        .filter(|r| seen.insert(r.week.as_str()))
        .map(|r| r.week.clone())
        .collect()
}

pub fn week_summaries(records: &[ShiftRecord]) -> Vec<WeekSummary> {
    group_ordered(worked(records), |r| r.week.as_str())
        .into_iter()
        .map(|(week, shifts)| {
            let hours: Vec<f64> = shifts.iter().map(|r| r.hours).collect();
            WeekSummary {
                week: week.to_string(),
                employee_count: hours.len(),
                total_hours: hours.iter().sum(),
                average_hours_per_employee: average(&hours),
            }
        })
        .collect()
}

pub fn employees_by_week(records: &[ShiftRecord]) -> Vec<WeekRoster> {
    group_ordered(worked(records), |r| r.week.as_str())
        .into_iter()
        .map(|(week, shifts)| WeekRoster {
            week: week.to_string(),
            entries: shifts
                .into_iter()
                .map(|r| WeekEntry {
                    name: r.name.clone(),
                    hours: r.hours,
                })
                .collect(),
        })
        .collect()
}

/// Pivot every employee against `weeks`.
///
/// Rows come from all records, zero-hour ones included; a record whose week
/// is not in `weeks` has no column and is skipped. Rows are ordered by
/// their total, largest first, ties in discovery order.
pub fn employee_week_matrix(records: &[ShiftRecord], weeks: &[String]) -> EmployeeWeekMatrix {
    let column: HashMap<&str, usize> = weeks
        .iter()
        .enumerate()
        .map(|(i, w)| (w.as_str(), i))
        .collect();

    let mut rows: Vec<MatrixRow> = group_ordered(records.iter(), |r| r.name.as_str())
        .into_iter()
        .map(|(name, shifts)| {
            let mut hours = vec![0.0; weeks.len()];
            for r in shifts {
                if let Some(&col) = column.get(r.week.as_str()) {
                    hours[col] += r.hours;
                }
            }
            MatrixRow {
                name: name.to_string(),
                hours,
            }
        })
        .collect();

    // `sort_by` is stable, which keeps discovery order among equal totals.
    rows.sort_by(|a, b| desc(a.total(), b.total()));
    EmployeeWeekMatrix {
        weeks: weeks.to_vec(),
        rows,
    }
}

/// Rank employees by total hours over every record they have.
///
/// Mean and median use all of an employee's records; variance and standard
/// deviation only the non-zero ones, and are 0 when there are none.
pub fn employee_ranking(records: &[ShiftRecord]) -> Vec<EmployeeAggregate> {
    let mut ranking: Vec<EmployeeAggregate> =
        group_ordered(records.iter(), |r| r.name.as_str())
            .into_iter()
            .map(|(name, shifts)| {
                let hours: Vec<f64> = shifts.iter().map(|r| r.hours).collect();
                let weeks: HashSet<&str> = shifts.iter().map(|r| r.week.as_str()).collect();
                let non_zero: Vec<f64> = hours.iter().copied().filter(|h| *h != 0.0).collect();
                let variance = population_variance(&non_zero);
                EmployeeAggregate {
                    name: name.to_string(),
                    total_hours: hours.iter().sum(),
                    distinct_weeks_worked: weeks.len(),
                    mean_hours_per_week: average(&hours),
                    median_hours_per_week: median(hours),
                    variance_hours_per_week: variance,
                    std_dev_hours_per_week: variance.sqrt(),
                }
            })
            .collect();

    ranking.sort_by(|a, b| desc(a.total_hours, b.total_hours));
    ranking
}

pub fn generate_summary(records: &[ShiftRecord], ranking: &[EmployeeAggregate]) -> SummaryStats {
    let stores: HashSet<&str> = records.iter().map(|r| r.store.as_str()).collect();
    SummaryStats {
        total_records: records.len(),
        total_employees: ranking.len(),
        total_stores: stores.len(),
        total_weeks: distinct_weeks(records).len(),
        total_hours: worked(records).map(|r| r.hours).sum(),
    }
}

/// Every derived view of one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregates {
    pub weeks: Vec<String>,
    pub week_summaries: Vec<WeekSummary>,
    pub rosters: Vec<WeekRoster>,
    pub ranking: Vec<EmployeeAggregate>,
    pub matrix: EmployeeWeekMatrix,
}

pub fn compute(records: &[ShiftRecord]) -> Aggregates {
    let weeks = distinct_weeks(records);
    let aggregates = Aggregates {
        week_summaries: week_summaries(records),
        rosters: employees_by_week(records),
        ranking: employee_ranking(records),
        matrix: employee_week_matrix(records, &weeks),
        weeks,
    };
    debug!(
        weeks = aggregates.weeks.len(),
        employees = aggregates.ranking.len(),
        "computed aggregates"
    );
    aggregates
}

#[derive(Debug, Clone)]
pub struct AggregateOutcome {
    pub records: Vec<ShiftRecord>,
    pub load_report: LoadReport,
    pub aggregates: Aggregates,
    pub document: ReportDocument,
}

/// Full pipeline over raw rows: dedup, derive every view, lay out the document.
pub fn aggregate<I>(rows: I) -> AggregateOutcome
where
    I: IntoIterator<Item = RawRow>,
{
    let (records, load_report) = dedup_rows(rows);
    aggregate_records(records, load_report)
}

pub fn aggregate_records(records: Vec<ShiftRecord>, load_report: LoadReport) -> AggregateOutcome {
    let aggregates = compute(&records);
    let document = document::build(&aggregates);
    AggregateOutcome {
        records,
        load_report,
        aggregates,
        document,
    }
}
