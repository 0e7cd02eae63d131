// Entry point.
//
// Loads one semicolon-separated shift export, aggregates it and writes the
// four-sheet workbook next to an optional JSON summary:
// - the workbook lands at `<out-dir>/report_<input stem>.xlsx`,
// - `--delete-input` removes the source CSV once the workbook is on disk,
// - `--preview` prints the first rows of each sheet to the console.
use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use shift_report::types::{EmployeeAggregate, SummaryStats};
use shift_report::{loader, output, reports, util};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "shift-report")]
#[command(about = "Weekly workforce report from a shift CSV export", long_about = None)]
struct Cli {
    /// Shift CSV with `tienda;semana;nombre;horas` columns
    input: PathBuf,
    /// Directory the workbook is written to
    #[arg(long, env = "SHIFT_REPORT_OUT_DIR", default_value = ".")]
    out_dir: PathBuf,
    /// Also write dataset totals and the full ranking as JSON
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Rows per sheet to print after writing (0 disables the preview)
    #[arg(long, default_value_t = 3)]
    preview: usize,
    /// Remove the input file after the workbook has been written
    #[arg(long)]
    delete_input: bool,
}

#[derive(Serialize)]
struct SummaryFile<'a> {
    summary: SummaryStats,
    load: &'a loader::LoadReport,
    ranking: &'a [EmployeeAggregate],
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug for per-row diagnostics.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let (records, load_report) = loader::load_records(&cli.input)
        .with_context(|| format!("failed to load {}", cli.input.display()))?;
    println!(
        "Processing dataset... ({} rows read, {} kept, {} duplicates dropped, {} rejected)",
        util::format_int(load_report.total_rows),
        util::format_int(load_report.loaded_rows),
        util::format_int(load_report.duplicate_rows),
        util::format_int(load_report.rejected_rows + load_report.parse_errors),
    );
    if load_report.unparsed_hours > 0 {
        println!(
            "Note: {} rows have non-numeric hours.",
            util::format_int(load_report.unparsed_hours)
        );
    }

    let outcome = reports::aggregate_records(records, load_report);

    let out_path = output::report_path(&cli.out_dir, &cli.input);
    output::write_xlsx(&out_path, &outcome.document)
        .with_context(|| format!("failed to write {}", out_path.display()))?;

    if let Some(path) = &cli.summary {
        let file = SummaryFile {
            summary: reports::generate_summary(&outcome.records, &outcome.aggregates.ranking),
            load: &outcome.load_report,
            ranking: &outcome.aggregates.ranking,
        };
        output::write_json(path, &file)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Summary saved to {}", path.display());
    }

    if cli.delete_input {
        std::fs::remove_file(&cli.input)
            .with_context(|| format!("failed to delete {}", cli.input.display()))?;
        info!(path = %cli.input.display(), "deleted input file");
    }

    if cli.preview > 0 {
        println!();
        for sheet in &outcome.document.sheets {
            output::preview_sheet(sheet, cli.preview);
        }
    }

    println!("Report saved to {}", out_path.display());
    Ok(())
}
