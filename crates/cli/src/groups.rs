//! `twin groups`: per-group pair reports from a roster and the stored preferences.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::Serialize;
use twin_config::ExportFormat;
use twin_io::{export_csv, export_xlsx};
use twin_recon::model::ReportSummary;
use twin_recon::{build_reports, GroupReport};

use crate::exit_codes::EXIT_EXPORT;
use crate::util::{export_style, load_roster, load_settings, open_store, print_json};
use crate::{CliError, GlobalArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Xlsx,
    Csv,
}

impl From<FormatArg> for ExportFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Xlsx => ExportFormat::Xlsx,
            FormatArg::Csv => ExportFormat::Csv,
        }
    }
}

pub struct GroupsArgs {
    pub roster: PathBuf,
    pub store: Option<PathBuf>,
    pub group: Option<String>,
    pub out: Option<PathBuf>,
    pub format: Option<FormatArg>,
    pub json: bool,
}

#[derive(Serialize)]
struct GroupOutput<'a> {
    #[serde(flatten)]
    report: &'a GroupReport,
    summary: ReportSummary,
}

pub fn cmd_groups(global: &GlobalArgs, args: GroupsArgs) -> Result<(), CliError> {
    let settings = load_settings(global.config.as_deref())?;
    let (students, _) = load_roster(&args.roster, args.group.as_deref(), &settings)?;
    let store = open_store(args.store, &settings)?;

    let edges = store.preferences().edges();
    let reports = build_reports(&students, &edges);

    // --json alone only prints; add --out to also write the export.
    if !args.json || args.out.is_some() {
        let format = args.format.map(ExportFormat::from).unwrap_or(settings.export.format);
        let out = args.out.unwrap_or_else(|| match format {
            ExportFormat::Xlsx => PathBuf::from("twin.xlsx"),
            ExportFormat::Csv => PathBuf::from("twin"),
        });
        let style = export_style(&settings);
        let summary = match format {
            ExportFormat::Xlsx => export_xlsx(&reports, &out, &style),
            ExportFormat::Csv => export_csv(&reports, &out, &style),
        }
        .map_err(|e| CliError::new(EXIT_EXPORT, e.to_string()))?;

        eprintln!(
            "wrote {} groups ({} rows) to {}",
            summary.groups,
            summary.rows,
            out.display()
        );
    }

    if args.json {
        let output: Vec<GroupOutput> = reports
            .iter()
            .map(|report| GroupOutput {
                report,
                summary: report.summary(),
            })
            .collect();
        print_json(&output)?;
    } else {
        for report in &reports {
            let s = report.summary();
            eprintln!(
                "{}: {} pairs, {} mismatched pairs, {} singles",
                report.group, s.matched_pairs, s.mismatched_pairs, s.singles
            );
        }
    }
    Ok(())
}
