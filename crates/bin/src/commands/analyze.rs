//! The `analyze` subcommand.

use clap::Args;
use finsight::Sector;
use finsight_analysis::{
    Analysis, AnalysisConfig, AnalysisRequest, FinancialAnalyzer, MAX_YEARS_REQUEST, Period,
    RatioCatalog, default_label,
};
use finsight_data::{DirectoryProvider, LineItemCatalog, SectorAverages, StatementProvider};
use finsight_output::{
    ExportFormat, FinancialReport, Report, export_analysis, export_statements,
};
use indicatif::style::TemplateError;
use indicatif::{ProgressBar, ProgressStyle};
use std::error::Error;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub(crate) struct AnalyzeArgs {
    /// Ticker symbols
    #[arg(required = true)]
    pub(crate) symbols: Vec<String>,

    /// Directory holding one folder of statement CSVs per symbol
    #[arg(long, default_value = "data")]
    pub(crate) data_dir: PathBuf,

    /// Number of years to analyze
    #[arg(long, default_value_t = MAX_YEARS_REQUEST)]
    pub(crate) years: usize,

    /// Fiscal year of the most recent period (defaults to the current year)
    #[arg(long)]
    pub(crate) current_year: Option<i32>,

    /// Line-item catalog (CSV with balance_sheet, income_statement, cash_flow columns)
    #[arg(long)]
    pub(crate) line_items: Option<PathBuf>,

    /// Ratio catalog (JSON); the standard ratios when omitted
    #[arg(long)]
    pub(crate) ratios: Option<PathBuf>,

    /// Sector averages (CSV with a `ratios` column and one column per sector)
    #[arg(long)]
    pub(crate) averages: Option<PathBuf>,

    /// Compare against this sector instead of the company's own
    #[arg(long)]
    pub(crate) sector: Option<String>,

    /// Export the tables: csv, json, pretty-json or xlsx
    #[arg(long)]
    pub(crate) export: Option<String>,

    /// Also export the raw statements, in the --export format or csv
    #[arg(long)]
    pub(crate) export_statements: bool,

    /// Directory for exported tables and reports
    #[arg(long, default_value = "data_output")]
    pub(crate) output_dir: PathBuf,

    /// Write a Markdown report per symbol
    #[arg(long)]
    pub(crate) report: bool,

    /// Write a JSON report per symbol
    #[arg(long)]
    pub(crate) json_report: bool,
}

pub(crate) fn run(args: &AnalyzeArgs) -> Result<(), Box<dyn Error>> {
    let format = args
        .export
        .as_deref()
        .map(str::parse::<ExportFormat>)
        .transpose()?;

    let mut config = AnalysisConfig::default();
    if let Some(year) = args.current_year {
        config = config.with_current_year(year);
    }
    config.validate_years(args.years)?;

    let line_items = match &args.line_items {
        Some(path) => LineItemCatalog::load(path)?,
        None => LineItemCatalog::default(),
    };
    let catalog = load_ratio_catalog(args.ratios.as_deref());
    let averages = match &args.averages {
        Some(path) => SectorAverages::load(path)?,
        None => {
            tracing::info!("no sector averages given, comparison will be empty");
            SectorAverages::new()
        }
    };

    let provider = DirectoryProvider::new(&args.data_dir);
    let analyzer = FinancialAnalyzer::new(config);
    let progress = if args.symbols.len() > 1 {
        Some(progress_bar(args.symbols.len())?)
    } else {
        None
    };

    let mut failures = 0;
    for symbol in &args.symbols {
        if let Some(pb) = &progress {
            pb.set_message(symbol.clone());
        }

        let request = AnalysisRequest {
            symbol,
            years: args.years,
            line_items: &line_items,
            ratios: catalog.as_ref(),
            averages: &averages,
            sector: args.sector.as_deref(),
        };

        let outcome = analyzer
            .analyze(&provider, &request)
            .map_err(Box::<dyn Error>::from)
            .and_then(|analysis| {
                let written =
                    write_outputs(&analysis, &provider, args, format, catalog.as_ref())?;
                Ok((analysis, written))
            });

        match outcome {
            Ok((analysis, written)) => {
                match &progress {
                    Some(pb) => pb.println(summary_line(&analysis, written.len())),
                    None => print_analysis(&analysis, catalog.as_ref(), &written),
                }
            }
            Err(e) => {
                failures += 1;
                tracing::error!(symbol = %symbol, error = %e, "analysis failed");
                match &progress {
                    Some(pb) => pb.println(format!("{symbol}: {e}")),
                    None => eprintln!("{symbol}: {e}"),
                }
            }
        }

        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }

    if let Some(pb) = progress {
        pb.finish_with_message("done");
    }

    if failures == args.symbols.len() {
        return Err(format!("all {failures} analyses failed").into());
    }
    Ok(())
}

/// Load the ratio catalog. A catalog that cannot be loaded disables the
/// ratio stage but not the run.
fn load_ratio_catalog(path: Option<&Path>) -> Option<RatioCatalog> {
    let Some(path) = path else {
        return Some(RatioCatalog::default());
    };
    match RatioCatalog::load(path) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "ratio catalog unusable");
            eprintln!("Warning: {e}; continuing with raw data only");
            None
        }
    }
}

fn progress_bar(len: usize) -> Result<ProgressBar, TemplateError> {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    Ok(pb)
}

/// Write every requested file for one analysis. Any failure fails only this
/// symbol.
fn write_outputs<P: StatementProvider>(
    analysis: &Analysis,
    provider: &P,
    args: &AnalyzeArgs,
    format: Option<ExportFormat>,
    catalog: Option<&RatioCatalog>,
) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    let mut written = Vec::new();

    if let Some(format) = format {
        written.extend(export_analysis(analysis, &args.output_dir, format)?);
    }

    if args.export_statements {
        let statements = provider.fetch_statements(&analysis.symbol, args.years)?;
        let format = format.unwrap_or(ExportFormat::Csv);
        written.extend(export_statements(&statements, &args.output_dir, format)?);
    }

    if args.report || args.json_report {
        std::fs::create_dir_all(&args.output_dir)?;
    }

    if args.report {
        let path = args
            .output_dir
            .join(format!("{}_report.md", analysis.symbol));
        let mut report = FinancialReport::new(analysis);
        if let Some(catalog) = catalog {
            report = report.with_catalog(catalog);
        }
        report.write_to(&path)?;
        written.push(path);
    }

    if args.json_report {
        let path = args
            .output_dir
            .join(format!("{}_report.json", analysis.symbol));
        Report::from_analysis(analysis)?.write_json(&path)?;
        written.push(path);
    }

    Ok(written)
}

fn summary_line(analysis: &Analysis, files: usize) -> String {
    let (computed, total) = analysis.ratios.as_ref().map_or((0, 0), |ratios| {
        let cells = ratios.rows().iter().flatten();
        (
            cells.clone().filter(|v| v.is_some()).count(),
            cells.count(),
        )
    });
    format!(
        "{}: {} years, {computed}/{total} ratio values, {files} files written",
        analysis.symbol,
        analysis.years()
    )
}

fn print_analysis(analysis: &Analysis, catalog: Option<&RatioCatalog>, written: &[PathBuf]) {
    let label = |ratio: &str| catalog.map_or_else(|| default_label(ratio), |c| c.label(ratio));

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!(
        "║{:^62}║",
        format!("FINANCIAL ANALYSIS: {}", analysis.symbol)
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Company:  {}", analysis.company.display_name());
    match Sector::from_key(&analysis.sector) {
        Some(sector) => println!("Sector:   {} (GICS {})", sector, sector.gics_code()),
        None => println!("Sector:   {}", analysis.sector),
    }
    println!("Years:    {}", analysis.years());
    println!(
        "Missing:  {} of {} datapoints",
        analysis.data.missing_count(),
        analysis.data.height() * analysis.data.width()
    );

    match &analysis.ratios {
        Some(ratios) => {
            let rows: Vec<(String, Vec<Option<f64>>)> = ratios
                .ratios()
                .iter()
                .map(|r| (label(r.as_str()), ratios.series(r).unwrap_or_default()))
                .collect();
            print_grid("RATIOS", ratios.periods(), &rows, 3, "");
        }
        None => println!("\nRatios were not computed."),
    }

    if let Some(difference) = &analysis.difference {
        let rows: Vec<(String, Vec<Option<f64>>)> = difference
            .ratios()
            .iter()
            .zip(difference.rows())
            .map(|(r, row)| (label(r.as_str()), row.clone()))
            .collect();
        print_grid("DIFFERENCE FROM SECTOR AVERAGE", difference.periods(), &rows, 3, "");
    }

    if let Some(growth) = analysis.growth.as_ref().filter(|g| !g.is_empty()) {
        let rows: Vec<(String, Vec<Option<f64>>)> = growth
            .ratios()
            .iter()
            .zip(growth.rows())
            .map(|(r, row)| (label(r.as_str()), row.clone()))
            .collect();
        print_grid("GROWTH", growth.periods(), &rows, 2, "%");
    }

    if !written.is_empty() {
        println!("\nFiles written:");
        for path in written {
            println!("  {}", path.display());
        }
    }
    println!();
}

fn print_grid(
    title: &str,
    periods: &[Period],
    rows: &[(String, Vec<Option<f64>>)],
    decimals: usize,
    suffix: &str,
) {
    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    print!("{:<24}", "");
    for period in periods {
        print!("{:>12}", period.to_string());
    }
    println!();

    for (label, values) in rows {
        print!("{label:<24}");
        for value in values {
            let cell = value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}{suffix}"));
            print!("{cell:>12}");
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn args(root: &Path, symbols: &[&str]) -> AnalyzeArgs {
        AnalyzeArgs {
            symbols: symbols.iter().map(|s| (*s).to_string()).collect(),
            data_dir: root.join("data"),
            years: 2,
            current_year: Some(2024),
            line_items: None,
            ratios: None,
            averages: None,
            sector: None,
            export: Some("csv".to_string()),
            export_statements: false,
            output_dir: root.join("out"),
            report: true,
            json_report: true,
        }
    }

    fn write_company(root: &Path, symbol: &str) {
        let dir = root.join("data").join(symbol);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("balance_sheet.csv"),
            ",2024-12-31,2023-12-31\nCurrent Assets,180,150\nCurrent Liabilities,100,100\n",
        )
        .unwrap();
    }

    #[test]
    fn test_analyze_writes_outputs() {
        let root = TempDir::new().unwrap();
        write_company(root.path(), "ACME");

        run(&args(root.path(), &["acme"])).unwrap();

        let out = root.path().join("out");
        for name in [
            "ACME_data_analysis.csv",
            "ACME_ratios_analysis.csv",
            "ACME_difference_analysis.csv",
            "ACME_growth_analysis.csv",
            "ACME_report.md",
            "ACME_report.json",
        ] {
            assert!(out.join(name).exists(), "missing {name}");
        }
    }

    #[test]
    fn test_batch_survives_bad_symbol() {
        let root = TempDir::new().unwrap();
        write_company(root.path(), "ACME");

        let mut args = args(root.path(), &["ACME", "  "]);
        args.report = false;
        args.json_report = false;
        run(&args).unwrap();
        assert!(root.path().join("out/ACME_data_analysis.csv").exists());

        let only_bad = AnalyzeArgs {
            symbols: vec![" ".to_string()],
            ..args
        };
        assert!(run(&only_bad).is_err());
    }

    #[test]
    fn test_bad_ratio_catalog_keeps_raw_data() {
        let root = TempDir::new().unwrap();
        write_company(root.path(), "ACME");
        let catalog = root.path().join("ratios.json");
        fs::write(&catalog, "{ not json").unwrap();

        let mut args = args(root.path(), &["ACME"]);
        args.ratios = Some(catalog);
        args.report = false;
        args.json_report = false;
        run(&args).unwrap();

        let out = root.path().join("out");
        assert!(out.join("ACME_data_analysis.csv").exists());
        assert!(!out.join("ACME_ratios_analysis.csv").exists());
    }

    #[test]
    fn test_batch_survives_write_failure() {
        let root = TempDir::new().unwrap();
        write_company(root.path(), "ACME");
        write_company(root.path(), "BETA");
        // A directory where the report file should go makes the write fail.
        fs::create_dir_all(root.path().join("out/ACME_report.md")).unwrap();

        let args = args(root.path(), &["ACME", "BETA"]);
        run(&args).unwrap();
        assert!(root.path().join("out/BETA_report.md").is_file());
        assert!(root.path().join("out/BETA_report.json").exists());

        let only_blocked = AnalyzeArgs {
            symbols: vec!["ACME".to_string()],
            ..args
        };
        assert!(run(&only_blocked).is_err());
    }

    #[test]
    fn test_export_workbook_and_statements() {
        let root = TempDir::new().unwrap();
        write_company(root.path(), "ACME");

        let mut args = args(root.path(), &["ACME"]);
        args.export = Some("xlsx".to_string());
        args.export_statements = true;
        args.report = false;
        args.json_report = false;
        run(&args).unwrap();

        let out = root.path().join("out");
        assert!(out.join("ACME_data_analysis.xlsx").is_file());
        assert!(out.join("ACME_statements.xlsx").is_file());
        assert!(!out.join("ACME_data_analysis.csv").exists());
    }

    #[test]
    fn test_statements_default_to_csv() {
        let root = TempDir::new().unwrap();
        write_company(root.path(), "ACME");

        let mut args = args(root.path(), &["ACME"]);
        args.export = None;
        args.export_statements = true;
        run(&args).unwrap();

        let csv = fs::read_to_string(root.path().join("out/ACME_balance_sheet.csv")).unwrap();
        assert!(csv.starts_with("line_item,2024-12-31,2023-12-31\n"));
        assert!(!root.path().join("out/ACME_data_analysis.csv").exists());
    }

    #[test]
    fn test_invalid_export_format() {
        let root = TempDir::new().unwrap();
        let mut args = args(root.path(), &["ACME"]);
        args.export = Some("pdf".to_string());
        assert!(run(&args).is_err());
    }
}
