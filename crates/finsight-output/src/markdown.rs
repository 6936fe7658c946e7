//! Markdown financial performance report.

use crate::report::ReportError;
use finsight_analysis::{Analysis, Period, RatioCatalog, default_label};
use finsight_data::Datum;
use std::path::Path;

const DISCLAIMER: &str = "This report is meant to be used for educational purposes only \
and is not meant as financial advice.";

const MISSING: &str = "-";

/// Renders an [`Analysis`] as a Markdown document.
#[derive(Debug, Clone)]
pub struct FinancialReport<'a> {
    analysis: &'a Analysis,
    catalog: Option<&'a RatioCatalog>,
    per_share_items: Vec<String>,
}

impl<'a> FinancialReport<'a> {
    /// Create a report for an analysis.
    pub fn new(analysis: &'a Analysis) -> Self {
        Self {
            analysis,
            catalog: None,
            per_share_items: vec!["Basic EPS".to_string(), "Diluted EPS".to_string()],
        }
    }

    /// Use the labels of this catalog for ratio rows.
    pub const fn with_catalog(mut self, catalog: &'a RatioCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Line items shown as-is instead of in millions.
    pub fn with_per_share_items(mut self, items: Vec<String>) -> Self {
        self.per_share_items = items;
        self
    }

    fn label(&self, ratio: &str) -> String {
        self.catalog
            .map_or_else(|| default_label(ratio), |catalog| catalog.label(ratio))
    }

    /// Render the report.
    pub fn to_markdown(&self) -> String {
        let analysis = self.analysis;
        let company = &analysis.company;
        let symbol = analysis.symbol.as_str();
        let years = analysis.years();
        let mut output = String::new();

        // Title
        output.push_str("# Financial Performance Report\n\n");
        output.push_str(&format!("_{DISCLAIMER}_\n\n"));
        output.push_str(&format!("## {}\n\n", company.display_name()));
        output.push_str(&format!("- **Symbol:** {symbol}\n"));
        output.push_str(&format!(
            "- **Sector:** {}\n",
            company.sector.as_deref().unwrap_or("Unknown Sector")
        ));
        output.push_str(&format!(
            "- **Industry:** {}\n",
            company.industry.as_deref().unwrap_or("Unknown Industry")
        ));
        output.push_str(&format!(
            "- **Website:** {}\n\n",
            company.website.as_deref().unwrap_or("N/A")
        ));
        output.push_str(&format!(
            "_Prepared using data from the last {years} years._\n\n"
        ));

        // Datapoints
        output.push_str(&format!(
            "## Notable Datapoints over the Last {years} Years\n\n"
        ));
        let data = &analysis.data;
        let rows = data.columns().iter().enumerate().map(|(col, name)| {
            let per_share = self.per_share_items.iter().any(|item| item == name);
            let cells = data
                .rows()
                .iter()
                .map(|row| format_datum(row.get(col), per_share))
                .collect();
            (name.clone(), cells)
        });
        push_table(&mut output, "Line Item", data.periods(), rows);
        output.push_str(
            "Numbers are displayed in millions where applicable, except for per-share items.\n\n",
        );

        // Ratios
        output.push_str(&format!("## Ratios for {symbol}\n\n"));
        match &analysis.ratios {
            Some(ratios) => {
                output.push_str(&format!(
                    "Calculated ratios for {symbol} over the last {years} years.\n\n"
                ));
                let rows = ratios.ratios().iter().map(|ratio| {
                    let cells = ratios
                        .series(ratio)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|v| format_value(v, 3, ""))
                        .collect();
                    (self.label(ratio), cells)
                });
                push_table(&mut output, "Ratio", ratios.periods(), rows);
            }
            None => output.push_str("Ratios were not computed.\n\n"),
        }

        // Sector comparison
        if let Some(difference) = &analysis.difference {
            output.push_str(&format!("## {symbol} Compared to Sector Averages\n\n"));
            output.push_str(&format!(
                "Ratios compared to the `{}` sector averages. A positive value means the ratio \
                 was above the sector average.\n\n",
                analysis.sector
            ));
            let rows = difference.ratios().iter().zip(difference.rows()).map(|(ratio, row)| {
                let cells = row.iter().map(|v| format_value(*v, 3, "")).collect();
                (self.label(ratio), cells)
            });
            push_table(&mut output, "Ratio", difference.periods(), rows);
        }

        // Growth
        if analysis.ratios.is_some() {
            output.push_str(&format!("## Growth Rates for {symbol}\n\n"));
            match analysis.growth.as_ref().filter(|g| !g.is_empty()) {
                Some(growth) => {
                    output.push_str(
                        "Year-over-year growth of each ratio, in percent. Each column compares \
                         a year with the year before it.\n\n",
                    );
                    let rows = growth.ratios().iter().zip(growth.rows()).map(|(ratio, row)| {
                        let cells = row.iter().map(|v| format_value(*v, 2, "%")).collect();
                        (self.label(ratio), cells)
                    });
                    push_table(&mut output, "Ratio", growth.periods(), rows);
                }
                None => output.push_str("Growth needs at least two years of data.\n\n"),
            }
        }

        // Appendix
        output.push_str("## Appendix\n\n");
        output.push_str("### Additional Disclaimers and Notes\n\n");
        output.push_str(
            "This report is based on data obtained from third-party sources and is for \
             educational purposes only.\n\n",
        );
        output.push_str(
            "For full financial statements and further analysis, refer to the official \
             filings of the company.\n\n",
        );
        output.push_str(&format!("Missing values are shown as `{MISSING}`.\n"));

        output
    }

    /// Write the Markdown report to a file.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_markdown())?;
        Ok(())
    }
}

fn push_table(
    output: &mut String,
    corner: &str,
    periods: &[Period],
    rows: impl Iterator<Item = (String, Vec<String>)>,
) {
    output.push_str(&format!("| {corner} |"));
    for period in periods {
        output.push_str(&format!(" {period} |"));
    }
    output.push_str("\n|---|");
    for _ in periods {
        output.push_str("---:|");
    }
    output.push('\n');

    for (label, cells) in rows {
        output.push_str(&format!("| {label} |"));
        for cell in cells {
            output.push_str(&format!(" {cell} |"));
        }
        output.push('\n');
    }
    output.push('\n');
}

fn format_value(value: Option<f64>, decimals: usize, suffix: &str) -> String {
    value.map_or_else(
        || MISSING.to_string(),
        |v| format!("{v:.decimals$}{suffix}"),
    )
}

fn format_datum(datum: Option<&Datum>, per_share: bool) -> String {
    let Some(datum) = datum else {
        return MISSING.to_string();
    };
    match (datum.coerce(), datum) {
        (None, Datum::Text(text)) => text.clone(),
        (value, _) if per_share => format_value(value, 2, ""),
        (value, _) => format_value(value.map(|v| v / 1_000_000.0), 2, ""),
    }
}
