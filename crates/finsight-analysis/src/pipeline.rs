//! End-to-end analysis of one ticker.
//!
//! [`FinancialAnalyzer::analyze`] runs the full chain: fetch statements,
//! build the financial table, evaluate ratios, then compare with sector
//! averages and compute growth. Comparison and growth only read the ratios
//! table, so they run side by side on scoped threads.

use crate::catalog::RatioCatalog;
use crate::comparison::compare;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::grid::{DifferenceTable, GrowthTable};
use crate::growth::growth;
use crate::ratios::{RatioEngine, RatiosTable};
use crate::table::{FinancialTable, TableBuilder};
use finsight_data::{
    CompanyInfo, LineItemCatalog, SectorAverages, StatementProvider, normalize_sector,
    normalize_symbol,
};
use serde::Serialize;
use std::thread;

/// Inputs for one analysis run.
#[derive(Debug, Clone, Copy)]
pub struct AnalysisRequest<'a> {
    /// Ticker symbol.
    pub symbol: &'a str,
    /// Number of years to analyze, most recent first.
    pub years: usize,
    /// Line items to extract.
    pub line_items: &'a LineItemCatalog,
    /// Ratios to compute. Without a catalog only the financial table is built.
    pub ratios: Option<&'a RatioCatalog>,
    /// Sector averages to compare against.
    pub averages: &'a SectorAverages,
    /// Sector to compare against instead of the company's own.
    pub sector: Option<&'a str>,
}

/// Results of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Normalized ticker symbol.
    pub symbol: String,
    /// Company information, defaults when the provider had none.
    pub company: CompanyInfo,
    /// Sector key used for comparison.
    pub sector: String,
    /// Raw line items.
    pub data: FinancialTable,
    /// Ratios, when a catalog was supplied.
    pub ratios: Option<RatiosTable>,
    /// Difference from sector averages, when ratios were computed.
    pub difference: Option<DifferenceTable>,
    /// Growth, when ratios were computed over at least two years.
    pub growth: Option<GrowthTable>,
}

impl Analysis {
    /// Number of years covered.
    pub fn years(&self) -> usize {
        self.data.height()
    }
}

/// Runs analyses with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct FinancialAnalyzer {
    config: AnalysisConfig,
}

impl FinancialAnalyzer {
    /// Create an analyzer.
    pub const fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analysis settings.
    pub const fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one ticker.
    ///
    /// # Errors
    ///
    /// Fails on an invalid symbol or a year count above the configured
    /// maximum. Missing data never fails the run.
    pub fn analyze<P: StatementProvider + ?Sized>(
        &self,
        provider: &P,
        request: &AnalysisRequest<'_>,
    ) -> Result<Analysis> {
        self.config.validate_years(request.years)?;
        let symbol = normalize_symbol(request.symbol)?;

        tracing::info!(
            provider = provider.name(),
            symbol = %symbol,
            years = request.years,
            "starting analysis"
        );

        let statements = provider.fetch_statements(&symbol, self.config.max_years)?;
        let company = provider.company_info(&symbol).unwrap_or_else(|e| {
            tracing::warn!(symbol = %symbol, error = %e, "company information unavailable");
            CompanyInfo::unknown(symbol.as_str())
        });
        let sector = request
            .sector
            .map_or_else(|| company.sector_key(), normalize_sector);

        let builder = TableBuilder::new(request.line_items.clone(), self.config.clone());
        let data = builder.build(&statements, request.years)?;

        let (ratios, difference, growth_table) = match request.ratios {
            Some(catalog) => {
                let (ratios, difference, growth_table) =
                    self.derive(&data, catalog, request.averages, &sector);
                (Some(ratios), Some(difference), growth_table)
            }
            None => {
                tracing::info!(symbol = %symbol, "no ratio catalog, skipping ratio analysis");
                (None, None, None)
            }
        };

        Ok(Analysis {
            symbol,
            company,
            sector,
            data,
            ratios,
            difference,
            growth: growth_table,
        })
    }

    /// Ratios, sector differences and growth for an existing table.
    ///
    /// Growth is `None` when the table covers fewer than two years.
    pub fn derive(
        &self,
        data: &FinancialTable,
        catalog: &RatioCatalog,
        averages: &SectorAverages,
        sector: &str,
    ) -> (RatiosTable, DifferenceTable, Option<GrowthTable>) {
        for (ratio, field) in catalog.unresolved_fields(data.columns()) {
            tracing::warn!(
                symbol = data.symbol(),
                ratio = %ratio,
                field = %field,
                "ratio references a line item that is not extracted"
            );
        }

        let ratios = RatioEngine::new(catalog.clone()).evaluate(data);
        let ratio_list = catalog.names();

        let (difference, growth_table) = thread::scope(|scope| {
            let handle = (ratios.height() >= 2)
                .then(|| scope.spawn(|| growth(&ratios, &ratio_list)));
            let difference = compare(&ratios, averages, sector, &ratio_list);
            let growth_table = handle.map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            });
            (difference, growth_table)
        });

        (ratios, difference, growth_table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::period::Period;
    use approx::assert_relative_eq;
    use finsight_data::{DataError, MemoryProvider, Statement, StatementKind, TickerStatements};

    fn provider() -> MemoryProvider {
        let periods = vec!["2024".to_string(), "2023".to_string()];
        let bs = Statement::new(StatementKind::BalanceSheet, periods.clone())
            .with_line_item("Current Assets", [180.0, 150.0])
            .with_line_item("Current Liabilities", [100.0, 100.0]);
        MemoryProvider::new()
            .with_statements(TickerStatements::new("TEST").with_statement(bs))
            .with_info(CompanyInfo {
                sector: Some("Technology".into()),
                ..CompanyInfo::unknown("TEST")
            })
    }

    fn line_items() -> LineItemCatalog {
        LineItemCatalog::new(
            vec!["Current Assets".into(), "Current Liabilities".into()],
            Vec::new(),
            Vec::new(),
        )
    }

    fn analyzer() -> FinancialAnalyzer {
        FinancialAnalyzer::new(AnalysisConfig::default().with_current_year(2024))
    }

    #[test]
    fn test_full_analysis() {
        let catalog = RatioCatalog::new()
            .with_ratio("current_ratio", "Current Assets / Current Liabilities")
            .unwrap();
        let averages = SectorAverages::new().with_average("technology", "current_ratio", 1.5);
        let items = line_items();
        let request = AnalysisRequest {
            symbol: "test",
            years: 2,
            line_items: &items,
            ratios: Some(&catalog),
            averages: &averages,
            sector: None,
        };

        let analysis = analyzer().analyze(&provider(), &request).unwrap();
        assert_eq!(analysis.symbol, "TEST");
        assert_eq!(analysis.sector, "technology");
        assert_eq!(analysis.years(), 2);

        let difference = analysis.difference.unwrap();
        assert_relative_eq!(
            difference.get("current_ratio", Period::new(2024)).unwrap(),
            0.3,
            epsilon = 1e-12
        );
        let growth = analysis.growth.unwrap();
        assert_relative_eq!(
            growth.get("current_ratio", Period::new(2024)).unwrap(),
            20.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_without_catalog_only_builds_table() {
        let items = line_items();
        let averages = SectorAverages::new();
        let request = AnalysisRequest {
            symbol: "TEST",
            years: 1,
            line_items: &items,
            ratios: None,
            averages: &averages,
            sector: Some("Energy"),
        };

        let analysis = analyzer().analyze(&provider(), &request).unwrap();
        assert_eq!(analysis.sector, "energy");
        assert_eq!(analysis.data.height(), 1);
        assert!(analysis.ratios.is_none());
        assert!(analysis.difference.is_none());
        assert!(analysis.growth.is_none());
    }

    #[test]
    fn test_unknown_company_falls_back() {
        let items = line_items();
        let averages = SectorAverages::new();
        let catalog = RatioCatalog::default();
        let request = AnalysisRequest {
            symbol: "NOPE",
            years: 1,
            line_items: &items,
            ratios: Some(&catalog),
            averages: &averages,
            sector: None,
        };

        let analysis = analyzer().analyze(&provider(), &request).unwrap();
        assert_eq!(analysis.company, CompanyInfo::unknown("NOPE"));
        assert_eq!(analysis.sector, "n/a");
        assert!(analysis.growth.is_none());
        let ratios = analysis.ratios.unwrap();
        assert!(ratios.rows().iter().flatten().all(Option::is_none));
    }

    #[test]
    fn test_request_errors() {
        let items = line_items();
        let averages = SectorAverages::new();
        let mut request = AnalysisRequest {
            symbol: "TEST",
            years: 9,
            line_items: &items,
            ratios: None,
            averages: &averages,
            sector: None,
        };
        assert!(matches!(
            analyzer().analyze(&provider(), &request),
            Err(AnalysisError::InputBounds { requested: 9, .. })
        ));

        request.years = 1;
        request.symbol = "  ";
        assert!(matches!(
            analyzer().analyze(&provider(), &request),
            Err(AnalysisError::Data(DataError::InvalidSymbol(_)))
        ));
    }
}
