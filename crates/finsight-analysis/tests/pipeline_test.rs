//! Integration tests for the analysis pipeline over in-memory statements.

use approx::assert_relative_eq;
use finsight_analysis::{
    AnalysisConfig, AnalysisError, AnalysisRequest, FinancialAnalyzer, Period, RatioCatalog,
    RatioEngine, TableBuilder,
};
use finsight_data::{
    CompanyInfo, Datum, LineItemCatalog, MemoryProvider, SectorAverages, Statement, StatementKind,
    TickerStatements,
};

fn periods(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}-06-30", 2024 - i as i32)).collect()
}

fn statements() -> TickerStatements {
    let bs = Statement::new(StatementKind::BalanceSheet, periods(3))
        .with_line_item("Total Assets", [1000.0, 800.0, 700.0])
        .with_line_item("Current Assets", [360.0, 300.0, 280.0])
        .with_line_item("Current Liabilities", [200.0, 200.0, 200.0])
        .with_line_item("Inventory", [60.0, 50.0, 40.0])
        .with_line_item("Total Debt", [250.0, 250.0, 300.0])
        .with_line_item("Stockholders Equity", [500.0, 400.0, 350.0]);
    let is = Statement::new(StatementKind::IncomeStatement, periods(3))
        .with_line_item("Total Revenue", [1200.0, 1000.0, 900.0])
        .with_line_item("Gross Profit", [480.0, 400.0, 360.0])
        .with_line_item("Net Income", [120.0, 100.0, 90.0])
        .with_line_item("EBIT", [150.0, 130.0, 110.0])
        .with_line_item(
            "Interest Expense",
            [Datum::Number(10.0), Datum::Number(0.0), Datum::Missing],
        );
    // Cash flow only reports two years.
    let cf = Statement::new(StatementKind::CashFlow, periods(2))
        .with_line_item("Operating Cash Flow", [200.0, 180.0])
        .with_line_item("Free Cash Flow", [Datum::Text("150".into()), Datum::Text("N/A".into())]);

    TickerStatements::new("ACME")
        .with_statement(bs)
        .with_statement(is)
        .with_statement(cf)
}

fn provider() -> MemoryProvider {
    MemoryProvider::new()
        .with_statements(statements())
        .with_info(CompanyInfo {
            long_name: Some("Acme Corporation".into()),
            sector: Some("Industrials".into()),
            ..CompanyInfo::unknown("ACME")
        })
}

fn config() -> AnalysisConfig {
    AnalysisConfig::default().with_current_year(2024)
}

#[test]
fn test_table_values_are_verbatim() {
    let table = TableBuilder::new(LineItemCatalog::default(), config())
        .build(&statements(), 3)
        .unwrap();

    assert_eq!(table.height(), 3);
    assert_eq!(table.get(Period::new(2024), "Total Assets"), Some(&Datum::Number(1000.0)));
    assert_eq!(table.get(Period::new(2022), "Net Income"), Some(&Datum::Number(90.0)));
    assert_eq!(
        table.get(Period::new(2024), "Free Cash Flow"),
        Some(&Datum::Text("150".into()))
    );
    // Beyond the cash flow's two periods.
    assert_eq!(table.get(Period::new(2022), "Operating Cash Flow"), Some(&Datum::Missing));
    // Never supplied.
    assert_eq!(table.get(Period::new(2024), "Basic EPS"), Some(&Datum::Missing));
    assert_eq!(table.columns(), LineItemCatalog::default().columns().as_slice());
}

#[test]
fn test_requesting_more_years_than_available() {
    let table = TableBuilder::new(LineItemCatalog::default(), config())
        .build(&statements(), 4)
        .unwrap();
    assert_eq!(table.height(), 4);
    assert!(table.rows()[3].iter().all(Datum::is_missing));
}

#[test]
fn test_standard_ratios() {
    let table = TableBuilder::new(LineItemCatalog::default(), config())
        .build(&statements(), 3)
        .unwrap();
    let ratios = RatioEngine::new(RatioCatalog::default()).evaluate(&table);
    let latest = Period::new(2024);

    assert_relative_eq!(ratios.get(latest, "current_ratio").unwrap(), 1.8);
    assert_relative_eq!(ratios.get(latest, "quick_ratio").unwrap(), 1.5);
    assert_relative_eq!(ratios.get(latest, "gross_profit").unwrap(), 0.4);
    assert_relative_eq!(ratios.get(latest, "net_profit").unwrap(), 0.1);
    assert_relative_eq!(ratios.get(latest, "roa").unwrap(), 0.12);
    assert_relative_eq!(ratios.get(latest, "roe").unwrap(), 0.24);
    assert_relative_eq!(ratios.get(latest, "asset_turnover").unwrap(), 1.2);
    assert_relative_eq!(ratios.get(latest, "debt_to_equity").unwrap(), 0.5);
    assert_relative_eq!(ratios.get(latest, "interest_cover").unwrap(), 15.0);

    // Zero and missing interest expense only affect interest cover.
    assert_eq!(ratios.get(Period::new(2023), "interest_cover"), None);
    assert_eq!(ratios.get(Period::new(2022), "interest_cover"), None);
    assert_relative_eq!(ratios.get(Period::new(2023), "roe").unwrap(), 0.25);
    assert_eq!(ratios.issues().len(), 2);
}

#[test]
fn test_similar_names_do_not_collide() {
    let bs = Statement::new(StatementKind::BalanceSheet, periods(1))
        .with_line_item("Total Assets", [200.0])
        .with_line_item("Total Assets Growth", [0.5]);
    let is = Statement::new(StatementKind::IncomeStatement, periods(1))
        .with_line_item("Net Income", [20.0]);
    let statements = TickerStatements::new("X").with_statement(bs).with_statement(is);
    let catalog = LineItemCatalog::new(
        vec!["Total Assets Growth".into(), "Total Assets".into()],
        vec!["Net Income".into()],
        Vec::new(),
    );

    let table = TableBuilder::new(catalog, config()).build(&statements, 1).unwrap();
    let ratios = RatioEngine::new(
        RatioCatalog::new()
            .with_ratio("roa", "Net Income / Total Assets")
            .unwrap()
            .with_ratio("growth_scaled", "Total Assets Growth * 100")
            .unwrap(),
    )
    .evaluate(&table);

    assert_relative_eq!(ratios.value(0, "roa").unwrap(), 0.1);
    assert_relative_eq!(ratios.value(0, "growth_scaled").unwrap(), 50.0);
}

#[test]
fn test_full_pipeline() {
    let line_items = LineItemCatalog::default();
    let catalog = RatioCatalog::default();
    let averages = SectorAverages::new()
        .with_average("industrials", "current_ratio", 1.5)
        .with_average("industrials", "roe", 0.2);
    let request = AnalysisRequest {
        symbol: "acme",
        years: 3,
        line_items: &line_items,
        ratios: Some(&catalog),
        averages: &averages,
        sector: None,
    };

    let analysis = FinancialAnalyzer::new(config())
        .analyze(&provider(), &request)
        .unwrap();
    assert_eq!(analysis.company.display_name(), "Acme Corporation");
    assert_eq!(analysis.sector, "industrials");

    let difference = analysis.difference.as_ref().unwrap();
    assert_eq!(difference.ratios(), catalog.names().as_slice());
    assert_relative_eq!(
        difference.get("current_ratio", Period::new(2024)).unwrap(),
        0.3,
        epsilon = 1e-12
    );
    assert_eq!(difference.get("quick_ratio", Period::new(2024)), None);

    let growth = analysis.growth.as_ref().unwrap();
    assert_eq!(growth.periods(), &[Period::new(2024), Period::new(2023)]);
    // current_ratio 1.8 against 1.5
    assert_relative_eq!(
        growth.get("current_ratio", Period::new(2024)).unwrap(),
        20.0,
        epsilon = 1e-9
    );
    // interest cover has no value in 2023
    assert_eq!(growth.get("interest_cover", Period::new(2024)), None);
}

#[test]
fn test_single_year_has_no_growth() {
    let line_items = LineItemCatalog::default();
    let catalog = RatioCatalog::default();
    let averages = SectorAverages::new();
    let request = AnalysisRequest {
        symbol: "ACME",
        years: 1,
        line_items: &line_items,
        ratios: Some(&catalog),
        averages: &averages,
        sector: None,
    };

    let analysis = FinancialAnalyzer::new(config())
        .analyze(&provider(), &request)
        .unwrap();
    assert!(analysis.ratios.is_some());
    assert!(analysis.growth.is_none());
}

#[test]
fn test_bad_catalog_leaves_raw_data_usable() {
    let err = RatioCatalog::from_json_str(r#"{"roe": "Net Income / "}"#).unwrap_err();
    assert!(matches!(err, AnalysisError::Formula { .. }));

    let line_items = LineItemCatalog::default();
    let averages = SectorAverages::new();
    let request = AnalysisRequest {
        symbol: "ACME",
        years: 2,
        line_items: &line_items,
        ratios: None,
        averages: &averages,
        sector: None,
    };
    let analysis = FinancialAnalyzer::new(config())
        .analyze(&provider(), &request)
        .unwrap();
    assert_eq!(analysis.data.height(), 2);
    assert!(analysis.ratios.is_none());
}
