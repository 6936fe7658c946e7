//! In-memory statement provider.

use super::{CompanyInfo, StatementProvider, normalize_symbol};
use crate::error::{DataError, Result};
use crate::statement::{Statement, StatementKind, TickerStatements};
use std::collections::HashMap;

/// Provider serving statements held in memory.
///
/// Useful for embedding the analysis in another program that already has the
/// statements, and for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    statements: HashMap<String, TickerStatements>,
    info: HashMap<String, CompanyInfo>,
}

impl MemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register statements under their symbol.
    pub fn insert(&mut self, statements: TickerStatements) {
        let key = statements.symbol.trim().to_uppercase();
        self.statements.insert(key, statements);
    }

    /// Register company information under its symbol.
    pub fn insert_info(&mut self, info: CompanyInfo) {
        let key = info.symbol.trim().to_uppercase();
        self.info.insert(key, info);
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_statements(mut self, statements: TickerStatements) -> Self {
        self.insert(statements);
        self
    }

    /// Builder-style [`insert_info`](Self::insert_info).
    pub fn with_info(mut self, info: CompanyInfo) -> Self {
        self.insert_info(info);
        self
    }
}

impl StatementProvider for MemoryProvider {
    fn name(&self) -> &str {
        "memory"
    }

    fn statement(&self, symbol: &str, kind: StatementKind) -> Result<Statement> {
        let symbol = normalize_symbol(symbol)?;
        self.statements
            .get(&symbol)
            .and_then(|s| s.get(kind))
            .cloned()
            .ok_or_else(|| DataError::StatementUnavailable {
                symbol,
                kind,
                reason: "not loaded".to_string(),
            })
    }

    fn company_info(&self, symbol: &str) -> Result<CompanyInfo> {
        let symbol = normalize_symbol(symbol)?;
        self.info
            .get(&symbol)
            .cloned()
            .ok_or_else(|| DataError::MissingData {
                symbol,
                reason: "no company information".to_string(),
            })
    }
}
