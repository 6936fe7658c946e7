//! Year-over-year growth.

use crate::grid::{GrowthTable, RatioGrid};
use crate::ratios::RatiosTable;

/// Percent change from `older` to `newer`. `None` when `older` is zero.
pub fn percent_change(newer: f64, older: f64) -> Option<f64> {
    if older == 0.0 {
        return None;
    }
    let change = (newer - older) / older * 100.0;
    change.is_finite().then_some(change)
}

/// Growth of each ratio between adjacent periods.
///
/// Each column compares a period with the one before it and is labelled by
/// the newer period; the older value is the base. With fewer than two
/// periods the result is empty.
pub fn growth(ratios: &RatiosTable, ratio_list: &[String]) -> GrowthTable {
    let periods = ratios.periods();
    if periods.len() < 2 {
        tracing::debug!(periods = periods.len(), "not enough periods for growth");
        return GrowthTable::default();
    }

    let labels = periods[..periods.len() - 1].to_vec();
    let mut table = RatioGrid::new(ratio_list.to_vec(), labels);

    for (r, ratio) in ratio_list.iter().enumerate() {
        for (p, period) in periods.iter().enumerate().take(periods.len() - 1) {
            let newer = ratios.value(p, ratio);
            let older = ratios.value(p + 1, ratio);
            let cell = match (newer, older) {
                (Some(newer), Some(older)) => {
                    let change = percent_change(newer, older);
                    if change.is_none() {
                        tracing::warn!(
                            ratio = %ratio,
                            period = %period,
                            "zero base value, growth undefined"
                        );
                    }
                    change
                }
                _ => {
                    tracing::debug!(ratio = %ratio, period = %period, "ratio missing, no growth");
                    None
                }
            };
            table.set(r, p, cell);
        }
    }

    table
}
