//! Sector comparison.

use crate::grid::{DifferenceTable, RatioGrid};
use crate::ratios::RatiosTable;
use finsight_data::SectorAverages;

/// Subtract sector averages from company ratios.
///
/// Rows follow `ratio_list`, columns follow the periods of `ratios`. A cell is
/// missing when the company value or the sector average is unavailable, or
/// the sector itself is unknown.
pub fn compare(
    ratios: &RatiosTable,
    averages: &SectorAverages,
    sector: &str,
    ratio_list: &[String],
) -> DifferenceTable {
    let mut table = RatioGrid::new(ratio_list.to_vec(), ratios.periods().to_vec());

    if !averages.has_sector(sector) {
        tracing::warn!(sector, "no sector averages, comparison will be empty");
        return table;
    }

    for (r, ratio) in ratio_list.iter().enumerate() {
        let Some(average) = averages.get(sector, ratio) else {
            tracing::warn!(sector, ratio = %ratio, "no sector average for ratio");
            continue;
        };
        for (p, period) in ratios.periods().iter().enumerate() {
            match ratios.value(p, ratio) {
                Some(value) => table.set(r, p, Some(value - average)),
                None => tracing::debug!(
                    sector,
                    ratio = %ratio,
                    period = %period,
                    "company ratio missing, no difference"
                ),
            }
        }
    }

    table
}
