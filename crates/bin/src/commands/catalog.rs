//! The `ratios` and `sectors` listing subcommands.

use finsight::Sector;
use finsight_analysis::RatioCatalog;
use finsight_data::SectorAverages;
use std::error::Error;
use std::path::Path;

pub(crate) fn list_ratios(path: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let catalog = path.map_or_else(|| Ok(RatioCatalog::default()), RatioCatalog::load)?;

    println!("\nRatios ({}):", catalog.len());
    println!("{}", "=".repeat(80));
    for ratio in &catalog {
        match &ratio.formula {
            Ok(formula) => println!("{:<20} {:<28} {formula}", ratio.name, ratio.label),
            Err(e) => println!(
                "{:<20} {:<28} {}  [invalid: {e}]",
                ratio.name, ratio.label, ratio.source
            ),
        }
    }

    Ok(())
}

pub(crate) fn list_sectors(averages: Option<&Path>) -> Result<(), Box<dyn Error>> {
    let averages = averages.map(SectorAverages::load).transpose()?;

    println!("\nSectors:");
    println!("{}", "=".repeat(60));
    for sector in Sector::all() {
        let coverage = match &averages {
            Some(a) if a.has_sector(sector.key()) => "  [averages]",
            Some(_) => "  [no averages]",
            None => "",
        };
        println!(
            "{:>2} - {:<24} key: {}{coverage}",
            sector.gics_code(),
            sector.name(),
            sector.key()
        );
    }

    if let Some(averages) = &averages {
        let other: Vec<&str> = averages
            .sectors()
            .filter(|key| Sector::from_key(key).is_none())
            .collect();
        if !other.is_empty() {
            println!("\nOther sectors in the averages file: {}", other.join(", "));
        }
        println!("Ratios with averages: {}", averages.ratios().join(", "));
    }

    Ok(())
}
