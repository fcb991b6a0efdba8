use crate::error::CliError;
use engine_config::report::summary::RunSummary;
use engine_core::progress::ProgressStatus;
use model::geo::GridCell;
use serde::Serialize;

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_summary(summary: &RunSummary, as_json: bool) -> Result<(), CliError> {
    if as_json {
        return print_json(summary);
    }

    println!("Crawl {}:", summary.outcome);
    println!("-----------------------------");
    println!(
        "{:<20} {}/{}",
        "Cells completed", summary.cells_completed, summary.cells_total
    );
    println!("{:<20} {}", "Cells visited", summary.cells_visited);
    println!("{:<20} {}", "Pages fetched", summary.pages_fetched);
    println!("{:<20} {}", "Items fetched", summary.items_fetched);
    println!(
        "{:<20} {} ({} new, {} updated)",
        "Records upserted", summary.records_upserted, summary.inserted, summary.updated
    );
    println!("{:<20} {}", "Records total", summary.records_processed);
    println!("{:<20} {}", "Invalid items", summary.skipped_validation);
    println!("{:<20} {}", "Store failures", summary.skipped_store);
    println!("{:<20} {:.1}s", "Elapsed", summary.elapsed_ms as f64 / 1000.0);
    Ok(())
}

pub fn print_progress(location: &str, status: &ProgressStatus, as_json: bool) -> Result<(), CliError> {
    if as_json {
        return print_json(status);
    }

    println!("Progress ({location}):");
    println!("-----------------------------");
    println!("{:<16} {}", "Stage", status.stage);
    println!("{:<16} {}", "Grid size", status.grid_size);
    println!(
        "{:<16} {}/{} ({:.1}%)",
        "Cells done",
        status.cells_completed,
        status.cells_total,
        status.percent()
    );
    let current = status
        .current_cell
        .map(|cell| format!("{cell} (page {})", status.current_page))
        .unwrap_or_else(|| "n/a".to_string());
    println!("{:<16} {}", "Current cell", current);
    println!("{:<16} {}", "Records", status.total_records_processed);
    Ok(())
}

pub fn print_cells(cells: &[GridCell], as_json: bool) -> Result<(), CliError> {
    if as_json {
        return print_json(&cells);
    }

    println!("{:<8} {:>10} {:>10} {:>10} {:>10}", "cell", "west", "south", "east", "north");
    for cell in cells {
        println!(
            "{:<8} {:>10.4} {:>10.4} {:>10.4} {:>10.4}",
            cell.id.to_string(),
            cell.region.west,
            cell.region.south,
            cell.region.east,
            cell.region.north
        );
    }
    Ok(())
}
