//! Console summary of a finished crawl

use crate::crawler::CrawlReport;

/// Prints the run tally to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The finished crawl
pub fn print_summary(report: &CrawlReport) {
    let tally = &report.tally;

    println!("=== Crawl Summary ===\n");

    println!("Overview:");
    println!("  Pages attempted: {}", tally.pages_attempted);
    println!("  Pages fetched: {}", tally.pages_fetched);
    println!("  Pages skipped: {}", tally.pages_skipped);
    println!("  Tables skipped: {}", tally.tables_skipped);
    println!("  Records produced: {}", tally.records_produced);
    println!(
        "  Duration: {:.1}s",
        report.duration().num_milliseconds() as f64 / 1000.0
    );
    println!();

    if !tally.failures.is_empty() {
        println!("Page Failures ({}):", tally.failures.len());
        for failure in &tally.failures {
            println!("  - {}: {}", failure.url, failure.cause);
        }
        println!();
    }

    if !tally.table_skips.is_empty() {
        println!("Skipped Tables ({}):", tally.table_skips.len());
        for entry in &tally.table_skips {
            println!(
                "  - {} [table #{}{}]: {}",
                entry.page_url,
                entry.skip.index,
                entry
                    .skip
                    .table_id
                    .as_deref()
                    .map(|id| format!(" id={}", id))
                    .unwrap_or_default(),
                entry.skip.reason
            );
        }
        println!();
    }

    let success_rate = if tally.pages_attempted > 0 {
        (tally.pages_fetched as f64 / tally.pages_attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages fetched)",
        success_rate, tally.pages_fetched, tally.pages_attempted
    );
}
