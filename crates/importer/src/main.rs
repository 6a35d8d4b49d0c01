use anyhow::{Context, Result};
use std::env;

use importer::import_file;
use utils::KeyValueStore;

fn main() -> Result<()> {
    // Usage:
    //   importer trades.csv report.xlsx ... [journal_path] [--balance N]
    //
    // Defaults:
    //   journal_path: ./journal.json
    //   balance: only written when --balance is given or the journal has none

    let args: Vec<String> = env::args().skip(1).collect();

    let mut file_paths: Vec<String> = Vec::new();
    let mut journal_path = "journal.json".to_string();
    let mut balance: Option<f64> = None;

    let mut i = 0;
    while i < args.len() {
        let a = &args[i];
        let low = a.to_lowercase();

        if a == "--balance" {
            i += 1;
            let raw = args
                .get(i)
                .context("--balance requires a value, e.g. --balance 5000")?;
            let parsed = raw
                .parse::<f64>()
                .with_context(|| format!("Invalid balance '{}'", raw))?;
            if !(parsed.is_finite() && parsed > 0.0) {
                anyhow::bail!("Initial balance must be a positive number, got '{}'", raw);
            }
            balance = Some(parsed);
        } else if low.ends_with(".csv") || low.ends_with(".xlsx") {
            file_paths.push(a.clone());
        } else {
            journal_path = a.clone();
        }
        i += 1;
    }

    if file_paths.is_empty() {
        println!("❌ No input files given (expected .csv or .xlsx paths).");
        return Ok(());
    }

    println!("📖 Importing {} file(s)", file_paths.len());

    let mut pending = Vec::new();
    let mut total_dropped = 0usize;

    for path in &file_paths {
        let bytes =
            std::fs::read(path).with_context(|| format!("Cannot read {}", path))?;
        let report =
            import_file(&bytes, path).with_context(|| format!("Failed importing {}", path))?;

        println!(
            "  • {}: {} trades parsed, {} of {} rows dropped",
            path,
            report.trades.len(),
            report.dropped_rows,
            report.total_rows
        );

        total_dropped += report.dropped_rows;
        pending.extend(report.trades);
    }

    let mut store = utils::JsonFileStore::open(&journal_path)?;
    let existing = utils::load_trades(&store);

    let (mut merged, stats) = utils::merge_trades_with_deduplication(existing, pending)?;
    utils::sort_trades_by_date(&mut merged);
    utils::save_trades(&mut store, merged);

    if let Some(b) = balance {
        utils::set_initial_balance(&mut store, b);
    } else if store.get(utils::INITIAL_BALANCE_KEY).is_none() {
        utils::set_initial_balance(&mut store, utils::DEFAULT_INITIAL_BALANCE);
    }

    let written = store.save()?;

    println!("\n📊 Summary:");
    println!(
        "✓ Trades processed: {} added, {} skipped as duplicates",
        stats.added, stats.skipped
    );
    if total_dropped > 0 {
        println!("✓ Rows dropped during parsing: {}", total_dropped);
    }
    println!("✅ Journal written to: {}", written.display());

    Ok(())
}
