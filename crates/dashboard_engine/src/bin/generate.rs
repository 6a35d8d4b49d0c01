use anyhow::{Context, Result};
use dashboard_engine::{generate_dashboard, write_dashboard_json};
use models::Trade;
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();

    let flag = |name: &str, default: &str| -> String {
        args.iter()
            .position(|a| a == name)
            .and_then(|i| args.get(i + 1).cloned())
            .unwrap_or_else(|| default.to_string())
    };

    let journal = PathBuf::from(flag("--journal", "journal.json"));
    let out_path = PathBuf::from(flag("--out", "dashboard/dashboard.json"));

    println!(
        "Generating dashboard...\n  journal: {}\n  output : {}",
        journal.display(),
        out_path.display()
    );

    let store = utils::JsonFileStore::open(&journal)?;
    let records = utils::load_trades(&store);

    let mut trades: Vec<Trade> = Vec::new();
    for record in &records {
        let trade: Trade = serde_json::from_value(record.clone())
            .with_context(|| format!("Invalid trade record in {}", store.path().display()))?;
        trades.push(trade);
    }

    let balance = utils::initial_balance(&store);

    let dashboard = generate_dashboard(&trades, balance);
    write_dashboard_json(&dashboard, &out_path).context("write dashboard.json")?;

    println!(
        "Done. {} trades, generated at {}",
        dashboard.metadata.trade_count, dashboard.metadata.generated_at
    );
    Ok(())
}
