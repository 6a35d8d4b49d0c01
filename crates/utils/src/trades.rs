use anyhow::{anyhow, Result};
use models::Trade;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Statistics about a trade merge operation
#[derive(Debug, Clone)]
pub struct MergeStats {
    pub added: usize,
    pub skipped: usize,
    pub total: usize,
}

impl MergeStats {
    pub fn has_duplicates(&self) -> bool {
        self.skipped > 0
    }
}

/// Merges freshly imported trades into the stored journal records with
/// duplicate detection. Two trades are duplicates when `date`, `symbol`,
/// `side`, `entry`, `exit` and `size` all match exactly; duplicates are
/// skipped, never updated. New records get a `trade_id` derived from that
/// same signature.
pub fn merge_trades_with_deduplication(
    mut existing: Vec<Value>,
    new_trades: Vec<Trade>,
) -> Result<(Vec<Value>, MergeStats)> {
    let existing_keys: HashSet<String> = existing.iter().filter_map(trade_signature).collect();

    let mut stats = MergeStats {
        added: 0,
        skipped: 0,
        total: new_trades.len(),
    };

    for trade in new_trades {
        let mut record = serde_json::to_value(&trade)?;
        let key = trade_signature(&record)
            .ok_or_else(|| anyhow!("Imported trade is missing signature fields"))?;

        if existing_keys.contains(&key) {
            stats.skipped += 1;
            continue;
        }

        record
            .as_object_mut()
            .ok_or_else(|| anyhow!("Trade did not serialize to an object"))?
            .insert("trade_id".to_string(), Value::String(make_trade_id(&key)));

        existing.push(record);
        stats.added += 1;
    }

    Ok((existing, stats))
}

/// Six-field duplicate-detection key of a stored trade record. Records
/// missing any of the fields have no signature.
pub fn trade_signature(record: &Value) -> Option<String> {
    let date = record.get("date")?.as_str()?;
    let symbol = record.get("symbol")?.as_str()?;
    let side = record.get("side")?.as_str()?;
    let entry = record.get("entry")?.as_f64()?;
    let exit = record.get("exit")?.as_f64()?;
    let size = record.get("size")?.as_f64()?;

    Some(format!(
        "{}|{}|{}|{}|{}|{}",
        date, symbol, side, entry, exit, size
    ))
}

/// Sort stored trades in-place by `date` ascending.
///
/// Sorting is stable. Records with a missing/non-string `date` are placed at
/// the end, preserving their relative order.
pub fn sort_trades_by_date(trades: &mut [Value]) {
    trades.sort_by(|a, b| {
        let da = a.get("date").and_then(|v| v.as_str());
        let db = b.get("date").and_then(|v| v.as_str());

        match (da, db) {
            (Some(left), Some(right)) => left.cmp(right),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        }
    });
}

fn make_trade_id(signature: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(signature.as_bytes());
    let hash = hasher.finalize();

    format!("TRADE-{}", hex::encode(&hash[..12]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use models::Side;
    use serde_json::json;

    fn sample_trade(symbol: &str, entry: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2023, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Trade {
            date,
            date_closed: date,
            symbol: symbol.to_string(),
            side: Side::Buy,
            size: 1.0,
            entry,
            exit: entry + 1.0,
            sl: None,
            pl: 1.0,
            commission: 0.0,
            swap: 0.0,
        }
    }

    #[test]
    fn test_merge_with_no_duplicates() {
        let (merged, stats) = merge_trades_with_deduplication(
            vec![],
            vec![sample_trade("EURUSD", 1.07), sample_trade("GBPUSD", 1.20)],
        )
        .unwrap();

        assert_eq!(stats.added, 2);
        assert_eq!(stats.skipped, 0);
        assert_eq!(stats.total, 2);
        assert_eq!(merged.len(), 2);
        assert!(merged[0].get("trade_id").is_some());
    }

    #[test]
    fn test_merge_skips_existing_signature() {
        let (first, _) =
            merge_trades_with_deduplication(vec![], vec![sample_trade("EURUSD", 1.07)]).unwrap();

        let (merged, stats) = merge_trades_with_deduplication(
            first,
            vec![sample_trade("EURUSD", 1.07), sample_trade("EURUSD", 1.08)],
        )
        .unwrap();

        assert_eq!(stats.added, 1);
        assert_eq!(stats.skipped, 1);
        assert!(stats.has_duplicates());
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_trade_id_is_deterministic() {
        let (a, _) =
            merge_trades_with_deduplication(vec![], vec![sample_trade("EURUSD", 1.07)]).unwrap();
        let (b, _) =
            merge_trades_with_deduplication(vec![], vec![sample_trade("EURUSD", 1.07)]).unwrap();

        assert_eq!(a[0].get("trade_id"), b[0].get("trade_id"));
    }

    #[test]
    fn test_sort_trades_by_date() {
        let mut trades = vec![
            json!({"date": "2023-03-01T00:00:00", "symbol": "B"}),
            json!({"symbol": "no-date"}),
            json!({"date": "2023-01-01T00:00:00", "symbol": "A"}),
        ];
        sort_trades_by_date(&mut trades);

        assert_eq!(trades[0]["symbol"], "A");
        assert_eq!(trades[1]["symbol"], "B");
        assert_eq!(trades[2]["symbol"], "no-date");
    }
}
