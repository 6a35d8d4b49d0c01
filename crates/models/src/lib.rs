use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Direction of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
	Buy,
	Sell,
}

impl Side {
	/// Infers the side from a broker's type/side cell.
	///
	/// Any value containing "buy" (case-insensitive) is a Buy; everything
	/// else, including malformed values, is a Sell. This mirrors how the
	/// supported broker exports label their type column.
	pub fn infer(raw: &str) -> Side {
		if raw.to_lowercase().contains("buy") {
			Side::Buy
		} else {
			Side::Sell
		}
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Side::Buy => "Buy",
			Side::Sell => "Sell",
		}
	}
}

/// One normalized trade record, as produced by the importer.
///
/// `date` is the open instant and `date_closed` the close instant; when the
/// source file has no separate close-time column the two are equal. All
/// numeric fields are finite by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
	pub date: NaiveDateTime,
	pub date_closed: NaiveDateTime,
	pub symbol: String,
	pub side: Side,
	pub size: f64,
	pub entry: f64,
	pub exit: f64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub sl: Option<f64>,
	pub pl: f64,
	#[serde(default)]
	pub commission: f64,
	#[serde(default)]
	pub swap: f64,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_side_inference() {
		assert_eq!(Side::infer("Buy"), Side::Buy);
		assert_eq!(Side::infer("BUY LIMIT"), Side::Buy);
		assert_eq!(Side::infer("sell"), Side::Sell);
		assert_eq!(Side::infer("short"), Side::Sell);
		// Unknown tokens fall through to Sell
		assert_eq!(Side::infer(""), Side::Sell);
		assert_eq!(Side::infer("???"), Side::Sell);
	}
}
