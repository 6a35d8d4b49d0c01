use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use models::Trade;
use serde::Serialize;
use std::collections::HashMap;
use std::{fs, path::Path};

#[derive(Debug, Serialize)]
pub struct DashboardMetadata {
    pub generated_at: String,
    pub trade_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EquityPoint {
    pub trade_number: usize,
    pub equity: f64,
}

#[derive(Debug, Serialize)]
pub struct Drawdown {
    pub value: f64,
    pub percent: f64,
}

#[derive(Debug, Serialize)]
pub struct Kpis {
    pub net_pl: f64,
    pub win_rate: f64,
    /// Gross wins over gross losses; absent when there are no losing trades.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_factor: Option<f64>,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub current_balance: f64,
    pub max_drawdown: Drawdown,
}

#[derive(Debug, Serialize)]
pub struct WeekdayPl {
    pub day: String,
    pub pl: f64,
}

#[derive(Debug, Serialize)]
pub struct SymbolPerformance {
    pub symbol: String,
    pub trades: usize,
    pub net_pl: f64,
    pub win_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct DashboardOutput {
    pub metadata: DashboardMetadata,
    pub kpis: Kpis,
    pub equity_curve: Vec<EquityPoint>,
    pub pl_by_weekday: Vec<WeekdayPl>,
    pub symbol_performance: Vec<SymbolPerformance>,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
fn round4(v: f64) -> f64 {
    (v * 10000.0).round() / 10000.0
}

impl DashboardOutput {
    fn finalize(mut self) -> Self {
        self.kpis.net_pl = round2(self.kpis.net_pl);
        self.kpis.win_rate = round2(self.kpis.win_rate);
        self.kpis.profit_factor = self.kpis.profit_factor.map(round4);
        self.kpis.avg_win = round2(self.kpis.avg_win);
        self.kpis.avg_loss = round2(self.kpis.avg_loss);
        self.kpis.current_balance = round2(self.kpis.current_balance);
        self.kpis.max_drawdown.value = round2(self.kpis.max_drawdown.value);
        self.kpis.max_drawdown.percent = round4(self.kpis.max_drawdown.percent);
        for p in self.equity_curve.iter_mut() {
            p.equity = round2(p.equity);
        }
        for d in self.pl_by_weekday.iter_mut() {
            d.pl = round2(d.pl);
        }
        for s in self.symbol_performance.iter_mut() {
            s.net_pl = round2(s.net_pl);
            s.win_rate = round2(s.win_rate);
        }
        self
    }
}

/// Derives every dashboard metric from the journal's trades and the
/// starting balance. Trades are taken in close-date order for the equity
/// curve regardless of their stored order.
pub fn generate_dashboard(trades: &[Trade], initial_balance: f64) -> DashboardOutput {
    let mut ordered: Vec<&Trade> = trades.iter().collect();
    ordered.sort_by_key(|t| t.date_closed);

    // Equity curve, starting at the initial balance before any trade
    let mut equity_curve = vec![EquityPoint {
        trade_number: 0,
        equity: initial_balance,
    }];
    let mut running = initial_balance;
    for (i, trade) in ordered.iter().enumerate() {
        running += trade.pl;
        equity_curve.push(EquityPoint {
            trade_number: i + 1,
            equity: running,
        });
    }

    let wins: Vec<&&Trade> = ordered.iter().filter(|t| t.pl > 0.0).collect();
    let losses: Vec<&&Trade> = ordered.iter().filter(|t| t.pl < 0.0).collect();

    let net_pl: f64 = ordered.iter().map(|t| t.pl).sum();
    let gross_win: f64 = wins.iter().map(|t| t.pl).sum();
    let gross_loss: f64 = losses.iter().map(|t| t.pl.abs()).sum();

    let win_rate = if ordered.is_empty() {
        0.0
    } else {
        wins.len() as f64 / ordered.len() as f64 * 100.0
    };

    let profit_factor = (gross_loss > 0.0).then(|| gross_win / gross_loss);
    let avg_win = if wins.is_empty() {
        0.0
    } else {
        gross_win / wins.len() as f64
    };
    let avg_loss = if losses.is_empty() {
        0.0
    } else {
        gross_loss / losses.len() as f64
    };

    // Max drawdown against the running equity peak
    let mut peak = initial_balance;
    let mut dd_value = 0.0f64;
    let mut dd_percent = 0.0f64;
    for point in &equity_curve {
        if point.equity > peak {
            peak = point.equity;
        }
        let dd = peak - point.equity;
        if dd > dd_value {
            dd_value = dd;
            dd_percent = if peak != 0.0 { dd / peak * 100.0 } else { 0.0 };
        }
    }

    // P/L grouped by weekday of the close, Monday first
    let mut by_weekday: HashMap<u32, f64> = HashMap::new();
    for trade in &ordered {
        *by_weekday
            .entry(trade.date_closed.weekday().num_days_from_monday())
            .or_insert(0.0) += trade.pl;
    }
    let weekday_names = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
    let pl_by_weekday = (0u32..7)
        .filter_map(|d| {
            by_weekday.get(&d).map(|pl| WeekdayPl {
                day: weekday_names[d as usize].to_string(),
                pl: *pl,
            })
        })
        .collect();

    // Per-symbol aggregation, sorted by net P/L descending
    let mut by_symbol: HashMap<String, (usize, usize, f64)> = HashMap::new();
    for trade in &ordered {
        let slot = by_symbol.entry(trade.symbol.clone()).or_insert((0, 0, 0.0));
        slot.0 += 1;
        if trade.pl > 0.0 {
            slot.1 += 1;
        }
        slot.2 += trade.pl;
    }
    let mut symbol_performance: Vec<SymbolPerformance> = by_symbol
        .into_iter()
        .map(|(symbol, (count, won, pl))| SymbolPerformance {
            symbol,
            trades: count,
            net_pl: pl,
            win_rate: won as f64 / count as f64 * 100.0,
        })
        .collect();
    symbol_performance.sort_by(|a, b| b.net_pl.total_cmp(&a.net_pl));

    DashboardOutput {
        metadata: DashboardMetadata {
            generated_at: Local::now().to_rfc3339(),
            trade_count: ordered.len(),
        },
        kpis: Kpis {
            net_pl,
            win_rate,
            profit_factor,
            avg_win,
            avg_loss,
            current_balance: running,
            max_drawdown: Drawdown {
                value: dd_value,
                percent: dd_percent,
            },
        },
        equity_curve,
        pl_by_weekday,
        symbol_performance,
    }
    .finalize()
}

pub fn write_dashboard_json(dashboard: &DashboardOutput, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output dir: {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(dashboard)?;
    fs::write(out_path, json)
        .with_context(|| format!("Writing output file: {}", out_path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use models::Side;

    fn trade(day: u32, pl: f64) -> Trade {
        let date = NaiveDate::from_ymd_opt(2023, 5, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        Trade {
            date,
            date_closed: date,
            symbol: "EURUSD".to_string(),
            side: Side::Buy,
            size: 1.0,
            entry: 1.0,
            exit: 1.0,
            sl: None,
            pl,
            commission: 0.0,
            swap: 0.0,
        }
    }

    #[test]
    fn test_equity_curve_starts_at_initial_balance() {
        let trades = vec![trade(1, 50.0), trade(2, -20.0)];
        let dash = generate_dashboard(&trades, 1000.0);

        let equities: Vec<f64> = dash.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![1000.0, 1050.0, 1030.0]);
        assert_eq!(dash.kpis.current_balance, 1030.0);
    }

    #[test]
    fn test_win_rate_and_profit_factor() {
        let trades = vec![trade(1, 100.0), trade(2, 100.0), trade(3, -50.0)];
        let dash = generate_dashboard(&trades, 1000.0);

        assert_eq!(dash.kpis.win_rate, 66.67);
        assert_eq!(dash.kpis.profit_factor, Some(4.0));
        assert_eq!(dash.kpis.net_pl, 150.0);
    }

    #[test]
    fn test_profit_factor_absent_without_losses() {
        let trades = vec![trade(1, 100.0)];
        let dash = generate_dashboard(&trades, 1000.0);
        assert_eq!(dash.kpis.profit_factor, None);
    }

    #[test]
    fn test_max_drawdown() {
        let trades = vec![trade(1, 200.0), trade(2, -300.0), trade(3, 50.0)];
        let dash = generate_dashboard(&trades, 1000.0);

        // Peak 1200, trough 900
        assert_eq!(dash.kpis.max_drawdown.value, 300.0);
        assert_eq!(dash.kpis.max_drawdown.percent, 25.0);
    }

    #[test]
    fn test_equity_uses_close_order() {
        // Stored out of order; curve must follow close dates
        let trades = vec![trade(20, -10.0), trade(5, 30.0)];
        let dash = generate_dashboard(&trades, 100.0);

        let equities: Vec<f64> = dash.equity_curve.iter().map(|p| p.equity).collect();
        assert_eq!(equities, vec![100.0, 130.0, 120.0]);
    }

    #[test]
    fn test_symbol_performance() {
        let mut trades = vec![trade(1, 100.0), trade(2, -40.0)];
        trades[1].symbol = "GBPUSD".to_string();
        let dash = generate_dashboard(&trades, 1000.0);

        assert_eq!(dash.symbol_performance.len(), 2);
        assert_eq!(dash.symbol_performance[0].symbol, "EURUSD");
        assert_eq!(dash.symbol_performance[0].win_rate, 100.0);
        assert_eq!(dash.symbol_performance[1].net_pl, -40.0);
    }

    #[test]
    fn test_empty_journal() {
        let dash = generate_dashboard(&[], 5000.0);
        assert_eq!(dash.kpis.win_rate, 0.0);
        assert_eq!(dash.equity_curve.len(), 1);
        assert_eq!(dash.kpis.current_balance, 5000.0);
    }
}
