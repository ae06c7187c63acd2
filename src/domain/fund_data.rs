//! The two in-memory tables every analytics call reads from.

use super::records::{Holding, Trade};

/// Trades and holdings, loaded once and never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct FundData {
    trades: Vec<Trade>,
    holdings: Vec<Holding>,
}

impl FundData {
    pub fn new(trades: Vec<Trade>, holdings: Vec<Holding>) -> Self {
        Self { trades, holdings }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    /// Holdings matching an optional fund, compared case-insensitively.
    pub fn holdings_for(&self, fund: Option<&str>) -> Vec<&Holding> {
        match fund {
            None => self.holdings.iter().collect(),
            Some(f) => {
                let f = f.to_lowercase();
                self.holdings.iter().filter(|h| h.in_fund(&f)).collect()
            }
        }
    }

    pub fn trades_for(&self, fund: Option<&str>) -> Vec<&Trade> {
        match fund {
            None => self.trades.iter().collect(),
            Some(f) => {
                let f = f.to_lowercase();
                self.trades.iter().filter(|t| t.in_fund(&f)).collect()
            }
        }
    }
}
