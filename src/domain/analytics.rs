//! The seven analytics functions over [`FundData`].
//!
//! Every function is pure. A fund filter that matches nothing yields
//! [`AnalyticsResult::FundNotFound`]; a computation with no rows yields
//! [`AnalyticsResult::Empty`].

use std::collections::BTreeMap;

use serde_json::{Map, Value, json};

use super::fund_data::FundData;
use super::records::{Holding, columns};

pub const DEFAULT_TOP_HOLDINGS_LIMIT: usize = 10;

/// One output row: column name to value, in column order.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub enum AnalyticsResult {
    Count(usize),
    Records(Vec<Record>),
    FundNotFound { fund: String },
    Empty,
}

impl AnalyticsResult {
    pub fn is_empty(&self) -> bool {
        match self {
            AnalyticsResult::Count(_) => false,
            AnalyticsResult::Records(rows) => rows.is_empty(),
            AnalyticsResult::FundNotFound { .. } | AnalyticsResult::Empty => true,
        }
    }

    /// The payload handed to the formatter.
    pub fn to_json(&self) -> Value {
        match self {
            AnalyticsResult::Count(n) => json!(n),
            AnalyticsResult::Records(rows) => {
                Value::Array(rows.iter().cloned().map(Value::Object).collect())
            }
            AnalyticsResult::FundNotFound { fund } => json!({ "not_found": fund }),
            AnalyticsResult::Empty => Value::Array(Vec::new()),
        }
    }

    fn from_rows(rows: Vec<Record>) -> Self {
        if rows.is_empty() {
            AnalyticsResult::Empty
        } else {
            AnalyticsResult::Records(rows)
        }
    }
}

fn not_found(fund: &str) -> AnalyticsResult {
    AnalyticsResult::FundNotFound {
        fund: fund.to_string(),
    }
}

pub fn get_total_trades(data: &FundData, fund: Option<&str>) -> AnalyticsResult {
    let trades = data.trades_for(fund);
    match fund {
        Some(f) if trades.is_empty() => not_found(f),
        _ => AnalyticsResult::Count(trades.len()),
    }
}

pub fn get_total_holdings(data: &FundData, fund: Option<&str>) -> AnalyticsResult {
    let holdings = data.holdings_for(fund);
    match fund {
        Some(f) if holdings.is_empty() => not_found(f),
        _ => AnalyticsResult::Count(holdings.len()),
    }
}

/// Year-to-date P&L summed per portfolio, best first.
pub fn get_yearly_fund_performance(data: &FundData) -> AnalyticsResult {
    let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
    for h in data.holdings() {
        *totals.entry(h.portfolio_name.as_str()).or_default() += h.pl_ytd.unwrap_or(0.0);
    }

    let mut grouped: Vec<(&str, f64)> = totals.into_iter().collect();
    grouped.sort_by(|a, b| b.1.total_cmp(&a.1));

    let rows = grouped
        .into_iter()
        .map(|(name, pl)| {
            let mut row = Record::new();
            row.insert(columns::PORTFOLIO_NAME.into(), json!(name));
            row.insert("Total_PL_YTD".into(), json!(pl));
            row
        })
        .collect();
    AnalyticsResult::from_rows(rows)
}

/// Distinct portfolio names, sorted.
pub fn get_all_funds(data: &FundData) -> AnalyticsResult {
    let mut names: Vec<&str> = data
        .holdings()
        .iter()
        .map(|h| h.portfolio_name.as_str())
        .collect();
    names.sort_unstable();
    names.dedup();

    let rows = names
        .into_iter()
        .map(|name| {
            let mut row = Record::new();
            row.insert(columns::PORTFOLIO_NAME.into(), json!(name));
            row
        })
        .collect();
    AnalyticsResult::from_rows(rows)
}

#[derive(Default)]
struct GroupTotals {
    market_value: f64,
    pl_ytd: f64,
    count: usize,
}

fn group_by<'a>(
    holdings: impl Iterator<Item = &'a Holding>,
    key: impl Fn(&'a Holding) -> &'a str,
) -> Vec<(&'a str, GroupTotals)> {
    let mut groups: BTreeMap<&str, GroupTotals> = BTreeMap::new();
    for h in holdings {
        let g = groups.entry(key(h)).or_default();
        g.market_value += h.mv_base.unwrap_or(0.0);
        g.pl_ytd += h.pl_ytd.unwrap_or(0.0);
        g.count += 1;
    }
    let mut grouped: Vec<_> = groups.into_iter().collect();
    grouped.sort_by(|a, b| b.1.market_value.total_cmp(&a.1.market_value));
    grouped
}

/// Market value, P&L and holding count per portfolio, largest first.
pub fn get_fund_comparison(data: &FundData) -> AnalyticsResult {
    let rows = group_by(data.holdings().iter(), |h| h.portfolio_name.as_str())
        .into_iter()
        .map(|(name, g)| {
            let mut row = Record::new();
            row.insert(columns::PORTFOLIO_NAME.into(), json!(name));
            row.insert("Total_Market_Value".into(), json!(g.market_value));
            row.insert("YTD_P&L".into(), json!(g.pl_ytd));
            row.insert("Holdings_Count".into(), json!(g.count));
            row
        })
        .collect();
    AnalyticsResult::from_rows(rows)
}

/// Holdings broken down by security type, largest total value first.
pub fn get_fund_stats_by_type(data: &FundData, fund: Option<&str>) -> AnalyticsResult {
    let holdings = data.holdings_for(fund);
    if let Some(f) = fund {
        if holdings.is_empty() {
            return not_found(f);
        }
    }

    let rows = group_by(holdings.into_iter(), |h| h.security_type_name.as_str())
        .into_iter()
        .map(|(kind, g)| {
            let mut row = Record::new();
            row.insert(columns::SECURITY_TYPE_NAME.into(), json!(kind));
            row.insert("Count".into(), json!(g.count));
            row.insert("Total_Value".into(), json!(g.market_value));
            row.insert("Total_PL".into(), json!(g.pl_ytd));
            row
        })
        .collect();
    AnalyticsResult::from_rows(rows)
}

/// The `limit` largest holdings by market value. Holdings without a market
/// value sort last.
pub fn get_top_holdings(data: &FundData, fund: Option<&str>, limit: usize) -> AnalyticsResult {
    let mut holdings = data.holdings_for(fund);
    if let Some(f) = fund {
        if holdings.is_empty() {
            return not_found(f);
        }
    }

    holdings.sort_by(|a, b| match (a.mv_base, b.mv_base) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let rows = holdings
        .into_iter()
        .take(limit)
        .map(|h| {
            let mut row = Record::new();
            row.insert(columns::PORTFOLIO_NAME.into(), json!(h.portfolio_name));
            row.insert(columns::SEC_NAME.into(), json!(h.sec_name));
            row.insert(columns::SECURITY_TYPE_NAME.into(), json!(h.security_type_name));
            row.insert(columns::QTY.into(), json!(h.qty));
            row.insert(columns::MV_BASE.into(), json!(h.mv_base));
            row.insert(columns::PL_YTD.into(), json!(h.pl_ytd));
            row
        })
        .collect();
    AnalyticsResult::from_rows(rows)
}
