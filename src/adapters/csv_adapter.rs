//! CSV file data adapter.
//!
//! Columns are located by header name, so column order in the files does not
//! matter. Blank numeric cells load as `None`.

use crate::domain::error::FundchatError;
use crate::domain::records::{columns, Holding, Trade};
use crate::ports::data_port::DataPort;
use csv::StringRecord;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub struct CsvAdapter {
    trades_path: PathBuf,
    holdings_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(trades_path: PathBuf, holdings_path: PathBuf) -> Self {
        Self {
            trades_path,
            holdings_path,
        }
    }
}

fn load_error(path: &Path, reason: impl ToString) -> FundchatError {
    FundchatError::DataLoad {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn read_table(path: &Path) -> Result<(StringRecord, Vec<StringRecord>), FundchatError> {
    let content = fs::read_to_string(path).map_err(|e| load_error(path, e))?;

    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let headers = rdr.headers().map_err(|e| load_error(path, e))?.clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        rows.push(result.map_err(|e| load_error(path, format!("CSV parse error: {}", e)))?);
    }
    Ok((headers, rows))
}

fn column_index(path: &Path, headers: &StringRecord, column: &str) -> Result<usize, FundchatError> {
    headers
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| FundchatError::MissingColumn {
            path: path.display().to_string(),
            column: column.to_string(),
        })
}

fn parse_number(path: &Path, row: usize, column: &str, raw: &str) -> Result<Option<f64>, FundchatError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>().map(Some).map_err(|_| {
        load_error(
            path,
            format!("row {}: invalid {} value '{}'", row, column, raw),
        )
    })
}

impl DataPort for CsvAdapter {
    fn load_trades(&self) -> Result<Vec<Trade>, FundchatError> {
        let path = self.trades_path.as_path();
        let (headers, rows) = read_table(path)?;
        let fund_idx = column_index(path, &headers, columns::PORTFOLIO_NAME)?;

        let trades: Vec<Trade> = rows
            .iter()
            .map(|record| {
                let mut trade = Trade::new(record.get(fund_idx).unwrap_or_default());
                for (i, (column, value)) in headers.iter().zip(record.iter()).enumerate() {
                    if i != fund_idx {
                        trade = trade.with_field(column, value);
                    }
                }
                trade
            })
            .collect();

        info!(path = %path.display(), rows = trades.len(), "loaded trades");
        Ok(trades)
    }

    fn load_holdings(&self) -> Result<Vec<Holding>, FundchatError> {
        let path = self.holdings_path.as_path();
        let (headers, rows) = read_table(path)?;

        let mut idx = [0usize; 6];
        for (slot, column) in idx.iter_mut().zip(columns::HOLDINGS) {
            *slot = column_index(path, &headers, column)?;
        }
        let [fund, sec, sec_type, qty, mv, pl] = idx;

        let mut holdings = Vec::with_capacity(rows.len());
        for (n, record) in rows.iter().enumerate() {
            // Header is line 1.
            let line = n + 2;
            let cell = |i: usize| record.get(i).unwrap_or_default();
            holdings.push(Holding {
                portfolio_name: cell(fund).to_string(),
                sec_name: cell(sec).to_string(),
                security_type_name: cell(sec_type).to_string(),
                qty: parse_number(path, line, columns::QTY, cell(qty))?,
                mv_base: parse_number(path, line, columns::MV_BASE, cell(mv))?,
                pl_ytd: parse_number(path, line, columns::PL_YTD, cell(pl))?,
            });
        }

        info!(path = %path.display(), rows = holdings.len(), "loaded holdings");
        Ok(holdings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HOLDINGS: &str = "\
PortfolioName,SecName,SecurityTypeName,Qty,MV_Base,PL_YTD
Alpha,ACME,Equity,100,1500.5,20
Alpha,BOND1,Bond,10,,-5
Beta,ACME,Equity,50,750.25,
";

    const TRADES: &str = "\
TradeId,PortfolioName,Side,Quantity
1,Alpha,BUY,100
2,Beta,SELL,50
";

    fn setup(trades: &str, holdings: &str) -> (TempDir, CsvAdapter) {
        let dir = TempDir::new().unwrap();
        let trades_path = dir.path().join("trades.csv");
        let holdings_path = dir.path().join("holdings.csv");
        fs::write(&trades_path, trades).unwrap();
        fs::write(&holdings_path, holdings).unwrap();
        (dir, CsvAdapter::new(trades_path, holdings_path))
    }

    #[test]
    fn load_holdings_reads_columns_by_name() {
        let (_dir, adapter) = setup(TRADES, HOLDINGS);
        let holdings = adapter.load_holdings().unwrap();

        assert_eq!(holdings.len(), 3);
        assert_eq!(holdings[0].portfolio_name, "Alpha");
        assert_eq!(holdings[0].sec_name, "ACME");
        assert_eq!(holdings[0].security_type_name, "Equity");
        assert_eq!(holdings[0].qty, Some(100.0));
        assert_eq!(holdings[0].mv_base, Some(1500.5));
        assert_eq!(holdings[1].mv_base, None);
        assert_eq!(holdings[1].pl_ytd, Some(-5.0));
        assert_eq!(holdings[2].pl_ytd, None);
    }

    #[test]
    fn load_holdings_ignores_column_order_and_extra_columns() {
        let holdings = "Extra,PL_YTD,MV_Base,Qty,SecurityTypeName,SecName,PortfolioName\n\
                        x,1,2,3,Equity,ACME,Gamma\n";
        let (_dir, adapter) = setup(TRADES, holdings);
        let loaded = adapter.load_holdings().unwrap();
        assert_eq!(loaded[0].portfolio_name, "Gamma");
        assert_eq!(loaded[0].qty, Some(3.0));
        assert_eq!(loaded[0].pl_ytd, Some(1.0));
    }

    #[test]
    fn load_holdings_missing_column() {
        let (_dir, adapter) = setup(TRADES, "PortfolioName,SecName\nAlpha,ACME\n");
        let err = adapter.load_holdings().unwrap_err();
        assert!(matches!(err, FundchatError::MissingColumn { column, .. } if column == "SecurityTypeName"));
    }

    #[test]
    fn load_holdings_rejects_non_numeric_value() {
        let holdings = "PortfolioName,SecName,SecurityTypeName,Qty,MV_Base,PL_YTD\n\
                        Alpha,ACME,Equity,lots,1,1\n";
        let (_dir, adapter) = setup(TRADES, holdings);
        let err = adapter.load_holdings().unwrap_err();
        assert!(err.to_string().contains("row 2: invalid Qty value 'lots'"));
    }

    #[test]
    fn load_trades_keeps_other_columns() {
        let (_dir, adapter) = setup(TRADES, HOLDINGS);
        let trades = adapter.load_trades().unwrap();

        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].portfolio_name, "Alpha");
        assert_eq!(trades[0].field("Side"), Some("BUY"));
        assert_eq!(trades[0].field("TradeId"), Some("1"));
        assert_eq!(trades[0].field("PortfolioName"), None);
    }

    #[test]
    fn load_trades_requires_portfolio_column() {
        let (_dir, adapter) = setup("TradeId,Side\n1,BUY\n", HOLDINGS);
        assert!(matches!(
            adapter.load_trades().unwrap_err(),
            FundchatError::MissingColumn { .. }
        ));
    }

    #[test]
    fn load_missing_file_is_data_error() {
        let adapter = CsvAdapter::new(
            PathBuf::from("/nonexistent/trades.csv"),
            PathBuf::from("/nonexistent/holdings.csv"),
        );
        assert!(matches!(
            adapter.load().unwrap_err(),
            FundchatError::DataLoad { .. }
        ));
    }

    #[test]
    fn load_builds_fund_data() {
        let (_dir, adapter) = setup(TRADES, HOLDINGS);
        let data = adapter.load().unwrap();
        assert_eq!(data.trades().len(), 2);
        assert_eq!(data.holdings().len(), 3);
    }

    #[test]
    fn header_only_files_load_empty() {
        let (_dir, adapter) = setup(
            "PortfolioName\n",
            "PortfolioName,SecName,SecurityTypeName,Qty,MV_Base,PL_YTD\n",
        );
        let data = adapter.load().unwrap();
        assert!(data.trades().is_empty());
        assert!(data.holdings().is_empty());
    }
}
