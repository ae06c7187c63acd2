#![allow(dead_code)]

use fundchat::domain::error::FundchatError;
use fundchat::domain::fund_data::FundData;
pub use fundchat::domain::records::{Holding, Trade};
use fundchat::ports::data_port::DataPort;
use fundchat::ports::model_port::ModelPort;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;

/// Model double: replies are returned in order, prompts are recorded.
pub struct MockModelPort {
    pub available: bool,
    replies: Mutex<VecDeque<Result<String, FundchatError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockModelPort {
    pub fn new() -> Self {
        Self {
            available: true,
            replies: Mutex::new(VecDeque::new()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_reply(self, reply: &str) -> Self {
        self.replies.lock().unwrap().push_back(Ok(reply.to_string()));
        self
    }

    pub fn with_error(self, err: FundchatError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn unavailable(mut self) -> Self {
        self.available = false;
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

impl ModelPort for MockModelPort {
    fn generate(&self, prompt: &str) -> Result<String, FundchatError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FundchatError::ModelResponse {
                reason: "no scripted reply left".into(),
            }))
    }

    fn check_available(&self) -> Result<(), FundchatError> {
        if self.available {
            Ok(())
        } else {
            Err(FundchatError::ModelUnavailable {
                url: "http://localhost:11434/api/tags".into(),
                reason: "connection refused".into(),
            })
        }
    }
}

pub struct MockDataPort {
    pub trades: Vec<Trade>,
    pub holdings: Vec<Holding>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            trades: Vec::new(),
            holdings: Vec::new(),
            error: None,
        }
    }

    pub fn with_holding(mut self, holding: Holding) -> Self {
        self.holdings.push(holding);
        self
    }

    pub fn with_trade(mut self, trade: Trade) -> Self {
        self.trades.push(trade);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }

    fn check(&self) -> Result<(), FundchatError> {
        match &self.error {
            Some(reason) => Err(FundchatError::DataLoad {
                path: "mock".into(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl DataPort for MockDataPort {
    fn load_trades(&self) -> Result<Vec<Trade>, FundchatError> {
        self.check()?;
        Ok(self.trades.clone())
    }

    fn load_holdings(&self) -> Result<Vec<Holding>, FundchatError> {
        self.check()?;
        Ok(self.holdings.clone())
    }
}

pub fn holding(fund: &str, sec: &str, sec_type: &str, mv: f64, pl: f64) -> Holding {
    Holding {
        portfolio_name: fund.to_string(),
        sec_name: sec.to_string(),
        security_type_name: sec_type.to_string(),
        qty: Some(1.0),
        mv_base: Some(mv),
        pl_ytd: Some(pl),
    }
}

/// Two funds: Alpha (3 holdings, 3 trades) and Beta (2 holdings, 1 trade).
pub fn sample_data() -> FundData {
    MockDataPort::new()
        .with_holding(holding("Alpha", "ACME", "Equity", 500.0, 50.0))
        .with_holding(holding("Alpha", "GOVT 2030", "Bond", 300.0, -10.0))
        .with_holding(holding("Alpha", "WIDGET", "Equity", 200.0, 20.0))
        .with_holding(holding("Beta", "ACME", "Equity", 1000.0, 100.0))
        .with_holding(holding("Beta", "CASH", "Cash", 50.0, 0.0))
        .with_trade(Trade::new("Alpha").with_field("Side", "BUY"))
        .with_trade(Trade::new("Alpha").with_field("Side", "SELL"))
        .with_trade(Trade::new("alpha").with_field("Side", "BUY"))
        .with_trade(Trade::new("Beta").with_field("Side", "BUY"))
        .load()
        .unwrap()
}

pub const SAMPLE_HOLDINGS_CSV: &str = "\
PortfolioName,SecName,SecurityTypeName,Qty,MV_Base,PL_YTD
Alpha,ACME,Equity,10,500,50
Alpha,GOVT 2030,Bond,5,300,-10
Alpha,WIDGET,Equity,2,200,20
Beta,ACME,Equity,20,1000,100
Beta,CASH,Cash,50,50,0
";

pub const SAMPLE_TRADES_CSV: &str = "\
TradeId,PortfolioName,Side,Quantity
1,Alpha,BUY,10
2,Alpha,SELL,5
3,alpha,BUY,2
4,Beta,BUY,20
";

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
