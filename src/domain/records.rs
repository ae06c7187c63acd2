//! Trade and holding rows.

/// Column names shared by the holdings file and the analytics output.
pub mod columns {
    pub const PORTFOLIO_NAME: &str = "PortfolioName";
    pub const SEC_NAME: &str = "SecName";
    pub const SECURITY_TYPE_NAME: &str = "SecurityTypeName";
    pub const QTY: &str = "Qty";
    pub const MV_BASE: &str = "MV_Base";
    pub const PL_YTD: &str = "PL_YTD";

    pub const HOLDINGS: [&str; 6] = [
        PORTFOLIO_NAME,
        SEC_NAME,
        SECURITY_TYPE_NAME,
        QTY,
        MV_BASE,
        PL_YTD,
    ];
}

/// A current position within a portfolio. Blank numeric cells are `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Holding {
    pub portfolio_name: String,
    pub sec_name: String,
    pub security_type_name: String,
    pub qty: Option<f64>,
    pub mv_base: Option<f64>,
    pub pl_ytd: Option<f64>,
}

impl Holding {
    pub fn in_fund(&self, fund_lower: &str) -> bool {
        self.portfolio_name.to_lowercase() == fund_lower
    }
}

/// A transaction row. Only the portfolio is interpreted; every other column
/// is carried through as text in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub portfolio_name: String,
    pub fields: Vec<(String, String)>,
}

impl Trade {
    pub fn new(portfolio_name: impl Into<String>) -> Self {
        Self {
            portfolio_name: portfolio_name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((column.into(), value.into()));
        self
    }

    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(c, _)| c == column)
            .map(|(_, v)| v.as_str())
    }

    pub fn in_fund(&self, fund_lower: &str) -> bool {
        self.portfolio_name.to_lowercase() == fund_lower
    }
}
