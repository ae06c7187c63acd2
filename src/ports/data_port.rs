//! Data access port trait.

use crate::domain::error::FundchatError;
use crate::domain::fund_data::FundData;
use crate::domain::records::{Holding, Trade};

pub trait DataPort {
    fn load_trades(&self) -> Result<Vec<Trade>, FundchatError>;

    fn load_holdings(&self) -> Result<Vec<Holding>, FundchatError>;

    /// Load both tables. Called once at startup.
    fn load(&self) -> Result<FundData, FundchatError> {
        Ok(FundData::new(self.load_trades()?, self.load_holdings()?))
    }
}
