use async_trait::async_trait;

use super::trading_model::{TradeReceipt, TradeSize};
use crate::errors::Result;
use crate::simulation::PriceSource;

#[async_trait]
pub trait TradeServiceTrait: Send + Sync {
    /// Buys at the price `prices` currently reports for the instrument.
    async fn buy(
        &self,
        user_id: &str,
        instrument_id: &str,
        size: TradeSize,
        prices: &dyn PriceSource,
    ) -> Result<TradeReceipt>;

    async fn sell(
        &self,
        user_id: &str,
        instrument_id: &str,
        size: TradeSize,
        prices: &dyn PriceSource,
    ) -> Result<TradeReceipt>;
}
