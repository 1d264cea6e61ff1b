use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::risk::{risk_score, RiskInput};
use super::valuation_model::{PortfolioMetrics, PositionValuation};
use crate::instruments::Instrument;
use crate::portfolio::Holding;
use crate::simulation::{round_price, PriceSource};

fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    if whole > Decimal::ZERO {
        round_price(part / whole * dec!(100))
    } else {
        Decimal::ZERO
    }
}

/// Values every holding at the price `prices` reports and aggregates the result.
///
/// A holding without a price is valued at zero. `instruments` supplies the
/// risk category and sector for the risk score; unknown instruments count as
/// neither high risk nor diversifying.
pub fn calculate_portfolio_metrics(
    holdings: &[Holding],
    instruments: &HashMap<String, Instrument>,
    prices: &dyn PriceSource,
    cash_balance: Decimal,
) -> PortfolioMetrics {
    let mut positions = Vec::with_capacity(holdings.len());
    let mut risk_inputs = Vec::with_capacity(holdings.len());

    for holding in holdings {
        let instrument = instruments.get(&holding.instrument_id);
        let current_price = prices
            .current_price(&holding.instrument_id)
            .unwrap_or_else(|| {
                warn!(
                    "No price for instrument {} in holding {}; valuing at zero",
                    holding.instrument_id, holding.id
                );
                Decimal::ZERO
            });

        let current_value = round_price(current_price * holding.quantity);
        let invested_value = round_price(holding.average_price * holding.quantity);
        let profit_loss = current_value - invested_value;

        risk_inputs.push(RiskInput {
            current_value,
            high_risk: instrument.is_some_and(|i| i.risk_category.is_high_risk()),
            diversification_key: instrument.map(|i| i.diversification_key().to_string()),
        });

        positions.push(PositionValuation {
            holding_id: holding.id.clone(),
            instrument_id: holding.instrument_id.clone(),
            symbol: instrument.map(|i| i.symbol.clone()),
            kind: instrument.map(|i| i.kind()),
            risk_category: instrument.map(|i| i.risk_category),
            quantity: holding.quantity,
            average_price: holding.average_price,
            current_price,
            current_value,
            invested_value,
            profit_loss,
            profit_loss_percent: percent_of(profit_loss, invested_value),
            weight_percent: Decimal::ZERO,
        });
    }

    let holdings_value: Decimal = positions.iter().map(|p| p.current_value).sum();
    let total_invested: Decimal = positions.iter().map(|p| p.invested_value).sum();
    for position in &mut positions {
        position.weight_percent = percent_of(position.current_value, holdings_value);
    }
    let unrealized_pl = holdings_value - total_invested;

    PortfolioMetrics {
        cash_balance,
        holdings_value,
        total_value: cash_balance + holdings_value,
        total_invested,
        unrealized_pl,
        unrealized_pl_percent: percent_of(unrealized_pl, total_invested),
        risk_score: risk_score(&risk_inputs),
        positions,
    }
}
