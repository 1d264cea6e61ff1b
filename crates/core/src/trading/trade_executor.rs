//! Pure trade planning. Every check runs before any value of the resulting
//! commit is computed, so a rejected trade has nothing to roll back.

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::trading_errors::TradeError;
use super::trading_model::{
    CommitPrecondition, HoldingChange, TradeCommit, TradeSize, TradeType, Transaction,
};
use crate::constants::DECIMAL_PRECISION;
use crate::instruments::Instrument;
use crate::portfolio::{Holding, Portfolio};
use crate::simulation::round_price;

/// Inputs a trade is validated against.
#[derive(Debug, Clone, Copy)]
pub struct TradeContext<'a> {
    pub portfolio: &'a Portfolio,
    pub instrument: &'a Instrument,
    pub holding: Option<&'a Holding>,
    pub price: Decimal,
    pub simulated_year: u32,
    pub now: DateTime<Utc>,
}

fn round_units(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero)
}

fn precondition(ctx: &TradeContext<'_>) -> CommitPrecondition {
    CommitPrecondition {
        cash_balance: ctx.portfolio.cash_balance,
        holding_quantity: ctx.holding.map(|h| h.quantity),
    }
}

fn out_of_range() -> TradeError {
    TradeError::InvalidTrade("Trade size is out of range".to_string())
}

fn check_price(ctx: &TradeContext<'_>) -> Result<(), TradeError> {
    if ctx.price <= Decimal::ZERO {
        return Err(TradeError::InvalidTrade(format!(
            "No valid price for {}",
            ctx.instrument.symbol
        )));
    }
    Ok(())
}

/// Resolves a quantity or amount to a positive unit count.
fn resolve_units(ctx: &TradeContext<'_>, size: TradeSize) -> Result<Decimal, TradeError> {
    let fractional = ctx.instrument.kind().allows_fractional_units();
    let units = match size {
        TradeSize::Quantity(quantity) => {
            if quantity <= Decimal::ZERO {
                return Err(TradeError::InvalidTrade(
                    "Quantity must be greater than zero".to_string(),
                ));
            }
            if !fractional && !quantity.fract().is_zero() {
                return Err(TradeError::InvalidTrade(format!(
                    "{} trades in whole shares",
                    ctx.instrument.symbol
                )));
            }
            if fractional {
                round_units(quantity)
            } else {
                quantity
            }
        }
        TradeSize::Amount(amount) => {
            if !fractional {
                return Err(TradeError::InvalidTrade(format!(
                    "{} is a stock; trade it by share count",
                    ctx.instrument.symbol
                )));
            }
            if amount <= Decimal::ZERO {
                return Err(TradeError::InvalidTrade(
                    "Amount must be greater than zero".to_string(),
                ));
            }
            match amount.checked_div(ctx.price) {
                Some(units) => round_units(units),
                None if amount > ctx.portfolio.cash_balance => {
                    return Err(TradeError::InsufficientFunds {
                        required: round_price(amount),
                        available: ctx.portfolio.cash_balance,
                    })
                }
                None => {
                    return Err(TradeError::InvalidTrade(
                        "Amount is out of range".to_string(),
                    ))
                }
            }
        }
        TradeSize::All => match ctx.holding {
            Some(holding) => holding.quantity,
            None => Decimal::ZERO,
        },
    };
    if units <= Decimal::ZERO && !matches!(size, TradeSize::All) {
        return Err(TradeError::InvalidTrade(
            "Trade size rounds to zero units".to_string(),
        ));
    }
    Ok(units)
}

fn new_transaction(
    ctx: &TradeContext<'_>,
    trade_type: TradeType,
    quantity: Decimal,
    total_amount: Decimal,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        portfolio_id: ctx.portfolio.id.clone(),
        instrument_id: ctx.instrument.id.clone(),
        trade_type,
        quantity,
        price_per_unit: ctx.price,
        total_amount,
        simulated_year: ctx.simulated_year,
        created_at: ctx.now,
    }
}

/// Validates a buy and computes its commit.
///
/// Amount-mode buys spend exactly the amount; quantity-mode buys cost
/// `price * quantity` rounded to cents.
pub fn plan_buy(ctx: &TradeContext<'_>, size: TradeSize) -> Result<TradeCommit, TradeError> {
    check_price(ctx)?;
    if matches!(size, TradeSize::All) {
        return Err(TradeError::InvalidTrade(
            "A buy needs a quantity or an amount".to_string(),
        ));
    }
    let available = ctx.portfolio.cash_balance;
    let units = resolve_units(ctx, size)?;
    let cost = match size {
        TradeSize::Amount(amount) => round_price(amount),
        // Unrepresentable cost is more than any balance.
        _ => ctx
            .price
            .checked_mul(units)
            .map(round_price)
            .unwrap_or(Decimal::MAX),
    };

    if cost > available {
        return Err(TradeError::InsufficientFunds {
            required: cost,
            available,
        });
    }

    let holding = match ctx.holding {
        Some(existing) => {
            let quantity = existing.quantity.checked_add(units).ok_or_else(out_of_range)?;
            let average_price = existing
                .average_price
                .checked_mul(existing.quantity)
                .and_then(|held_cost| held_cost.checked_add(cost))
                .and_then(|total_cost| total_cost.checked_div(quantity))
                .map(round_units)
                .ok_or_else(out_of_range)?;
            Holding {
                quantity,
                average_price,
                updated_at: ctx.now,
                ..existing.clone()
            }
        }
        None => Holding {
            id: Uuid::new_v4().to_string(),
            portfolio_id: ctx.portfolio.id.clone(),
            instrument_id: ctx.instrument.id.clone(),
            quantity: units,
            average_price: ctx.price,
            created_at: ctx.now,
            updated_at: ctx.now,
        },
    };

    Ok(TradeCommit {
        portfolio_id: ctx.portfolio.id.clone(),
        expected: precondition(ctx),
        new_cash_balance: round_price(available - cost),
        holding_change: HoldingChange::Upsert(holding),
        transaction: new_transaction(ctx, TradeType::Buy, units, cost),
    })
}

/// Validates a sell and computes its commit.
///
/// Selling the exact held quantity closes the position. A partial sell keeps
/// the average acquisition price.
pub fn plan_sell(ctx: &TradeContext<'_>, size: TradeSize) -> Result<TradeCommit, TradeError> {
    check_price(ctx)?;
    let held = ctx.holding.map(|h| h.quantity).unwrap_or(Decimal::ZERO);
    let units = resolve_units(ctx, size)?;

    let existing = match ctx.holding {
        Some(holding) if units <= held && held > Decimal::ZERO => holding,
        _ => {
            return Err(TradeError::InsufficientPosition {
                requested: units,
                held,
            })
        }
    };

    let proceeds = ctx
        .price
        .checked_mul(units)
        .map(round_price)
        .ok_or_else(out_of_range)?;
    let remaining = held - units;
    let holding_change = if remaining.is_zero() {
        HoldingChange::Delete {
            holding_id: existing.id.clone(),
        }
    } else {
        HoldingChange::Upsert(Holding {
            quantity: remaining,
            updated_at: ctx.now,
            ..existing.clone()
        })
    };

    Ok(TradeCommit {
        portfolio_id: ctx.portfolio.id.clone(),
        expected: precondition(ctx),
        new_cash_balance: ctx
            .portfolio
            .cash_balance
            .checked_add(proceeds)
            .map(round_price)
            .ok_or_else(out_of_range)?,
        holding_change,
        transaction: new_transaction(ctx, TradeType::Sell, units, proceeds),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruments::{InstrumentDetails, RiskCategory};
    use rust_decimal_macros::dec;

    fn portfolio(cash: Decimal) -> Portfolio {
        let now = Utc::now();
        Portfolio {
            id: "p1".to_string(),
            user_id: "u1".to_string(),
            cash_balance: cash,
            starting_balance: dec!(100000),
            simulated_year: 2,
            year_started_at: now,
            ended_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn stock() -> Instrument {
        Instrument {
            id: "s1".to_string(),
            symbol: "TATA".to_string(),
            name: "Tata Steel".to_string(),
            base_price: dec!(100),
            risk_category: RiskCategory::Medium,
            details: InstrumentDetails::Stock {
                sector: "Materials".to_string(),
            },
        }
    }

    fn fund() -> Instrument {
        Instrument {
            id: "f1".to_string(),
            symbol: "BLUE".to_string(),
            name: "Bluechip Fund".to_string(),
            base_price: dec!(40),
            risk_category: RiskCategory::LargeCap,
            details: InstrumentDetails::MutualFund {
                fund_house: None,
                expense_ratio: None,
            },
        }
    }

    fn ctx<'a>(
        portfolio: &'a Portfolio,
        instrument: &'a Instrument,
        holding: Option<&'a Holding>,
        price: Decimal,
    ) -> TradeContext<'a> {
        TradeContext {
            portfolio,
            instrument,
            holding,
            price,
            simulated_year: portfolio.simulated_year,
            now: Utc::now(),
        }
    }

    fn upserted(commit: &TradeCommit) -> Holding {
        commit.resulting_holding().cloned().unwrap()
    }

    #[test]
    fn test_first_buy_opens_position_at_price() {
        let p = portfolio(dec!(1000));
        let s = stock();
        let commit = plan_buy(&ctx(&p, &s, None, dec!(120.50)), TradeSize::Quantity(dec!(3))).unwrap();
        assert_eq!(commit.new_cash_balance, dec!(638.50));
        let holding = upserted(&commit);
        assert_eq!(holding.quantity, dec!(3));
        assert_eq!(holding.average_price, dec!(120.50));
        assert_eq!(commit.transaction.total_amount, dec!(361.50));
        assert_eq!(commit.transaction.simulated_year, 2);
        assert_eq!(commit.transaction.trade_type, TradeType::Buy);
    }

    #[test]
    fn test_weighted_average_on_second_buy() {
        let p = portfolio(dec!(10000));
        let s = stock();
        let first = plan_buy(&ctx(&p, &s, None, dec!(100)), TradeSize::Quantity(dec!(10))).unwrap();
        let held = upserted(&first);
        let p = Portfolio {
            cash_balance: first.new_cash_balance,
            ..p
        };
        let second =
            plan_buy(&ctx(&p, &s, Some(&held), dec!(200)), TradeSize::Quantity(dec!(10))).unwrap();
        let holding = upserted(&second);
        assert_eq!(holding.quantity, dec!(20));
        assert_eq!(holding.average_price, dec!(150));
        assert_eq!(holding.id, held.id);
        assert_eq!(second.new_cash_balance, dec!(7000));
    }

    #[test]
    fn test_buy_over_cash_is_rejected() {
        let p = portfolio(dec!(500));
        let s = stock();
        let err = plan_buy(&ctx(&p, &s, None, dec!(100)), TradeSize::Quantity(dec!(6))).unwrap_err();
        assert_eq!(
            err,
            TradeError::InsufficientFunds {
                required: dec!(600),
                available: dec!(500)
            }
        );
    }

    #[test]
    fn test_stock_rejects_fractional_and_amount_sizes() {
        let p = portfolio(dec!(500));
        let s = stock();
        let c = ctx(&p, &s, None, dec!(10));
        assert!(matches!(
            plan_buy(&c, TradeSize::Quantity(dec!(1.5))),
            Err(TradeError::InvalidTrade(_))
        ));
        assert!(matches!(
            plan_buy(&c, TradeSize::Amount(dec!(100))),
            Err(TradeError::InvalidTrade(_))
        ));
        assert!(matches!(
            plan_buy(&c, TradeSize::All),
            Err(TradeError::InvalidTrade(_))
        ));
        assert!(matches!(
            plan_buy(&c, TradeSize::Quantity(dec!(0))),
            Err(TradeError::InvalidTrade(_))
        ));
    }

    #[test]
    fn test_fund_amount_buy_converts_to_units() {
        let p = portfolio(dec!(5000));
        let f = fund();
        let commit = plan_buy(&ctx(&p, &f, None, dec!(37.5)), TradeSize::Amount(dec!(1000))).unwrap();
        let holding = upserted(&commit);
        assert_eq!(holding.quantity, dec!(26.666667));
        assert_eq!(commit.transaction.total_amount, dec!(1000));
        assert_eq!(commit.new_cash_balance, dec!(4000));
    }

    #[test]
    fn test_partial_sell_keeps_average() {
        let p = portfolio(dec!(0));
        let s = stock();
        let holding = Holding {
            id: "h1".to_string(),
            portfolio_id: "p1".to_string(),
            instrument_id: "s1".to_string(),
            quantity: dec!(10),
            average_price: dec!(150),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let commit =
            plan_sell(&ctx(&p, &s, Some(&holding), dec!(90)), TradeSize::Quantity(dec!(4))).unwrap();
        let after = upserted(&commit);
        assert_eq!(after.quantity, dec!(6));
        assert_eq!(after.average_price, dec!(150));
        assert_eq!(commit.new_cash_balance, dec!(360));
    }

    #[test]
    fn test_full_sell_deletes_holding() {
        let p = portfolio(dec!(0));
        let f = fund();
        let holding = Holding {
            id: "h2".to_string(),
            portfolio_id: "p1".to_string(),
            instrument_id: "f1".to_string(),
            quantity: dec!(12.345678),
            average_price: dec!(40),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let commit = plan_sell(&ctx(&p, &f, Some(&holding), dec!(41)), TradeSize::All).unwrap();
        assert_eq!(
            commit.holding_change,
            HoldingChange::Delete {
                holding_id: "h2".to_string()
            }
        );
        assert_eq!(commit.transaction.quantity, dec!(12.345678));
        assert_eq!(commit.new_cash_balance, dec!(506.17));
    }

    #[test]
    fn test_oversell_is_rejected() {
        let p = portfolio(dec!(0));
        let s = stock();
        let err = plan_sell(&ctx(&p, &s, None, dec!(90)), TradeSize::Quantity(dec!(1))).unwrap_err();
        assert_eq!(
            err,
            TradeError::InsufficientPosition {
                requested: dec!(1),
                held: dec!(0)
            }
        );
        assert!(matches!(
            plan_sell(&ctx(&p, &s, None, dec!(90)), TradeSize::All),
            Err(TradeError::InsufficientPosition { .. })
        ));
    }

    #[test]
    fn test_huge_stock_quantity_is_insufficient_funds() {
        let p = portfolio(dec!(100000));
        let s = stock();
        let quantity = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let err = plan_buy(&ctx(&p, &s, None, dec!(100)), TradeSize::Quantity(quantity)).unwrap_err();
        assert_eq!(
            err,
            TradeError::InsufficientFunds {
                required: Decimal::MAX,
                available: dec!(100000)
            }
        );
    }

    #[test]
    fn test_huge_fund_amount_is_insufficient_funds() {
        let p = portfolio(dec!(100000));
        let f = fund();
        let amount = Decimal::MAX;
        let err = plan_buy(&ctx(&p, &f, None, dec!(0.5)), TradeSize::Amount(amount)).unwrap_err();
        assert!(matches!(
            err,
            TradeError::InsufficientFunds { available, .. } if available == dec!(100000)
        ));

        let amount = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let err = plan_buy(&ctx(&p, &f, None, dec!(40)), TradeSize::Amount(amount)).unwrap_err();
        assert!(matches!(err, TradeError::InsufficientFunds { .. }));
    }

    #[test]
    fn test_huge_sell_quantity_is_insufficient_position() {
        let p = portfolio(dec!(0));
        let s = stock();
        let buyer = portfolio(dec!(1000));
        let held = upserted(
            &plan_buy(&ctx(&buyer, &s, None, dec!(100)), TradeSize::Quantity(dec!(2))).unwrap(),
        );
        let quantity = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let err = plan_sell(&ctx(&p, &s, Some(&held), dec!(100)), TradeSize::Quantity(quantity))
            .unwrap_err();
        assert!(matches!(err, TradeError::InsufficientPosition { .. }));
    }
}
