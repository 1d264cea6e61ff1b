//! Database model for catalog instruments.

use chrono::Utc;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::utils::{format_timestamp, parse_decimal};
use simvest_core::instruments::{Instrument, InstrumentDetails, InstrumentKind, RiskCategory};

/// Database model for instruments. `details` holds the kind-specific fields as JSON.
#[derive(
    Queryable, Identifiable, Insertable, Selectable, PartialEq, Serialize, Deserialize, Debug, Clone,
)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDB {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub kind: String,
    pub base_price: String,
    pub risk_category: String,
    pub details: String,
    pub created_at: String,
}

fn fallback_details(kind: InstrumentKind) -> InstrumentDetails {
    match kind {
        InstrumentKind::Stock => InstrumentDetails::Stock {
            sector: "Unclassified".to_string(),
        },
        InstrumentKind::MutualFund => InstrumentDetails::MutualFund {
            fund_house: None,
            expense_ratio: None,
        },
        InstrumentKind::IndexFund => InstrumentDetails::IndexFund {
            tracked_index: None,
            expense_ratio: None,
        },
    }
}

impl From<InstrumentDB> for Instrument {
    fn from(db: InstrumentDB) -> Self {
        let kind = InstrumentKind::from_db_str(&db.kind).unwrap_or_else(|| {
            log::error!("Unknown instrument kind '{}' for {}", db.kind, db.id);
            InstrumentKind::Stock
        });
        let details = serde_json::from_str::<InstrumentDetails>(&db.details).unwrap_or_else(|e| {
            log::error!("Failed to parse details for instrument {}: {}", db.id, e);
            fallback_details(kind)
        });
        Self {
            risk_category: RiskCategory::parse_lenient(&db.risk_category, kind),
            base_price: parse_decimal(&db.base_price, "base_price"),
            id: db.id,
            symbol: db.symbol,
            name: db.name,
            details,
        }
    }
}

impl TryFrom<Instrument> for InstrumentDB {
    type Error = serde_json::Error;

    fn try_from(domain: Instrument) -> Result<Self, Self::Error> {
        Ok(Self {
            kind: domain.kind().as_db_str().to_string(),
            details: serde_json::to_string(&domain.details)?,
            base_price: domain.base_price.to_string(),
            risk_category: domain.risk_category.as_str().to_string(),
            id: domain.id,
            symbol: domain.symbol,
            name: domain.name,
            created_at: format_timestamp(Utc::now()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_trips_fund_details() {
        let fund = Instrument {
            id: "f-1".to_string(),
            symbol: "AXMID".to_string(),
            name: "Axis Midcap".to_string(),
            base_price: dec!(85.50),
            risk_category: RiskCategory::MidCap,
            details: InstrumentDetails::MutualFund {
                fund_house: Some("Axis".to_string()),
                expense_ratio: Some(dec!(0.52)),
            },
        };
        let row = InstrumentDB::try_from(fund.clone()).unwrap();
        assert_eq!(row.kind, "MUTUAL_FUND");
        assert_eq!(row.risk_category, "mid_cap");
        assert_eq!(Instrument::from(row), fund);
    }

    #[test]
    fn test_corrupt_details_fall_back_by_kind() {
        let row = InstrumentDB {
            id: "s-1".to_string(),
            symbol: "ODD".to_string(),
            name: "Odd Corp".to_string(),
            kind: "STOCK".to_string(),
            base_price: "12.5".to_string(),
            risk_category: "???".to_string(),
            details: "{not json".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let instrument = Instrument::from(row);
        assert_eq!(instrument.risk_category, RiskCategory::Medium);
        assert_eq!(instrument.sector(), Some("Unclassified"));
        assert_eq!(instrument.base_price, dec!(12.5));
    }
}
