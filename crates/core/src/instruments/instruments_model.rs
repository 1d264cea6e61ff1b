//! Instrument domain models.

use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of tradable instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentKind {
    Stock,
    MutualFund,
    IndexFund,
}

impl InstrumentKind {
    /// Returns the database string representation (SCREAMING_SNAKE_CASE).
    pub const fn as_db_str(&self) -> &'static str {
        match self {
            InstrumentKind::Stock => "STOCK",
            InstrumentKind::MutualFund => "MUTUAL_FUND",
            InstrumentKind::IndexFund => "INDEX_FUND",
        }
    }

    /// Parses an instrument kind from its database string.
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "STOCK" => Some(InstrumentKind::Stock),
            "MUTUAL_FUND" => Some(InstrumentKind::MutualFund),
            "INDEX_FUND" => Some(InstrumentKind::IndexFund),
            _ => None,
        }
    }

    /// Funds trade in fractional units, stocks in whole shares.
    pub const fn allows_fractional_units(&self) -> bool {
        !matches!(self, InstrumentKind::Stock)
    }

    /// Category used when a catalog row carries an unknown risk label.
    pub const fn default_risk_category(&self) -> RiskCategory {
        match self {
            InstrumentKind::Stock => RiskCategory::Medium,
            InstrumentKind::MutualFund => RiskCategory::LargeCap,
            InstrumentKind::IndexFund => RiskCategory::Index,
        }
    }
}

/// Risk bucket that selects a volatility profile.
///
/// Stocks use `Low`/`Medium`/`High`; funds use the market-cap buckets.
/// The serialized spellings match the catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low")]
    Low,
    #[serde(rename = "Medium")]
    Medium,
    #[serde(rename = "High")]
    High,
    #[serde(rename = "large_cap")]
    LargeCap,
    #[serde(rename = "mid_cap")]
    MidCap,
    #[serde(rename = "small_cap")]
    SmallCap,
    #[serde(rename = "index")]
    Index,
}

impl RiskCategory {
    pub const ALL: [RiskCategory; 7] = [
        RiskCategory::Low,
        RiskCategory::Medium,
        RiskCategory::High,
        RiskCategory::LargeCap,
        RiskCategory::MidCap,
        RiskCategory::SmallCap,
        RiskCategory::Index,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            RiskCategory::Low => "Low",
            RiskCategory::Medium => "Medium",
            RiskCategory::High => "High",
            RiskCategory::LargeCap => "large_cap",
            RiskCategory::MidCap => "mid_cap",
            RiskCategory::SmallCap => "small_cap",
            RiskCategory::Index => "index",
        }
    }

    /// Strict parse, accepting the catalog spellings case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "low" => Some(RiskCategory::Low),
            "medium" | "moderate" => Some(RiskCategory::Medium),
            "high" => Some(RiskCategory::High),
            "large_cap" | "largecap" => Some(RiskCategory::LargeCap),
            "mid_cap" | "midcap" => Some(RiskCategory::MidCap),
            "small_cap" | "smallcap" => Some(RiskCategory::SmallCap),
            "index" => Some(RiskCategory::Index),
            _ => None,
        }
    }

    /// Parses a risk label, falling back to the kind's default profile.
    pub fn parse_lenient(s: &str, kind: InstrumentKind) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            let fallback = kind.default_risk_category();
            warn!(
                "Unknown risk category '{}' for {} instrument. Using '{}'.",
                s,
                kind.as_db_str(),
                fallback.as_str()
            );
            fallback
        })
    }

    /// Categories counted as high-risk exposure by the risk score.
    pub const fn is_high_risk(&self) -> bool {
        matches!(self, RiskCategory::High | RiskCategory::SmallCap)
    }
}

/// Kind-specific catalog fields. Never read by the pricing engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentDetails {
    #[serde(rename_all = "camelCase")]
    Stock { sector: String },
    #[serde(rename_all = "camelCase")]
    MutualFund {
        fund_house: Option<String>,
        expense_ratio: Option<Decimal>,
    },
    #[serde(rename_all = "camelCase")]
    IndexFund {
        tracked_index: Option<String>,
        expense_ratio: Option<Decimal>,
    },
}

/// Domain model for a simulated stock, mutual fund or index fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: String,
    pub symbol: String,
    pub name: String,
    /// Year-0 anchor price (NAV for funds). Immutable after creation.
    pub base_price: Decimal,
    pub risk_category: RiskCategory,
    #[serde(flatten)]
    pub details: InstrumentDetails,
}

impl Instrument {
    pub fn kind(&self) -> InstrumentKind {
        match self.details {
            InstrumentDetails::Stock { .. } => InstrumentKind::Stock,
            InstrumentDetails::MutualFund { .. } => InstrumentKind::MutualFund,
            InstrumentDetails::IndexFund { .. } => InstrumentKind::IndexFund,
        }
    }

    /// Sector for stocks, risk category label for funds.
    pub fn diversification_key(&self) -> &str {
        match &self.details {
            InstrumentDetails::Stock { sector } => sector.as_str(),
            _ => self.risk_category.as_str(),
        }
    }

    pub fn sector(&self) -> Option<&str> {
        match &self.details {
            InstrumentDetails::Stock { sector } => Some(sector.as_str()),
            _ => None,
        }
    }
}
