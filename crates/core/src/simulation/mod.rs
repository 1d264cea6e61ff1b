//! Deterministic, time-accelerated market simulation.
//!
//! The yearly reference price of an instrument is a pure function of its id,
//! base price, risk category and the simulated year. Intraday jitter is drawn
//! around that reference on every tick and never fed back into it.

mod clock;
mod jitter;
mod market_model;
mod market_service;
mod market_session;
mod price_walk;
mod seeded_random;
mod session_manager;
mod simulation_settings;
mod ticker;
mod volatility;
mod year_clock;

pub use clock::{Clock, ManualClock, SystemClock};
pub use jitter::{change_from_base, jitter_factor, jittered_price};
pub use market_model::{InstrumentQuote, PriceSource, ReferenceBoard, YearlyPricePoint};
pub use market_service::MarketService;
pub use market_session::MarketSession;
pub use price_walk::{floor_price, round_price, PriceWalk, YearlyPriceCache};
pub use seeded_random::{base_seed, seeded_random, year_seed};
pub use session_manager::{SessionDriver, SessionManager};
pub use simulation_settings::{SimulationSettings, TickIntervals};
pub use ticker::{TickTarget, Ticker};
pub use volatility::*;
pub use year_clock::{simulated_year, YearClock};
