//! # Demand Forecast
//!
//! A Rust library for inventory demand forecasting, safety-stock sizing
//! and reorder recommendations.
//!
//! ## Features
//!
//! - Aggregation of raw demand events into gap-free daily series
//! - Z-score normalization and lagged feature construction
//! - A pluggable regression predictor (seeded bagged ridge by default)
//! - Temporal backtesting with mean absolute error reporting
//! - Recursive multi-step forecasting with a non-negativity clip
//! - Safety-stock and reorder-quantity computation with a risk ladder
//! - Graceful degradation to an average-based forecast on sparse history
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use demand_forecast::{
//!     DailySeries, DemandForecaster, ForecastConfig, ReorderPolicy, StockSnapshot,
//! };
//!
//! // Sixty days of flat demand
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = DailySeries::from_values(start, vec![4.0; 60]);
//!
//! // Forecast the next two weeks
//! let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
//! let outcome = forecaster.forecast(&series).unwrap();
//! assert_eq!(outcome.values.len(), 14);
//!
//! // Turn it into a reorder signal
//! let snapshot = StockSnapshot::new(40, 5);
//! let recommendation = forecaster
//!     .recommend(&series, snapshot, &ReorderPolicy::new())
//!     .unwrap();
//! assert!(recommendation.recommended_order_quantity >= 0);
//! ```

pub mod backtest;
pub mod data;
pub mod error;
pub mod features;
pub mod forecast;
pub mod models;
pub mod normalize;
pub mod recommend;

// Re-export commonly used types
pub use crate::backtest::{backtest, BacktestReport, MIN_TRAIN_SAMPLES};
pub use crate::data::{
    DailySeries, DataLoader, DemandEvent, EventStatus, SeriesBuilder, TimeGranularity,
};
pub use crate::error::{ForecastError, Result};
pub use crate::features::FeatureBuilder;
pub use crate::forecast::{
    DemandForecaster, ForecastConfig, ForecastMetadata, ForecastMethod, ForecastOutcome,
    ForecastResult,
};
pub use crate::models::{BaggedRidge, Predictor, RidgeRegression};
pub use crate::normalize::{normalize, NormalizationParams};
pub use crate::recommend::{
    InventoryRecommendation, ReorderPolicy, RiskLevel, StockSnapshot, SERVICE_LEVEL_Z,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
