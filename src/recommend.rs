//! Safety stock and reorder recommendations

use crate::error::{ForecastError, Result};
use crate::forecast::ForecastMethod;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

/// One-sided z-value for a 95% service level. A known simplification:
/// it is applied to the daily demand deviation, not total lead-time
/// demand variance, and consumers depend on the exact constant.
pub const SERVICE_LEVEL_Z: f64 = 1.65;

/// Available stock at or below this is reported as low
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Current stock position for one product
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    /// Units on hand
    pub inventory: i64,
    /// Units already committed to open orders
    pub reserved_stock: i64,
}

impl StockSnapshot {
    pub fn new(inventory: i64, reserved_stock: i64) -> Self {
        Self {
            inventory,
            reserved_stock,
        }
    }

    /// Units actually available to sell, never negative
    pub fn available(&self) -> i64 {
        (self.inventory - self.reserved_stock).max(0)
    }
}

/// Supply risk for one product, from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    /// Nothing available
    Out,
    /// Available stock at or below the low threshold
    Low,
    /// Stock on hand but below the recommended minimum
    Reorder,
    /// No action needed
    Ok,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Out => write!(f, "out"),
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Reorder => write!(f, "reorder"),
            RiskLevel::Ok => write!(f, "ok"),
        }
    }
}

/// Reorder signal for one product, derived fresh on every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecommendation {
    /// Units available to sell right now
    pub available_stock: i64,
    /// Total demand expected over the forecast horizon
    pub forecast_total: f64,
    /// Buffer against forecast error, at least 1
    pub safety_stock: i64,
    /// Stock level to hold: forecast total plus safety stock
    pub recommended_minimum: i64,
    /// Units to order to reach the recommended minimum
    pub recommended_order_quantity: i64,
    /// How the underlying forecast was produced
    pub method: ForecastMethod,
    /// Supply risk, first match in out → low → reorder → ok order
    pub risk_level: RiskLevel,
}

impl std::fmt::Display for InventoryRecommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Inventory Recommendation:")?;
        writeln!(f, "  Available:       {}", self.available_stock)?;
        writeln!(f, "  Forecast total:  {:.2}", self.forecast_total)?;
        writeln!(f, "  Safety stock:    {}", self.safety_stock)?;
        writeln!(f, "  Minimum:         {}", self.recommended_minimum)?;
        writeln!(f, "  Order quantity:  {}", self.recommended_order_quantity)?;
        writeln!(f, "  Method:          {}", self.method)?;
        writeln!(f, "  Risk:            {}", self.risk_level)?;
        Ok(())
    }
}

/// Turns a forecast and a stock position into a reorder signal
#[derive(Debug, Clone)]
pub struct ReorderPolicy {
    z: f64,
    low_stock_threshold: i64,
}

impl Default for ReorderPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReorderPolicy {
    /// Policy with the standard 95% service-level buffer
    pub fn new() -> Self {
        Self {
            z: SERVICE_LEVEL_Z,
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        }
    }

    /// Policy sized for a different service level, 0 < level < 1.
    /// The z-value comes from the standard normal quantile; the default
    /// policy keeps the literal 1.65 instead.
    pub fn with_service_level(level: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&level) || level == 0.0 {
            return Err(ForecastError::InvalidParameter(
                "Service level must be strictly between 0 and 1".to_string(),
            ));
        }

        let standard_normal = Normal::new(0.0, 1.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        Ok(Self {
            z: standard_normal.inverse_cdf(level),
            low_stock_threshold: LOW_STOCK_THRESHOLD,
        })
    }

    /// Override the low-stock threshold
    pub fn with_low_stock_threshold(mut self, threshold: i64) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Buffer quantity above expected demand: `max(1, ceil(z·σ))`
    pub fn safety_stock(&self, sigma: f64) -> i64 {
        let buffer = (self.z * sigma.max(0.0)).ceil() as i64;
        buffer.max(1)
    }

    /// Combine a forecast total, demand volatility, and the current
    /// stock position into a reorder recommendation
    pub fn recommend(
        &self,
        snapshot: StockSnapshot,
        forecast_total: f64,
        sigma: f64,
        method: ForecastMethod,
    ) -> InventoryRecommendation {
        let available = snapshot.available();
        let forecast_total = forecast_total.max(0.0);
        let safety_stock = self.safety_stock(sigma);

        let recommended_minimum = ((forecast_total + safety_stock as f64).ceil() as i64).max(0);
        let recommended_order_quantity = (recommended_minimum - available).max(0);

        // Priority order: first match wins
        let risk_level = if available <= 0 {
            RiskLevel::Out
        } else if available <= self.low_stock_threshold {
            RiskLevel::Low
        } else if recommended_order_quantity > 0 {
            RiskLevel::Reorder
        } else {
            RiskLevel::Ok
        };

        InventoryRecommendation {
            available_stock: available,
            forecast_total,
            safety_stock,
            recommended_minimum,
            recommended_order_quantity,
            method,
            risk_level,
        }
    }
}
