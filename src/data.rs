//! Demand event handling and daily series construction

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

/// Lifecycle status of a demand event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// Placed but not yet paid
    Pending,
    /// Payment captured
    Paid,
    /// Handed to the carrier
    Shipped,
    /// Delivered / closed out
    Completed,
    /// Cancelled before fulfilment
    Cancelled,
    /// Returned after fulfilment
    Returned,
}

impl EventStatus {
    /// Whether this status counts as realized demand by default
    pub fn counts_as_demand(&self) -> bool {
        matches!(
            self,
            EventStatus::Paid | EventStatus::Shipped | EventStatus::Completed
        )
    }

    /// The default set of statuses treated as realized demand
    pub fn demand_statuses() -> Vec<EventStatus> {
        vec![
            EventStatus::Paid,
            EventStatus::Shipped,
            EventStatus::Completed,
        ]
    }
}

impl FromStr for EventStatus {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" | "processing" | "created" => Ok(EventStatus::Pending),
            "paid" | "confirmed" => Ok(EventStatus::Paid),
            "shipped" | "fulfilled" => Ok(EventStatus::Shipped),
            "completed" | "complete" | "delivered" => Ok(EventStatus::Completed),
            "cancelled" | "canceled" | "void" => Ok(EventStatus::Cancelled),
            "returned" | "refunded" => Ok(EventStatus::Returned),
            other => Err(ForecastError::DataError(format!(
                "Unknown event status: '{}'",
                other
            ))),
        }
    }
}

/// Granularity at which an event's quantity is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGranularity {
    /// Quantity belongs to a single day
    Daily,
    /// Quantity is a month total, spread uniformly across its days
    Monthly,
}

impl Default for TimeGranularity {
    fn default() -> Self {
        TimeGranularity::Daily
    }
}

impl FromStr for TimeGranularity {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" | "d" => Ok(TimeGranularity::Daily),
            "monthly" | "month" | "m" => Ok(TimeGranularity::Monthly),
            other => Err(ForecastError::DataError(format!(
                "Unknown granularity: '{}'",
                other
            ))),
        }
    }
}

/// One historical transaction, supplied externally and never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandEvent {
    /// Product the event belongs to
    pub product_id: String,
    /// Instant the event occurred
    pub timestamp: DateTime<Utc>,
    /// Quantity demanded; non-finite or non-positive values contribute zero
    pub quantity: f64,
    /// Lifecycle status of the event
    pub status: EventStatus,
    /// Granularity of the quantity
    #[serde(default)]
    pub granularity: TimeGranularity,
}

impl DemandEvent {
    /// Create a daily event
    pub fn new(
        product_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        quantity: f64,
        status: EventStatus,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            timestamp,
            quantity,
            status,
            granularity: TimeGranularity::Daily,
        }
    }

    /// Create an event carrying a month total
    pub fn monthly(
        product_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        quantity: f64,
        status: EventStatus,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            timestamp,
            quantity,
            status,
            granularity: TimeGranularity::Monthly,
        }
    }
}

/// A gap-free daily demand series for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySeries {
    dates: Vec<NaiveDate>,
    values: Vec<f64>,
}

impl DailySeries {
    /// Create a new daily series, enforcing the shape invariant:
    /// equal lengths and dates strictly increasing by exactly one day.
    pub fn new(dates: Vec<NaiveDate>, values: Vec<f64>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidSeriesShape(format!(
                "dates length ({}) doesn't match values length ({})",
                dates.len(),
                values.len()
            )));
        }

        for pair in dates.windows(2) {
            if pair[1] - pair[0] != Duration::days(1) {
                return Err(ForecastError::InvalidSeriesShape(format!(
                    "dates must be consecutive days, found {} followed by {}",
                    pair[0], pair[1]
                )));
            }
        }

        Ok(Self { dates, values })
    }

    /// Create a series of consecutive days starting at `start`
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> Self {
        let dates = (0..values.len() as i64)
            .map(|offset| start + Duration::days(offset))
            .collect();
        // Dates are consecutive by construction
        Self { dates, values }
    }

    /// Get the dates
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Get the values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the length of the series
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Last date covered by the series, if any
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Sum of all values
    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Mean of the values; 0.0 for an empty series
    pub fn mean(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        self.sum() / self.values.len() as f64
    }

    /// Population standard deviation of the values; 0.0 when fewer than
    /// two observations exist
    pub fn std_dev(&self) -> f64 {
        if self.values.len() < 2 {
            return 0.0;
        }

        let mean = self.mean();
        let variance = self
            .values
            .iter()
            .map(|value| (value - mean).powi(2))
            .sum::<f64>()
            / self.values.len() as f64;

        variance.sqrt()
    }
}

/// Aggregates raw demand events into a gap-free daily series
#[derive(Debug, Clone)]
pub struct SeriesBuilder {
    demand_statuses: Vec<EventStatus>,
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SeriesBuilder {
    /// Create a builder using the default demand-status set
    pub fn new() -> Self {
        Self {
            demand_statuses: EventStatus::demand_statuses(),
        }
    }

    /// Create a builder counting only the given statuses as demand
    pub fn with_statuses(statuses: &[EventStatus]) -> Self {
        Self {
            demand_statuses: statuses.to_vec(),
        }
    }

    /// Build a daily series spanning every day in `[start, end]` inclusive.
    ///
    /// Each day's value is the sum of quantities of events whose status is
    /// in the demand set and whose date matches. Monthly quantities are
    /// spread uniformly across the days of their month; days falling
    /// outside the window are discarded. Pure function of its inputs.
    pub fn build(
        &self,
        events: &[DemandEvent],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<DailySeries> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "window start ({}) is after window end ({})",
                start, end
            )));
        }

        let num_days = (end - start).num_days() as usize + 1;
        let mut values = vec![0.0; num_days];

        for event in events {
            if !self.demand_statuses.contains(&event.status) {
                continue;
            }
            if !event.quantity.is_finite() || event.quantity <= 0.0 {
                continue;
            }

            match event.granularity {
                TimeGranularity::Daily => {
                    let date = event.timestamp.date_naive();
                    if date >= start && date <= end {
                        values[(date - start).num_days() as usize] += event.quantity;
                    }
                }
                TimeGranularity::Monthly => {
                    let date = event.timestamp.date_naive();
                    let month_start = date.with_day(1).ok_or_else(|| {
                        ForecastError::DataError(format!("invalid event date: {}", date))
                    })?;
                    let days_in_month = days_in_month(month_start);
                    let per_day = event.quantity / days_in_month as f64;

                    for offset in 0..days_in_month {
                        let day = month_start + Duration::days(offset);
                        if day >= start && day <= end {
                            values[(day - start).num_days() as usize] += per_day;
                        }
                    }
                }
            }
        }

        let dates = (0..num_days as i64)
            .map(|offset| start + Duration::days(offset))
            .collect();

        DailySeries::new(dates, values)
    }
}

/// Number of days in the month containing `month_start` (its first day)
fn days_in_month(month_start: NaiveDate) -> i64 {
    let (year, month) = (month_start.year(), month_start.month());
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    // First of a month always exists
    match next_month {
        Some(next) => (next - month_start).num_days(),
        None => 30,
    }
}

/// Loader for demand events from CSV files or DataFrames
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load demand events from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<DemandEvent>> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(df)
    }

    /// Extract demand events from an existing DataFrame
    pub fn from_dataframe(df: DataFrame) -> Result<Vec<DemandEvent>> {
        let time_column = Self::detect_column(&df, &["date", "time", "timestamp"])
            .ok_or_else(|| ForecastError::DataError("No time column found in data".to_string()))?;
        let quantity_column = Self::detect_column(&df, &["quantity", "qty", "units", "amount"])
            .ok_or_else(|| {
                ForecastError::DataError("No quantity column found in data".to_string())
            })?;
        let status_column = Self::detect_column(&df, &["status", "state"]);
        let product_column = Self::detect_column(&df, &["product", "sku", "item"]);
        let granularity_column = Self::detect_column(&df, &["granularity", "period"]);

        let timestamps = Self::column_as_timestamps(&df, &time_column)?;
        let quantities = Self::column_as_f64(&df, &quantity_column)?;
        let statuses = match &status_column {
            Some(name) => Self::column_as_strings(&df, name)?,
            None => vec![None; df.height()],
        };
        let products = match &product_column {
            Some(name) => Self::column_as_strings(&df, name)?,
            None => vec![None; df.height()],
        };
        let granularities = match &granularity_column {
            Some(name) => Self::column_as_strings(&df, name)?,
            None => vec![None; df.height()],
        };

        let mut events = Vec::with_capacity(df.height());
        for i in 0..df.height() {
            let timestamp = match timestamps[i] {
                Some(ts) => ts,
                None => continue, // rows without a date carry no signal
            };
            let quantity = quantities[i].unwrap_or(0.0);
            let status = match &statuses[i] {
                Some(s) => s.parse()?,
                None => EventStatus::Completed,
            };
            let granularity = match &granularities[i] {
                Some(g) => g.parse()?,
                None => TimeGranularity::Daily,
            };
            let product_id = products[i].clone().unwrap_or_else(|| "default".to_string());

            events.push(DemandEvent {
                product_id,
                timestamp,
                quantity,
                status,
                granularity,
            });
        }

        Ok(events)
    }

    /// Find the first column whose name contains one of the given hints
    fn detect_column(df: &DataFrame, hints: &[&str]) -> Option<String> {
        let column_names = df.get_column_names();
        for hint in hints {
            for name in &column_names {
                if name.to_lowercase().contains(hint) {
                    return Some(name.to_string());
                }
            }
        }
        None
    }

    /// Read a column as UTC timestamps, preserving row alignment
    fn column_as_timestamps(df: &DataFrame, column_name: &str) -> Result<Vec<Option<DateTime<Utc>>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Utf8 => Ok(col
                .utf8()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.and_then(parse_timestamp))
                .collect()),
            DataType::Date => Ok(col
                .date()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| {
                    opt.and_then(|days| {
                        NaiveDate::from_ymd_opt(1970, 1, 1)
                            .and_then(|epoch| epoch.checked_add_days(chrono::Days::new(days as u64)))
                            .and_then(|date| date.and_hms_opt(0, 0, 0))
                            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
                    })
                })
                .collect()),
            DataType::Datetime(_, _) => Ok(col
                .datetime()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| {
                    opt.and_then(|ts| {
                        chrono::NaiveDateTime::from_timestamp_opt(
                            ts / 1_000_000_000,
                            (ts % 1_000_000_000) as u32,
                        )
                        .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
                    })
                })
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| {
                    opt.and_then(|millis| {
                        chrono::NaiveDateTime::from_timestamp_millis(millis)
                            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
                    })
                })
                .collect()),
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has unsupported time type {:?}",
                column_name, other
            ))),
        }
    }

    /// Read a column as f64 values, preserving row alignment
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Float64 => Ok(col.f64().map_err(ForecastError::from)?.into_iter().collect()),
            DataType::Float32 => Ok(col
                .f32()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::Int64 => Ok(col
                .i64()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::Int32 => Ok(col
                .i32()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::UInt64 => Ok(col
                .u64()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            DataType::UInt32 => Ok(col
                .u32()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.map(|v| v as f64))
                .collect()),
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has unsupported numeric type {:?}",
                column_name, other
            ))),
        }
    }

    /// Read a column as strings, preserving row alignment
    fn column_as_strings(df: &DataFrame, column_name: &str) -> Result<Vec<Option<String>>> {
        let col = df.column(column_name).map_err(|e| {
            ForecastError::DataError(format!("Column '{}' not found: {}", column_name, e))
        })?;

        match col.dtype() {
            DataType::Utf8 => Ok(col
                .utf8()
                .map_err(ForecastError::from)?
                .into_iter()
                .map(|opt| opt.map(|s| s.to_string()))
                .collect()),
            other => Err(ForecastError::DataError(format!(
                "Column '{}' has unsupported string type {:?}",
                column_name, other
            ))),
        }
    }
}

/// Parse a timestamp from a date or RFC 3339 string
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
    }
    DateTime::parse_from_rfc3339(s.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
