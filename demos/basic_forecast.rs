use chrono::{NaiveDate, TimeZone, Utc};
use demand_forecast::data::{DemandEvent, EventStatus, SeriesBuilder};
use demand_forecast::forecast::{DemandForecaster, ForecastConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: Basic Forecasting Example");
    println!("==========================================\n");

    // Simulate four months of order history for one product
    println!("Creating sample demand events...");
    let events = create_sample_events();
    println!("Sample data created: {} events\n", events.len());

    // Aggregate into a gap-free daily series
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 4, 29).unwrap();
    let series = SeriesBuilder::new().build(&events, start, end)?;
    println!(
        "Daily series: {} days, mean {:.2}, std dev {:.2}\n",
        series.len(),
        series.mean(),
        series.std_dev()
    );

    // Forecast the next two weeks
    println!("Running the forecasting pipeline...");
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
    let outcome = forecaster.forecast(&series)?;

    println!("Method: {}", outcome.method);
    if let Some(mae) = outcome.backtest_mae {
        println!("Backtest MAE: {:.3} units/day", mae);
    }
    println!("Forecast for the next {} days:", outcome.values.len());
    for (i, value) in outcome.values.iter().enumerate() {
        println!("  Day {:>2}: {:.2}", i + 1, value);
    }
    println!("\nTotal expected demand: {:.1} units", outcome.forecast_total());

    // The trend view pairs history and horizon on one label axis
    let trend = forecaster.trend_forecast(&series)?;
    println!(
        "\nTrend view: {} labels ({} history + {} forecast)",
        trend.labels.len(),
        series.len(),
        trend.metadata.horizon
    );

    Ok(())
}

/// Poisson daily demand with a weekend lift
fn create_sample_events() -> Vec<DemandEvent> {
    let mut rng = StdRng::seed_from_u64(42);
    let weekday = Poisson::new(6.0).unwrap();
    let weekend = Poisson::new(10.0).unwrap();

    (0..120)
        .map(|day| {
            let timestamp =
                Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + chrono::Duration::days(day);
            let quantity = if day % 7 >= 5 {
                weekend.sample(&mut rng)
            } else {
                weekday.sample(&mut rng)
            };
            DemandEvent::new("widget", timestamp, quantity, EventStatus::Completed)
        })
        .collect()
}
