use chrono::{NaiveDate, TimeZone, Utc};
use demand_forecast::data::{DemandEvent, EventStatus, SeriesBuilder};
use demand_forecast::forecast::{DemandForecaster, ForecastConfig};
use demand_forecast::recommend::{ReorderPolicy, StockSnapshot};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Poisson};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Demand Forecast: Reorder Report Example");
    println!("=======================================\n");

    let catalog = [
        ("fast-mover", 12.0, StockSnapshot::new(80, 15)),
        ("steady-seller", 4.0, StockSnapshot::new(60, 5)),
        ("slow-mover", 0.3, StockSnapshot::new(4, 0)),
        ("stocked-out", 6.0, StockSnapshot::new(10, 12)),
    ];

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 4, 29).unwrap();

    let builder = SeriesBuilder::new();
    let forecaster = DemandForecaster::new(ForecastConfig::recommendation());
    let policy = ReorderPolicy::new();

    // Each product is an independent computation; a real caller could
    // fan these out across threads
    for (seed, (product_id, mean_daily, snapshot)) in catalog.into_iter().enumerate() {
        let events = simulate_history(product_id, mean_daily, seed as u64);
        let series = builder.build(&events, start, end)?;

        let recommendation = forecaster.recommend(&series, snapshot, &policy)?;

        println!("── {} ──", product_id);
        print!("{}", recommendation);
        println!();
    }

    Ok(())
}

fn simulate_history(product_id: &str, mean_daily: f64, seed: u64) -> Vec<DemandEvent> {
    let mut rng = StdRng::seed_from_u64(seed);
    let poisson = Poisson::new(mean_daily).unwrap();

    (0..120)
        .map(|day| {
            DemandEvent::new(
                product_id,
                Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + chrono::Duration::days(day),
                poisson.sample(&mut rng),
                EventStatus::Completed,
            )
        })
        .collect()
}
