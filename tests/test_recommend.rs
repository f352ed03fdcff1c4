use demand_forecast::forecast::ForecastMethod;
use demand_forecast::recommend::{
    ReorderPolicy, RiskLevel, StockSnapshot, LOW_STOCK_THRESHOLD, SERVICE_LEVEL_Z,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn rank(risk: RiskLevel) -> u8 {
    match risk {
        RiskLevel::Out => 0,
        RiskLevel::Low => 1,
        RiskLevel::Reorder => 2,
        RiskLevel::Ok => 3,
    }
}

#[test]
fn test_available_stock_never_goes_negative() {
    assert_eq!(StockSnapshot::new(10, 3).available(), 7);
    assert_eq!(StockSnapshot::new(3, 10).available(), 0);
    assert_eq!(StockSnapshot::new(0, 0).available(), 0);
}

#[rstest]
#[case(0.0, 1)] // floor of 1 even with zero volatility
#[case(10.0, 17)] // ceil(1.65 * 10)
#[case(1.0, 2)] // ceil(1.65)
#[case(100.0, 165)]
fn test_safety_stock_formula(#[case] sigma: f64, #[case] expected: i64) {
    let policy = ReorderPolicy::new();
    assert_eq!(policy.safety_stock(sigma), expected);
}

#[test]
fn test_recommended_quantities() {
    let policy = ReorderPolicy::new();
    let recommendation = policy.recommend(
        StockSnapshot::new(20, 0),
        56.0,
        0.0,
        ForecastMethod::Average,
    );

    assert_eq!(recommendation.available_stock, 20);
    assert_eq!(recommendation.safety_stock, 1);
    assert_eq!(recommendation.recommended_minimum, 57);
    assert_eq!(recommendation.recommended_order_quantity, 37);
    assert_eq!(recommendation.method, ForecastMethod::Average);
    assert_eq!(recommendation.risk_level, RiskLevel::Reorder);
}

#[test]
fn test_zero_available_is_always_out() {
    let policy = ReorderPolicy::new();

    // Regardless of forecast size or volatility
    for (total, sigma) in [(0.0, 0.0), (56.0, 10.0), (10000.0, 500.0)] {
        let recommendation = policy.recommend(
            StockSnapshot::new(0, 0),
            total,
            sigma,
            ForecastMethod::Regression,
        );
        assert_eq!(recommendation.risk_level, RiskLevel::Out);
    }

    // Reserved stock swallowing the inventory counts as out too
    let recommendation = policy.recommend(
        StockSnapshot::new(5, 9),
        10.0,
        1.0,
        ForecastMethod::Regression,
    );
    assert_eq!(recommendation.risk_level, RiskLevel::Out);
}

#[rstest]
#[case(100, RiskLevel::Ok)]
#[case(57, RiskLevel::Ok)]
#[case(56, RiskLevel::Reorder)]
#[case(20, RiskLevel::Reorder)]
#[case(LOW_STOCK_THRESHOLD, RiskLevel::Low)]
#[case(2, RiskLevel::Low)]
#[case(0, RiskLevel::Out)]
fn test_risk_ladder(#[case] inventory: i64, #[case] expected: RiskLevel) {
    let policy = ReorderPolicy::new();
    let recommendation = policy.recommend(
        StockSnapshot::new(inventory, 0),
        56.0,
        0.0,
        ForecastMethod::Regression,
    );
    assert_eq!(recommendation.risk_level, expected);
}

#[test]
fn test_risk_only_worsens_as_availability_shrinks() {
    let policy = ReorderPolicy::new();

    let mut previous_rank = None;
    for available in (0..=120).rev() {
        let recommendation = policy.recommend(
            StockSnapshot::new(available, 0),
            56.0,
            10.0,
            ForecastMethod::Regression,
        );
        let current = rank(recommendation.risk_level);
        if let Some(previous) = previous_rank {
            assert!(
                current <= previous,
                "risk improved from {} to {} as available fell to {}",
                previous,
                current,
                available
            );
        }
        previous_rank = Some(current);
    }
}

#[test]
fn test_order_quantity_is_never_negative() {
    let policy = ReorderPolicy::new();
    let recommendation = policy.recommend(
        StockSnapshot::new(1000, 0),
        5.0,
        1.0,
        ForecastMethod::Regression,
    );

    assert_eq!(recommendation.recommended_order_quantity, 0);
    assert_eq!(recommendation.risk_level, RiskLevel::Ok);
}

#[test]
fn test_negative_forecast_total_is_floored() {
    let policy = ReorderPolicy::new();
    let recommendation = policy.recommend(
        StockSnapshot::new(10, 0),
        -25.0,
        0.0,
        ForecastMethod::Average,
    );

    assert_eq!(recommendation.forecast_total, 0.0);
    assert_eq!(recommendation.recommended_minimum, 1);
}

#[test]
fn test_configurable_service_level_changes_the_buffer() {
    let default_policy = ReorderPolicy::new();
    let strict_policy = ReorderPolicy::with_service_level(0.99).unwrap();

    // z(0.99) ≈ 2.326 against the default 1.65
    assert_eq!(default_policy.safety_stock(100.0), 165);
    assert_eq!(strict_policy.safety_stock(100.0), 233);

    assert!(ReorderPolicy::with_service_level(0.0).is_err());
    assert!(ReorderPolicy::with_service_level(1.0).is_err());
    assert!(ReorderPolicy::with_service_level(-0.5).is_err());
}

#[test]
fn test_default_z_is_the_literal_constant() {
    // Consumers depend on the exact 1.65, not the true 95% quantile
    assert_eq!(SERVICE_LEVEL_Z, 1.65);
}

#[test]
fn test_recommendation_serializes_as_a_flat_record() {
    let policy = ReorderPolicy::new();
    let recommendation = policy.recommend(
        StockSnapshot::new(3, 0),
        56.0,
        10.0,
        ForecastMethod::Average,
    );

    let json = serde_json::to_value(&recommendation).unwrap();

    assert_eq!(json["available_stock"], 3);
    assert_eq!(json["forecast_total"], 56.0);
    assert_eq!(json["safety_stock"], 17);
    assert_eq!(json["recommended_minimum"], 73);
    assert_eq!(json["recommended_order_quantity"], 70);
    assert_eq!(json["method"], "average");
    assert_eq!(json["risk_level"], "low");
}
