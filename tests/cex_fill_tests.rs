// Integration tests for depth-consumption fill simulation

mod common;

use common::{depth_series, generate_depth_series, start_time};
use liquidation_slippage::{simulate_sell, simulate_sells, SlippageError};

#[test]
fn test_five_snapshot_scenario() {
    let series = depth_series(
        "coinbase",
        "btc-usd",
        &[100.0, 99.0, 98.0, 97.0, 96.0],
        &[1.0, 1.0, 1.0, 1.0, 1.0],
    );

    let fill = simulate_sell(&series, 250.0).expect("simulation should succeed");

    assert_eq!(fill.reference_price, 100.0);
    assert_eq!(fill.volume, 2.5);
    // Cumulative sizes are 1, 2, 3: index 2 is the first strictly above 2.5
    assert_eq!(fill.fill_index, Some(2));
    assert_eq!(fill.average_execution_price, Some(99.0));
    assert_eq!(fill.slippage(), Some(-0.01));
    assert_eq!(fill.start_time, start_time());
    assert_eq!(fill.filled_at, Some(start_time() + chrono::Duration::seconds(2)));
}

#[test]
fn test_fill_boundary_on_random_series() {
    for _ in 0..20 {
        let series = generate_depth_series(30_000.0, 600, 0.001, 0.5);
        let cumulative = series.cumulative_bid_size();

        for notional in [1_000.0, 50_000.0, 1_000_000.0] {
            let fill = simulate_sell(&series, notional).unwrap();

            match fill.fill_index {
                Some(i) => {
                    assert!(cumulative[i] > fill.volume);
                    if i > 0 {
                        assert!(cumulative[i - 1] <= fill.volume);
                    }

                    let window = &series.snapshots()[..=i];
                    let mean = window.iter().map(|s| s.bid_price).sum::<f64>() / window.len() as f64;
                    let avg = fill.average_execution_price.unwrap();
                    assert!((avg - mean).abs() < 1e-9);
                    assert_eq!(fill.filled_at, Some(window[i].timestamp));
                }
                None => {
                    assert!(cumulative.iter().all(|&c| c <= fill.volume));
                    assert_eq!(fill.average_execution_price, None);
                }
            }
        }
    }
}

#[test]
fn test_larger_orders_never_fill_earlier() {
    let series = generate_depth_series(2_000.0, 300, 0.002, 5.0);
    let notionals = [1_000.0, 10_000.0, 100_000.0, 1_000_000.0];

    let results = simulate_sells(&series, &notionals);
    let indices: Vec<Option<usize>> = results
        .iter()
        .map(|r| r.as_ref().unwrap().fill_index)
        .collect();

    for pair in indices.windows(2) {
        match (pair[0], pair[1]) {
            (Some(a), Some(b)) => assert!(a <= b),
            (None, Some(_)) => panic!("smaller order unfilled while larger filled"),
            _ => {}
        }
    }
}

#[test]
fn test_exhausted_depth_is_reported_not_raised() {
    let series = depth_series("kraken", "uni-usd", &[20.0, 19.5, 19.0], &[10.0, 10.0, 10.0]);

    let fill = simulate_sell(&series, 1_000_000.0).unwrap();
    assert!(!fill.is_filled());
    assert_eq!(fill.total_cost(), None);
}

#[test]
fn test_error_cases() {
    let series = depth_series("kraken", "eth-usd", &[2_000.0], &[1.0]);
    assert!(matches!(
        simulate_sell(&series, 0.0),
        Err(SlippageError::InvalidArgument(_, _))
    ));

    let empty = depth_series("kraken", "eth-usd", &[], &[]);
    assert!(matches!(
        simulate_sell(&empty, 100.0),
        Err(SlippageError::InsufficientData(_))
    ));

    let zero_bid = depth_series("kraken", "eth-usd", &[0.0, 2_000.0], &[1.0, 1.0]);
    assert!(matches!(
        simulate_sell(&zero_bid, 100.0),
        Err(SlippageError::InvalidMarketData(_))
    ));
}
