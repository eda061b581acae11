//! Aggregator fold, merge linearity, and sentinel behavior.

use gachapon_core::{
    aggregate::Aggregator,
    config::{PatienceEntry, SimConfig},
    engine::SimEngine,
    error::SimError,
    snapshot::SnapshotPlan,
};

#[test]
fn merge_equals_sequential_fold() {
    let config = SimConfig::default_test();
    let plan = SnapshotPlan::from_config(&config);
    let engine = SimEngine::new("agg-linear".into(), config.clone(), 11).unwrap();

    let results: Vec<_> = (0..12)
        .map(|i| engine.run_lifetime(i).unwrap())
        .collect();

    let mut sequential = Aggregator::new(&config, &plan);
    for result in &results {
        sequential.add_result(result);
    }

    let mut merged = Aggregator::new(&config, &plan);
    for result in &results {
        let mut single = Aggregator::new(&config, &plan);
        single.add_result(result);
        merged.merge(single);
    }

    assert_eq!(sequential.runs(), merged.runs());
    assert_eq!(
        sequential.finalize().unwrap(),
        merged.finalize().unwrap(),
        "merging per-lifetime aggregates must equal one sequential fold"
    );
}

#[test]
fn finalize_without_runs_is_insufficient_data() {
    let config = SimConfig::default_test();
    let plan = SnapshotPlan::from_config(&config);
    let aggregator = Aggregator::new(&config, &plan);

    assert!(matches!(
        aggregator.finalize(),
        Err(SimError::InsufficientData { got: 0, .. })
    ));
}

#[test]
fn single_pull_patience_approximates_physical_share() {
    // Patience {1: 1.0}: every session is one pull, so an item's
    // success rate converges on its share of the remaining units,
    // which averages out to 1/3 across a whole lifetime.
    let config = SimConfig {
        items: vec!["A".into(), "B".into(), "C".into()],
        capsules_per_item: 10,
        desire_weights: vec![1.0 / 3.0; 3],
        patience: vec![None; 3],
        default_patience: vec![PatienceEntry { max_pulls: 1, weight: 1.0 }],
        lifetimes: 300,
        snapshot_thresholds: vec![1.0, 0.0],
    };
    let engine = SimEngine::new("agg-share".into(), config, 21).unwrap();
    let summary = engine.run().unwrap();

    assert_eq!(summary.mean_pulls_per_success, 1.0);
    assert_eq!(summary.mean_pulls_per_failure, 1.0);
    for stat in &summary.item_stats {
        assert!(
            (stat.success_rate - 1.0 / 3.0).abs() < 0.05,
            "{}: success rate {} should sit near its physical share",
            stat.item,
            stat.success_rate
        );
    }
}

#[test]
fn success_positions_account_for_every_success() {
    let config = SimConfig::default_test();
    let engine = SimEngine::new("agg-positions".into(), config, 4).unwrap();
    let summary = engine.run().unwrap();

    let successes: u64 = summary.item_stats.iter().map(|s| s.successes).sum();
    let positioned: u64 = summary.success_by_position.values().sum();
    assert_eq!(successes, positioned);

    // default_test patience tops out at 3 pulls.
    assert!(summary.success_by_position.keys().all(|&p| (1..=3).contains(&p)));
}

#[test]
fn never_desired_item_still_depletes_but_never_succeeds() {
    let config = SimConfig {
        items: vec!["Wanted".into(), "Also Wanted".into(), "Ignored".into()],
        capsules_per_item: 5,
        desire_weights: vec![0.5, 0.5, 0.0],
        patience: vec![None; 3],
        default_patience: vec![PatienceEntry { max_pulls: 2, weight: 1.0 }],
        lifetimes: 20,
        snapshot_thresholds: vec![1.0, 0.0],
    };
    let engine = SimEngine::new("agg-ignored".into(), config, 9).unwrap();
    let summary = engine.run().unwrap();

    let ignored = &summary.item_stats[2];
    assert_eq!(ignored.successes, 0);
    assert_eq!(ignored.failures, 0);
    assert_eq!(ignored.success_rate, 0.0);
    // The capsules are still in the machine; physics depletes them.
    assert!(ignored.mean_pulls_to_depletion.is_some());
}

#[test]
fn mean_snapshot_counts_divide_by_run_count() {
    let config = SimConfig::default_test();
    let plan = SnapshotPlan::from_config(&config);
    let engine = SimEngine::new("agg-means".into(), config.clone(), 2).unwrap();

    let mut aggregator = Aggregator::new(&config, &plan);
    for i in 0..4 {
        aggregator.add_result(&engine.run_lifetime(i).unwrap());
    }
    let summary = aggregator.finalize().unwrap();

    // The 100% level is identical every run, so its mean is exact.
    let full = &summary.thresholds[0];
    assert_eq!(full.label, "100%");
    for &mean in &full.mean_counts {
        assert_eq!(mean, config.capsules_per_item as f64);
    }
    assert_eq!(full.mean_total, config.total_capsules() as f64);

    // Rate samples pass through untouched: one per level per run.
    for level in 0..plan.len() {
        for item in 0..config.items.len() {
            assert_eq!(summary.rate_samples_for(level, item).len(), 4);
        }
    }
}
