//! Threshold capture: exactly one snapshot per level, taken at the
//! precise draw where the level's bound is first reached.

use gachapon_core::{
    config::{PatienceEntry, SimConfig},
    engine::SimEngine,
    snapshot::SnapshotPlan,
};

#[test]
fn every_level_captured_exactly_once() {
    let config = SimConfig::default_test();
    let engine = SimEngine::new("snap-once".into(), config.clone(), 5).unwrap();

    for i in 0..20 {
        let result = engine.run_lifetime(i).unwrap();
        assert_eq!(result.snapshots.len(), config.snapshot_thresholds.len());
        for (level, snap) in result.snapshots.iter().enumerate() {
            assert!(snap.is_some(), "level {level} was never captured");
        }
    }
}

#[test]
fn snapshot_totals_hit_bounds_exactly() {
    // Draws remove one unit at a time, so the first state at or below
    // a bound is the bound itself. This is the conservation property:
    // no level is captured early or late.
    let config = SimConfig::default_test();
    let engine = SimEngine::new("snap-exact".into(), config, 5).unwrap();
    let plan = engine.plan();

    for i in 0..20 {
        let result = engine.run_lifetime(i).unwrap();
        for (level, snap) in result.snapshots.iter().enumerate() {
            let snap = snap.as_ref().unwrap();
            assert_eq!(
                snap.total(),
                plan.levels()[level].remaining_at_most,
                "lifetime {i}, level {level} captured off its bound"
            );
        }
    }
}

#[test]
fn capture_order_follows_decreasing_fullness() {
    let config = SimConfig::default_test();
    let engine = SimEngine::new("snap-order".into(), config, 8).unwrap();

    let result = engine.run_lifetime(0).unwrap();
    let totals: Vec<u64> = result
        .snapshots
        .iter()
        .map(|s| s.as_ref().unwrap().total())
        .collect();
    for pair in totals.windows(2) {
        assert!(
            pair[0] > pair[1],
            "snapshot totals must strictly decrease across the plan: {totals:?}"
        );
    }
}

#[test]
fn full_level_is_the_untouched_machine() {
    let config = SimConfig::default_test();
    let engine = SimEngine::new("snap-full".into(), config.clone(), 2).unwrap();
    let plan_index = engine.plan().level_index("100%").expect("100% level");

    let result = engine.run_lifetime(0).unwrap();
    let full = result.snapshots[plan_index].as_ref().unwrap();
    assert!(full
        .counts
        .iter()
        .all(|&c| c == config.capsules_per_item));
}

#[test]
fn zero_level_is_the_empty_machine() {
    let config = SimConfig::default_test();
    let engine = SimEngine::new("snap-zero".into(), config, 2).unwrap();
    let plan_index = engine.plan().level_index("0%").expect("0% level");

    let result = engine.run_lifetime(0).unwrap();
    let empty = result.snapshots[plan_index].as_ref().unwrap();
    assert_eq!(empty.total(), 0);
}

#[test]
fn quarter_threshold_on_fifty_capsule_machine() {
    // Five item types, ten capsules each: the 25% level (bound 12)
    // must show the state at the draw that first leaves 12 capsules,
    // regardless of where sessions start or end.
    let config = SimConfig {
        items: (0..5).map(|i| format!("Item {i}")).collect(),
        capsules_per_item: 10,
        desire_weights: vec![0.2; 5],
        patience: vec![None; 5],
        default_patience: vec![PatienceEntry { max_pulls: 4, weight: 1.0 }],
        lifetimes: 1,
        snapshot_thresholds: vec![1.0, 0.25, 0.0],
    };
    let engine = SimEngine::new("snap-quarter".into(), config, 77).unwrap();
    let quarter = engine.plan().level_index("25%").expect("25% level");

    for i in 0..50 {
        let result = engine.run_lifetime(i).unwrap();
        let snap = result.snapshots[quarter].as_ref().unwrap();
        assert_eq!(snap.total(), 12, "lifetime {i}: 25% of 50 capsules is bound 12");
        assert_eq!(snap.counts.len(), 5);
    }
}

#[test]
fn plan_levels_are_sorted_descending() {
    let mut config = SimConfig::default_test();
    config.snapshot_thresholds = vec![0.25, 1.0, 0.5, 0.0, 0.75];
    let plan = SnapshotPlan::from_config(&config);

    let labels: Vec<&str> = plan.levels().iter().map(|l| l.label.as_str()).collect();
    assert_eq!(labels, vec!["100%", "75%", "50%", "25%", "0%"]);

    let bounds: Vec<u64> = plan.levels().iter().map(|l| l.remaining_at_most).collect();
    assert_eq!(bounds, vec![12, 9, 6, 3, 0]);
}

#[test]
fn fractional_threshold_gets_decimal_label() {
    let mut config = SimConfig::default_test();
    config.snapshot_thresholds = vec![1.0, 0.125, 0.0];
    let plan = SnapshotPlan::from_config(&config);
    assert!(plan.level_index("12.5%").is_some());
}
