//! End-of-run report rendering: composition tables per fullness
//! level, session statistics, and the rare-item significance test.

use gachapon_core::{
    aggregate::SimSummary,
    engine::SimEngine,
    error::SimError,
    significance::{test_rate, SIGNIFICANCE_LEVEL},
};
use std::cmp::Ordering;

pub fn print_report(engine: &SimEngine, summary: &SimSummary, test_item: Option<&str>) {
    println!("{}", "=".repeat(70));
    println!("    GACHAPON DEPLETION ANALYSIS ({} lifetimes)", summary.runs);
    println!("{}", "=".repeat(70));

    print_snapshots(summary);
    print_session_stats(summary);
    print_significance(engine, summary, test_item);

    println!();
    println!("{}", "=".repeat(70));
}

fn print_snapshots(summary: &SimSummary) {
    println!("\n--- Part 1: Machine Composition at Fullness Levels ---");
    for threshold in &summary.thresholds {
        println!(
            "\n  When machine is ~{} FULL (avg {:.2} capsules):",
            threshold.label, threshold.mean_total
        );
        let mut rows: Vec<(&str, f64)> = summary
            .items
            .iter()
            .map(String::as_str)
            .zip(threshold.mean_counts.iter().copied())
            .collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        for (item, mean_count) in rows {
            let rate = if threshold.mean_total > 0.0 {
                mean_count / threshold.mean_total
            } else {
                0.0
            };
            println!(
                "    - {item:<18}: {mean_count:>6.2} avg units | rate: {:>6.2}%",
                rate * 100.0
            );
        }
    }
}

fn print_session_stats(summary: &SimSummary) {
    println!("\n--- Part 2: Customer Sessions and Depletion ---");
    for stat in &summary.item_stats {
        let sessions = stat.successes + stat.failures;
        let depletion = match stat.mean_pulls_to_depletion {
            Some(mean) => format!("depletes at pull {mean:.1} on average"),
            None => "never observed depleting".to_string(),
        };
        println!(
            "    - {:<18}: {sessions} sessions, {:.2}% success | {depletion}",
            stat.item,
            stat.success_rate * 100.0
        );
    }
    println!(
        "    mean pulls per successful session: {:.2}",
        summary.mean_pulls_per_success
    );
    println!(
        "    mean pulls per failed session:     {:.2}",
        summary.mean_pulls_per_failure
    );
}

fn print_significance(engine: &SimEngine, summary: &SimSummary, test_item: Option<&str>) {
    let config = engine.config();

    let item_index = match test_item {
        Some(name) => match config.item_index(name) {
            Some(idx) => idx,
            None => {
                log::warn!("--test-item '{name}' is not in the catalog, skipping analysis");
                return;
            }
        },
        // Default to the most-desired item — the one whose abundance
        // drift is interesting.
        None => config
            .desire_weights
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(Ordering::Equal))
            .map(|(idx, _)| idx)
            .unwrap_or(0),
    };

    // Test at the lowest nonzero fullness level, where depletion
    // effects are strongest.
    let levels = engine.plan().levels();
    let level_index = levels
        .iter()
        .enumerate()
        .filter(|(_, l)| l.remaining_at_most > 0)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0);

    let item = &config.items[item_index];
    let label = &levels[level_index].label;
    let baseline = config.baseline_rate();

    println!("\n--- Part 3: Statistical Significance Analysis ---");
    println!("\n  Hypothesis test for '{item}' at '{label}' fullness:");
    println!(
        "    - Null hypothesis: the true average rate equals the baseline of {:.2}%.",
        baseline * 100.0
    );

    match test_rate(summary.rate_samples_for(level_index, item_index), baseline) {
        Ok(test) => {
            println!("    - Observed mean rate: {:.4}%", test.observed_mean * 100.0);
            println!("    - t-statistic: {:.4}", test.t_statistic);
            println!("    - p-value: {:.4}", test.p_value);
            if test.p_value < SIGNIFICANCE_LEVEL {
                println!(
                    "    - Conclusion: p < {SIGNIFICANCE_LEVEL}, reject the null hypothesis."
                );
            } else {
                println!(
                    "    - Conclusion: p >= {SIGNIFICANCE_LEVEL}, fail to reject the null hypothesis."
                );
                println!("      The drift from the baseline is NOT statistically significant.");
            }
        }
        Err(SimError::InsufficientData { .. }) => {
            println!("    Not enough data to perform the significance test.");
        }
        Err(e) => {
            log::error!("significance test failed: {e}");
        }
    }
}
