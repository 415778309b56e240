//! Invariants that hold for every valid configuration and seed.

use banditsim_core::{BanditSimulator, RngSampler, SimulationConfig, SourceBounds};
use proptest::prelude::*;

fn arb_config() -> impl Strategy<Value = SimulationConfig> {
    (
        prop::collection::vec((-50i64..50, 1i64..40), 1..5),
        0usize..4,
        0usize..60,
        0.0f64..=1.0,
        0.5f64..=1.0,
    )
        .prop_map(|(ranges, passes, extra, epsilon, decay_rate)| {
            let sources: Vec<SourceBounds> = ranges
                .into_iter()
                .map(|(lower, width)| SourceBounds::new(lower, lower + width))
                .collect();
            let steps = (passes * sources.len() + extra).max(1);
            SimulationConfig {
                sources,
                steps,
                exploration_passes: passes,
                initial_epsilon: Some(epsilon),
                decay_rate,
            }
        })
}

proptest! {
    #[test]
    fn run_invariants(config in arb_config(), seed in any::<u64>()) {
        let k = config.sources.len();
        let passes = config.exploration_passes;
        let steps = config.steps;
        let decay_rate = config.decay_rate;
        let bounds = config.sources.clone();

        let outcome = BanditSimulator::new(config)
            .unwrap()
            .run(&mut RngSampler::seeded(seed))
            .unwrap();
        let series = &outcome.series;

        prop_assert_eq!(series.len(), steps);
        prop_assert_eq!(series.cumulative_reward.len(), steps);
        prop_assert_eq!(series.chosen_index.len(), steps);
        prop_assert_eq!(series.epsilon_trace.len(), steps);

        let mut running = 0i64;
        for t in 0..steps {
            running += series.reward[t];
            prop_assert_eq!(series.cumulative_reward[t], running);

            let chosen = series.chosen_index[t];
            prop_assert!(chosen < k);
            let SourceBounds { lower, upper } = bounds[chosen];
            prop_assert!(lower <= series.reward[t] && series.reward[t] < upper);
        }

        for t in 0..passes * k {
            prop_assert_eq!(series.chosen_index[t], t % k);
        }

        for t in (passes * k).max(1)..steps {
            let expected = series.epsilon_trace[t - 1] * decay_rate;
            prop_assert_eq!(series.epsilon_trace[t], expected);
            prop_assert!(series.epsilon_trace[t] <= series.epsilon_trace[t - 1]);
        }

        for summary in &outcome.sources {
            let picked = series.chosen_index.iter().filter(|&&i| i == summary.index).count();
            prop_assert_eq!(summary.pulls as usize, picked);
            prop_assert!(summary.pulls >= passes as u64);
            if summary.pulls > 0 {
                prop_assert_eq!(
                    summary.running_average,
                    summary.cumulative_return as f64 / summary.pulls as f64
                );
            } else {
                prop_assert_eq!(summary.running_average, 0.0);
            }
        }

        prop_assert!(outcome.best_index < k);
        prop_assert_eq!(outcome.total_reward(), running);
    }
}
