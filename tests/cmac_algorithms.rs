//! CMAC algorithm family: layer-shaped tables and episode updates

mod common;

use common::{FAKE_MAX_STEPS, fake_cmac_environment};
use rltoolbox::algorithm::{
    AhcConfig, Algorithm, CmacAhc, CmacQ, CmacR, CmacSarsa, QConfig, RConfig,
};
use rltoolbox::session::SessionConfig;

#[test]
fn tables_are_shaped_per_layer() {
    let cmac_q = CmacQ::new(fake_cmac_environment(3), QConfig::default()).unwrap();
    assert_eq!(cmac_q.q().len(), 3);
    // base layer keeps the original (4, 3) shape, offset layers gain a bucket
    assert_eq!(cmac_q.q()[0].dim(), (12, 3));
    assert_eq!(cmac_q.q()[1].dim(), (20, 3));
    assert_eq!(cmac_q.q()[2].dim(), (20, 3));

    let cmac_ahc = CmacAhc::new(fake_cmac_environment(2), AhcConfig::default()).unwrap();
    assert_eq!(cmac_ahc.v().len(), 2);
    assert!(cmac_ahc.v()[0].iter().all(|&value| value == 1.0));
    assert_eq!(cmac_ahc.preferences()[0].sum(), 0.0);
}

#[test]
fn fresh_tables_tie_every_action() {
    let environment = fake_cmac_environment(2);
    let state = rltoolbox::environment::Environment::state(&environment);
    let cmac_q = CmacQ::new(environment, QConfig::default()).unwrap();
    assert_eq!(cmac_q.greedy_actions(&state), vec![0, 1, 2]);
}

#[test]
fn ahc_episode_touches_the_tables() {
    for lambd in [0.0, 0.2] {
        let config = AhcConfig {
            lambd,
            ..AhcConfig::default()
        };
        let mut algorithm = CmacAhc::new(fake_cmac_environment(2), config)
            .unwrap()
            .with_seed(3);
        let steps = algorithm.run_learning_episode(false).unwrap();
        assert_eq!(steps, FAKE_MAX_STEPS);
        let preference_sum: f64 = algorithm.preferences().iter().map(|table| table.sum()).sum();
        assert!(preference_sum != 0.0);
        // the critic moves regardless of trace mode
        let v_sum: f64 = algorithm.v().iter().map(|values| values.sum()).sum();
        assert!(v_sum != algorithm.v().iter().map(|values| values.len() as f64).sum::<f64>());
    }
}

#[test]
fn q_sarsa_r_episodes_touch_the_tables() {
    for lambd in [0.0, 0.2] {
        let mut q = CmacQ::new(
            fake_cmac_environment(2),
            QConfig {
                lambd,
                ..QConfig::default()
            },
        )
        .unwrap()
        .with_seed(17);
        q.run_learning_episode(false).unwrap();
        assert!(q.q().iter().map(|table| table.sum()).sum::<f64>() != 0.0);

        let mut sarsa = CmacSarsa::new(
            fake_cmac_environment(2),
            QConfig {
                lambd,
                ..QConfig::default()
            },
        )
        .unwrap()
        .with_seed(17);
        sarsa.run_learning_episode(false).unwrap();
        assert!(sarsa.q().iter().map(|table| table.sum()).sum::<f64>() != 0.0);

        let mut r = CmacR::new(
            fake_cmac_environment(2),
            RConfig {
                lambd,
                ..RConfig::default()
            },
        )
        .unwrap()
        .with_seed(17);
        r.run_learning_episode(false).unwrap();
        assert!(r.q().iter().map(|table| table.sum()).sum::<f64>() != 0.0);
    }
}

#[test]
fn learn_runs_multiple_episodes() {
    let mut algorithm = CmacQ::new(fake_cmac_environment(2), QConfig::default())
        .unwrap()
        .with_seed(23);
    let result = algorithm
        .learn(&SessionConfig {
            episodes: 3,
            ..SessionConfig::default()
        })
        .unwrap();
    assert_eq!(result.steps_per_episode, vec![FAKE_MAX_STEPS; 3]);
    assert_eq!(algorithm.name(), "CMAC-Q(0)");
}

#[test]
fn seeded_runs_are_reproducible() {
    let run = |seed: u64| {
        let mut algorithm = CmacSarsa::new(
            fake_cmac_environment(3),
            QConfig {
                epsilon: 0.2,
                ..QConfig::default()
            },
        )
        .unwrap()
        .with_seed(seed);
        algorithm.run_learning_episode(false).unwrap();
        algorithm
            .q()
            .iter()
            .map(|table| table.sum())
            .collect::<Vec<_>>()
    };
    assert_eq!(run(77), run(77));
}
