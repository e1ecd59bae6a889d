//! Learning-session driver, observers and result serialization

mod common;

use common::{FAKE_MAX_STEPS, fake_table_environment};
use rltoolbox::algorithm::{QConfig, QLearning};
use rltoolbox::session::{
    JsonlObserver, LearningSession, Observer, SessionConfig, SessionResult,
};
use tempfile::tempdir;

struct RecordingObserver {
    events: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
}

impl Observer for RecordingObserver {
    fn on_session_start(
        &mut self,
        algorithm: &str,
        environment: &str,
        total_episodes: usize,
    ) -> rltoolbox::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("start {algorithm} {environment} {total_episodes}"));
        Ok(())
    }

    fn on_episode_end(&mut self, episode: usize, steps: usize) -> rltoolbox::Result<()> {
        self.events
            .lock()
            .unwrap()
            .push(format!("episode {episode} {steps}"));
        Ok(())
    }

    fn on_session_end(&mut self) -> rltoolbox::Result<()> {
        self.events.lock().unwrap().push("end".to_string());
        Ok(())
    }
}

#[test]
fn observers_see_every_episode() {
    let events = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut algorithm = QLearning::new(fake_table_environment(), QConfig::default())
        .unwrap()
        .with_seed(1);
    let mut session = LearningSession::new(SessionConfig {
        episodes: 5,
        ..SessionConfig::default()
    })
    .with_observer(Box::new(RecordingObserver {
        events: events.clone(),
    }));
    let result = session.run(&mut algorithm).unwrap();
    assert_eq!(result.episodes, 5);
    assert_eq!(result.steps_per_episode.len(), 5);
    assert!(!result.learned);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 7);
    assert_eq!(events[0], "start Q(0) FakeContinuousEnvironment 5");
    assert_eq!(events[1], format!("episode 0 {FAKE_MAX_STEPS}"));
    assert_eq!(events[6], "end");
}

#[test]
fn jsonl_observer_writes_one_record_per_episode() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("episodes.jsonl");

    let mut algorithm = QLearning::new(fake_table_environment(), QConfig::default())
        .unwrap()
        .with_seed(1);
    let mut session = LearningSession::new(SessionConfig {
        episodes: 3,
        ..SessionConfig::default()
    })
    .with_observer(Box::new(JsonlObserver::new(&path).unwrap()));
    session.run(&mut algorithm).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);
    let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(record["episode"], 0);
    assert_eq!(record["steps"], FAKE_MAX_STEPS);
}

#[test]
fn early_stop_reports_learned() {
    let mut algorithm = QLearning::new(fake_table_environment(), QConfig::default())
        .unwrap()
        .with_seed(1);
    let mut session = LearningSession::new(SessionConfig {
        episodes: 50,
        stop_when_learned: true,
        steps_lte: 0,
        steps_gte: FAKE_MAX_STEPS,
        window: 2,
        render: false,
    });
    let result = session.run(&mut algorithm).unwrap();
    assert!(result.learned);
    assert_eq!(result.episodes, 2);
}

#[test]
fn session_result_roundtrips_through_json() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("result.json");
    let result = SessionResult {
        algorithm: "Q(0)".to_string(),
        environment: "GridEnvironment".to_string(),
        episodes: 2,
        steps_per_episode: vec![12, 9],
        learned: false,
    };
    result.save(&path).unwrap();
    let loaded = SessionResult::load(&path).unwrap();
    assert_eq!(loaded.algorithm, result.algorithm);
    assert_eq!(loaded.steps_per_episode, result.steps_per_episode);
    assert_eq!(loaded.episodes, 2);
}

#[test]
fn history_csv_export_covers_all_runs() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("history.csv");
    rltoolbox::export::write_history_csv(&path, &[vec![10, 8, 6], vec![20, 7]]).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "episode,run_0,run_1");
    assert_eq!(lines[1], "0,10,20");
    assert_eq!(lines[2], "1,8,7");
    assert_eq!(lines[3], "2,6,");
}
