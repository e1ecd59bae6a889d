//! Train command: argument parsing, summary and history output

use clap::Parser;
use rltoolbox::cli::commands::train::{TrainArgs, execute};
use tempfile::tempdir;

fn parse_args<I, T>(args: I) -> TrainArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    TrainArgs::parse_from(args)
}

#[test]
fn summary_without_extension_appends_json() {
    let tmp = tempdir().unwrap();
    let summary_stem = tmp.path().join("run_overview");

    let args = parse_args([
        "rltoolbox-train",
        "q",
        "--environment",
        "grid66",
        "--episodes",
        "5",
        "--seed",
        "7",
        "--summary",
        summary_stem.to_str().unwrap(),
        "--quiet",
    ]);

    execute(args).expect("training with summary should succeed");

    let expected_path = summary_stem.with_extension("json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );

    let contents = std::fs::read_to_string(&expected_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["episodes"], 5);
    assert_eq!(parsed["algorithm"], "Q(0)");
    assert_eq!(parsed["environment"], "GridEnvironment");
    assert_eq!(parsed["steps_per_episode"].as_array().unwrap().len(), 5);
}

#[test]
fn summary_directory_argument_creates_default_file() {
    let tmp = tempdir().unwrap();
    let summary_dir = tmp.path().join("summaries");
    let summary_arg = format!("{}/", summary_dir.display());

    let args = parse_args([
        "rltoolbox-train",
        "sarsa",
        "--environment",
        "grid66",
        "--episodes",
        "3",
        "--seed",
        "7",
        "--summary",
        &summary_arg,
        "--quiet",
    ]);

    execute(args).expect("training with directory summary should succeed");

    let expected_path = summary_dir.join("session_summary.json");
    assert!(
        expected_path.exists(),
        "expected summary at {}",
        expected_path.display()
    );
}

#[test]
fn history_csv_is_written() {
    let tmp = tempdir().unwrap();
    let history_path = tmp.path().join("history.csv");

    let args = parse_args([
        "rltoolbox-train",
        "q",
        "--environment",
        "grid66",
        "--episodes",
        "4",
        "--seed",
        "3",
        "--history",
        history_path.to_str().unwrap(),
        "--quiet",
    ]);

    execute(args).expect("training with history export should succeed");

    let contents = std::fs::read_to_string(&history_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "episode,run_0");
    assert_eq!(lines.len(), 5);
}

#[test]
fn grid_environments_reject_approximators() {
    let args = parse_args([
        "rltoolbox-train",
        "q",
        "--environment",
        "grid66",
        "--approximator",
        "table",
        "--quiet",
    ]);
    assert!(execute(args).is_err());
}

#[test]
fn fuzzy_family_has_no_ahc() {
    let args = parse_args([
        "rltoolbox-train",
        "ahc",
        "--environment",
        "ball-beam",
        "--approximator",
        "fuzzy",
        "--episodes",
        "1",
        "--max-steps",
        "20",
        "--quiet",
    ]);
    assert!(execute(args).is_err());
}

#[test]
fn cmac_training_on_a_continuous_environment() {
    let args = parse_args([
        "rltoolbox-train",
        "q",
        "--environment",
        "ball-beam",
        "--approximator",
        "cmac",
        "--n-layers",
        "3",
        "--episodes",
        "2",
        "--max-steps",
        "50",
        "--seed",
        "1",
        "--quiet",
    ]);
    execute(args).expect("CMAC training should succeed");
}

#[test]
fn fuzzy_training_on_a_continuous_environment() {
    let args = parse_args([
        "rltoolbox-train",
        "r",
        "--environment",
        "mountain-car",
        "--approximator",
        "fuzzy",
        "--episodes",
        "2",
        "--max-steps",
        "50",
        "--seed",
        "1",
        "--quiet",
    ]);
    execute(args).expect("fuzzy training should succeed");
}
