//! Configuration integration tests

use evallog::config::{ConfigurationLoader, EnvironmentLoader};
use evallog::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_load_from_file_and_build_loggers() {
    let temp_dir = TempDir::new().unwrap();
    let output_dir = temp_dir.path().join("eval");
    let config_path = temp_dir.path().join("eval.toml");
    std::fs::write(
        &config_path,
        format!(
            "[logging]\noutput_dir = {:?}\nwrite_n_results = 1\nevent_files = true\n",
            output_dir.display().to_string()
        ),
    )
    .unwrap();

    let env = EnvironmentLoader::default().with_prefix("EVALLOG_IT_NONE");
    let loader = ConfigurationLoader::with_environment(Some(config_path.as_path()), &env).unwrap();
    assert_eq!(loader.logging().output_dir, output_dir);
    assert_eq!(loader.logging().result_limit(), ResultLimit::First(1));

    let mut loggers = loader.logging().build_loggers();
    assert_eq!(loggers.len(), 2);

    let mut metrics = MetricMap::new();
    metrics.insert("accuracy".to_string(), Metric::scalar(1.0));
    let examples = vec![
        Example::new().with("inputs", "a"),
        Example::new().with("inputs", "b"),
    ];
    loggers
        .log(&LogCall::new("task", 5, &metrics).examples(&examples))
        .unwrap();

    assert!(output_dir.join("task-metrics.jsonl").exists());
    let records = std::fs::read_to_string(output_dir.join("task-000005.jsonl")).unwrap();
    assert_eq!(records.lines().count(), 1);
    assert!(output_dir.join("task").join("events.jsonl").exists());
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("missing.toml");
    let err = ConfigurationLoader::new(Some(missing.as_path())).unwrap_err();
    assert!(format!("{:#}", err).contains("Failed to read config file"));
}

#[test]
fn test_env_file_overrides() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join(".env");
    std::fs::write(
        &env_path,
        "EVALLOG_IT_DOTENV_OUTPUT_DIR=/tmp/from-dotenv\nEVALLOG_IT_DOTENV_WRITE_N_RESULTS=0\n",
    )
    .unwrap();

    let env = EnvironmentLoader::new(Some(env_path.as_path())).with_prefix("EVALLOG_IT_DOTENV");
    let loader = ConfigurationLoader::with_environment(None, &env).unwrap();
    assert_eq!(
        loader.logging().output_dir,
        PathBuf::from("/tmp/from-dotenv")
    );
    assert_eq!(loader.logging().result_limit(), ResultLimit::Disabled);
    assert_eq!(loader.config_path, None);
}
