//! JSON logger integration tests
//!
//! These tests drive `JsonLogger` end to end and read the written files back.

use evallog::prelude::*;
use serde_json::{json, Value as Json};
use std::path::Path;
use tempfile::TempDir;

fn task_examples() -> Vec<Example> {
    vec![
        Example::new()
            .with("inputs_pretokenized", "i0")
            .with("targets_pretokenized", "t0"),
        Example::new()
            .with("inputs_pretokenized", "i1")
            .with("targets_pretokenized", "t1"),
    ]
}

fn accuracy(value: f64) -> MetricMap {
    let mut metrics = MetricMap::new();
    metrics.insert("accuracy".to_string(), Metric::scalar(value));
    metrics
}

fn targets() -> Vec<Value> {
    vec![Value::from("target0"), Value::from("target1")]
}

fn read_jsonl(path: &Path) -> Vec<Json> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line.trim()).unwrap())
        .collect()
}

fn log_task(
    logger: &mut JsonLogger,
    examples: &[Example],
    inferences: &Inferences,
    targets: &[Value],
) {
    let metrics = accuracy(100.0);
    logger
        .log(
            &LogCall::new("test", 42, &metrics)
                .examples(examples)
                .inferences(inferences)
                .targets(targets),
        )
        .unwrap();
}

fn assert_metrics_file(dir: &Path) {
    assert_eq!(
        read_jsonl(&dir.join("test-metrics.jsonl")),
        vec![json!({"step": 42, "accuracy": 100.0})]
    );
}

#[test]
fn test_logging() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new()
        .with_predictions(vec!["pred0", "pred1"])
        .with_scores(vec![0.2, 0.3]);

    log_task(&mut logger, &task_examples(), &inferences, &targets());

    assert_metrics_file(temp_dir.path());
    let metrics_line = std::fs::read_to_string(temp_dir.path().join("test-metrics.jsonl")).unwrap();
    assert_eq!(metrics_line, "{\"step\":42,\"accuracy\":100.0}\n");

    let actual = read_jsonl(&temp_dir.path().join("test-000042.jsonl"));
    let expected = vec![
        json!({
            "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
            "prediction": "pred0",
            "target": "target0",
            "score": 0.2
        }),
        json!({
            "input": {"inputs_pretokenized": "i1", "targets_pretokenized": "t1"},
            "prediction": "pred1",
            "target": "target1",
            "score": 0.3
        }),
    ];
    assert_eq!(actual, expected);

    // Field order on disk.
    let raw = std::fs::read_to_string(temp_dir.path().join("test-000042.jsonl")).unwrap();
    let first = raw.lines().next().unwrap();
    assert!(first.starts_with("{\"input\":{\"inputs_pretokenized\":\"i0\""));
    assert!(first.ends_with("\"prediction\":\"pred0\",\"target\":\"target0\",\"score\":0.2}"));
}

#[test]
fn test_n_prediction_and_scores() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path()).with_write_n_results(1);
    let inferences = Inferences::new()
        .with_predictions(vec!["pred0", "pred1"])
        .with_scores(vec![0.2, 0.3]);

    log_task(&mut logger, &task_examples(), &inferences, &targets());

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![json!({
            "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
            "prediction": "pred0",
            "target": "target0",
            "score": 0.2
        })]
    );
}

#[test]
fn test_predictions_only() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new().with_predictions(vec!["pred0", "pred1"]);

    log_task(&mut logger, &task_examples(), &inferences, &targets());

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![
            json!({
                "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
                "prediction": "pred0",
                "target": "target0"
            }),
            json!({
                "input": {"inputs_pretokenized": "i1", "targets_pretokenized": "t1"},
                "prediction": "pred1",
                "target": "target1"
            }),
        ]
    );
}

#[test]
fn test_numeric_data() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new()
        .with_predictions(vec![
            Value::from(NdArray::zeros(vec![2, 2])),
            Value::from(NdArray::ones(vec![2, 2])),
        ])
        .with_scores(vec![0.2, 0.3]);

    let mut metrics = MetricMap::new();
    metrics.insert("accuracy".to_string(), Metric::scalar(100f32));
    logger
        .log(
            &LogCall::new("test", 42, &metrics)
                .examples(&task_examples())
                .inferences(&inferences)
                .targets(&targets()),
        )
        .unwrap();

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![
            json!({
                "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
                "prediction": [[0.0, 0.0], [0.0, 0.0]],
                "score": 0.2,
                "target": "target0"
            }),
            json!({
                "input": {"inputs_pretokenized": "i1", "targets_pretokenized": "t1"},
                "prediction": [[1.0, 1.0], [1.0, 1.0]],
                "score": 0.3,
                "target": "target1"
            }),
        ]
    );
}

#[test]
fn test_non_serializable_prediction() {
    struct Unrenderable;

    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new()
        .with_predictions(vec![Value::opaque(Unrenderable), Value::opaque(Unrenderable)])
        .with_scores(vec![0.2, 0.3]);

    log_task(&mut logger, &task_examples(), &inferences, &targets());

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![
            json!({
                "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
                "score": 0.2,
                "target": "target0"
            }),
            json!({
                "input": {"inputs_pretokenized": "i1", "targets_pretokenized": "t1"},
                "score": 0.3,
                "target": "target1"
            }),
        ]
    );
}

#[test]
fn test_non_serializable_target() {
    struct Unrenderable;

    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new()
        .with_predictions(vec!["pred0", "pred1"])
        .with_scores(vec![0.2, 0.3]);
    let targets = vec![Value::opaque(Unrenderable), Value::opaque(Unrenderable)];

    log_task(&mut logger, &task_examples(), &inferences, &targets);

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![
            json!({
                "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
                "prediction": "pred0",
                "score": 0.2
            }),
            json!({
                "input": {"inputs_pretokenized": "i1", "targets_pretokenized": "t1"},
                "prediction": "pred1",
                "score": 0.3
            }),
        ]
    );
}

#[test]
fn test_prediction_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences =
        Inferences::new().with_predictions(vec![Value::bytes(vec![0x99]), Value::bytes(vec![0x88])]);

    log_task(&mut logger, &task_examples(), &inferences, &targets());

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![
            json!({
                "input": {"inputs_pretokenized": "i0", "targets_pretokenized": "t0"},
                "prediction": "mQ==",
                "target": "target0"
            }),
            json!({
                "input": {"inputs_pretokenized": "i1", "targets_pretokenized": "t1"},
                "prediction": "iA==",
                "target": "target1"
            }),
        ]
    );
}

#[test]
fn test_2d_ragged_input() {
    let row = |values: Vec<i32>| Value::from(NdArray::vector(ArrayData::I32(values)));
    let examples = vec![
        Example::new()
            .with("inputs", Value::seq(vec![row(vec![9, 4, 1]), row(vec![8, 1])]))
            .with("inputs_pretokenized", Value::seq(vec!["i0_0", "i0_1"])),
        Example::new()
            .with("inputs", Value::seq(vec![row(vec![9, 1]), row(vec![7, 2, 3, 1])]))
            .with("inputs_pretokenized", Value::seq(vec!["i1_0", "i1_1"])),
    ];

    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new()
        .with_predictions(vec!["pred0", "pred1"])
        .with_scores(vec![0.2, 0.3]);

    log_task(&mut logger, &examples, &inferences, &targets());

    assert_metrics_file(temp_dir.path());
    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-000042.jsonl")),
        vec![
            json!({
                "input": {"inputs": [[9, 4, 1], [8, 1]],
                          "inputs_pretokenized": ["i0_0", "i0_1"]},
                "prediction": "pred0",
                "target": "target0",
                "score": 0.2
            }),
            json!({
                "input": {"inputs": [[9, 1], [7, 2, 3, 1]],
                          "inputs_pretokenized": ["i1_0", "i1_1"]},
                "prediction": "pred1",
                "target": "target1",
                "score": 0.3
            }),
        ]
    );
}

#[test]
fn test_metrics_multiple_steps() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path()).with_write_n_results(0);

    logger
        .log(&LogCall::new("test", 42, &accuracy(100.0)))
        .unwrap();
    logger.log(&LogCall::new("test", 48, &accuracy(50.0))).unwrap();

    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-metrics.jsonl")),
        vec![
            json!({"step": 42, "accuracy": 100.0}),
            json!({"step": 48, "accuracy": 50.0}),
        ]
    );
    assert!(!temp_dir.path().join("test-000042.jsonl").exists());
    assert!(!temp_dir.path().join("test-000048.jsonl").exists());
}

#[test]
fn test_metrics_non_serializable() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path()).with_write_n_results(0);

    let mut metrics = MetricMap::new();
    metrics.insert("scalar".to_string(), Metric::scalar(100));
    metrics.insert("text".to_string(), Metric::text("foo"));
    metrics.insert("image".to_string(), Metric::image(NdArray::ones(vec![10])));
    logger.log(&LogCall::new("test", 42, &metrics)).unwrap();

    assert_eq!(
        read_jsonl(&temp_dir.path().join("test-metrics.jsonl")),
        vec![json!({"step": 42, "scalar": 100.0, "text": "foo"})]
    );
}

#[test]
fn test_short_score_list_omits_trailing_scores() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path());
    let inferences = Inferences::new()
        .with_predictions(vec!["pred0", "pred1"])
        .with_scores(vec![0.2]);

    log_task(&mut logger, &task_examples(), &inferences, &targets());

    let records = read_jsonl(&temp_dir.path().join("test-000042.jsonl"));
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["score"], 0.2);
    assert!(records[1].get("score").is_none());
    assert_eq!(records[1]["prediction"], "pred1");
}

#[test]
fn test_separate_tasks_use_separate_files() {
    let temp_dir = TempDir::new().unwrap();
    let mut logger = JsonLogger::new(temp_dir.path()).with_write_n_results(0);

    logger.log(&LogCall::new("mnli", 1, &accuracy(0.5))).unwrap();
    logger.log(&LogCall::new("rte", 1, &accuracy(0.7))).unwrap();

    assert_eq!(read_jsonl(&temp_dir.path().join("mnli-metrics.jsonl")).len(), 1);
    assert_eq!(
        read_jsonl(&temp_dir.path().join("rte-metrics.jsonl")),
        vec![json!({"step": 1, "accuracy": 0.7})]
    );
}
