//! Integration tests: each stage against files in an isolated base directory

use diagnostic_pipeline::prelude::*;
use diagnostic_pipeline::utils::{DataLoader, DataSaver};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> PipelineConfig {
    let config = PipelineConfig::default().with_base_dir(dir.path());
    config.paths.ensure_dirs().unwrap();
    config
}

fn contract_names() -> Vec<String> {
    FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect()
}

/// `n` rows of contract-shaped data; labels alternate 0/1 and class 1 rows
/// are shifted up so the classes separate
fn contract_dataset(n: usize) -> RawDataset {
    let target = Array1::from_shape_fn(n, |i| (i % 2) as f64);
    let features = Array2::from_shape_fn((n, FEATURE_COLUMNS.len()), |(i, j)| {
        (i + 1) as f64 * 0.1 + (j + 1) as f64 + target[i] * 5.0
    });
    RawDataset::new(features, contract_names(), target)
}

fn write_csv(path: &Path, df: &DataFrame) {
    fs::write(path, DataSaver::to_csv_bytes(df).unwrap()).unwrap();
}

fn feature_frame(rows: usize, cols: usize) -> DataFrame {
    let columns: Vec<Column> = (0..cols)
        .map(|j| {
            let values: Vec<f64> = (0..rows).map(|i| (i * (j + 1)) as f64 * 0.01).collect();
            Column::new(format!("f{}", j).into(), values)
        })
        .collect();
    DataFrame::new(columns).unwrap()
}

fn label_frame(rows: usize) -> DataFrame {
    let values: Vec<f64> = (0..rows).map(|i| (i % 2) as f64).collect();
    df!("target" => &values).unwrap()
}

fn load_and_preprocess(config: &PipelineConfig, raw: RawDataset) {
    LoadStage::with_provider(config, Box::new(InMemoryProvider::new(raw)))
        .run()
        .unwrap();
    PreprocessStage::new(config).run().unwrap();
}

// ─── Load ──────────────────────────────────────────────────────────────────────

#[test]
fn test_loader_writes_contract_table() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let stage = LoadStage::with_provider(&config, Box::new(InMemoryProvider::new(contract_dataset(10))));
    let artifact = stage.run().unwrap();
    assert_eq!(artifact.outputs, vec![config.paths.raw_data.clone()]);

    let raw = DataLoader::new().load_numeric_csv(&config.paths.raw_data).unwrap();
    assert_eq!(raw.height(), 10);
    assert!(config.schema.missing_columns(&raw).is_empty());
    assert_eq!(raw.get_column_names().last().unwrap().as_str(), "target");
}

#[test]
fn test_loader_schema_violation_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let full = contract_dataset(10);
    let keep: Vec<usize> = (0..30).filter(|j| *j != 3 && *j != 25).collect();
    let features = full.features.select(ndarray::Axis(1), &keep);
    let names = keep.iter().map(|j| FEATURE_COLUMNS[*j].to_string()).collect();
    let raw = RawDataset::new(features, names, full.target);

    let stage = LoadStage::with_provider(&config, Box::new(InMemoryProvider::new(raw)));
    match stage.run() {
        Err(PipelineError::SchemaViolation { missing }) => {
            assert_eq!(missing, vec!["mean area", "worst compactness"]);
        }
        other => panic!("expected SchemaViolation, got {:?}", other),
    }
    assert!(!config.paths.raw_data.exists());
}

#[test]
fn test_loader_keeps_nulls_for_preprocessing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    let mut raw = contract_dataset(10);
    raw.features[[4, 0]] = f64::NAN;
    LoadStage::with_provider(&config, Box::new(InMemoryProvider::new(raw)))
        .run()
        .unwrap();

    let table = DataLoader::new().load_numeric_csv(&config.paths.raw_data).unwrap();
    assert_eq!(table.column("mean radius").unwrap().null_count(), 1);
}

#[test]
fn test_loader_overwrites_previous_table() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::write(&config.paths.raw_data, "stale").unwrap();

    LoadStage::with_provider(&config, Box::new(InMemoryProvider::new(contract_dataset(12))))
        .run()
        .unwrap();

    let table = DataLoader::new().load_numeric_csv(&config.paths.raw_data).unwrap();
    assert_eq!(table.height(), 12);
}

// ─── Preprocess ────────────────────────────────────────────────────────────────

#[test]
fn test_preprocess_is_byte_deterministic() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    load_and_preprocess(&config, SyntheticProvider::default().fetch().unwrap());

    let outputs = [
        config.paths.x_train(),
        config.paths.x_test(),
        config.paths.y_train(),
        config.paths.y_test(),
    ];
    let first: Vec<Vec<u8>> = outputs.iter().map(|p| fs::read(p).unwrap()).collect();

    PreprocessStage::new(&config).run().unwrap();
    let second: Vec<Vec<u8>> = outputs.iter().map(|p| fs::read(p).unwrap()).collect();

    assert_eq!(first, second);
}

#[test]
fn test_preprocess_split_sizes() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    load_and_preprocess(&config, SyntheticProvider::default().fetch().unwrap());

    let loader = DataLoader::new();
    let x_train = loader.load_numeric_csv(&config.paths.x_train()).unwrap();
    let x_test = loader.load_numeric_csv(&config.paths.x_test()).unwrap();
    let y_train = loader.load_numeric_csv(&config.paths.y_train()).unwrap();
    let y_test = loader.load_numeric_csv(&config.paths.y_test()).unwrap();

    assert_eq!(x_train.height(), y_train.height());
    assert_eq!(x_test.height(), y_test.height());
    assert_eq!(x_test.height(), 114);
    assert_eq!(x_train.height(), 455);
    assert_eq!(x_train.width(), 30);
    assert_eq!(y_train.width(), 1);
    assert_eq!(y_train.get_column_names()[0].as_str(), "target");
}

#[test]
fn test_preprocess_imputes_with_presplit_median() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    // Scaling over all rows keeps the imputed value easy to predict
    config.preprocessing.scale_fit = ScaleFit::FullDataset;

    // 'mean radius' is 1..=10 plus one missing cell: median 5.5, which is
    // also the mean once filled, so the imputed cell scales to exactly 0
    let mut raw = contract_dataset(11);
    for i in 0..11 {
        raw.features[[i, 0]] = if i < 10 { (i + 1) as f64 } else { f64::NAN };
    }
    load_and_preprocess(&config, raw);

    let loader = DataLoader::new();
    let mut radius: Vec<f64> = Vec::new();
    for path in [config.paths.x_train(), config.paths.x_test()] {
        let df = loader.load_numeric_csv(&path).unwrap();
        let column = df.column("mean radius").unwrap();
        assert_eq!(column.null_count(), 0);
        radius.extend(column.f64().unwrap().into_no_null_iter());
    }

    assert_eq!(radius.len(), 11);
    let at_median = radius.iter().filter(|v| v.abs() < 1e-9).count();
    assert_eq!(at_median, 1);
}

#[test]
fn test_preprocess_failed_commit_keeps_previous_partitions() {
    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir);
    load_and_preprocess(&config, SyntheticProvider::default().fetch().unwrap());

    let kept = [config.paths.x_train(), config.paths.x_test(), config.paths.y_test()];
    let before: Vec<Vec<u8>> = kept.iter().map(|p| fs::read(p).unwrap()).collect();

    // y_train can no longer be replaced by a rename
    let y_train = config.paths.y_train();
    fs::remove_file(&y_train).unwrap();
    fs::create_dir(&y_train).unwrap();
    fs::write(y_train.join("occupied"), "x").unwrap();

    // A different seed would change every partition if the commit went through
    config.preprocessing.random_state = 7;
    assert!(PreprocessStage::new(&config).run().is_err());

    let after: Vec<Vec<u8>> = kept.iter().map(|p| fs::read(p).unwrap()).collect();
    assert_eq!(before, after);
    assert!(y_train.is_dir());
}

#[test]
fn test_preprocess_empty_raw_table() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let header: Vec<&str> = config.schema.required_columns();
    fs::write(&config.paths.raw_data, format!("{}\n", header.join(","))).unwrap();

    assert!(matches!(
        PreprocessStage::new(&config).run(),
        Err(PipelineError::EmptyDataset(_))
    ));
    assert!(!config.paths.x_train().exists());
}

#[test]
fn test_preprocess_schema_violation_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    let df = contract_dataset(10)
        .to_frame("target")
        .unwrap()
        .drop("worst symmetry")
        .unwrap();
    write_csv(&config.paths.raw_data, &df);

    assert!(matches!(
        PreprocessStage::new(&config).run(),
        Err(PipelineError::SchemaViolation { .. })
    ));
    for path in [config.paths.x_train(), config.paths.x_test(), config.paths.y_train(), config.paths.y_test()] {
        assert!(!path.exists());
    }
}

// ─── Train ─────────────────────────────────────────────────────────────────────

#[test]
fn test_trainer_row_mismatch() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_csv(&config.paths.x_train(), &feature_frame(100, 3));
    write_csv(&config.paths.y_train(), &label_frame(99));

    assert!(matches!(
        TrainStage::new(&config).run(),
        Err(PipelineError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_trainer_failure_keeps_previous_model() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::write(&config.paths.model, "previous").unwrap();
    write_csv(&config.paths.x_train(), &feature_frame(100, 3));
    write_csv(&config.paths.y_train(), &label_frame(99));

    assert!(TrainStage::new(&config).run().is_err());
    assert_eq!(fs::read_to_string(&config.paths.model).unwrap(), "previous");
}

#[test]
fn test_trainer_empty_features() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    fs::write(config.paths.x_train(), "f0,f1\n").unwrap();
    write_csv(&config.paths.y_train(), &label_frame(4));

    assert!(matches!(
        TrainStage::new(&config).run(),
        Err(PipelineError::EmptyDataset(_))
    ));
}

#[test]
fn test_trainer_rejects_non_binary_labels() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_csv(&config.paths.x_train(), &feature_frame(4, 2));
    write_csv(&config.paths.y_train(), &df!("target" => &[0.0, 1.0, 2.0, 1.0]).unwrap());

    assert!(matches!(
        TrainStage::new(&config).run(),
        Err(PipelineError::InvalidLabel(_))
    ));
}

#[test]
fn test_trainer_saves_loadable_model() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_csv(&config.paths.x_train(), &feature_frame(20, 3));
    write_csv(&config.paths.y_train(), &label_frame(20));

    TrainStage::new(&config).run().unwrap();

    let artifact = ModelArtifact::load(&config.paths.model).unwrap();
    assert_eq!(artifact.feature_names, vec!["f0", "f1", "f2"]);
    assert_eq!(artifact.fit.n_samples, 20);
    assert!(artifact.model.is_fitted());
}

// ─── Evaluate ──────────────────────────────────────────────────────────────────

fn train_small_model(config: &PipelineConfig, cols: usize) {
    write_csv(&config.paths.x_train(), &feature_frame(20, cols));
    write_csv(&config.paths.y_train(), &label_frame(20));
    TrainStage::new(config).run().unwrap();
}

#[test]
fn test_evaluator_empty_test_features() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    train_small_model(&config, 3);
    fs::write(config.paths.x_test(), "f0,f1,f2\n").unwrap();
    write_csv(&config.paths.y_test(), &label_frame(5));

    assert!(matches!(
        EvaluateStage::new(&config).run(),
        Err(PipelineError::EmptyDataset(_))
    ));
    assert!(!config.paths.metrics.exists());
}

#[test]
fn test_evaluator_string_artifact_is_not_a_model() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    write_csv(&config.paths.x_test(), &feature_frame(5, 3));
    write_csv(&config.paths.y_test(), &label_frame(5));
    fs::write(&config.paths.model, "\"a fitted model, honestly\"").unwrap();

    assert!(matches!(
        EvaluateStage::new(&config).run(),
        Err(PipelineError::NotAModel(_))
    ));
}

#[test]
fn test_evaluator_feature_count_mismatch() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    train_small_model(&config, 3);
    write_csv(&config.paths.x_test(), &feature_frame(5, 4));
    write_csv(&config.paths.y_test(), &label_frame(5));

    assert!(matches!(
        EvaluateStage::new(&config).run(),
        Err(PipelineError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_evaluator_row_mismatch() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    train_small_model(&config, 3);
    write_csv(&config.paths.x_test(), &feature_frame(5, 3));
    write_csv(&config.paths.y_test(), &label_frame(4));

    assert!(matches!(
        EvaluateStage::new(&config).run(),
        Err(PipelineError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_evaluator_feature_names_must_match_model() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);
    train_small_model(&config, 3);

    // Same width as at fit time, columns reordered
    let reordered = feature_frame(5, 3).select(["f2", "f1", "f0"]).unwrap();
    write_csv(&config.paths.x_test(), &reordered);
    write_csv(&config.paths.y_test(), &label_frame(5));

    match EvaluateStage::new(&config).run() {
        Err(PipelineError::ShapeMismatch { expected, actual }) => {
            assert!(expected.contains("\"f0\", \"f1\", \"f2\""), "{}", expected);
            assert!(actual.contains("\"f2\", \"f1\", \"f0\""), "{}", actual);
        }
        other => panic!("expected ShapeMismatch, got {:?}", other),
    }
    assert!(!config.paths.metrics.exists());
}
