//! Dataset loading and model selection tests.

mod common;

use approx::assert_relative_eq;
use common::institutions_dataset;
use ivreg::data::{Column, DataError, Dataset, ModelSpec, CONSTANT_COLUMN};
use ivreg::solvers::{FittedRegressor, OlsRegressor, RegressionError};

const CSV: &str = "\
country,growth,schooling,openness,region
A,1.2,3.1,0.40,north
B,2.9,5.0,0.55,south
C,2.1,4.2,NA,north
D,3.8,6.3,0.70,south
E,1.7,3.9,0.35,east
F,4.4,7.1,0.90,east
G,2.5,4.8,0.60,north
";

#[test]
fn test_csv_reader_infers_column_types() {
    let data = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();

    assert_eq!(data.n_rows(), 7);
    assert_eq!(
        data.column_names(),
        &["country", "growth", "schooling", "openness", "region"]
    );
    assert!(data.column("growth").unwrap().is_numeric());
    assert!(!data.column("region").unwrap().is_numeric());
    assert_eq!(data.column("openness").unwrap().n_missing(), 1);
}

#[test]
fn test_csv_path_round_trip_through_file() {
    let path = std::env::temp_dir().join(format!("ivreg_dataset_{}.csv", std::process::id()));
    std::fs::write(&path, CSV).unwrap();
    let from_file = Dataset::from_csv_path(&path);
    std::fs::remove_file(&path).ok();

    let from_reader = Dataset::from_csv_reader(CSV.as_bytes()).unwrap();
    assert_eq!(from_file.unwrap(), from_reader);
}

#[test]
fn test_missing_file_is_csv_error() {
    let err = Dataset::from_csv_path("/nonexistent/ivreg/data.csv").unwrap_err();
    assert!(matches!(err, DataError::Csv(_)));
}

#[test]
fn test_missing_column_is_reported_by_name() {
    let data = institutions_dataset();
    let spec = ModelSpec::new("logpgp95", ["avexpr", "malaria"]);
    match data.design(&spec) {
        Err(DataError::MissingColumn(name)) => assert_eq!(name, "malaria"),
        other => panic!("expected missing column error, got {other:?}"),
    }

    let err = OlsRegressor::default().fit_dataset(&data, &spec).unwrap_err();
    assert!(err.to_string().contains("malaria"));
    assert!(matches!(err, RegressionError::Data(DataError::MissingColumn(_))));
}

#[test]
fn test_categorical_regressor_is_rejected() {
    let data = institutions_dataset();
    let spec = ModelSpec::new("logpgp95", ["continent"]);
    assert!(matches!(
        data.design(&spec),
        Err(DataError::NotNumeric(name)) if name == "continent"
    ));
}

#[test]
fn test_explicit_constant_column() {
    let mut data = institutions_dataset();
    data.add_constant().unwrap();
    data.add_constant().unwrap();
    assert!(data.has_column(CONSTANT_COLUMN));
    assert_eq!(data.n_columns(), 7);

    // The estimator detects the ones column and does not add another
    let spec = ModelSpec::new("logpgp95", [CONSTANT_COLUMN, "avexpr"]);
    let with_const = OlsRegressor::default().fit_dataset(&data, &spec).unwrap();
    let implicit = OlsRegressor::default()
        .fit_dataset(&data, &ModelSpec::new("logpgp95", ["avexpr"]))
        .unwrap();

    assert!(!with_const.added_intercept());
    assert!(implicit.added_intercept());
    assert_eq!(with_const.result().feature_names, vec!["const", "avexpr"]);
    assert_relative_eq!(
        with_const.result().coefficient("avexpr").unwrap(),
        implicit.result().coefficient("avexpr").unwrap(),
        epsilon = 1e-10
    );
}

#[test]
fn test_constant_name_clash() {
    let mut data = Dataset::new()
        .with_column(CONSTANT_COLUMN, Column::from_f64([1.0, 2.0]))
        .unwrap();
    assert!(matches!(
        data.add_constant(),
        Err(DataError::DuplicateColumn(_))
    ));
}

#[test]
fn test_nested_specifications() {
    let data = institutions_dataset();
    let base = ModelSpec::new("logpgp95", ["avexpr"]);
    let wider = base.extend(["lat_abst"]);
    assert_eq!(wider.regressors, vec!["avexpr", "lat_abst"]);

    let ols = OlsRegressor::default();
    let small = ols.fit_dataset(&data, &base).unwrap();
    let large = ols.fit_dataset(&data, &wider).unwrap();

    assert_eq!(small.result().n_observations, 116);
    assert_eq!(large.result().n_observations, 111);
    assert_eq!(large.result().feature_names, vec!["const", "avexpr", "lat_abst"]);
    assert!(large.result().coefficient("lat_abst").unwrap() > 0.0);
    assert!(small.result().coefficient("avexpr").unwrap() > 0.0);
}
