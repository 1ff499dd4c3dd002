//! # Two-Stage Least Squares (2SLS)
//!
//! Instruments an endogenous institutions index with settler mortality and
//! compares the result with the biased OLS fit.
//!
//! ## When to Use
//! - A regressor is correlated with the error term
//! - An excluded instrument moves the regressor but not the response directly
//!
//! ## Key Features
//! - First-stage F statistic, partial R-squared and weak-instrument flag
//! - Robust covariance from the structural residuals
//! - Durbin-Wu-Hausman endogeneity test
//! - Rows with a missing instrument are dropped from every stage
//!
//! Run with: `cargo run --example iv`

use faer::{Col, Mat};
use ivreg::core::CovarianceType;
use ivreg::data::{Dataset, Design, IvSpec, ModelSpec};
use ivreg::solvers::{FittedIv, FittedRegressor, IvRegressor, OlsRegressor};
use ivreg::summary::SummaryTable;

fn main() {
    println!("=== Two-Stage Least Squares ===\n");

    let data = Dataset::from_csv_reader(settler_csv().as_bytes()).expect("CSV should parse");
    println!(
        "Loaded {} rows, {} missing logem4\n",
        data.n_rows(),
        data.column("logem4").map_or(0, |c| c.n_missing())
    );

    let spec = IvSpec::new("logpgp95")
        .endogenous(["avexpr"])
        .instruments(["logem4"]);
    let iv = IvRegressor::builder()
        .covariance(CovarianceType::HC1)
        .build()
        .fit_dataset(&data, &spec)
        .expect("2SLS fit should succeed");

    first_stage(&iv);
    comparison(&data, &iv);

    println!("--- Endogeneity ---\n");
    match iv.endogeneity_test() {
        Some(test) => println!(
            "Durbin-Wu-Hausman: chi2({}) = {:.3}, p = {:.4}",
            test.df, test.statistic, test.p_value
        ),
        None => println!("Durbin-Wu-Hausman: not computable"),
    }
}

/// CSV text where institutions depend on mortality and on the error term.
fn settler_csv() -> String {
    let mut csv = String::from("shortnam,logpgp95,avexpr,logem4\n");
    for i in 0..80 {
        let t = i as f64;
        let logem4 = 3.0 + 2.5 * (t * 0.61).sin().abs();
        let u = 0.5 * (t * 1.37).cos();
        let avexpr = 10.0 - 0.9 * logem4 + 0.8 * u + 0.3 * (t * 2.11).sin();
        let logpgp95 = 2.0 + 0.9 * avexpr + u;
        let instrument = if i % 17 == 4 {
            "NA".to_string()
        } else {
            format!("{logem4:.4}")
        };
        csv.push_str(&format!("C{i:02},{logpgp95:.4},{avexpr:.4},{instrument}\n"));
    }
    csv
}

/// Stage 1 regression and instrument strength
fn first_stage(iv: &FittedIv) {
    println!("--- First Stage ---\n");

    for stage in iv.first_stages() {
        let d = &stage.diagnostics;
        println!(
            "{} on {}: coefficient {:.3}, F = {:.2}, partial R-squared = {:.3}{}",
            stage.endogenous,
            d.instruments.join(", "),
            d.coefficients[0],
            d.f_statistic,
            d.partial_r_squared,
            if d.weak { " (weak)" } else { "" }
        );
    }
    println!();
}

/// OLS and 2SLS side by side on the same rows
fn comparison(data: &Dataset, iv: &FittedIv) {
    println!("--- OLS vs 2SLS ---\n");

    // Keep only rows with an instrument so both columns share a sample
    let full = data
        .design(&ModelSpec::new("logpgp95", ["avexpr"]))
        .expect("columns exist");
    let instrument = data.numeric("logem4").expect("logem4 is numeric");
    let rows: Vec<usize> = (0..full.n_observations())
        .filter(|&i| !instrument[i].is_nan())
        .collect();
    let sample = Design {
        response: full.response.clone(),
        regressors: full.regressors.clone(),
        x: Mat::from_fn(rows.len(), full.x.ncols(), |i, j| full.x[(rows[i], j)]),
        y: Col::from_fn(rows.len(), |i| full.y[rows[i]]),
    };

    let ols = OlsRegressor::builder()
        .covariance(CovarianceType::HC1)
        .build()
        .fit_design(&sample)
        .expect("OLS fit should succeed");
    println!(
        "OLS n = {}, 2SLS n = {}\n",
        ols.result().n_observations,
        iv.result().n_observations
    );

    let table = SummaryTable::builder()
        .models([ols.result(), iv.result()])
        .model_names(["OLS", "2SLS"])
        .regressor_order(["avexpr"])
        .with_default_info()
        .build()
        .expect("table should build");
    println!("{table}\n");
}
