//! Common test utilities and data generators.

#![allow(dead_code)]

use faer::{Col, Mat};
use ivreg::data::{Column, Dataset};

/// Deterministic uniform(-1, 1) draws for reproducibility.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        ((self.0 >> 33) as f64) / ((1_u64 << 31) as f64) * 2.0 - 1.0
    }
}

/// The five-point example: x = 1..5, y = [2, 4, 5, 4, 5].
///
/// β = (2.2, 0.6), residuals [-0.8, 0.6, 1, -0.6, -0.2], (X'X)⁻¹ = [[1.1, -0.3], [-0.3, 0.1]].
pub fn five_points() -> (Mat<f64>, Col<f64>) {
    let x = Mat::from_fn(5, 1, |i, _| (i + 1) as f64);
    let y = Col::from_fn(5, |i| [2.0, 4.0, 5.0, 4.0, 5.0][i]);
    (x, y)
}

/// Generate simple linear data: y = x * beta + intercept + noise
pub fn generate_linear_data(
    n_samples: usize,
    n_features: usize,
    intercept: f64,
    noise_std: f64,
    seed: u64,
) -> (Mat<f64>, Col<f64>, Col<f64>) {
    let mut rng = Lcg::new(seed);

    let mut x = Mat::zeros(n_samples, n_features);
    let mut y = Col::zeros(n_samples);
    let true_coefficients = Col::from_fn(n_features, |j| (j + 1) as f64);

    for i in 0..n_samples {
        let mut yi = intercept;
        for j in 0..n_features {
            x[(i, j)] = rng.uniform();
            yi += x[(i, j)] * true_coefficients[j];
        }
        yi += noise_std * rng.uniform();
        y[i] = yi;
    }

    (x, y, true_coefficients)
}

/// Heteroskedastic data: noise scale grows with |x|.
pub fn generate_heteroskedastic_data(n_samples: usize, seed: u64) -> (Mat<f64>, Col<f64>) {
    let mut rng = Lcg::new(seed);
    let mut x = Mat::zeros(n_samples, 1);
    let mut y = Col::zeros(n_samples);
    for i in 0..n_samples {
        let xi = 2.0 * rng.uniform();
        x[(i, 0)] = xi;
        y[i] = 1.0 + 0.5 * xi + (0.1 + xi.abs()) * rng.uniform();
    }
    (x, y)
}

/// Data with one endogenous regressor and one instrument.
pub struct EndogenousData {
    pub y: Col<f64>,
    pub x: Mat<f64>,
    pub z: Mat<f64>,
}

/// x = 0.8 z + 0.6 u + v, y = 1 + 2 x + u.
///
/// OLS of y on x is biased upward by about 0.3; z is a strong instrument.
pub fn generate_endogenous_data(n_samples: usize, seed: u64) -> EndogenousData {
    let mut rng = Lcg::new(seed);
    let mut y = Col::zeros(n_samples);
    let mut x = Mat::zeros(n_samples, 1);
    let mut z = Mat::zeros(n_samples, 1);

    for i in 0..n_samples {
        let zi = rng.uniform();
        let ui = rng.uniform();
        let vi = rng.uniform();
        let xi = 0.8 * zi + 0.6 * ui + vi;
        z[(i, 0)] = zi;
        x[(i, 0)] = xi;
        y[i] = 1.0 + 2.0 * xi + ui;
    }

    EndogenousData { y, x, z }
}

/// Instrument that barely moves x: rows come in pairs sharing a base value,
/// with z = ±1 shifting x by ±0.01.
pub fn generate_weak_instrument_data(n_pairs: usize, seed: u64) -> EndogenousData {
    let mut rng = Lcg::new(seed);
    let n = 2 * n_pairs;
    let mut y = Col::zeros(n);
    let mut x = Mat::zeros(n, 1);
    let mut z = Mat::zeros(n, 1);

    for p in 0..n_pairs {
        let base = rng.uniform();
        for (offset, sign) in [(0, 1.0), (1, -1.0)] {
            let i = 2 * p + offset;
            z[(i, 0)] = sign;
            x[(i, 0)] = base + 0.01 * sign;
            y[i] = 1.0 + 2.0 * x[(i, 0)] + rng.uniform();
        }
    }

    EndogenousData { y, x, z }
}

/// Row permutation i -> (stride * i) mod n; `stride` must be coprime to n.
pub fn permutation(n: usize, stride: usize) -> Vec<usize> {
    (0..n).map(|i| (stride * i) % n).collect()
}

pub fn permute_rows(x: &Mat<f64>, order: &[usize]) -> Mat<f64> {
    Mat::from_fn(x.nrows(), x.ncols(), |i, j| x[(order[i], j)])
}

pub fn permute_col(y: &Col<f64>, order: &[usize]) -> Col<f64> {
    Col::from_fn(y.nrows(), |i| y[order[i]])
}

/// A cross-country style dataset: 116 rows, of which 5 lack `lat_abst`.
///
/// Columns: `shortnam` (text), `logpgp95`, `avexpr`, `lat_abst`, `logem4`,
/// `continent` (text).
pub fn institutions_dataset() -> Dataset {
    let n = 116;
    let mut rng = Lcg::new(2024);
    let continents = ["africa", "america", "asia", "other"];

    let mut names = Vec::with_capacity(n);
    let mut logpgp95 = Vec::with_capacity(n);
    let mut avexpr = Vec::with_capacity(n);
    let mut lat_abst = Vec::with_capacity(n);
    let mut logem4 = Vec::with_capacity(n);
    let mut continent = Vec::with_capacity(n);

    for i in 0..n {
        let em = 4.5 + 1.2 * rng.uniform();
        let lat = 0.3 + 0.25 * rng.uniform();
        let institutions = 11.0 - 0.6 * em + 0.8 * rng.uniform();
        let region = i % continents.len();
        let growth =
            4.5 + 0.55 * institutions + 1.2 * lat - 0.3 * region as f64 + 0.4 * rng.uniform();

        names.push(Some(format!("C{i:03}")));
        logpgp95.push(Some(growth));
        avexpr.push(Some(institutions));
        lat_abst.push(if i % 23 == 7 { None } else { Some(lat) });
        logem4.push(Some(em));
        continent.push(Some(continents[region].to_string()));
    }

    Dataset::new()
        .with_column("shortnam", Column::Categorical(names))
        .and_then(|d| d.with_column("logpgp95", Column::Numeric(logpgp95)))
        .and_then(|d| d.with_column("avexpr", Column::Numeric(avexpr)))
        .and_then(|d| d.with_column("lat_abst", Column::Numeric(lat_abst)))
        .and_then(|d| d.with_column("logem4", Column::Numeric(logem4)))
        .and_then(|d| d.with_column("continent", Column::Categorical(continent)))
        .expect("dataset columns are consistent")
}
