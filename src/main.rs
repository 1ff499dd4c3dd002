//! ivreg command-line interface.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use faer::{Col, Mat};
use ivreg::core::{CovarianceType, NaAction, RegressionResult};
use ivreg::data::{
    CategoryOrder, Dataset, Design, DummyEncoder, IvSpec, ModelSpec, CONSTANT_COLUMN,
};
use ivreg::solvers::{FittedOls, FittedRegressor, IvRegressor, OlsRegressor};
use ivreg::summary::SummaryTable;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ivreg")]
#[command(about = "OLS and 2SLS regression tables from CSV data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fit one or more OLS specifications and print them side by side
    Ols {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Response column
        #[arg(short, long)]
        response: String,

        /// Comma-separated regressors of one model; repeat for more models
        #[arg(short, long = "model", required = true)]
        models: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,

        /// Decimal places in the table
        #[arg(long, default_value = "4")]
        decimals: usize,

        /// Table title
        #[arg(long)]
        title: Option<String>,

        /// Comma-separated regressors to list first
        #[arg(long, value_delimiter = ',')]
        order: Vec<String>,
    },

    /// Fit a 2SLS model and print first-stage diagnostics
    Iv {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Response column
        #[arg(short, long)]
        response: String,

        /// Endogenous regressors
        #[arg(long, value_delimiter = ',', required = true)]
        endog: Vec<String>,

        /// Excluded instruments
        #[arg(long = "instrument", value_delimiter = ',', required = true)]
        instruments: Vec<String>,

        /// Included exogenous regressors
        #[arg(long, value_delimiter = ',')]
        exog: Vec<String>,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Print the indicator columns of a categorical column as CSV
    Dummies {
        /// Input CSV file with a header row
        input: PathBuf,

        /// Column to encode
        #[arg(short, long)]
        column: String,

        /// Order categories by first appearance instead of sorting
        #[arg(long)]
        first_seen: bool,

        /// Omit the first category
        #[arg(long)]
        drop_first: bool,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Coefficient covariance estimator
    #[arg(long, value_enum, default_value_t = CovArg::Hc0)]
    cov: CovArg,

    /// Handling of rows with missing values
    #[arg(long, value_enum, default_value_t = NaArg::Drop)]
    na: NaArg,

    /// Do not add a constant column
    #[arg(long)]
    no_constant: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CovArg {
    Nonrobust,
    Hc0,
    Hc1,
    Hc2,
    Hc3,
}

impl From<CovArg> for CovarianceType {
    fn from(arg: CovArg) -> Self {
        match arg {
            CovArg::Nonrobust => CovarianceType::Classical,
            CovArg::Hc0 => CovarianceType::HC0,
            CovArg::Hc1 => CovarianceType::HC1,
            CovArg::Hc2 => CovarianceType::HC2,
            CovArg::Hc3 => CovarianceType::HC3,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NaArg {
    Drop,
    Exclude,
    Fail,
}

impl From<NaArg> for NaAction {
    fn from(arg: NaArg) -> Self {
        match arg {
            NaArg::Drop => NaAction::Omit,
            NaArg::Exclude => NaAction::Exclude,
            NaArg::Fail => NaAction::Fail,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Ols {
            input,
            response,
            models,
            common,
            decimals,
            title,
            order,
        } => cmd_ols(&input, &response, &models, &common, decimals, title, &order),
        Commands::Iv {
            input,
            response,
            endog,
            instruments,
            exog,
            common,
        } => cmd_iv(&input, &response, &endog, &instruments, &exog, &common),
        Commands::Dummies {
            input,
            column,
            first_seen,
            drop_first,
        } => cmd_dummies(&input, &column, first_seen, drop_first),
    }
}

fn load(path: &Path, common: Option<&CommonArgs>) -> Result<Dataset> {
    let mut data = Dataset::from_csv_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    if common.is_some_and(|c| !c.no_constant) {
        data.add_constant().context("failed to add constant column")?;
    }
    Ok(data)
}

fn with_constant(common: &CommonArgs, names: &[String]) -> Vec<String> {
    let constant = (!common.no_constant).then(|| CONSTANT_COLUMN.to_string());
    constant
        .into_iter()
        .chain(names.iter().filter(|n| *n != CONSTANT_COLUMN).cloned())
        .collect()
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn cmd_ols(
    input: &Path,
    response: &str,
    models: &[String],
    common: &CommonArgs,
    decimals: usize,
    title: Option<String>,
    order: &[String],
) -> Result<()> {
    let data = load(input, Some(common))?;
    let ols = OlsRegressor::builder()
        .with_intercept(false)
        .covariance(common.cov.into())
        .na_action(common.na.into())
        .build();

    let mut fits = Vec::with_capacity(models.len());
    for (i, model) in models.iter().enumerate() {
        let spec = ModelSpec::new(response, with_constant(common, &split_list(model)));
        let fitted = ols
            .fit_dataset(&data, &spec)
            .with_context(|| format!("model {} ({model}) failed", i + 1))?;
        fits.push(fitted);
    }

    let mut builder = SummaryTable::builder()
        .models(fits.iter().map(|f| f.result()))
        .decimals(decimals)
        .regressor_order(order.iter().cloned())
        .with_default_info();
    if let Some(title) = title {
        builder = builder.title(title);
    }
    println!("{}", builder.build()?);
    Ok(())
}

fn cmd_iv(
    input: &Path,
    response: &str,
    endog: &[String],
    instruments: &[String],
    exog: &[String],
    common: &CommonArgs,
) -> Result<()> {
    let data = load(input, Some(common))?;
    let exog = with_constant(common, exog);

    let spec = IvSpec::new(response)
        .exogenous(exog.iter().cloned())
        .endogenous(endog.iter().cloned())
        .instruments(instruments.iter().cloned());
    let fitted = IvRegressor::builder()
        .with_intercept(false)
        .covariance(common.cov.into())
        .na_action(common.na.into())
        .build()
        .fit_dataset(&data, &spec)
        .context("2SLS fit failed")?;

    let ols = ols_comparison(&data, &spec, fitted.result(), common)?;

    let stages = fitted.first_stages();
    let first = SummaryTable::builder()
        .models(stages.iter().map(|s| &s.result))
        .model_names(stages.iter().map(|s| s.endogenous.clone()))
        .title("First stage")
        .with_default_info()
        .build()?;
    println!("{first}\n");

    for stage in stages {
        let d = &stage.diagnostics;
        println!(
            "{}: F({}) = {:.3} (p = {:.4}), partial R-squared = {:.4}{}",
            stage.endogenous,
            d.instruments.join(", "),
            d.f_statistic,
            d.f_pvalue,
            d.partial_r_squared,
            if d.weak { "  [weak instruments]" } else { "" }
        );
    }
    println!();

    let second = SummaryTable::builder()
        .models([ols.result(), fitted.result()])
        .model_names(["OLS", "2SLS"])
        .regressor_order(endog.iter().cloned())
        .with_default_info()
        .build()?;
    println!("{second}\n");

    match fitted.endogeneity_test() {
        Some(test) => println!(
            "Durbin-Wu-Hausman: chi2({}) = {:.3}, p = {:.4}",
            test.df, test.statistic, test.p_value
        ),
        None => println!("Durbin-Wu-Hausman: not computable"),
    }
    Ok(())
}

/// OLS of the response on every 2SLS regressor, fitted on the 2SLS sample.
///
/// Rows the 2SLS fit dropped for a missing instrument are dropped here too.
fn ols_comparison(
    data: &Dataset,
    spec: &IvSpec,
    iv: &RegressionResult,
    common: &CommonArgs,
) -> Result<FittedOls> {
    let ols_spec = ModelSpec::new(
        &spec.response,
        spec.exogenous.iter().chain(&spec.endogenous).cloned(),
    );
    let mut design = data.design(&ols_spec)?;
    if let Some(info) = &iv.na_info {
        design = select_rows(&design, &info.kept_indices);
    }

    OlsRegressor::builder()
        .with_intercept(false)
        .covariance(common.cov.into())
        .na_action(common.na.into())
        .build()
        .fit_design(&design)
        .context("OLS comparison fit failed")
}

fn select_rows(design: &Design, rows: &[usize]) -> Design {
    Design {
        response: design.response.clone(),
        regressors: design.regressors.clone(),
        x: Mat::from_fn(rows.len(), design.x.ncols(), |i, j| design.x[(rows[i], j)]),
        y: Col::from_fn(rows.len(), |i| design.y[rows[i]]),
    }
}

fn cmd_dummies(input: &Path, column: &str, first_seen: bool, drop_first: bool) -> Result<()> {
    let data = load(input, None)?;
    let order = if first_seen {
        CategoryOrder::FirstSeen
    } else {
        CategoryOrder::Sorted
    };
    let encoder = DummyEncoder::new().order(order).drop_first(drop_first);
    let encoding = encoder.encode(column, data.column(column)?);
    if encoding.n_indicators() == 0 {
        bail!("column '{column}' has no non-missing values to encode");
    }

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    let header = std::iter::once(column).chain(encoding.column_names.iter().map(String::as_str));
    writer.write_record(header)?;
    for (i, label) in encoding.labels.iter().enumerate() {
        let mut record = vec![label.clone().unwrap_or_else(|| "NA".to_string())];
        for j in 0..encoding.n_indicators() {
            let value = encoding.indicators[(i, j)];
            record.push(if value.is_nan() {
                "NA".to_string()
            } else {
                format!("{value}")
            });
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
