//! Summary table tests.

mod common;

use common::institutions_dataset;
use ivreg::core::RegressionResult;
use ivreg::data::ModelSpec;
use ivreg::solvers::{FittedOls, FittedRegressor, OlsRegressor};
use ivreg::summary::{
    significance_stars, RowKind, SummaryError, SummaryTable, STAR_LEGEND, STD_ERROR_LEGEND,
};

fn nested_fits() -> (FittedOls, FittedOls) {
    let data = institutions_dataset();
    let base = ModelSpec::new("logpgp95", ["avexpr"]);
    let ols = OlsRegressor::default();
    let small = ols.fit_dataset(&data, &base).unwrap();
    let large = ols.fit_dataset(&data, &base.extend(["lat_abst"])).unwrap();
    (small, large)
}

fn results<'a>(a: &'a FittedOls, b: &'a FittedOls) -> [&'a RegressionResult; 2] {
    [a.result(), b.result()]
}

#[test]
fn test_default_model_names_and_order() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder().models(results(&a, &b)).build().unwrap();

    assert_eq!(table.model_names, vec!["logpgp95 I", "logpgp95 II"]);
    assert_eq!(table.regressors(), vec!["const", "avexpr", "lat_abst"]);
    assert_eq!(table.legend, vec![STD_ERROR_LEGEND, STAR_LEGEND]);
}

#[test]
fn test_rows_alternate_coefficients_and_errors() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder().models(results(&a, &b)).build().unwrap();

    assert_eq!(table.rows.len(), 6);
    for pair in table.rows.chunks(2) {
        assert_eq!(pair[0].kind, RowKind::Coefficient);
        assert_eq!(pair[1].kind, RowKind::StdError);
        assert!(pair[1].label.is_empty());
        assert_eq!(pair[0].cells.len(), 2);
    }
}

#[test]
fn test_missing_regressor_cells_are_blank() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder().models(results(&a, &b)).build().unwrap();

    let coef = table.coefficient_row("lat_abst").unwrap();
    let se = table.std_error_row("lat_abst").unwrap();
    assert_eq!(coef.cells[0], "");
    assert_eq!(se.cells[0], "");
    assert!(!coef.cells[1].is_empty());
    assert!(se.cells[1].starts_with('(') && se.cells[1].ends_with(')'));
}

#[test]
fn test_cells_follow_results() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder()
        .models(results(&a, &b))
        .decimals(3)
        .build()
        .unwrap();

    let r = b.result();
    let coef = r.coefficient("avexpr").unwrap();
    let se = r.std_error("avexpr").unwrap();
    let stars = significance_stars(r.p_value("avexpr").unwrap());
    assert_eq!(stars, "***");

    assert_eq!(
        table.coefficient_row("avexpr").unwrap().cells[1],
        format!("{coef:.3}{stars}")
    );
    assert_eq!(
        table.std_error_row("avexpr").unwrap().cells[1],
        format!("({se:.3})")
    );
}

#[test]
fn test_regressor_order_and_drop_omitted() {
    let (a, b) = nested_fits();

    let ordered = SummaryTable::builder()
        .models(results(&a, &b))
        .regressor_order(["lat_abst", "avexpr", "not_fitted"])
        .build()
        .unwrap();
    assert_eq!(ordered.regressors(), vec!["lat_abst", "avexpr", "const"]);

    let trimmed = SummaryTable::builder()
        .models(results(&a, &b))
        .regressor_order(["avexpr"])
        .drop_omitted(true)
        .build()
        .unwrap();
    assert_eq!(trimmed.regressors(), vec!["avexpr"]);
}

#[test]
fn test_info_rows() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder()
        .models(results(&a, &b))
        .with_default_info()
        .info("AIC", |r| format!("{:.1}", r.aic))
        .build()
        .unwrap();

    assert_eq!(
        table.info_row("No. observations").unwrap().cells,
        vec!["116", "111"]
    );
    assert_eq!(
        table.info_row("R-squared").unwrap().cells[1],
        format!("{:.4}", b.result().r_squared)
    );
    assert_eq!(
        table.info_row("AIC").unwrap().cells[0],
        format!("{:.1}", a.result().aic)
    );
    // Info rows come after every coefficient pair
    assert_eq!(table.rows.last().unwrap().label, "AIC");
}

#[test]
fn test_stars_can_be_disabled() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder()
        .models(results(&a, &b))
        .stars(false)
        .build()
        .unwrap();

    assert!(table
        .rows
        .iter()
        .all(|row| row.cells.iter().all(|c| !c.contains('*'))));
    assert_eq!(table.legend, vec![STD_ERROR_LEGEND]);
}

#[test]
fn test_custom_names_and_count_mismatch() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder()
        .models(results(&a, &b))
        .model_names(["Base", "Latitude"])
        .build()
        .unwrap();
    assert_eq!(table.model_names, vec!["Base", "Latitude"]);

    let err = SummaryTable::builder()
        .models(results(&a, &b))
        .model_names(["Only one"])
        .build()
        .unwrap_err();
    assert_eq!(err, SummaryError::CountMismatch { names: 1, models: 2 });
}

#[test]
fn test_render_contains_every_part() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder()
        .models(results(&a, &b))
        .title("Institutions and income")
        .with_default_info()
        .build()
        .unwrap();
    let text = table.to_string();

    assert!(text.starts_with("Institutions and income\n"));
    assert!(text.contains("logpgp95 II"));
    assert!(text.contains("avexpr"));
    assert!(text.contains("No. observations"));
    assert!(text.ends_with(STAR_LEGEND));
    assert!(text.contains(STD_ERROR_LEGEND));
    assert_eq!(text, table.render());
}

#[test]
fn test_default_info_follows_later_decimals() {
    let (a, b) = nested_fits();
    let table = SummaryTable::builder()
        .models(results(&a, &b))
        .with_default_info()
        .decimals(2)
        .build()
        .unwrap();

    assert_eq!(
        table.info_row("R-squared").unwrap().cells[0],
        format!("{:.2}", a.result().r_squared)
    );
    assert_eq!(
        table.coefficient_row("avexpr").unwrap().cells[0],
        format!(
            "{:.2}{}",
            a.result().coefficient("avexpr").unwrap(),
            significance_stars(a.result().p_value("avexpr").unwrap())
        )
    );
}
