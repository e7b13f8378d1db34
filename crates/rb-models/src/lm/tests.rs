//! Tests for linear regression models
//!
//! Fits, error paths, prediction and the regression diagnostics.

use approx::assert_abs_diff_eq;
use ndarray::array;
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::Distribution;

use crate::{
    base::{ModelError, ModelResultTrait},
    lm::{lm, Diagnostics, LinearConfig, LinearModel, LinearRegression},
};
use rb_core::data::{DataError, DataFrame, Series};
use rb_core::formula::FormulaError;

// ==================== Test Fixtures ====================

/// Exact line: y = 2x + 3
fn simple_linear_data() -> DataFrame {
    DataFrame::new()
        .with_column("x", Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0]))
        .unwrap()
        .with_column("y", Series::float(vec![5.0, 7.0, 9.0, 11.0, 13.0]))
        .unwrap()
}

/// Multiple regression: y = 1 + 2x1 + 3x2
fn multiple_regression_data() -> DataFrame {
    DataFrame::new()
        .with_column("x1", Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]))
        .unwrap()
        .with_column("x2", Series::float(vec![2.0, 1.0, 4.0, 3.0, 6.0, 5.0]))
        .unwrap()
        .with_column("y", Series::float(vec![9.0, 8.0, 19.0, 18.0, 29.0, 28.0]))
        .unwrap()
}

/// Twelve noisy points around a line, with hand-computed diagnostics
fn diagnostic_fixture() -> DataFrame {
    let x: Vec<f64> = (1..=12).map(f64::from).collect();
    let y = vec![
        3.1, 4.8, 7.4, 8.7, 11.9, 12.2, 15.8, 16.1, 20.2, 19.6, 24.5, 23.1,
    ];

    DataFrame::new()
        .with_column("x", Series::float(x))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap()
}

/// Realistic dataset with some noise
fn noisy_data() -> DataFrame {
    let n = 100;
    let mut rng = StdRng::seed_from_u64(42);
    let normal = rand_distr::Normal::new(0.0, 0.1).unwrap();

    let mut x1 = Vec::new();
    let mut x2 = Vec::new();
    let mut y = Vec::new();

    for i in 0..n {
        let x1_val = i as f64 * 0.1;
        let x2_val = (i as f64).sin();
        let y_val = 1.0 + 2.0 * x1_val + 3.0 * x2_val + normal.sample(&mut rng);

        x1.push(x1_val);
        x2.push(x2_val);
        y.push(y_val);
    }

    DataFrame::new()
        .with_column("x1", Series::float(x1))
        .unwrap()
        .with_column("x2", Series::float(x2))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap()
}

/// Categorical variable data: group offsets 0, 1, 3 on top of y = x
fn categorical_data() -> DataFrame {
    DataFrame::new()
        .with_column(
            "group",
            Series::categorical(&["A", "A", "B", "B", "C", "C", "A", "B", "C"]),
        )
        .unwrap()
        .with_column(
            "x",
            Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]),
        )
        .unwrap()
        .with_column(
            "y",
            Series::float(vec![1.0, 2.0, 4.0, 5.0, 8.0, 9.0, 7.0, 9.0, 12.0]),
        )
        .unwrap()
}

// ==================== Basic Tests ====================

#[test]
fn test_linear_regression_basic_fit() {
    let df = simple_linear_data();

    let model = LinearRegression::new("y ~ x")
        .unwrap()
        .data(&df)
        .fit()
        .unwrap();

    let coeffs = model.coefficients().unwrap();
    assert_eq!(coeffs.len(), 2);
    assert_abs_diff_eq!(coeffs[0], 3.0, epsilon = 1e-10);
    assert_abs_diff_eq!(coeffs[1], 2.0, epsilon = 1e-10);

    let fitted = model.fitted_values().unwrap();
    let expected = array![5.0, 7.0, 9.0, 11.0, 13.0];
    assert_abs_diff_eq!(fitted, &expected, epsilon = 1e-10);

    let residuals = model.residuals().unwrap();
    assert_eq!(residuals.len(), df.nrows());
    assert_abs_diff_eq!(residuals.sum(), 0.0, epsilon = 1e-10);

    let summary = model.summary().unwrap();
    assert_abs_diff_eq!(summary.model_statistics.r_squared, 1.0, epsilon = 1e-10);
    assert_eq!(summary.coefficients[0].name, "Intercept");
    assert!(summary.coefficients[0].is_intercept());
    assert!(!summary.coefficients[1].is_intercept());
    assert_eq!(summary.coefficients[1].name, "x");
}

#[test]
fn test_linear_regression_no_intercept() {
    let df = DataFrame::new()
        .with_column("x", Series::float(vec![1.0, 2.0, 3.0, 4.0]))
        .unwrap()
        .with_column("y", Series::float(vec![2.1, 3.9, 6.2, 7.8]))
        .unwrap();

    let result = lm("y ~ x - 1", &df).unwrap().into_result().unwrap();

    assert_eq!(result.variable_names, vec!["x".to_string()]);
    assert!(!result.has_intercept);

    // β = Σxy / Σx²
    let sxy = 2.1 + 2.0 * 3.9 + 3.0 * 6.2 + 4.0 * 7.8;
    assert_abs_diff_eq!(result.coefficients[0], sxy / 30.0, epsilon = 1e-10);

    // Uncentred total sum of squares
    let tss = 2.1_f64.powi(2) + 3.9_f64.powi(2) + 6.2_f64.powi(2) + 7.8_f64.powi(2);
    assert_abs_diff_eq!(result.tss(), tss, epsilon = 1e-10);
    assert_abs_diff_eq!(result.r_squared(), 1.0 - result.rss() / tss, epsilon = 1e-12);
    assert_eq!(result.model_statistics.df_model, 1);
}

#[test]
fn test_linear_regression_multiple_predictors() {
    let df = multiple_regression_data();

    let model = lm("y ~ x1 + x2", &df).unwrap();
    let coeffs = model.coefficients().unwrap();

    assert_abs_diff_eq!(coeffs[0], 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(coeffs[1], 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(coeffs[2], 3.0, epsilon = 1e-9);
}

#[test]
fn test_linear_regression_interaction() {
    let x1 = vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 4.0];
    let x2 = vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0, 3.0];
    let y: Vec<f64> = x1
        .iter()
        .zip(&x2)
        .map(|(a, b)| 0.5 + a - b + 2.0 * a * b)
        .collect();

    let df = DataFrame::new()
        .with_column("x1", Series::float(x1))
        .unwrap()
        .with_column("x2", Series::float(x2))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap();

    let result = lm("y ~ x1 * x2", &df).unwrap().into_result().unwrap();

    assert_eq!(
        result.variable_names,
        vec!["Intercept", "x1", "x2", "x1:x2"]
    );
    assert_abs_diff_eq!(result.coefficients[3], 2.0, epsilon = 1e-9);
}

#[test]
fn test_linear_regression_with_categorical() {
    let df = categorical_data();

    let result = lm("y ~ x + group", &df).unwrap().into_result().unwrap();

    assert_eq!(
        result.variable_names,
        vec!["Intercept", "x", "group[T.B]", "group[T.C]"]
    );
    assert_eq!(result.levels["group"], vec!["A", "B", "C"]);
    assert!(result.r_squared() > 0.9);
}

// ==================== Statistics ====================

#[test]
fn test_linear_regression_statistics() {
    let df = diagnostic_fixture();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();
    let stats = &result.model_statistics;

    assert_abs_diff_eq!(result.coefficients[0], 1.3045454545454487, epsilon = 1e-9);
    assert_abs_diff_eq!(result.coefficients[1], 1.945454545454546, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.r_squared, 0.9783009861096733, epsilon = 1e-10);
    assert_abs_diff_eq!(stats.adj_r_squared, 0.9761310847206406, epsilon = 1e-10);
    assert_abs_diff_eq!(stats.f_statistic, 450.8504354411213, epsilon = 1e-6);
    assert_abs_diff_eq!(stats.log_likelihood, -17.029534695396688, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.aic, 38.059069390793375, epsilon = 1e-9);
    assert_abs_diff_eq!(stats.bic, 39.02888269036938, epsilon = 1e-9);
    assert_eq!(stats.df_residual, 10);
    assert_eq!(stats.df_model, 1);
    assert!(stats.f_p_value < 1e-8);

    // p-values are two-tailed and consistent with the t statistics
    for (&t, &p) in result.t_statistics.iter().zip(result.p_values.iter()) {
        assert!(p > 0.0 && p <= 1.0);
        assert!(t.abs() > 2.228 || p > 0.05);
    }

    // Confidence intervals bracket the estimates
    for i in 0..result.n_predictors() {
        assert!(result.ci_lower[i] < result.coefficients[i]);
        assert!(result.ci_upper[i] > result.coefficients[i]);
    }

    let table = result.to_coefficients();
    assert_eq!(table[1].name, "x");
    assert_eq!(table[1].conf_int, (result.ci_lower[1], result.ci_upper[1]));
    assert_eq!(table[1].stars(), "***");
}

#[test]
fn test_r_squared_bounds_on_noisy_data() {
    let df = noisy_data();
    let result = lm("y ~ x1 + x2", &df).unwrap().into_result().unwrap();
    let stats = result.statistics();

    assert!(stats.r_squared >= 0.0 && stats.r_squared <= 1.0);
    assert!(stats.adj_r_squared <= stats.r_squared);
    assert_abs_diff_eq!(result.residuals.sum(), 0.0, epsilon = 1e-8);
    assert_abs_diff_eq!(result.coefficients[1], 2.0, epsilon = 0.05);
    assert_abs_diff_eq!(result.coefficients[2], 3.0, epsilon = 0.05);

    // Leverage sums to the number of parameters
    assert_abs_diff_eq!(result.hat_diagonal.sum(), 3.0, epsilon = 1e-8);
}

#[test]
fn test_constant_response_gives_nan_r_squared() {
    let df = DataFrame::new()
        .with_column("x", Series::float(vec![1.0, 2.0, 3.0, 4.0]))
        .unwrap()
        .with_column("y", Series::float(vec![5.0, 5.0, 5.0, 5.0]))
        .unwrap();

    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();
    assert!(result.model_statistics.r_squared.is_nan());
    assert_abs_diff_eq!(result.coefficients[0], 5.0, epsilon = 1e-10);
}

#[test]
fn test_missing_rows_are_dropped() {
    let df = DataFrame::new()
        .with_column("x", Series::float(vec![1.0, 2.0, f64::NAN, 4.0, 5.0]))
        .unwrap()
        .with_column("y", Series::float(vec![5.0, 7.0, 9.0, 11.0, 13.0]))
        .unwrap();

    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();
    assert_eq!(result.n_obs(), 4);
    assert_eq!(result.residuals.len(), 4);
    assert_eq!(result.rows, vec![0, 1, 3, 4]);
}

// ==================== Error Handling Tests ====================

#[test]
fn test_linear_regression_insufficient_data() {
    let df = DataFrame::new()
        .with_column("y", Series::float(vec![1.0, 2.0, 4.0]))
        .unwrap()
        .with_column("x1", Series::float(vec![1.0, 2.0, 3.0]))
        .unwrap()
        .with_column("x2", Series::float(vec![3.0, 1.0, 4.0]))
        .unwrap();

    let result = LinearRegression::new("y ~ x1 + x2")
        .unwrap()
        .data(&df)
        .fit();

    match result.unwrap_err() {
        ModelError::Data(DataError::InsufficientRows { rows, params }) => {
            assert_eq!(rows, 3);
            assert_eq!(params, 3);
        }
        other => panic!("Expected InsufficientRows error, got {other:?}"),
    }
}

#[test]
fn test_linear_regression_missing_variable() {
    let df = simple_linear_data();

    let result = LinearRegression::new("y ~ z").unwrap().data(&df).fit();

    match result.unwrap_err() {
        ModelError::Formula(FormulaError::UnknownVariable {
            variable,
            columns,
        }) => {
            assert_eq!(variable, "z");
            assert!(columns.contains(&"x".to_string()));
        }
        other => panic!("Expected UnknownVariable error, got {other:?}"),
    }
}

#[test]
fn test_linear_regression_no_data() {
    let model = LinearRegression::new("y ~ x").unwrap();
    let result = model.fit();

    assert!(matches!(
        result.unwrap_err(),
        ModelError::InvalidConfig { message } if message.contains("No data provided")
    ));
}

#[test]
fn test_linear_regression_no_response() {
    let df = simple_linear_data();

    let result = LinearRegression::new("~ x").unwrap().data(&df).fit();

    assert!(matches!(
        result.unwrap_err(),
        ModelError::Formula(FormulaError::MissingResponse)
    ));
}

#[test]
fn test_linear_regression_perfect_collinearity() {
    let df = DataFrame::new()
        .with_column("x1", Series::float(vec![1.0, 2.0, 3.0, 4.0, 5.0]))
        .unwrap()
        .with_column("x2", Series::float(vec![2.0, 4.0, 6.0, 8.0, 10.0])) // x2 = 2*x1
        .unwrap()
        .with_column("y", Series::float(vec![3.0, 6.0, 9.0, 12.0, 14.0]))
        .unwrap();

    let result = LinearRegression::new("y ~ x1 + x2")
        .unwrap()
        .data(&df)
        .fit();

    match result.unwrap_err() {
        ModelError::Data(DataError::RankDeficient {
            rank,
            params,
            columns,
            ..
        }) => {
            assert_eq!(rank, 2);
            assert_eq!(params, 3);
            assert_eq!(columns, vec!["Intercept", "x1", "x2"]);
        }
        other => panic!("Expected RankDeficient error, got {other:?}"),
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let df = simple_linear_data();
    let config = LinearConfig {
        confidence_level: 1.5,
        ..LinearConfig::default()
    };

    let result = LinearRegression::new("y ~ x")
        .unwrap()
        .data(&df)
        .config(config)
        .fit();

    assert!(matches!(
        result.unwrap_err(),
        ModelError::InvalidConfig { .. }
    ));
}

#[test]
fn test_influence_threshold_validation() {
    for bad in [-0.5, 0.0, f64::NAN, f64::INFINITY] {
        let config = LinearConfig {
            influence_threshold: Some(bad),
            ..LinearConfig::default()
        };
        match config.validate().unwrap_err() {
            ModelError::InvalidConfig { message } => {
                assert!(message.contains("influence_threshold"), "{message}")
            }
            other => panic!("Expected InvalidConfig for {bad}, got {other:?}"),
        }
    }

    let config = LinearConfig {
        influence_threshold: Some(0.5),
        ..LinearConfig::default()
    };
    assert!(config.validate().is_ok());
}

// ==================== Prediction ====================

#[test]
fn test_linear_regression_prediction() {
    let df = simple_linear_data();
    let model = lm("y ~ x", &df).unwrap();

    let new = DataFrame::new()
        .with_column("x", Series::float(vec![10.0, 0.0]))
        .unwrap();

    let predictions = model.predict(&new).unwrap();
    assert_abs_diff_eq!(predictions, array![23.0, 3.0], epsilon = 1e-9);
}

#[test]
fn test_prediction_reuses_categorical_levels() {
    let df = categorical_data();
    let result = lm("y ~ x + group", &df).unwrap().into_result().unwrap();

    // Only level C is present; columns still line up with the fit
    let new = DataFrame::new()
        .with_column("group", Series::string(vec!["C".to_string()]))
        .unwrap()
        .with_column("x", Series::float(vec![2.0]))
        .unwrap();

    let predicted = result.predict_frame(&new).unwrap();
    let expected = result.coefficients[0] + 2.0 * result.coefficients[1] + result.coefficients[3];
    assert_abs_diff_eq!(predicted[0], expected, epsilon = 1e-10);

    let unseen = DataFrame::new()
        .with_column("group", Series::string(vec!["D".to_string()]))
        .unwrap()
        .with_column("x", Series::float(vec![2.0]))
        .unwrap();
    assert!(matches!(
        result.predict_frame(&unseen).unwrap_err(),
        ModelError::Formula(_)
    ));
}

#[test]
fn test_prediction_intervals() {
    let df = diagnostic_fixture();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();

    let x_new = array![[1.0, 6.5], [1.0, 20.0]];
    let intervals = result.predict_intervals(&x_new).unwrap();

    for i in 0..2 {
        assert!(intervals.pi_lower[i] < intervals.ci_lower[i]);
        assert!(intervals.ci_lower[i] < intervals.mean[i]);
        assert!(intervals.mean[i] < intervals.ci_upper[i]);
        assert!(intervals.ci_upper[i] < intervals.pi_upper[i]);
    }

    // Intervals widen away from the centre of the data
    let width = |i: usize| intervals.ci_upper[i] - intervals.ci_lower[i];
    assert!(width(1) > width(0));

    assert!(result.predict(&array![[1.0, 2.0, 3.0]]).is_err());
}

// ==================== Diagnostics ====================

#[test]
fn test_diagnostics_match_hand_computed_values() {
    let df = diagnostic_fixture();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();
    let diag = Diagnostics::run_all(&result);

    let jb = diag.jarque_bera;
    assert_abs_diff_eq!(jb.skewness, 0.2892158225570438, epsilon = 1e-9);
    assert_abs_diff_eq!(jb.kurtosis, 1.9642145584471418, epsilon = 1e-9);
    assert_abs_diff_eq!(jb.statistic, 0.7037173245011197, epsilon = 1e-9);
    assert_abs_diff_eq!(jb.p_value, 0.7033795290308262, epsilon = 1e-9);

    let bp = diag.breusch_pagan;
    assert_eq!(bp.df, 1);
    assert_abs_diff_eq!(bp.lm_statistic, 9.199639556296162, epsilon = 1e-8);
    assert_abs_diff_eq!(bp.lm_p_value, 0.0024206278588416144, epsilon = 1e-9);
    assert_abs_diff_eq!(bp.f_statistic, 32.85162657178678, epsilon = 1e-7);
    assert!(bp.f_p_value < 0.001);

    let hc = diag.harvey_collier;
    assert_eq!(hc.df, 9);
    assert_abs_diff_eq!(hc.t_statistic, -0.331114768648114, epsilon = 1e-9);
    assert_abs_diff_eq!(hc.p_value, 0.748136962829008, epsilon = 1e-4);

    let rb = diag.rainbow;
    assert_eq!((rb.lo, rb.hi), (3, 9));
    assert_abs_diff_eq!(rb.f_statistic, 1.285564031730743, epsilon = 1e-9);
    assert_abs_diff_eq!(rb.p_value, 0.42190544957539367, epsilon = 1e-4);

    assert_abs_diff_eq!(diag.durbin_watson.statistic, 3.471563801590307, epsilon = 1e-9);
}

#[test]
fn test_recursive_residuals() {
    let df = diagnostic_fixture();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();

    let w = Diagnostics::recursive_residuals(&result.x, &result.y, 2).unwrap();
    assert_eq!(w.len(), 10);
    assert_abs_diff_eq!(w[0], 0.3674234614174768, epsilon = 1e-9);
    assert_abs_diff_eq!(w[9], -1.8458553080298068, epsilon = 1e-9);

    // Recursive residuals of an exact line are all zero
    let line = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
    let w = Diagnostics::recursive_residuals(&line, &array![5.0, 7.0, 9.0, 11.0], 2).unwrap();
    assert_abs_diff_eq!(w, array![0.0, 0.0], epsilon = 1e-10);
}

#[test]
fn test_recursive_residuals_repeated_seed_rows() {
    // Repeated x in the first two rows: the seed grows to three rows
    let x = array![
        [1.0, 1.0],
        [1.0, 1.0],
        [1.0, 2.0],
        [1.0, 3.0],
        [1.0, 4.0],
        [1.0, 5.0],
        [1.0, 6.0],
        [1.0, 7.0]
    ];
    let y = x.column(1).mapv(|v| 2.0 * v + 3.0);

    let w = Diagnostics::recursive_residuals(&x, &y, 2).unwrap();
    assert_eq!(w.len(), 5);
    assert_abs_diff_eq!(w, ndarray::Array1::<f64>::zeros(5), epsilon = 1e-9);

    let hc = Diagnostics::harvey_collier(&x, &y);
    assert!(hc.t_statistic.is_nan());

    // No prefix reaches full rank
    let flat = array![[1.0, 2.0], [1.0, 2.0], [1.0, 2.0], [1.0, 2.0]];
    assert!(Diagnostics::recursive_residuals(&flat, &array![1.0, 2.0, 3.0, 4.0], 2).is_none());
}

#[test]
fn test_harvey_collier_sorted_by_group() {
    let noise = [0.3, -0.2, 0.1, -0.4, 0.2, 0.5, -0.3, 0.1];
    let x: Vec<f64> = (1..=8).map(f64::from).collect();
    let g: Vec<String> = (0..8).map(|i| if i < 4 { "a" } else { "b" }.to_string()).collect();
    let y: Vec<f64> = (0..8)
        .map(|i| 1.0 + 2.0 * x[i] + if i < 4 { 0.0 } else { 3.0 } + noise[i])
        .collect();
    let df = DataFrame::new()
        .with_column("x", Series::float(x))
        .unwrap()
        .with_column("g", Series::string(g))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap();

    let result = lm("y ~ x + g", &df).unwrap().into_result().unwrap();
    assert_eq!(result.variable_names, vec!["Intercept", "x", "g[T.b]"]);

    // g[T.b] is all zero over the first three rows; the first full-rank
    // prefix ends at the first 'b' row
    let w = Diagnostics::recursive_residuals(&result.x, &result.y, 3).unwrap();
    let expected = Diagnostics::recursive_residuals(&result.x, &result.y, 5).unwrap();
    assert_eq!(w.len(), 3);
    assert_abs_diff_eq!(w, expected, epsilon = 1e-10);

    let hc = Diagnostics::harvey_collier(&result.x, &result.y);
    let t = w.mean().unwrap() / (w.std(1.0) / 3.0_f64.sqrt());
    assert_abs_diff_eq!(hc.t_statistic, t, epsilon = 1e-9);
    assert_eq!(hc.df, 2);
}

#[test]
fn test_jarque_bera_symmetric_sample() {
    let jb = Diagnostics::jarque_bera(&array![-2.0, -1.0, 0.0, 1.0, 2.0]);

    assert_abs_diff_eq!(jb.skewness, 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(jb.kurtosis, 1.7, epsilon = 1e-12);
    assert_abs_diff_eq!(jb.statistic, 5.0 / 6.0 * (1.69 / 4.0), epsilon = 1e-12);
    assert_abs_diff_eq!(jb.p_value, (-jb.statistic / 2.0).exp(), epsilon = 1e-10);
}

#[test]
fn test_degenerate_diagnostics_are_nan() {
    let df = simple_linear_data();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();
    let diag = Diagnostics::run_all(&result);

    // Zero residuals: no moments, no mid-sample variance
    assert!(diag.jarque_bera.statistic.is_nan());
    assert!(diag.rainbow.f_statistic.is_nan());

    // Fewer than three recursive residuals
    let short = array![[1.0, 1.0], [1.0, 2.0], [1.0, 3.0], [1.0, 4.0]];
    let hc = Diagnostics::harvey_collier(&short, &array![1.0, 3.0, 2.0, 5.0]);
    assert!(hc.t_statistic.is_nan());
    assert!(hc.p_value.is_nan());
}

#[test]
fn test_influence_lists() {
    let mut y: Vec<f64> = (1..=10)
        .map(|i| 2.0 * i as f64 + 0.1 * ((i * 7) % 3) as f64)
        .collect();
    y[9] += 15.0;
    let x: Vec<f64> = (1..=10).map(f64::from).collect();

    let df = DataFrame::new()
        .with_column("x", Series::float(x))
        .unwrap()
        .with_column("y", Series::float(y))
        .unwrap();

    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();
    let diag = Diagnostics::run_all(&result);

    assert!(diag.cooks_outliers.iter().any(|o| o.row == 9));
    for o in &diag.cooks_outliers {
        assert_abs_diff_eq!(o.threshold, 0.4, epsilon = 1e-12);
        assert!(o.distance > o.threshold);
    }
    for p in &diag.high_leverage {
        assert!(p.leverage > 0.4);
    }
}

#[test]
fn test_covariance_and_scaled_residuals() {
    let df = diagnostic_fixture();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();

    let cov = result.cov_matrix();
    for j in 0..2 {
        assert_abs_diff_eq!(cov[[j, j]].sqrt(), result.standard_errors[j], epsilon = 1e-12);
    }
    assert_abs_diff_eq!(cov[[0, 1]], cov[[1, 0]], epsilon = 1e-12);

    let rse = result.model_statistics.residual_std_error;
    let standardized = result.standardized_residuals();
    let studentized = result.studentized_residuals();
    for i in 0..result.n_obs() {
        assert_abs_diff_eq!(standardized[i] * rse, result.residuals[i], epsilon = 1e-12);
        // Leverage is below 1, so studentizing only inflates magnitudes
        assert!(studentized[i].abs() >= standardized[i].abs());
    }
}

#[test]
fn test_partial_regression_slope_matches_coefficient() {
    let df = noisy_data();
    let result = lm("y ~ x1 + x2", &df).unwrap().into_result().unwrap();

    let pr = Diagnostics::partial_regression(&result, "x2").unwrap();
    let slope = pr.x_resid.dot(&pr.y_resid) / pr.x_resid.dot(&pr.x_resid);
    assert_abs_diff_eq!(slope, result.coefficients[2], epsilon = 1e-8);
    assert_abs_diff_eq!(pr.slope, result.coefficients[2], epsilon = 1e-12);

    let cc = Diagnostics::ccpr(&result, "x1").unwrap();
    let expected = &result.x.column(1) * result.coefficients[1] + &result.residuals;
    assert_abs_diff_eq!(cc.partial_residuals, expected, epsilon = 1e-12);
}

#[test]
fn test_unknown_term() {
    let df = simple_linear_data();
    let result = lm("y ~ x", &df).unwrap().into_result().unwrap();

    match Diagnostics::partial_regression(&result, "z").unwrap_err() {
        ModelError::UnknownTerm { name, available } => {
            assert_eq!(name, "z");
            assert_eq!(available, vec!["Intercept", "x"]);
        }
        other => panic!("Expected UnknownTerm error, got {other:?}"),
    }
    assert!(Diagnostics::ccpr(&result, "z").is_err());
}

#[test]
fn test_summary_display() {
    let df = diagnostic_fixture();
    let model = lm("y ~ x", &df).unwrap();
    let text = model.summary().unwrap().to_string();

    assert!(text.contains("OLS Regression Results"));
    assert!(text.contains("Intercept"));
    assert!(text.contains("R-squared:"));
}

// ==================== Property-Based Tests ====================

#[cfg(feature = "proptest")]
mod proptest_tests {
    use super::*;
    use proptest::collection::vec;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_fit_statistics_hold_with_intercept(
            rows in vec((-100.0f64..100.0, -100.0f64..100.0, -100.0f64..100.0), 6..40)
        ) {
            let x1: Vec<f64> = rows.iter().map(|r| r.0).collect();
            let x2: Vec<f64> = rows.iter().map(|r| r.1).collect();
            let y: Vec<f64> = rows.iter().map(|r| r.2).collect();
            let scale = y.iter().fold(1.0_f64, |m, v| m.max(v.abs()));

            let df = DataFrame::new()
                .with_column("x1", Series::float(x1))
                .unwrap()
                .with_column("x2", Series::float(x2))
                .unwrap()
                .with_column("y", Series::float(y))
                .unwrap();

            // Near-collinear draws are rejected by the rank check
            if let Ok(result) = lm("y ~ x1 + x2", &df).and_then(|m| m.into_result()) {
                let stats = &result.model_statistics;
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&stats.r_squared));
                prop_assert!(stats.adj_r_squared <= stats.r_squared + 1e-12);
                prop_assert!(result.residuals.sum().abs() <= 1e-8 * scale * result.n_obs() as f64);
            }
        }
    }
}
