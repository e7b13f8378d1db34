//! Linear model diagnostics
//!
//! This module provides diagnostic tools for linear regression models,
//! including residual analysis, influence measures, and assumption checks.
//! Degenerate inputs yield `NaN` statistics rather than errors.

use ndarray::{s, Array1, Array2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::base::statistics::{self, moments};
use crate::base::{ModelError, Result};
use crate::distributions::{chi_squared_upper_tail, f_upper_tail, students_t_two_tailed};
use crate::linalg;
use crate::lm::ols::OlsCore;
use crate::lm::result::LinearRegressionResult;

/// Diagnostic results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosticResults {
    /// Jarque-Bera normality test
    pub jarque_bera: JarqueBera,
    /// Breusch-Pagan heteroscedasticity test
    pub breusch_pagan: BreuschPagan,
    /// Harvey-Collier linearity test
    pub harvey_collier: HarveyCollier,
    /// Rainbow linearity test
    pub rainbow: Rainbow,
    /// Durbin-Watson statistic
    pub durbin_watson: DurbinWatson,
    /// Cook's distance outliers
    pub cooks_outliers: Vec<CookOutlier>,
    /// High leverage points
    pub high_leverage: Vec<LeveragePoint>,
}

/// Jarque-Bera test
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JarqueBera {
    pub statistic: f64,
    /// Upper tail of χ²(2)
    pub p_value: f64,
    pub skewness: f64,
    /// Pearson kurtosis (normal = 3)
    pub kurtosis: f64,
}

/// Breusch-Pagan test, studentized (Koenker) form
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BreuschPagan {
    /// Lagrange multiplier `n · R²` of the auxiliary regression
    pub lm_statistic: f64,
    pub lm_p_value: f64,
    /// F statistic of the auxiliary regression
    pub f_statistic: f64,
    pub f_p_value: f64,
    pub df: usize,
}

/// Harvey-Collier test
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HarveyCollier {
    pub t_statistic: f64,
    pub p_value: f64,
    pub df: usize,
}

/// Rainbow test
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Rainbow {
    pub f_statistic: f64,
    pub p_value: f64,
    /// Rows `[lo, hi)` of the central subsample
    pub lo: usize,
    pub hi: usize,
}

/// Durbin-Watson test
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DurbinWatson {
    pub statistic: f64,
    /// First-order autocorrelation implied by the statistic, `1 - d/2`
    pub autocorrelation: f64,
}

/// Cook's distance outlier
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CookOutlier {
    /// Position among the observations used in the fit
    pub index: usize,
    /// Row of the source table
    pub row: usize,
    pub distance: f64,
    pub threshold: f64,
}

/// High leverage point
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LeveragePoint {
    pub index: usize,
    pub row: usize,
    pub leverage: f64,
    pub threshold: f64,
}

/// Added-variable plot data for one design column
#[derive(Debug, Clone)]
pub struct PartialRegression {
    pub name: String,
    /// `e(x_j | X_{-j})`
    pub x_resid: Array1<f64>,
    /// `e(y | X_{-j})`
    pub y_resid: Array1<f64>,
    /// Slope of `y_resid` on `x_resid`, equal to `β_j`
    pub slope: f64,
}

/// Component-plus-residual plot data for one design column
#[derive(Debug, Clone)]
pub struct ComponentResidual {
    pub name: String,
    pub x: Array1<f64>,
    /// `β_j x_j + e`
    pub partial_residuals: Array1<f64>,
    pub slope: f64,
}

/// Diagnostic analyzer
pub struct Diagnostics;

impl Diagnostics {
    /// Jarque-Bera test of residual normality
    pub fn jarque_bera(residuals: &Array1<f64>) -> JarqueBera {
        let n = residuals.len() as f64;
        let (skewness, kurtosis) = moments(residuals);
        let statistic = n / 6.0 * (skewness.powi(2) + (kurtosis - 3.0).powi(2) / 4.0);

        JarqueBera {
            statistic,
            p_value: chi_squared_upper_tail(statistic, 2.0),
            skewness,
            kurtosis,
        }
    }

    /// Breusch-Pagan test: regress squared residuals on the design matrix
    pub fn breusch_pagan(
        x: &Array2<f64>,
        residuals: &Array1<f64>,
        has_intercept: bool,
    ) -> BreuschPagan {
        let n = residuals.len();
        let df = x.ncols().saturating_sub(1);
        let squared = residuals.mapv(|e| e * e);

        let aux = match OlsCore::fit(x, &squared, has_intercept) {
            Ok(aux) => aux,
            Err(e) => {
                debug!(error = %e, "Breusch-Pagan auxiliary regression failed");
                return BreuschPagan {
                    lm_statistic: f64::NAN,
                    lm_p_value: f64::NAN,
                    f_statistic: f64::NAN,
                    f_p_value: f64::NAN,
                    df,
                };
            }
        };

        let lm_statistic = n as f64 * aux.r_squared;

        BreuschPagan {
            lm_statistic,
            lm_p_value: chi_squared_upper_tail(lm_statistic, df as f64),
            f_statistic: aux.f_statistic,
            f_p_value: aux.f_p_value,
            df,
        }
    }

    /// Recursive residuals `w_i = (y_i - x_i β_{i-1}) / √(1 + x_i (X'X)⁻¹_{i-1} x_i')`
    /// for `i = seed..n`.
    ///
    /// The seed starts at `skip` rows and grows until those rows have full
    /// column rank. Returns `None` when no prefix does, or the seed fit fails.
    pub fn recursive_residuals(
        x: &Array2<f64>,
        y: &Array1<f64>,
        skip: usize,
    ) -> Option<Array1<f64>> {
        let n = x.nrows();
        if skip == 0 || skip >= n {
            return Some(Array1::zeros(0));
        }

        let seed = (skip..n)
            .find(|&k| linalg::rank(&x.slice(s![..k, ..]).to_owned()).rank == x.ncols())?;
        if seed > skip {
            debug!(skip, seed, "recursive residual seed was rank deficient, extended");
        }

        let x0 = x.slice(s![..seed, ..]).to_owned();
        let y0 = y.slice(s![..seed]).to_owned();
        let mut xtx_inv = linalg::xtx_inverse(&x0)?;
        let mut beta = linalg::lstsq(&x0, &y0)?;

        let mut scaled = Vec::with_capacity(n - seed);
        for i in seed..n {
            let xi = x.row(i);
            let resid = y[i] - xi.dot(&beta);

            let tmp = xtx_inv.dot(&xi);
            let ft = 1.0 + xi.dot(&tmp);

            let outer = tmp
                .view()
                .insert_axis(Axis(1))
                .dot(&tmp.view().insert_axis(Axis(0)));
            xtx_inv = xtx_inv - outer / ft;
            beta = beta + &tmp * (resid / ft);

            scaled.push(resid / ft.sqrt());
        }

        Some(Array1::from_vec(scaled))
    }

    /// Harvey-Collier test: one-sample t test that the recursive residuals
    /// have mean zero
    pub fn harvey_collier(x: &Array2<f64>, y: &Array1<f64>) -> HarveyCollier {
        let skip = x.ncols();
        let nan = HarveyCollier {
            t_statistic: f64::NAN,
            p_value: f64::NAN,
            df: x.nrows().saturating_sub(skip + 1),
        };

        let Some(w) = Self::recursive_residuals(x, y, skip) else {
            return nan;
        };
        let m = w.len();
        if m < 3 {
            return nan;
        }

        let mean = w.sum() / m as f64;
        let sd = w.std(1.0);
        let t_statistic = if sd > 0.0 {
            mean / (sd / (m as f64).sqrt())
        } else {
            f64::NAN
        };
        let df = m - 1;

        HarveyCollier {
            t_statistic,
            p_value: students_t_two_tailed(t_statistic, df as f64),
            df,
        }
    }

    /// Rainbow test: compare the full fit against a fit on the central half
    /// of the observations
    pub fn rainbow(x: &Array2<f64>, y: &Array1<f64>, rss: f64, has_intercept: bool) -> Rainbow {
        let n = x.nrows();
        let p = x.ncols();
        let lo = n.div_ceil(4);
        let hi = lo + n / 2;

        let nan = Rainbow {
            f_statistic: f64::NAN,
            p_value: f64::NAN,
            lo,
            hi,
        };
        if hi > n || hi - lo <= p {
            return nan;
        }

        let x_mid = x.slice(s![lo..hi, ..]).to_owned();
        let y_mid = y.slice(s![lo..hi]).to_owned();
        let Ok(mid) = OlsCore::fit(&x_mid, &y_mid, has_intercept) else {
            return nan;
        };
        if mid.rank < p || mid.rss <= 0.0 {
            return nan;
        }

        let n_mid = (hi - lo) as f64;
        let df_num = n as f64 - n_mid;
        let f_statistic = ((rss - mid.rss) / df_num) / (mid.rss / mid.df_resid);

        Rainbow {
            f_statistic,
            p_value: f_upper_tail(f_statistic, df_num, mid.df_resid),
            lo,
            hi,
        }
    }

    /// Calculate Durbin-Watson statistic
    pub fn durbin_watson(residuals: &Array1<f64>) -> DurbinWatson {
        let statistic = statistics::durbin_watson(residuals);
        DurbinWatson {
            statistic,
            autocorrelation: 1.0 - statistic / 2.0,
        }
    }

    /// Run all diagnostics
    pub fn run_all(result: &LinearRegressionResult) -> DiagnosticResults {
        DiagnosticResults {
            jarque_bera: Self::jarque_bera(&result.residuals),
            breusch_pagan: Self::breusch_pagan(&result.x, &result.residuals, result.has_intercept),
            harvey_collier: Self::harvey_collier(&result.x, &result.y),
            rainbow: Self::rainbow(&result.x, &result.y, result.rss(), result.has_intercept),
            durbin_watson: Self::durbin_watson(&result.residuals),
            cooks_outliers: Self::cooks_outliers(result),
            high_leverage: Self::high_leverage(result),
        }
    }

    fn cooks_outliers(result: &LinearRegressionResult) -> Vec<CookOutlier> {
        let threshold = result.influence_threshold();
        result
            .influential_points()
            .into_iter()
            .map(|i| CookOutlier {
                index: i,
                row: result.rows[i],
                distance: result.cooks_distance[i],
                threshold,
            })
            .collect()
    }

    fn high_leverage(result: &LinearRegressionResult) -> Vec<LeveragePoint> {
        let threshold = result.leverage_threshold();
        result
            .high_leverage_points()
            .into_iter()
            .map(|i| LeveragePoint {
                index: i,
                row: result.rows[i],
                leverage: result.hat_diagonal[i],
                threshold,
            })
            .collect()
    }

    /// Added-variable data for the design column `name`
    pub fn partial_regression(
        result: &LinearRegressionResult,
        name: &str,
    ) -> Result<PartialRegression> {
        let j = result.column_index(name)?;
        let others = without_column(&result.x, j);
        let xj = result.x.column(j).to_owned();

        let residualize = |v: &Array1<f64>| {
            linalg::residualize(&others, v).ok_or_else(|| {
                ModelError::numerical("partial regression", "least squares on the remaining columns failed")
            })
        };
        let x_resid = residualize(&xj)?;
        let y_resid = residualize(&result.y)?;

        Ok(PartialRegression {
            name: name.to_string(),
            x_resid,
            y_resid,
            slope: result.coefficients[j],
        })
    }

    /// Component-plus-residual data for the design column `name`
    pub fn ccpr(result: &LinearRegressionResult, name: &str) -> Result<ComponentResidual> {
        let j = result.column_index(name)?;
        let slope = result.coefficients[j];
        let x = result.x.column(j).to_owned();
        let partial_residuals = &x * slope + &result.residuals;

        Ok(ComponentResidual {
            name: name.to_string(),
            x,
            partial_residuals,
            slope,
        })
    }
}

fn without_column(x: &Array2<f64>, j: usize) -> Array2<f64> {
    let keep: Vec<usize> = (0..x.ncols()).filter(|&k| k != j).collect();
    x.select(Axis(1), &keep)
}
