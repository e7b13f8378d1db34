//! Linear models for regbook
//!
//! [`lm::LinearRegression`] fits ordinary least squares from a formula and a
//! [`rb_core::data::DataFrame`]; [`lm::diagnostics`] holds the residual and
//! linearity tests run on the fitted model.

pub mod base;
pub mod error;
pub mod linalg;
pub mod lm;

mod distributions;

pub use base::{Coefficient, ModelResultTrait};
pub use error::ModelError;
pub use lm::{LinearConfig, LinearModel, LinearRegression, LinearRegressionResult, lm};
