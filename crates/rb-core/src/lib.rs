//! Core data structures for regbook
//!
//! `data` holds the column-oriented [`data::DataFrame`] and the CSV loader,
//! `formula` turns an R-style formula string into a design matrix.

pub mod data;
pub mod formula;
