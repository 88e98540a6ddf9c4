//! Probability distributions

pub mod normal;

pub use normal::{standard_normal_cdf, SnormCdf};
