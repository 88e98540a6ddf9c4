//! Cohort Statistics
//!
//! The numerical core: descriptive statistics, Pearson correlation, simple
//! linear regression, Welch t statistic, one-way ANOVA, the standard normal
//! CDF, Kolmogorov-Smirnov and Shapiro-Wilk normality tests, and histogram
//! binning.
//!
//! Every function is pure and synchronous. Degenerate input produces neutral
//! values or NaN/Infinity, never a panic. Each operation is also exposed as a
//! [`FunctionPlugin`](cohort_plugin::FunctionPlugin) that returns
//! `Value::Error` for malformed arguments.

mod helpers;
mod descriptive;
mod bivariate;
mod regression;
mod hypothesis;
mod distributions;
mod goodness;
mod histogram;

use cohort_plugin::PluginRegistry;

pub use descriptive::{descriptive_stats, DescriptiveStats};
pub use bivariate::pearson;
pub use regression::{linear_regression, RegressionResult};
pub use hypothesis::{anova, t_test, AnovaResult, TTestResult};
pub use distributions::standard_normal_cdf;
pub use goodness::{ks_test, shapiro_wilk_coefficients, shapiro_wilk_p_value, shapiro_wilk_test, TestResult};
pub use histogram::{histogram, Histogram, DEFAULT_BIN_COUNT, MAX_BIN_COUNT};

/// Load statistics functions into registry
pub fn load_stats_library(registry: PluginRegistry) -> PluginRegistry {
    registry
        // Descriptive
        .with_function(descriptive::Describe)
        .with_function(descriptive::Mean)
        .with_function(descriptive::StddevP)
        .with_function(descriptive::Min)
        .with_function(descriptive::Max)

        // Bivariate
        .with_function(bivariate::Correlation)
        .with_function(regression::LinearReg)

        // Group comparison
        .with_function(hypothesis::TTest)
        .with_function(hypothesis::Anova)

        // Distributions
        .with_function(distributions::SnormCdf)

        // Normality
        .with_function(goodness::KsTest)
        .with_function(goodness::ShapiroWilk)
        .with_function(goodness::Normality)

        // Binning
        .with_function(histogram::HistogramBins)
}
