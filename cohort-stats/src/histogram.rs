//! Equal-width histogram binning

use cohort_plugin::prelude::*;
use serde::{Deserialize, Serialize};
use crate::helpers::{extract_count, extract_numbers};

pub const DEFAULT_BIN_COUNT: usize = 10;

/// Largest accepted bin count
pub const MAX_BIN_COUNT: usize = 1000;

/// Bin labels with their occupancy counts, index-aligned
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Number of binned values
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// `(label, count)` pairs in bin order
    pub fn bins(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.labels.iter().map(String::as_str).zip(self.counts.iter().copied())
    }

    pub fn to_value(&self) -> Value {
        Value::object([
            ("labels", Value::List(self.labels.iter().map(|l| Value::from(l.as_str())).collect())),
            ("counts", Value::List(self.counts.iter().map(|&c| Value::from(c)).collect())),
        ])
    }
}

/// Bin `sample` into `bin_count` equal-width bins spanning `[min, max]`.
///
/// Bin i covers `[min + i*w, min + (i+1)*w)`; the maximum is folded into the
/// last bin. Every bin is labeled, occupied or not. A sample with zero range
/// puts every value in the first bin. An empty sample or a zero bin count
/// gives an empty histogram. Bin counts above [`MAX_BIN_COUNT`] are capped.
pub fn histogram(sample: &[f64], bin_count: usize) -> Histogram {
    if sample.is_empty() || bin_count == 0 {
        return Histogram::default();
    }
    if bin_count > MAX_BIN_COUNT {
        tracing::debug!(requested = bin_count, max = MAX_BIN_COUNT, "histogram: bin count capped");
    }
    let bin_count = bin_count.min(MAX_BIN_COUNT);

    let min = sample.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sample.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bin_count as f64;

    let labels = (0..bin_count)
        .map(|i| {
            let lower = min + i as f64 * width;
            let upper = min + (i + 1) as f64 * width;
            format!("{:.1} - {:.1}", lower, upper)
        })
        .collect();

    let mut counts = vec![0usize; bin_count];
    for v in sample {
        // 0/0 casts to 0, so a zero-width range lands in bin 0
        let index = ((v - min) / width).floor() as usize;
        counts[index.min(bin_count - 1)] += 1;
    }

    if width == 0.0 {
        tracing::debug!(n = sample.len(), "histogram: zero range, all values in first bin");
    }

    Histogram { labels, counts }
}

// ============ HistogramBins ============

pub struct HistogramBins;

static HISTOGRAM_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("values", "List<Number>", "Sample values"),
    ArgMeta::optional("bins", "Number", "Bin count", "10"),
];

static HISTOGRAM_EXAMPLES: [&str; 2] = [
    "histogram([0,1,2,3,4,5,6,7,8,9]) → {labels: [\"0.0 - 0.9\", ...], counts: [1, ...]}",
    "histogram(data, 5) → {labels, counts}",
];

static HISTOGRAM_RELATED: [&str; 2] = ["describe", "normality"];

impl FunctionPlugin for HistogramBins {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "histogram",
            description: "Equal-width histogram between the sample min and max",
            usage: "histogram(values, bins?)",
            args: &HISTOGRAM_ARGS,
            returns: "Object",
            examples: &HISTOGRAM_EXAMPLES,
            category: "stats/distribution",
            related: &HISTOGRAM_RELATED,
        }
    }

    fn call(&self, args: &[Value], ctx: &EvalContext) -> Value {
        if args.is_empty() || args.len() > 2 {
            return Value::Error(StatsError::arg_count("histogram", 1, args.len()));
        }

        let numbers = match extract_numbers(&args[0..1]) {
            Ok(n) => n,
            Err(e) => return Value::Error(e),
        };

        let bins = match extract_count(args.get(1), "histogram", "bins", MAX_BIN_COUNT) {
            Ok(b) => b.unwrap_or(ctx.default_bins),
            Err(e) => return Value::Error(e),
        };

        histogram(&numbers, bins).to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_ctx() -> EvalContext {
        EvalContext::new(std::sync::Arc::new(PluginRegistry::new()))
    }

    fn zero_to_nine() -> Vec<f64> {
        (0..10).map(|i| i as f64).collect()
    }

    #[test]
    fn test_empty_sample() {
        let h = histogram(&[], 10);
        assert!(h.labels.is_empty());
        assert!(h.counts.is_empty());
        assert!(h.is_empty());
    }

    #[test]
    fn test_zero_bins() {
        assert_eq!(histogram(&[1.0, 2.0], 0), Histogram::default());
    }

    #[test]
    fn test_uniform_grid() {
        let h = histogram(&zero_to_nine(), DEFAULT_BIN_COUNT);
        assert_eq!(h.labels.len(), 10);
        assert_eq!(h.counts.len(), 10);
        assert_eq!(h.total(), 10);
        assert_eq!(h.labels[0], "0.0 - 0.9");
        assert_eq!(h.labels[9], "8.1 - 9.0");
        // Max folds into the last bin
        assert!(h.counts[9] >= 1);
    }

    #[test]
    fn test_max_clamped_into_last_bin() {
        let h = histogram(&[0.0, 10.0], 4);
        assert_eq!(h.counts, vec![1, 0, 0, 1]);
        assert_eq!(h.labels, vec!["0.0 - 2.5", "2.5 - 5.0", "5.0 - 7.5", "7.5 - 10.0"]);
    }

    #[test]
    fn test_empty_bins_keep_labels() {
        let h = histogram(&[1.0, 1.0, 1.0, 5.0], 4);
        assert_eq!(h.labels.len(), 4);
        assert_eq!(h.counts, vec![3, 0, 0, 1]);
    }

    #[test]
    fn test_zero_range_goes_to_first_bin() {
        let h = histogram(&[3.0, 3.0, 3.0], 5);
        assert_eq!(h.counts, vec![3, 0, 0, 0, 0]);
        assert!(h.labels.iter().all(|l| l == "3.0 - 3.0"));
    }

    #[test]
    fn test_single_bin() {
        let h = histogram(&[1.0, 7.0, 4.0], 1);
        assert_eq!(h.counts, vec![3]);
        assert_eq!(h.labels, vec!["1.0 - 7.0"]);
    }

    #[test]
    fn test_bins_iterator() {
        let h = histogram(&[0.0, 1.0], 2);
        let pairs: Vec<_> = h.bins().collect();
        assert_eq!(pairs, vec![("0.0 - 0.5", 1), ("0.5 - 1.0", 1)]);
    }

    #[test]
    fn test_plugin_uses_context_default() {
        let ctx = eval_ctx().with_default_bins(5);
        let result = HistogramBins.call(&[Value::from(zero_to_nine())], &ctx);
        assert_eq!(result.get("counts").as_list().map(|c| c.len()), Some(5));
    }

    #[test]
    fn test_plugin_explicit_bins() {
        let result = HistogramBins.call(&[Value::from(zero_to_nine()), Value::Number(2.0)], &eval_ctx());
        let counts = result.get("counts").as_list().map(|c| c.to_vec()).unwrap();
        assert_eq!(counts, vec![Value::from(5usize), Value::from(5usize)]);
    }

    #[test]
    fn test_plugin_rejects_bad_bins() {
        let result = HistogramBins.call(&[Value::from(zero_to_nine()), Value::Number(-1.0)], &eval_ctx());
        assert!(result.is_error());
    }

    #[test]
    fn test_plugin_rejects_huge_bins() {
        for bins in [1e300, (MAX_BIN_COUNT + 1) as f64] {
            let result = HistogramBins.call(&[Value::from(vec![1.0, 2.0, 3.0]), Value::Number(bins)], &eval_ctx());
            assert_eq!(
                result.as_error().map(|e| e.code.as_str()),
                Some(cohort_core::codes::DOMAIN_ERROR),
                "bins {}",
                bins
            );
        }
        let result = HistogramBins.call(
            &[Value::from(vec![1.0, 2.0, 3.0]), Value::Number(MAX_BIN_COUNT as f64)],
            &eval_ctx(),
        );
        assert_eq!(result.get("counts").as_list().map(|c| c.len()), Some(MAX_BIN_COUNT));
    }

    #[test]
    fn test_bin_count_capped() {
        let h = histogram(&[1.0, 2.0, 3.0], usize::MAX);
        assert_eq!(h.counts.len(), MAX_BIN_COUNT);
        assert_eq!(h.labels.len(), MAX_BIN_COUNT);
        assert_eq!(h.total(), 3);
    }
}
