//! Group comparison: two-sample t statistic and one-way ANOVA
//!
//! Neither test guards against degenerate groups. Empty groups, single-member
//! groups and zero within-group variance produce NaN or infinite statistics,
//! which callers display as "N/A".

use cohort_plugin::prelude::*;
use serde::{Deserialize, Serialize};
use crate::helpers::{extract_groups, extract_two_lists_unaligned, mean, sum, sum_sq_dev, variance_s};

/// Welch t statistic with the two group means
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    pub t_stat: f64,
    pub mean1: f64,
    pub mean2: f64,
}

impl TTestResult {
    pub fn to_value(&self) -> Value {
        Value::object([
            ("t_stat", Value::Number(self.t_stat)),
            ("mean1", Value::Number(self.mean1)),
            ("mean2", Value::Number(self.mean2)),
        ])
    }
}

/// One-way ANOVA F statistic with per-group means
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResult {
    pub f_stat: f64,
    pub group_means: Vec<f64>,
}

impl AnovaResult {
    pub fn to_value(&self) -> Value {
        Value::object([
            ("f_stat", Value::Number(self.f_stat)),
            ("group_means", Value::from(self.group_means.clone())),
        ])
    }
}

/// Two-sample t statistic with unpooled (Welch) standard error.
///
/// Each group's variance is the sample variance (n-1 denominator). No p-value
/// is computed.
pub fn t_test(group1: &[f64], group2: &[f64]) -> TTestResult {
    let mean1 = mean(group1);
    let mean2 = mean(group2);

    let var1 = variance_s(group1);
    let var2 = variance_s(group2);

    let n1 = group1.len() as f64;
    let n2 = group2.len() as f64;
    let t_stat = (mean1 - mean2) / (var1 / n1 + var2 / n2).sqrt();

    TTestResult { t_stat, mean1, mean2 }
}

/// One-way analysis of variance across `groups`.
pub fn anova<G: AsRef<[f64]>>(groups: &[G]) -> AnovaResult {
    let group_means: Vec<f64> = groups.iter().map(|g| mean(g.as_ref())).collect();

    let total_n: usize = groups.iter().map(|g| g.as_ref().len()).sum();
    let total_sum = groups.iter().fold(0.0, |acc, g| acc + sum(g.as_ref()));
    let overall_mean = total_sum / total_n as f64;

    let mut ss_between = 0.0;
    let mut ss_within = 0.0;
    for (group, &group_mean) in groups.iter().zip(&group_means) {
        let group = group.as_ref();
        let diff = group_mean - overall_mean;
        ss_between += group.len() as f64 * diff * diff;
        ss_within += sum_sq_dev(group, group_mean);
    }

    let k = groups.len() as f64;
    let df_between = k - 1.0;
    let df_within = total_n as f64 - k;
    let f_stat = ss_between / df_between / (ss_within / df_within);

    tracing::trace!(k = groups.len(), total_n, ss_between, ss_within, "anova");

    AnovaResult { f_stat, group_means }
}

// ============ TTest ============

pub struct TTest;

static T_TEST_ARGS: [ArgMeta; 2] = [
    ArgMeta::required("group1", "List<Number>", "First group"),
    ArgMeta::required("group2", "List<Number>", "Second group"),
];

static T_TEST_EXAMPLES: [&str; 1] = ["t_test([5.1,4.9,6.2,5.8], [4.1,3.9,4.6]) → {t_stat: 3.54, mean1: 5.5, mean2: 4.2}"];

static T_TEST_RELATED: [&str; 1] = ["anova"];

impl FunctionPlugin for TTest {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "t_test",
            description: "Two-sample t statistic with unpooled variance (Welch)",
            usage: "t_test(group1, group2)",
            args: &T_TEST_ARGS,
            returns: "Object",
            examples: &T_TEST_EXAMPLES,
            category: "stats/hypothesis",
            related: &T_TEST_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_two_lists_unaligned(args, "t_test") {
            Ok((g1, g2)) => t_test(&g1, &g2).to_value(),
            Err(e) => Value::Error(e),
        }
    }
}

// ============ Anova ============

pub struct Anova;

static ANOVA_ARGS: [ArgMeta; 1] = [ArgMeta::required(
    "groups",
    "List<List<Number>> | List<Number>...",
    "Groups to compare",
)];

static ANOVA_EXAMPLES: [&str; 2] = [
    "anova([1,2,3], [4,5,6], [7,8,9]) → {f_stat: 27, group_means: [2, 5, 8]}",
    "anova([[1,2,3], [4,5,6]]) → {f_stat: 13.5, ...}",
];

static ANOVA_RELATED: [&str; 1] = ["t_test"];

impl FunctionPlugin for Anova {
    fn meta(&self) -> FunctionMeta {
        FunctionMeta {
            name: "anova",
            description: "One-way ANOVA F statistic",
            usage: "anova(group1, group2, ...)",
            args: &ANOVA_ARGS,
            returns: "Object",
            examples: &ANOVA_EXAMPLES,
            category: "stats/hypothesis",
            related: &ANOVA_RELATED,
        }
    }

    fn call(&self, args: &[Value], _ctx: &EvalContext) -> Value {
        match extract_groups(args) {
            Ok(groups) => anova(&groups).to_value(),
            Err(e) => Value::Error(e),
        }
    }
}
