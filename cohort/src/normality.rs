//! Normality screen across the registry's numeric variables

use crate::fields::{field, Variable};
use crate::patient::Patient;
use cohort_stats::{histogram, ks_test, shapiro_wilk_test, Histogram, TestResult};
use serde::Serialize;

/// Variables screened for normality, in display order
pub static NORMALITY_FIELDS: [&str; 33] = [
    // Identification
    "age",
    "heightMeters",
    "weight",
    "imc",
    "satAtRest",
    "charlsonComorbidityIndex",
    // Tests and questionnaires
    "satAtRestStartTC6",
    "satAtRestEndTC6",
    "litersO2TC6",
    "tc6_1",
    "tc6_2",
    "satAtRestStartTSL",
    "satAtRestEndTSL",
    "litersO2TSL",
    "tsl5RepSeconds",
    "kbildSimpleSum",
    "kbildScale0_100",
    "whodas",
    "pahD1EMA",
    "pahD1EAA",
    "pahD2EMA",
    "pahD2EAA",
    "participationScale",
    // Spirometry
    "vef1CVF",
    "vef1CVFPred",
    "vef1",
    "vef1Pred",
    "cvf",
    "cvfPred",
    "pef",
    "pefPred",
    "fef2575",
    "fef257Pred",
];

/// Both normality tests for one variable, with the sample they ran on
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalityRow {
    pub key: &'static str,
    pub variable: &'static str,
    pub ks: TestResult,
    pub sw: TestResult,
    pub data: Vec<f64>,
}

impl NormalityRow {
    pub fn histogram(&self, bins: usize) -> Histogram {
        histogram(&self.data, bins)
    }
}

/// Run both tests on every screened variable that has at least one value.
pub fn normality_report(patients: &[Patient]) -> Vec<NormalityRow> {
    let rows: Vec<NormalityRow> = NORMALITY_FIELDS
        .iter()
        .filter_map(|key| field(key))
        .map(|def| Variable::from_field(patients, def))
        .filter(|var| !var.is_empty())
        .map(|var| NormalityRow {
            key: var.key,
            variable: var.name,
            ks: ks_test(&var.sample),
            sw: shapiro_wilk_test(&var.sample),
            data: var.sample,
        })
        .collect();

    tracing::debug!(patients = patients.len(), rows = rows.len(), "normality report");
    rows
}
