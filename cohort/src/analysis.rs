//! Analysis presets run over a patient selection

use crate::fields::{category, field, sample, CategoryDef, FieldDef, Variable};
use crate::patient::Patient;
use cohort_core::StatsError;
use cohort_stats::{
    anova, descriptive_stats, linear_regression, pearson, t_test, AnovaResult, DescriptiveStats,
    RegressionResult, TTestResult,
};
use serde::{Deserialize, Serialize};

/// Label used for patients with no value in the grouping column
pub const MISSING_GROUP: &str = "(missing)";

/// One analysis and the columns it reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Analysis {
    Descriptive { field: String },
    TTest { field: String, group_field: String, group1: String, group2: String },
    Anova { field: String, group_field: String },
    Correlation { x: String, y: String },
    Regression { x: String, y: String },
}

impl Analysis {
    pub const KINDS: [&'static str; 5] = ["descriptive", "t_test", "anova", "correlation", "regression"];

    /// Preset for `kind` with the registry's default columns
    pub fn preset(kind: &str) -> Option<Self> {
        let analysis = match kind {
            "descriptive" => Analysis::Descriptive { field: "age".into() },
            "t_test" | "ttest" => Analysis::TTest {
                field: "satAtRest".into(),
                group_field: "sex".into(),
                group1: "Masculino".into(),
                group2: "Feminino".into(),
            },
            "anova" => Analysis::Anova { field: "imc".into(), group_field: "education".into() },
            "correlation" => Analysis::Correlation { x: "weight".into(), y: "heightMeters".into() },
            "regression" => Analysis::Regression { x: "weight".into(), y: "imc".into() },
            _ => return None,
        };
        Some(analysis)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Analysis::Descriptive { .. } => "descriptive",
            Analysis::TTest { .. } => "t_test",
            Analysis::Anova { .. } => "anova",
            Analysis::Correlation { .. } => "correlation",
            Analysis::Regression { .. } => "regression",
        }
    }

    /// Run over `patients` (already narrowed to the selection).
    ///
    /// Fails only on unknown column keys. Degenerate samples produce the
    /// statistical core's neutral or NaN results.
    pub fn run(&self, patients: &[Patient]) -> Result<AnalysisReport, StatsError> {
        tracing::debug!(kind = self.kind(), patients = patients.len(), "running analysis");

        match self {
            Analysis::Descriptive { field } => {
                let var = Variable::from_field(patients, lookup_field(field)?);
                Ok(AnalysisReport::Descriptive {
                    variable: var.name,
                    n: var.len(),
                    stats: descriptive_stats(&var.sample),
                })
            }

            Analysis::TTest { field, group_field, group1, group2 } => {
                let def = lookup_field(field)?;
                let cat = lookup_category(group_field)?;
                let in_group = |name: &str| {
                    sample(patients.iter().filter(|p| (cat.extract)(p) == Some(name)), def)
                };
                let first = in_group(group1.as_str());
                let second = in_group(group2.as_str());

                Ok(AnalysisReport::TTest {
                    variable: def.label,
                    group1: group1.clone(),
                    group2: group2.clone(),
                    n1: first.len(),
                    n2: second.len(),
                    result: t_test(&first, &second),
                })
            }

            Analysis::Anova { field, group_field } => {
                let def = lookup_field(field)?;
                let cat = lookup_category(group_field)?;

                let mut levels: Vec<Option<&str>> = Vec::new();
                for p in patients {
                    let level = (cat.extract)(p);
                    if !levels.contains(&level) {
                        levels.push(level);
                    }
                }

                let groups: Vec<Vec<f64>> = levels
                    .iter()
                    .map(|level| sample(patients.iter().filter(|p| (cat.extract)(p) == *level), def))
                    .collect();

                Ok(AnalysisReport::Anova {
                    variable: def.label,
                    groups: levels.iter().map(|l| l.unwrap_or(MISSING_GROUP).to_string()).collect(),
                    sizes: groups.iter().map(Vec::len).collect(),
                    result: anova(&groups),
                })
            }

            Analysis::Correlation { x, y } => {
                let (xd, yd) = (lookup_field(x)?, lookup_field(y)?);
                let (xs, ys) = truncated_pair(patients, xd, yd);
                Ok(AnalysisReport::Correlation {
                    x: xd.label,
                    y: yd.label,
                    n: xs.len(),
                    r: pearson(&xs, &ys),
                })
            }

            Analysis::Regression { x, y } => {
                let (xd, yd) = (lookup_field(x)?, lookup_field(y)?);
                let (xs, ys) = truncated_pair(patients, xd, yd);
                Ok(AnalysisReport::Regression {
                    independent: xd.label,
                    dependent: yd.label,
                    n: xs.len(),
                    result: linear_regression(&xs, &ys),
                })
            }
        }
    }
}

/// Result of running an [`Analysis`], with column labels
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisReport {
    Descriptive {
        variable: &'static str,
        n: usize,
        stats: DescriptiveStats,
    },
    TTest {
        variable: &'static str,
        group1: String,
        group2: String,
        n1: usize,
        n2: usize,
        result: TTestResult,
    },
    Anova {
        variable: &'static str,
        groups: Vec<String>,
        sizes: Vec<usize>,
        result: AnovaResult,
    },
    Correlation {
        x: &'static str,
        y: &'static str,
        n: usize,
        r: f64,
    },
    Regression {
        independent: &'static str,
        dependent: &'static str,
        n: usize,
        result: RegressionResult,
    },
}

fn lookup_field(key: &str) -> Result<&'static FieldDef, StatsError> {
    field(key).ok_or_else(|| StatsError::undefined_field(key))
}

fn lookup_category(key: &str) -> Result<&'static CategoryDef, StatsError> {
    category(key).ok_or_else(|| {
        StatsError::undefined_field(key).with_suggestion("Group by one of: sex, education, diagnosis, phase")
    })
}

/// Both samples cut to the shorter length.
///
/// Values are paired by position after missing values are dropped, not by
/// patient.
fn truncated_pair(patients: &[Patient], x: &FieldDef, y: &FieldDef) -> (Vec<f64>, Vec<f64>) {
    let mut xs = sample(patients, x);
    let mut ys = sample(patients, y);
    let n = xs.len().min(ys.len());
    xs.truncate(n);
    ys.truncate(n);
    (xs, ys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::RawField;
    use approx::assert_abs_diff_eq;
    use cohort_core::codes;

    fn patient(id: &str, sex: &str, education: Option<&str>, sat: f64, imc: f64) -> Patient {
        Patient {
            sex: Some(sex.to_string()),
            education: education.map(str::to_string),
            sat_at_rest: Some(RawField::Number(sat)),
            imc: Some(RawField::Number(imc)),
            ..Patient::new(id, id)
        }
    }

    fn registry() -> Vec<Patient> {
        vec![
            patient("1", "Masculino", Some("Fundamental"), 5.1, 1.0),
            patient("2", "Feminino", Some("Superior"), 4.1, 4.0),
            patient("3", "Masculino", Some("Fundamental"), 4.9, 2.0),
            patient("4", "Feminino", None, 3.9, 7.0),
            patient("5", "Masculino", Some("Superior"), 6.2, 5.0),
            patient("6", "Feminino", Some("Superior"), 4.6, 6.0),
            patient("7", "Masculino", Some("Fundamental"), 5.8, 3.0),
            patient("8", "Feminino", None, f64::NAN, 8.0),
            patient("9", "Feminino", None, f64::NAN, 9.0),
        ]
    }

    #[test]
    fn test_presets() {
        for kind in Analysis::KINDS {
            let preset = Analysis::preset(kind).unwrap();
            assert_eq!(preset.kind(), kind);
        }
        assert_eq!(Analysis::preset("ttest").map(|a| a.kind()), Some("t_test"));
        assert!(Analysis::preset("chi2").is_none());
    }

    #[test]
    fn test_descriptive_preset_on_empty_selection() {
        let report = Analysis::preset("descriptive").unwrap().run(&[]).unwrap();
        match report {
            AnalysisReport::Descriptive { variable, n, stats } => {
                assert_eq!(variable, "Idade");
                assert_eq!(n, 0);
                assert_eq!(stats.mean, 0.0);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_t_test_by_sex() {
        let report = Analysis::preset("t_test").unwrap().run(&registry()).unwrap();
        match report {
            AnalysisReport::TTest { n1, n2, result, group1, .. } => {
                assert_eq!(group1, "Masculino");
                assert_eq!(n1, 4);
                // Non-finite readings are dropped from the sample
                assert_eq!(n2, 3);
                assert_abs_diff_eq!(result.mean1, 5.5, epsilon = 1e-12);
                assert_abs_diff_eq!(result.mean2, 4.2, epsilon = 1e-12);
                assert_abs_diff_eq!(result.t_stat, 3.5381518506868126, epsilon = 1e-9);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_anova_groups_in_first_appearance_order() {
        let report = Analysis::preset("anova").unwrap().run(&registry()).unwrap();
        match report {
            AnalysisReport::Anova { groups, sizes, result, .. } => {
                assert_eq!(groups, vec!["Fundamental", "Superior", MISSING_GROUP]);
                assert_eq!(sizes, vec![3, 3, 3]);
                assert_eq!(result.group_means, vec![2.0, 5.0, 8.0]);
                assert_abs_diff_eq!(result.f_stat, 27.0, epsilon = 1e-9);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_correlation_truncates_to_shorter_sample() {
        let mut ps = registry();
        for (i, p) in ps.iter_mut().enumerate().take(3) {
            p.weight = Some(RawField::Number(60.0 + 10.0 * i as f64));
            p.height_meters = Some(RawField::Number(1.5 + 0.1 * i as f64));
        }
        ps[3].weight = Some(RawField::Number(55.0));

        let report = Analysis::preset("correlation").unwrap().run(&ps).unwrap();
        match report {
            AnalysisReport::Correlation { n, r, x, y } => {
                assert_eq!((x, y), ("Peso", "Altura (metros)"));
                assert_eq!(n, 3);
                assert_abs_diff_eq!(r, 1.0, epsilon = 1e-9);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_regression_preset() {
        let mut ps = registry();
        for p in ps.iter_mut() {
            let imc = p.imc.as_ref().and_then(RawField::as_f64).unwrap();
            p.weight = Some(RawField::Number(imc * 2.0 + 1.0));
        }
        let report = Analysis::preset("regression").unwrap().run(&ps).unwrap();
        match report {
            AnalysisReport::Regression { result, n, .. } => {
                assert_eq!(n, 9);
                assert_abs_diff_eq!(result.slope, 0.5, epsilon = 1e-12);
                assert_abs_diff_eq!(result.intercept, -0.5, epsilon = 1e-12);
            }
            other => panic!("unexpected report {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field() {
        let analysis = Analysis::Descriptive { field: "shoeSize".into() };
        let err = analysis.run(&registry()).unwrap_err();
        assert_eq!(err.code, codes::UNDEFINED_FIELD);

        let analysis = Analysis::Anova { field: "imc".into(), group_field: "imc".into() };
        assert_eq!(analysis.run(&registry()).unwrap_err().code, codes::UNDEFINED_FIELD);
    }

    #[test]
    fn test_report_serializes_with_kind_tag() {
        let report = Analysis::preset("t_test").unwrap().run(&registry()).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["kind"], "t_test");
        assert_eq!(json["n1"], 4);
    }

    #[test]
    fn test_analysis_deserializes_from_kind_tag() {
        let json = r#"{"kind": "correlation", "x": "age", "y": "imc"}"#;
        let analysis: Analysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis, Analysis::Correlation { x: "age".into(), y: "imc".into() });
    }
}
