//! Markdown renderer
//!
//! Renders analysis reports, the normality screen and histograms as markdown
//! tables. Non-finite numbers are shown as `N/A`.

use crate::analysis::AnalysisReport;
use crate::normality::NormalityRow;
use cohort_core::Value;
use cohort_stats::Histogram;

/// Display format for numbers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberFormat {
    /// Fixed decimal places
    Decimal(usize),
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat::Decimal(2)
    }
}

impl NumberFormat {
    pub fn format(self, n: f64) -> String {
        if !n.is_finite() {
            return "N/A".to_string();
        }
        match self {
            NumberFormat::Decimal(places) => format!("{:.*}", places, n),
        }
    }
}

/// Report renderer
pub struct Renderer {
    analysis_format: NumberFormat,
    normality_format: NumberFormat,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            analysis_format: NumberFormat::Decimal(2),
            normality_format: NumberFormat::Decimal(3),
        }
    }

    pub fn with_analysis_format(mut self, format: NumberFormat) -> Self {
        self.analysis_format = format;
        self
    }

    pub fn render_analysis(&self, report: &AnalysisReport) -> String {
        let f = |n: f64| self.analysis_format.format(n);
        let mut output = String::new();

        match report {
            AnalysisReport::Descriptive { variable, n, stats } => {
                output.push_str(&format!("## Descriptive statistics: {}\n\n", variable));
                output.push_str("| statistic | value |\n");
                output.push_str("|-----------|-------|\n");
                output.push_str(&format!("| n | {} |\n", n));
                output.push_str(&format!("| mean | {} |\n", f(stats.mean)));
                output.push_str(&format!("| std_dev | {} |\n", f(stats.std_dev)));
                output.push_str(&format!("| min | {} |\n", f(stats.min)));
                output.push_str(&format!("| max | {} |\n", f(stats.max)));
            }

            AnalysisReport::TTest { variable, group1, group2, n1, n2, result } => {
                output.push_str(&format!("## t-test: {} ({} vs {})\n\n", variable, group1, group2));
                output.push_str("| group | n | mean |\n");
                output.push_str("|-------|---|------|\n");
                output.push_str(&format!("| {} | {} | {} |\n", group1, n1, f(result.mean1)));
                output.push_str(&format!("| {} | {} | {} |\n", group2, n2, f(result.mean2)));
                output.push_str(&format!("\nt = {}\n", f(result.t_stat)));
            }

            AnalysisReport::Anova { variable, groups, sizes, result } => {
                output.push_str(&format!("## ANOVA: {}\n\n", variable));
                output.push_str("| group | n | mean |\n");
                output.push_str("|-------|---|------|\n");
                for ((group, size), mean) in groups.iter().zip(sizes).zip(&result.group_means) {
                    output.push_str(&format!("| {} | {} | {} |\n", group, size, f(*mean)));
                }
                output.push_str(&format!("\nF = {}\n", f(result.f_stat)));
            }

            AnalysisReport::Correlation { x, y, n, r } => {
                output.push_str(&format!("## Pearson correlation: {} vs {}\n\n", x, y));
                output.push_str(&format!("n = {}\n\nr = {}\n", n, f(*r)));
            }

            AnalysisReport::Regression { independent, dependent, n, result } => {
                output.push_str(&format!("## Linear regression: {} → {}\n\n", independent, dependent));
                output.push_str("| coefficient | value |\n");
                output.push_str("|-------------|-------|\n");
                output.push_str(&format!("| slope | {} |\n", f(result.slope)));
                output.push_str(&format!("| intercept | {} |\n", f(result.intercept)));
                output.push_str(&format!("\nn = {}\n", n));
            }
        }

        output
    }

    pub fn render_normality(&self, rows: &[NormalityRow]) -> String {
        let f = |n: f64| self.normality_format.format(n);
        let mut output = String::from("## Normality tests\n\n");

        if rows.is_empty() {
            output.push_str("No variable has data for the selected patients.\n");
            return output;
        }

        output.push_str("| variable | K-S statistic | df | K-S sig. | S-W statistic | df | S-W sig. |\n");
        output.push_str("|----------|---------------|----|----------|---------------|----|----------|\n");
        for row in rows {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                row.variable,
                f(row.ks.statistic),
                row.ks.degrees_of_freedom,
                f(row.ks.p_value),
                f(row.sw.statistic),
                row.sw.degrees_of_freedom,
                f(row.sw.p_value),
            ));
        }
        output
    }

    pub fn render_histogram(&self, title: &str, hist: &Histogram) -> String {
        let mut output = format!("### {}\n\n", title);
        if hist.is_empty() {
            output.push_str("No data.\n");
            return output;
        }

        output.push_str("| bin | count |\n");
        output.push_str("|-----|-------|\n");
        for (label, count) in hist.bins() {
            output.push_str(&format!("| {} | {} |\n", label, count));
        }
        output
    }

    pub fn render_value(&self, value: &Value) -> String {
        match value {
            Value::Number(n) => self.analysis_format.format(*n),
            Value::Text(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                let mut output = String::from("| name | value |\n|------|-------|\n");
                for key in keys {
                    output.push_str(&format!("| {} | {} |\n", key, self.render_inline(&map[key])));
                }
                output
            }
            Value::List(_) => self.render_inline(value),
            Value::Null => "null".to_string(),
            Value::Error(e) => format!("#ERROR: {}", e),
        }
    }

    fn render_inline(&self, value: &Value) -> String {
        match value {
            Value::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| self.render_inline(v)).collect();
                format!("[{}]", parts.join(", "))
            }
            Value::Object(_) => "[Object]".to_string(),
            Value::Error(e) => format!("#ERROR: {}", e.code),
            other => self.render_value(other),
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort_stats::{descriptive_stats, histogram, t_test, TestResult};

    #[test]
    fn test_number_format() {
        assert_eq!(NumberFormat::Decimal(2).format(1.23456), "1.23");
        assert_eq!(NumberFormat::Decimal(3).format(0.5), "0.500");
        assert_eq!(NumberFormat::default().format(f64::NAN), "N/A");
        assert_eq!(NumberFormat::default().format(f64::NEG_INFINITY), "N/A");
    }

    #[test]
    fn test_descriptive_table() {
        let report = AnalysisReport::Descriptive {
            variable: "Idade",
            n: 8,
            stats: descriptive_stats(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]),
        };
        let md = Renderer::new().render_analysis(&report);
        assert!(md.contains("## Descriptive statistics: Idade"));
        assert!(md.contains("| mean | 5.00 |"));
        assert!(md.contains("| std_dev | 2.00 |"));
    }

    #[test]
    fn test_degenerate_t_test_shows_na() {
        let report = AnalysisReport::TTest {
            variable: "Sat em Repouso (%)",
            group1: "Masculino".into(),
            group2: "Feminino".into(),
            n1: 1,
            n2: 0,
            result: t_test(&[97.0], &[]),
        };
        let md = Renderer::new().render_analysis(&report);
        assert!(md.contains("| Masculino | 1 | 97.00 |"));
        assert!(md.contains("| Feminino | 0 | N/A |"));
        assert!(md.contains("t = N/A"));
    }

    #[test]
    fn test_normality_table_three_decimals() {
        let rows = vec![NormalityRow {
            key: "age",
            variable: "Idade",
            ks: TestResult { statistic: 0.25, degrees_of_freedom: 8, p_value: 0.6326 },
            sw: TestResult { statistic: 7.0226, degrees_of_freedom: 8, p_value: f64::NAN },
            data: vec![],
        }];
        let md = Renderer::new().render_normality(&rows);
        assert!(md.contains("| Idade | 0.250 | 8 | 0.633 | 7.023 | 8 | N/A |"));
    }

    #[test]
    fn test_empty_normality() {
        assert!(Renderer::new().render_normality(&[]).contains("No variable has data"));
    }

    #[test]
    fn test_histogram_table() {
        let md = Renderer::new().render_histogram("IMC", &histogram(&[0.0, 10.0], 2));
        assert!(md.starts_with("### IMC"));
        assert!(md.contains("| 0.0 - 5.0 | 1 |"));
        assert!(md.contains("| 5.0 - 10.0 | 1 |"));
        assert!(Renderer::new().render_histogram("x", &Histogram::default()).contains("No data."));
    }

    #[test]
    fn test_render_value_object() {
        let v = Value::object([("b", Value::Number(2.0)), ("a", Value::from(vec![1.0, 2.5]))]);
        let md = Renderer::new().render_value(&v);
        let a = md.find("| a |").unwrap();
        let b = md.find("| b |").unwrap();
        assert!(a < b);
        assert!(md.contains("| a | [1.00, 2.50] |"));
        assert_eq!(Renderer::new().render_value(&Value::Number(f64::NAN)), "N/A");
    }
}
