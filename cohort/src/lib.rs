//! Cohort - statistics over a patient registry
//!
//! Ties the statistical core to registry records: patient decoding, the field
//! table, record sources, selections, analysis presets, the normality screen
//! and markdown rendering. [`Cohort`] is the entry point used by the server.

mod patient;
mod fields;
mod source;
mod selection;
mod analysis;
mod normality;
mod render;

pub use patient::{Patient, RawField};
pub use fields::{category, field, sample, CategoryDef, FieldDef, Variable, CATEGORIES, FIELDS};
pub use source::{InMemorySource, JsonFileSource, PatientSource, SourceError};
pub use selection::Selection;
pub use analysis::{Analysis, AnalysisReport, MISSING_GROUP};
pub use normality::{normality_report, NormalityRow, NORMALITY_FIELDS};
pub use render::{NumberFormat, Renderer};

use cohort_core::{StatsError, Value};
use cohort_plugin::{EvalContext, PluginRegistry};
use cohort_stats::{histogram, Histogram, DEFAULT_BIN_COUNT};
use std::collections::HashMap;
use std::sync::Arc;

/// Main Cohort engine
pub struct Cohort {
    registry: Arc<PluginRegistry>,
    default_bins: usize,
}

impl Cohort {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            default_bins: DEFAULT_BIN_COUNT,
        }
    }

    pub fn with_stats_library() -> Self {
        Self::new(cohort_stats::load_stats_library(PluginRegistry::new()))
    }

    pub fn with_default_bins(mut self, bins: usize) -> Self {
        self.default_bins = bins;
        self
    }

    pub fn default_bins(&self) -> usize {
        self.default_bins
    }

    /// Call a registry function over `patients`.
    ///
    /// Text arguments name fields and are replaced by that field's sample
    /// before the call, so `mean("age")` averages the patients' ages.
    pub fn call(&self, name: &str, args: &[Value], patients: &[Patient]) -> Value {
        let mut variables = HashMap::new();
        for arg in args {
            if let Value::Text(key) = arg {
                if let Some(def) = field(key) {
                    variables.insert(key.clone(), Value::from(sample(patients, def)));
                }
            }
        }

        let ctx = EvalContext::new(self.registry.clone())
            .with_default_bins(self.default_bins)
            .with_variables(variables);

        let mut resolved = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                Value::Text(key) => match ctx.get_var(key) {
                    Value::Error(_) => return Value::Error(StatsError::undefined_field(key)),
                    v => resolved.push(v),
                },
                other => resolved.push(other.clone()),
            }
        }

        ctx.call(name, &resolved)
    }

    /// Run an analysis preset over `patients`
    pub fn analyze(&self, analysis: &Analysis, patients: &[Patient]) -> Result<AnalysisReport, StatsError> {
        analysis.run(patients)
    }

    pub fn normality(&self, patients: &[Patient]) -> Vec<NormalityRow> {
        normality_report(patients)
    }

    /// Histogram of one field; `bins` falls back to the engine default
    pub fn histogram(&self, key: &str, bins: Option<usize>, patients: &[Patient]) -> Result<Histogram, StatsError> {
        let def = field(key).ok_or_else(|| StatsError::undefined_field(key))?;
        Ok(histogram(&sample(patients, def), bins.unwrap_or(self.default_bins)))
    }

    pub fn help(&self, name: Option<&str>) -> Value {
        self.registry.help(name)
    }

    pub fn list_functions(&self, category: Option<&str>) -> Value {
        self.registry.list_functions(category)
    }
}

impl Default for Cohort {
    fn default() -> Self {
        Self::with_stats_library()
    }
}
