//! Field table: named numeric and categorical accessors over [`Patient`]
//!
//! Analyses refer to measurements by the backend key (`"satAtRest"`). The
//! tables below map each key to a label and an accessor so lookups are
//! checked against a fixed list instead of reflecting over record keys.

use crate::patient::{Patient, RawField};
use serde::Serialize;

/// A numeric measurement column
#[derive(Clone, Copy, Serialize)]
pub struct FieldDef {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub extract: fn(&Patient) -> Option<&RawField>,
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef").field("key", &self.key).field("label", &self.label).finish()
    }
}

/// A categorical column used for grouping
#[derive(Clone, Copy, Serialize)]
pub struct CategoryDef {
    pub key: &'static str,
    pub label: &'static str,
    #[serde(skip)]
    pub extract: fn(&Patient) -> Option<&str>,
}

impl std::fmt::Debug for CategoryDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryDef").field("key", &self.key).field("label", &self.label).finish()
    }
}

macro_rules! numeric_fields {
    ($($key:literal => $field:ident, $label:literal;)*) => {
        /// Every numeric measurement of the registry
        pub static FIELDS: &[FieldDef] = &[
            $(FieldDef { key: $key, label: $label, extract: |p| p.$field.as_ref() },)*
        ];
    };
}

numeric_fields! {
    "age" => age, "Idade";
    "heightMeters" => height_meters, "Altura (metros)";
    "weight" => weight, "Peso";
    "imc" => imc, "IMC";
    "satAtRest" => sat_at_rest, "Sat em Repouso (%)";
    "charlsonComorbidityIndex" => charlson_comorbidity_index, "Charlson Comorbidity Index";
    "satAtRestStartTC6" => sat_at_rest_start_tc6, "SAT em Repouso (%) - Início TC6";
    "satAtRestEndTC6" => sat_at_rest_end_tc6, "SAT (%) Final TC6";
    "litersO2TC6" => liters_o2_tc6, "Litros de O2 (TC6)";
    "tc6_1" => tc6_1, "TC6-1";
    "tc6_2" => tc6_2, "TC6-2";
    "satAtRestStartTSL" => sat_at_rest_start_tsl, "SAT em Repouso (%) - Início TSL";
    "satAtRestEndTSL" => sat_at_rest_end_tsl, "SAT (%) Final TSL";
    "litersO2TSL" => liters_o2_tsl, "Litros de O2 (TSL)";
    "tsl5RepSeconds" => tsl_5rep_seconds, "TSL 5rep em Segundos";
    "tpp" => tpp, "TPP";
    "mrc" => mrc, "MRC";
    "pgiD1IntraScore" => pgi_d1_intra_score, "PGI (D1 Intra) (escore total)";
    "pgiD1InterScore" => pgi_d1_inter_score, "PGI (D1 Inter) (escore total)";
    "pgiD2IntraScore" => pgi_d2_intra_score, "PGI (D2 Intra) (escore total)";
    "kbildSimpleSum" => kbild_simple_sum, "KBILD (Soma simples)";
    "kbildScale0_100" => kbild_scale_0_100, "KBILD (escala de 0-100)";
    "whodas" => whodas, "WHODAS";
    "pahD1EMA" => pah_d1_ema, "PAH (D1) EMA";
    "pahD1EAA" => pah_d1_eaa, "PAH (D1) EAA";
    "pahD2EMA" => pah_d2_ema, "PAH (D2) EMA";
    "pahD2EAA" => pah_d2_eaa, "PAH (D2) EAA";
    "participationScale" => participation_scale, "Escala de Participação";
    "vef1CVF" => vef1_cvf, "VEF1/CVF";
    "vef1CVFPred" => vef1_cvf_pred, "VEF1/CVF - %PRED";
    "vef1" => vef1, "VEF1";
    "vef1Pred" => vef1_pred, "VEF1 - %PRED";
    "cvf" => cvf, "CVF";
    "cvfPred" => cvf_pred, "CVF - %PRED";
    "pef" => pef, "PEF";
    "pefPred" => pef_pred, "PEF - %PRED";
    "fef2575" => fef_25_75, "FEF25-75";
    "fef257Pred" => fef_25_75_pred, "FEF25-75 - %PRED";
}

/// Grouping columns
pub static CATEGORIES: &[CategoryDef] = &[
    CategoryDef { key: "sex", label: "Sexo", extract: |p| p.sex.as_deref() },
    CategoryDef { key: "education", label: "Escolaridade", extract: |p| p.education.as_deref() },
    CategoryDef { key: "diagnosis", label: "Diagnóstico", extract: |p| p.diagnosis.as_deref() },
    CategoryDef { key: "phase", label: "Fase", extract: |p| p.phase.as_deref() },
];

/// Look up a numeric field by key
pub fn field(key: &str) -> Option<&'static FieldDef> {
    FIELDS.iter().find(|f| f.key == key)
}

/// Look up a categorical field by key
pub fn category(key: &str) -> Option<&'static CategoryDef> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Numeric values of `def` across `patients`, in record order.
///
/// Missing, non-numeric and non-finite values are skipped, so the sample can
/// be shorter than `patients` or empty.
pub fn sample<'a>(patients: impl IntoIterator<Item = &'a Patient>, def: &FieldDef) -> Vec<f64> {
    patients
        .into_iter()
        .filter_map(|p| (def.extract)(p).and_then(RawField::as_f64))
        .collect()
}

/// A labeled sample
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Variable {
    pub key: &'static str,
    pub name: &'static str,
    pub sample: Vec<f64>,
}

impl Variable {
    pub fn from_field<'a>(patients: impl IntoIterator<Item = &'a Patient>, def: &FieldDef) -> Self {
        let sample = sample(patients, def);
        tracing::debug!(field = def.key, n = sample.len(), "extracted sample");
        Self { key: def.key, name: def.label, sample }
    }

    pub fn len(&self) -> usize {
        self.sample.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sample.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patient(id: &str, age: Option<RawField>) -> Patient {
        Patient { age, ..Patient::new(id, id) }
    }

    #[test]
    fn test_keys_unique() {
        let mut keys: Vec<&str> = FIELDS.iter().map(|f| f.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), FIELDS.len());
    }

    #[test]
    fn test_lookup() {
        assert_eq!(field("imc").map(|f| f.label), Some("IMC"));
        assert!(field("phone").is_none());
        assert_eq!(category("sex").map(|c| c.key), Some("sex"));
        assert!(category("age").is_none());
    }

    #[test]
    fn test_extractor_reads_its_own_column() {
        let mut p = Patient::new("1", "x");
        p.fef_25_75_pred = Some(RawField::Number(88.0));
        p.tc6_2 = Some(RawField::from("300"));
        assert_eq!((field("fef257Pred").unwrap().extract)(&p), Some(&RawField::Number(88.0)));
        assert_eq!((field("tc6_2").unwrap().extract)(&p), Some(&RawField::from("300")));
        assert_eq!((field("tc6_1").unwrap().extract)(&p), None);
    }

    #[test]
    fn test_sample_skips_unusable_values() {
        let patients = vec![
            patient("a", Some(RawField::from("63"))),
            patient("b", None),
            patient("c", Some(RawField::from("n/a"))),
            patient("d", Some(RawField::Number(70.0))),
            patient("e", Some(RawField::from("58 anos"))),
        ];
        let age = field("age").unwrap();
        assert_eq!(sample(&patients, age), vec![63.0, 70.0, 58.0]);
    }

    #[test]
    fn test_variable_from_field() {
        let patients = vec![patient("a", Some(RawField::Number(40.0)))];
        let v = Variable::from_field(&patients, field("age").unwrap());
        assert_eq!(v.name, "Idade");
        assert_eq!(v.len(), 1);

        let empty = Variable::from_field(&patients, field("weight").unwrap());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_category_reads_value() {
        let mut p = Patient::new("1", "x");
        p.education = Some("Superior".into());
        assert_eq!((category("education").unwrap().extract)(&p), Some("Superior"));
        assert_eq!((category("sex").unwrap().extract)(&p), None);
    }
}
