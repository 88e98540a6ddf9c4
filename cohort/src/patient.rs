//! Patient records as stored by the registry backend
//!
//! Measurements are typed into free-text inputs and come back either as JSON
//! numbers or as strings, so each one is kept as a [`RawField`] and parsed
//! only when a sample is extracted.

use cohort_core::parse_number;
use serde::{Deserialize, Serialize};

/// A measurement exactly as the backend returned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawField {
    Number(f64),
    Text(String),
    /// Any other JSON shape (bool, array, object); never numeric
    Other(serde_json::Value),
}

impl RawField {
    /// Numeric reading of the field, if it has one.
    ///
    /// Text is parsed leniently (`"72 kg"` reads as 72). Non-finite values
    /// are rejected.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawField::Number(n) if n.is_finite() => Some(*n),
            RawField::Number(_) => None,
            RawField::Text(s) => parse_number(s).ok(),
            RawField::Other(_) => None,
        }
    }
}

impl From<f64> for RawField {
    fn from(n: f64) -> Self {
        RawField::Number(n)
    }
}

impl From<&str> for RawField {
    fn from(s: &str) -> Self {
        RawField::Text(s.to_string())
    }
}

/// One registry record.
///
/// Unknown keys in the stored record (contact details, free-text notes) are
/// ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub sex: Option<String>,
    pub education: Option<String>,
    pub diagnosis: Option<String>,
    pub phase: Option<String>,

    // Identification
    pub age: Option<RawField>,
    pub height_meters: Option<RawField>,
    pub weight: Option<RawField>,
    pub imc: Option<RawField>,
    pub sat_at_rest: Option<RawField>,
    pub charlson_comorbidity_index: Option<RawField>,

    // Six-minute walk test
    #[serde(rename = "satAtRestStartTC6")]
    pub sat_at_rest_start_tc6: Option<RawField>,
    #[serde(rename = "satAtRestEndTC6")]
    pub sat_at_rest_end_tc6: Option<RawField>,
    #[serde(rename = "litersO2TC6")]
    pub liters_o2_tc6: Option<RawField>,
    #[serde(rename = "tc6_1")]
    pub tc6_1: Option<RawField>,
    #[serde(rename = "tc6_2")]
    pub tc6_2: Option<RawField>,

    // Sit-to-stand test
    #[serde(rename = "satAtRestStartTSL")]
    pub sat_at_rest_start_tsl: Option<RawField>,
    #[serde(rename = "satAtRestEndTSL")]
    pub sat_at_rest_end_tsl: Option<RawField>,
    #[serde(rename = "litersO2TSL")]
    pub liters_o2_tsl: Option<RawField>,
    #[serde(rename = "tsl5RepSeconds")]
    pub tsl_5rep_seconds: Option<RawField>,

    // Questionnaires
    pub tpp: Option<RawField>,
    pub mrc: Option<RawField>,
    #[serde(rename = "pgiD1IntraScore")]
    pub pgi_d1_intra_score: Option<RawField>,
    #[serde(rename = "pgiD1InterScore")]
    pub pgi_d1_inter_score: Option<RawField>,
    #[serde(rename = "pgiD2IntraScore")]
    pub pgi_d2_intra_score: Option<RawField>,
    pub kbild_simple_sum: Option<RawField>,
    #[serde(rename = "kbildScale0_100")]
    pub kbild_scale_0_100: Option<RawField>,
    pub whodas: Option<RawField>,

    // Physical activity (PAH)
    #[serde(rename = "pahD1EMA")]
    pub pah_d1_ema: Option<RawField>,
    #[serde(rename = "pahD1EAA")]
    pub pah_d1_eaa: Option<RawField>,
    #[serde(rename = "pahD2EMA")]
    pub pah_d2_ema: Option<RawField>,
    #[serde(rename = "pahD2EAA")]
    pub pah_d2_eaa: Option<RawField>,
    pub participation_scale: Option<RawField>,

    // Spirometry
    #[serde(rename = "vef1CVF")]
    pub vef1_cvf: Option<RawField>,
    #[serde(rename = "vef1CVFPred")]
    pub vef1_cvf_pred: Option<RawField>,
    #[serde(rename = "vef1")]
    pub vef1: Option<RawField>,
    #[serde(rename = "vef1Pred")]
    pub vef1_pred: Option<RawField>,
    pub cvf: Option<RawField>,
    pub cvf_pred: Option<RawField>,
    pub pef: Option<RawField>,
    pub pef_pred: Option<RawField>,
    #[serde(rename = "fef2575")]
    pub fef_25_75: Option<RawField>,
    #[serde(rename = "fef257Pred")]
    pub fef_25_75_pred: Option<RawField>,
}

impl Patient {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), ..Default::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_field_numeric_reading() {
        assert_eq!(RawField::Number(72.5).as_f64(), Some(72.5));
        assert_eq!(RawField::from("72 kg").as_f64(), Some(72.0));
        assert_eq!(RawField::from(" 1.65").as_f64(), Some(1.65));
        assert_eq!(RawField::from("").as_f64(), None);
        assert_eq!(RawField::from("Masculino").as_f64(), None);
        assert_eq!(RawField::Number(f64::INFINITY).as_f64(), None);
    }

    #[test]
    fn test_decode_backend_record() {
        let json = r#"{
            "id": "p-1",
            "name": "Ana",
            "sex": "Feminino",
            "phone": "555-0100",
            "age": "63",
            "heightMeters": 1.58,
            "weight": "61,5",
            "satAtRestStartTC6": "95",
            "tc6_1": "410",
            "kbildScale0_100": 58,
            "vef1CVF": "0.71",
            "fef2575": null
        }"#;
        let p: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(p.id, "p-1");
        assert_eq!(p.sex.as_deref(), Some("Feminino"));
        assert_eq!(p.age, Some(RawField::Text("63".into())));
        assert_eq!(p.height_meters, Some(RawField::Number(1.58)));
        // Decimal comma reads up to the comma
        assert_eq!(p.weight.as_ref().and_then(RawField::as_f64), Some(61.0));
        assert_eq!(p.sat_at_rest_start_tc6.as_ref().and_then(RawField::as_f64), Some(95.0));
        assert_eq!(p.tc6_1.as_ref().and_then(RawField::as_f64), Some(410.0));
        assert_eq!(p.kbild_scale_0_100, Some(RawField::Number(58.0)));
        assert_eq!(p.vef1_cvf.as_ref().and_then(RawField::as_f64), Some(0.71));
        assert!(p.fef_25_75.is_none());
        assert!(p.education.is_none());
    }

    #[test]
    fn test_odd_measurement_shapes_keep_the_record() {
        let json = r#"{
            "id": "p-3",
            "age": true,
            "weight": [70, 71],
            "imc": {"value": 24.1},
            "heightMeters": "1.70"
        }"#;
        let p: Patient = serde_json::from_str(json).unwrap();
        assert_eq!(p.age, Some(RawField::Other(serde_json::Value::Bool(true))));
        assert!(matches!(p.weight, Some(RawField::Other(serde_json::Value::Array(_)))));
        for raw in [&p.age, &p.weight, &p.imc] {
            assert_eq!(raw.as_ref().and_then(RawField::as_f64), None);
        }
        assert_eq!(p.height_meters.as_ref().and_then(RawField::as_f64), Some(1.70));
    }

    #[test]
    fn test_serialize_uses_backend_keys() {
        let mut p = Patient::new("p-2", "Bruno");
        p.sat_at_rest_end_tsl = Some(RawField::from("91"));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["satAtRestEndTSL"], "91");
        assert_eq!(json["id"], "p-2");
    }
}
