//! Tool handlers for `tools/call`
//!
//! Invalid arguments are protocol errors (-32602). Failures inside a valid
//! call (unknown field, unreadable data file, function error) come back as a
//! normal tool result with `isError: true` so the client can show them.

use crate::McpError;
use cohort::{
    Analysis, Cohort, Patient, PatientSource, Renderer, Selection, CATEGORIES, FIELDS, field,
};
use cohort_core::{StatsError, Value};
use cohort_stats::MAX_BIN_COUNT;
use serde::Serialize;
use serde_json::{json, Value as JsonValue};

/// Why a tool call did not produce a result
enum ToolFailure {
    Params(McpError),
    Stats(StatsError),
}

impl From<McpError> for ToolFailure {
    fn from(e: McpError) -> Self {
        ToolFailure::Params(e)
    }
}

impl From<StatsError> for ToolFailure {
    fn from(e: StatsError) -> Self {
        ToolFailure::Stats(e)
    }
}

type ToolResult = Result<JsonValue, ToolFailure>;

pub fn call_tool(
    cohort: &Cohort,
    source: &dyn PatientSource,
    name: &str,
    args: &JsonValue,
) -> Result<JsonValue, McpError> {
    let result = match name {
        "list_variables" => tool_list_variables(),
        "list_patients" => tool_list_patients(source),
        "analyze" => tool_analyze(cohort, source, args),
        "normality" => tool_normality(cohort, source, args),
        "histogram" => tool_histogram(cohort, source, args),
        "stats" => tool_stats(cohort, source, args),
        "list_functions" => tool_list_functions(cohort, args),
        "help" => tool_help(cohort, args),
        _ => return Err(McpError::invalid_params(format!("Unknown tool: {}", name))),
    };

    match result {
        Ok(v) => Ok(v),
        Err(ToolFailure::Params(e)) => Err(e),
        Err(ToolFailure::Stats(e)) => {
            tracing::info!(tool = name, code = %e.code, "tool returned error: {}", e.message);
            Ok(json!({
                "content": [{ "type": "text", "text": e.to_string() }],
                "error": {
                    "code": e.code,
                    "message": e.message,
                    "suggestion": e.suggestion,
                },
                "isError": true
            }))
        }
    }
}

pub fn tool_definitions() -> JsonValue {
    let patient_ids = json!({
        "type": "array",
        "items": { "type": "string" },
        "description": "Patients to include (default: all)"
    });

    json!({
        "tools": [
            {
                "name": "list_variables",
                "description": "List the numeric fields and grouping fields available for analysis.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "list_patients",
                "description": "List patient ids and names from the registry.",
                "inputSchema": { "type": "object", "properties": {} }
            },
            {
                "name": "analyze",
                "description": "Run an analysis preset (descriptive, t_test, anova, correlation, regression) over the selected patients. Omitted fields use the preset defaults.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "kind": { "type": "string", "enum": Analysis::KINDS },
                        "patient_ids": patient_ids,
                        "field": { "type": "string", "description": "Measured field (descriptive, t_test, anova)" },
                        "group_field": { "type": "string", "description": "Grouping field (t_test, anova)" },
                        "group1": { "type": "string", "description": "First group value (t_test)" },
                        "group2": { "type": "string", "description": "Second group value (t_test)" },
                        "x": { "type": "string", "description": "Independent field (correlation, regression)" },
                        "y": { "type": "string", "description": "Dependent field (correlation, regression)" }
                    },
                    "required": ["kind"]
                }
            },
            {
                "name": "normality",
                "description": "Kolmogorov-Smirnov and Shapiro-Wilk tests for every numeric variable with data.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "patient_ids": patient_ids }
                }
            },
            {
                "name": "histogram",
                "description": "Equal-width histogram of one field.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "field": { "type": "string" },
                        "bins": { "type": "integer", "minimum": 1, "maximum": MAX_BIN_COUNT },
                        "patient_ids": patient_ids
                    },
                    "required": ["field"]
                }
            },
            {
                "name": "stats",
                "description": "Call a statistics function. String arguments name fields and are replaced by their samples, e.g. {\"function\": \"mean\", \"args\": [\"age\"]}.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "function": { "type": "string" },
                        "args": { "type": "array" },
                        "patient_ids": patient_ids
                    },
                    "required": ["function"]
                }
            },
            {
                "name": "list_functions",
                "description": "List statistics functions, optionally by category (e.g. stats/normality).",
                "inputSchema": {
                    "type": "object",
                    "properties": { "category": { "type": "string" } }
                }
            },
            {
                "name": "help",
                "description": "Documentation for one function, or an overview when name is omitted.",
                "inputSchema": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } }
                }
            }
        ]
    })
}

// ============ Tools ============

fn tool_list_variables() -> ToolResult {
    let mut md = String::from("## Numeric fields\n\n| key | label |\n|-----|-------|\n");
    for def in FIELDS {
        md.push_str(&format!("| {} | {} |\n", def.key, def.label));
    }
    md.push_str("\n## Grouping fields\n\n| key | label |\n|-----|-------|\n");
    for def in CATEGORIES {
        md.push_str(&format!("| {} | {} |\n", def.key, def.label));
    }

    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": { "fields": to_json(FIELDS)?, "categories": to_json(CATEGORIES)? }
    }))
}

fn tool_list_patients(source: &dyn PatientSource) -> ToolResult {
    let patients = source.fetch_all().map_err(StatsError::from)?;

    let mut md = format!("{} patients\n\n| id | name |\n|----|------|\n", patients.len());
    for p in &patients {
        md.push_str(&format!("| {} | {} |\n", p.id, p.name));
    }
    let data: Vec<JsonValue> = patients.iter().map(|p| json!({ "id": p.id, "name": p.name })).collect();

    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": data
    }))
}

fn tool_analyze(cohort: &Cohort, source: &dyn PatientSource, args: &JsonValue) -> ToolResult {
    let kind = require_str(args, "kind")?;
    let mut analysis = Analysis::preset(&kind).ok_or_else(|| {
        McpError::invalid_params(format!("Unknown analysis kind: {}", kind))
            .with_data(json!({ "available": Analysis::KINDS }))
    })?;

    match &mut analysis {
        Analysis::Descriptive { field } => override_str(args, "field", field)?,
        Analysis::TTest { field, group_field, group1, group2 } => {
            override_str(args, "field", field)?;
            override_str(args, "group_field", group_field)?;
            override_str(args, "group1", group1)?;
            override_str(args, "group2", group2)?;
        }
        Analysis::Anova { field, group_field } => {
            override_str(args, "field", field)?;
            override_str(args, "group_field", group_field)?;
        }
        Analysis::Correlation { x, y } | Analysis::Regression { x, y } => {
            override_str(args, "x", x)?;
            override_str(args, "y", y)?;
        }
    }

    let patients = selected_patients(source, args)?;
    let report = cohort.analyze(&analysis, &patients)?;
    let md = Renderer::new().render_analysis(&report);

    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": to_json(&report)?
    }))
}

fn tool_normality(cohort: &Cohort, source: &dyn PatientSource, args: &JsonValue) -> ToolResult {
    let patients = selected_patients(source, args)?;
    let rows = cohort.normality(&patients);
    let md = Renderer::new().render_normality(&rows);

    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": to_json(&rows)?
    }))
}

fn tool_histogram(cohort: &Cohort, source: &dyn PatientSource, args: &JsonValue) -> ToolResult {
    let key = require_str(args, "field")?;
    let bins = optional_count(args, "bins", MAX_BIN_COUNT)?;
    let patients = selected_patients(source, args)?;

    let hist = cohort.histogram(&key, bins, &patients)?;
    let title = field(&key).map(|d| d.label).unwrap_or(key.as_str());
    let md = Renderer::new().render_histogram(title, &hist);

    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": to_json(&hist)?
    }))
}

fn tool_stats(cohort: &Cohort, source: &dyn PatientSource, args: &JsonValue) -> ToolResult {
    let function = require_str(args, "function")?;
    let call_args: Vec<Value> = match args.get("args") {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Array(items)) => items.iter().map(json_to_value).collect(),
        Some(_) => return Err(McpError::invalid_params("args must be an array").into()),
    };

    let patients = selected_patients(source, args)?;
    let result = cohort.call(&function, &call_args, &patients);
    if let Value::Error(e) = result {
        return Err(e.into());
    }

    let md = Renderer::new().render_value(&result);
    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": value_to_json(&result)
    }))
}

fn tool_list_functions(cohort: &Cohort, args: &JsonValue) -> ToolResult {
    let category = optional_str(args, "category")?;
    let functions = cohort.list_functions(category.as_deref());

    let mut md = String::new();
    for f in functions.as_list().unwrap_or(&[]) {
        md.push_str(&format!(
            "- `{}` ({}): {}\n",
            f.get("usage"),
            f.get("category"),
            f.get("description")
        ));
    }
    if md.is_empty() {
        md.push_str("No functions found.\n");
    }

    Ok(json!({
        "content": [{ "type": "text", "text": md }],
        "data": value_to_json(&functions)
    }))
}

fn tool_help(cohort: &Cohort, args: &JsonValue) -> ToolResult {
    let name = optional_str(args, "name")?;
    let help = cohort.help(name.as_deref());
    if let Value::Error(e) = help {
        return Err(e.into());
    }

    Ok(json!({
        "content": [{ "type": "text", "text": format_help(&help) }],
        "data": value_to_json(&help)
    }))
}

fn format_help(help: &Value) -> String {
    let mut md = String::new();
    if let Some(usage) = help.get("usage").as_text() {
        md.push_str(&format!("## {}\n\n", usage));
    }
    if let Some(desc) = help.get("description").as_text() {
        md.push_str(&format!("{}\n\n", desc));
    }
    if let Some(examples) = help.get("examples").as_list() {
        for ex in examples {
            md.push_str(&format!("- {}\n", ex));
        }
    }
    if md.is_empty() {
        md = Renderer::new().render_value(help);
    }
    md
}

// ============ Argument helpers ============

fn optional_str(args: &JsonValue, key: &str) -> Result<Option<String>, McpError> {
    match args.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(McpError::invalid_params(format!("{} must be a string", key))),
    }
}

fn require_str(args: &JsonValue, key: &str) -> Result<String, McpError> {
    optional_str(args, key)?.ok_or_else(|| McpError::invalid_params(format!("Missing {} argument", key)))
}

fn override_str(args: &JsonValue, key: &str, slot: &mut String) -> Result<(), McpError> {
    if let Some(v) = optional_str(args, key)? {
        *slot = v;
    }
    Ok(())
}

fn optional_count(args: &JsonValue, key: &str, max: usize) -> Result<Option<usize>, McpError> {
    match args.get(key) {
        None | Some(JsonValue::Null) => Ok(None),
        Some(v) => match v.as_u64().and_then(|n| usize::try_from(n).ok()) {
            Some(n) if (1..=max).contains(&n) => Ok(Some(n)),
            _ => Err(McpError::invalid_params(format!("{} must be an integer between 1 and {}", key, max))),
        },
    }
}

/// Fetch records and narrow them to `patient_ids` when given
fn selected_patients(source: &dyn PatientSource, args: &JsonValue) -> Result<Vec<Patient>, ToolFailure> {
    let ids: Option<Vec<String>> = match args.get("patient_ids") {
        None | Some(JsonValue::Null) => None,
        Some(JsonValue::Array(items)) => Some(
            items
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => Ok(s.clone()),
                    JsonValue::Number(n) => Ok(n.to_string()),
                    _ => Err(McpError::invalid_params("patient_ids must contain strings")),
                })
                .collect::<Result<_, _>>()?,
        ),
        Some(_) => return Err(McpError::invalid_params("patient_ids must be an array").into()),
    };

    let all = source.fetch_all().map_err(StatsError::from)?;
    Ok(match ids {
        Some(ids) => Selection::from_ids(ids).apply(&all),
        None => all,
    })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<JsonValue, StatsError> {
    serde_json::to_value(value).map_err(|e| StatsError::internal(e.to_string()))
}

// ============ Value conversion ============

pub fn json_to_value(json: &JsonValue) -> Value {
    match json {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
        JsonValue::String(s) => Value::Text(s.clone()),
        JsonValue::Array(arr) => Value::List(arr.iter().map(json_to_value).collect()),
        JsonValue::Object(obj) => Value::Object(obj.iter().map(|(k, v)| (k.clone(), json_to_value(v))).collect()),
    }
}

/// Non-finite numbers become `null`
pub fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Number(n) => serde_json::Number::from_f64(*n).map(JsonValue::Number).unwrap_or(JsonValue::Null),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::List(l) => JsonValue::Array(l.iter().map(value_to_json).collect()),
        Value::Object(o) => JsonValue::Object(o.iter().map(|(k, v)| (k.clone(), value_to_json(v))).collect()),
        Value::Error(e) => json!({"_error": {"code": e.code, "message": e.message}}),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cohort::{InMemorySource, RawField};

    fn source() -> InMemorySource {
        let rows = [
            ("1", "Masculino", "Fundamental", 5.1, 1.0),
            ("2", "Feminino", "Superior", 4.1, 4.0),
            ("3", "Masculino", "Fundamental", 4.9, 2.0),
            ("4", "Feminino", "Superior", 3.9, 5.0),
        ];
        InMemorySource::new(
            rows.iter()
                .map(|(id, sex, edu, sat, imc)| Patient {
                    sex: Some(sex.to_string()),
                    education: Some(edu.to_string()),
                    sat_at_rest: Some(RawField::Number(*sat)),
                    imc: Some(RawField::Number(*imc)),
                    ..Patient::new(*id, format!("Patient {}", id))
                })
                .collect(),
        )
    }

    fn call(name: &str, args: JsonValue) -> Result<JsonValue, McpError> {
        call_tool(&Cohort::default(), &source(), name, &args)
    }

    fn text(result: &JsonValue) -> &str {
        result["content"][0]["text"].as_str().unwrap()
    }

    #[test]
    fn test_tool_definitions_cover_handlers() {
        let defs = tool_definitions();
        let names: Vec<&str> = defs["tools"].as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(
            names,
            vec!["list_variables", "list_patients", "analyze", "normality", "histogram", "stats", "list_functions", "help"]
        );
    }

    #[test]
    fn test_list_variables() {
        let result = call("list_variables", json!({})).unwrap();
        assert!(text(&result).contains("| satAtRest | Sat em Repouso (%) |"));
        assert_eq!(result["data"]["categories"][0]["key"], "sex");
    }

    #[test]
    fn test_list_patients() {
        let result = call("list_patients", json!({})).unwrap();
        assert_eq!(result["data"].as_array().unwrap().len(), 4);
        assert!(text(&result).starts_with("4 patients"));
    }

    #[test]
    fn test_analyze_t_test_defaults() {
        let result = call("analyze", json!({ "kind": "t_test" })).unwrap();
        assert_eq!(result["data"]["kind"], "t_test");
        assert_eq!(result["data"]["n1"], 2);
        assert!(text(&result).contains("| Masculino | 2 | 5.00 |"));
    }

    #[test]
    fn test_analyze_overrides_and_selection() {
        let result = call(
            "analyze",
            json!({ "kind": "descriptive", "field": "imc", "patient_ids": ["1", "3"] }),
        )
        .unwrap();
        assert_eq!(result["data"]["n"], 2);
        assert_eq!(result["data"]["stats"]["mean"], 1.5);
    }

    #[test]
    fn test_analyze_unknown_field_is_tool_error() {
        let result = call("analyze", json!({ "kind": "descriptive", "field": "shoeSize" })).unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["error"]["code"], cohort_core::codes::UNDEFINED_FIELD);
    }

    #[test]
    fn test_analyze_bad_params() {
        assert_eq!(call("analyze", json!({})).unwrap_err().code, -32602);
        assert_eq!(call("analyze", json!({ "kind": "chi2" })).unwrap_err().code, -32602);
        assert_eq!(call("analyze", json!({ "kind": "anova", "field": 3 })).unwrap_err().code, -32602);
        assert_eq!(
            call("analyze", json!({ "kind": "anova", "patient_ids": "1" })).unwrap_err().code,
            -32602
        );
    }

    #[test]
    fn test_normality_tool() {
        let result = call("normality", json!({})).unwrap();
        let keys: Vec<&str> = result["data"].as_array().unwrap().iter().map(|r| r["key"].as_str().unwrap()).collect();
        assert_eq!(keys, vec!["imc", "satAtRest"]);
        assert_eq!(result["data"][0]["ks"]["df"], 4);
        assert!(text(&result).contains("| IMC |"));

        let result = call("normality", json!({ "patient_ids": [] })).unwrap();
        assert!(text(&result).contains("No variable has data"));
    }

    #[test]
    fn test_histogram_tool() {
        let result = call("histogram", json!({ "field": "imc", "bins": 4 })).unwrap();
        assert_eq!(result["data"]["counts"].as_array().unwrap().len(), 4);
        assert!(text(&result).starts_with("### IMC"));
        assert_eq!(call("histogram", json!({ "field": "imc", "bins": 0 })).unwrap_err().code, -32602);
    }

    #[test]
    fn test_histogram_bins_upper_bound() {
        for bins in [json!(u64::MAX), json!(MAX_BIN_COUNT + 1), json!(1e300)] {
            let err = call("histogram", json!({ "field": "imc", "bins": bins })).unwrap_err();
            assert_eq!(err.code, -32602);
        }
        let result = call("histogram", json!({ "field": "imc", "bins": MAX_BIN_COUNT })).unwrap();
        assert_eq!(result["data"]["counts"].as_array().unwrap().len(), MAX_BIN_COUNT);
    }

    #[test]
    fn test_stats_histogram_huge_bins_is_tool_error() {
        let result = call("stats", json!({ "function": "histogram", "args": ["imc", 1e300] })).unwrap();
        assert_eq!(result["isError"], true);
        assert_eq!(result["error"]["code"], cohort_core::codes::DOMAIN_ERROR);
    }

    #[test]
    fn test_stats_tool() {
        let result = call("stats", json!({ "function": "mean", "args": ["imc"] })).unwrap();
        assert_eq!(result["data"], 3.0);

        let result = call("stats", json!({ "function": "correlation", "args": [[1, 2, 3], [2, 4, 6]] })).unwrap();
        assert!((result["data"].as_f64().unwrap() - 1.0).abs() < 1e-12);

        let result = call("stats", json!({ "function": "nope", "args": [] })).unwrap();
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn test_help_and_list_functions() {
        let result = call("help", json!({ "name": "ks_test" })).unwrap();
        assert!(text(&result).starts_with("## ks_test(values)"));

        let result = call("list_functions", json!({ "category": "stats/hypothesis" })).unwrap();
        assert_eq!(result["data"].as_array().unwrap().len(), 2);

        let result = call("help", json!({ "name": "nope" })).unwrap();
        assert_eq!(result["isError"], true);
    }

    #[test]
    fn test_unknown_tool() {
        assert_eq!(call("eval", json!({})).unwrap_err().code, -32602);
    }

    #[test]
    fn test_value_conversions() {
        let v = json_to_value(&json!([1, "age", null, true]));
        assert_eq!(
            v,
            Value::List(vec![Value::Number(1.0), Value::from("age"), Value::Null, Value::Bool(true)])
        );
        assert_eq!(value_to_json(&Value::Number(f64::NAN)), JsonValue::Null);
        assert_eq!(value_to_json(&Value::Number(2.5)), json!(2.5));
    }
}
