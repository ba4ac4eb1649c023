//! Request validation for the HTTP API.
//!
//! Field errors are collected per field so a client can show each one next
//! to its input. A request that passes validation carries parsed values and
//! can only fail inside an engine.
//!
//! Bodies are read as raw JSON so a wrongly typed field is reported against
//! that field like any other validation failure.

use std::collections::BTreeMap;

use errdetect_core::crc::DEFAULT_GENERATOR;
use errdetect_core::dispatch::{DispatchError, TECHNIQUE_NAMES};
use errdetect_core::{BitString, Technique};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static BINARY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[01]+$").expect("static regex"));

const REQUIRED: &str = "This field is required.";
const BLANK: &str = "This field may not be blank.";
const NULL: &str = "This field may not be null.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";
const NOT_BINARY: &str = "Data must contain only 0s and 1s.";
const GENERATOR_NOT_BINARY: &str = "Generator must contain only 0s and 1s.";

/// Field name to its error messages.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Body of `POST /api/detect-error/`.
#[derive(Debug, Clone, Default)]
pub struct DetectRequest {
    pub technique: Option<String>,
    pub data: Option<String>,
    pub generator: Option<String>,
    pub introduce_error: Option<bool>,
}

/// A request whose fields all parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidRequest {
    pub technique: Technique,
    pub data: BitString,
    pub introduce_error: bool,
}

impl DetectRequest {
    /// Pull the fields out of a JSON object, checking their types.
    ///
    /// Absent fields stay `None`. A field of the wrong type is reported in
    /// the returned errors and also left `None`.
    pub fn from_json(fields: &Map<String, Value>) -> (Self, FieldErrors) {
        let mut errors = FieldErrors::new();
        let request = DetectRequest {
            technique: text_field(fields, "technique", &mut errors),
            data: text_field(fields, "data", &mut errors),
            generator: text_field(fields, "generator", &mut errors),
            introduce_error: bool_field(fields, "introduce_error", &mut errors),
        };
        (request, errors)
    }

    /// Check every field and collect all failures.
    pub fn validate(&self) -> Result<ValidRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        let data = match self.data.as_deref() {
            None => {
                add(&mut errors, "data", REQUIRED.to_string());
                None
            }
            Some("") => {
                add(&mut errors, "data", BLANK.to_string());
                None
            }
            Some(text) if !BINARY.is_match(text) => {
                add(&mut errors, "data", NOT_BINARY.to_string());
                None
            }
            Some(text) => text.parse::<BitString>().ok(),
        };

        let generator = self.generator.as_deref().unwrap_or(DEFAULT_GENERATOR);
        if generator.is_empty() {
            add(&mut errors, "generator", BLANK.to_string());
        } else if !BINARY.is_match(generator) {
            add(&mut errors, "generator", GENERATOR_NOT_BINARY.to_string());
        }

        let technique = match self.technique.as_deref() {
            None => {
                add(&mut errors, "technique", REQUIRED.to_string());
                None
            }
            Some(name) => match Technique::from_name(name, Some(generator)) {
                Ok(technique) => Some(technique),
                Err(DispatchError::UnknownTechnique { name }) => {
                    add(
                        &mut errors,
                        "technique",
                        format!(
                            "\"{}\" is not a valid choice. Expected one of: {}.",
                            name,
                            TECHNIQUE_NAMES.join(", ")
                        ),
                    );
                    None
                }
                Err(DispatchError::Engine(err)) => {
                    // Alphabet failures were already reported above.
                    if !errors.contains_key("generator") {
                        add(&mut errors, "generator", err.to_string());
                    }
                    None
                }
            },
        };

        match (technique, data) {
            (Some(technique), Some(data)) if errors.is_empty() => Ok(ValidRequest {
                technique,
                data,
                introduce_error: self.introduce_error.unwrap_or(false),
            }),
            _ => Err(errors),
        }
    }
}

/// Type-check a JSON body, then validate it.
///
/// A field that failed its type check is not reported again as missing.
pub fn parse_request(body: &Value) -> Result<ValidRequest, FieldErrors> {
    let Some(fields) = body.as_object() else {
        let mut errors = FieldErrors::new();
        add(
            &mut errors,
            "non_field_errors",
            format!(
                "Invalid data. Expected a dictionary, but got {}.",
                json_type(body)
            ),
        );
        return Err(errors);
    };

    let (request, mut errors) = DetectRequest::from_json(fields);
    match request.validate() {
        Ok(valid) if errors.is_empty() => Ok(valid),
        Ok(_) => Err(errors),
        Err(field_errors) => {
            for (field, messages) in field_errors {
                errors.entry(field).or_insert(messages);
            }
            Err(errors)
        }
    }
}

fn text_field(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match fields.get(name)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Null => {
            add(errors, name, NULL.to_string());
            None
        }
        _ => {
            add(errors, name, NOT_A_STRING.to_string());
            None
        }
    }
}

fn bool_field(
    fields: &Map<String, Value>,
    name: &str,
    errors: &mut FieldErrors,
) -> Option<bool> {
    match fields.get(name)? {
        Value::Bool(flag) => Some(*flag),
        Value::Null => {
            add(errors, name, NULL.to_string());
            None
        }
        _ => {
            add(errors, name, NOT_A_BOOLEAN.to_string());
            None
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

fn add(errors: &mut FieldErrors, field: &str, message: String) {
    errors.entry(field.to_string()).or_default().push(message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(technique: &str, data: &str) -> DetectRequest {
        DetectRequest {
            technique: Some(technique.to_string()),
            data: Some(data.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_request_defaults() {
        let valid = request("crc", "1101").validate().unwrap();
        assert_eq!(valid.technique, Technique::default_crc());
        assert_eq!(valid.data, "1101".parse().unwrap());
        assert!(!valid.introduce_error);
    }

    #[test]
    fn test_non_binary_data() {
        let errors = request("vrc", "10a1").validate().unwrap_err();
        assert_eq!(errors["data"], vec![NOT_BINARY.to_string()]);
    }

    #[test]
    fn test_blank_fields() {
        let errors = request("vrc", "").validate().unwrap_err();
        assert_eq!(errors["data"], vec![BLANK.to_string()]);

        let mut req = request("crc", "1011");
        req.generator = Some(String::new());
        let errors = req.validate().unwrap_err();
        assert_eq!(errors["generator"], vec![BLANK.to_string()]);
    }

    #[test]
    fn test_missing_fields() {
        let errors = DetectRequest::default().validate().unwrap_err();
        assert_eq!(errors["technique"], vec![REQUIRED.to_string()]);
        assert_eq!(errors["data"], vec![REQUIRED.to_string()]);
    }

    #[test]
    fn test_unknown_technique() {
        let errors = request("hamming", "1011").validate().unwrap_err();
        assert!(errors["technique"][0].contains("\"hamming\" is not a valid choice"));
        assert!(!errors.contains_key("data"));
    }

    #[test]
    fn test_bad_generator() {
        let mut req = request("crc", "1011");
        req.generator = Some("12".to_string());
        let errors = req.validate().unwrap_err();
        assert_eq!(errors["generator"], vec![GENERATOR_NOT_BINARY.to_string()]);

        req.generator = Some("1".to_string());
        let errors = req.validate().unwrap_err();
        assert_eq!(errors["generator"].len(), 1);
        assert!(errors["generator"][0].contains("at least 2"));
    }

    #[test]
    fn test_generator_checked_for_every_technique() {
        let mut req = request("vrc", "1011");
        req.generator = Some("abc".to_string());
        assert!(req.validate().unwrap_err().contains_key("generator"));
    }

    #[test]
    fn test_parse_request_valid_body() {
        let body = json!({"technique": "lrc", "data": "1011", "introduce_error": true});
        let valid = parse_request(&body).unwrap();
        assert_eq!(valid.technique, Technique::Lrc);
        assert!(valid.introduce_error);
    }

    #[test]
    fn test_parse_request_wrong_types() {
        let body = json!({"technique": "vrc", "data": "1011", "introduce_error": "yes"});
        let errors = parse_request(&body).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors["introduce_error"], vec![NOT_A_BOOLEAN.to_string()]);

        let body = json!({"technique": ["vrc"], "data": null});
        let errors = parse_request(&body).unwrap_err();
        assert_eq!(errors["technique"], vec![NOT_A_STRING.to_string()]);
        assert_eq!(errors["data"], vec![NULL.to_string()]);
    }

    #[test]
    fn test_parse_request_numeric_data() {
        let body = json!({"technique": "vrc", "data": 1011});
        let valid = parse_request(&body).unwrap();
        assert_eq!(valid.data, "1011".parse().unwrap());
    }

    #[test]
    fn test_parse_request_non_object() {
        let errors = parse_request(&json!(["vrc", "1011"])).unwrap_err();
        assert_eq!(
            errors["non_field_errors"],
            vec!["Invalid data. Expected a dictionary, but got list.".to_string()]
        );
    }
}
