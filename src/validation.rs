use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::model::{CreateEmployee, UpdateEmployee};

/// Letters, whitespace, apostrophes and hyphens. Covers names like
/// "O'Brien" or "Smith-Jones" without letting digits or symbols through.
static NAME_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z\s'-]+$").unwrap());

const NAME_MIN: usize = 2;
const NAME_MAX: usize = 80;
const EMAIL_MIN: usize = 3;
const EMAIL_MAX: usize = 120;

/// Accumulated validation failures for one request body.
///
/// `form_errors` carries problems with the body as a whole (wrong top-level
/// type, empty update), `field_errors` maps each offending field to every
/// rule it broke, in rule order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "formErrors": [],
    "fieldErrors": {
        "name": ["Name must be at least 2 characters"],
        "email": ["Please enter a valid email address"]
    }
}))]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    #[schema(value_type = Object)]
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn form(message: String) -> Self {
        ValidationErrors {
            form_errors: vec![message],
            field_errors: BTreeMap::new(),
        }
    }

    fn add_field(&mut self, field: &str, message: String) {
        self.field_errors.entry(field.to_string()).or_default().push(message);
    }

    fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn name_rules(label: &str, value: &str) -> Vec<String> {
    let mut messages = Vec::new();
    let length = value.chars().count();
    if length < NAME_MIN {
        messages.push(format!("{} must be at least {} characters", label, NAME_MIN));
    }
    if length > NAME_MAX {
        messages.push(format!("{} must be {} characters or less", label, NAME_MAX));
    }
    if !NAME_PATTERN.is_match(value) {
        messages.push(format!(
            "{} can only contain letters, spaces, apostrophes, and hyphens",
            label
        ));
    }
    messages
}

fn email_rules(value: &str) -> Vec<String> {
    let mut messages = Vec::new();
    let length = value.chars().count();
    if length < EMAIL_MIN {
        messages.push("Email is required".to_string());
    }
    if length > EMAIL_MAX {
        messages.push(format!("Email must be {} characters or less", EMAIL_MAX));
    }
    if !validator::validate_email(value) {
        messages.push("Please enter a valid email address".to_string());
    }
    messages
}

/// Pulls a mandatory string field out of the body. Records `Required` when
/// the key is absent and a type mismatch when it holds a non-string, then
/// runs the per-field rules on whatever string was found.
fn required_string(
    errors: &mut ValidationErrors,
    body: &Map<String, Value>,
    field: &str,
    rules: impl Fn(&str) -> Vec<String>,
) -> Option<String> {
    let value = match body.get(field) {
        None => {
            errors.add_field(field, "Required".to_string());
            return None;
        }
        Some(Value::String(value)) => value.clone(),
        Some(other) => {
            errors.add_field(
                field,
                format!("Expected string, received {}", json_type_name(other)),
            );
            return None;
        }
    };
    for message in rules(&value) {
        errors.add_field(field, message);
    }
    Some(value)
}

/// Like [`required_string`], except an absent key is fine and recorded as
/// `None`. A present-but-non-string value (including `null`) still fails.
fn optional_string(
    errors: &mut ValidationErrors,
    body: &Map<String, Value>,
    field: &str,
    rules: impl Fn(&str) -> Vec<String>,
) -> Option<String> {
    let value = match body.get(field) {
        None => return None,
        Some(Value::String(value)) => value.clone(),
        Some(other) => {
            errors.add_field(
                field,
                format!("Expected string, received {}", json_type_name(other)),
            );
            return None;
        }
    };
    for message in rules(&value) {
        errors.add_field(field, message);
    }
    Some(value)
}

fn expect_object(body: &Value) -> Result<&Map<String, Value>, ValidationErrors> {
    body.as_object().ok_or_else(|| {
        ValidationErrors::form(format!(
            "Expected object, received {}",
            json_type_name(body)
        ))
    })
}

/// Validates a create payload. All three fields are mandatory and every
/// failed rule is reported, so a single bad request tells the caller
/// everything that is wrong with it.
pub fn validate_create(body: &Value) -> Result<CreateEmployee, ValidationErrors> {
    let body = expect_object(body)?;

    let mut errors = ValidationErrors::default();
    let name = required_string(&mut errors, body, "name", |value| name_rules("Name", value));
    let email = required_string(&mut errors, body, "email", email_rules);
    let position = required_string(&mut errors, body, "position", |value| {
        name_rules("Position", value)
    });

    match (name, email, position) {
        (Some(name), Some(email), Some(position)) if errors.is_empty() => Ok(CreateEmployee {
            name,
            email,
            position,
        }),
        _ => Err(errors),
    }
}

/// Validates an update payload. Fields are individually optional, but the
/// patch must mention at least one of them. Unknown keys are ignored.
pub fn validate_update(body: &Value) -> Result<UpdateEmployee, ValidationErrors> {
    let body = expect_object(body)?;

    let mut errors = ValidationErrors::default();
    let name = optional_string(&mut errors, body, "name", |value| name_rules("Name", value));
    let email = optional_string(&mut errors, body, "email", email_rules);
    let position = optional_string(&mut errors, body, "position", |value| {
        name_rules("Position", value)
    });

    let supplied = ["name", "email", "position"]
        .iter()
        .any(|field| body.contains_key(*field));
    if !supplied {
        errors
            .form_errors
            .push("At least one field must be provided for update".to_string());
    }

    if errors.is_empty() {
        Ok(UpdateEmployee {
            name,
            email,
            position,
        })
    } else {
        Err(errors)
    }
}
