//! Field-level payload validation for the admin and contact forms.
//!
//! Each form input implements [`Validate`], turning a loosely typed request
//! body into the draft row that is written to the store. All failing fields
//! are collected so a form can highlight every problem at once.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Turns a raw form input into a store-ready draft
pub trait Validate: Sized {
    type Output: Serialize;

    fn validate(self) -> Result<Self::Output, ValidationError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

/// Client-supplied data failed the resource schema.
///
/// `field`/`reason` name the first failure; `field_errors` carries all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub reason: String,
    pub field_errors: BTreeMap<String, String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        let field = field.into();
        let reason = reason.into();
        let mut field_errors = BTreeMap::new();
        field_errors.insert(field.clone(), reason.clone());
        Self { field, reason, field_errors }
    }

    /// Body could not be decoded into the form shape at all
    pub fn malformed_body(err: serde_json::Error) -> Self {
        Self::new("body", format!("Request body does not match the form: {}", err))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid '{}': {}", self.field, self.reason)
    }
}

impl std::error::Error for ValidationError {}

/// Collects field failures while a form is checked
#[derive(Debug, Default)]
pub struct Checker {
    errors: Vec<FieldError>,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, reason: impl Into<String>) {
        // keep the first reason per field
        if self.errors.iter().any(|e| e.field == field) {
            return;
        }
        self.errors.push(FieldError { field: field.to_string(), reason: reason.into() });
    }

    /// Required text of at least `min` characters (after trimming)
    pub fn text(&mut self, field: &str, value: Option<String>, min: usize) -> String {
        let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
        if value.is_empty() {
            self.fail(field, "This field is required");
        } else if value.chars().count() < min {
            self.fail(field, format!("Must be at least {} characters", min));
        }
        value
    }

    /// Required http(s) URL
    pub fn url(&mut self, field: &str, value: Option<String>) -> String {
        match blank_to_none(value) {
            Some(v) => {
                if let Err(reason) = check_url(&v) {
                    self.fail(field, reason);
                }
                v
            }
            None => {
                self.fail(field, "This field is required");
                String::new()
            }
        }
    }

    /// Optional http(s) URL; blank strings are normalized to absent
    pub fn optional_url(&mut self, field: &str, value: Option<String>) -> Option<String> {
        let value = blank_to_none(value)?;
        if let Err(reason) = check_url(&value) {
            self.fail(field, reason);
        }
        Some(value)
    }

    /// Number >= `min`; accepts JSON numbers and numeric strings
    pub fn number_at_least(&mut self, field: &str, value: Option<Value>, min: f64) -> f64 {
        let parsed = match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) if !s.trim().is_empty() => s.trim().parse::<f64>().ok(),
            Some(Value::Null) | None => {
                self.fail(field, "This field is required");
                return 0.0;
            }
            _ => None,
        };
        match parsed {
            Some(n) if n.is_finite() && n >= min => n,
            Some(n) if n.is_finite() => {
                self.fail(field, format!("Must be at least {}", min));
                n
            }
            _ => {
                self.fail(field, "Must be a number");
                0.0
            }
        }
    }

    /// Email with a plausible `local@domain.tld` shape
    pub fn email(&mut self, field: &str, value: Option<String>) -> String {
        let value = value.map(|v| v.trim().to_string()).unwrap_or_default();
        if value.is_empty() {
            self.fail(field, "This field is required");
        } else if !is_email(&value) {
            self.fail(field, "Must be a valid email address");
        }
        value
    }

    /// Non-empty list of trimmed, non-blank tags
    pub fn tags(&mut self, field: &str, value: Vec<String>, min: usize) -> Vec<String> {
        let tags: Vec<String> = value
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tags.len() < min {
            self.fail(field, format!("At least {} entry is required", min));
        }
        tags
    }

    pub fn finish<T>(self, value: T) -> Result<T, ValidationError> {
        let mut errors = self.errors.into_iter();
        match errors.next() {
            None => Ok(value),
            Some(first) => {
                let mut err = ValidationError::new(first.field, first.reason);
                for e in errors {
                    err.field_errors.insert(e.field, e.reason);
                }
                Err(err)
            }
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

pub fn check_url(value: &str) -> Result<(), String> {
    match Url::parse(value) {
        Ok(url) => match url.scheme() {
            "http" | "https" if url.host_str().is_some() => Ok(()),
            "http" | "https" => Err("URL must include a host".to_string()),
            scheme => Err(format!("Unsupported URL scheme: {}", scheme)),
        },
        Err(e) => Err(format!("Invalid URL format: {}", e)),
    }
}

fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
