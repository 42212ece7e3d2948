//! Component property sets
//!
//! Properties are exposed as a fresh list on every access. Editable entries
//! are parsed from text through [`parse_float`], [`parse_bool`] and friends; a
//! rejected edit returns a [`PropertyError`] and the component keeps its
//! previous value.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by a property edit
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropertyError {
    #[error("Unknown property: {0}")]
    Unknown(String),

    #[error("Property {0} is read-only")]
    ReadOnly(String),

    #[error("Property {name} expects a number, got {raw:?}")]
    InvalidNumber { name: String, raw: String },

    #[error("Property {name} expects true or false, got {raw:?}")]
    InvalidBool { name: String, raw: String },

    #[error("Property {name} out of range: {reason}")]
    OutOfRange { name: String, reason: String },
}

/// A typed property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Float(f64),
    Text(String),
}

impl PropertyValue {
    /// Text form accepted back by `set_property`
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Bool(b) => b.to_string(),
            PropertyValue::Float(f) => f.to_string(),
            PropertyValue::Text(s) => s.clone(),
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Bool(b) => write!(f, "{}", b),
            PropertyValue::Float(v) => write!(f, "{}", v),
            PropertyValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One entry of a component's property set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub name: &'static str,
    pub value: PropertyValue,
    /// Drawn on the canvas
    pub displayable: bool,
    /// Exposed to the property editor
    pub editable: bool,
}

impl Property {
    pub fn editable(name: &'static str, value: PropertyValue) -> Self {
        Self {
            name,
            value,
            displayable: true,
            editable: true,
        }
    }

    pub fn computed(name: &'static str, value: PropertyValue) -> Self {
        Self {
            name,
            value,
            displayable: true,
            editable: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.displayable = false;
        self
    }
}

/// Look up a property by name
pub fn find<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|p| p.name == name)
}

pub fn parse_float(name: &str, raw: &str) -> Result<f64, PropertyError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(PropertyError::InvalidNumber {
            name: name.to_string(),
            raw: raw.to_string(),
        }),
    }
}

/// Parse a strictly positive number (resistances)
pub fn parse_positive(name: &str, raw: &str) -> Result<f64, PropertyError> {
    let v = parse_float(name, raw)?;
    if v <= 0.0 {
        return Err(PropertyError::OutOfRange {
            name: name.to_string(),
            reason: format!("{} is not greater than zero", v),
        });
    }
    Ok(v)
}

pub fn parse_bool(name: &str, raw: &str) -> Result<bool, PropertyError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        _ => Err(PropertyError::InvalidBool {
            name: name.to_string(),
            raw: raw.to_string(),
        }),
    }
}

/// Error for an edit that matched no editable property
pub fn rejected(name: &str, computed: &[&str]) -> PropertyError {
    if computed.contains(&name) {
        PropertyError::ReadOnly(name.to_string())
    } else {
        PropertyError::Unknown(name.to_string())
    }
}
