// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Query-string encoding for structured request bodies
//!
//! Flattens a JSON value into `key=value` pairs and renders them as an
//! `application/x-www-form-urlencoded` string. Nested objects use bracket
//! keys (`user[name]=x`); arrays follow the selected [`ArrayFormat`].
//! Key order follows the order of the source map.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::form_urlencoded;

use crate::error::Error;

/// How multi-valued fields are written out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrayFormat {
    /// `b=2&b=3`
    #[default]
    Repeat,
    /// `b[]=2&b[]=3`
    Brackets,
    /// `b[0]=2&b[1]=3`
    Indices,
    /// `b=2,3`
    Comma,
}

impl fmt::Display for ArrayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArrayFormat::Repeat => "repeat",
            ArrayFormat::Brackets => "brackets",
            ArrayFormat::Indices => "indices",
            ArrayFormat::Comma => "comma",
        };
        f.write_str(name)
    }
}

impl FromStr for ArrayFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "repeat" => Ok(ArrayFormat::Repeat),
            "brackets" => Ok(ArrayFormat::Brackets),
            "indices" => Ok(ArrayFormat::Indices),
            "comma" => Ok(ArrayFormat::Comma),
            other => Err(Error::config(format!("Unknown array format: {}", other))),
        }
    }
}

/// Encode a structured value as a urlencoded string
///
/// Non-structured values (strings, numbers, null) have no keys and encode
/// to an empty string.
pub fn stringify(value: &Value, format: ArrayFormat) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&pairs(value, format))
        .finish()
}

/// Flatten a structured value into ordered, unencoded key/value pairs
pub fn pairs(value: &Value, format: ArrayFormat) -> Vec<(String, String)> {
    let mut out = Vec::new();
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                flatten(key.clone(), value, format, &mut out);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten(index.to_string(), value, format, &mut out);
            }
        }
        _ => {}
    }
    out
}

/// Whole floats drop the trailing `.0` (`1.0` encodes as `1`)
fn number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() => f.to_string(),
        _ => n.to_string(),
    }
}

fn flatten(key: String, value: &Value, format: ArrayFormat, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => out.push((key, String::new())),
        Value::Bool(b) => out.push((key, b.to_string())),
        Value::Number(n) => out.push((key, number(n))),
        Value::String(s) => out.push((key, s.clone())),
        Value::Array(items) => match format {
            ArrayFormat::Repeat => {
                for item in items {
                    flatten(key.clone(), item, format, out);
                }
            }
            ArrayFormat::Brackets => {
                for item in items {
                    flatten(format!("{}[]", key), item, format, out);
                }
            }
            ArrayFormat::Indices => {
                for (index, item) in items.iter().enumerate() {
                    flatten(format!("{}[{}]", key, index), item, format, out);
                }
            }
            ArrayFormat::Comma => {
                if !items.is_empty() {
                    let joined = items.iter().map(scalar).collect::<Vec<_>>().join(",");
                    out.push((key, joined));
                }
            }
        },
        Value::Object(map) => {
            for (child, value) in map {
                flatten(format!("{}[{}]", key, child), value, format, out);
            }
        }
    }
}

/// Render a value inline, used for comma-joined arrays
fn scalar(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_repeat_format() {
        let body = json!({"a": 1, "b": [2, 3]});
        assert_eq!(stringify(&body, ArrayFormat::Repeat), "a=1&b=2&b=3");
    }

    #[test]
    fn test_key_order_preserved() {
        let body = json!({"remark": "x", "enable": true, "port": 443, "up": 0});
        assert_eq!(
            stringify(&body, ArrayFormat::Repeat),
            "remark=x&enable=true&port=443&up=0"
        );
    }

    #[test]
    fn test_other_array_formats() {
        let body = json!({"b": [2, 3]});
        assert_eq!(stringify(&body, ArrayFormat::Brackets), "b%5B%5D=2&b%5B%5D=3");
        assert_eq!(stringify(&body, ArrayFormat::Indices), "b%5B0%5D=2&b%5B1%5D=3");
        assert_eq!(stringify(&body, ArrayFormat::Comma), "b=2%2C3");
    }

    #[test]
    fn test_nested_object() {
        let body = json!({"user": {"name": "admin", "roles": ["a", "b"]}});
        assert_eq!(
            pairs(&body, ArrayFormat::Repeat),
            vec![
                ("user[name]".to_string(), "admin".to_string()),
                ("user[roles]".to_string(), "a".to_string()),
                ("user[roles]".to_string(), "b".to_string()),
            ]
        );
    }

    #[test]
    fn test_null_and_empty_array() {
        let body = json!({"a": null, "b": [], "c": "x"});
        assert_eq!(stringify(&body, ArrayFormat::Repeat), "a=&c=x");
    }

    #[test]
    fn test_float_numbers() {
        let value = json!({"a": 1.0, "b": 0.5, "c": -3, "d": 2.5e3});
        assert_eq!(stringify(&value, ArrayFormat::Repeat), "a=1&b=0.5&c=-3&d=2500");
    }

    #[test]
    fn test_special_characters() {
        let body = json!({"q": "a b&c=d", "path": "/panel/api/"});
        assert_eq!(
            stringify(&body, ArrayFormat::Repeat),
            "q=a+b%26c%3Dd&path=%2Fpanel%2Fapi%2F"
        );
    }

    #[test]
    fn test_top_level_array() {
        assert_eq!(stringify(&json!(["x", "y"]), ArrayFormat::Repeat), "0=x&1=y");
    }

    #[test]
    fn test_non_structured_is_empty() {
        assert_eq!(stringify(&json!("plain"), ArrayFormat::Repeat), "");
        assert_eq!(stringify(&json!(null), ArrayFormat::Repeat), "");
    }

    #[test]
    fn test_parse_array_format() {
        assert_eq!("REPEAT".parse::<ArrayFormat>().unwrap(), ArrayFormat::Repeat);
        assert_eq!("indices".parse::<ArrayFormat>().unwrap(), ArrayFormat::Indices);
        assert!("dotted".parse::<ArrayFormat>().is_err());
        assert_eq!(ArrayFormat::Brackets.to_string(), "brackets");
    }
}
