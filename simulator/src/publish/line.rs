//! Tab-separated `DATA` records consumed by the host-side connector.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    Int(i64),
    Float(f64),
}

/// One `DATA\tkey=value...` output line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataLine {
    fields: Vec<(String, FieldValue)>,
}

impl DataLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::new().text("message", text)
    }

    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), FieldValue::Text(value.into())));
        self
    }

    pub fn int(mut self, key: &str, value: i64) -> Self {
        self.fields.push((key.to_string(), FieldValue::Int(value)));
        self
    }

    pub fn float(mut self, key: &str, value: f64) -> Self {
        self.fields.push((key.to_string(), FieldValue::Float(value)));
        self
    }
}

impl fmt::Display for DataLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DATA")?;
        for (key, value) in &self.fields {
            match value {
                FieldValue::Text(text) => write!(f, "\t{}=\"{}\"", key, escape(text))?,
                FieldValue::Int(number) => write!(f, "\t{}={}", key, number)?,
                FieldValue::Float(number) => write!(f, "\t{}={}", key, scientific(*number))?,
            }
        }
        Ok(())
    }
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\t' => escaped.push_str("\\t"),
            '\u{8}' => escaped.push_str("\\b"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\u{c}' => escaped.push_str("\\f"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            other => escaped.push(other),
        }
    }
    escaped
}

/// `%.15e` with a signed, at least two-digit exponent.
fn scientific(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let formatted = format!("{:.15e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{}e{}{:02}", mantissa, sign, exponent.abs())
        }
        None => formatted,
    }
}
