//! InfluxDB line protocol points

use std::fmt::Write as _;

use crate::error::WriteError;

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Int(i64),
    Float(f64),
}

/// A single line protocol point
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    measurement: String,
    tags: Vec<(String, String)>,
    fields: Vec<(String, FieldValue)>,
    timestamp: Option<i64>,
}

impl Point {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
        }
    }

    /// Add a tag. Tags are written in insertion order.
    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn field_int(mut self, key: impl Into<String>, value: i64) -> Self {
        self.fields.push((key.into(), FieldValue::Int(value)));
        self
    }

    pub fn field_float(mut self, key: impl Into<String>, value: f64) -> Self {
        self.fields.push((key.into(), FieldValue::Float(value)));
        self
    }

    /// Timestamp in nanoseconds since the Unix epoch
    pub fn timestamp(mut self, nanos: i64) -> Self {
        self.timestamp = Some(nanos);
        self
    }

    /// Render as one line of line protocol, without trailing newline
    pub fn to_line_protocol(&self) -> Result<String, WriteError> {
        if self.measurement.is_empty() {
            return Err(WriteError::MalformedPoint("empty measurement".to_string()));
        }
        if self.fields.is_empty() {
            return Err(WriteError::MalformedPoint("point has no fields".to_string()));
        }

        if has_line_break(&self.measurement) {
            return Err(WriteError::MalformedPoint(format!("line break in measurement {:?}", self.measurement)));
        }
        let mut line = escape(&self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            if key.is_empty() || value.is_empty() {
                return Err(WriteError::MalformedPoint(format!("empty tag {:?}={:?}", key, value)));
            }
            if has_line_break(key) || has_line_break(value) {
                return Err(WriteError::MalformedPoint(format!("line break in tag {:?}={:?}", key, value)));
            }
            line.push(',');
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            line.push_str(&escape(value, &[',', '=', ' ']));
        }

        line.push(' ');
        for (i, (key, value)) in self.fields.iter().enumerate() {
            if key.is_empty() {
                return Err(WriteError::MalformedPoint("empty field key".to_string()));
            }
            if has_line_break(key) {
                return Err(WriteError::MalformedPoint(format!("line break in field key {:?}", key)));
            }
            if i > 0 {
                line.push(',');
            }
            line.push_str(&escape(key, &[',', '=', ' ']));
            line.push('=');
            match value {
                FieldValue::Int(v) => {
                    let _ = write!(line, "{}i", v);
                }
                FieldValue::Float(v) => {
                    if !v.is_finite() {
                        return Err(WriteError::MalformedPoint(format!("non-finite value for field {}", key)));
                    }
                    let _ = write!(line, "{}", v);
                }
            }
        }

        if let Some(ts) = self.timestamp {
            let _ = write!(line, " {}", ts);
        }

        Ok(line)
    }
}

// Line protocol has no escape for these; one would split the point
fn has_line_break(input: &str) -> bool {
    input.contains(['\n', '\r'])
}

/// Backslash-escape `specials` (and backslashes) in a line protocol token
fn escape(input: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if c == '\\' || specials.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
