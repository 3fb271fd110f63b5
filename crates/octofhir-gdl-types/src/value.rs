//! GDL runtime values
//!
//! `DataValue` is the closed set of values an expression can evaluate to:
//! the openEHR-style clinical data types a guideline binds to, the raw
//! scalars arithmetic produces, time periods and materialised objects.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{DvDateTime, TimePeriod, ValueError, date_epoch_millis};

/// Terminology id used for codes defined by the guideline itself
pub const LOCAL_TERMINOLOGY: &str = "local";

/// The runtime value of a variable or expression
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum DataValue {
    /// Absent/unknown value, the third truth value in boolean logic
    Null,
    Boolean(bool),
    /// Raw integer (also used for epoch milliseconds)
    Int(i64),
    Double(f64),
    /// Raw string produced by a string constant or projection
    String(String),
    /// Free text data value
    Text(String),
    Quantity(DvQuantity),
    Count(i64),
    Ordinal(DvOrdinal),
    CodedText(DvCodedText),
    Date(NaiveDate),
    DateTime(DvDateTime),
    /// Calendar period or fixed duration
    Duration(TimePeriod),
    /// Object produced by a template or instance creation
    Object(serde_json::Value),
}

/// Discriminant of a [`DataValue`], used for type hints on bound elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Null,
    Boolean,
    Int,
    Double,
    String,
    Text,
    Quantity,
    Count,
    Ordinal,
    CodedText,
    Date,
    DateTime,
    Duration,
    Object,
}

impl ValueKind {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Boolean => "Boolean",
            Self::Int => "Int",
            Self::Double => "Double",
            Self::String => "String",
            Self::Text => "Text",
            Self::Quantity => "Quantity",
            Self::Count => "Count",
            Self::Ordinal => "Ordinal",
            Self::CodedText => "CodedText",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Duration => "Duration",
            Self::Object => "Object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl DataValue {
    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Check if this value is exactly `true`
    pub fn is_true(&self) -> bool {
        matches!(self, Self::Boolean(true))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Int(_) => ValueKind::Int,
            Self::Double(_) => ValueKind::Double,
            Self::String(_) => ValueKind::String,
            Self::Text(_) => ValueKind::Text,
            Self::Quantity(_) => ValueKind::Quantity,
            Self::Count(_) => ValueKind::Count,
            Self::Ordinal(_) => ValueKind::Ordinal,
            Self::CodedText(_) => ValueKind::CodedText,
            Self::Date(_) => ValueKind::Date,
            Self::DateTime(_) => ValueKind::DateTime,
            Self::Duration(_) => ValueKind::Duration,
            Self::Object(_) => ValueKind::Object,
        }
    }

    /// Boolean coercion: booleans, and strings spelling `true`/`false`
    /// in any case
    pub fn coerce_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(s) | Self::Text(s) => parse_boolean(s),
            _ => None,
        }
    }

    /// Try to get as string slice (raw strings and text)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) | Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get a plain number out of a numeric value.
    ///
    /// Quantities yield their magnitude regardless of units.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(i) | Self::Count(i) => Some(*i as f64),
            Self::Double(d) => Some(*d),
            Self::Quantity(q) => Some(q.magnitude),
            Self::Ordinal(o) => Some(o.value as f64),
            _ => None,
        }
    }

    /// The code phrase carried by coded values
    pub fn code_phrase(&self) -> Option<&CodePhrase> {
        match self {
            Self::CodedText(c) => Some(&c.defining_code),
            Self::Ordinal(o) => Some(&o.symbol.defining_code),
            _ => None,
        }
    }

    /// Create a quantity value
    pub fn quantity(magnitude: f64, units: impl Into<String>, precision: u32) -> Self {
        Self::Quantity(DvQuantity::new(magnitude, units, precision))
    }

    /// Create a coded text value
    pub fn coded_text(
        value: impl Into<String>,
        terminology: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self::CodedText(DvCodedText::new(value, CodePhrase::new(terminology, code)))
    }

    /// Create a text value
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Create a raw string value
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Project a named attribute out of this value.
    ///
    /// `Null` projects to `Null` for any attribute.
    pub fn attribute(&self, name: &str) -> Result<DataValue, ValueError> {
        let projected = match (self, name) {
            (Self::Null, _) => Some(Self::Null),

            (Self::Quantity(q), "magnitude") => Some(Self::Double(q.magnitude)),
            (Self::Quantity(q), "units" | "unit") => Some(Self::String(q.units.clone())),
            (Self::Quantity(q), "precision") => Some(Self::Int(i64::from(q.precision))),

            (Self::Count(c), "magnitude" | "value") => Some(Self::Int(*c)),

            (Self::Ordinal(o), "value") => Some(Self::Int(o.value)),
            (Self::Ordinal(o), "symbol") => Some(Self::CodedText(o.symbol.clone())),
            (Self::Ordinal(o), "code") => Some(Self::String(o.symbol.defining_code.code.clone())),
            (Self::Ordinal(o), "terminology") => {
                Some(Self::String(o.symbol.defining_code.terminology.clone()))
            }

            (Self::CodedText(c), "value") => Some(Self::String(c.value.clone())),
            (Self::CodedText(c), "code") => Some(Self::String(c.defining_code.code.clone())),
            (Self::CodedText(c), "terminology") => {
                Some(Self::String(c.defining_code.terminology.clone()))
            }
            (Self::CodedText(c), "defining_code") => {
                Some(Self::String(c.defining_code.to_string()))
            }

            (Self::Boolean(b), "value") => Some(Self::Boolean(*b)),
            (Self::String(s) | Self::Text(s), "value") => Some(Self::String(s.clone())),

            (Self::Date(d), "value") => Some(Self::Int(date_epoch_millis(d))),
            (Self::Date(d), "year") => Some(Self::Int(i64::from(d.year()))),
            (Self::Date(d), "month") => Some(Self::Int(i64::from(d.month()))),
            (Self::Date(d), "day") => Some(Self::Int(i64::from(d.day()))),

            (Self::DateTime(dt), "value") => Some(Self::Int(dt.epoch_millis())),
            (Self::DateTime(dt), "year") => Some(Self::Int(i64::from(dt.year()))),
            (Self::DateTime(dt), "month") => Some(Self::Int(i64::from(dt.month()))),
            (Self::DateTime(dt), "day") => Some(Self::Int(i64::from(dt.day()))),
            (Self::DateTime(dt), "hour") => Some(Self::Int(i64::from(dt.hour()))),
            (Self::DateTime(dt), "minute") => Some(Self::Int(i64::from(dt.minute()))),
            (Self::DateTime(dt), "second") => Some(Self::Int(i64::from(dt.second()))),

            (Self::Duration(p), "value") => Some(Self::Double(p.amount)),
            (Self::Duration(p), "unit" | "units") => Some(Self::String(p.unit.symbol().to_string())),

            (Self::Int(_) | Self::Double(_), "value" | "magnitude") => Some(self.clone()),

            (Self::Object(serde_json::Value::Object(map)), field) => {
                map.get(field).map(Self::from_json)
            }

            _ => None,
        };

        projected.ok_or_else(|| ValueError::attribute_not_found(name, self.kind().name()))
    }

    /// Convert a JSON scalar or tree into a value
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Boolean(*b),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Double))
                .unwrap_or(Self::Null),
            serde_json::Value::String(s) => Self::String(s.clone()),
            other => Self::Object(other.clone()),
        }
    }

    /// JSON representation used when a value is placed into an object tree
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::json;

        match self {
            Self::Null => serde_json::Value::Null,
            Self::Boolean(b) => json!(b),
            Self::Int(i) | Self::Count(i) => json!(i),
            Self::Double(d) => json!(d),
            Self::String(s) | Self::Text(s) => json!(s),
            Self::Quantity(q) => json!({
                "magnitude": q.magnitude,
                "units": q.units,
                "precision": q.precision,
            }),
            Self::Ordinal(o) => json!({
                "value": o.value,
                "symbol": coded_text_json(&o.symbol),
            }),
            Self::CodedText(c) => coded_text_json(c),
            Self::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => json!(dt.to_string()),
            Self::Duration(p) => json!(p.to_string()),
            Self::Object(o) => o.clone(),
        }
    }
}

fn coded_text_json(c: &DvCodedText) -> serde_json::Value {
    serde_json::json!({
        "value": c.value,
        "defining_code": {
            "terminology": c.defining_code.terminology,
            "code": c.defining_code.code,
        },
    })
}

/// Parse `true`/`false` ignoring case
pub fn parse_boolean(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Int(i) | Self::Count(i) => write!(f, "{}", i),
            Self::Double(d) => write!(f, "{}", d),
            Self::String(s) | Self::Text(s) => write!(f, "{}", s),
            Self::Quantity(q) => write!(f, "{}", q),
            Self::Ordinal(o) => write!(f, "{}", o.symbol.value),
            Self::CodedText(c) => write!(f, "{}", c.value),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt),
            Self::Duration(p) => write!(f, "{}", p),
            Self::Object(o) => write!(f, "{}", o),
        }
    }
}

impl PartialEq for DataValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Quantity(a), Self::Quantity(b)) => a == b,
            (Self::Count(a), Self::Count(b)) => a == b,
            (Self::Ordinal(a), Self::Ordinal(b)) => a == b,
            (Self::CodedText(a), Self::CodedText(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Duration(a), Self::Duration(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            // Cross-type numeric comparisons
            (Self::Int(a), Self::Double(b)) | (Self::Double(b), Self::Int(a)) => (*a as f64) == *b,
            _ => false,
        }
    }
}

// ============================================================================
// Clinical Types
// ============================================================================

/// A terminology code, rendered `terminology::code`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodePhrase {
    pub terminology: String,
    pub code: String,
}

impl CodePhrase {
    pub fn new(terminology: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            terminology: terminology.into(),
            code: code.into(),
        }
    }

    /// Create a code in the guideline's own terminology
    pub fn local(code: impl Into<String>) -> Self {
        Self::new(LOCAL_TERMINOLOGY, code)
    }

    pub fn is_local(&self) -> bool {
        self.terminology == LOCAL_TERMINOLOGY
    }

    /// Parse `terminology::code`
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        raw.trim()
            .split_once("::")
            .filter(|(terminology, code)| !terminology.is_empty() && !code.is_empty())
            .map(|(terminology, code)| Self::new(terminology, code))
            .ok_or_else(|| ValueError::parse("CodePhrase", raw))
    }
}

impl fmt::Display for CodePhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.terminology, self.code)
    }
}

/// Coded text: a display value and the code that defines it.
///
/// Equality compares the defining code only.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct DvCodedText {
    pub value: String,
    pub defining_code: CodePhrase,
}

impl DvCodedText {
    pub fn new(value: impl Into<String>, defining_code: CodePhrase) -> Self {
        Self {
            value: value.into(),
            defining_code,
        }
    }

    /// Parse `terminology::code|text|`; the text part is optional
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        let (phrase, text) = match raw.split_once('|') {
            Some((phrase, rest)) => (phrase, rest.trim_end_matches('|')),
            None => (raw, ""),
        };
        let defining_code =
            CodePhrase::parse(phrase).map_err(|_| ValueError::parse("CodedText", raw))?;
        Ok(Self::new(text, defining_code))
    }
}

impl PartialEq for DvCodedText {
    fn eq(&self, other: &Self) -> bool {
        self.defining_code == other.defining_code
    }
}

impl fmt::Display for DvCodedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|", self.defining_code, self.value)
    }
}

/// Ordinal: a ranked coded value such as a score item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DvOrdinal {
    pub value: i64,
    pub symbol: DvCodedText,
}

impl DvOrdinal {
    pub fn new(value: i64, symbol: DvCodedText) -> Self {
        Self { value, symbol }
    }

    /// Parse `value|terminology::code|text|`
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        let (value, symbol) = raw
            .split_once('|')
            .ok_or_else(|| ValueError::parse("Ordinal", raw))?;
        let value = value
            .trim()
            .parse::<i64>()
            .map_err(|_| ValueError::parse("Ordinal", raw))?;
        let symbol = DvCodedText::parse(symbol).map_err(|_| ValueError::parse("Ordinal", raw))?;
        Ok(Self::new(value, symbol))
    }
}

impl fmt::Display for DvOrdinal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.value, self.symbol)
    }
}

/// Quantity with units.
///
/// `precision` is the number of decimals used when rendering; the stored
/// magnitude is never rounded. Equality is unit-sensitive and ignores
/// precision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DvQuantity {
    pub magnitude: f64,
    pub units: String,
    pub precision: u32,
}

impl DvQuantity {
    pub fn new(magnitude: f64, units: impl Into<String>, precision: u32) -> Self {
        Self {
            magnitude,
            units: units.into(),
            precision,
        }
    }

    /// Parse `magnitude,units`; precision is the number of decimals written
    pub fn parse(raw: &str) -> Result<Self, ValueError> {
        let raw = raw.trim();
        let (magnitude, units) = raw
            .split_once(',')
            .ok_or_else(|| ValueError::parse("Quantity", raw))?;
        let magnitude = magnitude.trim();
        let value = magnitude
            .parse::<f64>()
            .map_err(|_| ValueError::parse("Quantity", raw))?;
        let precision = magnitude
            .split_once('.')
            .map(|(_, decimals)| decimals.len() as u32)
            .unwrap_or(0);
        Ok(Self::new(value, units.trim(), precision))
    }

    /// Compare magnitudes only, ignoring units
    pub fn numeric_eq(&self, other: &Self) -> bool {
        self.magnitude == other.magnitude
    }

    /// Magnitude rounded half-up to `precision` decimals, as text
    pub fn formatted_magnitude(&self) -> String {
        let decimals = self.precision as usize;
        match Decimal::from_f64(self.magnitude) {
            Some(exact) => {
                let rounded =
                    exact.round_dp_with_strategy(self.precision, RoundingStrategy::MidpointAwayFromZero);
                format!("{:.*}", decimals, rounded)
            }
            None => format!("{:.*}", decimals, self.magnitude),
        }
    }
}

impl PartialEq for DvQuantity {
    fn eq(&self, other: &Self) -> bool {
        self.magnitude == other.magnitude && self.units == other.units
    }
}

impl fmt::Display for DvQuantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.formatted_magnitude(), self.units)
    }
}
