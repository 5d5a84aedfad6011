//! Variables and value resolvers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime, Time};

use crate::reference::{Metadata, RefOr};

// ──────────────────────────────────────────────
// Value types
// ──────────────────────────────────────────────

/// Declared runtime type of a variable's value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VariableValueType {
    String,
    Date,
    DateTime,
    Time,
    Period,
    Duration,
    Int,
    Long,
    Number,
    Float,
    BigDecimal,
    Boolean,
    Object,
    Array,
}

impl VariableValueType {
    pub const ALL: [VariableValueType; 14] = [
        VariableValueType::String,
        VariableValueType::Date,
        VariableValueType::DateTime,
        VariableValueType::Time,
        VariableValueType::Period,
        VariableValueType::Duration,
        VariableValueType::Int,
        VariableValueType::Long,
        VariableValueType::Number,
        VariableValueType::Float,
        VariableValueType::BigDecimal,
        VariableValueType::Boolean,
        VariableValueType::Object,
        VariableValueType::Array,
    ];

    pub fn literal(&self) -> &'static str {
        match self {
            VariableValueType::String => "STRING",
            VariableValueType::Date => "DATE",
            VariableValueType::DateTime => "DATE_TIME",
            VariableValueType::Time => "TIME",
            VariableValueType::Period => "PERIOD",
            VariableValueType::Duration => "DURATION",
            VariableValueType::Int => "INT",
            VariableValueType::Long => "LONG",
            VariableValueType::Number => "NUMBER",
            VariableValueType::Float => "FLOAT",
            VariableValueType::BigDecimal => "BIG_DECIMAL",
            VariableValueType::Boolean => "BOOLEAN",
            VariableValueType::Object => "OBJECT",
            VariableValueType::Array => "ARRAY",
        }
    }

    /// Case-sensitive lookup by the SCREAMING_SNAKE_CASE literal.
    pub fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.literal() == s)
    }
}

/// A calendar period (ISO-8601 `PnYnMnD`). Weeks are folded into days.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Period {
    pub years: i32,
    pub months: i32,
    pub days: i32,
}

/// A literal value held by a static variable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaticValue {
    String(String),
    Date(Date),
    DateTime(OffsetDateTime),
    Time(Time),
    Period(Period),
    Duration(Duration),
    Int(i32),
    Long(i64),
    Number(f64),
    Float(f32),
    BigDecimal(Decimal),
    Boolean(bool),
    Object(serde_json::Map<String, serde_json::Value>),
    Array(Vec<serde_json::Value>),
}

impl StaticValue {
    pub fn value_type(&self) -> VariableValueType {
        match self {
            StaticValue::String(_) => VariableValueType::String,
            StaticValue::Date(_) => VariableValueType::Date,
            StaticValue::DateTime(_) => VariableValueType::DateTime,
            StaticValue::Time(_) => VariableValueType::Time,
            StaticValue::Period(_) => VariableValueType::Period,
            StaticValue::Duration(_) => VariableValueType::Duration,
            StaticValue::Int(_) => VariableValueType::Int,
            StaticValue::Long(_) => VariableValueType::Long,
            StaticValue::Number(_) => VariableValueType::Number,
            StaticValue::Float(_) => VariableValueType::Float,
            StaticValue::BigDecimal(_) => VariableValueType::BigDecimal,
            StaticValue::Boolean(_) => VariableValueType::Boolean,
            StaticValue::Object(_) => VariableValueType::Object,
            StaticValue::Array(_) => VariableValueType::Array,
        }
    }
}

// ──────────────────────────────────────────────
// Variables
// ──────────────────────────────────────────────

/// A variable whose value is known when the policy is authored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyVariableStatic {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub value: StaticValue,
    /// Custom format the literal was parsed with (dates and times only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// The string value holds JSON text rather than plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_json: Option<bool>,
}

impl PolicyVariableStatic {
    pub fn new(value: StaticValue) -> Self {
        PolicyVariableStatic {
            metadata: Metadata::default(),
            value,
            format: None,
            is_json: None,
        }
    }

    pub fn value_type(&self) -> VariableValueType {
        self.value.value_type()
    }
}

/// A variable resolved from the evaluation context by a chain of resolvers.
///
/// Resolvers are tried in order; the first one that yields a value wins.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyVariableDynamic {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub resolvers: Vec<RefOr<ValueResolver>>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub value_type: Option<VariableValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyVariable {
    Static(PolicyVariableStatic),
    Dynamic(PolicyVariableDynamic),
}

impl PolicyVariable {
    pub fn metadata(&self) -> &Metadata {
        match self {
            PolicyVariable::Static(v) => &v.metadata,
            PolicyVariable::Dynamic(v) => &v.metadata,
        }
    }
}

// ──────────────────────────────────────────────
// Resolvers
// ──────────────────────────────────────────────

/// Expression language a resolver is written in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolverEngine {
    JsonPath,
    Jq,
    Key,
}

/// Which part of the evaluation context a resolver reads from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueSource {
    Request,
    Subject,
    Resource,
    Environment,
    Action,
}

impl ValueSource {
    pub const ALL: [ValueSource; 5] = [
        ValueSource::Request,
        ValueSource::Subject,
        ValueSource::Resource,
        ValueSource::Environment,
        ValueSource::Action,
    ];

    pub fn literal(&self) -> &'static str {
        match self {
            ValueSource::Request => "REQUEST",
            ValueSource::Subject => "SUBJECT",
            ValueSource::Resource => "RESOURCE",
            ValueSource::Environment => "ENVIRONMENT",
            ValueSource::Action => "ACTION",
        }
    }

    pub fn from_literal(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.literal() == s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValueResolver {
    #[serde(flatten)]
    pub metadata: Metadata,
    pub engine: ResolverEngine,
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ValueSource>,
    /// Key under which the resolved value is cached in the context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_type_literals_round_trip() {
        for t in VariableValueType::ALL {
            assert_eq!(VariableValueType::from_literal(t.literal()), Some(t));
        }
        assert_eq!(VariableValueType::from_literal("date_time"), None);
    }

    #[test]
    fn static_variable_document_form() {
        let v = PolicyVariable::Static(PolicyVariableStatic::new(StaticValue::Int(7)));
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"kind": "static", "value": {"type": "INT", "value": 7}})
        );
        let back: PolicyVariable = serde_json::from_value(json).unwrap();
        assert_eq!(back, v);
    }

    #[test]
    fn source_literals_are_case_sensitive() {
        assert_eq!(ValueSource::from_literal("REQUEST"), Some(ValueSource::Request));
        assert_eq!(ValueSource::from_literal("request"), None);
    }
}
