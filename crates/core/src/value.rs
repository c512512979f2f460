//! Values exchanged with the graph engine

use crate::cypher::{escape_identifier, quote_string};
use crate::error::{Error, Result};
use crate::models::{Node, Path, Relationship};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;

/// A value produced by, or sent to, the graph engine
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    Date(NaiveDate),
    LocalTime(NaiveTime),
    LocalDateTime(NaiveDateTime),
    DateTime(DateTime<FixedOffset>),
    Duration(TimeDelta),
    Node(Node),
    Relationship(Relationship),
    Path(Path),
}

impl Value {
    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Date(_) => "date",
            Value::LocalTime(_) => "local time",
            Value::LocalDateTime(_) => "local datetime",
            Value::DateTime(_) => "datetime",
            Value::Duration(_) => "duration",
            Value::Node(_) => "node",
            Value::Relationship(_) => "relationship",
            Value::Path(_) => "path",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_relationship(&self) -> Option<&Relationship> {
        match self {
            Value::Relationship(relationship) => Some(relationship),
            _ => None,
        }
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            Value::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Renders the value as a Cypher literal
    ///
    /// Graph values, bytes, non-finite floats and negative durations have no
    /// literal form and yield [`Error::InvalidValue`].
    pub fn to_cypher(&self) -> Result<String> {
        match self {
            Value::Null => Ok("null".to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(i) => Ok(i.to_string()),
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::invalid_value(format!(
                        "float {f} has no Cypher literal"
                    )));
                }
                // Debug keeps the decimal point on whole numbers
                Ok(format!("{f:?}"))
            }
            Value::String(s) => Ok(quote_string(s)),
            Value::List(items) => {
                let rendered = items
                    .iter()
                    .map(Value::to_cypher)
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("[{}]", rendered.join(", ")))
            }
            Value::Map(map) => {
                let rendered = map
                    .iter()
                    .map(|(key, value)| {
                        let key = escape_identifier(key)
                            .map_err(|e| Error::invalid_value(format!("map key: {e}")))?;
                        Ok(format!("{key}: {}", value.to_cypher()?))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(format!("{{{}}}", rendered.join(", ")))
            }
            Value::Date(date) => Ok(format!("date('{}')", date.format("%Y-%m-%d"))),
            Value::LocalTime(time) => Ok(format!("localTime('{}')", time.format("%H:%M:%S%.f"))),
            Value::LocalDateTime(datetime) => Ok(format!(
                "localDateTime('{}')",
                datetime.format("%Y-%m-%dT%H:%M:%S%.f")
            )),
            Value::DateTime(datetime) => Ok(format!(
                "datetime('{}')",
                datetime.format("%Y-%m-%dT%H:%M:%S%.f%:z")
            )),
            Value::Duration(duration) => iso_duration(duration)
                .map(|iso| format!("duration('{iso}')"))
                .ok_or_else(|| {
                    Error::invalid_value("negative durations have no Cypher literal")
                }),
            Value::Bytes(_) | Value::Node(_) | Value::Relationship(_) | Value::Path(_) => Err(
                Error::invalid_value(format!("{} has no Cypher literal", self.type_name())),
            ),
        }
    }
}

/// Formats a non-negative duration as `PnDTnHnMnS`
pub fn iso_duration(duration: &TimeDelta) -> Option<String> {
    if *duration < TimeDelta::zero() {
        return None;
    }
    let total = duration.num_seconds();
    let nanos = duration.subsec_nanos();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    let seconds = if nanos == 0 {
        seconds.to_string()
    } else {
        let fraction = format!("{nanos:09}");
        format!("{seconds}.{}", fraction.trim_end_matches('0'))
    };
    Some(format!("P{days}DT{hours}H{minutes}M{seconds}S"))
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Bytes(bytes) => serializer.serialize_bytes(bytes),
            Value::List(items) => items.serialize(serializer),
            Value::Map(map) => map.serialize(serializer),
            Value::Date(date) => date.serialize(serializer),
            Value::LocalTime(time) => time.serialize(serializer),
            Value::LocalDateTime(datetime) => datetime.serialize(serializer),
            Value::DateTime(datetime) => datetime.serialize(serializer),
            Value::Duration(duration) => {
                let iso = match iso_duration(duration) {
                    Some(iso) => iso,
                    None => format!("-{}", iso_duration(&-*duration).unwrap_or_default()),
                };
                serializer.serialize_str(&iso)
            }
            Value::Node(node) => node.serialize(serializer),
            Value::Relationship(relationship) => relationship.serialize(serializer),
            Value::Path(path) => path.serialize(serializer),
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool,
    i64 => Int,
    i32 => Int,
    u32 => Int,
    i16 => Int,
    u16 => Int,
    i8 => Int,
    u8 => Int,
    f64 => Float,
    f32 => Float,
    String => String,
    &str => String,
    NaiveDate => Date,
    NaiveTime => LocalTime,
    NaiveDateTime => LocalDateTime,
    DateTime<FixedOffset> => DateTime,
    TimeDelta => Duration,
    Node => Node,
    Relationship => Relationship,
    Path => Path,
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<BTreeMap<String, T>> for Value {
    fn from(map: BTreeMap<String, T>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scalar_literals() {
        assert_eq!(Value::Null.to_cypher().unwrap(), "null");
        assert_eq!(Value::from(true).to_cypher().unwrap(), "true");
        assert_eq!(Value::from(42).to_cypher().unwrap(), "42");
        assert_eq!(Value::from(-7i64).to_cypher().unwrap(), "-7");
        assert_eq!(Value::from(1.0).to_cypher().unwrap(), "1.0");
        assert_eq!(Value::from(0.25).to_cypher().unwrap(), "0.25");
        assert_eq!(Value::from("it's").to_cypher().unwrap(), r"'it\'s'");
    }

    #[test]
    fn test_non_finite_float_is_rejected() {
        assert!(matches!(
            Value::from(f64::NAN).to_cypher(),
            Err(Error::InvalidValue(_))
        ));
        assert!(Value::from(f64::INFINITY).to_cypher().is_err());
    }

    #[test]
    fn test_collection_literals() {
        let list = Value::from(vec![Value::from(1), Value::from("a"), Value::Null]);
        assert_eq!(list.to_cypher().unwrap(), "[1, 'a', null]");

        let mut map = BTreeMap::new();
        map.insert("name".to_string(), Value::from("Alice"));
        map.insert("first name".to_string(), Value::from("Al"));
        assert_eq!(
            Value::from(map).to_cypher().unwrap(),
            "{`first name`: 'Al', name: 'Alice'}"
        );
    }

    #[test]
    fn test_temporal_literals() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(Value::from(date).to_cypher().unwrap(), "date('2024-03-09')");

        let time = NaiveTime::from_hms_opt(7, 5, 0).unwrap();
        assert_eq!(
            Value::from(time).to_cypher().unwrap(),
            "localTime('07:05:00')"
        );

        let datetime = date.and_time(time);
        assert_eq!(
            Value::from(datetime).to_cypher().unwrap(),
            "localDateTime('2024-03-09T07:05:00')"
        );

        let offset = FixedOffset::east_opt(3600).unwrap();
        let zoned = datetime.and_local_timezone(offset).unwrap();
        assert_eq!(
            Value::from(zoned).to_cypher().unwrap(),
            "datetime('2024-03-09T07:05:00+01:00')"
        );
    }

    #[test]
    fn test_duration_literal() {
        let duration = TimeDelta::days(1)
            + TimeDelta::hours(2)
            + TimeDelta::minutes(3)
            + TimeDelta::milliseconds(4_500);
        assert_eq!(
            Value::from(duration).to_cypher().unwrap(),
            "duration('P1DT2H3M4.5S')"
        );
        assert_eq!(
            iso_duration(&TimeDelta::zero()).unwrap(),
            "P0DT0H0M0S"
        );
        assert!(Value::from(TimeDelta::seconds(-1)).to_cypher().is_err());
    }

    #[test]
    fn test_graph_values_have_no_literal() {
        let node = Node::new("Person");
        assert!(Value::from(node).to_cypher().is_err());
        assert!(Value::Bytes(vec![1, 2]).to_cypher().is_err());
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from(3).as_i64(), Some(3));
        assert_eq!(Value::from(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert_eq!(Value::from(Option::<i64>::None), Value::Null);
        assert!(Value::from("x").as_i64().is_none());
    }

    #[test]
    fn test_serializes_to_plain_json() {
        let value = Value::from(vec![Value::from(1), Value::from("two"), Value::Null]);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"[1,"two",null]"#
        );
    }
}
