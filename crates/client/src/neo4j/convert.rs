//! Conversions between neo4rs Bolt types and cypherlink values

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use cypherlink_core::{Error, Node, Path, Relationship, Result, Row, Value};
use neo4rs::{
    BoltList, BoltMap, BoltNode, BoltNull, BoltPath, BoltRelation, BoltString, BoltType,
    BoltUnboundedRelation,
};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::transport::Params;

/// Classifies a driver error as a connection or a query failure
pub(crate) fn map_error(err: neo4rs::Error) -> Error {
    if is_connection_error(&err) {
        Error::connection(err.to_string())
    } else {
        Error::query(err.to_string())
    }
}

pub(crate) fn is_connection_error(err: &neo4rs::Error) -> bool {
    matches!(
        err,
        neo4rs::Error::IOError { .. }
            | neo4rs::Error::ConnectionError { .. }
            | neo4rs::Error::AuthenticationError { .. }
            | neo4rs::Error::UnsupportedScheme { .. }
            | neo4rs::Error::UrlParseError { .. }
    )
}

/// Builds a driver query with every parameter bound
pub(crate) fn build_query(statement: &str, params: &Params) -> Result<neo4rs::Query> {
    let mut query = neo4rs::Query::new(statement.to_string());
    for (key, value) in params {
        query = query.param(key, to_bolt(value)?);
    }
    Ok(query)
}

pub(crate) fn to_bolt(value: &Value) -> Result<BoltType> {
    let bolt = match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => (*b).into(),
        Value::Int(i) => (*i).into(),
        Value::Float(f) => (*f).into(),
        Value::String(s) => s.clone().into(),
        Value::List(items) => BoltType::List(BoltList {
            value: items.iter().map(to_bolt).collect::<Result<Vec<_>>>()?,
        }),
        Value::Map(map) => {
            let mut value = HashMap::with_capacity(map.len());
            for (key, item) in map {
                value.insert(BoltString::from(key.clone()), to_bolt(item)?);
            }
            BoltType::Map(BoltMap { value })
        }
        Value::Date(date) => (*date).into(),
        Value::LocalTime(time) => (*time).into(),
        Value::LocalDateTime(datetime) => (*datetime).into(),
        Value::DateTime(datetime) => (*datetime).into(),
        Value::Duration(duration) => duration
            .to_std()
            .map_err(|_| Error::invalid_value("negative durations cannot be sent as parameters"))?
            .into(),
        Value::Bytes(_) | Value::Node(_) | Value::Relationship(_) | Value::Path(_) => {
            return Err(Error::invalid_value(format!(
                "{} values cannot be sent as parameters",
                value.type_name()
            )))
        }
    };
    Ok(bolt)
}

/// Converts one driver row into a [`Row`]
pub(crate) fn row_from_neo4rs(row: &neo4rs::Row) -> Result<Row> {
    let columns: HashMap<String, BoltType> = row
        .to()
        .map_err(|e| Error::conversion(format!("failed to decode row: {e}")))?;

    let mut converted = BTreeMap::new();
    for (column, bolt) in columns {
        let value = match bolt {
            BoltType::Date(_)
            | BoltType::LocalTime(_)
            | BoltType::LocalDateTime(_)
            | BoltType::DateTime(_)
            | BoltType::Duration(_) => temporal_column(row, &column, &bolt),
            other => from_bolt(other)?,
        };
        converted.insert(column, value);
    }
    Ok(Row::from(converted))
}

/// Re-reads a temporal column through the driver's chrono support
fn temporal_column(row: &neo4rs::Row, column: &str, bolt: &BoltType) -> Value {
    let value = match bolt {
        BoltType::Date(_) => row.get::<NaiveDate>(column).ok().map(Value::Date),
        BoltType::LocalTime(_) => row.get::<NaiveTime>(column).ok().map(Value::LocalTime),
        BoltType::LocalDateTime(_) => row
            .get::<NaiveDateTime>(column)
            .ok()
            .map(Value::LocalDateTime),
        BoltType::DateTime(_) => row
            .get::<DateTime<FixedOffset>>(column)
            .ok()
            .map(Value::DateTime),
        BoltType::Duration(_) => row
            .get::<std::time::Duration>(column)
            .ok()
            .and_then(|d| TimeDelta::from_std(d).ok())
            .map(Value::Duration),
        _ => None,
    };
    value.unwrap_or_else(|| {
        debug!("Column '{}' kept as text: {:?}", column, bolt);
        Value::String(format!("{bolt:?}"))
    })
}

pub(crate) fn from_bolt(bolt: BoltType) -> Result<Value> {
    let value = match bolt {
        BoltType::Null(_) => Value::Null,
        BoltType::Boolean(b) => Value::Bool(b.value),
        BoltType::Integer(i) => Value::Int(i.value),
        BoltType::Float(f) => Value::Float(f.value),
        BoltType::String(s) => Value::String(s.value),
        BoltType::Bytes(b) => Value::Bytes(b.value.to_vec()),
        BoltType::List(list) => Value::List(
            list.value
                .into_iter()
                .map(from_bolt)
                .collect::<Result<Vec<_>>>()?,
        ),
        BoltType::Map(map) => Value::Map(map_from_bolt(map)?),
        BoltType::Node(node) => Value::Node(node_from_bolt(node)?),
        BoltType::Relation(rel) => Value::Relationship(relationship_from_bolt(rel)?),
        BoltType::UnboundedRelation(_) => {
            return Err(Error::conversion(
                "relationship without endpoints outside of a path",
            ))
        }
        BoltType::Path(path) => Value::Path(path_from_bolt(path)?),
        other => Value::String(format!("{other:?}")),
    };
    Ok(value)
}

fn map_from_bolt(map: BoltMap) -> Result<BTreeMap<String, Value>> {
    map.value
        .into_iter()
        .map(|(key, value)| Ok((key.value, from_bolt(value)?)))
        .collect()
}

fn node_from_bolt(node: BoltNode) -> Result<Node> {
    let mut labels = std::collections::BTreeSet::new();
    for label in node.labels.value {
        match label {
            BoltType::String(s) => {
                labels.insert(s.value);
            }
            other => {
                return Err(Error::conversion(format!(
                    "node label is not a string: {other:?}"
                )))
            }
        }
    }
    Ok(Node {
        id: Some(node.id.value),
        labels,
        properties: map_from_bolt(node.properties)?,
    })
}

fn relationship_from_bolt(rel: BoltRelation) -> Result<Relationship> {
    Ok(Relationship {
        id: Some(rel.id.value),
        rel_type: rel.typ.value,
        start_node_id: rel.start_node_id.value,
        end_node_id: rel.end_node_id.value,
        properties: map_from_bolt(rel.properties)?,
    })
}

fn unbounded_relationship(rel: BoltUnboundedRelation, start: i64, end: i64) -> Result<Relationship> {
    Ok(Relationship {
        id: Some(rel.id.value),
        rel_type: rel.typ.value,
        start_node_id: start,
        end_node_id: end,
        properties: map_from_bolt(rel.properties)?,
    })
}

/// Decodes a Bolt path
///
/// `indices` holds (relationship, node) pairs. A positive relationship index
/// `i` refers to `rels[i - 1]` traversed forwards, a negative one to
/// `rels[-i - 1]` traversed backwards. Node indices point into `nodes`.
fn path_from_bolt(path: BoltPath) -> Result<Path> {
    let nodes = path
        .nodes
        .value
        .into_iter()
        .map(|n| match n {
            BoltType::Node(node) => node_from_bolt(node),
            other => Err(Error::conversion(format!("path node expected, got {other:?}"))),
        })
        .collect::<Result<Vec<_>>>()?;
    let rels = path
        .rels
        .value
        .into_iter()
        .map(|r| match r {
            BoltType::UnboundedRelation(rel) => Ok(rel),
            other => Err(Error::conversion(format!(
                "path relationship expected, got {other:?}"
            ))),
        })
        .collect::<Result<Vec<_>>>()?;
    let indices = path
        .indices
        .value
        .into_iter()
        .map(|i| match i {
            BoltType::Integer(i) => Ok(i.value),
            other => Err(Error::conversion(format!("path index expected, got {other:?}"))),
        })
        .collect::<Result<Vec<_>>>()?;

    if indices.len() % 2 != 0 {
        return Err(Error::conversion("path indices must come in pairs"));
    }
    let Some(first) = nodes.first() else {
        return Err(Error::conversion("path has no nodes"));
    };

    let lookup_node = |index: i64| -> Result<&Node> {
        usize::try_from(index)
            .ok()
            .and_then(|i| nodes.get(i))
            .ok_or_else(|| Error::conversion(format!("path node index {index} out of range")))
    };

    let mut sequence_nodes = vec![first.clone()];
    let mut sequence_rels = Vec::with_capacity(indices.len() / 2);
    let mut previous_id = first.id.unwrap_or_default();

    for pair in indices.chunks(2) {
        let (rel_index, node_index) = (pair[0], pair[1]);
        let next = lookup_node(node_index)?;
        let next_id = next.id.unwrap_or_default();

        let rel = rel_index
            .unsigned_abs()
            .checked_sub(1)
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| rels.get(i))
            .cloned()
            .ok_or_else(|| Error::conversion("path relationship index out of range"))?;

        let (start, end) = if rel_index > 0 {
            (previous_id, next_id)
        } else {
            (next_id, previous_id)
        };
        sequence_rels.push(unbounded_relationship(rel, start, end)?);
        sequence_nodes.push(next.clone());
        previous_id = next_id;
    }

    Path::new(sequence_nodes, sequence_rels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neo4rs::BoltInteger;

    fn bolt_node(id: i64, label: &str) -> BoltType {
        BoltType::Node(BoltNode {
            id: BoltInteger::new(id),
            labels: BoltList {
                value: vec![BoltType::String(BoltString::from(label.to_string()))],
            },
            properties: BoltMap::new(),
        })
    }

    fn bolt_rel(id: i64, typ: &str) -> BoltType {
        BoltType::UnboundedRelation(BoltUnboundedRelation {
            id: BoltInteger::new(id),
            typ: BoltString::from(typ.to_string()),
            properties: BoltMap::new(),
        })
    }

    #[test]
    fn test_scalar_params() {
        assert!(matches!(to_bolt(&Value::Null).unwrap(), BoltType::Null(_)));
        assert!(matches!(to_bolt(&Value::from(3)).unwrap(), BoltType::Integer(i) if i.value == 3));
        assert!(matches!(
            to_bolt(&Value::from("x")).unwrap(),
            BoltType::String(s) if s.value == "x"
        ));
    }

    #[test]
    fn test_graph_values_are_not_params() {
        let err = to_bolt(&Value::Node(Node::new("A"))).unwrap_err();
        assert!(matches!(err, Error::InvalidValue(_)));
    }

    #[test]
    fn test_nested_values_convert_back() {
        let list = BoltType::List(BoltList {
            value: vec![
                BoltType::Integer(BoltInteger::new(1)),
                BoltType::Null(BoltNull),
            ],
        });
        assert_eq!(
            from_bolt(list).unwrap(),
            Value::List(vec![Value::Int(1), Value::Null])
        );
    }

    #[test]
    fn test_path_with_backward_relationship() {
        // (1)-[:A]->(2)<-[:B]-(3)
        let path = BoltPath {
            nodes: BoltList {
                value: vec![bolt_node(1, "N"), bolt_node(2, "N"), bolt_node(3, "N")],
            },
            rels: BoltList {
                value: vec![bolt_rel(10, "A"), bolt_rel(11, "B")],
            },
            indices: BoltList {
                value: [1, 1, -2, 2]
                    .into_iter()
                    .map(|i| BoltType::Integer(BoltInteger::new(i)))
                    .collect(),
            },
        };

        let path = path_from_bolt(path).unwrap();
        assert_eq!(path.len(), 2);
        let rels = path.relationships();
        assert_eq!((rels[0].start_node_id, rels[0].end_node_id), (1, 2));
        assert_eq!((rels[1].start_node_id, rels[1].end_node_id), (3, 2));
        assert_eq!(rels[1].rel_type, "B");
        assert_eq!(path.end().id, Some(3));
    }
}
