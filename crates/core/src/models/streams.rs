use crate::cypher::{escape_identifier, quote_string};
use crate::error::{Error, Result};
use serde::Serialize;
use strum_macros::{Display, EnumString};

/// Kafka ingestion stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KafkaStream {
    pub name: String,
    pub topics: Vec<String>,
    /// Transformation procedure, e.g. `movielens.rating`
    pub transform: String,
    pub consumer_group: Option<String>,
    /// Milliseconds between batches
    pub batch_interval: Option<u64>,
    pub batch_size: Option<u64>,
    pub bootstrap_servers: Vec<String>,
}

/// Pulsar ingestion stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PulsarStream {
    pub name: String,
    pub topics: Vec<String>,
    pub transform: String,
    pub batch_interval: Option<u64>,
    pub batch_size: Option<u64>,
    pub service_url: Option<String>,
}

/// A stream the engine consumes into the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Stream {
    Kafka(KafkaStream),
    Pulsar(PulsarStream),
}

impl KafkaStream {
    pub fn new(
        name: impl Into<String>,
        topics: Vec<String>,
        transform: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            topics,
            transform: transform.into(),
            consumer_group: None,
            batch_interval: None,
            batch_size: None,
            bootstrap_servers: Vec::new(),
        }
    }
}

impl PulsarStream {
    pub fn new(
        name: impl Into<String>,
        topics: Vec<String>,
        transform: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            topics,
            transform: transform.into(),
            batch_interval: None,
            batch_size: None,
            service_url: None,
        }
    }
}

impl Stream {
    pub fn name(&self) -> &str {
        match self {
            Stream::Kafka(stream) => &stream.name,
            Stream::Pulsar(stream) => &stream.name,
        }
    }

    /// The `CREATE ... STREAM` statement
    pub fn to_cypher(&self) -> Result<String> {
        let mut query = match self {
            Stream::Kafka(stream) => {
                let mut query = format!(
                    "CREATE KAFKA STREAM {} TOPICS {} TRANSFORM {}",
                    escape_identifier(&stream.name)?,
                    topics_cypher(&stream.topics)?,
                    bare_name("transform", &stream.transform)?
                );
                if let Some(group) = &stream.consumer_group {
                    query.push_str(&format!(
                        " CONSUMER_GROUP {}",
                        bare_name("consumer group", group)?
                    ));
                }
                push_batching(&mut query, stream.batch_interval, stream.batch_size);
                if !stream.bootstrap_servers.is_empty() {
                    let servers: Vec<String> = stream
                        .bootstrap_servers
                        .iter()
                        .map(|s| quote_string(s))
                        .collect();
                    query.push_str(&format!(" BOOTSTRAP_SERVERS {}", servers.join(", ")));
                }
                query
            }
            Stream::Pulsar(stream) => {
                let mut query = format!(
                    "CREATE PULSAR STREAM {} TOPICS {} TRANSFORM {}",
                    escape_identifier(&stream.name)?,
                    topics_cypher(&stream.topics)?,
                    bare_name("transform", &stream.transform)?
                );
                push_batching(&mut query, stream.batch_interval, stream.batch_size);
                if let Some(url) = &stream.service_url {
                    query.push_str(&format!(" SERVICE_URL {}", quote_string(url)));
                }
                query
            }
        };
        query.push(';');
        Ok(query)
    }

    pub fn start_statement(&self) -> Result<String> {
        Ok(format!("START STREAM {};", escape_identifier(self.name())?))
    }

    pub fn stop_statement(&self) -> Result<String> {
        Ok(format!("STOP STREAM {};", escape_identifier(self.name())?))
    }

    pub fn drop_statement(&self) -> Result<String> {
        Ok(format!("DROP STREAM {};", escape_identifier(self.name())?))
    }
}

/// Topics, transforms and consumer groups are written unquoted, so they may
/// only hold letters, digits, `_`, `.` and `-`
fn bare_name<'a>(what: &str, name: &'a str) -> Result<&'a str> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(name)
    } else {
        Err(Error::invalid_value(format!("invalid stream {what} '{name}'")))
    }
}

fn topics_cypher(topics: &[String]) -> Result<String> {
    if topics.is_empty() {
        return Err(Error::invalid_value("stream needs at least one topic"));
    }
    let topics = topics
        .iter()
        .map(|topic| bare_name("topic", topic))
        .collect::<Result<Vec<_>>>()?;
    Ok(topics.join(","))
}

fn push_batching(query: &mut String, interval: Option<u64>, size: Option<u64>) {
    if let Some(interval) = interval {
        query.push_str(&format!(" BATCH_INTERVAL {interval}"));
    }
    if let Some(size) = size {
        query.push_str(&format!(" BATCH_SIZE {size}"));
    }
}

/// What kind of change fires a trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TriggerEventType {
    Create,
    Update,
    Delete,
}

/// Which graph objects a trigger watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
pub enum TriggerEventObject {
    #[strum(serialize = "()")]
    Node,
    #[strum(serialize = "-->")]
    Relationship,
}

/// Whether a trigger runs before or after the transaction commits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE")]
pub enum TriggerExecutionPhase {
    Before,
    After,
}

/// A statement the engine runs when matching changes commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub name: String,
    pub execution_phase: TriggerExecutionPhase,
    pub statement: String,
    pub event_type: Option<TriggerEventType>,
    pub event_object: Option<TriggerEventObject>,
}

impl Trigger {
    pub fn new(
        name: impl Into<String>,
        execution_phase: TriggerExecutionPhase,
        statement: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            execution_phase,
            statement: statement.into(),
            event_type: None,
            event_object: None,
        }
    }

    pub fn on(mut self, event_object: Option<TriggerEventObject>, event_type: TriggerEventType) -> Self {
        self.event_object = event_object;
        self.event_type = Some(event_type);
        self
    }

    /// The `CREATE TRIGGER` statement
    pub fn to_cypher(&self) -> Result<String> {
        let mut query = format!("CREATE TRIGGER {} ", escape_identifier(&self.name)?);
        if let Some(event_type) = self.event_type {
            query.push_str("ON ");
            if let Some(object) = self.event_object {
                query.push_str(&format!("{object} "));
            }
            query.push_str(&format!("{event_type} "));
        }
        query.push_str(&format!(
            "{} COMMIT EXECUTE {};",
            self.execution_phase, self.statement
        ));
        Ok(query)
    }

    pub fn drop_statement(&self) -> Result<String> {
        Ok(format!("DROP TRIGGER {};", escape_identifier(&self.name)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;

    #[test]
    fn test_kafka_stream_full() {
        let mut kafka = KafkaStream::new(
            "ratings",
            vec!["ratings".to_string(), "reviews".to_string()],
            "movielens.rating",
        );
        kafka.consumer_group = Some("group1".to_string());
        kafka.batch_interval = Some(100);
        kafka.batch_size = Some(1000);
        kafka.bootstrap_servers = vec!["localhost:9092".to_string(), "kafka:9092".to_string()];

        assert_eq!(
            Stream::Kafka(kafka).to_cypher().unwrap(),
            "CREATE KAFKA STREAM ratings TOPICS ratings,reviews TRANSFORM movielens.rating \
             CONSUMER_GROUP group1 BATCH_INTERVAL 100 BATCH_SIZE 1000 \
             BOOTSTRAP_SERVERS 'localhost:9092', 'kafka:9092';"
        );
    }

    #[test]
    fn test_pulsar_stream_minimal() {
        let pulsar = PulsarStream::new("events", vec!["events".to_string()], "ingest.event");
        let stream = Stream::Pulsar(pulsar);
        assert_eq!(
            stream.to_cypher().unwrap(),
            "CREATE PULSAR STREAM events TOPICS events TRANSFORM ingest.event;"
        );
        assert_eq!(stream.start_statement().unwrap(), "START STREAM events;");
        assert_eq!(stream.drop_statement().unwrap(), "DROP STREAM events;");
    }

    #[test]
    fn test_stream_names_are_checked() {
        let no_topics = PulsarStream::new("events", Vec::new(), "ingest.event");
        assert!(matches!(
            Stream::Pulsar(no_topics).to_cypher(),
            Err(Error::InvalidValue(_))
        ));

        let bad_topic = KafkaStream::new("ratings", vec!["a b".to_string()], "movielens.rating");
        assert!(matches!(
            Stream::Kafka(bad_topic).to_cypher(),
            Err(Error::InvalidValue(_))
        ));

        let bad_transform = KafkaStream::new("ratings", vec!["ratings".to_string()], "");
        assert!(matches!(
            Stream::Kafka(bad_transform).to_cypher(),
            Err(Error::InvalidValue(_))
        ));

        let mut bad_group =
            KafkaStream::new("ratings", vec!["ratings".to_string()], "movielens.rating");
        bad_group.consumer_group = Some("g; DROP".to_string());
        assert!(matches!(
            Stream::Kafka(bad_group).to_cypher(),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn test_trigger_with_object_and_event() {
        let trigger = Trigger::new(
            "on_create",
            TriggerExecutionPhase::After,
            "UNWIND createdVertices AS v SET v.created = timestamp()",
        )
        .on(Some(TriggerEventObject::Node), TriggerEventType::Create);
        assert_eq!(
            trigger.to_cypher().unwrap(),
            "CREATE TRIGGER on_create ON () CREATE AFTER COMMIT EXECUTE \
             UNWIND createdVertices AS v SET v.created = timestamp();"
        );
    }

    #[test]
    fn test_trigger_without_event() {
        let trigger = Trigger::new("any_change", TriggerExecutionPhase::Before, "RETURN 1");
        assert_eq!(
            trigger.to_cypher().unwrap(),
            "CREATE TRIGGER any_change BEFORE COMMIT EXECUTE RETURN 1;"
        );
    }

    #[test]
    fn test_trigger_enums_parse() {
        assert_eq!(
            TriggerEventObject::from_str("-->").unwrap(),
            TriggerEventObject::Relationship
        );
        assert_eq!(
            TriggerEventType::from_str("DELETE").unwrap(),
            TriggerEventType::Delete
        );
        assert_eq!(
            TriggerExecutionPhase::from_str("AFTER").unwrap(),
            TriggerExecutionPhase::After
        );
    }
}
