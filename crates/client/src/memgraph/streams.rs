use cypherlink_core::{
    Error, Result, Row, Stream, Trigger, TriggerEventObject, TriggerEventType,
    TriggerExecutionPhase,
};
use std::str::FromStr;

use super::{string_column, MemgraphClient};

impl MemgraphClient {
    pub async fn create_stream(&self, stream: &Stream) -> Result<()> {
        self.execute(&stream.to_cypher()?).await
    }

    pub async fn start_stream(&self, stream: &Stream) -> Result<()> {
        self.execute(&stream.start_statement()?).await
    }

    pub async fn stop_stream(&self, stream: &Stream) -> Result<()> {
        self.execute(&stream.stop_statement()?).await
    }

    pub async fn drop_stream(&self, stream: &Stream) -> Result<()> {
        self.execute(&stream.drop_statement()?).await
    }

    /// Raw `SHOW STREAMS` rows
    pub async fn get_streams(&self) -> Result<Vec<Row>> {
        self.fetch_all("SHOW STREAMS;").await
    }

    pub async fn create_trigger(&self, trigger: &Trigger) -> Result<()> {
        self.execute(&trigger.to_cypher()?).await
    }

    pub async fn get_triggers(&self) -> Result<Vec<Trigger>> {
        self.fetch_all("SHOW TRIGGERS;")
            .await?
            .iter()
            .map(trigger_from_row)
            .collect()
    }

    pub async fn drop_trigger(&self, trigger: &Trigger) -> Result<()> {
        self.execute(&trigger.drop_statement()?).await
    }

    /// Drop every trigger in the database
    pub async fn drop_triggers(&self) -> Result<()> {
        for trigger in self.get_triggers().await? {
            self.drop_trigger(&trigger).await?;
        }
        Ok(())
    }
}

/// `event_type` is `ANY`, a bare event (`CREATE`) or object plus event (`() CREATE`);
/// `phase` reads like `AFTER COMMIT`.
fn trigger_from_row(row: &Row) -> Result<Trigger> {
    let name = string_column(row, "trigger_name")?;
    let event = string_column(row, "event_type")?;
    let phase = string_column(row, "phase")?;
    let statement = string_column(row, "statement")?;

    let execution_phase = phase
        .split_whitespace()
        .next()
        .and_then(|p| TriggerExecutionPhase::from_str(p).ok())
        .ok_or_else(|| Error::conversion(format!("unknown trigger phase '{phase}'")))?;

    let parts: Vec<&str> = event.split_whitespace().collect();
    let (event_object, event_type) = match parts.as_slice() {
        ["ANY"] => (None, None),
        [event_type] => (None, Some(parse_event_type(event_type)?)),
        [object, event_type] => (
            Some(TriggerEventObject::from_str(object).map_err(|_| {
                Error::conversion(format!("unknown trigger event object '{object}'"))
            })?),
            Some(parse_event_type(event_type)?),
        ),
        _ => {
            return Err(Error::conversion(format!(
                "unknown trigger event type '{event}'"
            )))
        }
    };

    Ok(Trigger {
        name,
        execution_phase,
        statement,
        event_type,
        event_object,
    })
}

fn parse_event_type(event_type: &str) -> Result<TriggerEventType> {
    TriggerEventType::from_str(event_type)
        .map_err(|_| Error::conversion(format!("unknown trigger event type '{event_type}'")))
}
