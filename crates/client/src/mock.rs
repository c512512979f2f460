//! Mock transport for testing

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use async_trait::async_trait;
use cypherlink_core::{Error, Result, Row};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::transport::{Params, RowCursor, Transport};

/// Scripted outcome for one submitted statement
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// The statement succeeds and yields these rows
    Rows(Vec<Row>),
    /// The engine rejects the statement at submission
    Reject(String),
    /// The statement yields these rows, then fails while streaming
    FailAfter { rows: Vec<Row>, message: String },
}

/// A statement as it reached the transport
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedStatement {
    pub statement: String,
    pub params: Params,
}

#[derive(Debug, Default)]
struct MockData {
    responses: VecDeque<MockResponse>,
    executed: Vec<ExecutedStatement>,
    unavailable: bool,
}

/// In-memory transport that records statements and replays scripted responses
///
/// Clones share state, so a test can keep a handle after moving one into a
/// `Connection`. Statements without a scripted response succeed with no rows.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    data: Arc<Mutex<MockData>>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response
    pub fn push_rows(&self, rows: Vec<Row>) -> &Self {
        self.push(MockResponse::Rows(rows))
    }

    /// Queue a rejection at submission
    pub fn push_rejection(&self, message: impl Into<String>) -> &Self {
        self.push(MockResponse::Reject(message.into()))
    }

    /// Queue a response that fails after yielding `rows`
    pub fn push_failure_after(&self, rows: Vec<Row>, message: impl Into<String>) -> &Self {
        self.push(MockResponse::FailAfter {
            rows,
            message: message.into(),
        })
    }

    pub fn push(&self, response: MockResponse) -> &Self {
        self.data.lock().unwrap().responses.push_back(response);
        self
    }

    /// Make every subsequent call fail with a connection error
    pub fn set_unavailable(&self, unavailable: bool) {
        self.data.lock().unwrap().unavailable = unavailable;
    }

    /// Number of statements that reached the transport
    pub fn call_count(&self) -> usize {
        self.data.lock().unwrap().executed.len()
    }

    pub fn executed(&self) -> Vec<ExecutedStatement> {
        self.data.lock().unwrap().executed.clone()
    }

    /// Just the statement texts, in submission order
    pub fn statements(&self) -> Vec<String> {
        self.data
            .lock()
            .unwrap()
            .executed
            .iter()
            .map(|e| e.statement.clone())
            .collect()
    }

    fn submit(&self, statement: &str, params: &Params) -> Result<Option<MockResponse>> {
        let mut data = self.data.lock().unwrap();
        if data.unavailable {
            return Err(Error::connection("mock transport is unavailable"));
        }
        data.executed.push(ExecutedStatement {
            statement: statement.to_string(),
            params: params.clone(),
        });
        match data.responses.pop_front() {
            Some(MockResponse::Reject(message)) => Err(Error::query(message)),
            other => Ok(other),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, statement: &str, params: &Params) -> Result<()> {
        match self.submit(statement, params)? {
            Some(MockResponse::FailAfter { message, .. }) => Err(Error::query(message)),
            _ => Ok(()),
        }
    }

    async fn execute_and_fetch(
        &self,
        statement: &str,
        params: &Params,
    ) -> Result<Box<dyn RowCursor>> {
        let cursor = match self.submit(statement, params)? {
            Some(MockResponse::Rows(rows)) => MockCursor {
                rows: rows.into(),
                failure: None,
            },
            Some(MockResponse::FailAfter { rows, message }) => MockCursor {
                rows: rows.into(),
                failure: Some(message),
            },
            _ => MockCursor {
                rows: VecDeque::new(),
                failure: None,
            },
        };
        Ok(Box::new(cursor))
    }

    fn is_active(&self) -> bool {
        !self.data.lock().unwrap().unavailable
    }
}

struct MockCursor {
    rows: VecDeque<Row>,
    failure: Option<String>,
}

#[async_trait]
impl RowCursor for MockCursor {
    async fn next_row(&mut self) -> Result<Option<Row>> {
        if let Some(row) = self.rows.pop_front() {
            return Ok(Some(row));
        }
        match self.failure.take() {
            Some(message) => Err(Error::query(message)),
            None => Ok(None),
        }
    }
}
