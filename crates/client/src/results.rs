use cypherlink_core::{Result, Row};
use futures::stream::{self, Stream};

use crate::transport::RowCursor;

/// Single-pass cursor over the rows of one statement
///
/// Rows are pulled from the transport one at a time. Once the result is
/// exhausted, or after the first error, the stream is finished and every
/// further call to [`next`](ResultStream::next) returns `Ok(None)`.
pub struct ResultStream {
    cursor: Option<Box<dyn RowCursor>>,
}

impl ResultStream {
    pub(crate) fn new(cursor: Box<dyn RowCursor>) -> Self {
        Self {
            cursor: Some(cursor),
        }
    }

    /// Pull the next row
    pub async fn next(&mut self) -> Result<Option<Row>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        match cursor.next_row().await {
            Ok(Some(row)) => Ok(Some(row)),
            Ok(None) => {
                self.cursor = None;
                Ok(None)
            }
            Err(e) => {
                self.cursor = None;
                Err(e)
            }
        }
    }

    /// Whether the stream has been fully consumed or has failed
    pub fn is_finished(&self) -> bool {
        self.cursor.is_none()
    }

    /// Drain the remaining rows
    pub async fn collect_rows(mut self) -> Result<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Adapt into a [`futures::Stream`] that ends after the first error
    pub fn into_stream(self) -> impl Stream<Item = Result<Row>> + Send {
        stream::unfold(self, |mut results| async move {
            match results.next().await {
                Ok(Some(row)) => Some((Ok(row), results)),
                Ok(None) => None,
                Err(e) => Some((Err(e), results)),
            }
        })
    }
}

impl std::fmt::Debug for ResultStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultStream")
            .field("finished", &self.is_finished())
            .finish()
    }
}
