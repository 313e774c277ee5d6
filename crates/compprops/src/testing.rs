//! In-memory [`Database`] double that records every statement it receives.

use crate::client::Database;
use crate::error::PropsResult;
use crate::param::ParamList;
use crate::row::JsonRow;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A statement seen by [`RecordingDatabase`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: ParamList,
}

/// Replays queued responses in order; answers with zero rows once the queue
/// is drained.
#[derive(Debug, Default)]
pub struct RecordingDatabase {
    calls: Mutex<Vec<RecordedQuery>>,
    responses: Mutex<VecDeque<PropsResult<Vec<JsonRow>>>>,
}

impl RecordingDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue rows for the next unanswered statement.
    pub fn respond_with(self, rows: Vec<JsonRow>) -> Self {
        self.push_response(Ok(rows));
        self
    }

    /// Queue a failure for the next unanswered statement.
    pub fn fail_with(self, err: crate::PropsError) -> Self {
        self.push_response(Err(err));
        self
    }

    fn push_response(&self, response: PropsResult<Vec<JsonRow>>) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
    }

    /// Every statement received so far.
    pub fn calls(&self) -> Vec<RecordedQuery> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl Database for RecordingDatabase {
    async fn fetch_rows(&self, sql: &str, params: &ParamList) -> PropsResult<Vec<JsonRow>> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedQuery {
                sql: sql.to_string(),
                params: params.clone(),
            });
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
