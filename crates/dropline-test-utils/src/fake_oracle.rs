// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Fake extraction oracle returning canned structured intents.
//!
//! Replies are popped from a FIFO queue; a scripted failure entry makes
//! the next call fail the way a real oracle outage or malformed reply
//! would. Every request is recorded for assertions.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use dropline_core::DroplineError;
use dropline_oracle::{ExtractionOracle, ExtractionRequest, SchedulingIntent};

enum FakeReply {
    Intent(SchedulingIntent),
    Failure(String),
}

/// An [`ExtractionOracle`] fed entirely from canned replies.
#[derive(Default)]
pub struct FakeOracle {
    replies: Mutex<VecDeque<FakeReply>>,
    requests: Mutex<Vec<ExtractionRequest>>,
}

impl FakeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a structured intent for the next call.
    pub fn push_intent(&self, intent: SchedulingIntent) {
        self.replies
            .lock()
            .unwrap()
            .push_back(FakeReply::Intent(intent));
    }

    /// Queue an oracle failure (outage or malformed reply) for the next call.
    pub fn push_failure(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(FakeReply::Failure(message.to_string()));
    }

    /// All requests received so far.
    pub fn requests(&self) -> Vec<ExtractionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ExtractionOracle for FakeOracle {
    async fn extract(
        &self,
        request: &ExtractionRequest,
    ) -> Result<SchedulingIntent, DroplineError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(FakeReply::Intent(intent)) => Ok(intent),
            Some(FakeReply::Failure(message)) => Err(DroplineError::Oracle {
                message,
                source: None,
            }),
            None => Err(DroplineError::Oracle {
                message: "fake oracle has no scripted reply".into(),
                source: None,
            }),
        }
    }
}
