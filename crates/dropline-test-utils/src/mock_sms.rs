// SPDX-FileCopyrightText: 2026 Dropline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock SMS sender for deterministic testing.
//!
//! `MockSms` implements `SmsSender` by recording every send in memory,
//! enabling fast, CI-runnable tests without a live gateway. Failures can
//! be scripted per recipient to exercise failed-send paths.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dropline_core::{DroplineError, SmsSender};

/// One recorded outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// An in-memory [`SmsSender`] that records sends and can fail on demand.
#[derive(Default)]
pub struct MockSms {
    sent: Mutex<Vec<SentSms>>,
    failing: Mutex<Vec<String>>,
    counter: AtomicU64,
}

impl MockSms {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent send to `number` fails with an SMS error.
    pub fn fail_for(&self, number: &str) {
        self.failing.lock().unwrap().push(number.to_string());
    }

    /// All messages sent so far, in order.
    pub fn sent(&self) -> Vec<SentSms> {
        self.sent.lock().unwrap().clone()
    }

    /// Bodies of all messages sent to `number`, in order.
    pub fn bodies_to(&self, number: &str) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.to == number)
            .map(|s| s.body.clone())
            .collect()
    }
}

#[async_trait]
impl SmsSender for MockSms {
    async fn send_sms(&self, to: &str, body: &str) -> Result<String, DroplineError> {
        if self.failing.lock().unwrap().iter().any(|n| n == to) {
            return Err(DroplineError::Sms {
                message: format!("mock gateway refused send to {to}"),
                source: None,
            });
        }
        self.sent.lock().unwrap().push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(format!("SM-mock-{n}"))
    }
}
