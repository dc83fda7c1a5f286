use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

use super::transport::{HttpReply, Transport};
use crate::error::InferenceError;

/// One request observed by a [`MockTransport`]. GET calls record a null
/// body.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

#[derive(Debug, Clone)]
enum Behavior {
    Reply { status: u16, body: String },
    Fail,
}

/// Scriptable transport substitute: replays a queue of canned replies,
/// then a fixed fallback, and records every call it sees.
pub struct MockTransport {
    script: Mutex<VecDeque<Behavior>>,
    fallback: Behavior,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    /// Always answers with the given status and JSON body.
    pub fn replying(status: u16, body: Value) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Behavior::Reply {
                status,
                body: body.to_string(),
            },
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always fails at the transport layer, as if the network were down.
    pub fn failing() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Behavior::Fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replays the given replies in order, then fails.
    pub fn sequence(replies: Vec<(u16, Value)>) -> Self {
        Self {
            script: Mutex::new(
                replies
                    .into_iter()
                    .map(|(status, body)| Behavior::Reply {
                        status,
                        body: body.to_string(),
                    })
                    .collect(),
            ),
            fallback: Behavior::Fail,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: RecordedCall) -> Result<HttpReply, InferenceError> {
        self.calls.lock().unwrap().push(call);
        let behavior = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        match behavior {
            Behavior::Reply { status, body } => Ok(HttpReply { status, body }),
            Behavior::Fail => Err(InferenceError::provider_call("simulated network failure")),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: Value,
    ) -> Result<HttpReply, InferenceError> {
        self.respond(RecordedCall {
            method: "POST",
            url: url.to_string(),
            headers: headers.to_vec(),
            body,
        })
    }

    async fn get(
        &self,
        url: &str,
        headers: &[(String, String)],
    ) -> Result<HttpReply, InferenceError> {
        self.respond(RecordedCall {
            method: "GET",
            url: url.to_string(),
            headers: headers.to_vec(),
            body: Value::Null,
        })
    }
}
