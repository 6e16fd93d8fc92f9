use crate::protocol::{Request, THREAD_ID};
use crate::session::Notice;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Sending half of the frontend connection. Cheap to clone into request
/// tasks; every message gets the next outbound `seq`.
#[derive(Clone)]
pub struct Outbox {
    tx: UnboundedSender<Value>,
    seq: Arc<AtomicI64>,
}

impl Outbox {
    pub fn channel() -> (Self, UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let outbox = Self {
            tx,
            seq: Arc::new(AtomicI64::new(0)),
        };
        (outbox, rx)
    }

    fn next_seq(&self) -> i64 {
        self.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn send(&self, mut message: Value) {
        message["seq"] = json!(self.next_seq());
        if self.tx.send(message).is_err() {
            tracing::debug!("Frontend writer has shut down; dropping message");
        }
    }

    pub fn respond(&self, request: &Request, body: Option<Value>) {
        let mut message = json!({
            "type": "response",
            "request_seq": request.seq,
            "success": true,
            "command": request.command,
        });
        if let Some(body) = body {
            message["body"] = body;
        }
        self.send(message);
    }

    pub fn fail(&self, request: &Request, error: impl Into<String>) {
        let error = error.into();
        tracing::debug!("{} failed: {}", request.command, error);
        self.send(json!({
            "type": "response",
            "request_seq": request.seq,
            "success": false,
            "command": request.command,
            "message": error,
        }));
    }

    pub fn event(&self, event: &str, body: Option<Value>) {
        let mut message = json!({
            "type": "event",
            "event": event,
        });
        if let Some(body) = body {
            message["body"] = body;
        }
        self.send(message);
    }

    pub fn publish(&self, notices: Vec<Notice>) {
        for notice in notices {
            match notice {
                Notice::Stopped(reason) => self.event(
                    "stopped",
                    Some(json!({
                        "reason": reason,
                        "threadId": THREAD_ID,
                        "allThreadsStopped": true,
                    })),
                ),
                Notice::Terminated => self.event("terminated", None),
                Notice::Output(text) => self.event(
                    "output",
                    Some(json!({
                        "category": "console",
                        "output": format!("{text}\n"),
                    })),
                ),
            }
        }
    }
}
