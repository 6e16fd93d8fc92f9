use serde_json::{json, Value};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Inbound,
    Outbound,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

/// Append-only JSONL record of every frontend message, one envelope per line.
pub struct TraceLog {
    path: PathBuf,
    file: Mutex<tokio::fs::File>,
}

impl TraceLog {
    pub async fn open(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn log(&self, direction: Direction, payload: &Value) -> io::Result<()> {
        let envelope = json!({
            "ts_ms": timestamp_millis(),
            "direction": direction.as_str(),
            "kind": classify_message(payload),
            "payload": payload,
        });
        let mut line = serde_json::to_vec(&envelope)?;
        line.push(b'\n');

        let mut file = self.file.lock().await;
        file.write_all(&line).await?;
        file.flush().await
    }
}

fn classify_message(payload: &Value) -> &'static str {
    match payload.get("type").and_then(Value::as_str) {
        Some("request") => "request",
        Some("response") => "response",
        Some("event") => "event",
        _ => "other",
    }
}

fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
