use crate::types::CallFrame;
use crate::{JsdbgClient, JsdbgError, Result};
use serde_json::Value;
use std::time::Duration;

const WAIT_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Blocks until the request is paused, then returns its call stack.
///
/// Each `wait` call blocks server-side for at most `config.wait_poll`; the loop
/// re-issues it until the engine reports a pause or answers with an error (for
/// instance when the request has finished). There is no overall deadline.
pub async fn wait_until_paused(client: &JsdbgClient, rid: &str) -> Result<Vec<CallFrame>> {
    let poll = client.config().wait_poll;
    let http_timeout = poll + client.config().timeout;

    loop {
        let url = client.debug_endpoint("wait", rid)?;
        let status = client
            .get_json(url, &[("timeout", poll.as_secs().to_string())], Some(http_timeout))
            .await?;

        if is_paused(&status) {
            break;
        }

        tracing::trace!("Request {} still running", rid);
        tokio::time::sleep(WAIT_RETRY_INTERVAL).await;
    }

    stack(client, rid).await
}

pub async fn stack(client: &JsdbgClient, rid: &str) -> Result<Vec<CallFrame>> {
    let url = client.debug_endpoint("stack", rid)?;
    let value = client.get_json(url, &[], None).await?;
    parse_stack(value)
}

/// Accepts either a bare frame array or `{"callFrames": [...]}`.
pub fn parse_stack(value: Value) -> Result<Vec<CallFrame>> {
    let frames = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => map
            .remove("callFrames")
            .ok_or_else(|| JsdbgError::InvalidResponse("Missing 'callFrames' in stack response".into()))?,
        other => {
            return Err(JsdbgError::InvalidResponse(format!(
                "Expected call frames, got {other}"
            )))
        }
    };
    Ok(serde_json::from_value(frames)?)
}

/// A timed-out wait answers with an empty body or `{"paused": false}`.
pub fn is_paused(status: &Value) -> bool {
    match status {
        Value::Null => false,
        Value::Bool(paused) => *paused,
        Value::String(s) => !s.trim().is_empty(),
        Value::Object(map) => map.get("paused").and_then(Value::as_bool).unwrap_or(true),
        _ => true,
    }
}
