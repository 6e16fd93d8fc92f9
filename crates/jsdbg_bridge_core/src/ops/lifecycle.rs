use crate::types::id_string;
use crate::{JsdbgClient, JsdbgError, Result};
use serde_json::Value;

/// Ends a request that was started by `launch`.
pub async fn terminate(client: &JsdbgClient, rid: &str) -> Result<()> {
    let url = client.debug_endpoint("terminate", rid)?;
    client.post_form(url, &[]).await?;
    tracing::info!("Terminated request {}", rid);
    Ok(())
}

/// Releases an attached request; it resumes and runs to completion.
pub async fn detach(client: &JsdbgClient, rid: &str) -> Result<()> {
    let url = client.debug_endpoint("disable", rid)?;
    client.post_form(url, &[]).await?;
    tracing::info!("Detached from request {}", rid);
    Ok(())
}

/// Makes requests on `server` stop for debugging when they start.
pub async fn connect_server(client: &JsdbgClient, server: &str) -> Result<()> {
    let url = client.debug_endpoint("connect", server)?;
    client.post_form(url, &[]).await?;
    tracing::info!("Debug server {} connected", server);
    Ok(())
}

pub async fn paused_requests(client: &JsdbgClient, server: &str) -> Result<Vec<String>> {
    let url = client.debug_endpoint("paused-requests", server)?;
    let response = client.get_json(url, &[], None).await?;
    parse_request_ids(&response)
}

pub fn parse_request_ids(response: &Value) -> Result<Vec<String>> {
    let ids = response
        .get("requestIds")
        .and_then(Value::as_array)
        .ok_or_else(|| JsdbgError::InvalidResponse("Missing 'requestIds' in paused-requests response".into()))?;
    Ok(ids.iter().filter_map(id_string).collect())
}
