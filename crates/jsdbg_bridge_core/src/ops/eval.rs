use crate::types::RequestInfo;
use crate::{JsdbgClient, JsdbgError, Result};

/// Resolves a database name to its numeric id with `xdmp.database(name)`.
/// Names that are already all digits are returned unchanged.
pub async fn resolve_database_id(client: &JsdbgClient, name: &str) -> Result<String> {
    if is_database_id(name) {
        return Ok(name.to_string());
    }

    let script = format!("xdmp.database({})", js_string(name));
    let body = eval_script(client, script).await?;

    first_part(&body)
        .filter(|id| is_database_id(id))
        .map(str::to_string)
        .ok_or_else(|| JsdbgError::InvalidResponse(format!("Database '{name}' did not resolve to an id")))
}

/// Fetches the status record of a request on `server` (module text, start time).
pub async fn request_info(client: &JsdbgClient, server: &str, rid: &str) -> Result<RequestInfo> {
    let script = format!(
        "xdmp.requestStatus(xdmp.host(), xdmp.server({}), {})",
        js_string(server),
        js_string(rid)
    );
    let body = eval_script(client, script).await?;
    let part = first_part(&body)
        .ok_or_else(|| JsdbgError::InvalidResponse("Empty request status reply".into()))?;
    Ok(serde_json::from_str(part)?)
}

async fn eval_script(client: &JsdbgClient, script: String) -> Result<String> {
    let url = client.endpoint(&["v1", "eval"])?;
    client
        .post_form_text(url, &[("javascript", script)], "multipart/mixed")
        .await
}

pub fn is_database_id(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Body of the first part of a `multipart/mixed` reply.
pub fn first_part(body: &str) -> Option<&str> {
    let (_, rest) = body.split_once("\r\n\r\n")?;
    let part = rest.split("\r\n").next()?.trim();
    if part.is_empty() {
        None
    } else {
        Some(part)
    }
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
