use crate::types::{parse_properties, PropertyDescriptor, RemoteObject};
use crate::{JsdbgClient, JsdbgError, Result};
use serde_json::Value;

/// Evaluates `expression` in the given call frame, or in global scope when
/// `call_frame_id` is empty.
pub async fn evaluate(
    client: &JsdbgClient,
    rid: &str,
    expression: &str,
    call_frame_id: &str,
) -> Result<RemoteObject> {
    let url = client.debug_endpoint("eval-on-call-frame", rid)?;
    let mut form = vec![("expr", expression.to_string())];
    if !call_frame_id.is_empty() {
        form.push(("call-frame", call_frame_id.to_string()));
    }

    let response = client.post_form(url, &form).await?;
    let result = result_payload(response)?;
    Ok(serde_json::from_value(result)?)
}

pub async fn get_properties(
    client: &JsdbgClient,
    rid: &str,
    object_id: &str,
) -> Result<Vec<PropertyDescriptor>> {
    let url = client.debug_endpoint("properties", rid)?;
    let response = client
        .post_form(url, &[("object-id", object_id.to_string())])
        .await?;

    match result_payload(response)? {
        Value::Array(values) => Ok(parse_properties(values)),
        other => Err(JsdbgError::InvalidResponse(format!(
            "Expected property array, got {other}"
        ))),
    }
}

/// Unwraps the inspector envelope `{"result": {"result": ...}}`.
pub fn result_payload(mut response: Value) -> Result<Value> {
    response
        .get_mut("result")
        .and_then(|outer| outer.get_mut("result"))
        .map(Value::take)
        .ok_or_else(|| JsdbgError::InvalidResponse("Missing 'result.result' in inspector response".into()))
}
