use crate::types::{id_string, LaunchParams};
use crate::{JsdbgClient, JsdbgError, Result};

/// Reads the local script and starts it on the debug server, paused before
/// the first statement. Returns the remote request id.
pub async fn launch(client: &JsdbgClient, params: &LaunchParams) -> Result<String> {
    let script = tokio::fs::read_to_string(&params.script_path).await?;
    let url = client.endpoint(&["jsdbg", "v1", "eval"])?;

    tracing::info!(
        "Launching {} under the debugger",
        params.script_path.display()
    );

    let result = client.post_form(url, &launch_form(script, params)).await?;

    result
        .get("requestId")
        .and_then(id_string)
        .ok_or_else(|| JsdbgError::InvalidResponse("Missing 'requestId' in launch response".into()))
}

fn launch_form(script: String, params: &LaunchParams) -> Vec<(&'static str, String)> {
    let mut form = vec![("javascript", script)];
    let optional = [
        ("database", &params.database),
        ("modules", &params.modules),
        ("root", &params.root),
        ("txnId", &params.txn_id),
    ];
    for (key, value) in optional {
        if let Some(value) = value.as_ref().filter(|v| !v.is_empty()) {
            form.push((key, value.clone()));
        }
    }
    form
}
