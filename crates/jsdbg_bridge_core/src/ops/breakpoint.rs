use crate::types::RemoteBreakpoint;
use crate::{JsdbgClient, Result};

pub async fn set_breakpoint(client: &JsdbgClient, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()> {
    let url = client.debug_endpoint("set-breakpoint", rid)?;
    client.post_form(url, &breakpoint_form(breakpoint, true)).await?;
    Ok(())
}

/// Removal is keyed on location only; the engine holds one breakpoint per location.
pub async fn remove_breakpoint(client: &JsdbgClient, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()> {
    let url = client.debug_endpoint("remove-breakpoint", rid)?;
    client.post_form(url, &breakpoint_form(breakpoint, false)).await?;
    Ok(())
}

fn breakpoint_form(breakpoint: &RemoteBreakpoint, with_condition: bool) -> Vec<(&'static str, String)> {
    let mut form = vec![
        ("url", breakpoint.url.clone()),
        ("lineNumber", breakpoint.line.to_string()),
        ("columnNumber", breakpoint.column.to_string()),
    ];
    if with_condition {
        if let Some(condition) = breakpoint.condition.as_ref().filter(|c| !c.is_empty()) {
            form.push(("condition", condition.clone()));
        }
    }
    form
}
