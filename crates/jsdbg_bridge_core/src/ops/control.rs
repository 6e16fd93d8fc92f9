use crate::runtime::ControlCommand;
use crate::{JsdbgClient, Result};

/// Sends one execution-control command. Returns once the engine acknowledges
/// it; the resulting pause must be awaited separately.
pub async fn control(client: &JsdbgClient, rid: &str, command: ControlCommand) -> Result<()> {
    let url = client.debug_endpoint(command.endpoint(), rid)?;
    client.post_form(url, &[]).await?;
    Ok(())
}
