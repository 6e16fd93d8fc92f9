use crate::ops;
use crate::types::{CallFrame, LaunchParams, PropertyDescriptor, RemoteBreakpoint, RemoteObject, RequestInfo};
use crate::{JsdbgClient, Result};
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Pause,
    Resume,
    StepOver,
    StepInto,
    StepOut,
}

impl ControlCommand {
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::StepOver => "step-over",
            Self::StepInto => "step-into",
            Self::StepOut => "step-out",
        }
    }
}

/// Everything a debug session needs from the remote engine. Request-scoped
/// calls take the remote request id explicitly; implementations hold no
/// session state and may be called concurrently.
#[async_trait]
pub trait DebugRuntime: Send + Sync {
    async fn launch(&self, params: &LaunchParams) -> Result<String>;

    /// Binds to an already paused request. The debug service has no bind
    /// endpoint, so the default does nothing; liveness surfaces on the next wait.
    async fn attach(&self, _rid: &str) -> Result<()> {
        Ok(())
    }

    async fn wait_until_paused(&self, rid: &str) -> Result<Vec<CallFrame>>;

    async fn set_breakpoint(&self, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()>;

    async fn remove_breakpoint(&self, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()>;

    async fn control(&self, rid: &str, command: ControlCommand) -> Result<()>;

    async fn evaluate(&self, rid: &str, expression: &str, call_frame_id: &str) -> Result<RemoteObject>;

    async fn get_properties(&self, rid: &str, object_id: &str) -> Result<Vec<PropertyDescriptor>>;

    async fn terminate(&self, rid: &str) -> Result<()>;

    async fn detach(&self, rid: &str) -> Result<()>;

    async fn paused_requests(&self, server: &str) -> Result<Vec<String>>;

    async fn request_info(&self, server: &str, rid: &str) -> Result<RequestInfo>;

    async fn resolve_database_id(&self, name: &str) -> Result<String>;

    async fn connect_server(&self, server: &str) -> Result<()>;
}

#[async_trait]
impl DebugRuntime for JsdbgClient {
    async fn launch(&self, params: &LaunchParams) -> Result<String> {
        ops::launch::launch(self, params).await
    }

    async fn wait_until_paused(&self, rid: &str) -> Result<Vec<CallFrame>> {
        ops::wait::wait_until_paused(self, rid).await
    }

    async fn set_breakpoint(&self, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()> {
        ops::breakpoint::set_breakpoint(self, rid, breakpoint).await
    }

    async fn remove_breakpoint(&self, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()> {
        ops::breakpoint::remove_breakpoint(self, rid, breakpoint).await
    }

    async fn control(&self, rid: &str, command: ControlCommand) -> Result<()> {
        ops::control::control(self, rid, command).await
    }

    async fn evaluate(&self, rid: &str, expression: &str, call_frame_id: &str) -> Result<RemoteObject> {
        ops::inspect::evaluate(self, rid, expression, call_frame_id).await
    }

    async fn get_properties(&self, rid: &str, object_id: &str) -> Result<Vec<PropertyDescriptor>> {
        ops::inspect::get_properties(self, rid, object_id).await
    }

    async fn terminate(&self, rid: &str) -> Result<()> {
        ops::lifecycle::terminate(self, rid).await
    }

    async fn detach(&self, rid: &str) -> Result<()> {
        ops::lifecycle::detach(self, rid).await
    }

    async fn paused_requests(&self, server: &str) -> Result<Vec<String>> {
        ops::lifecycle::paused_requests(self, server).await
    }

    async fn request_info(&self, server: &str, rid: &str) -> Result<RequestInfo> {
        ops::eval::request_info(self, server, rid).await
    }

    async fn resolve_database_id(&self, name: &str) -> Result<String> {
        ops::eval::resolve_database_id(self, name).await
    }

    async fn connect_server(&self, server: &str) -> Result<()> {
        ops::lifecycle::connect_server(self, server).await
    }
}
