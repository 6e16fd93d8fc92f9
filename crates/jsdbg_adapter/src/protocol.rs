//! Frontend (DAP) message shapes: the inbound request envelope, the argument
//! objects this adapter understands, and the bodies it sends back.

use jsdbg_bridge_core::types::deserialize_opt_id;
use jsdbg_bridge_core::ConnectionOverrides;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// The debug service runs one request per session, so there is only ever one thread.
pub const THREAD_ID: i64 = 1;
pub const THREAD_NAME: &str = "JS Request Thread";
pub const ADAPTER_DATA: &str = "jsdbg-adapter-data";

#[derive(Debug, Clone, Deserialize)]
pub struct Request {
    pub seq: i64,
    pub command: String,
    #[serde(default)]
    pub arguments: Value,
}

impl Request {
    /// Decodes `arguments`, treating a missing object as all defaults.
    pub fn arguments<T>(&self) -> Result<T, String>
    where
        T: DeserializeOwned + Default,
    {
        if self.arguments.is_null() {
            return Ok(T::default());
        }
        serde_json::from_value(self.arguments.clone())
            .map_err(|e| format!("Invalid arguments for '{}': {e}", self.command))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StopReason {
    Entry,
    Pause,
    Breakpoint,
    Step,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub supports_configuration_done_request: bool,
    pub supports_function_breakpoints: bool,
    pub supports_conditional_breakpoints: bool,
    pub supports_completions_request: bool,
    pub supports_delayed_stack_trace_loading: bool,
    pub supports_terminate_request: bool,
    pub supports_set_variable: bool,
    pub supports_restart_frame: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            supports_configuration_done_request: true,
            supports_function_breakpoints: false,
            supports_conditional_breakpoints: true,
            supports_completions_request: true,
            supports_delayed_stack_trace_loading: false,
            supports_terminate_request: false,
            supports_set_variable: false,
            supports_restart_frame: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Request arguments
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InitializeArguments {
    pub lines_start_at1: bool,
    pub columns_start_at1: bool,
}

impl Default for InitializeArguments {
    fn default() -> Self {
        Self {
            lines_start_at1: true,
            columns_start_at1: true,
        }
    }
}

/// Connection settings that a launch or attach configuration may carry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConnectionArguments {
    pub hostname: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub ssl: Option<bool>,
    #[serde(alias = "pathToCa")]
    pub ca_path: Option<PathBuf>,
}

impl ConnectionArguments {
    pub fn overrides(&self) -> ConnectionOverrides {
        ConnectionOverrides {
            hostname: non_empty(&self.hostname),
            port: self.port,
            username: non_empty(&self.username),
            password: self.password.clone(),
            ssl: self.ssl,
            ca_path: self
                .ca_path
                .clone()
                .filter(|path| !path.as_os_str().is_empty()),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LaunchArguments {
    pub path: PathBuf,
    #[serde(deserialize_with = "deserialize_opt_id")]
    pub database: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_id")]
    pub modules: Option<String>,
    pub root: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_id")]
    pub txn_id: Option<String>,
    pub work_dir: Option<String>,
    #[serde(flatten)]
    pub connection: ConnectionArguments,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AttachArguments {
    pub debug_server_name: Option<String>,
    #[serde(deserialize_with = "deserialize_opt_id")]
    pub rid: Option<String>,
    #[serde(alias = "path")]
    pub work_dir: Option<String>,
    pub connect_server: bool,
    #[serde(flatten)]
    pub connection: ConnectionArguments,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SetBreakpointsArguments {
    pub source: Source,
    pub breakpoints: Vec<SourceBreakpoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceBreakpoint {
    pub line: i64,
    #[serde(default)]
    pub column: Option<i64>,
    #[serde(default)]
    pub condition: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StackTraceArguments {
    pub start_frame: Option<usize>,
    pub levels: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopesArguments {
    pub frame_id: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VariablesArguments {
    pub variables_reference: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EvaluateArguments {
    pub expression: String,
    pub frame_id: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisconnectArguments {
    pub restart: bool,
}

// ---------------------------------------------------------------------------
// Response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_data: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Breakpoint {
    pub verified: bool,
    pub line: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackFrame {
    pub id: i64,
    pub name: String,
    pub source: Source,
    pub line: i64,
    pub column: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceBody {
    pub stack_frames: Vec<StackFrame>,
    pub total_frames: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub name: String,
    pub variables_reference: i64,
    pub expensive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    pub name: String,
    pub value: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub variables_reference: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateBody {
    pub result: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub variables_reference: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Thread {
    pub id: i64,
    pub name: String,
}
