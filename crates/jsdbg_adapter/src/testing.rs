//! Scripted in-memory runtime for session and adapter tests.

use crate::adapter::RuntimeConnector;
use crate::protocol::ConnectionArguments;
use async_trait::async_trait;
use jsdbg_bridge_core::types::{
    parse_properties, CallFrame, LaunchParams, PropertyDescriptor, RemoteBreakpoint, RemoteObject, RequestInfo,
};
use jsdbg_bridge_core::{ControlCommand, DebugRuntime, JsdbgError, Result};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub fn frame(url: &str, line: u32) -> CallFrame {
    serde_json::from_value(json!({
        "callFrameId": "cf-0",
        "location": {"lineNumber": line, "columnNumber": 0},
        "url": url,
        "scopeChain": [
            {"type": "local", "object": {"type": "object", "objectId": "scope-local"}},
            {"type": "global", "object": {"type": "object"}}
        ]
    }))
    .expect("frame fixture should parse")
}

pub struct FakeRuntime {
    request_id: String,
    calls: Mutex<Vec<String>>,
    stacks: Mutex<VecDeque<Vec<CallFrame>>>,
    failures: Mutex<HashMap<&'static str, String>>,
    rejected_lines: Mutex<HashSet<u32>>,
    properties: Mutex<HashMap<String, Vec<PropertyDescriptor>>>,
    evaluation: Mutex<RemoteObject>,
    paused: Vec<String>,
    wait_gate: Mutex<Option<Arc<Notify>>>,
    launch_gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeRuntime {
    pub fn new(request_id: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            calls: Mutex::new(Vec::new()),
            stacks: Mutex::new(VecDeque::new()),
            failures: Mutex::new(HashMap::new()),
            rejected_lines: Mutex::new(HashSet::new()),
            properties: Mutex::new(HashMap::new()),
            evaluation: Mutex::new(RemoteObject::default()),
            paused: Vec::new(),
            wait_gate: Mutex::new(None),
            launch_gate: Mutex::new(None),
        }
    }

    pub fn with_stack(self, frames: Vec<CallFrame>) -> Self {
        self.stacks.lock().expect("stacks lock").push_back(frames);
        self
    }

    pub fn with_properties(self, object_id: &str, properties: Value) -> Self {
        let parsed = parse_properties(properties.as_array().cloned().unwrap_or_default());
        self.properties
            .lock()
            .expect("properties lock")
            .insert(object_id.to_string(), parsed);
        self
    }

    pub fn with_evaluation(self, result: Value) -> Self {
        *self.evaluation.lock().expect("evaluation lock") =
            serde_json::from_value(result).expect("evaluation fixture should parse");
        self
    }

    pub fn with_paused(mut self, request_ids: &[&str]) -> Self {
        self.paused = request_ids.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn rejecting_line(self, remote_line: u32) -> Self {
        self.rejected_lines.lock().expect("lines lock").insert(remote_line);
        self
    }

    /// Makes every later call of `operation` fail with `code`.
    pub fn fail(&self, operation: &'static str, code: &str) {
        self.failures
            .lock()
            .expect("failures lock")
            .insert(operation, code.to_string());
    }

    /// Later pause waits block until `gate` is notified.
    pub fn hold_waits(&self, gate: Arc<Notify>) {
        *self.wait_gate.lock().expect("gate lock") = Some(gate);
    }

    /// Later launches are recorded, then block until `gate` is notified.
    pub fn hold_launches(&self, gate: Arc<Notify>) {
        *self.launch_gate.lock().expect("gate lock") = Some(gate);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().expect("calls lock"))
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn check(&self, operation: &str) -> Result<()> {
        match self.failures.lock().expect("failures lock").get(operation) {
            Some(code) => Err(JsdbgError::remote(code.clone(), format!("{operation} failed"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DebugRuntime for FakeRuntime {
    async fn launch(&self, params: &LaunchParams) -> Result<String> {
        self.record(format!(
            "launch {} db={} modules={}",
            params.script_path.display(),
            params.database.as_deref().unwrap_or("-"),
            params.modules.as_deref().unwrap_or("-"),
        ));
        let gate = self.launch_gate.lock().expect("gate lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check("launch")?;
        Ok(self.request_id.clone())
    }

    async fn attach(&self, rid: &str) -> Result<()> {
        self.record(format!("attach {rid}"));
        self.check("attach")
    }

    async fn wait_until_paused(&self, rid: &str) -> Result<Vec<CallFrame>> {
        self.record(format!("wait {rid}"));
        let gate = self.wait_gate.lock().expect("gate lock").clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check("wait")?;
        let next = self.stacks.lock().expect("stacks lock").pop_front();
        Ok(next.unwrap_or_else(|| vec![frame("/test.sjs", 3)]))
    }

    async fn set_breakpoint(&self, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()> {
        self.record(format!(
            "set {rid} {}:{}:{}{}",
            breakpoint.url,
            breakpoint.line,
            breakpoint.column,
            breakpoint.condition.as_deref().map(|c| format!(" if {c}")).unwrap_or_default()
        ));
        self.check("set_breakpoint")?;
        if self.rejected_lines.lock().expect("lines lock").contains(&breakpoint.line) {
            return Err(JsdbgError::remote("JSDBG-BADLOCATION", "No code at that location"));
        }
        Ok(())
    }

    async fn remove_breakpoint(&self, rid: &str, breakpoint: &RemoteBreakpoint) -> Result<()> {
        self.record(format!("remove {rid} {}:{}:{}", breakpoint.url, breakpoint.line, breakpoint.column));
        self.check("remove_breakpoint")
    }

    async fn control(&self, rid: &str, command: ControlCommand) -> Result<()> {
        self.record(format!("{} {rid}", command.endpoint()));
        self.check("control")
    }

    async fn evaluate(&self, rid: &str, expression: &str, call_frame_id: &str) -> Result<RemoteObject> {
        self.record(format!("evaluate {rid} {expression} @{call_frame_id}"));
        self.check("evaluate")?;
        Ok(self.evaluation.lock().expect("evaluation lock").clone())
    }

    async fn get_properties(&self, rid: &str, object_id: &str) -> Result<Vec<PropertyDescriptor>> {
        self.record(format!("properties {rid} {object_id}"));
        self.check("properties")?;
        Ok(self
            .properties
            .lock()
            .expect("properties lock")
            .get(object_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn terminate(&self, rid: &str) -> Result<()> {
        self.record(format!("terminate {rid}"));
        self.check("terminate")
    }

    async fn detach(&self, rid: &str) -> Result<()> {
        self.record(format!("detach {rid}"));
        self.check("detach")
    }

    async fn paused_requests(&self, server: &str) -> Result<Vec<String>> {
        self.record(format!("paused {server}"));
        self.check("paused")?;
        Ok(self.paused.clone())
    }

    async fn request_info(&self, server: &str, rid: &str) -> Result<RequestInfo> {
        self.record(format!("info {server} {rid}"));
        Ok(RequestInfo {
            request_text: Some("/test.sjs".to_string()),
            start_time: Some("2024-05-01T10:00:00Z".to_string()),
        })
    }

    async fn resolve_database_id(&self, name: &str) -> Result<String> {
        self.record(format!("resolve {name}"));
        self.check("resolve")?;
        Ok(if name.bytes().all(|b| b.is_ascii_digit()) {
            name.to_string()
        } else {
            "9001".to_string()
        })
    }

    async fn connect_server(&self, server: &str) -> Result<()> {
        self.record(format!("connect {server}"));
        self.check("connect")
    }
}

/// Hands the same fake to every launch or attach.
pub struct FakeConnector {
    pub runtime: Arc<FakeRuntime>,
}

#[async_trait]
impl RuntimeConnector for FakeConnector {
    async fn connect(&self, _connection: &ConnectionArguments) -> Result<Arc<dyn DebugRuntime>> {
        Ok(self.runtime.clone())
    }
}
