//! Request dispatch for one frontend connection.
//!
//! Cheap requests are answered inline, in arrival order. Anything that talks
//! to the debug service runs in its own task so a blocked pause wait never
//! holds up `threads`, `stackTrace` or `disconnect`.

use crate::audit::{Direction, TraceLog};
use crate::breakpoints::BreakpointSpec;
use crate::outbox::Outbox;
use crate::protocol::{
    AttachArguments, Breakpoint, Capabilities, ConnectionArguments, DisconnectArguments, EvaluateArguments, InitializeArguments,
    LaunchArguments, Request, ScopesArguments, SetBreakpointsArguments, StackTraceArguments, Thread,
    VariablesArguments, THREAD_ID, THREAD_NAME,
};
use crate::session::{CommandOutcome, Session};
use crate::transport::read_message;
use async_trait::async_trait;
use jsdbg_bridge_core::{ControlCommand, DebugRuntime, JsdbgClient, JsdbgConfig};
use serde_json::{json, Value};
use std::future::Future;
use std::io::ErrorKind;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::io::AsyncBufRead;
use tokio::task::JoinSet;

/// Builds the runtime a launch or attach will drive.
#[async_trait]
pub trait RuntimeConnector: Send + Sync {
    async fn connect(&self, connection: &ConnectionArguments) -> jsdbg_bridge_core::Result<Arc<dyn DebugRuntime>>;
}

/// Connects over HTTP, layering the request's connection fields over the
/// `JSDBG_*` environment.
pub struct HttpConnector;

#[async_trait]
impl RuntimeConnector for HttpConnector {
    async fn connect(&self, connection: &ConnectionArguments) -> jsdbg_bridge_core::Result<Arc<dyn DebugRuntime>> {
        let config = JsdbgConfig::from_env().with_overrides(&connection.overrides());
        tracing::info!("Connecting to debug service at {}", config.base_url());
        Ok(Arc::new(JsdbgClient::new(config).await?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct DebugAdapter {
    connector: Arc<dyn RuntimeConnector>,
    session: Arc<Session>,
    outbox: Outbox,
    /// Launch and attach tasks; these own the remote request and must finish
    /// before the process exits.
    lifecycle: Mutex<JoinSet<()>>,
}

impl DebugAdapter {
    pub fn new(connector: Arc<dyn RuntimeConnector>, session: Arc<Session>, outbox: Outbox) -> Self {
        Self {
            connector,
            session,
            outbox,
            lifecycle: Mutex::new(JoinSet::new()),
        }
    }

    /// Waits up to `limit` for launch and attach tasks still running, so a
    /// request started during shutdown is terminated or detached.
    pub async fn finish(&self, limit: Duration) {
        let mut tasks = std::mem::take(&mut *self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner));
        if tasks.is_empty() {
            return;
        }

        let drained = tokio::time::timeout(limit, async {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::warn!("Launch/attach task failed: {}", e);
                }
            }
        })
        .await;
        if drained.is_err() {
            tracing::warn!("Gave up on {} launch/attach tasks after {:?}", tasks.len(), limit);
        }
    }

    fn track<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.lifecycle.lock().unwrap_or_else(PoisonError::into_inner).spawn(task);
    }

    /// Reads requests until `disconnect` or end of input.
    pub async fn serve<R>(&self, mut reader: R, trace: Option<Arc<TraceLog>>) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        loop {
            let message = match read_message(&mut reader).await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    tracing::info!("Frontend closed the connection");
                    return Ok(());
                }
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    tracing::warn!("Skipping malformed message: {}", e);
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(trace) = &trace {
                if let Err(e) = trace.log(Direction::Inbound, &message).await {
                    tracing::warn!("Failed to write trace file: {}", e);
                }
            }

            if message.get("type").and_then(Value::as_str) != Some("request") {
                tracing::debug!("Ignoring non-request message: {}", message);
                continue;
            }
            let request: Request = match serde_json::from_value(message) {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!("Skipping request without seq or command: {}", e);
                    continue;
                }
            };

            if self.dispatch(request).await == Flow::Exit {
                return Ok(());
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Flow {
        tracing::debug!("<- {} (seq {})", request.command, request.seq);

        match request.command.as_str() {
            "initialize" => self.initialize(&request),
            "configurationDone" => {
                self.session.configuration_done();
                self.outbox.respond(&request, None);
            }
            "launch" => self.launch(request),
            "attach" => self.attach(request),
            "setBreakpoints" => self.set_breakpoints(request),
            "threads" => self.outbox.respond(
                &request,
                Some(json!({
                    "threads": [Thread { id: THREAD_ID, name: THREAD_NAME.to_string() }]
                })),
            ),
            "stackTrace" => self.stack_trace(&request),
            "scopes" => self.scopes(&request),
            "variables" => self.variables(request),
            "evaluate" => self.evaluate(request),
            "completions" => self.outbox.respond(&request, Some(json!({ "targets": [] }))),
            "pause" => self.control(request, ControlCommand::Pause),
            "continue" => self.control(request, ControlCommand::Resume),
            "next" => self.control(request, ControlCommand::StepOver),
            "stepIn" => self.control(request, ControlCommand::StepInto),
            "stepOut" => self.control(request, ControlCommand::StepOut),
            "disconnect" => return self.disconnect(&request).await,
            other => {
                let message = format!("Unrecognized request '{other}'");
                self.outbox.fail(&request, message);
            }
        }
        Flow::Continue
    }

    fn initialize(&self, request: &Request) {
        let args: InitializeArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(request, e),
        };
        self.session.initialize(args.lines_start_at1, args.columns_start_at1);

        let capabilities = serde_json::to_value(Capabilities::default()).unwrap_or(Value::Null);
        self.outbox.respond(request, Some(capabilities));
        self.outbox.event("initialized", None);
    }

    fn launch(&self, request: Request) {
        let args: LaunchArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(&request, e),
        };
        let (connector, session, outbox) = self.handles();

        self.track(async move {
            let notices = match connector.connect(&args.connection).await {
                Ok(runtime) => session.launch(runtime, &args).await,
                Err(e) => session.report_failure(&e, "Error configuring connection", true).await,
            };
            outbox.respond(&request, None);
            outbox.publish(notices);
        });
    }

    fn attach(&self, request: Request) {
        let args: AttachArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(&request, e),
        };
        let (connector, session, outbox) = self.handles();

        self.track(async move {
            let notices = match connector.connect(&args.connection).await {
                Ok(runtime) => session.attach(runtime, &args).await,
                Err(e) => session.report_failure(&e, "Error configuring connection", true).await,
            };
            outbox.respond(&request, None);
            outbox.publish(notices);
        });
    }

    fn set_breakpoints(&self, request: Request) {
        let args: SetBreakpointsArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(&request, e),
        };
        let Some(path) = args.source.path.clone().filter(|p| !p.is_empty()) else {
            tracing::debug!("setBreakpoints without a source path");
            return self.outbox.respond(&request, Some(json!({ "breakpoints": [] })));
        };

        let specs: Vec<BreakpointSpec> = args
            .breakpoints
            .iter()
            .map(|bp| BreakpointSpec::new(path.clone(), bp.line, bp.column, bp.condition.clone()))
            .collect();
        let (_, session, outbox) = self.handles();

        tokio::spawn(async move {
            let (verified, notices) = session.set_breakpoints(&path, &specs).await;
            let last_error = session.last_breakpoint_error();
            let breakpoints: Vec<Breakpoint> = specs
                .iter()
                .zip(verified)
                .map(|(spec, verified)| Breakpoint {
                    verified,
                    line: spec.line,
                    column: spec.column,
                    message: if verified { None } else { last_error.clone() },
                })
                .collect();

            outbox.respond(&request, Some(json!({ "breakpoints": breakpoints })));
            outbox.publish(notices);
        });
    }

    fn stack_trace(&self, request: &Request) {
        let args: StackTraceArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(request, e),
        };
        let body = self.session.stack_trace(args.start_frame.unwrap_or(0), args.levels);
        self.outbox
            .respond(request, Some(serde_json::to_value(body).unwrap_or(Value::Null)));
    }

    fn scopes(&self, request: &Request) {
        let args: ScopesArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(request, e),
        };
        let (scopes, notices) = self.session.scopes(args.frame_id);
        self.outbox.respond(request, Some(json!({ "scopes": scopes })));
        self.outbox.publish(notices);
    }

    fn variables(&self, request: Request) {
        let args: VariablesArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(&request, e),
        };
        let (_, session, outbox) = self.handles();

        tokio::spawn(async move {
            let (variables, notices) = session.variables(args.variables_reference).await;
            outbox.respond(&request, Some(json!({ "variables": variables })));
            outbox.publish(notices);
        });
    }

    fn evaluate(&self, request: Request) {
        let args: EvaluateArguments = match request.arguments() {
            Ok(args) => args,
            Err(e) => return self.outbox.fail(&request, e),
        };
        let (_, session, outbox) = self.handles();

        tokio::spawn(async move {
            match session.evaluate(&args.expression, args.frame_id).await {
                Ok(Some(body)) => {
                    outbox.respond(&request, Some(serde_json::to_value(body).unwrap_or(Value::Null)))
                }
                Ok(None) => outbox.respond(&request, None),
                Err(rejection) => {
                    outbox.fail(&request, rejection.message);
                    outbox.publish(rejection.notices);
                }
            }
        });
    }

    fn control(&self, request: Request, command: ControlCommand) {
        let (_, session, outbox) = self.handles();

        tokio::spawn(async move {
            match session.execute(command).await {
                CommandOutcome::Pending(pending) => {
                    let body = (command == ControlCommand::Resume).then(|| json!({ "allThreadsContinued": true }));
                    outbox.respond(&request, body);
                    let notices = session.await_pause(pending).await;
                    outbox.publish(notices);
                }
                CommandOutcome::Ignored => outbox.respond(&request, None),
                CommandOutcome::Failed(rejection) => {
                    outbox.fail(&request, rejection.message);
                    outbox.publish(rejection.notices);
                }
            }
        });
    }

    async fn disconnect(&self, request: &Request) -> Flow {
        let args: DisconnectArguments = request.arguments().unwrap_or_default();
        let notices = self.session.disconnect(args.restart).await;
        self.outbox.publish(notices);
        self.outbox.respond(request, None);
        Flow::Exit
    }

    fn handles(&self) -> (Arc<dyn RuntimeConnector>, Arc<Session>, Outbox) {
        (self.connector.clone(), self.session.clone(), self.outbox.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::ReconcilePolicy;
    use crate::machine::Phase;
    use crate::testing::{FakeConnector, FakeRuntime};
    use crate::transport::encode_message;
    use std::time::Duration;
    use tokio::io::BufReader;
    use tokio::sync::mpsc::UnboundedReceiver;
    use tokio::sync::Notify;

    fn adapter(runtime: Arc<FakeRuntime>) -> (DebugAdapter, UnboundedReceiver<Value>) {
        let (outbox, rx) = Outbox::channel();
        let session = Arc::new(Session::new(ReconcilePolicy::Optimistic, Duration::from_millis(10)));
        let adapter = DebugAdapter::new(Arc::new(FakeConnector { runtime }), session, outbox);
        (adapter, rx)
    }

    fn request(seq: i64, command: &str, arguments: Value) -> Request {
        Request {
            seq,
            command: command.to_string(),
            arguments,
        }
    }

    async fn next(rx: &mut UnboundedReceiver<Value>) -> Value {
        tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("message should arrive in time")
            .expect("outbox should be open")
    }

    /// Collects messages until `done` matches one, inclusive.
    async fn until(rx: &mut UnboundedReceiver<Value>, done: impl Fn(&Value) -> bool) -> Vec<Value> {
        let mut seen = Vec::new();
        loop {
            let message = next(rx).await;
            let finished = done(&message);
            seen.push(message);
            if finished {
                return seen;
            }
        }
    }

    fn is_event(message: &Value, name: &str) -> bool {
        message["type"] == "event" && message["event"] == name
    }

    #[tokio::test]
    async fn initialize_answers_then_signals_initialized() {
        let (adapter, mut rx) = adapter(Arc::new(FakeRuntime::new("42")));

        adapter
            .dispatch(request(1, "initialize", json!({"linesStartAt1": true})))
            .await;

        let response = next(&mut rx).await;
        assert_eq!(response["type"], "response");
        assert_eq!(response["request_seq"], 1);
        assert_eq!(response["body"]["supportsConfigurationDoneRequest"], true);
        assert_eq!(response["body"]["supportsConditionalBreakpoints"], true);
        assert!(is_event(&next(&mut rx).await, "initialized"));
    }

    #[tokio::test]
    async fn unknown_commands_are_rejected() {
        let (adapter, mut rx) = adapter(Arc::new(FakeRuntime::new("42")));

        adapter.dispatch(request(3, "restartFrame", Value::Null)).await;

        let response = next(&mut rx).await;
        assert_eq!(response["success"], false);
        assert_eq!(response["message"], "Unrecognized request 'restartFrame'");
    }

    #[tokio::test]
    async fn malformed_arguments_are_rejected() {
        let (adapter, mut rx) = adapter(Arc::new(FakeRuntime::new("42")));

        adapter.dispatch(request(4, "scopes", json!({"frameId": "one"}))).await;

        let response = next(&mut rx).await;
        assert_eq!(response["success"], false);
        assert!(response["message"].as_str().is_some_and(|m| m.contains("scopes")));
    }

    #[tokio::test]
    async fn launch_flow_reaches_entry_stop() {
        let runtime = Arc::new(FakeRuntime::new("42"));
        let (adapter, mut rx) = adapter(runtime.clone());

        adapter.dispatch(request(1, "initialize", Value::Null)).await;
        adapter
            .dispatch(request(
                2,
                "setBreakpoints",
                json!({"source": {"path": "/test.sjs"}, "breakpoints": [{"line": 6}]}),
            ))
            .await;
        adapter.dispatch(request(3, "configurationDone", Value::Null)).await;
        adapter
            .dispatch(request(4, "launch", json!({"path": "/test.sjs", "database": "1"})))
            .await;

        let messages = until(&mut rx, |m| is_event(m, "stopped")).await;

        let breakpoints = messages
            .iter()
            .find(|m| m["command"] == "setBreakpoints")
            .expect("setBreakpoints answered");
        assert_eq!(breakpoints["body"]["breakpoints"][0]["verified"], true);
        assert_eq!(breakpoints["body"]["breakpoints"][0]["line"], 6);
        assert!(messages.iter().any(|m| m["command"] == "launch" && m["success"] == true));
        assert_eq!(messages.last().map(|m| m["body"]["reason"].clone()), Some(json!("entry")));
        assert!(runtime.calls().contains(&"set 42 /test.sjs:5:0".to_string()));

        adapter.dispatch(request(5, "stackTrace", json!({"threadId": 1}))).await;
        let trace = next(&mut rx).await;
        assert_eq!(trace["body"]["totalFrames"], 1);
        assert_eq!(trace["body"]["stackFrames"][0]["line"], 4);
        assert_eq!(trace["body"]["stackFrames"][0]["source"]["adapterData"], "jsdbg-adapter-data");

        adapter.dispatch(request(6, "continue", json!({"threadId": 1}))).await;
        let messages = until(&mut rx, |m| is_event(m, "stopped")).await;
        assert_eq!(messages[0]["body"]["allThreadsContinued"], true);
        assert_eq!(messages[1]["body"]["reason"], "breakpoint");
    }

    #[tokio::test]
    async fn launch_failure_ends_with_terminated() {
        let runtime = Arc::new(FakeRuntime::new("42"));
        runtime.fail("launch", "JSDBG-BADSCRIPT");
        let (adapter, mut rx) = adapter(runtime);

        adapter.dispatch(request(1, "launch", json!({"path": "/missing.sjs"}))).await;

        let messages = until(&mut rx, |m| is_event(m, "terminated")).await;
        assert_eq!(messages[0]["command"], "launch");
        assert!(messages
            .iter()
            .any(|m| is_event(m, "output") && m["body"]["output"].as_str().is_some_and(|o| o.contains("JSDBG-BADSCRIPT"))));
    }

    #[tokio::test]
    async fn finish_waits_for_a_launch_racing_disconnect() {
        let runtime = Arc::new(FakeRuntime::new("42"));
        let gate = Arc::new(Notify::new());
        runtime.hold_launches(gate.clone());
        let (adapter, mut rx) = adapter(runtime.clone());

        adapter.dispatch(request(1, "configurationDone", Value::Null)).await;
        adapter.dispatch(request(2, "launch", json!({"path": "/test.sjs"}))).await;
        while !runtime.calls().iter().any(|c| c.starts_with("launch ")) {
            tokio::task::yield_now().await;
        }
        adapter.dispatch(request(3, "disconnect", json!({"restart": false}))).await;

        gate.notify_one();
        adapter.finish(Duration::from_secs(2)).await;

        assert!(runtime.calls().contains(&"terminate 42".to_string()));
        let messages = until(&mut rx, |m| m["command"] == "launch").await;
        assert!(messages.iter().any(|m| m["command"] == "disconnect"));
    }

    #[tokio::test]
    async fn control_before_launch_is_acknowledged() {
        let (adapter, mut rx) = adapter(Arc::new(FakeRuntime::new("42")));

        adapter.dispatch(request(1, "next", json!({"threadId": 1}))).await;

        let response = next(&mut rx).await;
        assert_eq!(response["command"], "next");
        assert_eq!(response["success"], true);
    }

    #[tokio::test]
    async fn threads_lists_the_single_request_thread() {
        let (adapter, mut rx) = adapter(Arc::new(FakeRuntime::new("42")));

        adapter.dispatch(request(1, "threads", Value::Null)).await;

        let response = next(&mut rx).await;
        assert_eq!(response["body"]["threads"], json!([{"id": 1, "name": "JS Request Thread"}]));
    }

    #[tokio::test]
    async fn serve_stops_after_disconnect() {
        let runtime = Arc::new(FakeRuntime::new("42"));
        let (adapter, mut rx) = adapter(runtime.clone());

        let mut input = Vec::new();
        for message in [
            json!({"seq": 1, "type": "request", "command": "initialize"}),
            json!({"seq": 2, "type": "event", "event": "ignored"}),
            json!({"seq": 3, "type": "request", "command": "disconnect", "arguments": {"restart": false}}),
            json!({"seq": 4, "type": "request", "command": "threads"}),
        ] {
            input.extend(encode_message(&message).expect("message should encode"));
        }

        adapter
            .serve(BufReader::new(input.as_slice()), None)
            .await
            .expect("serve should finish cleanly");

        let mut commands = Vec::new();
        while let Ok(message) = rx.try_recv() {
            if message["type"] == "response" {
                commands.push(message["command"].as_str().unwrap_or_default().to_string());
            }
        }
        assert_eq!(commands, vec!["initialize", "disconnect"]);
        assert_eq!(adapter.session.phase(), Phase::Shutdown);
        assert!(runtime.calls().is_empty());
    }

    #[tokio::test]
    async fn requests_after_shutdown_are_acknowledged() {
        let (adapter, mut rx) = adapter(Arc::new(FakeRuntime::new("42")));
        adapter.session.disconnect(false).await;

        adapter.dispatch(request(1, "stackTrace", json!({"threadId": 1}))).await;
        adapter.dispatch(request(2, "scopes", json!({"frameId": 1}))).await;

        let trace = next(&mut rx).await;
        assert_eq!(trace["success"], true);
        assert_eq!(trace["body"]["stackFrames"], json!([]));
        let scopes = next(&mut rx).await;
        assert_eq!(scopes["success"], true);
        assert_eq!(scopes["body"]["scopes"], json!([]));
    }
}
