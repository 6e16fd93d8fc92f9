//! One debug session: the bound remote request, its pause snapshot, the
//! handle tables and the accepted breakpoints.
//!
//! All state sits behind one mutex that is never held across an `await`.
//! Long operations (pause waits, breakpoint batches) read what they need,
//! release the lock, call the runtime, then re-check the phase before
//! applying results, so a disconnect that lands mid-call always wins.

use crate::breakpoints::{BreakpointSet, BreakpointSpec, BreakpointStore, ReconcilePolicy};
use crate::classify::{classify, ErrorClass};
use crate::format;
use crate::handles::{FrameHandle, FrameTable, VariableTable};
use crate::location::LocationMapper;
use crate::machine::{self, Effect, Input, Phase};
use crate::protocol::{self, AttachArguments, EvaluateBody, LaunchArguments, StackTraceBody, StopReason, Variable};
use futures_util::future::join_all;
use jsdbg_bridge_core::types::{CallFrame, LaunchParams, RemoteBreakpoint};
use jsdbg_bridge_core::{ControlCommand, DebugRuntime, JsdbgError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::Notify;

/// Something the frontend should be told, as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Stopped(StopReason),
    Terminated,
    Output(String),
}

/// A request that must be answered with `success: false`.
#[derive(Debug)]
pub struct Rejection {
    pub message: String,
    pub notices: Vec<Notice>,
}

/// An acknowledged control command whose resulting pause is still outstanding.
pub struct PendingPause {
    runtime: Arc<dyn DebugRuntime>,
    rid: String,
    generation: u64,
    reason: StopReason,
}

pub enum CommandOutcome {
    Pending(PendingPause),
    /// No live request; acknowledged without touching the engine.
    Ignored,
    Failed(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Add,
    Remove,
}

type BatchResult = Vec<(Action, BreakpointSpec, jsdbg_bridge_core::Result<()>)>;

#[derive(Default)]
struct ConfigurationGate {
    done: AtomicBool,
    notify: Notify,
}

impl ConfigurationGate {
    fn open(&self) {
        self.done.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    async fn wait(&self, limit: Duration) -> bool {
        let notified = self.notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        if self.done.load(Ordering::SeqCst) {
            return true;
        }
        let _ = tokio::time::timeout(limit, notified).await;
        self.done.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
struct SessionState {
    phase: Phase,
    runtime: Option<Arc<dyn DebugRuntime>>,
    request_id: Option<String>,
    mapper: LocationMapper,
    snapshot: Vec<CallFrame>,
    frames: FrameTable,
    variables: VariableTable,
    breakpoints: BreakpointStore,
    wait_generation: u64,
    pause_epoch: u64,
}

impl SessionState {
    /// Runtime and request id, while a request is live.
    fn binding(&self) -> Option<(Arc<dyn DebugRuntime>, String)> {
        if !self.phase.is_live() {
            return None;
        }
        Some((self.runtime.clone()?, self.request_id.clone()?))
    }

    /// Applies one machine transition. Local effects happen here; remote
    /// cleanup effects are returned for the caller to run unlocked.
    fn apply(&mut self, input: Input, fault: Option<&str>, notices: &mut Vec<Notice>) -> Vec<Effect> {
        let transition = machine::step(self.phase, input);
        if transition.phase != self.phase {
            tracing::info!("Session {:?} -> {:?}", self.phase, transition.phase);
        }
        self.phase = transition.phase;

        let mut remote = Vec::new();
        for effect in transition.effects {
            match effect {
                Effect::ResetHandles => {
                    self.frames.reset();
                    self.variables.reset();
                    self.pause_epoch += 1;
                }
                Effect::EmitTerminated => notices.push(Notice::Terminated),
                Effect::TraceRequestEnded => notices.push(Notice::Output(format!(
                    "Request {} has ended",
                    self.request_id.as_deref().unwrap_or("(unbound)")
                ))),
                Effect::TraceFault => {
                    if let Some(message) = fault {
                        notices.push(Notice::Output(message.to_string()));
                    }
                }
                Effect::TerminateRemote | Effect::DetachRemote => remote.push(effect),
            }
        }
        remote
    }

    /// Classifies a remote failure. Returns the cleanup a fatal fault leaves
    /// for a request that is still alive on the engine.
    fn fail(&mut self, error: &JsdbgError, context: &str, fatal: bool, notices: &mut Vec<Notice>) -> Vec<Effect> {
        let message = format!("{context}: {error}");
        tracing::warn!("{}", message);
        self.apply(Input::Failed { class: classify(error), fatal }, Some(&message), notices)
    }

    fn fault(&mut self, message: &str, fatal: bool, notices: &mut Vec<Notice>) -> Vec<Effect> {
        tracing::warn!("{}", message);
        self.apply(Input::Failed { class: ErrorClass::Fault, fatal }, Some(message), notices)
    }

    fn begin_wait(&mut self) -> u64 {
        self.wait_generation += 1;
        self.wait_generation
    }

    fn accept_pause(&mut self, generation: u64, frames: Vec<CallFrame>) -> bool {
        if generation != self.wait_generation {
            tracing::debug!(
                "Dropping pause result of wait {} (current wait is {})",
                generation,
                self.wait_generation
            );
            return false;
        }
        self.apply(Input::Paused, None, &mut Vec::new());
        if !self.phase.is_live() {
            tracing::debug!("Dropping pause result that arrived after shutdown");
            return false;
        }
        self.snapshot = frames;
        true
    }

    fn remote_breakpoint(&self, spec: &BreakpointSpec) -> RemoteBreakpoint {
        RemoteBreakpoint {
            url: self.mapper.local_to_url(&spec.source_path),
            line: self.mapper.line_to_remote(spec.line),
            column: self.mapper.column_to_remote(spec.column),
            condition: spec.condition.clone(),
        }
    }

    /// Records the outcome of a breakpoint batch. Returns the failed adds and
    /// failed removes.
    fn absorb(&mut self, results: BatchResult, notices: &mut Vec<Notice>) -> (Vec<BreakpointSpec>, Vec<BreakpointSpec>) {
        let mut failed_adds = Vec::new();
        let mut failed_removes = Vec::new();
        let mut last_error = None;

        for (action, spec, result) in results {
            let Err(error) = result else { continue };
            let verb = match action {
                Action::Add => "setting",
                Action::Remove => "removing",
            };
            let context = format!("Error {verb} breakpoint at {}:{}", spec.source_path, spec.line);
            // Non-fatal, so the request is never released here.
            self.fail(&error, &context, false, notices);
            last_error = Some(format!("{context}: {error}"));
            match action {
                Action::Add => failed_adds.push(spec),
                Action::Remove => failed_removes.push(spec),
            }
        }

        self.breakpoints.set_last_error(last_error);
        (failed_adds, failed_removes)
    }
}

pub struct Session {
    state: Mutex<SessionState>,
    gate: ConfigurationGate,
    policy: ReconcilePolicy,
    configuration_timeout: Duration,
}

impl Session {
    pub fn new(policy: ReconcilePolicy, configuration_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            gate: ConfigurationGate::default(),
            policy,
            configuration_timeout,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> Phase {
        self.lock().phase
    }

    pub fn initialize(&self, lines_start_at1: bool, columns_start_at1: bool) {
        self.lock().mapper.set_client_bases(lines_start_at1, columns_start_at1);
    }

    pub fn configuration_done(&self) {
        self.gate.open();
    }

    pub fn last_breakpoint_error(&self) -> Option<String> {
        self.lock().breakpoints.last_error().map(str::to_string)
    }

    pub async fn report_failure(&self, error: &JsdbgError, context: &str, fatal: bool) -> Vec<Notice> {
        let mut notices = Vec::new();
        let cleanup = self.lock().fail(error, context, fatal, &mut notices);
        self.release(cleanup, &mut notices).await;
        notices
    }

    async fn report_fault(&self, message: &str, fatal: bool) -> Vec<Notice> {
        let mut notices = Vec::new();
        let cleanup = self.lock().fault(message, fatal, &mut notices);
        self.release(cleanup, &mut notices).await;
        notices
    }

    /// Runs remote cleanup left by a fatal failure against the bound request.
    async fn release(&self, cleanup: Vec<Effect>, notices: &mut Vec<Notice>) {
        if cleanup.is_empty() {
            return;
        }
        let (runtime, rid) = {
            let state = self.lock();
            (state.runtime.clone(), state.request_id.clone())
        };
        if let (Some(runtime), Some(rid)) = (runtime, rid) {
            run_remote_effects(runtime.as_ref(), &rid, cleanup, false, notices).await;
        }
    }

    async fn await_configuration(&self) {
        if !self.gate.wait(self.configuration_timeout).await {
            tracing::debug!(
                "configurationDone not received within {:?}; continuing",
                self.configuration_timeout
            );
        }
    }

    /// Claims the session for a single launch or attach.
    fn bind(&self, runtime: Arc<dyn DebugRuntime>, work_dir: Option<&str>) -> Result<(), Vec<Notice>> {
        let mut state = self.lock();
        if state.phase != Phase::Idle || state.runtime.is_some() {
            return Err(vec![Notice::Output(
                "This session already debugged a request; start a new session".to_string(),
            )]);
        }
        state.runtime = Some(runtime);
        state.mapper.set_work_dir(work_dir.unwrap_or_default());
        Ok(())
    }

    pub async fn launch(&self, runtime: Arc<dyn DebugRuntime>, args: &LaunchArguments) -> Vec<Notice> {
        self.await_configuration().await;
        // Module URLs are relative to `root`, so it doubles as the working
        // directory unless one is given explicitly.
        let work_dir = non_empty(args.work_dir.as_deref()).or_else(|| non_empty(args.root.as_deref()));
        if let Err(notices) = self.bind(runtime.clone(), work_dir) {
            return notices;
        }

        let params = match launch_params(runtime.as_ref(), args).await {
            Ok(params) => params,
            Err(e) => return self.report_failure(&e, "Error resolving database", true).await,
        };
        let rid = match runtime.launch(&params).await {
            Ok(rid) => rid,
            Err(e) => return self.report_failure(&e, "Error launching request", true).await,
        };

        let banner = format!("Launched request with id: {rid}");
        self.enter(runtime, rid, Input::Launched, banner).await
    }

    pub async fn attach(&self, runtime: Arc<dyn DebugRuntime>, args: &AttachArguments) -> Vec<Notice> {
        self.await_configuration().await;
        if let Err(notices) = self.bind(runtime.clone(), non_empty(args.work_dir.as_deref())) {
            return notices;
        }

        let mut notices = Vec::new();
        let server = non_empty(args.debug_server_name.as_deref());
        if args.connect_server {
            match server {
                Some(server) => {
                    if let Err(e) = runtime.connect_server(server).await {
                        notices.extend(self.report_failure(&e, "Error connecting debug server", false).await);
                    }
                }
                None => notices.push(Notice::Output(
                    "connectServer needs a debugServerName; skipping connect".to_string(),
                )),
            }
        }

        let rid = match &args.rid {
            Some(rid) => rid.clone(),
            None => match self.pick_paused_request(runtime.as_ref(), server).await {
                Ok((rid, trace)) => {
                    notices.push(trace);
                    rid
                }
                Err(failure) => {
                    notices.extend(failure);
                    return notices;
                }
            },
        };

        if let Err(e) = runtime.attach(&rid).await {
            notices.extend(self.report_failure(&e, "Error attaching to request", true).await);
            return notices;
        }

        let banner = format!("Attached to request with id: {rid}");
        notices.extend(self.enter(runtime, rid, Input::Attached, banner).await);
        notices
    }

    async fn pick_paused_request(
        &self,
        runtime: &dyn DebugRuntime,
        server: Option<&str>,
    ) -> Result<(String, Notice), Vec<Notice>> {
        let Some(server) = server else {
            return Err(self.report_fault("Attach needs a rid or a debugServerName", true).await);
        };

        let paused = match runtime.paused_requests(server).await {
            Ok(paused) => paused,
            Err(e) => return Err(self.report_failure(&e, "Error listing paused requests", true).await),
        };
        let Some(rid) = paused.into_iter().next() else {
            let message = format!("No paused requests on debug server {server}");
            return Err(self.report_fault(&message, true).await);
        };

        let trace = match runtime.request_info(server, &rid).await {
            Ok(info) => format!(
                "Attaching to paused request {rid} ({}, started {})",
                info.request_text.as_deref().unwrap_or("unknown module"),
                info.start_time.as_deref().unwrap_or("at an unknown time"),
            ),
            Err(e) => {
                tracing::debug!("Could not fetch status of request {}: {}", rid, e);
                format!("Attaching to paused request {rid}")
            }
        };
        Ok((rid, Notice::Output(trace)))
    }

    /// Common tail of launch and attach: bind the request, wait for the first
    /// pause, replay buffered breakpoints, announce the entry stop.
    async fn enter(&self, runtime: Arc<dyn DebugRuntime>, rid: String, input: Input, banner: String) -> Vec<Notice> {
        let mut notices = Vec::new();
        let (cleanup, generation) = {
            let mut state = self.lock();
            state.request_id = Some(rid.clone());
            let cleanup = state.apply(input, None, &mut notices);
            (cleanup, state.begin_wait())
        };
        if !cleanup.is_empty() {
            run_remote_effects(runtime.as_ref(), &rid, cleanup, false, &mut notices).await;
            return notices;
        }

        match runtime.wait_until_paused(&rid).await {
            Ok(frames) => {
                if !self.lock().accept_pause(generation, frames) {
                    return notices;
                }
            }
            Err(e) => {
                notices.extend(self.report_wait_failure(generation, &e, true).await);
                return notices;
            }
        }

        notices.extend(self.replay_breakpoints(runtime.as_ref(), &rid).await);
        if self.phase().is_live() {
            notices.push(Notice::Output(banner));
            notices.push(Notice::Stopped(StopReason::Entry));
        }
        notices
    }

    async fn report_wait_failure(&self, generation: u64, error: &JsdbgError, fatal: bool) -> Vec<Notice> {
        let mut notices = Vec::new();
        let cleanup = {
            let mut state = self.lock();
            if generation != state.wait_generation {
                tracing::debug!("Ignoring failure of superseded wait {}: {}", generation, error);
                return notices;
            }
            state.fail(error, "Error waiting for request to pause", fatal, &mut notices)
        };
        self.release(cleanup, &mut notices).await;
        notices
    }

    async fn replay_breakpoints(&self, runtime: &dyn DebugRuntime, rid: &str) -> Vec<Notice> {
        let plan: Vec<_> = {
            let state = self.lock();
            state
                .breakpoints
                .all()
                .into_iter()
                .map(|spec| {
                    let remote = state.remote_breakpoint(&spec);
                    (Action::Add, spec, remote)
                })
                .collect()
        };
        if plan.is_empty() {
            return Vec::new();
        }
        tracing::debug!("Replaying {} buffered breakpoints on request {}", plan.len(), rid);

        let results = issue(runtime, rid, plan).await;
        let mut notices = Vec::new();
        let mut state = self.lock();
        let (failed_adds, _) = state.absorb(results, &mut notices);
        if self.policy == ReconcilePolicy::Strict {
            for spec in &failed_adds {
                state.breakpoints.settle(&spec.source_path, std::slice::from_ref(spec), &[]);
            }
        }
        notices
    }

    /// Replaces the accepted breakpoints of one source and pushes the delta to
    /// the engine. Returns one `verified` flag per requested breakpoint.
    pub async fn set_breakpoints(&self, source_path: &str, requested: &[BreakpointSpec]) -> (Vec<bool>, Vec<Notice>) {
        let next: BreakpointSet = requested.iter().cloned().collect();
        let ((runtime, rid), plan) = {
            let mut state = self.lock();
            let delta = state.breakpoints.replace(source_path, next);
            match state.binding() {
                Some(binding) if !delta.is_empty() => {
                    let plan: Vec<_> = delta
                        .to_remove
                        .into_iter()
                        .map(|spec| (Action::Remove, spec))
                        .chain(delta.to_add.into_iter().map(|spec| (Action::Add, spec)))
                        .map(|(action, spec)| {
                            let remote = state.remote_breakpoint(&spec);
                            (action, spec, remote)
                        })
                        .collect();
                    (binding, plan)
                }
                _ => return (vec![true; requested.len()], Vec::new()),
            }
        };

        let results = issue(runtime.as_ref(), &rid, plan).await;
        let mut notices = Vec::new();
        let mut state = self.lock();
        let (failed_adds, failed_removes) = state.absorb(results, &mut notices);

        let verified = match self.policy {
            ReconcilePolicy::Optimistic => vec![true; requested.len()],
            ReconcilePolicy::Strict => {
                state.breakpoints.settle(source_path, &failed_adds, &failed_removes);
                requested.iter().map(|spec| !failed_adds.contains(spec)).collect()
            }
        };
        (verified, notices)
    }

    /// Sends a control command. On success the pause it leads to must be
    /// awaited with [`Session::await_pause`].
    pub async fn execute(&self, command: ControlCommand) -> CommandOutcome {
        let Some((runtime, rid)) = self.lock().binding() else {
            return CommandOutcome::Ignored;
        };

        if let Err(e) = runtime.control(&rid, command).await {
            let context = format!("Error in {} command", command.endpoint());
            let notices = self.report_failure(&e, &context, false).await;
            return CommandOutcome::Failed(Rejection {
                message: format!("{context}: {e}"),
                notices,
            });
        }

        let generation = self.lock().begin_wait();
        CommandOutcome::Pending(PendingPause {
            runtime,
            rid,
            generation,
            reason: stop_reason(command),
        })
    }

    pub async fn await_pause(&self, pending: PendingPause) -> Vec<Notice> {
        let PendingPause {
            runtime,
            rid,
            generation,
            reason,
        } = pending;

        match runtime.wait_until_paused(&rid).await {
            Ok(frames) => {
                if self.lock().accept_pause(generation, frames) {
                    vec![Notice::Stopped(reason)]
                } else {
                    Vec::new()
                }
            }
            Err(e) => self.report_wait_failure(generation, &e, false).await,
        }
    }

    pub fn stack_trace(&self, start_frame: usize, levels: Option<usize>) -> StackTraceBody {
        let mut guard = self.lock();
        if !guard.phase.is_live() {
            return StackTraceBody::default();
        }

        let state = &mut *guard;
        let total_frames = state.snapshot.len();
        let levels = levels.filter(|l| *l > 0).unwrap_or(total_frames);
        let stack_frames = state
            .snapshot
            .iter()
            .skip(start_frame)
            .take(levels)
            .map(|frame| {
                let id = state.frames.insert(FrameHandle::from(frame));
                format::stack_frame(id, frame, &state.mapper)
            })
            .collect();

        StackTraceBody {
            stack_frames,
            total_frames,
        }
    }

    pub fn scopes(&self, frame_id: i64) -> (Vec<protocol::Scope>, Vec<Notice>) {
        let mut guard = self.lock();
        if !guard.phase.is_live() {
            return (Vec::new(), Vec::new());
        }

        let state = &mut *guard;
        match state.frames.get(frame_id) {
            Some(frame) => {
                tracing::debug!(
                    "Scopes of frame {} ({} at {}:{}:{})",
                    frame_id,
                    frame.function_name.as_deref().unwrap_or("<anonymous>"),
                    frame.url,
                    frame.line,
                    frame.column
                );
                let scopes = frame
                    .scope_chain
                    .iter()
                    .map(|scope| format::scope(scope, &mut state.variables))
                    .collect();
                (scopes, Vec::new())
            }
            None => (
                Vec::new(),
                vec![Notice::Output(format!("Error reading scopes: unknown frame id {frame_id}"))],
            ),
        }
    }

    pub async fn variables(&self, reference: i64) -> (Vec<Variable>, Vec<Notice>) {
        let (runtime, rid, object_id, epoch) = {
            let state = self.lock();
            let Some((runtime, rid)) = state.binding() else {
                return (Vec::new(), Vec::new());
            };
            let Some(object_id) = state.variables.get(reference).cloned() else {
                let message = format!("Error retrieving variables: unknown variables reference {reference}");
                return (Vec::new(), vec![Notice::Output(message)]);
            };
            (runtime, rid, object_id, state.pause_epoch)
        };

        let properties = match runtime.get_properties(&rid, &object_id).await {
            Ok(properties) => properties,
            Err(e) => return (Vec::new(), self.report_failure(&e, "Error retrieving variables", false).await),
        };

        let mut state = self.lock();
        if state.pause_epoch != epoch || !state.phase.is_live() {
            return (Vec::new(), Vec::new());
        }
        let variables = properties
            .iter()
            .map(|property| format::variable(property, &mut state.variables))
            .collect();
        (variables, Vec::new())
    }

    /// Evaluates in the given frame, or globally without one. `Ok(None)` means
    /// there is nothing to evaluate against any more.
    pub async fn evaluate(&self, expression: &str, frame_id: Option<i64>) -> Result<Option<EvaluateBody>, Rejection> {
        let (runtime, rid, call_frame_id, epoch) = {
            let state = self.lock();
            let Some((runtime, rid)) = state.binding() else {
                return Ok(None);
            };
            let call_frame_id = match frame_id.filter(|id| *id > 0) {
                Some(id) => match state.frames.get(id) {
                    Some(frame) => frame.call_frame_id.clone(),
                    None => {
                        return Err(Rejection {
                            message: format!("Unknown frame id {id}"),
                            notices: Vec::new(),
                        })
                    }
                },
                None => String::new(),
            };
            (runtime, rid, call_frame_id, state.pause_epoch)
        };

        match runtime.evaluate(&rid, expression, &call_frame_id).await {
            Ok(object) => {
                let mut state = self.lock();
                if state.pause_epoch != epoch || !state.phase.is_live() {
                    return Ok(None);
                }
                Ok(Some(format::evaluate_body(&object, &mut state.variables)))
            }
            Err(e) => {
                let notices = self.report_failure(&e, "Error in evaluating expression", false).await;
                Err(Rejection {
                    message: e.to_string(),
                    notices,
                })
            }
        }
    }

    /// Shuts the session down before releasing the remote request, so results
    /// still in flight are discarded.
    pub async fn disconnect(&self, restart: bool) -> Vec<Notice> {
        let mut notices = Vec::new();
        let (cleanup, runtime, rid) = {
            let mut state = self.lock();
            let cleanup = state.apply(Input::Disconnect, None, &mut notices);
            (cleanup, state.runtime.clone(), state.request_id.clone())
        };

        if let (Some(runtime), Some(rid)) = (runtime, rid) {
            run_remote_effects(runtime.as_ref(), &rid, cleanup, restart, &mut notices).await;
        }
        notices
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

async fn launch_params(runtime: &dyn DebugRuntime, args: &LaunchArguments) -> jsdbg_bridge_core::Result<LaunchParams> {
    let database = match non_empty(args.database.as_deref()) {
        Some(name) => Some(runtime.resolve_database_id(name).await?),
        None => None,
    };
    let modules = match non_empty(args.modules.as_deref()) {
        Some(name) => Some(runtime.resolve_database_id(name).await?),
        None => None,
    };

    Ok(LaunchParams {
        script_path: args.path.clone(),
        database,
        modules,
        root: args.root.clone(),
        txn_id: args.txn_id.clone(),
    })
}

/// Issues one breakpoint batch concurrently and waits for all of it.
async fn issue(
    runtime: &dyn DebugRuntime,
    rid: &str,
    plan: Vec<(Action, BreakpointSpec, RemoteBreakpoint)>,
) -> BatchResult {
    let calls = plan.into_iter().map(|(action, spec, remote)| async move {
        let result = match action {
            Action::Add => runtime.set_breakpoint(rid, &remote).await,
            Action::Remove => runtime.remove_breakpoint(rid, &remote).await,
        };
        (action, spec, result)
    });
    join_all(calls).await
}

async fn run_remote_effects(
    runtime: &dyn DebugRuntime,
    rid: &str,
    effects: Vec<Effect>,
    restart: bool,
    notices: &mut Vec<Notice>,
) {
    for effect in effects {
        match effect {
            Effect::TerminateRemote => {
                if let Err(e) = runtime.terminate(rid).await {
                    tracing::warn!("Failed to terminate request {}: {}", rid, e);
                    notices.push(Notice::Output(format!("Error terminating request: {e}")));
                }
            }
            Effect::DetachRemote => match runtime.detach(rid).await {
                Ok(()) if restart => notices.push(Notice::Output(
                    "Restart is not supported for attach, please attach to a new request".to_string(),
                )),
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!("Failed to detach from request {}: {}", rid, e);
                    notices.push(Notice::Output(format!("Error disconnecting request: {e}")));
                }
            },
            _ => {}
        }
    }
}

fn stop_reason(command: ControlCommand) -> StopReason {
    match command {
        ControlCommand::Pause => StopReason::Pause,
        ControlCommand::Resume => StopReason::Breakpoint,
        ControlCommand::StepOver | ControlCommand::StepInto | ControlCommand::StepOut => StopReason::Step,
    }
}
