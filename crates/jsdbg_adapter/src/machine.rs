//! Session lifecycle as a pure transition function.
//!
//! `step` decides the next phase and the side effects for one input; the
//! session applies them. Keeping it free of I/O makes the fatal/non-fatal
//! rules testable on their own.

use crate::classify::ErrorClass;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Launched,
    Attached,
    Shutdown,
}

impl Phase {
    /// A remote request is bound and the session still talks to it.
    pub fn is_live(self) -> bool {
        matches!(self, Self::Launched | Self::Attached)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// The engine accepted a launch and returned a request id.
    Launched,
    /// A paused request was bound.
    Attached,
    /// A pause wait returned a fresh stack snapshot.
    Paused,
    /// A remote call failed. `fatal` is the caller's verdict for faults.
    Failed { class: ErrorClass, fatal: bool },
    Disconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    ResetHandles,
    EmitTerminated,
    TraceRequestEnded,
    TraceFault,
    TerminateRemote,
    DetachRemote,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub phase: Phase,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(phase: Phase, effects: &[Effect]) -> Self {
        Self {
            phase,
            effects: effects.to_vec(),
        }
    }
}

pub fn step(phase: Phase, input: Input) -> Transition {
    use Effect::*;

    match (phase, input) {
        (Phase::Idle, Input::Launched) => Transition::to(Phase::Launched, &[]),
        (Phase::Idle, Input::Attached) => Transition::to(Phase::Attached, &[]),
        // The frontend disconnected while the launch was in flight.
        (Phase::Shutdown, Input::Launched) => Transition::to(Phase::Shutdown, &[TerminateRemote]),
        (Phase::Shutdown, Input::Attached) => Transition::to(Phase::Shutdown, &[DetachRemote]),
        (_, Input::Launched | Input::Attached) => Transition::to(phase, &[]),

        (Phase::Launched | Phase::Attached, Input::Paused) => Transition::to(phase, &[ResetHandles]),
        (_, Input::Paused) => Transition::to(phase, &[]),

        // After shutdown, late failures are of no interest.
        (Phase::Shutdown, Input::Failed { .. }) => Transition::to(Phase::Shutdown, &[]),
        (_, Input::Failed { class: ErrorClass::RequestEnded, .. }) => {
            Transition::to(Phase::Shutdown, &[TraceRequestEnded, EmitTerminated])
        }
        // The request is still alive on the engine; release it on the way out.
        (Phase::Launched, Input::Failed { class: ErrorClass::Fault, fatal: true }) => {
            Transition::to(Phase::Shutdown, &[TraceFault, EmitTerminated, TerminateRemote])
        }
        (Phase::Attached, Input::Failed { class: ErrorClass::Fault, fatal: true }) => {
            Transition::to(Phase::Shutdown, &[TraceFault, EmitTerminated, DetachRemote])
        }
        (_, Input::Failed { class: ErrorClass::Fault, fatal: true }) => {
            Transition::to(Phase::Shutdown, &[TraceFault, EmitTerminated])
        }
        (_, Input::Failed { class: ErrorClass::Fault, fatal: false }) => Transition::to(phase, &[TraceFault]),

        (Phase::Launched, Input::Disconnect) => Transition::to(Phase::Shutdown, &[TerminateRemote]),
        (Phase::Attached, Input::Disconnect) => Transition::to(Phase::Shutdown, &[DetachRemote]),
        (_, Input::Disconnect) => Transition::to(Phase::Shutdown, &[]),
    }
}
