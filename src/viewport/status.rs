use crate::viewport::handle::{StateHandle, TransitionHandle};
use std::fmt;

/// What the viewport is doing with the camera
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewportStatus {
    /// Nobody owns the camera
    #[default]
    Idle,
    /// A state owns the camera
    InState(StateHandle),
    /// A transition is running towards `to`
    Transitioning {
        transition: TransitionHandle,
        from: Option<StateHandle>,
        to: StateHandle,
    },
}

impl ViewportStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, ViewportStatus::Idle)
    }

    /// The state that owns the camera, if any
    pub fn state(&self) -> Option<&StateHandle> {
        match self {
            ViewportStatus::InState(state) => Some(state),
            _ => None,
        }
    }

    /// The state owning the camera, or the state being transitioned to
    pub fn target(&self) -> Option<&StateHandle> {
        match self {
            ViewportStatus::Idle => None,
            ViewportStatus::InState(state) => Some(state),
            ViewportStatus::Transitioning { to, .. } => Some(to),
        }
    }

    /// True if `state` is owning or being transitioned to
    pub fn references(&self, state: &StateHandle) -> bool {
        self.target() == Some(state)
    }
}

impl fmt::Display for ViewportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportStatus::Idle => write!(f, "idle"),
            ViewportStatus::InState(state) => write!(f, "state({})", state.id()),
            ViewportStatus::Transitioning {
                transition,
                from,
                to,
            } => match from {
                Some(from) => write!(f, "{}({} -> {})", transition.id(), from.id(), to.id()),
                None => write!(f, "{}(idle -> {})", transition.id(), to.id()),
            },
        }
    }
}

/// Why the status changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewportStatusChangeReason {
    IdleRequested,
    TransitionStarted,
    TransitionSucceeded,
    TransitionFailed,
    UserInteraction,
}

/// Notified after the status has changed, on a later main-queue drain
pub trait ViewportStatusObserver {
    fn viewport_status_did_change(
        &self,
        from: &ViewportStatus,
        to: &ViewportStatus,
        reason: ViewportStatusChangeReason,
    );
}

impl<F> ViewportStatusObserver for F
where
    F: Fn(&ViewportStatus, &ViewportStatus, ViewportStatusChangeReason),
{
    fn viewport_status_did_change(
        &self,
        from: &ViewportStatus,
        to: &ViewportStatus,
        reason: ViewportStatusChangeReason,
    ) {
        self(from, to, reason)
    }
}
