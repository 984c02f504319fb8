//! Confirmation dialog state machine shared by every modal flow.
//!
//! ```text
//! closed -> open -> submitting -> closed
//!                              -> open (with error) -> submitting ...
//! ```
//!
//! The target travels inside the [`SubmitTicket`], so an outcome is always
//! applied to the target that was confirmed. Reopening the dialog starts a
//! new session and any ticket from an older session resolves as
//! [`Resolution::Stale`].

use tracing::debug;

/// Coarse dialog phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    /// Hidden.
    Closed,
    /// Visible and awaiting confirmation.
    Open,
    /// Confirmed; one request in flight.
    Submitting,
}

/// Confirm button rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Clickable.
    Enabled,
    /// Disabled with a spinner.
    Busy,
}

/// Proof that the dialog was confirmed for a specific target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitTicket<T> {
    session: u64,
    target: T,
}

impl<T> SubmitTicket<T> {
    /// Target the request must act on.
    pub const fn target(&self) -> &T {
        &self.target
    }
}

/// Result of applying an outcome to the dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Success; the dialog closed.
    Closed {
        /// Target the request acted on.
        target: T,
    },
    /// Failure; the dialog stays open with an inline error.
    Failed {
        /// Target the request acted on.
        target: T,
        /// Inline error text.
        error: String,
    },
    /// The ticket belongs to a session that no longer exists.
    Stale,
}

#[derive(Debug, Clone)]
enum State<T> {
    Closed,
    Open { target: T, error: Option<String> },
    Submitting { target: T },
}

/// Dialog controller generic over its target.
#[derive(Debug, Clone)]
pub struct ModalController<T> {
    session: u64,
    state: State<T>,
}

impl<T> Default for ModalController<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ModalController<T> {
    /// Closed dialog.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: 0,
            state: State::Closed,
        }
    }

    /// Show the dialog for `target`, discarding any previous target, error
    /// or in-flight ticket.
    pub fn open(&mut self, target: T) {
        self.session += 1;
        self.state = State::Open {
            target,
            error: None,
        };
    }

    /// Hide the dialog and clear its error. Ignored while submitting; returns
    /// whether the dialog closed.
    pub fn hide(&mut self) -> bool {
        match self.state {
            State::Submitting { .. } => false,
            State::Open { .. } | State::Closed => {
                self.state = State::Closed;
                true
            }
        }
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> ModalPhase {
        match self.state {
            State::Closed => ModalPhase::Closed,
            State::Open { .. } => ModalPhase::Open,
            State::Submitting { .. } => ModalPhase::Submitting,
        }
    }

    /// Confirm button rendering.
    #[must_use]
    pub const fn button(&self) -> ButtonState {
        match self.state {
            State::Submitting { .. } => ButtonState::Busy,
            State::Closed | State::Open { .. } => ButtonState::Enabled,
        }
    }

    /// Target shown in the dialog.
    #[must_use]
    pub const fn target(&self) -> Option<&T> {
        match &self.state {
            State::Closed => None,
            State::Open { target, .. } | State::Submitting { target } => Some(target),
        }
    }

    /// Inline error, if the last attempt failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            State::Open { error, .. } => error.as_deref(),
            State::Closed | State::Submitting { .. } => None,
        }
    }

    /// Identifier of the current session.
    #[must_use]
    pub const fn session(&self) -> u64 {
        self.session
    }
}

impl<T: Clone> ModalController<T> {
    /// Confirm the dialog. Returns `None` unless it is open and idle, so at
    /// most one request is ever in flight.
    pub fn submit(&mut self) -> Option<SubmitTicket<T>> {
        let State::Open { target, .. } = &self.state else {
            return None;
        };
        let target = target.clone();
        self.state = State::Submitting {
            target: target.clone(),
        };
        Some(SubmitTicket {
            session: self.session,
            target,
        })
    }

    /// Apply the outcome of the request started by `ticket`.
    pub fn resolve(
        &mut self,
        ticket: SubmitTicket<T>,
        outcome: Result<(), String>,
    ) -> Resolution<T> {
        if ticket.session != self.session || !matches!(self.state, State::Submitting { .. }) {
            debug!(
                ticket_session = ticket.session,
                session = self.session,
                "stale dialog outcome ignored"
            );
            return Resolution::Stale;
        }
        match outcome {
            Ok(()) => {
                self.state = State::Closed;
                Resolution::Closed {
                    target: ticket.target,
                }
            }
            Err(error) => {
                self.state = State::Open {
                    target: ticket.target.clone(),
                    error: Some(error.clone()),
                };
                Resolution::Failed {
                    target: ticket.target,
                    error,
                }
            }
        }
    }
}
