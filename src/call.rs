//! [`Call`] — the per-request lifecycle and cancellation state machine
//! (spec §4.2, §3 "Call").
//!
//! Generalized from the teacher's `ChatStreamHandle` cancellation primitive
//! (`utils/cancel.rs`, now removed) into a one-shot execute/cancel state
//! machine that owns an assembled interceptor chain and transport rather
//! than a streaming handle.

use std::sync::Arc;
use std::sync::Mutex;

use crate::error::ClientError;
use crate::interceptor::{Chain, Interceptor};
use crate::model::{Request, Response};
use crate::transport::Transport;

/// Lifecycle states (spec §3). Legal transitions: `idle` → `running`,
/// `running` → `completed`, any state → `cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// A one-shot handle to execute a request through an assembled interceptor
/// chain and transport. `execute` fails fast on a second invocation;
/// `cancel` is idempotent and observable via [`Call::is_cancelled`] before
/// the chain is entered.
pub struct Call {
    request: Request,
    interceptors: Vec<Arc<dyn Interceptor>>,
    transport: Arc<dyn Transport>,
    state: Mutex<CallState>,
}

impl Call {
    pub fn new(request: Request, interceptors: Vec<Arc<dyn Interceptor>>, transport: Arc<dyn Transport>) -> Self {
        Self {
            request,
            interceptors,
            transport,
            state: Mutex::new(CallState::Idle),
        }
    }

    pub fn state(&self) -> CallState {
        *self.state.lock().unwrap()
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.state(), CallState::Cancelled)
    }

    /// Idempotent one-way transition to `cancelled`.
    pub fn cancel(&self) {
        let mut state = self.state.lock().unwrap();
        if *state != CallState::Cancelled {
            *state = CallState::Cancelled;
        }
    }

    /// Executes the request through the interceptor chain. Fails fast with
    /// [`ClientError::Cancelled`] if cancelled before starting, or
    /// [`ClientError::AlreadyExecuted`] if called a second time.
    pub async fn execute(&self) -> Result<Response, ClientError> {
        {
            let mut state = self.state.lock().unwrap();
            match *state {
                CallState::Cancelled => return Err(ClientError::Cancelled),
                CallState::Running | CallState::Completed => return Err(ClientError::AlreadyExecuted),
                CallState::Idle => *state = CallState::Running,
            }
        }

        let result = Chain::execute(self.request.clone(), &self.interceptors, self.transport.as_ref()).await;

        let mut state = self.state.lock().unwrap();
        if *state != CallState::Cancelled {
            *state = CallState::Completed;
        }
        result
    }
}
