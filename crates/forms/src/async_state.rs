//! Async Render Controller.
//!
//! Drives idle → pending → success | error for one long-running request,
//! independent of what the request does. A dispatch hands out a single-use
//! [`Ticket`]; only the holder of the current ticket can settle the request,
//! so a response arriving after `abandon()` or `reset()` is ignored.
//!
//! The progress ticker is decorative. It is owned by the `Pending` state and
//! aborted when that state is left, whatever the outcome.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::schema::ProgressConfig;

static NEXT_TICKET: AtomicU64 = AtomicU64::new(1);

const MIN_TICK: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Pending,
    Success,
    Error,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ControllerError {
    #[error("a request is already in flight")]
    Busy,

    #[error("request already settled; reset first")]
    NotIdle,

    #[error("progress can only be reported while pending")]
    NotPending,
}

/// Proof of dispatch. Consumed by `settle`.
#[derive(Debug)]
pub struct Ticket {
    id: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Applied,
    /// The ticket no longer belongs to the active request.
    Stale,
}

/// Periodically rotates the progress text. Aborted on drop.
#[derive(Debug)]
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    /// Returns `None` outside a tokio runtime; the first phrase then stays put.
    fn spawn(phrases: Vec<String>, interval: Duration, text: Arc<Mutex<String>>) -> Option<Self> {
        let runtime = tokio::runtime::Handle::try_current().ok()?;
        if phrases.len() < 2 {
            return None;
        }
        let period = interval.max(MIN_TICK);
        let handle = runtime.spawn(async move {
            let mut ticks = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            let mut index = 0;
            loop {
                ticks.tick().await;
                index = (index + 1) % phrases.len();
                *text.lock().unwrap_or_else(PoisonError::into_inner) = phrases[index].clone();
            }
        });
        Some(Self { handle })
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[derive(Debug)]
pub struct Pending {
    text: Arc<Mutex<String>>,
    _ticker: Option<ProgressTicker>,
}

impl Pending {
    pub fn progress(&self) -> String {
        self.text
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[cfg(test)]
    pub(crate) fn text_handle(&self) -> std::sync::Weak<Mutex<String>> {
        Arc::downgrade(&self.text)
    }
}

#[derive(Debug)]
pub enum AsyncState<T> {
    Idle,
    Pending(Pending),
    Success(T),
    Error(String),
}

impl<T> AsyncState<T> {
    pub fn phase(&self) -> Phase {
        match self {
            AsyncState::Idle => Phase::Idle,
            AsyncState::Pending(_) => Phase::Pending,
            AsyncState::Success(_) => Phase::Success,
            AsyncState::Error(_) => Phase::Error,
        }
    }
}

/// Owned by exactly one flow. Never shared.
#[derive(Debug)]
pub struct AsyncRequest<T> {
    state: AsyncState<T>,
    active: Option<u64>,
}

impl<T> Default for AsyncRequest<T> {
    fn default() -> Self {
        Self {
            state: AsyncState::Idle,
            active: None,
        }
    }
}

impl<T> AsyncRequest<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &AsyncState<T> {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn result(&self) -> Option<&T> {
        match &self.state {
            AsyncState::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            AsyncState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    pub fn progress(&self) -> Option<String> {
        match &self.state {
            AsyncState::Pending(p) => Some(p.progress()),
            _ => None,
        }
    }

    fn ensure_idle(&self) -> Result<(), ControllerError> {
        match self.phase() {
            Phase::Idle => Ok(()),
            Phase::Pending => Err(ControllerError::Busy),
            Phase::Success | Phase::Error => Err(ControllerError::NotIdle),
        }
    }

    fn enter_pending(&mut self, text: Arc<Mutex<String>>, ticker: Option<ProgressTicker>) -> Ticket {
        let id = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);
        self.active = Some(id);
        self.state = AsyncState::Pending(Pending {
            text,
            _ticker: ticker,
        });
        Ticket { id }
    }

    /// Idle → Pending with empty progress text.
    pub fn begin(&mut self) -> Result<Ticket, ControllerError> {
        self.ensure_idle()?;
        Ok(self.enter_pending(Arc::new(Mutex::new(String::new())), None))
    }

    /// Idle → Pending with a rotating progress phrase.
    pub fn begin_with_ticker(&mut self, config: &ProgressConfig) -> Result<Ticket, ControllerError> {
        self.ensure_idle()?;
        let first = config.phrases.first().cloned().unwrap_or_default();
        let text = Arc::new(Mutex::new(first));
        let ticker = ProgressTicker::spawn(config.phrases.clone(), config.interval, text.clone());
        Ok(self.enter_pending(text, ticker))
    }

    pub fn set_progress(&mut self, text: impl Into<String>) -> Result<(), ControllerError> {
        match &self.state {
            AsyncState::Pending(p) => {
                *p.text.lock().unwrap_or_else(PoisonError::into_inner) = text.into();
                Ok(())
            }
            _ => Err(ControllerError::NotPending),
        }
    }

    /// Pending → Success | Error. Dropping the pending state stops its ticker.
    pub fn settle(&mut self, ticket: Ticket, outcome: Result<T, String>) -> Settle {
        if self.active != Some(ticket.id) || self.phase() != Phase::Pending {
            debug!(ticket = ticket.id, "ignoring stale response");
            return Settle::Stale;
        }
        self.active = None;
        self.state = match outcome {
            Ok(value) => AsyncState::Success(value),
            Err(message) => AsyncState::Error(message),
        };
        Settle::Applied
    }

    /// Success | Error → Idle. Not allowed while a request is in flight.
    pub fn reset(&mut self) -> Result<(), ControllerError> {
        if self.phase() == Phase::Pending {
            return Err(ControllerError::Busy);
        }
        self.state = AsyncState::Idle;
        Ok(())
    }

    /// The owner went away. Any outstanding ticket becomes stale.
    pub fn abandon(&mut self) {
        self.active = None;
        self.state = AsyncState::Idle;
    }
}
