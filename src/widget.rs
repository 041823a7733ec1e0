//! Per-widget fetch state with request tokens.
//!
//! A widget owns one [`Widget<T>`]. Starting a fetch issues a fresh [`RequestToken`];
//! only the response carrying the latest token is applied, so overlapping fetches
//! triggered by rapid user actions cannot overwrite a newer result with an older one.

use crate::error::Error;
use log::debug;

/// Identifies one fetch issued by a widget. Tokens only ever grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Loadable<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Failed(Error),
}

impl<T> Loadable<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Loadable::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Loadable::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Loadable::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Widget<T> {
    state: Loadable<T>,
    latest: u64,
    pending: bool,
}

impl<T> Default for Widget<T> {
    fn default() -> Self {
        Self {
            state: Loadable::Idle,
            latest: 0,
            pending: false,
        }
    }
}

impl<T> Widget<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Loadable<T> {
        &self.state
    }

    /// Enter `Loading` and hand out the token the response must carry.
    pub fn begin(&mut self) -> RequestToken {
        self.latest += 1;
        self.pending = true;
        self.state = Loadable::Loading;
        RequestToken(self.latest)
    }

    /// Apply a response. Returns `false` (and leaves the state alone) for a stale token.
    pub fn finish(&mut self, token: RequestToken, result: Result<T, Error>) -> bool {
        if !self.pending || token.0 != self.latest {
            debug!(
                "discarding stale response #{} (latest #{})",
                token.0, self.latest
            );
            return false;
        }
        self.pending = false;
        self.state = match result {
            Ok(v) => Loadable::Success(v),
            Err(e) => Loadable::Failed(e),
        };
        true
    }

    /// Fail without a request, e.g. when input validation rejects the action.
    pub fn fail(&mut self, error: Error) {
        self.latest += 1;
        self.pending = false;
        self.state = Loadable::Failed(error);
    }

    /// Back to `Idle`; any response still in flight becomes stale.
    pub fn reset(&mut self) {
        self.latest += 1;
        self.pending = false;
        self.state = Loadable::Idle;
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.pending && token.0 == self.latest
    }
}
