use crate::domain::model::{Estimate, VehicleQuery};
use crate::domain::ports::Estimator;
use crate::utils::error::{CarPredictError, EstimationResult, EstimatorFailure, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, watch};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const NOTICE_CAPACITY: usize = 16;

/// What the presentation layer renders: the busy flag and the last settled outcome.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequesterState {
    pub busy: bool,
    pub latest: Option<EstimationResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Toast-style message emitted when an estimation settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub description: String,
}

impl Notice {
    fn completed() -> Self {
        Self {
            kind: NoticeKind::Success,
            title: "Prediction Complete!".to_string(),
            description: "Your car price has been estimated successfully.".to_string(),
        }
    }

    fn failed(failure: &EstimatorFailure) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: "Prediction Failed".to_string(),
            description: failure.to_string(),
        }
    }
}

/// Runs at most one estimation at a time and keeps the latest outcome.
pub struct EstimationRequester {
    estimator: Arc<dyn Estimator>,
    timeout: Duration,
    state: watch::Sender<RequesterState>,
    notices: broadcast::Sender<Notice>,
}

impl std::fmt::Debug for EstimationRequester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EstimationRequester")
            .field("estimator", &self.estimator.name())
            .field("timeout", &self.timeout)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl EstimationRequester {
    pub fn new(estimator: Arc<dyn Estimator>) -> Self {
        let (state, _) = watch::channel(RequesterState::default());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        Self {
            estimator,
            timeout: DEFAULT_TIMEOUT,
            state,
            notices,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    /// Outcome of the most recent settled call, if any.
    pub fn latest(&self) -> Option<EstimationResult> {
        self.state.borrow().latest.clone()
    }

    pub fn state(&self) -> RequesterState {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<RequesterState> {
        self.state.subscribe()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Estimate a price for `query`.
    ///
    /// Fails with [`CarPredictError::Busy`] while another call is in flight,
    /// without disturbing that call. Every other outcome is also stored in the
    /// result slot. Dropping the returned future clears the busy flag and keeps
    /// the previous result.
    pub async fn predict(&self, query: VehicleQuery) -> Result<Estimate> {
        let mut in_flight = self.begin()?;
        let started = Instant::now();

        tracing::info!(estimator = self.estimator.name(), "requesting price estimate");
        tracing::debug!(?query, timeout = ?self.timeout, "estimation query");

        let outcome = match tokio::time::timeout(self.timeout, self.estimator.estimate(&query)).await
        {
            Ok(result) => result.and_then(Estimate::checked),
            Err(_) => Err(EstimatorFailure::Timeout {
                after: self.timeout,
            }),
        };

        match &outcome {
            Ok(estimate) => tracing::info!(
                price = estimate.price,
                elapsed = ?started.elapsed(),
                "✅ prediction complete"
            ),
            Err(failure) => tracing::warn!(
                error = %failure,
                elapsed = ?started.elapsed(),
                "❌ prediction failed"
            ),
        }

        in_flight.settle(outcome.clone());
        outcome.map_err(CarPredictError::from)
    }

    fn begin(&self) -> Result<InFlight<'_>> {
        let claimed = self.state.send_if_modified(|state| {
            if state.busy {
                false
            } else {
                state.busy = true;
                true
            }
        });

        if !claimed {
            tracing::warn!("prediction rejected: another one is still running");
            return Err(CarPredictError::Busy);
        }
        Ok(InFlight {
            requester: self,
            settled: false,
        })
    }
}

/// Holds the busy flag for one call; releases it exactly once.
struct InFlight<'a> {
    requester: &'a EstimationRequester,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(&mut self, outcome: EstimationResult) {
        let notice = match &outcome {
            Ok(_) => Notice::completed(),
            Err(failure) => Notice::failed(failure),
        };

        self.requester.state.send_modify(|state| {
            state.busy = false;
            state.latest = Some(outcome);
        });
        self.settled = true;

        // No subscribers is fine.
        let _ = self.requester.notices.send(notice);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::info!("prediction cancelled; keeping previous result");
            self.requester.state.send_modify(|state| state.busy = false);
        }
    }
}
