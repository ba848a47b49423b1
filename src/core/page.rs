use crate::core::form::FormState;
use crate::core::requester::{EstimationRequester, Notice, RequesterState};
use crate::domain::model::{Estimate, FormField};
use crate::utils::error::{EstimationResult, Result};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};

/// Everything the prediction section of the page needs: the form, the busy
/// flag, the result slot and the three user actions.
#[derive(Debug)]
pub struct PredictorPage {
    form: FormState,
    requester: Arc<EstimationRequester>,
}

impl PredictorPage {
    pub fn new(requester: EstimationRequester) -> Self {
        Self::with_shared(Arc::new(requester))
    }

    pub fn with_shared(requester: Arc<EstimationRequester>) -> Self {
        Self {
            form: FormState::new(),
            requester,
        }
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        self.form.set_field(field, value);
    }

    pub fn set_field_by_name(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        self.form.set_field_by_name(name, value)
    }

    pub fn load_sample(&mut self) {
        self.form.load_sample();
    }

    pub fn is_busy(&self) -> bool {
        self.requester.is_busy()
    }

    pub fn result(&self) -> Option<EstimationResult> {
        self.requester.latest()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<RequesterState> {
        self.requester.subscribe_state()
    }

    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.requester.subscribe_notices()
    }

    /// Snapshot the form now and estimate it.
    ///
    /// The returned future owns its snapshot, so the form can keep changing
    /// while it runs.
    pub fn predict(&self) -> impl Future<Output = Result<Estimate>> + Send + 'static {
        let requester = Arc::clone(&self.requester);
        let query = self.form.snapshot();
        async move { requester.predict(query).await }
    }
}
