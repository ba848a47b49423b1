use async_trait::async_trait;
use carpredict::{
    CarPredictError, Estimate, EstimationRequester, Estimator, EstimatorFailure, FormField,
    PredictorPage, VehicleQuery,
};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Semaphore};

/// Returns the same answer every time and remembers what it was asked.
struct StubEstimator {
    answer: Result<Estimate, EstimatorFailure>,
    seen: Mutex<Vec<VehicleQuery>>,
}

impl StubEstimator {
    fn pricing(price: f64) -> Self {
        Self {
            answer: Estimate::new(price),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn failing(failure: EstimatorFailure) -> Self {
        Self {
            answer: Err(failure),
            seen: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Estimator for StubEstimator {
    async fn estimate(&self, query: &VehicleQuery) -> Result<Estimate, EstimatorFailure> {
        self.seen.lock().unwrap().push(query.clone());
        self.answer.clone()
    }

    fn name(&self) -> &str {
        "stub"
    }
}

/// Switches from success to failure after the first call.
struct FlakyEstimator {
    calls: Mutex<u32>,
}

#[async_trait]
impl Estimator for FlakyEstimator {
    async fn estimate(&self, _query: &VehicleQuery) -> Result<Estimate, EstimatorFailure> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if *calls == 1 {
            Estimate::new(21500.0)
        } else {
            Err(EstimatorFailure::network("simulated network error"))
        }
    }

    fn name(&self) -> &str {
        "flaky"
    }
}

/// Blocks until released so the form can be edited mid-call.
struct HeldEstimator {
    started: mpsc::UnboundedSender<VehicleQuery>,
    release: Arc<Semaphore>,
}

#[async_trait]
impl Estimator for HeldEstimator {
    async fn estimate(&self, query: &VehicleQuery) -> Result<Estimate, EstimatorFailure> {
        let _ = self.started.send(query.clone());
        self.release
            .acquire()
            .await
            .map_err(|_| EstimatorFailure::network("closed"))?
            .forget();
        Estimate::new(21500.0)
    }

    fn name(&self) -> &str {
        "held"
    }
}

#[tokio::test]
async fn test_filled_form_settles_with_stub_price() -> anyhow::Result<()> {
    let stub = Arc::new(StubEstimator::pricing(21500.0));
    let mut page = PredictorPage::new(EstimationRequester::new(stub.clone()));

    for (name, value) in [
        ("make", "Toyota"),
        ("model", "Camry"),
        ("year", "2018"),
        ("mileage", "45000"),
        ("fuelType", "Gasoline"),
        ("transmission", "Automatic"),
        ("bodyType", "Sedan"),
        ("engineSize", "2.5"),
        ("horsepower", "203"),
    ] {
        page.set_field_by_name(name, value)?;
    }

    let estimate = page.predict().await?;

    assert_eq!(estimate.price, 21500.0);
    assert_eq!(estimate.display_price(), "$21,500");
    assert!(!page.is_busy());
    assert_eq!(page.result(), Some(Ok(estimate)));
    assert_eq!(stub.seen.lock().unwrap().as_slice(), &[VehicleQuery::sample()]);
    Ok(())
}

#[tokio::test]
async fn test_network_failure_replaces_previous_success() {
    let mut page = PredictorPage::new(EstimationRequester::new(Arc::new(FlakyEstimator {
        calls: Mutex::new(0),
    })));
    page.load_sample();

    page.predict().await.unwrap();
    assert!(matches!(page.result(), Some(Ok(_))));

    let second = page.predict().await;
    assert!(matches!(
        second,
        Err(CarPredictError::Estimator(EstimatorFailure::Network { .. }))
    ));
    assert!(!page.is_busy());
    assert_eq!(
        page.result(),
        Some(Err(EstimatorFailure::network("simulated network error")))
    );
}

#[tokio::test]
async fn test_failing_estimator_from_idle() {
    let page = PredictorPage::new(EstimationRequester::new(Arc::new(
        StubEstimator::failing(EstimatorFailure::network("no route to host")),
    )));

    assert_eq!(page.result(), None);
    assert!(page.predict().await.is_err());
    assert!(!page.is_busy());
    assert!(matches!(page.result(), Some(Err(EstimatorFailure::Network { .. }))));
}

#[tokio::test]
async fn test_edits_during_flight_do_not_reach_estimator() {
    let (started, mut seen) = mpsc::unbounded_channel();
    let release = Arc::new(Semaphore::new(0));
    let mut page = PredictorPage::new(EstimationRequester::new(Arc::new(HeldEstimator {
        started,
        release: Arc::clone(&release),
    })));
    page.load_sample();

    let call = tokio::spawn(page.predict());
    let in_flight_query = seen.recv().await.unwrap();
    assert!(page.is_busy());

    page.set_field(FormField::Make, "BMW");
    page.set_field(FormField::Mileage, "999999");
    // Triggering again from the page is refused while the first call runs.
    assert!(matches!(page.predict().await, Err(CarPredictError::Busy)));

    release.add_permits(1);
    call.await.unwrap().unwrap();

    assert_eq!(in_flight_query, VehicleQuery::sample());
    assert_eq!(page.form().value(FormField::Make), "BMW");
    assert!(!page.is_busy());
}

#[tokio::test]
async fn test_load_sample_overrides_prior_edits() {
    let mut page = PredictorPage::new(EstimationRequester::new(Arc::new(
        StubEstimator::pricing(1.0),
    )));
    page.set_field(FormField::Model, "Mustang");
    page.set_field(FormField::Horsepower, "450");
    page.load_sample();

    assert_eq!(page.form().snapshot(), VehicleQuery::sample());
    assert!(page.set_field_by_name("trim", "XLE").is_err());
}
