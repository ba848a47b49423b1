use carpredict::utils::logger;
use carpredict::{
    build_estimator, CarPredictError, CliConfig, EstimationRequester, FormField, NoticeKind,
    PredictorPage, Settings,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let settings = match Settings::resolve(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            // Logging is not set up yet; the config decides its format.
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.exit_code());
        }
    };

    if settings.json_logs {
        logger::init_json_logger(settings.verbose);
    } else {
        logger::init_cli_logger(settings.verbose);
    }

    tracing::info!("Starting carpredict CLI");
    if settings.verbose {
        tracing::debug!("Settings: {:?}", settings);
    }

    if let Err(e) = run(&cli, &settings).await {
        tracing::error!("❌ Prediction failed: {}", e);
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(e.exit_code());
    }

    Ok(())
}

async fn run(cli: &CliConfig, settings: &Settings) -> Result<(), CarPredictError> {
    if settings.endpoint.is_none() && !cli.demo {
        return Err(CarPredictError::ConfigError {
            message: "no estimator endpoint; pass --endpoint, set it in --config, or use --demo"
                .to_string(),
        });
    }

    let estimator = build_estimator(settings, cli.demo)?;
    let requester = EstimationRequester::new(estimator).with_timeout(settings.timeout);
    let mut page = PredictorPage::new(requester);
    cli.apply_to(page.form_mut())?;

    for (field, value) in page.form().fields() {
        tracing::debug!("{:>16}: {}", field.label(), value);
    }

    let mut notices = page.subscribe_notices();
    let toast = tokio::spawn(async move {
        if let Ok(notice) = notices.recv().await {
            match notice.kind {
                NoticeKind::Success => tracing::info!("🔔 {}: {}", notice.title, notice.description),
                NoticeKind::Error => tracing::warn!("🔔 {}: {}", notice.title, notice.description),
            }
        }
    });

    let outcome = page.predict().await;
    match &outcome {
        // Rejected calls never settle, so no notice is coming.
        Err(CarPredictError::Busy) => toast.abort(),
        _ => {
            let _ = toast.await;
        }
    }

    let estimate = outcome?;
    let make = page.form().value(FormField::Make);
    let model = page.form().value(FormField::Model);
    println!("Estimated Price");
    println!("{}", estimate.display_price());
    if !make.is_empty() || !model.is_empty() {
        println!("for {} {}", make, model);
    }
    if let Some(confidence) = estimate.confidence {
        println!("confidence: {:.0}%", confidence * 100.0);
    }

    Ok(())
}
