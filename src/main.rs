use std::fmt::Debug;
use std::fmt::Display;

use mailchimp_ajax::configuration::get_configuration;
use mailchimp_ajax::lifecycle::activate;
use mailchimp_ajax::lifecycle::deactivate;
use mailchimp_ajax::startup::Application;
use mailchimp_ajax::telemetry::get_subscriber;
use mailchimp_ajax::telemetry::init_subscriber;
use tokio::task::JoinError;

fn report_exit(
    name: &str,
    outcome: Result<Result<(), impl Debug + Display>, JoinError>,
) {
    match outcome {
        Ok(Ok(())) => {
            tracing::info!("{name} exited gracefully")
        }

        Ok(Err(e)) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (inner)"
            )
        }

        Err(e) => {
            tracing::error!(
                error.cause_chain=?e,
                error.message=%e,
                "{name} failed (outer)"
            )
        }
    }
}

/// Initialise telemetry, load config, activate, serve; deactivate once the
/// server has stopped
#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let subscriber = get_subscriber("mailchimp-ajax", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;

    // refusing to activate means refusing to start
    let record = cfg.settings_record();
    if let Err(e) = activate(&cfg.mailchimp.constants(), &record) {
        tracing::error!(error.cause_chain = ?e, error.message = %e, "activation refused");
        return Err(e.into());
    }

    let server = Application::build(cfg).await?.run_until_stopped();
    let server_thread = tokio::spawn(server);
    report_exit("API", server_thread.await);

    deactivate(&record)?;
    Ok(())
}
