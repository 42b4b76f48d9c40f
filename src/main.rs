use stale_green_ci::config::BotConfig;
use stale_green_ci::github::OctocrabClient;
use stale_green_ci::policy::StaleGreenCi;
use stale_green_ci::sweep::run_sweep;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stale_green_ci=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(?config, "starting");

    let client = OctocrabClient::from_token(config.github_token.clone(), config.repo.clone())?
        .with_pending_wait(config.pending_wait);
    let policy = StaleGreenCi::new(config.identity.clone(), config.labels.clone());

    let mut interval = tokio::time::interval(config.poll_interval);
    loop {
        tokio::select! {
            _ = interval.tick() => {
                if let Err(e) = run_sweep(&client, &policy, &config.required_contexts).await {
                    tracing::error!(error = %e, "sweep failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}
