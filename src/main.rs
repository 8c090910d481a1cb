use std::process::ExitCode;
use std::sync::Arc;

pub mod backend;
use backend::BackendClient;
pub mod config;
use config::app_config::{AppConfig, load_config, setup_backend_client, setup_http_client};
pub mod error;
use error::{AppError, report};
pub mod http_probe;
use http_probe::prelude::*;
use http_probe::result::NO_RESPONSE;

const MAX_LABEL_WIDTH: usize = 60;

fn to_fixed_width(input: &str, width: usize) -> String {
    use unicode_truncate::UnicodeTruncateStr;

    let (truncated, _) = input.unicode_truncate(width);
    format!("{:<width$}", truncated, width = width)
}

fn status_line(label: &str, status: &StatusRecord) -> String {
    if status.is_up {
        format!(
            "[{label}] ✅ Status: {}, Response: {}ms, Page load: {}ms, Page size: {}KB",
            status.status_code, status.response_time_ms, status.page_load_ms, status.page_size_kb
        )
    } else if status.status_code == NO_RESPONSE {
        format!("[{label}] ❌ Unreachable after {}ms", status.response_time_ms)
    } else {
        format!(
            "[{label}] ❌ Unexpected status: {}, Response: {}ms",
            status.status_code, status.response_time_ms
        )
    }
}

fn print_summary(sites: &[Site], statuses: &[StatusRecord]) {
    let width = sites
        .iter()
        .map(|site| site.url.chars().count())
        .max()
        .unwrap_or(10)
        .min(MAX_LABEL_WIDTH);

    for (site, status) in sites.iter().zip(statuses) {
        println!("{}", status_line(&to_fixed_width(&site.url, width), status));
    }
}

async fn run(config: AppConfig) -> Result<usize, AppError> {
    let backend_client = setup_backend_client(&config.probe).map_err(AppError::Client)?;
    let backend = BackendClient::new(backend_client, &config.backend_url);

    let token = backend
        .authenticate(&config.credentials.email, &config.credentials.password)
        .await?;
    let sites = backend.fetch_websites(&token).await?;

    let client = setup_http_client(&config.probe).map_err(AppError::Client)?;
    let measurer = HttpPageMeasurer::new(client.clone(), config.probe.measurement_timeout());
    let prober = Arc::new(SiteProber::new(client, measurer));

    let statuses = run_batch(&prober, &sites).await;
    print_summary(&sites, &statuses);

    backend.submit_statuses(&token, &statuses).await?;
    Ok(statuses.len())
}

fn finish(outcome: Result<usize, AppError>) -> ExitCode {
    match outcome {
        Ok(count) => {
            log::info!("Run complete, {} sites checked", count);
            println!("Website statuses sent successfully!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Run aborted: {}", e);
            eprintln!("{}", report(&e));
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let outcome = match load_config() {
        Ok(config) => run(config).await,
        Err(e) => Err(e.into()),
    };
    finish(outcome)
}
