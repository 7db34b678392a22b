//! Health check command - checks a running identd server.

use std::time::Duration;

use serde::Deserialize;

use crate::cli::HealthArgs;

#[derive(Debug, Deserialize)]
struct HealthBody {
    #[serde(default)]
    status: String,
    #[serde(default)]
    backend: String,
}

/// Normalize a base URL to the server's health endpoint
fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health check command, exiting with status 1 when unhealthy
pub async fn run(args: &HealthArgs) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    match check_health(&client, &url).await {
        Ok(body) => {
            println!("healthy: backend={}", body.backend);
            Ok(())
        }
        Err(reason) => {
            eprintln!("unhealthy: {reason}");
            std::process::exit(1);
        }
    }
}

async fn check_health(client: &reqwest::Client, url: &str) -> Result<HealthBody, String> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| format!("failed to connect to {url}: {e}"))?;

    if !response.status().is_success() {
        return Err(format!("server returned HTTP status {}", response.status()));
    }

    let body: HealthBody = response
        .json()
        .await
        .map_err(|e| format!("unreadable health response: {e}"))?;
    if body.status != "healthy" {
        return Err(format!("server returned status {:?}", body.status));
    }
    Ok(body)
}
