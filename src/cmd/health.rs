//! `correlator health` -- check the health of a running instance.
//!
//! Sends a `GET /health` request to the specified URL, optionally with a
//! correlation ID, and displays the response as formatted text or raw
//! JSON. The text output reports which ID the server echoed back, which
//! makes it a quick end-to-end check of the correlation layer.

use http_body_util::BodyExt;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::cli::HealthArgs;
use crate::error::CorrelatorError;
use crate::health::HealthResponse;

pub async fn execute(args: HealthArgs) -> Result<(), CorrelatorError> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let uri: hyper::Uri =
        url.parse().map_err(
            |e: hyper::http::uri::InvalidUri| CorrelatorError::UriParse {
                source: Box::new(e),
            },
        )?;

    let connector = hyper_util::client::legacy::connect::HttpConnector::new();
    let client = Client::builder(TokioExecutor::new()).build(connector);

    let mut builder = hyper::Request::builder().uri(uri);
    if let Some(ref id) = args.request_id {
        builder = builder.header(args.header_name.as_str(), id.as_str());
    }
    let req = builder
        .body(http_body_util::Full::new(bytes::Bytes::new()))
        .map_err(|e| CorrelatorError::HttpRequest {
            source: Box::new(e),
        })?;

    let response = tokio::time::timeout(std::time::Duration::from_secs(10), client.request(req))
        .await
        .map_err(|_| CorrelatorError::HttpRequest {
            source: "health check timed out after 10s".into(),
        })?
        .map_err(|e| CorrelatorError::HttpRequest {
            source: Box::new(e),
        })?;

    let status = response.status();
    let echoed: Vec<String> = response
        .headers()
        .get_all(args.header_name.as_str())
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect();
    let body = response
        .into_body()
        .collect()
        .await
        .map_err(|e| CorrelatorError::HttpRequest {
            source: Box::new(e),
        })?
        .to_bytes();

    if !status.is_success() {
        return Err(CorrelatorError::HealthCheckFailed(status));
    }

    if args.json {
        println!("{}", String::from_utf8_lossy(&body));
        return Ok(());
    }

    let body_str = String::from_utf8_lossy(&body);
    match serde_json::from_str::<HealthResponse>(&body_str) {
        Ok(health) => {
            let uptime = format_uptime(health.uptime_seconds);
            println!("\u{2713} correlator is healthy ({})", args.url);
            println!("  uptime:         {uptime}");
            println!(
                "  settings:       {} (header {})",
                health.settings.source, health.settings.header_name
            );
            println!(
                "  correlation id: {}",
                describe_echo(args.request_id.as_deref(), &echoed)
            );
            println!(
                "  requests:       {} served, {} background tasks",
                health.stats.requests, health.stats.background_tasks
            );
        }
        Err(e) => {
            eprintln!("Failed to parse health response: {e}");
            println!("{}", String::from_utf8_lossy(&body));
        }
    }

    Ok(())
}

fn describe_echo(sent: Option<&str>, echoed: &[String]) -> String {
    let Some(last) = echoed.last() else {
        return "none returned".to_string();
    };
    match sent {
        Some(sent) if sent == last => format!("{last} (echoed)"),
        Some(_) => format!("{last} (replaced)"),
        None => format!("{last} (generated)"),
    }
}

fn format_uptime(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime_formats() {
        assert_eq!(format_uptime(5), "5s");
        assert_eq!(format_uptime(65), "1m 5s");
        assert_eq!(format_uptime(3_725), "1h 2m 5s");
    }

    #[test]
    fn echo_descriptions() {
        let echoed = vec!["abc".to_string()];
        assert_eq!(describe_echo(Some("abc"), &echoed), "abc (echoed)");
        assert_eq!(describe_echo(Some("bad"), &echoed), "abc (replaced)");
        assert_eq!(describe_echo(None, &echoed), "abc (generated)");
        assert_eq!(describe_echo(None, &[]), "none returned");
    }
}
