//! Thin HTTP helpers shared by the subcommands.

use anyhow::Context;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9835";

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

fn url(endpoint: &str, path: &str) -> String {
    format!("{}/api/v1/{}", endpoint.trim_end_matches('/'), path)
}

/// POST `body` as JSON and decode the JSON reply.
pub async fn post<B, R>(endpoint: &str, path: &str, body: &B) -> anyhow::Result<R>
where
    B: Serialize,
    R: DeserializeOwned,
{
    let url = url(endpoint, path);
    tracing::debug!(%url, "POST");
    let resp = reqwest::Client::new()
        .post(&url)
        .json(body)
        .send()
        .await
        .with_context(|| unreachable_hint(endpoint))?;
    decode(path, resp).await
}

/// GET `path` with the given query pairs and decode the JSON reply.
pub async fn get<R>(endpoint: &str, path: &str, query: &[(&str, &str)]) -> anyhow::Result<R>
where
    R: DeserializeOwned,
{
    let url = url(endpoint, path);
    tracing::debug!(%url, "GET");
    let resp = reqwest::Client::new()
        .get(&url)
        .query(query)
        .send()
        .await
        .with_context(|| unreachable_hint(endpoint))?;
    decode(path, resp).await
}

async fn decode<R: DeserializeOwned>(path: &str, resp: reqwest::Response) -> anyhow::Result<R> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }
    if let Ok(err) = resp.json::<ErrorResponse>().await {
        anyhow::bail!("{} failed (HTTP {}): {}", path, status, err.error);
    } else {
        anyhow::bail!("{} failed (HTTP {})", path, status);
    }
}

fn unreachable_hint(endpoint: &str) -> String {
    format!("could not reach node at {endpoint}; is routewise-node running?")
}

/// Print a reply as indented JSON.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
