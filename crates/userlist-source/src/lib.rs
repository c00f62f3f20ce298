// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use reqwest::StatusCode;
use reqwest::blocking::Client as HttpClient;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use url::Url;
use userlist_app::{LoadError, User, UserId};

pub const DEFAULT_ENDPOINT: &str = "https://jsonplaceholder.typicode.com/users";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct Client {
    endpoint: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.trim();
        if endpoint.is_empty() {
            bail!("source.endpoint must not be empty");
        }
        validate_endpoint(endpoint)?;

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            endpoint: endpoint.to_owned(),
            timeout,
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fetches every user the endpoint lists, in the order received.
    pub fn fetch_all_users(&self) -> Result<Vec<User>, LoadError> {
        tracing::info!(endpoint = %self.endpoint, "fetching users");

        let response = self
            .http
            .get(&self.endpoint)
            .header(ACCEPT, "application/json")
            .send()
            .map_err(|error| connection_error(&self.endpoint, self.timeout, &error))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            let error = status_error(&self.endpoint, status, &body);
            tracing::warn!(status = status.as_u16(), "user list request rejected");
            return Err(error);
        }

        let body = response.text().map_err(|error| {
            LoadError::network(&self.endpoint, format!("read response body: {error}"))
        })?;
        let users = decode_users(&self.endpoint, &body).inspect_err(|error| {
            tracing::warn!(%error, "user list did not decode");
        })?;

        tracing::info!(count = users.len(), "fetched users");
        Ok(users)
    }
}

/// Accepts absolute `http` and `https` URLs only.
pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    let parsed = Url::parse(endpoint)
        .with_context(|| format!("source.endpoint {endpoint:?} is not a valid URL"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => bail!(
            "source.endpoint {endpoint:?} uses unsupported scheme {other:?}; use http or https"
        ),
    }
}

/// Decodes a JSON array of user records. Unknown fields are ignored.
pub fn decode_users(endpoint: &str, body: &str) -> Result<Vec<User>, LoadError> {
    let records: Vec<UserRecord> = serde_json::from_str(body)
        .map_err(|error| LoadError::decode(endpoint, error.to_string()))?;

    let mut seen = HashSet::with_capacity(records.len());
    let mut users = Vec::with_capacity(records.len());
    for record in records {
        if !seen.insert(record.id) {
            return Err(LoadError::decode(
                endpoint,
                format!("duplicate user id {}", record.id),
            ));
        }
        users.push(record.into_user());
    }
    Ok(users)
}

fn connection_error(endpoint: &str, timeout: Duration, error: &reqwest::Error) -> LoadError {
    let reason = if error.is_timeout() {
        format!("no response within {}ms", timeout.as_millis())
    } else {
        format!("cannot reach server ({error})")
    };
    tracing::warn!(%reason, "user list request failed");
    LoadError::network(endpoint, reason)
}

fn status_error(endpoint: &str, status: StatusCode, body: &str) -> LoadError {
    let body = body.trim();
    if !body.is_empty() && body.len() < 100 && !body.contains('{') {
        return LoadError::network(
            endpoint,
            format!("server returned {}: {body}", status.as_u16()),
        );
    }
    LoadError::network(endpoint, format!("server returned {}", status.as_u16()))
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: UserId,
    name: String,
    email: String,
    address: AddressRecord,
}

#[derive(Debug, Deserialize)]
struct AddressRecord {
    city: String,
}

impl UserRecord {
    fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            city: self.address.city,
        }
    }
}
