// ABOUTME: ASUSWRT router driver
// ABOUTME: Logs in through login.cgi and reads the client list from appGet.cgi

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{ACCEPT, COOKIE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{Client, DeviceClient, DeviceError, DeviceResult};

/// The firmware only answers JSON to its own mobile app
const APP_USER_AGENT: &str = "asusrouter-Android-DUTUtil-1.0.0.3.58-163";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct Session {
    endpoint: String,
    username: String,
    token: String,
    established: Instant,
}

pub struct AsusWrtClient {
    http: reqwest::Client,
    session: Mutex<Option<Session>>,
    session_ttl: Duration,
}

impl std::fmt::Debug for AsusWrtClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsusWrtClient")
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl AsusWrtClient {
    pub fn new() -> DeviceResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DeviceError::Network(e.to_string()))?;

        Ok(Self {
            http,
            session: Mutex::new(None),
            session_ttl: SESSION_TTL,
        })
    }

    /// Override how long a login token is reused
    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    async fn login(&self, endpoint: &str, username: &str, password: &str) -> DeviceResult<String> {
        let authorization = STANDARD.encode(format!("{}:{}", username, password));
        let url = format!("{}/login.cgi", endpoint);

        let response = self
            .http
            .post(&url)
            .header(USER_AGENT, APP_USER_AGENT)
            .header(ACCEPT, "application/json")
            .form(&[("login_authorization", authorization.as_str())])
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(DeviceError::Status(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DeviceError::InvalidResponse(e.to_string()))?;

        if let Some(status) = body.get("error_status") {
            return Err(DeviceError::Authentication(format!(
                "router rejected login (error_status={})",
                status
            )));
        }

        body.get("asus_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
            .ok_or_else(|| DeviceError::Authentication("no asus_token in login reply".to_string()))
    }
}

#[async_trait]
impl DeviceClient for AsusWrtClient {
    async fn connect(&self, endpoint: &str, username: &str, password: &str) -> DeviceResult<()> {
        let endpoint = endpoint.trim_end_matches('/');
        let mut session = self.session.lock().await;

        if let Some(current) = session.as_ref() {
            if current.endpoint == endpoint
                && current.username == username
                && current.established.elapsed() < self.session_ttl
            {
                debug!("Reusing router session for {}", endpoint);
                return Ok(());
            }
        }

        info!("No valid router session, logging in to {}", endpoint);
        let token = self.login(endpoint, username, password).await?;
        *session = Some(Session {
            endpoint: endpoint.to_string(),
            username: username.to_string(),
            token,
            established: Instant::now(),
        });
        info!("Connected to {}", endpoint);
        Ok(())
    }

    async fn list_clients(&self) -> DeviceResult<Vec<Client>> {
        let session = self
            .session
            .lock()
            .await
            .clone()
            .ok_or(DeviceError::NotConnected)?;

        let url = format!("{}/appGet.cgi?hook=get_clientlist()", session.endpoint);
        let response = self
            .http
            .get(&url)
            .header(USER_AGENT, APP_USER_AGENT)
            .header(ACCEPT, "application/json")
            .header(COOKIE, format!("asus_token={}", session.token))
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            if matches!(
                response.status(),
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
            ) {
                // Force a fresh login on the next connect
                *self.session.lock().await = None;
            }
            return Err(DeviceError::Status(response.status().as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| DeviceError::InvalidResponse(e.to_string()))?;

        parse_client_list(&body)
    }
}

/// Decode the `get_clientlist` hook reply, keeping the order of `maclist`
pub fn parse_client_list(body: &Value) -> DeviceResult<Vec<Client>> {
    let list = body
        .get("get_clientlist")
        .and_then(Value::as_object)
        .ok_or_else(|| DeviceError::InvalidResponse("missing get_clientlist".to_string()))?;

    let macs = list
        .get("maclist")
        .and_then(Value::as_array)
        .ok_or_else(|| DeviceError::InvalidResponse("missing maclist".to_string()))?;

    let mut clients = Vec::with_capacity(macs.len());
    for mac in macs.iter().filter_map(Value::as_str) {
        let Some(entry) = list.get(mac).and_then(Value::as_object) else {
            warn!(mac = %mac, "Client listed in maclist has no entry");
            continue;
        };

        let field = |key: &str| {
            entry
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };

        let reported_mac = field("mac");
        clients.push(Client {
            name: field("name"),
            mac: if reported_mac.is_empty() {
                mac.to_string()
            } else {
                reported_mac
            },
            ip: field("ip"),
            vendor: field("vendor"),
            online: parse_online(entry.get("isOnline")),
        });
    }

    Ok(clients)
}

fn parse_online(value: Option<&Value>) -> bool {
    match value {
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_i64() == Some(1),
        _ => false,
    }
}
