//! W3C WebDriver surface.
//!
//! Drives a real browser through a WebDriver server (chromedriver,
//! geckodriver) over HTTP, so the catalog's JavaScript renders the list and
//! detail panels exactly as a user would see them.
//!
//! # Example
//!
//! ```rust,ignore
//! use harvester::surfaces::{WebDriverConfig, WebDriverSurface};
//!
//! let surface = WebDriverSurface::connect(WebDriverConfig::new("http://localhost:9515")).await?;
//! surface.navigate("https://cab.brown.edu/").await?;
//! // ...
//! surface.close().await?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Method};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{SurfaceError, SurfaceResult};
use crate::traits::surface::{Locator, Pick, Surface};

/// Key under which WebDriver returns element references.
const ELEMENT_KEY: &str = "element-6066-11e4-a52f-4002ebaf9ad6";

const SCROLL_SCRIPT: &str = "arguments[0].scrollIntoView({block: 'center', inline: 'nearest'});";

/// Connection settings for a WebDriver server.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    /// Server URL, e.g. `http://localhost:9515`
    pub endpoint: String,

    /// Run the browser without a window
    pub headless: bool,

    /// Delay between presence checks while waiting
    pub poll_interval: Duration,

    /// Per-request HTTP timeout
    pub request_timeout: Duration,
}

impl WebDriverConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            headless: true,
            poll_interval: Duration::from_millis(100),
            request_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    fn capabilities(&self) -> Value {
        let mut args = vec!["--window-size=1280,2000", "--disable-gpu"];
        if self.headless {
            args.push("--headless=new");
        }
        json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": args }
                }
            }
        })
    }
}

/// A browser session behind a WebDriver server.
pub struct WebDriverSurface {
    client: Client,
    endpoint: String,
    session_id: String,
    poll_interval: Duration,
}

impl WebDriverSurface {
    /// Start a new browser session.
    pub async fn connect(config: WebDriverConfig) -> SurfaceResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SurfaceError::Driver(Box::new(e)))?;
        let endpoint = config.endpoint.trim_end_matches('/').to_string();

        let value = send(
            &client,
            Method::POST,
            &format!("{}/session", endpoint),
            Some(config.capabilities()),
        )
        .await?;
        let session_id = value
            .get("sessionId")
            .and_then(Value::as_str)
            .ok_or_else(|| SurfaceError::Protocol("session response without sessionId".into()))?
            .to_string();

        debug!(session_id = %session_id, "WebDriver session started");
        Ok(Self {
            client,
            endpoint,
            session_id,
            poll_interval: config.poll_interval,
        })
    }

    /// End the browser session.
    pub async fn close(self) -> SurfaceResult<()> {
        self.command(Method::DELETE, "", None).await?;
        debug!(session_id = %self.session_id, "WebDriver session closed");
        Ok(())
    }

    async fn command(&self, method: Method, path: &str, body: Option<Value>) -> SurfaceResult<Value> {
        let url = format!("{}/session/{}{}", self.endpoint, self.session_id, path);
        send(&self.client, method, &url, body).await
    }

    async fn find_all(&self, parent: Option<&str>, selector: &str) -> SurfaceResult<Vec<String>> {
        let path = match parent {
            Some(id) => format!("/element/{}/elements", id),
            None => "/elements".to_string(),
        };
        let value = self
            .command(
                Method::POST,
                &path,
                Some(json!({ "using": "css selector", "value": selector })),
            )
            .await?;
        element_ids(&value)
    }

    /// Walk the locator's steps; `None` when any step matches nothing.
    async fn resolve(&self, locator: &Locator) -> SurfaceResult<Option<String>> {
        let mut current: Option<String> = None;
        for step in locator.steps() {
            let candidates = self.find_all(current.as_deref(), &step.selector).await?;
            match pick(candidates, step.pick) {
                Some(id) => current = Some(id),
                None => return Ok(None),
            }
        }
        Ok(current)
    }

    async fn element(&self, locator: &Locator) -> SurfaceResult<String> {
        self.resolve(locator)
            .await?
            .ok_or_else(|| SurfaceError::NotFound {
                locator: locator.to_string(),
            })
    }
}

#[async_trait]
impl Surface for WebDriverSurface {
    async fn navigate(&self, url: &str) -> SurfaceResult<()> {
        self.command(Method::POST, "/url", Some(json!({ "url": url })))
            .await?;
        Ok(())
    }

    async fn click(&self, locator: &Locator) -> SurfaceResult<()> {
        let id = self.element(locator).await?;
        self.command(Method::POST, &format!("/element/{}/click", id), Some(json!({})))
            .await?;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, timeout: Duration) -> SurfaceResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.resolve(locator).await {
                Ok(Some(_)) => return Ok(()),
                Ok(None) | Err(SurfaceError::NotFound { .. }) => {}
                Err(e) => return Err(e),
            }
            if Instant::now() >= deadline {
                return Err(SurfaceError::Timeout {
                    locator: locator.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn read_text(&self, locator: &Locator) -> SurfaceResult<String> {
        let id = self.element(locator).await?;
        let value = self
            .command(Method::GET, &format!("/element/{}/text", id), None)
            .await?;
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SurfaceError::Protocol("element text was not a string".into()))
    }

    async fn count(&self, locator: &Locator) -> SurfaceResult<usize> {
        let steps = locator.steps();
        let Some((last, scope)) = steps.split_last() else {
            return Ok(0);
        };

        let mut parent: Option<String> = None;
        for step in scope {
            let candidates = self.find_all(parent.as_deref(), &step.selector).await?;
            match pick(candidates, step.pick) {
                Some(id) => parent = Some(id),
                None => return Ok(0),
            }
        }

        Ok(self.find_all(parent.as_deref(), &last.selector).await?.len())
    }

    async fn scroll_into_view(&self, locator: &Locator) -> SurfaceResult<()> {
        let id = self.element(locator).await?;
        self.command(
            Method::POST,
            "/execute/sync",
            Some(json!({ "script": SCROLL_SCRIPT, "args": [{ ELEMENT_KEY: id }] })),
        )
        .await?;
        Ok(())
    }

    fn name(&self) -> &str {
        "webdriver"
    }
}

async fn send(client: &Client, method: Method, url: &str, body: Option<Value>) -> SurfaceResult<Value> {
    let mut request = client.request(method, url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| SurfaceError::Driver(Box::new(e)))?;
    let status = response.status();
    let payload: Value = response
        .json()
        .await
        .map_err(|e| SurfaceError::Driver(Box::new(e)))?;

    let value = payload.get("value").cloned().unwrap_or(Value::Null);
    if !status.is_success() {
        return Err(command_error(&value));
    }
    Ok(value)
}

/// Map a WebDriver error payload onto a surface error.
fn command_error(value: &Value) -> SurfaceError {
    let code = value.get("error").and_then(Value::as_str).unwrap_or("unknown error");
    let message = value.get("message").and_then(Value::as_str).unwrap_or_default();

    match code {
        "no such element" | "stale element reference" => SurfaceError::NotFound {
            locator: message.to_string(),
        },
        _ => SurfaceError::Protocol(format!("{}: {}", code, message)),
    }
}

fn element_ids(value: &Value) -> SurfaceResult<Vec<String>> {
    let elements = value
        .as_array()
        .ok_or_else(|| SurfaceError::Protocol("element list was not an array".into()))?;
    elements
        .iter()
        .map(|element| {
            element
                .get(ELEMENT_KEY)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| SurfaceError::Protocol("element reference missing id".into()))
        })
        .collect()
}

fn pick(mut candidates: Vec<String>, pick: Pick) -> Option<String> {
    match pick {
        Pick::First => candidates.into_iter().next(),
        Pick::Nth(n) => (n < candidates.len()).then(|| candidates.swap_remove(n)),
        Pick::Last => candidates.pop(),
    }
}
