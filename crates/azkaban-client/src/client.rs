//! Main client implementation.

use std::time::Duration;

use reqwest::header::HeaderName;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use azkaban_config::{ClientConfig, Context};

use crate::api::{ExecutionsApi, FlowsApi, ProjectsApi, SchedulesApi};
use crate::decode::{decode, Decoded, Destination};
use crate::error::{Error, Result};
use crate::params::Params;

/// Default timeout for requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Header the server inspects to pick its JSON code path over an HTML page.
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

/// Form/query key carrying the session token.
pub(crate) const SESSION_PARAM: &str = "session.id";

/// Azkaban web server client.
///
/// Holds exactly one login session. [`authenticate`](Self::authenticate)
/// needs `&mut self`; every other call borrows the client shared, so calls
/// may run concurrently once the session is established.
///
/// Certificate validation is disabled: Azkaban deployments commonly run
/// behind self-signed certificates on internal networks, and this client
/// trusts whatever endpoint it is pointed at.
///
/// # Example
///
/// ```no_run
/// use azkaban_client::AzkabanClient;
///
/// # async fn example() -> azkaban_client::Result<()> {
/// let mut client = AzkabanClient::new("https://azkaban.internal:8443")?;
/// client.authenticate("etl", "secret").await?;
///
/// let flows = client.flows().list("warehouse").await?;
/// for flow in &flows.flows {
///     println!("{}", flow.id);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct AzkabanClient {
    /// HTTP client.
    http: reqwest::Client,
    /// Base URL every route is joined onto.
    endpoint: Url,
    /// Per-request timeout.
    timeout: Duration,
    /// Session token issued by the login call.
    session_id: Option<String>,
    /// Status reported by the login call.
    status: Option<String>,
}

impl std::fmt::Debug for AzkabanClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzkabanClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Login response; fields land on the client.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoginResponse {
    #[serde(rename = "session.id")]
    session_id: Option<String>,
    status: Option<String>,
}

impl Destination for LoginResponse {}

impl AzkabanClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Create a client for an endpoint with default settings.
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::builder().endpoint(endpoint).build()
    }

    /// Build a client from a config context and log in with its credentials.
    pub async fn connect(context: &Context) -> Result<Self> {
        let username = context
            .username
            .clone()
            .ok_or_else(|| Error::Config(format!("context '{}' has no username", context.name)))?;
        let password = context
            .password()?
            .ok_or_else(|| Error::Config(format!("context '{}' has no password", context.name)))?;

        let mut client = Self::builder().context(context).build()?;
        client.authenticate(&username, &password).await?;
        Ok(client)
    }

    /// Connect with a context from a loaded config file.
    ///
    /// `context` names the entry to use; `None` picks the file's current
    /// context. Timeouts left unset fall back to the file's defaults.
    pub async fn from_config(config: &ClientConfig, context: Option<&str>) -> Result<Self> {
        let context = config.resolve(context)?;
        debug!(context = %context.name, server = %context.server, "Resolved config context");
        Self::connect(&context).await
    }

    /// Connect with the current context of the config file in its default
    /// location.
    pub async fn from_default_config() -> Result<Self> {
        let config = tokio::task::spawn_blocking(ClientConfig::load)
            .await
            .map_err(|e| Error::Config(format!("config loading task failed: {e}")))??;
        Self::from_config(&config, None).await
    }

    /// Get the endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Session token from the last successful login.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Status reported by the last successful login.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// Whether a session token is held.
    pub fn is_authenticated(&self) -> bool {
        self.session_id.is_some()
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// A copy of this client, session included, using a different timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout,
            ..self.clone()
        }
    }

    /// Log in and keep the issued session token.
    ///
    /// Bad credentials surface as [`Error::Service`] carrying the server's
    /// rejection text; the held session is left untouched.
    pub async fn authenticate(&mut self, username: &str, password: &str) -> Result<()> {
        let params = Params::new()
            .add("action", "login")
            .add("username", username)
            .add("password", password);

        let login: LoginResponse = self.call(Method::POST, "/", &params).await?;

        if let Some(session_id) = login.session_id {
            self.session_id = Some(session_id);
        }
        if let Some(status) = login.status {
            self.status = Some(status);
        }

        info!(endpoint = %self.endpoint, user = username, "Authenticated");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the projects API.
    pub fn projects(&self) -> ProjectsApi<'_> {
        ProjectsApi::new(self)
    }

    /// Access the flows API.
    pub fn flows(&self) -> FlowsApi<'_> {
        FlowsApi::new(self)
    }

    /// Access the executions API.
    pub fn executions(&self) -> ExecutionsApi<'_> {
        ExecutionsApi::new(self)
    }

    /// Access the schedules API.
    pub fn schedules(&self) -> SchedulesApi<'_> {
        SchedulesApi::new(self)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for a route.
    pub(crate) fn url(&self, route: &str) -> Result<Url> {
        let route = route.trim_start_matches('/');
        self.endpoint.join(route).map_err(Error::from)
    }

    /// Parameters pre-filled with the session token.
    pub(crate) fn session_params(&self) -> Params {
        Params::new().add(SESSION_PARAM, self.session_id.as_deref().unwrap_or_default())
    }

    /// Perform a single exchange and return the raw body.
    ///
    /// `GET` carries the parameters in the query string; other methods send
    /// them form-encoded. The status code is not inspected: the server
    /// answers 200 and reports failures in the body.
    pub(crate) async fn execute(&self, method: Method, route: &str, params: &Params) -> Result<Vec<u8>> {
        let url = self.url(route)?;

        let request = if method == Method::GET {
            self.http.get(url).query(params.pairs())
        } else {
            self.http
                .request(method.clone(), url)
                .header(X_REQUESTED_WITH, "XMLHttpRequest")
                .form(params.pairs())
        };

        let response = request.timeout(self.timeout).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        debug!(%method, route, status = status.as_u16(), bytes = body.len(), "Azkaban exchange");
        Ok(body.to_vec())
    }

    /// Perform an exchange and decode the body into `T`.
    pub(crate) async fn call<T: Destination>(
        &self,
        method: Method,
        route: &str,
        params: &Params,
    ) -> Result<T> {
        let body = self.execute(method, route, params).await?;
        let decoded = decode::<T>(&body)?;

        if let Decoded::ServiceError(message) = &decoded {
            warn!(route, error = %message, "Azkaban reported an error");
        } else {
            debug!(route, outcome = decoded.kind(), "Decoded response");
        }
        decoded.into_result()
    }

    /// Send a multipart form and check the status code.
    ///
    /// The body is not decoded.
    pub(crate) async fn send_multipart(&self, route: &str, form: reqwest::multipart::Form) -> Result<()> {
        let url = self.url(route)?;
        let response = self
            .http
            .post(url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        debug!(route, status = status.as_u16(), "Azkaban multipart exchange");

        if status != StatusCode::OK {
            return Err(Error::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }
        Ok(())
    }
}

/// Builder for creating an [`AzkabanClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    endpoint: Option<String>,
    timeout: Duration,
    user_agent: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        }
    }

    /// Set the Azkaban web server URL.
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint = Some(url.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Take endpoint and timeout from a config context.
    pub fn context(mut self, context: &Context) -> Self {
        self.endpoint = Some(context.server.clone());
        if let Some(secs) = context.timeout {
            self.timeout = Duration::from_secs(secs);
        }
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<AzkabanClient> {
        let endpoint = self
            .endpoint
            .ok_or_else(|| Error::Config("endpoint is required".to_string()))?;

        // Routes are joined relative to the endpoint, so keep any path prefix.
        let mut endpoint = Url::parse(&endpoint)?;
        if !endpoint.path().ends_with('/') {
            endpoint.set_path(&format!("{}/", endpoint.path()));
        }

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("azkaban-client/{}", env!("CARGO_PKG_VERSION")));

        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .build()?;

        Ok(AzkabanClient {
            http,
            endpoint,
            timeout: self.timeout,
            session_id: None,
            status: None,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
