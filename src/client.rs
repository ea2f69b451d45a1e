use std::time::{Duration, Instant};

use chrono::Local;
use reqwest::blocking;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::debug;

use crate::aoi::{Point, Polygon};
use crate::error::ApiError;

/// Base URL of the production prediction service. No trailing slash.
pub const DEFAULT_BASE_URL: &str = "https://api.eguide.io/v0";

/// User agent sent on every request.
pub const USER_AGENT: &str = concat!("ConsumptionApiClientRust/", env!("CARGO_PKG_VERSION"));

const API_KEY_HEADER: &str = "x-api-key";
const PREDICTION_PATH: &str = "/prediction";

/// Per-call overrides for a single request.
///
/// Anything left unset falls back to the client's construction-time
/// configuration; on a conflicting header name the per-call value wins.
#[derive(Debug, Default, Clone)]
pub struct CallOptions {
    /// Alternate base URL for this call only.
    pub base_url: Option<String>,
    /// Reference start time, used only for elapsed-time bookkeeping in the
    /// debug log. Defaults to the moment the call is made.
    pub first_request_time: Option<Instant>,
    /// Dump the outgoing request to stderr in a human-readable form.
    pub verbose: bool,
    /// Headers merged over the client's defaults for this call.
    pub headers: Option<HeaderMap>,
    /// Timeout for this call only.
    pub timeout: Option<Duration>,
}

/// Builder for [`Client`], for when the defaults aren't enough.
pub struct ClientBuilder {
    apikey: String,
    base_url: String,
    timeout: Option<Duration>,
    proxy: Option<String>,
    headers: HeaderMap,
}

impl ClientBuilder {
    /// Override the base URL. Trailing slashes are stripped.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Enforce a timeout on every request issued through the session.
    ///
    /// Expiry surfaces as [`ApiError::Timeout`]; no retry is attempted.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Route all requests through the given proxy URL.
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.proxy = Some(url.into());
        self
    }

    /// Add a default header sent on every request.
    ///
    /// The client's own `User-Agent` and `x-api-key` headers always win
    /// over a caller-supplied header of the same name.
    pub fn default_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Replace the whole set of caller-supplied default headers.
    pub fn default_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn build(self) -> Result<Client, ApiError> {
        if self.apikey.trim().is_empty() {
            return Err(ApiError::Config(
                "must provide an API key when creating a client".to_string(),
            ));
        }

        let mut headers = self.headers;
        headers.insert(header::USER_AGENT, HeaderValue::from_static(USER_AGENT));
        let key_value = HeaderValue::from_str(&self.apikey).map_err(|_| {
            ApiError::Config("API key contains characters not permitted in a header".to_string())
        })?;
        headers.insert(HeaderName::from_static(API_KEY_HEADER), key_value);

        let mut session = blocking::Client::builder().default_headers(headers.clone());
        if let Some(timeout) = self.timeout {
            session = session.timeout(timeout);
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| ApiError::Config(format!("invalid proxy URL: {e}")))?;
            session = session.proxy(proxy);
        }
        let session = session
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build HTTP session: {e}")))?;

        let mut base_url = self.base_url;
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Client {
            session,
            apikey: self.apikey,
            base_url,
            default_headers: headers,
        })
    }
}

/// Performs requests to the eGUIDE consumption API web services.
///
/// Holds exactly one API key and one blocking HTTP session for its entire
/// lifetime; the session and its default headers are fixed at construction
/// and reused across calls. `Client` is cheap to clone and the clones share
/// the session, so callers wanting parallel requests can hand clones to
/// their own threads.
#[derive(Clone, Debug)]
pub struct Client {
    session: blocking::Client,
    apikey: String,
    base_url: String,
    default_headers: HeaderMap,
}

impl Client {
    /// Create a client with the default service endpoint.
    ///
    /// Fails with [`ApiError::Config`] when the key is empty or blank.
    pub fn new(apikey: impl Into<String>) -> Result<Self, ApiError> {
        Self::builder(apikey).build()
    }

    pub fn builder(apikey: impl Into<String>) -> ClientBuilder {
        ClientBuilder {
            apikey: apikey.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
            proxy: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.apikey
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Consumption prediction for a point location.
    ///
    /// Coordinates are forwarded uninterpreted; the service rejects values
    /// outside its coverage with a 404, surfaced as [`ApiError::Coverage`].
    pub fn latlong(&self, lat: f64, lon: f64) -> Result<Value, ApiError> {
        self.latlong_with(lat, lon, CallOptions::default())
    }

    /// [`latlong`](Self::latlong) with per-call overrides.
    pub fn latlong_with(
        &self,
        lat: f64,
        lon: f64,
        options: CallOptions,
    ) -> Result<Value, ApiError> {
        let aoi = Point::new(lat, lon).descriptor();
        let params = [("aoi", aoi)];
        self.request(PREDICTION_PATH, &params, options)
    }

    /// Consumption prediction for a polygon region.
    ///
    /// The request path for polygons is not wired up yet; this always
    /// returns [`ApiError::Unimplemented`] so callers reading the
    /// documented surface are not silently misled. Build the descriptor
    /// with [`Polygon::from_string`] in the meantime.
    pub fn polygon(&self, _polygon: &Polygon) -> Result<Value, ApiError> {
        Err(ApiError::Unimplemented {
            feature: "polygon query",
        })
    }

    /// Perform an HTTP GET with credentials, returning the body as JSON.
    fn request(
        &self,
        path: &str,
        params: &[(&str, String)],
        options: CallOptions,
    ) -> Result<Value, ApiError> {
        let started = options.first_request_time.unwrap_or_else(Instant::now);
        let base_url = options.base_url.as_deref().unwrap_or(&self.base_url);
        let url = format!("{base_url}{path}");

        let mut builder = self.session.get(url.as_str()).query(params);
        if let Some(headers) = options.headers {
            builder = builder.headers(headers);
        }
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        let request = builder.build().map_err(classify_transport)?;
        if options.verbose {
            self.dump_request(&request);
        }
        debug!(method = "GET", url = %request.url(), "dispatching request");

        let response = self.session.execute(request).map_err(classify_transport)?;
        let result = self.interpret(response);

        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "request completed"
        );

        result
    }

    /// Classify a completed response into a decoded body or an error.
    fn interpret(&self, response: blocking::Response) -> Result<Value, ApiError> {
        let status = response.status().as_u16();
        match status {
            200 => {}
            403 => return Err(ApiError::Authorization { status }),
            404 => return Err(ApiError::Coverage { status }),
            _ => return Err(ApiError::Http { status }),
        }

        let text = response.text().map_err(classify_transport)?;
        let body: Value = serde_json::from_str(&text).map_err(|e| ApiError::Decode {
            message: format!("response body is not valid JSON: {e}"),
        })?;

        let api_status = body
            .get("status")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ApiError::Decode {
                message: "response envelope is missing a string \"status\" field".to_string(),
            })?;

        if api_status == "OK" {
            Ok(body)
        } else {
            Err(ApiError::UnexpectedStatus { status: api_status })
        }
    }

    /// Human-readable dump of the outgoing request, session defaults
    /// included, for the verbose flag.
    fn dump_request(&self, request: &blocking::Request) {
        let mut headers = self.default_headers.clone();
        for (name, value) in request.headers() {
            headers.insert(name.clone(), value.clone());
        }

        eprintln!("-----------START-----------");
        eprintln!(
            "[{}] {} {}",
            Local::now().format("%H:%M:%S.%3f"),
            request.method(),
            request.url()
        );
        for (name, value) in headers.iter() {
            eprintln!("{}: {}", name, value.to_str().unwrap_or("<opaque>"));
        }
    }
}

fn classify_transport(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Transport(err)
    }
}
