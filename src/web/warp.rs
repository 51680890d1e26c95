use crate::platform::environment::DeploymentMode;
use crate::tools::system;
use crate::web::error::ApiError;
use anyhow::{Context, bail};
use hyper::{Body, Server};
use serde::Serialize;
use std::convert::Infallible;
use std::env;
use std::net::SocketAddr;
use std::pin::Pin;
use std::str::FromStr;
use std::task::Poll;
use std::time::Duration;
use tower::{Service, ServiceBuilder};
use tracing::{Instrument, Span, debug_span};
use warp::filters::BoxedFilter;
use warp::http::header::CONTENT_TYPE;
use warp::http::uri::{Authority, Scheme};
use warp::http::{HeaderValue, Request, StatusCode};
use warp::reply::Response;
use warp::{Filter, Rejection, Reply, reply};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_PREFIX: &str = "api/v1";

const CORS_METHODS: [&str; 7] = ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE", "OPTIONS"];
const CORS_HEADERS: [&str; 3] = ["Content-Type", "Authorization", "Accept"];

/// Which origins may call the API from a browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parses `*` or a comma-separated list of `scheme://host[:port]` origins.
    pub fn parse(value: &str) -> anyhow::Result<CorsOrigins> {
        let value = value.trim();
        if value == "*" {
            return Ok(CorsOrigins::Any);
        }

        let origins = value
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(parse_origin)
            .collect::<anyhow::Result<Vec<_>>>()?;

        if origins.is_empty() {
            bail!("CORS_ORIGIN does not contain any origin");
        }

        Ok(CorsOrigins::List(origins))
    }
}

/// Accepts exactly what warp's CORS filter accepts: a scheme and an authority, no path.
fn parse_origin(origin: &str) -> anyhow::Result<String> {
    let origin = origin.trim_end_matches('/');
    let Some((scheme, authority)) = origin
        .split_once("://")
        .filter(|(scheme, _)| !scheme.is_empty())
    else {
        bail!("Invalid CORS origin '{}'. Expected scheme://host", origin);
    };

    Scheme::from_str(scheme)
        .with_context(|| format!("Invalid scheme in CORS origin '{}'", origin))?;
    Authority::from_str(authority).with_context(|| {
        format!(
            "Invalid CORS origin '{}'. Expected scheme://host[:port] without a path",
            origin
        )
    })?;

    Ok(origin.to_string())
}

impl std::fmt::Display for CorsOrigins {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorsOrigins::Any => write!(f, "*"),
            CorsOrigins::List(origins) => write!(f, "{}", origins.join(", ")),
        }
    }
}

/// Settings of the HTTP listener, read from the environment.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    bind_address: SocketAddr,
    api_prefix: String,
    cors_origins: CorsOrigins,
    public_base_url: String,
}

impl ServerConfig {
    pub fn from_env(mode: &DeploymentMode) -> anyhow::Result<Self> {
        Self::from_lookup(mode, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(mode: &DeploymentMode, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = read("PORT")
            .map(|port| {
                port.trim()
                    .parse::<u16>()
                    .with_context(|| format!("Failed to parse PORT '{}'", port))
            })
            .transpose()?
            .unwrap_or(DEFAULT_PORT);

        let bind_address = match read("BIND_ADDRESS") {
            Some(address) => SocketAddr::from_str(address.trim())
                .with_context(|| format!("Failed to parse BIND_ADDRESS '{}'", address))?,
            None => SocketAddr::from(([0, 0, 0, 0], port)),
        };

        let api_prefix = read("API_PREFIX")
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string())
            .trim()
            .trim_matches('/')
            .to_string();

        let cors_origins = match read("CORS_ORIGIN") {
            Some(origins) => CorsOrigins::parse(&origins)?,
            None => CorsOrigins::Any,
        };

        let public_base_url = if mode.is_production() {
            format!(
                "https://{}",
                read("PUBLIC_HOSTNAME").unwrap_or_else(|| "localhost".to_string())
            )
        } else {
            format!("http://localhost:{}", bind_address.port())
        };

        Ok(ServerConfig {
            bind_address,
            api_prefix,
            cors_origins,
            public_base_url,
        })
    }

    pub fn bind_address(&self) -> SocketAddr {
        self.bind_address
    }

    pub fn api_prefix(&self) -> &str {
        &self.api_prefix
    }

    pub fn cors_origins(&self) -> &CorsOrigins {
        &self.cors_origins
    }

    /// Externally visible URL of the API root, e.g. `http://localhost:3000/api/v1`.
    pub fn api_base_url(&self) -> String {
        if self.api_prefix.is_empty() {
            self.public_base_url.clone()
        } else {
            format!("{}/{}", self.public_base_url, self.api_prefix)
        }
    }

    /// Matches the configured prefix, one path segment at a time.
    pub fn api_path(&self) -> BoxedFilter<()> {
        self.api_prefix
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(warp::any().boxed(), |filter, segment| {
                filter.and(warp::path(segment.to_string())).boxed()
            })
    }

    pub fn cors(&self) -> warp::cors::Builder {
        let builder = warp::cors()
            .allow_methods(CORS_METHODS)
            .allow_headers(CORS_HEADERS)
            .allow_credentials(true);

        match &self.cors_origins {
            CorsOrigins::Any => builder.allow_any_origin(),
            CorsOrigins::List(origins) => builder.allow_origins(origins.iter().map(String::as_str)),
        }
    }
}

pub fn with_cloneable<C: Clone + Send>(
    value: C,
) -> impl Filter<Extract = (C,), Error = Infallible> + Clone {
    warp::any().map(move || value.clone())
}

pub fn into_response<S: Serialize>(result: anyhow::Result<S>) -> Result<impl Reply, Rejection> {
    into_response_with_status(result.map(|data| (StatusCode::OK, data)))
}

pub fn into_response_with_status<S: Serialize>(
    response: anyhow::Result<(StatusCode, S)>,
) -> Result<impl Reply, Rejection> {
    let response = response.and_then(|(status_code, data)| {
        serde_json::to_vec(&data)
            .context("Failed to serialize data")
            .map(|data| (status_code, data))
    });

    match response {
        Ok((status, data)) => {
            let mut res = Response::new(data.into());
            *res.status_mut() = status;
            res.headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Ok(res)
        }
        Err(err) => Err(into_rejection(err)),
    }
}

pub fn into_rejection(err: anyhow::Error) -> Rejection {
    match err.downcast_ref::<ApiError>() {
        Some(api_error) => warp::reject::custom(api_error.clone()),
        None => {
            tracing::error!("Unhandled error: {:#}", err);
            warp::reject::custom(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{:#}", err),
            ))
        }
    }
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if let Some(err) = err.find::<ApiError>() {
        Ok(reply::with_status(reply::json(&err), err.status))
    } else if err.is_not_found() {
        let err = ApiError::new(StatusCode::NOT_FOUND, "Not Found");
        Ok(reply::with_status(reply::json(&err), err.status))
    } else {
        Err(err)
    }
}

/// Serves the given routes until a termination signal is received.
///
/// Routes are wrapped with CORS handling and [`ApiError`] recovery. The caller is
/// expected to have finished all startup work (e.g. the platform bootstrap) before,
/// as the listener accepts requests immediately.
pub async fn run_webserver<F>(routes: F, config: &ServerConfig) -> anyhow::Result<()>
where
    F: Filter + Clone + Send + Sync + 'static,
    F::Extract: Reply,
    F::Error: Into<Rejection> + 'static,
{
    let bind_address = config.bind_address();
    tracing::info!("Starting server at {}", bind_address);

    let filter = routes
        .boxed()
        .recover(handle_rejection)
        .with(config.cors());

    let svc = warp::service(filter);
    let traced_svc = ServiceBuilder::new()
        .layer_fn(|inner| TracingMiddleware { inner })
        .service(svc);

    let server = Server::try_bind(&bind_address)
        .with_context(|| format!("Failed to bind HTTP server to {}", bind_address))?
        .serve(hyper::service::make_service_fn(|_| {
            let svc = traced_svc.clone();
            async move { Ok::<_, Infallible>(svc) }
        }));

    tracing::info!(
        "Running HTTP server at effective address {}",
        server.local_addr()
    );
    server
        .with_graceful_shutdown(system::await_shutdown())
        .await
        .context("HTTP server terminated unexpectedly")?;

    tracing::info!("HTTP Server has been stopped...");
    // Give in-flight requests and background tasks a moment before the process exits.
    tokio::time::sleep(Duration::from_secs(3)).await;
    tracing::info!("HTTP Server has been terminated.");

    Ok(())
}

#[derive(Clone)]
struct TracingMiddleware<S> {
    inner: S,
}

impl<S> Service<Request<Body>> for TracingMiddleware<S>
where
    S: Service<Request<Body>, Response = Response, Error = Infallible> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let span = debug_span!(
            "http_request",
            app = crate::APP_NAME.as_str(),
            http.method = %method,
            http.url = %path,
            http.status_code = tracing::field::Empty,
        );

        let mut inner = self.inner.clone();

        let fut = async move {
            let response = inner.call(req).await?;
            let status = response.status().as_u16();
            Span::current().record("http.status_code", status as i64);
            Ok(response)
        }
        .instrument(span);

        Box::pin(fut)
    }
}
