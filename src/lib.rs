//! # Catalog API
//!
//! Startup layer of the product catalog service. It resolves the credentials of the
//! cloud platform the catalog stores its data in, builds exactly one platform client
//! from them and derives the document store, identity service and object storage
//! handles every other part of the service works with. On top of that it provides
//! the HTTP bootstrap (warp server, CORS, request tracing) and the public health
//! endpoint.
//!
//! ## Startup
//!
//! ```rust,ignore
//! use catalog_api::platform::{EnvironmentContext, PlatformBootstrap, ServiceAccountClientFactory};
//!
//! let context = EnvironmentContext::from_env();
//! let registry = PlatformBootstrap::new(ServiceAccountClientFactory).initialize(&context)?;
//! let documents = registry.document_store();
//! ```
//!
//! Credential resolution is all-or-nothing: if no usable credential can be found the
//! startup fails and no listener is ever opened.
//!
//! ## Modules
//!
//! - [`platform`] - Credential resolution, platform client and service registry
//! - [`web`] - HTTP server, health endpoint, error mapping
//! - [`logging`] - Tracing setup
//! - [`tools`] - Utilities (ID generation, stopwatch, graceful shutdown)
//!
//! ## Environment Variables
//!
//! ### Core
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_NAME` | Application identifier | `CATALOG-API` |
//! | `APP_VERSION` | Version string reported by the health endpoint | crate version |
//! | `APP_ENV` | Deployment mode (`development`, `production`, ...) | `development` |
//!
//! ### Platform
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PLATFORM_CREDENTIALS_PATH` | Service account JSON file (ignored in production) | (none) |
//! | `PLATFORM_PROJECT_ID` | Project identifier | (required) |
//! | `PLATFORM_PRIVATE_KEY` | PEM private key, `\n` escapes are accepted | (required) |
//! | `PLATFORM_CLIENT_EMAIL` | Service account email | (required) |
//! | `PLATFORM_STORAGE_BUCKET` | Default storage bucket | (none) |
//! | `PLATFORM_WEB_API_KEY` | Web API key used by the login flow | (none) |
//!
//! The three required values may be omitted if a readable credentials file is
//! supplied outside of production.
//!
//! ### HTTP
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `PORT` | Port to listen on | `3000` |
//! | `BIND_ADDRESS` | Full socket address, overrides `PORT` | `0.0.0.0:$PORT` |
//! | `API_PREFIX` | Path prefix of all routes | `api/v1` |
//! | `CORS_ORIGIN` | `*` or a comma-separated list of origins | `*` |
//! | `PUBLIC_HOSTNAME` | External hostname shown in the startup report (production) | `localhost` |
//!
//! ### Observability
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RUST_LOG` | Console log filter (e.g., `info`, `catalog_api=debug`) | `info` |

use std::env;
use std::sync::LazyLock;

/// Logging and tracing infrastructure.
pub mod logging;

/// Cloud platform credentials, client and derived service handles.
pub mod platform;

/// General-purpose utilities and helpers.
pub mod tools;

/// HTTP server, health endpoint and web utilities.
pub mod web;

/// Application name from `APP_NAME` environment variable.
///
/// Used in logging and the startup report. Defaults to `"CATALOG-API"`.
pub static APP_NAME: LazyLock<String> =
    LazyLock::new(|| env::var("APP_NAME").unwrap_or("CATALOG-API".to_string()));

/// Application version from `APP_VERSION` environment variable.
///
/// Typically set during CI/CD builds. Falls back to the crate version.
pub static APP_VERSION: LazyLock<String> = LazyLock::new(|| {
    env::var("APP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION").to_string())
});
