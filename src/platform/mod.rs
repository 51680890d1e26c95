//! Cloud platform credentials, client and derived service handles.
//!
//! Startup runs through [`PlatformBootstrap::initialize`]:
//!
//! 1. [`credentials::resolve`] picks a credential from the [`EnvironmentContext`]
//!    (credentials file outside production, otherwise environment variables) and
//!    validates it.
//! 2. A [`ClientFactory`] turns the credential into the one [`PlatformClient`].
//! 3. The resulting [`ServiceRegistry`] derives the [`DocumentStore`],
//!    [`IdentityService`] and [`ObjectStorage`] handles from that client on demand.
//!
//! Any failure in steps 1 or 2 is a [`PlatformError`] and must abort the startup.
//! The registry is shared as `Arc<ServiceRegistry>`; request handlers obtain it via
//! [`with_registry`].

use std::convert::Infallible;
use std::sync::Arc;
use warp::Filter;

pub mod bundle;
pub mod client;
pub mod credentials;
pub mod environment;
pub mod error;
pub mod registry;
pub mod report;
pub mod services;

pub use client::{ClientFactory, PlatformClient, ServiceAccountClientFactory};
pub use credentials::{CredentialRecord, CredentialSource};
pub use environment::{DeploymentMode, EnvironmentContext};
pub use error::{CredentialField, PlatformError};
pub use registry::{PlatformBootstrap, PlatformState, ServiceHandle, ServiceName, ServiceRegistry};
pub use services::{DocumentStore, IdentityService, ObjectStorage};

/// Makes the registry available to a warp handler.
pub fn with_registry(
    registry: Arc<ServiceRegistry>,
) -> impl Filter<Extract = (Arc<ServiceRegistry>,), Error = Infallible> + Clone {
    crate::web::warp::with_cloneable(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::client::tests::valid_context;

    #[tokio::test]
    async fn handlers_see_the_same_registry() {
        let registry = PlatformBootstrap::new(ServiceAccountClientFactory)
            .initialize(&valid_context())
            .unwrap();
        let instance_id = registry.client().instance_id().to_string();

        let filter = warp::path("probe")
            .and(with_registry(registry))
            .map(|registry: Arc<ServiceRegistry>| {
                registry.document_store().client().instance_id().to_string()
            });

        for _ in 0..2 {
            let response = warp::test::request().path("/probe").reply(&filter).await;
            assert_eq!(response.body(), instance_id.as_bytes());
        }
    }
}
