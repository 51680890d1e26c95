//! Typed handles to the platform capabilities.
//!
//! Each handle only holds a reference to the shared [`PlatformClient`]; creating one is
//! cheap and never opens a second session.

use crate::client_bail;
use crate::platform::client::{PlatformClient, TOKEN_TTL_SECONDS};
use crate::web::validation::{validate_id, validate_object_path, validate_str};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

const DOCUMENT_API: &str = "https://firestore.googleapis.com/v1";
const STORAGE_API: &str = "https://storage.googleapis.com";

/// Audience of custom sign-in tokens accepted by the identity toolkit.
pub const IDENTITY_TOOLKIT_AUDIENCE: &str =
    "https://identitytoolkit.googleapis.com/google.identity.identitytoolkit.v1.IdentityToolkit";

/// Claims the identity platform reserves for itself.
const RESERVED_CLAIMS: [&str; 16] = [
    "acr", "amr", "at_hash", "aud", "auth_time", "azp", "cnf", "c_hash", "exp", "firebase",
    "iat", "iss", "jti", "nbf", "nonce", "sub",
];

/// Access to the document database of the project.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    client: Arc<PlatformClient>,
}

impl DocumentStore {
    pub(crate) fn new(client: Arc<PlatformClient>) -> Self {
        tracing::debug!("Creating document store handle on client {}", client.instance_id());
        DocumentStore { client }
    }

    pub fn client(&self) -> &Arc<PlatformClient> {
        &self.client
    }

    /// Resource name of the default database, e.g. `projects/p/databases/(default)`.
    pub fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)", self.client.project_id())
    }

    pub fn collection_url(&self, collection: &str) -> anyhow::Result<String> {
        let collection = validate_id("collection", collection)?;

        Ok(format!(
            "{}/{}/documents/{}",
            DOCUMENT_API,
            self.database_path(),
            collection
        ))
    }

    pub fn document_url(&self, collection: &str, document_id: &str) -> anyhow::Result<String> {
        let document_id = validate_id("documentId", document_id)?;

        Ok(format!("{}/{}", self.collection_url(collection)?, document_id))
    }
}

/// Access to the identity service (user accounts and sign-in).
#[derive(Clone, Debug)]
pub struct IdentityService {
    client: Arc<PlatformClient>,
}

#[derive(Serialize)]
struct CustomTokenClaims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'static str,
    iat: i64,
    exp: i64,
    uid: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    claims: Option<&'a Map<String, Value>>,
}

impl IdentityService {
    pub(crate) fn new(client: Arc<PlatformClient>) -> Self {
        tracing::debug!("Creating identity service handle on client {}", client.instance_id());
        IdentityService { client }
    }

    pub fn client(&self) -> &Arc<PlatformClient> {
        &self.client
    }

    /// Mints a custom sign-in token for the given user id.
    ///
    /// The token is exchanged by the client application for an id token. The
    /// `developer_claims` end up in the `claims` field and must not use reserved names.
    #[tracing::instrument(level = "debug", skip(self, developer_claims), err(Display))]
    pub fn create_custom_token(
        &self,
        uid: &str,
        developer_claims: Option<&Map<String, Value>>,
    ) -> anyhow::Result<String> {
        let uid = validate_str("uid", uid, 1, 128)?;

        if let Some(claims) = developer_claims
            && let Some(reserved) = claims.keys().find(|key| RESERVED_CLAIMS.contains(&key.as_str()))
        {
            client_bail!("Developer claim '{}' is reserved", reserved);
        }

        let issued_at = Utc::now().timestamp();
        self.client
            .sign(&CustomTokenClaims {
                iss: self.client.client_email(),
                sub: self.client.client_email(),
                aud: IDENTITY_TOOLKIT_AUDIENCE,
                iat: issued_at,
                exp: issued_at + TOKEN_TTL_SECONDS,
                uid,
                claims: developer_claims,
            })
            .with_context(|| format!("Failed to create custom token for '{}'", uid))
    }
}

/// Access to the object storage bucket of the project.
#[derive(Clone, Debug)]
pub struct ObjectStorage {
    client: Arc<PlatformClient>,
}

impl ObjectStorage {
    pub(crate) fn new(client: Arc<PlatformClient>) -> Self {
        tracing::debug!("Creating object storage handle on client {}", client.instance_id());
        ObjectStorage { client }
    }

    pub fn client(&self) -> &Arc<PlatformClient> {
        &self.client
    }

    /// The configured default bucket, if any.
    pub fn bucket(&self) -> Option<&str> {
        self.client.storage_bucket()
    }

    fn require_bucket(&self) -> anyhow::Result<&str> {
        self.bucket()
            .context("No storage bucket configured. Please provide PLATFORM_STORAGE_BUCKET")
    }

    /// Public download URL of an object in the default bucket.
    pub fn object_url(&self, path: &str) -> anyhow::Result<String> {
        let bucket = self.require_bucket()?;
        let path = validate_object_path("path", path)?;

        Ok(format!("{}/{}/{}", STORAGE_API, bucket, path))
    }

    /// `gs://` URI of an object in the default bucket.
    pub fn object_uri(&self, path: &str) -> anyhow::Result<String> {
        let bucket = self.require_bucket()?;
        let path = validate_object_path("path", path)?;

        Ok(format!("gs://{}/{}", bucket, path))
    }
}
