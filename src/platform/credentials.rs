//! Credential resolution.
//!
//! Two sources are consulted, strictly in this order:
//!
//! 1. A service account file named by `PLATFORM_CREDENTIALS_PATH`. Only honored
//!    outside of production and only best-effort: if it cannot be read, parsed or
//!    validated, a warning is logged and resolution continues with step 2.
//! 2. The individually supplied `PLATFORM_PROJECT_ID`, `PLATFORM_PRIVATE_KEY` and
//!    `PLATFORM_CLIENT_EMAIL`. These are validated strictly: a missing or
//!    placeholder value is fatal.
//!
//! The storage bucket always comes from `PLATFORM_STORAGE_BUCKET`.

use crate::platform::bundle::CredentialBundle;
use crate::platform::environment::EnvironmentContext;
use crate::platform::error::{CredentialField, PlatformError};
use regex::Regex;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Token endpoint used when a credential does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const PLACEHOLDER_PROJECT_ID: &str = "your-project-id";
const PLACEHOLDER_PRIVATE_KEY: &str = "Your-Private-Key";
const PLACEHOLDER_CLIENT_EMAIL: &str = "xxxxx";

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid regex"));

/// Where a [`CredentialRecord`] was obtained from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    Bundle(PathBuf),
    Environment,
}

impl Display for CredentialSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::Bundle(path) => write!(f, "credentials file '{}'", path.display()),
            CredentialSource::Environment => write!(f, "environment variables"),
        }
    }
}

/// A validated and normalized credential.
///
/// Only [`resolve`] creates records, therefore every record carries a usable project
/// id, private key and client email.
#[derive(Clone)]
pub struct CredentialRecord {
    project_id: String,
    private_key: String,
    client_email: String,
    storage_bucket: Option<String>,
    private_key_id: Option<String>,
    token_uri: String,
    source: CredentialSource,
}

impl CredentialRecord {
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The PEM encoded private key with real line breaks.
    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    pub fn storage_bucket(&self) -> Option<&str> {
        self.storage_bucket.as_deref()
    }

    pub fn private_key_id(&self) -> Option<&str> {
        self.private_key_id.as_deref()
    }

    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    pub fn source(&self) -> &CredentialSource {
        &self.source
    }
}

impl std::fmt::Debug for CredentialRecord {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialRecord")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("storage_bucket", &self.storage_bucket)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}

/// Determines the credential to use for the given environment.
#[tracing::instrument(level = "debug", skip_all, fields(mode = %context.mode()))]
pub fn resolve(context: &EnvironmentContext) -> Result<CredentialRecord, PlatformError> {
    if let Some(path) = context.credentials_path() {
        if context.mode().is_production() {
            tracing::debug!(
                "Ignoring credentials file '{}' as files are not trusted in production",
                path.display()
            );
        } else {
            match from_bundle(path, context) {
                Ok(record) => {
                    tracing::info!("Platform credentials loaded from '{}'", path.display());
                    return Ok(record);
                }
                Err(err) => {
                    tracing::warn!(
                        "Cannot use credentials file '{}', trying environment variables: {:#}",
                        path.display(),
                        err
                    );
                }
            }
        }
    }

    let record = from_environment(context)?;
    tracing::info!("Platform credentials loaded from environment variables");

    Ok(record)
}

/// Replaces every literal `\n` escape with a real line break.
///
/// Keys passed through single line environment values usually arrive with
/// escaped line breaks. Applying this twice yields the same result as once.
pub fn normalize_private_key(private_key: &str) -> String {
    private_key.replace("\\n", "\n")
}

fn from_bundle(path: &Path, context: &EnvironmentContext) -> anyhow::Result<CredentialRecord> {
    let bundle = CredentialBundle::load(path)?;
    let (project_id, private_key, client_email) = validate(
        Some(&bundle.project_id),
        Some(&bundle.private_key),
        Some(&bundle.client_email),
    )?;

    Ok(CredentialRecord {
        project_id,
        private_key,
        client_email,
        storage_bucket: context.storage_bucket().map(str::to_string),
        private_key_id: bundle.private_key_id,
        token_uri: bundle
            .token_uri
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        source: CredentialSource::Bundle(path.to_path_buf()),
    })
}

fn from_environment(context: &EnvironmentContext) -> Result<CredentialRecord, PlatformError> {
    let (project_id, private_key, client_email) = validate(
        context.project_id(),
        context.private_key(),
        context.client_email(),
    )?;

    Ok(CredentialRecord {
        project_id,
        private_key,
        client_email,
        storage_bucket: context.storage_bucket().map(str::to_string),
        private_key_id: None,
        token_uri: DEFAULT_TOKEN_URI.to_string(),
        source: CredentialSource::Environment,
    })
}

fn validate(
    project_id: Option<&str>,
    private_key: Option<&str>,
    client_email: Option<&str>,
) -> Result<(String, String, String), PlatformError> {
    let project_id = usable(CredentialField::ProjectId, project_id);
    let private_key = usable(CredentialField::PrivateKey, private_key);
    let client_email = usable(CredentialField::ClientEmail, client_email);

    match (project_id, private_key, client_email) {
        (Some(project_id), Some(private_key), Some(client_email)) => Ok((
            project_id.to_string(),
            normalize_private_key(private_key),
            client_email.to_string(),
        )),
        (project_id, private_key, client_email) => {
            let missing = [
                (CredentialField::ProjectId, project_id.is_none()),
                (CredentialField::PrivateKey, private_key.is_none()),
                (CredentialField::ClientEmail, client_email.is_none()),
            ]
            .into_iter()
            .filter_map(|(field, is_missing)| is_missing.then_some(field))
            .collect();

            Err(PlatformError::NotConfigured { missing })
        }
    }
}

/// Returns the trimmed value if it is present and not a known placeholder.
///
/// This is a best-effort guard against shipping sample values, not a
/// guarantee that the credential works. The platform client still verifies the key.
fn usable(field: CredentialField, value: Option<&str>) -> Option<&str> {
    let value = value.map(str::trim).filter(|value| !value.is_empty())?;

    let is_usable = match field {
        CredentialField::ProjectId => value != PLACEHOLDER_PROJECT_ID,
        CredentialField::PrivateKey => !value.contains(PLACEHOLDER_PRIVATE_KEY),
        CredentialField::ClientEmail => {
            !value.contains(PLACEHOLDER_CLIENT_EMAIL) && EMAIL_REGEX.is_match(value)
        }
    };

    if is_usable {
        Some(value)
    } else {
        tracing::debug!("Rejecting placeholder value for {}", field);
        None
    }
}
