use crate::platform::environment::{ENV_CLIENT_EMAIL, ENV_PRIVATE_KEY, ENV_PROJECT_ID};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// A credential component which must be present before a platform client is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialField {
    ProjectId,
    PrivateKey,
    ClientEmail,
}

impl CredentialField {
    pub const ALL: [CredentialField; 3] = [
        CredentialField::ProjectId,
        CredentialField::PrivateKey,
        CredentialField::ClientEmail,
    ];

    /// The environment variable which supplies this field.
    pub fn env_var(&self) -> &'static str {
        match self {
            CredentialField::ProjectId => ENV_PROJECT_ID,
            CredentialField::PrivateKey => ENV_PRIVATE_KEY,
            CredentialField::ClientEmail => ENV_CLIENT_EMAIL,
        }
    }
}

impl Display for CredentialField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.env_var())
    }
}

/// Failures which abort the startup of the platform.
///
/// A file bundle which cannot be used is never reported through this type; the
/// resolver logs it and falls back to the environment.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Platform credentials not configured. Missing or placeholder values: {}", join(.missing))]
    NotConfigured { missing: Vec<CredentialField> },

    #[error("Platform client rejected the credentials of '{client_email}': {reason}")]
    ClientRejected { client_email: String, reason: String },

    #[error("Platform initialization already failed. Restart the process with a valid configuration")]
    InitializationFailed,
}

fn join(fields: &[CredentialField]) -> String {
    fields
        .iter()
        .map(CredentialField::env_var)
        .collect::<Vec<_>>()
        .join(", ")
}
