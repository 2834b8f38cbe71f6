use std::fmt::{self, Debug, Formatter};
use std::io;

use expense_agent_model::ErrorKind;
use reqwest::header::{self, HeaderName};
use serde::Deserialize;
use tokio::process::Command;

use crate::Error;

const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// How the provider authenticates against the service.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// A resource key, sent in the `api-key` header.
    ApiKey(String),
    /// A pre-acquired Microsoft Entra access token.
    BearerToken(String),
    /// A token acquired from the signed-in Azure CLI (`az login`).
    AzureCli,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Credential::ApiKey(_) => f.write_str("ApiKey(<redacted>)"),
            Credential::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Credential::AzureCli => f.write_str("AzureCli"),
        }
    }
}

impl Credential {
    /// Acquires the authorization material for requests.
    pub async fn acquire(&self) -> Result<Authorization, Error> {
        match self {
            Credential::ApiKey(key) => Ok(Authorization {
                header: HeaderName::from_static("api-key"),
                value: key.clone(),
                expires_on: None,
            }),
            Credential::BearerToken(token) => Ok(Authorization::bearer(token, None)),
            Credential::AzureCli => acquire_from_azure_cli().await,
        }
    }
}

/// A header that authorizes requests, owned by the provider for as long
/// as it lives.
#[derive(Clone, PartialEq, Eq)]
pub struct Authorization {
    header: HeaderName,
    value: String,
    expires_on: Option<u64>,
}

impl Authorization {
    #[inline]
    fn bearer(token: &str, expires_on: Option<u64>) -> Self {
        Self {
            header: header::AUTHORIZATION,
            value: format!("Bearer {token}"),
            expires_on,
        }
    }

    /// Returns the header name to send the secret in.
    #[inline]
    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Returns the secret header value.
    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the expiry as seconds since the Unix epoch, if known.
    #[inline]
    pub fn expires_on(&self) -> Option<u64> {
        self.expires_on
    }
}

impl Debug for Authorization {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorization")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
    // Only emitted by newer CLI versions.
    #[serde(default, rename = "expires_on")]
    expires_on: Option<u64>,
}

#[inline]
fn azure_cli_command() -> Command {
    let args = [
        "account",
        "get-access-token",
        "--resource",
        COGNITIVE_SERVICES_RESOURCE,
        "--output",
        "json",
    ];
    // `az` is a batch script on Windows.
    if cfg!(windows) {
        let mut command = Command::new("cmd");
        command.arg("/C").arg("az").args(args);
        command
    } else {
        let mut command = Command::new("az");
        command.args(args);
        command
    }
}

async fn acquire_from_azure_cli() -> Result<Authorization, Error> {
    debug!("acquiring token from azure cli");
    let output = azure_cli_command().output().await.map_err(|err| {
        let message = if err.kind() == io::ErrorKind::NotFound {
            "Azure CLI not found on PATH, install it and run `az login`"
                .to_owned()
        } else {
            format!("failed to run Azure CLI: {err}")
        };
        Error::new(message, ErrorKind::Authentication)
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::new(
            format!("Azure CLI could not get a token: {}", stderr.trim()),
            ErrorKind::Authentication,
        ));
    }
    parse_cli_token(&output.stdout)
}

fn parse_cli_token(stdout: &[u8]) -> Result<Authorization, Error> {
    let token: CliToken = serde_json::from_slice(stdout).map_err(|err| {
        Error::new(
            format!("unexpected Azure CLI output: {err}"),
            ErrorKind::Authentication,
        )
    })?;
    Ok(Authorization::bearer(&token.access_token, token.expires_on))
}
