use std::env;
use std::path::{Path, PathBuf};

use expense_agent_azure_model::{
    AzureConfig, AzureConfigBuilder, Credential, DEFAULT_API_VERSION,
};

use crate::Error;

const ENDPOINT_VAR: &str = "AZURE_AI_PROJECT_ENDPOINT";
const DEPLOYMENT_VAR: &str = "AZURE_AI_MODEL_DEPLOYMENT_NAME";
const API_KEY_VAR: &str = "AZURE_AI_API_KEY";
const BEARER_TOKEN_VAR: &str = "AZURE_AI_BEARER_TOKEN";
const API_VERSION_VAR: &str = "AZURE_AI_API_VERSION";
const DATA_FILE_VAR: &str = "EXPENSE_AGENT_DATA_FILE";

/// Runtime settings of the expense agent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The project (or resource) endpoint of the Azure AI service.
    pub endpoint: String,
    /// The name of the model deployment to use.
    pub deployment_name: String,
    /// How requests are authenticated.
    pub credential: Credential,
    /// The REST API version to request.
    pub api_version: String,
    /// The file that holds the expenses data.
    pub data_path: PathBuf,
}

impl Config {
    /// Reads the settings from the process environment.
    ///
    /// A `.env` file should already have been loaded by the caller.
    #[inline]
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the settings through the given lookup function. Blank values
    /// are treated like missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };
        let require = |name: &str| {
            lookup(name).ok_or_else(|| {
                Error::Configuration(format!(
                    "environment variable {name} is not set"
                ))
            })
        };

        let endpoint = require(ENDPOINT_VAR)?;
        let deployment_name = require(DEPLOYMENT_VAR)?;
        // A key wins over a token, which wins over the Azure CLI.
        let credential = match (lookup(API_KEY_VAR), lookup(BEARER_TOKEN_VAR)) {
            (Some(key), _) => Credential::ApiKey(key),
            (None, Some(token)) => Credential::BearerToken(token),
            (None, None) => Credential::AzureCli,
        };
        let api_version = lookup(API_VERSION_VAR)
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned());
        let data_path = lookup(DATA_FILE_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(Self::default_data_path);

        Ok(Self {
            endpoint,
            deployment_name,
            credential,
            api_version,
            data_path,
        })
    }

    /// The bundled sample `data.txt`, next to this crate's manifest.
    #[inline]
    pub fn default_data_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("data.txt")
    }

    /// Returns the provider configuration for these settings.
    pub fn azure_config(&self) -> AzureConfig {
        AzureConfigBuilder::new(&*self.endpoint, &*self.deployment_name)
            .with_credential(self.credential.clone())
            .with_api_version(&*self.api_version)
            .build()
    }
}
