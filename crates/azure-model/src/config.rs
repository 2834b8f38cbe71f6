use crate::Credential;

/// The API version used when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-10-21";

/// Builder for [`AzureConfig`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AzureConfigBuilder {
    endpoint: String,
    deployment: String,
    credential: Option<Credential>,
    api_version: Option<String>,
}

impl AzureConfigBuilder {
    /// Creates a builder for the given endpoint and model deployment.
    ///
    /// The endpoint may be either a resource endpoint
    /// (`https://<resource>.openai.azure.com`) or a Foundry project
    /// endpoint (`https://<resource>.services.ai.azure.com/api/projects/<project>`).
    #[inline]
    pub fn new<E: Into<String>, D: Into<String>>(
        endpoint: E,
        deployment: D,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            deployment: deployment.into(),
            credential: None,
            api_version: None,
        }
    }

    /// Sets the credential, defaults to [`Credential::AzureCli`].
    #[inline]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Sets a custom API version.
    #[inline]
    pub fn with_api_version<S: Into<String>>(mut self, api_version: S) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Builds the configuration.
    #[inline]
    pub fn build(self) -> AzureConfig {
        AzureConfig {
            endpoint: self.endpoint,
            deployment: self.deployment,
            credential: self.credential.unwrap_or(Credential::AzureCli),
            api_version: self
                .api_version
                .unwrap_or_else(|| DEFAULT_API_VERSION.to_owned()),
        }
    }
}

/// Configuration for the Azure chat-completions provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AzureConfig {
    pub(crate) endpoint: String,
    pub(crate) deployment: String,
    pub(crate) credential: Credential,
    pub(crate) api_version: String,
}

impl AzureConfig {
    /// Returns the model deployment name.
    #[inline]
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Returns the chat completions URL of the deployment.
    pub fn chat_completions_url(&self) -> String {
        let mut root = self.endpoint.trim_end_matches('/');
        // Project endpoints share the resource's inference routes.
        if let Some(idx) = root.find("/api/projects/") {
            root = &root[..idx];
        }
        format!(
            "{root}/openai/deployments/{}/chat/completions?api-version={}",
            self.deployment, self.api_version
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_endpoint_url() {
        let config =
            AzureConfigBuilder::new("https://demo.openai.azure.com/", "gpt-4o")
                .build();
        assert_eq!(
            config.chat_completions_url(),
            "https://demo.openai.azure.com/openai/deployments/gpt-4o/chat/completions?api-version=2024-10-21"
        );
        assert_eq!(config.credential, Credential::AzureCli);
    }

    #[test]
    fn test_project_endpoint_url() {
        let config = AzureConfigBuilder::new(
            "https://demo.services.ai.azure.com/api/projects/expenses",
            "gpt-4o-mini",
        )
        .with_api_version("2025-01-01-preview")
        .build();
        assert_eq!(
            config.chat_completions_url(),
            "https://demo.services.ai.azure.com/openai/deployments/gpt-4o-mini/chat/completions?api-version=2025-01-01-preview"
        );
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = AzureConfigBuilder::new("https://demo", "gpt-4o")
            .with_credential(Credential::ApiKey("sk-secret".to_owned()))
            .build();
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-4o"));
    }
}
