
use expense_agent_azure_model::AzureProvider;
use expense_agent_model::ModelProvider;
use tokio::io::AsyncBufRead;
use tracing::Instrument;

use crate::loader::load_expenses;
use crate::prompt::{collect_prompt, render_intro};
use crate::{Config, Console, Error, RemoteAgentError, SessionBuilder};

/// Opens the remote side of a run.
///
/// Connecting is where credentials get acquired, so the connector is only
/// invoked once the user has entered an instruction.
pub trait Connector {
    /// The provider produced by this connector.
    type Provider: ModelProvider + 'static;

    /// Acquires credentials and connects to the configured model.
    fn connect(
        &self,
        config: &Config,
    ) -> impl Future<Output = Result<Self::Provider, RemoteAgentError>> + Send;
}

/// Connects to Azure with [`AzureProvider`].
#[derive(Clone, Copy, Debug, Default)]
pub struct AzureConnector;

impl Connector for AzureConnector {
    type Provider = AzureProvider;

    fn connect(
        &self,
        config: &Config,
    ) -> impl Future<Output = Result<AzureProvider, RemoteAgentError>> + Send
    {
        let azure_config = config.azure_config();
        async move {
            AzureProvider::connect(azure_config)
                .await
                .map_err(RemoteAgentError::from)
        }
    }
}

/// The stages a run goes through, in order.
///
/// A run that fails to load the data stops right after `Start`. Once the
/// data is loaded, the run passes through either `ResponseReceived` or
/// `Failed` and then reaches `End`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The run has started.
    Start,
    /// The expenses data was loaded and shown.
    DataLoaded,
    /// The user entered an instruction.
    PromptCollected,
    /// The agent answered.
    ResponseReceived,
    /// The remote agent failed.
    Failed,
    /// The run is over.
    End,
}

/// How a run that got past loading the data ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The final text answer of the agent.
    ResponseReceived(String),
    /// The remote agent failed. The error has been reported to the user.
    Failed(RemoteAgentError),
}

type StageFn = Box<dyn Fn(Stage) + Send + Sync>;

/// Runs the expense claim flow once: load, show, ask, process, report.
pub struct Orchestrator<C> {
    config: Config,
    connector: C,
    on_stage: Option<StageFn>,
}

impl<C: Connector> Orchestrator<C> {
    /// Creates an orchestrator.
    #[inline]
    pub fn new(config: Config, connector: C) -> Self {
        Self {
            config,
            connector,
            on_stage: None,
        }
    }

    /// Attaches a callback to be invoked when the run enters a stage.
    #[inline]
    pub fn on_stage(
        mut self,
        on_stage: impl Fn(Stage) + Send + Sync + 'static,
    ) -> Self {
        self.on_stage = Some(Box::new(on_stage));
        self
    }

    /// Executes one run, reading the instruction from `input` and showing
    /// everything on `console`.
    ///
    /// Only a failure to load the expenses is returned as an error. Remote
    /// failures are reported on the console and returned as
    /// [`Outcome::Failed`].
    pub async fn run<R>(
        &self,
        input: &mut R,
        console: &Console,
    ) -> Result<Outcome, Error>
    where
        R: AsyncBufRead + Unpin,
    {
        self.enter(Stage::Start);
        let data = load_expenses(&self.config.data_path).await?;
        self.enter(Stage::DataLoaded);

        console.print(&render_intro(&data));
        let prompt = collect_prompt(input).await;
        self.enter(Stage::PromptCollected);

        let outcome = match self
            .process_expenses(&prompt, &data, console)
            .instrument(info_span!("process expenses"))
            .await
        {
            Ok(response) => {
                self.enter(Stage::ResponseReceived);
                console.print(&format!("\n# Agent:\n{response}\n"));
                Outcome::ResponseReceived(response)
            }
            Err(err) => {
                self.enter(Stage::Failed);
                error!("remote agent failed ({}): {err}", err.kind());
                console.print(&format!("Error while running agent: {err}\n"));
                Outcome::Failed(err)
            }
        };

        self.enter(Stage::End);
        Ok(outcome)
    }

    async fn process_expenses(
        &self,
        prompt: &str,
        data: &str,
        console: &Console,
    ) -> Result<String, RemoteAgentError> {
        let provider = self.connector.connect(&self.config).await?;
        let session = SessionBuilder::with_model_provider(provider)
            .with_console(console.clone())
            .build();
        session.submit(compose_message(prompt, data)).await
    }

    fn enter(&self, stage: Stage) {
        debug!("entering stage {stage:?}");
        if let Some(on_stage) = &self.on_stage {
            on_stage(stage);
        }
    }
}

/// Builds the single user message sent to the agent.
#[inline]
pub fn compose_message(prompt: &str, data: &str) -> String {
    format!("{prompt}: {data}")
}
