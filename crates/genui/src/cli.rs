use agent_client::config::PartialConnectionConfig;
use clap::Parser;
use std::path::PathBuf;

/// Define the application arguments
#[derive(Parser, Debug)]
#[command(version, about = "Generative UI conversations in the terminal", long_about = None)]
pub struct Args {
    /// Azure OpenAI resource endpoint, e.g. https://my-resource.openai.azure.com
    #[arg(long)]
    pub endpoint: Option<String>,

    /// API key for the endpoint
    #[arg(long)]
    pub api_key: Option<String>,

    /// Name of the model deployment
    #[arg(short = 'd', long)]
    pub deployment: Option<String>,

    /// API version query parameter
    #[arg(long)]
    pub api_version: Option<String>,

    /// Connection settings file (defaults to ~/.config/genui/connection.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Sampling temperature for generation requests (model default when omitted)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Replay recorded UI responses from a JSON file instead of calling the endpoint
    #[arg(long)]
    pub playback: Option<PathBuf>,

    /// Enable verbose logging (use multiple times for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Write logs to stderr instead of the log file
    #[arg(long)]
    pub log_stderr: bool,
}

impl Args {
    pub fn parse() -> Self {
        <Args as Parser>::parse()
    }

    /// Connection settings given on the command line
    pub fn connection_overrides(&self) -> PartialConnectionConfig {
        PartialConnectionConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            deployment_name: self.deployment.clone(),
            api_version: self.api_version.clone(),
            mcp_servers: None,
        }
    }
}
