use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "bedrock-prompt-form", about = "Prompt form for hosted Claude models")]
pub struct Config {
    #[arg(long, env, default_value = "0.0.0.0:8080")]
    pub bind_addr: String,
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1")]
    pub region: String,
    /// Overrides the regional runtime endpoint (VPC endpoints, proxies, local stand-ins).
    #[arg(long, env = "BEDROCK_ENDPOINT")]
    pub endpoint: Option<String>,
    #[arg(long, env = "AWS_BEARER_TOKEN_BEDROCK", hide_env_values = true)]
    pub api_key: Option<String>,
    /// JSON form profile; the built-in Claude 3 profile is used when absent.
    #[arg(long, env = "FORM_PROFILE")]
    pub profile: Option<PathBuf>,
}
