use anyhow::Context;
use axum::routing::get;
use bedrock_prompt_form::{
api,
config::Config,
model::{bedrock::BedrockRuntime, InferenceAdapter},
profile::FormProfile,
validate::Validator,
};
use dotenvy::dotenv;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{fmt, EnvFilter};


#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
dotenv().ok();
let cfg = <Config as clap::Parser>::parse();


// logs
let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
fmt().with_env_filter(filter).init();


// metrics
let prometheus = PrometheusBuilder::new().install_recorder().context("install metrics recorder")?;


// profile & validator
let profile = match &cfg.profile {
Some(path) => FormProfile::from_path(path)?,
None => FormProfile::default(),
};
let validator = Arc::new(Validator::for_profile(&profile)?);
tracing::info!(title = %profile.title, models = profile.models.len(), "form profile loaded");


// model runtime
let endpoint = cfg.endpoint.clone().unwrap_or_else(|| BedrockRuntime::regional_endpoint(&cfg.region));
let runtime = BedrockRuntime::new(&endpoint, cfg.api_key.clone())?;
tracing::info!(%endpoint, "model endpoint configured");


let app = api::routes(InferenceAdapter::new(runtime), validator, Arc::new(profile))
.route("/metrics", get(move || async move { prometheus.render() }));
let addr: SocketAddr = cfg.bind_addr.parse().with_context(|| format!("parse bind address {:?}", cfg.bind_addr))?;


tracing::info!(%addr, "listening");
axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
.with_graceful_shutdown(shutdown_signal())
.await?;
Ok(())
}


async fn shutdown_signal() {
if let Err(e) = tokio::signal::ctrl_c().await {
tracing::warn!(error = %e, "ctrl-c handler failed; running until killed");
std::future::pending::<()>().await;
}
tracing::info!("shutting down");
}
