use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::api::{ProxyRequest, ProxyResponse};
use crate::cli::OutputFormat;
use crate::config;
use crate::handlers::{self, HandlerContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Operation {
    Create,
    List,
    Delete,
}

#[derive(Debug, Args)]
pub struct InvokeArgs {
    #[arg(value_enum, help = "Handler to run")]
    pub operation: Operation,

    #[arg(long, conflicts_with_all = ["sub", "body", "id"], help = "Event JSON file ('-' reads stdin)")]
    pub event: Option<PathBuf>,

    #[arg(long, help = "Authorizer sub claim for an inline event")]
    pub sub: Option<String>,

    #[arg(long, help = "Request body for an inline event")]
    pub body: Option<String>,

    #[arg(long, help = "Note id path parameter for an inline event")]
    pub id: Option<String>,
}

impl InvokeArgs {
    /// Event from `--event` contents when given, otherwise from the inline flags
    pub fn build_event(&self, raw: Option<&str>) -> anyhow::Result<ProxyRequest> {
        if let Some(raw) = raw {
            return serde_json::from_str(raw).context("event is not a valid invocation event");
        }

        let mut event = ProxyRequest::new();
        if let Some(sub) = &self.sub {
            event = event.with_subject(sub.clone());
        }
        if let Some(body) = &self.body {
            event = event.with_body(body.clone());
        }
        if let Some(id) = &self.id {
            event = event.with_path_parameter("id", id.clone());
        }
        Ok(event)
    }
}

pub async fn dispatch(ctx: &HandlerContext, operation: Operation, event: &ProxyRequest) -> ProxyResponse {
    match operation {
        Operation::Create => handlers::create_note(ctx, event).await,
        Operation::List => handlers::list_notes(ctx, event).await,
        Operation::Delete => handlers::delete_note(ctx, event).await,
    }
}

async fn read_event(path: &Path) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        tokio::io::stdin()
            .read_to_string(&mut raw)
            .await
            .context("failed to read event from stdin")?;
        return Ok(raw);
    }

    tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read event file {}", path.display()))
}

pub async fn handle(args: InvokeArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let raw = match &args.event {
        Some(path) => Some(read_event(path).await?),
        None => None,
    };
    let event = args.build_event(raw.as_deref())?;

    let ctx = HandlerContext::from_config(config::config())?;
    let response = dispatch(&ctx, args.operation, &event).await;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&response)?),
        OutputFormat::Text => {
            println!("{}", response.status_code);
            let body: Value = response.body_json().unwrap_or(Value::String(response.body.clone()));
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}
