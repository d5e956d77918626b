use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::OutputFormat;
use crate::config;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(help = "Subject (user id) to embed as the sub claim")]
    pub sub: String,

    #[arg(long, help = "Lifetime in hours (defaults to JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let token = generate_jwt(&Claims::new(&args.sub, hours), &security.jwt_secret)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&json!({ "token": token, "sub": args.sub, "expires_in_hours": hours }))?
        ),
        OutputFormat::Text => println!("{}", token),
    }

    Ok(())
}
