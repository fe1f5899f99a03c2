//! Request command implementation.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use serde_json::Value;

use reelpass_http::{Method, RequestOptions};

use crate::cli::GlobalArgs;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Path below the API base URL, or an absolute URL
    pub target: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// JSON request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Query parameter as name=value (repeatable)
    #[arg(short, long = "query", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,

    /// Extra header as name=value (repeatable)
    #[arg(short = 'H', long = "header", value_parser = parse_pair)]
    pub headers: Vec<(String, String)>,
}

fn parse_pair(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

pub async fn run(global: &GlobalArgs, args: RequestArgs) -> Result<()> {
    let (auth, _store) = storage::connect(global)?;

    let method = Method::from_bytes(args.method.to_ascii_uppercase().as_bytes())
        .with_context(|| format!("Invalid HTTP method '{}'", args.method))?;
    let mut options = RequestOptions::new(method);

    if let Some(data) = &args.data {
        let body: Value = serde_json::from_str(data).context("Request body is not valid JSON")?;
        options = options.body(body);
    }
    for (name, value) in args.query {
        options = options.query(name, value);
    }
    for (name, value) in args.headers {
        options = options.header(name, value);
    }

    match auth.request(&args.target, &options).await {
        Ok(body) => output::json_pretty(&body),
        Err(err) => {
            output::json(&err)?;
            if err.is_unauthorized() {
                output::error("Session expired. Run 'reelpass login' again.");
            }
            Err(anyhow!(err).context("Request failed"))
        }
    }
}
