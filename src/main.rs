// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! panel-client CLI
//!
//! Sends one request through the shared client, for poking at a panel by hand.

use std::env;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context};
use serde_json::{Map, Value};

use panel_client::{FormData, HttpClient, HttpClientConfig, RequestBuilder, Response};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("panel_client=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let command = args[1].as_str();
    match command {
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("panel-client {}", panel_client::VERSION);
            return ExitCode::SUCCESS;
        }
        "get" | "post" | "json" | "upload" => {}
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    }

    if args.len() < 3 {
        eprintln!("Usage: panel-client {} <url> ...", command);
        return ExitCode::from(1);
    }

    let expired = Arc::new(AtomicBool::new(false));
    match run(command, &args[2], &args[3..], expired.clone()).await {
        Ok(_) if expired.load(Ordering::SeqCst) => {
            eprintln!("Session expired, log in again");
            ExitCode::from(3)
        }
        Ok(response) => {
            print_response(&response);
            if response.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(2)
            }
        }
        Err(e) => {
            eprintln!("Request failed: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"panel-client - Shared HTTP client for the panel API

USAGE:
    panel-client <COMMAND> <url> [ARGS]

COMMANDS:
    get <url>                        Send a GET request
    post <url> [key=value...]        POST fields, encoding picked by path
    json <url> [key=value...]        POST fields as JSON
    upload <url> <field> <file>      POST a file as multipart/form-data
    help                             Show this help message
    version                          Show version information

Repeating a key sends it as a list (ids=1 ids=2 -> ids=1&ids=2).

ENVIRONMENT:
    PANEL_BASE_URL    Base URL for relative targets
    RUST_LOG          Log filter (default: panel_client=info)

EXAMPLES:
    panel-client post https://panel.example/login username=admin password=admin
    PANEL_BASE_URL=https://panel.example panel-client get /panel/api/inbounds/list
"#
    );
}

async fn run(
    command: &str,
    url: &str,
    rest: &[String],
    expired: Arc<AtomicBool>,
) -> anyhow::Result<Response> {
    let client = build_client(expired)?;

    let request: RequestBuilder = match command {
        "get" => client.get(url),
        "post" => client.post(url).data(&parse_fields(rest)?),
        "json" => client.post(url).json(&parse_fields(rest)?),
        "upload" => {
            let (field, path) = match rest {
                [field, path] => (field, path),
                _ => bail!("Usage: panel-client upload <url> <field> <file>"),
            };
            let form = FormData::new()
                .file(field.as_str(), path)
                .await
                .with_context(|| format!("Failed to read {}", path))?;
            client.post(url).multipart(form)
        }
        other => bail!("Unknown command: {}", other),
    };

    Ok(request.send().await?)
}

fn build_client(expired: Arc<AtomicBool>) -> anyhow::Result<HttpClient> {
    let mut config = HttpClientConfig::new();
    if let Ok(base) = env::var("PANEL_BASE_URL") {
        config = config
            .base_url(&base)
            .with_context(|| format!("Invalid PANEL_BASE_URL: {}", base))?;
    }

    let client = HttpClient::builder()
        .config(config)
        .on_session_expired(move |_| expired.store(true, Ordering::SeqCst))
        .build()?;
    Ok(client)
}

/// Parse `key=value` arguments, collecting repeated keys into lists
fn parse_fields(args: &[String]) -> anyhow::Result<Map<String, Value>> {
    let mut fields = Map::new();
    for arg in args {
        let Some((key, value)) = arg.split_once('=') else {
            bail!("Expected key=value, got '{}'", arg);
        };
        let value = Value::String(value.to_string());
        match fields.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                fields.insert(key.to_string(), value);
            }
        }
    }
    Ok(fields)
}

fn print_response(response: &Response) {
    println!("Status: {}", response.status);
    println!("URL: {}", response.url);
    println!("Content-Type: {:?}", response.content_type());
    println!("Time: {}ms", response.response_time_ms);
    println!();
    println!("{}", render_body(response));
}

/// Pretty-print JSON bodies, everything else as text
fn render_body(response: &Response) -> String {
    if response.is_json() {
        if let Ok(value) = response.json::<Value>() {
            if let Ok(pretty) = serde_json::to_string_pretty(&value) {
                return pretty;
            }
        }
    }
    response.text_lossy()
}
