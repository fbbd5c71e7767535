use clap::{Parser, Subcommand};
use percent_encoding::percent_decode_str;
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "spot-cli")]
#[command(about = "Query a running spot-router", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Ask for the X-DEBUG trace and print it
    #[arg(long)]
    debug: bool,

    /// Accept a cached reply up to this many seconds old
    #[arg(long)]
    max_age: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the router is up
    Ping,
    /// Fastest provider's spot price
    Race { symbol: String },
    /// Every provider's spot price
    All { symbol: String },
    /// One named provider's spot price
    Direct { provider: String, symbol: String },
}

impl Commands {
    fn path(&self) -> String {
        match self {
            Commands::Ping => "/api/ping".to_string(),
            Commands::Race { symbol } => format!("/api/race/spot/{}", symbol),
            Commands::All { symbol } => format!("/api/all/spot/{}", symbol),
            Commands::Direct { provider, symbol } => format!("/api/direct/{}/spot/{}", provider, symbol),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(max_age) = cli.max_age {
        headers.insert(CACHE_CONTROL, HeaderValue::from_str(&format!("max-age={}", max_age))?);
    }

    let mut request = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), cli.command.path()))
        .headers(headers);
    if cli.debug {
        request = request.query(&[("debug", "true")]);
    }

    print_response(request.send().await?, cli.debug).await
}

async fn print_response(res: reqwest::Response, debug: bool) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let age = res.headers().get("age").and_then(|v| v.to_str().ok()).map(str::to_string);
    let trace = res
        .headers()
        .get("x-debug")
        .and_then(|v| v.to_str().ok())
        .map(|v| percent_decode_str(v).decode_utf8_lossy().into_owned());
    let error = res
        .headers()
        .get("x-debug-error")
        .and_then(|v| v.to_str().ok())
        .map(|v| percent_decode_str(v).decode_utf8_lossy().into_owned());
    let text = res.text().await?;

    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
        if let Some(error) = error {
            eprintln!("Cause: {}", error);
        }
        if !text.is_empty() {
            eprintln!("Response: {}", text);
        }
    } else {
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", text),
        }
        if let Some(age) = age {
            println!("(cached, age {}s)", age);
        }
    }

    if debug {
        if let Some(trace) = trace {
            eprintln!("--- trace ---\n{}", trace);
        }
    }
    Ok(())
}
