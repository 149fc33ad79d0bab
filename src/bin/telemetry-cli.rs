use clap::{Parser, Subcommand};
use serde_json::Value;
use std::time::Duration;

use telemetry_relay::config::ClientConfig;
use telemetry_relay::record::{AttributeValue, Attributes};
use telemetry_relay::{EventPayload, MetricKind, TelemetryClient};

#[derive(Parser)]
#[command(name = "telemetry-cli")]
#[command(about = "Emit test telemetry to a relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    server_url: String,

    /// How long to wait for in-flight deliveries before exiting.
    #[arg(long, default_value_t = 2000)]
    settle_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one event
    Event {
        event_type: String,
        #[arg(long)]
        level: Option<i64>,
        #[arg(long)]
        score: Option<i64>,
        #[arg(long)]
        data: Option<String>,
        /// Attribute as key=value; repeatable
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, AttributeValue)>,
    },
    /// Send one metric sample
    Metric {
        name: String,
        value: f64,
        #[arg(long, default_value = "gauge")]
        kind: MetricKind,
        /// Label as key=value; repeatable
        #[arg(long = "label", value_parser = parse_attr)]
        labels: Vec<(String, AttributeValue)>,
    },
    /// Time a sleep as a span
    Span {
        operation: String,
        #[arg(long, default_value_t = 50)]
        sleep_ms: u64,
        #[arg(long = "attr", value_parser = parse_attr)]
        attrs: Vec<(String, AttributeValue)>,
    },
    /// Query the relay health endpoint
    Health,
    /// Play a short scripted game session
    Demo,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Health => {
            let url = format!("{}/health", cli.server_url.trim_end_matches('/'));
            let res = reqwest::get(url).await?;
            print_response(res).await
        }
        command => emit(command, &cli.server_url, Duration::from_millis(cli.settle_ms)).await,
    }
}

async fn emit(
    command: Commands,
    server_url: &str,
    settle: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig {
        server_url: server_url.to_string(),
        ..ClientConfig::default()
    };
    let client = TelemetryClient::from_config(&config)?;
    println!("session {} correlation {}", client.session_id(), client.correlation_id());

    match command {
        Commands::Event {
            event_type,
            level,
            score,
            data,
            attrs,
        } => {
            let payload = EventPayload {
                level,
                score,
                data,
                attributes: attrs.into_iter().collect(),
            };
            client.record_event(&event_type, payload);
        }
        Commands::Metric {
            name,
            value,
            kind,
            labels,
        } => {
            client.record_metric(&name, value, kind, labels.into_iter().collect());
        }
        Commands::Span {
            operation,
            sleep_ms,
            attrs,
        } => {
            let mut span = client.start_span(operation);
            for (key, value) in attrs {
                span.set_attribute(key, value)?;
            }
            tokio::time::sleep(Duration::from_millis(sleep_ms)).await;
            span.end()?;
            println!("trace {} span {}", span.trace_id(), span.span_id());
        }
        Commands::Demo => demo(&client).await?,
        Commands::Health => {}
    }

    let pending = client.settle(settle).await;
    if pending > 0 {
        eprintln!("Warning: {} deliveries still in flight", pending);
    }
    Ok(())
}

async fn demo(client: &TelemetryClient) -> Result<(), Box<dyn std::error::Error>> {
    client.record_event("game_start", EventPayload::default());

    for level in 1..=3 {
        let mut span = client.start_span("level_load");
        span.set_attribute("level", level)?;
        tokio::time::sleep(Duration::from_millis(20)).await;
        span.end()?;

        client.record_event("level_change", EventPayload::default().level(level));
        client.record_event("score_change", EventPayload::default().score(level * 100));
        client.record_metric("fps", 60.0 - level as f64, MetricKind::Gauge, Attributes::new());
        client.record_metric(
            "frame_time_ms",
            16.0 + level as f64,
            MetricKind::Histogram,
            Attributes::new(),
        );
    }

    client.rotate_correlation_id();
    client.record_event("game_over", EventPayload::default().data("demo finished"));
    Ok(())
}

fn parse_attr(raw: &str) -> Result<(String, AttributeValue), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", raw))?;
    let value = if let Ok(v) = value.parse::<i64>() {
        AttributeValue::Int(v)
    } else if let Ok(v) = value.parse::<f64>() {
        AttributeValue::Float(v)
    } else if let Ok(v) = value.parse::<bool>() {
        AttributeValue::Bool(v)
    } else {
        AttributeValue::String(value.to_string())
    };
    Ok((key.to_string(), value))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: relay returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
