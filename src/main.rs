//! Pingmon - network latency monitor
//!
//! Entry point for the console monitor.

use anyhow::{anyhow, bail, Result};
use pingmon::config::AppConfig;
use pingmon::render::{freshness_line, status_line};
use pingmon_core::probe::{ReplaySource, SampleSource};
use pingmon_core::series::Transform;
use pingmon_server::{AppState, MonitorHandle, ServerConfig};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info};

/// What the command line asked for
enum Invocation {
    Run {
        config: AppConfig,
        replay: Option<Vec<Option<u64>>>,
        save: bool,
    },
    Exit,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("pingmon=info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, replay, save) = match parse_args(&args, AppConfig::load()) {
        Ok(Invocation::Run {
            config,
            replay,
            save,
        }) => (config, replay, save),
        Ok(Invocation::Exit) => return Ok(()),
        Err(e) => {
            eprintln!("Error: {}", e);
            println!();
            print_help();
            return Ok(());
        }
    };

    println!("Pingmon v{} - latency monitor", pingmon::VERSION);
    println!();

    run(&config, replay)?;

    if save {
        if let Err(e) = config.save(&AppConfig::path()) {
            error!("Failed to save config: {}", e);
        }
    }
    Ok(())
}

fn print_help() {
    println!("Usage: pingmon [OPTIONS] [HOST]");
    println!();
    println!("Options:");
    println!("  -p, --port PORT         TCP port to probe (default: 53)");
    println!("  -i, --interval MS       Tick interval in milliseconds (default: 500)");
    println!("  -w, --width N           Window width in samples (default: 10, max 600)");
    println!("  -t, --transform NAME    Chart transform: log10 or identity");
    println!("      --timeout MS        Connect timeout in milliseconds (default: 1000)");
    println!("      --short             Show every other freshness threshold");
    println!("  -s, --serve PORT        Serve the REST/WebSocket API on PORT");
    println!("      --replay LIST       Replay RTTs instead of probing, e.g. 20,35,x,40");
    println!("      --no-save           Do not persist settings on exit");
    println!("  -v, --version           Show version");
    println!("  -h, --help              Show this help");
    println!();
    println!("Examples:");
    println!("  pingmon 1.1.1.1 -p 443 -w 60");
    println!("  pingmon --replay 20,35,x,40 -t identity");
}

/// Take the value following a flag
fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str> {
    args.get(i + 1)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("{} requires a value", flag))
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid value for {}: {}", flag, value))
}

/// Parse `20,35,x,40` into RTTs, `x` marking a failed probe
fn parse_replay(list: &str) -> Result<Vec<Option<u64>>> {
    let script = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| match s {
            "x" | "X" => Ok(None),
            ms => parse_number(ms, "--replay").map(Some),
        })
        .collect::<Result<Vec<_>>>()?;
    if script.is_empty() {
        bail!("--replay needs at least one value");
    }
    Ok(script)
}

fn parse_args(args: &[String], mut config: AppConfig) -> Result<Invocation> {
    let mut replay = None;
    let mut save = true;
    let mut i = 0;

    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--version" | "-v" => {
                println!("pingmon {} ({})", pingmon::VERSION, pingmon_core::BUILD_DATE);
                return Ok(Invocation::Exit);
            }
            "--help" | "-h" => {
                print_help();
                return Ok(Invocation::Exit);
            }
            "--short" => config.short_view = true,
            "--no-save" => save = false,
            "--port" | "-p" => {
                config.port = parse_number(value_of(args, i, flag)?, flag)?;
                i += 1;
            }
            "--interval" | "-i" => {
                config.interval_ms = parse_number(value_of(args, i, flag)?, flag)?;
                i += 1;
            }
            "--width" | "-w" => {
                config.window_width = pingmon_core::monitor::parse_width(value_of(args, i, flag)?)?;
                i += 1;
            }
            "--transform" | "-t" => {
                config.transform = value_of(args, i, flag)?.parse::<Transform>()?;
                i += 1;
            }
            "--timeout" => {
                config.timeout_ms = parse_number(value_of(args, i, flag)?, flag)?;
                i += 1;
            }
            "--serve" | "-s" => {
                config.server_port = Some(parse_number(value_of(args, i, flag)?, flag)?);
                i += 1;
            }
            "--replay" => {
                replay = Some(parse_replay(value_of(args, i, flag)?)?);
                i += 1;
            }
            arg if arg.starts_with('-') => bail!("Unknown argument: {}", arg),
            host => config.host = host.to_string(),
        }
        i += 1;
    }

    Ok(Invocation::Run {
        config,
        replay,
        save,
    })
}

fn run(config: &AppConfig, replay: Option<Vec<Option<u64>>>) -> Result<()> {
    let source: Box<dyn SampleSource + Send> = match replay {
        Some(script) => Box::new(ReplaySource::new(script).looping()),
        None => Box::new(config.probe()),
    };
    println!("Probing {} every {} ms", source.target(), config.interval_ms);
    println!("Press Ctrl+C to stop.");
    println!("────────────────────────────────────────");

    let rt = tokio::runtime::Runtime::new()?;
    let monitor = MonitorHandle::spawn(source, config.driver_options())?;

    if let Some(port) = config.server_port {
        let state = AppState::new(
            monitor.clone(),
            ServerConfig {
                port,
                ..Default::default()
            },
        );
        rt.spawn(async move {
            if let Err(e) = pingmon_server::start_server(state).await {
                error!("Web server error: {}", e);
            }
        });
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .ok();

    let mut rx = monitor.subscribe();
    rt.block_on(async {
        while running.load(Ordering::SeqCst) {
            match tokio::time::timeout(Duration::from_millis(100), rx.recv()).await {
                Ok(Ok(snapshot)) => {
                    println!("{}", status_line(&snapshot));
                    println!("{}", freshness_line(&snapshot.freshness));
                }
                Ok(Err(RecvError::Lagged(_))) | Err(_) => continue,
                Ok(Err(RecvError::Closed)) => break,
            }
        }
    });

    println!();
    info!("Stopping");
    let _ = rt.block_on(monitor.set_running(false));
    Ok(())
}
