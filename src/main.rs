#![cfg_attr(not(test), deny(clippy::panic))]

use std::io::BufRead;
use std::sync::Arc;

use clap::Parser;
use tetris_relay_server::config;
use tetris_relay_server::logging;
use tetris_relay_server::server::RelayServer;
use tokio::sync::mpsc;

/// Tetris relay -- three-player UDP relay with server-side move validation
#[derive(Parser, Debug)]
#[command(name = "tetris-relay-server")]
#[command(about = "A three-player UDP relay for Tetris with server-side move validation")]
#[command(version)]
struct Cli {
    /// Validate configuration and exit without starting the server.
    #[arg(long, short = 'c', conflicts_with = "print_config")]
    validate_config: bool,

    /// Print the loaded configuration to stdout (as JSON) and exit.
    #[arg(long, conflicts_with = "validate_config")]
    print_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::load();

    if cli.print_config {
        let json = serde_json::to_string_pretty(&cfg)
            .map_err(|e| anyhow::anyhow!("Failed to serialize config: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    // load() only reports validation problems; here they are fatal.
    let validation_result = config::validate_config(&cfg);

    if cli.validate_config {
        match validation_result {
            Ok(()) => {
                println!("Configuration validation passed");
                println!();
                println!("Configuration summary:");
                println!("  Bind address: {}:{}", cfg.bind_address, cfg.port);
                println!("  Worker threads: {}", cfg.server.worker_threads);
                println!("  Receive timeout: {} ms", cfg.server.recv_timeout_ms);
                println!("  File logging: {}", cfg.logging.enable_file_logging);
                return Ok(());
            }
            Err(e) => {
                eprintln!("Configuration validation failed:\n{e}");
                std::process::exit(1);
            }
        }
    }

    validation_result?;

    let _log_guard = logging::init_with_config(&cfg.logging);

    let server = RelayServer::bind(cfg.relay_server_config()?).await?;
    tracing::info!(
        addr = %server.local_addr(),
        "Starting Tetris relay server; type 'exit' or press Ctrl-C to stop"
    );

    let watcher = tokio::spawn(watch_for_shutdown(Arc::clone(&server)));
    server.run().await;
    watcher.abort();

    Ok(())
}

/// Resolve on Ctrl-C or on the console line `exit`, then stop the server.
async fn watch_for_shutdown(server: Arc<RelayServer>) {
    let mut console = spawn_console_reader();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(err) = result {
                tracing::error!(
                    error = %err,
                    "Failed to listen for Ctrl-C; relying on console input"
                );
                let _ = console.recv().await;
            }
        }
        Some(()) = console.recv() => {}
    }

    server.shutdown().await;
}

// A plain thread rather than tokio's stdin: a read blocked in the runtime's
// blocking pool would hold up runtime shutdown until the next line arrives.
fn spawn_console_reader() -> mpsc::UnboundedReceiver<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    let spawned = std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                match line {
                    Ok(line) if line.trim() == "exit" => {
                        let _ = tx.send(());
                        return;
                    }
                    Ok(_) => {}
                    Err(err) => {
                        tracing::warn!(error = %err, "Stopped reading console input");
                        return;
                    }
                }
            }
        });
    if let Err(err) = spawned {
        tracing::warn!(
            error = %err,
            "Failed to start console reader; only Ctrl-C will stop the server"
        );
    }
    rx
}
