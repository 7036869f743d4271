// Line-oriented rover control panel
// Run with: cargo run -p control_panel --bin panel_cli
// Point it at the simulator: ARDUINO_BASE_URL=http://127.0.0.1:8080 cargo run -p control_panel --bin panel_cli

use std::sync::Arc;

use arduino_ctl::client::DeviceClient;
use arduino_ctl::surface::{ControlSurface, FeedbackLevel};
use arduino_ctl::{Channel, MoveCommand, PanelConfig};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::EnvFilter;

type Surface = ControlSurface<DeviceClient>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Quiet by default so log lines do not interleave with the prompt
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("=== Rover Control Panel ===\n");

    let config = PanelConfig::load().map_err(|e| format!("Invalid configuration: {}", e))?;
    let client = DeviceClient::new(config.device.clone())?;
    println!(
        "Controlling rover at {} ({} movement, timeout {} ms)",
        config.device.base_url, config.device.movement, config.device.timeout_ms
    );

    let surface = Arc::new(ControlSurface::mount(Arc::new(client), &config)?);
    print_help();

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        stdout.write_all(b"\nCommand: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };

        match cmd.to_ascii_lowercase().as_str() {
            "q" | "quit" | "exit" => break,
            "?" | "help" => print_help(),
            "status" => display_status(&surface).await,
            "stats" => display_stats(&surface),
            "toggle" | "t" => match words.next().map(str::parse::<Channel>) {
                Some(Ok(channel)) => {
                    // Failures are already in the feedback log
                    let _ = surface.toggle(channel).await;
                    print_latest(&surface).await;
                }
                Some(Err(e)) => println!("Error: {}", e),
                None => println!("Usage: toggle <ultrasonic|magnetic|infrared|radiowaves>"),
            },
            other => match other.parse::<MoveCommand>() {
                Ok(command) => {
                    let _ = surface.command(command).await;
                    print_latest(&surface).await;
                }
                Err(_) => println!("Unknown command: '{}'", other),
            },
        }
    }

    println!("\nShutting down...");
    surface.teardown().await;
    println!("Disconnected.");
    Ok(())
}

async fn print_latest(surface: &Surface) {
    if let Some(entry) = surface.feedback().await.latest() {
        match entry.level {
            FeedbackLevel::Success => println!("✓ {}", entry.message),
            FeedbackLevel::Error => println!("⚠ {}", entry.message),
        }
    }
}

async fn display_status(surface: &Surface) {
    let toggles = surface.toggles().await;
    println!("\n╔════════════════════════════════════════╗");
    println!("║             SENSOR CHANNELS            ║");
    println!("╠════════════════════════════════════════╣");
    for (channel, enabled) in toggles.iter() {
        println!("║ {:<14} {:>8}                ║", channel.label(), if enabled { "ON" } else { "OFF" });
    }
    println!("╚════════════════════════════════════════╝");
    println!("Stats polling: {}", if surface.is_polling().await { "running" } else { "stopped" });
}

fn display_stats(surface: &Surface) {
    let snapshot = surface.snapshot();
    if snapshot.is_empty() {
        println!("No stats yet");
        return;
    }
    for line in snapshot.lines() {
        println!("  {}", line);
    }
}

fn print_help() {
    println!("\n┌─────────────────────────────────────────┐");
    println!("│ MOVEMENT:                               │");
    println!("│  up, down, left, right, stop            │");
    println!("│                                         │");
    println!("│ SENSORS:                                │");
    println!("│  toggle <channel>                       │");
    println!("│  ultrasonic magnetic infrared radiowaves│");
    println!("│                                         │");
    println!("│ OTHER:                                  │");
    println!("│  status, stats, help, quit              │");
    println!("└─────────────────────────────────────────┘");
}
