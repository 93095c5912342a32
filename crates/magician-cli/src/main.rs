//! `magician-cli` – bench shell for the Dobot Magician driver.
//!
//! 1. Checks for `~/.magician/config.toml`; runs a **First-Run Wizard** when
//!    the file is absent.
//! 2. Probes the USB serial bus for a Magician and reports what it finds.
//! 3. Attaches a [`Dobot`] robot object at the configured mounting pose,
//!    backed by the in-process simulator. Motion commands never reach a
//!    physical arm, even when one was found on the bus.
//! 4. Drops the user into an **interactive REPL** with slash-commands
//!    (`/pose`, `/move`, `/home`, `/suck`, `/help`, …).
//! 5. Intercepts **Ctrl-C**, leaves the REPL and releases the arm.

mod config;
mod repl;

use colored::Colorize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use magician_hal::discovery::{SystemPorts, resolve_port};
use magician_hal::{Dobot, SimMagician};

fn main() {
    // Set MAGICIAN_LOG_FORMAT=json for newline-delimited JSON logs.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("MAGICIAN_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .compact()
            .init();
    }

    print_banner();

    // ── Shared shutdown flag ──────────────────────────────────────────────
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!("{}", "⚠  Ctrl-C received – releasing the arm …".yellow().bold());
        shutdown_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(
            error = %e,
            "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available"
        );
    }

    // ── First-Run Wizard ──────────────────────────────────────────────────
    let mut cfg = match config::load() {
        Ok(None) => run_first_run_wizard(),
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };
    config::apply_env_overrides(&mut cfg);

    // ── Serial bus probe ──────────────────────────────────────────────────
    print!("\n  Probing serial bus … ");
    match resolve_port(cfg.port.as_deref(), &SystemPorts) {
        Ok(port) => println!("{} ({})", "Magician found".green(), port.bold()),
        Err(e) => println!("{} ({})", "no device".yellow(), e.to_string().dimmed()),
    }

    // ── Robot object ──────────────────────────────────────────────────────
    let mounting = cfg.mounting.to_pose();
    info!(robot = %cfg.robot_id, ?mounting, "attaching simulated arm");
    let mut dobot = Dobot::new(cfg.robot_id.clone(), mounting, SimMagician::new());
    println!("{}", repl::attach_message(dobot.id(), dobot.pose()));

    println!();
    println!("  Type {} for a list of commands.\n", "/help".bold().cyan());

    // ── Interactive REPL ──────────────────────────────────────────────────
    repl::run(shutdown, &mut dobot, &mut cfg);

    drop(dobot);
    println!("{}", "  ✓ Arm released.".green());
}

// ─────────────────────────────────────────────────────────────────────────────
// First-Run Wizard
// ─────────────────────────────────────────────────────────────────────────────

fn run_first_run_wizard() -> config::Config {
    println!();
    println!("{}", "  ╔══════════════════════════════════════╗".bold().cyan());
    println!("{}", "  ║      Magician First-Run Wizard       ║".bold().cyan());
    println!("{}", "  ╚══════════════════════════════════════╝".bold().cyan());
    println!();
    println!("  No configuration found.  Where is the arm mounted?\n");

    let mut cfg = config::Config::default();

    cfg.mounting.x = prompt_f64("  Base x in metres   [0.0]: ", cfg.mounting.x);
    cfg.mounting.y = prompt_f64("  Base y in metres   [0.0]: ", cfg.mounting.y);
    cfg.mounting.z = prompt_f64("  Base z in metres   [0.0]: ", cfg.mounting.z);
    cfg.mounting.yaw = prompt_f64("  Base yaw in rad    [0.0]: ", cfg.mounting.yaw);

    let port = repl::prompt_str("  Serial port (empty = auto-detect): ", "");
    if !port.is_empty() {
        cfg.port = Some(port);
    }

    match config::save(&cfg) {
        Ok(()) => println!(
            "\n  {} Config saved to {}\n",
            "✓".green().bold(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
    cfg
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!(
        "  {} {}",
        "Magician".bold().cyan(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Dobot Magician robot object");
    println!();
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn prompt_f64(msg: &str, default: f64) -> f64 {
    let raw = repl::prompt_str(msg, &default.to_string());
    raw.trim().parse::<f64>().unwrap_or_else(|_| {
        println!("  {} '{}' is not a number, keeping {}", "Warning:".yellow(), raw, default);
        default
    })
}
