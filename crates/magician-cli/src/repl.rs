//! REPL – Read-Eval-Print Loop for the Magician shell.
//!
//! Supported slash-commands:
//!   /help                          – show this list
//!   /pose                          – world-frame end effector pose
//!   /joints                        – joint readings
//!   /home                          – run the homing procedure
//!   /move x y z yaw [type]         – move to a world-frame target
//!   /suck | /release               – suction cup on / off
//!   /ports                         – scan the serial bus for a Magician
//!   /settings                      – edit motion defaults
//!   /quit | /exit                  – release the arm and exit

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use magician_hal::discovery::{self, SerialPortLister, SystemPorts};
use magician_hal::{DEFAULT_END_EFFECTOR, Dobot, MagicianSdk};
use magician_pose::{quaternion_to_yaw, yaw_to_quaternion};
use magician_types::{MoveType, Pose, Position};

use crate::config::{self, Config};

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run<S: MagicianSdk>(shutdown: Arc<AtomicBool>, dobot: &mut Dobot<S>, cfg: &mut Config) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "magician>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let mut words = line.split_whitespace();
        let Some(cmd) = words.next() else {
            continue;
        };
        let args: Vec<&str> = words.collect();

        match cmd {
            "/help" => cmd_help(),
            "/pose" => cmd_pose(dobot),
            "/joints" => cmd_joints(dobot),
            "/home" => report("Homing", dobot.home()),
            "/move" => cmd_move(dobot, cfg, &args),
            "/suck" => report("Suction on", dobot.suck()),
            "/release" => report("Suction off", dobot.release()),
            "/ports" => cmd_ports(cfg),
            "/settings" => cmd_settings(cfg),
            "/quit" | "/exit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            other => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "/help".bold()
                );
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn cmd_help() {
    println!();
    println!("{}", "Magician Commands".bold().underline());
    println!("  {}                  – world-frame end effector pose", "/pose".bold().cyan());
    println!("  {}                – joint readings", "/joints".bold().cyan());
    println!("  {}                  – run the homing procedure", "/home".bold().cyan());
    println!("  {} – move to world-frame target (m, rad)", "/move x y z yaw [type]".bold().cyan());
    println!("  {}        – suction cup on / off", "/suck  /release".bold().cyan());
    println!("  {}                 – scan the serial bus", "/ports".bold().cyan());
    println!("  {}              – edit motion defaults", "/settings".bold().cyan());
    println!("  {}          – release the arm and exit", "/quit  /exit".bold().cyan());
    println!();
}

fn cmd_pose<S: MagicianSdk>(dobot: &mut Dobot<S>) {
    match dobot.end_effector_pose(DEFAULT_END_EFFECTOR) {
        Ok(pose) => println!("  {}", format_pose(&pose)),
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_joints<S: MagicianSdk>(dobot: &mut Dobot<S>) {
    match dobot.robot_joints() {
        Ok(joints) => {
            for j in joints {
                println!("  {:<8} {:>10.4}", j.name.bold(), j.value);
            }
        }
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_move<S: MagicianSdk>(dobot: &mut Dobot<S>, cfg: &Config, args: &[&str]) {
    let (target, move_type) = match parse_move(args, cfg.move_type) {
        Ok(parsed) => parsed,
        Err(e) => {
            println!("{}: {}", "Usage".yellow(), e);
            return;
        }
    };
    report(
        &format!("Move ({move_type})"),
        dobot.move_to(&target, move_type, cfg.velocity, cfg.acceleration),
    );
}

fn cmd_ports(cfg: &Config) {
    if let Some(port) = &cfg.port {
        println!("  Configured port: {}", port.bold());
    }
    match SystemPorts.list() {
        Ok(ports) if ports.is_empty() => println!("  {}", "No serial ports found.".dimmed()),
        Ok(ports) => {
            for p in &ports {
                let marker = if p.is_magician() { "▶" } else { " " };
                let ids = match (p.vid, p.pid) {
                    (Some(vid), Some(pid)) => format!("{vid:04x}:{pid:04x}"),
                    _ => "-".to_string(),
                };
                println!("    {} {} {}", marker.green(), p.name.bold(), ids.dimmed());
            }
            if discovery::find_magician_port(&ports).is_err() {
                println!("  {}", "No Dobot Magician on the bus.".yellow());
            }
        }
        Err(e) => println!("{}: {}", "Error".red(), e),
    }
}

fn cmd_settings(cfg: &mut Config) {
    println!("{}", "Settings Editor".bold().underline());

    cfg.velocity = prompt_percent(&format!("  Velocity %     [{}]: ", cfg.velocity), cfg.velocity);
    cfg.acceleration = prompt_percent(
        &format!("  Acceleration % [{}]: ", cfg.acceleration),
        cfg.acceleration,
    );

    let raw = prompt_str(
        &format!("  Move type      [{}] (jump / joints / linear): ", cfg.move_type),
        &cfg.move_type.to_string(),
    );
    match raw.parse::<MoveType>() {
        Ok(mt) => cfg.move_type = mt,
        Err(e) => println!("  {} {}", "Warning:".yellow(), e),
    }

    match config::save(cfg) {
        Ok(()) => println!(
            "{} {}",
            "✓ Settings saved to".green(),
            config::config_path().display().to_string().bold()
        ),
        Err(e) => println!("{}: {}", "Error saving config".red(), e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn report(what: &str, result: Result<(), magician_types::ArmError>) {
    match result {
        Ok(()) => println!("  {} {}", "✓".green().bold(), what),
        Err(e) => println!("  {} {}: {}", "✗".red().bold(), what, e),
    }
}

/// Parse `/move` arguments: `x y z yaw [jump|joints|linear]`.
pub(crate) fn parse_move(
    args: &[&str],
    default_type: MoveType,
) -> Result<(Pose, MoveType), String> {
    if args.len() != 4 && args.len() != 5 {
        return Err("/move x y z yaw [jump|joints|linear]".to_string());
    }
    let mut nums = [0.0f64; 4];
    for (slot, raw) in nums.iter_mut().zip(args) {
        *slot = raw
            .parse::<f64>()
            .map_err(|_| format!("'{raw}' is not a number"))?;
    }
    let move_type = match args.get(4) {
        Some(raw) => raw.parse::<MoveType>().map_err(|e| e.to_string())?,
        None => default_type,
    };
    let [x, y, z, yaw] = nums;
    Ok((
        Pose::new(Position::new(x, y, z), yaw_to_quaternion(yaw)),
        move_type,
    ))
}

pub(crate) fn format_pose(pose: &Pose) -> String {
    format!(
        "x={:.4} m  y={:.4} m  z={:.4} m  yaw={:.4} rad",
        pose.position.x,
        pose.position.y,
        pose.position.z,
        quaternion_to_yaw(&pose.orientation)
    )
}

/// Status line for a freshly attached arm. The CLI always drives the
/// simulator, so the line says so even when a device sits on the bus.
pub(crate) fn attach_message(id: &str, mounting: &Pose) -> String {
    format!(
        "  Attached {} ({}) at mounting pose {}",
        id.bold(),
        "simulated".yellow(),
        format_pose(mounting).dimmed()
    )
}

/// Prompt for a percentage.  Returns `default` when the user presses Enter
/// or enters something outside `0..=100`.
fn prompt_percent(msg: &str, default: f64) -> f64 {
    let raw = prompt_str(msg, &default.to_string());
    match raw.parse::<f64>() {
        Ok(v) if (0.0..=100.0).contains(&v) => v,
        _ => {
            println!(
                "  {} '{}' is not a percentage, keeping {}",
                "Warning:".yellow(),
                raw,
                default
            );
            default
        }
    }
}

/// Prompt for a string value.  Returns `default` when the user presses Enter.
pub(crate) fn prompt_str(msg: &str, default: &str) -> String {
    print!("{}", msg);
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(_) => {
            let trimmed = line.trim().to_string();
            if trimmed.is_empty() {
                default.to_string()
            } else {
                trimmed
            }
        }
        Err(_) => default.to_string(),
    }
}
