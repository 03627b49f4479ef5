//! `sensorbridge-cli` – command line front end for the sensor bindings.
//!
//! ```text
//! sensorbridge describe        print the published host namespace as JSON
//! sensorbridge run [CONFIG]    drive the configured simulated sensors and
//!                              print one JSON sample per sensor per step
//! sensorbridge init            write the default ~/.sensorbridge/config.toml
//! ```
//!
//! Samples go to stdout, status lines and logs to stderr.

mod config;
mod telemetry;

use colored::Colorize;
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

use sensorbridge_bindings::{Module, SensorObject, rave_create_sensor, register_sensor_module};
use sensorbridge_hal::SimRegistry;

fn main() -> ExitCode {
    let guard = telemetry::init_tracing("sensorbridge");
    if guard.is_exporting() {
        info!("exporting spans over OTLP");
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("describe") => describe(),
        Some("run") => run(args.get(1).map(PathBuf::from)),
        Some("init") => init(),
        Some("help") | Some("--help") | Some("-h") | None => {
            print_usage();
            Ok(())
        }
        Some(other) => Err(format!("unknown command '{other}'")),
    };

    let code = match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    };
    drop(guard);
    code
}

// ─────────────────────────────────────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────────────────────────────────────

fn describe() -> Result<(), String> {
    let mut module = Module::new("sensorbridge");
    register_sensor_module(&mut module);
    let described = module.describe().map_err(|e| e.to_string())?;
    let text = serde_json::to_string_pretty(&described).map_err(|e| e.to_string())?;
    println!("{text}");
    Ok(())
}

fn init() -> Result<(), String> {
    let path = config::config_path();
    if path.exists() {
        eprintln!("  Config already present at {}", path.display().to_string().bold());
        return Ok(());
    }
    config::save(&config::Config::default())?;
    eprintln!(
        "  {} Config saved to {}",
        "✓".green().bold(),
        path.display().to_string().bold()
    );
    Ok(())
}

fn run(path: Option<PathBuf>) -> Result<(), String> {
    let cfg = match path {
        Some(path) => config::load_from(&path)?
            .ok_or_else(|| format!("no config file at {}", path.display()))?,
        None => config::load()?.unwrap_or_else(|| {
            let mut cfg = config::Config::default();
            config::apply_env_overrides(&mut cfg);
            cfg
        }),
    };
    info!(?cfg, "starting run");

    let env = SimRegistry::new(cfg.environment_id).with_all().build();
    let mut sensors = Vec::new();
    for name in &cfg.sensors {
        match rave_create_sensor(&env, name) {
            Some(sensor) => sensors.push((name.clone(), sensor)),
            None => {
                warn!(interface = %name, "unknown sensor interface");
                eprintln!("  {} no interface named '{}'", "skip".yellow(), name);
            }
        }
    }
    if sensors.is_empty() {
        return Err("no sensors could be created".to_string());
    }

    for (name, sensor) in &mut sensors {
        let status = call(sensor, "Configure", &[json!("PowerOn")])?;
        eprintln!("  {} {} (status {})", "on".green(), name.as_str().bold(), status);
    }

    for step in 0..cfg.steps {
        for (name, sensor) in &mut sensors {
            call(sensor, "SimulationStep", &[json!(cfg.time_step)])?;
            let data = call(sensor, "GetSensorData", &[])?;
            let line = json!({ "step": step, "sensor": name, "data": data });
            println!("{line}");
        }
    }

    for (_, sensor) in &mut sensors {
        call(sensor, "Configure", &[json!("PowerOff")])?;
    }
    eprintln!(
        "  {} {} step(s) across {} sensor(s)",
        "✓".green().bold(),
        cfg.steps,
        sensors.len()
    );
    Ok(())
}

fn call(sensor: &mut SensorObject, method: &str, args: &[Value]) -> Result<Value, String> {
    sensor
        .call(method, args)
        .map_err(|e| format!("{} {}: {}", sensor.handle(), method, e))
}

fn print_usage() {
    println!("{}", "sensorbridge".bold().cyan());
    println!();
    println!("  {}        print the host namespace as JSON", "describe".bold());
    println!("  {}    run the simulated sensors", "run [CONFIG]".bold());
    println!("  {}            write the default config", "init".bold());
}
