use std::io::Write;

use countdown_core::{CountdownKey, RegistryConfig, RegistryConfigExt, TimerKey};

use crate::CliContext;

/// Callback that prints each tick of `key` to stdout
pub fn tick_printer(key: CountdownKey) -> impl Fn(u64, bool) + Send + Sync + 'static {
    move |remaining, finished| {
        if finished {
            println!("[{key}] finished");
        } else {
            println!("[{key}] {remaining}");
        }
    }
}

pub fn start(ctx: &CliContext, key: CountdownKey, count: i64) -> Result<(), String> {
    ctx.registry
        .start(key, count, tick_printer(key))
        .map_err(|e| e.to_string())
}

pub fn stop(ctx: &CliContext, key: CountdownKey) -> Result<(), String> {
    ctx.registry.stop(key).map_err(|e| e.to_string())?;
    if let Some(remaining) = ctx.registry.remaining(key).map_err(|e| e.to_string())? {
        println!("[{key}] stopped at {remaining}");
    }
    Ok(())
}

pub fn resume(ctx: &CliContext, key: CountdownKey) -> Result<(), String> {
    ctx.registry
        .resume(key, tick_printer(key))
        .map_err(|e| e.to_string())
}

pub fn show_status(ctx: &CliContext, key: Option<CountdownKey>) -> Result<(), String> {
    let keys: Vec<CountdownKey> = match key {
        Some(key) => vec![key],
        None => CountdownKey::all().to_vec(),
    };

    println!("{:<10} {:<10} Remaining", "Key", "Status");
    println!("{}", "-".repeat(32));

    for key in keys {
        let status = ctx.registry.status(key).map_err(|e| e.to_string())?;
        let remaining = ctx.registry.remaining(key).map_err(|e| e.to_string())?;
        match (status, remaining) {
            (Some(status), Some(remaining)) => {
                println!("{:<10} {:<10} {}", key.as_str(), status.label(), remaining)
            }
            _ => println!("{:<10} {:<10} -", key.as_str(), "idle"),
        }
    }
    Ok(())
}

pub fn stop_all(ctx: &CliContext) {
    let stopped = ctx.registry.stop_all();
    println!("stopped {} countdown(s)", stopped.len());
}

pub fn resume_all(ctx: &CliContext) {
    let resumed = ctx.registry.resume_all(tick_printer);
    println!("resumed {} countdown(s)", resumed.len());
}

pub fn show_config(ctx: &CliContext) {
    let path = RegistryConfig::config_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|e| e.to_string());
    println!("config file:            {path}");
    println!("tick interval (ms):     {}", ctx.config.tick_interval_ms);
    println!("reject negative counts: {}", ctx.config.reject_negative_counts);
}

pub fn exit(ctx: &CliContext) -> Result<(), String> {
    ctx.registry.stop_all();
    write!(std::io::stdout(), "quitting...").map_err(|e| e.to_string())?;
    std::io::stdout().flush().map_err(|e| e.to_string())
}
