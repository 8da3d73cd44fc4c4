//! Headless U-Boat arena.
//!
//! Runs one arena on the fixed-rate tick driver with scripted captains in
//! place of browser clients, logging every delivery. Useful for soak runs
//! and for watching the simulation without a transport.
//!
//! Environment:
//!
//! - `UBOAT_TUNING`: path to a JSON tuning file (defaults otherwise)
//! - `UBOAT_SEED`: RNG seed (default 1)
//! - `UBOAT_BOTS`: number of scripted captains (default 6)
//! - `UBOAT_DURATION_SECS`: how long to run (default 60)
//! - `RUST_LOG`, `LOG_FORMAT=json`: logging

mod bots;
mod sink;

use std::str::FromStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uboat_core::config::Tuning;
use uboat_core::shared::{Outbox, SharedEngine, TickDriver};
use uboat_core::Engine;

use crate::bots::Bot;
use crate::sink::LogSink;

/// How often scripted captains reconsider their orders.
const ORDERS_INTERVAL: Duration = Duration::from_millis(500);

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}

fn load_tuning() -> anyhow::Result<Tuning> {
    match std::env::var("UBOAT_TUNING") {
        Ok(path) => Tuning::from_path(&path).with_context(|| format!("loading tuning from {path}")),
        Err(_) => Ok(Tuning::default()),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let tuning = load_tuning()?;
    let seed: u64 = env_or("UBOAT_SEED", 1)?;
    let bot_count: usize = env_or("UBOAT_BOTS", 6)?;
    let secs: f64 = env_or("UBOAT_DURATION_SECS", 60.0)?;
    anyhow::ensure!(
        secs.is_finite() && secs >= 0.0,
        "UBOAT_DURATION_SECS must be a non-negative number of seconds"
    );
    let duration = Duration::try_from_secs_f64(secs).context("UBOAT_DURATION_SECS is out of range")?;

    tracing::info!(seed, bots = bot_count, ?duration, tick_rate = tuning.tick_rate, "starting arena");

    let arena = SharedEngine::new(Engine::new(tuning, seed).context("building arena")?);
    let sink = Arc::new(LogSink::default());
    let driver = TickDriver::spawn(arena.clone(), sink.clone()).context("starting tick driver")?;

    let bots: Vec<Bot> = (0..bot_count).map(Bot::new).collect();
    for bot in &bots {
        sink.deliver_all(bot.join(&arena));
    }

    // Bots draw from their own stream so engine randomness stays seed-pure
    let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(1));
    let started = Instant::now();
    while started.elapsed() < duration {
        for bot in &bots {
            sink.deliver_all(bot.act(&arena, &mut rng));
        }
        thread::sleep(ORDERS_INTERVAL);
    }

    for bot in &bots {
        sink.deliver_all(bot.leave(&arena));
    }
    driver.stop();

    let (state_updates, announcements) = sink.counts();
    tracing::info!(
        state_updates,
        announcements,
        remaining = arena.player_count(),
        ids = ?bots.iter().map(|b| b.id().as_str()).collect::<Vec<_>>(),
        "arena closed"
    );
    Ok(())
}
