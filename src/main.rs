//! DomLink device firmware: main entry point.
//!
//! Boots the logger, loads the runtime configuration, registers the demo
//! objects and serves the line-JSON protocol on the serial console until
//! the link closes.
//!
//! ```text
//!  console RX ──▶ link-rx thread ──▶ RxChannel ──▶ LinkDriver ──▶ ObjectRuntime
//!  console TX ◀──────────────── TransportSink ◀───────────────────────┘
//! ```

use anyhow::{Context, Result};
use log::info;

use domlink::adapters::stdio::StdioTransport;
use domlink::adapters::time::MonotonicClock;
use domlink::demo::DemoObjects;
use domlink::link::{LinkDriver, io_task};
use domlink::{ObjectRuntime, RuntimeConfig};

/// Environment variable holding an optional JSON configuration overlay.
const CONFIG_ENV: &str = "DOMLINK_CONFIG";

fn load_config() -> Result<RuntimeConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(json) => {
            let config = RuntimeConfig::from_json(&json)
                .with_context(|| format!("invalid {CONFIG_ENV} overlay"))?;
            info!("Config overlay applied from {}", CONFIG_ENV);
            Ok(config)
        }
        Err(_) => Ok(RuntimeConfig::default()),
    }
}

/// stderr logger for host runs, `info` unless the filter variable of `env`
/// says otherwise.
#[cfg(not(target_os = "espidf"))]
fn host_logger(env: env_logger::Env<'_>) -> env_logger::Builder {
    let mut builder = env_logger::Builder::from_env(env.default_filter_or("info"));
    builder.target(env_logger::Target::Stderr);
    builder
}

fn main() -> Result<()> {
    // ── 1. Platform bootstrap + logging ───────────────────────
    #[cfg(feature = "espidf")]
    {
        esp_idf_svc::sys::link_patches();
        esp_idf_logger::init()?;
    }
    #[cfg(not(target_os = "espidf"))]
    host_logger(env_logger::Env::default()).init();

    info!("DomLink v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;

    // ── 3. Runtime + demo objects ─────────────────────────────
    let mut runtime = ObjectRuntime::new(&config);
    let mut demo = DemoObjects::install(&mut runtime);

    // ── 4. Serial link ────────────────────────────────────────
    let transport = StdioTransport::spawn().context("console transport")?;
    let driver = LinkDriver::new(runtime, transport, &config);

    io_task::run(driver, MonotonicClock::new(), &config, |rt, sink, _now| {
        demo.publish(rt, sink);
    })
    .context("serial link closed")?;
    Ok(())
}
