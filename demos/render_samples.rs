//! Render the home page samples and print them with cache statistics.
//!
//! ```text
//! cargo run -p seatbelt-highlight --example render_samples -- [config.toml]
//! ```
//!
//! Set `SEATBELT_DEBUG=1` for debug logs.

use anyhow::{Context, Result};
use seatbelt_highlight::{HighlightConfig, Highlighter, TemplateFuncs, samples};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

fn initialize_logging() -> Result<()> {
    let level = if std::env::var_os("SEATBELT_DEBUG").is_some() {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn main() -> Result<()> {
    initialize_logging()?;

    let mut config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => HighlightConfig::load(&path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => HighlightConfig::default(),
    };
    config.apply_env_overrides()?;

    let highlighter = Arc::new(Highlighter::with_config(config)?);
    let funcs = TemplateFuncs::new(Arc::clone(&highlighter));

    for (name, markup) in samples::render(&highlighter) {
        println!("<!-- {name} -->\n{markup}\n");
    }
    // Second pass is served from the cache.
    let _ = samples::render(&highlighter);

    if let Some(inline) = funcs.call("highlightinline", "go", "c.Session.Get(\"name\")") {
        println!("<!-- inline -->\n{inline}");
    }

    let stats = highlighter.stats();
    info!(
        requests = stats.requests,
        hits = stats.hits,
        entries = stats.entries,
        hit_rate = stats.hit_rate,
        "highlight cache"
    );
    Ok(())
}
