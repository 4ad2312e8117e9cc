//! Check command - exercise a session lifecycle end to end.
//!
//! Builds a store from the resolved configuration over the in-process
//! backend, then writes, reads, renews and destroys a session.

use std::sync::Arc;

use anyhow::{Result, ensure};
use cachet_session::{MemoryCache, MemoryContext, SessionStore};
use clap::Args;
use serde::Serialize;
use tracing::info;

use super::Context;

/// Arguments for the check command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Override the configured TTL in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Outcome of a lifecycle check.
#[derive(Debug, Serialize)]
struct CheckReport {
    key_source: String,
    prefix: Option<String>,
    timeout_secs: u64,
    session_id: String,
    renewed_session_id: String,
    data_survived_renewal: bool,
    destroyed: bool,
}

/// Run the check command.
pub async fn run(args: CheckArgs, ctx: &Context) -> Result<()> {
    let loaded = cachet_config::load_config(None)?;
    let session_config = &loaded.config.session;
    let (encrypter, key_source) = cachet_config::build_encrypter(session_config)?;

    let mut store_config = session_config.store_config();
    if let Some(timeout) = args.timeout {
        store_config = store_config.with_timeout(timeout);
    }

    let cache = Arc::new(MemoryCache::with_capacity(store_config.max_entries));
    let store = SessionStore::with_config(cache, Arc::new(encrypter), &store_config);
    info!(store = ?store, key_source = %key_source, "Running session check");

    let report = exercise(&store, key_source.to_string()).await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("✓ Session check passed");
        println!("  key:        {}", report.key_source);
        println!("  prefix:     {}", report.prefix.as_deref().unwrap_or("(none)"));
        println!("  timeout:    {}s", report.timeout_secs);
        println!("  session:    {}", report.session_id);
        println!("  renewed to: {}", report.renewed_session_id);
    }

    Ok(())
}

async fn exercise(store: &SessionStore, key_source: String) -> Result<CheckReport> {
    let mut request = MemoryContext::new();
    store
        .save_requested_url(&mut request, "CheckClient", "/protected")
        .await?;
    let session_id = store.get_or_create_session_id(&mut request);

    let mut next = request.next_request();
    let url = store.requested_url(&mut next, "CheckClient").await?;
    ensure!(
        url.as_deref() == Some("/protected"),
        "attribute did not survive a round trip through the store"
    );

    store.renew_session(&mut next).await?;
    let renewed_session_id = store.get_or_create_session_id(&mut next);
    ensure!(renewed_session_id != session_id, "renewal kept the same session id");
    let data_survived_renewal =
        store.requested_url(&mut next, "CheckClient").await?.as_deref() == Some("/protected");
    ensure!(data_survived_renewal, "attributes were lost on renewal");

    let destroyed = store.destroy_session(&mut next);
    ensure!(destroyed, "destroy reported no session");
    ensure!(
        store.trackable_session(&mut next).is_none(),
        "session still resolvable after destroy"
    );

    Ok(CheckReport {
        key_source,
        prefix: store.prefix().map(str::to_string),
        timeout_secs: store.timeout(),
        session_id: session_id.into_inner(),
        renewed_session_id: renewed_session_id.into_inner(),
        data_survived_renewal,
        destroyed,
    })
}
