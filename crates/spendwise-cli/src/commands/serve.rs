//! Server command implementation

use std::path::Path;

use anyhow::Result;
use spendwise_core::FinancialSnapshot;

use super::open_snapshot;

pub async fn cmd_serve(path: &Path, host: &str, port: u16, origins: Vec<String>) -> Result<()> {
    // Start from the snapshot file if there is one; the session is in-memory
    let snapshot = if path.exists() {
        open_snapshot(path)?
    } else {
        FinancialSnapshot::new()
    };

    println!("🚀 Starting Spendwise web server...");
    if path.exists() {
        println!("   Snapshot: {} (changes are not written back)", path.display());
    } else {
        println!("   Snapshot: (empty session)");
    }
    println!("   Listening: http://{}:{}", host, port);
    if !origins.is_empty() {
        println!("   CORS origins: {}", origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let config = spendwise_server::ServerConfig {
        allowed_origins: origins,
    };
    spendwise_server::serve(snapshot, host, port, config).await?;

    Ok(())
}
