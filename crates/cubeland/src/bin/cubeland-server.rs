//! Development server: in-memory accounts, one process, one world.

use cubeland::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), CubelandError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("CUBELAND_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    // Development accounts. Production wires a real store in instead.
    let accounts = MemoryAccounts::new()
        .with_account("alice", Profile::default())
        .with_account("bob", Profile::default())
        .with_account(
            "keeper",
            Profile {
                worker: true,
                ..Profile::default()
            },
        );

    let server = CubelandServer::<MemoryAccounts, JsonCodec>::builder()
        .bind(&addr)
        .build(accounts)
        .await?;

    tracing::info!(%addr, "cubeland listening");
    server.run().await
}
