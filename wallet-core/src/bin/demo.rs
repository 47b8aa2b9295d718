//! Wallet demo binary
//!
//! Boots the in-process wallet service and walks through a small scripted
//! session: register two users, fund one, and move money between them.

use rust_decimal::Decimal;
use wallet_core::{Config, Wallet};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting wallet demo");

    let config = Config::from_env()?;
    let wallet = Wallet::new(config);

    wallet.create_user("alice")?;
    wallet.create_user("bob")?;

    let balance = wallet.deposit("alice", Decimal::new(10_000, 2), "USD").await?;
    tracing::info!(%balance, "alice funded");

    let (from_balance, to_balance) = wallet
        .send("alice", "bob", Decimal::new(2_550, 2), "usd")
        .await?;
    tracing::info!(%from_balance, %to_balance, "transfer complete");

    let bob_balance = wallet.get_balance("bob", "USD").await?;
    tracing::info!(%bob_balance, "bob balance");

    wallet.shutdown().await?;
    tracing::info!("Wallet demo finished");
    Ok(())
}
