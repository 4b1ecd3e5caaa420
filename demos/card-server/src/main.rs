//! Demo card-game session server with a fixed set of accounts.
//!
//! Run it, then point clients at port 6567. Tokens follow the pattern
//! `<player>-token`; see [`demo_profiles`] for the roster.

use cardroom::prelude::*;

/// Accounts the demo accepts.
///
/// A real deployment would swap in an [`IdentityService`] that talks to
/// the platform's account system instead of a baked-in table.
fn demo_profiles() -> StaticProfiles {
    StaticProfiles::new()
        .grant("dealer-token", "dealer")
        .grant("north-token", "north")
        .grant("south-token", "south")
        .grant("east-token", "east")
        .grant("west-token", "west")
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("card_server=info".parse()?)
                .add_directive("cardroom=info".parse()?),
        )
        .init();

    let addr = "0.0.0.0:6567";
    tracing::info!(%addr, "starting card server");

    let server = CardroomServerBuilder::new()
        .bind(addr)
        .build(demo_profiles())
        .await?;

    server.run().await?;
    Ok(())
}
