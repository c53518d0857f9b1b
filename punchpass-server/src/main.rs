// punchpass-server/src/main.rs

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Duration;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use punchpass_core::Database;
use punchpass_core::repositories::postgres::{
    PostgresMemberRepository, PostgresRedemptionStore, PostgresStoreRepository,
};
use punchpass_core::services::{MemberService, RedemptionService};

mod context;
mod routes;

use context::ServerContext;

#[derive(Parser, Debug, Clone)]
#[command(name = "punchpass-server")]
#[command(author, version, about = "punchpass - membership ticket redemption service")]
struct Args {
    /// Address to which the HTTP server will bind
    #[arg(long, default_value = "0.0.0.0:8080")]
    server_addr: String,

    /// Postgres connection URL
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://punchpass@localhost:5432/punchpass"
    )]
    database_url: String,

    /// Minimum seconds between consecutive redemptions of one ticket
    #[arg(long, env = "REDEEM_COOLDOWN_SECONDS", default_value_t = 300)]
    cooldown_seconds: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if args.cooldown_seconds < 0 {
        anyhow::bail!("cooldown seconds must not be negative");
    }
    let cooldown = Duration::seconds(args.cooldown_seconds);

    let db = Database::new(&args.database_url).await?;
    db.migrate().await?;

    let redemption_store = Arc::new(PostgresRedemptionStore::new(db.pool().clone()));
    let member_repo = Arc::new(PostgresMemberRepository::new(db.pool().clone()));
    let store_repo = Arc::new(PostgresStoreRepository::new(db.pool().clone()));

    let ctx = ServerContext {
        redemptions: Arc::new(RedemptionService::new(
            redemption_store,
            member_repo.clone(),
            store_repo,
            cooldown,
        )),
        members: Arc::new(MemberService::new(member_repo)),
    };

    let addr: SocketAddr = args.server_addr.parse()?;
    routes::serve(addr, ctx).await?;
    Ok(())
}
