// HTTP API server binary: serves game and company reports as JSON

use anyhow::Result;
use metacritic_report::api::ApiServer;
use metacritic_report::database_ops::db::Db;
use metacritic_report::logging::init_tracing;
use metacritic_report::util::env as env_util;

#[actix_web::main]
async fn main() -> Result<()> {
    init_tracing("info,sqlx=warn")?;
    env_util::bootstrap_cli("api_server");

    let server = ApiServer::from_env()?;

    let max_connections: u32 = env_util::env_parse("DB_MAX_CONNS", 4u32);
    let db = Db::connect(&server.db_path, max_connections).await?;
    db.create_tables().await?;

    tracing::info!("Database connected successfully");

    server.run(db).await?;

    Ok(())
}
