//! Server command implementation

use std::path::Path;

use anyhow::Result;
use fintrack_server::ServerConfig;

use super::{build_services, load_config, open_db};

pub async fn cmd_serve(
    db_path: &Path,
    config_path: Option<&Path>,
    host: Option<&str>,
    port: Option<u16>,
    no_auth: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let host = host.unwrap_or(&config.server.host).to_string();
    let port = port.unwrap_or(config.server.port);

    println!("🚀 Starting FinTrack API server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);
    println!("   Prediction service: {}", config.predictor.base_url);

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        println!("   🔒 Authentication: bearer JWT (HS256)");
    }
    if config.server.allowed_origins.is_empty() {
        println!("   🌐 CORS: same-origin only");
    } else {
        println!("   🌐 CORS: {}", config.server.allowed_origins.join(", "));
    }
    println!();

    let db = open_db(db_path)?;
    let services = build_services(&db, &config);
    let server_config = ServerConfig::from_config(&config, !no_auth);

    fintrack_server::serve_with_config(db, services, &host, port, server_config).await
}
