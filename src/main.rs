use std::sync::Arc;

use cupcake_mcp_server::config::ServerConfig;
use cupcake_mcp_server::logging;
use cupcake_mcp_server::query::QueryService;
use cupcake_mcp_server::server::McpServer;
use cupcake_mcp_server::store::RecordStore;

#[tokio::main]
async fn main() {
    logging::init();

    let config = match ServerConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    let store = match RecordStore::load(&config.records_path) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("cannot load records: {e}");
            std::process::exit(1);
        }
    };

    let service = Arc::new(QueryService::new(Arc::new(store)));
    let server = McpServer::new(config, service);
    if let Err(e) = server.run().await {
        tracing::error!("fatal error: {e}");
        std::process::exit(1);
    }
}
