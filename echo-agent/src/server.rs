use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    agent::{default_card, EchoAgent},
    routes::{create_routes, ServerState},
};

/// Build the router serving `agent`
pub fn router(agent: EchoAgent) -> Router {
    let state = ServerState {
        agent: Arc::new(agent),
    };

    create_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

fn display_server_info(local_addr: &SocketAddr, agent_card: &a2a_types::AgentCard) {
    tracing::info!("Echo agent listening at: http://{}", local_addr);
    tracing::info!("Agent: {} ({})", agent_card.name, agent_card.description);
    tracing::info!(
        "Agent Card available at: http://{}/.well-known/agent-card.json",
        local_addr
    );
    tracing::info!("Advertised endpoint: {}", agent_card.url);
    for skill in &agent_card.skills {
        tracing::info!("  skill: {} ({})", skill.name, skill.id);
    }
}

/// Serve `agent` on an already bound listener until the task is dropped
pub async fn serve(listener: TcpListener, agent: EchoAgent) -> std::io::Result<()> {
    let local_addr = listener.local_addr()?;
    display_server_info(&local_addr, agent.card());
    axum::serve(listener, router(agent)).await
}

/// Bind `addr`, advertise the bound address in the card and serve in the background.
///
/// Returns the bound address, which is what callers connect to when `addr`
/// asked for an ephemeral port.
pub async fn spawn(addr: &str) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let agent = EchoAgent::new(default_card(format!("http://{}/", local_addr)));

    tokio::spawn(async move {
        if let Err(e) = serve(listener, agent).await {
            tracing::error!(error = %e, "echo agent stopped");
        }
    });

    Ok(local_addr)
}
