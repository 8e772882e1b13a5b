use crate::api::{self, AppState};
use axum::{body::Body, response::Response};
use http::StatusCode;
use std::{any::Any, net::SocketAddr};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic message".to_string()
    };

    tracing::error!("PANIC CAUGHT: {}", details);

    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(Body::from(format!("Internal Server Error: {}", details)))
        .unwrap()
}

pub async fn run(
    state: AppState,
    shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> anyhow::Result<()> {
    let listen_port = state.config.listen_port;
    let app = api::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic));

    let addr = SocketAddr::from(([0, 0, 0, 0], listen_port));
    tracing::info!("listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        })
        .await?;

    Ok(())
}
