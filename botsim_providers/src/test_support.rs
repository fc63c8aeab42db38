#![allow(clippy::unwrap_used)]

use axum::Router;
use tokio::net::TcpListener;

/// Serve `app` on a random local port and return its base URL.
pub async fn spawn_stub(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}
