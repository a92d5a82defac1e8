//! Servidor HTTP local para probar los clientes de LLM.

use std::sync::{Arc, Mutex};

use axum::{body::Bytes, http::{StatusCode, Uri}, Json, Router};
use serde_json::Value;

pub type SeenRequest = Arc<Mutex<Option<(String, Value)>>>;

/// Responde `reply` con `status` a cualquier ruta y guarda la última petición.
pub async fn spawn_json_server(status: StatusCode, reply: Value) -> (String, SeenRequest) {
    let seen: SeenRequest = Arc::new(Mutex::new(None));
    let seen_handler = seen.clone();

    let app = Router::new().fallback(move |uri: Uri, body: Bytes| {
        let seen = seen_handler.clone();
        let reply = reply.clone();
        async move {
            let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
            *seen.lock().unwrap() = Some((uri.path().to_string(), json));
            (status, Json(reply))
        }
    });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), seen)
}
