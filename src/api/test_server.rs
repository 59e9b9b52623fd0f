// ============================================================================
// Serveur HTTP de test (une seule réponse)
// ============================================================================
// Évite les appels réseau réels dans les tests : on écoute sur 127.0.0.1,
// on renvoie une réponse fixe et on restitue la requête reçue.
// ============================================================================

use reqwest::Client;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Client sans proxy (les variables HTTP_PROXY de la machine sont ignorées)
pub(crate) fn test_client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// Sert une seule requête avec le statut et le corps donnés
///
/// Retourne l'URL à appeler et une tâche qui rend le texte de la requête.
pub(crate) async fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    serve_with(status_line, body, None, None).await
}

/// Comme serve_once, mais ne répond qu'après le signal `gate`
pub(crate) async fn serve_after(
    status_line: &'static str,
    body: &'static str,
    gate: oneshot::Receiver<()>,
) -> (String, JoinHandle<String>) {
    serve_with(status_line, body, Some(gate), None).await
}

/// Comme serve_once, et envoie `received` dès que la requête est lue
pub(crate) async fn serve_notifying(
    status_line: &'static str,
    body: &'static str,
    received: oneshot::Sender<()>,
) -> (String, JoinHandle<String>) {
    serve_with(status_line, body, None, Some(received)).await
}

async fn serve_with(
    status_line: &'static str,
    body: &'static str,
    gate: Option<oneshot::Receiver<()>>,
    received: Option<oneshot::Sender<()>>,
) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        loop {
            let n = socket.read(&mut buf).await.unwrap_or(0);
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request.windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }

        if let Some(received) = received {
            let _ = received.send(());
        }
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;

        String::from_utf8_lossy(&request).into_owned()
    });

    (format!("http://{}/", addr), handle)
}
