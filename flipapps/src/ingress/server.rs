use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use flipapps_protocol::{ErrorCode, ServiceRequest, ServiceResponse};

use super::auth::Authenticator;
use super::service::FlipAppsService;
use crate::link::{FrameLink, LinkError};

/// Pause after a failed accept before trying again
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Serves [`FlipAppsService`] over framed TCP connections
pub struct IngressServer<A> {
    service: Arc<FlipAppsService<A>>,
}

impl<A: Authenticator + 'static> IngressServer<A> {
    pub fn new(service: FlipAppsService<A>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    /// Accept connections until the task is aborted
    ///
    /// Aborting drops every connection task, and with them the last
    /// handles on the application's message queue.
    pub async fn serve(self, listener: TcpListener) {
        match listener.local_addr() {
            Ok(address) => info!("Ingress listening on {}", address),
            Err(e) => warn!("Ingress listening on unknown address: {}", e),
        }

        let mut connections = JoinSet::new();
        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Client connected from {}", peer);
                        connections.spawn(serve_connection(self.service.clone(), stream, peer));
                    }
                    Err(e) => {
                        warn!("Accept failed: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(finished) = connections.join_next() => {
                    if let Err(e) = finished {
                        if e.is_panic() {
                            error!("Connection task panicked: {}", e);
                        }
                    }
                }
            }
        }
    }
}

/// Answer requests on one connection until the client hangs up
async fn serve_connection<A, S>(service: Arc<FlipAppsService<A>>, stream: S, peer: SocketAddr)
where
    A: Authenticator,
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut link = FrameLink::new(stream);
    loop {
        let response = match link.recv::<ServiceRequest>().await {
            Ok(Some(request)) => service.handle(request).await,
            Ok(None) => break,
            Err(LinkError::Frame(e)) => {
                debug!("Bad request from {}: {}", peer, e);
                ServiceResponse::Error {
                    code: ErrorCode::InvalidArgument,
                    detail: e.to_string(),
                }
            }
            Err(e) => {
                warn!("Connection from {} failed: {}", peer, e);
                break;
            }
        };

        if let Err(e) = link.send(&response).await {
            warn!("Failed to reply to {}: {}", peer, e);
            break;
        }
    }
    debug!("Client {} disconnected", peer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingress::SessionAuthenticator;
    use flipapps_core::MessageRequest;
    use flipapps_protocol::{DriverRequest, SignInfo, WireMessage, WirePayload};
    use tokio::net::TcpStream;
    use tokio::sync::mpsc;

    async fn start() -> (
        FrameLink<TcpStream>,
        mpsc::Receiver<MessageRequest>,
        tokio::task::JoinHandle<()>,
    ) {
        let (tx, rx) = mpsc::channel(4);
        let signs = vec![SignInfo {
            name: "top".into(),
            width: 84,
            height: 7,
        }];
        let auth = SessionAuthenticator::new("pw", Duration::from_secs(60));
        let server = IngressServer::new(FlipAppsService::new(auth, signs, tx));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let handle = tokio::spawn(server.serve(listener));

        let client = FrameLink::new(TcpStream::connect(address).await.unwrap());
        (client, rx, handle)
    }

    async fn call(client: &mut FrameLink<TcpStream>, request: ServiceRequest) -> ServiceResponse {
        client.send(&request).await.unwrap();
        client.recv().await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn test_login_and_send() {
        let (mut client, mut rx, _server) = start().await;

        let token = match call(
            &mut client,
            ServiceRequest::Authenticate {
                password: "pw".into(),
            },
        )
        .await
        {
            ServiceResponse::Token { token } => token,
            other => panic!("unexpected {:?}", other),
        };

        let response = call(
            &mut client,
            ServiceRequest::SendMessage {
                token,
                message: WireMessage {
                    from: "sam".into(),
                    payload: Some(WirePayload::Text("hello".into())),
                },
            },
        )
        .await;

        assert_eq!(response, ServiceResponse::Accepted);
        assert_eq!(rx.recv().await, Some(MessageRequest::text("sam", "hello")));
    }

    #[tokio::test]
    async fn test_wrong_message_type_answered_and_connection_kept() {
        let (mut client, _rx, _server) = start().await;

        client.send(&DriverRequest::GetInfo).await.unwrap();
        let response: ServiceResponse = client.recv().await.unwrap().unwrap();
        assert!(matches!(
            response,
            ServiceResponse::Error {
                code: ErrorCode::InvalidArgument,
                ..
            }
        ));

        let response = call(
            &mut client,
            ServiceRequest::GetInfo {
                token: "nope".into(),
            },
        )
        .await;
        assert!(matches!(
            response,
            ServiceResponse::Error {
                code: ErrorCode::Unauthenticated,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_abort_closes_message_queue() {
        let (client, mut rx, server) = start().await;

        server.abort();
        let _ = server.await;
        drop(client);

        assert_eq!(rx.recv().await, None);
    }
}
