use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tower::Service;
use tracing::debug;

use crate::error::NetworkError;
use crate::notifier::signal::Signal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRequest {
    pub address: String,
    pub port: u16,
    pub signal: Signal,
}

impl SignalRequest {
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// One short-lived connection per request: connect, write the token, close.
#[derive(Debug, Clone, Default)]
pub struct ActuatorService;

impl Service<SignalRequest> for ActuatorService {
    type Response = ();
    type Error = NetworkError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: SignalRequest) -> Self::Future {
        Box::pin(async move {
            let endpoint = request.endpoint();
            let mut stream = TcpStream::connect((request.address.as_str(), request.port))
                .await
                .map_err(|source| NetworkError::Connect {
                    address: endpoint.clone(),
                    source,
                })?;
            stream
                .write_all(request.signal.token())
                .await
                .map_err(|source| NetworkError::Write {
                    address: endpoint.clone(),
                    source,
                })?;
            stream
                .shutdown()
                .await
                .map_err(|source| NetworkError::Write {
                    address: endpoint.clone(),
                    source,
                })?;
            debug!("Sent {} signal to {}", request.signal, endpoint);
            Ok(())
        })
    }
}
