use std::time::Duration;

use async_trait::async_trait;
use tower::timeout::error::Elapsed;
use tower::timeout::Timeout;
use tower::{BoxError, ServiceBuilder, ServiceExt};

use crate::config::ActuatorSettings;
use crate::error::NetworkError;
use crate::notifier::actuator_service::{ActuatorService, SignalRequest};
use crate::notifier::signal::Signal;

#[async_trait]
pub trait ActuatorNotifier: Send + Sync {
    async fn send(&self, address: &str, signal: Signal) -> Result<(), NetworkError>;
}

/// Sends signal tokens over TCP, bounding each exchange with a timeout.
#[derive(Debug, Clone)]
pub struct TcpNotifier {
    port: u16,
    timeout: Duration,
    service: Timeout<ActuatorService>,
}

impl TcpNotifier {
    pub fn new(port: u16, timeout: Duration) -> Self {
        let service = ServiceBuilder::new()
            .timeout(timeout)
            .service(ActuatorService);
        Self {
            port,
            timeout,
            service,
        }
    }

    pub fn from_settings(settings: &ActuatorSettings) -> Self {
        Self::new(settings.port, settings.timeout())
    }
}

#[async_trait]
impl ActuatorNotifier for TcpNotifier {
    async fn send(&self, address: &str, signal: Signal) -> Result<(), NetworkError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(NetworkError::EmptyAddress);
        }
        let request = SignalRequest {
            address: address.to_string(),
            port: self.port,
            signal,
        };
        let endpoint = request.endpoint();

        self.service
            .clone()
            .oneshot(request)
            .await
            .map_err(|err| service_error(err, endpoint, self.timeout))
    }
}

/// Unwraps the boxed error returned by the timeout layer.
fn service_error(err: BoxError, endpoint: String, after: Duration) -> NetworkError {
    if err.is::<Elapsed>() {
        return NetworkError::Timeout {
            address: endpoint,
            after,
        };
    }
    match err.downcast::<NetworkError>() {
        Ok(network_error) => *network_error,
        Err(other) => NetworkError::Service(other.to_string()),
    }
}
