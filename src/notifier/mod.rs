pub mod actuator_service;
pub mod dispatcher;
pub mod signal;
pub mod tcp_notifier;

pub use actuator_service::{ActuatorService, SignalRequest};
pub use dispatcher::NotificationDispatcher;
pub use signal::Signal;
pub use tcp_notifier::{ActuatorNotifier, TcpNotifier};
