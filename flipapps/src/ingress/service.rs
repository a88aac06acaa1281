use log::{debug, info, warn};
use thiserror::Error;

use flipapps_core::{MessageError, MessageRequest};
use flipapps_protocol::{ErrorCode, ServiceRequest, ServiceResponse, SignInfo, WireMessage};

use super::auth::{AuthError, Authenticator};
use crate::channels::MessageSender;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("invalid message: {0}")]
    InvalidMessage(#[from] MessageError),
    #[error("application is not accepting messages")]
    Unavailable,
}

impl ServiceError {
    /// Status reported back to the client
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Auth(AuthError::Entropy) => ErrorCode::Internal,
            ServiceError::Auth(_) => ErrorCode::Unauthenticated,
            ServiceError::InvalidMessage(_) => ErrorCode::InvalidArgument,
            ServiceError::Unavailable => ErrorCode::Unavailable,
        }
    }
}

/// Client-facing operations
///
/// Everything except [`authenticate`](Self::authenticate) requires a live
/// token.
pub struct FlipAppsService<A> {
    auth: A,
    signs: Vec<SignInfo>,
    messages: MessageSender,
}

impl<A: Authenticator> FlipAppsService<A> {
    pub fn new(auth: A, signs: Vec<SignInfo>, messages: MessageSender) -> Self {
        Self {
            auth,
            signs,
            messages,
        }
    }

    pub fn authenticate(&self, password: &str) -> Result<String, ServiceError> {
        Ok(self.auth.authenticate(password)?)
    }

    /// The attached signs
    pub fn get_info(&self, token: &str) -> Result<Vec<SignInfo>, ServiceError> {
        self.auth.verify(token)?;
        Ok(self.signs.clone())
    }

    /// Queue a message for display
    ///
    /// A message with neither text nor images is rejected before it is
    /// queued. Waits while the application's queue is full.
    pub async fn send_message(&self, token: &str, message: WireMessage) -> Result<(), ServiceError> {
        self.auth.verify(token)?;
        let request = MessageRequest::try_from(message)?;
        request.payload()?;

        info!("Queueing message from {}", request.sender);
        self.messages
            .send(request)
            .await
            .map_err(|_| ServiceError::Unavailable)
    }

    /// Dispatch one decoded request
    pub async fn handle(&self, request: ServiceRequest) -> ServiceResponse {
        let result = match request {
            ServiceRequest::Authenticate { password } => self
                .authenticate(&password)
                .map(|token| ServiceResponse::Token { token }),
            ServiceRequest::GetInfo { token } => self
                .get_info(&token)
                .map(|signs| ServiceResponse::Info { signs }),
            ServiceRequest::SendMessage { token, message } => self
                .send_message(&token, message)
                .await
                .map(|()| ServiceResponse::Accepted),
        };

        result.unwrap_or_else(|e| {
            match e.code() {
                ErrorCode::Unauthenticated => debug!("Request rejected: {}", e),
                _ => warn!("Request failed: {}", e),
            }
            ServiceResponse::Error {
                code: e.code(),
                detail: e.to_string(),
            }
        })
    }
}
