//! Sign driver transport
//!
//! One request frame out, one response frame back. The TCP transport
//! connects lazily and drops the connection after any failure, so the
//! next call starts from a clean stream.

use log::{debug, info, warn};
use tokio::net::TcpStream;

use flipapps_core::Bitmap;
use flipapps_protocol::{DriverRequest, DriverResponse, SignInfo};

use super::TransportError;
use crate::link::FrameLink;

/// Raw calls understood by the sign driver
#[allow(async_fn_in_trait)]
pub trait SignTransport {
    /// List attached signs
    async fn get_info(&mut self) -> Result<Vec<SignInfo>, TransportError>;

    /// Show one bitmap on the named sign
    async fn draw(&mut self, sign: &str, image: &Bitmap) -> Result<(), TransportError>;

    /// Switch the backlights
    async fn light(&mut self, on: bool) -> Result<(), TransportError>;

    /// Start or stop the driver's test pattern
    async fn test(&mut self, start: bool) -> Result<(), TransportError>;
}

/// Sign driver reached over TCP
pub struct TcpSignTransport {
    address: String,
    link: Option<FrameLink<TcpStream>>,
    /// Set while a request is outstanding; still set at the next call means
    /// the previous one was cancelled mid-exchange
    in_call: bool,
}

impl TcpSignTransport {
    /// Create a transport; no connection is made until the first call
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            link: None,
            in_call: false,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    async fn call(&mut self, request: DriverRequest) -> Result<DriverResponse, TransportError> {
        if self.in_call && self.link.take().is_some() {
            warn!("Discarding sign driver connection after cancelled call");
        }

        if self.link.is_none() {
            let stream = TcpStream::connect(&self.address).await.map_err(|source| {
                TransportError::Connect {
                    address: self.address.clone(),
                    source,
                }
            })?;
            info!("Connected to sign driver at {}", self.address);
            self.link = Some(FrameLink::new(stream));
        }
        let Some(link) = self.link.as_mut() else {
            return Err(TransportError::Closed);
        };

        self.in_call = true;
        let result = exchange(link, &request).await;
        self.in_call = false;

        if let Err(e) = &result {
            debug!("Dropping sign driver connection: {}", e);
            self.link = None;
        }

        match result? {
            DriverResponse::Error { code, detail } => Err(TransportError::Remote { code, detail }),
            response => Ok(response),
        }
    }

    async fn call_ack(&mut self, request: DriverRequest) -> Result<(), TransportError> {
        match self.call(request).await? {
            DriverResponse::Ack => Ok(()),
            _ => Err(TransportError::UnexpectedResponse),
        }
    }
}

async fn exchange(
    link: &mut FrameLink<TcpStream>,
    request: &DriverRequest,
) -> Result<DriverResponse, TransportError> {
    link.send(request).await?;
    link.recv::<DriverResponse>()
        .await?
        .ok_or(TransportError::Closed)
}

impl SignTransport for TcpSignTransport {
    async fn get_info(&mut self) -> Result<Vec<SignInfo>, TransportError> {
        match self.call(DriverRequest::GetInfo).await? {
            DriverResponse::Info { signs } => Ok(signs),
            _ => Err(TransportError::UnexpectedResponse),
        }
    }

    async fn draw(&mut self, sign: &str, image: &Bitmap) -> Result<(), TransportError> {
        self.call_ack(DriverRequest::Draw {
            sign: sign.to_string(),
            image: image.to_wire(),
        })
        .await
    }

    async fn light(&mut self, on: bool) -> Result<(), TransportError> {
        self.call_ack(DriverRequest::Light { on }).await
    }

    async fn test(&mut self, start: bool) -> Result<(), TransportError> {
        self.call_ack(DriverRequest::Test { start }).await
    }
}
