use {
    crate::domain::{
        error::{DispatchError, TransportError},
        provider::{PaymentTransport, ProcessingRequest, RawResponse},
    },
    reqwest::Client,
    std::{future::Future, pin::Pin, time::Duration},
};

const PROCESS_PATH: &str = "/external/process";

/// `reqwest`-backed transport. POSTs an empty body with the request
/// fields as query parameters.
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self, DispatchError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DispatchError::Transport(format!("failed to build http client: {e}")))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}{PROCESS_PATH}", base_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_inner(&self, request: &ProcessingRequest) -> Result<RawResponse, TransportError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&request.query_pairs())
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;
        Ok(RawResponse { status, body })
    }
}

impl PaymentTransport for HttpTransport {
    fn send(
        &self,
        request: &ProcessingRequest,
    ) -> Pin<Box<dyn Future<Output = Result<RawResponse, TransportError>> + Send + '_>> {
        let request = request.clone();
        Box::pin(async move { self.send_inner(&request).await })
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(e.to_string())
    }
}
