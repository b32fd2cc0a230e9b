use reqwest::header::{HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;

use crate::pocket_api::{
    RETRIEVE_URL, headers,
    items::RetrieveResponse,
    params::{FormParams, RetrieveParams},
    types::{RawRetrieveResponse, RetrieveError, TransportError},
};

/// Sends a url-encoded form and hands back the JSON body of a successful response.
pub trait Transport {
    async fn post_form(
        &self,
        url: &str,
        form: &FormParams,
        cancellation_token: CancellationToken,
    ) -> Result<serde_json::Value, TransportError>;
}

pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn try_new() -> Result<Self, TransportError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(headers::X_ACCEPT, HeaderValue::from_static("application/json"));
        log::trace!("Creating transport with default headers: {:?}", default_headers);
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()?;
        Ok(Self { client })
    }

    async fn parse_response(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, TransportError> {
        match response.status() {
            reqwest::StatusCode::OK => {
                let text = response.text().await?;
                Ok(serde_json::from_str(&text)?)
            }
            other_status => {
                // The API puts its explanation into a header rather than the body.
                let reason = response
                    .headers()
                    .get(headers::X_ERROR)
                    .and_then(|hv| hv.to_str().ok())
                    .map(str::to_owned);
                let body = response.text().await.unwrap_or_default();
                let body = match reason {
                    Some(reason) if body.is_empty() => reason,
                    Some(reason) => format!("{reason}: {body}"),
                    None => body,
                };
                Err(TransportError::UnexpectedStatus {
                    status: other_status,
                    body,
                })
            }
        }
    }
}

impl Transport for ReqwestTransport {
    async fn post_form(
        &self,
        url: &str,
        form: &FormParams,
        cancellation_token: CancellationToken,
    ) -> Result<serde_json::Value, TransportError> {
        // `form` sets the application/x-www-form-urlencoded content type.
        let request = self
            .client
            .post(url)
            .form(form)
            .build()?;

        log::trace!("Sending request: {} {}", request.method(), request.url());

        tokio::select! {
            _ = cancellation_token.cancelled() => {
                log::info!("Cancellation requested, aborting request.");
                Err(TransportError::Cancelled)
            }
            request_result = self.client.execute(request) => {
                let response = request_result?;
                log::trace!("Received response: {:?}", response);
                Self::parse_response(response).await
            }
        }
    }
}

/// Client for the retrieve endpoint.
///
/// Each call validates the parameters, sends them through the transport and
/// normalizes the answer. Nothing is kept between calls.
pub struct PocketClient<TTransport: Transport> {
    transport: TTransport,
    url: String,
}

impl<TTransport: Transport> PocketClient<TTransport> {
    pub fn new(transport: TTransport) -> Self {
        Self::with_url(transport, RETRIEVE_URL.to_string())
    }

    pub fn with_url(transport: TTransport, url: String) -> Self {
        Self { transport, url }
    }

    pub async fn retrieve(
        &self,
        params: &RetrieveParams,
        cancellation_token: CancellationToken,
    ) -> Result<RetrieveResponse, RetrieveError> {
        let form = params.to_form()?;
        let value = self
            .transport
            .post_form(&self.url, &form, cancellation_token)
            .await?;
        let raw = RawRetrieveResponse::from_value(value).inspect_err(|e| {
            log::error!("Rejecting response: {}", e);
        })?;
        let response = RetrieveResponse::try_from(raw)?;
        log::info!(
            "Retrieved {} items, next cursor is {}",
            response.list.len(),
            response.since
        );
        Ok(response)
    }
}
