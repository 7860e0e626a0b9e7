use super::{
    config::ApiConfigTrait,
    error::{map_deserialization_error, map_serialization_error, ClientError, WrappedError},
};
use bytes::Bytes;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Serialize};

/// JSON-over-HTTP transport shared by the API backends.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient<C: ApiConfigTrait> {
    http_client: reqwest::Client,
    pub config: C,
    /// Applied to rate limited (429) responses only.
    pub backoff: backoff::ExponentialBackoff,
}

impl<C: ApiConfigTrait> ApiClient<C> {
    pub fn new(config: C) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http_client,
            config,
            backoff: backoff::ExponentialBackoffBuilder::new()
                .with_max_elapsed_time(Some(std::time::Duration::from_secs(60)))
                .build(),
        })
    }

    /// POSTs `request` as JSON to `path` and deserializes the reply body.
    pub(crate) async fn post<I, O>(&self, path: &str, request: I) -> Result<O, ClientError>
    where
        I: Serialize + std::fmt::Debug,
        O: DeserializeOwned,
    {
        let body = serde_json::to_vec(&request).map_err(map_serialization_error)?;
        let url = self.config.url(path);
        crate::trace!("POST {url}: {}", String::from_utf8_lossy(&body));

        let bytes = backoff::future::retry(self.backoff.clone(), || self.send(&url, &body)).await?;
        crate::trace!("Response: {}", String::from_utf8_lossy(&bytes));
        serde_json::from_slice(&bytes).map_err(|e| map_deserialization_error(e, &bytes))
    }

    async fn send(&self, url: &str, body: &[u8]) -> Result<Bytes, backoff::Error<ClientError>> {
        let response = self
            .http_client
            .post(url)
            .headers(self.config.headers())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| backoff::Error::Permanent(e.into()))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| backoff::Error::Permanent(e.into()))?;
        if status.is_success() {
            Ok(bytes)
        } else {
            Err(classify_failure(status, &bytes))
        }
    }
}

/// Rate limits are retried unless the account is out of quota. Everything else is final.
fn classify_failure(status: StatusCode, bytes: &[u8]) -> backoff::Error<ClientError> {
    // OpenAI style servers wrap the details in an "error" object; others send plain text
    let err = match serde_json::from_slice::<WrappedError>(bytes) {
        Ok(wrapped) => ClientError::ApiError(wrapped.error),
        Err(_) => ClientError::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(bytes).into_owned(),
        },
    };
    let out_of_quota = matches!(
        &err,
        ClientError::ApiError(e) if e.r#type.as_deref() == Some("insufficient_quota")
    );
    if status == StatusCode::TOO_MANY_REQUESTS && !out_of_quota {
        crate::warn!("Rate limited: {err}");
        backoff::Error::Transient {
            err,
            retry_after: None,
        }
    } else {
        backoff::Error::Permanent(err)
    }
}
