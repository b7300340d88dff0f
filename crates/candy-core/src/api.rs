//! Remote Store Client
//!
//! Bindings to the house collection endpoint.

use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::error::{ApiError, ApiResult};
use crate::models::{decode_houses, CandyPatchBody, CreateHouseBody, House, NewHouse};

/// The collection endpoint as seen by the controller.
///
/// Futures are not `Send`: everything runs on the browser's single thread.
/// Nothing here retries; a failed call is reported once.
#[async_trait(?Send)]
pub trait RemoteStore {
    /// Fetch the full collection in server order
    async fn list(&self) -> ApiResult<Vec<House>>;

    /// Create a house; the server assigns the id
    async fn create(&self, house: &NewHouse) -> ApiResult<()>;

    /// Set `candy_in_stock` for one house
    async fn patch(&self, id: u32, candy_in_stock: bool) -> ApiResult<()>;
}

/// REST implementation over reqwest
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    base_url: Url,
    timeout: Duration,
    cache: Option<Rc<ResponseCache>>,
}

impl HttpStore {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url.clone(),
            timeout: config.request_timeout,
            cache: None,
        }
    }

    /// Attach a response cache owned by the caller
    pub fn with_cache(mut self, cache: Rc<ResponseCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn collection_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/<id>`, tolerating a trailing slash on the base
    pub fn record_url(&self, id: u32) -> Url {
        let mut url = self.base_url.clone();
        // Config rejects cannot-be-a-base URLs, so this always succeeds
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
        }
        url
    }

    /// Forget cached list responses, e.g. before a manual refresh
    pub fn invalidate_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.invalidate();
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn with_timeout(&self, request: RequestBuilder) -> RequestBuilder {
        request.timeout(self.timeout)
    }

    #[cfg(target_arch = "wasm32")]
    fn with_timeout(&self, request: RequestBuilder) -> RequestBuilder {
        request
    }

    /// Send, check the status and read the whole body within the timeout
    async fn exchange(&self, request: RequestBuilder) -> ApiResult<Vec<u8>> {
        let timeout = self.timeout;
        let request = self.with_timeout(request);
        let exchange = async move {
            let response = request.send().await.map_err(|e| transport_error(e, timeout))?;
            let status = response.status();
            if !status.is_success() {
                return Err(ApiError::Status {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
                });
            }
            let body = response.bytes().await.map_err(|e| transport_error(e, timeout))?;
            Ok(body.to_vec())
        };
        deadline(timeout, exchange).await
    }
}

#[async_trait(?Send)]
impl RemoteStore for HttpStore {
    async fn list(&self) -> ApiResult<Vec<House>> {
        let key = ResponseCache::key("GET", self.base_url.as_str());
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            log::debug!("[API] GET {} served from cache", self.base_url);
            return Ok(cached);
        }

        // A mutation finishing while this request is out makes its response stale
        let epoch = self.cache.as_ref().map(|cache| cache.epoch());
        log::debug!("[API] GET {}", self.base_url);
        let body = self.exchange(self.client.get(self.base_url.clone())).await?;
        let houses = decode_houses(&body)?;

        if let (Some(cache), Some(epoch)) = (&self.cache, epoch) {
            cache.put(key, houses.clone(), epoch);
        }
        Ok(houses)
    }

    async fn create(&self, house: &NewHouse) -> ApiResult<()> {
        self.invalidate_cache();
        log::debug!("[API] POST {} name={:?}", self.base_url, house.name());
        let request = self
            .client
            .post(self.base_url.clone())
            .json(&CreateHouseBody::from(house));
        self.exchange(request).await?;
        Ok(())
    }

    async fn patch(&self, id: u32, candy_in_stock: bool) -> ApiResult<()> {
        self.invalidate_cache();
        let url = self.record_url(id);
        log::debug!("[API] PATCH {} candy_in_stock={}", url, candy_in_stock);
        let request = self.client.patch(url).json(&CandyPatchBody { candy_in_stock });
        self.exchange(request).await?;
        Ok(())
    }
}

fn transport_error(error: reqwest::Error, timeout: Duration) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout(timeout)
    } else if error.is_decode() {
        ApiError::Protocol(error.to_string())
    } else {
        ApiError::Transport(error.to_string())
    }
}

// reqwest enforces the timeout itself on native targets
#[cfg(not(target_arch = "wasm32"))]
async fn deadline<F>(_timeout: Duration, exchange: F) -> ApiResult<Vec<u8>>
where
    F: Future<Output = ApiResult<Vec<u8>>>,
{
    exchange.await
}

// In the browser the losing request future is dropped, which aborts the fetch
#[cfg(target_arch = "wasm32")]
async fn deadline<F>(timeout: Duration, exchange: F) -> ApiResult<Vec<u8>>
where
    F: Future<Output = ApiResult<Vec<u8>>>,
{
    use futures::future::{self, Either};

    let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
    let expiry = gloo_timers::future::TimeoutFuture::new(millis);
    futures::pin_mut!(exchange, expiry);
    match future::select(exchange, expiry).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => Err(ApiError::Timeout(timeout)),
    }
}
