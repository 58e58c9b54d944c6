use reqwest::Url;

use api_types::{
    bulk::{BulkOutcome, BulkRequest},
    common::{ErrorBody, ListEnvelope},
    ledger::{LedgerBalance, LedgerRequest},
};

use crate::{
    error::ClientError, ledger::Direction, page::ResourcePage, query::QueryDescriptor,
    resources::Resource,
};

/// The seam between the console core and the backend.
///
/// The fetcher, dispatcher and mutation guard only talk to this trait; the
/// production implementation is [`Client`], tests substitute an in-memory
/// fake so response interleavings are deterministic.
pub trait Api: Clone + Send + Sync + 'static {
    fn list<R: Resource>(
        &self,
        query: &QueryDescriptor,
    ) -> impl Future<Output = Result<ResourcePage<R::Summary>, ClientError>> + Send;

    fn detail<R: Resource>(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<R::Detail, ClientError>> + Send;

    fn bulk<R: Resource>(
        &self,
        request: &BulkRequest,
    ) -> impl Future<Output = Result<BulkOutcome, ClientError>> + Send;

    fn ledger(
        &self,
        direction: Direction,
        request: &LedgerRequest,
    ) -> impl Future<Output = Result<LedgerBalance, ClientError>> + Send;
}

/// REST client for the admin backend. Bearer token on every call.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: Url,
    token: String,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str, token: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            token: token.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid endpoint '{path}': {err}")))
    }

    /// Maps a non-2xx response to its error class, using the backend's
    /// `{ "error": ... }` body when it has one.
    async fn decode_error(res: reqwest::Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorBody>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status.as_u16() {
            401 => ClientError::Unauthorized,
            403 => ClientError::Forbidden,
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(body),
            400 | 422 => ClientError::Rejected(body),
            _ => ClientError::Server(body),
        }
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(String, String)],
    ) -> Result<T, ClientError> {
        let res = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if !res.status().is_success() {
            return Err(Self::decode_error(res).await);
        }
        res.json::<T>().await.map_err(ClientError::Transport)
    }

    async fn post_json<B: serde::Serialize, T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, ClientError> {
        let res = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;

        if !res.status().is_success() {
            return Err(Self::decode_error(res).await);
        }
        res.json::<T>().await.map_err(ClientError::Transport)
    }
}

impl Api for Client {
    async fn list<R: Resource>(
        &self,
        query: &QueryDescriptor,
    ) -> Result<ResourcePage<R::Summary>, ClientError> {
        let endpoint = self.endpoint(R::PATH)?;
        let envelope: ListEnvelope<R::Summary> =
            self.get_json(endpoint, &query.to_query_pairs()).await?;
        Ok(envelope.into())
    }

    async fn detail<R: Resource>(&self, id: &str) -> Result<R::Detail, ClientError> {
        let endpoint = self.endpoint(&format!("{}/{id}", R::PATH))?;
        self.get_json(endpoint, &[]).await
    }

    async fn bulk<R: Resource>(&self, request: &BulkRequest) -> Result<BulkOutcome, ClientError> {
        let endpoint = self.endpoint(&format!("{}/bulk", R::PATH))?;
        self.post_json(endpoint, request).await
    }

    async fn ledger(
        &self,
        direction: Direction,
        request: &LedgerRequest,
    ) -> Result<LedgerBalance, ClientError> {
        let endpoint = self.endpoint(direction.endpoint())?;
        self.post_json(endpoint, request).await
    }
}
