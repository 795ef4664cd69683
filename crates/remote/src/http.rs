//! [`RemoteStore`] over the file mapper HTTP API.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use futures_util::StreamExt;
use logging::{trace_delete, trace_download, trace_upload};
use reqwest::header::{CONTENT_DISPOSITION, LAST_MODIFIED};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, RequestBuilder, Response};
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::{Environment, IoResultExt, QueryValues, RemoteError, RemoteNode, RemoteStore};

/// Production API base.
pub const PROD_API_BASE: &str = "https://api.hubapi.com/content/filemapper/v1";

/// QA API base.
pub const QA_API_BASE: &str = "https://api.hubapiqa.com/content/filemapper/v1";

/// Path segment the listing endpoint uses for the account root.
pub const ROOT_LISTING_PATH: &str = "@root";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Bearer-authenticated client for the file mapper endpoints.
///
/// Every remote path is sent as one percent-encoded segment after the action
/// (`upload/`, `download/`, `download-default/`, `stream/`, `delete/`) and
/// every request carries the `portalId` query parameter.
#[derive(Clone, Debug)]
pub struct HttpRemoteStore {
    client: Client,
    base: Url,
    access_token: String,
}

impl HttpRemoteStore {
    /// Creates a store against `base`.
    pub fn new(base: Url, access_token: impl Into<String>) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .user_agent(concat!("hsync/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|error| RemoteError::transport(base.as_str(), error.to_string()))?;
        Ok(Self {
            client,
            base,
            access_token: access_token.into(),
        })
    }

    /// Creates a store against the API base of `environment`.
    pub fn for_environment(
        environment: Environment,
        access_token: impl Into<String>,
    ) -> Result<Self, RemoteError> {
        let base = match environment {
            Environment::Prod => PROD_API_BASE,
            Environment::Qa => QA_API_BASE,
        };
        let base = Url::parse(base).map_err(|error| RemoteError::transport(base, error.to_string()))?;
        Self::new(base, access_token)
    }

    /// Builds the URL for `action` on `remote_path`.
    pub fn endpoint(
        &self,
        action: &str,
        remote_path: &str,
        account_id: u64,
        query: Option<&QueryValues>,
    ) -> Result<Url, RemoteError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::transport(remote_path, "API base cannot carry a path"))?
            .pop_if_empty()
            .push(action)
            .push(remote_path);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("portalId", &account_id.to_string());
            if let Some(query) = query {
                for (key, value) in query.pairs() {
                    pairs.append_pair(key, &value);
                }
            }
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder, remote_path: &str) -> Result<Response, RemoteError> {
        let response = request
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|error| RemoteError::transport(remote_path, error.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(RemoteError::from_status(
            remote_path,
            status.as_u16(),
            error_message(&body),
        ))
    }

    async fn fetch_tree(
        &self,
        action: &str,
        account_id: u64,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        let listing_path = if paths::is_root(remote_path) {
            ROOT_LISTING_PATH
        } else {
            remote_path
        };
        let url = self.endpoint(action, listing_path, account_id, Some(query))?;
        let response = self.send(self.client.get(url), remote_path).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|error| RemoteError::transport(remote_path, error.to_string()))?;
        RemoteNode::from_json(&bytes).map_err(|error| RemoteError::InvalidResponse {
            path: remote_path.to_owned(),
            message: error.to_string(),
        })
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn upload_file(
        &self,
        account_id: u64,
        local_path: &Path,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<(), RemoteError> {
        let file = tokio::fs::File::open(local_path)
            .await
            .with_path(local_path, "open")?;
        let length = file
            .metadata()
            .await
            .with_path(local_path, "read metadata of")?
            .len();
        let file_name = paths::remote_basename(remote_path).to_owned();
        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(file_name);

        let url = self.endpoint("upload", remote_path, account_id, Some(query))?;
        let request = self.client.post(url).multipart(Form::new().part("file", part));
        self.send(request, remote_path).await?;
        trace_upload!(bytes = length, "uploaded {} to {remote_path}", local_path.display());
        Ok(())
    }

    async fn download_stream(
        &self,
        account_id: u64,
        remote_path: &str,
        local_dest: &Path,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        let url = self.endpoint("stream", remote_path, account_id, Some(query))?;
        let response = self.send(self.client.get(url), remote_path).await?;

        let headers = response.headers();
        let name = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(disposition_filename)
            .unwrap_or_else(|| paths::remote_basename(remote_path).to_owned());
        let updated_at = headers
            .get(LAST_MODIFIED)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
            .map_or(0, |modified| modified.timestamp_millis());

        let mut file = tokio::fs::File::create(local_dest)
            .await
            .with_path(local_dest, "create")?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|error| RemoteError::transport(remote_path, error.to_string()))?;
            file.write_all(&chunk).await.with_path(local_dest, "write")?;
        }
        file.flush().await.with_path(local_dest, "write")?;
        trace_download!("streamed {remote_path} to {}", local_dest.display());

        Ok(RemoteNode::file(name, remote_path).with_timestamps(0, updated_at))
    }

    async fn download_tree(
        &self,
        account_id: u64,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        self.fetch_tree("download", account_id, remote_path, query).await
    }

    async fn download_default_tree(
        &self,
        account_id: u64,
        remote_path: &str,
        query: &QueryValues,
    ) -> Result<RemoteNode, RemoteError> {
        self.fetch_tree("download-default", account_id, remote_path, query)
            .await
    }

    async fn delete_remote(&self, account_id: u64, remote_path: &str) -> Result<(), RemoteError> {
        let url = self.endpoint("delete", remote_path, account_id, None)?;
        self.send(self.client.delete(url), remote_path).await?;
        trace_delete!("deleted {remote_path}");
        Ok(())
    }
}

/// Extracts the `filename` parameter of a `Content-Disposition` header,
/// reduced to its final path component.
fn disposition_filename(header: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|param| param.trim().split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value.trim().trim_matches('"'))
        .map(paths::remote_basename)
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_owned)
}

/// Prefers the `message` field of a JSON error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_owned())
}
