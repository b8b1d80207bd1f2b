//! Record provider backed by the platform's JSON web-services API.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::WebServiceConfig;
use super::wire::{
    ErrorResponse, QueryRequest, QueryResponse, WireQuery, WireZoneId, ZoneChangesRequest,
    ZoneChangesResponse,
};
use crate::changes::{ChangePage, ChangeToken};
use crate::database::Database;
use crate::provider::RecordProvider;
use crate::query::{Query, QueryCursor, QueryPage};
use crate::record::ZoneId;
use crate::{Error, RemoteError, RemoteErrorCode, Result, TRACING_TARGET_PROVIDER};

/// Inner provider that holds the HTTP client and configuration.
struct WebServiceProviderInner {
    http: Client,
    config: WebServiceConfig,
}

/// [`RecordProvider`] speaking the web-services API over HTTP.
///
/// # Examples
///
/// ```rust,ignore
/// use clouddata::provider::web::{WebServiceConfig, WebServiceProvider};
///
/// let config = WebServiceConfig::new(api_token).with_web_auth_token(user_token);
/// let provider = WebServiceProvider::new(config)?;
/// let client = CloudClient::new(CloudConfig::private("iCloud.com.example"), provider);
/// ```
#[derive(Clone)]
pub struct WebServiceProvider {
    inner: Arc<WebServiceProviderInner>,
}

impl std::fmt::Debug for WebServiceProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServiceProvider")
            .field("base_url", &self.inner.config.base_url)
            .field("environment", &self.inner.config.environment)
            .finish_non_exhaustive()
    }
}

impl WebServiceProvider {
    /// Creates a new provider with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the HTTP client
    /// cannot be created.
    pub fn new(config: WebServiceConfig) -> Result<Self> {
        config.validate().map_err(Error::invalid_config)?;

        let timeout = config.effective_timeout();
        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            base_url = %config.base_url,
            environment = %config.environment,
            timeout_ms = timeout.as_millis(),
            "Creating web-services provider"
        );

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(config.effective_user_agent())
            .build()
            .map_err(|e| Error::invalid_config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            inner: Arc::new(WebServiceProviderInner { http, config }),
        })
    }

    /// Gets the provider configuration.
    pub fn config(&self) -> &WebServiceConfig {
        &self.inner.config
    }

    /// Returns the URL of `operation` (e.g. `records/query`) for `database`.
    pub fn endpoint(&self, database: &Database, operation: &str) -> String {
        let config = &self.inner.config;
        format!(
            "{}/database/1/{}/{}/{}/{}",
            config.base_url.trim_end_matches('/'),
            database.container_identifier(),
            config.environment,
            database.partition(),
            operation,
        )
    }

    async fn post<B, R>(&self, database: &Database, operation: &str, body: &B) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = self.endpoint(database, operation);
        let config = &self.inner.config;

        let mut params = vec![("ckAPIToken", config.api_token.as_str())];
        if let Some(token) = config.web_auth_token.as_deref() {
            params.push(("ckWebAuthToken", token));
        }

        let response = self
            .inner
            .http
            .post(&url)
            .query(&params)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body: ErrorResponse = response.json().await.unwrap_or_default();
            let err = status_error(status, body);
            tracing::warn!(
                target: TRACING_TARGET_PROVIDER,
                operation,
                status = status.as_u16(),
                code = %err.code,
                "Web-services request failed"
            );
            return Err(err.into());
        }

        response.json::<R>().await.map_err(|e| {
            RemoteError::new(
                RemoteErrorCode::Unknown,
                format!("malformed {operation} response: {e}"),
            )
            .into()
        })
    }
}

#[async_trait::async_trait]
impl RecordProvider for WebServiceProvider {
    async fn query(
        &self,
        database: &Database,
        zone: &ZoneId,
        query: &Query,
        cursor: Option<&QueryCursor>,
    ) -> Result<QueryPage> {
        let request = QueryRequest {
            zone_id: WireZoneId::from(zone),
            query: WireQuery {
                record_type: &query.record_type,
                filter_by: Vec::new(),
            },
            desired_keys: query.desired_keys.as_deref(),
            continuation_marker: cursor.map(|c| c.0.as_str()),
        };

        let response: QueryResponse = self.post(database, "records/query", &request).await?;

        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            zone = %zone,
            record_type = %query.record_type,
            count = response.records.len(),
            more = response.continuation_marker.is_some(),
            "Query page received"
        );

        Ok(QueryPage {
            results: response
                .records
                .into_iter()
                .map(|entry| entry.into_result(zone))
                .collect(),
            cursor: response.continuation_marker.map(QueryCursor),
        })
    }

    async fn zone_changes(
        &self,
        database: &Database,
        zone: &ZoneId,
        since: Option<&ChangeToken>,
    ) -> Result<ChangePage> {
        let request = ZoneChangesRequest::single(zone, since.map(ChangeToken::as_str));

        let response: ZoneChangesResponse = self.post(database, "changes/zone", &request).await?;
        let batch = response.into_single(zone).inspect_err(|err| {
            tracing::warn!(
                target: TRACING_TARGET_PROVIDER,
                zone = %zone,
                code = %err.code,
                "Zone rejected in change request"
            );
        })?;

        let (deleted, modified): (Vec<_>, Vec<_>) = batch
            .records
            .into_iter()
            .partition(|entry| entry.is_deleted());

        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            zone = %zone,
            modified = modified.len(),
            deleted = deleted.len(),
            more_coming = batch.more_coming,
            "Change page received"
        );

        Ok(ChangePage {
            modified: modified
                .into_iter()
                .map(|entry| entry.into_result(zone))
                .collect(),
            deleted: deleted.iter().map(|entry| entry.record_id(zone)).collect(),
            token: ChangeToken::new(batch.sync_token),
            more_coming: batch.more_coming,
        })
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    let message = if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        "Connection failed".to_string()
    } else {
        err.to_string()
    };
    RemoteError::network_failure(message).into()
}

fn status_error(status: StatusCode, body: ErrorResponse) -> RemoteError {
    let code = match body.server_error_code.as_deref() {
        Some(code) => RemoteErrorCode::from_server_code(code),
        None => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteErrorCode::NotAuthenticated,
            StatusCode::NOT_FOUND => RemoteErrorCode::UnknownItem,
            StatusCode::BAD_REQUEST => RemoteErrorCode::BadRequest,
            StatusCode::TOO_MANY_REQUESTS => RemoteErrorCode::Throttled,
            s if s.is_server_error() => RemoteErrorCode::ServerError,
            _ => RemoteErrorCode::Unknown,
        },
    };
    let message = body
        .reason
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    RemoteError::new(code, message)
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::changes::MemoryTokenStore;
    use crate::database::Container;
    use crate::{CloudClient, CloudConfig, Partition};

    const CONTAINER: &str = "iCloud.com.example.recipes";

    fn provider(server: &MockServer) -> WebServiceProvider {
        WebServiceProvider::new(
            WebServiceConfig::new("api-token")
                .with_base_url(server.uri())
                .with_web_auth_token("user-token"),
        )
        .unwrap()
    }

    #[test]
    fn test_provider_rejects_invalid_config() {
        let err = WebServiceProvider::new(WebServiceConfig::new("")).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_endpoint() {
        let provider = WebServiceProvider::new(
            WebServiceConfig::new("token").with_base_url("https://example.com/"),
        )
        .unwrap();
        let container = Container::new(CONTAINER);

        assert_eq!(
            provider.endpoint(container.database(Partition::Private), "records/query"),
            "https://example.com/database/1/iCloud.com.example.recipes/development/private/records/query"
        );
    }

    #[tokio::test]
    async fn test_query_follows_continuation_marker() {
        let server = MockServer::start().await;
        let query_path = format!("/database/1/{CONTAINER}/development/private/records/query");

        Mock::given(method("POST"))
            .and(path(query_path.as_str()))
            .and(query_param("ckAPIToken", "api-token"))
            .and(query_param("ckWebAuthToken", "user-token"))
            .and(body_json(json!({
                "zoneID": { "zoneName": "Recipes" },
                "query": { "recordType": "Recipe", "filterBy": [] },
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{
                    "recordName": "a",
                    "recordType": "Recipe",
                    "fields": { "name": { "value": "Pancakes", "type": "STRING" } },
                }],
                "continuationMarker": "m1",
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(query_path.as_str()))
            .and(body_json(json!({
                "zoneID": { "zoneName": "Recipes" },
                "query": { "recordType": "Recipe", "filterBy": [] },
                "continuationMarker": "m1",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{
                    "recordName": "b",
                    "recordType": "Recipe",
                    "fields": { "name": { "value": "Bread", "type": "STRING" } },
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(CloudConfig::private(CONTAINER), provider(&server));
        let fields = client.fetch_fields("Recipe", Some("Recipes")).await.unwrap();

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0]["name"], "Pancakes");
        assert_eq!(fields[1]["name"], "Bread");
    }

    #[tokio::test]
    async fn test_query_record_error_fails_fetch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [
                    { "recordName": "a", "recordType": "Recipe", "fields": {} },
                    { "recordName": "b", "serverErrorCode": "QUOTA_EXCEEDED", "reason": "full" },
                ],
            })))
            .mount(&server)
            .await;

        let client = CloudClient::new(CloudConfig::private(CONTAINER), provider(&server));
        let err = client.fetch_records("Recipe", None).await.unwrap_err();

        let remote = err.as_remote().unwrap();
        assert_eq!(remote.code, RemoteErrorCode::QuotaExceeded);
        assert_eq!(remote.record_name.as_deref(), Some("b"));
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(421).set_body_json(json!({
                "uuid": "x",
                "serverErrorCode": "AUTHENTICATION_REQUIRED",
                "reason": "request needs authorization",
            })))
            .mount(&server)
            .await;

        let client = CloudClient::new(CloudConfig::private(CONTAINER), provider(&server));
        let err = client.fetch_records("Recipe", None).await.unwrap_err();

        let remote = err.as_remote().unwrap();
        assert_eq!(remote.code, RemoteErrorCode::NotAuthenticated);
        assert_eq!(remote.message, "request needs authorization");
    }

    #[tokio::test]
    async fn test_http_error_without_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = CloudClient::new(CloudConfig::private(CONTAINER), provider(&server));
        let err = client.fetch_records("Recipe", None).await.unwrap_err();

        let remote = err.as_remote().unwrap();
        assert_eq!(remote.code, RemoteErrorCode::ServerError);
        assert_eq!(remote.message, "HTTP 503");
    }

    #[tokio::test]
    async fn test_zone_changes_pages_and_deletions() {
        let server = MockServer::start().await;
        let changes_path = format!("/database/1/{CONTAINER}/development/private/changes/zone");

        Mock::given(method("POST"))
            .and(path(changes_path.as_str()))
            .and(body_json(json!({
                "zones": [{ "zoneID": { "zoneName": "Recipes" } }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zones": [{
                    "zoneID": { "zoneName": "Recipes" },
                    "syncToken": "t1",
                    "moreComing": true,
                    "records": [
                        { "recordName": "a", "recordType": "Recipe",
                          "fields": { "name": { "value": "Pancakes" } } },
                        { "recordName": "b", "recordType": "Recipe",
                          "fields": { "name": { "value": "Bread" } } },
                    ],
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path(changes_path.as_str()))
            .and(body_json(json!({
                "zones": [{ "zoneID": { "zoneName": "Recipes" }, "syncToken": "t1" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zones": [{
                    "zoneID": { "zoneName": "Recipes" },
                    "syncToken": "t2",
                    "moreComing": false,
                    "records": [
                        { "recordName": "c", "recordType": "Recipe",
                          "fields": { "name": { "value": "Soup" } } },
                        { "recordName": "b", "deleted": true },
                    ],
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(
            CloudConfig::private(CONTAINER).with_zone("Recipes"),
            provider(&server),
        );
        let changes = client.fetch_zone_changes(None).await.unwrap();

        assert_eq!(changes.pages, 2);
        assert_eq!(changes.token, Some(ChangeToken::new("t2")));
        assert_eq!(changes.deleted.len(), 1);

        let names = changes.project("name");
        assert_eq!(names.len(), 2);
        assert_eq!(names["a"], "Pancakes");
        assert_eq!(names["c"], "Soup");
    }

    #[tokio::test]
    async fn test_zone_changes_zone_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "zones": [{
                    "zoneID": { "zoneName": "Archive" },
                    "serverErrorCode": "ZONE_NOT_FOUND",
                    "reason": "zone 'Archive' does not exist",
                }],
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CloudClient::new(CloudConfig::private(CONTAINER), provider(&server))
            .with_token_store(MemoryTokenStore::new());
        let err = client.fetch_zone_changes(Some("Archive")).await.unwrap_err();

        let remote = err.as_remote().unwrap();
        assert_eq!(remote.code, RemoteErrorCode::ZoneNotFound);
        assert_eq!(remote.message, "zone 'Archive' does not exist");
    }
}
