use crate::config::CmsConfig;
use crate::domain::model::Record;
use crate::domain::ports::CollectionReader;
use crate::utils::error::{MenuPdfError, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// 錯誤訊息中保留的回應內容長度
const MAX_ERROR_BODY: usize = 512;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebflowItem {
    id: String,
    #[serde(default)]
    field_data: HashMap<String, Value>,
}

impl From<WebflowItem> for Record {
    fn from(item: WebflowItem) -> Self {
        Record {
            id: item.id,
            data: item.field_data,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default)]
    total: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    items: Vec<WebflowItem>,
    #[serde(default)]
    pagination: Option<Pagination>,
}

/// Webflow Data API v2 的唯讀 client
#[derive(Debug, Clone)]
pub struct WebflowClient {
    client: Client,
    api_base: String,
    access_token: String,
    page_limit: usize,
}

impl WebflowClient {
    pub fn new(config: &CmsConfig) -> Result<Self> {
        Url::parse(&config.api_base).map_err(|e| MenuPdfError::InvalidConfigValueError {
            field: "cms.api_base".to_string(),
            value: config.api_base.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            page_limit: config.page_limit.max(1),
        })
    }

    fn items_url(&self, collection_id: &str) -> String {
        format!("{}/collections/{}/items", self.api_base, collection_id)
    }

    async fn fetch_page(&self, collection_id: &str, offset: usize) -> Result<ListResponse> {
        let url = self.items_url(collection_id);
        tracing::debug!(
            "Making CMS request to: {} (limit={}, offset={})",
            url,
            self.page_limit,
            offset
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("accept", "application/json")
            .query(&[("limit", self.page_limit), ("offset", offset)])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("CMS response status: {}", status);
        let body = response.text().await?;

        if !status.is_success() {
            return Err(status_error(collection_id, status, &body));
        }

        serde_json::from_str(&body).map_err(|e| MenuPdfError::CmsPayload {
            collection: collection_id.to_string(),
            message: e.to_string(),
        })
    }
}

fn status_error(collection_id: &str, status: StatusCode, body: &str) -> MenuPdfError {
    MenuPdfError::CmsStatus {
        collection: collection_id.to_string(),
        status: status.as_u16(),
        body: body.chars().take(MAX_ERROR_BODY).collect(),
    }
}

impl CollectionReader for WebflowClient {
    async fn list_items(&self, collection_id: &str) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut offset = 0;

        loop {
            let page = self.fetch_page(collection_id, offset).await?;
            let fetched = page.items.len();
            records.extend(page.items.into_iter().map(Record::from));
            offset += fetched;

            let total = page.pagination.and_then(|p| p.total);
            let done = match total {
                Some(total) => offset >= total,
                None => fetched < self.page_limit,
            };
            if done || fetched == 0 {
                break;
            }
        }

        tracing::debug!(
            "📥 Collection {} returned {} item(s)",
            collection_id,
            records.len()
        );
        Ok(records)
    }

    async fn get_item(&self, collection_id: &str, item_id: &str) -> Result<Option<Record>> {
        let url = format!("{}/{}", self.items_url(collection_id), item_id);
        tracing::debug!("Making CMS request to: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .header("accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!("Item {} not found in collection {}", item_id, collection_id);
            return Ok(None);
        }

        let body = response.text().await?;
        if !status.is_success() {
            return Err(status_error(collection_id, status, &body));
        }

        let item: WebflowItem =
            serde_json::from_str(&body).map_err(|e| MenuPdfError::CmsPayload {
                collection: collection_id.to_string(),
                message: e.to_string(),
            })?;
        Ok(Some(item.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectionIds;
    use httpmock::prelude::*;
    use serde_json::json;

    fn config(base: String, page_limit: usize) -> CmsConfig {
        CmsConfig {
            api_base: base,
            access_token: "test-token".to_string(),
            collections: CollectionIds::default(),
            page_limit,
            timeout_seconds: Some(5),
        }
    }

    #[test]
    fn test_rejects_invalid_api_base() {
        let result = WebflowClient::new(&config("not a url".to_string(), 100));
        assert!(result.unwrap_err().is_config_error());
    }

    #[tokio::test]
    async fn test_list_items_maps_field_data() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/collections/days/items")
                .query_param("offset", "0")
                .header("authorization", "Bearer test-token");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "items": [
                        {"id": "d-1", "fieldData": {"name": "Montag", "sort-order": 0, "soup": "m-1"}},
                        {"id": "d-2", "fieldData": {"name": "Dienstag", "sort-order": 1}}
                    ],
                    "pagination": {"limit": 100, "offset": 0, "total": 2}
                }));
        });

        let client = WebflowClient::new(&config(server.base_url(), 100)).unwrap();
        let records = client.list_items("days").await.unwrap();

        mock.assert();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "d-1");
        assert_eq!(records[0].str_field("name"), Some("Montag"));
        assert_eq!(records[0].reference_field("soup"), Some("m-1"));
    }

    #[tokio::test]
    async fn test_list_items_follows_pagination() {
        let server = MockServer::start();
        let first = server.mock(|when, then| {
            when.method(GET)
                .path("/collections/menus/items")
                .query_param("offset", "0");
            then.status(200).json_body(json!({
                "items": [
                    {"id": "m-1", "fieldData": {"name": "Suppe"}},
                    {"id": "m-2", "fieldData": {"name": "Curry"}}
                ],
                "pagination": {"limit": 2, "offset": 0, "total": 3}
            }));
        });
        let second = server.mock(|when, then| {
            when.method(GET)
                .path("/collections/menus/items")
                .query_param("offset", "2");
            then.status(200).json_body(json!({
                "items": [{"id": "m-3", "fieldData": {"name": "Salat"}}],
                "pagination": {"limit": 2, "offset": 2, "total": 3}
            }));
        });

        let client = WebflowClient::new(&config(server.base_url(), 2)).unwrap();
        let records = client.list_items("menus").await.unwrap();

        first.assert();
        second.assert();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["m-1", "m-2", "m-3"]);
    }

    #[tokio::test]
    async fn test_list_items_error_status() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/collections/days/items");
            then.status(401).body("{\"message\":\"Unauthorized\"}");
        });

        let client = WebflowClient::new(&config(server.base_url(), 100)).unwrap();
        let err = client.list_items("days").await.unwrap_err();

        match &err {
            MenuPdfError::CmsStatus { status, body, .. } => {
                assert_eq!(*status, 401);
                assert!(body.contains("Unauthorized"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(err.category(), "upstream_fetch");
    }

    #[tokio::test]
    async fn test_list_items_malformed_payload() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/collections/days/items");
            then.status(200).body("not json");
        });

        let client = WebflowClient::new(&config(server.base_url(), 100)).unwrap();
        let err = client.list_items("days").await.unwrap_err();
        assert!(matches!(err, MenuPdfError::CmsPayload { .. }));
    }

    #[tokio::test]
    async fn test_get_item_found_and_missing() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/collections/menus/items/m-9");
            then.status(200).json_body(json!({
                "id": "m-9",
                "fieldData": {"name": "Raclette", "price": 22}
            }));
        });
        server.mock(|when, then| {
            when.method(GET).path("/collections/menus/items/gone");
            then.status(404);
        });

        let client = WebflowClient::new(&config(server.base_url(), 100)).unwrap();

        let found = client.get_item("menus", "m-9").await.unwrap().unwrap();
        assert_eq!(found.str_field("name"), Some("Raclette"));
        assert_eq!(found.display_field("price"), Some("22.00".to_string()));

        assert!(client.get_item("menus", "gone").await.unwrap().is_none());
    }
}
