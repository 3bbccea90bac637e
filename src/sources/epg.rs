//! Batched EPG programming fetcher
//!
//! Content ids are sent to the programming endpoint in fixed-size batches.
//! A failing batch is logged and skipped; the stations of every other batch are
//! still returned, in batch order.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::EpgConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::{ProxyHandle, Station};
use crate::sources::traits::ScheduleSource;
use crate::utils::json::items_of;
use crate::utils::{HttpClientFactory, ValueExt};

/// Split ids into consecutive batches of at most `size` (a zero size is
/// treated as one)
pub fn partition(ids: &[String], size: usize) -> impl Iterator<Item = &[String]> {
    ids.chunks(size.max(1))
}

/// Decode the `rows` array of a programming response. Rows that do not match
/// the station shape are dropped individually.
pub fn parse_rows(body: &Value) -> Vec<Station> {
    items_of(body.field("rows"))
        .iter()
        .filter_map(|row| match serde_json::from_value::<Station>(row.clone()) {
            Ok(station) => Some(station),
            Err(e) => {
                debug!("Skipping malformed programming row: {}", e);
                None
            }
        })
        .collect()
}

pub struct EpgBatchFetcher {
    factory: HttpClientFactory,
    direct: Client,
    url: String,
    config: EpgConfig,
}

impl EpgBatchFetcher {
    pub fn new(
        factory: HttpClientFactory,
        url: impl Into<String>,
        config: EpgConfig,
    ) -> SourceResult<Self> {
        Ok(Self {
            direct: factory.direct(config.request_timeout)?,
            factory,
            url: url.into(),
            config,
        })
    }

    fn client_for(&self, proxy: Option<&ProxyHandle>) -> Client {
        match proxy {
            Some(proxy) if self.config.route_through_proxy => {
                match self.factory.through_proxy(proxy, self.config.request_timeout) {
                    Ok(client) => client,
                    Err(e) => {
                        warn!("Cannot route EPG requests through {}: {}; going direct", proxy, e);
                        self.direct.clone()
                    }
                }
            }
            _ => self.direct.clone(),
        }
    }

    /// One request for one batch
    pub async fn fetch_batch(&self, client: &Client, batch: &[String]) -> SourceResult<Vec<Station>> {
        let response = client
            .get(&self.url)
            .query(&[("content_id", batch.join(","))])
            .send()
            .await
            .map_err(|e| SourceError::from_reqwest(&self.url, e))?;

        if response.status() != reqwest::StatusCode::OK {
            return Err(SourceError::status(response.status(), self.url.as_str()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SourceError::from_reqwest(&self.url, e))?;
        Ok(parse_rows(&body))
    }

    /// Fetch every batch, at most `batch_concurrency` in flight, keeping batch
    /// order in the result
    pub async fn fetch_all(&self, client: &Client, content_ids: &[String]) -> Vec<Station> {
        let batches: Vec<Vec<String>> = partition(content_ids, self.config.batch_size)
            .map(<[String]>::to_vec)
            .collect();
        let batch_count = batches.len();

        let results: Vec<SourceResult<Vec<Station>>> = stream::iter(batches.into_iter().enumerate())
            .map(|(index, batch)| async move {
                self.fetch_batch(client, &batch)
                    .await
                    .map_err(|e| SourceError::BatchPartialFailure {
                        batch: index,
                        message: e.to_string(),
                    })
            })
            .buffered(self.config.batch_concurrency.max(1))
            .collect()
            .await;

        let mut stations = Vec::new();
        let mut failed = 0;
        for result in results {
            match result {
                Ok(batch) => stations.extend(batch),
                Err(e) => {
                    failed += 1;
                    warn!("{}", e);
                }
            }
        }

        info!(
            "Fetched {} stations from {} EPG batches ({} failed)",
            stations.len(),
            batch_count,
            failed
        );
        stations
    }
}

#[async_trait]
impl ScheduleSource for EpgBatchFetcher {
    async fn fetch(&self, content_ids: &[String], proxy: Option<&ProxyHandle>) -> Vec<Station> {
        let client = self.client_for(proxy);
        self.fetch_all(&client, content_ids).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use tracing_test::traced_test;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ids(range: std::ops::RangeInclusive<u32>) -> Vec<String> {
        range.map(|i| i.to_string()).collect()
    }

    fn rows_for(ids: &[&str]) -> ResponseTemplate {
        let rows: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "content_id": id, "title": format!("Channel {id}") }))
            .collect();
        ResponseTemplate::new(200).set_body_json(json!({ "rows": rows }))
    }

    fn fetcher(server: &MockServer, batch_size: usize) -> EpgBatchFetcher {
        let config = EpgConfig {
            batch_size,
            request_timeout: Duration::from_secs(5),
            ..EpgConfig::default()
        };
        EpgBatchFetcher::new(
            HttpClientFactory::new(),
            format!("{}/oz/epg/programming", server.uri()),
            config,
        )
        .unwrap()
    }

    #[test]
    fn test_partition_sizes() {
        let all = ids(1..=301);
        let sizes: Vec<usize> = partition(&all, 150).map(<[String]>::len).collect();
        assert_eq!(sizes, vec![150, 150, 1]);
        assert_eq!(partition(&[], 150).count(), 0);
    }

    #[test]
    fn test_parse_rows_skips_malformed() {
        let body = json!({ "rows": [
            { "content_id": 1, "title": "One" },
            { "content_id": 2, "programs": "not a list" },
            "garbage",
            { "content_id": "3" }
        ]});
        let stations = parse_rows(&body);
        let ids: Vec<&str> = stations.iter().map(|s| s.content_id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert!(parse_rows(&json!({})).is_empty());
    }

    #[tokio::test]
    async fn test_one_request_per_batch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/oz/epg/programming"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [] })))
            .expect(3)
            .mount(&server)
            .await;

        let fetcher = fetcher(&server, 150);
        let stations = fetcher.fetch(&ids(1..=301), None).await;
        assert!(stations.is_empty());
    }

    #[tokio::test]
    async fn test_no_ids_no_requests() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        assert!(fetcher(&server, 150).fetch(&[], None).await.is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_batch_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("content_id", "1,2"))
            .respond_with(rows_for(&["1", "2"]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("content_id", "3,4"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("content_id", "5"))
            .respond_with(rows_for(&["5"]))
            .mount(&server)
            .await;

        let stations = fetcher(&server, 2).fetch(&ids(1..=5), None).await;
        let got: Vec<&str> = stations.iter().map(|s| s.content_id.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "5"]);
        assert!(logs_contain("EPG batch 1 failed"));
        assert!(logs_contain("(1 failed)"));
    }

    #[tokio::test]
    async fn test_batch_order_preserved_under_concurrency() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("content_id", "1"))
            .respond_with(rows_for(&["1"]).set_delay(Duration::from_millis(300)))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("content_id", "2"))
            .respond_with(rows_for(&["2"]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("content_id", "3"))
            .respond_with(rows_for(&["3"]))
            .mount(&server)
            .await;

        let stations = fetcher(&server, 1).fetch(&ids(1..=3), None).await;
        let got: Vec<&str> = stations.iter().map(|s| s.content_id.as_str()).collect();
        assert_eq!(got, vec!["1", "2", "3"]);
    }

    proptest! {
        #[test]
        fn prop_partition_covers_input(len in 0usize..700, size in 1usize..200) {
            let all: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let batches: Vec<&[String]> = partition(&all, size).collect();

            prop_assert_eq!(batches.len(), len.div_ceil(size));
            prop_assert!(batches.iter().all(|b| !b.is_empty() && b.len() <= size));
            let rejoined: Vec<String> = batches.concat();
            prop_assert_eq!(rejoined, all);
        }
    }
}
