//! HTTP retrieval of the public datasets.
//!
//! Both tabular datasets are requested concurrently and joined; the first
//! failure aborts the join. There is no retry.

use crate::config::SourcesConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::models::{PopulationRecord, RegistrationDataset};
use anyhow::{Context, Result};
use geojson::FeatureCollection;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Raw payloads of one load attempt.
#[derive(Debug, Clone, Default)]
pub struct RawDatasets {
    pub population: Vec<PopulationRecord>,
    pub registrations: RegistrationDataset,
}

/// Fetches the datasets named in the sources configuration.
pub struct DataFetcher {
    http_client: reqwest::Client,
    sources: SourcesConfig,
}

impl DataFetcher {
    /// Create a fetcher with the configured request timeout.
    ///
    /// Failed requests are never retried, so the timeout is what turns a
    /// stalled server into a logged load failure instead of a run that
    /// never finishes.
    pub fn new(sources: SourcesConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(sources.timeout_seconds))
            .user_agent(concat!("evslides/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            sources,
        })
    }

    /// Fetch the population and registration datasets concurrently.
    pub async fn load_datasets(&self) -> PipelineResult<RawDatasets> {
        info!("Fetching population and registration datasets");

        let (population, registrations) = futures::try_join!(
            self.fetch_json::<Vec<PopulationRecord>>("population", &self.sources.population_url),
            self.fetch_json::<RegistrationDataset>(
                "registrations",
                &self.sources.registrations_url
            ),
        )?;

        info!(
            "Fetched {} population records and {} registration rows",
            population.len(),
            registrations.data.len()
        );

        Ok(RawDatasets {
            population,
            registrations,
        })
    }

    /// Fetch the county boundary collection.
    pub async fn fetch_boundaries(&self) -> PipelineResult<FeatureCollection> {
        self.fetch_json::<FeatureCollection>("boundaries", &self.sources.boundaries_url)
            .await
    }

    /// GET a URL and decode its JSON body.
    async fn fetch_json<T: DeserializeOwned>(
        &self,
        source_name: &str,
        url: &str,
    ) -> PipelineResult<T> {
        debug!("GET {} ({})", url, source_name);

        let response = self.http_client.get(url).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!(
                    "request timed out after {}s",
                    self.sources.timeout_seconds
                )
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            PipelineError::Fetch {
                source_name: source_name.to_string(),
                url: url.to_string(),
                message,
            }
        })?;

        if !response.status().is_success() {
            return Err(PipelineError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| PipelineError::Fetch {
            source_name: source_name.to_string(),
            url: url.to_string(),
            message: e.to_string(),
        })?;

        debug!("{}: {} bytes", source_name, body.len());

        serde_json::from_slice(&body).map_err(|e| PipelineError::Parse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve a single canned HTTP response per connection, forever.
    async fn serve(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let mut buf = [0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{}", addr)
    }

    /// Fetcher pointed at local servers, ignoring any proxy in the environment.
    fn local_fetcher(population_url: String, registrations_url: String) -> DataFetcher {
        DataFetcher {
            http_client: reqwest::Client::builder()
                .no_proxy()
                .timeout(Duration::from_secs(5))
                .build()
                .unwrap(),
            sources: SourcesConfig {
                population_url,
                registrations_url,
                timeout_seconds: 5,
                ..SourcesConfig::default()
            },
        }
    }

    #[tokio::test]
    async fn test_load_datasets_success() {
        let pop_url = serve("200 OK", r#"[{"county":"King","pop_2023":"100"}]"#).await;
        let reg_url = serve("200 OK", r#"{"meta":{},"data":[[1,2,3]]}"#).await;

        let fetcher = local_fetcher(pop_url, reg_url);
        let raw = fetcher.load_datasets().await.unwrap();

        assert_eq!(raw.population.len(), 1);
        assert_eq!(raw.population[0].population(), 100.0);
        assert_eq!(raw.registrations.data.len(), 1);
    }

    #[tokio::test]
    async fn test_fetched_rows_aggregate() {
        let pop_url = serve(
            "200 OK",
            r#"[{"county":"King","pop_2023":"200"},{"county":"Adams","pop_2023":50}]"#,
        )
        .await;
        let reg_url = serve(
            "200 OK",
            r#"{"data":[
                [0,0,0,0,0,0,0,0,0,"King",0,0,0,"2020",0,0,"Battery Electric Vehicle (BEV)"],
                [0,0,0,0,0,0,0,0,0,"King",0,0,0,"2021",0,0,"Battery Electric Vehicle (BEV)"],
                [0,0,0,0,0,0,0,0,0,"King",0,0,0,"2020",0,0,"Plug-in Hybrid Electric Vehicle (PHEV)"]
            ]}"#,
        )
        .await;

        let fetcher = local_fetcher(pop_url, reg_url);
        let raw = fetcher.load_datasets().await.unwrap();
        let datasets = crate::analysis::aggregate(
            &raw.population,
            &raw.registrations,
            &crate::analysis::RowLayout::default(),
        )
        .unwrap();

        assert_eq!(datasets.bev_percentage_by_county.get("King"), Some(&1.0));
        assert_eq!(datasets.yearly.len(), 2);
        assert_eq!(datasets.yearly[0].phev, 1);
        assert_eq!(datasets.recognized_registrations(), 3);
    }

    #[tokio::test]
    async fn test_http_error_aborts_join() {
        let pop_url = serve("200 OK", "[]").await;
        let reg_url = serve("500 Internal Server Error", "{}").await;

        let fetcher = local_fetcher(pop_url, reg_url);
        let err = fetcher.load_datasets().await.unwrap_err();
        assert!(matches!(err, PipelineError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_invalid_json_is_parse_error() {
        let pop_url = serve("200 OK", "not json").await;
        let reg_url = serve("200 OK", r#"{"data":[]}"#).await;

        let fetcher = local_fetcher(pop_url, reg_url);
        let err = fetcher.load_datasets().await.unwrap_err();
        assert!(matches!(err, PipelineError::Parse { .. }));
    }

    #[test]
    fn test_unreachable_host_is_fetch_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}", addr);
        let fetcher = local_fetcher(url.clone(), url);

        // block_on builds its own runtime with IO and time enabled.
        let err = tokio_test::block_on(fetcher.load_datasets()).unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
    }
}
