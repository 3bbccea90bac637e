//! Region orchestrator
//!
//! For each region: fetch proxies, try them one at a time against the catalog
//! page until one works or the retry bound is hit, then extract channels,
//! fetch the schedule, build both documents and write them. Regions are
//! independent and may run concurrently; a failed region never stops the run.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::generation::{GuideBuilder, PlaylistBuilder};
use crate::models::{ProxyHandle, Region};
use crate::pipeline::output::OutputWriter;
use crate::pipeline::state::RegionRun;
use crate::pipeline::summary::{RegionOutcome, RegionReport, RunSummary};
use crate::sources::{
    CatalogFetcher, CatalogSource, ChannelExtractor, EpgBatchFetcher, ProxyPool, ProxyProvider,
    ScheduleSource,
};
use crate::utils::HttpClientFactory;

pub struct Orchestrator {
    proxies: Arc<dyn ProxyProvider>,
    catalog: Arc<dyn CatalogSource>,
    schedule: Arc<dyn ScheduleSource>,
    playlist: PlaylistBuilder,
    guide: GuideBuilder,
    output: OutputWriter,
    max_retries: u32,
    max_concurrent_regions: usize,
}

impl Orchestrator {
    pub fn new(
        proxies: Arc<dyn ProxyProvider>,
        catalog: Arc<dyn CatalogSource>,
        schedule: Arc<dyn ScheduleSource>,
        config: &Config,
    ) -> Self {
        Self {
            proxies,
            catalog,
            schedule,
            playlist: PlaylistBuilder::new(config.endpoints.guide_url_template.clone()),
            guide: GuideBuilder::new(config.guide.invalid_timestamps),
            output: OutputWriter::new(&config.output),
            max_retries: config.retry.max_retries,
            max_concurrent_regions: config.runtime.max_concurrent_regions.max(1),
        }
    }

    /// Wire up the HTTP-backed sources
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let factory = HttpClientFactory::new();
        let proxies = ProxyPool::new(
            &factory,
            config.endpoints.proxy_list_url.clone(),
            config.proxy.clone(),
        )?;
        let catalog = CatalogFetcher::new(
            factory.clone(),
            config.endpoints.catalog_url.clone(),
            &config.catalog,
        );
        let schedule = EpgBatchFetcher::new(
            factory,
            config.endpoints.epg_url.clone(),
            config.epg.clone(),
        )?;

        Ok(Self::new(
            Arc::new(proxies),
            Arc::new(catalog),
            Arc::new(schedule),
            config,
        ))
    }

    /// Run every region, at most `max_concurrent_regions` at a time. The
    /// summary lists regions in the order given.
    pub async fn run(&self, regions: &[Region]) -> RunSummary {
        info!(
            "Starting run for {} region(s), concurrency {}",
            regions.len(),
            self.max_concurrent_regions
        );

        let mut reports: Vec<(usize, RegionReport)> = stream::iter(regions.iter().cloned().enumerate())
            .map(|(index, region)| async move { (index, self.run_region(region).await) })
            .buffer_unordered(self.max_concurrent_regions)
            .collect()
            .await;
        reports.sort_by_key(|(index, _)| *index);

        let summary = RunSummary {
            regions: reports.into_iter().map(|(_, report)| report).collect(),
        };
        info!(
            "Run finished: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        summary
    }

    /// Drive one region to a terminal state and report it
    pub async fn run_region(&self, region: Region) -> RegionReport {
        let mut run = RegionRun::new(region.clone(), self.max_retries);

        let outcome = match self.acquire_catalog(&mut run).await {
            Some((catalog, proxy)) => self.harvest(&run, &catalog, &proxy).await,
            None => RegionOutcome::Exhausted {
                attempts: run.attempts(),
                last_error: run.last_error().map(str::to_string),
            },
        };

        let report = RegionReport { region, outcome };
        report.log();
        report
    }

    /// Retry loop over the region's proxies. Returns the decoded catalog and
    /// the proxy that served it.
    async fn acquire_catalog(&self, run: &mut RegionRun) -> Option<(Value, ProxyHandle)> {
        run.begin_fetching_proxies();
        let proxies = self.proxies.fetch(run.region()).await;
        if proxies.is_empty() {
            warn!("No proxies available for {}", run.region());
        }
        run.load_proxies(proxies);

        while let Some(proxy) = run.next_proxy() {
            info!(
                "Region {}: attempt {}/{} via {}",
                run.region(),
                run.attempts(),
                self.max_retries,
                proxy
            );
            match self.catalog.fetch(&proxy).await {
                Ok(catalog) => {
                    run.succeed();
                    return Some((catalog, proxy));
                }
                Err(e) => {
                    debug!("Proxy {} failed for {}: {}", proxy, run.region(), e);
                    run.record_failure(&e);
                    if !e.is_retryable() {
                        warn!("Region {}: giving up after non-retryable error", run.region());
                        run.abandon();
                    }
                }
            }
        }
        None
    }

    /// Everything after a successful catalog fetch
    async fn harvest(&self, run: &RegionRun, catalog: &Value, proxy: &ProxyHandle) -> RegionOutcome {
        let region = run.region();
        let channels = ChannelExtractor::extract(catalog);
        info!(
            "Region {}: {} content ids in {} groups",
            region,
            channels.content_ids.len(),
            channels.groups.len()
        );

        let stations = self
            .schedule
            .fetch(&channels.content_ids, Some(proxy))
            .await;

        let playlist = self.playlist.build(&stations, &channels.groups, region);
        let guide = self.guide.build(&stations);

        match self.output.write_region(region, &playlist, &guide).await {
            Ok((playlist_path, guide_path)) => RegionOutcome::Success {
                attempts: run.attempts(),
                channels: channels.content_ids.len(),
                stations: stations.len(),
                playlist_path,
                guide_path,
            },
            Err(e) => RegionOutcome::WriteFailed {
                attempts: run.attempts(),
                message: e.to_string(),
            },
        }
    }
}
