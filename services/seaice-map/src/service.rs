//! End-to-end map generation for one date and mode.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bytes::Bytes;
use chrono::NaiveDate;
use grid_processor::{Pipeline, PipelineConfig, ReferenceData};
use ingestion::{
    fetch_with_policy, load_historical_average, HttpArchive, LocalArchive, ReferencePaths,
    Revision, RevisionPolicy, SourceFetcher,
};
use netcdf_parser::{default_reader, NcdumpReader, SourceReader, THICKNESS_VARIABLE};
use renderer::{MapRenderer, RenderOptions};
use seaice_common::{map_title, validate_map_date, DisplayMode};
use storage::{CacheKey, ImageCache};
use tracing::{debug, info, instrument};

use crate::config::AppConfig;

/// A rendered map and where it came from.
#[derive(Debug, Clone)]
pub struct MapOutcome {
    pub key: CacheKey,
    pub png: Bytes,
    /// Served from the cache without touching the product archive.
    pub cached: bool,
    /// Product revision the map was computed from; `None` when cached.
    pub revision: Option<Revision>,
}

/// Produces maps from reference data, a product archive and a cache.
pub struct MapService {
    reference: Arc<ReferenceData>,
    paths: ReferencePaths,
    pipeline: PipelineConfig,
    render: RenderOptions,
    fetcher: Box<dyn SourceFetcher>,
    reader: Arc<dyn SourceReader>,
    variable: String,
    cache: Option<ImageCache>,
}

impl MapService {
    /// Wire up every collaborator named in `config`.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let reference = config
            .reference
            .load()
            .context("Failed to load reference data")?;

        let fetcher: Box<dyn SourceFetcher> = match &config.archive.http_url {
            Some(url) => Box::new(
                HttpArchive::new(url.clone(), config.archive.download_dir.clone())
                    .context("Failed to create HTTP client")?,
            ),
            None => Box::new(LocalArchive::new(config.archive.root.clone())),
        };

        let reader: Arc<dyn SourceReader> = match &config.reader.ncdump {
            Some(program) => Arc::new(NcdumpReader::with_program(program)),
            None => Arc::from(default_reader()),
        };

        let cache = if config.cache.enabled {
            Some(ImageCache::open(&config.cache.root).context("Failed to open map cache")?)
        } else {
            None
        };

        let mut service = Self::new(
            reference,
            config.reference.clone(),
            config.pipeline.clone(),
            fetcher,
            reader,
            cache,
        );
        service.render = config.render.clone();
        if let Some(variable) = &config.reader.variable {
            service.variable = variable.clone();
        }
        Ok(service)
    }

    pub fn new(
        reference: ReferenceData,
        paths: ReferencePaths,
        pipeline: PipelineConfig,
        fetcher: Box<dyn SourceFetcher>,
        reader: Arc<dyn SourceReader>,
        cache: Option<ImageCache>,
    ) -> Self {
        Self {
            reference: Arc::new(reference),
            paths,
            pipeline,
            render: RenderOptions::default(),
            fetcher,
            reader,
            variable: THICKNESS_VARIABLE.to_string(),
            cache,
        }
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn cache(&self) -> Option<&ImageCache> {
        self.cache.as_ref()
    }

    /// Map for `date` in `mode`.
    ///
    /// A cached map is returned as is unless `refresh` is set; a freshly
    /// rendered map is always written to the cache.
    #[instrument(skip(self), fields(date = %date, mode = %mode))]
    pub async fn map(&self, date: NaiveDate, mode: DisplayMode, refresh: bool) -> Result<MapOutcome> {
        validate_map_date(date)?;
        let key = CacheKey::new(mode, date);

        if let (Some(cache), false) = (&self.cache, refresh) {
            if let Some(png) = cache.get(&key).await? {
                info!(key = %key, "Serving cached map");
                return Ok(MapOutcome {
                    key,
                    png,
                    cached: true,
                    revision: None,
                });
            }
        }

        let policy = RevisionPolicy::for_date(date);
        let (product, revision) = fetch_with_policy(self.fetcher.as_ref(), date, &policy)
            .await
            .with_context(|| format!("No {} product available for {}", self.fetcher.name(), date))?;
        info!(path = %product.display(), revision = %revision, "Using product");

        let png = Bytes::from(self.compute(product, date, mode).await?);

        if let Some(cache) = &self.cache {
            cache.put(&key, png.clone()).await?;
            debug!(key = %key, "Stored map in cache");
        }

        Ok(MapOutcome {
            key,
            png,
            cached: false,
            revision: Some(revision),
        })
    }

    /// Decode, process and render on the blocking pool.
    async fn compute(&self, product: PathBuf, date: NaiveDate, mode: DisplayMode) -> Result<Vec<u8>> {
        let reader = Arc::clone(&self.reader);
        let reference = Arc::clone(&self.reference);
        let pipeline = self.pipeline.clone();
        let render = self.render.clone();
        let variable = self.variable.clone();
        let historical_path = self.paths.historical_average_path(date);

        tokio::task::spawn_blocking(move || -> Result<Vec<u8>> {
            let source = reader
                .read_variable(&product, &variable)
                .with_context(|| format!("Failed to read {}", product.display()))?;

            let pipeline = Pipeline::new(&reference, pipeline);
            let raster = match mode {
                DisplayMode::Thickness => pipeline.thickness_map(&source, date)?,
                DisplayMode::Anomaly => {
                    let historical =
                        load_historical_average(&historical_path, reference.raster_size())
                            .with_context(|| {
                                format!(
                                    "Failed to load historical average {}",
                                    historical_path.display()
                                )
                            })?;
                    pipeline.anomaly_map(&source, &historical, date)?
                }
            };

            let max = pipeline.config().limits(mode).max;
            let png = MapRenderer::new(mode, max)?.render_png(&raster, &map_title(mode, date), &render)?;
            Ok(png)
        })
        .await
        .context("Map computation task failed")?
    }
}
