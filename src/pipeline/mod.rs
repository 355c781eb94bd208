/// Image processing pipeline
///
/// decode → configure filter → render → display
///
/// The pipeline owns the loaded photo, the active filter, the intensity and
/// the last rendered output. Loading and rendering run off the UI thread;
/// their results come back tagged with a load ticket or a render
/// generation so that only the newest work is ever applied. At most one
/// render runs at a time; changes made meanwhile are picked up by a single
/// follow-up render. A failure never disturbs the state that was already
/// there.

pub mod loader;

use image::{imageops::FilterType, RgbaImage};
use std::sync::Arc;

use crate::filter::{self, FilterError, FilterKind, FilterParameters, Intensity};

/// Errors surfaced to the UI. Cloneable so they can travel in messages.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    #[error("Could not read {path}: {message}")]
    Read { path: String, message: String },
    #[error("Could not load image: {0}")]
    Decode(String),
    #[error("Filter unavailable: {0}")]
    Filter(#[from] FilterError),
    #[error("Could not save {path}: {message}")]
    Export { path: String, message: String },
    #[error("Background task failed: {0}")]
    Task(String),
}

/// A decoded photo, ready to be filtered
#[derive(Clone)]
pub struct SourceImage {
    pixels: Arc<RgbaImage>,
    original_size: (u32, u32),
}

impl SourceImage {
    #[cfg(test)]
    pub fn new(pixels: RgbaImage) -> Self {
        let original_size = pixels.dimensions();
        Self { pixels: Arc::new(pixels), original_size }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Size before any downscaling done on decode
    pub fn original_size(&self) -> (u32, u32) {
        self.original_size
    }
}

// Manual Debug implementation (don't dump pixel buffers into logs)
impl std::fmt::Debug for SourceImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceImage")
            .field("dimensions", &self.pixels.dimensions())
            .field("original_size", &self.original_size)
            .finish()
    }
}

/// A filtered result. Read-only; replaced wholesale, never edited.
#[derive(Clone)]
pub struct RenderedImage {
    pixels: Arc<RgbaImage>,
    filter: FilterKind,
    params: FilterParameters,
}

impl RenderedImage {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn params(&self) -> FilterParameters {
        self.params
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }
}

impl std::fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedImage")
            .field("dimensions", &self.pixels.dimensions())
            .field("filter", &self.filter)
            .field("params", &self.params)
            .finish()
    }
}

/// Identifies one photo pick; only the newest pick may land
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Result of choosing a filter from the menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterChange {
    /// No photo loaded; nothing changed
    Ignored,
    /// Filter switched (or re-confirmed) and a render is due
    Applied,
}

/// Everything a background render needs, detached from the pipeline
#[derive(Debug, Clone)]
pub struct RenderJob {
    generation: u64,
    filter: FilterKind,
    params: FilterParameters,
    source: SourceImage,
}

/// Completed background render
#[derive(Debug, Clone)]
pub struct RenderOutcome {
    generation: u64,
    result: Result<RenderedImage, PipelineError>,
}

impl RenderJob {
    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn params(&self) -> FilterParameters {
        self.params
    }

    /// Render on the current thread
    pub fn run(self) -> RenderOutcome {
        let result = filter::effects::apply(self.filter, &self.params, self.source.pixels())
            .map(|pixels| RenderedImage {
                pixels: Arc::new(pixels),
                filter: self.filter,
                params: self.params,
            })
            .map_err(PipelineError::from);

        RenderOutcome { generation: self.generation, result }
    }

    /// Render on tokio's blocking pool (filters are CPU-bound)
    pub async fn run_async(self) -> RenderOutcome {
        let generation = self.generation;

        tokio::task::spawn_blocking(move || self.run())
            .await
            .unwrap_or_else(|e| RenderOutcome {
                generation,
                result: Err(PipelineError::Task(e.to_string())),
            })
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a source image.
/// Photos larger than `max_dimension` on either side are downscaled to fit;
/// 0 disables downscaling.
pub fn decode(bytes: &[u8], max_dimension: u32) -> Result<SourceImage, PipelineError> {
    let img = image::load_from_memory(bytes).map_err(|e| PipelineError::Decode(e.to_string()))?;
    let original_size = (img.width(), img.height());

    let img = if max_dimension > 0 && (img.width() > max_dimension || img.height() > max_dimension) {
        img.resize(max_dimension, max_dimension, FilterType::Lanczos3)
    } else {
        img
    };

    Ok(SourceImage {
        pixels: Arc::new(img.to_rgba8()),
        original_size,
    })
}

/// The photo, filter, intensity and output shown on screen
#[derive(Debug, Default)]
pub struct Pipeline {
    source: Option<SourceImage>,
    filter: FilterKind,
    intensity: Intensity,
    output: Option<RenderedImage>,
    generation: u64,
    load_ticket: u64,
    /// A background render has been handed out and not yet accepted
    render_in_flight: bool,
    /// Generation of the last render handed out
    scheduled: Option<u64>,
}

impl Pipeline {
    pub fn new(filter: FilterKind, intensity: Intensity) -> Self {
        Self {
            filter,
            intensity,
            ..Self::default()
        }
    }

    pub fn filter(&self) -> FilterKind {
        self.filter
    }

    pub fn intensity(&self) -> Intensity {
        self.intensity
    }

    #[cfg(test)]
    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn output(&self) -> Option<&RenderedImage> {
        self.output.as_ref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    pub fn is_rendering(&self) -> bool {
        self.render_in_flight
    }

    /// Start a photo pick. Any pick still in flight becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.load_ticket += 1;
        LoadTicket(self.load_ticket)
    }

    /// Land a finished pick.
    ///
    /// Returns Ok(true) when the photo replaced the previous one (the old
    /// output is dropped and a render is due), Ok(false) when a newer pick
    /// superseded this one. On error nothing changes.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<SourceImage, PipelineError>,
    ) -> Result<bool, PipelineError> {
        if ticket.0 != self.load_ticket {
            return Ok(false);
        }

        let source = result?;
        self.source = Some(source);
        self.output = None;
        self.generation += 1;
        Ok(true)
    }

    /// Switch filters. Without a photo this is a no-op.
    pub fn select_filter(&mut self, filter: FilterKind) -> FilterChange {
        if self.source.is_none() {
            return FilterChange::Ignored;
        }

        self.filter = filter;
        self.generation += 1;
        FilterChange::Applied
    }

    /// Returns false when the value did not change (no render is due)
    pub fn set_intensity(&mut self, intensity: Intensity) -> bool {
        if intensity == self.intensity {
            return false;
        }
        self.intensity = intensity;
        self.generation += 1;
        true
    }

    /// Parameters the active filter would render with right now
    pub fn parameters(&self) -> FilterParameters {
        filter::params::configure(self.filter, self.intensity)
    }

    /// Snapshot the current inputs for a background render.
    /// None when no photo is loaded: there is nothing to render.
    pub fn render_job(&self) -> Option<RenderJob> {
        let source = self.source.clone()?;

        Some(RenderJob {
            generation: self.generation,
            filter: self.filter,
            params: self.parameters(),
            source,
        })
    }

    /// Hand out the next background render.
    ///
    /// None without a photo, while another render is still running, or when
    /// the current inputs were already handed out. Call again after
    /// [`Pipeline::accept`] to pick up changes made in the meantime.
    pub fn next_render(&mut self) -> Option<RenderJob> {
        if self.render_in_flight || self.scheduled == Some(self.generation) {
            return None;
        }

        let job = self.render_job()?;
        self.render_in_flight = true;
        self.scheduled = Some(job.generation);
        Some(job)
    }

    /// Apply a finished render.
    ///
    /// Returns Ok(true) when it became the displayed output, Ok(false) when
    /// the inputs changed since it was scheduled. A failed render leaves
    /// the previous output in place.
    pub fn accept(&mut self, outcome: RenderOutcome) -> Result<bool, PipelineError> {
        self.render_in_flight = false;

        if outcome.generation != self.generation {
            return Ok(false);
        }

        self.output = Some(outcome.result?);
        Ok(true)
    }

    /// Render synchronously. None when no photo is loaded.
    #[cfg(test)]
    pub fn render_now(&mut self) -> Option<Result<(), PipelineError>> {
        let job = self.render_job()?;
        Some(self.accept(job.run()).map(|_| ()))
    }
}
