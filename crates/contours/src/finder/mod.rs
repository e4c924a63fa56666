pub mod builder;

use image::{DynamicImage, GrayImage};
use tracing::{debug, instrument};

use crate::{
    distribution::{AdaptivePolicy, Distribution, WorkerPlan},
    error::{ContourError, Result},
    modes::{ApproximationMethod, RetrievalMode},
    traits::{ContourTracer, TraceRequest},
    types::{Contours, Point},
};

/// Per-call settings of a [`ContourFinder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FindOptions {
    pub mode: RetrievalMode,
    pub method: ApproximationMethod,
    pub offset: Point,
    pub distribution: Distribution,
    /// Worker ceiling; `None` means every logical CPU
    pub max_workers: Option<usize>,
    pub adaptive: AdaptivePolicy,
}

/// Finds contours and their hierarchy in a binary raster.
///
/// The raster is only borrowed. All scratch storage produced by the tracer
/// lives inside one call and is dropped on every return path.
pub struct ContourFinder {
    tracer: Box<dyn ContourTracer>,
    options: FindOptions,
}

impl ContourFinder {
    /// Create a new finder builder
    pub fn builder() -> builder::ContourFinderBuilder {
        builder::ContourFinderBuilder::new()
    }

    pub fn new(tracer: Box<dyn ContourTracer>, options: FindOptions) -> Self {
        Self { tracer, options }
    }

    pub fn options(&self) -> &FindOptions {
        &self.options
    }

    /// Run on any decoded image; only 8-bit single-channel images are accepted.
    ///
    /// An image with no pixels yields an empty result before its format is
    /// looked at.
    pub fn find(&self, image: &DynamicImage) -> Result<Contours> {
        if image.width() == 0 || image.height() == 0 {
            return Ok(Contours::empty());
        }
        self.find_gray(as_gray8(image)?)
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(
            width = raster.width(),
            height = raster.height(),
            mode = %self.options.mode,
            method = %self.options.method,
        )
    )]
    pub fn find_gray(&self, raster: &GrayImage) -> Result<Contours> {
        if raster.width() == 0 || raster.height() == 0 {
            debug!("empty raster");
            return Ok(Contours::empty());
        }

        let request = TraceRequest {
            mode: self.options.mode,
            method: self.options.method,
            offset: self.options.offset,
        };

        let forest = match self.tracer.trace(raster, &request)? {
            Some(forest) if !forest.is_empty() => forest,
            _ => {
                debug!("no borders found");
                return Ok(Contours::empty());
            }
        };

        let flat = forest.flatten();
        let pixel_count = u64::from(raster.width()) * u64::from(raster.height());
        let plan = WorkerPlan::new(
            self.options.distribution,
            &self.options.adaptive,
            self.options.max_workers,
            pixel_count,
        );

        let contours = plan.fill(&flat)?;
        debug!(
            contours = contours.len(),
            points = contours.point_count(),
            workers = plan.workers(),
            distribution = %self.options.distribution,
            "contours extracted"
        );

        Ok(contours)
    }

    /// Get information about the finder configuration
    pub fn info(&self) -> String {
        format!(
            "ContourFinder: mode={}, method={}, offset=({}, {}), distribution={}",
            self.options.mode,
            self.options.method,
            self.options.offset.x,
            self.options.offset.y,
            self.options.distribution,
        )
    }
}

impl Default for ContourFinder {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Borrow `image` as an 8-bit single-channel raster or say what it is instead.
pub fn as_gray8(image: &DynamicImage) -> Result<&GrayImage> {
    image.as_luma8().ok_or_else(|| ContourError::InvalidFormat {
        expected: "8-bit single-channel (Luma8)",
        found: format!("{:?}", image.color()),
    })
}
