use image::GrayImage;
use crate::{
    error::Result,
    forest::ContourForest,
    modes::{ApproximationMethod, RetrievalMode},
    types::Point,
};

/// Everything a tracer needs besides the raster itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraceRequest {
    pub mode: RetrievalMode,
    pub method: ApproximationMethod,
    /// Added to every reported point
    pub offset: Point,
}

/// Trait for image preprocessing algorithms
pub trait ImagePreprocessor: Send + Sync {
    /// Turn an arbitrary grayscale image into the binary raster a tracer expects
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

/// Trait for border-following backends
pub trait ContourTracer: Send + Sync {
    /// Trace every border of `raster` and link them as `request.mode` asks.
    ///
    /// Non-zero samples are foreground. Returns `Ok(None)` when nothing was
    /// found; any other failure is an error, never an empty forest.
    fn trace(&self, raster: &GrayImage, request: &TraceRequest) -> Result<Option<ContourForest>>;
}
