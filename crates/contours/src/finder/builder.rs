use crate::{
    algorithms::ImageprocTracer,
    distribution::{AdaptivePolicy, Distribution},
    finder::{ContourFinder, FindOptions},
    modes::{ApproximationMethod, RetrievalMode},
    traits::ContourTracer,
    types::Point,
};

/// Builder for creating contour finders with a fluent API
pub struct ContourFinderBuilder {
    tracer: Option<Box<dyn ContourTracer>>,
    options: FindOptions,
}

impl ContourFinderBuilder {
    pub fn new() -> Self {
        Self {
            tracer: None,
            options: FindOptions::default(),
        }
    }

    /// Start from a complete set of options
    pub fn with_options(mut self, options: FindOptions) -> Self {
        self.options = options;
        self
    }

    pub fn retrieval_mode(mut self, mode: RetrievalMode) -> Self {
        self.options.mode = mode;
        self
    }

    pub fn approximation(mut self, method: ApproximationMethod) -> Self {
        self.options.method = method;
        self
    }

    /// Shift every reported point, e.g. when the raster is a crop of a larger image
    pub fn offset(mut self, dx: i32, dy: i32) -> Self {
        self.options.offset = Point::new(dx, dy);
        self
    }

    pub fn distribution(mut self, distribution: Distribution) -> Self {
        self.options.distribution = distribution;
        self
    }

    pub fn max_workers(mut self, workers: usize) -> Self {
        self.options.max_workers = Some(workers);
        self
    }

    pub fn adaptive_policy(mut self, policy: AdaptivePolicy) -> Self {
        self.options.adaptive = policy;
        self
    }

    /// Set the border-following backend (replaces any existing one)
    pub fn set_tracer<T>(mut self, tracer: T) -> Self
    where
        T: ContourTracer + 'static,
    {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Build the finder, using the imageproc tracer if none was set
    pub fn build(self) -> ContourFinder {
        let tracer = self.tracer
            .unwrap_or_else(|| Box::new(ImageprocTracer));

        ContourFinder::new(tracer, self.options)
    }
}

impl Default for ContourFinderBuilder {
    fn default() -> Self {
        Self::new()
    }
}
