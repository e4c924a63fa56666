use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContourError {
    #[error("Invalid raster format: expected {expected}, found {found}")]
    InvalidFormat {
        expected: &'static str,
        found: String,
    },

    #[error("Contour tracing failed: {0}")]
    Tracing(String),

    #[error("Offset ({dx}, {dy}) overflows point ({x}, {y})")]
    CoordinateOverflow { x: i32, y: i32, dx: i32, dy: i32 },

    #[error("More than {limit} contours cannot be indexed")]
    TooManyContours { limit: usize },

    #[error("Inconsistent hierarchy at contour {index}: {reason}")]
    InconsistentHierarchy { index: usize, reason: String },

    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),

    #[error(transparent)]
    TomlSer(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Malformed contour GeoJSON: {0}")]
    MalformedGeoJson(String),

    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

pub type Result<T> = std::result::Result<T, ContourError>;
