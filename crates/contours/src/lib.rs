//! # Contour Topology Extraction
//!
//! Finds the borders of connected components in a binary raster and reports
//! how they nest: for every contour, the indices of its next and previous
//! sibling, its first child and its parent (`-1` when absent).
//!
//! Border following is delegated to a [`ContourTracer`] (by default
//! `imageproc`'s Suzuki-Abe implementation). This crate links the traced
//! borders into a forest for the requested [`RetrievalMode`], flattens it into
//! stable indices and fills the output either sequentially or across a rayon
//! pool sized for the raster.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use contours::{find_contours, ApproximationMethod, RetrievalMode};
//!
//! let image = image::open("mask.png")?;
//! let result = find_contours(&image, RetrievalMode::Tree, ApproximationMethod::Simple, (0, 0))?;
//!
//! for (points, links) in result.iter() {
//!     println!("{} points, parent {}", points.len(), links.parent);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Custom Finder
//!
//! ```rust,no_run
//! use contours::{ContourFinder, Distribution, RetrievalMode};
//!
//! let finder = ContourFinder::builder()
//!     .retrieval_mode(RetrievalMode::CComp)
//!     .offset(100, 40)
//!     .distribution(Distribution::DataParallel)
//!     .max_workers(4)
//!     .build();
//!
//! let raster = image::open("crop.png")?.to_luma8();
//! let result = finder.find_gray(&raster)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod algorithms;
pub mod config;
pub mod distribution;
pub mod error;
pub mod finder;
pub mod forest;
pub mod io;
pub mod modes;
pub mod traits;
pub mod types;

pub use algorithms::*;
pub use config::ExtractionConfig;
pub use distribution::{AdaptivePolicy, Distribution, WorkerPlan};
pub use error::{ContourError, Result};
pub use finder::{ContourFinder, FindOptions, as_gray8, builder::ContourFinderBuilder};
pub use forest::{BorderKind, ContourForest, FlatForest, NodeId};
pub use modes::{ApproximationMethod, RetrievalMode};
pub use traits::*;
pub use types::{Contours, HierarchyEntry, Point};

/// Find contours with the default tracer and adaptive distribution.
///
/// `image` must be 8-bit single channel; an image without pixels gives an
/// empty result.
pub fn find_contours(
    image: &image::DynamicImage,
    mode: RetrievalMode,
    method: ApproximationMethod,
    offset: (i32, i32),
) -> Result<Contours> {
    ContourFinder::builder()
        .retrieval_mode(mode)
        .approximation(method)
        .offset(offset.0, offset.1)
        .build()
        .find(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, GrayImage, Luma, RgbaImage};

    fn create_test_image() -> DynamicImage {
        let mut img = GrayImage::new(100, 100);
        for y in 20..80 {
            for x in 20..80 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        for y in 40..60 {
            for x in 40..60 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_find_contours_tree() {
        let result = find_contours(
            &create_test_image(),
            RetrievalMode::Tree,
            ApproximationMethod::Simple,
            (0, 0),
        )
        .expect("Should process successfully");

        assert_eq!(result.len(), 2);
        assert_eq!(result.hierarchy[0], HierarchyEntry::from([-1, -1, 1, -1]));
        assert_eq!(result.hierarchy[1], HierarchyEntry::from([-1, -1, -1, 0]));
        result.validate().expect("hierarchy should be consistent");
    }

    #[test]
    fn test_find_contours_external_drops_hole() {
        let result = find_contours(
            &create_test_image(),
            RetrievalMode::External,
            ApproximationMethod::Simple,
            (0, 0),
        )
        .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.hierarchy[0], HierarchyEntry::NONE);
    }

    #[test]
    fn test_find_contours_rejects_rgba() {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(10, 10));
        let err = find_contours(&image, RetrievalMode::List, ApproximationMethod::Simple, (0, 0))
            .unwrap_err();
        assert!(err.to_string().contains("8-bit single-channel"));
    }
}
