use contours::{Contours, ContourError, ContourFinder, Distribution, ExtractionConfig};
use image::{DynamicImage, GrayImage};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use strum::IntoEnumIterator;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Contours(#[from] ContourError),
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("Distribution '{distribution}' disagrees with sequential output")]
    DistributionMismatch { distribution: Distribution },
}

/// Summary written next to (or instead of) the full result
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ExtractionReport {
    pub image_width: u32,
    pub image_height: u32,
    pub contour_count: usize,
    pub point_count: usize,
    pub root_count: usize,
    pub max_depth: usize,
    pub elapsed_ms: f64,
}

impl ExtractionReport {
    pub fn new(raster: &GrayImage, contours: &Contours, elapsed: Duration) -> Self {
        Self {
            image_width: raster.width(),
            image_height: raster.height(),
            contour_count: contours.len(),
            point_count: contours.point_count(),
            root_count: contours.roots().len(),
            max_depth: (0..contours.len()).map(|i| contours.depth(i)).max().unwrap_or(0),
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Turn a decoded image into the raster the finder consumes.
///
/// With a threshold configured any image is converted to grayscale and
/// binarised; without one the image has to be 8-bit single channel already.
/// An image without pixels becomes an empty raster whatever its format.
pub fn prepare_raster(image: DynamicImage, config: &ExtractionConfig) -> Result<GrayImage, CliError> {
    use contours::ImagePreprocessor;

    if image.width() == 0 || image.height() == 0 {
        return Ok(GrayImage::new(image.width(), image.height()));
    }

    match (config.preprocessor(), image) {
        (Some(preprocessor), image) => Ok(preprocessor.preprocess(&image.to_luma8())?),
        (None, DynamicImage::ImageLuma8(gray)) => Ok(gray),
        (None, other) => Ok(contours::as_gray8(&other)?.clone()),
    }
}

/// Run `finder` once and time it.
pub fn timed_find(finder: &ContourFinder, raster: &GrayImage) -> Result<(Contours, Duration), CliError> {
    let start = Instant::now();
    let contours = finder.find_gray(raster)?;
    Ok((contours, start.elapsed()))
}

/// Run every distribution on the same raster and check they agree.
pub fn compare_distributions(
    config: &ExtractionConfig,
    raster: &GrayImage,
) -> Result<Vec<(Distribution, Duration)>, CliError> {
    let mut timings = Vec::new();
    let mut reference: Option<Contours> = None;

    for distribution in Distribution::iter() {
        let finder = ExtractionConfig {
            distribution,
            ..config.clone()
        }
        .finder();

        let (contours, elapsed) = timed_find(&finder, raster)?;
        if let Some(expected) = &reference {
            if *expected != contours {
                return Err(CliError::DistributionMismatch { distribution });
            }
        } else {
            reference = Some(contours);
        }
        timings.push((distribution, elapsed));
    }

    Ok(timings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn blobs() -> GrayImage {
        let mut img = GrayImage::new(64, 64);
        for (x0, y0) in [(4u32, 4u32), (30, 8), (12, 40)] {
            for y in y0..y0 + 12 {
                for x in x0..x0 + 12 {
                    img.put_pixel(x, y, Luma([255u8]));
                }
            }
        }
        img
    }

    #[test]
    fn test_compare_distributions_agree() {
        let timings = compare_distributions(&ExtractionConfig::default(), &blobs()).unwrap();
        let names: Vec<Distribution> = timings.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            names,
            vec![Distribution::Sequential, Distribution::DataParallel, Distribution::Adaptive]
        );
    }

    #[test]
    fn test_prepare_raster_requires_gray_without_threshold() {
        let rgb = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([200, 10, 10])));
        let err = prepare_raster(rgb.clone(), &ExtractionConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Contours(ContourError::InvalidFormat { .. })));

        let config = ExtractionConfig {
            threshold: Some(20),
            ..ExtractionConfig::default()
        };
        let raster = prepare_raster(rgb, &config).unwrap();
        assert!(raster.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }

    #[test]
    fn test_prepare_raster_passes_empty_images() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 12));
        let raster = prepare_raster(empty, &ExtractionConfig::default()).unwrap();
        assert_eq!(raster.dimensions(), (0, 12));

        let (contours, _) = timed_find(&ExtractionConfig::default().finder(), &raster).unwrap();
        assert!(contours.is_empty());
    }

    #[test]
    fn test_prepare_raster_keeps_gray_pixels() {
        let raster = prepare_raster(DynamicImage::ImageLuma8(blobs()), &ExtractionConfig::default()).unwrap();
        assert_eq!(raster, blobs());
    }

    #[test]
    fn test_report_summary() {
        let raster = blobs();
        let (contours, elapsed) = timed_find(&ExtractionConfig::default().finder(), &raster).unwrap();
        let report = ExtractionReport::new(&raster, &contours, elapsed);
        assert_eq!(report.contour_count, 3);
        assert_eq!(report.root_count, 3);
        assert_eq!(report.max_depth, 0);
        assert_eq!(report.image_width, 64);
    }
}
