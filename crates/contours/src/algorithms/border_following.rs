use image::GrayImage;
use imageproc::contours::{BorderType, Contour, find_contours};
use tracing::debug;

use crate::{
    algorithms::approximation::approximate,
    error::{ContourError, Result},
    forest::{BorderKind, ContourForest, NodeId},
    modes::RetrievalMode,
    traits::{ContourTracer, TraceRequest},
    types::Point,
};

/// Suzuki-Abe border following as implemented by `imageproc`
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocTracer;

impl ContourTracer for ImageprocTracer {
    fn trace(&self, raster: &GrayImage, request: &TraceRequest) -> Result<Option<ContourForest>> {
        let traced = find_contours::<i32>(raster);
        debug!(borders = traced.len(), mode = %request.mode, "imageproc traced borders");

        if traced.is_empty() {
            return Ok(None);
        }

        let links: Vec<(BorderKind, Option<usize>)> = traced
            .iter()
            .map(|contour| (border_kind(contour), contour.parent))
            .collect();

        let mut forest = ContourForest::with_capacity(traced.len());
        let mut ids: Vec<Option<NodeId>> = vec![None; traced.len()];

        for (i, contour) in traced.into_iter().enumerate() {
            let (border, traced_parent) = links[i];

            let parent = match request.mode {
                RetrievalMode::External => {
                    if border != BorderKind::Outer || traced_parent.is_some() {
                        continue;
                    }
                    None
                }
                RetrievalMode::List => None,
                RetrievalMode::CComp => match border {
                    BorderKind::Outer => None,
                    BorderKind::Hole => enclosing_outer(&links, i)
                        .map(|outer| resolve(&ids, i, outer))
                        .transpose()?,
                },
                RetrievalMode::Tree => traced_parent
                    .map(|parent| resolve(&ids, i, parent))
                    .transpose()?,
            };

            let points = convert_points(contour, request)?;
            ids[i] = Some(forest.push(points, border, parent)?);
        }

        if forest.is_empty() {
            Ok(None)
        } else {
            Ok(Some(forest))
        }
    }
}

fn border_kind(contour: &Contour<i32>) -> BorderKind {
    match contour.border_type {
        BorderType::Outer => BorderKind::Outer,
        BorderType::Hole => BorderKind::Hole,
    }
}

/// Nearest ancestor of border `index` that is an outer border.
fn enclosing_outer(links: &[(BorderKind, Option<usize>)], index: usize) -> Option<usize> {
    let mut cursor = links[index].1;
    let mut steps = 0;
    while let Some(ancestor) = cursor {
        if links.get(ancestor)?.0 == BorderKind::Outer {
            return Some(ancestor);
        }
        steps += 1;
        if steps > links.len() {
            return None;
        }
        cursor = links[ancestor].1;
    }
    None
}

fn resolve(ids: &[Option<NodeId>], child: usize, parent: usize) -> Result<NodeId> {
    ids.get(parent).copied().flatten().ok_or_else(|| {
        ContourError::Tracing(format!(
            "border {} names parent {} which was not traced before it",
            child, parent
        ))
    })
}

fn convert_points(contour: Contour<i32>, request: &TraceRequest) -> Result<Vec<Point>> {
    let points = contour
        .points
        .into_iter()
        .map(|p| Point::new(p.x, p.y))
        .collect();

    approximate(points, request.method)
        .into_iter()
        .map(|point| point.checked_offset(request.offset))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::ApproximationMethod;
    use image::Luma;

    /// Filled square with a square hole, plus a filled island inside the hole.
    fn ring_with_island() -> GrayImage {
        let mut img = GrayImage::new(40, 40);
        for y in 5..35 {
            for x in 5..35 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        for y in 10..30 {
            for x in 10..30 {
                img.put_pixel(x, y, Luma([0u8]));
            }
        }
        for y in 15..25 {
            for x in 15..25 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        img
    }

    fn trace(mode: RetrievalMode) -> ContourForest {
        let request = TraceRequest {
            mode,
            ..TraceRequest::default()
        };
        ImageprocTracer
            .trace(&ring_with_island(), &request)
            .expect("tracing should succeed")
            .expect("borders should be found")
    }

    #[test]
    fn test_blank_raster_yields_nothing() {
        let img = GrayImage::new(16, 16);
        let forest = ImageprocTracer
            .trace(&img, &TraceRequest::default())
            .unwrap();
        assert!(forest.is_none());
    }

    #[test]
    fn test_tree_mode_nests_three_levels() {
        let forest = trace(RetrievalMode::Tree);
        assert_eq!(forest.len(), 3);

        let roots: Vec<_> = forest.roots().collect();
        assert_eq!(roots.len(), 1);
        let hole: Vec<_> = forest.children(roots[0]).collect();
        assert_eq!(hole.len(), 1);
        assert_eq!(forest.node(hole[0]).border, BorderKind::Hole);
        let island: Vec<_> = forest.children(hole[0]).collect();
        assert_eq!(island.len(), 1);
        assert_eq!(forest.node(island[0]).border, BorderKind::Outer);
    }

    #[test]
    fn test_ccomp_mode_lifts_island_to_top_level() {
        let forest = trace(RetrievalMode::CComp);
        assert_eq!(forest.len(), 3);

        let roots: Vec<_> = forest.roots().collect();
        assert_eq!(roots.len(), 2);
        let holes: Vec<_> = roots.iter().flat_map(|&r| forest.children(r)).collect();
        assert_eq!(holes.len(), 1);
        assert_eq!(forest.node(holes[0]).border, BorderKind::Hole);
    }

    #[test]
    fn test_external_mode_keeps_outermost_only() {
        let forest = trace(RetrievalMode::External);
        assert_eq!(forest.len(), 1);
        let root = forest.roots().next().unwrap();
        assert!(forest.children(root).next().is_none());
    }

    #[test]
    fn test_list_mode_has_no_nesting() {
        let forest = trace(RetrievalMode::List);
        assert_eq!(forest.len(), 3);
        assert_eq!(forest.roots().count(), 3);
    }

    #[test]
    fn test_simple_approximation_of_square() {
        let mut img = GrayImage::new(20, 20);
        for y in 5..15 {
            for x in 5..15 {
                img.put_pixel(x, y, Luma([255u8]));
            }
        }
        let request = TraceRequest {
            method: ApproximationMethod::Simple,
            ..TraceRequest::default()
        };
        let forest = ImageprocTracer.trace(&img, &request).unwrap().unwrap();
        let root = forest.roots().next().unwrap();
        let mut corners = forest.node(root).points.clone();
        corners.sort_by_key(|p| (p.x, p.y));
        assert_eq!(
            corners,
            vec![
                Point::new(5, 5),
                Point::new(5, 14),
                Point::new(14, 5),
                Point::new(14, 14),
            ]
        );
    }

    #[test]
    fn test_offset_overflow_is_reported() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(2, 2, Luma([255u8]));
        let request = TraceRequest {
            offset: Point::new(i32::MAX, 0),
            ..TraceRequest::default()
        };
        assert!(matches!(
            ImageprocTracer.trace(&img, &request),
            Err(ContourError::CoordinateOverflow { .. })
        ));
    }
}
