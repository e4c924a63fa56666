//! How the per-contour copy and link resolution is spread over threads.
//!
//! Once a forest is flattened, slot `i` of the output depends only on the
//! node at position `i`, so the work splits cleanly. The strategies differ
//! in when a slot is written, never in which slot or with what.

use rayon::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::{debug, trace};

use crate::{
    error::Result,
    forest::FlatForest,
    types::{Contours, HierarchyEntry},
};

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Distribution {
    /// Fill every slot on the calling thread
    Sequential,
    /// Split the slots into one contiguous chunk per worker of a fixed pool
    DataParallel,
    /// Pick the worker count from the raster size, then split like `DataParallel`
    #[default]
    Adaptive,
}

/// Pixel-count thresholds used by [`Distribution::Adaptive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AdaptivePolicy {
    /// Rasters with fewer pixels run on a single worker
    pub small_pixels: u64,
    /// Rasters with fewer pixels run on half of the available workers
    pub medium_pixels: u64,
}

impl Default for AdaptivePolicy {
    fn default() -> Self {
        Self {
            small_pixels: 512 * 512,
            medium_pixels: 2048 * 2048,
        }
    }
}

impl AdaptivePolicy {
    pub fn workers_for(&self, pixel_count: u64, available: usize) -> usize {
        let available = available.max(1);
        if pixel_count < self.small_pixels {
            1
        } else if pixel_count < self.medium_pixels {
            (available / 2).max(2)
        } else {
            available
        }
    }
}

/// Concrete threading decision for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerPlan {
    Sequential,
    /// Rayon's global pool, whatever size it was configured with
    SharedPool,
    /// A pool built for this call only, dropped when the call returns
    DedicatedPool(usize),
}

impl WorkerPlan {
    pub fn new(
        distribution: Distribution,
        policy: &AdaptivePolicy,
        max_workers: Option<usize>,
        pixel_count: u64,
    ) -> Self {
        let workers = match distribution {
            Distribution::Sequential => return Self::Sequential,
            Distribution::DataParallel => match max_workers {
                Some(workers) => workers,
                None => return Self::SharedPool,
            },
            // The floor of two medium-raster workers applies to detected
            // CPUs; an explicit `max_workers` is a hard ceiling.
            Distribution::Adaptive => {
                let available = max_workers.unwrap_or_else(num_cpus::get);
                policy
                    .workers_for(pixel_count, available)
                    .min(max_workers.unwrap_or(usize::MAX))
            }
        };

        if workers <= 1 {
            Self::Sequential
        } else {
            Self::DedicatedPool(workers)
        }
    }

    pub fn workers(&self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::SharedPool => rayon::current_num_threads(),
            Self::DedicatedPool(workers) => *workers,
        }
    }

    /// Materialise every slot of `flat` into a [`Contours`].
    pub fn fill(&self, flat: &FlatForest<'_>) -> Result<Contours> {
        debug!(plan = ?self, slots = flat.len(), "filling contour slots");
        match *self {
            Self::Sequential => Ok(fill_sequential(flat)),
            Self::SharedPool => Ok(fill_chunked(flat, rayon::current_num_threads())),
            Self::DedicatedPool(workers) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(workers)
                    .thread_name(|i| format!("contours-worker-{i}"))
                    .build()?;
                Ok(pool.install(|| fill_chunked(flat, workers)))
            }
        }
    }
}

pub fn fill_sequential(flat: &FlatForest<'_>) -> Contours {
    let n = flat.len();
    let mut contours = Vec::with_capacity(n);
    let mut hierarchy = Vec::with_capacity(n);

    for i in 0..n {
        contours.push(flat.points(i).to_vec());
        hierarchy.push(flat.hierarchy(i));
    }

    Contours { contours, hierarchy }
}

/// Pre-size both outputs and hand each worker one contiguous run of slots.
pub fn fill_chunked(flat: &FlatForest<'_>, workers: usize) -> Contours {
    let n = flat.len();
    let mut contours = vec![Vec::new(); n];
    let mut hierarchy = vec![HierarchyEntry::NONE; n];

    if n == 0 {
        return Contours { contours, hierarchy };
    }

    let chunk = n.div_ceil(workers.max(1));

    contours
        .par_chunks_mut(chunk)
        .zip(hierarchy.par_chunks_mut(chunk))
        .enumerate()
        .for_each(|(c, (points_out, links_out))| {
            let start = c * chunk;
            trace!(chunk = c, start, len = points_out.len(), "filling chunk");
            for (offset, (points, links)) in points_out.iter_mut().zip(links_out.iter_mut()).enumerate() {
                let slot = start + offset;
                *points = flat.points(slot).to_vec();
                *links = flat.hierarchy(slot);
            }
        });

    Contours { contours, hierarchy }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{BorderKind, ContourForest};
    use crate::types::Point;

    fn wide_forest(roots: usize) -> ContourForest {
        let mut forest = ContourForest::new();
        for r in 0..roots as i32 {
            let outer = forest
                .push(vec![Point::new(r, 0), Point::new(r, 5)], BorderKind::Outer, None)
                .unwrap();
            if r % 3 == 0 {
                let hole = forest
                    .push(vec![Point::new(r, 1)], BorderKind::Hole, Some(outer))
                    .unwrap();
                forest
                    .push(vec![Point::new(r, 2)], BorderKind::Outer, Some(hole))
                    .unwrap();
            }
        }
        forest
    }

    #[test]
    fn test_adaptive_step_function() {
        let policy = AdaptivePolicy::default();
        assert_eq!(policy.workers_for(100 * 100, 16), 1);
        assert_eq!(policy.workers_for(1024 * 1024, 16), 8);
        assert_eq!(policy.workers_for(1024 * 1024, 2), 2);
        assert_eq!(policy.workers_for(1024 * 1024, 3), 2);
        assert_eq!(policy.workers_for(4096 * 4096, 16), 16);
        assert_eq!(policy.workers_for(4096 * 4096, 0), 1);
    }

    #[test]
    fn test_plan_selection() {
        let policy = AdaptivePolicy::default();
        assert_eq!(
            WorkerPlan::new(Distribution::Sequential, &policy, Some(8), u64::MAX),
            WorkerPlan::Sequential
        );
        assert_eq!(
            WorkerPlan::new(Distribution::DataParallel, &policy, None, 10),
            WorkerPlan::SharedPool
        );
        assert_eq!(
            WorkerPlan::new(Distribution::DataParallel, &policy, Some(3), 10),
            WorkerPlan::DedicatedPool(3)
        );
        assert_eq!(
            WorkerPlan::new(Distribution::Adaptive, &policy, Some(8), 64 * 64),
            WorkerPlan::Sequential
        );
        assert_eq!(
            WorkerPlan::new(Distribution::Adaptive, &policy, Some(8), 1000 * 1000),
            WorkerPlan::DedicatedPool(4)
        );
    }

    #[test]
    fn test_adaptive_respects_worker_ceiling() {
        let policy = AdaptivePolicy::default();
        for (max_workers, pixels) in [(1, 1024 * 1024), (1, 4096 * 4096), (3, 1024 * 1024), (3, 4096 * 4096)] {
            let plan = WorkerPlan::new(Distribution::Adaptive, &policy, Some(max_workers), pixels);
            assert!(plan.workers() <= max_workers, "{:?} exceeds {}", plan, max_workers);
        }
        assert_eq!(
            WorkerPlan::new(Distribution::Adaptive, &policy, Some(1), 1024 * 1024),
            WorkerPlan::Sequential
        );
        assert_eq!(
            WorkerPlan::new(Distribution::Adaptive, &policy, Some(3), 1024 * 1024),
            WorkerPlan::DedicatedPool(2)
        );
        assert_eq!(
            WorkerPlan::new(Distribution::Adaptive, &policy, Some(3), 4096 * 4096),
            WorkerPlan::DedicatedPool(3)
        );
    }

    #[test]
    fn test_all_plans_fill_identically() {
        let forest = wide_forest(50);
        let flat = forest.flatten();

        let expected = fill_sequential(&flat);
        assert_eq!(expected.len(), forest.len());
        expected.validate().unwrap();

        for plan in [
            WorkerPlan::SharedPool,
            WorkerPlan::DedicatedPool(2),
            WorkerPlan::DedicatedPool(7),
            WorkerPlan::DedicatedPool(200),
        ] {
            assert_eq!(plan.fill(&flat).unwrap(), expected, "plan {:?}", plan);
        }
    }

    #[test]
    fn test_chunked_handles_more_workers_than_slots() {
        let forest = wide_forest(2);
        let flat = forest.flatten();
        assert_eq!(fill_chunked(&flat, 64), fill_sequential(&flat));
    }
}
