use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Integer pixel coordinate of a contour point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Shift the point, failing instead of wrapping on `i32` overflow.
    pub fn checked_offset(self, offset: Point) -> Result<Point> {
        match (self.x.checked_add(offset.x), self.y.checked_add(offset.y)) {
            (Some(x), Some(y)) => Ok(Point { x, y }),
            _ => Err(ContourError::CoordinateOverflow {
                x: self.x,
                y: self.y,
                dx: offset.x,
                dy: offset.y,
            }),
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Topology of one contour: indices of its next and previous sibling, its
/// first child and its parent. `-1` marks an absent link.
///
/// Serialised as the 4-element array `[next, prev, first_child, parent]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct HierarchyEntry {
    pub next: i32,
    pub prev: i32,
    pub first_child: i32,
    pub parent: i32,
}

impl HierarchyEntry {
    pub const NONE: HierarchyEntry = HierarchyEntry {
        next: -1,
        prev: -1,
        first_child: -1,
        parent: -1,
    };

    pub fn next(&self) -> Option<usize> {
        link(self.next)
    }

    pub fn prev(&self) -> Option<usize> {
        link(self.prev)
    }

    pub fn first_child(&self) -> Option<usize> {
        link(self.first_child)
    }

    pub fn parent(&self) -> Option<usize> {
        link(self.parent)
    }

    pub fn to_array(self) -> [i32; 4] {
        [self.next, self.prev, self.first_child, self.parent]
    }
}

impl Default for HierarchyEntry {
    fn default() -> Self {
        Self::NONE
    }
}

impl From<[i32; 4]> for HierarchyEntry {
    fn from([next, prev, first_child, parent]: [i32; 4]) -> Self {
        Self { next, prev, first_child, parent }
    }
}

impl From<HierarchyEntry> for [i32; 4] {
    fn from(entry: HierarchyEntry) -> Self {
        entry.to_array()
    }
}

impl JsonSchema for HierarchyEntry {
    fn schema_name() -> String {
        "HierarchyEntry".to_owned()
    }

    fn json_schema(generator: &mut schemars::r#gen::SchemaGenerator) -> schemars::schema::Schema {
        <[i32; 4]>::json_schema(generator)
    }
}

fn link(raw: i32) -> Option<usize> {
    usize::try_from(raw).ok()
}

/// Contours found in one raster together with their topology.
///
/// `contours[i]` and `hierarchy[i]` always describe the same border.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Contours {
    pub contours: Vec<Vec<Point>>,
    pub hierarchy: Vec<HierarchyEntry>,
}

impl Contours {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.contours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[Point], &HierarchyEntry)> {
        self.contours
            .iter()
            .map(Vec::as_slice)
            .zip(self.hierarchy.iter())
    }

    /// Total number of points over all contours
    pub fn point_count(&self) -> usize {
        self.contours.iter().map(Vec::len).sum()
    }

    /// Indices of the contours without a parent, in index order.
    pub fn roots(&self) -> Vec<usize> {
        self.hierarchy
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.parent().is_none())
            .map(|(i, _)| i)
            .collect()
    }

    /// Direct children of contour `index`, following `first_child` then `next`.
    pub fn children(&self, index: usize) -> Vec<usize> {
        let mut children = Vec::new();
        let mut cursor = self.hierarchy.get(index).and_then(HierarchyEntry::first_child);
        while let Some(child) = cursor {
            if children.len() >= self.len() {
                break;
            }
            children.push(child);
            cursor = self.hierarchy.get(child).and_then(HierarchyEntry::next);
        }
        children
    }

    /// Number of ancestors of contour `index`.
    pub fn depth(&self, index: usize) -> usize {
        let mut depth = 0;
        let mut cursor = self.hierarchy.get(index).and_then(HierarchyEntry::parent);
        while let Some(parent) = cursor {
            depth += 1;
            if depth > self.len() {
                break;
            }
            cursor = self.hierarchy.get(parent).and_then(HierarchyEntry::parent);
        }
        depth
    }

    /// Copy of the result with every point shifted by `(dx, dy)`.
    pub fn translated(&self, dx: i32, dy: i32) -> Result<Contours> {
        let offset = Point::new(dx, dy);
        let contours = self
            .contours
            .iter()
            .map(|points| {
                points
                    .iter()
                    .map(|point| point.checked_offset(offset))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Contours {
            contours,
            hierarchy: self.hierarchy.clone(),
        })
    }

    /// Check that the lists are parallel and that every link is in range,
    /// mutual and acyclic.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        if self.hierarchy.len() != n {
            return Err(ContourError::InconsistentHierarchy {
                index: n.min(self.hierarchy.len()),
                reason: format!(
                    "{} contours but {} hierarchy entries",
                    n,
                    self.hierarchy.len()
                ),
            });
        }

        let fail = |index: usize, reason: String| ContourError::InconsistentHierarchy { index, reason };

        for (i, entry) in self.hierarchy.iter().enumerate() {
            for raw in entry.to_array() {
                if raw < -1 || usize::try_from(raw).is_ok_and(|slot| slot >= n) {
                    return Err(fail(i, format!("link {} out of range 0..{}", raw, n)));
                }
            }

            if let Some(next) = entry.next() {
                if self.hierarchy[next].prev() != Some(i) {
                    return Err(fail(i, format!("next sibling {} does not point back", next)));
                }
                if self.hierarchy[next].parent != entry.parent {
                    return Err(fail(i, format!("next sibling {} has a different parent", next)));
                }
            }

            if let Some(prev) = entry.prev() {
                if self.hierarchy[prev].next() != Some(i) {
                    return Err(fail(i, format!("previous sibling {} does not point forward", prev)));
                }
            }

            if let Some(child) = entry.first_child() {
                if self.hierarchy[child].parent() != Some(i) {
                    return Err(fail(i, format!("first child {} names another parent", child)));
                }
                if self.hierarchy[child].prev().is_some() {
                    return Err(fail(i, format!("first child {} has a previous sibling", child)));
                }
            }

            if let Some(parent) = entry.parent() {
                if !self.children(parent).contains(&i) {
                    return Err(fail(i, format!("not reachable from parent {}", parent)));
                }
            }

            if self.depth(i) > n {
                return Err(fail(i, "parent chain contains a cycle".to_string()));
            }
        }

        Ok(())
    }
}
