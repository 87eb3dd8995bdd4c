//! Frontier-tracked growable regions
//!
//! An [`Island`] is a set of claimed cells on a shared [`BitGrid`] together
//! with the bookkeeping that makes incremental growth cheap: its bounding
//! rectangle, the fixed growth limits derived from its edge type, and the
//! frontier, the water cells it could claim next. The island never owns or
//! mutates the grid; every operation that reads cells borrows it per call,
//! and the growth driver is the only writer of grid bits.

use std::collections::BTreeSet;

use crate::bitgrid::{BitGrid, DIR_OFFSETS};
use crate::bounds::Bounds;

/// Island identifier, unique within one generation session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IslandId(pub u32);

/// Edge anchoring of an island, as a bitmask.
///
/// Edge-anchored islands hug one side of the map and get a capped growth
/// rectangle so they read as coastline rather than blobs. The two unions
/// combine opposite edges and additionally pin the cross axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IslandType(u8);

impl IslandType {
    pub const NORMAL: IslandType = IslandType(0);
    pub const TOP_EDGE: IslandType = IslandType(1);
    pub const BOTTOM_EDGE: IslandType = IslandType(1 << 1);
    pub const LEFT_EDGE: IslandType = IslandType(1 << 2);
    pub const RIGHT_EDGE: IslandType = IslandType(1 << 3);
    pub const HORIZONTAL_EDGE: IslandType = IslandType(1 | 1 << 1);
    pub const VERTICAL_EDGE: IslandType = IslandType(1 << 2 | 1 << 3);

    /// Whether every bit of `flags` is set.
    pub fn contains(&self, flags: IslandType) -> bool {
        self.0 & flags.0 == flags.0
    }

    pub fn display_name(&self) -> &'static str {
        match *self {
            IslandType::NORMAL => "normal",
            IslandType::TOP_EDGE => "top edge",
            IslandType::BOTTOM_EDGE => "bottom edge",
            IslandType::LEFT_EDGE => "left edge",
            IslandType::RIGHT_EDGE => "right edge",
            IslandType::HORIZONTAL_EDGE => "horizontal edge",
            IslandType::VERTICAL_EDGE => "vertical edge",
            _ => "mixed edge",
        }
    }
}

impl std::ops::BitOr for IslandType {
    type Output = IslandType;

    fn bitor(self, rhs: IslandType) -> IslandType {
        IslandType(self.0 | rhs.0)
    }
}

/// Fatal island construction error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IslandError {
    /// Seed rectangle with `min > max` on either axis.
    InvalidBounds {
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
    },
}

impl std::fmt::Display for IslandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IslandError::InvalidBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            } => write!(
                f,
                "invalid island bounds: x {}..{}, y {}..{}",
                min_x, max_x, min_y, max_y
            ),
        }
    }
}

impl std::error::Error for IslandError {}

/// A growable landmass region over a shared [`BitGrid`].
#[derive(Debug)]
pub struct Island {
    id: IslandId,
    kind: IslandType,
    /// Current bounding rectangle of claimed cells. Grows with claims,
    /// never shrinks.
    bounds: Bounds,
    /// Seed rectangle after grid clipping, immutable after construction.
    initial_bounds: Bounds,
    /// Growth limit rectangle, a function of `initial_bounds` + `kind`
    /// only, fixed at construction.
    expandable_bounds: Bounds,
    /// Water cells 8-adjacent to this island's claimed cells and inside
    /// `expandable_bounds`. BTreeSet gives a fixed lexicographic iteration
    /// order, which the reproducibility contract depends on.
    frontier: BTreeSet<(i32, i32)>,
    expandable_cache: Option<Vec<(i32, i32)>>,
}

impl Island {
    /// Construct an island over a seed rectangle whose cells have already
    /// been set on `grid`. The rectangle is clipped to the grid; the
    /// frontier starts as the in-constraint water neighbors of the seed
    /// cells.
    pub fn new(
        grid: &BitGrid,
        id: IslandId,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
        kind: IslandType,
    ) -> Result<Island, IslandError> {
        if min_x > max_x || min_y > max_y {
            return Err(IslandError::InvalidBounds {
                min_x,
                max_x,
                min_y,
                max_y,
            });
        }

        let mut bounds = Bounds::new(min_x, max_x, min_y, max_y);
        bounds.trim(&grid.bounds());
        let initial_bounds = bounds;
        let expandable_bounds = expandable_bounds_for(&initial_bounds, kind, &grid.bounds());

        let mut island = Island {
            id,
            kind,
            bounds,
            initial_bounds,
            expandable_bounds,
            frontier: BTreeSet::new(),
            expandable_cache: None,
        };

        for (x, y) in grid.filter_rect(&initial_bounds, true, None) {
            for n in grid.filter_adjacent(x, y, false, Some(&island.expandable_bounds)) {
                island.frontier.insert(n);
            }
        }

        Ok(island)
    }

    pub fn id(&self) -> IslandId {
        self.id
    }

    pub fn kind(&self) -> IslandType {
        self.kind
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn initial_bounds(&self) -> &Bounds {
        &self.initial_bounds
    }

    pub fn expandable_bounds(&self) -> &Bounds {
        &self.expandable_bounds
    }

    pub fn frontier(&self) -> &BTreeSet<(i32, i32)> {
        &self.frontier
    }

    pub fn frontier_len(&self) -> usize {
        self.frontier.len()
    }

    pub fn contains_frontier(&self, x: i32, y: i32) -> bool {
        self.frontier.contains(&(x, y))
    }

    /// Record a claim at `(x, y)`. Bookkeeping only: the driver has already
    /// set the grid bit, this updates bounds and frontier.
    pub fn claim_point(&mut self, grid: &BitGrid, x: i32, y: i32) {
        self.bounds.expand(x, y);
        self.frontier.remove(&(x, y));
        for n in grid.filter_adjacent(x, y, false, Some(&self.expandable_bounds)) {
            self.frontier.insert(n);
        }
        self.expandable_cache = None;
    }

    /// Record a release (erosion) at `(x, y)`, the inverse of
    /// [`claim_point`](Self::claim_point). The driver has already cleared
    /// the grid bit. The released cell rejoins the frontier if it still
    /// touches land; frontier neighbors that lost their last land contact
    /// are evicted. Bounds do not shrink.
    pub fn release_point(&mut self, grid: &BitGrid, x: i32, y: i32) {
        if self.expandable_bounds.contains(x, y) && grid.has_adjacent(x, y, None) {
            self.frontier.insert((x, y));
        }
        for &(dx, dy) in DIR_OFFSETS.iter() {
            let n = (x + dx, y + dy);
            if self.frontier.contains(&n) && !grid.has_adjacent(n.0, n.1, None) {
                self.frontier.remove(&n);
            }
        }
        self.expandable_cache = None;
    }

    /// Cached array view of the frontier, in deterministic order.
    pub fn expandable(&mut self) -> &[(i32, i32)] {
        if self.expandable_cache.is_none() {
            self.expandable_cache = Some(self.frontier.iter().copied().collect());
        }
        self.expandable_cache.as_deref().unwrap_or(&[])
    }

    /// Frontier points at least `min_distance` (Euclidean, strict squared
    /// comparison) away from every point of every other island's current
    /// frontier, optionally post-filtered by `point_filter`.
    ///
    /// Comparing against the other islands' frontiers instead of their full
    /// claimed areas is sound because the frontier is the closest exposed
    /// layer of a region to any exterior point; this assumption is part of
    /// the growth contract and must not be tightened to full-area scans.
    ///
    /// The pairwise scan is the dominant cost for large islands. Each other
    /// island is prefiltered by the exact distance from the candidate to
    /// its bounds grown by one cell (the rectangle every frontier point
    /// lies in) before its frontier is walked.
    pub fn expandable_respecting_min_distance(
        &self,
        islands: &[Island],
        min_distance: f64,
        point_filter: Option<&dyn Fn(i32, i32) -> bool>,
    ) -> Vec<(i32, i32)> {
        let min_sq = min_distance * min_distance;
        let mut out = Vec::with_capacity(self.frontier.len());

        'points: for &(x, y) in self.frontier.iter() {
            if let Some(filter) = point_filter {
                if !filter(x, y) {
                    continue;
                }
            }
            if min_distance > 0.0 {
                for other in islands {
                    if other.id == self.id {
                        continue;
                    }
                    if other.bounds.grown(1).distance_sq_to_point(x, y) >= min_sq {
                        continue;
                    }
                    for &(ox, oy) in other.frontier.iter() {
                        let dx = (ox - x) as f64;
                        let dy = (oy - y) as f64;
                        if dx * dx + dy * dy < min_sq {
                            continue 'points;
                        }
                    }
                }
            }
            out.push((x, y));
        }

        out
    }
}

/// Growth limit rectangle for an island type.
///
/// Edge islands may only advance inland by half their seed extent along
/// the anchored axis; the opposite-edge unions additionally pin the cross
/// axis one cell inside the seed rectangle. Caps truncate toward zero,
/// matching integer grid semantics.
fn expandable_bounds_for(initial: &Bounds, kind: IslandType, grid: &Bounds) -> Bounds {
    let mut b = *grid;

    if kind.contains(IslandType::LEFT_EDGE) {
        b.max_x = b
            .max_x
            .min(initial.min_x + (initial.height() as f64 * 0.5) as i32);
    }
    if kind.contains(IslandType::RIGHT_EDGE) {
        b.min_x = b
            .min_x
            .max(initial.max_x - (initial.height() as f64 * 0.5) as i32);
    }
    if kind.contains(IslandType::TOP_EDGE) {
        b.max_y = b
            .max_y
            .min(initial.min_y + (initial.width() as f64 * 0.5) as i32);
    }
    if kind.contains(IslandType::BOTTOM_EDGE) {
        b.min_y = b
            .min_y
            .max(initial.max_y - (initial.width() as f64 * 0.5) as i32);
    }
    if kind.contains(IslandType::HORIZONTAL_EDGE) {
        b.min_x = b.min_x.max(initial.min_x + 1);
        b.max_x = b.max_x.min(initial.max_x - 1);
    }
    if kind.contains(IslandType::VERTICAL_EDGE) {
        b.min_y = b.min_y.max(initial.min_y + 1);
        b.max_y = b.max_y.min(initial.max_y - 1);
    }

    b.trim(grid);
    b
}
