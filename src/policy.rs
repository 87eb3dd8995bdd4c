//! Pluggable growth strategies
//!
//! A policy is a pure selection step: given an island's distance-filtered
//! frontier it decides which cells to claim (and, for erosive strategies,
//! release) in one iteration, and returns them as a [`GrowthStep`]. Only
//! the driver mutates the grid and the island bookkeeping, so every
//! strategy stays trivially replayable: with a fixed seed the PRNG draws
//! are the only moving part, and they happen in frontier order.

use std::collections::HashMap;

use crate::bitgrid::{BitGrid, DIR_OFFSETS};
use crate::island::{Island, IslandId};
use crate::rng::RandomSource;

/// One of the 8 compass directions, indexed into [`DIR_OFFSETS`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompassDir(usize);

impl CompassDir {
    pub fn from_index(index: usize) -> Self {
        CompassDir(index % 8)
    }

    /// Unit step `(dx, dy)` of this direction.
    pub fn offset(&self) -> (i32, i32) {
        DIR_OFFSETS[self.0]
    }
}

/// Per-island memoized growth directions, keyed by the stable island id
/// and owned by the driver for the duration of one growth run.
pub type DirectionTable = HashMap<IslandId, CompassDir>;

/// The cells a policy elected to claim and release this iteration.
/// All points come from the frontier slice the policy was handed.
#[derive(Clone, Debug, Default)]
pub struct GrowthStep {
    pub claims: Vec<(i32, i32)>,
    pub releases: Vec<(i32, i32)>,
}

/// A growth strategy with its tuning parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GrowthPolicy {
    /// Score frontier cells by how much land already surrounds them, keep
    /// the top fraction, claim one at random. Slow, rounded growth.
    WeightedRandom { keep_fraction: f32 },
    /// Shuffle the frontier, claim up to a fixed number of cells. Fast,
    /// roughly uniform, rate-bounded growth.
    Marching { pixels_per_iteration: usize },
    /// Push toward one memoized compass direction per island. Elongated
    /// shapes.
    Directional { claim_fraction: f32 },
    /// Partition the frontier into nearby components and grow each around
    /// its centroid. Cohesive local growth.
    Cluster {
        cluster_radius: i32,
        claim_fraction: f32,
    },
    /// Score by distance-weighted land density in a 5x5 window. Produces
    /// diffusion-like smoothing.
    PerlinLike { claim_fraction: f32 },
}

impl GrowthPolicy {
    pub fn weighted_random() -> Self {
        GrowthPolicy::WeightedRandom { keep_fraction: 0.30 }
    }

    pub fn marching() -> Self {
        GrowthPolicy::Marching {
            pixels_per_iteration: 8,
        }
    }

    pub fn directional() -> Self {
        GrowthPolicy::Directional {
            claim_fraction: 0.15,
        }
    }

    pub fn cluster() -> Self {
        GrowthPolicy::Cluster {
            cluster_radius: 3,
            claim_fraction: 0.5,
        }
    }

    pub fn perlin_like() -> Self {
        GrowthPolicy::PerlinLike {
            claim_fraction: 0.20,
        }
    }

    /// Select this iteration's step for one island.
    ///
    /// `frontier` is the island's distance-respecting frontier in its
    /// fixed set order; `directions` is the driver-owned memo for
    /// [`GrowthPolicy::Directional`].
    pub fn select<R: RandomSource>(
        &self,
        grid: &BitGrid,
        island: &Island,
        frontier: &[(i32, i32)],
        rng: &mut R,
        directions: &mut DirectionTable,
    ) -> GrowthStep {
        if frontier.is_empty() {
            return GrowthStep::default();
        }
        match *self {
            GrowthPolicy::WeightedRandom { keep_fraction } => {
                select_weighted_random(grid, frontier, keep_fraction, rng)
            }
            GrowthPolicy::Marching {
                pixels_per_iteration,
            } => select_marching(frontier, pixels_per_iteration, rng),
            GrowthPolicy::Directional { claim_fraction } => {
                select_directional(island, frontier, claim_fraction, rng, directions)
            }
            GrowthPolicy::Cluster {
                cluster_radius,
                claim_fraction,
            } => select_cluster(frontier, cluster_radius, claim_fraction),
            GrowthPolicy::PerlinLike { claim_fraction } => {
                select_perlin_like(grid, frontier, claim_fraction)
            }
        }
    }
}

/// Top slice size for a fraction of `n`, at least one point.
fn top_count(n: usize, fraction: f32) -> usize {
    ((n as f32 * fraction).ceil() as usize).clamp(1, n)
}

fn select_weighted_random<R: RandomSource>(
    grid: &BitGrid,
    frontier: &[(i32, i32)],
    keep_fraction: f32,
    rng: &mut R,
) -> GrowthStep {
    let mut scored: Vec<((i32, i32), usize)> = frontier
        .iter()
        .map(|&(x, y)| ((x, y), grid.count_adjacent(x, y, None)))
        .collect();
    // Stable sort: ties keep the frontier's fixed order.
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let keep = top_count(scored.len(), keep_fraction);
    let pick = rng.index(keep);
    GrowthStep {
        claims: vec![scored[pick].0],
        releases: Vec::new(),
    }
}

fn select_marching<R: RandomSource>(
    frontier: &[(i32, i32)],
    pixels_per_iteration: usize,
    rng: &mut R,
) -> GrowthStep {
    let mut points = frontier.to_vec();
    rng.shuffle(&mut points);
    points.truncate(pixels_per_iteration);
    GrowthStep {
        claims: points,
        releases: Vec::new(),
    }
}

fn select_directional<R: RandomSource>(
    island: &Island,
    frontier: &[(i32, i32)],
    claim_fraction: f32,
    rng: &mut R,
    directions: &mut DirectionTable,
) -> GrowthStep {
    let dir = *directions
        .entry(island.id())
        .or_insert_with(|| CompassDir::from_index(rng.index(8)));
    let (dx, dy) = dir.offset();
    let corner = (island.bounds().min_x, island.bounds().min_y);

    // Alignment of the taxicab offset from the min-corner with the
    // preferred direction: the further along it, the higher the rank.
    let mut scored: Vec<((i32, i32), i32)> = frontier
        .iter()
        .map(|&(x, y)| ((x, y), (x - corner.0) * dx + (y - corner.1) * dy))
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1));

    let take = top_count(scored.len(), claim_fraction);
    GrowthStep {
        claims: scored.into_iter().take(take).map(|(p, _)| p).collect(),
        releases: Vec::new(),
    }
}

fn select_cluster(frontier: &[(i32, i32)], cluster_radius: i32, claim_fraction: f32) -> GrowthStep {
    let n = frontier.len();
    let radius_sq = (cluster_radius as f64) * (cluster_radius as f64);
    let mut visited = vec![false; n];
    let mut claims = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        // Radius-limited BFS over frontier points; discovery order is
        // fixed by the frontier order.
        let mut cluster = vec![start];
        visited[start] = true;
        let mut head = 0;
        while head < cluster.len() {
            let (cx, cy) = frontier[cluster[head]];
            head += 1;
            for (j, &(x, y)) in frontier.iter().enumerate() {
                if visited[j] {
                    continue;
                }
                let dx = (x - cx) as f64;
                let dy = (y - cy) as f64;
                if dx * dx + dy * dy <= radius_sq {
                    visited[j] = true;
                    cluster.push(j);
                }
            }
        }

        let len = cluster.len() as f64;
        let centroid_x = cluster.iter().map(|&i| frontier[i].0 as f64).sum::<f64>() / len;
        let centroid_y = cluster.iter().map(|&i| frontier[i].1 as f64).sum::<f64>() / len;

        let mut ranked: Vec<((i32, i32), f64)> = cluster
            .iter()
            .map(|&i| {
                let (x, y) = frontier[i];
                let dx = x as f64 - centroid_x;
                let dy = y as f64 - centroid_y;
                ((x, y), dx * dx + dy * dy)
            })
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let take = (cluster.len() as f32 * claim_fraction).ceil() as usize;
        claims.extend(ranked.into_iter().take(take.max(1)).map(|(p, _)| p));
    }

    GrowthStep {
        claims,
        releases: Vec::new(),
    }
}

fn select_perlin_like(grid: &BitGrid, frontier: &[(i32, i32)], claim_fraction: f32) -> GrowthStep {
    let grid_bounds = grid.bounds();
    let mut scored: Vec<((i32, i32), f64)> = frontier
        .iter()
        .map(|&(x, y)| {
            let mut score = 0.0f64;
            for dy in -2i32..=2 {
                for dx in -2i32..=2 {
                    if dx == 0 && dy == 0 {
                        continue;
                    }
                    let (nx, ny) = (x + dx, y + dy);
                    if grid_bounds.contains(nx, ny) && grid.get(nx, ny) {
                        let dist = ((dx * dx + dy * dy) as f64).sqrt();
                        score += 1.0 / (1.0 + dist);
                    }
                }
            }
            ((x, y), score)
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let take = top_count(scored.len(), claim_fraction);
    GrowthStep {
        claims: scored.into_iter().take(take).map(|(p, _)| p).collect(),
        releases: Vec::new(),
    }
}
