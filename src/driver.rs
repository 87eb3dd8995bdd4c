//! Growth driver
//!
//! Runs the iteration loop that ties grids, islands and policies together.
//! The driver is the sole writer of grid bits: a claim sets the bit and
//! then lets the island update its bookkeeping, a release clears it first.
//! One run is a single logical unit of work (synchronous, single
//! threaded, bounded CPU), and with a fixed seed, island order, policy and
//! iteration count the output grid is bit-identical across runs.

use crate::bitgrid::BitGrid;
use crate::island::Island;
use crate::policy::{DirectionTable, GrowthPolicy, GrowthStep};
use crate::rng::RandomSource;

/// Options for one growth run.
pub struct GrowthOptions<'a> {
    pub policy: GrowthPolicy,
    /// Minimum Euclidean separation between this island's candidate
    /// points and every other island's frontier.
    pub min_distance: f64,
    pub iterations: usize,
    /// Skip islands for which this returns false (island, array index).
    pub island_filter: Option<&'a dyn Fn(&Island, usize) -> bool>,
    /// Drop candidate points for which this returns false.
    pub point_filter: Option<&'a dyn Fn(i32, i32) -> bool>,
}

impl<'a> GrowthOptions<'a> {
    pub fn new(policy: GrowthPolicy, min_distance: f64, iterations: usize) -> Self {
        Self {
            policy,
            min_distance,
            iterations,
            island_filter: None,
            point_filter: None,
        }
    }
}

/// Counters from one growth run.
#[derive(Clone, Debug, Default)]
pub struct GrowthStats {
    pub iterations: usize,
    pub cells_claimed: usize,
    pub cells_released: usize,
    /// Claims per island, indexed like the islands slice.
    pub claims_per_island: Vec<usize>,
}

/// Grow every island for `opts.iterations` passes.
///
/// Per iteration, islands are visited in slice order; that order is part
/// of the reproducibility contract because it fixes the PRNG draw order.
/// An island with an empty or fully distance-blocked frontier is skipped:
/// steady state, not an error. Termination is unconditional after the
/// requested passes.
pub fn grow_islands<R: RandomSource>(
    grid: &mut BitGrid,
    islands: &mut [Island],
    opts: &GrowthOptions,
    rng: &mut R,
) -> GrowthStats {
    let mut stats = GrowthStats {
        iterations: opts.iterations,
        claims_per_island: vec![0; islands.len()],
        ..GrowthStats::default()
    };
    let mut directions = DirectionTable::new();

    for _ in 0..opts.iterations {
        for i in 0..islands.len() {
            if let Some(filter) = opts.island_filter {
                if !filter(&islands[i], i) {
                    continue;
                }
            }

            let expandable = {
                let all: &[Island] = &*islands;
                all[i].expandable_respecting_min_distance(all, opts.min_distance, opts.point_filter)
            };
            if expandable.is_empty() {
                continue;
            }

            let step = opts
                .policy
                .select(grid, &islands[i], &expandable, rng, &mut directions);
            apply_step(grid, &mut islands[i], i, &step, &mut stats);
        }
    }

    stats
}

/// Apply a policy's step. Claim: set the bit, then island bookkeeping.
/// Release: clear the bit, then island bookkeeping.
fn apply_step(
    grid: &mut BitGrid,
    island: &mut Island,
    index: usize,
    step: &GrowthStep,
    stats: &mut GrowthStats,
) {
    for &(x, y) in &step.claims {
        grid.set(x, y, true);
        island.claim_point(grid, x, y);
        stats.cells_claimed += 1;
        stats.claims_per_island[index] += 1;
    }
    for &(x, y) in &step.releases {
        grid.set(x, y, false);
        island.release_point(grid, x, y);
        stats.cells_released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::island::{IslandId, IslandType};
    use crate::rng::ChaChaSource;

    fn seed_rect(grid: &mut BitGrid, min_x: i32, max_x: i32, min_y: i32, max_y: i32) {
        for y in min_y..max_y {
            for x in min_x..max_x {
                grid.set(x, y, true);
            }
        }
    }

    fn island(
        grid: &BitGrid,
        id: u32,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
        kind: IslandType,
    ) -> Island {
        Island::new(grid, IslandId(id), min_x, max_x, min_y, max_y, kind).unwrap()
    }

    /// Scenario: a single normal island under the marching policy grows
    /// monotonically, rate-bounded, and never reverts a land cell.
    #[test]
    fn test_marching_growth_is_monotone_and_rate_bounded() {
        let mut grid = BitGrid::new(20, 20);
        seed_rect(&mut grid, 8, 12, 8, 12);
        let mut islands = vec![island(&grid, 0, 8, 12, 8, 12, IslandType::NORMAL)];
        let mut rng = ChaChaSource::new(1234);

        let opts = GrowthOptions::new(
            GrowthPolicy::Marching {
                pixels_per_iteration: 4,
            },
            0.0,
            1,
        );

        let mut prev_area = grid.count_ones();
        assert_eq!(prev_area, 16);
        let mut total_claimed = 0;
        for _ in 0..3 {
            let before = grid.as_bytes().to_vec();
            let stats = grow_islands(&mut grid, &mut islands, &opts, &mut rng);
            total_claimed += stats.cells_claimed;

            let area = grid.count_ones();
            assert!(area > prev_area, "area must grow while frontier is open");
            assert!(area - prev_area <= 4, "more than 4 cells in one pass");
            prev_area = area;

            // No land cell reverts to water.
            for (idx, byte) in before.iter().enumerate() {
                assert_eq!(byte & !grid.as_bytes()[idx], 0, "a land cell reverted");
            }
        }
        assert_eq!(prev_area, 16 + total_claimed);

        let b = islands[0].bounds();
        assert!(b.min_x >= 0 && b.min_y >= 0 && b.max_x <= 20 && b.max_y <= 20);
    }

    /// Fixed seed + island order + policy + iteration count must be
    /// bit-identical across runs.
    #[test]
    fn test_growth_is_deterministic() {
        let run = || {
            let mut grid = BitGrid::new(32, 24);
            seed_rect(&mut grid, 4, 7, 4, 7);
            seed_rect(&mut grid, 20, 23, 12, 15);
            let mut islands = vec![
                island(&grid, 0, 4, 7, 4, 7, IslandType::NORMAL),
                island(&grid, 1, 20, 23, 12, 15, IslandType::NORMAL),
            ];
            let mut rng = ChaChaSource::new(777);
            let opts = GrowthOptions::new(GrowthPolicy::weighted_random(), 3.0, 10);
            grow_islands(&mut grid, &mut islands, &opts, &mut rng);
            grid.as_bytes().to_vec()
        };
        assert_eq!(run(), run());
    }

    /// Every claim is at least `min_distance` away from every point of
    /// the other island's frontier at claim time. Mirrors
    /// the driver loop one iteration at a time so the frontier state at
    /// each claim is observable.
    #[test]
    fn test_claims_respect_min_distance_at_claim_time() {
        let min_distance = 5.0;
        let mut grid = BitGrid::new(30, 16);
        seed_rect(&mut grid, 4, 6, 6, 8);
        seed_rect(&mut grid, 16, 18, 6, 8);
        let mut islands = vec![
            island(&grid, 0, 4, 6, 6, 8, IslandType::NORMAL),
            island(&grid, 1, 16, 18, 6, 8, IslandType::NORMAL),
        ];
        let mut rng = ChaChaSource::new(42);
        let mut directions = DirectionTable::new();
        let policy = GrowthPolicy::weighted_random();

        for _ in 0..30 {
            for i in 0..islands.len() {
                let expandable = {
                    let all: &[Island] = &islands;
                    all[i].expandable_respecting_min_distance(all, min_distance, None)
                };
                if expandable.is_empty() {
                    continue;
                }
                let step = policy.select(&grid, &islands[i], &expandable, &mut rng, &mut directions);
                for &(x, y) in &step.claims {
                    for other in islands.iter().filter(|o| o.id() != islands[i].id()) {
                        for &(ox, oy) in other.frontier() {
                            let d_sq = ((ox - x) as f64).powi(2) + ((oy - y) as f64).powi(2);
                            assert!(
                                d_sq >= min_distance * min_distance,
                                "claim ({}, {}) within {} of frontier point ({}, {})",
                                x,
                                y,
                                min_distance,
                                ox,
                                oy
                            );
                        }
                    }
                }
                let mut stats = GrowthStats {
                    claims_per_island: vec![0; islands.len()],
                    ..GrowthStats::default()
                };
                apply_step(&mut grid, &mut islands[i], i, &step, &mut stats);
            }
        }
    }

    /// Scenario: two islands seeded exactly `min_distance` apart keep
    /// their landmasses separated over a long run. The grid is kept short
    /// so neither island can flank the other at distant rows and the
    /// claimed cells split cleanly along x.
    #[test]
    fn test_two_islands_never_merge() {
        let min_distance = 6.0;
        let mut grid = BitGrid::new(24, 4);
        // Nearest seed cells: (5, y) and (11, y), exactly 6 apart.
        seed_rect(&mut grid, 4, 6, 1, 3);
        seed_rect(&mut grid, 11, 13, 1, 3);
        let mut islands = vec![
            island(&grid, 0, 4, 6, 1, 3, IslandType::NORMAL),
            island(&grid, 1, 11, 13, 1, 3, IslandType::NORMAL),
        ];
        let mut rng = ChaChaSource::new(2024);
        let opts = GrowthOptions::new(GrowthPolicy::weighted_random(), min_distance, 50);
        grow_islands(&mut grid, &mut islands, &opts, &mut rng);

        let land: Vec<(i32, i32)> = grid
            .iter()
            .filter_map(|(x, y, set)| if set { Some((x, y)) } else { None })
            .collect();
        let a_cells: Vec<(i32, i32)> = land.iter().copied().filter(|&(x, _)| x < 11).collect();
        let b_cells: Vec<(i32, i32)> = land.iter().copied().filter(|&(x, _)| x >= 11).collect();
        assert!(!a_cells.is_empty() && !b_cells.is_empty());

        // The separation never erodes below min_distance minus the
        // frontier shell (one diagonal step on each side).
        let mut min_gap_sq = f64::MAX;
        for &(ax, ay) in &a_cells {
            for &(bx, by) in &b_cells {
                let d_sq = ((bx - ax) as f64).powi(2) + ((by - ay) as f64).powi(2);
                min_gap_sq = min_gap_sq.min(d_sq);
            }
        }
        let floor = min_distance - 1.5;
        assert!(
            min_gap_sq >= floor * floor,
            "islands approached to {} cells",
            min_gap_sq.sqrt()
        );
    }

    /// Scenario: a bottom-anchored island under the horizontal clamp
    /// never widens past one cell inside its seed rectangle.
    #[test]
    fn test_horizontal_edge_clamp_holds_over_long_runs() {
        let mut grid = BitGrid::new(30, 30);
        seed_rect(&mut grid, 10, 20, 28, 30);
        let mut islands = vec![island(
            &grid,
            0,
            10,
            20,
            28,
            30,
            IslandType::HORIZONTAL_EDGE,
        )];
        let mut rng = ChaChaSource::new(5);
        let opts = GrowthOptions::new(GrowthPolicy::marching(), 0.0, 100);
        grow_islands(&mut grid, &mut islands, &opts, &mut rng);

        let b = islands[0].bounds();
        assert!(b.min_x >= 10 && b.max_x <= 20, "bounds widened: {:?}", b);
        for (x, y, set) in grid.iter() {
            if !set || y >= 28 {
                continue;
            }
            // Everything claimed above the seed strip obeys the pinned
            // width.
            assert!((11..19).contains(&x), "cell ({}, {}) escaped the clamp", x, y);
        }
    }

    /// A left-anchored island's bounds never pass the half-height cap,
    /// for any iteration count.
    #[test]
    fn test_left_edge_cap_holds_over_iterations() {
        let mut grid = BitGrid::new(20, 20);
        seed_rect(&mut grid, 0, 2, 5, 15);
        let mut islands = vec![island(&grid, 0, 0, 2, 5, 15, IslandType::LEFT_EDGE)];
        let mut rng = ChaChaSource::new(17);
        let opts = GrowthOptions::new(GrowthPolicy::marching(), 0.0, 60);
        grow_islands(&mut grid, &mut islands, &opts, &mut rng);

        // Seed height 10: growth may never reach x = 0 + 10/2.
        assert!(islands[0].bounds().max_x <= 5);
        for (x, _, set) in grid.iter() {
            if set {
                assert!(x < 5, "cell claimed past the left-edge cap");
            }
        }
    }

    #[test]
    fn test_island_filter_skips_islands() {
        let mut grid = BitGrid::new(24, 12);
        seed_rect(&mut grid, 2, 4, 4, 6);
        seed_rect(&mut grid, 18, 20, 4, 6);
        let mut islands = vec![
            island(&grid, 0, 2, 4, 4, 6, IslandType::NORMAL),
            island(&grid, 1, 18, 20, 4, 6, IslandType::NORMAL),
        ];
        let mut rng = ChaChaSource::new(8);
        let filter = |_: &Island, index: usize| index == 0;
        let mut opts = GrowthOptions::new(GrowthPolicy::marching(), 0.0, 5);
        opts.island_filter = Some(&filter);
        let stats = grow_islands(&mut grid, &mut islands, &opts, &mut rng);

        assert!(stats.claims_per_island[0] > 0);
        assert_eq!(stats.claims_per_island[1], 0);
        // Island 1 is untouched: still exactly its seed.
        assert_eq!(grid.filter_rect(islands[1].bounds(), true, None).len(), 4);
    }

    #[test]
    fn test_point_filter_restricts_claims() {
        let mut grid = BitGrid::new(20, 20);
        seed_rect(&mut grid, 8, 10, 8, 10);
        let mut islands = vec![island(&grid, 0, 8, 10, 8, 10, IslandType::NORMAL)];
        let mut rng = ChaChaSource::new(31);
        let filter = |_x: i32, y: i32| y <= 10;
        let mut opts = GrowthOptions::new(GrowthPolicy::marching(), 0.0, 10);
        opts.point_filter = Some(&filter);
        grow_islands(&mut grid, &mut islands, &opts, &mut rng);

        for (_, y, set) in grid.iter() {
            if set {
                assert!(y <= 10, "claimed cell below the point filter line");
            }
        }
    }

    #[test]
    fn test_blocked_frontier_is_steady_state() {
        // An island covering the whole grid has nowhere to grow.
        let mut grid = BitGrid::new(6, 6);
        seed_rect(&mut grid, 0, 6, 0, 6);
        let mut islands = vec![island(&grid, 0, 0, 6, 0, 6, IslandType::NORMAL)];
        let mut rng = ChaChaSource::new(1);
        let opts = GrowthOptions::new(GrowthPolicy::weighted_random(), 0.0, 25);
        let stats = grow_islands(&mut grid, &mut islands, &opts, &mut rng);
        assert_eq!(stats.cells_claimed, 0);
        assert_eq!(grid.count_ones(), 36);
    }

    #[test]
    fn test_apply_step_release_clears_and_rebuilds() {
        let mut grid = BitGrid::new(12, 12);
        seed_rect(&mut grid, 4, 7, 4, 7);
        let mut isl = island(&grid, 0, 4, 7, 4, 7, IslandType::NORMAL);
        let mut stats = GrowthStats {
            claims_per_island: vec![0],
            ..GrowthStats::default()
        };

        let step = GrowthStep {
            claims: vec![(7, 5)],
            releases: Vec::new(),
        };
        apply_step(&mut grid, &mut isl, 0, &step, &mut stats);
        assert!(grid.get(7, 5));

        let step = GrowthStep {
            claims: Vec::new(),
            releases: vec![(7, 5)],
        };
        apply_step(&mut grid, &mut isl, 0, &step, &mut stats);
        assert!(!grid.get(7, 5));
        assert!(isl.contains_frontier(7, 5));
        assert_eq!(stats.cells_claimed, 1);
        assert_eq!(stats.cells_released, 1);
    }
}
