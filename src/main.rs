use std::path::PathBuf;

use clap::Parser;

use island_generator::ascii;
use island_generator::bitgrid::BitGrid;
use island_generator::bounds::Bounds;
use island_generator::config::{GrowthConfig, PolicyKind};
use island_generator::driver::{grow_islands, GrowthOptions};
use island_generator::export;
use island_generator::island::{Island, IslandId, IslandType};
use island_generator::rng::{ChaChaSource, RandomSource};

#[derive(Parser, Debug)]
#[command(name = "island_generator")]
#[command(about = "Grow procedural landmasses on a bit-packed grid")]
struct Args {
    /// Width of the grid in cells
    #[arg(short = 'W', long, default_value = "256")]
    width: usize,

    /// Height of the grid in cells
    #[arg(short = 'H', long, default_value = "128")]
    height: usize,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of interior islands to seed
    #[arg(short = 'n', long, default_value = "6")]
    islands: usize,

    /// Also seed one edge-anchored island per map side
    #[arg(long)]
    edge_islands: bool,

    /// Growth policy (weighted_random, marching, directional, cluster, perlin_like)
    #[arg(short, long)]
    policy: Option<PolicyKind>,

    /// Number of growth iterations
    #[arg(long)]
    iterations: Option<usize>,

    /// Minimum distance between islands' frontiers
    #[arg(long)]
    min_distance: Option<f64>,

    /// Load growth parameters from a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print an ASCII preview of the final mask
    #[arg(long)]
    preview: bool,

    /// Export the final mask to a PNG file
    #[arg(long)]
    export: Option<String>,

    /// Export a per-island colored map to a PNG file
    #[arg(long)]
    export_islands: Option<String>,
}

fn main() {
    let args = Args::parse();

    // Growth parameters: config file first, CLI flags override.
    let mut config = match &args.config {
        Some(path) => match GrowthConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => GrowthConfig::default(),
    };
    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(min_distance) = args.min_distance {
        config.min_distance = min_distance;
    }

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = ChaChaSource::new(seed);

    println!("Growing islands with seed: {}", seed);
    println!("Grid size: {}x{}", args.width, args.height);
    println!(
        "Policy: {} ({} iterations, min distance {})",
        config.policy.name(),
        config.iterations,
        config.min_distance
    );

    let mut grid = BitGrid::new(args.width, args.height);
    let mut islands = Vec::new();

    scatter_seed_islands(&mut grid, &mut islands, &args, &config, &mut rng);
    if args.edge_islands {
        seed_edge_islands(&mut grid, &mut islands, args.width as i32, args.height as i32);
    }
    println!("Seeded {} islands", islands.len());

    let opts = GrowthOptions::new(config.policy(), config.min_distance, config.iterations);
    let stats = grow_islands(&mut grid, &mut islands, &opts, &mut rng);

    let land = grid.count_ones();
    let total = args.width * args.height;
    println!(
        "Claimed {} cells over {} iterations ({} land, {:.1}% of the map)",
        stats.cells_claimed,
        stats.iterations,
        land,
        100.0 * land as f64 / total as f64
    );
    for (i, island) in islands.iter().enumerate() {
        let b = island.bounds();
        println!(
            "  island {} ({}): bounds x {}..{} y {}..{}, {} frontier cells, {} claims",
            island.id().0,
            island.kind().display_name(),
            b.min_x,
            b.max_x,
            b.min_y,
            b.max_y,
            island.frontier_len(),
            stats.claims_per_island[i]
        );
    }

    if args.preview {
        print!("{}", ascii::render_mask(&grid, 120));
    }

    if let Some(path) = &args.export {
        match export::export_mask(&grid, path) {
            Ok(()) => println!("Exported mask to {}", path),
            Err(e) => eprintln!("Failed to export mask: {}", e),
        }
    }

    if let Some(path) = &args.export_islands {
        match export::export_island_map(&grid, &islands, path) {
            Ok(()) => println!("Exported island map to {}", path),
            Err(e) => eprintln!("Failed to export island map: {}", e),
        }
    }
}

/// Scatter randomly sized interior seed rectangles, keeping each new seed
/// clear of the ones already placed by the configured min distance.
fn scatter_seed_islands<R: RandomSource>(
    grid: &mut BitGrid,
    islands: &mut Vec<Island>,
    args: &Args,
    config: &GrowthConfig,
    rng: &mut R,
) {
    let width = args.width as i32;
    let height = args.height as i32;
    let margin = 2;
    let clearance = config.min_distance.ceil() as i32;
    let mut placed: Vec<Bounds> = Vec::new();

    for i in 0..args.islands {
        let mut seeded = false;
        for _attempt in 0..100 {
            let w = 3 + rng.index(5) as i32;
            let h = 3 + rng.index(5) as i32;
            if width < w + 2 * margin || height < h + 2 * margin {
                break;
            }
            let x = margin + rng.index((width - w - 2 * margin) as usize + 1) as i32;
            let y = margin + rng.index((height - h - 2 * margin) as usize + 1) as i32;
            let seed = Bounds::new(x, x + w, y, y + h);

            if placed.iter().any(|b| b.grown(clearance).intersects(&seed)) {
                continue;
            }

            fill_rect(grid, &seed);
            match Island::new(
                grid,
                IslandId(islands.len() as u32),
                seed.min_x,
                seed.max_x,
                seed.min_y,
                seed.max_y,
                IslandType::NORMAL,
            ) {
                Ok(island) => {
                    placed.push(seed);
                    islands.push(island);
                    seeded = true;
                }
                Err(e) => {
                    eprintln!("Failed to construct island: {}", e);
                    std::process::exit(1);
                }
            }
            break;
        }
        if !seeded {
            println!("No room for island {} after 100 attempts, skipping", i);
        }
    }
}

/// One edge-anchored island per map side, growth-capped by its type.
fn seed_edge_islands(grid: &mut BitGrid, islands: &mut Vec<Island>, width: i32, height: i32) {
    let specs = [
        (width / 4, width * 3 / 4, 0, 2, IslandType::TOP_EDGE),
        (
            width / 4,
            width * 3 / 4,
            height - 2,
            height,
            IslandType::BOTTOM_EDGE,
        ),
        (0, 2, height / 4, height * 3 / 4, IslandType::LEFT_EDGE),
        (
            width - 2,
            width,
            height / 4,
            height * 3 / 4,
            IslandType::RIGHT_EDGE,
        ),
    ];

    for &(min_x, max_x, min_y, max_y, kind) in &specs {
        let seed = Bounds::new(min_x, max_x, min_y, max_y);
        fill_rect(grid, &seed);
        match Island::new(
            grid,
            IslandId(islands.len() as u32),
            min_x,
            max_x,
            min_y,
            max_y,
            kind,
        ) {
            Ok(island) => islands.push(island),
            Err(e) => {
                eprintln!("Failed to construct edge island: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn fill_rect(grid: &mut BitGrid, rect: &Bounds) {
    let clipped = rect.trimmed(&grid.bounds());
    for y in clipped.min_y..clipped.max_y {
        for x in clipped.min_x..clipped.max_x {
            grid.set(x, y, true);
        }
    }
}
