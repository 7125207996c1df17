//! Harborwave - headless coupled water simulation
//!
//! Runs the shallow-water grid, the spectral horizon and an optional floating
//! box hull for a fixed number of frames and prints a summary.

use clap::Parser;
use glam::Vec3;
use log::info;

use harborwave::buoyancy::{BodyMesh, RigidBody};
use harborwave::cli::{Args, TerrainKind};
use harborwave::terrain::Terrain;
use harborwave::{Result, Simulation};

/// Half extents of the default hull (meters)
const BOAT_HALF_EXTENTS: Vec3 = Vec3::new(1.0, 0.75, 2.5);

/// Drops land this far ahead of the viewpoint (meters)
const DROP_OFFSET: Vec3 = Vec3::new(6.0, 0.0, 4.0);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match args.terrain {
        TerrainKind::Flat => run(&args, args.flat_terrain()),
        TerrainKind::Noise => run(&args, args.noise_terrain()),
    }
}

fn run<T: Terrain>(args: &Args, terrain: T) -> Result<()> {
    let grid_params = args.grid_params();
    let rest_height = grid_params.rest_height_m;
    let dt = grid_params.time_step_s;
    let mut sim = Simulation::new(grid_params, args.spectrum_params(), terrain)?;

    if !args.no_boat {
        let mut body = RigidBody::new(
            BodyMesh::box_hull(BOAT_HALF_EXTENTS),
            args.body_params(),
            rest_height,
        )?;
        body.set_controls(args.throttle, args.turn);
        sim = sim.with_body(body);
    }

    let mut view = Vec3::ZERO;
    let mut peak_object_cells = 0;
    let mut dropped_cells = 0;
    let mut repaired_values = 0;

    for frame in 0..args.frames {
        view = match sim.body() {
            Some(body) => body.position(),
            None => view + Vec3::X * args.view_speed * dt,
        };

        if args.drop_every > 0 && frame % args.drop_every == 0 {
            let at = view + DROP_OFFSET;
            sim.add_drop(at.x, at.z);
        }

        let report = sim.step_frame(view);
        peak_object_cells = peak_object_cells.max(report.raster.object_cells);
        dropped_cells += report.raster.dropped_cells;
        repaired_values += report.repaired_values;

        if args.report_every > 0 && report.frame % args.report_every == 0 {
            info!(
                "frame {} t={:.2}s volume={:.3} body_y={} object_cells={} drift=({:.3}, {:.3})",
                report.frame,
                report.elapsed_s,
                report.submerged_volume,
                report
                    .body_height
                    .map_or_else(|| "-".to_string(), |y| format!("{y:.3}")),
                report.raster.object_cells,
                report.raster.drift_velocity.x,
                report.raster.drift_velocity.y,
            );
        }
    }

    let counts = sim.grid().state_counts();
    let translation = sim.grid().translation();
    println!("Simulated {} frames ({:.2} s)", sim.frame(), sim.elapsed_s());
    println!(
        "Grid translation ({:.1}, {:.1}) m; {} water, {} ground, {} boundary cells",
        translation.x,
        translation.y,
        counts.water + counts.near_boundary + counts.object + counts.object_boundary,
        counts.ground,
        counts.boundary
    );
    if let Some(body) = sim.body() {
        let p = body.position();
        println!(
            "Body at ({:.2}, {:.2}, {:.2}), yaw {:.1} deg, peak footprint {} cells",
            p.x,
            p.y,
            p.z,
            body.yaw_deg(),
            peak_object_cells
        );
    }
    if dropped_cells > 0 || repaired_values > 0 {
        println!("Dropped {dropped_cells} footprint cells, repaired {repaired_values} values");
    }

    if let Some(path) = &args.dump_normals {
        sim.spectral().save_normal_map(path)?;
        println!("Wrote spectral normal map to {}", path.display());
    }
    Ok(())
}
