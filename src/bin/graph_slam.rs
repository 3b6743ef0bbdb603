//! Graph SLAM demo
//!
//! Simulates a point robot in a square world, then recovers its trajectory
//! and the landmark map with both the offline and the online estimator.
//! Set `RUST_LOG=debug` to follow the online session step by step.

use std::fs;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use graph_slam::common::{SlamResult, TrajectoryEstimator};
use graph_slam::simulation::{make_data, SimulationConfig};
use graph_slam::slam::{OfflineGraphSlam, OnlineGraphSlam};
use graph_slam::utils::{colors, PathStyle, Visualizer};
use graph_slam::Point2D;

const SEED: u64 = 0;
const OUTPUT: &str = "img/slam/graph_slam_result.png";

fn main() -> SlamResult<()> {
    env_logger::init();
    println!("Graph SLAM start!!");

    let sim_config = SimulationConfig::default();
    let mut rng = StdRng::seed_from_u64(SEED);
    let run = make_data(&sim_config, &mut rng)?;
    println!(
        "Simulated {} timesteps, {} landmarks",
        run.num_steps(),
        run.true_landmarks().len()
    );

    let config = sim_config.graph_slam_config();

    let offline = OfflineGraphSlam::new(config.clone())?.estimate(&run.steps)?;
    println!(
        "Offline: mean pose error {:.3}, mean landmark error {:.3}",
        offline.mean_pose_error(&run.true_poses),
        offline.mean_landmark_error(run.true_landmarks())
    );

    let online = OnlineGraphSlam::new(config)?;
    let session = online.run(&run.steps)?;
    let final_estimate = session.estimate()?;
    println!(
        "Online:  final pose error {:.3}, mean landmark error {:.3}",
        final_estimate.mean_pose_error(&run.true_poses),
        final_estimate.mean_landmark_error(run.true_landmarks())
    );

    for (lm, (truth, est)) in run.true_landmarks().iter().zip(&offline.landmarks).enumerate() {
        if let Some(est) = est {
            info!(
                "landmark {}: true ({:.1}, {:.1}) offline ({:.2}, {:.2})",
                lm, truth.x, truth.y, est.x, est.y
            );
        }
    }

    let online_path: Vec<Point2D> = session.trajectory().iter().map(|(_, p)| *p).collect();

    let mut vis = Visualizer::new();
    vis.set_title("Graph SLAM").set_world(sim_config.world_size);
    vis.plot_true_landmarks(run.true_landmarks());
    vis.plot_trajectory(&run.true_poses, &PathStyle::new(colors::GROUND_TRUTH, "Ground truth"));
    vis.plot_estimate(&offline, "Offline", colors::OFFLINE);
    vis.plot_trajectory(&online_path, &PathStyle::new(colors::ONLINE, "Online").with_line_width(1.0));

    fs::create_dir_all("img/slam")?;
    match vis.save_png(OUTPUT, 800, 600) {
        Ok(()) => println!("Plot saved to: {}", OUTPUT),
        Err(e) => warn!("could not save plot: {}", e),
    }

    println!("Graph SLAM finish!!");
    Ok(())
}
