/// Generate pocket embeddings or plot a 2D projection of saved ones
/// Usage: cargo run --bin visualize_embeddings --release -- --preset above-70
use clap::Parser;
use pocket_viz::{
    app::{self, VisualizerOutcome},
    config::VisualizerArgs,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = VisualizerArgs::parse();

    // The Siamese encoder and pocket loader are not linked into this binary;
    // generation runs through `app::run_visualizer` from a crate that has them.
    match app::run_visualizer(&args, None) {
        Ok(VisualizerOutcome::Generated {
            embeddings,
            labels,
            count,
        }) => {
            log::info!(
                "✅ {} embeddings written to {} and {}",
                count,
                embeddings.display(),
                labels.display()
            );
            Ok(())
        }
        Ok(VisualizerOutcome::Plotted { image, points }) => {
            log::info!("✅ Plotted {} points to {}", points, image.display());
            Ok(())
        }
        Err(e) => {
            log::error!("❌ {}", e);
            Err(e.into())
        }
    }
}
