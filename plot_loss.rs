/// Plot loss and accuracy curves of a classifier run
/// Usage: cargo run --bin plot_loss --release -- --run 7
use clap::Parser;
use pocket_viz::{app, config::LossPlotArgs};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = LossPlotArgs::parse();
    let paths = args.paths();

    log::info!("📊 Plotting classifier run {}...", args.run);
    match app::run_loss_plot(&paths) {
        Ok(best) => {
            log::info!(
                "✅ Minimum validation loss {:.4} at epoch {}",
                best.val_loss,
                best.epoch
            );
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Could not plot {}: {}", paths.log.display(), e);
            Err(e.into())
        }
    }
}
