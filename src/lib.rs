pub mod app;
pub mod arrays;
pub mod checkpoint;
pub mod config;
pub mod device;
pub mod embed;
pub mod error;
pub mod history;
pub mod loss_plot;
pub mod scatter;
pub mod selection;
pub mod settings;

pub use error::VizError;
