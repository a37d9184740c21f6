pub mod settings;
pub mod site;

pub use settings::{AppConfig, DetectionSettings, FetcherSettings};
pub use site::SitePaths;
