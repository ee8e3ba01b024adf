use medscreen::core::io::traits::LoadOptions;
use medscreen::engine::config::ScreeningConfig;
use std::path::PathBuf;

/// Fully resolved settings for one `screen` invocation.
#[derive(Debug)]
pub struct AppConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub load_options: LoadOptions,
    pub screening: ScreeningConfig,
    pub write_summary: bool,
}
