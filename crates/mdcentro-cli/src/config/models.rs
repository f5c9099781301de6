use mdcentro::engine::config as core_config;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryConfig {
    /// Sub-directories of the base folder whose names start with this prefix are systems.
    pub system_prefix: String,
    /// Extension (without the dot) of trajectory files inside a system directory.
    pub trajectory_extension: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub base_folder: PathBuf,
    pub reference_path: PathBuf,
    pub output_folder: PathBuf,
    pub discovery: DiscoveryConfig,
    pub core_config: core_config::AnalysisConfig,
}
