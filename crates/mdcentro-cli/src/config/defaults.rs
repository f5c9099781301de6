use mdcentro::engine::config as core_config;

pub struct DefaultsConfig {
    pub system_prefix: String,
    pub trajectory_extension: String,
    pub plot_components: usize,
    pub cluster_components: usize,
    pub seed: u64,
    pub batch_size: usize,
    pub max_iterations: usize,
    pub max_rmsd: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            system_prefix: "MD".to_string(),
            trajectory_extension: "pdb".to_string(),
            plot_components: core_config::DEFAULT_PLOT_COMPONENTS,
            cluster_components: core_config::DEFAULT_CLUSTER_COMPONENTS,
            seed: core_config::DEFAULT_SEED,
            batch_size: core_config::DEFAULT_BATCH_SIZE,
            max_iterations: core_config::DEFAULT_MAX_ITERATIONS,
            max_rmsd: core_config::DEFAULT_MAX_RMSD,
        }
    }
}
