use thiserror::Error;

pub const DEFAULT_PLOT_COMPONENTS: usize = 2;
pub const DEFAULT_CLUSTER_COMPONENTS: usize = 20;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_BATCH_SIZE: usize = 5000;
pub const DEFAULT_MAX_ITERATIONS: usize = 100;
pub const DEFAULT_MAX_RMSD: f64 = 2.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{parameter}': {reason}")]
    InvalidValue {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureConfig {
    /// Principal components kept for the 2-D projection plot.
    pub plot_components: usize,
    /// Principal components kept for clustering.
    pub cluster_components: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringConfig {
    pub seed: u64,
    pub batch_size: usize,
    /// Upper bound on passes over the data, in epochs.
    pub max_iterations: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AcceptanceConfig {
    /// Largest backbone RMSD (Angstrom) to the k=1 centroid frame still accepted.
    pub max_rmsd: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub features: FeatureConfig,
    pub clustering: ClusteringConfig,
    pub acceptance: AcceptanceConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig {
                plot_components: DEFAULT_PLOT_COMPONENTS,
                cluster_components: DEFAULT_CLUSTER_COMPONENTS,
            },
            clustering: ClusteringConfig {
                seed: DEFAULT_SEED,
                batch_size: DEFAULT_BATCH_SIZE,
                max_iterations: DEFAULT_MAX_ITERATIONS,
            },
            acceptance: AcceptanceConfig {
                max_rmsd: DEFAULT_MAX_RMSD,
            },
        }
    }
}

#[derive(Default)]
pub struct AnalysisConfigBuilder {
    plot_components: Option<usize>,
    cluster_components: Option<usize>,
    seed: Option<u64>,
    batch_size: Option<usize>,
    max_iterations: Option<usize>,
    max_rmsd: Option<f64>,
}

impl AnalysisConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plot_components(mut self, n: usize) -> Self {
        self.plot_components = Some(n);
        self
    }
    pub fn cluster_components(mut self, n: usize) -> Self {
        self.cluster_components = Some(n);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }
    pub fn max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = Some(iterations);
        self
    }
    pub fn max_rmsd(mut self, threshold: f64) -> Self {
        self.max_rmsd = Some(threshold);
        self
    }

    pub fn build(self) -> Result<AnalysisConfig, ConfigError> {
        let features = FeatureConfig {
            plot_components: positive(
                "plot_components",
                self.plot_components
                    .ok_or(ConfigError::MissingParameter("plot_components"))?,
            )?,
            cluster_components: positive(
                "cluster_components",
                self.cluster_components
                    .ok_or(ConfigError::MissingParameter("cluster_components"))?,
            )?,
        };
        if features.plot_components < 2 {
            return Err(ConfigError::InvalidValue {
                parameter: "plot_components",
                reason: "a 2-D projection needs at least 2 components".to_string(),
            });
        }

        let clustering = ClusteringConfig {
            seed: self.seed.ok_or(ConfigError::MissingParameter("seed"))?,
            batch_size: positive(
                "batch_size",
                self.batch_size
                    .ok_or(ConfigError::MissingParameter("batch_size"))?,
            )?,
            max_iterations: positive(
                "max_iterations",
                self.max_iterations
                    .ok_or(ConfigError::MissingParameter("max_iterations"))?,
            )?,
        };

        let max_rmsd = self
            .max_rmsd
            .ok_or(ConfigError::MissingParameter("max_rmsd"))?;
        if !max_rmsd.is_finite() || max_rmsd < 0.0 {
            return Err(ConfigError::InvalidValue {
                parameter: "max_rmsd",
                reason: format!("must be a finite, non-negative distance (got {})", max_rmsd),
            });
        }

        Ok(AnalysisConfig {
            features,
            clustering,
            acceptance: AcceptanceConfig { max_rmsd },
        })
    }
}

fn positive(parameter: &'static str, value: usize) -> Result<usize, ConfigError> {
    if value == 0 {
        Err(ConfigError::InvalidValue {
            parameter,
            reason: "must be greater than zero".to_string(),
        })
    } else {
        Ok(value)
    }
}
