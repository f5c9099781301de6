use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::{AppConfig, DiscoveryConfig};
use crate::cli::Cli;
use crate::error::{CliError, Result};
use crate::utils::parser::{self, ParseError};
use mdcentro::engine::config as core_config;

/// Merges built-in defaults, the optional config file, `--set` overrides and
/// dedicated CLI flags, in increasing order of precedence.
pub fn build_config(args: &Cli) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let discovery_file = file_config.discovery.take().unwrap_or_default();
    let features_file = file_config.features.take().unwrap_or_default();
    let clustering_file = file_config.clustering.take().unwrap_or_default();
    let acceptance_file = file_config.acceptance.take().unwrap_or_default();

    let trajectory_extension = discovery_file
        .trajectory_extension
        .unwrap_or(defaults.trajectory_extension)
        .trim_start_matches('.')
        .to_string();
    if trajectory_extension.is_empty() {
        return Err(CliError::Config(
            "`discovery.trajectory-extension` cannot be empty.".to_string(),
        ));
    }
    let discovery = DiscoveryConfig {
        system_prefix: discovery_file
            .system_prefix
            .unwrap_or(defaults.system_prefix),
        trajectory_extension,
    };

    let max_rmsd = args
        .max_rmsd
        .or(acceptance_file.max_rmsd)
        .unwrap_or(defaults.max_rmsd);

    let core_config = core_config::AnalysisConfigBuilder::new()
        .plot_components(
            features_file
                .plot_components
                .unwrap_or(defaults.plot_components),
        )
        .cluster_components(
            features_file
                .cluster_components
                .unwrap_or(defaults.cluster_components),
        )
        .seed(clustering_file.seed.unwrap_or(defaults.seed))
        .batch_size(clustering_file.batch_size.unwrap_or(defaults.batch_size))
        .max_iterations(
            clustering_file
                .max_iterations
                .unwrap_or(defaults.max_iterations),
        )
        .max_rmsd(max_rmsd)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(AppConfig {
        base_folder: args.base_folder.clone(),
        reference_path: args.ref_pdb.clone(),
        output_folder: args.out_folder.clone(),
        discovery,
        core_config,
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    let to_config_error = |e: ParseError| CliError::Config(e.to_string());

    for kv_pair in set_values {
        let (key, value) = parser::parse_key_value(kv_pair).map_err(to_config_error)?;

        match key {
            "discovery.system-prefix" => {
                config
                    .discovery
                    .get_or_insert_with(Default::default)
                    .system_prefix = Some(value.to_string());
            }
            "discovery.trajectory-extension" => {
                config
                    .discovery
                    .get_or_insert_with(Default::default)
                    .trajectory_extension = Some(value.to_string());
            }
            "features.plot-components" => {
                config
                    .features
                    .get_or_insert_with(Default::default)
                    .plot_components =
                    Some(parser::parse_value(key, value, "integer").map_err(to_config_error)?);
            }
            "features.cluster-components" => {
                config
                    .features
                    .get_or_insert_with(Default::default)
                    .cluster_components =
                    Some(parser::parse_value(key, value, "integer").map_err(to_config_error)?);
            }
            "clustering.seed" => {
                config.clustering.get_or_insert_with(Default::default).seed =
                    Some(parser::parse_value(key, value, "integer").map_err(to_config_error)?);
            }
            "clustering.batch-size" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .batch_size =
                    Some(parser::parse_value(key, value, "integer").map_err(to_config_error)?);
            }
            "clustering.max-iterations" => {
                config
                    .clustering
                    .get_or_insert_with(Default::default)
                    .max_iterations =
                    Some(parser::parse_value(key, value, "integer").map_err(to_config_error)?);
            }
            "acceptance.max-rmsd" => {
                config
                    .acceptance
                    .get_or_insert_with(Default::default)
                    .max_rmsd =
                    Some(parser::parse_value(key, value, "float").map_err(to_config_error)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn base_args() -> Cli {
        Cli {
            base_folder: PathBuf::from("runs"),
            ref_pdb: PathBuf::from("ref.pdb"),
            out_folder: PathBuf::from("out"),
            max_rmsd: None,
            config: None,
            set_values: vec![],
            verbose: 0,
            quiet: false,
            log_file: None,
            threads: None,
        }
    }

    #[test]
    fn build_config_without_file_uses_defaults() {
        let app = build_config(&base_args()).expect("build ok");

        assert_eq!(app.base_folder, PathBuf::from("runs"));
        assert_eq!(app.discovery.system_prefix, "MD");
        assert_eq!(app.discovery.trajectory_extension, "pdb");
        assert_eq!(app.core_config, core_config::AnalysisConfig::default());
    }

    #[test]
    fn build_config_reads_file_and_merges() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mdcentro.toml");
        fs::write(
            &path,
            r#"
            [discovery]
            system-prefix = "SIM"
            trajectory-extension = ".pdb"

            [clustering]
            seed = 11
            "#,
        )
        .unwrap();
        let mut args = base_args();
        args.config = Some(path);

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.discovery.system_prefix, "SIM");
        assert_eq!(app.discovery.trajectory_extension, "pdb");
        assert_eq!(app.core_config.clustering.seed, 11);
        assert_eq!(app.core_config.clustering.batch_size, 5000);
    }

    #[test]
    fn cli_flag_overrides_file_and_set_values() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mdcentro.toml");
        fs::write(&path, "[acceptance]\nmax-rmsd = 3.0\n").unwrap();
        let mut args = base_args();
        args.config = Some(path);

        assert_eq!(
            build_config(&args).unwrap().core_config.acceptance.max_rmsd,
            3.0
        );

        args.set_values = vec!["acceptance.max-rmsd=2.5".to_string()];
        assert_eq!(
            build_config(&args).unwrap().core_config.acceptance.max_rmsd,
            2.5
        );

        args.max_rmsd = Some(1.0);
        assert_eq!(
            build_config(&args).unwrap().core_config.acceptance.max_rmsd,
            1.0
        );
    }

    #[test]
    fn set_values_override() {
        let mut args = base_args();
        args.set_values = vec![
            "discovery.system-prefix=REP".to_string(),
            "features.cluster-components=8".to_string(),
            "clustering.batch-size=64".to_string(),
            "clustering.max-iterations=12".to_string(),
            "clustering.seed=5".to_string(),
        ];

        let app = build_config(&args).expect("build ok");
        assert_eq!(app.discovery.system_prefix, "REP");
        assert_eq!(app.core_config.features.cluster_components, 8);
        assert_eq!(app.core_config.clustering.batch_size, 64);
        assert_eq!(app.core_config.clustering.max_iterations, 12);
        assert_eq!(app.core_config.clustering.seed, 5);
    }

    #[test]
    fn invalid_set_values_are_rejected() {
        let mut args = base_args();
        args.set_values = vec!["clustering.k=3".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["clustering.seed=minus-one".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["clustering.seed".to_string()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn invalid_values_are_reported_by_core_validation() {
        let mut args = base_args();
        args.max_rmsd = Some(-1.0);
        let err = build_config(&args).unwrap_err();
        assert!(err.to_string().contains("max_rmsd"));

        let mut args = base_args();
        args.set_values = vec!["discovery.trajectory-extension=.".to_string()];
        assert!(build_config(&args).is_err());
    }
}
