use crate::config::AppConfig;
use crate::discovery::{self, SystemEntry};
use crate::error::{CliError, Result};
use crate::report;
use mdcentro::{
    core::io::{pdb::PdbFile, traits::StructureFile},
    core::models::trajectory::Trajectory,
    engine::align::Aligner,
    engine::progress::{Progress, ProgressReporter},
    engine::state::SystemOutcome,
    workflows::{
        self,
        analyze::SystemAnalysis,
        summary::{METHODOLOGY_FILE_NAME, SUMMARY_FILE_NAME},
    },
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, instrument, warn};

/// Analyzes every discovered system and writes the summary files.
///
/// Problems confined to one system are recorded in its outcome; problems with
/// the reference, the output folder or the summary abort the run.
pub fn run(config: &AppConfig, reporter: &ProgressReporter) -> Result<Vec<SystemOutcome>> {
    fs::create_dir_all(&config.output_folder)?;

    info!("Loading reference structure from {:?}", &config.reference_path);
    let reference = read_trajectory(&config.reference_path)?;
    let aligner = Aligner::new(&reference)?;
    info!(
        backbone_atoms = aligner.atom_indices().len(),
        "Reference backbone selected."
    );

    let systems = discovery::discover_systems(&config.base_folder, &config.discovery)?;
    if systems.is_empty() {
        warn!(
            "No directories starting with '{}' found in {:?}.",
            config.discovery.system_prefix, &config.base_folder
        );
    }

    let mut outcomes = Vec::with_capacity(systems.len());
    for system in &systems {
        reporter.report(Progress::SystemStart {
            name: system.name.clone(),
        });
        let outcome = match process_system(system, &aligner, config, reporter) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(system = %system.name, "System failed: {}", e);
                SystemOutcome::Failed {
                    system: system.name.clone(),
                    reason: e.to_string(),
                }
            }
        };
        if let SystemOutcome::Skipped { system, reason } = &outcome {
            warn!(system = %system, "Skipping system: {}", reason);
        }
        reporter.report(Progress::SystemFinish);
        outcomes.push(outcome);
    }

    let summary_path = config.output_folder.join(SUMMARY_FILE_NAME);
    let rows = workflows::summary::write_summary(&summary_path, &outcomes)?;
    workflows::summary::write_methodology_note(
        &config.output_folder.join(METHODOLOGY_FILE_NAME),
        config.core_config.acceptance.max_rmsd,
    )?;
    info!(rows, "Summary written to {:?}", &summary_path);

    Ok(outcomes)
}

#[instrument(skip_all, fields(system = %system.name))]
fn process_system(
    system: &SystemEntry,
    aligner: &Aligner,
    config: &AppConfig,
    reporter: &ProgressReporter,
) -> Result<SystemOutcome> {
    if system.trajectories.is_empty() {
        return Ok(SystemOutcome::Skipped {
            system: system.name.clone(),
            reason: format!(
                "no '.{}' trajectory files",
                config.discovery.trajectory_extension
            ),
        });
    }

    let replicates = reporter.stage("Loading", || {
        system
            .trajectories
            .iter()
            .map(|path| read_trajectory(path))
            .collect::<Result<Vec<_>>>()
    })?;
    info!(
        replicates = replicates.len(),
        frames = replicates.iter().map(Trajectory::n_frames).sum::<usize>(),
        "Trajectories loaded."
    );

    let analysis = workflows::analyze::run(
        &system.name,
        replicates,
        aligner,
        &config.core_config,
        reporter,
    )?;
    let Some(analysis) = analysis else {
        return Ok(SystemOutcome::Skipped {
            system: system.name.clone(),
            reason: "trajectories contain no frames".to_string(),
        });
    };

    reporter.stage("Writing artifacts", || {
        write_artifacts(&config.output_folder, &system.name, &analysis)
    })?;
    Ok(SystemOutcome::Completed(analysis.record))
}

fn read_trajectory(path: &Path) -> Result<Trajectory> {
    PdbFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Output locations for one system: `(plot, centroid structure)`.
pub fn artifact_paths(output_folder: &Path, system: &str) -> (PathBuf, PathBuf) {
    let plot = output_folder
        .join(format!("{}_plots", system))
        .join(format!("{}_time_colored.png", system));
    let centroid = output_folder.join(format!("{}.pdb", system));
    (plot, centroid)
}

fn write_artifacts(output_folder: &Path, system: &str, analysis: &SystemAnalysis) -> Result<()> {
    let (plot_path, centroid_path) = artifact_paths(output_folder, system);

    if let Some(plot_dir) = plot_path.parent() {
        fs::create_dir_all(plot_dir)?;
    }
    let projection = &analysis.projection;
    let points: Vec<(f64, f64)> = (0..projection.nrows())
        .map(|i| (projection[(i, 0)], projection[(i, 1)]))
        .collect();
    report::render_time_colored(&plot_path, system, &points, &analysis.time_labels)?;

    PdbFile::write_to_path(&analysis.centroid_structure, &centroid_path).map_err(|e| {
        CliError::FileParsing {
            path: centroid_path.clone(),
            source: e.into(),
        }
    })?;
    info!(
        replicate = analysis.centroid_replicate,
        frame = analysis.centroid_time,
        "Centroid structure written to {:?}",
        &centroid_path
    );
    Ok(())
}
