use crate::core::models::trajectory::Trajectory;
use crate::engine::acceptance::{self, Verdict};
use crate::engine::aggregate;
use crate::engine::align::Aligner;
use crate::engine::centroid::{self, CentroidSelection};
use crate::engine::clustering::{self, ClusterAnalysis};
use crate::engine::config::AnalysisConfig;
use crate::engine::error::EngineError;
use crate::engine::features;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::state::ResultRecord;
use nalgebra::DMatrix;
use tracing::{info, instrument, warn};

/// Everything produced for one system, ready to be persisted.
#[derive(Debug, Clone)]
pub struct SystemAnalysis {
    pub record: ResultRecord,
    /// Frame coordinates in the plotting reduction, one row per frame.
    pub projection: DMatrix<f64>,
    pub time_labels: Vec<usize>,
    pub replicate_indices: Vec<usize>,
    pub clusters: ClusterAnalysis,
    pub centroid: CentroidSelection,
    /// Replicate the centroid frame came from.
    pub centroid_replicate: usize,
    /// Frame index of the centroid within its replicate.
    pub centroid_time: usize,
    /// The centroid frame with every non-solvent atom, superposed on the reference.
    pub centroid_structure: Trajectory,
}

/// Runs the complete pipeline for one system.
///
/// Replicates without frames are not aligned and contribute no frames, but
/// replicate indices in the result still count them, so they match the
/// order of the input files. Returns `Ok(None)` when no replicate has frames,
/// which callers treat as a skipped system.
#[instrument(skip_all, name = "analyze_workflow", fields(system = name))]
pub fn run(
    name: &str,
    mut replicates: Vec<Trajectory>,
    aligner: &Aligner,
    config: &AnalysisConfig,
    reporter: &ProgressReporter,
) -> Result<Option<SystemAnalysis>, EngineError> {
    let count = replicates.iter().filter(|t| !t.is_empty()).count();
    if count < replicates.len() {
        warn!(
            empty = replicates.len() - count,
            "Ignoring replicate(s) without frames."
        );
    }
    if count == 0 {
        info!("No frames found; nothing to analyze.");
        return Ok(None);
    }

    // === Stage 1: Superpose every replicate onto the reference ===
    reporter.stage("Aligning", || -> Result<(), EngineError> {
        let non_empty = replicates.iter_mut().filter(|t| !t.is_empty());
        for (i, replicate) in non_empty.enumerate() {
            reporter.report(Progress::Message(format!(
                "replicate {}/{}",
                i + 1,
                count
            )));
            aligner.prepare(replicate)?;
        }
        Ok(())
    })?;

    // === Stage 2: Concatenate ===
    let Some(aggregated) = reporter.stage("Aggregating", || aggregate::aggregate(replicates))?
    else {
        return Ok(None);
    };
    info!(
        frames = aggregated.n_frames(),
        "Aggregated trajectory assembled."
    );

    // === Stage 3: Feature reduction ===
    let atom_indices = aligner.atom_indices();
    let feature_set = reporter.stage("Reducing dimensionality", || {
        features::extract(&aggregated.trajectory, atom_indices, &config.features)
    })?;

    // === Stage 4: k=1 and k=2 clustering ===
    let clusters = reporter.stage("Clustering", || {
        clustering::analyze(&feature_set.cluster.scores, &config.clustering)
    })?;
    let center = clusters.single.centers.first().ok_or_else(|| {
        EngineError::Internal("single-cluster model has no center".to_string())
    })?;

    // === Stage 5: Centroid and spread ===
    let selection = reporter.stage("Selecting centroid", || {
        centroid::select(
            &aggregated.trajectory,
            atom_indices,
            &feature_set.cluster.scores,
            center,
        )
    })?;

    let verdict = acceptance::evaluate(selection.max_rmsd, config.acceptance.max_rmsd);
    let (centroid_replicate, centroid_time) = aggregated
        .provenance(selection.frame_index)
        .ok_or_else(|| EngineError::Internal("centroid frame has no provenance".to_string()))?;
    let centroid_structure = aggregated
        .trajectory
        .extract_frame(selection.frame_index)
        .ok_or_else(|| EngineError::Internal("centroid frame out of range".to_string()))?;

    info!(
        inertia_k1 = clusters.single.inertia,
        inertia_k2 = clusters.split.inertia,
        max_rmsd = selection.max_rmsd,
        centroid_frame = selection.frame_index,
        centroid_replicate,
        centroid_time,
        accepted = verdict == Verdict::Accepted,
        "System analysis complete."
    );

    Ok(Some(SystemAnalysis {
        record: ResultRecord {
            system: name.to_string(),
            inertia_k1: clusters.single.inertia,
            inertia_k2: clusters.split.inertia,
            max_rmsd: selection.max_rmsd,
            verdict,
        },
        projection: feature_set.plot.scores,
        time_labels: aggregated.time_labels,
        replicate_indices: aggregated.replicate_indices,
        clusters,
        centroid: selection,
        centroid_replicate,
        centroid_time,
        centroid_structure,
    }))
}
