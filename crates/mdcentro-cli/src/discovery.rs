use crate::config::DiscoveryConfig;
use crate::error::{CliError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One system directory and the trajectory files found in it.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemEntry {
    pub name: String,
    pub directory: PathBuf,
    pub trajectories: Vec<PathBuf>,
}

/// Lists system directories under `base` in lexicographic order of their names.
pub fn discover_systems(base: &Path, config: &DiscoveryConfig) -> Result<Vec<SystemEntry>> {
    if !base.is_dir() {
        return Err(CliError::Argument(format!(
            "Base folder does not exist or is not a directory: {}",
            base.display()
        )));
    }

    let mut systems = Vec::new();
    for entry in fs::read_dir(base)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            debug!("Skipping directory with non UTF-8 name: {:?}", path);
            continue;
        };
        if !name.starts_with(&config.system_prefix) {
            continue;
        }
        let trajectories = trajectory_files(&path, &config.trajectory_extension)?;
        systems.push(SystemEntry {
            name,
            directory: path,
            trajectories,
        });
    }

    systems.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = systems.len(), "System directories discovered.");
    Ok(systems)
}

/// Files in `dir` with the given extension, sorted by file name.
///
/// Symbolic links are followed for both directories and files.
pub fn trajectory_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|e| e == extension) {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config() -> DiscoveryConfig {
        DiscoveryConfig {
            system_prefix: "MD".to_string(),
            trajectory_extension: "pdb".to_string(),
        }
    }

    #[test]
    fn systems_are_filtered_by_prefix_and_sorted() {
        let dir = tempdir().unwrap();
        for name in ["MD_b", "MD_a", "analysis", "MD_c"] {
            fs::create_dir(dir.path().join(name)).unwrap();
        }
        fs::write(dir.path().join("MD_file.pdb"), "").unwrap();

        let systems = discover_systems(dir.path(), &config()).unwrap();
        let names: Vec<&str> = systems.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["MD_a", "MD_b", "MD_c"]);
    }

    #[test]
    fn trajectories_are_filtered_by_extension_and_sorted() {
        let dir = tempdir().unwrap();
        let system = dir.path().join("MD_x");
        fs::create_dir(&system).unwrap();
        for name in ["rep2.pdb", "rep10.pdb", "rep1.pdb", "notes.txt", "rep3.PDB"] {
            fs::write(system.join(name), "").unwrap();
        }
        fs::create_dir(system.join("sub.pdb")).unwrap();

        let systems = discover_systems(dir.path(), &config()).unwrap();
        let files: Vec<String> = systems[0]
            .trajectories
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(files, vec!["rep1.pdb", "rep10.pdb", "rep2.pdb"]);
    }

    #[test]
    fn empty_system_directory_has_no_trajectories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("MD_empty")).unwrap();
        let systems = discover_systems(dir.path(), &config()).unwrap();
        assert_eq!(systems.len(), 1);
        assert!(systems[0].trajectories.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_systems_and_trajectories_are_followed() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let storage = dir.path().join("storage");
        let base = dir.path().join("runs");
        fs::create_dir_all(storage.join("replicas")).unwrap();
        fs::create_dir(&base).unwrap();
        fs::write(storage.join("replicas").join("rep1.pdb"), "").unwrap();
        fs::write(storage.join("shared.pdb"), "").unwrap();

        symlink(storage.join("replicas"), base.join("MD_linked")).unwrap();
        fs::create_dir(base.join("MD_real")).unwrap();
        symlink(storage.join("shared.pdb"), base.join("MD_real").join("rep1.pdb")).unwrap();
        symlink(dir.path().join("gone.pdb"), base.join("MD_real").join("rep2.pdb")).unwrap();

        let systems = discover_systems(&base, &config()).unwrap();
        let summary: Vec<(&str, usize)> = systems
            .iter()
            .map(|s| (s.name.as_str(), s.trajectories.len()))
            .collect();
        assert_eq!(summary, vec![("MD_linked", 1), ("MD_real", 1)]);
    }

    #[test]
    fn missing_base_folder_is_an_error() {
        let dir = tempdir().unwrap();
        let result = discover_systems(&dir.path().join("absent"), &config());
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
