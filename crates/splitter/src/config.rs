//! Named chunking profiles stored in the workspace.

use crate::chunk::ChunkConfig;
use ragkit_core::{config::STATE_DIR, AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Load a chunking profile.
///
/// Loads from `.ragkit/profiles/<name>.yaml` if it exists, otherwise returns
/// the default configuration. Either way the result is validated.
pub fn load_profile(workspace: &Path, name: &str) -> AppResult<ChunkConfig> {
    let path = get_profile_path(workspace, name)?;

    let config = if path.exists() {
        let content = fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!("Failed to read profile at {:?}: {}", path, e))
        })?;

        let config: ChunkConfig = serde_yaml::from_str(&content).map_err(|e| {
            AppError::Config(format!("Failed to parse profile at {:?}: {}", path, e))
        })?;

        tracing::debug!("Loaded chunking profile '{}'", name);
        config
    } else {
        tracing::debug!("Using default chunking config for '{}' (no profile file found)", name);
        ChunkConfig::default()
    };

    config.validate()?;
    Ok(config)
}

/// Save a chunking profile, creating the profiles directory if needed.
pub fn save_profile(workspace: &Path, name: &str, config: &ChunkConfig) -> AppResult<()> {
    config.validate()?;
    let path = get_profile_path(workspace, name)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            AppError::Config(format!("Failed to create profiles directory: {}", e))
        })?;
    }

    let yaml = serde_yaml::to_string(config)?;
    fs::write(&path, yaml).map_err(|e| {
        AppError::Config(format!("Failed to write profile to {:?}: {}", path, e))
    })?;

    tracing::debug!("Saved chunking profile '{}'", name);
    Ok(())
}

/// List saved profile names, sorted.
pub fn list_profiles(workspace: &Path) -> AppResult<Vec<String>> {
    let dir = get_profiles_dir(workspace);
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(&dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("yaml") {
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Get the directory holding profile files.
pub fn get_profiles_dir(workspace: &Path) -> PathBuf {
    workspace.join(STATE_DIR).join("profiles")
}

/// Get the path to a profile file. Names must be plain file stems.
pub fn get_profile_path(workspace: &Path, name: &str) -> AppResult<PathBuf> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        return Err(AppError::Config(format!("Invalid profile name: '{}'", name)));
    }
    Ok(get_profiles_dir(workspace).join(format!("{}.yaml", name)))
}
