//! Game save staging.
//!
//! A generated world starts life as a copy of a template world directory
//! (which supplies the component type table and any hand-built scenery). The
//! stager replaces the previous run's world, copies the template into the
//! game's saves directory and writes the world metadata file, leaving a
//! `data.logicworld` for the encoder to inject into.
//!
//! Deletion is confined to the generated world's own directory; the template
//! and sibling saves are never touched.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::config::StagingSettings;
use crate::error::{AppResult, ReelError};
use crate::save::SUPPORTED_VERSION;

/// File name of the circuit data inside a world directory.
pub const DATA_FILE: &str = "data.logicworld";
/// File name of the world metadata inside a world directory.
pub const METADATA_FILE: &str = "info.succ";

/// Saves location of a default Steam install, relative to the home directory.
const DEFAULT_SAVES_DIR: &str = ".steam/steam/steamapps/common/Logic World/saves";

/// The three metadata entries written into a staged world.
#[derive(Debug, Clone)]
pub struct WorldMetadata {
    /// Game version string advertised by the world.
    pub game_version: String,
    /// Save format version of the data file.
    pub save_version: u8,
    /// When the world was generated.
    pub created_at: DateTime<Utc>,
}

impl WorldMetadata {
    /// Metadata stamped with the current time.
    pub fn new(game_version: &str) -> Self {
        Self {
            game_version: game_version.to_string(),
            save_version: SUPPORTED_VERSION,
            created_at: Utc::now(),
        }
    }

    fn render(&self) -> String {
        format!(
            "GameVersion: {}\nSaveFormatVersion: {}\nCreatedAt: {}\n",
            self.game_version,
            self.save_version,
            self.created_at.to_rfc3339()
        )
    }
}

/// Prepares the world directory a pipeline run writes into.
pub struct WorldStager {
    saves_dir: Option<PathBuf>,
    template_dir: PathBuf,
    world_name: String,
}

impl WorldStager {
    /// Create a stager from the staging settings.
    pub fn new(settings: &StagingSettings) -> Self {
        Self {
            saves_dir: settings.saves_dir.clone(),
            template_dir: settings.template_dir.clone(),
            world_name: settings.world_name.clone(),
        }
    }

    /// The game's saves directory: configured, or the default Steam install
    /// location under the user's home directory.
    pub fn resolve_saves_dir(&self) -> AppResult<PathBuf> {
        match &self.saves_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::home_dir()
                .map(|home| home.join(DEFAULT_SAVES_DIR))
                .ok_or_else(|| {
                    ReelError::Staging(
                        "cannot resolve the game saves directory: \
                         no home directory and no staging.saves_dir configured"
                            .into(),
                    )
                }),
        }
    }

    /// Directory of the generated world.
    pub fn world_dir(&self) -> AppResult<PathBuf> {
        Ok(self.resolve_saves_dir()?.join(&self.world_name))
    }

    /// Path of the generated world's circuit data file.
    pub fn data_file(&self) -> AppResult<PathBuf> {
        Ok(self.world_dir()?.join(DATA_FILE))
    }

    /// Stage a fresh world: remove the previous generated world if present,
    /// copy the template, write `info.succ`. Returns the path of the staged
    /// world's data file.
    pub fn stage(&self, metadata: &WorldMetadata) -> AppResult<PathBuf> {
        if !self.template_dir.is_dir() {
            return Err(ReelError::Staging(format!(
                "template world '{}' does not exist",
                self.template_dir.display()
            )));
        }
        if !self.template_dir.join(DATA_FILE).is_file() {
            return Err(ReelError::Staging(format!(
                "template world '{}' has no {DATA_FILE}",
                self.template_dir.display()
            )));
        }

        let world_dir = self.world_dir()?;
        if world_dir.exists() {
            tracing::info!(world = %world_dir.display(), "Removing previous world");
            std::fs::remove_dir_all(&world_dir)?;
        }

        copy_dir_recursive(&self.template_dir, &world_dir)?;
        std::fs::write(world_dir.join(METADATA_FILE), metadata.render())?;

        tracing::info!(world = %world_dir.display(), "World staged");
        Ok(world_dir.join(DATA_FILE))
    }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> AppResult<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stager(saves: &Path, template: &Path) -> WorldStager {
        WorldStager::new(&StagingSettings {
            saves_dir: Some(saves.to_path_buf()),
            template_dir: template.to_path_buf(),
            world_name: "TestWorld".to_string(),
        })
    }

    fn make_template(dir: &Path) {
        std::fs::create_dir_all(dir.join("Gallery")).unwrap();
        std::fs::write(dir.join(DATA_FILE), b"fake save bytes").unwrap();
        std::fs::write(dir.join("Gallery").join("thumb.png"), b"png").unwrap();
    }

    #[test]
    fn stage_copies_template_and_writes_metadata() {
        let root = tempfile::tempdir().unwrap();
        let template = root.path().join("template");
        let saves = root.path().join("saves");
        make_template(&template);

        let metadata = WorldMetadata::new("0.91.3");
        let data = stager(&saves, &template).stage(&metadata).unwrap();

        assert_eq!(data, saves.join("TestWorld").join(DATA_FILE));
        assert_eq!(std::fs::read(&data).unwrap(), b"fake save bytes");
        assert!(saves
            .join("TestWorld")
            .join("Gallery")
            .join("thumb.png")
            .is_file());

        let info =
            std::fs::read_to_string(saves.join("TestWorld").join(METADATA_FILE)).unwrap();
        assert_eq!(info.lines().count(), 3);
        assert!(info.contains("GameVersion: 0.91.3"));
        assert!(info.contains(&format!("SaveFormatVersion: {SUPPORTED_VERSION}")));
        assert!(info.contains("CreatedAt: "));
    }

    #[test]
    fn stage_replaces_a_previous_world() {
        let root = tempfile::tempdir().unwrap();
        let template = root.path().join("template");
        let saves = root.path().join("saves");
        make_template(&template);

        let old_world = saves.join("TestWorld");
        std::fs::create_dir_all(&old_world).unwrap();
        std::fs::write(old_world.join("stale.txt"), b"from last run").unwrap();

        stager(&saves, &template)
            .stage(&WorldMetadata::new("0.91.3"))
            .unwrap();

        assert!(!old_world.join("stale.txt").exists());
        assert!(old_world.join(DATA_FILE).is_file());
    }

    #[test]
    fn stage_leaves_sibling_saves_alone() {
        let root = tempfile::tempdir().unwrap();
        let template = root.path().join("template");
        let saves = root.path().join("saves");
        make_template(&template);

        let sibling = saves.join("HandBuiltWorld");
        std::fs::create_dir_all(&sibling).unwrap();
        std::fs::write(sibling.join(DATA_FILE), b"precious").unwrap();

        stager(&saves, &template)
            .stage(&WorldMetadata::new("0.91.3"))
            .unwrap();

        assert_eq!(
            std::fs::read(sibling.join(DATA_FILE)).unwrap(),
            b"precious"
        );
    }

    #[test]
    fn missing_template_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let err = stager(&root.path().join("saves"), &root.path().join("nope"))
            .stage(&WorldMetadata::new("0.91.3"))
            .unwrap_err();
        assert!(matches!(err, ReelError::Staging(_)));
    }

    #[test]
    fn template_without_data_file_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let template = root.path().join("template");
        std::fs::create_dir_all(&template).unwrap();

        let err = stager(&root.path().join("saves"), &template)
            .stage(&WorldMetadata::new("0.91.3"))
            .unwrap_err();
        assert!(err.to_string().contains(DATA_FILE));
    }
}
