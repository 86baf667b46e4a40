use crate::model::Roadmap;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PROJECT_DIR: &str = ".roadmap";
const FILE_NAME: &str = "roadmap.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardScope {
    Project,
    Global,
}

impl BoardScope {
    pub fn label(&self) -> &'static str {
        match self {
            BoardScope::Project => "project",
            BoardScope::Global => "global",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BoardLocation {
    pub path: PathBuf,
    pub scope: BoardScope,
}

pub fn init_project_board(name: Option<String>) -> Result<BoardLocation> {
    let cwd = env::current_dir()?;
    init_project_board_in(&cwd, name)
}

/// Create `<dir>/.roadmap/roadmap.yml` unless it already exists.
pub fn init_project_board_in(dir: &Path, name: Option<String>) -> Result<BoardLocation> {
    let board_dir = dir.join(PROJECT_DIR);
    fs::create_dir_all(&board_dir).context("failed to create .roadmap directory")?;
    let location = BoardLocation {
        path: board_dir.join(FILE_NAME),
        scope: BoardScope::Project,
    };
    if !location.path.exists() {
        let board_name = name.unwrap_or_else(|| {
            dir.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("project")
                .to_string()
        });
        save_board(&location, &Roadmap::default_named(board_name))?;
        info!(path = %location.path.display(), "initialized roadmap");
    }
    Ok(location)
}

pub fn locate_board(start: &Path) -> Result<BoardLocation> {
    if let Some(project_path) = find_project_board(start) {
        return Ok(BoardLocation {
            path: project_path,
            scope: BoardScope::Project,
        });
    }
    Ok(BoardLocation {
        path: global_board_path()?,
        scope: BoardScope::Global,
    })
}

pub fn load_board(location: &BoardLocation) -> Result<Roadmap> {
    if location.path.exists() {
        let data = fs::read_to_string(&location.path)
            .with_context(|| format!("reading {:?}", location.path))?;
        let roadmap: Roadmap = serde_yaml::from_str(&data).context("parsing roadmap file")?;
        debug!(
            path = %location.path.display(),
            items = roadmap.items.len(),
            "loaded roadmap"
        );
        Ok(roadmap)
    } else {
        let fallback_name = match location.scope {
            BoardScope::Project => location
                .path
                .parent()
                .and_then(|p| p.parent())
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or("project")
                .to_string(),
            BoardScope::Global => "default".to_string(),
        };
        let roadmap = Roadmap::default_named(fallback_name);
        save_board(location, &roadmap)?;
        Ok(roadmap)
    }
}

pub fn save_board(location: &BoardLocation, roadmap: &Roadmap) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(roadmap).context("serializing roadmap")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    debug!(path = %location.path.display(), "saved roadmap");
    Ok(())
}

fn find_project_board(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(FILE_NAME);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

pub fn data_dir() -> Result<PathBuf> {
    let dirs = ProjectDirs::from("", "", "roadmap").context("locating data directory")?;
    Ok(dirs.data_dir().to_path_buf())
}

fn global_board_path() -> Result<PathBuf> {
    Ok(data_dir()?.join(FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadmapItem;
    use crate::status::Status;
    use chrono::NaiveDate;

    #[test]
    fn init_creates_a_named_board_once() {
        let tmp = tempfile::tempdir().unwrap();
        let location = init_project_board_in(tmp.path(), Some("launch".into())).unwrap();
        assert_eq!(location.scope, BoardScope::Project);
        assert!(location.path.ends_with(".roadmap/roadmap.yml"));

        let mut roadmap = load_board(&location).unwrap();
        assert_eq!(roadmap.name, "launch");
        roadmap.name = "renamed".into();
        save_board(&location, &roadmap).unwrap();

        init_project_board_in(tmp.path(), Some("other".into())).unwrap();
        assert_eq!(load_board(&location).unwrap().name, "renamed");
    }

    #[test]
    fn board_is_found_from_nested_directories() {
        let tmp = tempfile::tempdir().unwrap();
        init_project_board_in(tmp.path(), None).unwrap();
        let nested = tmp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let location = locate_board(&nested).unwrap();
        assert_eq!(location.scope, BoardScope::Project);
        assert_eq!(
            location.path,
            tmp.path().join(".roadmap").join("roadmap.yml")
        );
    }

    #[test]
    fn items_survive_a_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let location = init_project_board_in(tmp.path(), None).unwrap();
        let mut roadmap = load_board(&location).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let mut item = RoadmapItem::new("x1".into(), "Automate".into(), 1, date, date);
        item.status = Status::InProgress;
        item.assignees = vec!["user1".into()];
        roadmap.add_item(item).unwrap();
        roadmap.settings.dark = false;
        save_board(&location, &roadmap).unwrap();

        let loaded = load_board(&location).unwrap();
        assert_eq!(loaded, roadmap);
        let raw = fs::read_to_string(&location.path).unwrap();
        assert!(raw.contains("status: In Progress"));
    }

    #[test]
    fn missing_settings_fall_back_to_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let location = BoardLocation {
            path: tmp.path().join("roadmap.yml"),
            scope: BoardScope::Global,
        };
        fs::write(
            &location.path,
            "name: old\npillars:\n  - id: 1\n    title: Pillar 01\n    description: ''\n    color: salmon\n",
        )
        .unwrap();
        let roadmap = load_board(&location).unwrap();
        assert_eq!(roadmap.pillars.len(), 1);
        assert!(roadmap.items.is_empty());
        assert_eq!(roadmap.settings.progress_step, 10);
    }
}
