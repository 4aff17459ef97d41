//! Versioned, persisted undo history over canvas snapshots.
//!
//! The in-memory monotonic counter owned by [`StepHistory`] is the source of
//! truth for step indices; the session directory is written as a side effect
//! and read exactly once at [`StepHistory::start`] to reseed the counter, so
//! files left behind by an aborted process are harmless.

use std::fs;
use std::path::{Path, PathBuf};

use rand::Rng;
use tracing::debug;

use crate::canvas::{Canvas, Snapshot};
use crate::color::Background;
use crate::draw::Primitive;
use crate::error::{ArtgenError, ArtgenResult};

const SNAPSHOT_EXT: &str = "jpg";
const SEED_LABEL: &str = "start";

/// One committed mutation: its index, the label of the primitive that
/// produced it, and the snapshot taken right after it.
pub struct Step {
    index: u32,
    label: String,
    snapshot: Snapshot,
}

impl Step {
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Start an interactive session on a fresh white canvas, persisting under a
/// new session-scoped directory inside `store_root`.
pub fn start_session(
    width: u32,
    height: u32,
    store_root: impl AsRef<Path>,
) -> ArtgenResult<StepHistory> {
    let canvas = Canvas::new(Background::White, width, height)?;
    let session = format!("session-{:08x}", rand::rng().random::<u32>());
    StepHistory::start(canvas, store_root.as_ref().join(session))
}

/// An append-only sequence of steps over one live canvas, with truncating
/// rollback. Owns the in-memory snapshots; the session directory holds one
/// lossy raster file per step, named `{label}{index:02}.jpg`.
pub struct StepHistory {
    dir: PathBuf,
    canvas: Canvas,
    steps: Vec<Step>,
    next_index: u32,
}

impl StepHistory {
    /// Seed the history with the pre-edit canvas as step 0 and persist it.
    ///
    /// `dir` is created if missing and scanned once for existing snapshot
    /// files; the counter resumes past the highest index found, so a session
    /// restarted into a leftover directory never reuses an index.
    pub fn start(canvas: Canvas, dir: impl Into<PathBuf>) -> ArtgenResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| {
            ArtgenError::persistence(format!("create session dir '{}': {e}", dir.display()))
        })?;
        let next_index = scan_max_index(&dir)?.map_or(0, |max| max + 1);

        let mut history = Self {
            dir,
            canvas,
            steps: Vec::new(),
            next_index,
        };
        history.commit(SEED_LABEL)?;
        Ok(history)
    }

    /// Apply a primitive to the live canvas and commit the result.
    pub fn apply_and_commit(&mut self, primitive: &Primitive) -> ArtgenResult<u32> {
        primitive.apply(&mut self.canvas);
        self.commit(primitive.label())
    }

    /// Snapshot the live canvas, persist it, and append the step. Returns
    /// the new step index; exactly one higher than the previous one.
    pub fn commit(&mut self, label: &str) -> ArtgenResult<u32> {
        let index = self.next_index;
        let snapshot = self.canvas.snapshot();
        let path = self.snapshot_path(label, index);
        let bytes = snapshot.to_jpeg()?;
        fs::write(&path, &bytes).map_err(|e| {
            ArtgenError::persistence(format!("write snapshot '{}': {e}", path.display()))
        })?;

        self.steps.push(Step {
            index,
            label: label.to_string(),
            snapshot,
        });
        self.next_index = index + 1;
        debug!(index, label, "committed step");
        Ok(index)
    }

    /// Undo exactly the most recent committed step: delete its persisted
    /// file, restore the canvas from the previous snapshot, decrement the
    /// counter. With only the seed step left this is a no-op.
    ///
    /// A missing persisted file fails with `Persistence` before any
    /// in-memory state changes; on-disk and in-memory history must not
    /// silently diverge.
    pub fn rollback(&mut self) -> ArtgenResult<u32> {
        if self.steps.len() <= 1 {
            return Ok(self.current_index());
        }

        let (undone_index, undone_label, path) = {
            let last = self.steps.last().expect("guarded: at least two steps");
            (
                last.index,
                last.label.clone(),
                self.snapshot_path(&last.label, last.index),
            )
        };
        fs::remove_file(&path).map_err(|e| {
            ArtgenError::persistence(format!("delete snapshot '{}': {e}", path.display()))
        })?;

        self.steps.pop();
        let previous = self.steps.last().expect("seed step remains");
        self.canvas.restore(&previous.snapshot)?;
        self.next_index = undone_index;
        debug!(index = undone_index, label = %undone_label, "rolled back step");
        Ok(previous.index)
    }

    /// Interactive-surface name for [`Self::rollback`].
    pub fn undo(&mut self) -> ArtgenResult<u32> {
        self.rollback()
    }

    pub fn current_index(&self) -> u32 {
        self.steps.last().map_or(0, |step| step.index)
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut Canvas {
        &mut self.canvas
    }

    /// Session directory holding the persisted snapshots.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// End the session, removing every persisted snapshot and the session
    /// directory itself. Only this session's directory is touched.
    pub fn end(self) -> ArtgenResult<()> {
        fs::remove_dir_all(&self.dir).map_err(|e| {
            ArtgenError::persistence(format!("clear session dir '{}': {e}", self.dir.display()))
        })
    }

    fn snapshot_path(&self, label: &str, index: u32) -> PathBuf {
        self.dir.join(format!("{label}{index:02}.{SNAPSHOT_EXT}"))
    }
}

/// Highest numeric filename suffix among persisted snapshots, if any.
fn scan_max_index(dir: &Path) -> ArtgenResult<Option<u32>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        ArtgenError::persistence(format!("scan session dir '{}': {e}", dir.display()))
    })?;

    let mut max = None;
    for entry in entries {
        let entry = entry.map_err(|e| {
            ArtgenError::persistence(format!("scan session dir '{}': {e}", dir.display()))
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some(SNAPSHOT_EXT) {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some(index) = parse_step_index(stem) {
            max = Some(max.map_or(index, |m: u32| m.max(index)));
        }
    }
    Ok(max)
}

/// Numeric suffix of a snapshot file stem, e.g. `background07` -> 7.
fn parse_step_index(stem: &str) -> Option<u32> {
    let label = stem.trim_end_matches(|c: char| c.is_ascii_digit());
    stem[label.len()..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "artgen_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    fn snapshot_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn parse_step_index_handles_suffixes() {
        assert_eq!(parse_step_index("background07"), Some(7));
        assert_eq!(parse_step_index("start00"), Some(0));
        assert_eq!(parse_step_index("line12"), Some(12));
        assert_eq!(parse_step_index("nodigits"), None);
        assert_eq!(parse_step_index(""), None);
    }

    #[test]
    fn start_seeds_step_zero_and_persists_it() {
        let root = temp_root("seed");
        let history = start_session(32, 24, &root).unwrap();
        assert_eq!(history.current_index(), 0);
        assert_eq!(snapshot_files(history.dir()), vec!["start00.jpg"]);
        history.end().unwrap();
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn commit_is_monotonic_and_rollback_inverts_it() {
        let root = temp_root("monotonic");
        let mut history = start_session(48, 32, &root).unwrap();
        let before = history.canvas().snapshot();

        let idx = history
            .apply_and_commit(&Primitive::Background)
            .unwrap();
        assert_eq!(idx, 1);
        assert_eq!(history.current_index(), 1);
        assert_eq!(snapshot_files(history.dir()).len(), 2);

        let idx = history.rollback().unwrap();
        assert_eq!(idx, 0);
        assert_eq!(history.current_index(), 0);
        assert_eq!(snapshot_files(history.dir()), vec!["start00.jpg"]);

        // Canvas content is back to the pre-commit state, pixel for pixel.
        assert!(history.canvas().snapshot() == before);

        history.end().unwrap();
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn rollback_at_seed_is_a_noop() {
        let root = temp_root("noop");
        let mut history = start_session(16, 16, &root).unwrap();
        let before = history.canvas().snapshot();

        assert_eq!(history.rollback().unwrap(), 0);
        assert_eq!(history.current_index(), 0);
        assert!(history.canvas().snapshot() == before);
        assert_eq!(snapshot_files(history.dir()).len(), 1);

        history.end().unwrap();
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn rollback_with_missing_file_fails_without_forgetting_the_step() {
        let root = temp_root("missing");
        let mut history = start_session(16, 16, &root).unwrap();
        history.apply_and_commit(&Primitive::Ellipse).unwrap();

        let stray = history.dir().join("ellipse01.jpg");
        fs::remove_file(&stray).unwrap();

        let err = history.rollback().unwrap_err();
        assert!(matches!(err, ArtgenError::Persistence(_)));
        assert_eq!(history.current_index(), 1);

        history.end().unwrap();
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn counter_reseeds_past_leftover_files() {
        let root = temp_root("reseed");
        let dir = root.join("session-fixed");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("background07.jpg"), b"stale").unwrap();

        let canvas = Canvas::new(Background::White, 16, 16).unwrap();
        let mut history = StepHistory::start(canvas, &dir).unwrap();
        assert_eq!(history.current_index(), 8);
        assert_eq!(history.commit("line").unwrap(), 9);

        history.end().unwrap();
        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn end_removes_the_session_directory() {
        let root = temp_root("end");
        let mut history = start_session(16, 16, &root).unwrap();
        history.apply_and_commit(&Primitive::Background).unwrap();
        let dir = history.dir().to_path_buf();

        history.end().unwrap();
        assert!(!dir.exists());
        let _ = fs::remove_dir_all(&root);
    }
}
