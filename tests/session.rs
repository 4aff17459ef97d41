use std::path::PathBuf;

use artgen::{Primitive, start_session};

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

#[test]
fn commit_then_undo_round_trips_disk_and_canvas() {
    let root = temp_root("flow");
    let mut history = start_session(540, 960, &root).unwrap();
    assert_eq!(history.current_index(), 0);
    let before = history.canvas().snapshot();

    let idx = history.apply_and_commit(&Primitive::Background).unwrap();
    assert_eq!(idx, 1);
    let persisted = history.dir().join("background01.jpg");
    assert!(persisted.exists());

    let idx = history.rollback().unwrap();
    assert_eq!(idx, 0);
    assert!(!persisted.exists());
    assert!(history.canvas().snapshot() == before);

    let dir = history.dir().to_path_buf();
    history.end().unwrap();
    assert!(!dir.exists());
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn interleaved_commits_and_undo_keep_indices_contiguous() {
    let root = temp_root("contiguous");
    let mut history = start_session(64, 48, &root).unwrap();

    assert_eq!(history.apply_and_commit(&Primitive::Ellipse).unwrap(), 1);
    assert_eq!(
        history
            .apply_and_commit(&Primitive::Points { confined: true })
            .unwrap(),
        2
    );
    assert_eq!(
        history.apply_and_commit(&Primitive::Background).unwrap(),
        3
    );

    assert_eq!(history.rollback().unwrap(), 2);
    // A fresh commit reuses the rolled-back slot; indices stay contiguous.
    assert_eq!(
        history.apply_and_commit(&Primitive::Ellipse).unwrap(),
        3
    );

    let files = std::fs::read_dir(history.dir()).unwrap().count();
    assert_eq!(files, 4, "start + three live steps");

    history.end().unwrap();
    let _ = std::fs::remove_dir_all(&root);
}

#[test]
fn session_canvas_is_editable_through_the_accessor() {
    let root = temp_root("accessor");
    let mut history = start_session(32, 32, &root).unwrap();

    Primitive::RegularPolygon.apply(history.canvas_mut());
    let idx = history.commit("polygon").unwrap();
    assert_eq!(idx, 1);
    assert!(history.dir().join("polygon01.jpg").exists());

    history.end().unwrap();
    let _ = std::fs::remove_dir_all(&root);
}
