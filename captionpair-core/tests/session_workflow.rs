use std::path::{Path, PathBuf};

use tempfile::TempDir;

use captionpair_core::{
    Config, DeletePolicy, ErrorKind,
    controller::{Action, ActionOutcome, Session},
    model::{CaptionState, FileHash, Side},
    operators::LocalFileSystem,
};

struct Dirs {
    _root: TempDir,
    left: PathBuf,
    right: PathBuf,
}

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn dirs() -> Dirs {
    let root = TempDir::new().unwrap();
    let left = root.path().join("left");
    let right = root.path().join("right");
    std::fs::create_dir_all(&left).unwrap();
    std::fs::create_dir_all(&right).unwrap();

    write(&left, "cat1.jpg", "c1");
    write(&left, "cat1.txt", "first cat");
    write(&left, "dog.png", "d");
    write(&left, "notes.md", "ignored");
    write(&left, "orphan.txt", "no media");
    write(&right, "cat1.jpg", "c1");
    write(&right, "cat2.gif", "c2");

    Dirs {
        _root: root,
        left,
        right,
    }
}

fn session(dirs: &Dirs, policy: DeletePolicy) -> Session<LocalFileSystem> {
    let config = Config {
        delete_policy: policy,
        ..Config::default()
    }
    .with_directories(
        Some(dirs.left.display().to_string()),
        Some(dirs.right.display().to_string()),
    );
    Session::new(config, LocalFileSystem::new(policy))
}

fn names(session: &Session<LocalFileSystem>) -> Vec<String> {
    session
        .store()
        .iter()
        .map(|e| e.base_name.to_string())
        .collect()
}

#[tokio::test]
async fn filter_patterns_select_entries() {
    let dirs = dirs();
    let mut session = session(&dirs, DeletePolicy::Delete);

    session.read_directories("").await.unwrap();
    assert_eq!(names(&session), ["cat1", "cat2", "dog"]);

    session.read_directories("cat*").await.unwrap();
    assert_eq!(names(&session), ["cat1", "cat2"]);

    session.read_directories("*.gif").await.unwrap();
    assert_eq!(names(&session), ["cat2"]);

    session.read_directories("*og*").await.unwrap();
    assert_eq!(names(&session), ["dog"]);
}

#[tokio::test]
async fn table_is_rebuilt_on_every_read() {
    let dirs = dirs();
    let mut session = session(&dirs, DeletePolicy::Delete);
    session.read_directories("").await.unwrap();

    let dog = FileHash::of("dog");
    session.edit_caption(dog, Side::Left, "unsaved").unwrap();
    write(&dirs.right, "bird.mov", "b");

    session.read_directories("").await.unwrap();
    assert_eq!(names(&session), ["bird", "cat1", "cat2", "dog"]);
    // Unsaved edits do not survive a re-read
    assert_eq!(session.caption_text(dog, Side::Left), "");
}

#[tokio::test]
async fn trash_policy_moves_files_aside() {
    let dirs = dirs();
    let mut session = session(&dirs, DeletePolicy::Trash);
    session.read_directories("").await.unwrap();
    let cat1 = FileHash::of("cat1");

    session.delete(cat1, Side::Left).await.unwrap();

    let trash = dirs.left.join("trash");
    assert!(trash.join("cat1.jpg").exists());
    assert!(trash.join("cat1.txt").exists());
    assert!(!dirs.left.join("cat1.jpg").exists());

    let entry = session.entry(cat1).unwrap();
    assert!(entry.left.is_empty());
    assert!(entry.right.media.is_some());

    // The trash directory is not a media file and never shows up
    session.read_directories("").await.unwrap();
    assert!(session.entry(cat1).unwrap().left.is_empty());
}

#[tokio::test]
async fn rename_then_copy_back_and_forth() {
    let dirs = dirs();
    let mut session = session(&dirs, DeletePolicy::Delete);
    session.read_directories("").await.unwrap();
    let cat2 = FileHash::of("cat2");

    let outcome = session
        .dispatch(Action::Rename {
            hash: cat2,
            side: Side::Right,
            new_base_name: "kitten".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        outcome,
        ActionOutcome::Renamed {
            new_base_name: Some("kitten".into())
        }
    );
    assert!(dirs.right.join("kitten.gif").exists());

    // The hash still resolves after the rename
    let outcome = session
        .dispatch(Action::CopyToOtherSide {
            hash: cat2,
            side: Side::Right,
        })
        .await
        .unwrap();
    assert_eq!(outcome, ActionOutcome::Copied { to: Side::Left });
    assert!(dirs.left.join("kitten.gif").exists());
    assert_eq!(
        std::fs::read_to_string(dirs.left.join("kitten.txt")).unwrap(),
        ""
    );

    let err = session
        .dispatch(Action::Rename {
            hash: cat2,
            side: Side::Left,
            new_base_name: "dog".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(dirs.left.join("kitten.gif").exists());
}

#[tokio::test]
async fn caption_clipboard_and_bulk_save() {
    let dirs = dirs();
    let mut session = session(&dirs, DeletePolicy::Delete);
    session.read_directories("").await.unwrap();
    let cat1 = FileHash::of("cat1");
    let dog = FileHash::of("dog");

    for action in [
        Action::CopyCaptionFrom {
            hash: cat1,
            side: Side::Left,
        },
        Action::PasteCaptionTo {
            hash: cat1,
            side: Side::Right,
        },
        Action::EditCaption {
            hash: dog,
            side: Side::Left,
            text: "a dog".into(),
        },
    ] {
        session.dispatch(action).await.unwrap();
    }

    assert_eq!(session.caption_state(cat1, Side::Right), CaptionState::Dirty);
    assert_eq!(
        session.dispatch(Action::SaveDirtyCaptions).await.unwrap(),
        ActionOutcome::CaptionsSaved { count: 2 }
    );

    assert_eq!(
        std::fs::read_to_string(dirs.right.join("cat1.txt")).unwrap(),
        "first cat"
    );
    assert_eq!(
        std::fs::read_to_string(dirs.left.join("dog.txt")).unwrap(),
        "a dog"
    );

    let err = session.dispatch(Action::SaveDirtyCaptions).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailure);
}

#[tokio::test]
async fn unknown_hash_is_not_found() {
    let dirs = dirs();
    let mut session = session(&dirs, DeletePolicy::Delete);
    session.read_directories("").await.unwrap();

    let err = session
        .delete(FileHash::of("nothing"), Side::Left)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
