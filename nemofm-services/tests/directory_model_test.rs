use nemofm_services::filesystem::ordering::compare_entries;
use nemofm_services::filesystem::{
    DirectoryEvent, DirectoryModel, EntryRole, EntryValue, FileSystemError, StoreEvent,
};
use nemofm_services::settings::BrowserSettings;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

fn names(model: &DirectoryModel) -> Vec<String> {
    model.entries().iter().map(|e| e.name().to_string()).collect()
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), name.as_bytes()).unwrap();
}

#[tokio::test]
async fn test_directories_first_and_hidden_excluded() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "b.txt");
    fs::create_dir(dir.path().join("A")).unwrap();
    touch(dir.path(), ".hidden");
    touch(dir.path(), "a.txt");

    let mut model = DirectoryModel::new();
    model.set_path(dir.path());
    let count = model.wait_for_scan().await;

    assert_eq!(count, 3);
    assert_eq!(names(&model), vec!["A", "a.txt", "b.txt"]);
    assert_eq!(model.data(0, EntryRole::IsDir), Some(EntryValue::Flag(true)));
    assert_eq!(
        model.data_by_name(2, "fileName"),
        Some(EntryValue::Text("b.txt".to_string()))
    );
    assert_eq!(model.data_by_name(2, "notARole"), None);
    assert_eq!(model.data(3, EntryRole::FileName), None);
}

#[tokio::test]
async fn test_observer_sees_sorted_state_at_every_insert() {
    let dir = tempfile::tempdir().unwrap();
    for i in 0..130 {
        touch(dir.path(), &format!("file-{:03}", (i * 37) % 130));
    }
    for i in 0..12 {
        fs::create_dir(dir.path().join(format!("dir-{}", i))).unwrap();
    }

    // Mirror the store from notifications alone and check it after each one.
    let mirror = Arc::new(Mutex::new(Vec::new()));
    let sink = mirror.clone();

    let mut model = DirectoryModel::with_settings(&BrowserSettings {
        batch_size: 7,
        channel_capacity: 2,
    });
    model.add_observer(move |event: &StoreEvent<'_>| {
        let mut mirror = sink.lock().unwrap();
        match event {
            StoreEvent::Reset { .. } => mirror.clear(),
            StoreEvent::Inserted { index, entry } => {
                mirror.insert(*index, (*entry).clone());
                assert!(mirror
                    .windows(2)
                    .all(|w| compare_entries(&w[0], &w[1]) != std::cmp::Ordering::Greater));
            },
        }
    });

    model.set_path(dir.path());
    assert_eq!(model.wait_for_scan().await, 142);

    let mirror = mirror.lock().unwrap();
    assert_eq!(mirror.as_slice(), model.entries());
    assert!(model.entries()[..12].iter().all(|e| e.is_dir()));
}

#[tokio::test]
async fn test_stale_scan_is_discarded() {
    let first = tempfile::tempdir().unwrap();
    for i in 0..200 {
        touch(first.path(), &format!("old-{}", i));
    }
    let second = tempfile::tempdir().unwrap();
    touch(second.path(), "new");

    let mut model = DirectoryModel::new();
    model.set_path(first.path());
    model.set_path(second.path());
    model.wait_for_scan().await;

    // Let any leftovers from the first scan arrive, then drain them.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    model.process_pending();

    assert_eq!(model.generation(), 2);
    assert_eq!(names(&model), vec!["new"]);
    assert_eq!(model.path(), Some(second.path()));
}

#[tokio::test]
async fn test_unreadable_path_lists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing");

    let mut model = DirectoryModel::new();
    let mut events = model.subscribe_events();
    model.set_path(&missing);
    assert_eq!(model.wait_for_scan().await, 0);
    assert!(model.is_empty());
    assert!(!model.is_scanning());

    assert!(matches!(events.try_recv(), Ok(DirectoryEvent::PathChanged { generation: 1, .. })));
    assert!(matches!(events.try_recv(), Ok(DirectoryEvent::ScanFailed { generation: 1, .. })));
}

#[tokio::test]
async fn test_rename_out_of_range() {
    let mut model = DirectoryModel::new();
    let result = model.rename(0, "newname");

    assert!(matches!(result, Err(FileSystemError::OutOfRange { index: 0, len: 0 })));
    assert!(model.is_empty());
    assert_eq!(model.generation(), 0);
}

#[tokio::test]
async fn test_rename_file_and_directory() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "draft.txt");
    fs::create_dir(dir.path().join("Old")).unwrap();

    let mut model = DirectoryModel::new();
    model.set_path(dir.path());
    model.wait_for_scan().await;
    assert_eq!(names(&model), vec!["Old", "draft.txt"]);

    let renamed = model.rename(1, "final.txt").unwrap();
    assert_eq!(renamed, dir.path().join("final.txt"));
    model.wait_for_scan().await;
    assert_eq!(names(&model), vec!["Old", "final.txt"]);

    model.rename(0, "New").unwrap();
    model.wait_for_scan().await;
    assert_eq!(names(&model), vec!["New", "final.txt"]);
    assert!(dir.path().join("New").is_dir());
}

#[tokio::test]
async fn test_failed_rename_leaves_listing() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "a.txt");
    touch(dir.path(), "b.txt");

    let mut model = DirectoryModel::new();
    model.set_path(dir.path());
    model.wait_for_scan().await;
    let generation = model.generation();

    assert!(matches!(model.rename(0, "b.txt"), Err(FileSystemError::Io(_))));
    assert!(matches!(model.rename(0, ""), Err(FileSystemError::InvalidName(_))));
    assert!(matches!(model.rename(0, "x/y"), Err(FileSystemError::InvalidName(_))));

    assert_eq!(model.generation(), generation);
    assert_eq!(names(&model), vec!["a.txt", "b.txt"]);
    assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "b.txt");
}

#[tokio::test]
async fn test_remove_collects_failures_and_rescans() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "keep.txt");
    touch(dir.path(), "drop.txt");
    fs::create_dir(dir.path().join("tree")).unwrap();
    touch(&dir.path().join("tree"), "leaf");

    let mut model = DirectoryModel::new();
    model.set_path(dir.path());
    model.wait_for_scan().await;
    assert_eq!(model.len(), 3);

    let report = model.remove(&[
        dir.path().join("drop.txt"),
        dir.path().join("ghost.txt"),
        dir.path().join("tree"),
    ]);

    assert!(!report.is_success());
    assert_eq!(report.removed.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, dir.path().join("ghost.txt"));

    model.wait_for_scan().await;
    assert_eq!(names(&model), vec!["keep.txt"]);
}

#[tokio::test]
async fn test_refresh_picks_up_changes() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "one");

    let mut model = DirectoryModel::new();
    model.refresh();
    assert_eq!(model.generation(), 0);

    model.set_path(dir.path());
    model.wait_for_scan().await;
    touch(dir.path(), "two");
    model.refresh();
    model.wait_for_scan().await;

    assert_eq!(names(&model), vec!["one", "two"]);
}
