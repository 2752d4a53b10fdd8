use std::sync::Arc;
use std::time::Duration;

use pollwatch::fs::RealFileSystem;
use pollwatch::watch::{watch, watch_with, Digest, WatchOptions};
use pollwatch_test_utils::fixtures::FileTree;
use pollwatch_test_utils::{init_tracing, next_result, with_timeout};

const INTERVAL: Duration = Duration::from_millis(50);
const WAIT: Duration = Duration::from_secs(5);
const QUIET: Duration = Duration::from_millis(400);

fn blake3_of(contents: &[u8]) -> Digest {
    Digest::Content(blake3::hash(contents))
}

#[tokio::test]
async fn first_interval_reports_the_baseline() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");
    tree.write("b.txt", "y");

    let mut session = watch(INTERVAL, [tree.path_str("a.txt"), tree.path_str("b.txt")]);

    let result = next_result(&mut session, WAIT)
        .await
        .expect("first sweep should report");
    assert!(result.old.is_empty());
    assert_eq!(result.new.len(), 2);
    assert_eq!(result.new[&tree.canonical("a.txt")], blake3_of(b"x"));
    assert_eq!(result.new[&tree.canonical("b.txt")], blake3_of(b"y"));

    // Nothing changes afterwards.
    assert!(next_result(&mut session, QUIET).await.is_none());

    session.stop().await;
}

#[tokio::test]
async fn no_sweep_before_the_first_interval() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");

    let mut session = watch(Duration::from_millis(500), [tree.path_str("a.txt")]);
    assert!(next_result(&mut session, Duration::from_millis(100)).await.is_none());
    assert!(session.current_hashes().is_empty());

    assert!(next_result(&mut session, WAIT).await.is_some());
    session.stop().await;
}

#[tokio::test]
async fn overwriting_one_file_changes_only_its_digest() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");
    tree.write("b.txt", "y");
    let a = tree.canonical("a.txt");
    let b = tree.canonical("b.txt");

    let mut session = watch(INTERVAL, [tree.path_str("a.txt"), tree.path_str("b.txt")]);
    next_result(&mut session, WAIT).await.expect("baseline");

    tree.write("a.txt", "z");
    let result = next_result(&mut session, WAIT)
        .await
        .expect("overwrite should report");

    assert_ne!(result.old[&a], result.new[&a]);
    assert_eq!(result.old[&b], result.new[&b]);
    assert_eq!(result.changed_paths(), vec![a.as_path()]);

    session.stop().await;
}

#[tokio::test]
async fn deleting_a_file_reports_even_without_content_changes() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");
    tree.write("b.txt", "y");
    let b = tree.canonical("b.txt");

    let mut session = watch(INTERVAL, [tree.path_str("a.txt"), tree.path_str("b.txt")]);
    next_result(&mut session, WAIT).await.expect("baseline");

    tree.remove("b.txt");
    let result = next_result(&mut session, WAIT)
        .await
        .expect("deletion should report");

    assert_eq!(result.old.len(), 2);
    assert_eq!(result.new.len(), 1);
    assert_eq!(result.changed_paths(), vec![b.as_path()]);

    session.stop().await;
}

#[tokio::test]
async fn creating_a_watched_file_reports() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");

    let mut session = watch(INTERVAL, [tree.path_str("a.txt"), tree.path_str("later.txt")]);
    let baseline = next_result(&mut session, WAIT).await.expect("baseline");
    assert_eq!(baseline.new.len(), 1);

    tree.write("later.txt", "hello");
    let result = next_result(&mut session, WAIT)
        .await
        .expect("new file should report");
    assert_eq!(result.new.len(), 2);

    session.stop().await;
}

#[tokio::test]
async fn empty_or_unresolvable_watch_list_never_fires() {
    init_tracing();

    let tree = FileTree::new();
    tree.mkdir("just-a-dir");

    let mut session = watch(
        INTERVAL,
        [tree.path_str("missing.txt"), tree.path_str("just-a-dir")],
    );
    assert!(next_result(&mut session, QUIET).await.is_none());

    session.stop().await;
}

#[tokio::test]
async fn update_set_takes_effect_on_the_next_tick() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");
    tree.write("b.txt", "y");

    let mut session = watch(INTERVAL, [tree.path_str("a.txt")]);
    next_result(&mut session, WAIT).await.expect("baseline");

    session
        .update_set([tree.path_str("a.txt"), tree.path_str("b.txt")])
        .await;

    let result = next_result(&mut session, WAIT)
        .await
        .expect("grown set should report");
    assert_eq!(result.old.len(), 1);
    assert_eq!(result.new.len(), 2);

    session.stop().await;
}

#[tokio::test]
async fn stop_twice_returns_immediately() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");

    let session = watch(INTERVAL, [tree.path_str("a.txt")]);
    with_timeout(session.stop()).await;
    with_timeout(session.stop()).await;
    assert!(session.is_stopped());
}

#[tokio::test]
async fn update_after_stop_is_dropped() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");

    let mut session = watch(INTERVAL, Vec::<String>::new());
    session.stop().await;

    with_timeout(session.update_set([tree.path_str("a.txt")])).await;

    // The loop has exited: the stream ends and nothing was hashed.
    assert!(with_timeout(session.recv()).await.is_none());
    assert!(session.current_hashes().is_empty());
}

#[tokio::test]
async fn concurrent_stop_and_update_from_many_handles() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");
    let file = tree.path_str("a.txt");

    let mut session = watch(INTERVAL, [file.clone()]);

    let mut tasks = Vec::new();
    for i in 0..8 {
        let handle = session.handle();
        let file = file.clone();
        tasks.push(tokio::spawn(async move {
            if i % 2 == 0 {
                handle.update_set([file]).await;
            }
            handle.stop().await;
        }));
    }

    for task in tasks {
        with_timeout(task).await.expect("control task panicked");
    }

    assert!(session.is_stopped());
    // Drain whatever was in flight; the stream must end.
    with_timeout(async { while session.recv().await.is_some() {} }).await;
}

#[tokio::test]
async fn handle_outlives_the_session() {
    init_tracing();

    let tree = FileTree::new();
    tree.write("a.txt", "x");

    let mut session = watch_with(
        WatchOptions {
            poll_interval: INTERVAL,
            workers: 1,
            notify_capacity: 4,
        },
        [tree.path_str("a.txt")],
        Arc::new(RealFileSystem),
    );
    next_result(&mut session, WAIT).await.expect("baseline");

    let handle = session.handle();
    drop(session);

    with_timeout(handle.update_set([tree.path_str("a.txt")])).await;
    with_timeout(handle.stop()).await;
    assert!(handle.is_stopped());
    assert_eq!(handle.current_hashes().len(), 1);
}
