//! Integration tests for treemirror
//!
//! These tests drive whole cycles and the run loop against real directory
//! trees and check the replica, the operation log and the exit status.

use proptest::prelude::*;
use rstest::rstest;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use treemirror_config::ConfigBuilder;
use treemirror_sync::runner::{SOURCE_LOST_MESSAGE, STOPPED_MESSAGE};
use treemirror_sync::{FileLog, RunOutcome, Runner, SyncCycle, COMPLETE_MESSAGE};
use treemirror_tests::{generate_test_data, snapshot, write_file, MirrorFixture};
use treemirror_types::OperationLog;

#[test]
fn test_empty_source_creates_empty_replica() {
    let fixture = MirrorFixture::new();

    let report = fixture.cycle().run();

    assert!(fixture.replica.is_dir());
    assert!(snapshot(&fixture.replica).is_empty());
    assert!(report.complete);
    assert_eq!(
        fixture.log.lines(),
        vec![
            format!("Created replica directory: {}", fixture.replica.display()),
            COMPLETE_MESSAGE.to_string(),
        ]
    );
}

#[test]
fn test_new_file_is_copied() {
    let fixture = MirrorFixture::new();
    fs::create_dir(&fixture.replica).unwrap();
    fixture.source_file("a.txt", b"X");

    let report = fixture.cycle().run();

    assert_eq!(fs::read(fixture.replica.join("a.txt")).unwrap(), b"X");
    assert_eq!(fixture.log.count_prefixed("Copied file: "), 1);
    assert!(fixture.log.contains(COMPLETE_MESSAGE));
    assert_eq!(report.stats.files_copied, 1);
    assert_eq!(report.stats.bytes_copied, 1);
}

#[test]
fn test_identical_file_is_left_alone() {
    let fixture = MirrorFixture::new();
    fixture.source_file("a.txt", b"X");
    fixture.replica_file("a.txt", b"X");

    let report = fixture.cycle().run();

    assert!(!report.changed());
    assert_eq!(report.stats.files_unchanged, 1);
    assert!(fixture.log.lines().is_empty());
}

#[test]
fn test_stale_file_is_removed() {
    let fixture = MirrorFixture::new();
    let stale = fixture.replica_file("stale.txt", b"old");

    let report = fixture.cycle().run();

    assert!(!stale.exists());
    assert_eq!(report.stats.entries_removed, 1);
    assert!(fixture
        .log
        .contains(&format!("Removed: {}", stale.display())));
}

#[rstest]
#[case::same_length(generate_test_data(64 * 1024, 1))]
#[case::shorter(generate_test_data(1024, 0))]
#[case::empty(Vec::new())]
fn test_changed_content_is_replaced(#[case] stale: Vec<u8>) {
    let fixture = MirrorFixture::new();
    let content = generate_test_data(64 * 1024, 0);
    fixture.source_file("data/blob.bin", &content);
    fixture.replica_file("data/blob.bin", &stale);

    let report = fixture.cycle().run();

    assert_eq!(report.stats.files_copied, 1);
    assert_eq!(fs::read(fixture.replica.join("data/blob.bin")).unwrap(), content);
}

#[test]
fn test_full_tree_converges_in_one_cycle() {
    let fixture = MirrorFixture::new();
    fixture.source_file("top.txt", b"top");
    fixture.source_file("docs/readme.md", b"# readme");
    fixture.source_file("docs/guide/intro.md", b"intro");
    fixture.source_file("data/2024/jan.csv", &generate_test_data(8192, 3));
    fixture.source_dir("empty/nested");
    fixture.replica_file("docs/old.md", b"old");
    fixture.replica_file("gone/deep/file.txt", b"gone");
    fixture.replica_file("top.txt", b"outdated");

    let report = fixture.cycle().run();

    fixture.assert_mirrored();
    assert_eq!(report.stats.errors, 0);
    assert!(report.complete);
}

#[test]
fn test_second_cycle_is_a_no_op() {
    let fixture = MirrorFixture::new();
    fixture.source_file("a/b/c.txt", b"c");
    fixture.source_file("d.txt", b"d");
    fixture.replica_file("x.txt", b"x");
    let cycle = fixture.cycle();

    assert!(cycle.run().changed());
    let before = snapshot(&fixture.replica);
    fixture.log.clear();

    let report = cycle.run();

    assert!(!report.changed());
    assert!(!report.complete);
    assert!(fixture.log.lines().is_empty());
    assert_eq!(snapshot(&fixture.replica), before);
}

#[test]
fn test_source_is_never_modified() {
    let fixture = MirrorFixture::new();
    fixture.source_file("keep/a.txt", b"a");
    fixture.source_file("b.txt", b"b");
    fixture.replica_file("keep/a.txt", b"changed in replica");
    fixture.replica_file("extra/z.txt", b"z");
    let before = snapshot(&fixture.source);

    fixture.cycle().run();

    assert_eq!(snapshot(&fixture.source), before);
}

#[test]
fn test_kind_conflicts_resolve_to_source_kind() {
    let fixture = MirrorFixture::new();
    fixture.source_dir("was_file");
    fixture.source_file("was_dir", b"now a file");
    fixture.replica_file("was_file", b"file in replica");
    fixture.replica_file("was_dir/inner.txt", b"inner");

    let report = fixture.cycle().run();

    fixture.assert_mirrored();
    assert_eq!(report.stats.errors, 0);
    assert!(fixture.replica.join("was_file").is_dir());
    assert_eq!(fs::read(fixture.replica.join("was_dir")).unwrap(), b"now a file");
}

#[cfg(unix)]
#[test]
fn test_source_links_are_not_mirrored() {
    let fixture = MirrorFixture::new();
    let outside = write_file(fixture.temp_dir.path(), "outside/secret.txt", b"secret");
    fixture.source_file("real.txt", b"real");
    std::os::unix::fs::symlink(&outside, fixture.source.join("link.txt")).unwrap();
    std::os::unix::fs::symlink(outside.parent().unwrap(), fixture.source.join("link_dir"))
        .unwrap();

    let report = fixture.cycle().run();

    fixture.assert_mirrored();
    assert_eq!(report.stats.entries_skipped, 2);
    assert!(fs::symlink_metadata(fixture.replica.join("link.txt")).is_err());
    assert!(fs::symlink_metadata(fixture.replica.join("link_dir")).is_err());
}

#[test]
fn test_file_log_lines_are_timestamped() {
    let fixture = MirrorFixture::new();
    let log_path = fixture.temp_dir.path().join("sync.log");
    fixture.source_file("a.txt", b"X");

    {
        let log: Arc<dyn OperationLog> =
            Arc::new(FileLog::open(&log_path).unwrap().with_echo(false));
        SyncCycle::new(&fixture.source, &fixture.replica, log).run();
    }

    let contents = fs::read_to_string(&log_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);

    // "[YYYY-MM-DD HH:MM:SS] "
    for line in &lines {
        let stamp = line.as_bytes();
        assert_eq!(stamp[0], b'[');
        assert_eq!(&line[5..6], "-");
        assert_eq!(&line[11..12], " ");
        assert_eq!(&line[14..15], ":");
        assert_eq!(&line[20..22], "] ");
        assert!(line[1..5].chars().all(|c| c.is_ascii_digit()));
    }
    assert!(lines[0][22..].starts_with("Created replica directory: "));
    assert!(lines[1][22..].starts_with("Copied file: "));
    assert_eq!(&lines[2][22..], COMPLETE_MESSAGE);
}

#[test]
fn test_file_log_appends_across_runs() {
    let fixture = MirrorFixture::new();
    let log_path = fixture.temp_dir.path().join("sync.log");

    for _ in 0..2 {
        let log = FileLog::open(&log_path).unwrap().with_echo(false);
        log.log("run");
    }

    let contents = fs::read_to_string(&log_path).unwrap();
    assert_eq!(contents.lines().count(), 2);
}

#[test]
fn test_config_file_layer() {
    let fixture = MirrorFixture::new();
    let config_path = fixture.temp_dir.path().join("treemirror.json");
    let document = serde_json::json!({
        "paths": {
            "source": fixture.source,
            "replica": fixture.replica,
            "log_file": fixture.temp_dir.path().join("sync.log"),
        },
        "sync": { "interval_secs": 15 },
        "logging": { "echo_stdout": false, "level": "info" },
    });
    fs::write(&config_path, serde_json::to_vec_pretty(&document).unwrap()).unwrap();

    let config = ConfigBuilder::new()
        .add_defaults()
        .add_source_file(&config_path)
        .build()
        .unwrap();

    assert_eq!(config.paths.source, fixture.source);
    assert_eq!(config.sync.interval.get(), 15);
    assert!(!config.logging.echo_stdout);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_config_rejects_log_inside_replica() {
    let fixture = MirrorFixture::new();

    let result = ConfigBuilder::new()
        .add_defaults()
        .with_paths(
            &fixture.source,
            &fixture.replica,
            &fixture.replica.join("sync.log"),
        )
        .with_interval(5)
        .build();

    assert!(result.is_err());
}

#[tokio::test]
async fn test_run_loop_repeats_until_cancelled() {
    let fixture = MirrorFixture::new();
    fixture.source_file("a.txt", b"X");
    let shutdown = CancellationToken::new();
    let runner = Runner::new(fixture.cycle(), Duration::from_millis(50), shutdown.clone());

    let handle = tokio::spawn(runner.run());
    tokio::time::sleep(Duration::from_millis(100)).await;
    fixture.source_file("b.txt", b"Y");
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.cancel();

    let outcome = timeout(Duration::from_secs(10), handle)
        .await
        .expect("run loop did not stop")
        .unwrap();

    assert_eq!(outcome, RunOutcome::Cancelled);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(fs::read(fixture.replica.join("b.txt")).unwrap(), b"Y");
    assert_eq!(fixture.log.count_prefixed("Starting folder synchronization."), 1);
    assert_eq!(fixture.log.lines().last().unwrap(), STOPPED_MESSAGE);
}

#[tokio::test]
async fn test_source_deleted_mid_run_stops_with_failure() {
    let fixture = MirrorFixture::new();
    fixture.source_file("a.txt", b"X");
    let runner = Runner::new(
        fixture.cycle(),
        Duration::from_millis(200),
        CancellationToken::new(),
    );

    let handle = tokio::spawn(runner.run());
    for _ in 0..100 {
        if fixture.log.contains(COMPLETE_MESSAGE) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    fs::remove_dir_all(&fixture.source).unwrap();

    let outcome = timeout(Duration::from_secs(10), handle)
        .await
        .expect("run loop did not stop")
        .unwrap();

    assert_eq!(outcome, RunOutcome::SourceInvalid);
    assert_eq!(outcome.exit_code(), 1);
    assert!(fixture.log.contains("Error: Source path does not exist."));
    assert!(fixture.log.contains(SOURCE_LOST_MESSAGE));
    assert_eq!(fixture.log.lines().last().unwrap(), STOPPED_MESSAGE);
    assert_eq!(fs::read(fixture.replica.join("a.txt")).unwrap(), b"X");
}

#[tokio::test]
async fn test_source_that_is_a_file_fails_at_startup() {
    let fixture = MirrorFixture::new();
    let not_a_dir = write_file(fixture.temp_dir.path(), "plain.txt", b"p");
    let cycle = SyncCycle::new(&not_a_dir, &fixture.replica, fixture.log.clone());

    let outcome = Runner::new(cycle, Duration::from_secs(1), CancellationToken::new())
        .run()
        .await;

    assert_eq!(outcome, RunOutcome::SourceInvalid);
    assert!(fixture.log.contains("Error: Source path is not a directory."));
    assert!(!fixture.replica.exists());
}

/// Names used for generated trees; directories and files share some names so
/// generated replicas can hold entries of the wrong kind.
const DIR_NAMES: &[&str] = &["d0", "d1", "f0"];
const FILE_NAMES: &[&str] = &["f0", "f1", "f2", "d1"];

fn relative_path() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec!["", "d0", "d1", "d0/d1"]),
        prop::sample::select(vec!["f1", "f2", "f3"]),
    )
        .prop_map(|(dir, file)| {
            if dir.is_empty() {
                file.to_string()
            } else {
                format!("{}/{}", dir, file)
            }
        })
}

fn replica_path() -> impl Strategy<Value = String> {
    (
        prop::sample::select(vec![None, Some(DIR_NAMES[0]), Some(DIR_NAMES[1]), Some(DIR_NAMES[2])]),
        prop::sample::select(FILE_NAMES.to_vec()),
    )
        .prop_map(|(dir, file)| match dir {
            Some(dir) => format!("{}/{}", dir, file),
            None => file.to_string(),
        })
}

/// Best-effort write; generated paths may collide with existing entries
fn try_write(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return;
        }
    }
    let _ = fs::write(path, content);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_one_cycle_converges(
        source_files in prop::collection::btree_map(relative_path(), prop::collection::vec(any::<u8>(), 0..64), 0..8),
        replica_files in prop::collection::btree_map(replica_path(), prop::collection::vec(any::<u8>(), 0..64), 0..8),
    ) {
        let fixture = MirrorFixture::new();
        for (relative, content) in &source_files {
            fixture.source_file(relative, content);
        }
        fs::create_dir(&fixture.replica).unwrap();
        for (relative, content) in &replica_files {
            try_write(&fixture.replica, relative, content);
        }
        let cycle = fixture.cycle();

        let first = cycle.run();
        prop_assert_eq!(first.stats.errors, 0);
        prop_assert_eq!(snapshot(&fixture.source), snapshot(&fixture.replica));

        let second = cycle.run();
        prop_assert!(!second.changed());
    }
}
