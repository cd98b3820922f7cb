use std::fs;
use std::path::Path;

use kiln_core::lockfile::{load_lock_at, save_lock_at};
use kiln_core::{KilnfileLock, LocalRelease, ReleaseId, ReleaseLock, Stemcell};
use kiln_fetcher::{hash, LocalDirectorySource, MultiReleaseSource, ReleaseSource};
use kiln_lock::{sync_with_local, update_release, FileLockStore, UpdateOutcome, UpdateRequest};
use tempfile::TempDir;

fn seed_lock(path: &Path, sha1: &str) -> KilnfileLock {
    let lock = KilnfileLock {
        releases: vec![
            ReleaseLock {
                name: "bpm".into(),
                version: "1.1".into(),
                remote_source: "local".into(),
                remote_path: "bpm-1.1.tgz".into(),
                sha1: "b".into(),
            },
            ReleaseLock {
                name: "uaa".into(),
                version: "1.0".into(),
                remote_source: "local".into(),
                remote_path: "uaa-1.0.tgz".into(),
                sha1: sha1.into(),
            },
        ],
        stemcell: Stemcell {
            os: "ubuntu-xenial".into(),
            version: "621.55".into(),
        },
    };
    save_lock_at(path, &lock).expect("seed lock");
    lock
}

fn local_sources(root: &Path) -> MultiReleaseSource {
    let source: Box<dyn ReleaseSource> =
        Box::new(LocalDirectorySource::new(root).expect("local source"));
    MultiReleaseSource::new(vec![source], false)
}

#[test]
fn update_to_new_version_rewrites_lock_file() {
    let store_dir = TempDir::new().expect("store");
    let releases = TempDir::new().expect("releases");
    let work = TempDir::new().expect("work");
    fs::write(store_dir.path().join("uaa-2.0.tgz"), b"uaa two").unwrap();

    let lock_path = work.path().join("Kilnfile.lock");
    let lock = seed_lock(&lock_path, "aaa");
    let request = UpdateRequest {
        name: "uaa".into(),
        version: "2.0".into(),
        releases_dir: releases.path().to_path_buf(),
        concurrency: 0,
    };

    let (_, outcome) = update_release(
        &lock,
        &local_sources(store_dir.path()),
        &request,
        &FileLockStore::new(&lock_path),
    )
    .expect("update");
    assert!(matches!(outcome, UpdateOutcome::Committed { .. }));

    let on_disk = load_lock_at(&lock_path).expect("reload");
    assert_eq!(on_disk.releases[0], lock.releases[0]);
    assert_eq!(on_disk.releases[1].version, "2.0");
    assert_eq!(on_disk.releases[1].sha1, hash::bytes_sha1(b"uaa two"));
    assert!(releases.path().join("uaa-2.0.tgz").exists());
}

#[test]
fn unchanged_update_leaves_file_bytes_alone() {
    let store_dir = TempDir::new().expect("store");
    let releases = TempDir::new().expect("releases");
    let work = TempDir::new().expect("work");
    fs::write(store_dir.path().join("uaa-1.0.tgz"), b"uaa one").unwrap();

    let lock_path = work.path().join("Kilnfile.lock");
    let lock = seed_lock(&lock_path, &hash::bytes_sha1(b"uaa one"));
    let before = fs::read(&lock_path).unwrap();

    let request = UpdateRequest {
        name: "uaa".into(),
        version: "1.0".into(),
        releases_dir: releases.path().to_path_buf(),
        concurrency: 0,
    };
    let (_, outcome) = update_release(
        &lock,
        &local_sources(store_dir.path()),
        &request,
        &FileLockStore::new(&lock_path),
    )
    .expect("update");

    assert_eq!(outcome.to_string(), "No changes made to uaa");
    assert_eq!(fs::read(&lock_path).unwrap(), before);
}

#[test]
fn sync_with_local_persists_target_paths() {
    let work = TempDir::new().expect("work");
    let lock_path = work.path().join("Kilnfile.lock");
    let lock = seed_lock(&lock_path, "aaa");

    let template = kiln_template::PathTemplate::parse(
        "{{ name }}/{{ name }}-{{ version }}-{{ stemcell_os }}-{{ stemcell_version }}.tgz",
    )
    .expect("template");
    let target = LocalDirectorySource::with_template("compiled", work.path().join("compiled"), template);
    let local = vec![LocalRelease {
        id: ReleaseId::new("uaa", "1.0"),
        local_path: work.path().join("uaa-1.0.tgz"),
        sha1: "fresh".into(),
    }];

    sync_with_local(&lock, &local, &target, &FileLockStore::new(&lock_path)).expect("sync");

    let on_disk = load_lock_at(&lock_path).expect("reload");
    assert_eq!(on_disk.releases[0], lock.releases[0]);
    assert_eq!(on_disk.releases[1].remote_source, "compiled");
    assert_eq!(
        on_disk.releases[1].remote_path,
        "uaa/uaa-1.0-ubuntu-xenial-621.55.tgz"
    );
    assert_eq!(on_disk.releases[1].sha1, "fresh");
}
