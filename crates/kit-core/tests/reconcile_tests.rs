//! Install, update and remove against temporary install roots

mod common;

use std::fs;

use common::{FakeRevisions, MapDownloader, snapshot};
use kit_core::{
    BuildDirPolicy, Error, InstallOptions, PackageState, Reconciler, UpdateOutcome,
};
use kit_meta::{InstallMethod, PackageManifest};
use kit_test_utils::git::real_git_repo_with_commit;
use kit_test_utils::{ManifestBuilder, TestRoots};
use pretty_assertions::assert_eq;

fn foo() -> PackageManifest {
    ManifestBuilder::new("foo")
        .version("1.0")
        .homepage("https://example.com/foo.git")
        .step("touch built.bin")
        .binary("built.bin")
        .build()
}

fn specific() -> InstallOptions {
    InstallOptions {
        method: InstallMethod::Specific,
        build_dir_policy: BuildDirPolicy::Refuse,
    }
}

fn latest() -> InstallOptions {
    InstallOptions {
        method: InstallMethod::Latest,
        build_dir_policy: BuildDirPolicy::Refuse,
    }
}

// ============================================================================
// Install
// ============================================================================

#[test]
fn test_install_places_executable_and_records_version() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let report = reconciler.install(&foo(), specific()).unwrap();

    let binary = roots.bin().join("built.bin");
    roots.assert_exists(&binary);
    #[cfg(unix)]
    assert_eq!(common::mode_of(&binary), 0o755);

    assert_eq!(report.record.name(), "foo");
    assert_eq!(report.record.actual_version(), "1.0");
    assert_eq!(report.record.method(), InstallMethod::Specific);
    assert!(report.warnings.is_empty());
    assert_eq!(report.placed, vec![binary]);

    let stored = reconciler.store().get("foo").unwrap().unwrap();
    assert_eq!(stored.actual_version(), "1.0");
    assert_eq!(stored.installation.method, InstallMethod::Specific);
    roots.assert_not_exists(&roots.build().join("foo"));
}

#[test]
fn test_install_latest_records_checkout_revision() {
    let roots = TestRoots::new();
    let upstream = roots.scratch("upstream");
    let hash = real_git_repo_with_commit(&upstream);

    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step(&format!("cp -R '{}' checkout", upstream.display()))
        .step("touch built.bin")
        .binary("built.bin")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let report = reconciler.install(&manifest, latest()).unwrap();

    assert_eq!(report.record.method(), InstallMethod::Latest);
    assert_eq!(report.record.actual_version(), hash);
    assert_ne!(report.record.actual_version(), "1.0");
}

#[test]
fn test_install_latest_without_checkout_fails() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let result = reconciler.install(&foo(), latest());

    assert!(matches!(result, Err(Error::RevisionUnavailable { .. })));
    assert!(reconciler.store().get("foo").unwrap().is_none());
}

#[test]
fn test_latest_strips_clone_pins_from_steps() {
    let roots = TestRoots::new().keep_build();
    let upstream = roots.scratch("upstream");
    real_git_repo_with_commit(&upstream);

    let manifest = ManifestBuilder::new("foo")
        .step("printf '%s' \"git clone --branch v1.0 --single-branch https://x/y.git\" > cmd.txt")
        .step(&format!("cp -R '{}' checkout", upstream.display()))
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    reconciler.install(&manifest, latest()).unwrap();

    let cmd = fs::read_to_string(roots.build().join("foo").join("cmd.txt")).unwrap();
    assert_eq!(cmd, "git clone https://x/y.git");
}

#[test]
fn test_man_pages_are_classified_by_section() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch foo.3 foo")
        .man("foo.3")
        .man("foo")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let report = reconciler.install(&manifest, specific()).unwrap();

    roots.assert_exists(&roots.man().join("man3").join("foo.3"));
    roots.assert_not_exists(&roots.man().join("foo"));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("man section"));
}

#[test]
fn test_configs_and_missing_config_warning() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step("mkdir -p etc && echo 'color=auto' > etc/foo.conf")
        .config("etc/foo.conf")
        .config("etc/absent.conf")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let report = reconciler.install(&manifest, specific()).unwrap();

    let copied = roots.configs().join("foo").join("foo.conf");
    assert_eq!(fs::read_to_string(copied).unwrap().trim(), "color=auto");
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("absent.conf"));
}

#[test]
fn test_additional_config_literal_and_downloaded() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .additional_config("themes/dark.conf", "background=black\n")
        .additional_config("remote.conf", "https://example.com/remote.conf")
        .additional_config("broken.conf", "https://example.com/missing.conf")
        .additional_config("../escape.conf", "nope")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new().with("https://example.com/remote.conf", "fetched=yes\n");
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let report = reconciler.install(&manifest, specific()).unwrap();

    let config_dir = roots.configs().join("foo");
    assert_eq!(
        fs::read_to_string(config_dir.join("themes/dark.conf")).unwrap(),
        "background=black\n"
    );
    assert_eq!(
        fs::read_to_string(config_dir.join("remote.conf")).unwrap(),
        "fetched=yes\n"
    );
    roots.assert_not_exists(&config_dir.join("broken.conf"));
    roots.assert_not_exists(&roots.configs().join("escape.conf"));
    assert_eq!(report.warnings.len(), 2);
}

#[test]
fn test_post_install_scripts_land_in_bin() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .script("foo-hello", "#!/bin/sh\necho hello\n")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    reconciler.install(&manifest, specific()).unwrap();

    let script = roots.bin().join("foo-hello");
    assert_eq!(fs::read_to_string(&script).unwrap(), "#!/bin/sh\necho hello\n");
    #[cfg(unix)]
    assert_eq!(common::mode_of(&script), 0o755);
}

#[test]
fn test_environment_reaches_steps() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .env("FOO_FLAVOUR", "mint")
        .step("printf '%s' \"$FOO_FLAVOUR\" > flavour")
        .binary("flavour")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    reconciler.install(&manifest, specific()).unwrap();

    assert_eq!(fs::read_to_string(roots.bin().join("flavour")).unwrap(), "mint");
    assert!(std::env::var("FOO_FLAVOUR").is_err());
}

#[test]
fn test_step_failure_aborts_without_record() {
    let roots = TestRoots::new().keep_build();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch partial")
        .step("false")
        .step("touch built.bin")
        .binary("built.bin")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let result = reconciler.install(&manifest, specific());

    assert!(matches!(result, Err(Error::StepFailed { ref step, .. }) if step == "false"));
    roots.assert_exists(&roots.build().join("foo").join("partial"));
    roots.assert_not_exists(&roots.build().join("foo").join("built.bin"));
    assert!(reconciler.store().get("foo").unwrap().is_none());
}

#[test]
fn test_missing_binary_is_fatal() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch one")
        .binary("one")
        .binary("two")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let result = reconciler.install(&manifest, specific());

    assert!(matches!(result, Err(Error::MissingBinary { .. })));
    assert!(reconciler.store().get("foo").unwrap().is_none());
}

#[test]
fn test_existing_build_dir_needs_replace_policy() {
    let roots = TestRoots::new();
    let leftover = roots.build().join("foo");
    fs::create_dir_all(&leftover).unwrap();
    fs::write(leftover.join("stale.o"), "old").unwrap();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let refused = reconciler.install(&foo(), specific());
    assert!(matches!(refused, Err(Error::BuildDirExists { ref path }) if *path == leftover));
    roots.assert_exists(&leftover.join("stale.o"));

    let options = InstallOptions {
        build_dir_policy: BuildDirPolicy::Replace,
        ..specific()
    };
    reconciler.install(&foo(), options).unwrap();
    roots.assert_exists(&roots.bin().join("built.bin"));
}

#[test]
fn test_invalid_name_is_rejected() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let manifest = ManifestBuilder::new("../foo").build();

    assert!(matches!(
        reconciler.install(&manifest, specific()),
        Err(Error::InvalidName { .. })
    ));
}

// ============================================================================
// Update
// ============================================================================

#[test]
fn test_update_twice_is_up_to_date_without_mutation() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);
    reconciler.install(&foo(), specific()).unwrap();

    let first = reconciler.update(&foo(), BuildDirPolicy::Refuse).unwrap();
    let before = snapshot(roots.root());
    let second = reconciler.update(&foo(), BuildDirPolicy::Refuse).unwrap();
    let after = snapshot(roots.root());

    assert!(matches!(first, UpdateOutcome::UpToDate(_)));
    assert!(matches!(second, UpdateOutcome::UpToDate(ref c) if c.installed == "1.0"));
    assert_eq!(before, after);
}

#[test]
fn test_update_to_new_version_tears_down_old_files() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let old = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch old-tool foo.1")
        .binary("old-tool")
        .man("foo.1")
        .build();
    reconciler.install(&old, specific()).unwrap();

    let new = ManifestBuilder::new("foo")
        .version("2.0")
        .step("touch new-tool")
        .binary("new-tool")
        .build();
    let outcome = reconciler.update(&new, BuildDirPolicy::Refuse).unwrap();

    match outcome {
        UpdateOutcome::Updated { check, report } => {
            assert_eq!(check.installed, "1.0");
            assert_eq!(check.available, "2.0");
            assert_eq!(report.record.actual_version(), "2.0");
        }
        other => panic!("expected Updated, got {other:?}"),
    }
    roots.assert_not_exists(&roots.bin().join("old-tool"));
    roots.assert_not_exists(&roots.man().join("man1").join("foo.1"));
    roots.assert_exists(&roots.bin().join("new-tool"));
}

#[test]
fn test_update_latest_compares_remote_head() {
    let roots = TestRoots::new();
    let upstream = roots.scratch("upstream");
    let hash = real_git_repo_with_commit(&upstream);

    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .source("https://example.com/foo.git")
        .step(&format!("cp -R '{}' checkout", upstream.display()))
        .build();

    let revisions = FakeRevisions::new(&hash);
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);
    reconciler.install(&manifest, latest()).unwrap();

    let outcome = reconciler.update(&manifest, BuildDirPolicy::Refuse).unwrap();
    assert!(matches!(outcome, UpdateOutcome::UpToDate(_)));
    assert_eq!(
        *revisions.remote_calls.borrow(),
        vec!["https://example.com/foo.git".to_string()]
    );

    revisions.set_remote("0000000000000000000000000000000000000000");
    let outcome = reconciler.update(&manifest, BuildDirPolicy::Refuse).unwrap();
    match outcome {
        UpdateOutcome::Updated { report, .. } => {
            assert_eq!(report.record.method(), InstallMethod::Latest);
            assert_eq!(report.record.actual_version(), hash);
        }
        other => panic!("expected Updated, got {other:?}"),
    }
}

#[test]
fn test_update_not_installed() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let result = reconciler.update(&foo(), BuildDirPolicy::Refuse);

    assert!(matches!(result, Err(Error::NotInstalled { .. })));
}

#[test]
fn test_failed_update_keeps_record_named_as_config() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let old = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch package.yaml")
        .config("package.yaml")
        .build();
    let report = reconciler.install(&old, specific()).unwrap();
    assert_eq!(report.warnings.len(), 1);

    let broken = ManifestBuilder::new("foo").version("2.0").step("exit 1").build();
    let result = reconciler.update(&broken, BuildDirPolicy::Refuse);

    assert!(matches!(result, Err(Error::StepFailed { .. })));
    let record = reconciler.store().get("foo").unwrap().unwrap();
    assert_eq!(record.actual_version(), "1.0");
}

#[test]
fn test_additional_config_cannot_replace_record() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .additional_config("./package.yaml", "name: other\n")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let report = reconciler.install(&manifest, specific()).unwrap();

    assert_eq!(report.warnings.len(), 1);
    let record = reconciler.store().get("foo").unwrap().unwrap();
    assert_eq!(record.name(), "foo");
    assert_eq!(record.actual_version(), "1.0");
}

#[test]
fn test_apply_update_reuses_computed_check() {
    let roots = TestRoots::new();
    let upstream = roots.scratch("upstream");
    let hash = real_git_repo_with_commit(&upstream);

    let manifest = ManifestBuilder::new("foo")
        .source("https://example.com/foo.git")
        .step(&format!("cp -R '{}' checkout", upstream.display()))
        .build();

    let revisions = FakeRevisions::new("0000000000000000000000000000000000000000");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);
    reconciler.install(&manifest, latest()).unwrap();

    let PackageState::UpdateAvailable {
        record,
        candidate,
        check,
    } = reconciler.state(&manifest).unwrap()
    else {
        panic!("expected UpdateAvailable");
    };
    assert_eq!(revisions.remote_calls.borrow().len(), 1);

    let outcome = reconciler
        .apply_update(&record, &candidate, check, BuildDirPolicy::Refuse)
        .unwrap();

    assert!(matches!(outcome, UpdateOutcome::Updated { ref report, .. } if report.record.actual_version() == hash));
    assert_eq!(revisions.remote_calls.borrow().len(), 1);
}

// ============================================================================
// Reinstall
// ============================================================================

#[test]
fn test_reinstall_switches_method_and_drops_stale_binaries() {
    let roots = TestRoots::new();
    let upstream = roots.scratch("upstream");
    let hash = real_git_repo_with_commit(&upstream);

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let pinned = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch one two")
        .binary("one")
        .binary("two")
        .build();
    reconciler.install(&pinned, specific()).unwrap();

    let tracking = ManifestBuilder::new("foo")
        .version("1.0")
        .step(&format!("cp -R '{}' checkout", upstream.display()))
        .step("touch one")
        .binary("one")
        .build();
    let report = reconciler.reinstall(&tracking, latest()).unwrap();

    assert_eq!(report.record.method(), InstallMethod::Latest);
    assert_eq!(report.record.actual_version(), hash);
    roots.assert_exists(&roots.bin().join("one"));
    roots.assert_not_exists(&roots.bin().join("two"));

    let stored = reconciler.store().get("foo").unwrap().unwrap();
    assert_eq!(stored.method(), InstallMethod::Latest);
}

#[test]
fn test_reinstall_not_installed() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    let result = reconciler.reinstall(&foo(), specific());

    assert!(matches!(result, Err(Error::NotInstalled { .. })));
}

#[test]
fn test_state_transitions() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    assert!(matches!(reconciler.state(&foo()).unwrap(), PackageState::Absent));

    reconciler.install(&foo(), specific()).unwrap();
    assert!(matches!(
        reconciler.state(&foo()).unwrap(),
        PackageState::Installed(_)
    ));

    let newer = ManifestBuilder::new("foo").version("1.1").build();
    match reconciler.state(&newer).unwrap() {
        PackageState::UpdateAvailable { check, candidate, .. } => {
            assert_eq!(check.available, "1.1");
            assert_eq!(candidate.name, "foo");
        }
        other => panic!("expected UpdateAvailable, got {other:?}"),
    }
}

// ============================================================================
// Remove
// ============================================================================

#[test]
fn test_remove_deletes_everything_declared() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch built.bin foo.1")
        .binary("built.bin")
        .man("foo.1")
        .script("foo-post", "#!/bin/sh\n")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);
    reconciler.install(&manifest, specific()).unwrap();

    let report = reconciler.remove("foo").unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(report.removed.len(), 4);
    roots.assert_not_exists(&roots.configs().join("foo"));
    roots.assert_not_exists(&roots.bin().join("built.bin"));
    roots.assert_not_exists(&roots.bin().join("foo-post"));
    roots.assert_not_exists(&roots.man().join("man1").join("foo.1"));
    assert!(reconciler.store().get("foo").unwrap().is_none());
}

#[test]
fn test_remove_continues_past_failed_binary() {
    let roots = TestRoots::new();
    let manifest = ManifestBuilder::new("foo")
        .version("1.0")
        .step("touch one two three")
        .binary("one")
        .binary("two")
        .binary("three")
        .build();

    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);
    reconciler.install(&manifest, specific()).unwrap();

    // A non-empty directory in place of the second binary cannot be unlinked.
    let blocker = roots.bin().join("two");
    fs::remove_file(&blocker).unwrap();
    fs::create_dir(&blocker).unwrap();
    fs::write(blocker.join("keep"), "x").unwrap();

    let report = reconciler.remove("foo").unwrap();

    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("two"));
    roots.assert_not_exists(&roots.bin().join("one"));
    roots.assert_not_exists(&roots.bin().join("three"));
    roots.assert_exists(&blocker);
    assert!(reconciler.store().get("foo").unwrap().is_none());
}

#[test]
fn test_remove_tolerates_already_missing_files() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);
    reconciler.install(&foo(), specific()).unwrap();
    fs::remove_file(roots.bin().join("built.bin")).unwrap();

    let report = reconciler.remove("foo").unwrap();

    assert!(report.warnings.is_empty());
}

#[test]
fn test_remove_not_installed() {
    let roots = TestRoots::new();
    let revisions = FakeRevisions::new("unused");
    let downloads = MapDownloader::new();
    let reconciler = Reconciler::new(&roots.config, &revisions, &downloads);

    assert!(matches!(
        reconciler.remove("foo"),
        Err(Error::NotInstalled { .. })
    ));
}
