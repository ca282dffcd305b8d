//! Pipeline ordering tests with scripted steps.

use super::*;
use crate::checksum::{sha256_bytes, Sha256Digest};
use crate::descriptor::{BuildSpec, FormulaRegistry, SmokeTestSpec};
use crate::error::ErrorKind;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::cell::RefCell;
use std::path::{Path, PathBuf};

fn source_archive() -> Vec<u8> {
    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    let data = b"package main\nfunc main() {}\n";
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder
        .append_data(&mut header, "container-selector-1.0.0/main.go", &data[..])
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap()
}

/// Descriptor for container-selector with its digest pinned to `archive`.
fn descriptor_for(archive: &[u8]) -> PackageDescriptor {
    let reg = FormulaRegistry::builtin().unwrap();
    let mut d = reg.get("container-selector").unwrap().clone();
    d.sha256 = sha256_bytes(archive);
    d
}

#[derive(Default)]
struct Scripted {
    archive: Vec<u8>,
    fetch_fails: bool,
    build_exit: Option<(String, String)>,
    build_writes_nothing: bool,
    smoke_fails: bool,
    calls: RefCell<Vec<&'static str>>,
    staged_at: RefCell<Option<PathBuf>>,
}

impl Scripted {
    fn new(archive: Vec<u8>) -> Self {
        Self {
            archive,
            ..Default::default()
        }
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.borrow().clone()
    }
}

impl InstallSteps for Scripted {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.borrow_mut().push("fetch");
        if self.fetch_fails {
            return Err(InstallError::Network {
                url: url.to_string(),
                message: "GET returned HTTP 404".to_string(),
            });
        }
        Ok(self.archive.clone())
    }

    fn verify(&self, bytes: &[u8], expected: &Sha256Digest) -> Result<()> {
        self.calls.borrow_mut().push("verify");
        verify_digest(bytes, expected)
    }

    fn build(&self, _spec: &BuildSpec, source_dir: &Path, output: &Path) -> Result<()> {
        self.calls.borrow_mut().push("build");
        *self.staged_at.borrow_mut() = Some(output.to_path_buf());
        assert!(source_dir.join("main.go").is_file(), "sources unpacked before build");
        if let Some((reason, output)) = &self.build_exit {
            return Err(InstallError::Build {
                reason: reason.clone(),
                output: output.clone(),
            });
        }
        if !self.build_writes_nothing {
            std::fs::create_dir_all(output.parent().unwrap()).unwrap();
            std::fs::write(output, b"\x7fELF fake").unwrap();
        }
        Ok(())
    }

    fn smoke_test(&self, binary: &Path, spec: &SmokeTestSpec) -> Result<()> {
        self.calls.borrow_mut().push("smoke_test");
        assert_eq!(spec.args, vec!["--help".to_string()]);
        if self.smoke_fails {
            return Err(InstallError::TestFailure {
                binary: binary.to_path_buf(),
                args: spec.args.clone(),
                reason: "exited with exit status: 1".to_string(),
                output: String::new(),
            });
        }
        Ok(())
    }
}

#[test]
fn successful_install_places_exactly_one_binary() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted::new(archive.clone());

    let report = install(&d, &layout, &steps).unwrap();

    assert_eq!(steps.calls(), vec!["fetch", "verify", "build", "smoke_test"]);
    assert_eq!(report.path, prefix.path().join("bin/container-selector"));
    assert_eq!(report.archive_bytes, archive.len());
    assert_eq!(report.version.as_deref(), Some("1.0.0"));
    assert!(report.path.is_file());
    let entries: Vec<_> = std::fs::read_dir(prefix.path().join("bin"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn digest_mismatch_aborts_before_build() {
    let archive = source_archive();
    let d = descriptor_for(b"a different archive");
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted::new(archive);

    let err = install(&d, &layout, &steps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Integrity);
    assert_eq!(steps.calls(), vec!["fetch", "verify"]);
    assert!(!layout.binary_path(&d).exists());
}

#[test]
fn declared_digest_scenario_reports_integrity_error() {
    // Builtin descriptor keeps its declared 0019dfc4b3... digest.
    let reg = FormulaRegistry::builtin().unwrap();
    let d = reg.get("container-selector").unwrap();
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted::new(source_archive());

    match install(d, &layout, &steps).unwrap_err() {
        InstallError::Integrity { expected, .. } => assert!(expected.starts_with("0019dfc4b3")),
        other => panic!("expected Integrity, got {other}"),
    }
    assert!(!layout.binary_path(d).exists());
}

#[test]
fn network_error_stops_pipeline() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted {
        fetch_fails: true,
        ..Scripted::new(archive)
    };

    let err = install(&d, &layout, &steps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(steps.calls(), vec!["fetch"]);
}

#[test]
fn build_failure_skips_smoke_test_and_places_nothing() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted {
        build_exit: Some((
            "go exited with exit status: 1".to_string(),
            "main.go:2:1: syntax error\n".to_string(),
        )),
        ..Scripted::new(archive)
    };

    let err = install(&d, &layout, &steps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Build);
    assert!(err.to_string().contains("main.go:2:1: syntax error"));
    assert_eq!(steps.calls(), vec!["fetch", "verify", "build"]);
    assert!(!layout.binary_path(&d).exists());
}

#[test]
fn build_without_output_is_build_error() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted {
        build_writes_nothing: true,
        ..Scripted::new(archive)
    };

    let err = install(&d, &layout, &steps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Build);
    assert_eq!(steps.calls(), vec!["fetch", "verify", "build"]);
}

#[test]
fn smoke_failure_leaves_no_binary() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted {
        smoke_fails: true,
        ..Scripted::new(archive)
    };

    let err = install(&d, &layout, &steps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TestFailure);
    assert!(!layout.binary_path(&d).exists());
}

#[test]
fn failed_reinstall_keeps_previous_binary() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());

    install(&d, &layout, &Scripted::new(archive.clone())).unwrap();
    let before = std::fs::read(layout.binary_path(&d)).unwrap();

    let failing = Scripted {
        smoke_fails: true,
        ..Scripted::new(archive)
    };
    assert!(install(&d, &layout, &failing).is_err());
    assert_eq!(std::fs::read(layout.binary_path(&d)).unwrap(), before);
}

#[test]
fn test_installed_and_uninstall() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());
    let steps = Scripted::new(archive);

    let err = test_installed(&d, &layout, &steps).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TestFailure);

    install(&d, &layout, &steps).unwrap();
    let path = test_installed(&d, &layout, &steps).unwrap();
    assert_eq!(path, layout.binary_path(&d));

    assert!(uninstall(&d, &layout).unwrap());
    assert!(!path.exists());
    assert!(!uninstall(&d, &layout).unwrap());
}

#[test]
fn fetch_verified_checks_digest() {
    let archive = source_archive();
    let good = descriptor_for(&archive);
    let steps = Scripted::new(archive.clone());
    assert_eq!(fetch_verified(&good, &steps).unwrap(), archive);

    let bad = descriptor_for(b"other");
    assert_eq!(
        fetch_verified(&bad, &steps).unwrap_err().kind(),
        ErrorKind::Integrity
    );
}

#[test]
fn build_is_staged_under_the_prefix_and_cleaned_up() {
    let archive = source_archive();
    let d = descriptor_for(&archive);
    let prefix = tempfile::tempdir().unwrap();
    let layout = InstallLayout::new(prefix.path());

    let steps = Scripted::new(archive.clone());
    install(&d, &layout, &steps).unwrap();
    let staged = steps.staged_at.borrow().clone().unwrap();
    assert!(
        staged.starts_with(layout.build_root()),
        "staged at {}",
        staged.display()
    );
    assert!(!layout.build_root().exists());

    let failing = Scripted {
        smoke_fails: true,
        ..Scripted::new(archive)
    };
    install(&d, &layout, &failing).unwrap_err();
    assert!(!layout.build_root().exists());
}
