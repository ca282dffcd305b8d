//! Source archives, descriptors and fake Go toolchains for pipeline tests.

use flate2::write::GzEncoder;
use flate2::Compression;
use keg_core::checksum::sha256_bytes;
use keg_core::descriptor::{FormulaRegistry, PackageDescriptor};
use std::path::{Path, PathBuf};

/// A GitHub-style tag archive: everything under `container-selector-1.0.0/`.
pub fn source_archive() -> Vec<u8> {
    let enc = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(enc);
    let files: [(&str, &[u8]); 2] = [
        (
            "container-selector-1.0.0/go.mod",
            b"module github.com/IgorSakharov/container-selector\n",
        ),
        (
            "container-selector-1.0.0/main.go",
            b"package main\n\nfunc main() {}\n",
        ),
    ];
    for (path, data) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, data).unwrap();
    }
    builder.into_inner().unwrap().finish().unwrap()
}

/// container-selector descriptor pointing at `url`, expecting `sha256_hex`.
pub fn descriptor(url: &str, sha256_hex: &str) -> PackageDescriptor {
    let text = format!(
        r#"
        [[formula]]
        name = "container-selector"
        description = "Interactive Docker container selector and command executor"
        homepage = "https://github.com/IgorSakharov/container-selector"
        url = "{url}"
        sha256 = "{sha256_hex}"
        license = "MIT"
        depends_on = [{{ name = "go", kind = "build" }}]

        [formula.build]
        toolchain = "go"
        output = "bin/container-selector"
        "#
    );
    FormulaRegistry::from_toml_str(&text)
        .unwrap()
        .get("container-selector")
        .unwrap()
        .clone()
}

/// Descriptor whose digest matches `archive`.
pub fn descriptor_for(url: &str, archive: &[u8]) -> PackageDescriptor {
    descriptor(url, &sha256_bytes(archive).to_hex())
}

/// How the fake `go` behaves.
#[derive(Debug, Clone, Copy)]
pub enum FakeGo {
    /// Writes a binary whose `--help` exits 0.
    Builds,
    /// Writes a binary whose `--help` exits 1.
    BuildsBrokenBinary,
    /// Prints a compiler error and exits 2.
    Fails,
}

/// File the fake toolchain touches on every run.
pub fn invocation_marker(dir: &Path) -> PathBuf {
    dir.join("go-was-invoked")
}

#[cfg(unix)]
fn write_executable(path: &Path, contents: &str) {
    use std::io::Write;
    use std::os::unix::fs::PermissionsExt;

    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    f.sync_all().unwrap();
    drop(f);
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Writes a shell script standing in for `go` into `dir` and returns its path.
#[cfg(unix)]
pub fn fake_go(dir: &Path, behaviour: FakeGo) -> PathBuf {
    let help_exit = match behaviour {
        FakeGo::BuildsBrokenBinary => 1,
        _ => 0,
    };
    let body = match behaviour {
        FakeGo::Fails => "echo './main.go:3:1: undefined: cobra' >&2\nexit 2\n".to_string(),
        FakeGo::Builds | FakeGo::BuildsBrokenBinary => format!(
            r#"[ "$1" = "build" ] || exit 64
[ -f main.go ] || {{ echo "main.go missing in $(pwd)" >&2; exit 1; }}
out=""
for a in "$@"; do
  case "$a" in
    -o=*) out="${{a#-o=}}" ;;
  esac
done
[ -n "$out" ] || {{ echo "no -o flag" >&2; exit 1; }}
mkdir -p "$(dirname "$out")"
printf '#!/bin/sh\necho "Usage: container-selector [flags]"\nexit {help_exit}\n' > "$out"
chmod 755 "$out"
"#
        ),
    };
    let marker = invocation_marker(dir);
    let script = format!("#!/bin/sh\ntouch '{}'\n{}", marker.display(), body);
    let path = dir.join("go");
    write_executable(&path, &script);
    path
}
