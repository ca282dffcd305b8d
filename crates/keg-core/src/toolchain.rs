//! Build toolchain invocation.
//!
//! Runs the declared toolchain in the unpacked source root and checks that it
//! left exactly one executable at the requested output path.

use crate::descriptor::{BuildSpec, Toolchain};
use crate::error::{InstallError, Result};
use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Arguments for `go build` writing the binary to `output`, matching the
/// flags formula managers pass for Go projects.
pub fn go_build_args(output: &Path, ldflags: &str) -> Vec<OsString> {
    let mut out_arg = OsString::from("-o=");
    out_arg.push(output.as_os_str());
    vec![
        OsString::from("build"),
        OsString::from("-trimpath"),
        out_arg,
        OsString::from(format!("-ldflags={}", ldflags)),
    ]
}

/// Combined stdout then stderr of a finished process.
pub(crate) fn combined_output(out: &Output) -> String {
    let mut s = String::from_utf8_lossy(&out.stdout).into_owned();
    s.push_str(&String::from_utf8_lossy(&out.stderr));
    s
}

/// Build the sources in `source_dir` into `output`.
///
/// `program` is the toolchain executable (e.g. `go` or an absolute path).
pub fn build(program: &str, spec: &BuildSpec, source_dir: &Path, output: &Path) -> Result<()> {
    let args = match spec.toolchain {
        Toolchain::Go => go_build_args(output, &spec.ldflags),
    };
    tracing::info!(
        toolchain = program,
        source = %source_dir.display(),
        output = %output.display(),
        "building"
    );

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InstallError::io(format!("create {}", parent.display()), e))?;
    }

    let result = Command::new(program)
        .args(&args)
        .current_dir(source_dir)
        .stdin(Stdio::null())
        .output();

    let out = match result {
        Ok(out) => out,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(InstallError::Build {
                reason: format!("toolchain {:?} not found; is it installed and on PATH?", program),
                output: String::new(),
            });
        }
        Err(e) => {
            return Err(InstallError::Build {
                reason: format!("failed to run {}: {}", program, e),
                output: String::new(),
            });
        }
    };

    let text = combined_output(&out);
    if !out.status.success() {
        tracing::warn!(status = %out.status, "toolchain failed");
        return Err(InstallError::Build {
            reason: format!("{} exited with {}", program, out.status),
            output: text,
        });
    }
    if !text.trim().is_empty() {
        tracing::debug!(output = %text.trim_end(), "toolchain output");
    }

    if !output.is_file() {
        return Err(InstallError::Build {
            reason: format!("toolchain produced no file at {}", output.display()),
            output: text,
        });
    }
    make_executable(output)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| InstallError::io(format!("chmod {}", path.display()), e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}
