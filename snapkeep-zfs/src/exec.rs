//! Subprocess implementation over the `zfs` and `zpool` tools.

use std::process::Command;

use regex::Regex;

use crate::error::{classify_stderr, ZfsError};
use crate::Zfs;

/// Adapter invoking the system `zfs`/`zpool` binaries.
///
/// Each call is one subprocess; stderr is captured and classified, stdout
/// is returned on success.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemZfs;

impl SystemZfs {
    pub fn new() -> Self {
        Self
    }
}

fn run_tool(tool: &str, args: &[&str]) -> Result<String, ZfsError> {
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|e| ZfsError::Other(format!("cannot run {}: {}", tool, e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(classify_stderr(&stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

impl Zfs for SystemZfs {
    fn create_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError> {
        let snapshot = format!("{}@{}", target, name);
        let mut args = vec!["snapshot"];
        if recursive {
            args.push("-r");
        }
        args.push(&snapshot);
        run_tool("zfs", &args).map(|_| ())
    }

    fn destroy_snapshot(&self, target: &str, name: &str, recursive: bool) -> Result<(), ZfsError> {
        let snapshot = format!("{}@{}", target, name);
        let mut args = vec!["destroy"];
        if recursive {
            args.push("-r");
        }
        args.push(&snapshot);
        run_tool("zfs", &args).map(|_| ())
    }

    fn list_snapshot_names(&self, target: &str, matcher: &Regex) -> Result<Vec<String>, ZfsError> {
        let mut args = vec![
            "list", "-Hp", "-o", "name", "-S", "creation", "-t", "snapshot",
        ];
        if !target.is_empty() {
            args.push(target);
        }
        let out = run_tool("zfs", &args)?;
        Ok(matcher
            .find_iter(&out)
            .map(|m| m.as_str().to_string())
            .collect())
    }

    fn get_pool_property(&self, pool: &str, key: &str) -> Result<String, ZfsError> {
        let out = run_tool("zpool", &["get", "-Hp", "-o", "value", key, pool])?;
        Ok(out.trim().to_string())
    }

    fn set_pool_property(&self, pool: &str, key: &str, value: &str) -> Result<(), ZfsError> {
        let assignment = format!("{}={}", key, value);
        run_tool("zpool", &["set", &assignment, pool]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // SystemZfs needs the real tools; the subprocess seam itself is
    // exercised here through a binary that is present everywhere.

    #[test]
    fn test_run_tool_captures_stdout() {
        let out = run_tool("echo", &["hello"]).expect("echo runs");
        assert_eq!(out, "hello\n");
    }

    #[test]
    fn test_run_tool_missing_binary_is_other() {
        let err = run_tool("snapkeep-no-such-tool", &[]).unwrap_err();
        match err {
            ZfsError::Other(detail) => {
                assert!(detail.contains("cannot run snapkeep-no-such-tool"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_run_tool_classifies_failure_stderr() {
        // sh -c writes the marker to stderr and exits non-zero.
        let err = run_tool(
            "sh",
            &["-c", "echo 'dataset does not exist' >&2; exit 1"],
        )
        .unwrap_err();
        assert_eq!(err, ZfsError::DatasetNotFound);
    }
}
