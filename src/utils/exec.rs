//! External command execution.
//!
//! Used when `[watch] command` replaces the in-process regeneration pass.
//! The command's stderr is logged on success; a non-zero exit becomes an
//! error carrying the filtered stderr and stdout.

use crate::log;
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::{
    path::Path,
    process::{Command, Output},
    sync::LazyLock,
};

static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Prefixes of output lines that carry no information worth logging.
const SKIP_PREFIXES: &[&str] = &["<!DOCTYPE", "<!doctype"];

/// Run `command` (program followed by its arguments) inside `root`.
///
/// # Errors
/// Fails if the command is empty, cannot be spawned, or exits non-zero.
pub fn run_command(root: &Path, command: &[String]) -> Result<Output> {
    let (program, args) = command.split_first().context("Empty command")?;
    let name = Path::new(program)
        .file_name()
        .map_or_else(|| program.clone(), |n| n.to_string_lossy().into_owned());

    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to execute `{name}`"))?;

    if !output.status.success() {
        bail!(format_error(&name, &output));
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    let lines = visible_lines(&stderr);
    if !lines.is_empty() {
        log!(&name; "{}", lines.join("\n"));
    }
    Ok(output)
}

/// Non-empty, ANSI-stripped lines that are not known noise.
fn visible_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| ANSI_RE.replace_all(line, "").trim().to_owned())
        .filter(|line| !line.is_empty() && !SKIP_PREFIXES.iter().any(|p| line.starts_with(p)))
        .collect()
}

fn format_error(name: &str, output: &Output) -> String {
    let mut msg = format!("Command `{name}` failed with {}", output.status);

    let stderr = visible_lines(&String::from_utf8_lossy(&output.stderr));
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(&stderr.join("\n"));
    }

    let stdout = visible_lines(&String::from_utf8_lossy(&output.stdout));
    if !stdout.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(&stdout.join("\n"));
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_lines() {
        let out = "\x1b[31merror\x1b[0m: boom\n\n   \n<!DOCTYPE html>\nplain\n";
        assert_eq!(visible_lines(out), vec!["error: boom", "plain"]);
    }

    #[test]
    fn test_empty_command() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_command(dir.path(), &[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_status() {
        let dir = tempfile::tempdir().unwrap();
        let ok = run_command(dir.path(), &["true".to_owned()]);
        assert!(ok.is_ok());

        let err = run_command(
            dir.path(),
            &["sh".to_owned(), "-c".to_owned(), "echo oops >&2; exit 3".to_owned()],
        )
        .unwrap_err()
        .to_string();
        assert!(err.contains("Command `sh` failed"));
        assert!(err.contains("oops"));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_uses_root_as_cwd() {
        let dir = tempfile::tempdir().unwrap();
        run_command(
            dir.path(),
            &["sh".to_owned(), "-c".to_owned(), "touch ran".to_owned()],
        )
        .unwrap();
        assert!(dir.path().join("ran").exists());
    }
}
