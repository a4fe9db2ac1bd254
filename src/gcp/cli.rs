//! gcloud CLI command execution.
//!
//! Only used to obtain an access token when none was passed on the command line.

use crate::error::ConfigError;
use colored::Colorize;
use std::process::Command;

/// Program and arguments that print the active account's access token.
const TOKEN_COMMAND: (&str, &[&str]) = ("gcloud", &["auth", "print-access-token"]);

/// Run `program` with `args` and return its trimmed stdout.
///
/// Arguments are passed to the process as given, no shell is involved.
pub fn run(program: &str, args: &[&str]) -> Result<String, ConfigError> {
    let cmd = format!("{program} {}", args.join(" "));
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let output = Command::new(program).args(args).output().map_err(|e| {
        log::error!("Command execution failed: {}", e);
        ConfigError::TokenCommand(format!("failed to execute {program}: {e}"))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(ConfigError::TokenCommand(stderr.trim().to_string()));
    }

    let stdout = String::from_utf8(output.stdout)
        .map_err(|e| ConfigError::TokenCommand(format!("Invalid UTF-8: {e}")))?;
    log::debug!("Success cmd: {cmd} stdout.len()={}", stdout.len());
    Ok(stdout.trim().to_string())
}

/// Ask gcloud for an access token of the active account.
pub fn access_token() -> Result<String, ConfigError> {
    let (program, args) = TOKEN_COMMAND;
    let token = run(program, args)?;
    if token.is_empty() {
        return Err(ConfigError::MissingToken);
    }
    Ok(token)
}
