//! Thin wrappers over the `docker` command line client.
//!
//! Images are addressed as `name:tag` references. The registry token is fed
//! to `docker login` on stdin so it never shows up in a process listing.

use std::io::Write;
use std::process::{Child, Command, Output, Stdio};

use log::debug;

use crate::config::Login;
use crate::error::{Error, Result};

fn failure(command: &str, image: &str, detail: impl Into<String>) -> Error {
    Error::DockerCommand {
        command: command.to_string(),
        image: image.to_string(),
        stderr: detail.into(),
    }
}

fn check(command: &str, image: &str, output: Output) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(failure(
            command,
            image,
            String::from_utf8_lossy(&output.stderr).trim(),
        ))
    }
}

/// Feed `input` to `child`, then wait for it. A failed write is reported
/// together with whatever the child printed before it went away.
fn finish_with_input(mut child: Child, input: &[u8], command: &str, image: &str) -> Result<()> {
    // stdin is closed at the end of the match so the child sees EOF
    let written = match child.stdin.take() {
        Some(mut stdin) => stdin.write_all(input),
        None => Ok(()),
    };
    let output = child
        .wait_with_output()
        .map_err(|e| failure(command, image, format!("failed to wait for docker: {}", e)))?;
    match written {
        Ok(()) => check(command, image, output),
        Err(e) => Err(failure(
            command,
            image,
            format!(
                "failed to write to docker stdin: {}; {}",
                e,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
        )),
    }
}

fn run(command: &str, image: &str, args: &[&str]) -> Result<()> {
    debug!("docker {}", args.join(" "));
    let output = Command::new("docker")
        .args(args)
        .output()
        .map_err(|e| failure(command, image, format!("failed to run docker: {}", e)))?;
    check(command, image, output)
}

/// Log into `server` (Docker Hub when `None`).
pub fn login(login: &Login, server: Option<&str>) -> Result<()> {
    let target = server.unwrap_or("Docker Hub");
    let mut args = vec!["login", "--username", login.username.as_str(), "--password-stdin"];
    if let Some(server) = server {
        args.push(server);
    }
    debug!("docker {}", args.join(" "));

    let child = Command::new("docker")
        .args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| failure("login", target, format!("failed to run docker: {}", e)))?;

    finish_with_input(child, login.token.as_bytes(), "login", target)
}

/// Pull `reference`.
pub fn pull(reference: &str) -> Result<()> {
    run("pull", reference, &["pull", reference])
}

/// Add tag `target` to the local image `source`.
pub fn tag(source: &str, target: &str) -> Result<()> {
    run("tag", source, &["tag", source, target])
}

/// Push `reference`.
pub fn push(reference: &str) -> Result<()> {
    run("push", reference, &["push", reference])
}
