// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-env-changed=DEPTH_RECORDER_VERSION");

    // Packaged builds pin the version explicitly
    let version = match std::env::var("DEPTH_RECORDER_VERSION") {
        Ok(v) => v,
        Err(_) => describe_version(),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// Version string from `git describe`, falling back to the crate version
///
/// - exact tag `v0.1.0` becomes `0.1.0-<hash>`
/// - `v0.1.0-5-gabcdef1` becomes `0.1.0-dirty-abcdef1`
/// - no git checkout yields the Cargo package version
fn describe_version() -> String {
    let pkg_version = env!("CARGO_PKG_VERSION").to_string();

    let Some(described) = git(&["describe", "--tags", "--always", "--match", "v*"]) else {
        return pkg_version;
    };
    let described = described.strip_prefix('v').unwrap_or(&described);

    if described.contains('-') {
        let parts: Vec<&str> = described.rsplitn(3, '-').collect();
        if parts.len() >= 3 {
            let hash = parts[0].strip_prefix('g').unwrap_or(parts[0]);
            return format!("{}-dirty-{}", parts[2], hash);
        }
        return described.to_string();
    }

    // `--always` returns a bare hash when there is no matching tag
    if !described.contains('.') {
        return format!("{}-{}", pkg_version, described);
    }

    match git(&["rev-parse", "--short", "HEAD"]) {
        Some(hash) => format!("{}-{}", described, hash),
        None => described.to_string(),
    }
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
