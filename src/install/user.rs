//! OS account provisioning for the pattoo daemons (unix only).

use std::fs;
use std::path::Path;
use std::process::Command;

use nix::unistd::{Gid, Group, Uid, User, chown};
use tracing::{debug, info, warn};

use crate::config::error::ConfigError;

/// Account the platform daemons run as.
pub const PATTOO_USER: &str = "pattoo";

/// Whether the named group exists on this system.
pub fn group_exists(name: &str) -> bool {
    matches!(Group::from_name(name), Ok(Some(_)))
}

/// Whether the named user exists on this system.
pub fn user_exists(name: &str) -> bool {
    matches!(User::from_name(name), Ok(Some(_)))
}

/// Create the named system group and user when they do not already
/// exist.
///
/// The user is created with the given home directory and shell, in a
/// group of the same name. Must run as root.
pub fn create_user(name: &str, home: &Path, shell: &str) -> Result<(), ConfigError> {
    if !Uid::effective().is_root() {
        return Err(ConfigError::NotRoot);
    }

    if !group_exists(name) {
        run_command("groupadd", &[name])?;
        info!(group = name, "Created group");
    }

    if !user_exists(name) {
        let home = home.to_string_lossy();
        run_command(
            "useradd",
            &["-d", home.as_ref(), "-s", shell, "-g", name, name],
        )?;
        info!(user = name, "Created user");
    }

    Ok(())
}

/// Recursively set ownership of `path` to `user:group`.
pub fn chown_recursive(path: &Path, user: &str, group: &str) -> Result<(), ConfigError> {
    let uid = User::from_name(user)
        .ok()
        .flatten()
        .map(|account| account.uid)
        .ok_or_else(|| ConfigError::UnknownAccount {
            name: user.to_string(),
        })?;
    let gid = Group::from_name(group)
        .ok()
        .flatten()
        .map(|account| account.gid)
        .ok_or_else(|| ConfigError::UnknownAccount {
            name: group.to_string(),
        })?;
    chown_tree(path, uid, gid)
}

/// Hand a newly created directory to the pattoo account when running as
/// root; otherwise leave ownership alone so unprivileged setups still
/// work.
pub fn chown_if_root(path: &Path) -> Result<(), ConfigError> {
    if !Uid::effective().is_root() {
        debug!(path = %path.display(), "Not running as root; keeping current ownership");
        return Ok(());
    }
    if !user_exists(PATTOO_USER) || !group_exists(PATTOO_USER) {
        warn!(
            path = %path.display(),
            "pattoo account not provisioned yet; keeping current ownership"
        );
        return Ok(());
    }
    chown_recursive(path, PATTOO_USER, PATTOO_USER)
}

fn chown_tree(path: &Path, uid: Uid, gid: Gid) -> Result<(), ConfigError> {
    chown(path, Some(uid), Some(gid)).map_err(|errno| ConfigError::Io {
        path: path.to_path_buf(),
        source: errno.into(),
    })?;

    if path.is_dir() {
        let entries = fs::read_dir(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        for entry in entries {
            let entry = entry.map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            chown_tree(&entry.path(), uid, gid)?;
        }
    }

    Ok(())
}

fn run_command(program: &str, args: &[&str]) -> Result<(), ConfigError> {
    debug!(command = program, ?args, "Running provisioning command");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|source| ConfigError::CommandFailed {
            command: program.to_string(),
            detail: source.to_string(),
        })?;

    if !output.status.success() {
        return Err(ConfigError::CommandFailed {
            command: format!("{program} {}", args.join(" ")),
            detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}
