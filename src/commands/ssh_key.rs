//! `devkit ssh-key` command.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::ConfigError;
use crate::context::ServiceContext;
use crate::error::Error;
use crate::ports::CommandLine;
use crate::runner::RunError;

/// Where the new public key should be registered.
pub const GITHUB_SETTINGS_KEYS_URL: &str = "https://github.com/settings/keys";

/// Private key path for `email`: `<ssh_dir>/id_ed25519_<local part>`, with
/// dots in the local part replaced by underscores.
///
/// # Errors
///
/// Returns `ConfigError::Invalid` if `email` is not of the form `user@host`.
pub fn key_path(ssh_dir: &Path, email: &str) -> Result<PathBuf, ConfigError> {
    let invalid = || ConfigError::Invalid(format!("'{email}' is not a valid email address"));
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(ssh_dir.join(format!("id_ed25519_{}", local.replace('.', "_"))))
}

/// Execute the `ssh-key` command.
///
/// ssh-keygen runs without a shell so the address never reaches shell
/// parsing. Its passphrase prompts go to the terminal.
///
/// # Errors
///
/// Returns an error if no address is given, the key already exists,
/// ssh-keygen fails, or the public key is missing afterwards.
pub fn run(ctx: &ServiceContext, email: Option<&str>, ssh_dir: &Path) -> Result<(), Error> {
    let email = email
        .ok_or_else(|| ConfigError::Missing("--email-address was not specified".to_string()))?;
    let private_key = key_path(ssh_dir, email)?;
    if private_key.exists() {
        return Err(ConfigError::Invalid(format!(
            "key '{}' already exists; remove it first to generate a new one",
            private_key.display()
        ))
        .into());
    }
    if ensure_private_directory(ssh_dir)? {
        info!("Created SSH directory '{}'", ssh_dir.display());
    }

    let command = CommandLine::Argv(vec![
        "ssh-keygen".to_string(),
        "-t".to_string(),
        "ed25519".to_string(),
        "-C".to_string(),
        email.to_string(),
        "-f".to_string(),
        private_key.display().to_string(),
    ]);
    println!("{command}");
    ctx.runner("ssh-key").run(&ctx.request(command))?;

    let public_key = public_key_path(&private_key);
    if !public_key.is_file() {
        return Err(Error::MissingOutput(public_key));
    }
    info!("Will read file '{}'", public_key.display());
    let contents = std::fs::read_to_string(&public_key)?;

    println!("Please add the new key to your GitHub account at '{GITHUB_SETTINGS_KEYS_URL}':");
    for line in contents.lines() {
        println!("{}", line.trim());
    }
    Ok(())
}

/// Like [`crate::runner::ensure_directory`], but a directory created here
/// is readable by its owner only.
#[cfg(unix)]
fn ensure_private_directory(path: &Path) -> Result<bool, RunError> {
    use std::os::unix::fs::DirBuilderExt;

    if path.is_dir() {
        return Ok(false);
    }
    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(path)
        .map_err(RunError::filesystem(path))?;
    Ok(true)
}

#[cfg(not(unix))]
fn ensure_private_directory(path: &Path) -> Result<bool, RunError> {
    crate::runner::ensure_directory(path)
}

fn public_key_path(private_key: &Path) -> PathBuf {
    let mut path = private_key.as_os_str().to_os_string();
    path.push(".pub");
    PathBuf::from(path)
}
