//! Username/password pair persisted in the local `.hdarc` file

use std::fmt;
use std::path::{Path, PathBuf};
use crate::config::credentials_path;
use crate::error::{Result, SdkError};

/// Account credentials used for the token exchange
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn is_well_formed(value: &str) -> bool {
    !value.is_empty() && !value.chars().any(char::is_whitespace)
}

/// Single-quoted scalar, `'` doubled inside
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn unquote(value: &str) -> String {
    let value = value.trim();
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].replace("''", "'");
    }
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}

impl Credentials {
    /// Creates a credential pair
    ///
    /// Fails with `MalformedCredentials` when either value is empty or
    /// contains whitespace.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if !is_well_formed(&username) || !is_well_formed(&password) {
            return Err(SdkError::MalformedCredentials);
        }
        Ok(Self { username, password })
    }

    /// Loads the credentials from the default `.hdarc` location
    pub fn load() -> Result<Self> {
        Self::load_from(credentials_path())
    }

    /// Loads the credentials from an explicit file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SdkError::CredentialsNotFound(path.to_path_buf()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut user = None;
        let mut password = None;
        for line in content.lines() {
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            match field.trim() {
                "user" => user = Some(unquote(value)),
                "password" => password = Some(unquote(value)),
                _ => {}
            }
        }

        match (user, password) {
            (Some(user), Some(password)) => Self::new(user, password),
            _ => Err(SdkError::CorruptedCredentials(path.to_path_buf())),
        }
    }

    /// Writes the credentials to the default `.hdarc` location
    pub fn save(&self) -> Result<PathBuf> {
        let path = credentials_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Writes the credentials to an explicit file, creating its directory
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = format!(
            "password: {}\nuser: {}\n",
            quote(&self.password),
            quote(&self.username)
        );
        std::fs::write(path, content).map_err(|e| {
            log::error!(
                "Credentials could not be written to {}. Please review your configuration.",
                path.display()
            );
            SdkError::Io(e)
        })?;

        log::info!("Credentials are written to file {}", path.display());
        Ok(())
    }
}
