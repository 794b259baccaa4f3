//! Command allowlist.
//!
//! A command is allowed when it starts with at least one configured entry.
//! Matching is a plain, case-sensitive `starts_with` with no awareness of
//! shell syntax: the entry `rm` admits `rmdir` and `rm -rf /` alike. This is
//! a coarse policy for keeping honest mistakes off the host, not a security
//! boundary.

use crate::error::AllowlistError;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Durable home of the allowlist. `persist` receives the complete new list.
pub trait AllowlistStore: Send + Sync {
    fn persist(&self, entries: &[String]) -> Result<()>;
}

/// Rewrites the `allowlist` key of a TOML config file, leaving every other
/// key as it was on disk.
pub struct ConfigAllowlistStore {
    path: PathBuf,
}

impl ConfigAllowlistStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AllowlistStore for ConfigAllowlistStore {
    fn persist(&self, entries: &[String]) -> Result<()> {
        let mut table: toml::Table = match fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => toml::Table::new(),
            Ok(content) => toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", self.path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => toml::Table::new(),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        table.insert(
            "allowlist".to_string(),
            toml::Value::Array(entries.iter().cloned().map(toml::Value::String).collect()),
        );

        let rendered = toml::to_string_pretty(&table).context("Failed to serialize config")?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, rendered).context("Failed to write config file")?;
        fs::rename(&tmp, &self.path).context("Failed to replace config file")?;
        Ok(())
    }
}

/// The set of permitted command prefixes.
pub struct Allowlist {
    entries: Mutex<Vec<String>>,
    store: Box<dyn AllowlistStore>,
}

impl Allowlist {
    pub fn new(entries: Vec<String>, store: Box<dyn AllowlistStore>) -> Self {
        let mut unique: Vec<String> = Vec::with_capacity(entries.len());
        for entry in entries {
            if !entry.is_empty() && !unique.contains(&entry) {
                unique.push(entry);
            }
        }
        Self {
            entries: Mutex::new(unique),
            store,
        }
    }

    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(
            config.allowlist.clone(),
            Box::new(ConfigAllowlistStore::new(&config.config_path)),
        )
    }

    pub fn is_allowed(&self, command: &str) -> bool {
        let allowed = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| command.starts_with(entry.as_str()));
        tracing::info!(command = %command, allowed, "allowlist check");
        allowed
    }

    /// The first command that fails the check, if any.
    pub fn first_disallowed<'a, I>(&self, commands: I) -> Option<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        commands.into_iter().find(|command| !self.is_allowed(command))
    }

    /// Add a prefix, stored exactly as given: a trailing space is how an
    /// entry asks for a word boundary. Returns `Ok(false)` when it was
    /// already present.
    ///
    /// The new list is persisted before it takes effect; if persisting
    /// fails the in-memory list is left untouched.
    pub fn add(&self, prefix: &str) -> std::result::Result<bool, AllowlistError> {
        if prefix.trim().is_empty() {
            return Err(AllowlistError::EmptyPrefix);
        }

        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.iter().any(|entry| entry == prefix) {
            tracing::debug!(prefix = %prefix, "allowlist entry already present");
            return Ok(false);
        }

        let mut next = entries.clone();
        next.push(prefix.to_string());
        self.store
            .persist(&next)
            .map_err(|e| AllowlistError::Persist(format!("{e:#}")))?;
        *entries = next;

        tracing::info!(prefix = %prefix, "allowlist entry added");
        Ok(true)
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
