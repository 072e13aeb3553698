//! Scope pattern compilation and matching.
//!
//! Patterns support glob wildcards (`**` crosses path separators, `*` stays
//! within one segment, `?` matches one character) and environment-style
//! path-variable expansion at the front of the pattern: `$HOME`, `$APPDATA`,
//! `$CONFIG`, `$TEMP`.

use crate::error::acl::AclError;

use common::ErrorLocation;

use std::panic::Location;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

/// Platform directories are resolved once per process.
static HOME_DIR: Lazy<Option<PathBuf>> = Lazy::new(dirs::home_dir);
static DATA_DIR: Lazy<Option<PathBuf>> = Lazy::new(dirs::data_dir);
static CONFIG_DIR: Lazy<Option<PathBuf>> = Lazy::new(dirs::config_dir);

/// A compiled scope pattern, matched against extracted scope values.
#[derive(Debug, Clone)]
pub struct ScopePattern {
    source: String,
    regex: Regex,
}

impl ScopePattern {
    /// Compile a glob pattern, expanding a leading path variable first.
    ///
    /// # Errors
    ///
    /// Returns [`AclError::Pattern`] when a leading variable is unknown or
    /// cannot be resolved on this platform.
    pub fn compile(pattern: &str) -> Result<Self, AclError> {
        let expanded = expand_variables(pattern)?;
        let regex = Regex::new(&glob_to_regex(&expanded))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Whether the given scope value satisfies this pattern.
    pub fn matches(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }

    /// The original (unexpanded) pattern text.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Expand a leading `$VARIABLE` into its platform directory.
fn expand_variables(pattern: &str) -> Result<String, AclError> {
    let Some(rest) = pattern.strip_prefix('$') else {
        return Ok(pattern.to_string());
    };

    let (name, tail) = match rest.find(['/', '\\']) {
        Some(index) => (&rest[..index], &rest[index..]),
        None => (rest, ""),
    };

    let resolved = match name {
        "HOME" => HOME_DIR.clone(),
        "APPDATA" => DATA_DIR.clone(),
        "CONFIG" => CONFIG_DIR.clone(),
        "TEMP" => Some(std::env::temp_dir()),
        _ => {
            return Err(AclError::Pattern {
                message: format!("Unknown path variable '${name}' in scope pattern '{pattern}'"),
                location: ErrorLocation::from(Location::caller()),
            });
        }
    };

    let resolved = resolved.ok_or_else(|| AclError::Pattern {
        message: format!("Path variable '${name}' has no value on this platform"),
        location: ErrorLocation::from(Location::caller()),
    })?;

    Ok(format!("{}{tail}", resolved.display()))
}

/// Translate a glob into an anchored regex.
fn glob_to_regex(glob: &str) -> String {
    let mut regex = String::with_capacity(glob.len() * 2 + 2);
    regex.push('^');

    let mut chars = glob.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    // `**/` also swallows the separator so `a/**/b`
                    // matches `a/b`.
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        regex.push_str("(?:.*/)?");
                    } else {
                        regex.push_str(".*");
                    }
                } else {
                    regex.push_str("[^/]*");
                }
            }
            '?' => regex.push_str("[^/]"),
            c => regex.push_str(&regex::escape(&c.to_string())),
        }
    }

    regex.push('$');
    regex
}
