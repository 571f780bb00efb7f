//! Key/value configuration source
//!
//! Deployments expose pod annotations through the Kubernetes downward API as
//! a file of `key="value"` lines. Values are Go-quoted strings.

use std::{collections::HashMap, io::ErrorKind, path::Path};

use tracing::{debug, warn};

use super::{ConfigError, ConfigResult};

pub const DEFAULT_ANNOTATIONS_PATH: &str = "/etc/podinfo/annotations";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    values: HashMap<String, String>,
}

impl Annotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the downward-API annotation format. Lines without `=` are skipped.
    pub fn parse(content: &str) -> Self {
        let values = content
            .lines()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                let (key, value) = line.split_once('=')?;
                let key = key.trim();
                if key.is_empty() {
                    debug!("Skipping annotation line without key: {}", line);
                    return None;
                }
                Some((key.to_string(), unquote(value.trim())))
            })
            .collect();
        Self { values }
    }

    /// Load annotations from `path`.
    ///
    /// A missing file is not an error: the engine may run outside a pod, in
    /// which case every setting keeps its default.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    "Annotations file {} not found, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            Err(e) => Err(ConfigError::AnnotationsUnreadable {
                path: path.display().to_string(),
                source: e,
            }),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Annotations
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Strip surrounding double quotes and undo Go string escaping
fn unquote(raw: &str) -> String {
    let inner = match raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner,
        None => return raw.to_string(),
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
