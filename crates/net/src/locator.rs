//! Source locator parsing
//!
//! Locators follow the getter convention used by infrastructure tooling:
//!
//! - an optional forced transport prefix: `git::`, `http::`, `file::`
//! - a `//subdir` selector after the repository or archive address
//! - a `?ref=` query selecting a git branch, tag or commit

use artifetch_errors::{Error, FetchError};

/// Which transport a locator resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    Git,
    Http,
    Local,
}

/// A parsed source locator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    kind: LocatorKind,
    location: String,
    subdir: Option<String>,
    reference: Option<String>,
}

impl Locator {
    /// Parse a source string
    ///
    /// # Errors
    ///
    /// Returns an error if the locator is empty, names an unknown forced
    /// transport, or has an empty address.
    pub fn parse(source: &str) -> Result<Self, Error> {
        let raw = source.trim();
        if raw.is_empty() {
            return Err(invalid(source, "empty locator"));
        }

        let (forced, rest) = split_forced(raw)?;
        let (address, subdir) = split_subdir(rest);
        if address.is_empty() {
            return Err(invalid(source, "missing address"));
        }

        let kind = match forced {
            Some(kind) => kind,
            None => detect_kind(&address),
        };

        let (location, reference) = match kind {
            LocatorKind::Git => {
                let (location, reference) = take_query_param(&address, "ref");
                (normalize_git(&location), reference)
            }
            LocatorKind::Local => (
                address
                    .strip_prefix("file://")
                    .map_or_else(|| address.clone(), str::to_string),
                None,
            ),
            LocatorKind::Http => (address, None),
        };

        Ok(Self {
            raw: raw.to_string(),
            kind,
            location,
            subdir,
            reference,
        })
    }

    /// The locator as written by the user
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    #[must_use]
    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    /// Repository URL, download URL or filesystem path
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Subdirectory selected with `//`
    #[must_use]
    pub fn subdir(&self) -> Option<&str> {
        self.subdir.as_deref()
    }

    /// Git branch, tag or commit selected with `?ref=`
    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

fn invalid(source: &str, reason: &str) -> Error {
    FetchError::InvalidLocator {
        source_str: source.to_string(),
        reason: reason.to_string(),
    }
    .into()
}

/// Strip a `name::` prefix, provided it appears before any path separator
fn split_forced(raw: &str) -> Result<(Option<LocatorKind>, &str), Error> {
    let Some(idx) = raw.find("::") else {
        return Ok((None, raw));
    };
    let name = &raw[..idx];
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Ok((None, raw));
    }

    let kind = match name {
        "git" => LocatorKind::Git,
        "http" | "https" => LocatorKind::Http,
        "file" => LocatorKind::Local,
        other => {
            return Err(FetchError::UnsupportedScheme {
                scheme: other.to_string(),
            }
            .into())
        }
    };
    Ok((Some(kind), &raw[idx + 2..]))
}

/// Split `address//subdir?query` into `address?query` and `subdir`
fn split_subdir(rest: &str) -> (String, Option<String>) {
    let (base, query) = match rest.find('?') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    let offset = base.find("://").map_or(0, |idx| idx + 3);
    match base[offset..].find("//") {
        Some(idx) => {
            let split = offset + idx;
            let subdir = base[split + 2..].trim_matches('/');
            let address = format!("{}{query}", &base[..split]);
            let subdir = (!subdir.is_empty()).then(|| subdir.to_string());
            (address, subdir)
        }
        None => (rest.to_string(), None),
    }
}

fn detect_kind(address: &str) -> LocatorKind {
    let without_query = address.split('?').next().unwrap_or(address);

    if address.starts_with("git@") || address.starts_with("ssh://") {
        LocatorKind::Git
    } else if address.starts_with("github.com/")
        || address.starts_with("gitlab.com/")
        || address.starts_with("bitbucket.org/")
    {
        LocatorKind::Git
    } else if address.starts_with("http://") || address.starts_with("https://") {
        if without_query.ends_with(".git") {
            LocatorKind::Git
        } else {
            LocatorKind::Http
        }
    } else {
        LocatorKind::Local
    }
}

/// Expand host shorthands into cloneable https URLs
fn normalize_git(location: &str) -> String {
    if location.starts_with("github.com/")
        || location.starts_with("gitlab.com/")
        || location.starts_with("bitbucket.org/")
    {
        format!("https://{location}")
    } else {
        location.to_string()
    }
}

/// Remove `key` from the query string, returning the remaining address and its value
fn take_query_param(address: &str, key: &str) -> (String, Option<String>) {
    let Some((base, query)) = address.split_once('?') else {
        return (address.to_string(), None);
    };

    let mut value = None;
    let mut kept = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        match pair.split_once('=') {
            Some((k, v)) if k == key => value = Some(v.to_string()),
            _ => kept.push(pair),
        }
    }

    let address = if kept.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", kept.join("&"))
    };
    (address, value.filter(|v| !v.is_empty()))
}

/// Shorten a locator for human-readable log lines
///
/// `git@github.com:org/repo.git//mod` becomes `org/repo.git/mod`, and
/// `git::https://github.com/org/repo.git//mod` becomes
/// `github.com/org/repo.git/mod`. Other locators are returned as-is.
#[must_use]
pub fn display_source(source: &str) -> String {
    let source = match split_forced(source) {
        Ok((Some(_), rest)) => rest,
        _ => source,
    };

    if source.contains('@') {
        let mut parts = source.split(':');
        parts.next();
        let tail = parts.collect::<Vec<_>>().join(":");
        if tail.is_empty() {
            source.to_string()
        } else {
            tail.replacen("//", "/", 1)
        }
    } else if source.contains("//") {
        source.split("//").skip(1).collect::<Vec<_>>().join("/")
    } else {
        source.to_string()
    }
}
