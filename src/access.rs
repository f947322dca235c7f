use std::collections::HashMap;
use std::fs;

use crate::error::AccessTableError;

/// RoleAccessTable
///
/// Static mapping from a role display name (exactly as it appears in the
/// `so_user_role` cookie) to the URL path prefixes that role may reach.
///
/// Built once at startup and shared read-only behind an `Arc`. Role names are
/// compared with exact, case-sensitive equality. A role with no entry gets no
/// prefixes, which the guard treats as home-only access.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleAccessTable {
    entries: HashMap<String, Vec<String>>,
}

impl RoleAccessTable {
    /// Builds a table from `(role, prefixes)` pairs, validating every prefix.
    pub fn new<R, P, I>(entries: I) -> Result<Self, AccessTableError>
    where
        I: IntoIterator<Item = (R, Vec<P>)>,
        R: Into<String>,
        P: Into<String>,
    {
        let mut table = HashMap::new();
        for (role, prefixes) in entries {
            let role = role.into();
            let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
            if let Some(bad) = prefixes.iter().find(|p| !p.starts_with('/')) {
                return Err(AccessTableError::InvalidPrefix {
                    role,
                    prefix: bad.clone(),
                });
            }
            table.insert(role, prefixes);
        }
        Ok(Self { entries: table })
    }

    /// builtin
    ///
    /// The role table the portal ships with, covering the five roles the
    /// identity flow can assign.
    pub fn builtin() -> Self {
        let entries = [
            (
                "SO Admin",
                vec![
                    "/manage-organizations",
                    "/manage-users",
                    "/notifications",
                    "/profile",
                ],
            ),
            (
                "SO System Admin",
                vec![
                    "/manage-organizations",
                    "/manage-organizations-details",
                    "/manage-users",
                    "/manage-applications",
                    "/notifications",
                    "/profile",
                ],
            ),
            (
                "Org Admin",
                vec![
                    "/organization",
                    "/manage-users",
                    "/manage-applications",
                    "/notifications",
                    "/profile",
                ],
            ),
            (
                "Standard User",
                vec!["/applications", "/notifications", "/profile"],
            ),
            ("Read Only", vec!["/notifications"]),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(role, prefixes)| {
                    (
                        role.to_string(),
                        prefixes.into_iter().map(str::to_string).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Parses a JSON object of the form `{ "<role>": ["<prefix>", ...] }`.
    pub fn from_json(raw: &str) -> Result<Self, AccessTableError> {
        let parsed: HashMap<String, Vec<String>> = serde_json::from_str(raw)?;
        Self::new(parsed)
    }

    /// Reads and parses a JSON role table from disk.
    pub fn from_file(path: &str) -> Result<Self, AccessTableError> {
        let raw = fs::read_to_string(path).map_err(|source| AccessTableError::Io {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// load
    ///
    /// Resolves the table used at startup: the file at `path` when one is
    /// configured, otherwise the built-in table.
    pub fn load(path: Option<&str>) -> Result<Self, AccessTableError> {
        match path {
            Some(path) => {
                let table = Self::from_file(path)?;
                tracing::info!(path, roles = table.len(), "Loaded role access table from file");
                Ok(table)
            }
            None => Ok(Self::builtin()),
        }
    }

    pub fn allowed_prefixes(&self, role: &str) -> Option<&[String]> {
        self.entries.get(role).map(Vec::as_slice)
    }

    pub fn contains_role(&self, role: &str) -> bool {
        self.entries.contains_key(role)
    }

    /// True when `role` has an entry whose prefix covers `path`.
    pub fn allows(&self, role: &str, path: &str) -> bool {
        self.allowed_prefixes(role)
            .is_some_and(|prefixes| prefixes.iter().any(|p| path_matches_prefix(path, p)))
    }

    /// Role names in sorted order.
    pub fn roles(&self) -> Vec<&str> {
        let mut roles: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        roles.sort_unstable();
        roles
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// path_matches_prefix
///
/// Segment-boundary prefix match: `path` is covered by `prefix` when the two
/// are equal or `path` continues `prefix` with a `/`. So `/manage-organizations/abc`
/// matches `/manage-organizations`, while `/manage-organizations-details` does not.
pub fn path_matches_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
