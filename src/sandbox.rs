//! Capability/sandbox seam (§3.6 ambient additions).
//!
//! Grounded on the teacher's `capability.rs`, which gates host-visible effects (file
//! I/O, network, subprocess spawn) behind an explicit allow-list a host must grant
//! before running untrusted code. Viro carries the same seam for the same reason —
//! ports (§3.1) are the one place the core touches the outside world — plus a path
//! containment check (`SandboxRoot`) the teacher does not need, because Viro's ports
//! are scoped to a single root directory rather than an arbitrary filesystem view.

use std::path::{Path, PathBuf};

use crate::error::{self, EvalResult};

/// A single host-mediated effect a script may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    FileRead,
    FileWrite,
    Network,
}

/// The capabilities granted to a running evaluator. Empty by default — a host must
/// opt in explicitly (§3.6).
#[derive(Debug, Clone, Default)]
pub struct CapabilitySet {
    granted: std::collections::HashSet<Capability>,
}

impl CapabilitySet {
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, cap: Capability) -> Self {
        self.granted.insert(cap);
        self
    }

    #[must_use]
    pub fn has(&self, cap: Capability) -> bool {
        self.granted.contains(&cap)
    }

    pub fn require(&self, cap: Capability) -> EvalResult<()> {
        if self.has(cap) {
            Ok(())
        } else {
            Err(error::access_error(format!("capability not granted: {cap:?}")))
        }
    }
}

/// Confines port paths to a single root directory.
#[derive(Debug, Clone)]
pub struct SandboxRoot {
    root: PathBuf,
}

impl SandboxRoot {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolves `requested` against the root, rejecting any path (via `..` or an
    /// absolute override) that would escape it.
    pub fn resolve_within_root(&self, requested: &str) -> EvalResult<PathBuf> {
        let candidate = self.root.join(requested);
        let mut normalized = PathBuf::new();
        for component in candidate.components() {
            match component {
                std::path::Component::ParentDir => {
                    if !normalized.pop() {
                        return Err(error::access_error(format!("path escapes sandbox root: {requested}")));
                    }
                }
                std::path::Component::CurDir => {}
                other => normalized.push(other.as_os_str()),
            }
        }
        if !normalized.starts_with(&self.root) {
            return Err(error::access_error(format!("path escapes sandbox root: {requested}")));
        }
        Ok(normalized)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_escape_via_parent_dir_is_rejected() {
        let sandbox = SandboxRoot::new("/srv/viro");
        assert!(sandbox.resolve_within_root("../../etc/passwd").is_err());
    }

    #[test]
    fn nested_path_resolves_inside_root() {
        let sandbox = SandboxRoot::new("/srv/viro");
        let resolved = sandbox.resolve_within_root("data/notes.txt").unwrap();
        assert_eq!(resolved, PathBuf::from("/srv/viro/data/notes.txt"));
    }

    #[test]
    fn capability_set_denies_until_granted() {
        let caps = CapabilitySet::none();
        assert!(caps.require(Capability::FileRead).is_err());
        let caps = caps.with(Capability::FileRead);
        assert!(caps.require(Capability::FileRead).is_ok());
    }
}
