//! Template lookup behind a trait
//!
//! Templates are discovered once at startup into a manifest; request-time
//! existence checks are plain map lookups, never filesystem probes. Tests
//! build the manifest programmatically.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Existence check and body lookup for resolved view paths.
///
/// Keys have the form `Domain/Controller/view` (directories capitalized),
/// plus the top-level `Error` template.
pub trait TemplateResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Option<Arc<str>>;

    fn contains(&self, key: &str) -> bool {
        self.resolve(key).is_some()
    }
}

/// Manifest of known templates built at startup
#[derive(Default)]
pub struct ManifestTemplateResolver {
    templates: HashMap<String, Arc<str>>,
}

impl ManifestTemplateResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template body under its manifest key
    pub fn insert(&mut self, key: impl Into<String>, body: impl Into<String>) {
        let body: String = body.into();
        self.templates.insert(key.into(), Arc::from(body));
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Scan `<root>/<Domain>/<Controller>/<view>.html` into a manifest.
    /// A top-level `Error.html` registers as the `Error` template.
    ///
    /// Unreadable entries are errors: a deployment with a broken view tree
    /// should fail at boot, not 404 at request time.
    pub fn from_dir(root: &Path) -> Result<Self> {
        let mut manifest = Self::new();

        for domain_entry in std::fs::read_dir(root)
            .with_context(|| format!("cannot read view root {}", root.display()))?
        {
            let domain_entry = domain_entry?;
            let domain_path = domain_entry.path();
            let domain_name = domain_entry.file_name().to_string_lossy().into_owned();

            if domain_path.is_file() {
                if let Some(stem) = template_stem(&domain_name) {
                    let body = std::fs::read_to_string(&domain_path)
                        .with_context(|| format!("cannot read {}", domain_path.display()))?;
                    manifest.insert(stem, body);
                }
                continue;
            }

            for controller_entry in std::fs::read_dir(&domain_path)? {
                let controller_entry = controller_entry?;
                let controller_path = controller_entry.path();
                if !controller_path.is_dir() {
                    continue;
                }
                let controller_name = controller_entry.file_name().to_string_lossy().into_owned();

                for view_entry in std::fs::read_dir(&controller_path)? {
                    let view_entry = view_entry?;
                    let view_path = view_entry.path();
                    if !view_path.is_file() {
                        continue;
                    }
                    let file_name = view_entry.file_name().to_string_lossy().into_owned();
                    if let Some(stem) = template_stem(&file_name) {
                        let body = std::fs::read_to_string(&view_path)
                            .with_context(|| format!("cannot read {}", view_path.display()))?;
                        manifest.insert(
                            format!("{}/{}/{}", domain_name, controller_name, stem),
                            body,
                        );
                    }
                }
            }
        }

        Ok(manifest)
    }
}

fn template_stem(file_name: &str) -> Option<&str> {
    file_name.strip_suffix(".html")
}

impl TemplateResolver for ManifestTemplateResolver {
    fn resolve(&self, key: &str) -> Option<Arc<str>> {
        self.templates.get(key).cloned()
    }
}
