//! Convention-based view resolution
//!
//! A short view name plus the request's route context selects a template:
//! `Capitalize(domain)/Capitalize(controller or default)/view`. Resolution
//! is existence-checked before the response status is chosen, with the
//! error template as the graceful fallback.

pub mod renderer;
pub mod resolver;

pub use renderer::{Renderer, ERROR_VIEW};
pub use resolver::{ManifestTemplateResolver, TemplateResolver};

/// Capitalize the first character, the way view directories are named
pub(crate) fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
