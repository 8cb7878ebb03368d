//! URL routing
//!
//! Three addressable views: the single-page home, and one gallery page per
//! category under `/exhibitions/{slug}` and `/designs/{slug}`. A gallery path
//! whose slug is not in the catalog resolves to a not-found view that links
//! back to the home page's projects section.

use std::fmt;

use crate::catalog::{Catalog, Category, ProjectRecord};

/// Where the not-found view sends the visitor
pub const BACK_TO_PROJECTS: &str = "/#projects";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Exhibition(String),
    Design(String),
    /// Gallery path whose slug the catalog does not know
    NotFound { category: Category, slug: String },
    /// Any other path; nothing is rendered
    Unmatched(String),
}

impl Route {
    /// Match a path syntactically; query and fragment are ignored
    pub fn parse(path: &str) -> Route {
        let path = path
            .split(|c: char| c == '?' || c == '#')
            .next()
            .unwrap_or_default()
            .trim_end_matches('/');
        let mut segments = path.trim_start_matches('/').split('/');

        match (segments.next(), segments.next(), segments.next()) {
            (Some(""), None, None) => Route::Home,
            (Some("exhibitions"), Some(slug), None) if !slug.is_empty() => {
                Route::Exhibition(slug.to_string())
            }
            (Some("designs"), Some(slug), None) if !slug.is_empty() => {
                Route::Design(slug.to_string())
            }
            _ => Route::Unmatched(path.to_string()),
        }
    }

    /// Parse and check gallery slugs against the catalog
    pub fn resolve(path: &str, catalog: &Catalog) -> Route {
        let route = Route::parse(path);
        match route.gallery() {
            Some((category, slug)) if catalog.find(category, slug).is_none() => {
                tracing::debug!(%category, slug, "unknown project slug");
                Route::NotFound {
                    category,
                    slug: slug.to_string(),
                }
            }
            _ => route,
        }
    }

    fn gallery(&self) -> Option<(Category, &str)> {
        match self {
            Route::Exhibition(slug) => Some((Category::Exhibition, slug.as_str())),
            Route::Design(slug) => Some((Category::Design, slug.as_str())),
            _ => None,
        }
    }

    /// Project shown by a gallery route
    pub fn project<'a>(&self, catalog: &'a Catalog) -> Option<&'a ProjectRecord> {
        let (category, slug) = self.gallery()?;
        catalog.find(category, slug)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Route::NotFound { .. })
    }

    /// Link out of a gallery or not-found view
    pub fn back_link(&self) -> Option<&'static str> {
        match self {
            Route::Home | Route::Unmatched(_) => None,
            _ => Some(BACK_TO_PROJECTS),
        }
    }

    /// Heading of the not-found view
    pub fn not_found_title(&self) -> Option<&'static str> {
        match self {
            Route::NotFound {
                category: Category::Exhibition,
                ..
            } => Some("Exhibition Not Found"),
            Route::NotFound {
                category: Category::Design,
                ..
            } => Some("Design Not Found"),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => f.write_str("/"),
            Route::Exhibition(slug) => write!(f, "/exhibitions/{slug}"),
            Route::Design(slug) => write!(f, "/designs/{slug}"),
            Route::NotFound { category, slug } => write!(f, "{}/{slug}", category.path_prefix()),
            Route::Unmatched(path) => f.write_str(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_paths() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("/#projects"), Route::Home);
        assert_eq!(Route::parse("/exhibitions/aero"), Route::Exhibition("aero".into()));
        assert_eq!(Route::parse("/designs/asm/?tab=1"), Route::Design("asm".into()));
        assert_eq!(Route::parse("/designs"), Route::Unmatched("/designs".into()));
        assert_eq!(
            Route::parse("/exhibitions/aero/extra"),
            Route::Unmatched("/exhibitions/aero/extra".into())
        );
    }

    #[test]
    fn test_resolve_against_catalog() {
        let catalog = Catalog::builtin().unwrap();
        let route = Route::resolve("/exhibitions/aero", &catalog);
        assert_eq!(route.project(&catalog).unwrap().title, "AERO");
        assert_eq!(route.back_link(), Some(BACK_TO_PROJECTS));

        let missing = Route::resolve("/designs/aero", &catalog);
        assert!(missing.is_not_found());
        assert_eq!(missing.not_found_title(), Some("Design Not Found"));
        assert_eq!(missing.back_link(), Some("/#projects"));
        assert_eq!(missing.to_string(), "/designs/aero");
    }
}
