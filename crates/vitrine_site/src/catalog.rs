//! Project catalog
//!
//! The static list of exhibition and design projects, the image-ordering
//! rule for a project folder, and the filter/expand view used by the
//! projects grid.
//!
//! Slugs are unique within a category; the same slug may appear once as an
//! exhibition and once as a design.

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiteError};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

/// Cards per category in the collapsed "all" view
pub const COLLAPSED_PER_CATEGORY: usize = 4;

const IMAGE_EXTENSIONS: [&str; 4] = ["webp", "png", "jpg", "jpeg"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Exhibition,
    Design,
}

impl Category {
    /// Route prefix of the category's gallery pages
    pub fn path_prefix(&self) -> &'static str {
        match self {
            Category::Exhibition => "/exhibitions",
            Category::Design => "/designs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Exhibition => "Exhibitions",
            Category::Design => "Designs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Exhibition => "exhibition",
            Category::Design => "design",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProjectRecord {
    pub id: String,
    pub title: String,
    pub category: Category,
    pub slug: String,
    /// Image directory under the category's asset root
    pub folder: String,
}

impl ProjectRecord {
    /// Gallery page path for this project
    pub fn link(&self) -> String {
        format!("{}/{}", self.category.path_prefix(), self.slug)
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "project")]
    projects: Vec<ProjectRecord>,
}

/// Immutable list of projects, exhibitions and designs in declaration order
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<ProjectRecord>,
}

impl Catalog {
    /// The site's own project list
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse `[[project]]` tables
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.projects)
    }

    pub fn new(records: Vec<ProjectRecord>) -> Result<Self> {
        let mut seen_slugs = FxHashSet::default();
        let mut seen_ids = FxHashSet::default();
        for record in &records {
            if record.slug.is_empty() || record.id.is_empty() {
                return Err(SiteError::Catalog(format!(
                    "project `{}` has an empty id or slug",
                    record.title
                )));
            }
            if !seen_slugs.insert((record.category, record.slug.as_str())) {
                return Err(SiteError::Catalog(format!(
                    "duplicate {} slug `{}`",
                    record.category, record.slug
                )));
            }
            if !seen_ids.insert((record.category, record.id.as_str())) {
                return Err(SiteError::Catalog(format!(
                    "duplicate {} id `{}`",
                    record.category, record.id
                )));
            }
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &ProjectRecord> + '_ {
        self.records.iter().filter(move |r| r.category == category)
    }

    pub fn find(&self, category: Category, slug: &str) -> Option<&ProjectRecord> {
        self.by_category(category).find(|r| r.slug == slug)
    }

    pub fn link_for(&self, record: &ProjectRecord) -> String {
        record.link()
    }
}

// ============================================================================
// Images
// ============================================================================

fn number_token() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()
}

fn split_name(path: &str) -> (&str, Option<&str>) {
    let name = path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (name, None),
    }
}

pub fn is_image(path: &str) -> bool {
    split_name(path)
        .1
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// First integer embedded in the file stem, 0 if none
///
/// Runs too long for a `u64` saturate so they sort after every other number.
pub fn sort_key(path: &str) -> u64 {
    let (stem, _) = split_name(path);
    number_token()
        .and_then(|re| re.find(stem))
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Image files of a folder in display order
///
/// Non-image files are dropped. Files with equal keys keep their input order.
pub fn sorted_images<I, S>(files: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut images: Vec<String> = files
        .into_iter()
        .filter(|f| is_image(f.as_ref()))
        .map(|f| f.as_ref().to_string())
        .collect();
    images.sort_by_key(|f| sort_key(f));
    images
}

/// Thumbnail for a folder: the first image in display order
pub fn featured_image<I, S>(files: I) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    sorted_images(files).into_iter().next()
}

// ============================================================================
// Filter view
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Exhibitions,
    Designs,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Exhibitions, Filter::Designs];

    pub fn label(&self) -> &'static str {
        match self {
            Filter::All => "All Projects",
            Filter::Exhibitions => "Exhibitions",
            Filter::Designs => "Designs",
        }
    }

    pub fn matches(&self, category: Category) -> bool {
        match self {
            Filter::All => true,
            Filter::Exhibitions => category == Category::Exhibition,
            Filter::Designs => category == Category::Design,
        }
    }
}

impl FromStr for Filter {
    type Err = SiteError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "exhibitions" | "exhibition" => Ok(Filter::Exhibitions),
            "designs" | "design" => Ok(Filter::Designs),
            other => Err(SiteError::Catalog(format!("unknown filter `{other}`"))),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Filter::All => "all",
            Filter::Exhibitions => "exhibitions",
            Filter::Designs => "designs",
        })
    }
}

/// Filter selection plus the "view all" toggle of the projects grid
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogView {
    filter: Filter,
    expanded: bool,
}

impl CatalogView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Select a filter; switching to a different one collapses the view
    ///
    /// Returns whether anything changed.
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.expanded = false;
        true
    }

    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        let changed = self.expanded != expanded;
        self.expanded = expanded;
        changed
    }

    /// Records shown for the current selection, in catalog order
    ///
    /// The collapsed "all" view shows the first few of each category,
    /// exhibitions first.
    pub fn visible<'a>(&self, catalog: &'a Catalog) -> Vec<&'a ProjectRecord> {
        match self.filter {
            Filter::All => {
                let limit = if self.expanded {
                    usize::MAX
                } else {
                    COLLAPSED_PER_CATEGORY
                };
                catalog
                    .by_category(Category::Exhibition)
                    .take(limit)
                    .chain(catalog.by_category(Category::Design).take(limit))
                    .collect()
            }
            filter => catalog
                .records()
                .iter()
                .filter(|r| filter.matches(r.category))
                .collect(),
        }
    }

    /// Whether a "view all" control applies
    pub fn has_more(&self, catalog: &Catalog) -> bool {
        self.filter == Filter::All && !self.expanded && self.visible(catalog).len() < catalog.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(category: Category, slug: &str) -> ProjectRecord {
        ProjectRecord {
            id: slug.to_string(),
            title: slug.to_uppercase(),
            category,
            slug: slug.to_string(),
            folder: slug.replace('-', " "),
        }
    }

    fn small_catalog() -> Catalog {
        let mut records = Vec::new();
        for i in 0..5 {
            records.push(record(Category::Exhibition, &format!("expo-{i}")));
        }
        for i in 0..5 {
            records.push(record(Category::Design, &format!("design-{i}")));
        }
        Catalog::new(records).unwrap()
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.by_category(Category::Exhibition).count(), 38);
        assert_eq!(catalog.by_category(Category::Design).count(), 22);

        let aero = catalog.find(Category::Exhibition, "aero").unwrap();
        assert_eq!(aero.title, "AERO");
        assert_eq!(aero.link(), "/exhibitions/aero");
        assert!(catalog.find(Category::Design, "aero").is_none());

        // Same slug in both categories
        assert!(catalog.find(Category::Exhibition, "logicom").is_some());
        assert!(catalog.find(Category::Design, "logicom").is_some());
    }

    #[test]
    fn test_duplicate_slug_in_category_rejected() {
        let records = vec![
            record(Category::Design, "asm"),
            record(Category::Design, "asm"),
        ];
        assert!(matches!(Catalog::new(records), Err(SiteError::Catalog(_))));
    }

    #[test]
    fn test_images_sort_by_embedded_number() {
        let files = [
            "Artboard 10.webp",
            "notes.txt",
            "Artboard 2.webp",
            "cover.jpg",
            "Artboard 1.PNG",
            "folder/Artboard 2 copy.jpeg",
        ];
        assert_eq!(
            sorted_images(files),
            vec![
                "cover.jpg",
                "Artboard 1.PNG",
                "Artboard 2.webp",
                "folder/Artboard 2 copy.jpeg",
                "Artboard 10.webp",
            ]
        );
        assert_eq!(featured_image(["b 3.png", "a 7.png"]).as_deref(), Some("b 3.png"));
        assert_eq!(featured_image(["readme.md"]), None);
    }

    #[test]
    fn test_oversized_number_sorts_last() {
        let huge = "Artboard 184467440737095516160.png";
        assert_eq!(sort_key(huge), u64::MAX);
        assert_eq!(sort_key("Artboard 0000000000000000000000007.png"), 7);
        assert_eq!(
            sorted_images([huge, "Artboard 3.png", "cover.png"]),
            vec!["cover.png", "Artboard 3.png", huge]
        );
    }

    #[test]
    fn test_collapsed_all_shows_four_of_each() {
        let catalog = small_catalog();
        let view = CatalogView::new();
        let slugs: Vec<_> = view.visible(&catalog).iter().map(|r| r.slug.as_str()).collect();
        assert_eq!(
            slugs,
            ["expo-0", "expo-1", "expo-2", "expo-3", "design-0", "design-1", "design-2", "design-3"]
        );
        assert!(view.has_more(&catalog));
    }

    #[test]
    fn test_category_filter_keeps_order() {
        let catalog = small_catalog();
        let mut view = CatalogView::new();
        view.set_expanded(true);
        assert_eq!(view.visible(&catalog).len(), 10);

        assert!(view.set_filter(Filter::Exhibitions));
        assert!(!view.is_expanded());
        let visible = view.visible(&catalog);
        assert_eq!(visible.len(), 5);
        assert!(visible.iter().all(|r| r.category == Category::Exhibition));
        assert_eq!(visible[0].slug, "expo-0");
        assert_eq!(visible[4].slug, "expo-4");
        assert!(!view.has_more(&catalog));
        assert!(!view.set_filter(Filter::Exhibitions));
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("Designs".parse::<Filter>().unwrap(), Filter::Designs);
        assert_eq!(Filter::Exhibitions.to_string(), "exhibitions");
        assert!("photos".parse::<Filter>().is_err());
    }
}
