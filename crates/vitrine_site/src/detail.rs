//! Project gallery page
//!
//! Mounted for `/exhibitions/{slug}` and `/designs/{slug}`. The heading rises
//! in first, then the image grid follows in a stagger; clicking an image opens
//! the lightbox on it. Both entrances only play once the project has images.
//! An unknown slug mounts the not-found view: a heading and a link back to the
//! home page's projects section, nothing animated.

use tracing::debug;
use vitrine_core::{ElementId, ElementKind, Layout, Rect};

use crate::catalog::{sorted_images, Catalog, ProjectRecord};
use crate::gallery::{Gallery, GalleryElements, GalleryKey};
use crate::host::HostContext;
use crate::navbar::{Navbar, NavbarElements};
use crate::orbs::{BackgroundOrbs, OrbElements};
use crate::page::column_rect;
use crate::reveal::{presets, RevealCoordinator};
use crate::routes::Route;

const HEADER_TOP: f32 = 128.0;
const HEADER_HEIGHT: f32 = 320.0;
const IMAGE_WIDTH: f32 = 400.0;
const IMAGE_HEIGHT: f32 = 300.0;

/// What the page shows
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailView {
    Project { title: String, images: Vec<String> },
    NotFound { title: &'static str },
}

#[derive(Clone, Debug)]
pub struct DetailElements {
    pub header: ElementId,
    pub back_link: ElementId,
    pub images: Vec<ElementId>,
    pub gallery: GalleryElements,
}

impl DetailElements {
    pub fn create(layout: &Layout, width: f32, height: f32, images: usize) -> Self {
        let grid_top = HEADER_TOP + HEADER_HEIGHT + 64.0;
        Self {
            header: layout.insert(
                "detail.header",
                Rect::new(0.0, HEADER_TOP, width, HEADER_HEIGHT),
            ),
            back_link: layout.insert_kind(
                "detail.back",
                ElementKind::Link,
                Rect::new(48.0, HEADER_TOP, 220.0, 32.0),
            ),
            images: (0..images)
                .map(|i| {
                    layout.insert_kind(
                        format!("detail.image.{i}"),
                        ElementKind::Interactive,
                        column_rect(width, grid_top, i, IMAGE_WIDTH, IMAGE_HEIGHT),
                    )
                })
                .collect(),
            gallery: GalleryElements::create(layout, width, height),
        }
    }
}

/// One project's image page, or the not-found view for a bad slug
pub struct DetailPage {
    route: Route,
    view: DetailView,
    elements: DetailElements,
    reveals: RevealCoordinator,
    gallery: Gallery,
    orbs: BackgroundOrbs,
    navbar: Navbar,
}

impl DetailPage {
    /// Mount the view for a gallery or not-found route
    ///
    /// `list_images` returns the file names in the project's folder; only
    /// images are kept, in display order. Other routes mount nothing.
    pub fn mount<F>(
        ctx: &HostContext,
        route: &Route,
        catalog: &Catalog,
        list_images: F,
    ) -> Option<Self>
    where
        F: FnOnce(&ProjectRecord) -> Vec<String>,
    {
        let view = match route {
            Route::Exhibition(_) | Route::Design(_) => {
                let project = route.project(catalog)?;
                DetailView::Project {
                    title: project.title.clone(),
                    images: sorted_images(list_images(project)),
                }
            }
            Route::NotFound { .. } => DetailView::NotFound {
                title: route.not_found_title().unwrap_or("Not Found"),
            },
            Route::Home | Route::Unmatched(_) => return None,
        };

        let layout = ctx.layout();
        let viewport = ctx.viewport();
        let images = match &view {
            DetailView::Project { images, .. } => images.len(),
            DetailView::NotFound { .. } => 0,
        };
        let orbs = BackgroundOrbs::mount(
            ctx,
            OrbElements::create(layout, viewport.width, viewport.height),
        );
        // Section links have no targets here
        let navbar = Navbar::mount(
            ctx,
            NavbarElements::create(layout, viewport.width),
            std::iter::empty::<(&str, ElementId)>(),
        );
        let elements = DetailElements::create(layout, viewport.width, viewport.height, images);

        let mut reveals = RevealCoordinator::mount(ctx);
        if images > 0 {
            reveals.register(presets::detail_header(elements.header));
            reveals.register(presets::detail_images(elements.images.iter().copied()));
        }
        let gallery = Gallery::new(ctx, elements.gallery, images);

        debug!(%route, images, "detail page mounted");
        Some(Self {
            route: route.clone(),
            view,
            elements,
            reveals,
            gallery,
            orbs,
            navbar,
        })
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn view(&self) -> &DetailView {
        &self.view
    }

    pub fn title(&self) -> &str {
        match &self.view {
            DetailView::Project { title, .. } => title.as_str(),
            DetailView::NotFound { title } => *title,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.view, DetailView::NotFound { .. })
    }

    /// Image file names in display order
    pub fn images(&self) -> &[String] {
        match &self.view {
            DetailView::Project { images, .. } => images.as_slice(),
            DetailView::NotFound { .. } => &[],
        }
    }

    pub fn back_link(&self) -> Option<&'static str> {
        self.route.back_link()
    }

    pub fn elements(&self) -> &DetailElements {
        &self.elements
    }

    pub fn reveals(&self) -> &RevealCoordinator {
        &self.reveals
    }

    pub fn gallery(&self) -> &Gallery {
        &self.gallery
    }

    pub fn gallery_mut(&mut self) -> &mut Gallery {
        &mut self.gallery
    }

    pub fn orbs(&self) -> &BackgroundOrbs {
        &self.orbs
    }

    pub fn navbar(&self) -> &Navbar {
        &self.navbar
    }

    /// Open the lightbox on a grid image
    pub fn open_image(&mut self, index: usize) -> bool {
        self.gallery.open(index)
    }

    pub fn handle_key(&mut self, key: GalleryKey) -> bool {
        self.gallery.handle_key(key)
    }

    pub fn unmount(&mut self) {
        self.gallery.unmount();
        self.reveals.unmount();
        self.orbs.unmount();
        self.navbar.unmount();
        debug!(route = %self.route, "detail page unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::gallery::GalleryPhase;
    use crate::host::Host;

    fn catalog() -> Catalog {
        let record = |category, slug: &str| ProjectRecord {
            id: slug.to_string(),
            title: slug.to_uppercase(),
            category,
            slug: slug.to_string(),
            folder: slug.to_string(),
        };
        Catalog::new(vec![
            record(Category::Exhibition, "aero"),
            record(Category::Design, "booth"),
        ])
        .unwrap()
    }

    fn files(_: &ProjectRecord) -> Vec<String> {
        ["Artboard 3.png", "notes.txt", "Artboard 1.png", "Artboard 2.png"]
            .map(String::from)
            .to_vec()
    }

    fn opacity(host: &Host, element: ElementId) -> f32 {
        host.scheduler().state_of(element).opacity
    }

    #[test]
    fn test_header_then_staggered_images() {
        let host = Host::desktop();
        let route = Route::resolve("/exhibitions/aero", &catalog());
        let page = DetailPage::mount(&host.context(), &route, &catalog(), files).unwrap();
        assert_eq!(page.title(), "AERO");
        assert_eq!(page.images(), ["Artboard 1.png", "Artboard 2.png", "Artboard 3.png"]);

        let e = page.elements().clone();
        assert_eq!(host.scheduler().state_of(e.header).y, 60.0);
        assert_eq!(host.scheduler().state_of(e.images[0]).scale, 0.95);

        host.run_for(190.0, 10.0);
        assert_eq!(opacity(&host, e.header), 0.0);
        host.run_for(20.0, 10.0);
        assert!(opacity(&host, e.header) > 0.0);
        assert_eq!(opacity(&host, e.images[0]), 0.0);

        // Images start at 400, 500 and 600 ms
        for (i, &image) in e.images.iter().enumerate() {
            let start = 400.0 + 100.0 * i as f64;
            host.run_for(start - 10.0 - host.now(), 10.0);
            assert_eq!(opacity(&host, image), 0.0, "image {i} before start");
            host.run_for(20.0, 10.0);
            assert!(opacity(&host, image) > 0.0, "image {i} after start");
        }

        host.run_for(1500.0, 16.0);
        for &element in e.images.iter().chain([&e.header]) {
            let state = host.scheduler().state_of(element);
            assert_eq!((state.opacity, state.y, state.scale), (1.0, 0.0, 1.0));
        }
    }

    #[test]
    fn test_lightbox_open_next_close() {
        let host = Host::desktop();
        let route = Route::resolve("/designs/booth", &catalog());
        let mut page = DetailPage::mount(&host.context(), &route, &catalog(), files).unwrap();

        assert!(!page.open_image(3));
        assert!(page.open_image(1));
        assert_eq!(page.gallery().phase(), GalleryPhase::Open);
        assert_eq!(page.gallery().index(), 1);

        assert!(page.handle_key(GalleryKey::Next));
        assert_eq!(page.gallery().index(), 2);
        page.gallery_mut().next();
        assert_eq!(page.gallery().index(), 0);

        assert!(page.handle_key(GalleryKey::Escape));
        assert_eq!(page.gallery().phase(), GalleryPhase::Closing);
        host.run_for(300.0, 16.0);
        assert_eq!(page.gallery().phase(), GalleryPhase::Closed);
    }

    #[test]
    fn test_unknown_slug_shows_not_found() {
        let host = Host::desktop();
        let route = Route::resolve("/designs/aero", &catalog());
        let mut page = DetailPage::mount(&host.context(), &route, &catalog(), files).unwrap();

        assert!(page.is_not_found());
        assert_eq!(page.title(), "Design Not Found");
        assert_eq!(page.back_link(), Some("/#projects"));
        assert!(page.images().is_empty());
        assert!(page.reveals().is_empty());
        assert!(!page.open_image(0));
        assert_eq!(opacity(&host, page.elements().header), 1.0);
    }

    #[test]
    fn test_other_routes_mount_nothing() {
        let host = Host::desktop();
        for path in ["/", "/careers"] {
            let route = Route::resolve(path, &catalog());
            assert!(DetailPage::mount(&host.context(), &route, &catalog(), files).is_none());
        }
        assert!(host.counts().is_idle());
    }

    #[test]
    fn test_project_without_images_stays_still() {
        let host = Host::desktop();
        let route = Route::resolve("/exhibitions/aero", &catalog());
        let page = DetailPage::mount(&host.context(), &route, &catalog(), |_| Vec::new()).unwrap();
        assert!(page.reveals().is_empty());
        assert_eq!(opacity(&host, page.elements().header), 1.0);
    }

    #[test]
    fn test_unmount_with_open_lightbox() {
        let host = Host::desktop();
        let route = Route::resolve("/exhibitions/aero", &catalog());
        let mut page = DetailPage::mount(&host.context(), &route, &catalog(), files).unwrap();
        page.open_image(0);
        host.run_for(100.0, 16.0);
        page.handle_key(GalleryKey::Escape);
        page.unmount();
        assert!(host.counts().is_idle(), "{:?}", host.counts());
    }
}
