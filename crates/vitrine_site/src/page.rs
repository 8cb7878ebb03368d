//! Page composition
//!
//! [`HomePage`] lays out the single-page site top to bottom (hero, about,
//! services, projects, contact) under the navbar and background orbs, and
//! mounts every controller against it. The cursor follower mounts last so its
//! hover snapshot sees every interactive element. [`Page::mount`] picks the
//! home page or a project's gallery page for a route.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::debug;
use vitrine_core::{ElementId, ElementKind, Layout, Rect};

use crate::catalog::{Catalog, CatalogView, Category, Filter, ProjectRecord};
use crate::contact::ContactForm;
use crate::cursor::{CursorElements, CursorFollower};
use crate::detail::DetailPage;
use crate::hero::{HeroElements, IdleController};
use crate::host::HostContext;
use crate::navbar::{Navbar, NavbarElements};
use crate::orbs::{BackgroundOrbs, OrbElements};
use crate::reveal::{presets, RevealCoordinator, RevealId};
use crate::routes::Route;
use crate::shader::{RenderBackend, ShaderBackground};

const COLUMNS: usize = 3;
const CARD_WIDTH: f32 = 400.0;
const CARD_HEIGHT: f32 = 300.0;
const CARD_GAP: f32 = 32.0;
const GRID_TOP: f32 = 320.0;

/// Stats shown in the about section, counted up on reveal
pub const STATS: [(&str, u32); 4] = [
    ("Years Experience", 15),
    ("Projects Completed", 500),
    ("Happy Clients", 100),
    ("Team Members", 50),
];

const SERVICE_COUNT: usize = 9;
const FEATURE_COUNT: usize = 4;
const CONTACT_CARD_COUNT: usize = 3;
const FORM_FIELD_COUNT: usize = 5;

pub(crate) fn column_rect(width: f32, top: f32, index: usize, w: f32, h: f32) -> Rect {
    let row = (index / COLUMNS) as f32;
    let col = (index % COLUMNS) as f32;
    let grid_width = COLUMNS as f32 * w + (COLUMNS - 1) as f32 * CARD_GAP;
    let left = ((width - grid_width) / 2.0).max(0.0);
    Rect::new(
        left + col * (w + CARD_GAP),
        top + row * (h + CARD_GAP),
        w,
        h,
    )
}

// ============================================================================
// Projects
// ============================================================================

/// Filterable project grid
///
/// One card element exists per catalog record. Cards outside the current
/// selection collapse to an empty rect; the visible ones are packed into the
/// grid in catalog order and play the grid entrance each time the selection
/// changes.
pub struct ProjectsSection {
    ctx: HostContext,
    catalog: Rc<Catalog>,
    view: CatalogView,
    section: ElementId,
    title: ElementId,
    filter_container: ElementId,
    buttons: SmallVec<[ElementId; 3]>,
    view_all: ElementId,
    cards: FxHashMap<(Category, String), ElementId>,
    reveals: RevealCoordinator,
    grid: RevealId,
}

impl ProjectsSection {
    pub fn mount(ctx: &HostContext, catalog: Rc<Catalog>, top: f32) -> Self {
        let layout = ctx.layout();
        let width = ctx.viewport().width;
        let section = layout.insert("projects", Rect::new(0.0, top, width, Self::height(&catalog)));
        let title = layout.insert("projects.title", Rect::new(0.0, top + 100.0, width, 80.0));
        let filter_container = layout.insert(
            "projects.filters",
            Rect::new(width / 2.0 - 300.0, top + 220.0, 580.0, 48.0),
        );
        let buttons: SmallVec<[ElementId; 3]> = Filter::ALL
            .iter()
            .enumerate()
            .map(|(i, filter)| {
                layout.insert_kind(
                    format!("projects.filter.{filter}"),
                    ElementKind::Button,
                    Rect::new(width / 2.0 - 300.0 + i as f32 * 200.0, top + 220.0, 180.0, 48.0),
                )
            })
            .collect();
        let view_all = layout.insert_kind(
            "projects.view_all",
            ElementKind::Button,
            Rect::new(width / 2.0 - 100.0, top, 200.0, 56.0),
        );
        let cards = catalog
            .records()
            .iter()
            .map(|record| {
                let id = layout.insert_kind(
                    format!("projects.card.{}.{}", record.category, record.slug),
                    ElementKind::Link,
                    Rect::default(),
                );
                ((record.category, record.slug.clone()), id)
            })
            .collect();

        let mut reveals = RevealCoordinator::mount(ctx);
        reveals.register(presets::section_title(title, section));
        reveals.register(presets::filter_buttons(buttons.iter().copied(), filter_container));
        let grid = reveals.register(presets::project_cards(Vec::<ElementId>::new()));

        let mut this = Self {
            ctx: ctx.clone(),
            catalog,
            view: CatalogView::new(),
            section,
            title,
            filter_container,
            buttons,
            view_all,
            cards,
            reveals,
            grid,
        };
        this.refresh();
        this
    }

    /// Vertical space reserved for the fully expanded grid
    pub fn height(catalog: &Catalog) -> f32 {
        let rows = catalog.len().div_ceil(COLUMNS) as f32;
        GRID_TOP + rows * (CARD_HEIGHT + CARD_GAP) + 200.0
    }

    pub fn section(&self) -> ElementId {
        self.section
    }

    pub fn title(&self) -> ElementId {
        self.title
    }

    /// Row holding the filter buttons; their reveal triggers on it
    pub fn filter_container(&self) -> ElementId {
        self.filter_container
    }

    pub fn filter_buttons(&self) -> &[ElementId] {
        &self.buttons
    }

    pub fn view(&self) -> CatalogView {
        self.view
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn visible(&self) -> Vec<&ProjectRecord> {
        self.view.visible(&self.catalog)
    }

    pub fn card(&self, record: &ProjectRecord) -> Option<ElementId> {
        self.cards
            .get(&(record.category, record.slug.clone()))
            .copied()
    }

    pub fn visible_cards(&self) -> Vec<ElementId> {
        self.visible()
            .into_iter()
            .filter_map(|record| self.card(record))
            .collect()
    }

    /// Cards the grid entrance last ran on
    pub fn animated_cards(&self) -> SmallVec<[ElementId; 8]> {
        self.reveals.targets(self.grid)
    }

    pub fn has_more(&self) -> bool {
        self.view.has_more(&self.catalog)
    }

    /// Select a filter; returns whether the grid changed
    pub fn set_filter(&mut self, filter: Filter) -> bool {
        if !self.view.set_filter(filter) {
            return false;
        }
        debug!(%filter, "project filter changed");
        self.refresh();
        true
    }

    /// Expand or collapse the "all" view; returns whether the grid changed
    pub fn set_expanded(&mut self, expanded: bool) -> bool {
        if !self.view.set_expanded(expanded) {
            return false;
        }
        self.refresh();
        true
    }

    fn refresh(&mut self) {
        let visible = self.visible_cards();
        let layout = self.ctx.layout();
        let top = layout.rect(self.section).map(|r| r.y).unwrap_or_default();
        let width = self.ctx.viewport().width;

        for &card in self.cards.values() {
            if !visible.contains(&card) {
                layout.set_rect(card, Rect::new(0.0, top, 0.0, 0.0));
            }
        }
        for (i, &card) in visible.iter().enumerate() {
            layout.set_rect(
                card,
                column_rect(width, top + GRID_TOP, i, CARD_WIDTH, CARD_HEIGHT),
            );
        }
        let rows = visible.len().div_ceil(COLUMNS) as f32;
        let button_y = top + GRID_TOP + rows * (CARD_HEIGHT + CARD_GAP) + 40.0;
        layout.set_rect(
            self.view_all,
            Rect::new(width / 2.0 - 100.0, button_y, 200.0, 56.0),
        );

        debug!(cards = visible.len(), "project grid refreshed");
        self.reveals.replace_targets(self.grid, visible);
    }

    pub fn unmount(&mut self) {
        self.reveals.unmount();
    }
}

// ============================================================================
// Home page
// ============================================================================

/// Elements of the about section
#[derive(Clone, Debug)]
pub struct AboutElements {
    pub section: ElementId,
    pub title: ElementId,
    pub image: ElementId,
    /// Container the features reveal is triggered by
    pub feature_list: ElementId,
    pub features: SmallVec<[ElementId; 4]>,
    pub stats_row: ElementId,
    pub stats: SmallVec<[ElementId; 4]>,
    pub counters: SmallVec<[ElementId; 4]>,
}

impl AboutElements {
    pub const HEIGHT: f32 = 1200.0;

    pub fn create(layout: &Layout, width: f32, top: f32) -> Self {
        let half = width / 2.0;
        let stats_top = top + 900.0;
        let stats: SmallVec<[ElementId; 4]> = (0..STATS.len())
            .map(|i| {
                layout.insert(
                    format!("about.stat.{i}"),
                    Rect::new(i as f32 * width / 4.0, stats_top, width / 4.0, 160.0),
                )
            })
            .collect();
        let counters = (0..STATS.len())
            .map(|i| {
                layout.insert(
                    format!("about.stat.{i}.number"),
                    Rect::new(i as f32 * width / 4.0, stats_top + 20.0, width / 4.0, 60.0),
                )
            })
            .collect();
        Self {
            section: layout.insert("about", Rect::new(0.0, top, width, Self::HEIGHT)),
            title: layout.insert("about.title", Rect::new(0.0, top + 100.0, width, 80.0)),
            image: layout.insert("about.image", Rect::new(0.0, top + 250.0, half, 600.0)),
            feature_list: layout.insert(
                "about.features",
                Rect::new(half, top + 250.0, half, FEATURE_COUNT as f32 * 140.0),
            ),
            features: (0..FEATURE_COUNT)
                .map(|i| {
                    layout.insert(
                        format!("about.feature.{i}"),
                        Rect::new(half, top + 250.0 + i as f32 * 140.0, half, 120.0),
                    )
                })
                .collect(),
            stats_row: layout.insert("about.stats", Rect::new(0.0, stats_top, width, 160.0)),
            stats,
            counters,
        }
    }
}

/// Elements of the services section
#[derive(Clone, Debug)]
pub struct ServicesElements {
    pub section: ElementId,
    pub title: ElementId,
    pub cards: SmallVec<[ElementId; 9]>,
}

impl ServicesElements {
    pub const HEIGHT: f32 = 1400.0;

    pub fn create(layout: &Layout, width: f32, top: f32) -> Self {
        Self {
            section: layout.insert("services", Rect::new(0.0, top, width, Self::HEIGHT)),
            title: layout.insert("services.title", Rect::new(0.0, top + 100.0, width, 80.0)),
            cards: (0..SERVICE_COUNT)
                .map(|i| {
                    layout.insert_kind(
                        format!("services.card.{i}"),
                        ElementKind::Interactive,
                        column_rect(width, top + 260.0, i, 360.0, 300.0),
                    )
                })
                .collect(),
        }
    }
}

/// Elements of the contact section
#[derive(Clone, Debug)]
pub struct ContactElements {
    pub section: ElementId,
    pub title: ElementId,
    pub info: ElementId,
    pub cards: SmallVec<[ElementId; 3]>,
    pub form: ElementId,
    pub fields: SmallVec<[ElementId; 5]>,
    pub submit: ElementId,
    pub success: ElementId,
}

impl ContactElements {
    pub const HEIGHT: f32 = 1100.0;

    pub fn create(layout: &Layout, width: f32, top: f32) -> Self {
        let half = width / 2.0;
        let form_top = top + 260.0;
        Self {
            section: layout.insert("contact", Rect::new(0.0, top, width, Self::HEIGHT)),
            title: layout.insert("contact.title", Rect::new(0.0, top + 100.0, width, 80.0)),
            info: layout.insert("contact.info", Rect::new(0.0, form_top, half, 600.0)),
            cards: (0..CONTACT_CARD_COUNT)
                .map(|i| {
                    layout.insert_kind(
                        format!("contact.card.{i}"),
                        ElementKind::Link,
                        Rect::new(40.0, form_top + i as f32 * 180.0, half - 80.0, 160.0),
                    )
                })
                .collect(),
            form: layout.insert("contact.form", Rect::new(half, form_top, half, 700.0)),
            fields: (0..FORM_FIELD_COUNT)
                .map(|i| {
                    layout.insert_kind(
                        format!("contact.field.{i}"),
                        ElementKind::Interactive,
                        Rect::new(half + 40.0, form_top + 40.0 + i as f32 * 100.0, half - 80.0, 64.0),
                    )
                })
                .collect(),
            submit: layout.insert_kind(
                "contact.submit",
                ElementKind::Button,
                Rect::new(half + 40.0, form_top + 560.0, 240.0, 56.0),
            ),
            success: layout.insert("contact.success", Rect::new(half + 40.0, form_top + 630.0, half - 80.0, 60.0)),
        }
    }
}

/// Every controller of the home page, mounted against one layout
pub struct HomePage {
    orbs: BackgroundOrbs,
    navbar: Navbar,
    hero: IdleController,
    about: AboutElements,
    services: ServicesElements,
    contact_elements: ContactElements,
    reveals: RevealCoordinator,
    projects: ProjectsSection,
    contact: ContactForm,
    shader: ShaderBackground,
    cursor: Option<CursorFollower>,
}

impl HomePage {
    pub fn mount(
        ctx: &HostContext,
        catalog: Rc<Catalog>,
        backend: Rc<RefCell<dyn RenderBackend>>,
    ) -> Self {
        let layout = ctx.layout();
        let viewport = ctx.viewport();
        let width = viewport.width;

        let orbs = BackgroundOrbs::mount(
            ctx,
            OrbElements::create(layout, width, viewport.height),
        );
        let hero_elements = HeroElements::create(layout, width, viewport.height);
        let hero_section = hero_elements.section;
        let hero = IdleController::mount(ctx, hero_elements);
        let about_top = viewport.height;
        let about = AboutElements::create(layout, width, about_top);
        let services_top = about_top + AboutElements::HEIGHT;
        let services = ServicesElements::create(layout, width, services_top);
        let projects_top = services_top + ServicesElements::HEIGHT;
        let projects = ProjectsSection::mount(ctx, catalog.clone(), projects_top);
        let contact_top = projects_top + ProjectsSection::height(&catalog);
        let contact_elements = ContactElements::create(layout, width, contact_top);

        let mut reveals = RevealCoordinator::mount(ctx);
        reveals.register(presets::section_title(about.title, about.section));
        reveals.register(presets::about_image(about.image));
        reveals.register(presets::about_features(
            about.features.iter().copied(),
            about.feature_list,
        ));
        reveals.register(presets::stats(about.stats.iter().copied(), about.stats_row));
        for (&counter, (_, value)) in about.counters.iter().zip(STATS) {
            reveals.register(presets::counter(counter, value));
        }
        reveals.register(presets::section_title(services.title, services.section));
        reveals.register(presets::service_cards(services.cards.iter().copied()));
        let c = &contact_elements;
        reveals.register(presets::section_title(c.title, c.section));
        reveals.register(presets::contact_cards(c.cards.iter().copied(), c.info));
        reveals.register(presets::contact_form(c.form));
        reveals.register(presets::form_fields(c.fields.iter().copied(), c.form));

        let contact = ContactForm::mount(ctx, c.success);
        let shader = ShaderBackground::mount(ctx, c.section, backend);
        let navbar = Navbar::mount(
            ctx,
            NavbarElements::create(layout, width),
            [
                ("home", hero_section),
                ("about", about.section),
                ("services", services.section),
                ("projects", projects.section()),
                ("contact", c.section),
            ],
        );
        let cursor = CursorFollower::mount(ctx, CursorElements::create(layout));

        debug!(
            elements = layout.len(),
            reveals = reveals.len(),
            cursor = cursor.is_some(),
            "home page mounted"
        );
        Self {
            orbs,
            navbar,
            hero,
            about,
            services,
            contact_elements,
            reveals,
            projects,
            contact,
            shader,
            cursor,
        }
    }

    pub fn hero(&self) -> &IdleController {
        &self.hero
    }

    pub fn navbar(&self) -> &Navbar {
        &self.navbar
    }

    pub fn orbs(&self) -> &BackgroundOrbs {
        &self.orbs
    }

    pub fn about(&self) -> &AboutElements {
        &self.about
    }

    pub fn services(&self) -> &ServicesElements {
        &self.services
    }

    pub fn contact_elements(&self) -> &ContactElements {
        &self.contact_elements
    }

    pub fn reveals(&self) -> &RevealCoordinator {
        &self.reveals
    }

    pub fn projects(&self) -> &ProjectsSection {
        &self.projects
    }

    pub fn projects_mut(&mut self) -> &mut ProjectsSection {
        &mut self.projects
    }

    pub fn contact(&self) -> &ContactForm {
        &self.contact
    }

    pub fn shader(&self) -> &ShaderBackground {
        &self.shader
    }

    pub fn cursor(&self) -> Option<&CursorFollower> {
        self.cursor.as_ref()
    }

    /// Tear down every controller; the host is left with nothing pending
    pub fn unmount(&mut self) {
        self.orbs.unmount();
        self.navbar.unmount();
        self.hero.unmount();
        self.reveals.unmount();
        self.projects.unmount();
        self.contact.unmount();
        self.shader.unmount();
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.unmount();
        }
        debug!("home page unmounted");
    }
}

/// Whatever a route mounted
pub enum Page {
    Home(HomePage),
    Detail(DetailPage),
}

impl Page {
    /// Mount the view for `route`; `None` for paths nothing renders
    ///
    /// `list_images` is only consulted for gallery routes.
    pub fn mount<F>(
        ctx: &HostContext,
        route: &Route,
        catalog: Rc<Catalog>,
        backend: Rc<RefCell<dyn RenderBackend>>,
        list_images: F,
    ) -> Option<Page>
    where
        F: FnOnce(&ProjectRecord) -> Vec<String>,
    {
        match route {
            Route::Home => Some(Page::Home(HomePage::mount(ctx, catalog, backend))),
            Route::Unmatched(path) => {
                debug!(path, "no view for path");
                None
            }
            _ => DetailPage::mount(ctx, route, &catalog, list_images).map(Page::Detail),
        }
    }

    pub fn unmount(&mut self) {
        match self {
            Page::Home(page) => page.unmount(),
            Page::Detail(page) => page.unmount(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Host;
    use crate::shader::HeadlessBackend;

    fn record(category: Category, i: usize) -> ProjectRecord {
        let slug = format!("{category}-{i}");
        ProjectRecord {
            id: slug.clone(),
            title: slug.to_uppercase(),
            category,
            slug: slug.clone(),
            folder: slug,
        }
    }

    fn small_catalog() -> Rc<Catalog> {
        let records = (0..5)
            .map(|i| record(Category::Exhibition, i))
            .chain((0..5).map(|i| record(Category::Design, i)))
            .collect();
        Rc::new(Catalog::new(records).unwrap())
    }

    #[test]
    fn test_filter_reanimates_matching_cards() {
        let host = Host::desktop();
        let mut projects = ProjectsSection::mount(&host.context(), small_catalog(), 2000.0);
        assert_eq!(projects.visible_cards().len(), 8);
        assert!(projects.has_more());

        assert!(projects.set_filter(Filter::Exhibitions));
        let animated = projects.animated_cards();
        assert_eq!(animated.len(), 5);
        for record in projects.visible() {
            assert_eq!(record.category, Category::Exhibition);
            assert!(animated.contains(&projects.card(record).unwrap()));
        }
        assert!(!projects.set_filter(Filter::Exhibitions));

        host.run_for(1500.0, 16.0);
        for &card in &animated {
            assert_eq!(host.scheduler().state_of(card).opacity, 1.0);
        }
    }

    #[test]
    fn test_filter_buttons_wait_for_their_row() {
        let host = Host::desktop();
        let projects = ProjectsSection::mount(&host.context(), small_catalog(), 4000.0);
        let row = host.layout().rect(projects.filter_container()).unwrap();
        assert_eq!(row.y, 4220.0);

        // The row reaches 85% of a 900px viewport at 4220 - 765 = 3455
        for y in [3300.0, 3454.0] {
            host.scroll_to(y);
            host.run_for(1500.0, 16.0);
            for &button in projects.filter_buttons() {
                assert_eq!(host.scheduler().state_of(button).opacity, 0.0, "at {y}");
            }
        }

        host.scroll_to(3456.0);
        host.run_for(1500.0, 16.0);
        for &button in projects.filter_buttons() {
            let state = host.scheduler().state_of(button);
            assert_eq!(state.opacity, 1.0);
            assert_eq!(state.y, 0.0);
        }
    }

    #[test]
    fn test_expand_shows_everything() {
        let host = Host::desktop();
        let mut projects = ProjectsSection::mount(&host.context(), small_catalog(), 2000.0);
        assert!(projects.set_expanded(true));
        assert_eq!(projects.animated_cards().len(), 10);
        assert!(!projects.has_more());

        projects.set_filter(Filter::Designs);
        assert!(!projects.view().is_expanded());
        assert_eq!(projects.visible_cards().len(), 5);
    }

    #[test]
    fn test_hidden_cards_collapse() {
        let host = Host::desktop();
        let mut projects = ProjectsSection::mount(&host.context(), small_catalog(), 2000.0);
        projects.set_filter(Filter::Designs);
        let catalog = small_catalog();
        let hidden = catalog.by_category(Category::Exhibition).next().unwrap();
        let card = projects.card(hidden).unwrap();
        assert_eq!(host.layout().rect(card).unwrap().width, 0.0);
    }

    #[test]
    fn test_home_page_mount_and_unmount() {
        let host = Host::desktop();
        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let mut page = HomePage::mount(&host.context(), small_catalog(), backend.clone());
        assert!(page.cursor().is_some());
        assert!(page.shader().is_active());
        assert!(page.hero().is_visible());

        host.run_for(6000.0, 16.0);
        assert!(!page.hero().is_visible());
        assert!(page.orbs().is_looping());

        page.unmount();
        assert!(host.counts().is_idle(), "{:?}", host.counts());
        assert_eq!(backend.borrow().counts().total(), 0);
    }

    #[test]
    fn test_orbs_loop_until_page_drops() {
        let host = Host::desktop();
        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let page = HomePage::mount(&host.context(), small_catalog(), backend.clone());
        host.run_for(36000.0, 50.0);
        assert!(page.orbs().is_looping());

        drop(page);
        assert!(host.counts().is_idle(), "{:?}", host.counts());
        assert_eq!(backend.borrow().counts().total(), 0);
    }

    #[test]
    fn test_navbar_links_reach_sections() {
        let host = Host::desktop();
        let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
        let page = HomePage::mount(&host.context(), small_catalog(), backend);
        let projects_top = host.layout().rect(page.projects().section()).unwrap().y;

        assert_eq!(page.navbar().scroll_to_anchor("#projects"), Some(projects_top));
        host.run_for(1000.0, 16.0);
        assert_eq!(host.viewport().scroll_y, projects_top);
        assert!(page.navbar().is_scrolled());
    }

    #[test]
    fn test_route_picks_page() {
        let host = Host::desktop();
        let catalog = small_catalog();
        let backend: Rc<RefCell<dyn RenderBackend>> = Rc::new(RefCell::new(HeadlessBackend::new()));
        let images = |_: &ProjectRecord| vec!["1.png".to_string(), "2.png".to_string()];

        let route = Route::resolve("/exhibitions/exhibition-2", &catalog);
        let mut page = Page::mount(&host.context(), &route, catalog.clone(), backend.clone(), images)
            .unwrap();
        match &page {
            Page::Detail(detail) => assert_eq!(detail.images().len(), 2),
            Page::Home(_) => panic!("gallery route mounted the home page"),
        }
        page.unmount();
        assert!(host.counts().is_idle(), "{:?}", host.counts());

        let route = Route::resolve("/", &catalog);
        let page = Page::mount(&host.context(), &route, catalog.clone(), backend.clone(), images);
        assert!(matches!(page, Some(Page::Home(_))));

        let route = Route::resolve("/careers", &catalog);
        assert!(Page::mount(&host.context(), &route, catalog, backend, images).is_none());
    }
}
