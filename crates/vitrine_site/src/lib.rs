//! Vitrine Site
//!
//! Animation orchestration for the exhibitions-contractor marketing site,
//! run against a headless [`host::Host`] instead of a browser.
//!
//! # Controllers
//!
//! - [`hero::IdleController`]: entrance sequence, then hide-on-idle and
//!   show-on-activity for the hero content
//! - [`scrub::ScrollLinkedAnimator`]: properties bound to scroll progress
//!   through an element, with optional smoothing
//! - [`cursor::CursorFollower`]: lagging ring and dot, scaled over
//!   interactive elements; never mounted on touch-primary devices
//! - [`shader::ShaderBackground`]: gold radial gradient that follows the
//!   pointer and reveals on scroll, desktop widths only
//! - [`reveal::RevealCoordinator`]: scroll-triggered entrances, staggers and
//!   counters
//! - [`navbar::Navbar`]: entrance, compact style past 50px of scroll, mobile
//!   menu and smooth anchor scrolling
//! - [`orbs::BackgroundOrbs`]: endless drift of the decorative background
//! - [`catalog`]: project records, filtering and the "view all" toggle
//!
//! Pages ([`page::HomePage`], [`detail::DetailPage`] with its
//! [`gallery::Gallery`] lightbox) compose controllers, and [`page::Page`]
//! mounts the one a [`routes::Route`] asks for.
//!
//! # Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use vitrine_site::catalog::Catalog;
//! use vitrine_site::host::Host;
//! use vitrine_site::page::HomePage;
//! use vitrine_site::shader::HeadlessBackend;
//!
//! let host = Host::desktop();
//! let catalog = Rc::new(Catalog::builtin().unwrap());
//! let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
//! let mut page = HomePage::mount(&host.context(), catalog, backend);
//!
//! host.run_for(6000.0, 16.0);
//! assert!(!page.hero().is_visible());
//! host.pointer_move(400.0, 300.0);
//! assert!(page.hero().is_visible());
//!
//! page.unmount();
//! assert!(host.counts().is_idle());
//! ```

pub mod catalog;
pub mod config;
pub mod contact;
pub mod cursor;
pub mod detail;
pub mod error;
pub mod gallery;
pub mod hero;
pub mod host;
pub mod navbar;
pub mod orbs;
pub mod page;
pub mod reveal;
pub mod routes;
pub mod scrub;
pub mod shader;

pub use catalog::{Catalog, CatalogView, Category, Filter, ProjectRecord};
pub use config::SiteConfig;
pub use contact::{ContactForm, FormField, SubmitState};
pub use cursor::CursorFollower;
pub use detail::DetailPage;
pub use error::{Result, SiteError};
pub use gallery::Gallery;
pub use hero::{HeroState, IdleController};
pub use host::{Host, HostContext};
pub use navbar::Navbar;
pub use orbs::BackgroundOrbs;
pub use page::{HomePage, Page, ProjectsSection};
pub use reveal::{RevealCoordinator, RevealSpec};
pub use routes::Route;
pub use scrub::ScrollLinkedAnimator;
pub use shader::{HeadlessBackend, RenderBackend, ShaderBackground};
