//! Simulate command - drive the home page on a headless host
//!
//! Mounts every controller, waits out the first idle window, wakes the hero
//! with a pointer move, scrolls the whole page so every reveal fires, then
//! unmounts and checks that nothing was left running.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};
use vitrine_core::{Capabilities, Viewport};
use vitrine_site::catalog::Catalog;
use vitrine_site::page::{HomePage, STATS};
use vitrine_site::shader::{HeadlessBackend, RenderBackend};
use vitrine_site::{Host, SiteConfig};

// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const GREEN: &str = "\x1b[32m";
    pub const RED: &str = "\x1b[31m";
    pub const BOLD: &str = "\x1b[1m";
}

pub struct Options {
    pub width: f32,
    pub height: f32,
    pub touch: bool,
    pub frame_ms: f64,
}

#[derive(Debug, Serialize)]
pub struct Counter {
    pub label: &'static str,
    pub value: u32,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub viewport: (f32, f32),
    pub touch: bool,
    /// When the hero first hid, if it did
    pub hidden_at_ms: Option<f64>,
    pub shown_on_input: bool,
    pub hide_cycles: u32,
    pub cursor_mounted: bool,
    pub orbs_looping: bool,
    pub shader_active: bool,
    pub shader_frames: u64,
    pub mismatched_frames: u64,
    pub counters: Vec<Counter>,
    pub visible_projects: usize,
    pub clean_teardown: bool,
    pub leftover: String,
}

pub fn run(config: SiteConfig, options: Options) -> Result<Report> {
    let capabilities = if options.touch {
        Capabilities::touch()
    } else {
        Capabilities::desktop()
    };
    let frame_ms = options.frame_ms.max(1.0);
    let first_deadline = config.first_idle_deadline_ms();
    let host = Host::new(
        config,
        Viewport::new(options.width, options.height),
        capabilities,
    );
    let catalog = Rc::new(Catalog::builtin().context("Built-in catalog is invalid")?);
    let backend = Rc::new(RefCell::new(HeadlessBackend::new()));
    let dyn_backend: Rc<RefCell<dyn RenderBackend>> = backend.clone();

    let mut page = HomePage::mount(&host.context(), catalog, dyn_backend);
    info!(
        width = options.width,
        height = options.height,
        touch = options.touch,
        "home page mounted"
    );

    // Idle window
    let mut hidden_at_ms = None;
    while host.now() < first_deadline + 2000.0 {
        host.advance(frame_ms);
        if hidden_at_ms.is_none() && !page.hero().is_visible() {
            hidden_at_ms = Some(host.now());
            debug!(now_ms = host.now(), "hero hidden");
        }
    }

    host.pointer_move(options.width / 2.0, options.height / 2.0);
    let shown_on_input = page.hero().is_visible();
    host.run_for(1000.0, frame_ms);

    // Scroll to the bottom in half-viewport steps
    let bottom = host
        .layout()
        .rect(page.contact_elements().section)
        .map(|r| r.bottom())
        .unwrap_or_default();
    let mut y = 0.0;
    while y < bottom {
        y += options.height / 2.0;
        host.scroll_to(y);
        host.run_for(200.0, frame_ms);
    }
    host.run_for(2500.0, frame_ms);

    let counters = page
        .about()
        .counters
        .iter()
        .zip(STATS)
        .map(|(&element, (label, _))| Counter {
            label,
            value: page.reveals().counter_value(element),
        })
        .collect();

    let mut report = Report {
        viewport: (options.width, options.height),
        touch: options.touch,
        hidden_at_ms,
        shown_on_input,
        hide_cycles: page.hero().hide_count(),
        cursor_mounted: page.cursor().is_some(),
        orbs_looping: page.orbs().is_looping(),
        shader_active: page.shader().is_active(),
        shader_frames: backend.borrow().frames_drawn(),
        mismatched_frames: backend.borrow().mismatched_frames(),
        counters,
        visible_projects: page.projects().visible().len(),
        clean_teardown: false,
        leftover: String::new(),
    };

    page.unmount();
    let counts = host.counts();
    let backend_counts = backend.borrow().counts();
    report.clean_teardown = counts.is_idle() && backend_counts.total() == 0;
    report.leftover = format!("{counts:?}, {backend_counts:?}");
    Ok(report)
}

impl Report {
    pub fn print(&self) {
        let (width, height) = self.viewport;
        println!("{}Headless run{} {width}x{height}", colors::BOLD, colors::RESET);
        match self.hidden_at_ms {
            Some(ms) => println!("  hero hidden at   {ms:.0} ms"),
            None => println!("  hero never hid"),
        }
        println!("  shown on input   {}", self.shown_on_input);
        println!("  hide cycles      {}", self.hide_cycles);
        println!("  cursor follower  {}", self.cursor_mounted);
        println!("  orbs drifting    {}", self.orbs_looping);
        println!(
            "  shader           {} ({} frames, {} mismatched)",
            self.shader_active, self.shader_frames, self.mismatched_frames
        );
        for counter in &self.counters {
            println!("  {:<18} {}", counter.label, counter.value);
        }
        println!("  projects shown   {}", self.visible_projects);
        if self.clean_teardown {
            println!("{}teardown clean{}", colors::GREEN, colors::RESET);
        } else {
            println!("{}teardown leaked: {}{}", colors::RED, self.leftover, colors::RESET);
        }
    }
}
