//! Card grid widget
//!
//! Lays resource cards out as a responsive grid or a list and wraps them in
//! one of two containers: an infinite-scroll variant that asks its parent
//! for the next page near the bottom, or a fixed variant with a footer.
//! All data comes in through props; results of user interaction come back
//! through callbacks and [`CardGridResponse`].

mod cards;
pub mod infinite_scroll;
pub mod layout;

use crate::types::{CardOption, Download, LayoutStyle, Resource};
use crate::ui::components;
use crate::{theme, utils};
use eframe::egui;
use infinite_scroll::{use_infinite_scroll, ScrollSnapshot};
use tracing::debug;

/// Storage key of the grid/list preference
pub const LAYOUT_STORAGE_KEY: &str = "layoutCardsStyle";

/// Read the stored grid/list preference
pub fn stored_layout_style(ctx: &egui::Context) -> LayoutStyle {
    let stored = ctx.data_mut(|d| d.get_persisted::<String>(egui::Id::new(LAYOUT_STORAGE_KEY)));
    LayoutStyle::from_stored(stored.as_deref())
}

pub fn store_layout_style(ctx: &egui::Context, style: LayoutStyle) {
    ctx.data_mut(|d| d.insert_persisted(egui::Id::new(LAYOUT_STORAGE_KEY), style.as_str().to_string()));
}

/// Supplies card thumbnails; implemented by the host's texture cache
pub trait ThumbnailProvider {
    fn thumbnail(&mut self, ctx: &egui::Context, resource: &Resource) -> Option<egui::TextureHandle>;
}

/// Option picked from a card menu
#[derive(Debug, Clone, PartialEq)]
pub struct CardAction {
    pub key: String,
    pub option_id: &'static str,
    pub href: String,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CardGridResponse {
    /// `format_href` of a card clicked in the infinite variant
    pub open_href: Option<String>,
    /// Key of a card selected in the fixed variant
    pub selected: Option<String>,
    pub action: Option<CardAction>,
    /// Page passed to `on_load` this frame
    pub load_requested: Option<u32>,
}

type Slot<'a> = Option<Box<dyn FnOnce(&mut egui::Ui) + 'a>>;

pub struct CardGrid<'a> {
    id_salt: egui::Id,
    resources: &'a [Resource],
    loading: bool,
    page: u32,
    is_next_page_available: bool,
    on_load: Box<dyn FnMut(u32) + 'a>,
    format_href: Box<dyn Fn(&Resource) -> String + 'a>,
    is_card_active: Box<dyn Fn(&Resource) -> bool + 'a>,
    container_style: egui::Frame,
    header: Slot<'a>,
    children: Slot<'a>,
    footer: Slot<'a>,
    card_options: Vec<CardOption>,
    message_id: Option<&'a str>,
    build_href_by_template: Box<dyn Fn(&Resource, &str) -> String + 'a>,
    scroll_container: Option<egui::Id>,
    downloading: &'a [Download],
    get_detail_href: Box<dyn Fn(&Resource) -> String + 'a>,
    fixed: bool,
    on_select: Option<Box<dyn FnMut(&Resource) + 'a>>,
    container_width: Option<f32>,
    layout_style: Option<LayoutStyle>,
    thumbnails: Option<&'a mut dyn ThumbnailProvider>,
}

impl<'a> CardGrid<'a> {
    pub fn new(id_salt: impl std::hash::Hash) -> Self {
        Self {
            id_salt: egui::Id::new(id_salt),
            resources: &[],
            loading: false,
            page: 1,
            is_next_page_available: false,
            on_load: Box::new(|_| {}),
            format_href: Box::new(|_| "#".to_string()),
            is_card_active: Box::new(|_| false),
            container_style: egui::Frame::new(),
            header: None,
            children: None,
            footer: None,
            card_options: Vec::new(),
            message_id: None,
            build_href_by_template: Box::new(utils::build_href_by_template),
            scroll_container: None,
            downloading: &[],
            get_detail_href: Box::new(|r| r.detail_url.clone().unwrap_or_else(|| "#".to_string())),
            fixed: false,
            on_select: None,
            container_width: None,
            layout_style: None,
            thumbnails: None,
        }
    }

    pub fn resources(mut self, resources: &'a [Resource]) -> Self {
        self.resources = resources;
        self
    }

    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    pub fn next_page_available(mut self, available: bool) -> Self {
        self.is_next_page_available = available;
        self
    }

    pub fn on_load(mut self, f: impl FnMut(u32) + 'a) -> Self {
        self.on_load = Box::new(f);
        self
    }

    pub fn format_href(mut self, f: impl Fn(&Resource) -> String + 'a) -> Self {
        self.format_href = Box::new(f);
        self
    }

    pub fn is_card_active(mut self, f: impl Fn(&Resource) -> bool + 'a) -> Self {
        self.is_card_active = Box::new(f);
        self
    }

    pub fn container_style(mut self, frame: egui::Frame) -> Self {
        self.container_style = frame;
        self
    }

    pub fn header(mut self, add: impl FnOnce(&mut egui::Ui) + 'a) -> Self {
        self.header = Some(Box::new(add));
        self
    }

    pub fn children(mut self, add: impl FnOnce(&mut egui::Ui) + 'a) -> Self {
        self.children = Some(Box::new(add));
        self
    }

    /// Only rendered by the fixed variant
    pub fn footer(mut self, add: impl FnOnce(&mut egui::Ui) + 'a) -> Self {
        self.footer = Some(Box::new(add));
        self
    }

    pub fn card_options(mut self, options: Vec<CardOption>) -> Self {
        self.card_options = options;
        self
    }

    pub fn message_id(mut self, id: Option<&'a str>) -> Self {
        self.message_id = id;
        self
    }

    pub fn build_href_by_template(mut self, f: impl Fn(&Resource, &str) -> String + 'a) -> Self {
        self.build_href_by_template = Box::new(f);
        self
    }

    /// Id of the scroll area observed for infinite loading
    pub fn scroll_container(mut self, id: egui::Id) -> Self {
        self.scroll_container = Some(id);
        self
    }

    pub fn downloading(mut self, downloading: &'a [Download]) -> Self {
        self.downloading = downloading;
        self
    }

    pub fn get_detail_href(mut self, f: impl Fn(&Resource) -> String + 'a) -> Self {
        self.get_detail_href = Box::new(f);
        self
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.fixed = fixed;
        self
    }

    /// Only wired in the fixed variant
    pub fn on_select(mut self, f: impl FnMut(&Resource) + 'a) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    /// Overrides the detected container width
    pub fn container_width(mut self, width: f32) -> Self {
        self.container_width = Some(width);
        self
    }

    /// Overrides the stored grid/list preference
    pub fn layout_style(mut self, style: LayoutStyle) -> Self {
        self.layout_style = Some(style);
        self
    }

    pub fn thumbnails(mut self, provider: &'a mut dyn ThumbnailProvider) -> Self {
        self.thumbnails = Some(provider);
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> CardGridResponse {
        if self.fixed {
            self.show_fixed(ui)
        } else {
            self.show_infinite(ui)
        }
    }

    fn scroll_id(&self, ui: &egui::Ui) -> egui::Id {
        self.scroll_container
            .unwrap_or_else(|| ui.make_persistent_id(self.id_salt).with("scroll"))
    }

    /// Header, children, message and cards, shared by both variants
    fn show_body(&mut self, ui: &mut egui::Ui, style: LayoutStyle, out: &mut CardGridResponse) {
        if let Some(header) = self.header.take() {
            header(ui);
        }
        if let Some(children) = self.children.take() {
            children(ui);
        }
        if let Some(id) = self.message_id {
            components::message_block(ui, id);
        }
        self.show_cards(ui, style, out);
    }

    fn show_infinite(mut self, ui: &mut egui::Ui) -> CardGridResponse {
        let mut out = CardGridResponse::default();
        let style = self.layout_style.unwrap_or_else(|| stored_layout_style(ui.ctx()));
        let scroll_id = self.scroll_id(ui);
        let frame = self.container_style;

        let output = egui::ScrollArea::vertical()
            .id_salt(scroll_id)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                frame.show(ui, |ui| {
                    self.show_body(ui, style, &mut out);
                    self.show_pagination(ui);
                });
            });

        let snapshot = ScrollSnapshot::from_output(&output);
        let should_scroll = !self.loading && self.is_next_page_available;
        let next_page = self.page + 1;
        let on_load = &mut self.on_load;
        if use_infinite_scroll(ui.ctx(), scroll_id, snapshot, should_scroll, || on_load(next_page)) {
            debug!(page = next_page, "Card grid requested next page");
            out.load_requested = Some(next_page);
        }
        out
    }

    fn show_fixed(mut self, ui: &mut egui::Ui) -> CardGridResponse {
        let mut out = CardGridResponse::default();
        let style = self.layout_style.unwrap_or_else(|| stored_layout_style(ui.ctx()));
        let scroll_id = self.scroll_id(ui);
        let frame = self.container_style;

        egui::ScrollArea::vertical()
            .id_salt(scroll_id)
            .auto_shrink([false, false])
            .show(ui, |ui| {
                frame.show(ui, |ui| {
                    self.show_body(ui, style, &mut out);
                    if let Some(footer) = self.footer.take() {
                        footer(ui);
                    }
                });
            });
        out
    }

    /// Last page is in and nothing is loading
    fn shows_end_marker(&self) -> bool {
        !self.resources.is_empty() && !self.is_next_page_available && !self.loading
    }

    /// Spinner while loading, end marker once the last page is in
    fn show_pagination(&self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(theme::SPACING_MD);
            if self.loading {
                components::spinner(ui);
            }
            if self.shows_end_marker() {
                components::icon(ui, egui_phosphor::regular::RECORD, theme::FONT_HEADING, theme::TEXT_DIM)
                    .on_hover_text("No more results");
            }
            ui.add_space(theme::SPACING_MD);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn resources(n: usize) -> Vec<Resource> {
        (0..n)
            .map(|i| Resource {
                pk: i.to_string(),
                title: format!("Resource {}", i),
                resource_type: "dataset".into(),
                ..Default::default()
            })
            .collect()
    }

    fn input(time: f64) -> egui::RawInput {
        egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 800.0))),
            time: Some(time),
            ..Default::default()
        }
    }

    /// Render the grid for each frame time and collect `on_load` calls
    fn render_frames(
        times: &[f64],
        resources: &[Resource],
        configure: impl Fn(CardGrid<'_>) -> CardGrid<'_>,
    ) -> (Vec<u32>, Vec<CardGridResponse>) {
        let ctx = egui::Context::default();
        let loads = RefCell::new(Vec::new());
        let mut responses = Vec::new();
        for &t in times {
            let _ = ctx.run(input(t), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    let grid = CardGrid::new("test_grid")
                        .resources(resources)
                        .on_load(|p| loads.borrow_mut().push(p));
                    responses.push(configure(grid).show(ui));
                });
            });
        }
        (loads.into_inner(), responses)
    }

    #[test]
    fn infinite_requests_next_page_when_content_fits() {
        let items = resources(2);
        let (loads, responses) = render_frames(&[0.0], &items, |g| g.page(3).next_page_available(true));
        assert_eq!(loads, vec![4]);
        assert!(responses.iter().any(|r| r.load_requested == Some(4)));
    }

    #[test]
    fn infinite_debounces_between_frames() {
        let items = resources(2);
        let (loads, _) = render_frames(&[0.0, 0.1, 0.2, 0.7], &items, |g| g.next_page_available(true));
        assert_eq!(loads, vec![2, 2]);
    }

    #[test]
    fn infinite_waits_while_loading_or_on_last_page() {
        let items = resources(2);
        let (loads, _) = render_frames(&[0.0, 1.0], &items, |g| g.next_page_available(true).loading(true));
        assert!(loads.is_empty());
        let (loads, _) = render_frames(&[0.0, 1.0], &items, |g| g.next_page_available(false));
        assert!(loads.is_empty());
    }

    #[test]
    fn fixed_never_loads_on_scroll() {
        let items = resources(2);
        let (loads, responses) =
            render_frames(&[0.0, 1.0, 2.0], &items, |g| g.fixed(true).next_page_available(true));
        assert!(loads.is_empty());
        assert!(responses.iter().all(|r| r.load_requested.is_none()));
    }

    #[test]
    fn empty_grid_with_message_renders() {
        let (loads, _) = render_frames(&[0.0], &[], |g| g.message_id(Some("noResults")));
        assert!(loads.is_empty());
    }

    #[test]
    fn end_marker_needs_cards_and_last_page() {
        fn grid(items: &[Resource], next: bool, loading: bool) -> CardGrid<'_> {
            CardGrid::new("end").resources(items).next_page_available(next).loading(loading)
        }
        let items = resources(2);
        assert!(grid(&items, false, false).shows_end_marker());
        assert!(!grid(&items, true, false).shows_end_marker());
        assert!(!grid(&items, false, true).shows_end_marker());
        assert!(!grid(&[], false, false).shows_end_marker());
    }

    #[test]
    fn layout_preference_round_trips_through_memory() {
        let ctx = egui::Context::default();
        assert_eq!(stored_layout_style(&ctx), LayoutStyle::Grid);
        store_layout_style(&ctx, LayoutStyle::List);
        assert_eq!(stored_layout_style(&ctx), LayoutStyle::List);
        store_layout_style(&ctx, LayoutStyle::Grid);
        assert_eq!(stored_layout_style(&ctx), LayoutStyle::Grid);
    }
}
