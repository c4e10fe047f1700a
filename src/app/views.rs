//! View rendering (top bar, card grid, detail panel, downloads bar, toast)

use super::actions::{self, ACTION_COPY_LINK, ACTION_DOWNLOAD, ACTION_VIEW};
use super::{App, LoadMode};
use crate::card_grid::{self, CardAction, CardGrid};
use crate::constants::{APP_NAME, CATALOGUE_HREF_TEMPLATE};
use crate::theme;
use crate::types::*;
use crate::utils::{build_href_by_template, format_bytes, join_url, lock};
use eframe::egui;
use egui_phosphor::regular as icons;

/// Frontend page of a resource, absolute against the catalog
pub fn catalogue_href(base: &str, resource: &Resource) -> String {
    join_url(base, &build_href_by_template(resource, CATALOGUE_HREF_TEMPLATE))
}

/// `detail_url` when the API sends one, otherwise the frontend page
pub fn detail_href(base: &str, resource: &Resource) -> String {
    match resource.detail_url.as_deref().filter(|d| !d.is_empty()) {
        Some(detail) => join_url(base, detail),
        None => catalogue_href(base, resource),
    }
}

/// Fetch error with a Retry button; returns true when Retry was clicked
pub fn error_notice(ui: &mut egui::Ui, error: &str) -> bool {
    ui.vertical_centered(|ui| {
        ui.label(egui::RichText::new(error).size(theme::FONT_SMALL).color(theme::STATUS_ERROR));
        ui.add_space(theme::SPACING_SM);
        ui.add(theme::button(format!("{}  Retry", icons::ARROW_CLOCKWISE))).clicked()
    })
    .inner
}

impl App {
    pub fn render_top_bar(&mut self, ctx: &egui::Context) {
        let mut submit_search = false;
        let mut toggle_layout = false;
        let mut toggle_mode = false;
        let (shown, total) = {
            let s = lock(&self.catalog_state);
            (s.resources.len(), s.total)
        };

        egui::TopBottomPanel::top("top_bar")
            .show_separator_line(false)
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_BASE)
                    .inner_margin(egui::Margin::symmetric(16, 10)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(APP_NAME)
                                .size(theme::FONT_TITLE)
                                .strong()
                                .color(theme::TEXT_PRIMARY),
                        )
                        .selectable(false),
                    );
                    ui.add_space(theme::SPACING_XL);

                    // Search box, applied on Enter
                    egui::Frame::new()
                        .fill(theme::BG_INPUT)
                        .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::BORDER_SUBTLE))
                        .corner_radius(theme::RADIUS_DEFAULT)
                        .inner_margin(egui::Margin::symmetric(8, 6))
                        .show(ui, |ui| {
                            ui.spacing_mut().item_spacing.x = 4.0;
                            ui.horizontal(|ui| {
                                crate::ui::components::icon(ui, icons::MAGNIFYING_GLASS, 14.0, theme::TEXT_DIM);
                                let response = ui.add(
                                    egui::TextEdit::singleline(&mut self.search_query)
                                        .hint_text("Search resources...")
                                        .frame(false)
                                        .desired_width(280.0),
                                );
                                if response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                                    submit_search = true;
                                }
                                if !self.search_query.is_empty()
                                    && ui
                                        .add(egui::Button::new(icons::X).frame(false))
                                        .on_hover_text("Clear search")
                                        .clicked()
                                {
                                    self.search_query.clear();
                                    submit_search = true;
                                }
                            });
                        });

                    ui.add_space(theme::SPACING_MD);
                    ui.add(
                        egui::Label::new(
                            egui::RichText::new(format!("Showing {} of {} resources", shown, total))
                                .color(theme::TEXT_DIM),
                        )
                        .selectable(false),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        // Icons show the mode we'll switch TO
                        let (mode_icon, mode_tip) = if self.fixed_mode {
                            (icons::INFINITY, "Switch to infinite scroll")
                        } else {
                            (icons::FILES, "Switch to pages")
                        };
                        if ui
                            .add(egui::Button::new(mode_icon).frame(false))
                            .on_hover_text(mode_tip)
                            .clicked()
                        {
                            toggle_mode = true;
                        }

                        let (view_icon, view_tip) = match self.layout_style {
                            LayoutStyle::Grid => (icons::LIST, "Switch to List view"),
                            LayoutStyle::List => (icons::SQUARES_FOUR, "Switch to Grid view"),
                        };
                        if ui
                            .add(egui::Button::new(view_icon).frame(false))
                            .on_hover_text(view_tip)
                            .clicked()
                        {
                            toggle_layout = true;
                        }

                        if ui
                            .add(egui::Button::new(icons::FOLDER_OPEN).frame(false))
                            .on_hover_text("Open download folder")
                            .clicked()
                        {
                            let _ = open::that(self.download_folder());
                        }
                    });
                });
            });

        if submit_search {
            let query = self.search_query.trim().to_string();
            if query != self.applied_search {
                self.applied_search = query;
                self.reload_catalog(ctx);
            }
        }
        if toggle_layout {
            self.layout_style = match self.layout_style {
                LayoutStyle::Grid => LayoutStyle::List,
                LayoutStyle::List => LayoutStyle::Grid,
            };
            card_grid::store_layout_style(ctx, self.layout_style);
            self.save_settings();
        }
        if toggle_mode {
            self.fixed_mode = !self.fixed_mode;
            self.save_settings();
            self.reload_catalog(ctx);
        }
    }

    pub fn render_catalog(&mut self, ctx: &egui::Context) {
        let downloading = self.in_progress_downloads();
        let base = self.settings.catalog_url().to_string();
        let selected_key = self.selected.as_ref().map(|r| r.key().to_string());
        let searching = !self.applied_search.is_empty();
        let page_size = self.catalog.page_size();
        let fixed = self.fixed_mode;

        let mut load_page: Option<u32> = None;
        let mut pager_target: Option<u32> = None;
        let mut retry = false;
        let mut picked: Option<Resource> = None;

        let state_arc = self.catalog_state.clone();
        let state = lock(&state_arc);
        let page = state.page.max(1);
        let page_count = state.page_count(page_size);
        let loading = state.loading;
        let error_text = state.error.as_deref();

        let response = egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(theme::BG_BASE))
            .show(ctx, |ui| {
                let mut grid = CardGrid::new("catalog_grid")
                    .resources(&state.resources)
                    .loading(loading)
                    .page(page)
                    .next_page_available(state.is_next_page_available)
                    .on_load(|next| load_page = Some(next))
                    .format_href(|r| catalogue_href(&base, r))
                    .build_href_by_template(|r, template| join_url(&base, &build_href_by_template(r, template)))
                    .get_detail_href(|r| detail_href(&base, r))
                    .is_card_active(|r| selected_key.as_deref() == Some(r.key()))
                    .container_style(theme::grid_container_frame())
                    .card_options(actions::card_options())
                    .message_id(state.message_id(searching))
                    .downloading(&downloading)
                    .fixed(fixed)
                    .thumbnails(&mut self.thumbnails);

                if let Some(error) = error_text {
                    let retry = &mut retry;
                    grid = grid.children(move |ui| {
                        if error_notice(ui, error) {
                            *retry = true;
                        }
                    });
                }

                if fixed {
                    grid = grid.on_select(|r| picked = Some(r.clone())).footer(|ui| {
                        ui.add_space(theme::SPACING_LG);
                        ui.horizontal(|ui| {
                            let pager_width = 260.0;
                            ui.add_space(((ui.available_width() - pager_width) / 2.0).max(0.0));
                            if ui
                                .add_enabled(page > 1 && !loading, theme::button(format!("{}  Prev", icons::CARET_LEFT)))
                                .clicked()
                            {
                                pager_target = Some(page - 1);
                            }
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(format!("Page {} of {}", page, page_count))
                                        .color(theme::TEXT_MUTED),
                                )
                                .selectable(false),
                            );
                            if ui
                                .add_enabled(
                                    state.is_next_page_available && !loading,
                                    theme::button(format!("Next  {}", icons::CARET_RIGHT)),
                                )
                                .clicked()
                            {
                                pager_target = Some(page + 1);
                            }
                        });
                        ui.add_space(theme::SPACING_LG);
                    });
                }

                grid.show(ui)
            })
            .inner;
        drop(state);

        if let Some(next) = load_page {
            self.fetch_page(ctx, next, LoadMode::Append);
        }
        if let Some(target) = pager_target {
            self.fetch_page(ctx, target, LoadMode::Replace);
        }
        if retry {
            self.reload_catalog(ctx);
        }
        if picked.is_some() {
            self.selected = picked;
        }
        if let Some(href) = response.open_href {
            self.open_href(&href);
        }
        if let Some(action) = response.action {
            let resource = self.find_resource(&action.key);
            self.handle_card_action(ctx, action, resource);
        }
    }

    fn find_resource(&self, key: &str) -> Option<Resource> {
        lock(&self.catalog_state).resources.iter().find(|r| r.key() == key).cloned()
    }

    /// Side panel for the card selected in fixed mode
    pub fn render_detail_panel(&mut self, ctx: &egui::Context) {
        let Some(resource) = self.selected.clone() else {
            return;
        };
        let base = self.settings.catalog_url().to_string();
        let mut close = false;
        let mut action: Option<&'static str> = None;

        egui::SidePanel::right("detail_panel")
            .exact_width(theme::DETAIL_PANEL_WIDTH)
            .resizable(false)
            .frame(theme::detail_frame())
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    let kind = resource.kind();
                    let (_, fg) = theme::kind_colors(kind);
                    ui.label(egui::RichText::new(format!("{}  {}", kind.icon(), kind.label())).color(fg));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.add(egui::Button::new(icons::X).frame(false)).on_hover_text("Close").clicked() {
                            close = true;
                        }
                    });
                });
                ui.add_space(theme::SPACING_MD);
                ui.add(
                    egui::Label::new(
                        egui::RichText::new(&resource.title)
                            .size(theme::FONT_TITLE)
                            .strong()
                            .color(theme::TEXT_PRIMARY),
                    )
                    .wrap(),
                );
                if let Some(owner) = &resource.owner {
                    ui.label(
                        egui::RichText::new(format!("{}  {}", icons::USER, owner.display_name()))
                            .color(theme::TEXT_MUTED),
                    );
                }
                if let Some(date) = resource.formatted_date() {
                    ui.label(egui::RichText::new(format!("{}  {}", icons::CALENDAR_BLANK, date)).color(theme::TEXT_DIM));
                }

                ui.add_space(theme::SPACING_LG);
                ui.horizontal_wrapped(|ui| {
                    if ui.add(theme::button_accent(format!("{}  Open", icons::ARROW_SQUARE_OUT))).clicked() {
                        action = Some(ACTION_VIEW);
                    }
                    if resource.download_url.is_some()
                        && ui.add(theme::button(format!("{}  Download", icons::DOWNLOAD_SIMPLE))).clicked()
                    {
                        action = Some(ACTION_DOWNLOAD);
                    }
                    if ui.add(theme::button(format!("{}  Copy link", icons::LINK))).clicked() {
                        action = Some(ACTION_COPY_LINK);
                    }
                });

                ui.add_space(theme::SPACING_LG);
                ui.separator();
                egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
                    let text = resource
                        .abstract_text
                        .as_deref()
                        .filter(|a| !a.trim().is_empty())
                        .unwrap_or("No description.");
                    ui.add(egui::Label::new(egui::RichText::new(text).color(theme::TEXT_SECONDARY)).wrap());
                });
            });

        if close {
            self.selected = None;
        }
        if let Some(option_id) = action {
            let href = match option_id {
                ACTION_COPY_LINK => catalogue_href(&base, &resource),
                _ => detail_href(&base, &resource),
            };
            let action = CardAction { key: resource.key().to_string(), option_id, href };
            self.handle_card_action(ctx, action, Some(resource));
        }
    }

    /// Bottom bar summarising downloads, only while there are entries
    pub fn render_downloads_bar(&mut self, ctx: &egui::Context) {
        let (active, completed, failed, cancelled, received, expected) = {
            let s = lock(&self.download_state);
            if s.download_order.is_empty() {
                return;
            }
            let mut received = 0u64;
            let mut expected = 0u64;
            for status in s.downloads.values() {
                if let DownloadStatus::Downloading(done, total) = status {
                    received += done;
                    expected += total;
                }
            }
            (s.in_progress().len(), s.completed_count, s.failed_count, s.cancelled_count, received, expected)
        };

        let mut cancel = false;
        let mut clear = false;

        egui::TopBottomPanel::bottom("downloads_bar")
            .frame(
                egui::Frame::new()
                    .fill(theme::BG_ELEVATED)
                    .inner_margin(egui::Margin::symmetric(16, 8)),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    crate::ui::components::icon(ui, icons::DOWNLOAD_SIMPLE, theme::FONT_BODY, theme::ACCENT_LIGHT);
                    ui.label(egui::RichText::new(format!("{} downloading", active)).color(theme::TEXT_SECONDARY));
                    for (count, label, color) in [
                        (completed, "done", theme::STATUS_SUCCESS),
                        (failed, "failed", theme::STATUS_ERROR),
                        (cancelled, "cancelled", theme::STATUS_WARNING),
                    ] {
                        if count > 0 {
                            ui.label(egui::RichText::new(format!("·  {} {}", count, label)).color(color));
                        }
                    }

                    if active > 0 {
                        let progress = if expected > 0 { received as f32 / expected as f32 } else { 0.0 };
                        ui.add(
                            egui::ProgressBar::new(progress)
                                .desired_width(180.0)
                                .text(format_bytes(received)),
                        );
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if active > 0 {
                            if ui.add(theme::button("Cancel")).clicked() {
                                cancel = true;
                            }
                        } else if ui.add(theme::button("Clear")).clicked() {
                            clear = true;
                        }
                        if ui
                            .add(egui::Button::new(icons::FOLDER_OPEN).frame(false))
                            .on_hover_text("Open download folder")
                            .clicked()
                        {
                            let _ = open::that(self.download_folder());
                        }
                    });
                });
            });

        if cancel {
            self.cancel_downloads();
        }
        if clear {
            self.clear_finished_downloads();
        }
    }

    /// Toast at the bottom-right: 3s visible then fade, paused on hover
    pub fn render_toast(&mut self, ctx: &egui::Context) {
        let Some(msg) = self.toast_message.clone() else {
            return;
        };
        let visible_duration = 3.0;
        let fade_duration = 0.5;
        let total_duration = visible_duration + fade_duration;
        let margin = 16.0;
        let screen = ctx.screen_rect();

        let elapsed = self.toast_start.map(|t| t.elapsed().as_secs_f32()).unwrap_or(0.0);
        let alpha = if elapsed > visible_duration {
            ((total_duration - elapsed) / fade_duration).clamp(0.0, 1.0)
        } else {
            1.0
        };

        let response = egui::Area::new(egui::Id::new("toast"))
            .fixed_pos(egui::pos2(screen.right() - margin, screen.bottom() - margin))
            .pivot(egui::Align2::RIGHT_BOTTOM)
            .show(ctx, |ui| {
                egui::Frame::new()
                    .fill(theme::BG_SURFACE.gamma_multiply(alpha))
                    .stroke(egui::Stroke::new(theme::STROKE_DEFAULT, theme::ACCENT.gamma_multiply(0.4 * alpha)))
                    .corner_radius(6.0)
                    .inner_margin(egui::Margin::symmetric(16, 10))
                    .show(ui, |ui| {
                        ui.label(egui::RichText::new(msg).color(theme::TEXT_PRIMARY.gamma_multiply(alpha)));
                    });
            });

        if response.response.hovered() {
            self.toast_start = Some(std::time::Instant::now());
        }
        if elapsed >= total_duration {
            self.toast_message = None;
            self.toast_start = None;
        } else {
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource() -> Resource {
        Resource { pk: "12".into(), resource_type: "dataset".into(), ..Default::default() }
    }

    #[test]
    fn catalogue_href_is_absolute() {
        assert_eq!(
            catalogue_href("https://demo.geonode.org/", &resource()),
            "https://demo.geonode.org/catalogue/#/dataset/12"
        );
    }

    #[test]
    fn error_notice_renders_inside_the_grid() {
        let state = std::sync::Mutex::new(super::super::catalog::CatalogState {
            error: Some("catalog answered HTTP 500".into()),
            ..Default::default()
        });
        let ctx = egui::Context::default();
        let mut shown = 0;
        let mut retry = false;
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 800.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            let guard = lock(&state);
            let error_text = guard.error.as_deref();
            egui::CentralPanel::default().show(ctx, |ui| {
                let mut grid = CardGrid::new("error_grid").resources(&guard.resources);
                if let Some(error) = error_text {
                    let retry = &mut retry;
                    let shown = &mut shown;
                    grid = grid.children(move |ui| {
                        *shown += 1;
                        if error_notice(ui, error) {
                            *retry = true;
                        }
                    });
                }
                grid.show(ui);
            });
        });
        assert!(shown >= 1);
        assert!(!retry);
    }

    #[test]
    fn detail_href_prefers_api_detail_url() {
        let mut r = resource();
        assert_eq!(detail_href("https://a.org", &r), "https://a.org/catalogue/#/dataset/12");
        r.detail_url = Some("/catalogue/#/dataset/12/edit".into());
        assert_eq!(detail_href("https://a.org", &r), "https://a.org/catalogue/#/dataset/12/edit");
        r.detail_url = Some("https://b.org/d/12".into());
        assert_eq!(detail_href("https://a.org", &r), "https://b.org/d/12");
    }
}
