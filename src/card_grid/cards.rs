//! Cards: rows of resource cards spaced by the responsive grid metrics

use super::layout::GridMetrics;
use super::{CardAction, CardGrid, CardGridResponse};
use crate::types::{CardOption, LayoutStyle, Resource};
use crate::ui::components::{resource_card, ResourceCardProps};
use eframe::egui;
use std::collections::HashSet;
use tracing::warn;

impl<'a> CardGrid<'a> {
    pub(super) fn show_cards(&mut self, ui: &mut egui::Ui, style: LayoutStyle, out: &mut CardGridResponse) {
        let width = self.container_width.unwrap_or_else(|| ui.available_width());
        let metrics = GridMetrics::compute(width);
        let padding = metrics.container_padding(style);
        let columns = metrics.columns(style);
        let resources = self.resources;
        let mut seen: HashSet<&str> = HashSet::with_capacity(resources.len());

        ui.vertical(|ui| {
            ui.spacing_mut().item_spacing = egui::Vec2::ZERO;
            ui.add_space(padding.top);
            for (row_idx, row) in resources.chunks(columns).enumerate() {
                ui.horizontal_top(|ui| {
                    ui.add_space(padding.left);
                    for (col, resource) in row.iter().enumerate() {
                        let idx = row_idx * columns + col;
                        let space = metrics.card_space(style, idx);
                        ui.add_space(space.margin.left);
                        ui.vertical(|ui| {
                            ui.add_space(space.margin.top);
                            if !seen.insert(resource.key()) {
                                self.warn_duplicate_key(ui.ctx(), resource.key());
                            }
                            self.show_card(ui, resource, idx, style, space.width, out);
                            ui.add_space(space.margin.bottom);
                        });
                        ui.add_space(space.margin.right);
                    }
                });
            }
            ui.add_space(padding.bottom);
        });
    }

    /// Logs once per key for the lifetime of the grid
    fn warn_duplicate_key(&self, ctx: &egui::Context, key: &str) {
        let warned_id = self.id_salt.with("duplicate_keys");
        let first = ctx.data_mut(|d| {
            d.get_temp_mut_or_default::<HashSet<String>>(warned_id)
                .insert(key.to_string())
        });
        if first {
            warn!(key = %key, "Duplicate resource key in card grid");
        }
    }

    fn show_card(
        &mut self,
        ui: &mut egui::Ui,
        resource: &Resource,
        idx: usize,
        style: LayoutStyle,
        width: f32,
        out: &mut CardGridResponse,
    ) {
        let statuses = resource.statuses();
        let thumbnail = match self.thumbnails.as_mut() {
            Some(provider) => provider.thumbnail(ui.ctx(), resource),
            None => None,
        };
        let options = self.visible_options(resource);

        let props = ResourceCardProps {
            resource,
            width,
            style,
            active: (self.is_card_active)(resource),
            loading: statuses.is_processing,
            read_only: statuses.is_processing,
            downloading: self.downloading.iter().any(|d| d.pk == resource.pk),
            options,
            thumbnail,
        };

        // Salted with the index so duplicate keys don't share widget state
        let outcome = ui.push_id((resource.key(), idx), |ui| resource_card(ui, &props)).inner;

        if outcome.clicked {
            if self.fixed {
                if let Some(on_select) = self.on_select.as_mut() {
                    on_select(resource);
                }
                out.selected = Some(resource.key().to_string());
            } else {
                out.open_href = Some((self.format_href)(resource));
            }
        }

        if let Some(option_id) = outcome.chosen_option {
            let href = self.action_href(resource, option_id);
            out.action = Some(CardAction { key: resource.key().to_string(), option_id, href });
        }
    }

    /// Busy cards are read-only and offer no options
    pub(super) fn visible_options(&self, resource: &Resource) -> &[CardOption] {
        if resource.statuses().is_processing {
            &[][..]
        } else {
            &self.card_options[..]
        }
    }

    /// Templated href when the option has one, otherwise the detail href
    pub(super) fn action_href(&self, resource: &Resource, option_id: &str) -> String {
        let template = self
            .card_options
            .iter()
            .find(|o| o.id == option_id)
            .and_then(|o| o.href_template.as_deref());
        match template {
            Some(t) => (self.build_href_by_template)(resource, t),
            None => (self.get_detail_href)(resource),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Download, Execution, Owner};
    use std::cell::{Cell, RefCell};

    fn resource(pk: &str) -> Resource {
        Resource {
            pk: pk.into(),
            title: format!("Resource {}", pk),
            resource_type: "map".into(),
            owner: Some(Owner { username: "admin".into(), ..Default::default() }),
            ..Default::default()
        }
    }

    fn run(mut grid_fn: impl FnMut(&mut egui::Ui)) -> egui::Context {
        let ctx = egui::Context::default();
        let input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1400.0, 900.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| grid_fn(ui));
        });
        ctx
    }

    fn busy(pk: &str) -> Resource {
        let mut r = resource(pk);
        r.executions.push(Execution { func_name: "copy".into(), status: "running".into(), user: None });
        r
    }

    fn option(id: &'static str, href_template: Option<&str>) -> CardOption {
        CardOption {
            id,
            label: id.into(),
            icon: egui_phosphor::regular::EYE,
            href_template: href_template.map(str::to_string),
        }
    }

    fn button(pos: egui::Pos2, pressed: bool) -> egui::Event {
        egui::Event::PointerButton {
            pos,
            button: egui::PointerButton::Primary,
            pressed,
            modifiers: egui::Modifiers::NONE,
        }
    }

    /// Lay out, press and release over the first grid card at 1280x800
    fn click_first_card(mut show: impl FnMut(&mut egui::Ui) -> CardGridResponse) -> Vec<CardGridResponse> {
        let ctx = egui::Context::default();
        // First card spans roughly x 20..417, y 32..332
        let pos = egui::pos2(60.0, 120.0);
        let frames = vec![
            vec![],
            vec![egui::Event::PointerMoved(pos), button(pos, true)],
            vec![button(pos, false)],
            vec![],
        ];
        let mut responses = Vec::new();
        for (i, events) in frames.into_iter().enumerate() {
            let input = egui::RawInput {
                screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1280.0, 800.0))),
                time: Some(i as f64 * 0.1),
                events,
                ..Default::default()
            };
            let _ = ctx.run(input, |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| responses.push(show(ui)));
            });
        }
        responses
    }

    #[test]
    fn fixed_click_selects_the_card() {
        let items = vec![resource("1"), resource("2")];
        let selected = RefCell::new(Vec::new());
        let responses = click_first_card(|ui| {
            CardGrid::new("cards_fixed_click")
                .resources(&items)
                .layout_style(LayoutStyle::Grid)
                .fixed(true)
                .format_href(|r| format!("/catalogue/#/{}", r.pk))
                .on_select(|r| selected.borrow_mut().push(r.pk.clone()))
                .show(ui)
        });
        let selected = selected.into_inner();
        assert!(!selected.is_empty());
        assert!(selected.iter().all(|pk| pk == "1"));
        assert!(responses.iter().any(|r| r.selected.as_deref() == Some("1")));
        assert!(responses.iter().all(|r| r.open_href.is_none()));
    }

    #[test]
    fn infinite_click_reports_format_href() {
        let items = vec![resource("1"), resource("2")];
        let selects = Cell::new(0);
        let responses = click_first_card(|ui| {
            CardGrid::new("cards_infinite_click")
                .resources(&items)
                .layout_style(LayoutStyle::Grid)
                .format_href(|r| format!("/catalogue/#/{}", r.pk))
                .on_select(|_| selects.set(selects.get() + 1))
                .show(ui)
        });
        assert!(responses.iter().any(|r| r.open_href.as_deref() == Some("/catalogue/#/1")));
        assert!(responses.iter().all(|r| r.selected.is_none()));
        assert_eq!(selects.get(), 0);
    }

    #[test]
    fn busy_card_ignores_clicks() {
        let items = vec![busy("1"), resource("2")];
        for fixed in [true, false] {
            let selects = Cell::new(0);
            let responses = click_first_card(|ui| {
                CardGrid::new(("cards_busy_click", fixed))
                    .resources(&items)
                    .layout_style(LayoutStyle::Grid)
                    .fixed(fixed)
                    .on_select(|_| selects.set(selects.get() + 1))
                    .show(ui)
            });
            assert_eq!(selects.get(), 0);
            assert!(responses.iter().all(|r| r.selected.is_none() && r.open_href.is_none()));
        }
    }

    #[test]
    fn busy_card_has_no_options() {
        let grid = CardGrid::new("cards_options").card_options(vec![option("view", None)]);
        assert!(grid.visible_options(&busy("1")).is_empty());
        assert_eq!(grid.visible_options(&resource("1")).len(), 1);
    }

    #[test]
    fn action_href_prefers_the_option_template() {
        let grid = CardGrid::new("cards_href")
            .card_options(vec![option("view", None), option("copy_link", Some("/catalogue/#/${pk}"))])
            .build_href_by_template(|r, t| t.replace("${pk}", &r.pk))
            .get_detail_href(|r| format!("/detail/{}", r.pk));
        let r = resource("7");
        assert_eq!(grid.action_href(&r, "copy_link"), "/catalogue/#/7");
        assert_eq!(grid.action_href(&r, "view"), "/detail/7");
        // Unknown ids fall back to the detail href
        assert_eq!(grid.action_href(&r, "missing"), "/detail/7");
    }

    #[test]
    fn active_predicate_is_evaluated_per_card() {
        let items = vec![resource("1"), busy("2")];
        let calls = Cell::new(0);

        run(|ui| {
            calls.set(0);
            CardGrid::new("cards_active")
                .resources(&items)
                .layout_style(LayoutStyle::Grid)
                .card_options(vec![option("view", None)])
                .downloading(&[Download { pk: "1".into() }])
                .is_card_active(|r| {
                    calls.set(calls.get() + 1);
                    r.pk == "1"
                })
                .fixed(true)
                .show(ui);
        });
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn duplicate_keys_still_render_and_are_recorded() {
        let items = vec![resource("1"), resource("1"), resource("3")];
        let rendered = Cell::new(0);
        let ctx = run(|ui| {
            rendered.set(0);
            CardGrid::new("cards_dup")
                .resources(&items)
                .layout_style(LayoutStyle::List)
                .is_card_active(|_| {
                    rendered.set(rendered.get() + 1);
                    false
                })
                .show(ui);
        });
        assert_eq!(rendered.get(), 3);
        let warned = ctx.data_mut(|d| {
            d.get_temp::<HashSet<String>>(egui::Id::new("cards_dup").with("duplicate_keys"))
        });
        assert_eq!(warned, Some(HashSet::from(["1".to_string()])));
    }
}
