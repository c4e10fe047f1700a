//! Reusable UI components
//!
//! Spinner, icon, message block and the resource card painted by the card
//! grid. None of these know about the app state.

use crate::theme;
use crate::types::{CardOption, LayoutStyle, Resource};
use crate::ui::messages;
use eframe::egui;
use std::sync::Arc;

/// Loading spinner with an accessible hover label
pub fn spinner(ui: &mut egui::Ui) -> egui::Response {
    ui.add(egui::Spinner::new().size(24.0).color(theme::ACCENT_LIGHT))
        .on_hover_text("Loading...")
}

/// Phosphor glyph rendered as a non-selectable label
pub fn icon(ui: &mut egui::Ui, glyph: &str, size: f32, color: egui::Color32) -> egui::Response {
    ui.add(egui::Label::new(egui::RichText::new(glyph).size(size).color(color)).selectable(false))
}

/// Title + content block for the `gnhome.{id}Title` / `gnhome.{id}Content` messages
pub fn message_block(ui: &mut egui::Ui, message_id: &str) {
    ui.vertical_centered(|ui| {
        ui.add_space(theme::SPACING_XL * 2.0);
        ui.add(
            egui::Label::new(
                egui::RichText::new(messages::resolve(&messages::title_key(message_id)))
                    .size(theme::FONT_TITLE * 1.4)
                    .strong()
                    .color(theme::TEXT_PRIMARY),
            )
            .selectable(false),
        );
        ui.add_space(theme::SPACING_MD);
        ui.add(
            egui::Label::new(
                egui::RichText::new(messages::resolve(&messages::content_key(message_id)))
                    .size(theme::FONT_BODY)
                    .color(theme::TEXT_MUTED),
            )
            .wrap()
            .selectable(false),
        );
        ui.add_space(theme::SPACING_XL);
    });
}

fn truncated_galley(
    ui: &egui::Ui,
    text: &str,
    size: f32,
    color: egui::Color32,
    max_width: f32,
    max_rows: usize,
) -> Arc<egui::Galley> {
    let mut job = egui::text::LayoutJob::single_section(
        text.to_owned(),
        egui::TextFormat::simple(egui::FontId::proportional(size), color),
    );
    job.wrap = egui::text::TextWrapping {
        max_width: max_width.max(1.0),
        max_rows,
        break_anywhere: max_rows == 1,
        overflow_character: Some('…'),
    };
    ui.fonts(|f| f.layout_job(job))
}

/// Options listed in a card menu. Returns the chosen option id.
fn option_menu(ui: &mut egui::Ui, options: &[CardOption]) -> Option<&'static str> {
    ui.spacing_mut().item_spacing.y = 2.0;
    let labels: Vec<String> = options.iter().map(|o| format!("{}  {}", o.icon, o.label)).collect();
    let label_refs: Vec<&str> = labels.iter().map(|s| s.as_str()).collect();
    theme::set_menu_width(ui, &label_refs);

    let mut chosen = None;
    for option in options {
        if theme::menu_item(ui, option.icon, &option.label) {
            chosen = Some(option.id);
            ui.close_menu();
        }
    }
    chosen
}

pub struct ResourceCardProps<'r> {
    pub resource: &'r Resource,
    pub width: f32,
    pub style: LayoutStyle,
    pub active: bool,
    pub loading: bool,
    pub read_only: bool,
    pub downloading: bool,
    pub options: &'r [CardOption],
    pub thumbnail: Option<egui::TextureHandle>,
}

pub struct CardOutcome {
    pub response: egui::Response,
    pub clicked: bool,
    pub chosen_option: Option<&'static str>,
}

pub fn card_height(style: LayoutStyle) -> f32 {
    match style {
        LayoutStyle::Grid => theme::CARD_GRID_HEIGHT,
        LayoutStyle::List => theme::CARD_LIST_HEIGHT,
    }
}

/// Paint one resource card and handle its interactions
pub fn resource_card(ui: &mut egui::Ui, props: &ResourceCardProps<'_>) -> CardOutcome {
    let sense = if props.read_only { egui::Sense::hover() } else { egui::Sense::click() };
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(props.width, card_height(props.style)), sense);

    if ui.is_rect_visible(rect) {
        paint_card(ui, rect, &response, props);
    }

    if response.hovered() && !props.read_only {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
    }

    let mut chosen_option = None;
    let mut options_clicked = false;

    if !props.options.is_empty() {
        // Top-right "more" button
        let btn_rect = egui::Rect::from_min_size(
            rect.right_top() + egui::vec2(-32.0, 6.0),
            egui::vec2(26.0, 26.0),
        );
        let btn = ui.put(
            btn_rect,
            egui::Button::new(
                egui::RichText::new(egui_phosphor::regular::DOTS_THREE_VERTICAL)
                    .size(theme::FONT_HEADING)
                    .color(theme::TEXT_PRIMARY),
            )
            .fill(egui::Color32::from_black_alpha(140))
            .corner_radius(theme::RADIUS_DEFAULT),
        );
        let popup_id = ui.make_persistent_id((props.resource.key(), "card_options"));
        if btn.clicked() {
            options_clicked = true;
            ui.memory_mut(|m| m.toggle_popup(popup_id));
        }
        if let Some(Some(id)) = egui::popup_below_widget(
            ui,
            popup_id,
            &btn,
            egui::PopupCloseBehavior::CloseOnClick,
            |ui| option_menu(ui, props.options),
        ) {
            chosen_option = Some(id);
        }

        response.context_menu(|ui| {
            if let Some(id) = option_menu(ui, props.options) {
                chosen_option = Some(id);
            }
        });
    }

    let clicked = response.clicked() && !options_clicked && !props.read_only;
    CardOutcome { response, clicked, chosen_option }
}

fn paint_card(ui: &egui::Ui, rect: egui::Rect, response: &egui::Response, props: &ResourceCardProps<'_>) {
    let painter = ui.painter();
    let resource = props.resource;
    let kind = resource.kind();
    let radius = theme::RADIUS_LARGE;

    painter.rect_filled(rect, radius, theme::BG_ELEVATED);

    let (thumb_rect, body_rect, thumb_corners) = match props.style {
        LayoutStyle::Grid => {
            let split = rect.min.y + rect.height() * theme::CARD_THUMB_RATIO;
            (
                egui::Rect::from_min_max(rect.min, egui::pos2(rect.max.x, split)),
                egui::Rect::from_min_max(egui::pos2(rect.min.x, split), rect.max),
                egui::CornerRadius { nw: radius as u8, ne: radius as u8, sw: 0, se: 0 },
            )
        }
        LayoutStyle::List => {
            let split = (rect.min.x + theme::CARD_LIST_THUMB_WIDTH).min(rect.max.x);
            (
                egui::Rect::from_min_max(rect.min, egui::pos2(split, rect.max.y)),
                egui::Rect::from_min_max(egui::pos2(split, rect.min.y), rect.max),
                egui::CornerRadius { nw: radius as u8, ne: 0, sw: radius as u8, se: 0 },
            )
        }
    };

    // Thumbnail clipped to the card corners, or a kind icon placeholder
    match &props.thumbnail {
        Some(tex) => {
            let brush = egui::epaint::Brush {
                fill_texture_id: tex.id(),
                uv: egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
            };
            let mut shape = egui::epaint::RectShape::filled(thumb_rect, thumb_corners, egui::Color32::WHITE);
            shape.brush = Some(Arc::new(brush));
            painter.add(shape);
        }
        None => {
            painter.rect_filled(thumb_rect, thumb_corners, theme::BG_THUMB);
            painter.text(
                thumb_rect.center(),
                egui::Align2::CENTER_CENTER,
                kind.icon(),
                egui::FontId::proportional(thumb_rect.height().min(64.0) * 0.6),
                theme::TEXT_DIM,
            );
        }
    }

    let body = body_rect.shrink(theme::SPACING_LG);
    let mut y = body.min.y;

    // Kind badge + date
    let (badge_bg, badge_fg) = theme::kind_colors(kind);
    let badge_text = format!("{} {}", kind.icon(), kind.label());
    let badge = truncated_galley(ui, &badge_text, theme::FONT_SMALL, badge_fg, body.width(), 1);
    let badge_rect = egui::Rect::from_min_size(egui::pos2(body.min.x, y), badge.size() + egui::vec2(10.0, 4.0));
    painter.rect_filled(badge_rect, theme::RADIUS_DEFAULT, badge_bg);
    painter.galley(badge_rect.min + egui::vec2(5.0, 2.0), badge, badge_fg);
    if let Some(date) = resource.formatted_date() {
        painter.text(
            egui::pos2(body.max.x, y + 2.0),
            egui::Align2::RIGHT_TOP,
            date,
            egui::FontId::proportional(theme::FONT_SMALL),
            theme::TEXT_DIM,
        );
    }
    y = badge_rect.max.y + theme::SPACING_SM;

    // Title
    let title_rows = if props.style == LayoutStyle::Grid { 2 } else { 1 };
    let title = truncated_galley(ui, &resource.title, theme::FONT_BODY, theme::TEXT_PRIMARY, body.width(), title_rows);
    let title_h = title.size().y;
    painter.galley(egui::pos2(body.min.x, y), title, theme::TEXT_PRIMARY);
    y += title_h + 2.0;

    // Owner
    if let Some(owner) = &resource.owner {
        let by = truncated_galley(
            ui,
            &format!("by {}", owner.display_name()),
            theme::FONT_SMALL,
            theme::TEXT_MUTED,
            body.width(),
            1,
        );
        let by_h = by.size().y;
        painter.galley(egui::pos2(body.min.x, y), by, theme::TEXT_MUTED);
        y += by_h + theme::SPACING_SM;
    }

    // Abstract, grid only
    if props.style == LayoutStyle::Grid {
        if let Some(text) = resource.abstract_text.as_deref().filter(|t| !t.trim().is_empty()) {
            let rows = (((body.max.y - y) / 14.0).floor() as usize).clamp(1, 3);
            let abs = truncated_galley(ui, text.trim(), theme::FONT_SMALL, theme::TEXT_DIM, body.width(), rows);
            painter.galley(egui::pos2(body.min.x, y), abs, theme::TEXT_DIM);
        }
    }

    if props.downloading {
        let badge = egui::Rect::from_min_size(rect.left_top() + egui::vec2(8.0, 8.0), egui::vec2(26.0, 26.0));
        painter.rect_filled(badge, 13.0, egui::Color32::from_black_alpha(170));
        painter.text(
            badge.center(),
            egui::Align2::CENTER_CENTER,
            egui_phosphor::regular::DOWNLOAD_SIMPLE,
            egui::FontId::proportional(theme::FONT_LABEL),
            theme::ACCENT_LIGHT,
        );
    }

    if props.loading {
        painter.rect_filled(rect, radius, egui::Color32::from_black_alpha(150));
        let spin_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(28.0, 28.0));
        egui::Spinner::new().color(theme::ACCENT_LIGHT).paint_at(ui, spin_rect);
        ui.ctx().request_repaint();
    }

    let (stroke_w, stroke_color) = if props.active {
        (theme::STROKE_THICK, theme::ACCENT)
    } else if response.hovered() && !props.read_only {
        (theme::STROKE_DEFAULT, theme::BORDER_DEFAULT)
    } else {
        (theme::STROKE_DEFAULT, theme::BORDER_SUBTLE)
    };
    painter.rect_stroke(rect, radius, egui::Stroke::new(stroke_w, stroke_color), egui::StrokeKind::Inside);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_card(props_for: impl Fn() -> (Resource, LayoutStyle)) -> f32 {
        let ctx = egui::Context::default();
        let mut height = 0.0;
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                let (resource, style) = props_for();
                let props = ResourceCardProps {
                    resource: &resource,
                    width: 320.0,
                    style,
                    active: true,
                    loading: false,
                    read_only: false,
                    downloading: true,
                    options: &[],
                    thumbnail: None,
                };
                height = resource_card(ui, &props).response.rect.height();
            });
        });
        height
    }

    #[test]
    fn card_height_follows_layout_style() {
        let resource = || Resource { pk: "1".into(), title: "Rivers".into(), ..Default::default() };
        assert_eq!(run_card(|| (resource(), LayoutStyle::Grid)), theme::CARD_GRID_HEIGHT);
        assert_eq!(run_card(|| (resource(), LayoutStyle::List)), theme::CARD_LIST_HEIGHT);
    }
}
