//! Centralized theme constants for the catalog browser
//! All colors, sizes, and styling should reference these constants

use crate::types::ResourceKind;
use egui::Color32;

// =============================================================================
// COLORS - Backgrounds
// =============================================================================
pub const BG_BASE: Color32 = Color32::from_rgb(0x0b, 0x0d, 0x12); // slate-950
pub const BG_ELEVATED: Color32 = Color32::from_rgb(0x16, 0x1a, 0x22); // card body
pub const BG_INPUT: Color32 = Color32::from_rgb(0x12, 0x15, 0x1c);
pub const BG_SURFACE: Color32 = Color32::from_rgb(0x22, 0x27, 0x31);
pub const BG_THUMB: Color32 = Color32::from_rgb(0x1c, 0x21, 0x2b); // thumbnail placeholder

// =============================================================================
// COLORS - Accent (GeoNode blue)
// =============================================================================
pub const ACCENT: Color32 = Color32::from_rgb(0x39, 0x7a, 0xab);
pub const ACCENT_LIGHT: Color32 = Color32::from_rgb(0x6f, 0xa8, 0xd6);

// =============================================================================
// COLORS - Text
// =============================================================================
pub const TEXT_PRIMARY: Color32 = Color32::WHITE;
pub const TEXT_SECONDARY: Color32 = Color32::from_rgb(0xe2, 0xe8, 0xf0);
pub const TEXT_MUTED: Color32 = Color32::from_rgb(0x94, 0xa3, 0xb8);
pub const TEXT_DIM: Color32 = Color32::from_rgb(0x64, 0x74, 0x8b);

// =============================================================================
// COLORS - Borders
// =============================================================================
pub const BORDER_SUBTLE: Color32 = Color32::from_rgb(0x22, 0x27, 0x31);
pub const BORDER_DEFAULT: Color32 = Color32::from_rgb(0x33, 0x3b, 0x48);

// =============================================================================
// COLORS - Status
// =============================================================================
pub const STATUS_SUCCESS: Color32 = Color32::from_rgb(0x34, 0xd3, 0x99);
pub const STATUS_WARNING: Color32 = Color32::from_rgb(0xfb, 0xbf, 0x24);
pub const STATUS_ERROR: Color32 = Color32::from_rgb(0xf8, 0x71, 0x71);

// =============================================================================
// COLORS - Buttons
// =============================================================================
pub const BTN_DEFAULT: Color32 = Color32::from_rgb(0x33, 0x3b, 0x48);
pub const BTN_ACCENT: Color32 = ACCENT;

// =============================================================================
// COLORS - Resource kinds
// =============================================================================
/// Returns (badge background, badge text) for a resource kind
pub fn kind_colors(kind: ResourceKind) -> (Color32, Color32) {
    let text = match kind {
        ResourceKind::Dataset => Color32::from_rgb(0x38, 0xbd, 0xf8),
        ResourceKind::Document => Color32::from_rgb(0xfb, 0xbf, 0x24),
        ResourceKind::Map => Color32::from_rgb(0x34, 0xd3, 0x99),
        ResourceKind::Dashboard => Color32::from_rgb(0xf4, 0x72, 0xb6),
        ResourceKind::GeoStory => Color32::from_rgb(0xfb, 0x92, 0x3c),
        ResourceKind::Other => Color32::from_rgb(0x94, 0xa3, 0xb8),
    };
    (
        Color32::from_rgba_unmultiplied(text.r(), text.g(), text.b(), 24),
        text,
    )
}

// =============================================================================
// TYPOGRAPHY - Font Sizes
// =============================================================================
pub const FONT_TITLE: f32 = 18.0;
pub const FONT_HEADING: f32 = 16.0;
pub const FONT_BODY: f32 = 14.0;
pub const FONT_LABEL: f32 = 13.0;
pub const FONT_SMALL: f32 = 11.0;

// =============================================================================
// DIMENSIONS - Cards
// =============================================================================
/// Height of a grid card; its width comes from the grid metrics
pub const CARD_GRID_HEIGHT: f32 = 300.0;
/// Share of a grid card taken by the thumbnail
pub const CARD_THUMB_RATIO: f32 = 0.55;
pub const CARD_LIST_HEIGHT: f32 = 88.0;
pub const CARD_LIST_THUMB_WIDTH: f32 = 140.0;
pub const DETAIL_PANEL_WIDTH: f32 = 320.0;

// =============================================================================
// CORNER RADIUS / STROKES / SPACING
// =============================================================================
pub const RADIUS_DEFAULT: f32 = 4.0;
pub const RADIUS_LARGE: f32 = 8.0;

pub const STROKE_DEFAULT: f32 = 1.0;
pub const STROKE_MEDIUM: f32 = 1.5;
pub const STROKE_THICK: f32 = 2.0;

pub const SPACING_SM: f32 = 4.0;
pub const SPACING_MD: f32 = 8.0;
pub const SPACING_LG: f32 = 12.0;
pub const SPACING_XL: f32 = 16.0;

// =============================================================================
// HELPER - Apply global visuals
// =============================================================================
pub fn apply_visuals(ctx: &egui::Context) {
    ctx.set_visuals(egui::Visuals {
        dark_mode: true,
        panel_fill: BG_BASE,
        window_fill: Color32::from_rgb(0x14, 0x18, 0x20),
        extreme_bg_color: BG_BASE,
        faint_bg_color: BG_ELEVATED,
        hyperlink_color: ACCENT_LIGHT,
        selection: egui::style::Selection {
            bg_fill: Color32::from_rgb(0x2a, 0x3b, 0x4f),
            stroke: egui::Stroke::NONE,
        },
        widgets: egui::style::Widgets {
            noninteractive: egui::style::WidgetVisuals {
                bg_fill: BG_ELEVATED,
                weak_bg_fill: BG_SURFACE,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
            inactive: egui::style::WidgetVisuals {
                bg_fill: Color32::TRANSPARENT,
                weak_bg_fill: BG_ELEVATED,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_SECONDARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
            hovered: egui::style::WidgetVisuals {
                bg_fill: BG_SURFACE,
                weak_bg_fill: Color32::from_rgb(0x2a, 0x31, 0x3d),
                bg_stroke: egui::Stroke::NONE,
                fg_stroke: egui::Stroke::new(STROKE_MEDIUM, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
            active: egui::style::WidgetVisuals {
                bg_fill: Color32::from_rgb(0x2a, 0x31, 0x3d),
                weak_bg_fill: Color32::from_rgb(0x2a, 0x31, 0x3d),
                bg_stroke: egui::Stroke::NONE,
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: -2.0,
            },
            open: egui::style::WidgetVisuals {
                bg_fill: BG_SURFACE,
                weak_bg_fill: BG_ELEVATED,
                bg_stroke: egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE),
                fg_stroke: egui::Stroke::new(STROKE_DEFAULT, TEXT_PRIMARY),
                corner_radius: RADIUS_DEFAULT.into(),
                expansion: 0.0,
            },
        },
        interact_cursor: Some(egui::CursorIcon::PointingHand),
        window_corner_radius: egui::CornerRadius::same(8),
        menu_corner_radius: egui::CornerRadius::same(8),
        ..egui::Visuals::dark()
    });

    ctx.style_mut(|style| {
        style.interaction.selectable_labels = false;
        style.spacing.menu_margin = egui::Margin::symmetric(6, 4);
        style.spacing.item_spacing = egui::vec2(8.0, 6.0);
        style.spacing.button_padding = egui::vec2(12.0, 6.0);
        style.spacing.scroll.bar_width = 6.0;
    });
}

// =============================================================================
// HELPER - Frames
// =============================================================================

/// Default container style of the card grid
pub fn grid_container_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_BASE)
        .inner_margin(egui::Margin::symmetric(SPACING_LG as i8, SPACING_MD as i8))
}

pub fn detail_frame() -> egui::Frame {
    egui::Frame::new()
        .fill(BG_ELEVATED)
        .stroke(egui::Stroke::new(STROKE_DEFAULT, BORDER_SUBTLE))
        .inner_margin(egui::Margin::same(SPACING_XL as i8))
}

// =============================================================================
// HELPER - Buttons and menus
// =============================================================================

/// Default gray button
pub fn button(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(text.into())
        .fill(BTN_DEFAULT)
        .corner_radius(RADIUS_DEFAULT)
}

/// Accent button (for primary actions like Download)
pub fn button_accent(text: impl Into<String>) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.into()).color(TEXT_PRIMARY))
        .fill(BTN_ACCENT)
        .corner_radius(RADIUS_DEFAULT)
}

/// Menu item with icon. Returns true if clicked.
pub fn menu_item(ui: &mut egui::Ui, icon: &str, label: &str) -> bool {
    let text = format!("{}  {}", icon, label);
    let w = ui.available_width();
    let (rect, response) = ui.allocate_exact_size(egui::vec2(w, 24.0), egui::Sense::click());
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        ui.painter().rect_filled(rect, RADIUS_DEFAULT, lighten(BG_SURFACE, 0.12));
    }
    ui.painter().text(
        rect.left_center() + egui::vec2(8.0, 0.0),
        egui::Align2::LEFT_CENTER,
        text,
        egui::FontId::proportional(FONT_LABEL),
        TEXT_SECONDARY,
    );
    response.clicked()
}

/// Sets menu width to 1.5x the widest label.
pub fn set_menu_width(ui: &mut egui::Ui, labels: &[&str]) {
    let max_text = labels
        .iter()
        .map(|l| {
            ui.fonts(|f| {
                f.layout_no_wrap(l.to_string(), egui::FontId::proportional(FONT_LABEL), TEXT_SECONDARY)
                    .rect
                    .width()
            })
        })
        .fold(0.0_f32, f32::max);
    let w = (max_text + 16.0) * 1.5;
    ui.set_min_width(w);
    ui.set_max_width(w);
}

pub fn lighten(c: Color32, amount: f32) -> Color32 {
    let r = (c.r() as f32 + (255.0 - c.r() as f32) * amount) as u8;
    let g = (c.g() as f32 + (255.0 - c.g() as f32) * amount) as u8;
    let b = (c.b() as f32 + (255.0 - c.b() as f32) * amount) as u8;
    Color32::from_rgb(r, g, b)
}
