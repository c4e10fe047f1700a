//! Card option menu entries and what they do

use super::App;
use crate::card_grid::CardAction;
use crate::constants::CATALOGUE_HREF_TEMPLATE;
use crate::types::{CardOption, Resource};
use eframe::egui;
use egui_phosphor::regular as icons;
use tracing::{info, warn};

pub const ACTION_VIEW: &str = "view";
pub const ACTION_DOWNLOAD: &str = "download";
pub const ACTION_COPY_LINK: &str = "copy_link";

/// Options offered on every card that isn't busy
pub fn card_options() -> Vec<CardOption> {
    vec![
        CardOption {
            id: ACTION_VIEW,
            label: "View".into(),
            icon: icons::ARROW_SQUARE_OUT,
            href_template: None,
        },
        CardOption {
            id: ACTION_DOWNLOAD,
            label: "Download".into(),
            icon: icons::DOWNLOAD_SIMPLE,
            href_template: None,
        },
        CardOption {
            id: ACTION_COPY_LINK,
            label: "Copy link".into(),
            icon: icons::LINK,
            href_template: Some(CATALOGUE_HREF_TEMPLATE.to_string()),
        },
    ]
}

impl App {
    pub fn open_href(&mut self, href: &str) {
        if href.is_empty() || href == "#" {
            return;
        }
        info!(href = %href, "Opening resource");
        if let Err(e) = open::that(href) {
            warn!(href = %href, error = %e, "Failed to open link");
            self.show_toast("Could not open the browser");
        }
    }

    pub fn handle_card_action(&mut self, ctx: &egui::Context, action: CardAction, resource: Option<Resource>) {
        match action.option_id {
            ACTION_VIEW => self.open_href(&action.href),
            ACTION_COPY_LINK => {
                ctx.copy_text(action.href.clone());
                self.show_toast("Link copied");
            }
            ACTION_DOWNLOAD => match resource {
                Some(resource) => self.start_download(ctx, &resource),
                None => warn!(key = %action.key, "Download requested for a resource no longer listed"),
            },
            other => warn!(option = %other, "Unhandled card option"),
        }
    }
}
