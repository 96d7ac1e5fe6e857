use crate::graph::FilterMode;

use super::{ElementId, EventKind, RenderTarget, UiAction};

pub const FILTER_GROUP_NAME: &str = "node-filter";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterButtons {
    pub group: ElementId,
    pub primary: ElementId,
    pub all: ElementId,
}

impl FilterButtons {
    pub fn button(&self, mode: FilterMode) -> ElementId {
        match mode {
            FilterMode::PrimaryOnly => self.primary,
            FilterMode::All => self.all,
        }
    }
}

pub fn draw_filter_radio_buttons<T: RenderTarget>(
    target: &mut T,
    primary_id: &str,
    all_id: &str,
    group_id: &str,
    mode: FilterMode,
) -> FilterButtons {
    let group = match target.element_by_id(group_id) {
        Some(group) => {
            target.remove_children(group);
            group
        }
        None => {
            let group = target.create_element("div");
            target.set_attribute(group, "id", group_id);
            target.set_attribute(group, "class", "filter-buttons");
            let body = target.body();
            target.append_child(body, group);
            group
        }
    };

    let primary = radio_button(target, group, primary_id, FilterMode::PrimaryOnly);
    let all = radio_button(target, group, all_id, FilterMode::All);
    let buttons = FilterButtons {
        group,
        primary,
        all,
    };
    sync_filter_buttons(target, &buttons, mode);
    buttons
}

fn radio_button<T: RenderTarget>(
    target: &mut T,
    group: ElementId,
    id: &str,
    mode: FilterMode,
) -> ElementId {
    let input = target.create_element("input");
    target.set_attribute(input, "type", "radio");
    target.set_attribute(input, "id", id);
    target.set_attribute(input, "name", FILTER_GROUP_NAME);
    target.set_attribute(input, "value", mode.value());
    target.add_listener(input, EventKind::Change, UiAction::SetFilter(mode));
    target.append_child(group, input);

    let label = target.create_element("label");
    target.set_attribute(label, "for", id);
    target.set_text(label, mode.label());
    target.append_child(group, label);

    input
}

pub fn sync_filter_buttons<T: RenderTarget>(target: &mut T, buttons: &FilterButtons, mode: FilterMode) {
    for candidate in [FilterMode::PrimaryOnly, FilterMode::All] {
        let input = buttons.button(candidate);
        if candidate == mode {
            target.set_attribute(input, "checked", "checked");
        } else {
            target.remove_attribute(input, "checked");
        }
    }
}
