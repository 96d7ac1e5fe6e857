mod controls;
mod document;
mod icons;
pub mod svg;

use crate::graph::FilterMode;

pub use controls::{FILTER_GROUP_NAME, FilterButtons, draw_filter_radio_buttons, sync_filter_buttons};
pub use document::{Document, ElementId};
pub use icons::IconMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Change,
    PointerDown,
    PointerMove,
    PointerUp,
    PointerEnter,
    PointerLeave,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiAction {
    SetFilter(FilterMode),
    Drag(usize),
    Hover(usize),
}

pub trait RenderTarget {
    fn body(&self) -> ElementId;
    fn create_element(&mut self, tag: &str) -> ElementId;
    fn append_child(&mut self, parent: ElementId, child: ElementId);
    fn remove_children(&mut self, parent: ElementId);
    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str);
    fn remove_attribute(&mut self, element: ElementId, name: &str);
    fn attribute(&self, element: ElementId, name: &str) -> Option<&str>;
    fn set_style(&mut self, element: ElementId, property: &str, value: &str);
    fn style(&self, element: ElementId, property: &str) -> Option<&str>;
    fn set_text(&mut self, element: ElementId, text: &str);
    fn element_by_id(&self, id: &str) -> Option<ElementId>;
    fn add_listener(&mut self, element: ElementId, event: EventKind, action: UiAction);
    fn listeners(&self, element: ElementId, event: EventKind) -> Vec<UiAction>;
}
