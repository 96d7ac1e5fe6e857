use std::collections::HashMap;
use std::fmt::Write as _;

use super::{EventKind, RenderTarget, UiAction};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId {
    index: u32,
    generation: u32,
}

#[derive(Debug, Default)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    style: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    listeners: Vec<(EventKind, UiAction)>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    element: Option<Element>,
}

/// Headless element tree. Slots of removed subtrees are recycled with a
/// bumped generation, so stale ids resolve to nothing.
#[derive(Debug)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<u32>,
    ids: HashMap<String, ElementId>,
    root: ElementId,
    body: ElementId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut document = Self {
            slots: Vec::new(),
            free: Vec::new(),
            ids: HashMap::new(),
            root: ElementId {
                index: 0,
                generation: 0,
            },
            body: ElementId {
                index: 0,
                generation: 0,
            },
        };
        document.root = document.allocate("html");
        document.body = document.allocate("body");
        document.append_child(document.root, document.body);
        document
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.element.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_alive(&self, element: ElementId) -> bool {
        self.get(element).is_some()
    }

    pub fn tag(&self, element: ElementId) -> Option<&str> {
        self.get(element).map(|element| element.tag.as_str())
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.get(element)
            .map(|element| element.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent(&self, element: ElementId) -> Option<ElementId> {
        self.get(element).and_then(|element| element.parent)
    }

    pub fn text(&self, element: ElementId) -> Option<&str> {
        self.get(element).and_then(|element| element.text.as_deref())
    }

    pub fn has_class(&self, element: ElementId, class: &str) -> bool {
        self.attribute(element, "class")
            .is_some_and(|classes| classes.split_whitespace().any(|name| name == class))
    }

    pub fn descendants(&self, element: ElementId) -> Vec<ElementId> {
        let mut found = Vec::new();
        let mut stack = self.children(element).iter().rev().copied().collect::<Vec<_>>();
        while let Some(next) = stack.pop() {
            found.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        found
    }

    pub fn descendants_by_tag(&self, element: ElementId, tag: &str) -> Vec<ElementId> {
        self.descendants(element)
            .into_iter()
            .filter(|&child| self.tag(child) == Some(tag))
            .collect()
    }

    pub fn descendants_by_class(&self, element: ElementId, class: &str) -> Vec<ElementId> {
        self.descendants(element)
            .into_iter()
            .filter(|&child| self.has_class(child, class))
            .collect()
    }

    pub fn children_by_tag(&self, element: ElementId, tag: &str) -> Vec<ElementId> {
        self.children(element)
            .iter()
            .copied()
            .filter(|&child| self.tag(child) == Some(tag))
            .collect()
    }

    /// Inclusive: an element contains itself.
    pub fn contains(&self, ancestor: ElementId, element: ElementId) -> bool {
        let mut current = Some(element);
        while let Some(next) = current {
            if next == ancestor {
                return true;
            }
            current = self.parent(next);
        }
        false
    }

    pub fn to_markup(&self, element: ElementId) -> String {
        let mut out = String::new();
        self.write_markup(element, &mut out);
        out
    }

    fn write_markup(&self, id: ElementId, out: &mut String) {
        let Some(element) = self.get(id) else {
            return;
        };

        let _ = write!(out, "<{}", element.tag);
        for (name, value) in &element.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape_xml(value));
        }
        if !element.style.is_empty() {
            let style = element
                .style
                .iter()
                .map(|(property, value)| format!("{property}: {value}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape_xml(&style));
        }

        if element.text.is_none() && element.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        if let Some(text) = &element.text {
            out.push_str(&escape_xml(text));
        }
        for &child in &element.children {
            self.write_markup(child, out);
        }
        let _ = write!(out, "</{}>", element.tag);
    }

    fn get(&self, id: ElementId) -> Option<&Element> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_ref())
    }

    fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.element.as_mut())
    }

    fn allocate(&mut self, tag: &str) -> ElementId {
        let element = Element {
            tag: tag.to_owned(),
            ..Element::default()
        };

        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.element = Some(element);
            return ElementId {
                index,
                generation: slot.generation,
            };
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            element: Some(element),
        });
        ElementId {
            index,
            generation: 0,
        }
    }

    fn release(&mut self, id: ElementId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation != id.generation {
            return;
        }
        let Some(element) = slot.element.take() else {
            return;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);

        if let Some((_, value)) = element.attributes.iter().find(|(name, _)| name == "id")
            && self.ids.get(value) == Some(&id)
        {
            self.ids.remove(value);
        }
        for child in element.children {
            self.release(child);
        }
    }

    fn detach(&mut self, child: ElementId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        if let Some(parent) = self.get_mut(parent) {
            parent.children.retain(|&existing| existing != child);
        }
        if let Some(child) = self.get_mut(child) {
            child.parent = None;
        }
    }
}

impl RenderTarget for Document {
    fn body(&self) -> ElementId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> ElementId {
        self.allocate(tag)
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if !self.is_alive(parent) || !self.is_alive(child) || self.contains(child, parent) {
            return;
        }
        self.detach(child);
        if let Some(element) = self.get_mut(child) {
            element.parent = Some(parent);
        }
        if let Some(element) = self.get_mut(parent) {
            element.children.push(child);
        }
    }

    fn remove_children(&mut self, parent: ElementId) {
        let Some(element) = self.get_mut(parent) else {
            return;
        };
        for child in std::mem::take(&mut element.children) {
            self.release(child);
        }
    }

    fn set_attribute(&mut self, element: ElementId, name: &str, value: &str) {
        if name == "id" {
            if let Some(previous) = self.attribute(element, "id").map(str::to_owned)
                && self.ids.get(&previous) == Some(&element)
            {
                self.ids.remove(&previous);
            }
            if self.is_alive(element) {
                self.ids.insert(value.to_owned(), element);
            }
        }

        let Some(element) = self.get_mut(element) else {
            return;
        };
        match element
            .attributes
            .iter_mut()
            .find(|(existing, _)| existing == name)
        {
            Some((_, existing)) => *existing = value.to_owned(),
            None => element
                .attributes
                .push((name.to_owned(), value.to_owned())),
        }
    }

    fn remove_attribute(&mut self, element: ElementId, name: &str) {
        if name == "id"
            && let Some(previous) = self.attribute(element, "id").map(str::to_owned)
            && self.ids.get(&previous) == Some(&element)
        {
            self.ids.remove(&previous);
        }
        if let Some(element) = self.get_mut(element) {
            element.attributes.retain(|(existing, _)| existing != name);
        }
    }

    fn attribute(&self, element: ElementId, name: &str) -> Option<&str> {
        self.get(element).and_then(|element| {
            element
                .attributes
                .iter()
                .find(|(existing, _)| existing == name)
                .map(|(_, value)| value.as_str())
        })
    }

    fn set_style(&mut self, element: ElementId, property: &str, value: &str) {
        let Some(element) = self.get_mut(element) else {
            return;
        };
        match element
            .style
            .iter_mut()
            .find(|(existing, _)| existing == property)
        {
            Some((_, existing)) => *existing = value.to_owned(),
            None => element.style.push((property.to_owned(), value.to_owned())),
        }
    }

    fn style(&self, element: ElementId, property: &str) -> Option<&str> {
        self.get(element).and_then(|element| {
            element
                .style
                .iter()
                .find(|(existing, _)| existing == property)
                .map(|(_, value)| value.as_str())
        })
    }

    fn set_text(&mut self, element: ElementId, text: &str) {
        if let Some(element) = self.get_mut(element) {
            element.text = Some(text.to_owned());
        }
    }

    fn element_by_id(&self, id: &str) -> Option<ElementId> {
        self.ids
            .get(id)
            .copied()
            .filter(|&element| self.is_alive(element))
    }

    fn add_listener(&mut self, element: ElementId, event: EventKind, action: UiAction) {
        if let Some(element) = self.get_mut(element) {
            element.listeners.push((event, action));
        }
    }

    fn listeners(&self, element: ElementId, event: EventKind) -> Vec<UiAction> {
        self.get(element)
            .map(|element| {
                element
                    .listeners
                    .iter()
                    .filter(|(kind, _)| *kind == event)
                    .map(|(_, action)| *action)
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn escape_xml(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}
