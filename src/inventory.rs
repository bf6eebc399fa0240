//! Item containers and the paged inventory views.

use crate::host::Position;
use crate::paging::{Named, PageRequest, Paginator, Scroll, ITEMS_PER_PAGE};
use crate::session::Session;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

// ============================================================================
// Items
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Short identifier typed by players, matched ignoring case
    pub id: String,
    pub name: String,
    /// Behaviour tag understood by the host (`bandage`, `compass`, ...)
    pub kind: String,
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// `"[ID] name"` as shown in listings and replies.
    pub fn label(&self) -> String {
        format!("[{}] {}", self.id.to_uppercase(), self.name)
    }

    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }
}

impl Named for Item {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered item container. Index 0 is the top (highest priority) slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: Vec<Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.matches_id(id))
    }

    pub fn first_of_kind(&self, kind: &str) -> Option<&Item> {
        self.items.iter().find(|item| item.kind == kind)
    }

    pub fn remove(&mut self, id: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.matches_id(id))?;
        Some(self.items.remove(index))
    }

    pub fn remove_first_of_kind(&mut self, kind: &str) -> Option<Item> {
        let index = self.items.iter().position(|item| item.kind == kind)?;
        Some(self.items.remove(index))
    }

    /// Put an item on top.
    pub fn push(&mut self, item: Item) {
        self.items.insert(0, item);
    }

    /// Move an item to the top. Returns false if it is not here.
    pub fn prioritize(&mut self, id: &str) -> bool {
        match self.remove(id) {
            Some(item) => {
                self.push(item);
                true
            }
            None => false,
        }
    }
}

impl From<Vec<Item>> for Inventory {
    fn from(items: Vec<Item>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Inventory {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Flatten nearby containers into one sequence: container order, then item order.
///
/// The containers come from the host for a single command; the result must not be kept.
pub fn available_items<C>(containers: &[C]) -> impl Iterator<Item = &Item> + '_
where
    C: Deref<Target = Inventory>,
{
    containers.iter().flat_map(|c| c.iter())
}

// ============================================================================
// Browser
// ============================================================================

/// Paged views over the backpack and over nearby items, sharing one stored page per session.
#[derive(Debug, Clone, Copy)]
pub struct InventoryBrowser {
    pager: Paginator,
}

impl Default for InventoryBrowser {
    fn default() -> Self {
        Self::new(ITEMS_PER_PAGE)
    }
}

impl InventoryBrowser {
    pub fn new(page_size: usize) -> Self {
        Self {
            pager: Paginator::new(page_size),
        }
    }

    /// `/next` and `/prev`: nothing scrolls one page, a number jumps, text searches.
    pub fn scroll<C>(&self, session: &mut Session, arg: Option<&str>, scroll: Scroll, nearby: &[C]) -> String
    where
        C: Deref<Target = Inventory>,
    {
        let request = PageRequest::parse(arg, scroll);
        let stored = session.inventory_page;
        session.inventory_page = self.pager.resolve(available_items(nearby), &request, stored);
        self.pager
            .format_page(session.inventory_page, available_items(nearby), |item| item.label())
    }

    /// `/backpack`: same as scrolling but over the player's own items; no argument shows page 1.
    pub fn browse_backpack(&self, session: &mut Session, arg: Option<&str>, backpack: &Inventory) -> String {
        let request = match arg.map(str::trim).filter(|a| !a.is_empty()) {
            None => PageRequest::Absolute(1),
            some => PageRequest::parse(some, Scroll::Next),
        };
        session.inventory_page = self.pager.resolve(backpack, &request, session.inventory_page);
        self.pager
            .format_page(session.inventory_page, backpack, |item| item.label())
    }

    /// Reset the stored page when the player enters another grid cell. Returns true on reset.
    pub fn on_position_update(&self, session: &mut Session, position: Position) -> bool {
        let cell = position.grid_cell();
        let moved = session.last_cell != Some(cell);
        if moved {
            session.inventory_page = 0;
        }
        session.last_cell = Some(cell);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crate_of(prefix: &str, n: usize) -> Inventory {
        (1..=n)
            .map(|i| Item::new(format!("{prefix}{i}"), format!("{prefix} item {i}"), "junk"))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn push_and_prioritize_use_top_slot() {
        let mut inv = Inventory::new();
        inv.push(Item::new("a1", "Bandage", "bandage"));
        inv.push(Item::new("b2", "Splint", "splint"));
        assert_eq!(inv.iter().next().map(|i| i.id.as_str()), Some("b2"));
        assert!(inv.prioritize("A1"));
        assert_eq!(inv.iter().next().map(|i| i.id.as_str()), Some("a1"));
        assert!(!inv.prioritize("zz"));
        assert_eq!(inv.first_of_kind("splint").map(|i| i.id.as_str()), Some("b2"));
        assert_eq!(inv.remove_first_of_kind("splint").map(|i| i.id), Some("b2".to_string()));
        assert!(inv.remove_first_of_kind("splint").is_none());
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn available_items_flattens_in_order() {
        let mut a = crate_of("a", 2);
        let mut b = crate_of("b", 1);
        let containers: Vec<&mut Inventory> = vec![&mut a, &mut b];
        let ids: Vec<&str> = available_items(&containers).map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["a1", "a2", "b1"]);
    }

    #[test]
    fn scroll_walks_nearby_pages() {
        let browser = InventoryBrowser::default();
        let mut session = Session::new(1);
        let a = crate_of("a", 4);
        let b = crate_of("b", 3);
        let nearby = vec![&a, &b];

        let first = browser.scroll(&mut session, None, Scroll::Next, &nearby);
        assert_eq!(first, "1) [A1] a item 1, [A2] a item 2, [A3] a item 3");
        let second = browser.scroll(&mut session, None, Scroll::Next, &nearby);
        assert_eq!(second, "2) [A4] a item 4, [B1] b item 1, [B2] b item 2");
        let back = browser.scroll(&mut session, None, Scroll::Previous, &nearby);
        assert!(back.starts_with("1) "));
        let found = browser.scroll(&mut session, Some("b item 3"), Scroll::Next, &nearby);
        assert_eq!(found, "3) [B3] b item 3");
        assert_eq!(session.inventory_page, 3);
        let past = browser.scroll(&mut session, Some("9"), Scroll::Previous, &nearby);
        assert_eq!(past, "9) ");
    }

    #[test]
    fn backpack_defaults_to_first_page() {
        let browser = InventoryBrowser::default();
        let mut session = Session::new(1);
        session.inventory_page = 2;
        let pack = crate_of("p", 5);
        assert!(browser.browse_backpack(&mut session, None, &pack).starts_with("1) [P1]"));
        assert_eq!(browser.browse_backpack(&mut session, Some("item 5"), &pack), "2) [P4] p item 4, [P5] p item 5");
        // Unknown query keeps the stored page
        assert!(browser.browse_backpack(&mut session, Some("rifle"), &pack).starts_with("2) "));
    }

    #[test]
    fn moving_to_another_cell_resets_page() {
        let browser = InventoryBrowser::default();
        let mut session = Session::new(1);
        browser.on_position_update(&mut session, Position::new(0.2, 0.3, 0.4));
        session.inventory_page = 3;
        assert!(!browser.on_position_update(&mut session, Position::new(0.9, 0.1, 0.99)));
        assert_eq!(session.inventory_page, 3);
        assert!(browser.on_position_update(&mut session, Position::new(0.9, 0.1, 1.01)));
        assert_eq!(session.inventory_page, 0);
    }
}
