/// Items the player carries. Each name is held at most once; the order only
/// decides which slot an item is drawn in
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Inventory {
    items: Vec<String>,
}

impl Inventory {
    pub const SLOTS: usize = 8;

    /// Returns false when the item was already held
    pub fn add(&mut self, item: &str) -> bool {
        if self.contains(item) {
            return false;
        }
        self.items.push(item.to_string());
        true
    }

    pub fn contains(&self, item: &str) -> bool {
        self.items.iter().any(|held| held == item)
    }

    /// Slot contents, padded with `None` up to [`Inventory::SLOTS`]
    pub fn slots(&self) -> impl Iterator<Item = Option<&str>> {
        (0..Self::SLOTS).map(move |index| self.items.get(index).map(String::as_str))
    }
}
