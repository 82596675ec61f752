//! The client-local cart: an ordered mapping from item id to a catalog snapshot and a
//! quantity. Carts live only for the current browsing session; they are destroyed on
//! successful order placement and lost on navigation away without checkout.

use log::*;
use onl_common::Money;

/// A snapshot of a catalog item at the moment it was added to the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub item_id: String,
    pub name: String,
    pub unit_price: Money,
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub item: CartItem,
    pub quantity: u32,
    pub allow_substitution: bool,
}

impl CartLine {
    pub fn line_total(&self) -> Money {
        self.item.unit_price * i64::from(self.quantity)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the item with the given quantity. Adding an item that is already in the cart
    /// increases its quantity; insertion order is preserved.
    pub fn add(&mut self, item: CartItem, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.lines.iter_mut().find(|l| l.item.item_id == item.item_id) {
            Some(line) => line.quantity += quantity,
            None => {
                trace!("🛒️ Adding {} x{} to cart", item.name, quantity);
                self.lines.push(CartLine { item, quantity, allow_substitution: true });
            },
        }
    }

    /// Increments the quantity of an existing line. Returns false if the item is not in
    /// the cart.
    pub fn increment(&mut self, item_id: &str) -> bool {
        match self.lines.iter_mut().find(|l| l.item.item_id == item_id) {
            Some(line) => {
                line.quantity += 1;
                true
            },
            None => false,
        }
    }

    /// Decrements the quantity of an existing line, removing the line when it reaches
    /// zero. Returns false if the item is not in the cart.
    pub fn decrement(&mut self, item_id: &str) -> bool {
        let Some(idx) = self.lines.iter().position(|l| l.item.item_id == item_id) else {
            return false;
        };
        if self.lines[idx].quantity > 1 {
            self.lines[idx].quantity -= 1;
        } else {
            self.lines.remove(idx);
        }
        true
    }

    pub fn remove(&mut self, item_id: &str) {
        self.lines.retain(|l| l.item.item_id != item_id);
    }

    /// Records whether the customer allows the given line to be substituted.
    pub fn set_substitution(&mut self, item_id: &str, allow: bool) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.item_id == item_id) {
            line.allow_substitution = allow;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct lines in the cart.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity_of(&self, item_id: &str) -> u32 {
        self.lines.iter().find(|l| l.item.item_id == item_id).map(|l| l.quantity).unwrap_or(0)
    }

    pub fn lines(&self) -> impl Iterator<Item = &CartLine> {
        self.lines.iter()
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn chips() -> CartItem {
        CartItem { item_id: "chips".into(), name: "Chips".into(), unit_price: Money::from_cents(250), category: None }
    }

    fn salsa() -> CartItem {
        CartItem {
            item_id: "salsa".into(),
            name: "Salsa".into(),
            unit_price: Money::from_cents(399),
            category: Some("condiments".into()),
        }
    }

    #[test]
    fn add_merges_existing_lines() {
        let mut cart = Cart::new();
        cart.add(chips(), 2);
        cart.add(salsa(), 1);
        cart.add(chips(), 1);
        assert_eq!(cart.len(), 2);
        assert_eq!(cart.quantity_of("chips"), 3);
        // Insertion order survives the merge.
        let ids: Vec<&str> = cart.lines().map(|l| l.item.item_id.as_str()).collect();
        assert_eq!(ids, vec!["chips", "salsa"]);
    }

    #[test]
    fn decrement_removes_at_zero() {
        let mut cart = Cart::new();
        cart.add(chips(), 1);
        assert!(cart.decrement("chips"));
        assert!(cart.is_empty());
        assert!(!cart.decrement("chips"));
    }

    #[test]
    fn subtotal_is_sum_of_line_totals() {
        let mut cart = Cart::new();
        cart.add(chips(), 3);
        cart.add(salsa(), 2);
        assert_eq!(cart.subtotal(), Money::from_cents(250 * 3 + 399 * 2));
    }

    #[test]
    fn clear_empties_the_cart() {
        let mut cart = Cart::new();
        cart.add(chips(), 5);
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Money::default());
    }

    #[test]
    fn substitution_preference_is_per_line() {
        let mut cart = Cart::new();
        cart.add(chips(), 1);
        cart.add(salsa(), 1);
        cart.set_substitution("salsa", false);
        let prefs: Vec<bool> = cart.lines().map(|l| l.allow_substitution).collect();
        assert_eq!(prefs, vec![true, false]);
    }
}
