//! Order builder — the in-progress order for one table.
//!
//! The cart holds at most one line per identity key (menu item + sorted
//! exclusions). Every mutation that can produce a duplicate key routes through
//! the merge pass, which folds the moved line into the existing one:
//! - `add_item` appends a fresh line, then merges it into a plain sibling
//! - `exclude_ingredient` / `include_ingredient` rekey a single-unit line in
//!   place, or split one unit off a multi-unit line, then merge
//! - `set_quantity` / `remove_line` never change a key
//!
//! Operations on a key that is no longer in the cart are silent no-ops.

use crate::catalog::{CategoryLookup, CategoryRef};
use crate::domain::{CartLine, CategoryId, LineKey, MenuItemId, MenuItemRef, StaffId, TableId};
use crate::submission::{OrderItemPayload, OrderSubmission};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, warn};

/// Validation failures surfaced to the caller. The cart is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("menu item {name} ({id}) is not available")]
    ItemUnavailable { id: MenuItemId, name: String },

    #[error("cannot submit an empty order")]
    EmptyCart,

    #[error("line {key} already holds the maximum quantity")]
    QuantityOverflow { key: LineKey },
}

/// Lines of one category, in cart order. `category` is `None` for items the
/// lookup could not place.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: Option<CategoryRef>,
    pub lines: Vec<&'a CartLine>,
}

impl CategoryGroup<'_> {
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(|l| l.subtotal()).sum()
    }
}

/// The in-progress order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    // ── Mutators ──────────────────────────────────────────────────────

    /// Add one uncustomized unit of `item`.
    ///
    /// Returns the key of the line that now carries the unit. Unavailable
    /// items, and items whose plain line is already at `u32::MAX`, are
    /// rejected and leave the cart untouched.
    pub fn add_item(&mut self, item: &MenuItemRef) -> Result<LineKey, CartError> {
        if !item.is_available {
            warn!(item_id = %item.id, name = %item.name, "rejected unavailable menu item");
            return Err(CartError::ItemUnavailable {
                id: item.id,
                name: item.name.clone(),
            });
        }
        if !self.has_room_for_unit(item.id, &BTreeSet::new()) {
            let key = LineKey::plain(item.id);
            warn!(%key, "rejected add onto a full cart line");
            return Err(CartError::QuantityOverflow { key });
        }

        self.lines.push(CartLine::from_menu_item(item));
        let idx = self.merge_pass(self.lines.len() - 1);
        Ok(self.lines[idx].key())
    }

    /// Replace the quantity of the line at `key`. Zero removes the line.
    pub fn set_quantity(&mut self, key: &LineKey, quantity: u32) {
        if quantity < 1 {
            self.remove_line(key);
            return;
        }
        if let Some(idx) = self.position(key) {
            self.lines[idx].quantity = quantity;
        }
    }

    pub fn remove_line(&mut self, key: &LineKey) {
        if let Some(idx) = self.position(key) {
            self.lines.remove(idx);
        }
    }

    /// Exclude `ingredient` from one unit of the line at `key`.
    ///
    /// Returns the key now carrying that unit, or `None` if nothing changed:
    /// absent line, ingredient not removable or already excluded, or the
    /// line the unit would merge into is already at `u32::MAX`.
    pub fn exclude_ingredient(&mut self, key: &LineKey, ingredient: &str) -> Option<LineKey> {
        let idx = self.position(key)?;
        let line = &self.lines[idx];
        if !line.is_removable(ingredient) || line.is_excluded(ingredient) {
            return None;
        }
        let mut excluded = line.excluded_ingredient_names.clone();
        excluded.insert(ingredient.to_string());
        self.rekey_one_unit(idx, excluded)
    }

    /// Put `ingredient` back on one unit of the line at `key`.
    ///
    /// Mirror of [`Cart::exclude_ingredient`]; a no-op unless the ingredient
    /// is currently excluded on that line.
    pub fn include_ingredient(&mut self, key: &LineKey, ingredient: &str) -> Option<LineKey> {
        let idx = self.position(key)?;
        let line = &self.lines[idx];
        if !line.is_excluded(ingredient) {
            return None;
        }
        let mut excluded = line.excluded_ingredient_names.clone();
        excluded.remove(ingredient);
        self.rekey_one_unit(idx, excluded)
    }

    /// Drop every line. Called after a confirmed submission.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    // ── Queries ───────────────────────────────────────────────────────

    /// Lines in display order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartLine> {
        self.lines.iter()
    }

    pub fn line(&self, key: &LineKey) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.has_key(key))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }

    /// Units of one menu item across all its customizations.
    pub fn quantity_of(&self, menu_item_id: MenuItemId) -> u64 {
        self.lines
            .iter()
            .filter(|l| l.menu_item_id == menu_item_id)
            .map(|l| u64::from(l.quantity))
            .sum()
    }

    /// Σ quantity × unit price.
    pub fn compute_total(&self) -> Decimal {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Partition lines by category, ordered by the category's display order.
    ///
    /// Lines keep their cart order within a group. Items the lookup cannot
    /// place end up in a trailing group with `category: None`.
    pub fn group_by_category<L>(&self, lookup: &L) -> Vec<CategoryGroup<'_>>
    where
        L: CategoryLookup + ?Sized,
    {
        let mut known: BTreeMap<(i32, CategoryId), CategoryGroup<'_>> = BTreeMap::new();
        let mut uncategorized: Vec<&CartLine> = Vec::new();

        for line in &self.lines {
            match lookup.category_of(line.menu_item_id) {
                Some(category) => known
                    .entry((category.display_order, category.id))
                    .or_insert_with(|| CategoryGroup {
                        category: Some(category),
                        lines: Vec::new(),
                    })
                    .lines
                    .push(line),
                None => uncategorized.push(line),
            }
        }

        let mut groups: Vec<CategoryGroup<'_>> = known.into_values().collect();
        if !uncategorized.is_empty() {
            groups.push(CategoryGroup {
                category: None,
                lines: uncategorized,
            });
        }
        groups
    }

    /// Build the payload for the order submission service.
    pub fn to_submission_payload(
        &self,
        table_id: TableId,
        staff_id: StaffId,
    ) -> Result<OrderSubmission, CartError> {
        if self.lines.is_empty() {
            warn!(%table_id, "rejected submission of empty cart");
            return Err(CartError::EmptyCart);
        }

        let order_items = self
            .lines
            .iter()
            .map(|line| OrderItemPayload {
                menu_item_id: line.menu_item_id,
                menu_item_name: line.menu_item_name.clone(),
                quantity: line.quantity,
                price: line.unit_price,
                special_instructions: line.note(),
            })
            .collect();

        Ok(OrderSubmission {
            table_id,
            staff_id,
            order_items,
        })
    }

    // ── Internals ─────────────────────────────────────────────────────

    fn position(&self, key: &LineKey) -> Option<usize> {
        self.lines.iter().position(|l| l.has_key(key))
    }

    /// Whether one more unit fits on the line keyed by `menu_item_id` and
    /// `excluded`. A missing line always has room.
    fn has_room_for_unit(&self, menu_item_id: MenuItemId, excluded: &BTreeSet<String>) -> bool {
        self.lines
            .iter()
            .find(|l| l.menu_item_id == menu_item_id && &l.excluded_ingredient_names == excluded)
            .map_or(true, |l| l.quantity.checked_add(1).is_some())
    }

    /// Move one unit of line `idx` onto the key given by `excluded`.
    ///
    /// A single-unit line is rekeyed in place. A multi-unit line gives up one
    /// unit to a new line placed right after it. Either way the merge pass
    /// then folds the moved unit into an existing sibling with the same key.
    /// Returns `None`, with the cart untouched, when that sibling is full.
    fn rekey_one_unit(&mut self, idx: usize, excluded: BTreeSet<String>) -> Option<LineKey> {
        if !self.has_room_for_unit(self.lines[idx].menu_item_id, &excluded) {
            warn!(key = %self.lines[idx].key(), "rejected ingredient toggle onto a full cart line");
            return None;
        }

        let line = &mut self.lines[idx];
        let moved = if line.quantity == 1 {
            line.excluded_ingredient_names = excluded;
            idx
        } else {
            line.quantity -= 1;
            let mut unit = line.clone();
            unit.quantity = 1;
            unit.excluded_ingredient_names = excluded;
            debug!(
                from = %line.key(),
                to = %unit.key(),
                remaining = line.quantity,
                "split one unit off cart line"
            );
            self.lines.insert(idx + 1, unit);
            idx + 1
        };

        let survivor = self.merge_pass(moved);
        Some(self.lines[survivor].key())
    }

    /// Fold line `moved` into another line with the same key, if any.
    ///
    /// The existing line keeps its position and absorbs the quantity; the
    /// moved line is deleted. Returns the index of the line that now carries
    /// the key. Callers check `has_room_for_unit` first.
    fn merge_pass(&mut self, moved: usize) -> usize {
        let existing = (0..self.lines.len()).find(|&i| {
            i != moved
                && self.lines[i].menu_item_id == self.lines[moved].menu_item_id
                && self.lines[i].excluded_ingredient_names
                    == self.lines[moved].excluded_ingredient_names
        });

        let Some(existing) = existing else {
            return moved;
        };

        let absorbed = self.lines.remove(moved);
        let survivor = if existing > moved { existing - 1 } else { existing };
        let survivor_line = &mut self.lines[survivor];
        survivor_line.quantity = survivor_line.quantity.saturating_add(absorbed.quantity);
        debug!(
            key = %self.lines[survivor].key(),
            quantity = self.lines[survivor].quantity,
            "merged cart lines"
        );
        survivor
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartLine;
    type IntoIter = std::slice::Iter<'a, CartLine>;

    fn into_iter(self) -> Self::IntoIter {
        self.lines.iter()
    }
}
