use crate::{
    buffers::side_buffer::{SideBuffer, Slot},
    level::{Level, Quantity},
    price::PriceType,
    side::Side,
};

/// Result of an add (or restore) against one side of the depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion<P: PriceType> {
    /// The price was already displayed and has been aggregated into.
    Existing,
    /// A new level was opened.
    Created,
    /// A new level was opened and the previously worst level was dropped from the window.
    Evicted(Level<P>),
    /// The side is full and the price ranks behind all of it. Nothing changed.
    OutsideWindow,
}

impl<P: PriceType> Insertion<P> {
    #[inline(always)]
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        !matches!(self, Self::OutsideWindow)
    }
}

/// Result of closing an order against one side of the depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closure {
    /// The level still holds quantity.
    Reduced,
    /// The level drained and was removed; poll the restoration query next.
    Erased,
    /// The price is not displayed. Nothing changed.
    Untracked,
}

impl Closure {
    #[inline(always)]
    #[must_use]
    pub const fn is_erased(self) -> bool {
        matches!(self, Self::Erased)
    }
}

/// Result of an increase or decrease against one side of the depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Amendment {
    Applied,
    Untracked,
}

/// Owned copy of the displayed levels, best first on both sides.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepthSnapshot<P: PriceType> {
    pub bids: Vec<Level<P>>,
    pub asks: Vec<Level<P>>,
    pub last_change: u64,
}

#[derive(Debug, Clone)]
/// The best `N` price levels of each side of a book.
///
/// - `bids`: highest price first.
/// - `asks`: lowest price first.
/// - `last_change`: stamp of the most recent mutation, also written into every level it touched.
/// - `last_published_change`: stamp recorded by the last call to [`Depth::published`].
///
/// Prices outside the window are ignored by every mutation; the owning book is expected to
/// replenish a side through [`Depth::needs_bid_restoration`] / [`Depth::needs_ask_restoration`]
/// after any close that erased a level.
pub struct Depth<const N: usize, P: PriceType = i64> {
    bids: SideBuffer<N, P>,
    asks: SideBuffer<N, P>,
    last_change: u64,
    last_published_change: u64,
}

impl Default for Depth<1, i64> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Depth<5, i64> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Depth<10, i64> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, P: PriceType> Depth<N, P> {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self { bids: SideBuffer::new(Side::Buy), asks: SideBuffer::new(Side::Sell), last_change: 0, last_published_change: 0 }
    }

    #[inline(always)]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline(always)]
    #[must_use]
    pub fn side(&self, side: Side) -> &SideBuffer<N, P> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline(always)]
    fn side_mut(&mut self, side: Side) -> &mut SideBuffer<N, P> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    #[inline(always)]
    fn next_change(&mut self) -> u64 {
        self.last_change += 1;
        self.last_change
    }

    pub fn add(&mut self, side: Side, price: P, qty: Quantity) -> Insertion<P> {
        self.insert_orders(side, price, qty, 1)
    }

    /// Inserts a whole level pulled from the owning book while replenishing a side.
    pub fn restore(&mut self, side: Side, price: P, qty: Quantity, order_count: u32) -> Insertion<P> {
        self.insert_orders(side, price, qty, order_count)
    }

    fn insert_orders(&mut self, side: Side, price: P, qty: Quantity, order_count: u32) -> Insertion<P> {
        let Some(slot) = self.side_mut(side).find_or_insert(price) else {
            return Insertion::OutsideWindow;
        };
        let change = self.next_change();
        let buffer = self.side_mut(side);
        let index = slot.index();
        match slot {
            Slot::Existing(_) => {
                if let Some(level) = buffer.get_mut(index) {
                    level.add_orders(qty, order_count);
                    level.stamp(change);
                }
                Insertion::Existing
            }
            Slot::Created(_) | Slot::Evicted { .. } => {
                if let Some(level) = buffer.get_mut(index) {
                    level.add_orders(qty, order_count);
                }
                buffer.stamp_from(index, change);
                match slot {
                    Slot::Evicted { evicted, .. } => Insertion::Evicted(evicted),
                    _ => Insertion::Created,
                }
            }
        }
    }

    pub fn close(&mut self, side: Side, price: P, qty: Quantity) -> Closure {
        let Some(index) = self.side(side).find_index(price) else {
            return Closure::Untracked;
        };
        let change = self.next_change();
        let buffer = self.side_mut(side);
        let drained = match buffer.get_mut(index) {
            Some(level) => {
                let drained = level.close_order(qty);
                level.stamp(change);
                drained
            }
            None => return Closure::Untracked,
        };
        if drained {
            buffer.erase(index);
            buffer.stamp_from(index, change);
            Closure::Erased
        } else {
            Closure::Reduced
        }
    }

    pub fn increase(&mut self, side: Side, price: P, qty_increase: Quantity) -> Amendment {
        self.amend(side, price, |level| level.increase_qty(qty_increase))
    }

    pub fn decrease(&mut self, side: Side, price: P, qty_decrease: Quantity) -> Amendment {
        self.amend(side, price, |level| level.decrease_qty(qty_decrease))
    }

    fn amend(&mut self, side: Side, price: P, apply: impl FnOnce(&mut Level<P>)) -> Amendment {
        let Some(index) = self.side(side).find_index(price) else {
            return Amendment::Untracked;
        };
        let change = self.next_change();
        match self.side_mut(side).get_mut(index) {
            Some(level) => {
                apply(level);
                level.stamp(change);
                Amendment::Applied
            }
            None => Amendment::Untracked,
        }
    }

    /// Moves an order's interest from `current_price`/`current_qty` to `new_price`/`new_qty`.
    /// The new price is added before the old one is closed, so the close may erase a level.
    /// At an unchanged price the level is amended in place, unless `new_qty` is zero, in which
    /// case the order is closed.
    pub fn replace(&mut self, side: Side, current_price: P, new_price: P, current_qty: Quantity, new_qty: Quantity) -> Closure {
        if current_price == new_price && new_qty == 0 {
            return self.close(side, current_price, current_qty);
        }
        if current_price == new_price {
            let amended = if new_qty >= current_qty {
                self.increase(side, current_price, new_qty - current_qty)
            } else {
                self.decrease(side, current_price, current_qty - new_qty)
            };
            return match amended {
                Amendment::Applied => Closure::Reduced,
                Amendment::Untracked => Closure::Untracked,
            };
        }
        self.add(side, new_price, new_qty);
        self.close(side, current_price, current_qty)
    }

    /// Price after which the owner must look for a replacement level, or `None` if the side
    /// was never full and so has nothing beyond its window. A single-level depth always
    /// answers with the side's marketable sort key, meaning "start from the best price".
    #[inline]
    #[must_use]
    pub fn needs_restoration(&self, side: Side) -> Option<P> {
        self.side(side).restoration_price()
    }

    pub fn add_bid(&mut self, price: P, qty: Quantity) -> Insertion<P> {
        self.add(Side::Buy, price, qty)
    }

    pub fn add_ask(&mut self, price: P, qty: Quantity) -> Insertion<P> {
        self.add(Side::Sell, price, qty)
    }

    #[must_use = "an erased level may require restoration"]
    pub fn close_bid(&mut self, price: P, qty: Quantity) -> Closure {
        self.close(Side::Buy, price, qty)
    }

    #[must_use = "an erased level may require restoration"]
    pub fn close_ask(&mut self, price: P, qty: Quantity) -> Closure {
        self.close(Side::Sell, price, qty)
    }

    pub fn increase_bid(&mut self, price: P, qty_increase: Quantity) -> Amendment {
        self.increase(Side::Buy, price, qty_increase)
    }

    pub fn increase_ask(&mut self, price: P, qty_increase: Quantity) -> Amendment {
        self.increase(Side::Sell, price, qty_increase)
    }

    pub fn decrease_bid(&mut self, price: P, qty_decrease: Quantity) -> Amendment {
        self.decrease(Side::Buy, price, qty_decrease)
    }

    pub fn decrease_ask(&mut self, price: P, qty_decrease: Quantity) -> Amendment {
        self.decrease(Side::Sell, price, qty_decrease)
    }

    #[must_use = "an erased level may require restoration"]
    pub fn replace_bid(&mut self, current_price: P, new_price: P, current_qty: Quantity, new_qty: Quantity) -> Closure {
        self.replace(Side::Buy, current_price, new_price, current_qty, new_qty)
    }

    #[must_use = "an erased level may require restoration"]
    pub fn replace_ask(&mut self, current_price: P, new_price: P, current_qty: Quantity, new_qty: Quantity) -> Closure {
        self.replace(Side::Sell, current_price, new_price, current_qty, new_qty)
    }

    pub fn restore_bid(&mut self, price: P, qty: Quantity, order_count: u32) -> Insertion<P> {
        self.restore(Side::Buy, price, qty, order_count)
    }

    pub fn restore_ask(&mut self, price: P, qty: Quantity, order_count: u32) -> Insertion<P> {
        self.restore(Side::Sell, price, qty, order_count)
    }

    #[inline]
    #[must_use]
    pub fn needs_bid_restoration(&self) -> Option<P> {
        self.needs_restoration(Side::Buy)
    }

    #[inline]
    #[must_use]
    pub fn needs_ask_restoration(&self) -> Option<P> {
        self.needs_restoration(Side::Sell)
    }

    #[inline]
    pub fn bids(&self) -> impl Iterator<Item = &Level<P>> + '_ {
        self.bids.iter()
    }

    #[inline]
    pub fn asks(&self) -> impl Iterator<Item = &Level<P>> + '_ {
        self.asks.iter()
    }

    #[inline]
    pub fn bids_mut(&mut self) -> impl Iterator<Item = &mut Level<P>> + '_ {
        self.bids.iter_mut()
    }

    #[inline]
    pub fn asks_mut(&mut self) -> impl Iterator<Item = &mut Level<P>> + '_ {
        self.asks.iter_mut()
    }

    #[inline(always)]
    #[must_use]
    pub fn best_bid(&self) -> Option<&Level<P>> {
        self.bids.first()
    }

    #[inline(always)]
    #[must_use]
    pub fn best_ask(&self) -> Option<&Level<P>> {
        self.asks.first()
    }

    #[inline(always)]
    #[must_use]
    pub fn last_bid_level(&self) -> Option<&Level<P>> {
        self.bids.last_slot()
    }

    #[inline(always)]
    #[must_use]
    pub fn last_ask_level(&self) -> Option<&Level<P>> {
        self.asks.last_slot()
    }

    #[inline(always)]
    pub fn last_bid_level_mut(&mut self) -> Option<&mut Level<P>> {
        self.bids.last_slot_mut()
    }

    #[inline(always)]
    pub fn last_ask_level_mut(&mut self) -> Option<&mut Level<P>> {
        self.asks.last_slot_mut()
    }

    #[inline]
    #[must_use]
    pub fn bid_count(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    #[must_use]
    pub fn ask_count(&self) -> usize {
        self.asks.len()
    }

    #[inline(always)]
    #[must_use]
    pub const fn last_change(&self) -> u64 {
        self.last_change
    }

    #[inline(always)]
    #[must_use]
    pub const fn last_published_change(&self) -> u64 {
        self.last_published_change
    }

    /// Whether anything changed since the last [`Depth::published`].
    #[inline(always)]
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.last_change > self.last_published_change
    }

    #[inline(always)]
    pub fn published(&mut self) {
        self.last_published_change = self.last_change;
    }

    /// Levels of `side` touched after `since`, paired with their index in the window.
    pub fn changed_levels(&self, side: Side, since: u64) -> impl Iterator<Item = (usize, &Level<P>)> + '_ {
        self.side(side).iter().enumerate().filter(move |(_, level)| level.changed_since(since))
    }

    #[must_use]
    pub fn snapshot(&self) -> DepthSnapshot<P> {
        DepthSnapshot { bids: self.bids().copied().collect(), asks: self.asks().copied().collect(), last_change: self.last_change }
    }

    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.next_change();
    }
}
