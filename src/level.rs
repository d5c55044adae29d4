use crate::price::PriceType;

pub type Quantity = u64;

/// Aggregated open interest resting at a single price.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Level<P: PriceType> {
    price: P,
    aggregate_qty: Quantity,
    order_count: u32,
    last_change: u64,
}

impl<P: PriceType> Level<P> {
    #[inline(always)]
    #[must_use]
    pub const fn new(price: P) -> Self {
        Self { price, aggregate_qty: 0, order_count: 0, last_change: 0 }
    }

    /// Resets the level to a fresh, unaggregated level at `price`.
    #[inline(always)]
    pub fn init(&mut self, price: P) {
        *self = Self::new(price);
    }

    #[inline(always)]
    #[must_use]
    pub const fn price(&self) -> P {
        self.price
    }

    #[inline(always)]
    #[must_use]
    pub const fn aggregate_qty(&self) -> Quantity {
        self.aggregate_qty
    }

    #[inline(always)]
    #[must_use]
    pub const fn order_count(&self) -> u32 {
        self.order_count
    }

    #[inline(always)]
    #[must_use]
    pub const fn last_change(&self) -> u64 {
        self.last_change
    }

    #[inline(always)]
    #[must_use]
    pub const fn changed_since(&self, stamp: u64) -> bool {
        self.last_change > stamp
    }

    #[inline(always)]
    pub(crate) fn stamp(&mut self, change: u64) {
        self.last_change = change;
    }

    #[inline(always)]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.aggregate_qty == 0
    }

    #[inline(always)]
    pub fn add_order(&mut self, qty: Quantity) {
        self.add_orders(qty, 1);
    }

    #[inline(always)]
    pub fn add_orders(&mut self, qty: Quantity, count: u32) {
        self.order_count = self.order_count.saturating_add(count);
        self.aggregate_qty = self.aggregate_qty.saturating_add(qty);
    }

    /// Removes a canceled or filled order. Returns `true` when nothing is left at this price.
    #[inline(always)]
    pub fn close_order(&mut self, qty: Quantity) -> bool {
        debug_assert!(self.order_count > 0, "closing an order on a level without orders");
        debug_assert!(qty <= self.aggregate_qty, "closing more quantity than the level holds");
        self.order_count = self.order_count.saturating_sub(1);
        self.aggregate_qty = self.aggregate_qty.saturating_sub(qty);
        self.is_empty()
    }

    #[inline(always)]
    pub fn increase_qty(&mut self, delta: Quantity) {
        self.aggregate_qty = self.aggregate_qty.saturating_add(delta);
    }

    #[inline(always)]
    pub fn decrease_qty(&mut self, delta: Quantity) {
        debug_assert!(delta <= self.aggregate_qty, "decreasing below zero");
        self.aggregate_qty = self.aggregate_qty.saturating_sub(delta);
    }
}
