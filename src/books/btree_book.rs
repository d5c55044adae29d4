use std::{
    collections::BTreeMap,
    ops::Bound::{Excluded, Unbounded},
};

use tracing::{debug, trace, warn};

use crate::{
    books::interface::OrderBook,
    depth::Depth,
    error::BookError,
    event::Event,
    event_kind::EventKind,
    level::{Level, Quantity},
    price::PriceType,
    side::Side,
};

/// Everything resting at one price in the unbounded store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub qty: Quantity,
    pub orders: u32,
}

/// Unbounded, price-aggregated book that keeps a [`Depth`] of its best `N` levels per side and
/// replenishes that window whenever a close erases a displayed level.
#[derive(Debug)]
pub struct BTreeBook<const N: usize, P: PriceType = i64> {
    depth: Depth<N, P>,
    bids: BTreeMap<P, Aggregate>,
    asks: BTreeMap<P, Aggregate>,
    ts: i64,
    sequence_id: u64,
}

impl<const N: usize, P: PriceType> OrderBook<N, P> for BTreeBook<N, P> {
    /// Applies an order event to the store and mirrors it into the depth.
    ///
    /// - Events older than the current timestamp are ignored.
    /// - Events with a non-zero sequence id lower than the last seen one are ignored.
    /// - Events that contradict the store are rejected with a [`BookError`] and change nothing.
    fn process(&mut self, event: Event<P>) -> Result<(), BookError> {
        if event.timestamp < self.ts {
            trace!(?event, ts = self.ts, "ignoring stale event");
            return Ok(());
        }
        if event.sequence_id != 0 && self.sequence_id != 0 && event.sequence_id < self.sequence_id {
            trace!(?event, sequence_id = self.sequence_id, "ignoring out of order event");
            return Ok(());
        }

        trace!(?event, "processing event");
        let result = match event.kind {
            EventKind::Add => self.process_add(event),
            EventKind::Close => self.process_close(event),
            EventKind::Increase => self.process_increase(event),
            EventKind::Decrease => self.process_decrease(event),
        };
        match &result {
            Ok(()) => {
                self.ts = event.timestamp;
                if event.sequence_id != 0 {
                    self.sequence_id = event.sequence_id;
                }
            }
            Err(err) => warn!(%err, ?event, "rejected event"),
        }
        result
    }

    #[inline]
    fn depth(&self) -> &Depth<N, P> {
        &self.depth
    }

    #[inline]
    fn best_bid(&self) -> Option<Level<P>> {
        self.depth.best_bid().copied()
    }

    #[inline]
    fn best_ask(&self) -> Option<Level<P>> {
        self.depth.best_ask().copied()
    }
}

impl Default for BTreeBook<1, i64> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Default for BTreeBook<5, i64> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Default for BTreeBook<10, i64> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize, P: PriceType> BTreeBook<N, P> {
    #[must_use]
    pub fn new() -> Self {
        Self { depth: Depth::new(), bids: BTreeMap::new(), asks: BTreeMap::new(), ts: 0, sequence_id: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn sequence_id(&self) -> u64 {
        self.sequence_id
    }

    #[inline]
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.ts
    }

    /// Number of distinct prices resting on `side`, displayed or not.
    #[inline]
    #[must_use]
    pub fn price_count(&self, side: Side) -> usize {
        self.store(side).len()
    }

    /// The best `n` prices of the store, best first.
    #[must_use]
    pub fn top(&self, side: Side, n: usize) -> Vec<(P, Aggregate)> {
        let entries = self.store(side).iter().map(|(&price, &aggregate)| (price, aggregate));
        match side {
            Side::Buy => entries.rev().take(n).collect(),
            Side::Sell => entries.take(n).collect(),
        }
    }

    #[inline(always)]
    fn store(&self, side: Side) -> &BTreeMap<P, Aggregate> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    #[inline(always)]
    fn store_mut(&mut self, side: Side) -> &mut BTreeMap<P, Aggregate> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn process_add(&mut self, event: Event<P>) -> Result<(), BookError> {
        if event.price.is_reserved() {
            return Err(BookError::ReservedPrice { price: format!("{:?}", event.price) });
        }
        if event.size == 0 {
            return Err(BookError::ZeroQuantity { kind: "add" });
        }

        let resting = self.store(event.side).get(&event.price).copied().unwrap_or_default();
        let (Some(qty), Some(orders)) = (resting.qty.checked_add(event.size), resting.orders.checked_add(1)) else {
            return Err(self.overflow(event));
        };
        self.store_mut(event.side).insert(event.price, Aggregate { qty, orders });
        self.depth.add(event.side, event.price, event.size);
        Ok(())
    }

    fn process_close(&mut self, event: Event<P>) -> Result<(), BookError> {
        let (side, price) = (event.side, event.price);
        let aggregate = self.resting(side, price)?;
        if aggregate.orders == 0 {
            return Err(BookError::InsufficientOrders { side, price: format!("{price:?}") });
        }
        if event.size > aggregate.qty {
            return Err(BookError::InsufficientQuantity {
                side,
                price: format!("{price:?}"),
                requested: event.size,
                available: aggregate.qty,
            });
        }

        let store = self.store_mut(side);
        if let Some(aggregate) = store.get_mut(&price) {
            aggregate.qty -= event.size;
            aggregate.orders -= 1;
            if aggregate.qty == 0 {
                store.remove(&price);
            }
        }

        if self.depth.close(side, price, event.size).is_erased() {
            self.restore(side);
        }
        Ok(())
    }

    fn process_increase(&mut self, event: Event<P>) -> Result<(), BookError> {
        let resting = self.resting(event.side, event.price)?;
        let Some(qty) = resting.qty.checked_add(event.size) else {
            return Err(self.overflow(event));
        };
        if let Some(aggregate) = self.store_mut(event.side).get_mut(&event.price) {
            aggregate.qty = qty;
        }
        self.depth.increase(event.side, event.price, event.size);
        Ok(())
    }

    /// A decrease must leave quantity resting; draining an order is a close.
    fn process_decrease(&mut self, event: Event<P>) -> Result<(), BookError> {
        let (side, price) = (event.side, event.price);
        let aggregate = self.resting(side, price)?;
        if event.size >= aggregate.qty {
            return Err(BookError::InsufficientQuantity {
                side,
                price: format!("{price:?}"),
                requested: event.size,
                available: aggregate.qty,
            });
        }
        if let Some(aggregate) = self.store_mut(side).get_mut(&price) {
            aggregate.qty -= event.size;
        }
        self.depth.decrease(side, price, event.size);
        Ok(())
    }

    fn resting(&self, side: Side, price: P) -> Result<Aggregate, BookError> {
        self.store(side).get(&price).copied().ok_or_else(|| BookError::UnknownPrice { side, price: format!("{price:?}") })
    }

    fn overflow(&self, event: Event<P>) -> BookError {
        BookError::QuantityOverflow { side: event.side, price: format!("{:?}", event.price), added: event.size }
    }

    /// Pulls the first stored price behind the depth's window back into it, if the depth asks.
    fn restore(&mut self, side: Side) {
        let Some(after) = self.depth.needs_restoration(side) else {
            return;
        };
        let next = match side {
            Side::Buy => self.bids.range(..after).next_back(),
            Side::Sell => self.asks.range((Excluded(after), Unbounded)).next(),
        };
        match next.map(|(&price, &aggregate)| (price, aggregate)) {
            Some((price, aggregate)) => {
                debug!(?side, ?after, ?price, qty = aggregate.qty, "restoring depth level");
                self.depth.restore(side, price, aggregate.qty, aggregate.orders);
            }
            None => debug!(?side, ?after, "nothing left to restore"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Aggregate, BTreeBook};
    use crate::{
        books::interface::OrderBook as _, error::BookError, event::Event, event_kind::EventKind, level::Level, side::Side,
    };

    fn prices<const N: usize>(book: &BTreeBook<N>, side: Side) -> Vec<i64> {
        match side {
            Side::Buy => book.depth().bids().map(Level::price).collect(),
            Side::Sell => book.depth().asks().map(Level::price).collect(),
        }
    }

    fn add(side: Side, price: i64, size: u64) -> Event<i64> {
        Event::new(EventKind::Add, side, price, size, 0)
    }

    fn close(side: Side, price: i64, size: u64) -> Event<i64> {
        Event::new(EventKind::Close, side, price, size, 0)
    }

    #[test]
    /// Four bids into a three level depth, then erase displayed levels and watch the window refill
    /// from the store.
    fn erased_level_is_restored_from_store() -> Result<(), BookError> {
        let mut book = BTreeBook::<3>::new();
        for price in [100, 99, 98, 97] {
            book.process(add(Side::Buy, price, 10))?;
        }
        assert_eq!(prices(&book, Side::Buy), vec![100, 99, 98]);
        assert_eq!(book.price_count(Side::Buy), 4);

        book.process(close(Side::Buy, 99, 10))?;
        assert_eq!(prices(&book, Side::Buy), vec![100, 98, 97]);

        book.process(close(Side::Buy, 100, 10))?;
        assert_eq!(prices(&book, Side::Buy), vec![98, 97]);
        Ok(())
    }

    #[test]
    fn restored_level_carries_full_aggregate() -> Result<(), BookError> {
        let mut book = BTreeBook::<2>::new();
        for (price, size) in [(10, 1), (11, 1), (12, 4), (12, 6)] {
            book.process(add(Side::Sell, price, size))?;
        }
        book.process(Event::new(EventKind::Increase, Side::Sell, 12, 5, 0))?;
        book.process(close(Side::Sell, 10, 1))?;

        let restored = book.depth().last_ask_level().copied();
        assert_eq!(restored.map(|l| (l.price(), l.aggregate_qty(), l.order_count())), Some((12, 15, 2)));
        Ok(())
    }

    #[test]
    fn single_level_book_tracks_true_best() -> Result<(), BookError> {
        let mut book = BTreeBook::<1>::default();
        for price in [101, 103, 102] {
            book.process(add(Side::Sell, price, 1))?;
        }
        assert_eq!(book.best_ask().map(|l| l.price()), Some(101));
        book.process(close(Side::Sell, 101, 1))?;
        assert_eq!(book.best_ask().map(|l| l.price()), Some(102));
        book.process(close(Side::Sell, 102, 1))?;
        book.process(close(Side::Sell, 103, 1))?;
        assert_eq!(book.best_ask(), None);
        Ok(())
    }

    #[test]
    fn inconsistent_events_are_rejected() {
        let mut book = BTreeBook::<3>::new();
        assert!(book.process(add(Side::Buy, 100, 5)).is_ok());

        assert!(matches!(book.process(close(Side::Buy, 90, 5)), Err(BookError::UnknownPrice { .. })));
        assert!(matches!(book.process(close(Side::Buy, 100, 6)), Err(BookError::InsufficientQuantity { .. })));
        assert!(matches!(
            book.process(Event::new(EventKind::Decrease, Side::Buy, 100, 5, 0)),
            Err(BookError::InsufficientQuantity { .. })
        ));
        assert_eq!(book.process(add(Side::Buy, 100, 0)), Err(BookError::ZeroQuantity { kind: "add" }));
        assert!(matches!(book.process(add(Side::Buy, i64::MAX, 1)), Err(BookError::ReservedPrice { .. })));
        assert_eq!(book.top(Side::Buy, 5), vec![(100, Aggregate { qty: 5, orders: 1 })]);
    }

    #[test]
    fn overflowing_aggregates_are_rejected() {
        let mut book = BTreeBook::<3>::new();
        assert!(book.process(add(Side::Buy, 100, u64::MAX)).is_ok());

        assert!(matches!(book.process(add(Side::Buy, 100, 1)), Err(BookError::QuantityOverflow { added: 1, .. })));
        assert!(matches!(
            book.process(Event::new(EventKind::Increase, Side::Buy, 100, 1, 0)),
            Err(BookError::QuantityOverflow { .. })
        ));
        assert_eq!(book.top(Side::Buy, 5), vec![(100, Aggregate { qty: u64::MAX, orders: 1 })]);
        let displayed = book.best_bid().map(|l| (l.aggregate_qty(), l.order_count()));
        assert_eq!(displayed, Some((u64::MAX, 1)));
    }

    #[test]
    fn rejected_events_do_not_advance_the_clock() -> Result<(), BookError> {
        let mut book = BTreeBook::<3>::new();
        book.process(Event::new(EventKind::Add, Side::Buy, 100, 1, 10).with_sequence_id(3))?;
        let rejected = book.process(Event::new(EventKind::Close, Side::Buy, 90, 1, 1_000).with_sequence_id(9));
        assert!(matches!(rejected, Err(BookError::UnknownPrice { .. })));
        assert_eq!((book.timestamp(), book.sequence_id()), (10, 3));

        book.process(Event::new(EventKind::Add, Side::Buy, 101, 1, 20).with_sequence_id(4))?;
        assert_eq!(prices(&book, Side::Buy), vec![101, 100]);
        assert_eq!((book.timestamp(), book.sequence_id()), (20, 4));
        Ok(())
    }

    #[test]
    fn error_messages() {
        let err = BookError::InsufficientQuantity { side: Side::Sell, price: "101".into(), requested: 7, available: 3 };
        insta::assert_snapshot!(err.to_string(), @"cannot remove 7 from Sell level 101 holding 3");
    }

    #[test]
    fn stale_and_out_of_order_events_are_ignored() -> Result<(), BookError> {
        let mut book = BTreeBook::<3>::new();
        book.process(Event::new(EventKind::Add, Side::Buy, 100, 1, 10).with_sequence_id(5))?;
        book.process(Event::new(EventKind::Add, Side::Buy, 99, 1, 9))?;
        book.process(Event::new(EventKind::Add, Side::Buy, 98, 1, 10).with_sequence_id(4))?;
        assert_eq!(prices(&book, Side::Buy), vec![100]);
        assert_eq!((book.timestamp(), book.sequence_id()), (10, 5));

        book.process(Event::new(EventKind::Add, Side::Buy, 97, 1, 11))?;
        assert_eq!(book.sequence_id(), 5);
        assert_eq!(prices(&book, Side::Buy), vec![100, 97]);
        Ok(())
    }

    #[test]
    fn amendments_beyond_window_surface_on_restore() -> Result<(), BookError> {
        let mut book = BTreeBook::<2>::new();
        for price in [100, 99, 98] {
            book.process(add(Side::Buy, price, 10))?;
        }
        book.process(Event::new(EventKind::Decrease, Side::Buy, 98, 4, 0))?;
        book.process(close(Side::Buy, 100, 10))?;
        let levels: Vec<_> = book.depth().bids().map(|l| (l.price(), l.aggregate_qty())).collect();
        assert_eq!(levels, vec![(99, 10), (98, 6)]);
        Ok(())
    }
}
