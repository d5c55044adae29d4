use crate::{level::Level, price::PriceType, side::Side};

/// Where `find_or_insert` placed a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<P: PriceType> {
    /// The price was already tracked at this index.
    Existing(usize),
    /// A fresh level was opened at this index.
    Created(usize),
    /// A fresh level was opened at this index and the previous worst level fell off the end.
    Evicted { index: usize, evicted: Level<P> },
}

impl<P: PriceType> Slot<P> {
    #[inline(always)]
    #[must_use]
    pub const fn index(&self) -> usize {
        match self {
            Self::Existing(index) | Self::Created(index) | Self::Evicted { index, .. } => *index,
        }
    }
}

/// One side of a depth: `N` slots, best first, occupied slots packed at the front.
#[derive(Debug, Clone)]
pub struct SideBuffer<const N: usize, P: PriceType> {
    slots: [Option<Level<P>>; N],
    side: Side,
}

impl<const N: usize, P: PriceType> SideBuffer<N, P> {
    const NON_EMPTY: () = assert!(N >= 1, "a depth side must hold at least one level");

    #[inline]
    #[must_use]
    pub fn new(side: Side) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NON_EMPTY;
        Self { slots: [None; N], side }
    }

    #[inline(always)]
    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[inline(always)]
    #[must_use]
    pub fn slots(&self) -> &[Option<Level<P>>; N] {
        &self.slots
    }

    #[inline(always)]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Level<P>> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[inline(always)]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Level<P>> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Occupied levels, best to worst.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Level<P>> + '_ {
        self.slots.iter().map_while(Option::as_ref)
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Level<P>> + '_ {
        self.slots.iter_mut().map_while(Option::as_mut)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    #[inline(always)]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots[N - 1].is_some()
    }

    #[inline(always)]
    #[must_use]
    pub fn first(&self) -> Option<&Level<P>> {
        self.slots[0].as_ref()
    }

    /// The last slot of the side, occupied or not.
    #[inline(always)]
    #[must_use]
    pub fn last_slot(&self) -> Option<&Level<P>> {
        self.slots[N - 1].as_ref()
    }

    #[inline(always)]
    pub fn last_slot_mut(&mut self) -> Option<&mut Level<P>> {
        self.slots[N - 1].as_mut()
    }

    /// Index of the level tracking exactly `price`, if any.
    #[inline]
    #[must_use]
    pub fn find_index(&self, price: P) -> Option<usize> {
        self.iter().position(|level| level.price() == price)
    }

    /// Linear scan from the best slot. Returns the slot holding `price`, opening one in the first
    /// free slot or in front of the first worse price. `None` when the side is full and `price`
    /// ranks behind every tracked level.
    pub fn find_or_insert(&mut self, price: P) -> Option<Slot<P>> {
        for index in 0..N {
            match self.slots[index] {
                Some(level) if level.price() == price => return Some(Slot::Existing(index)),
                Some(level) if self.side.is_better(price, level.price()) => {
                    return Some(match self.insert_before(index, price) {
                        Some(evicted) => Slot::Evicted { index, evicted },
                        None => Slot::Created(index),
                    });
                }
                Some(_) => {}
                None => {
                    self.slots[index] = Some(Level::new(price));
                    return Some(Slot::Created(index));
                }
            }
        }
        None
    }

    /// Shifts `index..N-1` one slot towards the worse end and opens a level at `index`.
    /// Returns whatever occupied the last slot beforehand.
    fn insert_before(&mut self, index: usize, price: P) -> Option<Level<P>> {
        let evicted = self.slots[N - 1].take();
        self.slots.copy_within(index..N - 1, index + 1);
        self.slots[index] = Some(Level::new(price));
        evicted
    }

    /// Shifts `index+1..N` one slot towards the best end and empties the last slot.
    pub fn erase(&mut self, index: usize) -> Option<Level<P>> {
        let erased = self.slots.get_mut(index)?.take();
        self.slots.copy_within(index + 1..N, index);
        self.slots[N - 1] = None;
        erased
    }

    /// Stamps every occupied level from `index` onwards.
    pub fn stamp_from(&mut self, index: usize, change: u64) {
        self.slots.iter_mut().skip(index).map_while(Option::as_mut).for_each(|level| level.stamp(change));
    }

    /// Price of the level just ahead of the last slot. Occupied only if the side was full before
    /// its most recent erase.
    #[inline]
    #[must_use]
    pub fn restoration_price(&self) -> Option<P> {
        if N == 1 {
            return Some(self.side.market_sort_price());
        }
        self.slots[N - 2].map(|level| level.price())
    }

    #[inline]
    pub fn clear(&mut self) {
        self.slots = [None; N];
    }
}
