use crate::{event_kind::EventKind, level::Quantity, price::PriceType, side::Side};

#[derive(Debug, Clone, Copy)]
pub struct Event<P: PriceType> {
    pub kind: EventKind,
    pub side: Side,
    pub price: P,
    pub size: Quantity,
    pub timestamp: i64,
    pub sequence_id: u64,
}

impl<P: PriceType> Event<P> {
    #[inline(always)]
    #[must_use]
    pub const fn new(kind: EventKind, side: Side, price: P, size: Quantity, timestamp: i64) -> Self {
        Self { kind, side, price, size, timestamp, sequence_id: 0 }
    }

    #[inline(always)]
    #[must_use]
    pub fn with_sequence_id(self, sequence_id: u64) -> Self {
        Self { sequence_id, ..self }
    }
}
