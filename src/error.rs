use thiserror::Error;

use crate::{level::Quantity, side::Side};

/// Inconsistencies the authoritative book refuses to apply.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BookError {
    #[error("no {side:?} interest rests at {price}")]
    UnknownPrice { side: Side, price: String },

    #[error("cannot remove {requested} from {side:?} level {price} holding {available}")]
    InsufficientQuantity { side: Side, price: String, requested: Quantity, available: Quantity },

    #[error("no open {side:?} orders left to close at {price}")]
    InsufficientOrders { side: Side, price: String },

    #[error("{price} is reserved as a marketable sort key")]
    ReservedPrice { price: String },

    #[error("adding {added} to {side:?} level {price} overflows its aggregate")]
    QuantityOverflow { side: Side, price: String, added: Quantity },

    #[error("{kind} event carries zero quantity")]
    ZeroQuantity { kind: &'static str },
}
