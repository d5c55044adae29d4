//! Fixed-capacity, always-sorted market depth.
//!
//! [`Depth`] keeps the best `N` aggregated price levels of each side of a book in two small
//! arrays that are maintained purely by in-place shifts. It is fed per-order events by an owning
//! book and tells that owner, through [`Depth::needs_bid_restoration`] and
//! [`Depth::needs_ask_restoration`], when an erased level leaves a hole that must be refilled
//! from the full book. [`BTreeBook`] is a reference owner that does exactly that.
//!
//! ```
//! use freya_depth::{Closure, Depth};
//!
//! let mut depth = Depth::<3, i64>::new();
//! for price in [100, 99, 98, 101] {
//!     depth.add_bid(price, 10);
//! }
//! assert_eq!(depth.bids().map(|level| level.price()).collect::<Vec<_>>(), vec![101, 100, 99]);
//!
//! assert_eq!(depth.close_bid(99, 10), Closure::Erased);
//! assert_eq!(depth.needs_bid_restoration(), Some(100));
//! ```

pub mod books {
    pub mod btree_book;
    pub mod interface;
}
pub mod buffers {
    pub mod side_buffer;
}
pub mod depth;
pub mod error;
pub mod event;
pub mod event_kind;
pub mod level;
pub mod price;
pub mod side;

pub use books::{btree_book::BTreeBook, interface::OrderBook};
pub use depth::{Amendment, Closure, Depth, DepthSnapshot, Insertion};
pub use error::BookError;
pub use event::Event;
pub use event_kind::EventKind;
pub use level::{Level, Quantity};
pub use price::PriceType;
pub use side::Side;
