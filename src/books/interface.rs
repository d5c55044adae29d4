use crate::{depth::Depth, error::BookError, event::Event, level::Level, price::PriceType};

pub trait OrderBook<const N: usize, P: PriceType> {
    /// Process an incoming order event
    fn process(&mut self, event: Event<P>) -> Result<(), BookError>;
    /// The displayed top-N view maintained alongside the book
    fn depth(&self) -> &Depth<N, P>;
    /// Get the current best bid
    fn best_bid(&self) -> Option<Level<P>>;
    /// Get the current best ask
    fn best_ask(&self) -> Option<Level<P>>;
}
