#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A new order rests at the price
    Add,
    /// An order at the price was canceled or fully filled
    Close,
    /// An order at the price grew by `size`
    Increase,
    /// An order at the price shrank by `size` (partial fill or amend down)
    Decrease,
}
