use crate::price::PriceType;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    #[inline(always)]
    #[must_use]
    pub const fn is_buy(self) -> bool {
        matches!(self, Self::Buy)
    }

    /// Whether `price` ranks ahead of `other` on this side.
    #[inline(always)]
    #[must_use]
    pub fn is_better<P: PriceType>(self, price: P, other: P) -> bool {
        match self {
            Self::Buy => price > other,
            Self::Sell => price < other,
        }
    }

    #[inline(always)]
    #[must_use]
    pub fn market_sort_price<P: PriceType>(self) -> P {
        match self {
            Self::Buy => P::MARKET_BID_SORT,
            Self::Sell => P::MARKET_ASK_SORT,
        }
    }
}
