use std::fmt::Debug;

/// A price (or tick) value that a depth can be keyed on.
///
/// The two sort keys are reserved: they never identify a real level and are only handed back
/// by a single-level depth to signal that the owner must look up its best price from scratch.
pub trait PriceType: Copy + Ord + Debug {
    /// Sorts ahead of every real bid price.
    const MARKET_BID_SORT: Self;
    /// Sorts ahead of every real ask price.
    const MARKET_ASK_SORT: Self;

    #[inline(always)]
    fn is_reserved(self) -> bool {
        self == Self::MARKET_BID_SORT || self == Self::MARKET_ASK_SORT
    }
}

macro_rules! impl_integer_price {
    ($($ty:ty),*) => {
        $(
            impl PriceType for $ty {
                const MARKET_BID_SORT: Self = <$ty>::MAX;
                const MARKET_ASK_SORT: Self = <$ty>::MIN;
            }
        )*
    };
}

impl_integer_price!(i32, i64, u32, u64);

#[cfg(feature = "rust_decimal")]
impl PriceType for rust_decimal::Decimal {
    const MARKET_BID_SORT: Self = rust_decimal::Decimal::MAX;
    const MARKET_ASK_SORT: Self = rust_decimal::Decimal::MIN;
}
