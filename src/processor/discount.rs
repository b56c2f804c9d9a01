use crate::models::RawItem;

/// Multiplier used to estimate a regular price when the API omits
/// `itemPriceBeforeDiscount`. Inherited behavior; the estimate is not
/// authoritative and must not be changed without product confirmation.
pub const ESTIMATED_MARKUP: f64 = 1.2;

/// The reference price a discount is computed against: the upstream
/// before-discount price when present and non-zero, else the estimate.
pub fn regular_price(item: &RawItem) -> f64 {
    match item.item_price_before_discount {
        Some(before) if before > 0 => before as f64,
        _ => item.item_price as f64 * ESTIMATED_MARKUP,
    }
}

/// Integer discount percentage in [0, 100]. Zero when either operand is
/// zero or the item costs more than its reference price.
pub fn discount_rate(price: u64, regular: f64) -> u8 {
    if price == 0 || regular <= 0.0 {
        return 0;
    }
    let rate = (regular - price as f64) / regular * 100.0;
    rate.round().clamp(0.0, 100.0) as u8
}
