//! Bill totals re-derived on the client for display.
//!
//! The backend is authoritative for pricing; these figures exist so a cart
//! or checkout view can show a breakdown without another round trip.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillLine {
    pub unit_price: f64,
    pub quantity: u32,
}

/// Discounts requested by the user, before clamping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Discounts {
    /// Coupon discount in currency units.
    pub coupon: f64,
    /// Coin redemption in currency units.
    pub coins: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillSummary {
    pub subtotal: f64,
    pub coupon_discount: f64,
    pub coin_discount: f64,
    /// Subtotal after discounts; GST applies to this.
    pub taxable: f64,
    pub gst: f64,
    pub total: f64,
}

impl BillSummary {
    /// Coupon applies first, then coins, and neither can take the bill below
    /// zero. Every figure is rounded to two decimals.
    #[must_use]
    pub fn compute(lines: &[BillLine], discounts: Discounts, gst_rate: f64) -> Self {
        let subtotal = round2(
            lines
                .iter()
                .map(|line| line.unit_price * f64::from(line.quantity))
                .sum(),
        );
        let coupon_discount = round2(discounts.coupon.clamp(0.0, subtotal.max(0.0)));
        let coin_discount = round2(discounts.coins.clamp(0.0, (subtotal - coupon_discount).max(0.0)));
        let taxable = round2(subtotal - coupon_discount - coin_discount);
        let gst = round2(taxable * gst_rate.max(0.0));
        let total = round2(taxable + gst);

        Self { subtotal, coupon_discount, coin_discount, taxable, gst, total }
    }

    #[must_use]
    pub fn total_discount(&self) -> f64 {
        round2(self.coupon_discount + self.coin_discount)
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
