use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn lines() -> Vec<BillLine> {
    vec![BillLine { unit_price: 120.0, quantity: 2 }, BillLine { unit_price: 45.5, quantity: 1 }]
}

#[test]
fn empty_cart_is_all_zero() {
    let bill = BillSummary::compute(&[], Discounts::default(), 0.05);
    assert_eq!(bill, BillSummary::default());
}

#[test]
fn gst_applies_after_discounts() {
    let bill = BillSummary::compute(&lines(), Discounts { coupon: 50.0, coins: 10.5 }, 0.05);
    assert!(approx(bill.subtotal, 285.5));
    assert!(approx(bill.taxable, 225.0));
    assert!(approx(bill.gst, 11.25));
    assert!(approx(bill.total, 236.25));
    assert!(approx(bill.total_discount(), 60.5));
}

#[test]
fn coupon_is_clamped_to_subtotal() {
    let bill = BillSummary::compute(&lines(), Discounts { coupon: 1_000.0, coins: 20.0 }, 0.05);
    assert!(approx(bill.coupon_discount, 285.5));
    assert!(approx(bill.coin_discount, 0.0));
    assert!(approx(bill.total, 0.0));
}

#[test]
fn coins_fill_remaining_after_coupon() {
    let bill = BillSummary::compute(&lines(), Discounts { coupon: 200.0, coins: 200.0 }, 0.0);
    assert!(approx(bill.coupon_discount, 200.0));
    assert!(approx(bill.coin_discount, 85.5));
    assert!(approx(bill.total, 0.0));
}

#[test]
fn negative_inputs_are_ignored() {
    let bill = BillSummary::compute(&lines(), Discounts { coupon: -5.0, coins: -1.0 }, -0.1);
    assert!(approx(bill.coupon_discount, 0.0));
    assert!(approx(bill.coin_discount, 0.0));
    assert!(approx(bill.gst, 0.0));
    assert!(approx(bill.total, 285.5));
}
