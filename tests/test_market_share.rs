//! Market share calculation tests.

use ted_explorer_sdk::{compute_market_share, ValuedTender};

fn t(id: i64, value: Option<f64>, ours: bool) -> ValuedTender {
    ValuedTender::new(id, value, ours)
}

#[test]
fn quarter_share() {
    let calc = compute_market_share(&[
        t(1, Some(1000.0), true),
        t(2, Some(3000.0), false),
        t(3, None, true),
    ]);
    assert_eq!(calc.total_market_value, 4000.0);
    assert_eq!(calc.our_sector_value, 1000.0);
    assert_eq!(calc.market_share_percentage, 25.0);
    assert_eq!(calc.percentage_display(), "25.00");
    assert_eq!(calc.total_tenders, 2);
    assert_eq!(calc.our_sector_tenders, 1);
}

#[test]
fn empty_collection_is_all_zero() {
    let calc = compute_market_share(&[]);
    assert_eq!(calc.total_market_value, 0.0);
    assert_eq!(calc.our_sector_value, 0.0);
    assert_eq!(calc.market_share_percentage, 0.0);
    assert_eq!(calc.total_tenders, 0);
    assert_eq!(calc.our_sector_tenders, 0);
}

#[test]
fn zero_negative_and_non_finite_values_are_excluded() {
    let calc = compute_market_share(&[
        t(1, Some(0.0), true),
        t(2, Some(-50.0), true),
        t(3, Some(f64::NAN), true),
        t(4, Some(f64::INFINITY), false),
        t(5, Some(200.0), false),
    ]);
    assert_eq!(calc.total_market_value, 200.0);
    assert_eq!(calc.our_sector_value, 0.0);
    assert_eq!(calc.market_share_percentage, 0.0);
    assert_eq!(calc.total_tenders, 1);
    assert_eq!(calc.our_sector_tenders, 0);
}

#[test]
fn only_unvalued_subset_gives_zero_share() {
    let calc = compute_market_share(&[t(1, None, true), t(2, None, false)]);
    assert_eq!(calc.market_share_percentage, 0.0);
    assert_eq!(calc.total_tenders, 0);
}

#[test]
fn whole_market_in_subset_is_one_hundred() {
    let calc = compute_market_share(&[t(1, Some(10.5), true), t(2, Some(0.25), true)]);
    assert_eq!(calc.market_share_percentage, 100.0);
    assert_eq!(calc.percentage_display(), "100.00");
}

#[test]
fn result_does_not_depend_on_order() {
    let values = [1e16, 1.0, -3.0, 2.5, 1e-3, 7.75, 1.0, 3e15];
    let mut tenders: Vec<ValuedTender> = values
        .iter()
        .enumerate()
        .map(|(i, v)| t(i as i64, Some(*v), i % 2 == 0))
        .collect();

    let forward = compute_market_share(&tenders);
    tenders.reverse();
    let backward = compute_market_share(&tenders);
    tenders.rotate_left(3);
    let rotated = compute_market_share(&tenders);

    assert_eq!(forward, backward);
    assert_eq!(forward, rotated);
}

#[test]
fn share_is_rounded_for_display() {
    let calc = compute_market_share(&[t(1, Some(1.0), true), t(2, Some(2.0), false)]);
    assert_eq!(calc.percentage_display(), "33.33");
}
