use super::*;

#[test]
fn fnv_seeded_hash_is_stable() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"scrawl");
    let mut b = Fnv1a64::new(Fnv1a64::OFFSET_BASIS);
    b.write_bytes(b"scr");
    b.write_bytes(b"awl");
    assert_eq!(a.finish(), b.finish());

    let mut c = Fnv1a64::new_default();
    c.write_u64(7);
    let mut d = Fnv1a64::new_default();
    d.write_u64(8);
    assert_ne!(c.finish(), d.finish());
}

#[test]
fn bucket_sort_is_stable_within_a_bucket() {
    let orders = [("a", 1.0), ("b", 1.0), ("c", 0.0)];
    let order_of = |n: &str| {
        orders
            .iter()
            .find(|(name, _)| *name == n)
            .map(|(_, o)| *o)
            .unwrap_or(0.0)
    };
    let mut names: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
    let mut scratch = Vec::new();
    for _ in 0..3 {
        bucket_sort_by_order(&mut names, &mut scratch, order_of);
        assert_eq!(names, vec!["c", "a", "b"]);
    }
    assert!(scratch.is_empty());
}

#[test]
fn bucket_sort_floors_orders_and_keeps_negatives() {
    let order_of = |n: &str| match n {
        "x" => 1.9,
        "y" => 1.1,
        "z" => -2.0,
        _ => f64::NAN,
    };
    let mut names: Vec<String> = vec!["x".into(), "y".into(), "z".into(), "n".into()];
    let mut scratch = Vec::new();
    bucket_sort_by_order(&mut names, &mut scratch, order_of);
    assert_eq!(names, vec!["z", "n", "x", "y"]);
}

#[test]
fn finite_or_zero_coerces() {
    assert_eq!(finite_or_zero(f64::NAN), 0.0);
    assert_eq!(finite_or_zero(2.5), 2.5);
}
