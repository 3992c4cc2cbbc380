/// Degrees to radians, at the precision the scene has always used.
pub(crate) const DEG_TO_RAD: f64 = 0.01745329251;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Fnv1a64(u64);

impl Fnv1a64 {
    pub(crate) const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01B3;

    pub(crate) fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub(crate) fn new_default() -> Self {
        Self(Self::OFFSET_BASIS)
    }

    pub(crate) fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(Self::PRIME);
        }
        self.0 = h;
    }

    pub(crate) fn finish(self) -> u64 {
        self.0
    }
}

pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

/// Bucket key for draw ordering: `floor(order)`, with NaN in bucket 0.
pub(crate) fn order_bucket(order: f64) -> i64 {
    if order.is_nan() {
        0
    } else {
        order.floor() as i64
    }
}

/// Stable ascending bucket sort of `names` by `floor(order_of(name))`.
///
/// `scratch` is caller-provided (pooled) working storage and is left empty.
pub(crate) fn bucket_sort_by_order(
    names: &mut Vec<String>,
    scratch: &mut Vec<(i64, String)>,
    order_of: impl Fn(&str) -> f64,
) {
    scratch.clear();
    scratch.extend(names.drain(..).map(|n| (order_bucket(order_of(&n)), n)));
    // `sort_by_key` is stable, so equal buckets keep insertion order.
    scratch.sort_by_key(|(bucket, _)| *bucket);
    names.extend(scratch.drain(..).map(|(_, n)| n));
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
