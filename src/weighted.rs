use rand::Rng;

/// Sample a reference from a `(value, weight)` table.
///
/// Weights need not sum to 1. Invariant: the table is non-empty and carries
/// at least one positive weight; every table in this crate is a compile-time
/// constant that satisfies this, so violation is a programming error and
/// panics.
pub(crate) fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, table: &'a [(T, f64)]) -> &'a T {
    let total: f64 = table.iter().map(|(_, w)| w.max(0.0)).sum();
    assert!(
        total > 0.0,
        "weight table must be non-empty with a positive total weight"
    );

    let mut roll = rng.random_range(0.0..total);
    for (value, weight) in table {
        let weight = weight.max(0.0);
        if roll < weight {
            return value;
        }
        roll -= weight;
    }
    // Floating-point underflow on the final subtraction can leave `roll`
    // marginally past the last bucket.
    &table[table.len() - 1].0
}
