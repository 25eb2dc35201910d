/// Cartesian product of the input arrays.
///
/// Returns `product(len)` rows of `arrays.len()` elements, one per combination, in
/// lexicographic order of the inputs (the last array varies fastest). Built with an
/// odometer over the per-array indices, so the number of inputs is not bounded by
/// stack depth. An empty input list, or any empty array, yields no rows.
pub fn cross<T: Copy>(arrays: &[&[T]]) -> Vec<Vec<T>> {
    if arrays.is_empty() || arrays.iter().any(|a| a.is_empty()) {
        return Vec::new();
    }

    let total: usize = arrays.iter().map(|a| a.len()).product();
    let mut out = Vec::with_capacity(total);
    let mut index = vec![0usize; arrays.len()];

    for _ in 0..total {
        out.push(index.iter().zip(arrays).map(|(&i, a)| a[i]).collect());

        for dim in (0..arrays.len()).rev() {
            index[dim] += 1;
            if index[dim] < arrays[dim].len() {
                break;
            }
            index[dim] = 0;
        }
    }

    out
}
