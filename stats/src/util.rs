/// Insert `value` into an already sorted vec, after any equal elements.
pub fn sorted_insert<T: Ord>(sorted_vec: &mut Vec<T>, value: T) {
    let index = sorted_vec.partition_point(|v| v <= &value);
    sorted_vec.insert(index, value);
}
