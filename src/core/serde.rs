/// Serde helper functions for custom serialization/deserialization
/// Skip serializing if Vec is empty
pub fn is_empty_vec<T>(value: &Vec<T>) -> bool {
    value.is_empty()
}

/// Skip serializing if value is zero
pub fn is_zero_u64(value: &u64) -> bool {
    *value == 0
}

/// Skip serializing if value is zero
pub fn is_zero_usize(value: &usize) -> bool {
    *value == 0
}
