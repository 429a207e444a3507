//! Route handlers, one module per resource.

pub mod catalogue_controller;
pub mod health_controller;
pub mod review_controller;
pub mod user_controller;

/// Next free numeric ID: one past the largest existing ID, starting at 1.
pub(crate) fn next_id(ids: impl Iterator<Item = i64>) -> i64 {
    ids.max().map_or(1, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_id() {
        assert_eq!(next_id(std::iter::empty()), 1);
        assert_eq!(next_id([3, 1, 7].into_iter()), 8);
    }
}
