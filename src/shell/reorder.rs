//! In-place relocation of one element

/// Move the element at `old` to `new`, shifting only the elements in between.
///
/// Moving right rotates `[old, new]` left by one; moving left rotates
/// `[new, old]` right by one. Returns whether anything moved; equal or
/// out-of-range indices leave `items` untouched.
pub fn relocate<T>(items: &mut [T], old: usize, new: usize) -> bool {
    let len = items.len();
    if old == new || old >= len || new >= len {
        return false;
    }
    if old < new {
        items[old..=new].rotate_left(1);
    } else {
        items[new..=old].rotate_right(1);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_right() {
        let mut items = ['A', 'B', 'C', 'D'];
        assert!(relocate(&mut items, 1, 3));
        assert_eq!(items, ['A', 'C', 'D', 'B']);
    }

    #[test]
    fn test_move_left() {
        let mut items = ['A', 'B', 'C', 'D'];
        assert!(relocate(&mut items, 3, 0));
        assert_eq!(items, ['D', 'A', 'B', 'C']);
    }

    #[test]
    fn test_noop_cases() {
        let mut items = [1, 2, 3];
        assert!(!relocate(&mut items, 1, 1));
        assert!(!relocate(&mut items, 0, 3));
        assert!(!relocate(&mut items, 5, 0));
        assert_eq!(items, [1, 2, 3]);
    }

    #[test]
    fn test_adjacent_swap() {
        let mut items = [1, 2];
        assert!(relocate(&mut items, 0, 1));
        assert_eq!(items, [2, 1]);
    }
}
