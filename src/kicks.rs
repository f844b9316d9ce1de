//! Wall kick offsets
//!
//! When a rotation would collide, these horizontal shifts are tried in order
//! and the first legal one wins: no shift, then alternating left and right
//! with growing distance.

/// Horizontal offsets tried, in order, on every rotation attempt
pub const WALL_KICKS: [i32; 7] = [0, -1, 1, -2, 2, -3, 3];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_kick_is_identity() {
        assert_eq!(WALL_KICKS[0], 0);
    }

    #[test]
    fn test_kicks_grow_alternating_left_then_right() {
        for pair in WALL_KICKS[1..].chunks(2) {
            assert_eq!(pair[0], -pair[1]);
            assert!(pair[0] < 0);
        }
        let magnitudes: Vec<_> = WALL_KICKS.iter().map(|dx| dx.abs()).collect();
        assert!(magnitudes.windows(2).all(|w| w[0] <= w[1]));
    }
}
