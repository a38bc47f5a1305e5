//! Helpers for configuration values.

use std::cmp;

//------------ DefMinMax -----------------------------------------------------

/// A configuration variable's default value and allowed range.
///
/// Setters on the config types run user-supplied values through
/// [`limit`][Self::limit], so an out-of-range timeout or attempt count
/// degrades to the nearest allowed value rather than being rejected.
#[derive(Clone, Copy)]
pub struct DefMinMax<T> {
    /// The value used when none is given.
    def: T,

    /// The smallest acceptable value.
    min: T,

    /// The largest acceptable value.
    max: T,
}

impl<T> DefMinMax<T> {
    /// Creates a new default-and-range triple.
    pub const fn new(def: T, min: T, max: T) -> Self {
        Self { def, min, max }
    }

    /// Returns the default value.
    pub fn default(self) -> T {
        self.def
    }

    /// Caps the given value at both ends of the range.
    pub fn limit(self, value: T) -> T
    where
        T: Ord,
    {
        cmp::max(self.min, cmp::min(self.max, value))
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn limit_caps_both_ends() {
        let range = DefMinMax::new(5u32, 1, 100);
        assert_eq!(range.default(), 5);
        assert_eq!(range.limit(0), 1);
        assert_eq!(range.limit(42), 42);
        assert_eq!(range.limit(1_000), 100);
    }
}
