//! Client-side todo id generation.

use todo_state_core::environment::IdGenerator;

/// Maximum number of digits kept from the random fraction
const ID_DIGITS: usize = 10;

/// Production [`IdGenerator`]: up to ten decimal digits of a random fraction
///
/// There is no collision detection.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> String {
        id_from_fraction(rand::random::<f64>())
    }
}

/// Renders `fraction` in decimal and keeps up to ten characters after `"0."`
///
/// ```
/// use todomvc::ids::id_from_fraction;
///
/// assert_eq!(id_from_fraction(0.123), "123");
/// assert_eq!(id_from_fraction(0.123_456_789_012_3), "1234567890");
/// ```
#[must_use]
pub fn id_from_fraction(fraction: f64) -> String {
    fraction.to_string().chars().skip(2).take(ID_DIGITS).collect()
}
