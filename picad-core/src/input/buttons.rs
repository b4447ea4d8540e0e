//! Switch panel addressing and handler registration
//!
//! The switches pull port A low when pressed, so the register reads 255
//! with nothing pressed and each pressed switch clears one bit. A handler
//! is keyed by the exact register value it expects to see.

use heapless::FnvIndexMap;

/// Switch register value with nothing pressed
pub const NO_BUTTONS: u8 = 0xFF;

/// Number of switches on the panel
pub const BUTTON_COUNT: u8 = 8;

/// Registration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegistrationError {
    /// Button number outside the panel
    InvalidButton(u8),
    /// Combination maps outside 0-255
    AddressOutOfRange,
    /// Combination without any buttons
    EmptyCombo,
    /// Handler map is full
    Full,
}

/// Switch register value a handler is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonAddress(u8);

impl ButtonAddress {
    /// Address of a single button (1-8)
    ///
    /// `255 - 2^(button - 1)`: button 1 clears bit 0.
    pub fn single(button: u8) -> Result<Self, RegistrationError> {
        if !(1..=BUTTON_COUNT).contains(&button) {
            return Err(RegistrationError::InvalidButton(button));
        }
        Ok(Self(NO_BUTTONS - (1 << (button - 1))))
    }

    /// Address of a button combination
    ///
    /// `255 - Σ 2^index - 1`. Unlike [`single`](Self::single) the indices
    /// are used as exponents directly and one more is subtracted, so
    /// `[1, 3]` gives 244. This matches the existing deployments and has
    /// not been confirmed against a board yet.
    pub fn combo(buttons: &[u8]) -> Result<Self, RegistrationError> {
        if buttons.is_empty() {
            return Err(RegistrationError::EmptyCombo);
        }

        let mut offset: u32 = 0;
        for &index in buttons {
            if index >= BUTTON_COUNT {
                return Err(RegistrationError::InvalidButton(index));
            }
            offset += 1 << index;
        }

        let address = NO_BUTTONS as i32 - offset as i32 - 1;
        u8::try_from(address)
            .map(Self)
            .map_err(|_| RegistrationError::AddressOutOfRange)
    }

    /// Raw switch register value
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl From<ButtonAddress> for u8 {
    fn from(address: ButtonAddress) -> Self {
        address.0
    }
}

/// Buttons (1-8) held down in a switch register sample
pub fn pressed_buttons(state: u8) -> impl Iterator<Item = u8> {
    (1..=BUTTON_COUNT).filter(move |button| state & (1 << (button - 1)) == 0)
}

/// Handlers keyed by switch register value
///
/// The first registration for an address wins; later ones are ignored.
/// `N` must be a power of two.
pub struct ButtonMap<H, const N: usize> {
    handlers: FnvIndexMap<u8, H, N>,
}

impl<H, const N: usize> ButtonMap<H, N> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            handlers: FnvIndexMap::new(),
        }
    }

    /// Register a handler
    ///
    /// Returns `Ok(true)` if stored, `Ok(false)` if the address already
    /// had a handler (the new one is dropped).
    pub fn register(
        &mut self,
        address: ButtonAddress,
        handler: H,
    ) -> Result<bool, RegistrationError> {
        if self.handlers.contains_key(&address.value()) {
            return Ok(false);
        }

        self.handlers
            .insert(address.value(), handler)
            .map(|_| true)
            .map_err(|_| RegistrationError::Full)
    }

    /// Handler for a switch register value
    pub fn get_mut(&mut self, state: u8) -> Option<&mut H> {
        self.handlers.get_mut(&state)
    }

    /// Check whether an address has a handler
    pub fn contains(&self, address: ButtonAddress) -> bool {
        self.handlers.contains_key(&address.value())
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Check if no handlers are registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<H, const N: usize> Default for ButtonMap<H, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_single_addresses() {
        assert_eq!(ButtonAddress::single(1).unwrap().value(), 254);
        assert_eq!(ButtonAddress::single(2).unwrap().value(), 253);
        assert_eq!(ButtonAddress::single(8).unwrap().value(), 127);
    }

    #[test]
    fn test_single_rejects_out_of_range() {
        assert_eq!(
            ButtonAddress::single(0),
            Err(RegistrationError::InvalidButton(0))
        );
        assert_eq!(
            ButtonAddress::single(9),
            Err(RegistrationError::InvalidButton(9))
        );
    }

    #[test]
    fn test_combo_uses_raw_exponents() {
        // Known quirk: not the same as pressing buttons 1 and 3
        // (that would be 250). Kept until checked on hardware.
        assert_eq!(ButtonAddress::combo(&[1, 3]).unwrap().value(), 244);
        assert_ne!(
            ButtonAddress::combo(&[1, 3]).unwrap().value(),
            NO_BUTTONS - (1 << 0) - (1 << 2)
        );
        assert_eq!(ButtonAddress::combo(&[0]).unwrap().value(), 253);
    }

    #[test]
    fn test_combo_errors() {
        assert_eq!(ButtonAddress::combo(&[]), Err(RegistrationError::EmptyCombo));
        assert_eq!(
            ButtonAddress::combo(&[8]),
            Err(RegistrationError::InvalidButton(8))
        );
        // 255 - 255 - 1
        assert_eq!(
            ButtonAddress::combo(&[0, 1, 2, 3, 4, 5, 6, 7]),
            Err(RegistrationError::AddressOutOfRange)
        );
    }

    #[test]
    fn test_pressed_buttons() {
        let pressed: Vec<u8> = pressed_buttons(0b1111_1010).collect();
        assert_eq!(pressed, vec![1, 3]);
        assert_eq!(pressed_buttons(NO_BUTTONS).count(), 0);
    }

    #[test]
    fn test_first_registration_wins() {
        let mut map: ButtonMap<&str, 8> = ButtonMap::new();
        let address = ButtonAddress::single(3).unwrap();

        assert_eq!(map.register(address, "first"), Ok(true));
        assert_eq!(map.register(address, "second"), Ok(false));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get_mut(address.value()), Some(&mut "first"));
    }

    #[test]
    fn test_map_full() {
        let mut map: ButtonMap<u8, 2> = ButtonMap::new();

        assert_eq!(map.register(ButtonAddress::single(1).unwrap(), 1), Ok(true));
        assert_eq!(map.register(ButtonAddress::single(2).unwrap(), 2), Ok(true));
        assert_eq!(
            map.register(ButtonAddress::single(3).unwrap(), 3),
            Err(RegistrationError::Full)
        );
        assert!(!map.contains(ButtonAddress::single(3).unwrap()));
    }

    #[test]
    fn test_lookup_by_raw_state() {
        let mut map: ButtonMap<u8, 8> = ButtonMap::new();
        map.register(ButtonAddress::single(1).unwrap(), 1).unwrap();

        assert!(map.get_mut(254).is_some());
        assert!(map.get_mut(NO_BUTTONS).is_none());
    }

    proptest! {
        #[test]
        fn prop_single_address_formula(button in 1u8..=8) {
            let address = ButtonAddress::single(button).unwrap();
            prop_assert_eq!(address.value() as u32, 255 - 2u32.pow(button as u32 - 1));
            prop_assert_eq!(pressed_buttons(address.value()).collect::<Vec<_>>(), vec![button]);
        }

        #[test]
        fn prop_combo_address_formula(buttons in proptest::collection::vec(0u8..8, 1..4)) {
            let sum: i32 = buttons.iter().map(|&b| 1i32 << b).sum();
            let expected = 255 - sum - 1;

            match ButtonAddress::combo(&buttons) {
                Ok(address) => prop_assert_eq!(address.value() as i32, expected),
                Err(e) => {
                    prop_assert_eq!(e, RegistrationError::AddressOutOfRange);
                    prop_assert!(expected < 0);
                }
            }
        }
    }
}
