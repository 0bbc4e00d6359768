#![no_std]
//! This is a platform agnostic driver for I2C nonvolatile Ferroelectric RAM
//! (FRAM) using [embedded-hal](https://github.com/rust-embedded/embedded-hal).
//!
//! Multiple chip families are supported, with densities from 4 kb to 1 Mb:
//! * Fujitsu MB85RC04V, MB85RC16V, MB85RC64TA, MB85RC128A, MB85RC256V,
//!   MB85RC512T and MB85RC1MT
//! * Cypress/Infineon FM24C04B, FM24C16B, FM24C64B, FM24CL64B, FM24C128A,
//!   FM24C256 and FM24V10
//!
//! The device is addressed as pages of bytes; small densities expose several
//! 256 B pages selected through the bus address, large densities expose one or
//! two 64 kB pages. Transfers of any length are split into transactions that
//! fit the transport's transaction buffer, see [`transport::Transport`].

#[cfg(test)]
extern crate std;

pub mod asynchronous;
pub mod blocking;
pub mod error;
pub mod fmt;
pub mod geometry;
pub mod identity;
pub mod transport;

use crate::{error::Error, geometry::Geometry};

/// Factory base address of the supported chips
pub const DEFAULT_ADDRESS: u8 = 0x50;

/// Configuration stored by a successful `begin`
#[derive(Debug, Clone, Copy)]
pub(crate) struct Device {
    pub(crate) geometry: Geometry,
    pub(crate) address: u8,
}

impl Device {
    /// Bus address selecting a page. Small chips decode the page index from
    /// the low bus address bits, so each page is its own bus target.
    pub(crate) fn page_address(&self, page: u8) -> u8 {
        self.address + page
    }

    /// Validate a (page, address, length) request against the geometry.
    /// Out of range requests must never reach the bus.
    pub(crate) fn check_transfer(&self, page: u8, address: u16, length: usize) -> Result<(), Error> {
        if page >= self.geometry.page_count {
            return Err(Error::InvalidPage);
        }
        // Compared in u64 against the remaining page space so that no
        // length, not even usize::MAX, can wrap past the bounds check
        let page_size = u64::from(self.geometry.page_size);
        let address = u64::from(address);
        if address >= page_size || length as u64 > page_size - address {
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }
}
