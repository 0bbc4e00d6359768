//! Device identification vocabulary.
//!
//! Some chips answer an identification query on a reserved bus address with a
//! 3 byte payload carrying a 12 bit manufacturer id and a 12 bit product id.
//! Chips that do not implement the protocol simply leave the query
//! unacknowledged, which the drivers report as `None` rather than an error.

use bit::BitIndex;
use core::fmt;

/// Reserved bus address the identification query is sent to,
/// independent of the device's configured address
pub const RESERVED_ADDRESS: u8 = 0x7C;

/// Length of the identification payload
pub const PAYLOAD_LEN: usize = 3;

/// 12 bit JEDEC manufacturer id
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManufacturerId(pub u16);

/// 12 bit product id, the low nibble encodes the density
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductId(pub u16);

/// Identity reported by the device
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    pub manufacturer: ManufacturerId,
    pub product: ProductId,
}

impl DeviceId {
    /// Decode the 3 byte payload: bits 23..12 are the manufacturer id,
    /// bits 11..0 the product id
    pub fn from_payload(payload: [u8; PAYLOAD_LEN]) -> Self {
        let manufacturer = u16::from(payload[0]) << 4 | u16::from(payload[1].bit_range(4..8));
        let product = u16::from(payload[1].bit_range(0..4)) << 8 | u16::from(payload[2]);
        DeviceId {
            manufacturer: ManufacturerId(manufacturer),
            product: ProductId(product),
        }
    }
}

impl fmt::Display for ManufacturerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03X}", self.0)
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:03X}", self.0)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.manufacturer, self.product)
    }
}

/// Outcome of the identification probe, kept per device lifetime.
/// Outer `None` means not probed yet, inner `None` means the chip does not
/// implement the protocol. Both outcomes are cached until `end`.
#[derive(Debug, Default)]
pub(crate) struct IdCache(Option<Option<DeviceId>>);

impl IdCache {
    pub(crate) fn get(&self) -> Option<Option<DeviceId>> {
        self.0
    }

    pub(crate) fn set(&mut self, id: Option<DeviceId>) {
        self.0 = Some(id);
    }

    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }

    pub(crate) fn cached(&self) -> Option<DeviceId> {
        self.0.flatten()
    }
}
