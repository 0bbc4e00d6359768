/// Densities of the supported chips, in kilobits
pub const SUPPORTED_DENSITIES: [u16; 7] = [4, 16, 64, 128, 256, 512, 1024];

/// Memory layout of a supported device
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Density in kilobits
    pub density: u16,
    /// Total memory size in bytes
    pub memory_size: u32,
    /// Size of one page in bytes
    pub page_size: u32,
    /// Number of pages
    pub page_count: u8,
    /// Address bytes transmitted per transaction
    pub address_bytes: u8,
}

impl Geometry {
    /// Look up the layout for a density in kilobits, `None` if unsupported
    pub fn resolve(density: u16) -> Option<Self> {
        if !SUPPORTED_DENSITIES.contains(&density) {
            return None;
        }
        let memory_size = u32::from(density) * 1024 / 8;
        // The tiers mirror the chips' addressing pins: small parts select
        // 256 B pages through the device address, mid parts are one
        // two-byte-addressed page, large parts split into 64 kB pages.
        let (page_size, address_bytes) = if density <= 16 {
            (256, 1)
        } else if density <= 256 {
            (memory_size, 2)
        } else {
            (0x10000, 2)
        };
        Some(Geometry {
            density,
            memory_size,
            page_size,
            page_count: (memory_size / page_size) as u8,
            address_bytes,
        })
    }
}
