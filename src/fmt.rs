//! Diagnostic helpers: a device property table and a hex dump.
//!
//! Both consume only the public accessors and [`read_bytes`], never the
//! transfer engine itself, and write to any [`core::fmt::Write`] sink.
//!
//! [`read_bytes`]: crate::blocking::Mb85rc::read_bytes

use crate::{
    blocking::Mb85rc, error::Error, geometry::Geometry, identity::DeviceId, transport::Transport,
};
use core::fmt;

/// Snapshot of the device properties, see
/// [`Mb85rc::info`](crate::blocking::Mb85rc::info)
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy)]
pub struct DeviceInfo {
    pub geometry: Geometry,
    pub address: u8,
    pub scratch_size: usize,
    /// Identity, if resolved and supported
    pub device_id: Option<DeviceId>,
}

fn write_size(f: &mut fmt::Formatter<'_>, size: u32) -> fmt::Result {
    if size < 1024 {
        write!(f, "{size} B")
    } else {
        write!(f, "{} kB", size / 1024)
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FRAM properties:")?;
        writeln!(f, "----------------")?;
        writeln!(f, "Density:          {} kb", self.geometry.density)?;
        writeln!(f, "I2C address:      0x{:02X}", self.address)?;
        write!(f, "Memory size:      ")?;
        write_size(f, self.geometry.memory_size)?;
        writeln!(f)?;
        write!(f, "Page size:        ")?;
        write_size(f, self.geometry.page_size)?;
        writeln!(f)?;
        writeln!(f, "Page count:       {}", self.geometry.page_count)?;
        write!(f, "Type buffer size: {} B", self.scratch_size)?;
        if let Some(id) = self.device_id {
            writeln!(f)?;
            writeln!(f, "Device ID:        supported")?;
            writeln!(f, "Manufacturer ID:  {}", id.manufacturer)?;
            write!(f, "Product ID:       {}", id.product)?;
        }
        Ok(())
    }
}

/// Dump `count` bytes of `page` starting at `address` as 16-byte rows with a
/// hex address label and a divider after the eighth column.
///
/// Validation failures and mid-dump driver errors are reported into the
/// stream and stop the dump; only sink errors surface as `Err`.
pub fn hexdump<W, B, const SCRATCH: usize>(
    w: &mut W,
    fram: &mut Mb85rc<B, SCRATCH>,
    page: u8,
    address: u16,
    count: usize,
) -> fmt::Result
where
    W: fmt::Write,
    B: Transport,
{
    let Some(geometry) = fram.geometry() else {
        return writeln!(w, "Error: {}", Error::NotInitialized);
    };

    if geometry.page_count > 1 {
        // Show the page only when the chip has more than one
        writeln!(
            w,
            "FRAM hexdump - page {page}, address 0x{address:02X}, 0x{count:X} ({count}) bytes"
        )?;
    } else {
        writeln!(
            w,
            "FRAM hexdump - address 0x{address:02X}, 0x{count:X} ({count}) bytes"
        )?;
    }

    if count == 0 {
        return writeln!(w, "Byte count is 0.");
    }
    if page >= geometry.page_count {
        return writeln!(w, "Error: {}", Error::InvalidPage);
    }
    let page_size = u64::from(geometry.page_size);
    if u64::from(address) >= page_size || count as u64 > page_size - u64::from(address) {
        return writeln!(w, "Error: {}", Error::OutOfBounds);
    }

    writeln!(w)?;
    w.write_str("     ")?;
    for col in 0..16 {
        if col == 8 {
            w.write_str("  ")?;
        }
        write!(w, " {col:02X}")?;
    }
    writeln!(w)?;
    w.write_str("     ")?;
    for col in 0..16 {
        if col == 8 {
            w.write_str("  ")?;
        }
        w.write_str(" --")?;
    }
    writeln!(w)?;

    let start = usize::from(address);
    let end = start + count;
    let mut row_start = start & !0xF;
    while row_start < end {
        let from = row_start.max(start);
        let to = (row_start + 16).min(end);
        let mut row = [0u8; 16];
        if let Err(e) = fram.read_bytes(page, from as u16, &mut row[..to - from]) {
            writeln!(w)?;
            return writeln!(w, "Error: {e}");
        }
        write!(w, "{row_start:04X}:")?;
        for col in 0..16 {
            let addr = row_start + col;
            if addr >= end {
                break;
            }
            if col == 8 {
                // Indent columns before an unaligned start, divide after
                w.write_str(if addr < from { "  " } else { " -" })?;
            }
            if addr < from {
                w.write_str("   ")?;
            } else {
                write!(w, " {:02X}", row[addr - from])?;
            }
        }
        writeln!(w)?;
        row_start += 16;
    }
    Ok(())
}
