//! Blocking FRAM driver.

use crate::{
    error::Error,
    fmt::DeviceInfo,
    geometry::Geometry,
    identity::{DeviceId, IdCache, PAYLOAD_LEN, RESERVED_ADDRESS},
    transport::{BusStatus, Transport},
    Device,
};
use zerocopy::{FromBytes, Immutable, IntoBytes};

/// Blocking driver for an MB85RC/FM24 FRAM chip behind a [`Transport`].
///
/// `SCRATCH` is the capacity of the staging buffer used by the typed
/// accessors; the default holds every integer and float primitive. It must
/// not exceed the page size of the chip passed to [`begin`](Self::begin).
pub struct Mb85rc<B, const SCRATCH: usize = 10> {
    bus: B,
    device: Option<Device>,
    identity: IdCache,
    scratch: [u8; SCRATCH],
}

impl<B, const SCRATCH: usize> Mb85rc<B, SCRATCH> {
    /// Create an uninitialized driver owning the transport.
    /// No bus traffic happens until [`begin`](Self::begin) and a transfer.
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            device: None,
            identity: IdCache::default(),
            scratch: [0; SCRATCH],
        }
    }

    /// Release the underlying transport
    pub fn free(self) -> B {
        self.bus
    }

    /// Store the configuration for a chip of `density` kilobits at `address`.
    ///
    /// Calling again while initialized is a no-op success when the parameters
    /// match the stored configuration, and [`Error::AlreadyInitialized`]
    /// otherwise. Performs no bus I/O.
    pub fn begin(&mut self, density: u16, address: u8) -> Result<(), Error> {
        if let Some(device) = &self.device {
            if device.geometry.density == density && device.address == address {
                return Ok(());
            }
            return Err(Error::AlreadyInitialized);
        }
        let geometry = Geometry::resolve(density).ok_or(Error::UnsupportedDensity)?;
        if SCRATCH as u32 > geometry.page_size {
            return Err(Error::ScratchTooLarge);
        }
        self.device = Some(Device { geometry, address });
        self.identity.clear();
        Ok(())
    }

    /// Counterpart of [`begin`](Self::begin); clears the configuration and
    /// the identity cache. Idempotent.
    pub fn end(&mut self) {
        self.device = None;
        self.identity.clear();
    }

    /// Whether [`begin`](Self::begin) succeeded and transfers are allowed
    pub fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    /// Memory layout of the configured chip
    pub fn geometry(&self) -> Option<Geometry> {
        self.device.as_ref().map(|device| device.geometry)
    }

    /// Configured 7-bit bus address
    pub fn bus_address(&self) -> Option<u8> {
        self.device.as_ref().map(|device| device.address)
    }

    /// Capacity of the typed-access staging buffer
    pub const fn scratch_capacity(&self) -> usize {
        SCRATCH
    }

    /// Identity resolved by an earlier [`device_id`](Self::device_id) call,
    /// without touching the bus
    pub fn cached_device_id(&self) -> Option<DeviceId> {
        self.identity.cached()
    }

    /// Snapshot of the device properties for diagnostics
    pub fn info(&self) -> Option<DeviceInfo> {
        let device = self.device.as_ref()?;
        Some(DeviceInfo {
            geometry: device.geometry,
            address: device.address,
            scratch_size: SCRATCH,
            device_id: self.identity.cached(),
        })
    }
}

impl<B: Transport, const SCRATCH: usize> Mb85rc<B, SCRATCH> {
    /// Read `buf.len()` bytes from `page` starting at `address`.
    ///
    /// Transfers larger than the transport's transaction buffer are split
    /// into multiple transactions. On failure the buffer is filled up to the
    /// point of failure only.
    pub fn read_bytes(&mut self, page: u8, address: u16, buf: &mut [u8]) -> Result<(), Error> {
        let device = self.device.as_ref().ok_or(Error::NotInitialized)?;
        device.check_transfer(page, address, buf.len())?;
        Self::read_chunks(&mut self.bus, device, page, address, buf)
    }

    /// Write `data` to `page` starting at `address`
    pub fn write_bytes(&mut self, page: u8, address: u16, data: &[u8]) -> Result<(), Error> {
        let device = self.device.as_ref().ok_or(Error::NotInitialized)?;
        device.check_transfer(page, address, data.len())?;
        Self::write_chunks(&mut self.bus, device, page, address, data)
    }

    /// Write `length` copies of `value` to `page` starting at `address`
    pub fn fill(&mut self, page: u8, address: u16, length: usize, value: u8) -> Result<(), Error> {
        let device = self.device.as_ref().ok_or(Error::NotInitialized)?;
        device.check_transfer(page, address, length)?;
        Self::fill_chunks(&mut self.bus, device, page, address, length, value)
    }

    /// Read one fixed-size value from `page` at `address`.
    ///
    /// The value is staged through the scratch buffer and only reinterpreted
    /// on success; a failed transfer never exposes partial data.
    pub fn read_value<V: FromBytes + IntoBytes>(
        &mut self,
        page: u8,
        address: u16,
    ) -> Result<V, Error> {
        let length = core::mem::size_of::<V>();
        if length > SCRATCH {
            return Err(Error::ValueTooLarge);
        }
        let device = self.device.as_ref().ok_or(Error::NotInitialized)?;
        device.check_transfer(page, address, length)?;
        Self::read_chunks(&mut self.bus, device, page, address, &mut self.scratch[..length])?;
        // Exact-size copy: the staged slice is size_of::<V>() bytes long
        let mut value = V::new_zeroed();
        value.as_mut_bytes().copy_from_slice(&self.scratch[..length]);
        Ok(value)
    }

    /// Write one fixed-size value to `page` at `address`.
    /// The scratch capacity bounds typed writes as well as reads.
    pub fn write_value<V: IntoBytes + Immutable>(
        &mut self,
        page: u8,
        address: u16,
        value: &V,
    ) -> Result<(), Error> {
        let bytes = value.as_bytes();
        if bytes.len() > SCRATCH {
            return Err(Error::ValueTooLarge);
        }
        let device = self.device.as_ref().ok_or(Error::NotInitialized)?;
        device.check_transfer(page, address, bytes.len())?;
        Self::write_chunks(&mut self.bus, device, page, address, bytes)
    }

    /// Query the device identity on the reserved address, caching the
    /// outcome until [`end`](Self::end). `Ok(None)` means the chip does not
    /// implement the identification protocol, which is not an error.
    pub fn device_id(&mut self) -> Result<Option<DeviceId>, Error> {
        let device = self.device.as_ref().ok_or(Error::NotInitialized)?;
        if let Some(outcome) = self.identity.get() {
            return Ok(outcome);
        }
        let outcome = Self::probe_identity(&mut self.bus, device.address);
        self.identity.set(outcome);
        Ok(outcome)
    }

    fn queue_address(bus: &mut B, address: u16, address_bytes: usize) -> usize {
        if address_bytes == 2 {
            bus.queue(&address.to_be_bytes())
        } else {
            bus.queue(&[address as u8])
        }
    }

    fn read_chunks(
        bus: &mut B,
        device: &Device,
        page: u8,
        address: u16,
        buf: &mut [u8],
    ) -> Result<(), Error> {
        let target = device.page_address(page);
        let address_bytes = usize::from(device.geometry.address_bytes);
        let mut address = u32::from(address);
        let mut buf = buf;
        // A read chunk may use the whole transaction buffer: the target
        // address travels in its own set-address phase, unlike writes.
        while !buf.is_empty() {
            let chunk = buf.len().min(B::BUFFER_LEN);
            bus.start(target);
            if Self::queue_address(bus, address as u16, address_bytes) != address_bytes {
                return Err(Error::ShortWrite);
            }
            bus.commit(true).into_result()?;
            let (now, later) = core::mem::take(&mut buf).split_at_mut(chunk);
            if bus.read(target, now, true) != chunk {
                return Err(Error::ShortRead);
            }
            address += chunk as u32;
            buf = later;
        }
        Ok(())
    }

    fn write_chunks(
        bus: &mut B,
        device: &Device,
        page: u8,
        address: u16,
        data: &[u8],
    ) -> Result<(), Error> {
        let target = device.page_address(page);
        let address_bytes = usize::from(device.geometry.address_bytes);
        // Address and data share the outgoing transaction buffer
        let usable = B::BUFFER_LEN - address_bytes;
        let mut address = u32::from(address);
        let mut data = data;
        while !data.is_empty() {
            let chunk = data.len().min(usable);
            let (now, later) = data.split_at(chunk);
            bus.start(target);
            let mut queued = Self::queue_address(bus, address as u16, address_bytes);
            queued += bus.queue(now);
            if queued != address_bytes + chunk {
                return Err(Error::ShortWrite);
            }
            bus.commit(true).into_result()?;
            address += chunk as u32;
            data = later;
        }
        Ok(())
    }

    fn fill_chunks(
        bus: &mut B,
        device: &Device,
        page: u8,
        address: u16,
        length: usize,
        value: u8,
    ) -> Result<(), Error> {
        let target = device.page_address(page);
        let address_bytes = usize::from(device.geometry.address_bytes);
        let usable = B::BUFFER_LEN - address_bytes;
        let mut address = u32::from(address);
        let mut remaining = length;
        while remaining > 0 {
            let chunk = remaining.min(usable);
            bus.start(target);
            let mut queued = Self::queue_address(bus, address as u16, address_bytes);
            for _ in 0..chunk {
                queued += bus.queue(&[value]);
            }
            if queued != address_bytes + chunk {
                return Err(Error::ShortWrite);
            }
            bus.commit(true).into_result()?;
            address += chunk as u32;
            remaining -= chunk;
        }
        Ok(())
    }

    fn probe_identity(bus: &mut B, address: u8) -> Option<DeviceId> {
        bus.start(RESERVED_ADDRESS);
        if bus.queue(&[address << 1]) != 1 {
            return None;
        }
        // Hold the bus so the payload follows on a repeated start
        if bus.commit(false) != BusStatus::Ok {
            return None;
        }
        let mut payload = [0u8; PAYLOAD_LEN];
        if bus.read(RESERVED_ADDRESS, &mut payload, true) != PAYLOAD_LEN {
            return None;
        }
        Some(DeviceId::from_payload(payload))
    }
}

/// Implementation of the byte-storage traits of the `embedded_storage`
/// crate, presenting the paged memory as one linear address space.
/// FRAM has no erase, so the NOR flash traits do not apply.
mod es {
    use super::*;
    use embedded_storage::{ReadStorage, Storage};

    fn check_linear(geometry: &Geometry, offset: u32, length: usize) -> Result<(), Error> {
        let memory_size = u64::from(geometry.memory_size);
        let offset = u64::from(offset);
        if offset > memory_size || length as u64 > memory_size - offset {
            return Err(Error::OutOfBounds);
        }
        Ok(())
    }

    impl<B: Transport, const SCRATCH: usize> ReadStorage for Mb85rc<B, SCRATCH> {
        type Error = Error;

        fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
            let geometry = self.geometry().ok_or(Error::NotInitialized)?;
            check_linear(&geometry, offset, bytes.len())?;
            let mut cursor = offset;
            let mut bytes = bytes;
            while !bytes.is_empty() {
                let page = (cursor / geometry.page_size) as u8;
                let in_page = cursor % geometry.page_size;
                let page_remain = (geometry.page_size - in_page) as usize;
                let rest = core::mem::take(&mut bytes);
                let take = rest.len().min(page_remain);
                let (now, later) = rest.split_at_mut(take);
                self.read_bytes(page, in_page as u16, now)?;
                cursor += take as u32;
                bytes = later;
            }
            Ok(())
        }

        fn capacity(&self) -> usize {
            // 0 while uninitialized, matching the accessor contract
            self.geometry().map_or(0, |g| g.memory_size as usize)
        }
    }

    impl<B: Transport, const SCRATCH: usize> Storage for Mb85rc<B, SCRATCH> {
        fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
            let geometry = self.geometry().ok_or(Error::NotInitialized)?;
            check_linear(&geometry, offset, bytes.len())?;
            let mut cursor = offset;
            let mut bytes = bytes;
            while !bytes.is_empty() {
                let page = (cursor / geometry.page_size) as u8;
                let in_page = cursor % geometry.page_size;
                let page_remain = (geometry.page_size - in_page) as usize;
                let take = bytes.len().min(page_remain);
                let (now, later) = bytes.split_at(take);
                self.write_bytes(page, in_page as u16, now)?;
                cursor += take as u32;
                bytes = later;
            }
            Ok(())
        }
    }
}
