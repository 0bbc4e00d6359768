use crate::error::Error;
use embedded_hal::i2c::I2c;
use embedded_hal_async::i2c::I2c as AsyncI2c;

/// Outcome of a committed bus transaction
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusStatus {
    /// Transaction completed
    Ok,
    /// The transaction buffer overflowed
    BufferOverflow,
    /// The device address was not acknowledged
    AddressNack,
    /// A data byte was not acknowledged
    DataNack,
    /// The bus is busy or arbitration was lost
    Busy,
    /// Any status outside the known set
    Other,
}

impl BusStatus {
    /// Map a transaction status into the driver error space
    pub fn into_result(self) -> Result<(), Error> {
        match self {
            BusStatus::Ok => Ok(()),
            BusStatus::BufferOverflow => Err(Error::BusBufferOverflow),
            BusStatus::AddressNack => Err(Error::AddressNack),
            BusStatus::DataNack => Err(Error::DataNack),
            BusStatus::Busy => Err(Error::BusBusy),
            BusStatus::Other => Err(Error::UnknownBusStatus),
        }
    }
}

/// A queued I2C transaction transport.
///
/// Outgoing bytes accumulate in a fixed-size transaction buffer and are
/// transmitted on [`commit`](Transport::commit), matching bus controllers
/// that buffer one transaction at a time (the classic Wire firmware buffers
/// 32 bytes). `queue` reports how many bytes the buffer accepted, which is
/// how a full buffer becomes observable to the caller.
pub trait Transport {
    /// Fixed maximum payload of one transaction.
    /// Must exceed the widest device address width of two bytes.
    const BUFFER_LEN: usize;

    /// Open a queued write transaction to a 7-bit bus address
    fn start(&mut self, address: u8);

    /// Append bytes to the open transaction, returning how many were accepted
    fn queue(&mut self, bytes: &[u8]) -> usize;

    /// Transmit the queued transaction. With `release_bus` false the bus
    /// stays owned so a repeated-start read can follow.
    fn commit(&mut self, release_bus: bool) -> BusStatus;

    /// Read up to `buf.len()` bytes from a device, returning the count
    /// actually received
    fn read(&mut self, address: u8, buf: &mut [u8], release_bus: bool) -> usize;
}

/// Async twin of [`Transport`]. Queueing stays synchronous; only the calls
/// that move bytes on the wire are awaited.
#[allow(async_fn_in_trait)]
pub trait AsyncTransport {
    /// Fixed maximum payload of one transaction.
    /// Must exceed the widest device address width of two bytes.
    const BUFFER_LEN: usize;

    /// Open a queued write transaction to a 7-bit bus address
    fn start(&mut self, address: u8);

    /// Append bytes to the open transaction, returning how many were accepted
    fn queue(&mut self, bytes: &[u8]) -> usize;

    /// Transmit the queued transaction. With `release_bus` false the bus
    /// stays owned so a repeated-start read can follow.
    async fn commit(&mut self, release_bus: bool) -> BusStatus;

    /// Read up to `buf.len()` bytes from a device, returning the count
    /// actually received
    async fn read(&mut self, address: u8, buf: &mut [u8], release_bus: bool) -> usize;
}

fn status_from<E: embedded_hal::i2c::Error>(err: E) -> BusStatus {
    use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};
    match err.kind() {
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address | NoAcknowledgeSource::Unknown) => {
            BusStatus::AddressNack
        }
        ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data) => BusStatus::DataNack,
        ErrorKind::ArbitrationLoss | ErrorKind::Bus => BusStatus::Busy,
        ErrorKind::Overrun => BusStatus::BufferOverflow,
        _ => BusStatus::Other,
    }
}

/// [`Transport`] adapter over any [`embedded_hal::i2c::I2c`] device.
///
/// `N` is the transaction buffer size; the default matches the 32-byte Wire
/// buffer the chunk budgets were designed around.
pub struct I2cBus<I2C, const N: usize = 32> {
    i2c: I2C,
    address: u8,
    frame: [u8; N],
    queued: usize,
    held: bool,
}

impl<I2C, const N: usize> I2cBus<I2C, N> {
    /// Create a new adapter owning the bus
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: 0,
            frame: [0; N],
            queued: 0,
            held: false,
        }
    }

    /// Release the underlying bus
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C: I2c, const N: usize> Transport for I2cBus<I2C, N> {
    const BUFFER_LEN: usize = N;

    fn start(&mut self, address: u8) {
        self.address = address;
        self.queued = 0;
        self.held = false;
    }

    fn queue(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(N - self.queued);
        self.frame[self.queued..self.queued + take].copy_from_slice(&bytes[..take]);
        self.queued += take;
        take
    }

    fn commit(&mut self, release_bus: bool) -> BusStatus {
        if !release_bus {
            // The HAL has no standalone no-stop write; hold the frame and
            // fuse it with the next read into a repeated-start write_read.
            self.held = true;
            return BusStatus::Ok;
        }
        match self.i2c.write(self.address, &self.frame[..self.queued]) {
            Ok(()) => BusStatus::Ok,
            Err(e) => status_from(e),
        }
    }

    fn read(&mut self, address: u8, buf: &mut [u8], _release_bus: bool) -> usize {
        let res = if self.held {
            self.held = false;
            self.i2c.write_read(address, &self.frame[..self.queued], buf)
        } else {
            self.i2c.read(address, buf)
        };
        match res {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}

/// [`AsyncTransport`] adapter over any [`embedded_hal_async::i2c::I2c`] device
pub struct AsyncI2cBus<I2C, const N: usize = 32> {
    i2c: I2C,
    address: u8,
    frame: [u8; N],
    queued: usize,
    held: bool,
}

impl<I2C, const N: usize> AsyncI2cBus<I2C, N> {
    /// Create a new adapter owning the bus
    pub fn new(i2c: I2C) -> Self {
        Self {
            i2c,
            address: 0,
            frame: [0; N],
            queued: 0,
            held: false,
        }
    }

    /// Release the underlying bus
    pub fn free(self) -> I2C {
        self.i2c
    }
}

impl<I2C: AsyncI2c, const N: usize> AsyncTransport for AsyncI2cBus<I2C, N> {
    const BUFFER_LEN: usize = N;

    fn start(&mut self, address: u8) {
        self.address = address;
        self.queued = 0;
        self.held = false;
    }

    fn queue(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(N - self.queued);
        self.frame[self.queued..self.queued + take].copy_from_slice(&bytes[..take]);
        self.queued += take;
        take
    }

    async fn commit(&mut self, release_bus: bool) -> BusStatus {
        if !release_bus {
            self.held = true;
            return BusStatus::Ok;
        }
        match self.i2c.write(self.address, &self.frame[..self.queued]).await {
            Ok(()) => BusStatus::Ok,
            Err(e) => status_from(e),
        }
    }

    async fn read(&mut self, address: u8, buf: &mut [u8], _release_bus: bool) -> usize {
        let res = if self.held {
            self.held = false;
            self.i2c
                .write_read(address, &self.frame[..self.queued], buf)
                .await
        } else {
            self.i2c.read(address, buf).await
        };
        match res {
            Ok(()) => buf.len(),
            Err(_) => 0,
        }
    }
}
