use core::fmt;

/// All possible errors emitted by the driver
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The transport's transaction buffer overflowed
    BusBufferOverflow,

    /// The device address byte was not acknowledged
    AddressNack,

    /// A data byte was not acknowledged
    DataNack,

    /// The bus is busy or arbitration was lost
    BusBusy,

    /// The transport reported a status outside the known set
    UnknownBusStatus,

    /// Fewer bytes were returned than requested
    ShortRead,

    /// Fewer bytes were queued than expected
    ShortWrite,

    /// The device has not been initialized, see `begin`
    NotInitialized,

    /// The device is already initialized with a different configuration
    AlreadyInitialized,

    /// The density is not one of the supported values
    UnsupportedDensity,

    /// The page index is beyond the device's page count
    InvalidPage,

    /// The address range does not fit within the page
    OutOfBounds,

    /// The scratch buffer is larger than a page
    ScratchTooLarge,

    /// The value does not fit in the scratch buffer
    ValueTooLarge,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BusBufferOverflow => write!(f, "bus transaction buffer overflow"),
            Self::AddressNack => write!(f, "address not acknowledged"),
            Self::DataNack => write!(f, "data not acknowledged"),
            Self::BusBusy => write!(f, "bus busy"),
            Self::UnknownBusStatus => write!(f, "unknown bus status"),
            Self::ShortRead => write!(f, "short read"),
            Self::ShortWrite => write!(f, "short write"),
            Self::NotInitialized => write!(f, "device not initialized"),
            Self::AlreadyInitialized => write!(f, "device already initialized differently"),
            Self::UnsupportedDensity => write!(f, "unsupported density"),
            Self::InvalidPage => write!(f, "invalid page"),
            Self::OutOfBounds => write!(f, "address range out of page bounds"),
            Self::ScratchTooLarge => write!(f, "scratch buffer larger than a page"),
            Self::ValueTooLarge => write!(f, "value too large for the scratch buffer"),
        }
    }
}

impl core::error::Error for Error {}
