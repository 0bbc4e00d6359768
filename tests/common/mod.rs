//! Recording transport mock shared by the host test suites.
//!
//! The mock emulates the FRAM side of the queued-transaction protocol: it
//! decodes address bytes from committed frames, applies data to a linear
//! memory image, serves reads from the last latched address and answers the
//! identification query on the reserved address. Every bus interaction is
//! recorded so tests can assert on transaction counts and boundaries.

#![allow(dead_code)]

use mb85rc::geometry::Geometry;
use mb85rc::identity::RESERVED_ADDRESS;
use mb85rc::transport::{AsyncTransport, BusStatus, Transport};
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

/// Transaction buffer size, matching the classic 32-byte Wire buffer
pub const BUFFER_LEN: usize = 32;

/// Base address the mocks are wired to
pub const ADDRESS: u8 = 0x50;

/// A committed transaction that carried data bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOp {
    pub target: u8,
    pub address: u16,
    pub len: usize,
}

/// A byte-request transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOp {
    pub target: u8,
    pub address: u16,
    pub len: usize,
}

pub struct MockState {
    pub memory: Vec<u8>,
    pub page_size: usize,
    pub address_bytes: usize,
    /// Absolute memory offset the next read starts at
    pub latched: usize,
    pub writes: Vec<WriteOp>,
    pub reads: Vec<ReadOp>,
    /// Every start/commit/read call, for zero-bus-activity assertions
    pub bus_calls: usize,
    /// Committed transactions, including set-address phases
    pub commits: usize,
    /// Identification queries served
    pub probes: usize,
    /// 3-byte identification payload, `None` for chips without the protocol
    pub identity_payload: Option<[u8; 3]>,
    /// Fail the nth commit (1-based) with the given status
    pub fail_on_commit: Option<(usize, BusStatus)>,
    /// Return one byte less than requested on reads
    pub short_read: bool,
}

pub struct MockBus {
    state: Rc<RefCell<MockState>>,
    target: u8,
    frame: Vec<u8>,
    held: bool,
}

/// Build a mock wired to a chip of the given density at [`ADDRESS`]
pub fn mock(density: u16) -> (MockBus, Rc<RefCell<MockState>>) {
    let geometry = Geometry::resolve(density).unwrap();
    let state = Rc::new(RefCell::new(MockState {
        memory: vec![0; geometry.memory_size as usize],
        page_size: geometry.page_size as usize,
        address_bytes: usize::from(geometry.address_bytes),
        latched: 0,
        writes: Vec::new(),
        reads: Vec::new(),
        bus_calls: 0,
        commits: 0,
        probes: 0,
        identity_payload: None,
        fail_on_commit: None,
        short_read: false,
    }));
    let bus = MockBus {
        state: state.clone(),
        target: 0,
        frame: Vec::new(),
        held: false,
    };
    (bus, state)
}

impl MockBus {
    fn do_start(&mut self, address: u8) {
        self.state.borrow_mut().bus_calls += 1;
        self.target = address;
        self.frame.clear();
        self.held = false;
    }

    fn do_queue(&mut self, bytes: &[u8]) -> usize {
        let take = bytes.len().min(BUFFER_LEN - self.frame.len());
        self.frame.extend_from_slice(&bytes[..take]);
        take
    }

    fn do_commit(&mut self, release_bus: bool) -> BusStatus {
        let mut state = self.state.borrow_mut();
        state.bus_calls += 1;
        state.commits += 1;
        if let Some((nth, status)) = state.fail_on_commit {
            if state.commits == nth {
                return status;
            }
        }
        if !release_bus {
            self.held = true;
            return BusStatus::Ok;
        }

        let address_bytes = state.address_bytes;
        let address = if address_bytes == 2 {
            usize::from(u16::from_be_bytes([self.frame[0], self.frame[1]]))
        } else {
            usize::from(self.frame[0])
        };
        let page = usize::from(self.target - ADDRESS);
        let offset = page * state.page_size + address;
        state.latched = offset;

        let data = &self.frame[address_bytes..];
        if !data.is_empty() {
            let target = self.target;
            let len = data.len();
            state.memory[offset..offset + len].copy_from_slice(data);
            state.writes.push(WriteOp {
                target,
                address: address as u16,
                len,
            });
        }
        BusStatus::Ok
    }

    fn do_read(&mut self, address: u8, buf: &mut [u8], _release_bus: bool) -> usize {
        let mut state = self.state.borrow_mut();
        state.bus_calls += 1;

        if address == RESERVED_ADDRESS && self.held {
            self.held = false;
            state.probes += 1;
            return match state.identity_payload {
                Some(payload) => {
                    let n = buf.len().min(payload.len());
                    buf[..n].copy_from_slice(&payload[..n]);
                    n
                }
                None => 0,
            };
        }

        let offset = state.latched;
        let in_page = (offset % state.page_size) as u16;
        state.reads.push(ReadOp {
            target: address,
            address: in_page,
            len: buf.len(),
        });
        let n = if state.short_read {
            buf.len().saturating_sub(1)
        } else {
            buf.len()
        };
        buf[..n].copy_from_slice(&state.memory[offset..offset + n]);
        state.latched += n;
        n
    }
}

impl Transport for MockBus {
    const BUFFER_LEN: usize = BUFFER_LEN;

    fn start(&mut self, address: u8) {
        self.do_start(address)
    }

    fn queue(&mut self, bytes: &[u8]) -> usize {
        self.do_queue(bytes)
    }

    fn commit(&mut self, release_bus: bool) -> BusStatus {
        self.do_commit(release_bus)
    }

    fn read(&mut self, address: u8, buf: &mut [u8], release_bus: bool) -> usize {
        self.do_read(address, buf, release_bus)
    }
}

impl AsyncTransport for MockBus {
    const BUFFER_LEN: usize = BUFFER_LEN;

    fn start(&mut self, address: u8) {
        self.do_start(address)
    }

    fn queue(&mut self, bytes: &[u8]) -> usize {
        self.do_queue(bytes)
    }

    async fn commit(&mut self, release_bus: bool) -> BusStatus {
        self.do_commit(release_bus)
    }

    async fn read(&mut self, address: u8, buf: &mut [u8], release_bus: bool) -> usize {
        self.do_read(address, buf, release_bus)
    }
}
