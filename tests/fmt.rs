mod common;

use common::{mock, ADDRESS};
use mb85rc::{blocking::Mb85rc, fmt::hexdump, transport::BusStatus};

#[test]
fn hexdump_aligned_rows() {
    let (bus, state) = mock(64);
    for (i, byte) in state.borrow_mut().memory[..32].iter_mut().enumerate() {
        *byte = i as u8;
    }
    let mut fram: Mb85rc<_> = Mb85rc::new(bus);
    fram.begin(64, ADDRESS).unwrap();

    let mut out = String::new();
    hexdump(&mut out, &mut fram, 0, 0, 32).unwrap();

    assert_eq!(
        out,
        "FRAM hexdump - address 0x00, 0x20 (32) bytes\n\
         \n\
         \u{20}     00 01 02 03 04 05 06 07   08 09 0A 0B 0C 0D 0E 0F\n\
         \u{20}     -- -- -- -- -- -- -- --   -- -- -- -- -- -- -- --\n\
         0000: 00 01 02 03 04 05 06 07 - 08 09 0A 0B 0C 0D 0E 0F\n\
         0010: 10 11 12 13 14 15 16 17 - 18 19 1A 1B 1C 1D 1E 1F\n"
    );
}

#[test]
fn hexdump_indents_unaligned_start() {
    let (bus, state) = mock(64);
    state.borrow_mut().memory[100..108].fill(0xAB);
    let mut fram: Mb85rc<_> = Mb85rc::new(bus);
    fram.begin(64, ADDRESS).unwrap();

    let mut out = String::new();
    hexdump(&mut out, &mut fram, 0, 100, 8).unwrap();

    assert!(out.starts_with("FRAM hexdump - address 0x64, 0x8 (8) bytes\n"));
    assert!(
        out.ends_with("0060:             AB AB AB AB - AB AB AB AB\n"),
        "unexpected row layout:\n{out}"
    );
}

#[test]
fn hexdump_shows_page_for_multi_page_chips() {
    let (bus, _state) = mock(1024);
    let mut fram: Mb85rc<_> = Mb85rc::new(bus);
    fram.begin(1024, ADDRESS).unwrap();

    let mut out = String::new();
    hexdump(&mut out, &mut fram, 1, 0, 16).unwrap();
    assert!(out.starts_with("FRAM hexdump - page 1, address 0x00, 0x10 (16) bytes\n"));
}

#[test]
fn hexdump_reports_validation_errors_into_the_stream() {
    let (bus, state) = mock(64);
    let mut fram: Mb85rc<_> = Mb85rc::new(bus);

    let mut out = String::new();
    hexdump(&mut out, &mut fram, 0, 0, 16).unwrap();
    assert_eq!(out, "Error: device not initialized\n");

    fram.begin(64, ADDRESS).unwrap();

    out.clear();
    hexdump(&mut out, &mut fram, 5, 0, 16).unwrap();
    assert!(out.ends_with("Error: invalid page\n"));

    out.clear();
    hexdump(&mut out, &mut fram, 0, 8000, 500).unwrap();
    assert!(out.ends_with("Error: address range out of page bounds\n"));

    // A count near the integer limit must not wrap past the bounds check
    out.clear();
    hexdump(&mut out, &mut fram, 0, 100, u32::MAX as usize - 99).unwrap();
    assert!(out.ends_with("Error: address range out of page bounds\n"));

    out.clear();
    hexdump(&mut out, &mut fram, 0, 0, 0).unwrap();
    assert!(out.ends_with("Byte count is 0.\n"));

    // None of the rejected dumps touched the bus
    assert_eq!(state.borrow().bus_calls, 0);
}

#[test]
fn hexdump_reports_bus_fault_and_stops() {
    let (bus, state) = mock(64);
    state.borrow_mut().fail_on_commit = Some((1, BusStatus::Busy));
    let mut fram: Mb85rc<_> = Mb85rc::new(bus);
    fram.begin(64, ADDRESS).unwrap();

    let mut out = String::new();
    hexdump(&mut out, &mut fram, 0, 0, 64).unwrap();
    assert!(out.ends_with("Error: bus busy\n"), "got:\n{out}");
    // Only the failed first row was attempted
    assert_eq!(state.borrow().reads.len(), 0);
}

#[test]
fn info_includes_resolved_identity() {
    let (bus, state) = mock(256);
    state.borrow_mut().identity_payload = Some([0x00, 0xA5, 0x10]);
    let mut fram: Mb85rc<_> = Mb85rc::new(bus);
    fram.begin(256, ADDRESS).unwrap();

    let before = fram.info().unwrap().to_string();
    assert!(before.contains("Density:          256 kb"));
    assert!(!before.contains("Device ID"));

    fram.device_id().unwrap();
    let after = fram.info().unwrap().to_string();
    assert!(after.contains("Device ID:        supported"));
    assert!(after.contains("Manufacturer ID:  0x00A"));
    assert!(after.contains("Product ID:       0x510"));
}
