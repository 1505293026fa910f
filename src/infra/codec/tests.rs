//! Wire codec tests: flag packing, clamping, and round trips on representative frames.
use super::*;

#[test]
/// A standard data frame keeps its identifier untouched.
fn test_encode_standard() {
    let frame = CanFrame::new_standard(0x123, &[0xAA, 0xBB]).unwrap();
    let msg = encode(&frame);
    assert_eq!(msg.id, 0x123);
    assert_eq!(msg.dlc, 2);
    assert_eq!(&msg.data[..2], &[0xAA, 0xBB]);
    assert_eq!(&msg.data[2..], &[0; 6]);
}

#[test]
/// EFF lands in bit 31 and RTR in bit 30.
fn test_encode_flags() {
    let frame = CanFrame::new_remote(0x1ABCDE, true, 0).unwrap();
    let msg = frame.to_wire();
    assert_eq!(msg.id, 0x1ABCDE | ID_EFF | ID_RTR);
    assert!(msg.is_extended());
    assert!(msg.is_remote());
    assert_eq!(msg.arbitration_id(), 0x1ABCDE);
    assert_eq!(msg.dlc, 0);
}

#[test]
/// Decoding strips the flag bits from the identifier.
fn test_decode_flags() {
    let msg = WireMessage {
        id: 0x1FFF_FFFF | ID_EFF,
        dlc: 3,
        data: [1, 2, 3, 4, 5, 6, 7, 8],
    };
    let frame = decode(&msg);
    assert_eq!(frame.id, 0x1FFF_FFFF);
    assert!(frame.ext);
    assert!(!frame.rtr);
    assert_eq!(frame.payload(), &[1, 2, 3]);
    // Bytes past the DLC are not carried over.
    assert_eq!(&frame.data[3..], &[0; 5]);
}

#[test]
/// A malformed DLC from the wire is clamped to eight bytes.
fn test_decode_clamps_dlc() {
    let msg = WireMessage {
        id: 0x10,
        dlc: 15,
        data: [9; 8],
    };
    let frame = CanFrame::from_wire(&msg);
    assert_eq!(frame.len, 8);
    assert_eq!(frame.payload(), &[9; 8]);
}

#[test]
/// An oversized `len` written directly into the record is clamped on encode.
fn test_encode_clamps_len() {
    let mut frame = CanFrame::new_standard(0x10, &[1; 8]).unwrap();
    frame.len = 12;
    let msg = WireMessage::from(&frame);
    assert_eq!(msg.dlc, 8);
}

#[test]
/// An identifier written directly into the record cannot forge EFF/RTR.
fn test_encode_masks_id() {
    let mut frame = CanFrame::new_standard(0x10, &[1]).unwrap();
    frame.id = 0xF000_0123;
    let msg = encode(&frame);
    assert_eq!(msg.id, 0x1000_0123);
    assert!(!msg.is_extended());
    assert!(!msg.is_remote());

    frame.ext = true;
    assert_eq!(encode(&frame).id, 0x1000_0123 | ID_EFF);
}

#[test]
/// decode(encode(f)) == f across the id/flag/length space.
fn test_round_trip() {
    let payload = [0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88];
    for len in 0..=8 {
        for &(id, ext) in &[(0x000, false), (0x7FF, false), (0x0, true), (0x1FFF_FFFF, true)] {
            let data_frame = if ext {
                CanFrame::new_extended(id, &payload[..len]).unwrap()
            } else {
                CanFrame::new_standard(id, &payload[..len]).unwrap()
            };
            assert_eq!(CanFrame::from(&encode(&data_frame)), data_frame);

            let remote = CanFrame::new_remote(id, ext, len).unwrap();
            assert_eq!(decode(&remote.to_wire()), remote);
        }
    }
}
