use std::borrow::Cow;

use proptest::prelude::*;
use vix_ffi::boundary::run_operation;
use vix_ffi::caller::{call_into, call_negotiated};
use vix_ffi::{vix_buf, vix_mut_buf, vix_status, FfiResult, StatusCode};

fn doubled(input: &[u8]) -> FfiResult<Cow<'_, [u8]>> {
    Ok(Cow::Owned(input.iter().flat_map(|&b| [b, b]).collect()))
}

unsafe extern "C" fn double_bytes(
    input: vix_buf,
    output: vix_mut_buf,
    written_out: *mut usize,
    status_out: *mut vix_status,
) -> i32 {
    run_operation("double_bytes", input, output, written_out, status_out, doubled)
}

#[test]
fn exact_size_retry_succeeds_after_probe() {
    let input = b"negotiate";
    let mut probe: [u8; 0] = [];
    let err = unsafe { call_into(double_bytes, input, &mut probe) }.unwrap_err();
    let required = err.required_len().unwrap();
    assert_eq!(required, 2 * input.len());

    let mut out = vec![0u8; required];
    let n = unsafe { call_into(double_bytes, input, &mut out) }.unwrap();
    assert_eq!(n, required);
    assert_eq!(&out[..4], b"nnee");
}

#[test]
fn larger_buffers_leave_the_tail_untouched() {
    let mut out = [0xEEu8; 10];
    let n = unsafe { call_into(double_bytes, b"ab", &mut out) }.unwrap();
    assert_eq!(n, 4);
    assert_eq!(&out[..4], b"aabb");
    assert_eq!(&out[4..], &[0xEE; 6]);
}

proptest! {
    #[test]
    fn short_buffers_are_never_written(
        input in proptest::collection::vec(any::<u8>(), 1..64),
        cap_seed in any::<usize>(),
    ) {
        let required = 2 * input.len();
        let cap = cap_seed % required;
        let mut out = vec![0x5Au8; cap];
        let first = unsafe { call_into(double_bytes, &input, &mut out) }.unwrap_err();
        let second = unsafe { call_into(double_bytes, &input, &mut out) }.unwrap_err();

        prop_assert_eq!(first.code, StatusCode::BufferTooSmall);
        prop_assert_eq!(first.required_len(), Some(required));
        prop_assert_eq!(&first, &second);
        prop_assert!(out.iter().all(|&b| b == 0x5A));
    }

    #[test]
    fn negotiated_calls_match_the_pure_function(
        input in proptest::collection::vec(any::<u8>(), 0..128),
    ) {
        let got = unsafe { call_negotiated(double_bytes, &input) }.unwrap();
        prop_assert_eq!(got, doubled(&input).unwrap().into_owned());
    }
}
