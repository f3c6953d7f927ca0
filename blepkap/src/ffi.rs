// C FFI bindings for BLE-PKAP token operations.
//
// All functions return 0 on success, -1 on error.
// Buffers are caller-allocated; lengths are checked.

use std::slice;

use crate::crypto::keys::{IdentityKeyPair, PRIVATE_KEY_LEN, PUBLIC_KEY_LEN};
use crate::oob::{ConfirmValue, OobRandom, CONFIRM_VALUE_LEN, OOB_RANDOM_LEN};
use crate::token::{InitiatorAuthToken, ResponderAuthToken};

unsafe fn read_array<const N: usize>(ptr: *const u8) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(unsafe { slice::from_raw_parts(ptr, N) });
    out
}

// ── Keypair generation ───────────────────────────────────────────────────

/// Generate a new P-256 identity keypair.
///
/// `public_key_out`: pointer to 64-byte buffer for the raw X‖Y public key.
/// `private_key_out`: pointer to 32-byte buffer for the private scalar.
///
/// Returns 0 on success.
#[no_mangle]
pub unsafe extern "C" fn blepkap_keypair_generate(
    public_key_out: *mut u8,
    private_key_out: *mut u8,
) -> i32 {
    if public_key_out.is_null() || private_key_out.is_null() {
        return -1;
    }
    let kp = IdentityKeyPair::generate();
    let pk = kp.public_key_bytes();
    let sk = kp.private_key_bytes();
    unsafe {
        std::ptr::copy_nonoverlapping(pk.as_ptr(), public_key_out, PUBLIC_KEY_LEN);
        std::ptr::copy_nonoverlapping(sk.as_ptr(), private_key_out, PRIVATE_KEY_LEN);
    }
    0
}

// ── Initiator token ──────────────────────────────────────────────────────

/// Generate an 83-byte initiator auth token.
///
/// `confirm`, `random`: 16-byte LESC OOB values.
/// `private_key`: 32-byte P-256 private scalar.
/// `token_out_len`: on input the buffer capacity, on output the token length.
///
/// Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn blepkap_initiator_token_generate(
    key_id: u16,
    confirm: *const u8,
    random: *const u8,
    private_key: *const u8,
    token_out: *mut u8,
    token_out_len: *mut usize,
) -> i32 {
    if confirm.is_null()
        || random.is_null()
        || private_key.is_null()
        || token_out.is_null()
        || token_out_len.is_null()
    {
        return -1;
    }
    let confirm = ConfirmValue(unsafe { read_array::<CONFIRM_VALUE_LEN>(confirm) });
    let random = OobRandom(unsafe { read_array::<OOB_RANDOM_LEN>(random) });
    let sk = unsafe { read_array::<PRIVATE_KEY_LEN>(private_key) };
    let out = unsafe { slice::from_raw_parts_mut(token_out, *token_out_len) };

    match InitiatorAuthToken::generate_into(key_id, &confirm, &random, &sk, out) {
        Ok(n) => {
            unsafe { *token_out_len = n };
            0
        }
        Err(_) => -1,
    }
}

/// Verify an initiator auth token against a confirmation value and a raw
/// 64-byte public key.
///
/// Returns 0 if valid, -1 if invalid.
#[no_mangle]
pub unsafe extern "C" fn blepkap_initiator_token_verify(
    token: *const u8,
    token_len: usize,
    confirm: *const u8,
    public_key: *const u8,
) -> i32 {
    if token.is_null() || confirm.is_null() || public_key.is_null() {
        return -1;
    }
    let data = unsafe { slice::from_raw_parts(token, token_len) };
    let confirm = ConfirmValue(unsafe { read_array::<CONFIRM_VALUE_LEN>(confirm) });
    let pk = unsafe { read_array::<PUBLIC_KEY_LEN>(public_key) };
    match InitiatorAuthToken::decode(data) {
        Ok(t) if t.verify(&confirm, &pk) => 0,
        _ => -1,
    }
}

// ── Responder token ──────────────────────────────────────────────────────

/// Generate a 67-byte responder auth token.
///
/// Returns 0 on success, -1 on error.
#[no_mangle]
pub unsafe extern "C" fn blepkap_responder_token_generate(
    key_id: u16,
    confirm: *const u8,
    private_key: *const u8,
    token_out: *mut u8,
    token_out_len: *mut usize,
) -> i32 {
    if confirm.is_null() || private_key.is_null() || token_out.is_null() || token_out_len.is_null() {
        return -1;
    }
    let confirm = ConfirmValue(unsafe { read_array::<CONFIRM_VALUE_LEN>(confirm) });
    let sk = unsafe { read_array::<PRIVATE_KEY_LEN>(private_key) };
    let out = unsafe { slice::from_raw_parts_mut(token_out, *token_out_len) };

    match ResponderAuthToken::generate_into(key_id, &confirm, &sk, out) {
        Ok(n) => {
            unsafe { *token_out_len = n };
            0
        }
        Err(_) => -1,
    }
}

/// Verify a responder auth token.
///
/// Returns 0 if valid, -1 if invalid.
#[no_mangle]
pub unsafe extern "C" fn blepkap_responder_token_verify(
    token: *const u8,
    token_len: usize,
    confirm: *const u8,
    public_key: *const u8,
) -> i32 {
    if token.is_null() || confirm.is_null() || public_key.is_null() {
        return -1;
    }
    let data = unsafe { slice::from_raw_parts(token, token_len) };
    let confirm = ConfirmValue(unsafe { read_array::<CONFIRM_VALUE_LEN>(confirm) });
    let pk = unsafe { read_array::<PUBLIC_KEY_LEN>(public_key) };
    match ResponderAuthToken::decode(data) {
        Ok(t) if t.verify(&confirm, &pk) => 0,
        _ => -1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initiator_token_via_ffi() {
        let mut pk = [0u8; 64];
        let mut sk = [0u8; 32];
        assert_eq!(unsafe { blepkap_keypair_generate(pk.as_mut_ptr(), sk.as_mut_ptr()) }, 0);

        let confirm = [0x10u8; 16];
        let random = [0x20u8; 16];
        let mut buf = [0u8; 128];
        let mut len = buf.len();
        let rc = unsafe {
            blepkap_initiator_token_generate(
                1,
                confirm.as_ptr(),
                random.as_ptr(),
                sk.as_ptr(),
                buf.as_mut_ptr(),
                &mut len,
            )
        };
        assert_eq!(rc, 0);
        assert_eq!(len, 83);

        let rc = unsafe {
            blepkap_initiator_token_verify(buf.as_ptr(), len, confirm.as_ptr(), pk.as_ptr())
        };
        assert_eq!(rc, 0);

        let other = [0x11u8; 16];
        let rc = unsafe {
            blepkap_initiator_token_verify(buf.as_ptr(), len, other.as_ptr(), pk.as_ptr())
        };
        assert_eq!(rc, -1);
    }

    #[test]
    fn responder_token_buffer_too_small() {
        let mut pk = [0u8; 64];
        let mut sk = [0u8; 32];
        assert_eq!(unsafe { blepkap_keypair_generate(pk.as_mut_ptr(), sk.as_mut_ptr()) }, 0);
        let confirm = [0x10u8; 16];
        let mut buf = [0u8; 66];
        let mut len = buf.len();
        let rc = unsafe {
            blepkap_responder_token_generate(7, confirm.as_ptr(), sk.as_ptr(), buf.as_mut_ptr(), &mut len)
        };
        assert_eq!(rc, -1);
        assert_eq!(len, 66);

        let mut buf = [0u8; 67];
        let mut len = buf.len();
        let rc = unsafe {
            blepkap_responder_token_generate(7, confirm.as_ptr(), sk.as_ptr(), buf.as_mut_ptr(), &mut len)
        };
        assert_eq!(rc, 0);
        let rc = unsafe {
            blepkap_responder_token_verify(buf.as_ptr(), len, confirm.as_ptr(), pk.as_ptr())
        };
        assert_eq!(rc, 0);
    }

    #[test]
    fn null_pointers_rejected() {
        let rc = unsafe {
            blepkap_initiator_token_verify(std::ptr::null(), 0, std::ptr::null(), std::ptr::null())
        };
        assert_eq!(rc, -1);
        let rc = unsafe { blepkap_keypair_generate(std::ptr::null_mut(), std::ptr::null_mut()) };
        assert_eq!(rc, -1);
    }
}
