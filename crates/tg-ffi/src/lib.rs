mod context;
mod error;
mod types;

pub use context::*;
pub use error::*;
pub use types::*;

use std::ffi::CString;
use std::os::raw::c_char;
use std::panic::AssertUnwindSafe;

use tg_kernel::params::required_len;
use tg_kernel::{GemmBackend, GemmParams, MatrixBuf};

/// Execute a closure that returns a `TGStatus`, catching any panics
/// and converting them into `TGStatus::ErrorInternal`.
fn catch_panic<F: FnOnce() -> TGStatus>(f: F) -> TGStatus {
    match std::panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(status) => status,
        Err(_) => {
            set_last_error("internal panic".to_string());
            TGStatus::ErrorInternal
        }
    }
}

/// Create a new GEMM context.
///
/// On success, writes a heap-allocated `TGContext` pointer into `*ctx_out`
/// and returns `TGStatus::Ok`. The caller must later call `tg_context_destroy`
/// to free the context.
#[no_mangle]
pub extern "C" fn tg_context_create(
    backend: TGBackendType,
    ctx_out: *mut *mut TGContext,
) -> TGStatus {
    catch_panic(|| {
        if ctx_out.is_null() {
            set_last_error("ctx_out is null".to_string());
            return TGStatus::ErrorInvalidArgument;
        }
        let ctx = Box::new(TGContext::new(backend));
        unsafe {
            *ctx_out = Box::into_raw(ctx);
        }
        TGStatus::Ok
    })
}

/// Destroy a context previously created by `tg_context_create`.
///
/// Passing a null pointer is a no-op and returns `TGStatus::Ok`.
///
/// # Safety
/// `ctx` must be null or a pointer returned by `tg_context_create` that has
/// not been destroyed yet.
#[no_mangle]
pub unsafe extern "C" fn tg_context_destroy(ctx: *mut TGContext) -> TGStatus {
    if ctx.is_null() {
        return TGStatus::Ok;
    }
    drop(Box::from_raw(ctx));
    TGStatus::Ok
}

/// Compute `C = A * B` on row-major `f32` matrices.
///
/// `lda`, `ldb` and `ldc` are row pitches in floats. `k`, `n` and all three
/// pitches must be multiples of 4. Only the `m x n` logical extent of C is
/// written; its padding keeps whatever the caller stored there.
///
/// # Safety
/// `ctx` must come from `tg_context_create`. `a` must be readable for
/// `(m - 1) * lda + k` floats, `b` for `(k - 1) * ldb + n` and `c` readable
/// and writable for `(m - 1) * ldc + n`. C must not overlap A or B.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn tg_sgemm(
    ctx: *const TGContext,
    a: *const f32,
    lda: usize,
    b: *const f32,
    ldb: usize,
    c: *mut f32,
    ldc: usize,
    m: usize,
    n: usize,
    k: usize,
) -> TGStatus {
    catch_panic(|| {
        if ctx.is_null() || a.is_null() || b.is_null() || c.is_null() {
            set_last_error("null argument".to_string());
            return TGStatus::ErrorInvalidArgument;
        }
        let ctx = unsafe { &*ctx };

        let params = GemmParams::new(m, n, k).with_strides(lda, ldb, ldc);
        if let Err(e) = params.check_layout() {
            set_last_error(format!("sgemm: {e}"));
            return TGStatus::from(&e);
        }

        let lens = required_len("A", m, k, lda).and_then(|a_len| {
            let b_len = required_len("B", k, n, ldb)?;
            let c_len = required_len("C", m, n, ldc)?;
            Ok((a_len, b_len, c_len))
        });
        let (a_len, b_len, c_len) = match lens {
            Ok(lens) => lens,
            Err(e) => {
                set_last_error(format!("sgemm: {e}"));
                return TGStatus::from(&e);
            }
        };
        let (a, b, c) = unsafe {
            (
                std::slice::from_raw_parts(a, a_len),
                std::slice::from_raw_parts(b, b_len),
                std::slice::from_raw_parts_mut(c, c_len),
            )
        };

        let result = MatrixBuf::from_strided(a, m, k, lda).and_then(|a_buf| {
            let b_buf = MatrixBuf::from_strided(b, k, n, ldb)?;
            let mut c_buf = MatrixBuf::from_strided(c, m, n, ldc)?;
            ctx.backend.sgemm(&a_buf, &b_buf, &mut c_buf)?;
            Ok(c_buf)
        });

        match result {
            Ok(c_buf) => {
                for (r, dst) in c.chunks_mut(ldc).enumerate().take(m) {
                    let row = c_buf.row(r);
                    for (v, out) in row.iter().zip(dst[..n].chunks_exact_mut(4)) {
                        out.copy_from_slice(&v.0);
                    }
                }
                TGStatus::Ok
            }
            Err(e) => {
                set_last_error(format!("sgemm on {}: {e}", ctx.backend.name()));
                TGStatus::from(&e)
            }
        }
    })
}

/// Retrieve the last error message.
///
/// Returns a pointer to a C string describing the most recent error, or
/// null if no error has occurred. The caller must free the returned string
/// with `tg_free_string`.
#[no_mangle]
pub extern "C" fn tg_last_error() -> *const c_char {
    match error::take_last_error() {
        Some(e) => e.into_raw(),
        None => std::ptr::null(),
    }
}

/// Free a string previously returned by `tg_last_error`.
///
/// # Safety
/// `s` must be null or a pointer returned by `tg_last_error`.
#[no_mangle]
pub unsafe extern "C" fn tg_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
