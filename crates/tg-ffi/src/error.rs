use std::cell::RefCell;
use std::ffi::CString;

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

/// Store an error message for later retrieval via `tg_last_error`.
pub fn set_last_error(msg: String) {
    log::debug!("ffi error: {msg}");
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

/// Take the last error message, leaving `None` in its place.
pub fn take_last_error() -> Option<CString> {
    LAST_ERROR.with(|e| e.borrow_mut().take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_clears() {
        set_last_error("boom".to_string());
        assert_eq!(take_last_error().unwrap().to_str().unwrap(), "boom");
        assert!(take_last_error().is_none());
    }

    #[test]
    fn test_interior_nul_is_dropped() {
        set_last_error("bad\0msg".to_string());
        assert!(take_last_error().is_none());
    }
}
