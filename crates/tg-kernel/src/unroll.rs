//! Statically bounded loops.
//!
//! `Unroll::<N>::call(f)` applies `f` to every index in `[0, N)`, visiting
//! them in descending order `N - 1, ..., 1, 0`. `N` is a const generic, so once
//! the caller is monomorphized the trip count is a literal and the loop is
//! fully expanded; with `N = 0` the body is never entered.
//!
//! Callers that initialize an array slot at one index and read it at another
//! must not assume ascending order.

/// Compile-time unroller over `[0, N)`, descending.
pub struct Unroll<const N: usize>;

impl<const N: usize> Unroll<N> {
    /// Apply `f` to `N - 1` down to `0`.
    ///
    /// The index is not checked against anything: if `f` uses it to index an
    /// array shorter than `N`, that access panics.
    #[inline(always)]
    pub fn call<F: FnMut(usize)>(mut f: F) {
        let mut idx = N;
        while idx > 0 {
            idx -= 1;
            f(idx);
        }
    }
}
