// Per-cell passes fan out over rayon when the `parallel` feature is on; callers
// import `rayon::prelude::*` under the same cfg. Both arms collect in source order.
#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
macro_rules! maybe_par_iter {
    ($range:expr) => {
        $range.into_par_iter()
    };
}

#[cfg(not(all(feature = "parallel", not(target_arch = "wasm32"))))]
macro_rules! maybe_par_iter {
    ($range:expr) => {
        $range.into_iter()
    };
}
