//! A small handful of helper macros

#[cfg(test)]
use std::sync::atomic::AtomicBool;

// Macro for match arms and branches that the tree's structure rules out. Unlike `weak_assert`, this
// can't be compiled out: there's no value to produce if we somehow get here.
macro_rules! weak_unreachable {
    ($($tt:tt)*) => {{
        unreachable!($($tt)*)
    }};
}

// Helper macro so that the contracts on our node and map operations can be checked in debug mode,
// but *assumed* in release mode.
//
// Violating a `weak_assert` in release mode never causes memory unsafety (everything is indexed
// through bounds-checked slices), but the map's contents are unspecified afterwards.
macro_rules! weak_assert {
    ($cond:expr $(,)?) => {{
        // We use `if cfg!(...)` here (instead of `#[cfg]`) so that the condition is still type
        // checked in release mode, where it's never evaluated.
        if cfg!(debug_assertions) && !$cond {
            panic!(concat!("debug assertion failed: ", stringify!($cond)));
        }
    }};
    ($cond:expr, $($args:tt)+) => {{
        if cfg!(debug_assertions) && !$cond {
            panic!($($args)+);
        }
    }};
}

#[cfg(test)]
pub(crate) static DEBUG: AtomicBool = AtomicBool::new(false);

#[cfg(test)]
macro_rules! enable_debug {
    () => {{
        $crate::macros::DEBUG.store(true, std::sync::atomic::Ordering::SeqCst);
    }};
}

#[cfg(test)]
macro_rules! disable_debug {
    () => {{
        $crate::macros::DEBUG.store(false, std::sync::atomic::Ordering::SeqCst);
    }};
}

macro_rules! debug_println {
    ($($args:tt)*) => {
        #[cfg(test)]
        {
            if $crate::macros::DEBUG.load(std::sync::atomic::Ordering::SeqCst) {
                println!($($args)*);
            }
        };
    };
}
