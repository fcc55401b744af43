//! Thin wrappers over the [`log`] facade, so logging call sites read the
//! same across the crate regardless of severity.

#[macro_export]
macro_rules! debugln {
    ($($rest:tt)*) => {
        log::trace!($($rest)*)
    }
}

#[macro_export]
macro_rules! infoln {
    ($($rest:tt)*) => {
        log::debug!($($rest)*)
    }
}

#[macro_export]
macro_rules! warnln {
    ($($rest:tt)*) => {
        log::warn!($($rest)*)
    }
}

/// Panics with a formatted message, used for states the core's own
/// invariants make unreachable.
#[macro_export]
macro_rules! panic_gb {
    ($($rest:tt)*) => {
        panic!($($rest)*)
    }
}

/// Asserts only when the `pedantic` feature is enabled, used for checks
/// that are useful during development but too costly to run by default.
#[macro_export]
macro_rules! assert_pedantic_gb {
    ($cond:expr, $($rest:tt)*) => {{
        #[cfg(feature = "pedantic")]
        assert!($cond, $($rest)*);
        #[cfg(not(feature = "pedantic"))]
        {
            let _ = &$cond;
        }
    }}
}
