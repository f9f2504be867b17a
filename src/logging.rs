//! Logging shims. Every message goes to the `placevec` target so a single filter
//! covers the whole crate; without the `logging` feature the macros expand to nothing.

#![allow(unused_macros)]

macro_rules! log_at {
    ($level:ident, $($arg:tt)+) => (
        #[cfg(feature = "logging")]
        log::$level!(target: "placevec", $($arg)+);
    )
}

macro_rules! debug {
    ($($arg:tt)+) => (
        log_at!(debug, $($arg)+);
    )
}

macro_rules! trace {
    ($($arg:tt)+) => (
        log_at!(trace, $($arg)+);
    )
}
