// Optional logging. Without the `log` feature the arguments are never
// evaluated, so call sites must not rely on side effects inside them.

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {};
}
