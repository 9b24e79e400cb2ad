use crate::types::ShortAddress;
use alloc::format;
use alloc::string::String;

/// Trait for structs that provide metadata for logging
pub trait LogMetadata {
    fn meta(&self) -> String;
}

/// Identifies the component and device a log line belongs to.
/// Useful when several simulated devices share one logger.
#[derive(Debug, Clone, Copy)]
pub struct LogContext {
    pub component: &'static str,
    pub short_address: ShortAddress,
}

impl LogContext {
    pub fn new(component: &'static str, short_address: ShortAddress) -> Self {
        Self {
            component,
            short_address,
        }
    }
}

impl LogMetadata for LogContext {
    fn meta(&self) -> String {
        format!("{} {}", self.component, self.short_address)
    }
}

// =============================================
// Logging Macros (namespaced under crate::log)
// =============================================

// ===== my_info! =====
macro_rules! my_info {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::info!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== my_warn! =====
macro_rules! my_warn {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::warn!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== my_debug! =====
macro_rules! my_debug {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::debug!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// ===== my_trace! =====
macro_rules! my_trace {
    ($ctx:expr, $fmt:literal $(, $($arg:tt)+)?) => {{
        let meta = $crate::log::LogMetadata::meta(&$ctx);
        ::log::trace!(concat!("[{}] ", $fmt), meta $(, $($arg)+)?);
    }};
}

// Re-export macros for use in other files
pub(crate) use my_debug;
pub(crate) use my_info;
pub(crate) use my_trace;
pub(crate) use my_warn;
