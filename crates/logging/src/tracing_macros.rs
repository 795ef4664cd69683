//! Convenience macros for hsync-specific tracing.
//!
//! Each macro forwards to the matching `tracing` macro with the subsystem's
//! target so callers do not repeat target strings.

/// Emit an upload trace.
///
/// # Example
/// ```ignore
/// trace_upload!(path = %local.display(), "uploaded to {}", remote);
/// ```
#[macro_export]
macro_rules! trace_upload {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "hsync::upload", $($arg)*);
    };
}

/// Emit a download trace.
///
/// # Example
/// ```ignore
/// trace_download!("wrote {}", dest.display());
/// ```
#[macro_export]
macro_rules! trace_download {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "hsync::download", $($arg)*);
    };
}

/// Emit a remote deletion trace.
///
/// # Example
/// ```ignore
/// trace_delete!("deleted {}", remote);
/// ```
#[macro_export]
macro_rules! trace_delete {
    ($($arg:tt)*) => {
        ::tracing::info!(target: "hsync::delete", $($arg)*);
    };
}

/// Emit a fields conversion trace.
///
/// # Example
/// ```ignore
/// trace_convert!("converted {}", source.display());
/// ```
#[macro_export]
macro_rules! trace_convert {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "hsync::convert", $($arg)*);
    };
}

/// Emit a watch loop trace.
///
/// # Example
/// ```ignore
/// trace_watch!("event {:?}", event);
/// ```
#[macro_export]
macro_rules! trace_watch {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "hsync::watch", $($arg)*);
    };
}

/// Emit an ignore rule trace.
///
/// # Example
/// ```ignore
/// trace_filter!("loaded {} rules", count);
/// ```
#[macro_export]
macro_rules! trace_filter {
    ($($arg:tt)*) => {
        ::tracing::debug!(target: "hsync::filter", $($arg)*);
    };
}
