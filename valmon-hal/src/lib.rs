/*! Adapters between diagnostic sources and a [`valmon_core::Sink`].
 *
 *  - [`error_chain`] reports Rust error values, flattening their source chain.
 *  - `vulkan` (behind the `vulkan` feature) provides a `VK_EXT_debug_utils`
 *    messenger callback.
 */

#![allow(
    // It is much clearer to assert negative conditions with eq! false
    clippy::bool_assert_comparison,
)]
#![warn(
    trivial_numeric_casts,
    unsafe_op_in_unsafe_fn,
    unused_extern_crates,
    unused_qualifications,
)]

pub mod error_chain;
#[cfg(feature = "vulkan")]
pub mod vulkan;

pub use error_chain::{error_handler, format_error, report_error};
