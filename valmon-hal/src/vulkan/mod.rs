//! `VK_EXT_debug_utils` messenger adapter.
//!
//! The validation layers report through a C callback that may be invoked from
//! any thread the application or the driver submits from. The callback here
//! normalizes its arguments into a [`Message`](valmon_core::Message) and hands
//! it to the [`Sink`] stored in the messenger's user data.

use std::{
    borrow::Cow,
    ffi::{c_void, CStr},
    panic::{self, AssertUnwindSafe},
    thread,
};

use ash::vk;
use valmon_core::{CallbackAction, Severity, Sink};

/// Map Vulkan message severity and type onto a diagnostic severity.
pub fn map_severity(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
) -> Severity {
    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => Severity::Error,
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
            if message_type.contains(vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE) =>
        {
            Severity::PerformanceWarning
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => Severity::Warning,
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
        | vk::DebugUtilsMessageSeverityFlagsEXT::INFO => Severity::Info,
        _ => Severity::Warning,
    }
}

/// Build the message text from the id name and the message body.
///
/// The validation layers normally embed the VUID in the body already; when
/// they don't, it is prepended so VUID patterns still match.
fn compose_text(message_id_name: &str, message: &str) -> String {
    if message_id_name.is_empty() || message.contains(message_id_name) {
        message.to_string()
    } else {
        format!("[ {message_id_name} ] {message}")
    }
}

/// `PFN_vkDebugUtilsMessengerCallbackEXT` that reports to a [`Sink`].
///
/// # Safety
///
/// - `callback_data_ptr` must be null or point to valid callback data.
/// - `user_data` must be null or point to a live [`Sink`], as set up by
///   [`DebugUtilsSink::to_vk_create_info`].
pub unsafe extern "system" fn debug_utils_messenger_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    callback_data_ptr: *const vk::DebugUtilsMessengerCallbackDataEXT,
    user_data: *mut c_void,
) -> vk::Bool32 {
    if thread::panicking() {
        return vk::FALSE;
    }
    if callback_data_ptr.is_null() || user_data.is_null() {
        log::warn!("Debug messenger called without callback data or sink");
        return vk::FALSE;
    }

    let cd = unsafe { &*callback_data_ptr };
    let sink = unsafe { &*user_data.cast::<Sink>() };

    let message_id_name =
        unsafe { cd.message_id_name_as_c_str() }.map_or(Cow::Borrowed(""), CStr::to_string_lossy);
    let message = unsafe { cd.message_as_c_str() }.map_or(Cow::Borrowed(""), CStr::to_string_lossy);

    let severity = map_severity(message_severity, message_type);
    let text = compose_text(&message_id_name, &message);

    // Unwinding across the FFI boundary would abort the process.
    let action = panic::catch_unwind(AssertUnwindSafe(|| sink.report_parts(severity, text)))
        .unwrap_or_else(|_| {
            log::warn!("Panic while reporting a debug messenger message; it was dropped");
            CallbackAction::Continue
        });

    match action {
        CallbackAction::Skip => vk::TRUE,
        CallbackAction::Continue => vk::FALSE,
    }
}

/// Owns the [`Sink`] a debug messenger reports to.
///
/// Must outlive the `VkDebugUtilsMessengerEXT` created from
/// [`to_vk_create_info`](Self::to_vk_create_info), since the messenger keeps a
/// raw pointer to the sink.
#[derive(Debug)]
pub struct DebugUtilsSink {
    sink: Box<Sink>,
    pub severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    pub message_type: vk::DebugUtilsMessageTypeFlagsEXT,
}

impl DebugUtilsSink {
    pub fn new(sink: Sink) -> Self {
        Self {
            sink: Box::new(sink),
            severity: vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            message_type: vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        }
    }

    pub fn sink(&self) -> &Sink {
        &self.sink
    }

    pub fn to_vk_create_info(&self) -> vk::DebugUtilsMessengerCreateInfoEXT<'_> {
        let user_data_ptr: *const Sink = &*self.sink;
        vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(self.severity)
            .message_type(self.message_type)
            .user_data(user_data_ptr as *mut _)
            .pfn_user_callback(Some(debug_utils_messenger_callback))
    }
}
