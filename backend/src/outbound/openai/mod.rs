//! OpenAI outbound adapter.
//!
//! A thin HTTP implementation of the `ReportDrafter` port.

mod dto;
mod http_drafter;

pub use http_drafter::{
    DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT, OpenAiBuildError, OpenAiReportDrafter,
    OpenAiSettings,
};
