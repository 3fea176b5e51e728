//! Service layer for the inline and command flows.

pub mod answer;
pub mod inline_tracker;
pub mod last_query;
pub mod result_id;

pub use answer::{build_answer, presented_type, truncate_tags, InlineAnswer, InlineResult};
pub use inline_tracker::{InlineQueryTracker, InlineTicket};
pub use last_query::LastQueryCache;
pub use result_id::InlineResultId;
