//! # tagbot-search
//!
//! Search query compiler for tagbot.
//!
//! This crate provides:
//! - A typed boolean query tree rendered to the backend JSON DSL
//! - Per-field match strategies (term filters, fuzzy and n-gram multi-match, set membership)
//! - Offset-token pagination for inline results
//! - Projection of search responses into [`SearchPage`]s
//!
//! ## Example
//!
//! ```
//! use tagbot_search::{CompileOptions, Pagination, SearchCompiler};
//!
//! let query = tagbot_core::parse_query("cat t:gif !dog");
//! let request = SearchCompiler::standard()
//!     .compile(42, &query, &CompileOptions::inline(Pagination::default()));
//! let body = request.to_json();
//! assert_eq!(body["size"], 50);
//! ```

pub mod ast;
pub mod compiler;
pub mod pagination;
pub mod response;

// Re-export core types
pub use tagbot_core::*;

pub use ast::{BoolQuery, Clause, MultiMatch, SearchRequest, SortKey};
pub use compiler::{CompileOptions, SearchCompiler};
pub use pagination::Pagination;
pub use response::parse_search_response;
