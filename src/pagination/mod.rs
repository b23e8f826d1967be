//! Pagination module
//!
//! Supports: single page, page number, offset, cursor, next URL, link header
//!
//! # Overview
//!
//! A stream asks its [`NextRequest`] hook for the next request after every
//! page. The built-in strategies derive it from the previous request (page
//! number or offset parameters) or the previous response (cursor, next URL,
//! `Link` header). Custom streams can pass any closure with the same shape.

mod strategies;
mod types;

pub use strategies::{
    parse_link_header, CursorPaginator, LinkHeaderPaginator, NextUrlPaginator, OffsetPaginator,
    PageNumberPaginator, SinglePage,
};
pub use types::{count_records, read_page, NextRequest, PaginationConfig, StopCondition};

#[cfg(test)]
mod tests;
