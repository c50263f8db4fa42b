// Copyright 2025 Cowboy AI, LLC.

//! Record types of the media catalog
//!
//! Items (books, discs, games) may belong to a named series and are indexed
//! by it. Related entities (series, creators, companies) are referenced from
//! item forms by free-text name and can be synthesized from that name.

/// Declare the conventional tag table of a record type
macro_rules! conventional_tags {
    ($singular:literal, $plural:literal) => {
        fn tags() -> &'static $crate::operations::OperationTags {
            static TAGS: std::sync::OnceLock<$crate::operations::OperationTags> =
                std::sync::OnceLock::new();
            TAGS.get_or_init(|| $crate::operations::OperationTags::conventional($singular, $plural))
        }
    };
}

mod items;
mod related;

pub use items::{Book, Disc, Game};
pub use related::{Company, Creator, Series};
