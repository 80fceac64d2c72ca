// SPDX-FileCopyrightText: 2026 Nostalgic Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Nostalgic widget backend.
//!
//! Holds the error taxonomy, the widget entity model, and the port traits
//! that storage, webhook, and filter implementations plug into.

pub mod entity;
pub mod error;
pub mod keys;
pub mod traits;
pub mod types;

pub use entity::{
    BasicSettings, BbsEntity, BbsMessage, BbsSettings, CounterEntity, LikeEntity, RankingEntity,
    RankingEntry, RankingSettings, SelectDefinition, WidgetEntity, WidgetMeta,
};
pub use error::{NostalgicError, Result};
pub use traits::{
    Clock, ContentFilter, Repositories, SystemClock, WebhookNotifier, WebhookPayload,
};
pub use types::{CounterWindow, DisplayFormat, PublicId, ServiceKind, SortOrder, VisitorHash};

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::str::FromStr;

    #[test]
    fn error_variants_construct() {
        let _validation = NostalgicError::validation("bad");
        let _not_found = NostalgicError::not_found("missing");
        let _storage = NostalgicError::storage(std::io::Error::other("disk"));
        let _config = NostalgicError::Config("test".into());
        let _internal = NostalgicError::Internal("test".into());
    }

    #[test]
    fn validation_message_is_displayed_verbatim() {
        let err = NostalgicError::validation("already exists");
        assert_eq!(err.to_string(), "already exists");
        assert!(err.is_client_error());
        assert!(!NostalgicError::storage("boom").is_client_error());
    }

    #[test]
    fn service_kind_display_and_parse() {
        for kind in ServiceKind::ALL {
            let s = kind.to_string();
            assert_eq!(s, kind.as_str());
            assert_eq!(ServiceKind::from_str(&s).unwrap(), kind);
        }
    }

    #[test]
    fn sort_order_defaults_to_desc() {
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(SortOrder::from_str("asc").unwrap(), SortOrder::Asc);
    }

    #[test]
    fn public_id_rejects_unsafe_characters() {
        assert!(PublicId::parse("example-com-1a2b3c4d").is_ok());
        assert!(PublicId::parse("").is_err());
        assert!(PublicId::parse("Has Space").is_err());
        assert!(PublicId::parse("slash/inside").is_err());
        assert!(PublicId::parse(&"a".repeat(65)).is_err());
    }

    #[test]
    fn visitor_hash_debug_is_redacted() {
        let hash = VisitorHash("deadbeef".into());
        assert!(!format!("{hash:?}").contains("deadbeef"));
    }

    proptest! {
        #[test]
        fn public_id_accepts_slug_alphabet(s in "[a-z0-9-]{1,64}") {
            prop_assert!(PublicId::parse(&s).is_ok());
        }
    }
}
