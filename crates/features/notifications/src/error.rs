use std::borrow::Cow;

/// Notification layer error type.
///
/// Never crosses the [`NotificationStore`](crate::NotificationStore) boundary: the store
/// logs these and degrades to an empty read or a skipped write.
#[bns_derive::bns_error]
pub enum NotificationError {
    #[error("Storage error{}: {source}", format_context(.context))]
    Storage { source: bns_storage::StorageError, context: Option<Cow<'static, str>> },

    #[error("Serialization error{}: {source}", format_context(.context))]
    Serde { source: serde_json::Error, context: Option<Cow<'static, str>> },

    #[error("Backend error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
