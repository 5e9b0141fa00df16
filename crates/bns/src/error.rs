use std::borrow::Cow;

#[bns_derive::bns_error]
pub enum BnsError {
    #[error("Expiry configuration error{}: {source}", format_context(.context))]
    Expiry { source: bns_expiry::ExpiryError, context: Option<Cow<'static, str>> },

    #[error("Notification setup error{}: {source}", format_context(.context))]
    Notification {
        source: bns_notifications::NotificationError,
        context: Option<Cow<'static, str>>,
    },
}
