use std::borrow::Cow;

/// Expiry evaluator error type.
#[bns_derive::bns_error]
pub enum ExpiryError {
    #[error("Invalid expiry thresholds{}: {message}", format_context(.context))]
    InvalidThresholds { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Invalid notification cooldowns{}: {message}", format_context(.context))]
    InvalidCooldowns { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
