use std::borrow::Cow;

/// Errors raised by the [`FileStore`](crate::FileStore).
#[bns_derive::bns_error]
pub enum StorageError {
    #[error("Invalid storage key{}: {message}", format_context(.context))]
    InvalidKey { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Sandbox violation{}: {message}", format_context(.context))]
    SandboxViolation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Storage I/O failure{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },
}
