/// Pipeline errors. Only misuse and transport failures land here; policy
/// outcomes are reported through `SendStatus`.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("diverted-hit buffer already drained; no further hits may enter it")]
    BufferDrained,

    #[error("enabled channel already built; the builder runs exactly once")]
    AlreadyBuilt,

    #[error("hit carries no client id; the settings stage must run before sampling")]
    MissingClientId,

    #[error("malformed client id {client_id:?}: {reason}")]
    MalformedClientId { client_id: String, reason: String },

    #[error("delivery failed: {reason}")]
    Delivery { reason: String },
}
