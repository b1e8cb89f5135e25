//! Canonicalization policy

/// Knobs that vary the canonical request between invocation targets.
///
/// API Gateway expects the path exactly as sent and signs the query string;
/// Bedrock model invocation expects `:` in the model id percent-encoded and
/// an empty canonical query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalizationPolicy {
    /// Replace every `:` in the canonical URI with `%3A`.
    pub escape_colon: bool,
    /// Use the URL query string as the canonical query (otherwise empty).
    pub include_query: bool,
}

impl CanonicalizationPolicy {
    /// Policy for API Gateway (`execute-api`) proxy invocation.
    pub const PROXY: Self = Self {
        escape_colon: false,
        include_query: true,
    };

    /// Policy for direct Bedrock model invocation.
    pub const DIRECT_MODEL: Self = Self {
        escape_colon: true,
        include_query: false,
    };
}

impl Default for CanonicalizationPolicy {
    fn default() -> Self {
        Self::PROXY
    }
}
