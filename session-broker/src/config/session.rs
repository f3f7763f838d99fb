use confique::Config;

/// Cookie and record lifetimes, and where the flow lands the user
#[derive(Debug, Config, Clone)]
pub struct SessionConfig {
    /// Lifetime of the OAuth cookie and its pending authorization record in
    /// seconds (default: 600, the recommended authorization code lifetime)
    #[config(env = "BROKER_SESSION_PENDING_TTL", default = 600)]
    pub pending_ttl: u64,

    /// Lifetime of the site session cookie and its token record in seconds
    /// (default: 90 days)
    #[config(env = "BROKER_SESSION_MAX_AGE", default = 7776000)]
    pub max_age: u64,

    /// Redirect target after a successful callback (default: /)
    #[config(env = "BROKER_SESSION_SIGNED_IN_PATH", default = "/")]
    pub signed_in_path: String,

    /// Redirect target after sign-out (default: /)
    #[config(env = "BROKER_SESSION_SIGNED_OUT_PATH", default = "/")]
    pub signed_out_path: String,
}
