/// Rate Limiting System
///
/// A single global in-memory limiter applied in front of every route. The
/// gateway fronts metered third-party APIs, so the inbound quota caps the
/// upstream spend.
use crate::config::RateLimitConfig;
use crate::error::{GatewayError, GatewayResult};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorLimiter,
};
use std::{num::NonZeroU32, sync::Arc};

/// Rate limiter manager
#[derive(Clone)]
pub struct RateLimiter {
    enabled: bool,
    global: Arc<GovernorLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let quota = Quota::per_second(
            NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::new(50).unwrap()),
        )
        .allow_burst(NonZeroU32::new(config.burst_size).unwrap_or(NonZeroU32::new(25).unwrap()));

        Self {
            enabled: config.enabled,
            global: Arc::new(GovernorLimiter::direct(quota)),
        }
    }

    /// Check the global rate limit
    pub fn check(&self) -> GatewayResult<()> {
        if !self.enabled {
            return Ok(());
        }

        match self.global.check() {
            Ok(_) => Ok(()),
            Err(_) => Err(GatewayError::RateLimitExceeded),
        }
    }
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    State(ctx): State<crate::context::AppContext>,
    request: Request,
    next: Next,
) -> Response {
    match ctx.rate_limiter.check() {
        Ok(_) => next.run(request).await,
        Err(e) => e.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_limiter_always_passes() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: false,
            requests_per_second: 1,
            burst_size: 1,
        });

        for _ in 0..100 {
            assert!(limiter.check().is_ok());
        }
    }

    #[test]
    fn test_burst_exhaustion_is_rejected() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: true,
            requests_per_second: 1,
            burst_size: 2,
        });

        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_ok());
        assert!(limiter.check().is_err());
    }
}
