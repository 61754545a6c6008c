use crate::{
    api::{analytics, attendance, leave_request},
    auth::middleware::auth_middleware,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use anyhow::anyhow;
use std::sync::Arc;

pub type Limiter = Governor<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer limiter allowing `requests_per_min` with a burst of the same size.
pub fn build_limiter(requests_per_min: u32) -> anyhow::Result<Limiter> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} requests per minute"))?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: Arc<Limiter>) {
    // Protected routes
    cfg.service(
        web::scope(api_prefix)
            .wrap(from_fn(auth_middleware))
            // authentication
            .wrap(limiter) // rate limiting
            .service(
                web::scope("/leave")
                    // /leave
                    .service(web::resource("").route(web::post().to(leave_request::apply_leave)))
                    // /leave/mine
                    .service(web::resource("/mine").route(web::get().to(leave_request::my_leaves)))
                    // /leave/pending
                    .service(
                        web::resource("/pending")
                            .route(web::get().to(leave_request::pending_leaves)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(leave_request::get_leave))
                            .route(web::delete().to(leave_request::delete_leave)),
                    )
                    // /leave/{id}/decision
                    .service(
                        web::resource("/{id}/decision")
                            .route(web::put().to(leave_request::decide_leave)),
                    ),
            )
            .service(
                web::scope("/attendance")
                    // /attendance
                    .service(web::resource("").route(web::post().to(attendance::mark_attendance)))
                    // /attendance/stats
                    .service(
                        web::resource("/stats").route(web::get().to(attendance::attendance_stats)),
                    ),
            )
            .service(
                web::scope("/analytics")
                    .service(
                        web::resource("/leave-types").route(web::get().to(analytics::leave_types)),
                    )
                    .service(
                        web::resource("/low-attendance")
                            .route(web::get().to(analytics::low_attendance)),
                    )
                    .service(web::resource("/summary").route(web::get().to(analytics::summary))),
            ),
    );
}
