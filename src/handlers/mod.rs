pub mod auth;
pub mod bids;
pub mod gigs;
pub mod users;

use actix_web::web;

use crate::notify::session;

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    // ── Auth routes (protected by JWT via the AuthenticatedUser extractor) ──
    cfg.service(web::scope("/auth").route("/me", web::get().to(auth::me)));

    // ── User routes ──
    cfg.service(web::resource("/users/{id}").route(web::get().to(users::get_user)));

    // ── Gig routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/gigs")
            .route("", web::get().to(gigs::get_gigs))
            .route("", web::post().to(gigs::create_gig))
            .route("/my/posted", web::get().to(gigs::get_my_gigs))
            .route("/{id}", web::get().to(gigs::get_gig))
            .route("/{id}", web::put().to(gigs::update_gig))
            .route("/{id}", web::delete().to(gigs::delete_gig))
            .route("/{id}/bids", web::get().to(bids::get_bids_for_gig))
            .route("/{id}/bids", web::post().to(bids::create_bid)),
    );

    // ── Bid routes (all protected — require valid JWT) ──
    cfg.service(
        web::scope("/bids")
            .route("/my", web::get().to(bids::get_my_bids))
            .route("/{id}/hire", web::post().to(bids::hire_bid)),
    );

    // ── Notification WebSocket (authenticates via ?token=) ──
    cfg.service(web::resource("/notifications/ws").route(web::get().to(session::ws_connect)));
}
