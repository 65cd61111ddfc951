//! HTTP handlers and route configuration.

mod admin;
mod auth;
mod comments;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(auth::signup))
                    .route("/signin", web::post().to(auth::signin))
                    .route("/profile", web::get().to(auth::profile))
                    .route("/profile", web::put().to(auth::update_profile))
                    .route("/change-password", web::put().to(auth::change_password)),
            )
            // Post routes; literal paths registered before the {id} catch-all
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_published))
                    .route("", web::post().to(posts::create))
                    .route("/visible", web::get().to(posts::visible))
                    .route("/my-posts", web::get().to(posts::my_posts))
                    .route("/slug/{slug}", web::get().to(posts::by_slug))
                    .route("/{id}", web::get().to(posts::get))
                    .route("/{id}", web::put().to(posts::update))
                    .route("/{id}", web::delete().to(posts::delete)),
            )
            // Comment routes
            .service(
                web::scope("/comments")
                    .route("/{post_id}", web::post().to(comments::create))
                    .route("/{post_id}", web::get().to(comments::list)),
            )
            // Moderation routes
            .service(
                web::scope("/admin")
                    .route("/posts", web::get().to(admin::list_posts))
                    .route("/users", web::get().to(admin::list_users))
                    .route("/posts/{id}", web::delete().to(admin::delete_post))
                    .route("/comments/{id}", web::delete().to(admin::delete_comment)),
            ),
    );
}
