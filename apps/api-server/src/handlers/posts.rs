//! Post handlers, including the visibility listing.

use std::collections::HashMap;

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use uuid::Uuid;

use quill_core::domain::{Post, PostStatus};
use quill_core::visibility::{PostFilter, VisibilityQuery};
use quill_shared::MsgBody;
use quill_shared::dto::{
    AuthorRef, CreatePostRequest, PostResponse, PostWithCommentsResponse, UpdatePostRequest,
    VisiblePostResponse, VisibleQuery,
};

use super::comments::comment_response;
use crate::middleware::auth::{Identity, MaybeIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(super) fn post_response(post: Post, usernames: &HashMap<Uuid, String>) -> PostResponse {
    let username = usernames.get(&post.user_id).cloned().unwrap_or_default();
    PostResponse {
        id: post.id,
        title: post.title,
        body: post.body,
        status: post.status.as_str().to_string(),
        slug: post.slug,
        user: AuthorRef {
            id: post.user_id,
            username,
        },
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

/// Look up the usernames needed to annotate a batch of posts.
pub(super) async fn author_usernames(
    state: &AppState,
    author_ids: impl Iterator<Item = Uuid>,
) -> AppResult<HashMap<Uuid, String>> {
    let mut ids: Vec<Uuid> = author_ids.collect();
    ids.sort_unstable();
    ids.dedup();
    Ok(state.users.find_usernames(&ids).await?)
}

fn parse_status(status: Option<&str>) -> AppResult<PostStatus> {
    match status {
        None => Ok(PostStatus::default()),
        Some(s) => PostStatus::parse(s)
            .ok_or_else(|| AppError::BadRequest("Status must be draft or published".to_string())),
    }
}

/// Translate the raw query string into a filter. Flags count as set only
/// for the literal string "true" (what the frontend sends); malformed
/// dates are rejected here rather than passed to the store.
fn parse_filter(query: VisibleQuery) -> AppResult<PostFilter> {
    fn flag(value: &Option<String>) -> bool {
        value.as_deref() == Some("true")
    }

    fn date(value: Option<String>, name: &str) -> AppResult<Option<NaiveDate>> {
        value
            .filter(|s| !s.is_empty())
            .map(|s| {
                NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                    AppError::BadRequest(format!("Invalid {name}, expected YYYY-MM-DD"))
                })
            })
            .transpose()
    }

    Ok(PostFilter {
        search: query.search,
        published_only: flag(&query.published_only),
        own_only: flag(&query.own_only),
        draft_only: flag(&query.draft_only),
        start_date: date(query.start_date, "startDate")?,
        end_date: date(query.end_date, "endDate")?,
    })
}

/// Apply a partial update: only supplied fields change, and the slug
/// follows the title.
fn apply_update(post: &mut Post, req: UpdatePostRequest) -> AppResult<()> {
    if let Some(title) = req.title {
        if title.trim().is_empty() {
            return Err(AppError::BadRequest("Title is required".to_string()));
        }
        post.set_title(title);
    }
    if let Some(body) = req.body {
        if body.trim().is_empty() {
            return Err(AppError::BadRequest("Body is required".to_string()));
        }
        post.body = body;
    }
    if let Some(status) = req.status {
        post.status = parse_status(Some(&status))?;
    }
    post.updated_at = chrono::Utc::now();
    Ok(())
}

/// GET /api/posts - published posts, newest first
pub async fn list_published(
    state: web::Data<AppState>,
    _identity: Identity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.find_published().await?;
    let usernames = author_usernames(&state, posts.iter().map(|p| p.user_id)).await?;

    let out: Vec<PostResponse> = posts
        .into_iter()
        .map(|p| post_response(p, &usernames))
        .collect();

    Ok(HttpResponse::Ok().json(out))
}

/// POST /api/posts - create a post owned by the caller
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }
    if req.body.trim().is_empty() {
        return Err(AppError::BadRequest("Body is required".to_string()));
    }
    let status = parse_status(req.status.as_deref())?;

    let post = Post::new(identity.user_id, req.title, req.body, status);
    // A duplicate slug trips the unique index and surfaces as 409
    let saved = state.posts.insert(post).await?;

    let usernames = author_usernames(&state, std::iter::once(saved.user_id)).await?;
    Ok(HttpResponse::Created().json(post_response(saved, &usernames)))
}

/// GET /api/posts/visible - the visibility query, optionally authenticated
pub async fn visible(
    state: web::Data<AppState>,
    identity: MaybeIdentity,
    query: web::Query<VisibleQuery>,
) -> AppResult<HttpResponse> {
    let uid = identity.0.map(|i| i.user_id);
    let filter = parse_filter(query.into_inner())?;
    let resolved = VisibilityQuery::resolve(uid, &filter);

    let posts = state.posts.find_visible(&resolved).await?;

    // One grouped aggregate for all comment counts, not a query per post
    let post_ids: Vec<Uuid> = posts.iter().map(|p| p.id).collect();
    let counts = state.comments.count_by_post_ids(&post_ids).await?;
    let usernames = author_usernames(&state, posts.iter().map(|p| p.user_id)).await?;

    let out: Vec<VisiblePostResponse> = posts
        .into_iter()
        .map(|p| {
            let is_owner = uid.is_some_and(|u| p.is_owned_by(u));
            let comment_count = counts.get(&p.id).copied().unwrap_or(0);
            VisiblePostResponse {
                is_owner,
                comment_count,
                post: post_response(p, &usernames),
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(out))
}

/// GET /api/posts/my-posts - the caller's posts in any status
pub async fn my_posts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.find_by_user_id(identity.user_id).await?;
    let usernames = author_usernames(&state, posts.iter().map(|p| p.user_id)).await?;

    let out: Vec<PostResponse> = posts
        .into_iter()
        .map(|p| post_response(p, &usernames))
        .collect();

    Ok(HttpResponse::Ok().json(out))
}

/// GET /api/posts/slug/{slug} - public post view with its comments
pub async fn by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_slug(&path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    let comments = state.comments.find_by_post_id(post.id).await?;

    let usernames = author_usernames(
        &state,
        std::iter::once(post.user_id).chain(comments.iter().map(|c| c.user_id)),
    )
    .await?;

    let comments = comments
        .into_iter()
        .map(|c| comment_response(c, &usernames))
        .collect();

    Ok(HttpResponse::Ok().json(PostWithCommentsResponse {
        post: post_response(post, &usernames),
        comments,
    }))
}

/// GET /api/posts/{id} - single post, published only
pub async fn get(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if post.status != PostStatus::Published {
        return Err(AppError::Forbidden);
    }

    let usernames = author_usernames(&state, std::iter::once(post.user_id)).await?;
    Ok(HttpResponse::Ok().json(post_response(post, &usernames)))
}

/// PUT /api/posts/{id} - partial update, owner only
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let mut post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !post.is_owned_by(identity.user_id) {
        return Err(AppError::Forbidden);
    }

    apply_update(&mut post, req)?;

    let saved = state.posts.update(post).await?;

    let usernames = author_usernames(&state, std::iter::once(saved.user_id)).await?;
    Ok(HttpResponse::Ok().json(post_response(saved, &usernames)))
}

/// DELETE /api/posts/{id} - owner only; comments cascade in the store
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_by_id(*path)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;

    if !post.is_owned_by(identity.user_id) {
        return Err(AppError::Forbidden);
    }

    state.posts.delete(post.id).await?;

    Ok(HttpResponse::Ok().json(MsgBody::new("Post deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_require_the_literal_string_true() {
        let filter = parse_filter(VisibleQuery {
            draft_only: Some("true".into()),
            published_only: Some("1".into()),
            own_only: Some("TRUE".into()),
            ..VisibleQuery::default()
        })
        .unwrap();

        assert!(filter.draft_only);
        assert!(!filter.published_only);
        assert!(!filter.own_only);
    }

    #[test]
    fn dates_parse_as_calendar_days() {
        let filter = parse_filter(VisibleQuery {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            ..VisibleQuery::default()
        })
        .unwrap();

        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn malformed_dates_are_rejected() {
        let result = parse_filter(VisibleQuery {
            start_date: Some("not-a-date".into()),
            ..VisibleQuery::default()
        });

        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn empty_date_params_are_ignored() {
        let filter = parse_filter(VisibleQuery {
            start_date: Some(String::new()),
            ..VisibleQuery::default()
        })
        .unwrap();

        assert_eq!(filter.start_date, None);
    }

    #[test]
    fn default_status_is_draft() {
        assert_eq!(parse_status(None).unwrap(), PostStatus::Draft);
        assert_eq!(
            parse_status(Some("published")).unwrap(),
            PostStatus::Published
        );
        assert!(parse_status(Some("archived")).is_err());
    }

    #[test]
    fn partial_update_leaves_unspecified_fields_unchanged() {
        let mut post = Post::new(
            Uuid::new_v4(),
            "First Title".into(),
            "original".into(),
            PostStatus::Published,
        );

        apply_update(
            &mut post,
            UpdatePostRequest {
                title: None,
                body: Some("rewritten".into()),
                status: None,
            },
        )
        .unwrap();

        assert_eq!(post.title, "First Title");
        assert_eq!(post.slug, "first-title");
        assert_eq!(post.body, "rewritten");
        assert_eq!(post.status, PostStatus::Published);
    }

    #[test]
    fn partial_update_title_regenerates_slug() {
        let mut post = Post::new(
            Uuid::new_v4(),
            "First Title".into(),
            "body".into(),
            PostStatus::Draft,
        );

        apply_update(
            &mut post,
            UpdatePostRequest {
                title: Some("Second Title".into()),
                body: None,
                status: None,
            },
        )
        .unwrap();

        assert_eq!(post.slug, "second-title");
        assert_eq!(post.body, "body");
    }

    #[test]
    fn partial_update_rejects_blank_fields() {
        let mut post = Post::new(
            Uuid::new_v4(),
            "Title".into(),
            "body".into(),
            PostStatus::Draft,
        );

        let result = apply_update(
            &mut post,
            UpdatePostRequest {
                title: Some("   ".into()),
                body: None,
                status: None,
            },
        );
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}

#[cfg(test)]
mod handler_tests {
    use std::sync::Arc;

    use actix_web::{App, http::StatusCode, test, web};
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use quill_core::ports::TokenService;
    use quill_infra::database::entity::post;
    use quill_infra::{JwtConfig, JwtTokenService};

    use super::{update, visible};
    use crate::state::AppState;

    fn post_model(user_id: Uuid, title: &str) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_owned(),
            body: "Body".to_owned(),
            status: "published".to_owned(),
            slug: "slug".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn token_service() -> Arc<dyn TokenService> {
        Arc::new(JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_owned(),
            expiration_hours: 1,
        }))
    }

    #[actix_web::test]
    async fn visible_marks_only_the_callers_posts_as_owned() {
        let uid = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // the listing, then the comment-count and username lookups
            .append_query_results(vec![vec![
                post_model(uid, "Mine"),
                post_model(Uuid::new_v4(), "Theirs"),
            ]])
            .append_query_results(vec![Vec::<post::Model>::new(), Vec::<post::Model>::new()])
            .into_connection();

        let tokens = token_service();
        let token = tokens.generate_token(uid).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(db)))
                .app_data(web::Data::new(tokens))
                .route("/posts/visible", web::get().to(visible)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/posts/visible")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body[0]["isOwner"], true);
        assert_eq!(body[1]["isOwner"], false);
    }

    #[actix_web::test]
    async fn visible_is_anonymous_without_a_token() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(Uuid::new_v4(), "Published")]])
            .append_query_results(vec![Vec::<post::Model>::new(), Vec::<post::Model>::new()])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(db)))
                .app_data(web::Data::new(token_service()))
                .route("/posts/visible", web::get().to(visible)),
        )
        .await;

        let req = test::TestRequest::get().uri("/posts/visible").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body[0]["isOwner"], false);
        // No stored comments means zero, not a missing field
        assert_eq!(body[0]["commentCount"], 0);
    }

    #[actix_web::test]
    async fn update_by_a_non_owner_is_forbidden() {
        let theirs = post_model(Uuid::new_v4(), "Theirs");
        let post_id = theirs.id;
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![theirs]])
            .into_connection();

        let tokens = token_service();
        let token = tokens.generate_token(Uuid::new_v4()).unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::new(db)))
                .app_data(web::Data::new(tokens))
                .route("/posts/{id}", web::put().to(update)),
        )
        .await;

        let req = test::TestRequest::put()
            .uri(&format!("/posts/{post_id}"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(serde_json::json!({ "body": "hijacked" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
