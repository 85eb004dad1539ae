//! REST API definitions.

pub mod auth;
pub mod brief;
pub mod catalog;
pub mod dashboard;
pub mod image;
pub mod owner;
pub mod promotion;
pub mod property;
pub mod room;

use std::path;

use axum::{
    extract::{FromRequest, FromRequestParts},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use serde::Serialize;

use crate::{define_error, Error};

/// Name of the [`tracing::Span`] for the REST API calls.
const SPAN_NAME: &str = "REST API call";

/// JSON request body extractor and response, rejecting with an [`Error`].
#[derive(Clone, Copy, Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(Error))]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

/// Path parameters extractor, rejecting with an [`Error`].
#[derive(Clone, Copy, Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);

/// Query parameters extractor, rejecting with an [`Error`].
#[derive(Clone, Copy, Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Error))]
pub struct Query<T>(pub T);

/// Response of a created entity.
#[derive(Clone, Copy, Debug)]
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (http::StatusCode::CREATED, axum::Json(self.0)).into_response()
    }
}

/// Response of an operation having no result.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Success {
    /// Always `true`.
    success: bool,
}

impl Success {
    /// Creates a new [`Success`].
    #[must_use]
    pub const fn new() -> Self {
        Self { success: true }
    }
}

impl Default for Success {
    fn default() -> Self {
        Self::new()
    }
}

define_error! {
    enum StateError {
        #[code = "STALE_STATE"]
        #[status = CONFLICT]
        #[message = "Flag has been changed by someone else, reload and \
                     retry"]
        Stale,
    }
}

/// Creates the [`Router`] of the whole REST API.
///
/// Uploaded images of up to `max_image_size` bytes are stored into and
/// served from the provided `images_root`.
pub fn router(
    images_root: impl AsRef<path::Path>,
    max_image_size: usize,
) -> Router {
    let admin = Router::new()
        .route("/owners", get(owner::list).post(owner::create))
        .route("/owners/:id", put(owner::update))
        .route("/properties", get(property::list).post(property::create))
        .route(
            "/properties/:id",
            get(property::show)
                .put(property::update)
                .delete(property::delete),
        )
        .route("/properties/:id/toggle", put(property::toggle))
        .route(
            "/properties/:id/rooms",
            get(room::list).post(room::create),
        )
        .route("/rooms/:id", put(room::update).delete(room::delete))
        .route("/rooms/:id/toggle", put(room::toggle))
        .route(
            "/promotions",
            get(promotion::list).post(promotion::create),
        )
        .route(
            "/promotions/:id",
            put(promotion::update).delete(promotion::delete),
        );

    Router::new()
        .route("/catalog/categories", get(catalog::categories))
        .route("/catalog/properties", get(catalog::list))
        .route("/catalog/properties/:id", get(catalog::show))
        .route("/catalog/properties/:id/views", post(catalog::view))
        .route("/catalog/properties/:id/contact", post(catalog::contact))
        .route("/briefs", post(brief::submit))
        .route("/auth/owner", post(auth::owner))
        .route("/auth/admin", post(auth::admin))
        .route("/dashboard", get(dashboard::show))
        .nest("/images", image::router(images_root, max_image_size))
        .nest("/admin", admin)
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use axum::{body::Body, Extension, Router};
    use http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use service::domain::{
        session::{ExpirationDateTime, Subject},
        Session,
    };
    use tower::ServiceExt as _;

    use crate::Service;

    /// [`Router`] over an in-memory [`Service`].
    struct App {
        router: Router,
        service: Service,
    }

    impl App {
        fn new() -> Self {
            let service = Service::in_memory();
            let router = super::router(std::env::temp_dir(), 1024)
                .layer(Extension(service.clone()));
            Self { router, service }
        }

        fn token(&self, subject: Subject) -> String {
            let session = Session {
                subject,
                expires_at: ExpirationDateTime::now()
                    + Duration::from_secs(60 * 60),
            };
            jsonwebtoken::encode(
                &jsonwebtoken::Header::default(),
                &session,
                &self.service.config().jwt_encoding_key,
            )
            .unwrap()
        }

        fn admin(&self) -> String {
            self.token(Subject::Admin(1.into()))
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut req = Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                req = req
                    .header(header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let req = match body {
                Some(body) => req
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string())),
                None => req.body(Body::empty()),
            }
            .unwrap();

            let resp = self.router.clone().oneshot(req).await.unwrap();
            let status = resp.status();
            let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
                .await
                .unwrap();
            (status, serde_json::from_slice(&bytes).unwrap())
        }

        async fn create_property(&self, is_published: bool) -> i64 {
            let (status, body) = self
                .call(
                    Method::POST,
                    "/admin/properties",
                    Some(&self.admin()),
                    Some(json!({
                        "category": "apartment",
                        "name": "Loft",
                        "address": "Тверская, 25",
                        "price_per_hour": 3000,
                        "is_published": is_published,
                    })),
                )
                .await;
            assert_eq!(status, StatusCode::CREATED, "{body}");
            body["id"].as_i64().unwrap()
        }
    }

    #[tokio::test]
    async fn requires_authorization() {
        let app = App::new();

        let (status, body) =
            app.call(Method::GET, "/admin/owners", None, None).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "AUTHORIZATION_REQUIRED");
    }

    #[tokio::test]
    async fn rejects_garbage_token() {
        let app = App::new();

        let (status, body) = app
            .call(Method::GET, "/admin/owners", Some("a.b.c"), None)
            .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn serves_admin_with_issued_token() {
        let app = App::new();
        let (status, created) = app
            .call(
                Method::POST,
                "/admin/owners",
                Some(&app.admin()),
                Some(json!({
                    "username": "owner1",
                    "password": "secret",
                    "full_name": "Иван Петров",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{created}");

        let (status, body) = app
            .call(Method::GET, "/admin/owners", Some(&app.admin()), None)
            .await;

        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["owners"][0]["id"], created["id"]);
        assert_eq!(body["owners"][0]["username"], "owner1");
    }

    #[tokio::test]
    async fn forbids_admin_routes_to_owner() {
        let app = App::new();
        let (_, created) = app
            .call(
                Method::POST,
                "/admin/owners",
                Some(&app.admin()),
                Some(json!({
                    "username": "owner2",
                    "password": "secret",
                    "full_name": "Иван Петров",
                })),
            )
            .await;
        let owner_id = i32::try_from(created["id"].as_i64().unwrap()).unwrap();
        let token = app.token(Subject::Owner(owner_id.into()));

        let (status, body) = app
            .call(Method::GET, "/admin/owners", Some(&token), None)
            .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    #[tokio::test]
    async fn rejects_stale_toggle() {
        let app = App::new();
        let id = app.create_property(false).await;

        let (status, body) = app
            .call(
                Method::PUT,
                &format!("/admin/properties/{id}/toggle"),
                Some(&app.admin()),
                Some(json!({"flag": "published", "current": true})),
            )
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "STALE_STATE");
    }

    #[tokio::test]
    async fn keeps_property_with_rooms() {
        let app = App::new();
        let id = app.create_property(false).await;
        let (status, room) = app
            .call(
                Method::POST,
                &format!("/admin/properties/{id}/rooms"),
                Some(&app.admin()),
                Some(json!({"name": "Люкс", "price_per_hour": 1500})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{room}");

        let (status, body) = app
            .call(
                Method::DELETE,
                &format!("/admin/properties/{id}"),
                Some(&app.admin()),
                None,
            )
            .await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "HAS_ROOMS");
    }

    #[tokio::test]
    async fn reports_missing_contact() {
        let app = App::new();
        let id = app.create_property(true).await;

        let (status, body) = app
            .call(
                Method::POST,
                &format!("/catalog/properties/{id}/contact"),
                None,
                None,
            )
            .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NO_CONTACT");
    }
}
