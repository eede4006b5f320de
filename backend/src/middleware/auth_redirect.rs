//! Boundary redirect for unauthenticated page traffic.
//!
//! Any request without a `username` cookie whose path is not an auth page,
//! the auth API, a health probe, or the revenue API is sent to the signup
//! page. The policy is a pure function of cookie presence and path; the
//! JSON endpoints answer 401 themselves instead of redirecting.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header;
use actix_web::{Error, HttpMessage, HttpResponse};
use futures_util::future::{LocalBoxFuture, Ready, ready};

use crate::inbound::http::session::USERNAME_COOKIE;

/// Path unauthenticated visitors are redirected to.
pub const SIGNUP_PATH: &str = "/signup";

const OPEN_PREFIXES: [&str; 5] = ["/auth", "/login", "/signup", "/health", "/revenue"];

/// Whether `path` is gated behind an authenticated session.
pub(crate) fn requires_session(path: &str) -> bool {
    !OPEN_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

/// Middleware redirecting unauthenticated requests to the signup page.
#[derive(Clone)]
pub struct AuthRedirect;

impl<S, B> Transform<S, ServiceRequest> for AuthRedirect
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthRedirectMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthRedirectMiddleware { service }))
    }
}

/// Service wrapper produced by [`AuthRedirect`].
pub struct AuthRedirectMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthRedirectMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let authenticated = req.cookie(USERNAME_COOKIE).is_some();
        if !authenticated && requires_session(req.path()) {
            let (request, _payload) = req.into_parts();
            let response = HttpResponse::TemporaryRedirect()
                .insert_header((header::LOCATION, SIGNUP_PATH))
                .finish()
                .map_into_right_body();
            return Box::pin(ready(Ok(ServiceResponse::new(request, response))));
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
    }
}
