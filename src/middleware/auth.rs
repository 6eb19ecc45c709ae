use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::{config::JwtSettings, services::auth_service, utils::AppError};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // netid
    pub iat: usize,
    pub exp: usize,
    pub aud: String,
    pub iss: String,
}

pub struct AuthMiddleware {
    settings: Rc<JwtSettings>,
}

impl AuthMiddleware {
    pub fn new(settings: JwtSettings) -> Self {
        Self {
            settings: Rc::new(settings),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            settings: self.settings.clone(),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    settings: Rc<JwtSettings>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.strip_prefix("Bearer ").map(str::to_string));

        let claims = match token {
            Some(Some(token)) => auth_service::verify_token(&token, &self.settings)
                .map_err(AppError::Unauthorized),
            Some(None) => Err(AppError::Unauthorized("Invalid token format".to_string())),
            None => Err(AppError::Unauthorized("Missing authorization token".to_string())),
        };

        match claims {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move {
                    let res = fut.await?;
                    Ok(res)
                })
            }
            Err(e) => {
                log::warn!("🔒 {} {} rejected: {}", req.method(), req.path(), e);
                Box::pin(async move { Err(e.into()) })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::auth_service::testing::{settings, token_for};
    use actix_web::{http::StatusCode, test, web, App, HttpResponse};

    async fn whoami(claims: web::ReqData<Claims>) -> HttpResponse {
        HttpResponse::Ok().body(claims.sub.clone())
    }

    #[actix_web::test]
    async fn test_valid_token_reaches_handler() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(settings()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token_for("jd123", &settings(), 600))))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, "jd123");
    }

    #[actix_web::test]
    async fn test_missing_and_malformed_tokens_are_rejected() {
        let app = test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(settings()))
                .route("/me", web::get().to(whoami)),
        )
        .await;

        for header in [None, Some("Token abc"), Some("Bearer not-a-jwt")] {
            let mut req = test::TestRequest::get().uri("/me");
            if let Some(h) = header {
                req = req.insert_header(("Authorization", h));
            }
            let err = test::try_call_service(&app, req.to_request())
                .await
                .err()
                .expect("request should be rejected");
            assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
        }
    }
}
