use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;

use super::jwt::{JwtUtils, TokenVerifyResult};
use crate::model::global_error::{AppError, ErrorCode};

pub struct AuthMiddleware;

// 미들웨어 팩토리
impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(user_id) => {
                // 핸들러에서는 web::ReqData<i32> 로 꺼낸다
                req.extensions_mut().insert(user_id);
                let fut = self.service.call(req);
                Box::pin(fut)
            }
            Err(err) => Box::pin(async move { Err(err.into()) }),
        }
    }
}

/// Authorization 헤더(Bearer) 또는 accessToken 쿠키에서 사용자 ID 를 꺼낸다.
fn authenticate(req: &ServiceRequest) -> Result<i32, AppError> {
    let jwt = req
        .app_data::<web::Data<JwtUtils>>()
        .ok_or_else(|| AppError::internal_error(ErrorCode::InternalError))?;

    let bearer = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::to_string);

    let token = bearer
        .or_else(|| req.cookie("accessToken").map(|cookie| cookie.value().to_string()))
        .ok_or_else(|| AppError::unauthorized(ErrorCode::AuthenticationFailed))?;

    match jwt.verify_token(&token) {
        TokenVerifyResult::Valid(claims) => claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized(ErrorCode::InvalidAuthToken)),
        TokenVerifyResult::Expired => Err(AppError::unauthorized(ErrorCode::ExpiredAuthToken)),
        TokenVerifyResult::Invalid => Err(AppError::unauthorized(ErrorCode::InvalidAuthToken)),
    }
}
