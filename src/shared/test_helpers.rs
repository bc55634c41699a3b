#[cfg(test)]
use crate::features::auth::models::ApiCaller;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
#[allow(dead_code)]
pub fn create_test_caller() -> ApiCaller {
    ApiCaller {
        user_id: uuid::Uuid::from_u128(0xA11CE),
        key: "pbm_test_key".to_string(),
    }
}

#[cfg(test)]
#[allow(dead_code)]
async fn inject_caller_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_test_caller());
    next.run(request).await
}

#[cfg(test)]
#[allow(dead_code)]
pub fn with_caller_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_caller_middleware))
}
