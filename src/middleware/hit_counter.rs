/// File server hit counter
///
/// Counts every request under a path prefix (the static file mount) into the
/// shared `AdminState`.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error,
};
use futures::future::LocalBoxFuture;
use std::rc::Rc;

use crate::admin_state::AdminState;

pub struct HitCounter {
    prefix: String,
    state: web::Data<AdminState>,
}

impl HitCounter {
    pub fn new(prefix: impl Into<String>, state: web::Data<AdminState>) -> Self {
        Self {
            prefix: prefix.into(),
            state,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HitCounter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = HitCounterService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(HitCounterService {
            service: Rc::new(service),
            prefix: self.prefix.clone(),
            state: self.state.clone(),
        }))
    }
}

pub struct HitCounterService<S> {
    service: Rc<S>,
    prefix: String,
    state: web::Data<AdminState>,
}

impl<S, B> Service<ServiceRequest> for HitCounterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if req.path().starts_with(&self.prefix) {
            self.state.record_hit();
        }

        let service = self.service.clone();
        Box::pin(async move { service.call(req).await })
    }
}
