use crate::models::*;
use crate::services::PurchaseService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 登记购买；每注一条记录
pub async fn create_purchase(
    service: web::Data<PurchaseService>,
    body: web::Json<PurchaseRequest>,
) -> Result<HttpResponse> {
    let params = match body.validate() {
        Ok(p) => p,
        Err(e) => return Ok(e.error_response()),
    };
    match service.create_purchase(params).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn get_purchase(
    service: web::Data<PurchaseService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get_by_id(&path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": detail }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn purchase_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/purchase")
            .route("", web::post().to(create_purchase))
            .route("/{id}", web::get().to(get_purchase)),
    );
}
