use crate::models::*;
use crate::services::RecommendService;
use crate::strategies::Strategy;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 生成推荐号码；strategy 为 all 时每种策略各一注
pub async fn create_recommend(
    service: web::Data<RecommendService>,
    body: web::Json<RecommendRequest>,
) -> Result<HttpResponse> {
    let params = match body.validate() {
        Ok(p) => p,
        Err(e) => return Ok(e.error_response()),
    };
    match service.recommend(&params).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

/// 可用策略列表
pub async fn list_strategies() -> Result<HttpResponse> {
    let list: Vec<StrategyInfo> = Strategy::ALL.into_iter().map(StrategyInfo::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "success": true, "data": list })))
}

pub async fn get_recommend(
    service: web::Data<RecommendService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    match service.get_by_id(&path.into_inner()).await {
        Ok(detail) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": detail }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn recommend_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/recommend")
            .route("", web::post().to(create_recommend))
            .route("/strategies", web::get().to(list_strategies))
            .route("/{id}", web::get().to(get_recommend)),
    );
}
