use super::draw::parse_draw_no;
use crate::services::EvaluationService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 评估指定一期的推荐与购买；重复调用只补写缺失的结果
pub async fn evaluate(
    service: web::Data<EvaluationService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let draw_no = match parse_draw_no(path.into_inner()) {
        Ok(n) => n,
        Err(e) => return Ok(e.error_response()),
    };
    match service.evaluate_all(draw_no).await {
        Ok(summary) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": summary }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub async fn rank_counts(
    service: web::Data<EvaluationService>,
    path: web::Path<i32>,
) -> Result<HttpResponse> {
    let draw_no = match parse_draw_no(path.into_inner()) {
        Ok(n) => n,
        Err(e) => return Ok(e.error_response()),
    };
    match service.rank_counts(draw_no).await {
        Ok(counts) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": counts }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn evaluate_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/evaluate")
            .route("/{no}", web::post().to(evaluate))
            .route("/{no}/ranks", web::get().to(rank_counts)),
    );
}
