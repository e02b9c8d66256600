use crate::error::{AppError, AppResult};
use crate::services::DrawService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

/// 期号必须为正整数
pub(crate) fn parse_draw_no(raw: i32) -> AppResult<i32> {
    if raw < 1 {
        return Err(AppError::invalid(format!("draw number must be positive: {raw}")));
    }
    Ok(raw)
}

/// 手动同步指定一期的开奖号码
pub async fn sync_draw(service: web::Data<DrawService>, path: web::Path<i32>) -> Result<HttpResponse> {
    let draw_no = match parse_draw_no(path.into_inner()) {
        Ok(n) => n,
        Err(e) => return Ok(e.error_response()),
    };
    match service.sync_from_external_source(draw_no).await {
        Ok(draw) => {
            log::info!("Draw {draw_no} synced manually");
            Ok(HttpResponse::Ok().json(json!({ "success": true, "data": draw })))
        }
        Err(e) => Ok(e.error_response()),
    }
}

/// 最近一期已开奖的号码
pub async fn latest_draw(service: web::Data<DrawService>) -> Result<HttpResponse> {
    match service.latest_synced_draw().await {
        Ok(draw) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": draw }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn draw_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/draw")
            .route("/sync/{no}", web::post().to(sync_draw))
            .route("/latest", web::get().to(latest_draw)),
    );
}
