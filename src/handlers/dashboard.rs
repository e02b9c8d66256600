use super::draw::parse_draw_no;
use crate::cache::DashboardCache;
use crate::error::AppResult;
use crate::models::DashboardKind;
use crate::services::DashboardService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

async fn load(
    service: &DashboardService,
    cache: &DashboardCache,
    kind: &str,
    raw_no: i32,
) -> AppResult<serde_json::Value> {
    let kind: DashboardKind = kind.parse()?;
    let draw_no = parse_draw_no(raw_no)?;
    if let Some(hit) = cache.get(kind, draw_no) {
        return Ok(hit);
    }
    // 未命中时现算并回填
    let value = service.compute(kind, draw_no).await?;
    cache.set(kind, draw_no, value.clone());
    Ok(value)
}

/// 看板数据：summary / ratio / distribution
pub async fn get_dashboard(
    service: web::Data<DashboardService>,
    cache: web::Data<DashboardCache>,
    path: web::Path<(String, i32)>,
) -> Result<HttpResponse> {
    let (kind, draw_no) = path.into_inner();
    match load(&service, &cache, &kind, draw_no).await {
        Ok(data) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": data }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn dashboard_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/dashboard").route("/{kind}/{no}", web::get().to(get_dashboard)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::*;
    use actix_web::{App, test};
    use chrono::Utc;

    #[actix_web::test]
    async fn test_cache_miss_is_computed_then_served_from_cache() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [1, 2, 3, 4, 5, 6], 7).await;
        let target = ctx.draws.prepare_target_round().await.unwrap();
        assert_eq!(target, 2);
        let cache = DashboardCache::new();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.dashboard.clone()))
                .app_data(web::Data::new(cache.clone()))
                .configure(dashboard_config),
        )
        .await;

        let req = test::TestRequest::get().uri("/dashboard/summary/2").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["purchaseCount"], 0);
        assert_eq!(cache.len(), 1);

        // 缓存命中时返回旧值
        ctx.purchases
            .save_purchases(target, Utc::now(), "MANUAL", &[ticket([1, 2, 3, 4, 5, 6])])
            .await
            .unwrap();
        let req = test::TestRequest::get().uri("/dashboard/summary/2").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["purchaseCount"], 0);
    }

    #[actix_web::test]
    async fn test_unknown_kind_is_rejected() {
        let ctx = TestContext::new().await;
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.dashboard.clone()))
                .app_data(web::Data::new(DashboardCache::new()))
                .configure(dashboard_config),
        )
        .await;
        let req = test::TestRequest::get().uri("/dashboard/heatmap/1").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
