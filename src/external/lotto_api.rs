use super::DrawSource;
use crate::config::LottoApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::FetchedDraw;
use crate::utils::uniq;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const MAIN_INFO_PATH: &str = "/selectMainInfo.do";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

#[derive(Debug, Deserialize)]
pub struct MainInfoResponse {
    pub data: Option<MainInfoData>,
}

#[derive(Debug, Deserialize)]
pub struct MainInfoData {
    pub result: Option<MainInfoResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainInfoResult {
    pub pst_lt_epst_info: Option<PublishedDraws>,
}

#[derive(Debug, Deserialize)]
pub struct PublishedDraws {
    #[serde(default)]
    pub lt645: Vec<Lt645Item>,
}

/// 6/45 开奖条目
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lt645Item {
    pub lt_epsd: i32,
    /// YYYYMMDD
    pub lt_rfl_ymd: String,
    pub tm1_wn_no: i64,
    pub tm2_wn_no: i64,
    pub tm3_wn_no: i64,
    pub tm4_wn_no: i64,
    pub tm5_wn_no: i64,
    pub tm6_wn_no: i64,
    pub bns_wn_no: i64,
}

impl Lt645Item {
    fn into_draw(self) -> AppResult<FetchedDraw> {
        let draw_date = NaiveDate::parse_from_str(&self.lt_rfl_ymd, "%Y%m%d").map_err(|e| {
            AppError::ExternalFetchFailed(format!(
                "draw {} has an invalid date {:?}: {e}",
                self.lt_epsd, self.lt_rfl_ymd
            ))
        })?;
        let to_number = |n: i64| {
            u8::try_from(n)
                .ok()
                .filter(|v| (1..=45).contains(v))
                .ok_or_else(|| {
                    AppError::ExternalFetchFailed(format!(
                        "draw {} has an invalid number {n}",
                        self.lt_epsd
                    ))
                })
        };
        let numbers = [
            to_number(self.tm1_wn_no)?,
            to_number(self.tm2_wn_no)?,
            to_number(self.tm3_wn_no)?,
            to_number(self.tm4_wn_no)?,
            to_number(self.tm5_wn_no)?,
            to_number(self.tm6_wn_no)?,
        ];
        let bonus = to_number(self.bns_wn_no)?;
        // 基本号与奖励号共 7 个互不相同
        if uniq(numbers.iter().copied().chain(std::iter::once(bonus))).len() != numbers.len() + 1 {
            return Err(AppError::ExternalFetchFailed(format!(
                "draw {} has duplicate numbers {numbers:?} + {bonus}",
                self.lt_epsd
            )));
        }
        Ok(FetchedDraw {
            draw_no: self.lt_epsd,
            draw_date,
            numbers,
            bonus,
        })
    }
}

/// 从主页信息接口的响应中取出 lt645 列表
pub fn published_draws(body: MainInfoResponse) -> AppResult<Vec<Lt645Item>> {
    let list = body
        .data
        .and_then(|d| d.result)
        .and_then(|r| r.pst_lt_epst_info)
        .map(|p| p.lt645)
        .unwrap_or_default();
    if list.is_empty() {
        return Err(AppError::DrawNotFound(
            "upstream returned no published draws".to_string(),
        ));
    }
    Ok(list)
}

pub fn find_draw(list: Vec<Lt645Item>, draw_no: i32) -> AppResult<FetchedDraw> {
    let latest = list.iter().map(|i| i.lt_epsd).max().unwrap_or_default();
    match list.into_iter().find(|i| i.lt_epsd == draw_no) {
        Some(item) => item.into_draw(),
        None => Err(AppError::DrawNotFound(format!(
            "draw {draw_no} (latest published: {latest})"
        ))),
    }
}

pub fn latest_draw(list: Vec<Lt645Item>) -> AppResult<FetchedDraw> {
    list.into_iter()
        .max_by_key(|i| i.lt_epsd)
        .ok_or_else(|| AppError::DrawNotFound("upstream returned no published draws".to_string()))?
        .into_draw()
}

/// 开奖方主页信息接口客户端
#[derive(Clone)]
pub struct LottoApiClient {
    client: Client,
    base_url: String,
}

impl LottoApiClient {
    pub fn new(config: &LottoApiConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::ConfigError(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_published(&self) -> AppResult<Vec<Lt645Item>> {
        let url = format!("{}{MAIN_INFO_PATH}", self.base_url);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::ExternalFetchFailed(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::ExternalFetchFailed(format!("HTTP {}", status.as_u16())));
        }
        let body: MainInfoResponse = resp
            .json()
            .await
            .map_err(|e| AppError::ExternalFetchFailed(format!("invalid response body: {e}")))?;
        published_draws(body)
    }
}

#[async_trait]
impl DrawSource for LottoApiClient {
    async fn fetch_draw(&self, draw_no: i32) -> AppResult<FetchedDraw> {
        let list = self.fetch_published().await?;
        find_draw(list, draw_no)
    }

    async fn fetch_latest(&self) -> AppResult<FetchedDraw> {
        let list = self.fetch_published().await?;
        latest_draw(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body() -> MainInfoResponse {
        serde_json::from_value(json!({
            "data": {
                "result": {
                    "pstLtEpstInfo": {
                        "lt645": [
                            {
                                "ltEpsd": 1204, "ltRflYmd": "20260103",
                                "tm1WnNo": 3, "tm2WnNo": 11, "tm3WnNo": 18,
                                "tm4WnNo": 25, "tm5WnNo": 33, "tm6WnNo": 42,
                                "bnsWnNo": 7
                            },
                            {
                                "ltEpsd": 1203, "ltRflYmd": "20251227",
                                "tm1WnNo": 1, "tm2WnNo": 2, "tm3WnNo": 3,
                                "tm4WnNo": 4, "tm5WnNo": 5, "tm6WnNo": 6,
                                "bnsWnNo": 45
                            }
                        ]
                    }
                }
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_find_requested_draw() {
        let draw = find_draw(published_draws(body()).unwrap(), 1204).unwrap();
        assert_eq!(draw.draw_no, 1204);
        assert_eq!(draw.draw_date, NaiveDate::from_ymd_opt(2026, 1, 3).unwrap());
        assert_eq!(draw.numbers, [3, 11, 18, 25, 33, 42]);
        assert_eq!(draw.bonus, 7);
    }

    #[test]
    fn test_missing_draw_reports_latest() {
        let err = find_draw(published_draws(body()).unwrap(), 1205).unwrap_err();
        assert!(matches!(err, AppError::DrawNotFound(msg) if msg.contains("latest published: 1204")));
    }

    #[test]
    fn test_latest_draw() {
        let draw = latest_draw(published_draws(body()).unwrap()).unwrap();
        assert_eq!(draw.draw_no, 1204);
    }

    #[test]
    fn test_empty_list_is_not_found() {
        let empty: MainInfoResponse = serde_json::from_value(json!({ "data": { "result": {} } })).unwrap();
        assert!(matches!(published_draws(empty), Err(AppError::DrawNotFound(_))));
    }

    #[test]
    fn test_bad_number_is_fetch_failure() {
        let mut item = published_draws(body()).unwrap().remove(0);
        item.bns_wn_no = 46;
        assert!(matches!(item.into_draw(), Err(AppError::ExternalFetchFailed(_))));
    }

    #[test]
    fn test_duplicate_numbers_are_fetch_failure() {
        let mut item = published_draws(body()).unwrap().remove(0);
        item.tm2_wn_no = item.tm1_wn_no;
        assert!(matches!(item.into_draw(), Err(AppError::ExternalFetchFailed(_))));

        let mut item = published_draws(body()).unwrap().remove(0);
        item.bns_wn_no = item.tm6_wn_no;
        assert!(matches!(item.into_draw(), Err(AppError::ExternalFetchFailed(_))));
    }
}
