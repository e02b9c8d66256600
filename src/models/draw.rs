use crate::entities::draw_number_entity as draw_numbers;
use crate::models::TicketSet;
use crate::utils::{classify_rank, match_count};
use chrono::NaiveDate;
use serde::Serialize;

/// 奖励号所在位置
pub const BONUS_POS: i16 = 7;

/// 某期的开奖号码
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinningNumbers {
    pub draw_no: i32,
    pub numbers: [u8; 6],
    pub bonus: u8,
}

/// 单注评估结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    pub match_count: u8,
    pub bonus_match: bool,
    pub rank: u8,
}

impl WinningNumbers {
    /// pos 1..=7 缺一不可，否则视为未同步
    pub fn from_rows(draw_no: i32, rows: &[draw_numbers::Model]) -> Option<Self> {
        let mut slots = [None; 7];
        for row in rows.iter().filter(|r| r.draw_no == draw_no) {
            let idx = usize::try_from(row.pos).ok()?.checked_sub(1)?;
            if idx < slots.len() {
                slots[idx] = Some(u8::try_from(row.number).ok()?);
            }
        }
        let mut numbers = [0u8; 6];
        for (i, slot) in slots[..6].iter().enumerate() {
            numbers[i] = (*slot)?;
        }
        numbers.sort_unstable();
        Some(Self {
            draw_no,
            numbers,
            bonus: slots[6]?,
        })
    }

    pub fn score(&self, ticket: &TicketSet) -> Score {
        let matched = match_count(ticket.numbers(), &self.numbers);
        let bonus_match = ticket.contains(self.bonus);
        Score {
            match_count: matched,
            bonus_match,
            rank: classify_rank(matched, bonus_match),
        }
    }
}

/// 外部开奖数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDraw {
    pub draw_no: i32,
    pub draw_date: NaiveDate,
    pub numbers: [u8; 6],
    pub bonus: u8,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawResponse {
    pub draw_no: i32,
    pub draw_date: NaiveDate,
    /// 占位期为 false
    pub synced: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numbers: Option<[u8; 6]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bonus: Option<u8>,
}

impl DrawResponse {
    pub fn new(draw_no: i32, draw_date: NaiveDate, winning: Option<&WinningNumbers>) -> Self {
        Self {
            draw_no,
            draw_date,
            synced: winning.is_some(),
            numbers: winning.map(|w| w.numbers),
            bonus: winning.map(|w| w.bonus),
        }
    }
}
