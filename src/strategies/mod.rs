//! 选号策略
//!
//! 每个策略满足同一约定：结果恰好 6 个互不相同的 1..=45，包含全部固定号，
//! 不含任何排除号，升序返回。固定号与排除号不相交由调用方保证。

mod consecutive;
mod even_odd;
mod frequency;
mod hot_cold;
mod random;
mod sum_range;

pub use frequency::selection_weights;

use crate::error::{AppError, AppResult};
use crate::models::{FrequencyTable, TicketSet};
use crate::services::DrawService;
use crate::utils::TICKET_SIZE;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// 频率类策略默认统计最近 50 期
pub const DEFAULT_FREQUENCY_WINDOW: u64 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    Random,
    EvenOdd,
    SumRange,
    Consecutive,
    Frequency,
    HotCold,
}

impl Strategy {
    pub const ALL: [Strategy; 6] = [
        Strategy::Random,
        Strategy::EvenOdd,
        Strategy::SumRange,
        Strategy::Consecutive,
        Strategy::Frequency,
        Strategy::HotCold,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Random => "random",
            Strategy::EvenOdd => "evenOdd",
            Strategy::SumRange => "sumRange",
            Strategy::Consecutive => "consecutive",
            Strategy::Frequency => "frequency",
            Strategy::HotCold => "hotCold",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Strategy::Random => "Uniform random pick from the remaining pool",
            Strategy::EvenOdd => "Exactly three odd and three even numbers",
            Strategy::SumRange => "Random ticket whose sum lies between 100 and 200",
            Strategy::Consecutive => "Contains at least one consecutive pair",
            Strategy::Frequency => "Weighted by occurrences over the last 50 draws",
            Strategy::HotCold => "Four hot and two cold numbers over the last 50 draws",
        }
    }

    /// 是否需要历史开奖频率
    pub fn needs_history(self) -> bool {
        matches!(self, Strategy::Frequency | Strategy::HotCold)
    }

    pub fn generate<R: Rng + ?Sized>(
        self,
        fixed: &BTreeSet<u8>,
        exclude: &BTreeSet<u8>,
        history: &FrequencyTable,
        rng: &mut R,
    ) -> AppResult<TicketSet> {
        if fixed.len() > TICKET_SIZE {
            return Err(AppError::GenerationFailed(format!(
                "{self}: {} fixed numbers exceed a ticket",
                fixed.len()
            )));
        }
        let numbers = match self {
            Strategy::Random => random::generate(fixed, exclude, rng)?,
            Strategy::EvenOdd => even_odd::generate(fixed, exclude, rng)?,
            Strategy::SumRange => sum_range::generate(fixed, exclude, rng)?,
            Strategy::Consecutive => consecutive::generate(fixed, exclude, rng)?,
            Strategy::Frequency => frequency::generate(fixed, exclude, history, rng)?,
            Strategy::HotCold => hot_cold::generate(fixed, exclude, history, rng)?,
        };
        TicketSet::new(numbers)
            .ok_or_else(|| AppError::GenerationFailed(format!("{self}: produced an invalid ticket")))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Strategy::ALL
            .into_iter()
            .find(|st| st.name() == s)
            .ok_or_else(|| AppError::invalid(format!("unknown strategy: {s}")))
    }
}

/// 请求层的策略选择，`all` 表示每个策略各生成一注
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategySelection {
    All,
    One(Strategy),
}

impl StrategySelection {
    pub fn strategies(self) -> Vec<Strategy> {
        match self {
            StrategySelection::All => Strategy::ALL.to_vec(),
            StrategySelection::One(s) => vec![s],
        }
    }
}

impl FromStr for StrategySelection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(StrategySelection::All);
        }
        s.parse().map(StrategySelection::One)
    }
}

fn pool_exhausted(strategy: Strategy, need: usize, available: usize) -> AppError {
    AppError::GenerationFailed(format!(
        "{strategy}: need {need} more numbers but only {available} candidates remain"
    ))
}

/// 选号引擎：按需加载历史频率后调用策略
#[derive(Clone)]
pub struct StrategyEngine {
    draws: DrawService,
    window: u64,
}

impl StrategyEngine {
    pub fn new(draws: DrawService) -> Self {
        Self {
            draws,
            window: DEFAULT_FREQUENCY_WINDOW,
        }
    }

    /// 只有频率类策略才查询历史
    pub async fn history_for(&self, strategies: &[Strategy]) -> AppResult<FrequencyTable> {
        if strategies.iter().any(|s| s.needs_history()) {
            self.draws.frequency_over_window(self.window).await
        } else {
            Ok(FrequencyTable::empty())
        }
    }

    pub async fn generate_many(
        &self,
        strategy: Strategy,
        count: usize,
        fixed: &BTreeSet<u8>,
        exclude: &BTreeSet<u8>,
    ) -> AppResult<Vec<TicketSet>> {
        let history = self.history_for(&[strategy]).await?;
        let mut rng = StdRng::from_entropy();
        (0..count)
            .map(|_| strategy.generate(fixed, exclude, &history, &mut rng))
            .collect()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// 检查通用约定
    pub fn assert_contract(ticket: &TicketSet, fixed: &BTreeSet<u8>, exclude: &BTreeSet<u8>) {
        let nums = ticket.numbers();
        assert!(nums.windows(2).all(|w| w[0] < w[1]), "not sorted/distinct: {ticket}");
        assert!(nums.iter().all(|n| (1..=45).contains(n)), "out of range: {ticket}");
        assert!(fixed.iter().all(|n| ticket.contains(*n)), "missing fixed: {ticket}");
        assert!(!exclude.iter().any(|n| ticket.contains(*n)), "excluded present: {ticket}");
    }

    pub fn rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// 一组覆盖常见情况的 (fixed, exclude)
    pub fn constraint_cases() -> Vec<(BTreeSet<u8>, BTreeSet<u8>)> {
        vec![
            (BTreeSet::new(), BTreeSet::new()),
            (BTreeSet::from([7]), BTreeSet::new()),
            (BTreeSet::from([1, 45]), BTreeSet::from([2, 3, 44])),
            (BTreeSet::from([10, 20, 30]), (31..=40).collect()),
            (BTreeSet::new(), (1..=20).collect()),
            (BTreeSet::from([2, 4, 6]), BTreeSet::from([8, 10, 12, 14])),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_every_strategy_honours_contract() {
        let history = FrequencyTable::from_numbers((1..=45).chain([7, 7, 7, 13, 13]));
        let mut rng = rng(42);
        for strategy in Strategy::ALL {
            for (fixed, exclude) in constraint_cases() {
                for _ in 0..50 {
                    let ticket = strategy
                        .generate(&fixed, &exclude, &history, &mut rng)
                        .unwrap_or_else(|e| panic!("{strategy} failed on {fixed:?}/{exclude:?}: {e}"));
                    assert_contract(&ticket, &fixed, &exclude);
                }
            }
        }
    }

    #[test]
    fn test_fully_fixed_ticket_is_returned_as_is() {
        let fixed: BTreeSet<u8> = [1, 2, 3, 4, 5, 6].into();
        let history = FrequencyTable::empty();
        let mut rng = rng(1);
        for strategy in [Strategy::Random, Strategy::Frequency, Strategy::HotCold] {
            let ticket = strategy
                .generate(&fixed, &BTreeSet::new(), &history, &mut rng)
                .unwrap();
            assert_eq!(ticket.numbers(), &[1, 2, 3, 4, 5, 6]);
        }
    }

    #[test]
    fn test_too_many_fixed_numbers_fail() {
        let fixed: BTreeSet<u8> = (1..=7).collect();
        let err = Strategy::Random
            .generate(&fixed, &BTreeSet::new(), &FrequencyTable::empty(), &mut rng(1))
            .unwrap_err();
        assert!(matches!(err, AppError::GenerationFailed(_)));
    }

    #[test]
    fn test_names_round_trip() {
        for strategy in Strategy::ALL {
            assert_eq!(strategy.name().parse::<Strategy>().unwrap(), strategy);
            assert_eq!(
                serde_json::to_value(strategy).unwrap(),
                serde_json::json!(strategy.name())
            );
        }
        assert_eq!("all".parse::<StrategySelection>().unwrap(), StrategySelection::All);
        assert!("all".parse::<Strategy>().is_err());
        assert_eq!(StrategySelection::All.strategies().len(), 6);
    }

    #[test]
    fn test_only_frequency_strategies_need_history() {
        let needing: Vec<Strategy> = Strategy::ALL.into_iter().filter(|s| s.needs_history()).collect();
        assert_eq!(needing, vec![Strategy::Frequency, Strategy::HotCold]);
    }
}
