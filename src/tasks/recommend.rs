use super::guard::{SingleFlight, TickOutcome};
use super::target_round::TargetRoundCache;
use crate::error::AppResult;
use crate::models::{FrequencyTable, TicketSet, WinningNumbers};
use crate::services::{DrawService, RecommendService};
use crate::strategies::{Strategy, StrategyEngine};
use crate::utils::is_recommendable;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

pub const MAX_TICKETS_PER_TICK: usize = 5;

/// 自动推荐的号码约束方式，由最近开奖历史推导
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintMode {
    None,
    /// 固定上期 1-2 个号码
    Repeat,
    /// 排除上期全部号码
    Fresh,
    /// 固定 1-2 个窗口内未出现的号码
    Dormant,
    /// 固定 1 个冷门号，排除 2-3 个热门号
    Mixed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Constraints {
    pub fixed: BTreeSet<u8>,
    pub exclude: BTreeSet<u8>,
}

impl ConstraintMode {
    pub const ALL: [ConstraintMode; 5] = [
        ConstraintMode::None,
        ConstraintMode::Repeat,
        ConstraintMode::Fresh,
        ConstraintMode::Dormant,
        ConstraintMode::Mixed,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ConstraintMode::None => "none",
            ConstraintMode::Repeat => "repeat",
            ConstraintMode::Fresh => "fresh",
            ConstraintMode::Dormant => "dormant",
            ConstraintMode::Mixed => "mixed",
        }
    }

    /// 无副作用；历史不足时相应约束为空
    pub fn derive<R: Rng + ?Sized>(
        self,
        last: Option<&WinningNumbers>,
        freq: &FrequencyTable,
        rng: &mut R,
    ) -> Constraints {
        let mut out = Constraints::default();
        match self {
            ConstraintMode::None => {}
            ConstraintMode::Repeat => {
                if let Some(last) = last {
                    let n = rng.gen_range(1..=2);
                    out.fixed.extend(last.numbers.choose_multiple(rng, n).copied());
                }
            }
            ConstraintMode::Fresh => {
                if let Some(last) = last {
                    out.exclude.extend(last.numbers);
                }
            }
            ConstraintMode::Dormant => {
                let dormant = freq.dormant();
                let n = rng.gen_range(1..=2);
                out.fixed.extend(dormant.choose_multiple(rng, n).copied());
            }
            ConstraintMode::Mixed => {
                if let Some(&n) = freq.dormant().choose(rng) {
                    out.fixed.insert(n);
                }
                let hot: Vec<u8> = freq.top(5).into_iter().map(|(n, _)| n).collect();
                let k = rng.gen_range(2..=3);
                out.exclude.extend(hot.choose_multiple(rng, k).copied());
            }
        }
        out
    }
}

/// 自动推荐：随机约束方式 + 每注随机策略，按策略分组各存一条批次
pub struct RecommendSimulator {
    draws: DrawService,
    engine: StrategyEngine,
    recommends: RecommendService,
    frequency_window: u64,
    target: TargetRoundCache,
    flight: SingleFlight,
}

impl RecommendSimulator {
    pub fn new(
        draws: DrawService,
        engine: StrategyEngine,
        recommends: RecommendService,
        frequency_window: u64,
    ) -> Self {
        Self {
            draws,
            engine,
            recommends,
            frequency_window,
            target: TargetRoundCache::new(),
            flight: SingleFlight::new(),
        }
    }

    pub async fn tick(&self, now: DateTime<Utc>) -> TickOutcome {
        let Some(_flight) = self.flight.try_enter() else {
            log::debug!("Recommend simulation still running, tick skipped");
            return TickOutcome::Busy;
        };
        if !is_recommendable(now) {
            return TickOutcome::OutsideWindow;
        }
        match self.run(now).await {
            Ok(n) => TickOutcome::Completed(n),
            Err(e) => {
                log::error!("Recommend simulation failed: {e:?}");
                TickOutcome::Failed
            }
        }
    }

    async fn run(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let target = self.target.get_or_prepare(&self.draws, now).await?;
        let last = self.draws.last_draw_numbers().await?;
        let window = self.draws.frequency_over_window(self.frequency_window).await?;
        let history = self.engine.history_for(&Strategy::ALL).await?;

        let (mode, constraints, grouped) = {
            let mut rng = StdRng::from_entropy();
            let mode = *ConstraintMode::ALL
                .choose(&mut rng)
                .unwrap_or(&ConstraintMode::None);
            let constraints = mode.derive(last.as_ref(), &window, &mut rng);
            let count = rng.gen_range(1..=MAX_TICKETS_PER_TICK);
            let mut grouped: BTreeMap<Strategy, Vec<TicketSet>> = BTreeMap::new();
            for _ in 0..count {
                let strategy = *Strategy::ALL.choose(&mut rng).unwrap_or(&Strategy::Random);
                let ticket =
                    strategy.generate(&constraints.fixed, &constraints.exclude, &history, &mut rng)?;
                grouped.entry(strategy).or_default().push(ticket);
            }
            (mode, constraints, grouped)
        };

        let mut total = 0;
        for (strategy, tickets) in grouped {
            let params = json!({
                "count": tickets.len(),
                "fixedNumbers": constraints.fixed,
                "excludeNumbers": constraints.exclude,
                "mode": mode.name(),
            });
            self.recommends
                .save_run(strategy, target, &tickets, params)
                .await?;
            total += tickets.len();
        }
        log::debug!(
            "Simulated {total} recommendations ({}) for draw {target}",
            mode.name()
        );
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::recommend_run_entity as runs;
    use crate::services::test_support::*;
    use crate::strategies::test_support::rng;
    use chrono::TimeZone;
    use sea_orm::EntityTrait;

    fn last() -> WinningNumbers {
        WinningNumbers {
            draw_no: 9,
            numbers: [3, 11, 18, 25, 33, 42],
            bonus: 7,
        }
    }

    #[test]
    fn test_repeat_fixes_numbers_from_last_draw() {
        let mut rng = rng(1);
        for _ in 0..50 {
            let c = ConstraintMode::Repeat.derive(Some(&last()), &FrequencyTable::empty(), &mut rng);
            assert!((1..=2).contains(&c.fixed.len()));
            assert!(c.fixed.iter().all(|n| last().numbers.contains(n)));
            assert!(c.exclude.is_empty());
        }
    }

    #[test]
    fn test_fresh_excludes_last_draw() {
        let c = ConstraintMode::Fresh.derive(Some(&last()), &FrequencyTable::empty(), &mut rng(1));
        assert_eq!(c.exclude, BTreeSet::from([3, 11, 18, 25, 33, 42]));
        assert!(c.fixed.is_empty());
        // 没有上期数据时不加约束
        let c = ConstraintMode::Fresh.derive(None, &FrequencyTable::empty(), &mut rng(1));
        assert_eq!(c, Constraints::default());
    }

    #[test]
    fn test_dormant_and_mixed_use_window() {
        let freq = FrequencyTable::from_numbers((1..=40).chain([1, 1, 2, 2, 3]));
        let mut rng = rng(4);
        for _ in 0..50 {
            let c = ConstraintMode::Dormant.derive(None, &freq, &mut rng);
            assert!((1..=2).contains(&c.fixed.len()));
            assert!(c.fixed.iter().all(|n| *n > 40));

            let c = ConstraintMode::Mixed.derive(None, &freq, &mut rng);
            assert_eq!(c.fixed.len(), 1);
            assert!(c.fixed.iter().all(|n| *n > 40));
            assert!((2..=3).contains(&c.exclude.len()));
            // top 5: 1, 2, 3, 4, 5
            assert!(c.exclude.iter().all(|n| *n <= 5));
            assert!(c.fixed.is_disjoint(&c.exclude));
        }
    }

    #[tokio::test]
    async fn test_tick_stores_runs_grouped_by_strategy() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [3, 11, 18, 25, 33, 42], 7).await;
        let sim = RecommendSimulator::new(
            ctx.draws.clone(),
            ctx.engine.clone(),
            ctx.recommends.clone(),
            20,
        );
        // 2026-01-07 12:00 KST（周三）
        let now = Utc.with_ymd_and_hms(2026, 1, 7, 3, 0, 0).unwrap();

        let TickOutcome::Completed(n) = sim.tick(now).await else {
            panic!("tick did not complete");
        };
        let stored = runs::Entity::find().all(&ctx.pool).await.unwrap();
        assert!(!stored.is_empty() && stored.len() <= n);
        let mut algorithms: Vec<&str> = stored.iter().map(|r| r.algorithm.as_str()).collect();
        algorithms.sort_unstable();
        algorithms.dedup();
        assert_eq!(algorithms.len(), stored.len(), "one run per strategy");
        assert!(stored.iter().all(|r| r.target_draw_no == 2));

        // 周日 05:00 KST 不推荐
        let sunday_early = Utc.with_ymd_and_hms(2026, 1, 10, 20, 0, 0).unwrap();
        assert_eq!(sim.tick(sunday_early).await, TickOutcome::OutsideWindow);
    }

    #[tokio::test]
    async fn test_tick_while_in_flight_is_a_no_op() {
        let ctx = TestContext::new().await;
        ctx.seed_draw(1, [3, 11, 18, 25, 33, 42], 7).await;
        let sim = RecommendSimulator::new(
            ctx.draws.clone(),
            ctx.engine.clone(),
            ctx.recommends.clone(),
            20,
        );
        let now = Utc.with_ymd_and_hms(2026, 1, 7, 3, 0, 0).unwrap();

        let held = sim.flight.try_enter().unwrap();
        assert_eq!(sim.tick(now).await, TickOutcome::Busy);
        assert!(runs::Entity::find().all(&ctx.pool).await.unwrap().is_empty());
        drop(held);
        assert!(matches!(sim.tick(now).await, TickOutcome::Completed(_)));
    }
}
