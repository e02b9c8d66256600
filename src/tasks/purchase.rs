use super::guard::{SingleFlight, TickOutcome};
use super::target_round::TargetRoundCache;
use crate::error::AppResult;
use crate::models::TicketSet;
use crate::services::{DrawService, PurchaseService};
use crate::strategies::{Strategy, StrategyEngine};
use crate::utils::is_purchasable;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};

pub const MAX_TICKETS_PER_TICK: usize = 5;

/// 自动购买：每次生成 1..=5 注，每注随机选策略，按策略分组写入
pub struct PurchaseSimulator {
    draws: DrawService,
    engine: StrategyEngine,
    purchases: PurchaseService,
    target: TargetRoundCache,
    flight: SingleFlight,
}

impl PurchaseSimulator {
    pub fn new(draws: DrawService, engine: StrategyEngine, purchases: PurchaseService) -> Self {
        Self {
            draws,
            engine,
            purchases,
            target: TargetRoundCache::new(),
            flight: SingleFlight::new(),
        }
    }

    pub async fn tick(&self, now: DateTime<Utc>) -> TickOutcome {
        let Some(_flight) = self.flight.try_enter() else {
            log::debug!("Purchase simulation still running, tick skipped");
            return TickOutcome::Busy;
        };
        if !is_purchasable(now) {
            return TickOutcome::OutsideWindow;
        }
        match self.run(now).await {
            Ok(n) => TickOutcome::Completed(n),
            Err(e) => {
                log::error!("Purchase simulation failed: {e:?}");
                TickOutcome::Failed
            }
        }
    }

    async fn run(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let target = self.target.get_or_prepare(&self.draws, now).await?;
        let history = self.engine.history_for(&Strategy::ALL).await?;

        let grouped = {
            let mut rng = StdRng::from_entropy();
            let count = rng.gen_range(1..=MAX_TICKETS_PER_TICK);
            let none = BTreeSet::new();
            let mut grouped: BTreeMap<Strategy, Vec<TicketSet>> = BTreeMap::new();
            for _ in 0..count {
                let strategy = *Strategy::ALL.choose(&mut rng).unwrap_or(&Strategy::Random);
                let ticket = strategy.generate(&none, &none, &history, &mut rng)?;
                grouped.entry(strategy).or_default().push(ticket);
            }
            grouped
        };

        let mut total = 0;
        for (strategy, tickets) in grouped {
            self.purchases
                .save_purchases(target, now, strategy.name(), &tickets)
                .await?;
            total += tickets.len();
        }
        log::debug!("Simulated {total} purchases for draw {target}");
        Ok(total)
    }
}
