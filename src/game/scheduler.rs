//! # 음료 추첨 스케줄러 (Drink-Selection Scheduler)
//!
//! 게임이 시작되면 명단과 음료 목록을 그 순간 그대로 복사(`Snapshot`)하고,
//! `timer_minutes × 60`초마다 플레이어 한 명과 음료 하나를 무작위로 고릅니다.
//!
//! 시계와 난수는 모두 트레이트 뒤에 숨겨 둡니다.
//! - `Scheduler`: 반복 타이머를 건다. 운영에서는 `TokioScheduler`, 테스트에서는 수동 시계.
//! - `RandomSource`: 균등 난수. 운영에서는 `rand`, 테스트에서는 정해진 순서.
//!
//! 타이머는 틱마다 콜백(`Tick`)을 호출할 뿐이고, 추첨과 기록은 엔진이
//! 세션 잠금을 잡은 상태에서 수행합니다.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::models::{Drink, Player};

/// 틱 한 번에 실행되는 비동기 작업
pub type TickFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// 타이머가 틱마다 호출하는 콜백
pub type Tick = Arc<dyn Fn() -> TickFuture + Send + Sync>;

/// 걸어둔 반복 타이머의 핸들
///
/// `cancel`은 여러 번 불러도 됩니다. 핸들을 버리면(drop) 타이머도 멈춥니다.
pub trait TimerHandle: Send + Sync {
    fn cancel(&self);
}

/// 반복 타이머를 거는 쪽
pub trait Scheduler: Send + Sync {
    /// `period`마다 `tick`을 실행합니다. 첫 실행은 `period`가 지난 뒤입니다.
    fn schedule_every(&self, period: Duration, tick: Tick) -> Box<dyn TimerHandle>;
}

/// `0..len` 범위의 균등 난수를 주는 쪽
pub trait RandomSource: Send + Sync {
    /// `len`은 항상 1 이상으로 호출됩니다.
    fn pick(&self, len: usize) -> usize;
}

/// `rand::thread_rng()` 기반 난수
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// 게임 시작 시점의 명단과 음료 목록 (불변)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub players: Vec<Player>,
    pub drinks: Vec<Drink>,
}

impl Snapshot {
    pub fn new(players: Vec<Player>, drinks: Vec<Drink>) -> Self {
        Self { players, drinks }
    }

    /// 플레이어 하나, 음료 하나를 서로 독립적으로 뽑습니다.
    ///
    /// 어느 한 목록이라도 비어 있으면 `None`.
    pub fn draw(&self, random: &dyn RandomSource) -> Option<(&Player, &Drink)> {
        if self.players.is_empty() || self.drinks.is_empty() {
            return None;
        }

        let player = self.players.get(random.pick(self.players.len()))?;
        let drink = self.drinks.get(random.pick(self.drinks.len()))?;
        Some((player, drink))
    }
}

/// tokio 태스크 하나로 도는 반복 타이머
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn schedule_every(&self, period: Duration, tick: Tick) -> Box<dyn TimerHandle> {
        let handle = tokio::spawn(async move {
            // interval()은 첫 틱이 즉시 오므로, 한 주기 뒤부터 시작하는 interval_at을 씁니다.
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            // 틱 처리가 늦어져도 밀린 틱을 몰아서 쏘지 않습니다.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                tick().await;
            }
        });

        Box::new(TaskTimer(handle))
    }
}

struct TaskTimer(JoinHandle<()>);

impl TimerHandle for TaskTimer {
    fn cancel(&self) {
        self.0.abort();
    }
}

impl Drop for TaskTimer {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// 테스트용 수동 시계와 정해진 순서의 난수
#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// `advance`를 부를 때만 시간이 흐르는 스케줄러
    #[derive(Default)]
    pub struct ManualScheduler {
        timers: Mutex<Vec<ManualTimer>>,
    }

    struct ManualTimer {
        period: Duration,
        elapsed: Duration,
        tick: Tick,
        cancelled: Arc<AtomicBool>,
    }

    struct ManualHandle(Arc<AtomicBool>);

    impl TimerHandle for ManualHandle {
        fn cancel(&self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    impl Drop for ManualHandle {
        fn drop(&mut self) {
            self.cancel();
        }
    }

    impl Scheduler for ManualScheduler {
        fn schedule_every(&self, period: Duration, tick: Tick) -> Box<dyn TimerHandle> {
            let cancelled = Arc::new(AtomicBool::new(false));
            self.timers.lock().unwrap().push(ManualTimer {
                period,
                elapsed: Duration::ZERO,
                tick,
                cancelled: cancelled.clone(),
            });
            Box::new(ManualHandle(cancelled))
        }
    }

    impl ManualScheduler {
        /// 아직 취소되지 않은 타이머 수
        pub fn active(&self) -> usize {
            self.timers
                .lock()
                .unwrap()
                .iter()
                .filter(|t| !t.cancelled.load(Ordering::SeqCst))
                .count()
        }

        /// 시간을 `by`만큼 흘리고, 그동안 도래한 틱을 순서대로 실행합니다.
        pub async fn advance(&self, by: Duration) {
            let mut due: Vec<(Tick, Arc<AtomicBool>)> = Vec::new();
            {
                let mut timers = self.timers.lock().unwrap();
                timers.retain(|t| !t.cancelled.load(Ordering::SeqCst));
                for timer in timers.iter_mut() {
                    timer.elapsed += by;
                    while timer.elapsed >= timer.period {
                        timer.elapsed -= timer.period;
                        due.push((timer.tick.clone(), timer.cancelled.clone()));
                    }
                }
            }

            for (tick, cancelled) in due {
                if !cancelled.load(Ordering::SeqCst) {
                    tick().await;
                }
            }
        }
    }

    /// 취소를 무시하고 콜백을 계속 쥐고 있는 스케줄러
    ///
    /// 취소 직전에 이미 깨어난 타이머 태스크를 흉내 냅니다.
    #[derive(Default)]
    pub struct StickyScheduler {
        ticks: Mutex<Vec<Tick>>,
    }

    struct IgnoredHandle;

    impl TimerHandle for IgnoredHandle {
        fn cancel(&self) {}
    }

    impl Scheduler for StickyScheduler {
        fn schedule_every(&self, _period: Duration, tick: Tick) -> Box<dyn TimerHandle> {
            self.ticks.lock().unwrap().push(tick);
            Box::new(IgnoredHandle)
        }
    }

    impl StickyScheduler {
        /// 지금까지 건 모든 타이머의 콜백을 한 번씩 실행합니다.
        pub async fn fire_all(&self) {
            let ticks: Vec<Tick> = self.ticks.lock().unwrap().clone();
            for tick in ticks {
                tick().await;
            }
        }
    }

    /// 미리 정해 둔 인덱스를 차례로 돌려주는 난수. 다 쓰면 0.
    #[derive(Default)]
    pub struct ScriptedRandom {
        picks: Mutex<VecDeque<usize>>,
    }

    impl ScriptedRandom {
        pub fn new(picks: impl IntoIterator<Item = usize>) -> Self {
            Self {
                picks: Mutex::new(picks.into_iter().collect()),
            }
        }
    }

    impl RandomSource for ScriptedRandom {
        fn pick(&self, len: usize) -> usize {
            self.picks.lock().unwrap().pop_front().unwrap_or(0) % len
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn player(id: i64, name: &str) -> Player {
        Player {
            session_id: "s".to_string(),
            user_id: id,
            name: name.to_string(),
            joined_at: String::new(),
        }
    }

    fn drink(id: &str, name: &str) -> Drink {
        Drink {
            id: id.to_string(),
            session_id: "s".to_string(),
            name: name.to_string(),
            created_at: String::new(),
        }
    }

    fn counting_tick(counter: Arc<AtomicUsize>) -> Tick {
        Arc::new(move || -> TickFuture {
            let counter = counter.clone();
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
            })
        })
    }

    #[test]
    fn test_draw_uses_random_source_independently() {
        let snapshot = Snapshot::new(
            vec![player(1, "Ann"), player(2, "Boris")],
            vec![drink("a", "Beer"), drink("b", "Wine"), drink("c", "Gin")],
        );
        let random = ScriptedRandom::new([1, 2]);

        let (p, d) = snapshot.draw(&random).unwrap();
        assert_eq!(p.name, "Boris");
        assert_eq!(d.name, "Gin");
    }

    #[test]
    fn test_draw_skips_empty_snapshot() {
        let random = ScriptedRandom::default();
        assert!(Snapshot::new(vec![], vec![drink("a", "Beer")]).draw(&random).is_none());
        assert!(Snapshot::new(vec![player(1, "Ann")], vec![]).draw(&random).is_none());
    }

    #[test]
    fn test_thread_random_stays_in_range() {
        let random = ThreadRandom;
        for _ in 0..100 {
            assert!(random.pick(3) < 3);
        }
        assert_eq!(random.pick(1), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tokio_scheduler_fires_each_period_until_cancelled() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = TokioScheduler.schedule_every(Duration::from_secs(60), counting_tick(counter.clone()));

        tokio::time::sleep(Duration::from_secs(59)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        handle.cancel();
        handle.cancel();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_manual_scheduler_counts_whole_periods() {
        let scheduler = ManualScheduler::default();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule_every(Duration::from_secs(60), counting_tick(counter.clone()));

        scheduler.advance(Duration::from_secs(30)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        scheduler.advance(Duration::from_secs(150)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.active(), 1);

        drop(handle);
        assert_eq!(scheduler.active(), 0);
        scheduler.advance(Duration::from_secs(600)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
