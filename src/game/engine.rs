//! # 세션 엔진 (Session Engine)
//!
//! 상태 기계(`state`)와 추첨 스케줄러(`scheduler`)를 묶어
//! 채팅 어댑터가 호출하는 연산(시작, 정지, 나가기, 참가, 설정 입력 등)을 제공합니다.
//!
//! ## 직렬화
//! 저장소 호출은 모두 `.await`에서 멈출 수 있으므로, 같은 채팅방에 대한 두 요청이
//! 섞여 실행되면 "입력 대기 모드는 하나", "타이머는 최대 하나" 같은 규칙이 깨질 수 있습니다.
//! 그래서 채팅방마다 `tokio::sync::Mutex`(FIFO 순서로 깨어남)를 하나 두고,
//! 상태를 바꾸는 연산과 타이머 틱은 모두 이 잠금을 잡은 채로 끝까지 실행합니다.
//! 서로 다른 채팅방은 서로 기다리지 않습니다.
//!
//! 잠금 슬롯은 필요할 때 만들고, 타이머도 없고 기다리는 요청도 없으면 잠금을 놓을 때 지웁니다.
//! 세션이 없는 채팅방 ID로 요청이 몰려도 슬롯 표는 커지지 않습니다.
//!
//! ## 실행 중 타이머 표
//! 채팅방 ID → 타이머 핸들 표는 전역 변수가 아니라 엔진이 소유합니다.
//! 타이머마다 세대 번호(generation)를 붙이고, 틱은 자기 세대가 아직 현재인지 확인한 뒤에만 추첨합니다.
//! 정지/나가기가 반환된 뒤에는 그 채팅방에서 추첨이 일어나지 않습니다.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::sync::{mpsc, Mutex as AsyncMutex, OwnedMutexGuard}; // 비동기 Mutex: 잠금을 잡은 채로 .await 가능

use crate::config::{GameConfig, TIMER_MINUTES_CEILING};
use crate::db;
use crate::error::AppError;
use crate::game::scheduler::{
    RandomSource, Scheduler, Snapshot, ThreadRandom, Tick, TickFuture, TimerHandle, TokioScheduler,
};
use crate::game::state::{self, TextCommand};
use crate::models::*;

/// 게임 시작 결과: 추첨에 쓰일 스냅샷을 그대로 보여줍니다.
#[derive(Debug, Clone, Serialize)]
pub struct StartedGame {
    pub session_id: String,
    pub timer_minutes: i64,
    pub players: Vec<Player>,
    pub drinks: Vec<Drink>,
}

/// 자유 텍스트 처리 결과
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TextOutcome {
    DrinkAdded { drink: Drink },
    TimerSet { minutes: i64 },
}

/// 채팅방 하나의 프로세스 내 상태 (DB에 저장되지 않음)
#[derive(Default)]
struct SessionSlot {
    timer: Option<RunningTimer>,
}

struct RunningTimer {
    generation: u64,
    handle: Box<dyn TimerHandle>,
}

impl SessionSlot {
    /// 걸려 있는 타이머를 끕니다. 없으면 아무 일도 하지 않습니다.
    fn cancel_timer(&mut self) -> bool {
        match self.timer.take() {
            Some(timer) => {
                timer.handle.cancel();
                true
            }
            None => false,
        }
    }
}

type SlotMap = Mutex<HashMap<i64, Arc<AsyncMutex<SessionSlot>>>>;

/// 채팅방 잠금을 잡고 있는 동안의 핸들
///
/// 놓을 때(drop) 타이머가 없고 이 슬롯을 기다리는 요청도 없으면 표에서 지웁니다.
/// 슬롯을 얻는 일은 항상 표의 잠금 안에서 일어나므로,
/// 표의 잠금을 잡고 센 참조 수는 그 사이에 늘어날 수 없습니다.
struct SlotLock<'a> {
    slots: &'a SlotMap,
    chat_id: i64,
    slot: Arc<AsyncMutex<SessionSlot>>,
    guard: OwnedMutexGuard<SessionSlot>,
}

impl Deref for SlotLock<'_> {
    type Target = SessionSlot;

    fn deref(&self) -> &SessionSlot {
        &self.guard
    }
}

impl DerefMut for SlotLock<'_> {
    fn deref_mut(&mut self) -> &mut SessionSlot {
        &mut self.guard
    }
}

impl Drop for SlotLock<'_> {
    fn drop(&mut self) {
        if self.guard.timer.is_some() {
            return;
        }

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // 참조는 표, `self.slot`, guard 안의 Arc 셋. 그보다 많으면 누군가 기다리는 중입니다.
        let idle = Arc::strong_count(&self.slot) == 3
            && slots
                .get(&self.chat_id)
                .is_some_and(|s| Arc::ptr_eq(s, &self.slot));
        if idle {
            slots.remove(&self.chat_id);
        }
    }
}

/// 틱 하나가 추첨에 필요한 모든 것
struct DrawContext {
    chat_id: i64,
    session_id: String,
    generation: u64,
    snapshot: Snapshot,
}

pub struct GameEngine {
    pool: SqlitePool,
    config: GameConfig,
    scheduler: Arc<dyn Scheduler>,
    random: Arc<dyn RandomSource>,
    notices: mpsc::UnboundedSender<DrawNotice>,
    slots: SlotMap,
    next_generation: AtomicU64,
}

impl GameEngine {
    /// tokio 타이머와 `rand` 난수를 쓰는 엔진을 만듭니다.
    pub fn new(
        pool: SqlitePool,
        config: GameConfig,
        notices: mpsc::UnboundedSender<DrawNotice>,
    ) -> Arc<Self> {
        Self::with_parts(
            pool,
            config,
            Arc::new(TokioScheduler),
            Arc::new(ThreadRandom),
            notices,
        )
    }

    pub fn with_parts(
        pool: SqlitePool,
        config: GameConfig,
        scheduler: Arc<dyn Scheduler>,
        random: Arc<dyn RandomSource>,
        notices: mpsc::UnboundedSender<DrawNotice>,
    ) -> Arc<Self> {
        Arc::new(Self {
            pool,
            config,
            scheduler,
            random,
            notices,
            slots: Mutex::new(HashMap::new()),
            next_generation: AtomicU64::new(1),
        })
    }

    /// 채팅방의 잠금을 잡습니다. 슬롯이 없으면 만듭니다.
    ///
    /// 같은 채팅방의 요청은 도착한 순서대로 잠금을 얻습니다.
    async fn lock_slot(&self, chat_id: i64) -> SlotLock<'_> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.entry(chat_id).or_default().clone()
        };
        let guard = slot.clone().lock_owned().await;

        SlotLock {
            slots: &self.slots,
            chat_id,
            slot,
            guard,
        }
    }

    async fn require_session(&self, chat_id: i64) -> Result<Session, AppError> {
        db::get_session(&self.pool, chat_id)
            .await?
            .ok_or(AppError::SessionNotFound)
    }

    /// 채팅방의 첫 연락. 세션이 없으면 기본 타이머로 만듭니다.
    pub async fn init_if_absent(&self, chat_id: i64) -> Result<InitOutcome, AppError> {
        let _slot = self.lock_slot(chat_id).await;

        if let Some(session) = db::get_session(&self.pool, chat_id).await? {
            return Ok(InitOutcome {
                session,
                created: false,
            });
        }

        let session =
            db::create_session(&self.pool, chat_id, self.config.default_timer_minutes).await?;
        tracing::info!(chat_id, session_id = %session.id, "Game session created");

        Ok(InitOutcome {
            session,
            created: true,
        })
    }

    /// 게임을 시작합니다.
    ///
    /// 명단과 음료 목록을 지금 상태로 복사해 두고, 이전 타이머가 있으면 먼저 끈 뒤
    /// 새 타이머를 겁니다. 저장소 갱신이 실패하면 타이머는 걸지 않습니다.
    pub async fn start(self: &Arc<Self>, chat_id: i64) -> Result<StartedGame, AppError> {
        let mut slot = self.lock_slot(chat_id).await;

        let session = self.require_session(chat_id).await?;
        if session.started {
            return Err(AppError::AlreadyStarted);
        }

        let players = db::list_players(&self.pool, &session.id).await?;
        let drinks = db::list_drinks(&self.pool, &session.id).await?;
        state::check_start(
            LifecycleState::of(Some(&session)),
            players.len(),
            drinks.len(),
        )?;

        db::update_session(
            &self.pool,
            chat_id,
            SessionUpdate {
                started: Some(true),
                awaiting: Some(AwaitingInput::Idle),
                ..Default::default()
            },
        )
        .await?;

        if slot.cancel_timer() {
            tracing::warn!(chat_id, "Replaced a leftover timer on start");
        }

        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        let started = StartedGame {
            session_id: session.id.clone(),
            timer_minutes: session.timer_minutes,
            players: players.clone(),
            drinks: drinks.clone(),
        };
        let context = Arc::new(DrawContext {
            chat_id,
            session_id: session.id,
            generation,
            snapshot: Snapshot::new(players, drinks),
        });

        let period = timer_period(session.timer_minutes);
        let handle = self
            .scheduler
            .schedule_every(period, Self::tick(Arc::downgrade(self), context));
        slot.timer = Some(RunningTimer { generation, handle });

        tracing::info!(
            chat_id,
            timer_minutes = started.timer_minutes,
            players = started.players.len(),
            drinks = started.drinks.len(),
            "Game started"
        );

        Ok(started)
    }

    /// 게임을 멈춥니다. 입력 대기 모드도 초기화합니다.
    ///
    /// 게임이 돌고 있었으면 `true`. 멈춘 세션에 불러도 에러는 아닙니다.
    pub async fn stop(&self, chat_id: i64) -> Result<bool, AppError> {
        let mut slot = self.lock_slot(chat_id).await;

        let session = self.require_session(chat_id).await?;

        db::update_session(
            &self.pool,
            chat_id,
            SessionUpdate {
                started: Some(false),
                awaiting: Some(AwaitingInput::Idle),
                ..Default::default()
            },
        )
        .await?;
        slot.cancel_timer();

        tracing::info!(chat_id, was_started = session.started, "Game stopped");
        Ok(session.started)
    }

    /// 봇에서 나갑니다. 세션과 명단, 음료, 통계를 모두 지웁니다.
    ///
    /// 세션이 없었으면 `false`.
    pub async fn exit(&self, chat_id: i64) -> Result<bool, AppError> {
        let mut slot = self.lock_slot(chat_id).await;

        let deleted = db::delete_session(&self.pool, chat_id).await?;
        slot.cancel_timer();

        if deleted {
            tracing::info!(chat_id, "Game session removed");
        }
        Ok(deleted)
    }

    /// 다음 텍스트를 음료 이름으로 받도록 합니다.
    pub async fn open_drink_entry(&self, chat_id: i64) -> Result<(), AppError> {
        self.open_entry(chat_id, AwaitingInput::DrinkName).await
    }

    /// 다음 텍스트를 타이머 값으로 받도록 합니다.
    pub async fn open_timer_entry(&self, chat_id: i64) -> Result<(), AppError> {
        self.open_entry(chat_id, AwaitingInput::TimerValue).await
    }

    async fn open_entry(&self, chat_id: i64, mode: AwaitingInput) -> Result<(), AppError> {
        let _slot = self.lock_slot(chat_id).await;

        let session = db::get_session(&self.pool, chat_id).await?;
        state::check_configurable(session.as_ref())?;

        db::update_session(
            &self.pool,
            chat_id,
            SessionUpdate {
                awaiting: Some(mode),
                ..Default::default()
            },
        )
        .await?;

        tracing::debug!(chat_id, ?mode, "Awaiting input");
        Ok(())
    }

    /// 자유 텍스트 한 건을 현재 입력 대기 모드에 따라 처리합니다.
    ///
    /// 대기 모드는 텍스트가 올바른지와 상관없이 먼저 `Idle`로 돌아갑니다.
    pub async fn submit_text(&self, chat_id: i64, text: &str) -> Result<TextOutcome, AppError> {
        let _slot = self.lock_slot(chat_id).await;

        let session = self.require_session(chat_id).await?;
        if session.awaiting == AwaitingInput::Idle {
            return Err(AppError::NotAwaitingInput);
        }

        db::update_session(
            &self.pool,
            chat_id,
            SessionUpdate {
                awaiting: Some(AwaitingInput::Idle),
                ..Default::default()
            },
        )
        .await?;

        match state::route_text(session.awaiting, text, self.config.max_timer_minutes)? {
            TextCommand::AddDrink(name) => {
                let drinks = db::list_drinks(&self.pool, &session.id).await?;
                if drinks.iter().any(|d| d.name == name) {
                    return Err(AppError::DuplicateDrink(name));
                }

                let drink = db::add_drink(&self.pool, &session.id, &name).await?;
                tracing::debug!(chat_id, drink = %drink.name, "Drink added");
                Ok(TextOutcome::DrinkAdded { drink })
            }
            TextCommand::SetTimer(minutes) => {
                db::update_session(
                    &self.pool,
                    chat_id,
                    SessionUpdate {
                        timer_minutes: Some(minutes),
                        ..Default::default()
                    },
                )
                .await?;
                tracing::debug!(chat_id, minutes, "Timer updated");
                Ok(TextOutcome::TimerSet { minutes })
            }
        }
    }

    /// 음료 목록을 비웁니다. 지워진 개수를 반환합니다.
    pub async fn clear_drinks(&self, chat_id: i64) -> Result<u64, AppError> {
        let _slot = self.lock_slot(chat_id).await;

        let session = db::get_session(&self.pool, chat_id).await?;
        let session = state::check_configurable(session.as_ref())?;

        let removed = db::clear_drinks(&self.pool, &session.id).await?;
        tracing::debug!(chat_id, removed, "Drinks cleared");
        Ok(removed)
    }

    /// 사용자를 명단에 넣습니다.
    pub async fn join(&self, chat_id: i64, user_id: i64, name: &str) -> Result<Player, AppError> {
        let _slot = self.lock_slot(chat_id).await;

        let session = db::get_session(&self.pool, chat_id).await?;
        let session = state::check_join_window(session.as_ref())?;

        if db::get_player(&self.pool, &session.id, user_id).await?.is_some() {
            return Err(AppError::AlreadyJoined);
        }

        let player = db::add_player(&self.pool, &session.id, user_id, name).await?;
        tracing::info!(chat_id, user_id, name, "Player joined");
        Ok(player)
    }

    /// 사용자를 명단에서 뺍니다. 빠진 참가자를 반환합니다.
    pub async fn leave(&self, chat_id: i64, user_id: i64) -> Result<Player, AppError> {
        let _slot = self.lock_slot(chat_id).await;

        let session = db::get_session(&self.pool, chat_id).await?;
        let session = state::check_join_window(session.as_ref())?;

        let player = db::get_player(&self.pool, &session.id, user_id)
            .await?
            .ok_or(AppError::NotAJoinedPlayer)?;

        db::remove_player(&self.pool, &session.id, user_id).await?;
        tracing::info!(chat_id, user_id, "Player left");
        Ok(player)
    }

    /// 설정/정보 화면용: 타이머, 명단, 음료 목록
    pub async fn snapshot(&self, chat_id: i64) -> Result<GameSnapshot, AppError> {
        let session = self.require_session(chat_id).await?;
        let players = db::list_players(&self.pool, &session.id).await?;
        let drinks = db::list_drinks(&self.pool, &session.id).await?;

        Ok(GameSnapshot {
            session,
            players,
            drinks,
        })
    }

    /// 플레이어별, 음료별 누적 횟수
    pub async fn statistics(&self, chat_id: i64) -> Result<Vec<PlayerStats>, AppError> {
        let session = self.require_session(chat_id).await?;
        let entries = db::read_stats(&self.pool, &session.id).await?;
        Ok(PlayerStats::group(entries))
    }

    /// 모든 타이머를 끕니다. 종료 직전에 부릅니다.
    pub async fn shutdown(&self) -> usize {
        let chat_ids: Vec<i64> = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.keys().copied().collect()
        };

        let mut cancelled = 0;
        for chat_id in chat_ids {
            if self.lock_slot(chat_id).await.cancel_timer() {
                cancelled += 1;
            }
        }

        tracing::info!(cancelled, "Cancelled running timers");
        cancelled
    }

    /// 타이머 콜백. 엔진을 약한 참조로 잡아서, 엔진이 사라지면 틱도 아무 일을 하지 않습니다.
    fn tick(engine: Weak<Self>, context: Arc<DrawContext>) -> Tick {
        Arc::new(move || -> TickFuture {
            let engine = engine.clone();
            let context = context.clone();
            Box::pin(async move {
                if let Some(engine) = engine.upgrade() {
                    engine.draw(&context).await;
                }
            })
        })
    }

    /// 틱 한 번: 뽑고, 기록하고, 알립니다.
    ///
    /// 요청에서 시작된 일이 아니므로 실패는 로그로만 남기고 타이머는 계속 돕니다.
    async fn draw(&self, context: &DrawContext) {
        let chat_id = context.chat_id;
        let slot = self.lock_slot(chat_id).await;

        let current = slot.timer.as_ref().map(|t| t.generation);
        if current != Some(context.generation) {
            tracing::debug!(chat_id, generation = context.generation, "Ignoring stale tick");
            return;
        }

        let Some((player, drink)) = context.snapshot.draw(self.random.as_ref()) else {
            tracing::warn!(chat_id, "Snapshot has no players or drinks, skipping draw");
            return;
        };

        if let Err(e) = db::increment_stat(&self.pool, &context.session_id, player, drink).await {
            tracing::error!(chat_id, error = %e, "Failed to record draw");
            return;
        }

        tracing::debug!(chat_id, player = %player.name, drink = %drink.name, "Draw");

        let notice = DrawNotice {
            chat_id,
            session_id: context.session_id.clone(),
            player_id: player.user_id,
            player_name: player.name.clone(),
            drink_id: drink.id.clone(),
            drink_name: drink.name.clone(),
            drawn_at: chrono::Utc::now(),
        };
        if self.notices.send(notice).is_err() {
            tracing::warn!(chat_id, "Draw relay is gone, notice dropped");
        }
    }

    #[cfg(test)]
    async fn has_timer(&self, chat_id: i64) -> bool {
        self.lock_slot(chat_id).await.timer.is_some()
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        self.slots.lock().unwrap().len()
    }
}

/// 세션의 타이머 값(분)을 틱 간격으로 바꿉니다.
///
/// 저장된 값이 범위를 벗어나 있어도 `1..=TIMER_MINUTES_CEILING`으로 잘라서
/// 곱셈이나 `Instant` 덧셈이 넘치지 않게 합니다.
fn timer_period(minutes: i64) -> Duration {
    let minutes = minutes.clamp(1, TIMER_MINUTES_CEILING);
    Duration::from_secs(minutes.unsigned_abs() * 60)
}
