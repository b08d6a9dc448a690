use crate::core::history::HistoryStore;
use crate::core::links::{self, PageLinks};
use crate::core::seating;
use crate::core::selection::{SelectionEngine, SelectionState, MAX_RECENT_LIMIT, MIN_RECENT_LIMIT};
use crate::domain::model::{
    as_number, is_truthy, leading_int, HostEvent, PickStats, RollcallEvent, Roster, SeatContext, SettingsUpdate,
};
use crate::domain::ports::{EventSink, KeyValueStore, RosterProvider, SeatingProvider};
use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Value};

pub const DEFAULT_CHANNEL: &str = "rollcall-random";
pub const DEFAULT_CALLER: &str = "rollcall-random";
pub const DEFAULT_STEP_MS: u64 = 40;

pub const START_ROLL: &str = "start-roll";
pub const OPEN_SETTINGS: &str = "openSettings";
pub const OPEN_EXTERNAL: &str = "openExternal";

pub const CURRENT_NAME: &str = "currentName";

/// 與宿主互動時用到的參數
#[derive(Debug, Clone, PartialEq)]
pub struct HostOptions {
    pub event_channel: String,
    pub caller: String,
    pub step_ms: u64,
    pub pages: PageLinks,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            event_channel: DEFAULT_CHANNEL.to_string(),
            caller: DEFAULT_CALLER.to_string(),
            step_ms: DEFAULT_STEP_MS,
            pages: PageLinks::default(),
        }
    }
}

/// 一次抽選請求的結果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickOutcome {
    pub picks: Vec<String>,
    pub preview: Vec<String>,
    pub seat: Option<SeatContext>,
}

/// 點名流程：取名單、抽選、寫歷史、查座位、通知宿主。
///
/// 所有外部協作者的失敗都降級成預設值（空名單、找不到座位），不會往外丟。
pub struct RollcallEngine<P, S, K, E, R = StdRng>
where
    P: RosterProvider,
    S: SeatingProvider,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
{
    roster: P,
    seating: S,
    history: HistoryStore<K>,
    events: E,
    selection: SelectionEngine<R>,
    options: HostOptions,
}

impl<P, S, K, E, R> RollcallEngine<P, S, K, E, R>
where
    P: RosterProvider,
    S: SeatingProvider,
    K: KeyValueStore,
    E: EventSink,
    R: Rng,
{
    /// 建立引擎並載入歷史紀錄
    pub async fn init(
        roster: P,
        seating: S,
        store: K,
        events: E,
        selection: SelectionEngine<R>,
        options: HostOptions,
    ) -> Self {
        let history = HistoryStore::load(store).await;
        Self {
            roster,
            seating,
            history,
            events,
            selection,
            options,
        }
    }

    pub fn selection(&self) -> &SelectionState {
        self.selection.state()
    }

    pub fn history(&self) -> &HistoryStore<K> {
        &self.history
    }

    /// 處理宿主送來的原始 JSON 事件；不認得的事件直接忽略
    pub async fn handle_event(&mut self, payload: Value) {
        match HostEvent::from_value(payload) {
            Some(event) => self.handle(event).await,
            None => tracing::debug!("Ignoring unrecognised host event"),
        }
    }

    pub async fn handle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Click { id } if id == START_ROLL => {
                self.start_roll().await;
            }
            HostEvent::ConfigCount { count } => {
                self.set_pick_count(&count);
            }
            HostEvent::LeftClick { id } if id == OPEN_SETTINGS => self.open_settings(),
            HostEvent::LeftClick { id } if id == OPEN_EXTERNAL => self.open_external(),
            HostEvent::FloatSettings(update) => self.apply_settings(&update),
            other => tracing::debug!("No handler for host event {:?}", other),
        }
    }

    pub async fn start_roll(&mut self) -> PickOutcome {
        self.start_roll_at(chrono::Utc::now().timestamp_millis()).await
    }

    /// 執行一次抽選請求，`now` 為 epoch 毫秒
    pub async fn start_roll_at(&mut self, now: i64) -> PickOutcome {
        let roster = self.load_roster().await;

        let count = self.selection.state().pick_count().max(1);
        let picks = self.selection.pick_batch(&roster, count);
        for name in &picks {
            self.history.record(name, now).await;
        }
        tracing::info!("🎯 Picked {:?} ({} requested)", picks, count);

        let preview: Vec<String> = self.selection.animation_sequence(&roster).collect();

        let seat = match picks.as_slice() {
            [only] => Some(self.locate(only).await),
            _ => None,
        };

        self.emit(&RollcallEvent::AnimatePick {
            names: preview.clone(),
            final_names: picks.clone(),
            step_ms: self.options.step_ms,
            seat: seat.clone(),
        });

        PickOutcome {
            picks,
            preview,
            seat,
        }
    }

    /// 查詢座位；取不到座位表就當作找不到
    pub async fn locate(&self, name: &str) -> SeatContext {
        match self.seating.fetch_seating().await {
            Ok(grid) => seating::resolve(name, &grid),
            Err(e) => {
                tracing::warn!("⚠️ Seating config unavailable: {}", e);
                SeatContext::NotFound
            }
        }
    }

    pub fn stats_for(&self, name: &str, now: i64) -> PickStats {
        self.history.stats_for(name, now)
    }

    /// 數字截斷取整；字串取開頭的整數部分（`"3abc"` 為 3）。布林與小於 1 的值忽略
    pub fn set_pick_count(&mut self, raw: &Value) -> bool {
        let Some(count) = leading_int(raw) else {
            tracing::debug!("Ignoring non-numeric pick count {}", raw);
            return false;
        };
        if count < 1 {
            tracing::debug!("Ignoring pick count {}", count);
            return false;
        }
        let applied = self.selection.state_mut().set_pick_count(count as usize);
        tracing::info!("🔧 Pick count set to {}", self.selection.state().pick_count());
        applied
    }

    /// 套用設定面板的變更；格式不對的欄位保留原值
    pub fn apply_settings(&mut self, update: &SettingsUpdate) {
        let state = self.selection.state_mut();

        if let Some(raw) = &update.no_repeat {
            let flag = match raw {
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                _ => String::new(),
            };
            match flag.as_str() {
                "1" => state.set_no_repeat(true),
                "0" => state.set_no_repeat(false),
                _ => tracing::debug!("Ignoring noRepeat value {}", raw),
            }
        }

        if let Some(raw) = &update.recent_limit {
            match as_number(raw).filter(|n| n.is_finite()) {
                Some(limit) => {
                    let limit = limit
                        .floor()
                        .clamp(MIN_RECENT_LIMIT as f64, MAX_RECENT_LIMIT as f64);
                    state.set_recent_limit(limit as usize);
                }
                None => tracing::debug!("Ignoring recentLimit value {}", raw),
            }
        }

        if update.reset_picked.as_ref().is_some_and(is_truthy) {
            state.reset();
            tracing::info!("🧹 Pick memory reset");
        }

        tracing::info!(
            "🔧 Settings: noRepeat={}, recentLimit={}",
            state.no_repeat(),
            state.recent_limit()
        );
    }

    pub fn reset(&mut self) {
        self.selection.state_mut().reset();
    }

    pub fn settings_url(&self) -> Option<url::Url> {
        let state = self.selection.state();
        self.options.pages.settings.as_ref().map(|base| {
            links::settings_url(
                base,
                &self.options.event_channel,
                &self.options.caller,
                state.no_repeat(),
                state.recent_limit(),
            )
        })
    }

    pub fn external_url(&self) -> Option<url::Url> {
        self.options
            .pages
            .external
            .as_ref()
            .map(|base| links::external_url(base, &self.options.event_channel, &self.options.caller))
    }

    pub fn open_settings(&self) {
        match self.settings_url() {
            Some(url) => self.open_floating(520, 360, url),
            None => tracing::warn!("⚠️ No settings page configured"),
        }
    }

    pub fn open_external(&self) {
        match self.external_url() {
            Some(url) => self.open_floating(360, 480, url),
            None => tracing::warn!("⚠️ No external page configured"),
        }
    }

    /// 宿主查詢變數；目前只有 `currentName`
    pub fn variable(&self, key: &str) -> String {
        if key == CURRENT_NAME {
            self.selection.state().current_name().to_string()
        } else {
            String::new()
        }
    }

    pub fn variables() -> &'static [&'static str] {
        &[CURRENT_NAME]
    }

    async fn load_roster(&self) -> Roster {
        match self.roster.fetch_roster().await {
            Ok(roster) => roster,
            Err(e) => {
                tracing::warn!("⚠️ Roster unavailable, treating as empty: {}", e);
                Roster::default()
            }
        }
    }

    fn open_floating(&self, width: u32, height: u32, url: url::Url) {
        self.emit(&RollcallEvent::update("floatingBounds", "left"));
        self.emit(&RollcallEvent::update(
            "floatingBounds",
            json!({ "width": width, "height": height }),
        ));
        self.emit(&RollcallEvent::update("floatingUrl", url.as_str()));
    }

    fn emit(&self, event: &RollcallEvent) {
        if let Err(e) = self.events.emit(&self.options.event_channel, event) {
            tracing::debug!("Event emission failed: {}", e);
        }
    }
}
