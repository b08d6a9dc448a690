use crate::domain::model::Roster;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashSet, VecDeque};

pub const DEFAULT_RECENT_LIMIT: usize = 20;
pub const MIN_RECENT_LIMIT: usize = 1;
pub const MAX_RECENT_LIMIT: usize = 100;
/// 動畫預覽最多幾步
pub const ANIMATION_STEPS: usize = 5;

/// 抽選狀態：全域不重複記憶、最近名單與設定
#[derive(Debug, Clone)]
pub struct SelectionState {
    picked: HashSet<String>,
    recent: VecDeque<String>,
    no_repeat: bool,
    recent_limit: usize,
    pick_count: usize,
    current_name: String,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            picked: HashSet::new(),
            recent: VecDeque::new(),
            no_repeat: true,
            recent_limit: DEFAULT_RECENT_LIMIT,
            pick_count: 1,
            current_name: String::new(),
        }
    }
}

impl SelectionState {
    pub fn new(no_repeat: bool, recent_limit: usize, pick_count: usize) -> Self {
        let mut state = Self {
            no_repeat,
            ..Self::default()
        };
        state.set_recent_limit(recent_limit);
        state.set_pick_count(pick_count);
        state
    }

    pub fn picked(&self) -> &HashSet<String> {
        &self.picked
    }

    pub fn recent(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    pub fn no_repeat(&self) -> bool {
        self.no_repeat
    }

    pub fn set_no_repeat(&mut self, no_repeat: bool) {
        self.no_repeat = no_repeat;
    }

    pub fn recent_limit(&self) -> usize {
        self.recent_limit
    }

    /// 夾在 1..=100，並把 `recent` 裁到新的上限（保留最新的）
    pub fn set_recent_limit(&mut self, limit: usize) {
        self.recent_limit = limit.clamp(MIN_RECENT_LIMIT, MAX_RECENT_LIMIT);
        self.trim_recent();
    }

    pub fn pick_count(&self) -> usize {
        self.pick_count
    }

    /// 小於 1 的值直接忽略，回傳是否有套用
    pub fn set_pick_count(&mut self, count: usize) -> bool {
        if count >= 1 {
            self.pick_count = count;
            true
        } else {
            false
        }
    }

    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    /// 清空 `recent`、`picked` 與目前顯示的名字
    pub fn reset(&mut self) {
        self.recent.clear();
        self.picked.clear();
        self.current_name.clear();
    }

    fn remember(&mut self, name: &str) {
        self.current_name = name.to_string();
        if self.no_repeat {
            self.picked.insert(name.to_string());
            self.recent.push_back(name.to_string());
            self.trim_recent();
        }
    }

    fn trim_recent(&mut self) {
        while self.recent.len() > self.recent_limit {
            self.recent.pop_front();
        }
    }
}

/// 不重複抽選器。狀態由實例持有，主機端需序列化呼叫。
pub struct SelectionEngine<R: Rng = StdRng> {
    state: SelectionState,
    rng: R,
}

impl SelectionEngine<StdRng> {
    pub fn new(state: SelectionState) -> Self {
        Self::with_rng(state, StdRng::from_entropy())
    }
}

impl Default for SelectionEngine<StdRng> {
    fn default() -> Self {
        Self::new(SelectionState::default())
    }
}

impl<R: Rng> SelectionEngine<R> {
    pub fn with_rng(state: SelectionState, rng: R) -> Self {
        Self { state, rng }
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SelectionState {
        &mut self.state
    }

    /// 抽一個名字。`batch_excluded` 是本輪批次已抽中的名字。
    ///
    /// 開啟不重複時，全域已抽名單會先被排除；若因此沒有候選人，
    /// 清空全域記憶後改用只排除本輪的基礎池。
    pub fn pick_one(&mut self, roster: &Roster, batch_excluded: &HashSet<String>) -> Option<String> {
        let unique = roster.unique_names();

        // picked 只能是目前名單的子集
        self.state.picked.retain(|name| unique.contains(name));

        let base_pool: Vec<&String> = unique
            .iter()
            .filter(|name| !batch_excluded.contains(*name))
            .collect();
        if base_pool.is_empty() {
            tracing::debug!("No eligible candidate left for this batch");
            return None;
        }

        let pool = if self.state.no_repeat {
            let fresh: Vec<&String> = base_pool
                .iter()
                .copied()
                .filter(|name| !self.state.picked.contains(*name))
                .collect();
            if fresh.is_empty() {
                tracing::info!(
                    "🔄 Pool exhausted after {} picks, resetting no-repeat memory",
                    self.state.picked.len()
                );
                self.state.picked.clear();
                base_pool
            } else {
                fresh
            }
        } else {
            base_pool
        };

        let idx = self.rng.gen_range(0..pool.len());
        let name = pool[idx].clone();
        tracing::debug!("Drew '{}' from a pool of {}", name, pool.len());

        self.state.remember(&name);
        Some(name)
    }

    /// 批次抽選，本輪內不重複；遇到空結果就提早結束
    pub fn pick_batch(&mut self, roster: &Roster, count: usize) -> Vec<String> {
        let limit = count.min(roster.unique_names().len());
        let mut batch = HashSet::with_capacity(limit);
        let mut picks = Vec::with_capacity(limit);

        for _ in 0..limit {
            match self.pick_one(roster, &batch) {
                Some(name) => {
                    batch.insert(name.clone());
                    picks.push(name);
                }
                None => break,
            }
        }

        picks
    }

    /// 動畫用的預覽序列：可重複抽，不寫入任何狀態
    pub fn animation_sequence(&mut self, roster: &Roster) -> impl Iterator<Item = String> + '_ {
        let unique = roster.unique_names();
        let filtered: Vec<String> = if self.state.no_repeat {
            unique
                .iter()
                .filter(|name| !self.state.recent.contains(*name))
                .cloned()
                .collect()
        } else {
            unique.clone()
        };
        let pool = if filtered.is_empty() { unique } else { filtered };
        let steps = pool.len().min(ANIMATION_STEPS);

        let rng = &mut self.rng;
        (0..steps).map(move |_| pool[rng.gen_range(0..pool.len())].clone())
    }
}
