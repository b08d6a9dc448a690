use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::ser::SerializeStruct;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

/// 把字串或數字欄位讀成字串；其他型別視為空字串
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

impl Student {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// 名單快照，由外部提供；核心只讀不改
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub students: Vec<Student>,
}

impl Roster {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            students: names.into_iter().map(Student::new).collect(),
        }
    }

    /// 接受 `{students: [...]}`、`{result: {students: [...]}}` 或純陣列；
    /// 壞掉的項目個別丟棄，形狀不對就回傳空名單
    pub fn from_value(value: Value) -> Self {
        let items = match unwrap_result(value) {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("students") {
                Some(Value::Array(items)) => items,
                Some(Value::Null) | None => Vec::new(),
                Some(other) => {
                    tracing::warn!("⚠️ Malformed roster payload, using empty roster: {}", other);
                    Vec::new()
                }
            },
            _ => return Roster::default(),
        };

        let total = items.len();
        let students: Vec<Student> = items
            .into_iter()
            .filter_map(|item| serde_json::from_value::<Student>(item).ok())
            .filter(|s| !s.name.trim().is_empty())
            .collect();
        if students.len() < total {
            tracing::debug!("Skipped {} unusable roster entries", total - students.len());
        }
        Roster { students }
    }

    /// 去頭尾空白、去空值、依名稱去重，保留原始順序
    pub fn unique_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.students
            .iter()
            .map(|s| s.name.trim())
            .filter(|n| !n.is_empty())
            .filter(|n| seen.insert(*n))
            .map(str::to_string)
            .collect()
    }
}

/// 宿主 RPC 的回應可能包在 `result` 欄位裡
pub(crate) fn unwrap_result(value: Value) -> Value {
    match value {
        Value::Object(mut obj) if obj.get("result").is_some_and(is_truthy) => {
            obj.remove("result").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub name: String,
    /// epoch 毫秒
    pub timestamp: i64,
}

impl HistoryEntry {
    pub fn new(name: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickStats {
    /// 最近三次被抽中的時間（新到舊）
    pub last3: Vec<i64>,
    pub recent_count: usize,
    pub recent_total: usize,
    pub probability: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Aisle,
    #[default]
    Seat,
}

/// 只有字串 `"aisle"` 是走道，其餘（含 null、數字）都當座位
fn lenient_kind<'de, D>(deserializer: D) -> std::result::Result<LineKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if s == "aisle" => LineKind::Aisle,
        _ => LineKind::Seat,
    })
}

/// 列/行清單逐項解析；壞掉的項目變成沒有 id 的座位線，維持原本的位置
fn lenient_lines<'de, D>(deserializer: D) -> std::result::Result<Vec<GridLine>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// 只有物件值算有人坐；其他值都是空位
fn lenient_seats<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, Option<Occupant>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::Object(seats)) = value else {
        return Ok(BTreeMap::new());
    };
    Ok(seats
        .into_iter()
        .map(|(key, seat)| {
            let occupant = match seat {
                Value::Object(_) => serde_json::from_value(seat).ok(),
                _ => None,
            };
            (key, occupant)
        })
        .collect())
}

/// 座位表中的一列或一行
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient_kind")]
    pub kind: LineKind,
}

impl GridLine {
    pub fn seat(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: LineKind::Seat,
        }
    }

    pub fn aisle(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: LineKind::Aisle,
        }
    }

    pub fn is_aisle(&self) -> bool {
        self.kind == LineKind::Aisle
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
}

/// 座位設定。`seats` 的 key 格式固定為 `"rowId-colId"`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatingGrid {
    #[serde(default, deserialize_with = "lenient_lines")]
    pub rows: Vec<GridLine>,
    #[serde(default, deserialize_with = "lenient_lines")]
    pub cols: Vec<GridLine>,
    #[serde(default, deserialize_with = "lenient_seats")]
    pub seats: BTreeMap<String, Option<Occupant>>,
}

impl SeatingGrid {
    pub fn seat_key(row_id: &str, col_id: &str) -> String {
        format!("{}-{}", row_id, col_id)
    }

    pub fn with_seat(mut self, row_id: &str, col_id: &str, name: &str) -> Self {
        self.seats.insert(
            Self::seat_key(row_id, col_id),
            Some(Occupant {
                name: name.to_string(),
            }),
        );
        self
    }

    /// 接受 `{config: {...}}`、`{result: {config: {...}}}` 或直接的設定物件
    pub fn from_value(value: Value) -> Self {
        let mut value = unwrap_result(value);
        if let Value::Object(obj) = &mut value {
            if let Some(config) = obj.remove("config") {
                value = config;
            }
        }
        if !value.is_object() {
            return SeatingGrid::default();
        }

        serde_json::from_value(value).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Malformed seating config, using empty grid: {}", e);
            SeatingGrid::default()
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatPosition {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbors {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub front: Vec<String>,
    pub back: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatContext {
    NotFound,
    Found {
        pos: SeatPosition,
        neighbors: Neighbors,
    },
}

impl SeatContext {
    pub fn is_found(&self) -> bool {
        matches!(self, SeatContext::Found { .. })
    }
}

// 宿主端讀的是 `{found: false}` / `{found: true, pos, neighbors}`
impl Serialize for SeatContext {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            SeatContext::NotFound => {
                let mut s = serializer.serialize_struct("SeatContext", 1)?;
                s.serialize_field("found", &false)?;
                s.end()
            }
            SeatContext::Found { pos, neighbors } => {
                let mut s = serializer.serialize_struct("SeatContext", 3)?;
                s.serialize_field("found", &true)?;
                s.serialize_field("pos", pos)?;
                s.serialize_field("neighbors", neighbors)?;
                s.end()
            }
        }
    }
}

/// 發給宿主的事件，只做通知，不等回應
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum RollcallEvent {
    #[serde(rename = "update")]
    Update { target: String, value: Value },
    #[serde(rename = "animate.pick")]
    AnimatePick {
        names: Vec<String>,
        #[serde(rename = "final")]
        final_names: Vec<String>,
        #[serde(rename = "stepMs")]
        step_ms: u64,
        seat: Option<SeatContext>,
    },
}

impl RollcallEvent {
    pub fn update(target: impl Into<String>, value: impl Into<Value>) -> Self {
        RollcallEvent::Update {
            target: target.into(),
            value: value.into(),
        }
    }
}

/// 操作員在設定面板送出的內容；欄位保持原始 JSON，解析失敗就忽略
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub no_repeat: Option<Value>,
    #[serde(default)]
    pub recent_limit: Option<Value>,
    #[serde(default)]
    pub reset_picked: Option<Value>,
}

/// 宿主下方工具列送來的事件
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum HostEvent {
    #[serde(rename = "click")]
    Click {
        #[serde(default)]
        id: String,
    },
    #[serde(rename = "config.count")]
    ConfigCount {
        #[serde(default)]
        count: Value,
    },
    #[serde(rename = "left.click")]
    LeftClick {
        #[serde(default)]
        id: String,
    },
    #[serde(rename = "float.settings")]
    FloatSettings(SettingsUpdate),
}

impl HostEvent {
    /// 不認得的事件回傳 `None`
    pub fn from_value(value: Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }
}

/// JS 風格的 truthy 判斷，用於 `resetPicked` 這類旗標
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// 數字或數字字串轉成 f64；其他型別回傳 `None`
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// 仿 `parseInt`：取字串開頭的整數部分，數字直接截斷；布林與其他型別回傳 `None`
pub(crate) fn leading_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim_start();
            let (negative, rest) = match s.as_bytes().first() {
                Some(b'-') => (true, &s[1..]),
                Some(b'+') => (false, &s[1..]),
                _ => (false, s),
            };
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            let n: i64 = rest[..digits].parse().ok()?;
            Some(if negative { -n } else { n })
        }
        _ => None,
    }
}
