use crate::domain::model::{GridLine, Neighbors, SeatContext, SeatPosition, SeatingGrid};

/// 每個方向最多收集幾位鄰座
const NEIGHBORS_PER_SIDE: usize = 2;

/// 找出某人在座位表中的位置（走道不計入編號）和四個方向最近的鄰座
pub fn resolve(name: &str, grid: &SeatingGrid) -> SeatContext {
    let target = name.trim();
    if target.is_empty() {
        return SeatContext::NotFound;
    }

    let Some(key) = grid.seats.iter().find_map(|(key, occupant)| {
        occupant
            .as_ref()
            .filter(|o| o.name.trim() == target)
            .map(|_| key.as_str())
    }) else {
        return SeatContext::NotFound;
    };

    let parts: Vec<&str> = key.split('-').collect();
    let [row_id, col_id] = parts.as_slice() else {
        tracing::debug!("Seat key '{}' is not a row-col pair", key);
        return SeatContext::NotFound;
    };

    let (Some(ri), Some(ci)) = (
        grid.rows.iter().position(|r| r.id == *row_id),
        grid.cols.iter().position(|c| c.id == *col_id),
    ) else {
        tracing::debug!("Seat key '{}' refers to an unknown row or column", key);
        return SeatContext::NotFound;
    };

    let pos = SeatPosition {
        row: ordinal(&grid.rows, ri),
        col: ordinal(&grid.cols, ci),
    };

    let occupant_at = |r: usize, c: usize| -> Option<String> {
        let key = SeatingGrid::seat_key(&grid.rows[r].id, &grid.cols[c].id);
        grid.seats
            .get(&key)
            .and_then(Option::as_ref)
            .map(|o| o.name.clone())
            .filter(|n| !n.is_empty())
    };

    let neighbors = Neighbors {
        left: collect(&grid.cols, (0..ci).rev(), |c| occupant_at(ri, c)),
        right: collect(&grid.cols, ci + 1..grid.cols.len(), |c| occupant_at(ri, c)),
        front: collect(&grid.rows, (0..ri).rev(), |r| occupant_at(r, ci)),
        back: collect(&grid.rows, ri + 1..grid.rows.len(), |r| occupant_at(r, ci)),
    };

    SeatContext::Found { pos, neighbors }
}

/// 1 起算，只數到 `index`（含）為止的非走道
fn ordinal(lines: &[GridLine], index: usize) -> usize {
    lines[..=index].iter().filter(|line| !line.is_aisle()).count()
}

/// 沿著 `walk` 往外走，跳過走道，收集最近的已入座者
fn collect<I, F>(lines: &[GridLine], walk: I, occupant: F) -> Vec<String>
where
    I: Iterator<Item = usize>,
    F: Fn(usize) -> Option<String>,
{
    walk.filter(|&i| !lines[i].is_aisle())
        .filter_map(occupant)
        .take(NEIGHBORS_PER_SIDE)
        .collect()
}
