/// 將長度等分成 `count + 1` 段，回傳內部的 `count` 個時間點（串流 tick）
///
/// 乘法在 128 位元中計算，避免長影片配上細緻時間基準時溢位。
#[must_use]
pub fn sprite_timestamps(duration: i64, count: usize) -> Vec<i64> {
    if count == 0 || duration <= 0 {
        return Vec::new();
    }

    let segments = count as i128 + 1;
    (1..=count)
        .map(|i| {
            let tick = i as i128 * i128::from(duration) / segments;
            i64::try_from(tick).unwrap_or(i64::MAX)
        })
        .collect()
}
