use std::collections::HashMap;

use serde::Serialize;

use crate::config::ScoringConfig;
use crate::history::{H2HRecord, canonical_pair};

const EXPECTED_TG_FLOOR: f64 = 1.0;

/// Head-to-head summary for one fixture.
///
/// `tg_avg` is `None` when there are too few meetings; that is distinct from a
/// real average of zero goals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct H2HSummary {
    pub meetings: usize,
    pub tg_avg: Option<f64>,
    pub modifier: f64,
}

impl H2HSummary {
    pub fn none() -> Self {
        Self {
            meetings: 0,
            tg_avg: None,
            modifier: 0.0,
        }
    }

    pub fn has_data(&self) -> bool {
        self.tg_avg.is_some()
    }
}

/// Meetings grouped by canonical pair, most recent first.
#[derive(Debug, Clone, Default)]
pub struct H2HIndex {
    by_pair: HashMap<(u32, u32), Vec<H2HRecord>>,
}

impl H2HIndex {
    pub fn from_records(records: &[H2HRecord]) -> Self {
        let mut by_pair: HashMap<(u32, u32), Vec<H2HRecord>> = HashMap::new();
        for r in records {
            let key = canonical_pair(r.team1_id, r.team2_id);
            by_pair.entry(key).or_default().push(r.clone());
        }
        for rows in by_pair.values_mut() {
            rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.match_id.cmp(&a.match_id)));
        }
        Self { by_pair }
    }

    pub fn meetings(&self, a: u32, b: u32) -> &[H2HRecord] {
        self.by_pair
            .get(&canonical_pair(a, b))
            .map(|rows| rows.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.by_pair.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pair.is_empty()
    }
}

/// Compare the pair's recent meetings with what each side's own form suggests.
///
/// `home_tg_avg` and `away_tg_avg` are the teams' window averages of total goals.
pub fn h2h_modifier(
    index: &H2HIndex,
    home_team_id: u32,
    away_team_id: u32,
    home_tg_avg: f64,
    away_tg_avg: f64,
    cfg: &ScoringConfig,
) -> H2HSummary {
    let all = index.meetings(home_team_id, away_team_id);
    let recent = &all[..all.len().min(cfg.h2h_lookback)];
    if recent.len() < cfg.h2h_min_matches {
        return H2HSummary {
            meetings: recent.len(),
            ..H2HSummary::none()
        };
    }

    let tg_avg =
        recent.iter().map(|r| r.total_goals as f64).sum::<f64>() / recent.len() as f64;
    let expected = (home_tg_avg + away_tg_avg) / 2.0;
    let clip = cfg.h2h_modifier_clip;
    let modifier = ((tg_avg - expected) / expected.max(EXPECTED_TG_FLOOR)).clamp(-clip, clip);

    H2HSummary {
        meetings: recent.len(),
        tg_avg: Some(tg_avg),
        modifier,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn meeting(a: u32, b: u32, match_id: u64, day: u32, total: u32) -> H2HRecord {
        let (team1_id, team2_id) = canonical_pair(a, b);
        H2HRecord {
            team1_id,
            team2_id,
            match_id,
            total_goals: total,
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        }
    }

    #[test]
    fn two_meetings_hit_the_lower_clip() {
        let index = H2HIndex::from_records(&[meeting(4, 9, 1, 1, 3), meeting(9, 4, 2, 2, 1)]);
        let cfg = ScoringConfig::default();
        let h2h = h2h_modifier(&index, 9, 4, 2.5, 2.5, &cfg);
        assert_eq!(h2h.meetings, 2);
        assert_eq!(h2h.tg_avg, Some(2.0));
        assert!((h2h.modifier + 0.2).abs() < 1e-12);
    }

    #[test]
    fn single_meeting_is_neutral() {
        let index = H2HIndex::from_records(&[meeting(1, 2, 1, 1, 6)]);
        let h2h = h2h_modifier(&index, 1, 2, 2.0, 2.0, &ScoringConfig::default());
        assert_eq!(h2h.modifier, 0.0);
        assert!(!h2h.has_data());
        assert_eq!(h2h.meetings, 1);
    }

    #[test]
    fn only_latest_meetings_count() {
        let mut rows = vec![meeting(1, 2, 100, 1, 10), meeting(1, 2, 101, 2, 10)];
        for day in 10..15 {
            rows.push(meeting(1, 2, day as u64, day, 2));
        }
        let index = H2HIndex::from_records(&rows);
        let h2h = h2h_modifier(&index, 1, 2, 2.0, 2.0, &ScoringConfig::default());
        assert_eq!(h2h.meetings, 5);
        assert_eq!(h2h.tg_avg, Some(2.0));
        assert_eq!(h2h.modifier, 0.0);
    }

    #[test]
    fn goalless_meetings_still_count_as_data() {
        let index = H2HIndex::from_records(&[meeting(1, 2, 1, 1, 0), meeting(1, 2, 2, 2, 0)]);
        let h2h = h2h_modifier(&index, 1, 2, 2.0, 3.0, &ScoringConfig::default());
        assert_eq!(h2h.tg_avg, Some(0.0));
        assert!((h2h.modifier + 0.2).abs() < 1e-12);
    }
}
