use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use anyhow::{Context, Result};
use csv::Writer;
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::interaction::FixtureInteraction;
use crate::ranking::rank_by;
use crate::scoring::{Category, ScoredFixture};
use crate::team_profile::TeamProfile;

pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportReport {
    pub rows: usize,
    pub columns: usize,
}

/// Header plus one row per fixture: identity, archetype, every `{category}_pct`,
/// then the H2H diagnostics.
pub fn summary_rows(scored: &[ScoredFixture]) -> Vec<Vec<String>> {
    let mut header: Vec<String> = [
        "match_id",
        "date",
        "home_team",
        "away_team",
        "tournament",
        "archetype",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();
    header.extend(Category::ALL.iter().map(|c| c.pct_column()));
    header.push("h2h_tg".to_string());
    header.push("h2h_modifier".to_string());

    let mut rows = vec![header];
    for fx in scored {
        rows.push(summary_row(fx));
    }
    rows
}

fn summary_row(fx: &ScoredFixture) -> Vec<String> {
    let x = &fx.interaction;
    let mut row = vec![
        x.fixture.match_id.to_string(),
        x.fixture.date.to_string(),
        x.fixture.home_team_name.clone(),
        x.fixture.away_team_name.clone(),
        x.fixture.tournament_name.clone(),
        x.archetype.label(),
    ];
    row.extend(Category::ALL.iter().map(|c| fmt_f64(fx.pct(*c))));
    row.push(x.h2h.tg_avg.map(fmt_f64).unwrap_or_default());
    row.push(fmt_f64(x.h2h.modifier));
    row
}

/// Wide per-fixture rows: `m_` match info, `h_`/`a_` team profiles,
/// `x_` interactions, `p_` confidences and `q_` quality flags.
pub fn master_rows(scored: &[ScoredFixture], profiles: &HashMap<u32, TeamProfile>) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(scored.len() + 1);
    let mut header_done = false;

    for fx in scored {
        let fixture = &fx.interaction.fixture;
        let (Some(home), Some(away)) = (
            profiles.get(&fixture.home_team_id),
            profiles.get(&fixture.away_team_id),
        ) else {
            continue;
        };

        let mut cells: Vec<(String, String)> = vec![
            ("m_match_id".to_string(), fixture.match_id.to_string()),
            ("m_date".to_string(), fixture.date.to_string()),
            ("m_home_id".to_string(), fixture.home_team_id.to_string()),
            ("m_home_team".to_string(), fixture.home_team_name.clone()),
            ("m_away_id".to_string(), fixture.away_team_id.to_string()),
            ("m_away_team".to_string(), fixture.away_team_name.clone()),
            ("m_tournament".to_string(), fixture.tournament_name.clone()),
            (
                "m_league_avg_tg".to_string(),
                fmt_f64(fx.interaction.league_avg_total_goals),
            ),
        ];
        cells.extend(profile_cells("h_", home));
        cells.extend(profile_cells("a_", away));
        cells.extend(interaction_cells(&fx.interaction));
        cells.extend(
            Category::ALL
                .iter()
                .map(|c| (format!("p_{}_conf", c.as_str()), fmt_f64(fx.pct(*c)))),
        );
        let q = &fx.interaction.quality;
        cells.extend([
            ("q_home_has_full_window".to_string(), q.home_full_window.to_string()),
            ("q_away_has_full_window".to_string(), q.away_full_window.to_string()),
            ("q_home_split_ok".to_string(), q.home_split_ok.to_string()),
            ("q_away_split_ok".to_string(), q.away_split_ok.to_string()),
            ("q_h2h_available".to_string(), q.h2h_available.to_string()),
        ]);

        if !header_done {
            rows.push(cells.iter().map(|(k, _)| k.clone()).collect());
            header_done = true;
        }
        rows.push(cells.into_iter().map(|(_, v)| v).collect());
    }
    rows
}

fn profile_cells(prefix: &str, p: &TeamProfile) -> Vec<(String, String)> {
    let values: Vec<(&str, String)> = vec![
        ("last_scores", p.recent_scores.clone()),
        ("last_tg_list", p.recent_total_goals.clone()),
        ("total_matches_n", p.matches_n.to_string()),
        ("home_matches_n", p.home_n.to_string()),
        ("away_matches_n", p.away_n.to_string()),
        ("gf_avg", fmt_f64(p.attack_overall)),
        ("gf_home", fmt_f64(p.attack_home)),
        ("gf_away", fmt_f64(p.attack_away)),
        ("attack_quality_adj", fmt_f64(p.attack_quality_adj)),
        ("score_1p_rate", fmt_f64(p.score_1plus_rate)),
        ("score_2p_rate", fmt_f64(p.score_2plus_rate)),
        ("gf_relative", fmt_f64(p.attack_relative)),
        ("ga_avg", fmt_f64(p.defense_overall)),
        ("ga_home", fmt_f64(p.defense_home)),
        ("ga_away", fmt_f64(p.defense_away)),
        ("concede_1p_rate", fmt_f64(p.concede_1plus_rate)),
        ("clean_sheet_rate", fmt_f64(p.clean_sheet_rate)),
        ("ga_relative", fmt_f64(p.defense_relative)),
        ("tg_avg", fmt_f64(p.tg_avg)),
        ("over15_rate", fmt_f64(p.over15_rate)),
        ("over25_rate", fmt_f64(p.over25_rate)),
        ("over35_rate", fmt_f64(p.over35_rate)),
        ("tg_relative", fmt_f64(p.openness_relative)),
        ("under15_rate", fmt_f64(p.under15_rate)),
        ("fts_rate", fmt_f64(p.failed_to_score_rate)),
        ("zero_zero_rate", fmt_f64(p.zero_zero_rate)),
        ("tg_std", fmt_f64(p.tg_std)),
        ("extreme_rate", fmt_f64(p.extreme_rate)),
        ("consistency_index", fmt_f64(p.consistency)),
        ("chaos_index", fmt_f64(p.chaos)),
        ("attack_momentum", fmt_f64(p.attack_momentum)),
        ("defense_momentum", fmt_f64(p.defense_momentum)),
        ("openness_momentum", fmt_f64(p.openness_momentum)),
        ("form_combined", fmt_f64(p.form)),
        ("goal_share", fmt_f64(p.goal_share)),
        ("low_bin_rate", fmt_f64(p.low_bin_rate)),
        ("mid_bin_rate", fmt_f64(p.mid_bin_rate)),
    ];
    values
        .into_iter()
        .map(|(k, v)| (format!("{prefix}{k}"), v))
        .collect()
}

fn interaction_cells(x: &FixtureInteraction) -> Vec<(String, String)> {
    let values: Vec<(&str, String)> = vec![
        ("home_pressure", fmt_f64(x.home_pressure)),
        ("away_pressure", fmt_f64(x.away_pressure)),
        ("pressure_total", fmt_f64(x.pressure_total)),
        ("pressure_diff", fmt_f64(x.pressure_diff)),
        ("pressure_ratio", fmt_f64(x.pressure_ratio)),
        ("combined_attack", fmt_f64(x.combined_attack)),
        ("combined_attack_quality", fmt_f64(x.combined_attack_quality)),
        ("combined_defense_weak", fmt_f64(x.combined_defense_weak)),
        ("defense_strength_index", fmt_f64(x.defense_strength_index)),
        ("combined_openness", fmt_f64(x.combined_openness)),
        ("high_openness", fmt_f64(x.high_openness)),
        ("dryness_index", fmt_f64(x.dryness_index)),
        ("zero_zero_combined", fmt_f64(x.zero_zero_rate)),
        ("suppression_overlap", fmt_f64(x.suppression_overlap)),
        ("both_attack_strong", fmt_f64(x.both_attack_strong)),
        ("both_defense_weak", fmt_f64(x.both_defense_weak)),
        ("balanced_pressure", fmt_f64(x.balanced_pressure)),
        ("archetype", x.archetype.label()),
        ("archetype_boost", fmt_f64(x.archetype_boost)),
        ("domination_boost", fmt_f64(x.domination_boost)),
        ("balanced_boost", fmt_f64(x.balanced_boost)),
        ("open_game_boost", fmt_f64(x.open_game_boost)),
        ("tight_game_boost", fmt_f64(x.tight_game_boost)),
        ("chaos_boost", fmt_f64(x.chaos_boost)),
        ("h2h_tg_avg", x.h2h.tg_avg.map(fmt_f64).unwrap_or_default()),
        ("h2h_modifier", fmt_f64(x.h2h.modifier)),
        ("h2h_matches_n", x.h2h.meetings.to_string()),
    ];
    values
        .into_iter()
        .map(|(k, v)| (format!("x_{k}"), v))
        .collect()
}

/// One sheet per category with its top `n` fixtures, summary columns.
pub fn top_sheets(scored: &[ScoredFixture], n: usize) -> Vec<Sheet> {
    let header = summary_rows(&[]).remove(0);
    Category::ALL
        .iter()
        .map(|category| {
            let mut rows = vec![header.clone()];
            rows.extend(rank_by(*category, scored, n).into_iter().map(summary_row));
            Sheet {
                name: format!("Top {}", category.as_str()),
                rows,
            }
        })
        .collect()
}

pub fn write_csv(path: &Path, rows: &[Vec<String>]) -> Result<ExportReport> {
    ensure_parent(path)?;
    let file =
        File::create(path).with_context(|| format!("create csv file {}", path.display()))?;
    let mut writer = Writer::from_writer(file);
    for row in rows {
        writer
            .write_record(row)
            .with_context(|| format!("write csv row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("flush csv file {}", path.display()))?;
    Ok(report(rows))
}

pub fn write_xlsx(path: &Path, sheets: &[Sheet]) -> Result<()> {
    ensure_parent(path)?;
    let mut workbook = Workbook::new();
    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&sheet.name)?;
        write_rows(worksheet, &sheet.rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let (r, c) = (row_idx as u32, col_idx as u16);
            // Header row stays text; numeric cells are written as numbers.
            let written = match value.parse::<f64>() {
                Ok(num) if row_idx > 0 && num.is_finite() => worksheet.write_number(r, c, num),
                _ => worksheet.write_string(r, c, value),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir {}", parent.display()))?;
    }
    Ok(())
}

fn report(rows: &[Vec<String>]) -> ExportReport {
    ExportReport {
        rows: rows.len().saturating_sub(1),
        columns: rows.first().map(Vec::len).unwrap_or(0),
    }
}

fn fmt_f64(value: f64) -> String {
    format!("{value:.6}")
}
