//! Derived views and chart summaries over normalized keyword tables
//!
//! Everything here is a pure function of its input table and is recomputed
//! on every call.

use super::KeywordIdeaRow;

/// Competition label of the easiest keywords
pub const LOW_COMPETITION: &str = "LOW";

/// Median of the values, averaging the two middle values for an even count
///
/// Returns `None` for an empty slice. Non-finite values are ignored.
pub fn median(values: &[f64]) -> Option<f64> {
    quantile(values, 0.5)
}

/// Linearly interpolated quantile (`q` in `0.0..=1.0`)
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.total_cmp(b));

    let position = (sorted.len() - 1) as f64 * q.clamp(0.0, 1.0);
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

fn column(rows: &[KeywordIdeaRow], f: impl Fn(&KeywordIdeaRow) -> f64) -> Vec<f64> {
    rows.iter().map(f).collect()
}

/// Keywords whose volume is strictly above the median volume and whose
/// competition level is exactly "LOW"
pub fn high_volume_low_competition(rows: &[KeywordIdeaRow]) -> Vec<KeywordIdeaRow> {
    let Some(volume_median) = median(&column(rows, |r| r.volume)) else {
        return Vec::new();
    };
    rows.iter()
        .filter(|r| r.volume > volume_median && r.competition_level == LOW_COMPETITION)
        .cloned()
        .collect()
}

/// Keywords with both bids strictly above their medians
pub fn high_bids(rows: &[KeywordIdeaRow]) -> Vec<KeywordIdeaRow> {
    let (Some(low_median), Some(high_median)) = (
        median(&column(rows, |r| r.low_bid)),
        median(&column(rows, |r| r.high_bid)),
    ) else {
        return Vec::new();
    };
    rows.iter()
        .filter(|r| r.low_bid > low_median && r.high_bid > high_median)
        .cloned()
        .collect()
}

/// Keywords whose trend score is strictly above the median trend
pub fn trending(rows: &[KeywordIdeaRow]) -> Vec<KeywordIdeaRow> {
    let Some(trend_median) = median(&column(rows, |r| r.trend)) else {
        return Vec::new();
    };
    rows.iter()
        .filter(|r| r.trend > trend_median)
        .cloned()
        .collect()
}

/// Keywords above the median on volume, low bid and trend at once
pub fn high_value(rows: &[KeywordIdeaRow]) -> Vec<KeywordIdeaRow> {
    let (Some(volume_median), Some(bid_median), Some(trend_median)) = (
        median(&column(rows, |r| r.volume)),
        median(&column(rows, |r| r.low_bid)),
        median(&column(rows, |r| r.trend)),
    ) else {
        return Vec::new();
    };
    rows.iter()
        .filter(|r| r.volume > volume_median && r.low_bid > bid_median && r.trend > trend_median)
        .cloned()
        .collect()
}

/// The named derived views, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DerivedView {
    HighVolumeLowCompetition,
    HighBids,
    Trending,
    HighValue,
}

impl DerivedView {
    pub const ALL: [DerivedView; 4] = [
        DerivedView::HighVolumeLowCompetition,
        DerivedView::HighBids,
        DerivedView::Trending,
        DerivedView::HighValue,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            DerivedView::HighVolumeLowCompetition => "High-Volume, Low-Competition Keywords",
            DerivedView::HighBids => "Keywords with High Bids",
            DerivedView::Trending => "Trending Keywords",
            DerivedView::HighValue => "High Volume, High Bid, Trending Keywords",
        }
    }

    pub fn apply(&self, rows: &[KeywordIdeaRow]) -> Vec<KeywordIdeaRow> {
        match self {
            DerivedView::HighVolumeLowCompetition => high_volume_low_competition(rows),
            DerivedView::HighBids => high_bids(rows),
            DerivedView::Trending => trending(rows),
            DerivedView::HighValue => high_value(rows),
        }
    }
}

/// One histogram bucket covering `start..end` (the last bucket includes `end`)
#[derive(Debug, Clone, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram over the value range
pub fn histogram(values: &[f64], bins: usize) -> Vec<Bin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if min == max {
        return vec![Bin {
            start: min,
            end: max,
            count: finite.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    let mut result: Vec<Bin> = (0..bins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: min + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in finite {
        let index = (((value - min) / width) as usize).min(bins - 1);
        result[index].count += 1;
    }

    result
}

/// Share of total search volume held by one competition level
#[derive(Debug, Clone, PartialEq)]
pub struct CompetitionShare {
    pub level: String,
    pub volume: f64,
    /// Fraction of the total volume, `0.0..=1.0`
    pub share: f64,
}

/// Volume per competition level, in order of first appearance
pub fn competition_breakdown(rows: &[KeywordIdeaRow]) -> Vec<CompetitionShare> {
    let mut shares: Vec<CompetitionShare> = Vec::new();
    for row in rows {
        match shares.iter_mut().find(|s| s.level == row.competition_level) {
            Some(share) => share.volume += row.volume,
            None => shares.push(CompetitionShare {
                level: row.competition_level.clone(),
                volume: row.volume,
                share: 0.0,
            }),
        }
    }

    let total: f64 = shares.iter().map(|s| s.volume).sum();
    if total > 0.0 {
        for share in &mut shares {
            share.share = share.volume / total;
        }
    }
    shares
}

/// Five-number summary for a box plot
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    /// Values beyond 1.5 IQR of the quartiles
    pub outliers: usize,
}

pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let q1 = quantile(values, 0.25)?;
    let median = quantile(values, 0.5)?;
    let q3 = quantile(values, 0.75)?;
    let min = quantile(values, 0.0)?;
    let max = quantile(values, 1.0)?;

    let iqr = q3 - q1;
    let (low_fence, high_fence) = (q1 - 1.5 * iqr, q3 + 1.5 * iqr);
    let outliers = values
        .iter()
        .filter(|v| v.is_finite() && (**v < low_fence || **v > high_fence))
        .count();

    Some(BoxSummary {
        min,
        q1,
        median,
        q3,
        max,
        outliers,
    })
}
