use std::cmp::Reverse;
use std::collections::BTreeMap;

use base64::Engine;
use image::Rgb;

use super::label::SentimentLabel;
use crate::chart::{PieChart, PieSlice};
use crate::core::{Result, SentimentError};

pub const CHART_TITLE: &str = "Sentiment Distribution";

const POSITIVE_COLOR: Rgb<u8> = Rgb([0, 128, 0]);
const NEGATIVE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

fn color(label: SentimentLabel) -> Rgb<u8> {
    match label {
        SentimentLabel::Positive => POSITIVE_COLOR,
        SentimentLabel::Negative => NEGATIVE_COLOR,
    }
}

/// Label counts for a batch and the pie chart drawn from them.
#[derive(Debug, Clone)]
pub struct DistributionSummary {
    counts: BTreeMap<SentimentLabel, usize>,
    total: usize,
    slices: Vec<PieSlice>,
    chart_png: Vec<u8>,
}

impl DistributionSummary {
    /// Count for `label`; zero when it never occurred.
    pub fn count(&self, label: SentimentLabel) -> usize {
        self.counts.get(&label).copied().unwrap_or(0)
    }

    /// Only labels that occurred at least once.
    pub fn counts(&self) -> &BTreeMap<SentimentLabel, usize> {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Chart slices in drawing order.
    pub fn slices(&self) -> &[PieSlice] {
        &self.slices
    }

    pub fn chart_png(&self) -> &[u8] {
        &self.chart_png
    }

    pub fn chart_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.chart_png)
    }
}

/// Counts `labels` and renders the distribution chart.
pub fn summarize(labels: &[SentimentLabel]) -> Result<DistributionSummary> {
    if labels.is_empty() {
        return Err(SentimentError::EmptyBatch);
    }

    let mut counts = BTreeMap::new();
    for label in labels {
        *counts.entry(*label).or_insert(0usize) += 1;
    }

    // Largest share first; Positive wins ties through label ordering.
    let mut ordered: Vec<(SentimentLabel, usize)> = counts.iter().map(|(l, c)| (*l, *c)).collect();
    ordered.sort_by_key(|(label, count)| (Reverse(*count), *label));

    let chart = PieChart::new(
        CHART_TITLE,
        ordered
            .iter()
            .map(|(label, count)| (label.as_str(), *count, color(*label))),
    )
    .ok_or(SentimentError::EmptyBatch)?;
    let chart_png = chart.to_png()?;

    tracing::debug!(total = labels.len(), ?counts, "summarized batch");
    Ok(DistributionSummary {
        counts,
        total: labels.len(),
        slices: chart.slices().to_vec(),
        chart_png,
    })
}
