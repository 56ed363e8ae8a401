use cardcount_core::count::RankHistogram;
use cardcount_core::session::CountingSession;
use serde::Serialize;

use crate::tint::{CountTint, Rgb};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankRow {
    pub rank: &'static str,
    pub count: u32,
}

/// Everything the overlay shows for one refresh: the count with its tint and
/// the per-rank table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HudFrame {
    pub count: i32,
    pub tint: CountTint,
    pub color: Rgb,
    pub ranks: Vec<RankRow>,
}

impl HudFrame {
    pub fn build(count: i32, histogram: &RankHistogram, saturation: u32) -> Self {
        let tint = CountTint::for_count(count, saturation);
        let ranks = histogram
            .iter()
            .map(|(rank, count)| RankRow {
                rank: rank.name(),
                count,
            })
            .collect();
        Self {
            count,
            tint,
            color: tint.color(),
            ranks,
        }
    }

    pub fn from_session(session: &CountingSession, saturation: u32) -> Self {
        Self::build(session.running_count(), &session.histogram(), saturation)
    }

    pub fn count_text(&self) -> String {
        self.count.to_string()
    }

    pub fn stats_text(&self) -> String {
        let mut text = String::new();
        for row in &self.ranks {
            text.push_str(&format!("{}: {}\n", row.rank, row.count));
        }
        text
    }

    pub fn to_text(&self) -> String {
        format!(
            "Count: {} [{} {}]\n{}",
            self.count_text(),
            self.tint.label(),
            self.color.to_hex(),
            self.stats_text()
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::HudFrame;
    use crate::tint::DEFAULT_SATURATION;
    use cardcount_core::count::RankHistogram;
    use cardcount_core::model::{Card, Rank, Suit};

    #[test]
    fn stats_list_all_ranks_in_order() {
        let histogram = RankHistogram::from_cards(
            [
                Card::new(Rank::Queen, Suit::Hearts),
                Card::new(Rank::Queen, Suit::Clubs),
            ]
            .iter(),
        );
        let frame = HudFrame::build(-2, &histogram, DEFAULT_SATURATION);
        let lines: Vec<_> = frame.stats_text().lines().map(str::to_owned).collect();
        assert_eq!(lines.len(), 13);
        assert_eq!(lines[0], "Two: 0");
        assert_eq!(lines[10], "Queen: 2");
        assert_eq!(lines[12], "Ace: 0");
    }

    #[test]
    fn text_leads_with_count_and_tint() {
        let frame = HudFrame::build(0, &RankHistogram::new(), DEFAULT_SATURATION);
        assert!(frame.to_text().starts_with("Count: 0 [neutral #ffffff]\n"));
    }

    #[test]
    fn json_carries_tint_kind() {
        let frame = HudFrame::build(4, &RankHistogram::new(), DEFAULT_SATURATION);
        let json = frame.to_json().expect("serialize");
        assert!(json.contains("\"kind\": \"favorable\""));
        assert!(json.contains("\"rank\": \"Ace\""));
    }
}
