//! Plain-text tables for terminal output.

use crate::domain::{Course, RecommendationResult};
use crate::eval::EvaluationReport;
use console::style;
use unicode_width::UnicodeWidthStr;

/// Column-aligned text table. Widths are measured in terminal cells, so
/// course names with wide characters still line up.
#[derive(Debug, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { headers: headers.into_iter().map(Into::into).collect(), rows: Vec::new() }
    }

    pub fn add_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let columns = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().take(columns).enumerate() {
                widths[i] = widths[i].max(cell.width());
            }
        }

        let mut out = String::new();
        let header_line = join_padded(&self.headers, &widths);
        out.push_str(&style(header_line.trim_end()).bold().to_string());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(rule.join("  ").trim_end());
        out.push('\n');
        for row in &self.rows {
            out.push_str(join_padded(row, &widths).trim_end());
            out.push('\n');
        }
        out
    }
}

fn join_padded(cells: &[String], widths: &[usize]) -> String {
    widths
        .iter()
        .enumerate()
        .map(|(i, width)| {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            let pad = width.saturating_sub(cell.width());
            format!("{cell}{}", " ".repeat(pad))
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_recommendations_table(results: &[RecommendationResult]) -> String {
    if results.is_empty() {
        return "No recommendations available.\n".to_string();
    }
    let mut table = Table::new(["#", "Code", "Course", "Score", "Content", "Collab", "Why"]);
    for (rank, r) in results.iter().enumerate() {
        let score = if r.boosted { format!("{:.1}*", r.score) } else { format!("{:.1}", r.score) };
        table.add_row(vec![
            (rank + 1).to_string(),
            r.course_code.clone(),
            r.course_name.clone(),
            score,
            format!("{:.1}", r.content_score),
            format!("{:.1}", r.collaborative_score),
            r.explanation.clone(),
        ]);
    }
    table.render()
}

pub fn render_courses_table(courses: &[Course]) -> String {
    let mut table = Table::new(["Code", "Course", "Level", "Credits", "Kulliyyah", "Open", "Skills"]);
    for course in courses {
        table.add_row(vec![
            course.code.clone(),
            course.name.clone(),
            course.level.to_string(),
            course.credit_hours.map(|c| c.to_string()).unwrap_or_default(),
            course.kulliyyah.clone().unwrap_or_default(),
            if course.available { "yes" } else { "no" }.to_string(),
            course.skills.join(", "),
        ]);
    }
    table.render()
}

pub fn render_evaluation_table(report: &EvaluationReport) -> String {
    let mut out = format!(
        "Students evaluated: {}\nRelevance threshold: {} stars\n\n",
        report.students_evaluated, report.relevance_threshold
    );
    let mut table = Table::new(["K", "Precision", "Recall", "Hit rate"]);
    for m in &report.metrics {
        table.add_row(vec![
            m.k.to_string(),
            format!("{:.3}", m.precision),
            format!("{:.3}", m.recall),
            format!("{:.3}", m.hit_rate),
        ]);
    }
    out.push_str(&table.render());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MetricsAtK;

    #[test]
    fn columns_align_by_display_width() {
        console::set_colors_enabled(false);
        let mut table = Table::new(["Code", "Name"]);
        table.add_row(vec!["A1".into(), "日本語".into()]);
        table.add_row(vec!["LONGCODE".into(), "x".into()]);
        let rendered = table.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "Code      Name");
        assert_eq!(lines[1], "--------  ------");
        assert_eq!(lines[2], "A1        日本語");
        assert_eq!(lines[3], "LONGCODE  x");
    }

    #[test]
    fn empty_recommendations_print_a_notice() {
        assert_eq!(render_recommendations_table(&[]), "No recommendations available.\n");
    }

    #[test]
    fn boosted_scores_are_marked() {
        console::set_colors_enabled(false);
        let result = RecommendationResult {
            course_code: "EE100".into(),
            course_name: "Circuits".into(),
            description: String::new(),
            level: 1,
            credit_hours: None,
            kulliyyah: Some("KOE".into()),
            skills: Vec::new(),
            score: 60.0,
            content_score: 40.0,
            collaborative_score: 0.0,
            alpha: 0.9,
            boosted: true,
            explanation: "Matches your preferred kulliyyah (KOE) • 60% match".into(),
        };
        let rendered = render_recommendations_table(&[result]);
        assert!(rendered.contains("60.0*"));
        assert!(rendered.contains("Matches your preferred kulliyyah (KOE)"));
    }

    #[test]
    fn evaluation_table_lists_every_k() {
        console::set_colors_enabled(false);
        let report = EvaluationReport {
            students_evaluated: 2,
            relevance_threshold: 4,
            metrics: vec![
                MetricsAtK { k: 3, precision: 0.5, recall: 0.25, hit_rate: 1.0 },
                MetricsAtK { k: 5, precision: 0.2, recall: 0.5, hit_rate: 1.0 },
            ],
        };
        let rendered = render_evaluation_table(&report);
        assert!(rendered.starts_with("Students evaluated: 2"));
        assert!(rendered.contains("0.500"));
        assert_eq!(rendered.lines().filter(|l| l.starts_with('5')).count(), 1);
    }
}
