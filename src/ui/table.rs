//! Reference table of routing rules, shown for `!` / `helpme`

use console::{measure_text_width, pad_str, Alignment};

use super::theme::ChatTheme;
use crate::ai::router::RoutingRule;

const HEADERS: [&str; 4] = ["Model", "First Keyword", "Other Keywords", "Role"];

/// One printable row per rule
struct Row {
    cells: [String; 4],
    example: String,
}

impl Row {
    fn from_rule(rule: &RoutingRule) -> Self {
        let first = rule.keywords.first().cloned().unwrap_or_default();
        let others = rule.keywords.iter().skip(1).cloned().collect::<Vec<_>>().join(", ");
        let role = if rule.description.is_empty() {
            rule.role.clone()
        } else {
            rule.description.clone()
        };

        Self {
            cells: [rule.model.clone(), first, others, role],
            example: rule.example.clone(),
        }
    }
}

/// Render the rule table in declaration order (first match wins)
pub fn help_table(rules: &[RoutingRule]) -> String {
    let theme = ChatTheme::new();
    let rows: Vec<Row> = rules.iter().map(Row::from_rule).collect();

    let mut widths = HEADERS.map(measure_text_width);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.cells.iter()) {
            *width = (*width).max(measure_text_width(cell));
        }
    }
    let total: usize = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);

    let mut out = String::new();
    let header: Vec<String> = HEADERS
        .iter()
        .zip(widths.iter())
        .map(|(h, w)| theme.heading.apply_to(pad_str(h, *w, Alignment::Left, None)).to_string())
        .collect();
    out.push_str(&header.join(" │ "));
    out.push('\n');
    out.push_str(&theme.muted.apply_to("─".repeat(total)).to_string());
    out.push('\n');

    for row in &rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, w))| {
                let padded = pad_str(cell, *w, Alignment::Left, None).to_string();
                match i {
                    0 => theme.success.apply_to(padded).bold().to_string(),
                    1 => theme.accent.apply_to(padded).to_string(),
                    _ => padded,
                }
            })
            .collect();
        out.push_str(cells.join(" │ ").trim_end());
        out.push('\n');

        if !row.example.is_empty() {
            out.push_str(&format!(
                "  {} {}\n",
                theme.primary.apply_to("Example:").bold(),
                row.example
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_rules;

    #[test]
    fn test_table_lists_every_rule_in_order() {
        let table = console::strip_ansi_codes(&help_table(&default_rules())).to_string();
        let lines: Vec<&str> = table.lines().collect();

        assert!(lines[0].starts_with("Model"));
        assert!(lines[0].contains("Other Keywords"));

        let code = table.find("code").unwrap();
        let essay = table.find("essay").unwrap();
        let story = table.find("story").unwrap();
        let social = table.find("social media").unwrap();
        assert!(code < essay && essay < story && story < social);

        assert!(table.contains("narrative, tale, fable"));
        assert_eq!(table.matches("Example:").count(), 4);
        assert!(table.contains("Tell me a story about AI."));
    }

    #[test]
    fn test_role_used_when_description_missing() {
        let rules = vec![RoutingRule::new(&["poem"], "poet", "You write verse.")];
        let table = console::strip_ansi_codes(&help_table(&rules)).to_string();
        assert!(table.contains("You write verse."));
        assert!(!table.contains("Example:"));
    }
}
