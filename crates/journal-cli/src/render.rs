//! Markdown text shown to MCP clients and printed by the CLI.

use std::fmt::Write;

use journal_core::{EntryPage, NumberedEntry, SearchResult, SectionView, TocNode, to_iso8601};
use journal_store::WriteOutcome;

pub fn not_found(path: &str) -> String {
    format!("Journal section '{path}' not found")
}

pub fn section(view: &SectionView) -> String {
    let mut out = format!("# Journal Section: {}\n\n", view.path);

    out.push_str("## Overview\n\n");
    if view.overview.is_empty() {
        out.push_str("*No overview yet*\n\n");
    } else {
        let _ = write!(out, "{}\n\n", view.overview);
    }

    if !view.recent_entries.is_empty() {
        let _ = write!(
            out,
            "## Recent Entries ({} of {})\n\n",
            view.recent_entries.len(),
            view.total_entries
        );
        for numbered in &view.recent_entries {
            entry_block(&mut out, "###", numbered);
        }
    }

    if !view.subsections.is_empty() {
        out.push_str("## Subsections\n\n");
        for name in &view.subsections {
            let _ = writeln!(out, "- {name}");
        }
    }
    out
}

pub fn write_outcome(outcome: &WriteOutcome) -> String {
    let mut out = format!("Added entry to journal section '{}'", outcome.path);
    if outcome.overview_updated {
        out.push_str(" and updated overview");
    }
    out
}

pub fn search_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No matching entries found".to_string();
    }

    let mut out = format!("Found {} matching entries:\n\n", results.len());
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(out, "## Result {} (Score: {:.3})", i + 1, r.combined_score);
        let _ = writeln!(out, "**Section:** {}", r.section_path);
        let _ = writeln!(out, "**Work Context:** {}", r.entry.work_context);
        let _ = writeln!(out, "**Timestamp:** {}", to_iso8601(&r.entry.timestamp));
        let _ = write!(
            out,
            "**Scores:** Context={:.3}, Content={:.3}, Temporal={:.3}\n\n",
            r.work_context_score, r.content_score, r.temporal_score
        );
        let _ = write!(out, "{}\n\n---\n\n", r.entry.content);
    }
    out
}

pub fn toc(nodes: &[TocNode]) -> String {
    fn walk(out: &mut String, nodes: &[TocNode], depth: usize) {
        for node in nodes {
            let _ = writeln!(
                out,
                "{}- **{}** ({} entries)",
                "  ".repeat(depth),
                node.name,
                node.entry_count
            );
            walk(out, &node.children, depth + 1);
        }
    }

    let mut out = String::from("# Journal Table of Contents\n\n");
    walk(&mut out, nodes, 0);
    out
}

pub fn entry_page(path: &str, page: &EntryPage) -> String {
    match page {
        EntryPage::NoEntries => format!("No entries in journal section '{path}'"),
        EntryPage::PastEnd { .. } => "No more entries".to_string(),
        EntryPage::Entries { total, entries } => {
            let mut out = format!("# Entries from {path} ({} of {total})\n\n", entries.len());
            for numbered in entries {
                entry_block(&mut out, "##", numbered);
                out.push_str("---\n\n");
            }
            out
        }
    }
}

fn entry_block(out: &mut String, heading: &str, numbered: &NumberedEntry) {
    let entry = &numbered.entry;
    let _ = writeln!(out, "{heading} Entry {}", numbered.number);
    let _ = writeln!(out, "**Work Context:** {}", entry.work_context);
    let _ = write!(out, "**Timestamp:** {}\n\n", to_iso8601(&entry.timestamp));
    let _ = write!(out, "{}\n\n", entry.content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use journal_core::{Entry, Journal};

    fn journal() -> Journal {
        let ts = Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap();
        let mut journal = Journal::new();
        let alpha = journal.create_section("alpha").unwrap();
        alpha.overview = "Auth work".into();
        alpha.push_entry(Entry::at("setup", "first", ts));
        alpha.push_entry(Entry::at("auth", "second", ts));
        journal.create_section("alpha/api").unwrap();
        journal.create_section("beta").unwrap();
        journal
    }

    #[test]
    fn test_section_with_entries() {
        let journal = journal();
        let view = SectionView::of(journal.get_section("alpha").unwrap(), true, 5);
        let text = section(&view);

        assert!(text.starts_with("# Journal Section: alpha\n\n## Overview\n\nAuth work\n\n"));
        assert!(text.contains("## Recent Entries (2 of 2)\n\n### Entry 2\n**Work Context:** auth\n"));
        assert!(text.contains("**Timestamp:** 2025-06-20T12:00:00.000000Z\n\nsecond\n\n### Entry 1\n"));
        assert!(text.ends_with("## Subsections\n\n- api\n"));
    }

    #[test]
    fn test_section_without_overview_or_entries() {
        let journal = journal();
        let view = SectionView::of(journal.get_section("beta").unwrap(), true, 5);
        assert_eq!(
            section(&view),
            "# Journal Section: beta\n\n## Overview\n\n*No overview yet*\n\n"
        );
    }

    #[test]
    fn test_write_outcome_text() {
        let mut outcome = WriteOutcome {
            path: "alpha".into(),
            overview_updated: false,
            entry_number: 3,
        };
        assert_eq!(write_outcome(&outcome), "Added entry to journal section 'alpha'");
        outcome.overview_updated = true;
        assert_eq!(
            write_outcome(&outcome),
            "Added entry to journal section 'alpha' and updated overview"
        );
    }

    #[test]
    fn test_toc_indentation() {
        let nodes = journal_core::toc(&journal(), 3);
        assert_eq!(
            toc(&nodes),
            "# Journal Table of Contents\n\n\
             - **alpha** (2 entries)\n  - **api** (0 entries)\n- **beta** (0 entries)\n"
        );
    }

    #[test]
    fn test_entry_page_variants() {
        let journal = journal();
        let alpha = journal.get_section("alpha").unwrap();

        let text = entry_page("alpha", &EntryPage::of(alpha, 1, 0));
        assert!(text.starts_with("# Entries from alpha (1 of 2)\n\n## Entry 2\n"));
        assert!(text.ends_with("second\n\n---\n\n"));

        assert_eq!(
            entry_page("alpha", &EntryPage::PastEnd { total: 2 }),
            "No more entries"
        );
        assert_eq!(
            entry_page("beta", &EntryPage::NoEntries),
            "No entries in journal section 'beta'"
        );
    }

    #[test]
    fn test_empty_search() {
        assert_eq!(search_results(&[]), "No matching entries found");
    }

    #[test]
    fn test_search_block() {
        let entry = Entry::at(
            "auth",
            "JWT tokens",
            Utc.with_ymd_and_hms(2025, 6, 20, 12, 0, 0).unwrap(),
        );
        let results = vec![SearchResult {
            section_path: "alpha".into(),
            entry_index: 0,
            entry,
            work_context_score: 1.0,
            content_score: 0.25,
            combined_score: 0.625,
            temporal_score: 1.0,
        }];
        let text = search_results(&results);
        assert!(text.starts_with("Found 1 matching entries:\n\n## Result 1 (Score: 0.625)\n"));
        assert!(text.contains("**Section:** alpha\n"));
        assert!(text.contains("**Scores:** Context=1.000, Content=0.250, Temporal=1.000\n\nJWT tokens\n\n---\n\n"));
    }
}
