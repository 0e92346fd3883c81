//! Navigation outline building.
//!
//! Turns a chapter's flat, document-order heading sequence (levels 2-6)
//! into a nested ordered-list structure mirroring the heading hierarchy.
//!
//! Construction walks the sequence with an explicit stack of open lists:
//! a heading less significant than the last entry opens a nested list, an
//! equally significant one is a sibling, and a more significant one closes
//! open lists back down before joining as a sibling. Level jumps (a level-2
//! heading directly followed by a level-5) are accepted as-is; the deeper
//! heading simply becomes a direct child. The serialized output is always
//! balanced.

use std::fmt::Write;

use buku_renderer::{Heading, escape_html};

/// One navigation entry: a heading rendered as a linked list item,
/// possibly with nested children.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavEntry {
    /// Display text (chapter-number prefix already applied).
    pub title: String,
    /// Link target (`#id`, or `<prefix>#id` for cross-chapter links).
    pub href: String,
    /// Nested child entries.
    pub children: Vec<NavEntry>,
}

/// Options controlling entry link targets and titles.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutlineOptions<'a> {
    /// Prefix for link targets, e.g. the owning chapter's output file name.
    /// In-chapter outlines leave this unset and link to bare `#id` anchors.
    pub href_prefix: Option<&'a str>,
    /// Chapter number to prefix entry titles with (`N. Title`).
    pub number: Option<usize>,
}

/// A nested navigation outline built from a flat heading sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Outline {
    entries: Vec<NavEntry>,
}

/// An open list under construction. `level` tracks the most recent entry,
/// which is what the next heading is compared against.
struct Frame {
    level: u8,
    entries: Vec<NavEntry>,
}

impl Outline {
    /// Build an outline from a document-order heading sequence.
    ///
    /// Pure and total: any well-formed heading sequence produces a balanced
    /// outline, including sequences that skip levels. An empty sequence
    /// produces an empty outline.
    #[must_use]
    pub fn from_headings(headings: &[Heading], opts: &OutlineOptions<'_>) -> Self {
        let mut frames = vec![Frame {
            level: 0,
            entries: Vec::new(),
        }];

        for heading in headings {
            let entry = NavEntry::from_heading(heading, opts);
            let top_level = frames.last().map_or(0, |f| f.level);
            let top_empty = frames.last().is_none_or(|f| f.entries.is_empty());

            if top_empty || heading.level == top_level {
                push_sibling(&mut frames, heading.level, entry);
            } else if heading.level > top_level {
                frames.push(Frame {
                    level: heading.level,
                    entries: vec![entry],
                });
            } else {
                // More significant: close nested lists it outranks, then
                // join the surviving list as a sibling.
                while frames.len() > 1 && frames.last().is_some_and(|f| heading.level < f.level) {
                    close_frame(&mut frames);
                }
                push_sibling(&mut frames, heading.level, entry);
            }
        }

        while frames.len() > 1 {
            close_frame(&mut frames);
        }

        Self {
            entries: frames.pop().map_or_else(Vec::new, |f| f.entries),
        }
    }

    /// Whether the outline has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Top-level entries.
    #[must_use]
    pub fn entries(&self) -> &[NavEntry] {
        &self.entries
    }

    /// Serialize to nested `<ol>`/`<li>` markup.
    ///
    /// An empty outline serializes to the empty string. Every opened list
    /// is closed exactly once.
    #[must_use]
    pub fn to_html(&self) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let mut out = String::new();
        write_list(&mut out, &self.entries);
        out
    }
}

impl NavEntry {
    fn from_heading(heading: &Heading, opts: &OutlineOptions<'_>) -> Self {
        let title = match opts.number {
            Some(n) => format!("{n}. {}", heading.title),
            None => heading.title.clone(),
        };
        let href = match opts.href_prefix {
            Some(prefix) => format!("{prefix}#{}", heading.id),
            None => format!("#{}", heading.id),
        };
        Self {
            title,
            href,
            children: Vec::new(),
        }
    }
}

/// Emit `entry` as a sibling in the innermost open list.
fn push_sibling(frames: &mut [Frame], level: u8, entry: NavEntry) {
    if let Some(top) = frames.last_mut() {
        top.level = level;
        top.entries.push(entry);
    }
}

/// Close the innermost open list, attaching it as children of the last
/// entry in the enclosing list.
fn close_frame(frames: &mut Vec<Frame>) {
    if let Some(frame) = frames.pop()
        && let Some(parent) = frames.last_mut().and_then(|f| f.entries.last_mut())
    {
        parent.children = frame.entries;
    }
}

fn write_list(out: &mut String, entries: &[NavEntry]) {
    out.push_str("<ol>");
    for entry in entries {
        write!(
            out,
            r#"<li><a href="{}">{}</a>"#,
            escape_html(&entry.href),
            escape_html(&entry.title)
        )
        .unwrap();
        if !entry.children.is_empty() {
            write_list(out, &entry.children);
        }
        out.push_str("</li>");
    }
    out.push_str("</ol>");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn h(level: u8, title: &str, id: &str) -> Heading {
        Heading {
            level,
            title: title.to_owned(),
            id: id.to_owned(),
        }
    }

    fn outline(headings: &[Heading]) -> String {
        Outline::from_headings(headings, &OutlineOptions::default()).to_html()
    }

    fn assert_balanced(html: &str) {
        assert_eq!(html.matches("<ol>").count(), html.matches("</ol>").count());
        assert_eq!(html.matches("<li>").count(), html.matches("</li>").count());
    }

    #[test]
    fn empty_sequence_yields_empty_outline() {
        let o = Outline::from_headings(&[], &OutlineOptions::default());
        assert!(o.is_empty());
        assert_eq!(o.to_html(), "");
    }

    #[test]
    fn flat_same_level_headings_are_siblings() {
        let headings: Vec<Heading> = (1..=5)
            .map(|i| h(2, &format!("S{i}"), &format!("s{i}")))
            .collect();
        let html = outline(&headings);
        assert_eq!(
            html,
            "<ol>\
             <li><a href=\"#s1\">S1</a></li>\
             <li><a href=\"#s2\">S2</a></li>\
             <li><a href=\"#s3\">S3</a></li>\
             <li><a href=\"#s4\">S4</a></li>\
             <li><a href=\"#s5\">S5</a></li>\
             </ol>"
        );
        // Single list, no nesting
        assert_eq!(html.matches("<ol>").count(), 1);
    }

    #[test]
    fn strictly_increasing_nests_three_deep() {
        let html = outline(&[h(2, "A", "a"), h(3, "B", "b"), h(4, "C", "c")]);
        assert_eq!(
            html,
            "<ol><li><a href=\"#a\">A</a>\
             <ol><li><a href=\"#b\">B</a>\
             <ol><li><a href=\"#c\">C</a></li></ol>\
             </li></ol>\
             </li></ol>"
        );
        assert_eq!(html.matches("<ol>").count(), 3);
    }

    #[test]
    fn increase_then_return_closes_nested_list() {
        let html = outline(&[h(2, "A", "a"), h(3, "B", "b"), h(2, "C", "c")]);
        assert_eq!(
            html,
            "<ol><li><a href=\"#a\">A</a>\
             <ol><li><a href=\"#b\">B</a></li></ol>\
             </li>\
             <li><a href=\"#c\">C</a></li></ol>"
        );
    }

    #[test]
    fn level_jump_becomes_direct_child() {
        // 2 -> 5 skips intermediate levels; accepted as-is
        let html = outline(&[h(2, "A", "a"), h(5, "B", "b")]);
        assert_eq!(
            html,
            "<ol><li><a href=\"#a\">A</a>\
             <ol><li><a href=\"#b\">B</a></li></ol>\
             </li></ol>"
        );
    }

    #[test]
    fn partial_return_joins_enclosing_list() {
        // 3 after [2, 4] closes the level-4 list and lands next to the
        // level-2 entry, not inside it.
        let html = outline(&[h(2, "A", "a"), h(4, "B", "b"), h(3, "C", "c")]);
        assert_eq!(
            html,
            "<ol><li><a href=\"#a\">A</a>\
             <ol><li><a href=\"#b\">B</a></li></ol>\
             </li>\
             <li><a href=\"#c\">C</a></li></ol>"
        );
        assert_balanced(&html);
    }

    #[test]
    fn rise_above_first_heading_stays_balanced() {
        // First heading is deeper than a later one; output stays flat
        // and balanced rather than closing the root list early.
        let html = outline(&[h(3, "A", "a"), h(2, "B", "b")]);
        assert_eq!(
            html,
            "<ol><li><a href=\"#a\">A</a></li><li><a href=\"#b\">B</a></li></ol>"
        );
    }

    #[test]
    fn mixed_sequence_balanced() {
        let html = outline(&[
            h(2, "A", "a"),
            h(3, "B", "b"),
            h(4, "C", "c"),
            h(3, "D", "d"),
            h(2, "E", "e"),
            h(6, "F", "f"),
        ]);
        assert_balanced(&html);
        // trailing deep heading closed by the final drain
        assert!(html.ends_with("</li></ol></li></ol>"));
    }

    #[test]
    fn equal_levels_in_nested_list() {
        let html = outline(&[h(2, "A", "a"), h(3, "B", "b"), h(3, "C", "c")]);
        assert_eq!(
            html,
            "<ol><li><a href=\"#a\">A</a>\
             <ol><li><a href=\"#b\">B</a></li><li><a href=\"#c\">C</a></li></ol>\
             </li></ol>"
        );
    }

    #[test]
    fn href_prefix_for_cross_chapter_links() {
        let opts = OutlineOptions {
            href_prefix: Some("intro.html"),
            number: None,
        };
        let html = Outline::from_headings(&[h(2, "A", "a")], &opts).to_html();
        assert_eq!(html, "<ol><li><a href=\"intro.html#a\">A</a></li></ol>");
    }

    #[test]
    fn number_prefixes_entry_titles() {
        let opts = OutlineOptions {
            href_prefix: None,
            number: Some(3),
        };
        let html = Outline::from_headings(&[h(2, "Setup", "setup")], &opts).to_html();
        assert_eq!(html, "<ol><li><a href=\"#setup\">3. Setup</a></li></ol>");
    }

    #[test]
    fn titles_are_escaped() {
        let html = outline(&[h(2, "A & B <tags>", "a-b-tags")]);
        assert!(html.contains("A &amp; B &lt;tags&gt;"));
    }

    #[test]
    fn tree_shape_accessible_via_entries() {
        let o = Outline::from_headings(
            &[h(2, "A", "a"), h(3, "B", "b"), h(2, "C", "c")],
            &OutlineOptions::default(),
        );
        assert_eq!(o.entries().len(), 2);
        assert_eq!(o.entries()[0].children.len(), 1);
        assert_eq!(o.entries()[0].children[0].title, "B");
        assert!(o.entries()[1].children.is_empty());
    }
}
