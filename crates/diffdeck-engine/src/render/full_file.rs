use crate::model::DiffLine;
use similar::{ChangeTag, TextDiff};

/// Render the whole new file with changed lines marked inline.
pub fn render_full_file(old_content: &str, new_content: &str) -> Vec<DiffLine> {
    let diff = TextDiff::from_lines(old_content, new_content);
    diff.iter_all_changes()
        .map(|change| {
            let content = change.value().trim_end_matches(['\r', '\n']);
            let old_line = change.old_index().map(|i| i as u32 + 1);
            let new_line = change.new_index().map(|i| i as u32 + 1);
            let mut line = match change.tag() {
                ChangeTag::Equal => {
                    DiffLine::context(content, old_line.unwrap_or(0), new_line.unwrap_or(0))
                }
                ChangeTag::Delete => DiffLine::deletion(content, old_line.unwrap_or(0)),
                ChangeTag::Insert => DiffLine::addition(content, new_line.unwrap_or(0)),
            };
            line.missing_newline = change.missing_newline();
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LineKind;

    #[test]
    fn test_full_file_marks_changes() {
        let lines = render_full_file("a\nb\nc\n", "a\nB\nc\nd\n");
        let kinds: Vec<(LineKind, &str)> =
            lines.iter().map(|l| (l.kind, l.content.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (LineKind::Context, "a"),
                (LineKind::Deletion, "b"),
                (LineKind::Addition, "B"),
                (LineKind::Context, "c"),
                (LineKind::Addition, "d"),
            ]
        );
        assert_eq!(lines[4].new_line, Some(4));
    }

    #[test]
    fn test_full_file_of_new_file() {
        let lines = render_full_file("", "x\ny");
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.kind == LineKind::Addition));
        assert!(lines[1].missing_newline);
    }
}
