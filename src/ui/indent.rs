//! Auto-indent rules for the code editor. Cursors are char indices, the
//! same unit egui's `CCursor` uses.

/// Byte offset of the `cursor`-th char, clamped to the end of `text`.
fn byte_offset(text: &str, cursor: usize) -> usize {
    text.char_indices()
        .nth(cursor)
        .map(|(offset, _)| offset)
        .unwrap_or(text.len())
}

fn line_start(text: &str, offset: usize) -> usize {
    text[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(text: &str, offset: usize) -> usize {
    text[offset..].find('\n').map(|i| offset + i).unwrap_or(text.len())
}

fn leading_whitespace(line: &str) -> &str {
    let end = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..end]
}

/// After a newline typed just before `cursor`, copies the previous line's
/// leading whitespace. Returns the new cursor.
pub fn indent_new_line(text: &mut String, cursor: usize) -> usize {
    let offset = byte_offset(text, cursor);
    if offset == 0 || !text[..offset].ends_with('\n') {
        return cursor;
    }

    let newline = offset - 1;
    let previous = &text[line_start(text, newline)..newline];
    let indent = leading_whitespace(previous).to_string();
    if indent.is_empty() {
        return cursor;
    }

    text.insert_str(offset, &indent);
    cursor + indent.chars().count()
}

/// When a `}` typed just before `cursor` is alone on its line, removes one
/// indent level from that line. Returns the new cursor.
pub fn dedent_closing_brace(text: &mut String, cursor: usize, indent_width: usize) -> usize {
    let offset = byte_offset(text, cursor);
    if !text[..offset].ends_with('}') {
        return cursor;
    }

    let start = line_start(text, offset);
    let end = line_end(text, offset);
    if text[start..end].trim() != "}" {
        return cursor;
    }

    let indent = leading_whitespace(&text[start..end]);
    let removed = if indent.ends_with('\t') {
        1
    } else {
        indent.len().min(indent_width)
    };
    if removed == 0 {
        return cursor;
    }

    let indent_end = start + indent.len();
    text.replace_range(indent_end - removed..indent_end, "");
    cursor - removed
}

/// Applies the rule for `ch`, the character just typed before `cursor`.
pub fn on_char_added(text: &mut String, cursor: usize, ch: char, indent_width: usize) -> usize {
    match ch {
        '\n' => indent_new_line(text, cursor),
        '}' => dedent_closing_brace(text, cursor, indent_width),
        _ => cursor,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_line_copies_indentation() {
        let mut text = String::from("void main()\n{\n    float x;\n");
        let cursor = text.chars().count();

        let cursor = indent_new_line(&mut text, cursor);

        assert_eq!(text, "void main()\n{\n    float x;\n    ");
        assert_eq!(cursor, text.chars().count());
    }

    #[test]
    fn test_new_line_in_middle_of_text() {
        let mut text = String::from("\tif (a) {\n}");
        let cursor = indent_new_line(&mut text, 10);
        assert_eq!(text, "\tif (a) {\n\t}");
        assert_eq!(cursor, 11);
    }

    #[test]
    fn test_new_line_without_indent_is_unchanged() {
        let mut text = String::from("a;\n");
        assert_eq!(indent_new_line(&mut text, 3), 3);
        assert_eq!(text, "a;\n");
    }

    #[test]
    fn test_new_line_with_multibyte_chars() {
        let mut text = String::from("  // héllo\n");
        let cursor = text.chars().count();
        let cursor = indent_new_line(&mut text, cursor);
        assert_eq!(text, "  // héllo\n  ");
        assert_eq!(cursor, 13);
    }

    #[test]
    fn test_lone_brace_dedents() {
        let mut text = String::from("{\n    x;\n    }");
        let cursor = text.chars().count();

        let cursor = dedent_closing_brace(&mut text, cursor, 4);

        assert_eq!(text, "{\n    x;\n}");
        assert_eq!(cursor, text.chars().count());
    }

    #[test]
    fn test_brace_after_code_not_dedented() {
        let mut text = String::from("    x = vec2(1.0); }");
        let cursor = text.chars().count();
        assert_eq!(dedent_closing_brace(&mut text, cursor, 4), cursor);
        assert_eq!(text, "    x = vec2(1.0); }");
    }

    #[test]
    fn test_tab_indent_dedents_one_tab() {
        let mut text = String::from("\t\t}\nrest");
        let cursor = dedent_closing_brace(&mut text, 3, 4);
        assert_eq!(text, "\t}\nrest");
        assert_eq!(cursor, 2);
    }

    #[test]
    fn test_short_indent_dedents_to_zero() {
        let mut text = String::from("  }");
        let cursor = on_char_added(&mut text, 3, '}', 4);
        assert_eq!(text, "}");
        assert_eq!(cursor, 1);
    }

    #[test]
    fn test_other_chars_ignored() {
        let mut text = String::from("    a");
        assert_eq!(on_char_added(&mut text, 5, 'a', 4), 5);
        assert_eq!(text, "    a");
    }
}
