/// Splits a page's markdown into sections by heading, tracking a heading
/// stack so each section carries the path of headings that contain it.
/// Heading-like lines inside a fenced code block never start a section.
pub struct Section {
    pub heading_path: Vec<String>,
    pub section_title: Option<String>,
    pub lines: Vec<String>,
}

fn is_fence_toggle(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

fn heading_level(line: &str) -> Option<(usize, String)> {
    let bytes = line.as_bytes();
    let mut level = 0;
    while level < bytes.len() && bytes[level] == b'#' && level < 6 {
        level += 1;
    }
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    let title = rest[1..].trim();
    if title.is_empty() {
        return None;
    }
    Some((level, title.to_string()))
}

pub fn sectionize(markdown: &str, heading_path_depth: usize) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut heading_stack: Vec<Option<String>> = Vec::new();
    let mut current_path: Vec<String> = Vec::new();
    let mut current_title: Option<String> = None;
    let mut current_lines: Vec<String> = Vec::new();
    let mut in_fence = false;
    let mut any_heading_seen = false;

    let flush = |sections: &mut Vec<Section>, path: Vec<String>, title: Option<String>, lines: Vec<String>| {
        if lines.iter().any(|l| !beacon_core::text::normalize(l).is_empty()) {
            sections.push(Section {
                heading_path: path,
                section_title: title,
                lines,
            });
        }
    };

    for line in markdown.lines() {
        if is_fence_toggle(line) {
            in_fence = !in_fence;
            current_lines.push(line.to_string());
            continue;
        }
        if !in_fence {
            if let Some((level, title)) = heading_level(line) {
                any_heading_seen = true;
                flush(&mut sections, current_path.clone(), current_title.take(), std::mem::take(&mut current_lines));

                if heading_stack.len() < level {
                    heading_stack.resize(level, None);
                }
                heading_stack[level - 1] = Some(title.clone());
                heading_stack.truncate(level);

                current_path = heading_stack
                    .iter()
                    .filter_map(|s| s.clone())
                    .take(heading_path_depth)
                    .collect();
                current_title = Some(title);
                continue;
            }
        }
        current_lines.push(line.to_string());
    }
    flush(&mut sections, current_path, current_title, current_lines);

    if sections.is_empty() && !any_heading_seen {
        let body = markdown.to_string();
        if !beacon_core::text::normalize(&body).is_empty() {
            sections.push(Section {
                heading_path: Vec::new(),
                section_title: None,
                lines: body.lines().map(str::to_string).collect(),
            });
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_by_heading_and_tracks_path() {
        let md = "# A\npara a\n## B\npara b\n# C\npara c\n";
        let sections = sectionize(md, 4);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections[0].heading_path, vec!["A".to_string()]);
        assert_eq!(sections[1].heading_path, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(sections[2].heading_path, vec!["C".to_string()]);
    }

    #[test]
    fn heading_like_line_inside_fence_is_not_a_section() {
        let md = "# Real\ntext\n```\n# not a heading\n```\nmore\n";
        let sections = sectionize(md, 4);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].lines.iter().any(|l| l.contains("not a heading")));
    }

    #[test]
    fn no_headings_yields_single_section() {
        let md = "just some text\nmore text\n";
        let sections = sectionize(md, 4);
        assert_eq!(sections.len(), 1);
        assert!(sections[0].heading_path.is_empty());
    }

    #[test]
    fn empty_page_yields_no_sections() {
        let sections = sectionize("", 4);
        assert!(sections.is_empty());
    }
}
