//! Enhanced markup rendering.
//!
//! Writes a parsed song back out as markup with resolved metadata headers,
//! canonical block keywords and French punctuation applied to lyric lines.

use crate::deck::ShowMeta;
use crate::normalize::PunctuationNormalizer;
use crate::types::ParsedSong;

fn push_directive(out: &mut Vec<String>, key: &str, value: &str) {
    if !value.is_empty() {
        out.push(format!("{{{}: {}}}", key, value));
    }
}

/// Render the enhanced markup for a song.
///
/// `meta` supplies the header directives (already normalized); section
/// content lines are normalized here, directive lines are copied verbatim.
pub fn render_enhanced(
    song: &ParsedSong,
    meta: &ShowMeta,
    normalizer: &PunctuationNormalizer,
) -> String {
    let mut out = Vec::new();

    push_directive(&mut out, "number", &meta.number);
    push_directive(&mut out, "title", &meta.title);
    push_directive(&mut out, "lyricist", &meta.author);
    push_directive(&mut out, "composer", &meta.composer);
    push_directive(&mut out, "copyright", &meta.copyright);
    push_directive(&mut out, "year", &meta.year);
    push_directive(&mut out, "key", &meta.key);
    out.push(String::new());

    for section in &song.sections {
        let keyword = section.section_type.as_str();
        if let Some(label) = &section.label {
            out.push(format!("{{c: {}}}", label));
        }
        out.push(format!("{{start_of_{}}}", keyword));
        out.extend(
            section
                .content
                .iter()
                .map(|line| normalizer.normalize_markup_line(line)),
        );
        out.push(format!("{{end_of_{}}}", keyword));
        out.push(String::new());
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NBSP;
    use crate::parser::MarkupParser;
    use crate::section_type::{default_label_rules, SectionTypeResolver};
    use crate::types::SectionType;

    fn parse(text: &str) -> ParsedSong {
        let rules = default_label_rules();
        MarkupParser::new(SectionTypeResolver::new(&rules)).parse(text)
    }

    #[test]
    fn test_render_headers_and_sections() {
        let song = parse("{c: Refrain}\n{start_of_verse}\n[C]Viens !\n{end_of_verse}\n");
        let meta = ShowMeta {
            number: "jem001".to_string(),
            title: "Viens".to_string(),
            key: "C".to_string(),
            ..ShowMeta::default()
        };

        let text = render_enhanced(&song, &meta, &PunctuationNormalizer::new());

        let expected = format!(
            "{{number: jem001}}\n{{title: Viens}}\n{{key: C}}\n\n{{c: Refrain}}\n{{start_of_chorus}}\n[C]Viens{}!\n{{end_of_chorus}}\n",
            NBSP
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_directive_lines_are_not_normalized() {
        let song = parse("{start_of_verse}\n{c: Note : ici}\nA\n{end_of_verse}\n");
        let text = render_enhanced(&song, &ShowMeta::default(), &PunctuationNormalizer::new());
        assert!(text.contains("{c: Note : ici}"));
    }

    #[test]
    fn test_reparse_keeps_types_and_labels() {
        let source = "{title: T}\n{c: Strophe 1}\n{start_of_verse}\nA\n{end_of_verse}\n\
                      {start_of_chorus: Refrain}\nB\n{end_of_chorus}\n\
                      {start_of_pre-chorus}\nC\n{end_of_pre-chorus}\n";
        let song = parse(source);
        let meta = ShowMeta {
            title: "T".to_string(),
            ..ShowMeta::default()
        };

        let reparsed = parse(&render_enhanced(&song, &meta, &PunctuationNormalizer::new()));

        let summary = |song: &ParsedSong| -> Vec<(SectionType, Option<String>)> {
            song.sections
                .iter()
                .map(|s| (s.section_type.clone(), s.label.clone()))
                .collect()
        };
        assert_eq!(summary(&reparsed), summary(&song));
        assert_eq!(reparsed.sections[2].section_type, SectionType::PreChorus);
        assert_eq!(reparsed.directives.get("title"), Some("T"));
    }

    #[test]
    fn test_empty_song_has_only_headers() {
        let meta = ShowMeta {
            title: "Seul".to_string(),
            ..ShowMeta::default()
        };
        let text = render_enhanced(&ParsedSong::default(), &meta, &PunctuationNormalizer::new());
        assert_eq!(text, "{title: Seul}\n");
    }
}
