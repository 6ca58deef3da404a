//! Merge behaviour over complete `.docx` packages
//!
//! Run with: cargo test -p docx-merge --test merge_tests

#[path = "common/fixture.rs"]
mod fixture;

use docx_merge::{
    merge, merge_with_options, outline, paragraph_texts, Block, MergeError, MergeOptions,
};
use fixture::{
    bold_run, document_xml, docx, package, paragraph, run, styled_paragraph, table,
};
use letter_types::SubstitutionMap;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn subs(pairs: &[(&str, &str)]) -> SubstitutionMap {
    pairs.iter().copied().collect()
}

fn texts(bytes: &[u8]) -> Vec<String> {
    paragraph_texts(&outline(bytes).unwrap())
}

fn styles(bytes: &[u8]) -> Vec<Option<String>> {
    outline(bytes)
        .unwrap()
        .into_iter()
        .filter_map(|b| match b {
            Block::Paragraph { style, .. } => Some(style),
            Block::Table { .. } => None,
        })
        .collect()
}

// ============================================================================
// Keyword Replacement
// ============================================================================

#[test]
fn test_keyword_in_single_run() {
    let input = docx(&paragraph(&[run("Hello [Name], bye")]));
    let output = merge(&input, &subs(&[("[Name]", "World")])).unwrap();

    assert_eq!(texts(&output), vec!["Hello World, bye"]);
    assert_eq!(document_xml(&output).matches("<w:r>").count(), 1);
}

#[test]
fn test_keyword_split_across_runs() {
    let input = docx(&paragraph(&[run("Dear "), run("[Na"), run("me]"), run(",")]));
    let output = merge(&input, &subs(&[("[Name]", "World")])).unwrap();

    assert_eq!(texts(&output), vec!["Dear World,"]);
    let xml = document_xml(&output);
    // the emptied run stays as a placeholder
    assert_eq!(xml.matches("<w:r>").count() + xml.matches("<w:r/>").count(), 4);
    assert!(xml.contains("<w:r/>"));
}

#[test]
fn test_keyword_split_over_three_formatted_runs() {
    let input = docx(&paragraph(&[bold_run("[Cli"), run("ent"), run("Name] Ltd")]));
    let output = merge(&input, &subs(&[("[ClientName]", "ACME")])).unwrap();

    assert_eq!(texts(&output), vec!["ACME Ltd"]);
    let xml = document_xml(&output);
    assert!(xml.contains(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">ACME Ltd</w:t></w:r>"#));
}

#[test]
fn test_every_occurrence_is_replaced() {
    let input = docx(&paragraph(&[run("[X] and "), run("[X]"), run(" again [X]")]));
    let output = merge(&input, &subs(&[("[X]", "y")])).unwrap();
    assert_eq!(texts(&output), vec!["y and y again y"]);
}

#[test]
fn test_runs_inside_hyperlinks_and_content_controls() {
    let body = format!(
        "<w:p><w:hyperlink>{}</w:hyperlink></w:p><w:sdt><w:sdtContent>{}</w:sdtContent></w:sdt>",
        run("[Link]"),
        paragraph(&[run("[Control]")])
    );
    let output = merge(&docx(&body), &subs(&[("[Link]", "site"), ("[Control]", "filled")])).unwrap();
    assert_eq!(texts(&output), vec!["site", "filled"]);
}

#[test]
fn test_keyword_in_table_cell() {
    let body = format!(
        "{}{}",
        paragraph(&[run("Fee: [Fee]")]),
        table(&[paragraph(&[run("[Fee]")]), paragraph(&[run("other")])])
    );
    let output = merge(&docx(&body), &subs(&[("[Fee]", "USD 500")])).unwrap();
    assert_eq!(texts(&output), vec!["Fee: USD 500", "USD 500", "other"]);
}

#[test]
fn test_nested_table_cell() {
    let inner = table(&[paragraph(&[run("[Deep]")])]);
    let body = table(&[inner]);
    let output = merge(&docx(&body), &subs(&[("[Deep]", "found")])).unwrap();
    assert_eq!(texts(&output), vec!["found"]);
}

#[test]
fn test_special_characters_are_escaped() {
    let input = docx(&paragraph(&[run("[Firm]")]));
    let output = merge(&input, &subs(&[("[Firm]", "Smith & Sons <LLP>")])).unwrap();
    assert_eq!(texts(&output), vec!["Smith & Sons <LLP>"]);
    assert!(document_xml(&output).contains("Smith &amp; Sons &lt;LLP&gt;"));
}

#[test]
fn test_tab_in_replacement_becomes_tab_element() {
    let input = docx(&paragraph(&[run("[Row]")]));
    let output = merge(&input, &subs(&[("[Row]", "a\tb")])).unwrap();
    assert_eq!(texts(&output), vec!["a\tb"]);
    assert!(document_xml(&output).contains("<w:tab/>"));
}

#[test]
fn test_page_break_survives_rewrite() {
    let body = r#"<w:p><w:r><w:t>[Page]</w:t><w:br w:type="page"/></w:r></w:p>"#;
    let output = merge(&docx(body), &subs(&[("[Page]", "end")])).unwrap();
    assert!(document_xml(&output).contains(r#"<w:br w:type="page"/>"#));
}

#[test]
fn test_second_occurrence_starting_in_span_last_run() {
    let input = docx(&paragraph(&[run("Dear [Na"), run("me] and [Na"), run("me]")]));
    let output = merge(&input, &subs(&[("[Name]", "World")])).unwrap();
    assert_eq!(texts(&output), vec!["Dear World and World"]);
}

#[test]
fn test_replacement_containing_its_keyword_is_not_reexpanded() {
    let input = docx(&paragraph(&[run("[X] and [X]")]));
    let output = merge(&input, &subs(&[("[X]", "[X][X]")])).unwrap();
    assert_eq!(texts(&output), vec!["[X][X] and [X][X]"]);
}

#[test]
fn test_soft_break_in_keyword_run_is_kept() {
    let body = r#"<w:p><w:r><w:t>Dear [Name]</w:t><w:br/><w:t>Regards</w:t></w:r></w:p>"#;
    let output = merge(&docx(body), &subs(&[("[Name]", "Bob")])).unwrap();

    assert_eq!(texts(&output), vec!["Dear Bob\nRegards"]);
    let xml = document_xml(&output);
    assert_eq!(xml.matches("<w:p>").count(), 1);
    assert!(xml.contains("<w:br/>"));
}

#[test]
fn test_strict_namespace_document() {
    let document = r#"<w:document xmlns:w="http://purl.oclc.org/ooxml/wordprocessingml/main"><w:body><w:p><w:r><w:t>[Name]</w:t></w:r></w:p></w:body></w:document>"#;
    let input = package(&[("word/document.xml", document)]);
    let output = merge(&input, &subs(&[("[Name]", "World")])).unwrap();
    assert_eq!(texts(&output), vec!["World"]);
}

// ============================================================================
// Multi-line Replacement
// ============================================================================

#[test]
fn test_newline_splits_into_paragraphs() {
    let input = docx(&paragraph(&[run("[Lines]")]));
    let output = merge(&input, &subs(&[("[Lines]", "Line1\nLine2")])).unwrap();
    assert_eq!(texts(&output), vec!["Line1", "Line2"]);
}

#[test]
fn test_split_keeps_order_and_following_paragraphs() {
    let body = format!(
        "{}{}",
        paragraph(&[run("[Lines]")]),
        paragraph(&[run("after")])
    );
    let output = merge(&docx(&body), &subs(&[("[Lines]", "a\r\nb\rc")])).unwrap();
    assert_eq!(texts(&output), vec!["a", "b", "c", "after"]);
}

#[test]
fn test_split_inside_table_cell_stays_in_cell() {
    let body = table(&[paragraph(&[run("[Lines]")]), paragraph(&[run("other")])]);
    let output = merge(&docx(&body), &subs(&[("[Lines]", "a\nb")])).unwrap();

    let para = |text: &str| Block::Paragraph {
        style: None,
        text: text.to_string(),
    };
    assert_eq!(
        outline(&output).unwrap(),
        vec![Block::Table {
            rows: vec![vec![vec![para("a"), para("b")], vec![para("other")]]],
        }]
    );
    let xml = document_xml(&output);
    assert_eq!(xml.matches("<w:tbl>").count(), 1);
    assert_eq!(xml.matches("<w:tr>").count(), 1);
    assert_eq!(xml.matches("<w:tc>").count(), 2);
}

#[test]
fn test_multiline_replacement_with_existing_soft_break() {
    let body = r#"<w:p><w:r><w:t>[Lines]</w:t><w:br/><w:t>tail</w:t></w:r></w:p>"#;
    let output = merge(&docx(body), &subs(&[("[Lines]", "a\nb")])).unwrap();
    // the whole run is split once it receives a multi-line replacement
    assert_eq!(texts(&output), vec!["a", "b", "tail"]);
}

#[test]
fn test_runs_after_split_stay_in_original_paragraph() {
    let input = docx(&paragraph(&[run("Dear [X]"), run(" thanks")]));
    let output = merge(&input, &subs(&[("[X]", "a\nb")])).unwrap();
    assert_eq!(texts(&output), vec!["Dear a thanks", "b"]);
}

#[test]
fn test_new_paragraphs_clone_formatting() {
    let input = docx(&styled_paragraph("BodyText", &[bold_run("[Lines]")]));
    let output = merge(&input, &subs(&[("[Lines]", "one\ntwo")])).unwrap();

    assert_eq!(
        styles(&output),
        vec![Some("BodyText".to_string()), Some("BodyText".to_string())]
    );
    assert_eq!(document_xml(&output).matches("<w:b/>").count(), 2);
}

#[test]
fn test_section_break_is_not_cloned() {
    let body = format!(
        r#"<w:p><w:pPr><w:sectPr/></w:pPr>{}</w:p>"#,
        run("[Lines]")
    );
    let output = merge(&docx(&body), &subs(&[("[Lines]", "one\ntwo")])).unwrap();
    // one in the split paragraph, one closing the body
    assert_eq!(document_xml(&output).matches("<w:sectPr/>").count(), 2);
}

#[test]
fn test_bullet_items() {
    let input = docx(&paragraph(&[run("[Services]")]));
    let output = merge(&input, &subs(&[("[Services]", "Services:\n* Audit\n*  Tax")])).unwrap();

    assert_eq!(texts(&output), vec!["Services:", "Audit", "Tax"]);
    assert_eq!(
        styles(&output),
        vec![
            None,
            Some("ListBullet".to_string()),
            Some("ListBullet".to_string())
        ]
    );
}

#[test]
fn test_first_segment_is_not_formatted() {
    let input = docx(&paragraph(&[run("[Services]")]));
    let output = merge(&input, &subs(&[("[Services]", "* first\n* second")])).unwrap();
    assert_eq!(texts(&output), vec!["* first", "second"]);
}

#[test]
fn test_ordered_items_are_numbered() {
    let input = docx(&paragraph(&[run("[Steps]")]));
    let output = merge(&input, &subs(&[("[Steps]", "Steps:\n# Plan\n# Fieldwork\n#Report")])).unwrap();

    assert_eq!(
        texts(&output),
        vec!["Steps:", "1. Plan", "2. Fieldwork", "3. Report"]
    );
    assert_eq!(styles(&output)[1], Some("ListParagraph".to_string()));
}

#[test]
fn test_ordered_items_continue_existing_numbering() {
    let body = format!(
        "{}{}{}",
        styled_paragraph("ListParagraph", &[run("1. Existing")]),
        styled_paragraph("ListParagraph", &[run("2. Existing")]),
        paragraph(&[run("[More]")])
    );
    let output = merge(&docx(&body), &subs(&[("[More]", "More:\n# Added")])).unwrap();
    assert_eq!(
        texts(&output),
        vec!["1. Existing", "2. Existing", "More:", "3. Added"]
    );
}

#[test]
fn test_numbering_is_scoped_to_one_merge() {
    let input = docx(&paragraph(&[run("[Steps]")]));
    let map = subs(&[("[Steps]", "x\n# a")]);
    let first = merge(&input, &map).unwrap();
    let second = merge(&input, &map).unwrap();
    assert_eq!(texts(&first), texts(&second));
    assert_eq!(texts(&second)[1], "1. a");
}

#[test]
fn test_custom_list_styles() {
    let options = MergeOptions {
        bullet_style: "Bullets".to_string(),
        ordered_style: "Numbers".to_string(),
    };
    let input = docx(&paragraph(&[run("[L]")]));
    let output = merge_with_options(&input, &subs(&[("[L]", "x\n* b\n# n")]), &options).unwrap();
    assert_eq!(
        styles(&output),
        vec![
            None,
            Some("Bullets".to_string()),
            Some("Numbers".to_string())
        ]
    );
}

// ============================================================================
// Map Ordering And No-ops
// ============================================================================

#[test]
fn test_replacement_chaining_follows_map_order() {
    let input = docx(&paragraph(&[run("[A]")]));

    let forward = merge(&input, &subs(&[("[A]", "x [B]"), ("[B]", "y")])).unwrap();
    assert_eq!(texts(&forward), vec!["x y"]);

    let reversed = merge(&input, &subs(&[("[B]", "y"), ("[A]", "x [B]")])).unwrap();
    assert_eq!(texts(&reversed), vec!["x [B]"]);
}

#[test]
fn test_no_match_returns_input_bytes() {
    let input = docx(&paragraph(&[run("nothing to see")]));
    let output = merge(&input, &subs(&[("[Name]", "World")])).unwrap();
    assert_eq!(output, input);
}

#[test]
fn test_second_merge_is_a_no_op() {
    let input = docx(&paragraph(&[run("[Name]")]));
    let map = subs(&[("[Name]", "World")]);
    let once = merge(&input, &map).unwrap();

    assert_eq!(merge(&once, &SubstitutionMap::new()).unwrap(), once);
    assert_eq!(merge(&once, &map).unwrap(), once);
}

#[test]
fn test_other_parts_are_carried_over() {
    let input = docx(&paragraph(&[run("[Name]")]));
    let output = merge(&input, &subs(&[("[Name]", "World")])).unwrap();

    let before = docx_merge::Package::read(&input).unwrap();
    let after = docx_merge::Package::read(&output).unwrap();
    assert_eq!(
        before.part_names().collect::<Vec<_>>(),
        after.part_names().collect::<Vec<_>>()
    );
    assert_eq!(before.part("_rels/.rels"), after.part("_rels/.rels"));
}

// ============================================================================
// Malformed Input
// ============================================================================

#[test]
fn test_not_a_zip() {
    let err = merge(b"definitely not a package", &SubstitutionMap::new()).unwrap_err();
    assert!(matches!(err, MergeError::MalformedDocument(_)));
}

#[test]
fn test_missing_main_part() {
    let input = package(&[("[Content_Types].xml", "<Types/>")]);
    let err = merge(&input, &SubstitutionMap::new()).unwrap_err();
    assert!(matches!(err, MergeError::MalformedDocument(_)));
}

#[test]
fn test_main_part_without_body() {
    let input = package(&[(
        "word/document.xml",
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#,
    )]);
    let err = merge(&input, &SubstitutionMap::new()).unwrap_err();
    assert!(matches!(err, MergeError::MalformedDocument(_)));
}

#[test]
fn test_invalid_xml_in_main_part() {
    let input = package(&[("word/document.xml", "<w:document><w:body>")]);
    let err = merge(&input, &SubstitutionMap::new()).unwrap_err();
    assert!(matches!(err, MergeError::MalformedDocument(_)));
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #[test]
    fn prop_text_without_keywords_is_untouched(text in "[a-zA-Z0-9 ,.]{0,40}") {
        let input = docx(&paragraph(&[run(&text)]));
        let output = merge(&input, &subs(&[("[Key]", "value")])).unwrap();
        prop_assert_eq!(output, input);
    }

    #[test]
    fn prop_split_point_does_not_matter(split in 0usize..=9) {
        let keyword = "[Keyword]";
        let (head, tail) = keyword.split_at(split);
        let input = docx(&paragraph(&[run(head), run(tail)]));
        let output = merge(&input, &subs(&[(keyword, "v")])).unwrap();
        prop_assert_eq!(texts(&output), vec!["v".to_string()]);
    }
}
