use dialogue_convert::{Condition, DialogueDocument, add_line, convert_str, to_pretty_json};
use pretty_assertions::assert_eq;
use serde_json::json;

fn conds(specs: &[&str]) -> Vec<Condition> {
    specs.iter().map(|s| s.parse().expect("condition parses")).collect()
}

#[test]
fn lines_build_up_a_document() {
    let doc = DialogueDocument::default();
    let doc = add_line(&doc, 0, "Hi there.", &[]);
    let doc = add_line(
        &doc,
        2,
        "Got your letter!",
        &conds(&["flag=mail=ccBoard", "item=[128, 129]", "date=spring,Mon,1"]),
    );
    let doc = add_line(&doc, 2, "Rainy again.", &conds(&["weather=Rainy", "time=0600-1200"]));

    let actual: serde_json::Value = serde_json::from_str(&to_pretty_json(&doc).expect("serialize ok")).expect("reparse ok");
    assert_eq!(
        actual,
        json!({
            "hearts": {
                "0": { "default": "Hi there." },
                "2": {
                    "Got your letter!": {
                        "date": ["spring", "Mon", 1],
                        "item": [128, 129],
                        "flag": { "mail": "ccBoard" }
                    },
                    "Rainy again.": { "weather": "Rainy", "time": "0600-1200" }
                }
            }
        })
    );
}

#[test]
fn lines_can_be_added_to_a_converted_document() {
    let converted = convert_str(r#"{"Mon": "Hi!"}"#, &Default::default()).expect("convert ok");
    let doc = add_line(&converted, 5, "Five hearts!", &[]);
    assert_eq!(doc.default_line(5), Some("Five hearts!"));
    assert!(doc.line(0, "Hi!").is_some());
    assert!(converted.default_line(5).is_none());
}
