use std::io::Cursor;

use super::*;

fn ask(input: &str) -> (bool, String) {
    let mut output = Vec::new();
    let answer = PromptConfirm::new(Cursor::new(input.as_bytes()), &mut output).confirm("Delete \"Dune\"?");
    (answer, String::from_utf8(output).unwrap())
}

#[test]
fn prompt_accepts_yes_variants() {
    assert!(ask("y\n").0);
    assert!(ask(" YES \n").0);
}

#[test]
fn prompt_defaults_to_no() {
    assert!(!ask("\n").0);
    assert!(!ask("nope\n").0);
    assert!(!ask("").0);
}

#[test]
fn prompt_writes_question() {
    let (_, written) = ask("n\n");
    assert_eq!(written, "Delete \"Dune\"? [y/N] ");
}

#[test]
fn closures_and_assume_yes_confirm() {
    let mut seen = Vec::new();
    let mut record = |prompt: &str| {
        seen.push(prompt.to_owned());
        false
    };
    assert!(!record.confirm("first"));
    assert_eq!(seen, vec!["first".to_owned()]);
    assert!(AssumeYes.confirm("anything"));
}
