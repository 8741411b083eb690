use std::collections::BTreeMap;

use svnm_data::{Command, Condition, Operator, SvnmOption, SvnmState, Value, ValueCommand};
use svnm_script::{ScriptError, parse_command, parse_svnm};

fn cmd(text: &str) -> Command {
    parse_command(text).expect("valid command")
}

#[test]
fn single_paragraph_chapter() {
    let svnm = parse_svnm("# state\na.").expect("parse ok");
    assert_eq!(svnm.len(), 1);
    assert_eq!(svnm.get("state"), Some(&SvnmState::new("state", "state", "a.")));
}

#[test]
fn single_paragraph_with_metadata() {
    let src = r#"# state
a.

---

전역변수:
  변수: 1
지역변수:
  변수: 2
선택지:
  선택지1:
    - 출력("선택지1")
이벤트:
  사용자_이벤트:
    - 출력("사용자 이벤트")"#;
    let svnm = parse_svnm(src).expect("parse ok");
    let state = svnm.get("state").expect("state exists");

    assert_eq!(state.global_variables, Some(BTreeMap::from([("변수".to_string(), Value::Number(1.0))])));
    assert_eq!(state.local_variables, Some(BTreeMap::from([("변수".to_string(), Value::Number(2.0))])));
    assert_eq!(
        state.options,
        Some(vec![SvnmOption {
            name: "선택지1".into(),
            condition: None,
            commands: vec![cmd("출력('선택지1')")],
        }])
    );
    assert_eq!(
        state.events,
        BTreeMap::from([
            ("사용자_이벤트".to_string(), vec![cmd("출력('사용자 이벤트')")]),
            ("완독".to_string(), vec![cmd("선택지()")]),
        ])
    );
}

#[test]
fn three_paragraphs_expand_into_linked_states() {
    let svnm = parse_svnm("# S\na.\n\nb.\n\nc.").expect("parse ok");
    let ids: Vec<_> = svnm.states().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, ["S", "S__seq1", "S__seq2"]);
    assert_eq!(svnm.get("S").unwrap().events["다음"], [cmd("이동(#S__seq1)")]);
    assert_eq!(svnm.get("S__seq1").unwrap().events["다음"], [cmd("이동(#S__seq2)")]);
    assert!(svnm.get("S__seq2").unwrap().events.is_empty());
    assert_eq!(svnm.get("S__seq1").unwrap().paragraph, "b.");
}

#[test]
fn metadata_is_spread_over_first_and_last_states() {
    let src = "# state
a.

b.

c.
---
전역변수:
  변수: 1
지역변수:
  변수: 2
선택지:
  선택지1:
    - 출력(\"선택지1\")
이벤트:
  입장:
    - 출력('enter')
  사용자_이벤트:
    - 출력(\"사용자 이벤트\")";
    let svnm = parse_svnm(src).expect("parse ok");
    let first = svnm.get("state").unwrap();
    let middle = svnm.get("state__seq1").unwrap();
    let last = svnm.get("state__seq2").unwrap();

    assert!(first.global_variables.is_some() && first.local_variables.is_some());
    assert!(middle.global_variables.is_none() && last.local_variables.is_none());

    assert!(first.options.is_none() && middle.options.is_none());
    assert_eq!(last.options.as_ref().map(Vec::len), Some(1));

    let names = |s: &SvnmState| s.events.keys().cloned().collect::<Vec<_>>();
    assert_eq!(names(first), ["다음", "입장"]);
    assert_eq!(names(middle), ["다음"]);
    assert_eq!(names(last), ["사용자_이벤트", "완독"]);
}

#[test]
fn options_keep_order_and_guards() {
    let src = "# S
a.
---
선택지:
  공격:
    - 이동(#S)
  ($hp > 1) 이면, 방어:
    - 이동(#S)
  회피:
    - 이동(#S)";
    let svnm = parse_svnm(src).expect("parse ok");
    let options = svnm.get("S").unwrap().options.clone().unwrap();
    let names: Vec<_> = options.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["공격", "방어", "회피"]);
    assert_eq!(
        options[1].condition,
        Some(Condition::compare(
            ValueCommand::Variable { name: "hp".into() },
            Operator::Greater,
            ValueCommand::Numeric { value: 1.0 }
        ))
    );
    assert!(options[0].condition.is_none());
}

#[test]
fn synthesized_events_override_authored_ones() {
    let src = "# S
a.

b.
---
선택지:
  끝: [이동(#S)]
이벤트:
  다음: [출력('ignored on the last state')]
  완독: [출력('replaced')]";
    let svnm = parse_svnm(src).expect("parse ok");
    let first = svnm.get("S").unwrap();
    let last = svnm.get("S__seq1").unwrap();
    // authored 다음 is only copied onto the last state, then replaced on the first
    assert_eq!(first.events["다음"], [cmd("이동(#S__seq1)")]);
    assert_eq!(last.events["다음"], [cmd("출력('ignored on the last state')")]);
    assert_eq!(last.events["완독"], [cmd("선택지()")]);
}

#[test]
fn custom_scope_applies_to_every_state() {
    let svnm = parse_svnm("# S\na.\n\nb.\n---\n변수범위: 1장").expect("parse ok");
    assert!(svnm.states().all(|s| s.scope == "1장"));
}

#[test]
fn chapters_merge_in_order() {
    let src = "# A\none.\n---\n이벤트:\n  다른: [이동(#B)]\n\n# B\ntwo.\n\nthree.\n";
    let svnm = parse_svnm(src).expect("parse ok");
    assert_eq!(svnm.len(), 3);
    assert_eq!(svnm.get("A").unwrap().events["다른"], [cmd("이동(#B)")]);
    assert_eq!(svnm.get("B__seq1").unwrap().scope, "B");
}

#[test]
fn crlf_documents_parse_like_lf() {
    let lf = parse_svnm("# S\na.\n\nb.\n---\n변수범위: x\n").unwrap();
    let crlf = parse_svnm("# S\r\na.\r\n\r\nb.\r\n---\r\n변수범위: x\r\n").unwrap();
    assert_eq!(lf, crlf);
}

#[test]
fn blank_document_is_empty() {
    assert!(parse_svnm("").unwrap().is_empty());
    assert!(parse_svnm(" \n\n ").unwrap().is_empty());
}

#[test]
fn duplicate_ids_across_chapters_abort() {
    let err = parse_svnm("# A\none.\n\n# A\nagain.").unwrap_err();
    assert!(matches!(err, ScriptError::Merge(ref dup) if dup.id == "A"));

    // a sequenced id can collide with a later chapter too
    let err = parse_svnm("# A\none.\n\ntwo.\n\n# A__seq1\nthree.").unwrap_err();
    assert!(matches!(err, ScriptError::Merge(_)));
}

#[test]
fn unknown_metadata_keys_are_rejected() {
    let err = parse_svnm("# S\na.\n---\n선택지들:\n  a: []").unwrap_err();
    assert!(matches!(err, ScriptError::Schema { ref chapter, .. } if chapter == "S"));
}

#[test]
fn bad_option_commands_are_syntax_errors() {
    let err = parse_svnm("# S\na.\n---\n선택지:\n  가자: ['이동(#a b)']").unwrap_err();
    assert!(err.is_syntax());
    assert!(err.to_string().contains("option '가자'"));
}

#[test]
fn prologue_before_first_chapter_is_rejected() {
    assert!(parse_svnm("hello\n# S\na.").unwrap_err().is_syntax());
}

#[test]
fn text_after_a_second_separator_is_ignored() {
    let svnm = parse_svnm("# S\na.\n---\n변수범위: 1장\n---\n작가 메모: 나중에 고칠 것\n").expect("parse ok");
    assert_eq!(svnm.get("S").unwrap().scope, "1장");
}

#[test]
fn radix_numbers_are_values_not_calls() {
    assert_eq!(parse_command("0x10").unwrap(), Command::numeric(16.0));
    assert_eq!(cmd("출력(0b11)"), Command::call("출력", vec![Command::numeric(3.0)]));
}
