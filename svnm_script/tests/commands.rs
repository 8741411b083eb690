use svnm_data::{Command, Condition, FunctionCommand, Operator, ValueCommand};
use svnm_script::{parse_command, parse_function_command, parse_primitive_command, parse_variable_command};

fn var(name: &str) -> ValueCommand {
    ValueCommand::Variable { name: name.into() }
}

#[test]
fn rendered_commands_parse_back() {
    let commands = vec![
        Command::state("chapter__seq2"),
        Command::variable("돈"),
        Command::numeric(-0.5),
        Command::numeric(1200.0),
        Command::string("a, b (c)"),
        Command::string("it's"),
        Command::boolean(true),
        Command::boolean(false),
        Command::call("선택지", vec![]),
        Command::call(
            "출력",
            vec![Command::string("x,y"), Command::variable("a"), Command::state("S"), Command::numeric(3.0)],
        ),
        Command::Function(FunctionCommand {
            name: "이동".into(),
            args: vec![Command::state("A")],
            condition: Some(Condition::single(var("열쇠"))),
        }),
        Command::Function(FunctionCommand {
            name: "출력".into(),
            args: vec![Command::string("ok")],
            condition: Some(Condition::compare(
                ValueCommand::String { value: "a b".into() },
                Operator::LessOrEqual,
                var("b"),
            )),
        }),
    ];

    for command in commands {
        let text = command.to_string();
        assert_eq!(parse_command(&text).expect(&text), command, "round trip of {text:?}");
    }
}

#[test]
fn every_operator_round_trips() {
    for op in [Operator::Less, Operator::LessOrEqual, Operator::Equal, Operator::GreaterOrEqual, Operator::Greater] {
        let command = Command::Function(FunctionCommand {
            name: "f".into(),
            args: vec![],
            condition: Some(Condition::compare(var("a"), op, ValueCommand::Numeric { value: 2.0 })),
        });
        assert_eq!(parse_command(&command.to_string()).unwrap(), command);
    }
}

#[test]
fn whitespace_in_references_is_a_syntax_error() {
    assert!(parse_primitive_command("#a b").unwrap_err().is_syntax());
    assert!(parse_primitive_command("#").unwrap_err().is_syntax());
    assert!(parse_variable_command("$").unwrap_err().is_syntax());
    assert!(parse_variable_command("$a b").unwrap_err().is_syntax());
    assert!(parse_primitive_command("").unwrap_err().is_syntax());
}

#[test]
fn function_arguments_and_guards() {
    let f = parse_function_command("foo('a,b,5',3)").unwrap();
    assert_eq!(f.name, "foo");
    assert_eq!(f.args, [Command::string("a,b,5"), Command::numeric(3.0)]);

    let g = parse_function_command("($a<$b)면,foo").unwrap();
    assert_eq!(g.condition, Some(Condition::compare(var("a"), Operator::Less, var("b"))));
}
