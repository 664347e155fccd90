use pascalite::{compile::Instr, prelude::*};

const UNDECLARED: &str = include_str!("undeclared.pas");
const ERRORS: &str = include_str!("errors.pas");

#[test]
fn test_undeclared_write() {
    let compilation = compile(UNDECLARED, &CompileConf::default());
    let diagnostics = compilation.diagnostics.as_slice();

    assert_eq!(diagnostics.len(), 1, "{}", compilation.diagnostics);
    assert_eq!(diagnostics[0].severity, Severity::Semantic);
    assert_eq!(diagnostics[0].line, 5);
    assert!(diagnostics[0].message.contains("'y'"));

    // The assignment is generated, the write is not.
    assert!(compilation.code.iter().any(|instr| *instr == Instr::Store(0)));
    assert!(!compilation.code.iter().any(|instr| *instr == Instr::Write));

    match compile_str(UNDECLARED) {
        Err(PascalError::Compile(diagnostics)) => assert_eq!(diagnostics.len(), 1),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_all_errors_reported() {
    let compilation = compile(ERRORS, &CompileConf::default());
    let found = compilation
        .diagnostics
        .iter()
        .map(|d| (d.severity, d.line))
        .collect::<Vec<_>>();

    assert_eq!(
        found,
        vec![
            (Severity::Semantic, 3),
            (Severity::Lexical, 4),
            (Severity::Lexical, 6),
            (Severity::Syntactic, 6),
            (Severity::Syntactic, 7),
            (Severity::Semantic, 8),
        ],
        "{}",
        compilation.diagnostics
    );
    assert!(!compilation.is_ok());
}

#[test]
fn test_identifier_length_limit() {
    let ok = "program p; var abcdefghijklmnopqrst: integer; begin abcdefghijklmnopqrst := 1 end.";
    let compilation = compile(ok, &CompileConf::default());
    assert!(compilation.is_ok(), "{}", compilation.diagnostics);

    let long = "program p;\nvar x: integer;\nbegin\n  abcdefghijklmnopqrstu := 1;\n  x := 2;\n  write x\nend.";
    let compilation = compile(long, &CompileConf::default());
    let lexical = compilation
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Lexical)
        .collect::<Vec<_>>();
    assert_eq!(lexical.len(), 1);
    assert_eq!(lexical[0].line, 4);
    assert_eq!(compilation.diagnostics.count(Severity::Syntactic), 0);
    // The bad name is not reported again as undeclared.
    assert_eq!(compilation.diagnostics.count(Severity::Semantic), 0);
    assert_eq!(compilation.diagnostics.len(), 1, "{}", compilation.diagnostics);

    // Parsing went on past the bad name.
    assert!(compilation.code.iter().any(|instr| *instr == Instr::Write));
}

#[test]
fn test_configured_identifier_limit() {
    let conf = CompileConf {
        max_ident_len: 4,
        ..CompileConf::default()
    };
    let compilation = compile("program p; var abcd, abcde: integer; begin end.", &conf);
    assert_eq!(compilation.diagnostics.len(), 1);
    assert_eq!(compilation.diagnostics.as_slice()[0].severity, Severity::Lexical);
}

#[test]
fn test_unterminated_comment() {
    let compilation = compile("program p;\nbegin\n { never closed\nend.", &CompileConf::default());
    let diagnostics = compilation.diagnostics.as_slice();
    assert_eq!(diagnostics[0].severity, Severity::Lexical);
    assert_eq!(diagnostics[0].line, 3);
}

#[test]
fn test_case_insensitive_keywords() {
    let source = "PROGRAM p; VAR x: INTEGER; BEGIN x := 2; IF x > 1 THEN WRITE(x) ELSE Write 0 END.";
    assert_eq!(run_str(source, []).unwrap(), vec![2]);

    // Identifiers are case-sensitive.
    let compilation = compile("program p; var x: integer; begin X := 1 end.", &CompileConf::default());
    assert_eq!(compilation.diagnostics.count(Severity::Semantic), 1);
}

#[test]
fn test_write_parenthesised_list_only() {
    let compilation = compile(
        "program p; var a: integer; begin write (a) + 1 end.",
        &CompileConf::default(),
    );
    assert_eq!(compilation.diagnostics.count(Severity::Syntactic), 1);
}

#[test]
fn test_deep_nesting_reported() {
    let depth = 5000;
    let source = format!(
        "program p;\nvar x: integer;\nbegin\n  x := {}1{};\n  write x\nend.",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let compilation = compile(&source, &CompileConf::default());
    let diagnostics = compilation.diagnostics.as_slice();

    assert_eq!(diagnostics.len(), 1, "{}", compilation.diagnostics);
    assert_eq!(diagnostics[0].severity, Severity::Syntactic);
    assert_eq!(diagnostics[0].line, 4);
    assert!(diagnostics[0].message.contains("nesting too deep"));

    let source = format!("program p; var x: integer; begin x := 1{} end.", " + x".repeat(5000));
    let compilation = compile(&source, &CompileConf::default());
    assert_eq!(compilation.diagnostics.count(Severity::Syntactic), 1);
}
