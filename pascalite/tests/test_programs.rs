use pascalite::{
    compile::{Instr, Target},
    prelude::*,
};

const SUM: &str = include_str!("sum.pas");
const COUNTDOWN: &str = include_str!("countdown.pas");
const FACTORIAL: &str = include_str!("factorial.pas");
const CLASSIFY: &str = include_str!("classify.pas");

fn listing(code: &Code) -> Vec<String> {
    code.iter().map(|instr| instr.to_string()).collect()
}

#[test]
fn test_sum_writes_three() {
    let compilation = compile(SUM, &CompileConf::default());
    assert!(compilation.is_ok(), "{}", compilation.diagnostics);
    assert_eq!(
        listing(&compilation.code),
        vec!["INPP", "AMEM 1", "CRCT 1", "CRCT 2", "SOMA", "ARMZ 0", "CRVL 0", "IMPR", "PARA"]
    );

    let mut vm = MepaVm::new(MepaConf::default());
    vm.load_code(&compilation.code);
    vm.execute().unwrap();
    assert_eq!(vm.memory(), &[3]);
    assert_eq!(vm.output(), &[3]);
}

#[test]
fn test_countdown_loop_layout() {
    let code = compile_str(COUNTDOWN).unwrap();
    assert_eq!(
        listing(&code),
        vec![
            "INPP", "AMEM 1", "CRCT 3", "ARMZ 0", // prologue, x := 3
            "CRVL 0", "CRCT 0", "CMMA", // loop test at 4
            "DSVF 13", "CRVL 0", "CRCT 1", "SUBT", "ARMZ 0", // body
            "DSVS 4", // back to the test
            "PARA",
        ]
    );

    // The exit label lands right after the backward jump.
    let back_jump = code
        .iter()
        .position(|instr| matches!(instr, Instr::Jump(_)))
        .unwrap();
    let exit = code.iter().find_map(|instr| match instr {
        Instr::JumpFalse(Target::Addr(addr)) => Some(*addr as usize),
        _ => None,
    });
    assert_eq!(exit, Some(back_jump + 1));
}

#[test]
fn test_factorial() {
    assert_eq!(run_str(FACTORIAL, [5]).unwrap(), vec![120]);
    assert_eq!(run_str(FACTORIAL, [1]).unwrap(), vec![1]);
    assert_eq!(run_str(FACTORIAL, [0]).unwrap(), vec![1]);
}

#[test]
fn test_classify() {
    let output = run_str(CLASSIFY, [4, 5, -3, 0, 7]).unwrap();
    assert_eq!(output, vec![1, -1, 0, 1, 2, 1]);
}

#[test]
fn test_jump_targets_in_range() {
    for source in [COUNTDOWN, FACTORIAL, CLASSIFY] {
        let code = compile_str(source).unwrap();
        for instr in &code {
            match instr.target() {
                Some(Target::Addr(addr)) => assert!((addr as usize) < code.len(), "{instr} out of range"),
                Some(Target::Label(label)) => panic!("unresolved label {label}"),
                None => {}
            }
        }
    }
}

#[test]
fn test_contiguous_addresses() {
    let names = (0..12).map(|n| format!("v{n}")).collect::<Vec<_>>();
    let source = format!(
        "program p; var {}: integer; begin {} := 1 end.",
        names.join(", "),
        names[11]
    );

    let compilation = compile(&source, &CompileConf::default());
    assert!(compilation.is_ok(), "{}", compilation.diagnostics);
    assert_eq!(compilation.var_count(), 12);
    for (index, symbol) in compilation.symbols.iter().enumerate() {
        assert_eq!(symbol.name, names[index]);
        assert_eq!(symbol.address as usize, index);
    }
    assert_eq!(compilation.code[1], Instr::Alloc(12));
    assert_eq!(compilation.code[3], Instr::Store(11));
}

#[test]
fn test_input_exhausted() {
    let err = run_str(FACTORIAL, []).unwrap_err();
    assert!(matches!(err, PascalError::Runtime(_)));
}

#[test]
fn test_listing_display() {
    let code = compile_str(SUM).unwrap();
    assert_eq!(
        code.to_string(),
        "INPP\nAMEM 1\nCRCT 1\nCRCT 2\nSOMA\nARMZ 0\nCRVL 0\nIMPR\nPARA\n"
    );
}
