//! MEPA interpreter.
use std::{collections::VecDeque, error, fmt};

use crate::{
    compile::{Code, Instr, Target},
    constants::{Address, Word, STACK_SIZE},
};

/// VM Configuration Parameters.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MepaConf {
    /// Stop with an error after this many instructions.
    ///
    /// Guards against programs that never terminate.
    pub max_steps: Option<usize>,
}

/// Stack machine executing MEPA code.
///
/// The variable segment reserved by `AMEM` sits at the bottom of the stack,
/// expression temporaries are pushed on top of it.
pub struct MepaVm {
    code: Vec<Instr>,
    pc: usize,
    stack: Vec<Word>,
    /// Size of the variable segment.
    data_len: usize,
    input: VecDeque<Word>,
    output: Vec<Word>,
    steps: usize,
    conf: MepaConf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Ok,
    /// Program counter has jumped to a new address.
    Jump,
    /// `PARA` was executed.
    Halt,
}

impl MepaVm {
    pub fn new(conf: MepaConf) -> Self {
        Self {
            code: vec![],
            pc: 0,
            stack: vec![],
            data_len: 0,
            input: VecDeque::new(),
            output: vec![],
            steps: 0,
            conf,
        }
    }

    /// Load a program, clearing all state left by a previous one.
    pub fn load_code(&mut self, code: &Code) {
        self.code = code.as_slice().to_vec();
        self.input.clear();
        self.output.clear();
        self.reset();
    }

    /// Queue values to be consumed by `LEIT`.
    pub fn push_input(&mut self, values: impl IntoIterator<Item = Word>) {
        self.input.extend(values);
    }

    /// Values written by `IMPR`, in order.
    pub fn output(&self) -> &[Word] {
        &self.output
    }

    pub fn take_output(&mut self) -> Vec<Word> {
        std::mem::take(&mut self.output)
    }

    /// Current contents of the variable segment.
    pub fn memory(&self) -> &[Word] {
        &self.stack[..self.data_len]
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    fn reset(&mut self) {
        self.pc = 0;
        self.stack.clear();
        self.data_len = 0;
        self.steps = 0;
    }
}

/// Interpreter
impl MepaVm {
    /// Run from the start until `PARA`.
    pub fn execute(&mut self) -> Result<Flow, RuntimeError> {
        self.reset();

        loop {
            if let Flow::Halt = self.step()? {
                return Ok(Flow::Halt);
            }
        }
    }

    /// Run at most `step_count` instructions from the current position.
    pub fn run_steps(&mut self, step_count: usize) -> Result<Flow, RuntimeError> {
        let mut flow = Flow::Ok;

        for _ in 0..step_count {
            flow = self.step()?;
            if flow == Flow::Halt {
                break;
            }
        }

        Ok(flow)
    }

    /// Execute the instruction at the program counter.
    pub fn step(&mut self) -> Result<Flow, RuntimeError> {
        if let Some(max_steps) = self.conf.max_steps {
            if self.steps >= max_steps {
                return Err(RuntimeError::StepLimit(max_steps));
            }
        }
        self.steps += 1;

        let instr = *self.code.get(self.pc).ok_or(RuntimeError::PcOutOfRange(self.pc))?;

        #[cfg(feature = "op_trace")]
        op_trace(self.pc, &instr, &self.stack);

        self.pc += 1;

        match instr {
            Instr::Start => {
                self.stack.clear();
                self.data_len = 0;
            }
            Instr::Alloc(n) => {
                let n = n as usize;
                self.stack.resize(self.stack.len() + n, 0);
                self.data_len += n;
            }
            Instr::LoadConst(k) => self.push(k)?,
            Instr::LoadVar(n) => {
                let value = self.stack[self.data_addr(n)?];
                self.push(value)?;
            }
            Instr::Store(n) => {
                let addr = self.data_addr(n)?;
                self.stack[addr] = self.pop()?;
            }
            Instr::Add => self.binary(|a, b| Ok(a.wrapping_add(b)))?,
            Instr::Sub => self.binary(|a, b| Ok(a.wrapping_sub(b)))?,
            Instr::Mul => self.binary(|a, b| Ok(a.wrapping_mul(b)))?,
            Instr::Div => self.binary(|a, b| {
                if b == 0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(a.wrapping_div(b))
                }
            })?,
            Instr::Neg => {
                let value = self.pop()?;
                self.push(value.wrapping_neg())?;
            }
            Instr::Not => {
                let value = self.pop()?;
                self.push(truth(value == 0))?;
            }
            Instr::And => self.binary(|a, b| Ok(truth(a != 0 && b != 0)))?,
            Instr::Or => self.binary(|a, b| Ok(truth(a != 0 || b != 0)))?,
            Instr::Less => self.binary(|a, b| Ok(truth(a < b)))?,
            Instr::Greater => self.binary(|a, b| Ok(truth(a > b)))?,
            Instr::Eq => self.binary(|a, b| Ok(truth(a == b)))?,
            Instr::NotEq => self.binary(|a, b| Ok(truth(a != b)))?,
            Instr::LessEq => self.binary(|a, b| Ok(truth(a <= b)))?,
            Instr::GreaterEq => self.binary(|a, b| Ok(truth(a >= b)))?,
            Instr::Jump(target) => {
                self.pc = self.jump_addr(target)?;
                return Ok(Flow::Jump);
            }
            Instr::JumpFalse(target) => {
                if self.pop()? == 0 {
                    self.pc = self.jump_addr(target)?;
                    return Ok(Flow::Jump);
                }
            }
            Instr::Nop => {}
            Instr::Read => {
                let value = self.input.pop_front().ok_or(RuntimeError::InputExhausted)?;
                self.push(value)?;
            }
            Instr::Write => {
                let value = self.pop()?;
                self.output.push(value);
            }
            Instr::Halt => {
                self.pc -= 1;
                return Ok(Flow::Halt);
            }
        }

        Ok(Flow::Ok)
    }

    #[inline]
    fn check_depth(&self, extra: usize) -> Result<(), RuntimeError> {
        if self.stack.len() + extra > self.data_len + STACK_SIZE {
            Err(RuntimeError::StackOverflow)
        } else {
            Ok(())
        }
    }

    #[inline]
    fn push(&mut self, value: Word) -> Result<(), RuntimeError> {
        self.check_depth(1)?;
        self.stack.push(value);
        Ok(())
    }

    /// Pop a temporary. The variable segment can't be popped.
    #[inline]
    fn pop(&mut self) -> Result<Word, RuntimeError> {
        if self.stack.len() <= self.data_len {
            return Err(RuntimeError::StackUnderflow);
        }
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// Pops the right-hand side, then the left-hand side.
    fn binary(&mut self, op: impl FnOnce(Word, Word) -> Result<Word, RuntimeError>) -> Result<(), RuntimeError> {
        let rhs = self.pop()?;
        let lhs = self.pop()?;
        let value = op(lhs, rhs)?;
        self.push(value)
    }

    #[inline]
    fn data_addr(&self, addr: Address) -> Result<usize, RuntimeError> {
        let index = addr as usize;
        if index < self.data_len {
            Ok(index)
        } else {
            Err(RuntimeError::InvalidAddress(addr))
        }
    }

    #[inline]
    fn jump_addr(&self, target: Target) -> Result<usize, RuntimeError> {
        match target {
            Target::Addr(addr) if (addr as usize) < self.code.len() => Ok(addr as usize),
            Target::Addr(addr) => Err(RuntimeError::PcOutOfRange(addr as usize)),
            Target::Label(_) => Err(RuntimeError::UnresolvedJump(self.pc - 1)),
        }
    }
}

#[inline(always)]
fn truth(cond: bool) -> Word {
    cond as Word
}

#[cfg(feature = "op_trace")]
#[inline]
fn op_trace(pc: usize, instr: &Instr, stack: &[Word]) {
    log::trace!("{pc:04}: {:<10} {stack:?}", instr.to_string());
}

/// Run a program to completion, returning everything it wrote.
pub fn run(code: &Code, input: impl IntoIterator<Item = Word>, conf: MepaConf) -> Result<Vec<Word>, RuntimeError> {
    let mut vm = MepaVm::new(conf);
    vm.load_code(code);
    vm.push_input(input);
    vm.execute()?;
    Ok(vm.take_output())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    StackOverflow,
    /// Attempt to pop an empty expression stack.
    StackUnderflow,
    DivisionByZero,
    /// Variable address outside the reserved segment.
    InvalidAddress(Address),
    /// `LEIT` with no input left.
    InputExhausted,
    /// Jump whose label was never resolved, at the given instruction.
    UnresolvedJump(usize),
    PcOutOfRange(usize),
    StepLimit(usize),
}

impl error::Error for RuntimeError {}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::StackOverflow => write!(f, "stack overflow"),
            Self::StackUnderflow => write!(f, "stack underflow"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::InvalidAddress(addr) => write!(f, "invalid variable address {addr}"),
            Self::InputExhausted => write!(f, "read past end of input"),
            Self::UnresolvedJump(pc) => write!(f, "unresolved jump at instruction {pc}"),
            Self::PcOutOfRange(pc) => write!(f, "program counter {pc} out of range"),
            Self::StepLimit(steps) => write!(f, "step limit of {steps} exceeded"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::compile::LabelId;

    fn code(instrs: &[Instr]) -> Code {
        let mut code = Code::new();
        for instr in instrs {
            code.emit(*instr);
        }
        code
    }

    #[test]
    fn test_arithmetic() {
        use Instr::*;
        let program = code(&[
            Start,
            LoadConst(7),
            LoadConst(2),
            Sub,
            LoadConst(-3),
            Mul,
            Write,
            LoadConst(7),
            LoadConst(2),
            Div,
            Write,
            LoadConst(-7),
            LoadConst(2),
            Div,
            Write,
            Halt,
        ]);
        assert_eq!(run(&program, [], MepaConf::default()), Ok(vec![-15, 3, -3]));
    }

    #[test]
    fn test_comparisons() {
        use Instr::*;
        let program = code(&[
            Start, LoadConst(1), LoadConst(2), Less, Write, LoadConst(1), LoadConst(2), GreaterEq, Write, LoadConst(0),
            Not, Write, LoadConst(3), LoadConst(0), Or, Write, Halt,
        ]);
        assert_eq!(run(&program, [], MepaConf::default()), Ok(vec![1, 0, 1, 1]));
    }

    #[test]
    fn test_memory() {
        use Instr::*;
        let program = code(&[Start, Alloc(2), Read, Store(1), LoadVar(1), LoadConst(1), Add, Store(0), Halt]);
        let mut vm = MepaVm::new(MepaConf::default());
        vm.load_code(&program);
        vm.push_input([41]);
        assert_eq!(vm.execute(), Ok(Flow::Halt));
        assert_eq!(vm.memory(), &[42, 41]);
    }

    #[test]
    fn test_countdown_loop() {
        use Instr::*;
        // x := 3; while x > 0 do begin write x; x := x - 1 end
        let program = code(&[
            Start,
            Alloc(1),
            LoadConst(3),
            Store(0),
            LoadVar(0),
            LoadConst(0),
            Greater,
            JumpFalse(Target::Addr(16)),
            LoadVar(0),
            Write,
            LoadVar(0),
            LoadConst(1),
            Sub,
            Store(0),
            Jump(Target::Addr(4)),
            Nop,
            Halt,
        ]);
        assert_eq!(run(&program, [], MepaConf::default()), Ok(vec![3, 2, 1]));
    }

    #[test]
    fn test_errors() {
        use Instr::*;
        let conf = MepaConf::default();
        assert_eq!(
            run(&code(&[Start, LoadConst(1), LoadConst(0), Div, Halt]), [], conf.clone()),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(run(&code(&[Start, Write, Halt]), [], conf.clone()), Err(RuntimeError::StackUnderflow));
        assert_eq!(
            run(&code(&[Start, Alloc(1), LoadVar(1), Halt]), [], conf.clone()),
            Err(RuntimeError::InvalidAddress(1))
        );
        assert_eq!(run(&code(&[Start, Read, Halt]), [], conf.clone()), Err(RuntimeError::InputExhausted));
        assert_eq!(run(&code(&[Start]), [], conf.clone()), Err(RuntimeError::PcOutOfRange(1)));
        assert_eq!(
            run(&code(&[Start, Jump(Target::Label(LabelId(0)))]), [], conf),
            Err(RuntimeError::UnresolvedJump(1))
        );
    }

    #[test]
    fn test_variables_cannot_be_popped() {
        use Instr::*;
        let program = code(&[Start, Alloc(1), Write, Halt]);
        assert_eq!(run(&program, [], MepaConf::default()), Err(RuntimeError::StackUnderflow));
    }

    #[test]
    fn test_step_limit() {
        use Instr::*;
        let program = code(&[Start, Jump(Target::Addr(1))]);
        let conf = MepaConf { max_steps: Some(100) };
        assert_eq!(run(&program, [], conf), Err(RuntimeError::StepLimit(100)));
    }

    #[test]
    fn test_run_steps() {
        use Instr::*;
        let program = code(&[Start, Nop, Nop, Halt]);
        let mut vm = MepaVm::new(MepaConf::default());
        vm.load_code(&program);
        assert_eq!(vm.run_steps(2), Ok(Flow::Ok));
        assert_eq!(vm.pc(), 2);
        assert_eq!(vm.run_steps(10), Ok(Flow::Halt));
        assert_eq!(vm.pc(), 3);
    }
}
