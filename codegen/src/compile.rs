//! Compiler from ladder circuits to a command sequence.
//!
//! Circuits are compiled one at a time into blocks that leave both stacks
//! empty. Within a circuit, the condition is compiled depth first:
//!
//! * a leaf loads its bit
//! * a junction compiles its first child, then for each further child either
//!   combines two primary values (leaf child) or stashes the partial result,
//!   compiles the child and combines the two stacks (junction child)
//!
//! Actions then read the condition value from the top of the primary stack
//! and a final pop discards it.

use ladder_dsl::action::Action;
use ladder_dsl::circuit::Circuit;
use ladder_dsl::condition::{Condition, Junction};
use ladder_dsl::device::Device;
use ladder_dsl::diagnostic::{Diagnostic, Label};
use ladder_dsl::unit::{LogicUnit, Program};
use ladder_il::{CommandSequence, CommandSequenceBuilder, Effect, TargetRef};
use ladder_problems::Problem;
use log::{debug, trace};

use crate::emit::{Combine, Emitter};
use crate::operand::{load_operand, target_ref, value_ref};

/// What to compile.
#[derive(Clone, Copy, Debug)]
pub enum Source<'a> {
    /// Every unit of the program, in name order.
    Program(&'a Program),
    Unit(&'a LogicUnit),
}

impl<'a> From<&'a Program> for Source<'a> {
    fn from(program: &'a Program) -> Self {
        Source::Program(program)
    }
}

impl<'a> From<&'a LogicUnit> for Source<'a> {
    fn from(unit: &'a LogicUnit) -> Self {
        Source::Unit(unit)
    }
}

/// Compiles a program or a single logic unit into a command sequence.
///
/// Returns an error if a circuit cannot be compiled. No partial sequence is
/// returned in that case.
pub fn compile<'a>(source: impl Into<Source<'a>>) -> Result<CommandSequence, Diagnostic> {
    let mut builder = CommandSequenceBuilder::new();

    match source.into() {
        Source::Program(program) => {
            debug!(
                "Compiling program '{}' with {} units",
                program.name(),
                program.len()
            );
            for (name, unit) in program.units() {
                builder = compile_unit(builder, name, unit)?;
            }
        }
        Source::Unit(unit) => {
            builder = compile_unit(builder, unit.name(), unit)?;
        }
    }

    let sequence = builder.build();
    debug!(
        "Compiled {} commands (primary depth {}, secondary depth {})",
        sequence.len(),
        sequence.max_primary_depth(),
        sequence.max_secondary_depth()
    );
    Ok(sequence)
}

fn compile_unit(
    mut builder: CommandSequenceBuilder,
    name: &str,
    unit: &LogicUnit,
) -> Result<CommandSequenceBuilder, Diagnostic> {
    debug!("Compiling unit '{}' ({} circuits)", name, unit.circuits().len());

    for (index, circuit) in unit.circuits().iter().enumerate() {
        let ctx = CircuitContext { unit: name, index };
        trace!("Compiling {}: {}", ctx, circuit);

        let emitter = compile_circuit(&ctx, circuit)?;
        let (primary, secondary) = emitter.max_depth();
        builder = builder
            .max_depth(primary, secondary)
            .add_block(name, index, emitter.into_commands());
    }

    Ok(builder)
}

/// Identifies the circuit being compiled for diagnostics.
struct CircuitContext<'a> {
    unit: &'a str,
    index: usize,
}

impl CircuitContext<'_> {
    fn label(&self, message: impl Into<String>) -> Label {
        Label::circuit(self.unit, self.index, message)
    }
}

impl std::fmt::Display for CircuitContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.unit, self.index)
    }
}

fn compile_circuit(ctx: &CircuitContext, circuit: &Circuit) -> Result<Emitter, Diagnostic> {
    let mut emitter = Emitter::new();

    compile_condition(&mut emitter, circuit.condition());
    check_depth(&emitter, ctx, (1, 0), "Condition must leave exactly one value")?;

    for action in circuit.actions() {
        compile_action(&mut emitter, ctx, action)?;
    }

    emitter.emit_pop();
    check_depth(&emitter, ctx, (0, 0), "Circuit must leave both stacks empty")?;

    Ok(emitter)
}

fn compile_condition(emitter: &mut Emitter, condition: &Condition) {
    match condition {
        Condition::Leaf(bit) => emitter.emit_load(load_operand(bit)),
        Condition::And(junction) => compile_junction(emitter, junction, Combine::And),
        Condition::Or(junction) => compile_junction(emitter, junction, Combine::Or),
    }
}

fn compile_junction(emitter: &mut Emitter, junction: &Junction, combine: Combine) {
    let mut children = junction.children().iter();

    if let Some(first) = children.next() {
        compile_condition(emitter, first);
    }

    for child in children {
        if child.is_junction() {
            emitter.emit_stash();
            compile_condition(emitter, child);
            emitter.emit_block_combine(combine);
        } else {
            compile_condition(emitter, child);
            emitter.emit_top2_combine(combine);
        }
    }
}

fn compile_action(
    emitter: &mut Emitter,
    ctx: &CircuitContext,
    action: &Action,
) -> Result<(), Diagnostic> {
    match action {
        Action::Output(target) => {
            emitter.emit_apply(Effect::Output, resolve_target(ctx, target.device())?)
        }
        Action::Set(target) => {
            emitter.emit_apply(Effect::Set, resolve_target(ctx, target.device())?)
        }
        Action::Reset(target) => {
            emitter.emit_apply(Effect::Reset, resolve_target(ctx, target.device())?)
        }
        Action::SetValue(target, value) => emitter.emit_apply(
            Effect::Write(value_ref(value)),
            resolve_target(ctx, target.device())?,
        ),
        Action::Interlocked(interlocked) => {
            // The copy is gated by the interlock so the circuit value below
            // it stays intact for the actions that follow.
            emitter.emit_duplicate();
            compile_condition(emitter, interlocked.interlock());
            emitter.emit_top2_combine(Combine::And);
            compile_action(emitter, ctx, interlocked.action())?;
            emitter.emit_pop();
        }
    }
    Ok(())
}

fn resolve_target(
    ctx: &CircuitContext,
    device: &Device,
) -> Result<TargetRef, Diagnostic> {
    target_ref(device).ok_or_else(|| {
        Diagnostic::problem(
            Problem::CapabilityViolation,
            ctx.label("Action target cannot be written"),
        )
        .with_context("device", device)
        .with_context("kind", format!("{:?}", device.kind()))
    })
}

fn check_depth(
    emitter: &Emitter,
    ctx: &CircuitContext,
    expected: (usize, usize),
    message: &str,
) -> Result<(), Diagnostic> {
    let (primary, secondary) = emitter.depth();
    if emitter.underflowed() || (primary, secondary) != expected {
        return Err(
            Diagnostic::problem(Problem::StackInvariantViolation, ctx.label(message))
                .with_context("primary", primary)
                .with_context("secondary", secondary)
                .with_context("underflow", emitter.underflowed()),
        );
    }
    Ok(())
}
