//! A compiled and scanned condition must read the same as the condition tree.

mod common;

use common::scan;
use ladder_dsl::action::Action;
use ladder_dsl::allocator::Allocator;
use ladder_dsl::condition::Condition;
use ladder_dsl::device::Bit;
use ladder_dsl::unit::LogicUnit;
use ladder_vm::Vm;
use proptest::prelude::*;

/// Field state: inputs X0..X7 and relays M0..M7.
#[derive(Clone, Debug)]
struct Field {
    inputs: [bool; 8],
    relays: [bool; 8],
}

fn arb_field() -> impl Strategy<Value = Field> {
    (any::<[bool; 8]>(), any::<[bool; 8]>()).prop_map(|(inputs, relays)| Field { inputs, relays })
}

fn arb_condition() -> impl Strategy<Value = Condition> {
    let leaf = (0u32..8, any::<bool>(), any::<bool>()).prop_map(|(address, relay, inverse)| {
        let condition = if relay {
            Condition::from(Allocator::contact("M", 1, address).allocate(None).unwrap())
        } else {
            Condition::from(Allocator::input("X", 1, address).allocate(None).unwrap())
        };
        if inverse {
            condition.negate()
        } else {
            condition
        }
    });
    leaf.prop_recursive(5, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 2..4)
                .prop_map(|children| Condition::all(children).unwrap()),
            prop::collection::vec(inner.clone(), 2..4)
                .prop_map(|children| Condition::any(children).unwrap()),
            inner.prop_map(|condition| !condition),
        ]
    })
}

/// Evaluates the tree directly, without compiling it.
fn evaluate(condition: &Condition, field: &Field) -> bool {
    match condition {
        Condition::Leaf(Bit::Input(input)) => {
            field.inputs[input.address() as usize] != input.inverse()
        }
        Condition::Leaf(Bit::Contact(contact)) => {
            field.relays[contact.address() as usize] != contact.inverse()
        }
        Condition::Leaf(other) => panic!("unexpected leaf {other}"),
        Condition::And(junction) => junction.children().iter().all(|c| evaluate(c, field)),
        Condition::Or(junction) => junction.children().iter().any(|c| evaluate(c, field)),
    }
}

/// Drives the field into a fresh machine.
fn machine(field: &Field) -> Vm {
    let mut vm = Vm::new();
    let mut inputs = Allocator::input("X", 8, 0);
    let mut relays = Allocator::contact("M", 8, 0);
    for index in 0..8 {
        vm.set_input(&inputs.allocate(None).unwrap(), field.inputs[index]);
        vm.set_bit(relays.allocate(None).unwrap(), field.relays[index])
            .unwrap();
    }
    vm
}

proptest! {
    #[test]
    fn scan_when_any_condition_then_output_matches_tree(
        condition in arb_condition(),
        field in arb_field(),
    ) {
        let z = Allocator::contact("Y", 1, 0).allocate(None).unwrap();
        let mut unit = LogicUnit::new("main");
        unit.circuit(condition.clone().then(Action::output(z.clone())));
        let mut vm = machine(&field);

        scan(&mut vm, &unit, 1);

        prop_assert_eq!(vm.read_bit(z), evaluate(&condition, &field));
    }

    #[test]
    fn scan_when_compound_interlock_then_inner_action_sees_conjunction(
        condition in arb_condition(),
        interlock in arb_condition(),
        field in arb_field(),
    ) {
        let mut outputs = Allocator::contact("Y", 2, 0);
        let gated = outputs.allocate(None).unwrap();
        let plain = outputs.allocate(None).unwrap();
        let mut unit = LogicUnit::new("main");
        unit.circuit(condition.clone().then_parallel([
            Action::interlocked(interlock.clone(), Action::output(gated.clone())),
            Action::output(plain.clone()),
        ]));
        let mut vm = machine(&field);

        scan(&mut vm, &unit, 1);

        let expected = evaluate(&condition, &field);
        prop_assert_eq!(vm.read_bit(gated), expected && evaluate(&interlock, &field));
        prop_assert_eq!(vm.read_bit(plain), expected);
    }
}
