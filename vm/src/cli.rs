//! Implements the command line behavior.

use std::thread;
use std::time::Duration;

use ladder_dsl::action::Action;
use ladder_dsl::allocator::Allocator;
use ladder_dsl::condition::Condition;
use ladder_dsl::device::{Bit, Constant, Contact, Input, Timer, Word, ON};
use ladder_dsl::diagnostic::Diagnostic;
use ladder_dsl::unit::LogicUnit;
use log::{debug, info};

use crate::vm::{Driver, Vm};

/// Number of scans the lamp waits after the motor starts.
pub const LAMP_DELAY_SCANS: i64 = 3;

/// Pause between scans when running until interrupted.
const SCAN_INTERVAL: Duration = Duration::from_millis(10);

/// The devices of the demo plant: a motor with start and stop push buttons
/// and a lamp that lights once the motor has run for a while.
pub struct Plant {
    pub start: Input,
    pub stop: Input,
    pub run: Contact,
    pub motor: Contact,
    pub lamp: Contact,
    pub delay: Timer,
}

impl Plant {
    /// Returns the input at the address, if the plant uses it.
    pub fn input(&self, address: u32) -> Option<&Input> {
        [&self.start, &self.stop]
            .into_iter()
            .find(|input| input.address() == address)
    }
}

/// Builds the demo program.
///
/// ```text
/// (X0 | M0) & !X1 => OUT M0;
/// M0 => OUT Y0, OUT T0;
/// T0 >= K3 => OUT Y1;
/// ```
pub fn plant() -> Result<(LogicUnit, Plant), Diagnostic> {
    let mut inputs = Allocator::input("X", 8, 0);
    let mut relays = Allocator::contact("M", 8, 0);
    let mut outputs = Allocator::contact("Y", 8, 0);
    let mut timers = Allocator::timer("T", 4, 0, Constant::new(LAMP_DELAY_SCANS));

    let plant = Plant {
        start: inputs.allocate(Some("Start push button"))?,
        stop: inputs.allocate(Some("Stop push button"))?,
        run: relays.allocate(Some("Run latch"))?,
        motor: outputs.allocate(Some("Motor contactor"))?,
        lamp: outputs.allocate(Some("Running lamp"))?,
        delay: timers.allocate(Some("Lamp on-delay"))?,
    };

    let self_hold = (Condition::from(plant.start.clone()) | plant.run.clone())
        & !Condition::from(plant.stop.clone());

    let mut unit = LogicUnit::new("motor");
    unit.register(inputs)?
        .register(relays)?
        .register(outputs)?
        .register(timers)?;
    unit.circuit(self_hold.then(Action::output(plant.run.clone())))
        .circuit(Condition::from(plant.run.clone()).then_parallel([
            Action::output(plant.motor.clone()),
            Action::output(plant.delay.clone()),
        ]))
        .circuit(Condition::from(plant.delay.contact()).then(Action::output(plant.lamp.clone())));

    Ok((unit, plant))
}

/// Builds, compiles and runs the demo program.
///
/// When `scans` is `Some(n)`, runs exactly `n` scans.
/// When `scans` is `None`, runs continuously until Ctrl+C.
/// The inputs at `inputs` are held ON for every scan.
pub fn demo(scans: Option<u64>, inputs: &[u32], listing: bool) -> Result<(), String> {
    let (unit, plant) = plant().map_err(|e| format!("Unable to build demo program: {e}"))?;

    let mut vm = Vm::new();
    let sequence = vm
        .compile(&unit)
        .map_err(|e| format!("Unable to compile demo program: {e}"))?;
    debug!("Compiled demo program into {} commands", sequence.len());

    if listing {
        for comment in unit.comments() {
            println!("; {}  {}", comment.device(), comment.text());
        }
        print!("{sequence}");
    }

    for address in inputs {
        let input = plant.input(*address).ok_or_else(|| {
            format!("Unknown input X{address}; the demo uses X0 (start) and X1 (stop)")
        })?;
        vm.set_input(input, ON);
    }

    if scans.is_none() {
        let handle = vm.stop_handle();
        ctrlc::set_handler(move || handle.request_stop())
            .map_err(|e| format!("Failed to set signal handler: {e}"))?;
        info!("Running until interrupted");
    }

    loop {
        if vm.stop_requested() {
            break;
        }
        if let Some(max) = scans {
            if vm.scan_count() >= max {
                break;
            }
        }
        vm.run(&sequence).map_err(|e| format!("VM trap: {e}"))?;
        if scans.is_none() {
            thread::sleep(SCAN_INTERVAL);
        }
    }

    println!("scans: {}", vm.scan_count());
    for line in report(&vm, &plant) {
        println!("{line}");
    }
    Ok(())
}

/// Describes the state of every plant device, one device per line.
pub fn report(vm: &Vm, plant: &Plant) -> Vec<String> {
    let bits: [Bit; 5] = [
        plant.start.clone().into(),
        plant.stop.clone().into(),
        plant.run.clone().into(),
        plant.motor.clone().into(),
        plant.lamp.clone().into(),
    ];

    let mut lines: Vec<String> = bits
        .into_iter()
        .map(|bit| {
            let state = if vm.read_bit(bit.clone()) { "ON" } else { "OFF" };
            format!("{bit}: {state}")
        })
        .collect();

    let delay = Word::from(plant.delay.clone());
    lines.push(format!("{delay}: {}", vm.read_value(delay.clone())));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(vm: &mut Vm, unit: &LogicUnit, count: usize) {
        let sequence = vm.compile(unit).unwrap();
        for _ in 0..count {
            vm.run(&sequence).unwrap();
        }
    }

    #[test]
    fn plant_when_start_pressed_then_motor_latches() {
        let (unit, plant) = plant().unwrap();
        let mut vm = Vm::new();

        vm.set_input(&plant.start, true);
        scan(&mut vm, &unit, 1);
        vm.set_input(&plant.start, false);
        scan(&mut vm, &unit, 1);

        assert!(vm.read_bit(plant.run.clone()));
        assert!(vm.read_bit(plant.motor.clone()));
    }

    #[test]
    fn plant_when_running_then_lamp_after_delay() {
        let (unit, plant) = plant().unwrap();
        let mut vm = Vm::new();
        vm.set_input(&plant.start, true);

        scan(&mut vm, &unit, 2);
        assert!(!vm.read_bit(plant.lamp.clone()));

        scan(&mut vm, &unit, 1);
        assert!(vm.read_bit(plant.lamp.clone()));
    }

    #[test]
    fn plant_when_stop_pressed_then_everything_off() {
        let (unit, plant) = plant().unwrap();
        let mut vm = Vm::new();
        vm.set_input(&plant.start, true);
        scan(&mut vm, &unit, 5);

        vm.set_input(&plant.start, false);
        vm.set_input(&plant.stop, true);
        scan(&mut vm, &unit, 1);

        assert!(!vm.read_bit(plant.run.clone()));
        assert!(!vm.read_bit(plant.motor.clone()));
        assert!(!vm.read_bit(plant.lamp.clone()));
        assert_eq!(vm.read_value(plant.delay.clone()), 0);
    }

    #[test]
    fn plant_when_built_then_unit_owns_commented_allocators() {
        let (unit, _) = plant().unwrap();

        let comments: Vec<String> = unit
            .comments()
            .map(|comment| format!("{} {}", comment.device(), comment.text()))
            .collect();

        assert_eq!(unit.ranges().len(), 4);
        assert_eq!(comments[0], "X0 Start push button");
        assert_eq!(comments[5], "T0 Lamp on-delay");
    }

    #[test]
    fn report_when_fresh_vm_then_all_off() {
        let (_, plant) = plant().unwrap();
        let vm = Vm::new();

        let lines = report(&vm, &plant);

        assert_eq!(
            lines,
            vec!["X0: OFF", "X1: OFF", "M0: OFF", "Y0: OFF", "Y1: OFF", "T0: 0"]
        );
    }

    #[test]
    fn demo_when_unknown_input_then_err() {
        let result = demo(Some(1), &[7], false);

        assert!(result.unwrap_err().contains("Unknown input X7"));
    }
}
