//! Problem codes for the ladder toolchain.
//!
//! The enumeration is generated at build time from
//! `resources/problem-codes.csv` so that codes stay stable between
//! releases while the internal names remain easy to read.

include!(concat!(env!("OUT_DIR"), "/problems.rs"));

#[cfg(test)]
mod tests {
    use super::Problem;

    #[test]
    fn code_when_allocation_overflow_then_p0001() {
        assert_eq!(Problem::AllocationOverflow.code(), "P0001");
    }

    #[test]
    fn message_when_stack_invariant_violation_then_mentions_stacks() {
        assert!(Problem::StackInvariantViolation.message().contains("stacks"));
    }
}
