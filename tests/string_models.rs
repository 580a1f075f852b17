//! Tests of the string call models against buffers with concrete,
//! partially symbolic, and fully symbolic contents.

mod common;

use common::{byte_at, concrete_byte_at, new_state, push_pattern};
use symex_core::{
    models::strings::{strcmp, strcpy, strlen, Strcmp, Strlen},
    SymbolicValue,
};

#[test]
fn strcmp_on_equal_concrete_strings_returns_zero() -> anyhow::Result<()> {
    let mut state = new_state();
    let left = push_pattern(&mut state, "ab\0");
    let right = push_pattern(&mut state, "ab\0");

    let result = strcmp(&mut state, left, right).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert!(state.must_be_true(&SymbolicValue::eq(result, SymbolicValue::known(0_u64)))?);

    Ok(())
}

#[test]
fn strcmp_orders_concrete_strings() -> anyhow::Result<()> {
    let mut state = new_state();
    let smaller = push_pattern(&mut state, "abc\0");
    let larger = push_pattern(&mut state, "abd\0");

    let forward = strcmp(&mut state, smaller, larger).map_err(|e| anyhow::anyhow!("{e}"))?;
    let backward = strcmp(&mut state, larger, smaller).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert!(state.must_be_true(&SymbolicValue::slt(forward, SymbolicValue::known(0_u64)))?);
    assert!(state.must_be_true(&SymbolicValue::sgt(backward, SymbolicValue::known(0_u64)))?);

    Ok(())
}

#[test]
fn strcmp_stops_at_an_embedded_terminator() -> anyhow::Result<()> {
    let mut state = new_state();
    let left = push_pattern(&mut state, "ab\0");
    let right = push_pattern(&mut state, "a\0b\0");

    let result = strcmp(&mut state, left, right).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert!(state.must_be_true(&SymbolicValue::sgt(result, SymbolicValue::known(0_u64)))?);

    Ok(())
}

#[test]
fn strcmp_with_symbolic_bytes_resolves_under_later_constraints() -> anyhow::Result<()> {
    let mut state = new_state();
    let left = push_pattern(&mut state, "hi\0");
    let right = push_pattern(&mut state, "++\0");

    let result = strcmp(&mut state, left, right).map_err(|e| anyhow::anyhow!("{e}"))?;
    let zero = || SymbolicValue::known(0_u64);

    // Unconstrained, the comparison could go either way.
    assert!(state.can_be_true(&SymbolicValue::eq(result.clone(), zero()))?);
    assert!(state.can_be_true(&SymbolicValue::ne(result.clone(), zero()))?);

    let first = byte_at(&state, right);
    let second = byte_at(&state, right + 1);

    let mut ordered = state.clone();
    ordered.constrain(SymbolicValue::eq(first.clone(), SymbolicValue::known(b'a')));
    assert!(ordered.must_be_true(&SymbolicValue::sgt(result.clone(), zero()))?);

    let mut reversed = state.clone();
    reversed.constrain(SymbolicValue::eq(first.clone(), SymbolicValue::known(b'z')));
    assert!(reversed.must_be_true(&SymbolicValue::slt(result.clone(), zero()))?);

    let mut equal = state.clone();
    equal.constrain(SymbolicValue::eq(first, SymbolicValue::known(b'h')));
    equal.constrain(SymbolicValue::eq(second, SymbolicValue::known(b'i')));
    assert!(equal.must_be_true(&SymbolicValue::eq(result, zero()))?);

    Ok(())
}

#[test]
fn strcmp_honours_a_terminator_imposed_by_constraints() -> anyhow::Result<()> {
    let mut state = new_state();
    let left = push_pattern(&mut state, "a\0");
    let right = push_pattern(&mut state, "a+");

    // The right buffer holds no literal zero; its terminator exists only
    // through the path condition, asserted before the scan runs.
    state.constrain(SymbolicValue::eq(
        byte_at(&state, right + 1),
        SymbolicValue::known(0_u64),
    ));

    let result = strcmp(&mut state, left, right).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert!(state.must_be_true(&SymbolicValue::eq(result, SymbolicValue::known(0_u64)))?);

    Ok(())
}

#[test]
fn strcmp_invoked_as_a_model_behaves_identically() -> anyhow::Result<()> {
    let mut state = new_state();
    let left = push_pattern(&mut state, "same\0");
    let right = push_pattern(&mut state, "same\0");

    let result = state
        .invoke_model(&Strcmp, &[left, right])
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    assert!(state.must_be_true(&SymbolicValue::eq(result, SymbolicValue::known(0_u64)))?);

    Ok(())
}

#[test]
fn strlen_stops_at_the_first_terminator() -> anyhow::Result<()> {
    let mut state = new_state();
    let string = push_pattern(&mut state, "ab\0cd\0");

    let length = strlen(&mut state, string).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert_eq!(length.as_known().unwrap().value(), 2);

    Ok(())
}

#[test]
fn strlen_of_the_empty_string_is_zero() -> anyhow::Result<()> {
    let mut state = new_state();
    let string = push_pattern(&mut state, "\0");

    let length = strlen(&mut state, string).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert_eq!(length.as_known().unwrap().value(), 0);

    Ok(())
}

#[test]
fn strlen_honours_a_terminator_imposed_by_constraints() -> anyhow::Result<()> {
    let mut state = new_state();
    let string = push_pattern(&mut state, "ab+");

    // No literal zero anywhere in the buffer; the terminator exists only
    // through the path condition, asserted before the scan runs.
    state.constrain(SymbolicValue::eq(
        byte_at(&state, string + 2),
        SymbolicValue::known(0_u64),
    ));

    let length = strlen(&mut state, string).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert_eq!(length.as_known().unwrap().value(), 2);

    Ok(())
}

#[test]
fn strlen_over_symbolic_bytes_covers_every_feasible_length() -> anyhow::Result<()> {
    let mut state = new_state();
    let string = push_pattern(&mut state, "+++\0");

    let length = state
        .invoke_model(&Strlen, &[string])
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let lengths = state
        .solver()
        .get_all_values(state.constraints(), &length, 16)?;

    assert_eq!(lengths, vec![0, 1, 2, 3]);

    Ok(())
}

#[test]
fn strlen_narrows_once_the_bytes_are_constrained() -> anyhow::Result<()> {
    let mut state = new_state();
    let string = push_pattern(&mut state, "+++\0");

    let length = strlen(&mut state, string).map_err(|e| anyhow::anyhow!("{e}"))?;

    state.constrain(SymbolicValue::ne(
        byte_at(&state, string),
        SymbolicValue::known(0_u64),
    ));
    state.constrain(SymbolicValue::eq(
        byte_at(&state, string + 1),
        SymbolicValue::known(0_u64),
    ));

    assert!(state.must_be_true(&SymbolicValue::eq(length, SymbolicValue::known(1_u64)))?);

    Ok(())
}

#[test]
fn strlen_of_a_mixed_buffer_skips_definitely_nonzero_bytes() -> anyhow::Result<()> {
    let mut state = new_state();
    let string = push_pattern(&mut state, "a+b+\0");

    let length = strlen(&mut state, string).map_err(|e| anyhow::anyhow!("{e}"))?;
    let lengths = state
        .solver()
        .get_all_values(state.constraints(), &length, 16)?;

    assert_eq!(lengths, vec![1, 3, 4]);

    Ok(())
}

#[test]
fn strcpy_copies_a_concrete_string_and_its_terminator() -> anyhow::Result<()> {
    let mut state = new_state();
    let dst = push_pattern(&mut state, "ZZZZZZ\0");
    let src = push_pattern(&mut state, "hi\0");

    let returned = strcpy(&mut state, dst, src).map_err(|e| anyhow::anyhow!("{e}"))?;

    assert_eq!(returned.as_known().unwrap().value(), dst);
    assert_eq!(concrete_byte_at(&state, dst), u64::from(b'h'));
    assert_eq!(concrete_byte_at(&state, dst + 1), u64::from(b'i'));
    assert_eq!(concrete_byte_at(&state, dst + 2), 0);
    // Bytes past the terminator are untouched.
    assert_eq!(concrete_byte_at(&state, dst + 3), u64::from(b'Z'));

    Ok(())
}

#[test]
fn strcpy_preserves_the_destination_past_a_possible_terminator() -> anyhow::Result<()> {
    let mut state = new_state();
    let dst = push_pattern(&mut state, "ZZZZ\0");
    let src = push_pattern(&mut state, "h+\0");

    strcpy(&mut state, dst, src).map_err(|e| anyhow::anyhow!("{e}"))?;

    let copied = byte_at(&state, dst + 1);
    let tail = byte_at(&state, dst + 2);
    let symbolic = byte_at(&state, src + 1);

    // If the symbolic byte is the terminator, the copy stopped with it and
    // the destination's old content survives beyond.
    let mut stopped = state.clone();
    stopped.constrain(SymbolicValue::eq(
        symbolic.clone(),
        SymbolicValue::known(0_u64),
    ));
    assert!(stopped.must_be_true(&SymbolicValue::eq(
        tail.clone(),
        SymbolicValue::known(b'Z')
    ))?);

    // Otherwise the copy ran on and the concrete terminator was copied.
    let mut continued = state.clone();
    continued.constrain(SymbolicValue::eq(symbolic, SymbolicValue::known(b'i')));
    assert!(continued.must_be_true(&SymbolicValue::eq(
        copied,
        SymbolicValue::known(b'i')
    ))?);
    assert!(continued.must_be_true(&SymbolicValue::eq(tail, SymbolicValue::known(0_u64)))?);

    Ok(())
}
