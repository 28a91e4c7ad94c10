/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use pretty_assertions::assert_eq;
use ruff_python_ast::name::Name;

use crate::error::kind::ErrorKind;
use crate::test::util::union;
use crate::test::util::TestEnv;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::literal::Lit;
use crate::types::simplify::unions;
use crate::types::types::Type;

#[test]
fn test_capture_keeps_everything_and_leaves_nothing() {
    let mut env = TestEnv::new();
    let cap = env.capture("x");
    let types = [
        env.int_ty(),
        union(vec![env.int_ty(), env.str_ty()]),
        Type::never(),
        Type::any_implicit(),
        Type::None,
    ];
    let solver = env.solver();
    for t in &types {
        assert_eq!(&solver.narrow(t, &cap, true), t);
        assert!(solver.narrow(t, &cap, false).is_never());
    }
}

#[test]
fn test_wildcard_or_pattern() {
    let mut env = TestEnv::new();
    let wild = env.wildcard();
    let pat = env.or_pat(vec![wild], None);
    let subject = union(vec![env.int_ty(), Type::None]);
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), subject);
    assert!(solver.narrow(&subject, &pat, false).is_never());
}

#[test]
fn test_literal_selects_matching_member() {
    let mut env = TestEnv::new();
    let subject = union(vec![
        Lit::Int(1).to_type(),
        Lit::Int(2).to_type(),
        Lit::Str("x".into()).to_type(),
    ]);
    let pat = env.lit_pat(Lit::Int(1).to_type());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), Lit::Int(1).to_type());
}

#[test]
fn test_literal_refines_general_member() {
    let mut env = TestEnv::new();
    let pat = env.lit_pat(Lit::Int(1).to_type());
    let solver = env.solver();
    assert_eq!(
        solver.narrow(&env.int_ty(), &pat, true),
        Lit::Int(1).to_type()
    );
}

#[test]
fn test_literal_idempotent() {
    let mut env = TestEnv::new();
    let subject = union(vec![env.int_ty(), env.str_ty()]);
    let pat = env.lit_pat(Lit::Int(1).to_type());
    let solver = env.solver();
    let once = solver.narrow(&subject, &pat, true);
    let twice = solver.narrow(&once, &pat, true);
    assert_eq!(once, twice);
}

#[test]
fn test_literal_negative() {
    let mut env = TestEnv::new();
    let one = env.lit_pat(Lit::Int(1).to_type());
    let none = env.lit_none_pat();
    let solver = env.solver();

    let lits = union(vec![Lit::Int(1).to_type(), Lit::Int(2).to_type()]);
    assert_eq!(solver.narrow(&lits, &one, false), Lit::Int(2).to_type());

    let optional = union(vec![env.int_ty(), Type::None]);
    assert_eq!(solver.narrow(&optional, &none, false), env.int_ty());

    // A non-literal int is not eliminated by a literal.
    assert_eq!(solver.narrow(&env.int_ty(), &one, false), env.int_ty());
}

#[test]
fn test_bool_negative_complement() {
    let mut env = TestEnv::new();
    let pat = env.lit_bool_pat(true);
    let solver = env.solver();
    assert_eq!(
        solver.narrow(&env.bool_ty(), &pat, false),
        Lit::Bool(false).to_type()
    );
    assert!(solver
        .narrow(&Lit::Bool(true).to_type(), &pat, false)
        .is_never());
}

#[test]
fn test_positive_negative_partition() {
    let mut env = TestEnv::new();
    let subject = union(vec![env.int_ty(), Type::None]);
    let pat = env.lit_none_pat();
    let solver = env.solver();
    let pos = solver.narrow(&subject, &pat, true);
    let neg = solver.narrow(&subject, &pat, false);
    let combined = unions(vec![pos, neg]);
    assert!(solver.is_assignable(&subject, &combined));
    assert!(solver.is_assignable(&combined, &subject));
}

#[test]
fn test_union_distribution() {
    let mut env = TestEnv::new();
    let a = Lit::Int(1).to_type();
    let b = env.str_ty();
    let pat = env.lit_pat(Lit::Int(1).to_type());
    let solver = env.solver();
    let whole = solver.narrow(&union(vec![a.clone(), b.clone()]), &pat, true);
    let memberwise = unions(vec![
        solver.narrow(&a, &pat, true),
        solver.narrow(&b, &pat, true),
    ]);
    assert!(whole.same(&memberwise));
}

#[test]
fn test_value_keeps_members_that_support_eq() {
    let mut env = TestEnv::new();
    let no_eq = env.simple_class("Opaque", Vec::new(), Vec::new());
    env.remove_eq(&no_eq);
    let no_eq_ty = ClassType::new(no_eq, TArgs::default()).to_type();
    let subject = union(vec![no_eq_ty, env.int_ty()]);
    let pat = env.value_pat(Lit::Int(5).to_type());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), env.int_ty());
}

#[test]
fn test_value_gradual_prefers_unknown() {
    let mut env = TestEnv::new();
    let known_value = env.value_pat(env.int_ty());
    let unknown_value = env.value_pat(Type::any_implicit());
    let solver = env.solver();
    assert_eq!(
        solver.narrow(&Type::any_explicit(), &known_value, true),
        Type::any_explicit()
    );
    assert_eq!(
        solver.narrow(&env.int_ty(), &unknown_value, true),
        Type::any_implicit()
    );
    assert_eq!(
        solver.narrow(&Type::any_explicit(), &unknown_value, true),
        Type::any_implicit()
    );
}

#[test]
fn test_value_enum_negative_eliminates_matching_literal() {
    let mut env = TestEnv::new();
    let color = env.enum_class("Color", &["RED", "GREEN"]);
    let red = Lit::enum_member(color.clone(), Name::new("RED")).to_type();
    let green = Lit::enum_member(color.clone(), Name::new("GREEN")).to_type();
    let subject = union(vec![red.clone(), green.clone()]);
    let pat = env.value_pat(red.clone());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, false), green);
    // Positively, both members support `__eq__`, so both survive.
    assert_eq!(solver.narrow(&subject, &pat, true), subject);
    // The enum's member literals come back in declaration order.
    let members = solver.enum_member_literals(&color).unwrap();
    assert_eq!(
        members.iter().map(|m| m.clone().to_type()).collect::<Vec<_>>(),
        vec![red, green]
    );
}

#[test]
fn test_value_never_subject() {
    let mut env = TestEnv::new();
    let pat = env.value_pat(env.int_ty());
    let solver = env.solver();
    assert!(solver.narrow(&Type::never(), &pat, true).is_never());
}

#[test]
fn test_or_pattern_distributes_with_remainder() {
    let mut env = TestEnv::new();
    let one = env.lit_pat(Lit::Int(1).to_type());
    let two = env.lit_pat(Lit::Int(2).to_type());
    let pat = env.or_pat(vec![one, two], None);
    let subject = union(vec![
        Lit::Int(1).to_type(),
        Lit::Int(2).to_type(),
        env.str_ty(),
    ]);
    let solver = env.solver();
    let pos = solver.narrow(&subject, &pat, true);
    assert!(pos.same(&union(vec![Lit::Int(1).to_type(), Lit::Int(2).to_type()])));
    assert_eq!(solver.narrow(&subject, &pat, false), env.str_ty());
}

#[test]
fn test_error_pattern_is_identity() {
    let mut env = TestEnv::new();
    let pat = crate::binding::pattern::Pattern::Error(ruff_text_size::TextRange::default());
    let subject = union(vec![env.int_ty(), Type::None]);
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), subject);
    assert_eq!(solver.narrow(&subject, &pat, false), subject);
}

#[test]
fn test_solve_case_reports_never_matching_pattern() {
    let mut env = TestEnv::new();
    let pat = env.lit_pat(Lit::Str("x".into()).to_type());
    let solver = env.solver();
    let outcome = solver.solve_case(&env.int_ty(), &pat);
    assert!(outcome.narrowed.is_never());
    let kinds: Vec<ErrorKind> = env.errors().collect().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![ErrorKind::PatternNeverMatches]);
}
