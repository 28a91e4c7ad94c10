/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dupe::Dupe;
use pretty_assertions::assert_eq;

use crate::error::kind::ErrorKind;
use crate::test::util::union;
use crate::test::util::TestEnv;
use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::literal::Lit;
use crate::types::types::Type;
use crate::types::types::TypeAlias;

fn instance(cls: &Class) -> Type {
    ClassType::new(cls.dupe(), TArgs::default()).to_type()
}

fn error_kinds(env: &TestEnv) -> Vec<ErrorKind> {
    env.errors().collect().iter().map(|e| e.kind()).collect()
}

#[test]
fn test_match_args_selects_the_right_member() {
    let mut env = TestEnv::new();
    let a = env.simple_class(
        "A",
        Vec::new(),
        vec![
            ("__match_args__", TestEnv::match_args(&["v"])),
            ("v", env.int_ty()),
        ],
    );
    let b = env.simple_class("B", Vec::new(), Vec::new());
    let subject = union(vec![instance(&a), instance(&b)]);
    let cap = env.capture("x");
    let pat = env.class_pat(&a, vec![TestEnv::pos_arg(cap)]);
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), instance(&a));
    assert!(env.errors().is_empty());
}

#[test]
fn test_narrower_subject_member_survives_whole() {
    let mut env = TestEnv::new();
    let int_cls = env.lookup_class("builtins", "int");
    let pat = env.class_pat(&int_cls, Vec::new());
    let solver = env.solver();
    assert_eq!(
        solver.narrow(&Lit::Int(1).to_type(), &pat, true),
        Lit::Int(1).to_type()
    );
}

#[test]
fn test_narrower_pattern_class_wins() {
    let mut env = TestEnv::new();
    let subject = env.stdlib().object_class_type().clone().to_type();
    let int_cls = env.lookup_class("builtins", "int");
    let pat = env.class_pat(&int_cls, Vec::new());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), env.int_ty());
}

#[test]
fn test_type_argument_transfer() {
    let mut env = TestEnv::new();
    let subject = env
        .class_type("collections.abc", "Sequence", vec![env.int_ty()])
        .to_type();
    let list_cls = env.lookup_class("builtins", "list");
    let pat = env.class_pat(&list_cls, Vec::new());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), env.list_ty(env.int_ty()));
}

#[test]
fn test_unrelated_class_is_dropped() {
    let mut env = TestEnv::new();
    let a = env.simple_class("A", Vec::new(), Vec::new());
    let b = env.simple_class("B", Vec::new(), Vec::new());
    let pat = env.class_pat(&a, Vec::new());
    let solver = env.solver();
    assert!(solver.narrow(&instance(&b), &pat, true).is_never());
    // Negatively, an unrelated member is untouched.
    assert_eq!(solver.narrow(&instance(&b), &pat, false), instance(&b));
}

#[test]
fn test_none_matches_none_type_only() {
    let mut env = TestEnv::new();
    let none_cls = env.lookup_class("builtins", "NoneType");
    let subject = union(vec![env.int_ty(), Type::None]);
    let pat = env.class_pat(&none_cls, Vec::new());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), Type::None);
    assert_eq!(solver.narrow(&subject, &pat, false), env.int_ty());
}

#[test]
fn test_self_matching_builtin_positional() {
    let mut env = TestEnv::new();
    let int_cls = env.lookup_class("builtins", "int");
    let subject = union(vec![env.int_ty(), env.str_ty()]);
    let lit = env.lit_pat(Lit::Int(1).to_type());
    let pat = env.class_pat(&int_cls, vec![TestEnv::pos_arg(lit)]);
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), env.int_ty());
    assert!(env.errors().is_empty());
}

#[test]
fn test_self_matching_builtin_rejects_keywords() {
    let mut env = TestEnv::new();
    let int_cls = env.lookup_class("builtins", "int");
    let cap = env.capture("x");
    let kw = env.kw_arg("real", cap);
    let pat = env.class_pat(&int_cls, vec![kw]);
    let solver = env.solver();
    solver.narrow(&env.int_ty(), &pat, true);
    assert_eq!(error_kinds(&env), vec![ErrorKind::ClassPatternBuiltinKeyword]);
}

#[test]
fn test_self_matching_builtin_one_positional_only() {
    let mut env = TestEnv::new();
    let int_cls = env.lookup_class("builtins", "int");
    let first = env.wildcard();
    let second = env.wildcard();
    let pat = env.class_pat(
        &int_cls,
        vec![TestEnv::pos_arg(first), TestEnv::pos_arg(second)],
    );
    let solver = env.solver();
    solver.narrow(&env.int_ty(), &pat, true);
    assert_eq!(
        error_kinds(&env),
        vec![ErrorKind::ClassPatternPositionalArgCount]
    );
}

#[test]
fn test_too_many_positional_patterns() {
    let mut env = TestEnv::new();
    let a = env.simple_class(
        "A",
        Vec::new(),
        vec![
            ("__match_args__", TestEnv::match_args(&["v"])),
            ("v", env.int_ty()),
        ],
    );
    let first = env.wildcard();
    let second = env.wildcard();
    let pat = env.class_pat(&a, vec![TestEnv::pos_arg(first), TestEnv::pos_arg(second)]);
    let solver = env.solver();
    // Still narrows; the extra argument is matched against an unknown.
    assert_eq!(solver.narrow(&instance(&a), &pat, true), instance(&a));
    assert_eq!(
        error_kinds(&env),
        vec![ErrorKind::ClassPatternPositionalArgCount]
    );
}

#[test]
fn test_non_class_reference() {
    let mut env = TestEnv::new();
    let e = env.expr(env.int_ty());
    let pat = crate::binding::pattern::Pattern::Class(crate::binding::pattern::PatternClass {
        range: ruff_text_size::Ranged::range(&e),
        cls: Box::new(e),
        args: Vec::new(),
    });
    let solver = env.solver();
    let narrowed = solver.narrow(&env.str_ty(), &pat, true);
    assert!(narrowed.is_unknown());
    assert_eq!(error_kinds(&env), vec![ErrorKind::ClassPatternNotAClass]);
}

#[test]
fn test_specialized_type_alias_is_reported() {
    let mut env = TestEnv::new();
    let a = env.simple_class("A", Vec::new(), Vec::new());
    let alias = Type::TypeAlias(Box::new(TypeAlias::new(
        ruff_python_ast::name::Name::new("MyA"),
        instance(&a),
        true,
    )));
    let e = env.expr(alias);
    let pat = crate::binding::pattern::Pattern::Class(crate::binding::pattern::PatternClass {
        range: ruff_text_size::Ranged::range(&e),
        cls: Box::new(e),
        args: Vec::new(),
    });
    let solver = env.solver();
    // The alias still resolves; the diagnostic is non-fatal.
    assert_eq!(solver.narrow(&instance(&a), &pat, true), instance(&a));
    assert_eq!(error_kinds(&env), vec![ErrorKind::ClassPatternTypeAlias]);
}

#[test]
fn test_final_class_negative_elimination() {
    let mut env = TestEnv::new();
    let c = env.final_class("C", Vec::new(), Vec::new());
    let pat = env.class_pat(&c, Vec::new());
    let solver = env.solver();
    assert!(solver.narrow(&instance(&c), &pat, false).is_never());
}

#[test]
fn test_negative_same_class_eliminates() {
    let mut env = TestEnv::new();
    let a = env.simple_class("A", Vec::new(), Vec::new());
    let pat = env.class_pat(&a, Vec::new());
    let solver = env.solver();
    assert!(solver.narrow(&instance(&a), &pat, false).is_never());
}

#[test]
fn test_negative_subclass_is_kept() {
    let mut env = TestEnv::new();
    let base = env.simple_class("Base", Vec::new(), Vec::new());
    let base_ct = ClassType::new(base.dupe(), TArgs::default());
    let leaf = env.simple_class("Leaf", vec![base_ct], Vec::new());
    let pat = env.class_pat(&base, Vec::new());
    let solver = env.solver();
    // Conservative: a strict subclass could carry attributes the pattern
    // never saw, so the member stays.
    assert_eq!(solver.narrow(&instance(&leaf), &pat, false), instance(&leaf));
}

#[test]
fn test_negative_final_with_lossless_args_eliminates() {
    let mut env = TestEnv::new();
    let c = env.final_class(
        "C",
        Vec::new(),
        vec![
            ("__match_args__", TestEnv::match_args(&["v"])),
            ("v", env.int_ty()),
        ],
    );
    let wild = env.wildcard();
    let pat = env.class_pat(&c, vec![TestEnv::pos_arg(wild)]);
    let solver = env.solver();
    assert!(solver.narrow(&instance(&c), &pat, false).is_never());

    // A refining argument makes the match indefinite.
    let lit = env.lit_pat(Lit::Int(1).to_type());
    let pat = env.class_pat(&c, vec![TestEnv::pos_arg(lit)]);
    let solver = env.solver();
    assert_eq!(solver.narrow(&instance(&c), &pat, false), instance(&c));
}

#[test]
fn test_missing_attribute() {
    let mut env = TestEnv::new();
    let f = env.final_class("F", Vec::new(), Vec::new());
    let cap = env.capture("w");
    let kw = env.kw_arg("w", cap);
    let pat = env.class_pat(&f, vec![kw]);
    let solver = env.solver();
    // A final class without the attribute can never match.
    assert!(solver.narrow(&instance(&f), &pat, true).is_never());

    let a = env.simple_class("A", Vec::new(), Vec::new());
    let cap = env.capture("w");
    let kw = env.kw_arg("w", cap);
    let pat = env.class_pat(&a, vec![kw]);
    let solver = env.solver();
    // A subclass could add the attribute; the member survives.
    assert_eq!(solver.narrow(&instance(&a), &pat, true), instance(&a));
}

#[test]
fn test_instantiable_subject_matches_type_pattern() {
    let mut env = TestEnv::new();
    let a = env.simple_class("A", Vec::new(), Vec::new());
    let type_cls = env.lookup_class("builtins", "type");
    let subject = Type::ClassDef(a.dupe());
    let pat = env.class_pat(&type_cls, Vec::new());
    let solver = env.solver();
    assert_eq!(solver.narrow(&subject, &pat, true), subject);
    // Negatively, instantiables are kept.
    assert_eq!(solver.narrow(&subject, &pat, false), subject);

    // A non-`type` class pattern cannot match a class object.
    let int_cls = env.lookup_class("builtins", "int");
    let pat = env.class_pat(&int_cls, Vec::new());
    let solver = env.solver();
    assert!(solver.narrow(&subject, &pat, true).is_never());
}

#[test]
fn test_gradual_subject_narrows_to_class() {
    let mut env = TestEnv::new();
    let a = env.simple_class("A", Vec::new(), Vec::new());
    let pat = env.class_pat(&a, Vec::new());
    let solver = env.solver();
    assert_eq!(
        solver.narrow(&Type::any_explicit(), &pat, true),
        instance(&a)
    );
}
