/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dupe::Dupe;
use pretty_assertions::assert_eq;
use ruff_python_ast::Identifier;

use crate::binding::pattern::MappingEntry;
use crate::error::kind::ErrorKind;
use crate::test::util::union;
use crate::test::util::TestEnv;
use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::literal::Lit;
use crate::types::types::Type;

fn instance(cls: &Class) -> Type {
    ClassType::new(cls.dupe(), TArgs::default()).to_type()
}

fn named(bindings: &[(Identifier, Type)]) -> Vec<(String, Type)> {
    bindings
        .iter()
        .map(|(id, ty)| (id.id.to_string(), ty.clone()))
        .collect()
}

#[test]
fn test_capture_binds_subject() {
    let mut env = TestEnv::new();
    let pat = env.capture("x");
    let subject = union(vec![env.int_ty(), Type::None]);
    let solver = env.solver();
    let bindings = solver.bind_targets(&subject, &pat);
    assert_eq!(named(&bindings), vec![("x".to_owned(), subject)]);
}

#[test]
fn test_as_target_binds_whole_match() {
    let mut env = TestEnv::new();
    let one = env.lit_pat(Lit::Int(1).to_type());
    let pat = env.or_pat(vec![one], Some("y"));
    let solver = env.solver();
    let outcome = solver.solve_case(&env.int_ty(), &pat);
    assert_eq!(
        named(&outcome.bindings),
        vec![("y".to_owned(), Lit::Int(1).to_type())]
    );
}

#[test]
fn test_sequence_entry_bindings() {
    let mut env = TestEnv::new();
    let subject = Type::tuple(vec![env.int_ty(), env.str_ty(), env.bool_ty()]);
    let entries = vec![
        env.capture("a"),
        env.lit_pat(Lit::Str("x".into()).to_type()),
        env.capture("b"),
    ];
    let pat = env.seq_pat(entries, None);
    let solver = env.solver();
    let outcome = solver.solve_case(&subject, &pat);
    assert_eq!(
        named(&outcome.bindings),
        vec![
            ("a".to_owned(), env.int_ty()),
            ("b".to_owned(), env.bool_ty()),
        ]
    );
}

#[test]
fn test_star_binds_spanned_list() {
    let mut env = TestEnv::new();
    let subject = Type::tuple(vec![
        env.int_ty(),
        Lit::Str("x".into()).to_type(),
        env.str_ty(),
        env.bool_ty(),
    ]);
    let entries = vec![env.capture("a"), env.capture("rest"), env.capture("b")];
    let pat = env.seq_pat(entries, Some(1));
    let solver = env.solver();
    let outcome = solver.solve_case(&subject, &pat);
    // Literals in the span are forgotten, and the span is ordered.
    assert_eq!(
        named(&outcome.bindings),
        vec![
            ("a".to_owned(), env.int_ty()),
            ("rest".to_owned(), env.list_ty(env.str_ty())),
            ("b".to_owned(), env.bool_ty()),
        ]
    );
}

#[test]
fn test_star_on_list_binds_list() {
    let mut env = TestEnv::new();
    let subject = env.list_ty(env.int_ty());
    let entries = vec![env.capture("a"), env.capture("rest"), env.capture("b")];
    let pat = env.seq_pat(entries, Some(1));
    let solver = env.solver();
    let outcome = solver.solve_case(&subject, &pat);
    assert_eq!(outcome.narrowed, subject);
    assert_eq!(
        named(&outcome.bindings),
        vec![
            ("a".to_owned(), env.int_ty()),
            ("rest".to_owned(), env.list_ty(env.int_ty())),
            ("b".to_owned(), env.int_ty()),
        ]
    );
}

#[test]
fn test_star_absorbs_gradual_span() {
    let mut env = TestEnv::new();
    let subject = Type::tuple(vec![env.int_ty(), Type::any_explicit(), env.str_ty()]);
    let entries = vec![env.capture("a"), env.capture("rest")];
    let pat = env.seq_pat(entries, Some(1));
    let solver = env.solver();
    let outcome = solver.solve_case(&subject, &pat);
    assert_eq!(
        named(&outcome.bindings),
        vec![
            ("a".to_owned(), env.int_ty()),
            ("rest".to_owned(), env.list_ty(Type::any_explicit())),
        ]
    );
}

#[test]
fn test_mapping_value_binding() {
    let mut env = TestEnv::new();
    let point = env.typed_dict(
        "Point",
        vec![("x", env.int_ty(), true), ("label", env.str_ty(), false)],
    );
    let subject = Type::TypedDict(Box::new(point));
    let key = env.lit_pat(Lit::Str("label".into()).to_type());
    let value = env.capture("v");
    let pat = env.map_pat(vec![MappingEntry::Item(key, value)]);
    let solver = env.solver();
    let outcome = solver.solve_case(&subject, &pat);
    assert_eq!(named(&outcome.bindings), vec![("v".to_owned(), env.str_ty())]);
}

#[test]
fn test_mapping_expand_binding() {
    let mut env = TestEnv::new();
    let point = env.typed_dict("Point", vec![("x", env.int_ty(), true)]);
    let td_subject = Type::TypedDict(Box::new(point));
    let rest = env.ident("rest");
    let pat = env.map_pat(vec![MappingEntry::Expand(rest)]);
    let solver = env.solver();
    let outcome = solver.solve_case(&td_subject, &pat);
    assert_eq!(
        named(&outcome.bindings),
        vec![(
            "rest".to_owned(),
            env.stdlib()
                .dict(env.str_ty(), Type::any_implicit())
                .to_type()
        )]
    );

    let dict_subject = env.stdlib().dict(env.str_ty(), env.int_ty()).to_type();
    let rest = env.ident("rest");
    let pat = env.map_pat(vec![MappingEntry::Expand(rest)]);
    let solver = env.solver();
    let outcome = solver.solve_case(&dict_subject, &pat);
    assert_eq!(
        named(&outcome.bindings),
        vec![("rest".to_owned(), dict_subject)]
    );
}

#[test]
fn test_class_argument_binding() {
    let mut env = TestEnv::new();
    let a = env.simple_class(
        "A",
        Vec::new(),
        vec![
            ("__match_args__", TestEnv::match_args(&["v"])),
            ("v", env.int_ty()),
        ],
    );
    let cap = env.capture("x");
    let pat = env.class_pat(&a, vec![TestEnv::pos_arg(cap)]);
    let solver = env.solver();
    let outcome = solver.solve_case(&instance(&a), &pat);
    assert_eq!(named(&outcome.bindings), vec![("x".to_owned(), env.int_ty())]);
}

#[test]
fn test_wildcard_unknown_reporting() {
    let mut env = TestEnv::new();
    let wild = env.wildcard();
    let solver = env.solver();
    solver.bind_targets(&Type::any_implicit(), &wild);
    let kinds: Vec<ErrorKind> = env.errors().collect().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![ErrorKind::WildcardPatternTypeUnknown]);

    let mut env = TestEnv::new();
    let wild = env.wildcard();
    let solver = env.solver();
    solver.bind_targets(&env.list_ty(Type::any_implicit()), &wild);
    let kinds: Vec<ErrorKind> = env.errors().collect().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![ErrorKind::WildcardPatternTypePartiallyUnknown]);

    let mut env = TestEnv::new();
    let wild = env.wildcard();
    let solver = env.solver();
    solver.bind_targets(&env.int_ty(), &wild);
    assert!(env.errors().is_empty());
}

#[test]
fn test_unreachable_pattern_produces_no_bindings() {
    let mut env = TestEnv::new();
    let pat = env.capture("x");
    env.mark_unreachable(&pat);
    let solver = env.solver();
    let bindings = solver.bind_targets(&env.int_ty(), &pat);
    assert!(bindings.is_empty());
}

#[test]
fn test_never_matching_or_branch_is_reported() {
    let mut env = TestEnv::new();
    let impossible = env.lit_pat(Lit::Str("x".into()).to_type());
    let fallback = env.capture("y");
    let pat = env.or_pat(vec![impossible, fallback], None);
    let solver = env.solver();
    let outcome = solver.solve_case(&env.int_ty(), &pat);
    assert_eq!(outcome.narrowed, env.int_ty());
    assert_eq!(named(&outcome.bindings), vec![("y".to_owned(), env.int_ty())]);
    let kinds: Vec<ErrorKind> = env.errors().collect().iter().map(|e| e.kind()).collect();
    assert_eq!(kinds, vec![ErrorKind::PatternNeverMatches]);
}
