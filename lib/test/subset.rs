/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dupe::Dupe;

use crate::test::util::union;
use crate::test::util::TestEnv;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::literal::Lit;
use crate::types::tuple::Tuple;
use crate::types::types::Type;

fn assignable(env: &TestEnv, dest: &Type, src: &Type) -> bool {
    env.solver().is_assignable(dest, src)
}

#[test]
fn test_reflexive() {
    let env = TestEnv::new();
    let types = [
        env.int_ty(),
        env.str_ty(),
        Type::None,
        Type::never(),
        Type::tuple(vec![env.int_ty(), env.str_ty()]),
        union(vec![env.int_ty(), Type::None]),
    ];
    for t in &types {
        assert!(assignable(&env, t, t), "`{t}` should be assignable to itself");
    }
}

#[test]
fn test_gradual() {
    let env = TestEnv::new();
    assert!(assignable(&env, &Type::any_explicit(), &env.int_ty()));
    assert!(assignable(&env, &env.int_ty(), &Type::any_explicit()));
    assert!(assignable(&env, &Type::any_implicit(), &env.int_ty()));
    assert!(assignable(&env, &env.int_ty(), &Type::any_implicit()));
}

#[test]
fn test_never_is_bottom() {
    let env = TestEnv::new();
    assert!(assignable(&env, &env.int_ty(), &Type::never()));
    assert!(assignable(&env, &Type::never(), &Type::never()));
    assert!(!assignable(&env, &Type::never(), &env.int_ty()));
    assert!(!assignable(&env, &Type::never(), &Type::None));
}

#[test]
fn test_object_is_top() {
    let env = TestEnv::new();
    let object = env.stdlib().object_class_type().clone().to_type();
    assert!(assignable(&env, &object, &env.int_ty()));
    assert!(assignable(&env, &object, &Type::None));
    assert!(assignable(&env, &object, &Type::tuple(vec![env.int_ty()])));
}

#[test]
fn test_union_source_must_all_fit() {
    let env = TestEnv::new();
    let bool_or_int = union(vec![env.bool_ty(), env.int_ty()]);
    assert!(assignable(&env, &env.int_ty(), &bool_or_int));
    let int_or_str = union(vec![env.int_ty(), env.str_ty()]);
    assert!(!assignable(&env, &env.int_ty(), &int_or_str));
}

#[test]
fn test_union_dest_accepts_any_member() {
    let env = TestEnv::new();
    let int_or_str = union(vec![env.int_ty(), env.str_ty()]);
    assert!(assignable(&env, &int_or_str, &env.int_ty()));
    assert!(assignable(&env, &int_or_str, &Lit::Str("x".into()).to_type()));
    assert!(!assignable(&env, &int_or_str, &Type::None));
}

#[test]
fn test_final_class_is_nominally_exact() {
    let mut env = TestEnv::new();
    let base = env.simple_class("Base", Vec::new(), Vec::new());
    let base_ct = ClassType::new(base.dupe(), TArgs::default());
    let leaf = env.final_class("Leaf", vec![base_ct.clone()], Vec::new());
    let leaf_ty = ClassType::new(leaf.dupe(), TArgs::default()).to_type();
    let base_ty = base_ct.to_type();
    assert!(assignable(&env, &leaf_ty, &leaf_ty));
    assert!(assignable(&env, &base_ty, &leaf_ty));
    assert!(!assignable(&env, &leaf_ty, &base_ty));
}

#[test]
fn test_tuples() {
    let env = TestEnv::new();
    let int_str = Type::tuple(vec![env.int_ty(), env.str_ty()]);
    let bool_str = Type::tuple(vec![env.bool_ty(), env.str_ty()]);
    let int_int = Type::tuple(vec![env.int_ty(), env.int_ty()]);
    assert!(assignable(&env, &int_str, &bool_str));
    assert!(!assignable(&env, &bool_str, &int_str));
    assert!(!assignable(&env, &int_str, &int_int));
    assert!(!assignable(
        &env,
        &int_str,
        &Type::tuple(vec![env.int_ty()])
    ));

    let unbounded_int = Type::Tuple(Tuple::unbounded(env.int_ty()));
    assert!(assignable(&env, &unbounded_int, &int_int));
    // An unbounded source element matches any count of destination entries.
    assert!(assignable(&env, &int_int, &unbounded_int));
    assert!(!assignable(&env, &int_str, &unbounded_int));

    // A tuple is a sequence of its element union.
    let seq_int = env
        .class_type("collections.abc", "Sequence", vec![env.int_ty()])
        .to_type();
    assert!(assignable(&env, &seq_int, &int_int));
    assert!(!assignable(&env, &seq_int, &int_str));
}

#[test]
fn test_numeric_promotions() {
    let env = TestEnv::new();
    let float = env.stdlib().float().clone().to_type();
    let complex = env.stdlib().complex().clone().to_type();
    assert!(assignable(&env, &float, &env.int_ty()));
    assert!(assignable(&env, &complex, &env.int_ty()));
    assert!(assignable(&env, &complex, &float));
    assert!(!assignable(&env, &env.int_ty(), &float));
}

#[test]
fn test_typed_dict_subset() {
    let mut env = TestEnv::new();
    let p = Type::TypedDict(Box::new(env.typed_dict(
        "P",
        vec![("x", env.int_ty(), true)],
    )));
    let q = Type::TypedDict(Box::new(env.typed_dict(
        "Q",
        vec![("x", env.int_ty(), false)],
    )));
    let r = Type::TypedDict(Box::new(env.typed_dict("R", Vec::new())));
    assert!(assignable(&env, &p, &p));
    // Required versus NotRequired must agree.
    assert!(!assignable(&env, &p, &q));
    assert!(!assignable(&env, &q, &p));
    // Width subtyping: extra keys are fine on the source.
    assert!(assignable(&env, &r, &p));
    assert!(!assignable(&env, &p, &r));

    let object = env.stdlib().object_class_type().clone().to_type();
    let mapping = env.stdlib().mapping(env.str_ty(), object).to_type();
    assert!(assignable(&env, &mapping, &p));
}

#[test]
fn test_literals() {
    let env = TestEnv::new();
    assert!(assignable(&env, &env.int_ty(), &Lit::Int(1).to_type()));
    assert!(!assignable(&env, &env.str_ty(), &Lit::Int(1).to_type()));
    // bool literals are ints, transitively.
    assert!(assignable(&env, &env.int_ty(), &Lit::Bool(true).to_type()));
    assert!(!assignable(
        &env,
        &Lit::Int(1).to_type(),
        &Lit::Int(2).to_type()
    ));
}

#[test]
fn test_class_objects() {
    let mut env = TestEnv::new();
    let base = env.simple_class("Base", Vec::new(), Vec::new());
    let base_ct = ClassType::new(base.dupe(), TArgs::default());
    let leaf = env.simple_class("Leaf", vec![base_ct.clone()], Vec::new());

    let base_def = Type::ClassDef(base.dupe());
    let leaf_def = Type::ClassDef(leaf.dupe());
    assert!(assignable(&env, &base_def, &leaf_def));
    assert!(!assignable(&env, &leaf_def, &base_def));

    // A class object is an instance of `type`.
    let type_ty = env.stdlib().builtins_type().clone().to_type();
    assert!(assignable(&env, &type_ty, &base_def));

    // `type[Base]` accepts the class object and its instantiable form.
    let type_base = Type::type_form(base_ct.clone().to_type());
    assert!(assignable(&env, &type_base, &base_def));
    assert!(assignable(&env, &base_def, &type_base));
}
