/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use itertools::izip;
use itertools::EitherOrBoth;
use itertools::Itertools;
use starlark_map::small_map::SmallMap;

use crate::narrow::Resolver;
use crate::solver::type_order::TypeOrder;
use crate::types::callable::Param;
use crate::types::callable::Params;
use crate::types::callable::Required;
use crate::types::quantified::QuantifiedKind;
use crate::types::simplify::unions;
use crate::types::class::TArgs;
use crate::types::tuple::Tuple;
use crate::types::type_var::Restriction;
use crate::types::type_var::Variance;
use crate::types::types::TParams;
use crate::types::types::Type;

/// A number chosen such that all practical subset checks are shallower than
/// this, but a cyclic check cannot run away.
const INITIAL_GAS: usize = 25;

/// The assignability oracle: is `got` usable where `want` is expected?
///
/// The directional conventions are those of a subset check: `got <: want`.
/// Gradual types are compatible in both directions, `Never` is the bottom,
/// a union on the left must hold for every member and on the right for at
/// least one, and tuple checks unify lengths entry-wise.
pub struct Subset<'a, Ans: Resolver> {
    pub type_order: TypeOrder<'a, Ans>,
    gas: usize,
}

impl<'a, Ans: Resolver> Subset<'a, Ans> {
    pub fn new(type_order: TypeOrder<'a, Ans>) -> Self {
        Self {
            type_order,
            gas: INITIAL_GAS,
        }
    }

    pub fn is_equal(&mut self, got: &Type, want: &Type) -> bool {
        self.is_subset_eq(got, want) && self.is_subset_eq(want, got)
    }

    pub fn is_subset_eq(&mut self, got: &Type, want: &Type) -> bool {
        if self.gas == 0 {
            // We really have no idea. Just give up for now.
            return false;
        }
        self.gas -= 1;
        let res = self.is_subset_eq_impl(got, want);
        self.gas += 1;
        res
    }

    fn is_subset_eq_impl(&mut self, got: &Type, want: &Type) -> bool {
        match (got, want) {
            _ if got == want => true,
            (Type::Any(_), _) | (_, Type::Any(_)) => true,
            (Type::Never(_), _) => true,
            (_, Type::Never(_)) => false,
            (Type::TypeAlias(ta), _) => self.is_subset_eq(&ta.as_value(), want),
            (_, Type::TypeAlias(ta)) => self.is_subset_eq(got, &ta.as_value()),
            (_, Type::ClassType(want_ct))
                if want_ct == self.type_order.stdlib().object_class_type() =>
            {
                true // everything is an instance of `object`
            }
            (Type::Union(ls), u) => ls.iter().all(|l| self.is_subset_eq(l, u)),
            (l, Type::Union(us)) => us.iter().any(|u| self.is_subset_eq(l, u)),
            (l, Type::Overload(us)) => us.iter().all(|u| self.is_subset_eq(l, u)),
            (Type::Overload(ls), u) => ls.iter().any(|l| self.is_subset_eq(l, u)),
            (Type::TypeVar(tv), u) => match tv.restriction() {
                Restriction::Bound(bound) => self.is_subset_eq(bound, u),
                Restriction::Constraints(constraints) => {
                    constraints.iter().all(|c| self.is_subset_eq(c, u))
                }
                Restriction::Unrestricted => false,
            },
            (Type::TypedDict(got_td), Type::TypedDict(want_td)) => {
                // For each key in `want`, `got` has the corresponding key
                // and the corresponding value type in `got` is consistent with the value type in `want`.
                // For each required key in `got`, the corresponding key is required in `want`,
                // and vice versa for non-required keys.
                want_td.fields().iter().all(|(k, want_v)| {
                    got_td
                        .fields()
                        .get(k)
                        .is_some_and(|got_v| self.is_subset_eq(&got_v.ty, &want_v.ty))
                }) && got_td.fields().iter().all(|(k, got_v)| {
                    want_td
                        .fields()
                        .get(k)
                        .is_none_or(|want_v| got_v.required == want_v.required)
                })
            }
            (Type::TypedDict(_), _) => {
                let stdlib = self.type_order.stdlib();
                let as_mapping = stdlib
                    .mapping(
                        stdlib.str().clone().to_type(),
                        stdlib.object_class_type().clone().to_type(),
                    )
                    .to_type();
                self.is_subset_eq(&as_mapping, want)
            }
            (Type::ClassType(got_ct), Type::ClassType(want_ct))
                if want_ct == self.type_order.stdlib().float()
                    && got_ct == self.type_order.stdlib().int() =>
            {
                true
            }
            (Type::ClassType(got_ct), Type::ClassType(want_ct))
                if want_ct == self.type_order.stdlib().complex()
                    && (got_ct == self.type_order.stdlib().int()
                        || got_ct == self.type_order.stdlib().float()) =>
            {
                true
            }
            (Type::ClassType(got_ct), Type::ClassType(want_ct)) => {
                // A final class admits no proper subclasses, so only its own
                // instances are assignable to it.
                if self.type_order.is_final(want_ct.class_object())
                    && got_ct.class_object() != want_ct.class_object()
                {
                    return false;
                }
                match self
                    .type_order
                    .as_superclass(got_ct, want_ct.class_object())
                {
                    Some(upcast) => {
                        self.check_targs(upcast.targs(), want_ct.targs(), want_ct.tparams())
                    }
                    None => false,
                }
            }
            (Type::ClassType(got_ct), Type::Tuple(_))
                if got_ct.class_object() == self.type_order.stdlib().tuple_class_object() =>
            {
                let elements = got_ct.targs().as_slice().to_vec();
                self.is_subset_eq(
                    &Type::Tuple(Tuple::unbounded(unions(elements))),
                    want,
                )
            }
            (Type::Tuple(got_tuple), Type::Tuple(want_tuple)) => {
                self.is_subset_tuple(got_tuple, want_tuple)
            }
            (Type::Tuple(got_tuple), _) => {
                let element = match got_tuple {
                    Tuple::Concrete(elts) => unions(elts.clone()),
                    Tuple::Unbounded(elt) => (**elt).clone(),
                    Tuple::Unpacked(box_tup) => {
                        let (prefix, middle, suffix) = &**box_tup;
                        let mut elts = prefix.clone();
                        elts.push(unbounded_element(middle));
                        elts.extend(suffix.iter().cloned());
                        unions(elts)
                    }
                };
                let as_class = self.type_order.stdlib().tuple(element).to_type();
                self.is_subset_eq(&as_class, want)
            }
            (Type::Literal(lit), Type::ClassType(_)) => {
                let general = lit
                    .general_class_type(self.type_order.stdlib())
                    .clone()
                    .to_type();
                self.is_subset_eq(&general, want)
            }
            (Type::ClassDef(got_cls), Type::ClassDef(want_cls)) => {
                self.type_order.has_superclass(got_cls, want_cls)
            }
            (Type::ClassDef(got_cls), Type::Type(want_inner)) => {
                let promoted = self.type_order.promote_silently(got_cls);
                self.is_subset_eq(&promoted, want_inner)
            }
            (Type::Type(got_inner), Type::ClassDef(want_cls)) => match &**got_inner {
                Type::ClassType(got_ct) => self
                    .type_order
                    .has_superclass(got_ct.class_object(), want_cls),
                Type::Any(_) => true,
                _ => false,
            },
            (Type::ClassDef(got_cls), Type::ClassType(want_ct)) => {
                self.type_order.has_metaclass(got_cls, want_ct)
            }
            (Type::Type(got_inner), Type::ClassType(want_ct)) => match &**got_inner {
                Type::ClassType(got_ct) => self
                    .type_order
                    .has_metaclass(got_ct.class_object(), want_ct),
                _ => false,
            },
            (Type::Type(got_inner), Type::Type(want_inner)) => {
                self.is_subset_eq(got_inner, want_inner)
            }
            (Type::Type(_), _) => {
                let as_class = self.type_order.stdlib().builtins_type().clone().to_type();
                self.is_subset_eq(&as_class, want)
            }
            (Type::Callable(got_callable), Type::Callable(want_callable)) => {
                self.is_subset_eq(&got_callable.ret, &want_callable.ret)
                    && match (&got_callable.params, &want_callable.params) {
                        (Params::Ellipsis, _) | (_, Params::Ellipsis) => true,
                        (Params::List(got_params), Params::List(want_params)) => {
                            self.is_subset_param_list(got_params.items(), want_params.items())
                        }
                    }
            }
            (Type::None, _) => {
                let as_class = self.type_order.stdlib().none_type().clone().to_type();
                self.is_subset_eq(&as_class, want)
            }
            (_, Type::None) => {
                let as_class = self.type_order.stdlib().none_type().clone().to_type();
                self.is_subset_eq(got, &as_class)
            }
            _ => false,
        }
    }

    pub fn is_subset_tuple(&mut self, got: &Tuple, want: &Tuple) -> bool {
        match (got, want) {
            (Tuple::Concrete(lelts), Tuple::Concrete(uelts)) => {
                lelts.len() == uelts.len()
                    && lelts
                        .iter()
                        .zip(uelts)
                        .all(|(l, u)| self.is_subset_eq(l, u))
            }
            (Tuple::Unbounded(l), _) if l.is_gradual() => true,
            (_, Tuple::Unbounded(u)) if u.is_gradual() => true,
            (Tuple::Concrete(lelts), Tuple::Unbounded(u)) => {
                lelts.iter().all(|l| self.is_subset_eq(l, u))
            }
            // An unbounded element matches any count of destination entries
            // of a compatible element type.
            (Tuple::Unbounded(l), Tuple::Concrete(uelts)) => {
                uelts.iter().all(|u| self.is_subset_eq(l, u))
            }
            (Tuple::Unbounded(l), Tuple::Unbounded(u)) => self.is_subset_eq(l, u),
            (Tuple::Concrete(lelts), Tuple::Unpacked(box_tup)) => {
                let (u_prefix, u_middle, u_suffix) = &**box_tup;
                if lelts.len() < u_prefix.len() + u_suffix.len() {
                    false
                } else {
                    let mut l_middle = Vec::new();
                    lelts.iter().enumerate().all(|(idx, l)| {
                        if idx < u_prefix.len() {
                            self.is_subset_eq(l, &u_prefix[idx])
                        } else if idx >= lelts.len() - u_suffix.len() {
                            self.is_subset_eq(l, &u_suffix[idx + u_suffix.len() - lelts.len()])
                        } else {
                            l_middle.push(l.clone());
                            true
                        }
                    }) && self.is_subset_eq(&Type::Tuple(Tuple::Concrete(l_middle)), u_middle)
                }
            }
            (Tuple::Unbounded(_), Tuple::Unpacked(box_tup)) => {
                let (u_prefix, u_middle, u_suffix) = &**box_tup;
                u_prefix.is_empty()
                    && u_suffix.is_empty()
                    && self.is_subset_eq(&Type::Tuple(got.clone()), u_middle)
            }
            (Tuple::Unpacked(box_tup), Tuple::Unbounded(u)) => {
                let (l_prefix, l_middle, l_suffix) = &**box_tup;
                l_prefix.iter().all(|l| self.is_subset_eq(l, u))
                    && l_suffix.iter().all(|l| self.is_subset_eq(l, u))
                    && self.is_subset_eq(l_middle, &Type::Tuple(want.clone()))
            }
            (Tuple::Unpacked(box_tup), Tuple::Concrete(uelts)) => {
                let (l_prefix, l_middle, l_suffix) = &**box_tup;
                if uelts.len() < l_prefix.len() + l_suffix.len() {
                    false
                } else {
                    let mut u_middle = Vec::new();
                    uelts.iter().enumerate().all(|(idx, u)| {
                        if idx < l_prefix.len() {
                            self.is_subset_eq(&l_prefix[idx], u)
                        } else if idx >= uelts.len() - l_suffix.len() {
                            self.is_subset_eq(&l_suffix[idx + l_suffix.len() - uelts.len()], u)
                        } else {
                            u_middle.push(u.clone());
                            true
                        }
                    }) && self.is_subset_eq(l_middle, &Type::Tuple(Tuple::Concrete(u_middle)))
                }
            }
            (Tuple::Unpacked(l_tup), Tuple::Unpacked(u_tup)) => {
                let (l_prefix, l_middle, l_suffix) = &**l_tup;
                let (u_prefix, u_middle, u_suffix) = &**u_tup;
                // Any prefix entries beyond the shorter prefix (and likewise
                // for suffixes) get absorbed into the other side's middle.
                let mut l_before = Vec::new();
                let mut l_after = Vec::new();
                let mut u_before = Vec::new();
                let mut u_after = Vec::new();
                if !(l_prefix
                    .iter()
                    .zip_longest(u_prefix.iter())
                    .all(|pair| match pair {
                        EitherOrBoth::Both(l, u) => self.is_subset_eq(l, u),
                        EitherOrBoth::Left(l) => {
                            l_before.push(l.clone());
                            true
                        }
                        EitherOrBoth::Right(u) => {
                            u_before.push(u.clone());
                            true
                        }
                    })
                    && l_suffix
                        .iter()
                        .rev()
                        .zip_longest(u_suffix.iter().rev())
                        .all(|pair| match pair {
                            EitherOrBoth::Both(l, u) => self.is_subset_eq(l, u),
                            EitherOrBoth::Left(l) => {
                                l_after.push(l.clone());
                                true
                            }
                            EitherOrBoth::Right(u) => {
                                u_after.push(u.clone());
                                true
                            }
                        }))
                {
                    return false;
                }
                l_after.reverse();
                u_after.reverse();
                self.is_subset_eq(
                    &Type::Tuple(Tuple::unpacked(l_before, l_middle.clone(), l_after)),
                    u_middle,
                ) && self.is_subset_eq(
                    l_middle,
                    &Type::Tuple(Tuple::unpacked(u_before, u_middle.clone(), u_after)),
                )
            }
        }
    }

    /// Can a function with l_args be called as a function with u_args?
    fn is_subset_param_list(&mut self, l_args: &[Param], u_args: &[Param]) -> bool {
        let mut l_args_iter = l_args.iter();
        let mut u_args_iter = u_args.iter();
        let mut l_arg = l_args_iter.next();
        let mut u_arg = u_args_iter.next();
        // Handle positional args
        loop {
            match (l_arg, u_arg) {
                (None, None) => return true,
                (
                    Some(Param::PosOnly(l, l_req) | Param::Pos(_, l, l_req)),
                    Some(Param::PosOnly(u, u_req)),
                ) if *u_req == Required::Required || *l_req == Required::Optional => {
                    if self.is_subset_eq(u, l) {
                        l_arg = l_args_iter.next();
                        u_arg = u_args_iter.next();
                    } else {
                        return false;
                    }
                }
                (Some(Param::Pos(l_name, l, l_req)), Some(Param::Pos(u_name, u, u_req)))
                    if l_name == u_name
                        && (*u_req == Required::Required || *l_req == Required::Optional) =>
                {
                    if self.is_subset_eq(u, l) {
                        l_arg = l_args_iter.next();
                        u_arg = u_args_iter.next();
                    } else {
                        return false;
                    }
                }
                (
                    Some(
                        Param::PosOnly(_, Required::Optional)
                        | Param::Pos(_, _, Required::Optional)
                        | Param::KwOnly(_, _, Required::Optional)
                        | Param::VarArg(_)
                        | Param::Kwargs(_),
                    ),
                    None,
                ) => return true,
                (Some(Param::VarArg(l)), Some(Param::PosOnly(u, Required::Required))) => {
                    if self.is_subset_eq(u, l) {
                        u_arg = u_args_iter.next();
                    } else {
                        return false;
                    }
                }
                (Some(Param::VarArg(l)), Some(Param::VarArg(u))) => {
                    if self.is_subset_eq(u, l) {
                        l_arg = l_args_iter.next();
                        u_arg = u_args_iter.next();
                    } else {
                        return false;
                    }
                }
                (Some(_), Some(Param::KwOnly(_, _, _) | Param::Kwargs(_))) => {
                    break;
                }
                _ => return false,
            }
        }
        // Handle keyword-only args
        let mut l_keywords = SmallMap::new();
        let mut l_kwargs = None;
        for arg in Option::into_iter(l_arg).chain(l_args_iter) {
            match arg {
                Param::KwOnly(name, ty, required) | Param::Pos(name, ty, required) => {
                    l_keywords.insert(name.clone(), (ty.clone(), *required));
                }
                Param::Kwargs(ty) => l_kwargs = Some(ty.clone()),
                _ => (),
            }
        }
        let mut u_kwargs = None;
        let mut u_keywords = Vec::new();
        for arg in Option::into_iter(u_arg).chain(u_args_iter) {
            match arg {
                Param::KwOnly(name, ty, required) => {
                    u_keywords.push((name.clone(), ty.clone(), *required));
                }
                Param::Kwargs(ty) => u_kwargs = Some(ty.clone()),
                _ => (),
            }
        }
        if let (Some(l), Some(u)) = (&l_kwargs, &u_kwargs) {
            if !self.is_subset_eq(u, l) {
                return false;
            }
        } else if l_kwargs.is_none() && u_kwargs.is_some() {
            return false;
        }
        for (name, u_ty, u_req) in u_keywords {
            if let Some((l_ty, l_req)) = l_keywords.shift_remove(&name) {
                if !(u_req == Required::Required || l_req == Required::Optional)
                    || !self.is_subset_eq(&u_ty, &l_ty)
                {
                    return false;
                }
            } else if let Some(l_ty) = &l_kwargs {
                if !self.is_subset_eq(&u_ty, l_ty) {
                    return false;
                }
            } else {
                return false;
            }
        }
        for (_, (_, l_req)) in l_keywords.iter() {
            if *l_req == Required::Required {
                return false;
            }
        }
        true
    }

    fn check_targs(&mut self, got: &TArgs, want: &TArgs, params: &TParams) -> bool {
        let got = got.as_slice();
        let want = want.as_slice();
        if got.len() != want.len() || want.len() != params.len() {
            return false;
        }
        for (got_arg, want_arg, param) in izip!(got, want, params.iter()) {
            let result = if param.quantified.kind() == QuantifiedKind::TypeVarTuple {
                self.is_equal(got_arg, want_arg)
            } else {
                match param.variance {
                    Variance::Covariant => self.is_subset_eq(got_arg, want_arg),
                    Variance::Contravariant => self.is_subset_eq(want_arg, got_arg),
                    Variance::Invariant => self.is_equal(got_arg, want_arg),
                }
            };
            if !result {
                return false;
            }
        }
        true
    }
}

/// The single element type standing for an unbounded span, e.g. the `str`
/// in `*tuple[str, ...]`.
pub fn unbounded_element(middle: &Type) -> Type {
    match middle {
        Type::Tuple(Tuple::Unbounded(elt)) => (**elt).clone(),
        Type::Tuple(Tuple::Concrete(elts)) => unions(elts.clone()),
        Type::Any(style) => Type::Any(*style),
        _ => Type::any_implicit(),
    }
}
