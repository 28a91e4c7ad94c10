/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use dupe::Dupe;
use ruff_python_ast::name::Name;

use crate::types::types::Type;
use crate::util::display::commas_iter;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Callable {
    pub params: Params,
    pub ret: Type,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Params {
    List(ParamList),
    /// A callable that accepts any arguments, e.g. `Callable[..., int]`.
    Ellipsis,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ParamList(Vec<Param>);

impl ParamList {
    pub fn new(xs: Vec<Param>) -> Self {
        Self(xs)
    }

    /// Create a new ParamList from a list of types, as required position-only parameters.
    pub fn new_types(xs: &[Type]) -> Self {
        Self(
            xs.iter()
                .map(|t| Param::PosOnly(t.clone(), Required::Required))
                .collect(),
        )
    }

    pub fn items(&self) -> &[Param] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        self.0.iter().for_each(|x| x.visit(f))
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        self.0.iter_mut().for_each(|x| x.visit_mut(f))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Param {
    PosOnly(Type, Required),
    Pos(Name, Type, Required),
    VarArg(Type),
    KwOnly(Name, Type, Required),
    Kwargs(Type),
}

#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Required {
    Required,
    Optional,
}

impl Param {
    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        match self {
            Param::PosOnly(ty, _)
            | Param::Pos(_, ty, _)
            | Param::VarArg(ty)
            | Param::KwOnly(_, ty, _)
            | Param::Kwargs(ty) => f(ty),
        }
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        match self {
            Param::PosOnly(ty, _)
            | Param::Pos(_, ty, _)
            | Param::VarArg(ty)
            | Param::KwOnly(_, ty, _)
            | Param::Kwargs(ty) => f(ty),
        }
    }

    pub fn is_required(&self) -> bool {
        match self {
            Param::PosOnly(_, Required::Required)
            | Param::Pos(_, _, Required::Required)
            | Param::KwOnly(_, _, Required::Required) => true,
            _ => false,
        }
    }
}

impl Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::PosOnly(ty, _) => write!(f, "{ty}"),
            Param::Pos(name, ty, _) => write!(f, "{name}: {ty}"),
            Param::VarArg(ty) => write!(f, "*{ty}"),
            Param::KwOnly(name, ty, _) => write!(f, "{name}: {ty}"),
            Param::Kwargs(ty) => write!(f, "**{ty}"),
        }
    }
}

impl Callable {
    pub fn list(params: ParamList, ret: Type) -> Self {
        Self {
            params: Params::List(params),
            ret,
        }
    }

    pub fn ellipsis(ret: Type) -> Self {
        Self {
            params: Params::Ellipsis,
            ret,
        }
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        if let Params::List(params) = &self.params {
            params.visit(f);
        }
        f(&self.ret)
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        if let Params::List(params) = &mut self.params {
            params.visit_mut(f);
        }
        f(&mut self.ret)
    }
}

impl Display for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.params {
            Params::List(params) => {
                write!(f, "({}) -> {}", commas_iter(|| params.items().iter()), self.ret)
            }
            Params::Ellipsis => write!(f, "(...) -> {}", self.ret),
        }
    }
}
