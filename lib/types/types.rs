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
use starlark_map::small_map::SmallMap;
use static_assertions::assert_impl_all;
use vec1::Vec1;

use crate::types::callable::Callable;
use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::literal::Lit;
use crate::types::param_spec::ParamSpec;
use crate::types::quantified::Quantified;
use crate::types::stdlib::Stdlib;
use crate::types::tuple::Tuple;
use crate::types::type_var::TypeVar;
use crate::types::type_var::Variance;
use crate::types::type_var_tuple::TypeVarTuple;
use crate::types::typed_dict::TypedDict;

/// The flavor of a `Never`: written as `Never` or as `NoReturn`.
/// The two are interchangeable for checking purposes.
#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NeverStyle {
    Never,
    NoReturn,
}

/// Where a gradual type came from. An explicit `Any` is the user opting out;
/// the implicit and error forms are tracked as "unknown" and feed the
/// stricter wildcard diagnostics.
#[derive(Debug, Clone, Copy, Dupe, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AnyStyle {
    /// The user wrote `Any`.
    Explicit,
    /// A gradual type we inferred because information was missing.
    Implicit,
    /// A gradual type that stands in for something that failed to check.
    Error,
}

impl AnyStyle {
    pub fn is_unknown(self) -> bool {
        matches!(self, AnyStyle::Implicit | AnyStyle::Error)
    }

    /// Combine two gradual styles, keeping the most tracked one.
    pub fn join(self, other: AnyStyle) -> AnyStyle {
        match (self, other) {
            (AnyStyle::Error, _) | (_, AnyStyle::Error) => AnyStyle::Error,
            (AnyStyle::Implicit, _) | (_, AnyStyle::Implicit) => AnyStyle::Implicit,
            _ => AnyStyle::Explicit,
        }
    }

    pub fn to_type(self) -> Type {
        Type::Any(self)
    }
}

/// A type parameter of a generic class, with its variance and default.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TParam {
    pub quantified: Quantified,
    pub name: Name,
    pub variance: Variance,
    pub default: Option<Type>,
}

impl Display for TParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TParams(Vec<TParam>);

impl TParams {
    pub fn new(xs: Vec<TParam>) -> Self {
        Self(xs)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &TParam> {
        self.0.iter()
    }

    pub fn quantified(&self) -> impl ExactSizeIterator<Item = &Quantified> {
        self.0.iter().map(|x| &x.quantified)
    }
}

/// A name given to a type, possibly specialized with explicit arguments.
/// Kept around (rather than eagerly replaced by its value) so that uses
/// which require a proper class can tell they were given an alias.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeAlias {
    pub name: Name,
    ty: Box<Type>,
    /// Whether the alias was written with explicit type arguments applied.
    pub specialized: bool,
}

impl TypeAlias {
    pub fn new(name: Name, ty: Type, specialized: bool) -> Self {
        Self {
            name,
            ty: Box::new(ty),
            specialized,
        }
    }

    /// The type the alias stands for.
    pub fn as_value(&self) -> Type {
        (*self.ty).clone()
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        f(&self.ty)
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        f(&mut self.ty)
    }
}

/// The type universe. A sealed tagged sum: every operation dispatches on
/// the variant, and clone-with-override constructs a new variant sharing
/// the immutable pieces of the source.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    /// An instance carrying a literal value, e.g. `Literal[1]`.
    Literal(Lit),
    /// An instance of a class, e.g. `str`.
    ClassType(ClassType),
    /// An instance of a TypedDict, with its narrowable field map.
    TypedDict(Box<TypedDict>),
    /// A tuple instance, tracked per entry where the length is known.
    Tuple(Tuple),
    /// The class object itself, unspecialized, e.g. `str` used as a value.
    ClassDef(Class),
    /// The class object of the type within, e.g. `type[list[int]]`.
    Type(Box<Type>),
    TypeAlias(Box<TypeAlias>),
    TypeVar(TypeVar),
    TypeVarTuple(TypeVarTuple),
    ParamSpec(ParamSpec),
    Quantified(Quantified),
    Callable(Box<Callable>),
    /// An ordered set of signatures; calls pick the first that fits.
    Overload(Vec1<Type>),
    /// Flattened, deduplicated, never a singleton. Iteration order is
    /// insertion order, and narrowing outcomes depend on it.
    Union(Vec<Type>),
    None,
    Never(NeverStyle),
    Any(AnyStyle),
}

assert_impl_all!(Type: Send, Sync);

impl Type {
    pub fn never() -> Self {
        Type::Never(NeverStyle::Never)
    }

    pub fn any_explicit() -> Self {
        Type::Any(AnyStyle::Explicit)
    }

    pub fn any_implicit() -> Self {
        Type::Any(AnyStyle::Implicit)
    }

    pub fn any_error() -> Self {
        Type::Any(AnyStyle::Error)
    }

    pub fn tuple(elts: Vec<Type>) -> Self {
        Type::Tuple(Tuple::Concrete(elts))
    }

    pub fn any_tuple() -> Self {
        Type::Tuple(Tuple::unbounded(Type::any_implicit()))
    }

    /// `type[t]`: the instantiable form of an instance type.
    pub fn type_form(t: Type) -> Self {
        Type::Type(Box::new(t))
    }

    pub fn callable(c: Callable) -> Self {
        Type::Callable(Box::new(c))
    }

    pub fn is_never(&self) -> bool {
        matches!(self, Type::Never(_))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Type::None)
    }

    /// Any gradual type, tracked or not.
    pub fn is_gradual(&self) -> bool {
        matches!(self, Type::Any(_))
    }

    /// A gradual type that triggers the stricter diagnostics.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Type::Any(style) if style.is_unknown())
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Type::Union(_))
    }

    /// Does an unknown occur anywhere inside this type?
    pub fn contains_unknown(&self) -> bool {
        fn check(t: &Type, found: &mut bool) {
            if t.is_unknown() {
                *found = true;
            } else {
                t.recurse(&mut |x| check(x, found));
            }
        }
        let mut found = false;
        check(self, &mut found);
        found
    }

    /// Visit the types one level inside this one.
    pub fn recurse<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        match self {
            Type::Literal(lit) => lit.visit(f),
            Type::ClassType(c) => c.visit(f),
            Type::TypedDict(td) => td.visit(f),
            Type::Tuple(t) => t.visit(f),
            Type::Type(t) => f(t),
            Type::TypeAlias(ta) => ta.visit(f),
            Type::Callable(c) => c.visit(f),
            Type::Overload(xs) => xs.iter().for_each(f),
            Type::Union(xs) => xs.iter().for_each(f),
            // The declarations are shared; we don't look inside them.
            Type::ClassDef(_)
            | Type::TypeVar(_)
            | Type::TypeVarTuple(_)
            | Type::ParamSpec(_)
            | Type::Quantified(_)
            | Type::None
            | Type::Never(_)
            | Type::Any(_) => {}
        }
    }

    pub fn recurse_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        match self {
            Type::Literal(lit) => lit.visit_mut(f),
            Type::ClassType(c) => c.visit_mut(f),
            Type::TypedDict(td) => td.visit_mut(f),
            Type::Tuple(t) => t.visit_mut(f),
            Type::Type(t) => f(t),
            Type::TypeAlias(ta) => ta.visit_mut(f),
            Type::Callable(c) => c.visit_mut(f),
            Type::Overload(xs) => xs.iter_mut().for_each(f),
            Type::Union(xs) => xs.iter_mut().for_each(f),
            Type::ClassDef(_)
            | Type::TypeVar(_)
            | Type::TypeVarTuple(_)
            | Type::ParamSpec(_)
            | Type::Quantified(_)
            | Type::None
            | Type::Never(_)
            | Type::Any(_) => {}
        }
    }

    /// Apply `f` to every type inside this one, bottom up.
    pub fn transform_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        self.recurse_mut(&mut |x| x.transform_mut(f));
        f(self)
    }

    /// Replace in-scope type parameters by the given types.
    pub fn subst(self, mp: &SmallMap<Quantified, Type>) -> Type {
        let mut t = self;
        t.transform_mut(&mut |x| {
            if let Type::Quantified(q) = x {
                if let Some(w) = mp.get(q) {
                    *x = w.clone();
                }
            }
        });
        t
    }

    /// Forget literal values, e.g. `Literal[1]` becomes `int`.
    pub fn promote_literals(self, stdlib: &Stdlib) -> Type {
        let mut t = self;
        t.transform_mut(&mut |x| {
            if let Type::Literal(lit) = x {
                let promoted = lit.general_class_type(stdlib).clone().to_type();
                *x = promoted;
            }
        });
        t
    }

    /// Structural equality that does not care about the order of union
    /// members. Tuple entries and type arguments stay ordered.
    pub fn same(&self, other: &Type) -> bool {
        if self == other {
            return true;
        }
        fn canonical(t: &Type) -> Type {
            let mut t = t.clone();
            t.transform_mut(&mut |x| {
                if let Type::Union(xs) = x {
                    xs.sort();
                    xs.dedup();
                }
            });
            t
        }
        canonical(self) == canonical(other)
    }
}
