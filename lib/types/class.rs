/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::cmp::Ord;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;
use std::hash::Hasher;
use std::path::Path;

use dupe::Dupe;
use ruff_python_ast::name::Name;
use ruff_python_ast::Identifier;
use ruff_text_size::TextRange;
use starlark_map::small_map::SmallMap;

use crate::module::module_info::ModuleInfo;
use crate::module::module_name::ModuleName;
use crate::types::qname::QName;
use crate::types::quantified::Quantified;
use crate::types::types::TParams;
use crate::types::types::Type;
use crate::util::arc_id::ArcId;
use crate::util::display::commas_iter;

/// The descriptor behind a nominal type, e.g. `str`. A cheap handle: the
/// descriptor itself is owned by whoever resolved the defining module, and
/// everything in the type universe refers to it by this handle.
///
/// The descriptor carries the parts that are fixed at definition time: the
/// qualified name, a stable definition index, the type parameters, and the
/// table of declared members. Derived facts (MRO, metaclass, flags) live in
/// `ClassMetadata`, fetched through the resolver.
#[derive(Debug, Clone, Dupe)]
pub struct Class(ArcId<ClassInner>);

impl Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class {}", self.name())?;
        if !self.tparams().is_empty() {
            write!(f, "[{}]", commas_iter(|| self.tparams().iter()))?;
        }
        write!(f, ": ...")
    }
}

/// The index of a class within its module, used as a stable reference to the
/// definition even across clones of the surrounding structures.
#[derive(Debug, Clone, Dupe, Copy, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct ClassIndex(pub u32);

struct ClassInner {
    index: ClassIndex,
    qname: QName,
    tparams: TParams,
    fields: SmallMap<Name, Type>,
}

impl Debug for ClassInner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInner")
            .field("index", &self.index)
            .field("qname", &self.qname)
            .field("tparams", &self.tparams)
            // We don't print `fields` because it's way too long.
            .finish_non_exhaustive()
    }
}

impl Class {
    pub fn new(
        index: ClassIndex,
        name: Identifier,
        module: ModuleInfo,
        tparams: TParams,
        fields: SmallMap<Name, Type>,
    ) -> Self {
        Self(ArcId::new(ClassInner {
            index,
            qname: QName::new(name, module),
            tparams,
            fields,
        }))
    }

    pub fn name(&self) -> &Name {
        self.0.qname.id()
    }

    pub fn qname(&self) -> &QName {
        &self.0.qname
    }

    pub fn range(&self) -> TextRange {
        self.0.qname.range()
    }

    pub fn index(&self) -> ClassIndex {
        self.0.index
    }

    pub fn module_name(&self) -> ModuleName {
        self.0.qname.module_name()
    }

    pub fn module_info(&self) -> &ModuleInfo {
        self.0.qname.module_info()
    }

    pub fn tparams(&self) -> &TParams {
        &self.0.tparams
    }

    pub fn contains(&self, name: &Name) -> bool {
        self.0.fields.contains_key(name)
    }

    /// The declared type of a member defined directly on this class,
    /// in terms of the class's own type parameters.
    pub fn get_field(&self, name: &Name) -> Option<&Type> {
        self.0.fields.get(name)
    }

    pub fn fields(&self) -> impl ExactSizeIterator<Item = &Name> {
        self.0.fields.keys()
    }

    pub fn tparams_as_targs(&self) -> TArgs {
        TArgs::new(
            self.tparams()
                .quantified()
                .map(|q| q.clone().to_type())
                .collect(),
        )
    }

    /// This class as a `ClassType` with its own type parameters as the
    /// arguments, i.e. the instance form seen from inside the class body.
    pub fn as_class_type(&self) -> ClassType {
        ClassType::new(self.dupe(), self.tparams_as_targs())
    }

    pub fn has_qname(&self, module: &str, name: &str) -> bool {
        self.0.qname.module_name().as_str() == module && self.0.qname.id() == name
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.has_qname("builtins", name)
    }

    /// Key to use for equality purposes. If we have the same module and index,
    /// we must point at the same class underneath.
    fn key_eq(&self) -> (ClassIndex, ModuleName, &Path) {
        (
            self.0.index,
            self.0.qname.module_name(),
            self.0.qname.module_info().path(),
        )
    }

    /// Key to use for comparison purposes. Mainly used to sort members of a
    /// union, where sorting by name gives a predictable answer.
    fn key_ord(&self) -> (&QName, ClassIndex) {
        (&self.0.qname, self.0.index)
    }
}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key_eq().hash(state)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.key_eq().eq(&other.key_eq())
    }
}

impl Eq for Class {}

impl Ord for Class {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key_ord().cmp(&other.key_ord())
    }
}

impl PartialOrd for Class {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The type arguments a generic class has been specialized with, in
/// declaration order of the matching type parameters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct TArgs(Box<[Type]>);

impl TArgs {
    pub fn new(targs: Vec<Type>) -> Self {
        Self(targs.into_boxed_slice())
    }

    pub fn as_slice(&self) -> &[Type] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Apply a substitution to type arguments.
    ///
    /// This is mainly useful to take ancestors coming from the MRO (which are
    /// always in terms of the current class's type parameters) and re-express
    /// them in terms of the current class specialized with type arguments.
    pub fn substitute(&self, substitution: &Substitution) -> Self {
        Self::new(
            self.0
                .iter()
                .map(|ty| substitution.substitute(ty.clone()))
                .collect(),
        )
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        self.0.iter().for_each(f)
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        self.0.iter_mut().for_each(f)
    }
}

pub struct Substitution(SmallMap<Quantified, Type>);

impl Substitution {
    pub fn substitute(&self, ty: Type) -> Type {
        ty.subst(&self.0)
    }

    /// Creates a Substitution from a class specialized with type arguments.
    /// Assumes that the number of args equals the number of type parameters on the class.
    pub fn new(cls: &Class, args: &TArgs) -> Self {
        let tparams = cls.tparams();
        Substitution(
            tparams
                .quantified()
                .cloned()
                .zip(args.as_slice().iter().cloned())
                .collect(),
        )
    }
}

/// A class specialized with type arguments: the type of an instance of the
/// class. Construction enforces that the argument count matches the class's
/// type parameters.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClassType(Class, TArgs);

impl Display for ClassType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())?;
        if !self.1.is_empty() {
            write!(f, "[{}]", commas_iter(|| self.1.as_slice().iter()))?;
        }
        Ok(())
    }
}

impl ClassType {
    /// Create a class type.
    /// The `targs` must match the `tparams`, if this fails we will panic.
    pub fn new(class: Class, targs: TArgs) -> Self {
        let tparams = class.tparams();
        if targs.as_slice().len() != tparams.len()
            && !tparams.quantified().any(|q| q.is_type_var_tuple())
        {
            // Invariant violation: we should always have valid type arguments when
            // constructing `ClassType`.
            panic!(
                "Encountered invalid type arguments in class `{}`, expected `{}` type arguments, got `{}`.",
                class.name(),
                tparams.len(),
                targs.as_slice().len(),
            )
        }
        Self(class, targs)
    }

    pub fn class_object(&self) -> &Class {
        &self.0
    }

    pub fn tparams(&self) -> &TParams {
        self.0.tparams()
    }

    pub fn targs(&self) -> &TArgs {
        &self.1
    }

    /// Rewrite type arguments of some class relative to another.
    ///
    /// This is used to propagate instantiation of base class type parameters when computing
    /// the MRO.
    pub fn substitute(&self, substitution: &Substitution) -> Self {
        Self(self.0.dupe(), self.1.substitute(substitution))
    }

    pub fn substitution(&self) -> Substitution {
        Substitution::new(self.class_object(), self.targs())
    }

    pub fn name(&self) -> &Name {
        self.0.name()
    }

    pub fn qname(&self) -> &QName {
        self.0.qname()
    }

    pub fn to_type(self) -> Type {
        Type::ClassType(self)
    }

    pub fn has_qname(&self, module: &str, name: &str) -> bool {
        self.0.has_qname(module, name)
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.0.is_builtin(name)
    }

    pub fn visit<'a>(&'a self, f: &mut dyn FnMut(&'a Type)) {
        self.1.visit(f)
    }

    pub fn visit_mut(&mut self, f: &mut dyn FnMut(&mut Type)) {
        self.1.visit_mut(f)
    }
}
