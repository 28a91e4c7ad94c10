/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;
use std::iter;

use ruff_python_ast::name::Name;
use starlark_map::small_map::SmallMap;
use starlark_map::small_set::SmallSet;

use crate::types::class::ClassType;
use crate::types::stdlib::Stdlib;
use crate::types::typed_dict::TypedDictField;
use crate::util::display::commas_iter;

/// Facts about a class that are derived from its definition rather than
/// written in it: the linearized ancestry, the metaclass, and what kind of
/// class it is. Produced by the resolver during module evaluation and
/// read-only during narrowing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassMetadata {
    mro: Mro,
    metaclass: Option<ClassType>,
    is_final: bool,
    typed_dict_metadata: Option<TypedDictMetadata>,
    enum_metadata: Option<EnumMetadata>,
}

impl Display for ClassMetadata {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "ClassMetadata({})", self.mro)
    }
}

impl ClassMetadata {
    pub fn new(
        ancestors: Vec<ClassType>,
        metaclass: Option<ClassType>,
        is_final: bool,
        typed_dict_metadata: Option<TypedDictMetadata>,
        enum_metadata: Option<EnumMetadata>,
    ) -> ClassMetadata {
        ClassMetadata {
            mro: Mro::Resolved(ancestors),
            metaclass,
            is_final,
            typed_dict_metadata,
            enum_metadata,
        }
    }

    /// Metadata for a class caught in an inheritance cycle: no usable MRO.
    pub fn recursive() -> Self {
        ClassMetadata {
            mro: Mro::Cyclic,
            metaclass: None,
            is_final: false,
            typed_dict_metadata: None,
            enum_metadata: None,
        }
    }

    pub fn metaclass(&self) -> Option<&ClassType> {
        self.metaclass.as_ref()
    }

    pub fn is_final(&self) -> bool {
        self.is_final
    }

    pub fn is_typed_dict(&self) -> bool {
        self.typed_dict_metadata.is_some()
    }

    pub fn typed_dict_metadata(&self) -> Option<&TypedDictMetadata> {
        self.typed_dict_metadata.as_ref()
    }

    pub fn is_enum(&self) -> bool {
        self.enum_metadata.is_some()
    }

    pub fn enum_metadata(&self) -> Option<&EnumMetadata> {
        self.enum_metadata.as_ref()
    }

    pub fn ancestors<'a>(&'a self, stdlib: &'a Stdlib) -> impl Iterator<Item = &'a ClassType> {
        self.ancestors_no_object()
            .iter()
            .chain(iter::once(stdlib.object_class_type()))
    }

    /// The MRO doesn't track `object` directly for efficiency, since it always comes last, and
    /// some use cases (for example checking if the type is an enum) do not care about `object`.
    pub fn ancestors_no_object(&self) -> &[ClassType] {
        self.mro.ancestors_no_object()
    }
}

/// A class's ancestors, in method resolution order (MRO) and after dropping
/// cycles and nonlinearizable inheritance.
///
/// Each ancestor is represented as a pair of a class and the type arguments
/// for that class, relative to the body of the current class, so for example
/// in
/// ```python
/// class A[T]: pass
/// class B[S](A[list[S]]): pass
/// class C(B[int]): pass
/// ```
/// we would get `[B[int], A[list[int]]]`.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Mro {
    Resolved(Vec<ClassType>),
    Cyclic,
}

impl Display for Mro {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Mro::Resolved(xs) => {
                write!(f, "[{}]", commas_iter(|| xs.iter()))
            }
            Mro::Cyclic => write!(f, "Cyclic"),
        }
    }
}

impl Mro {
    /// The MRO doesn't track `object` directly for efficiency, since it always comes last, and
    /// some use cases (for example checking if the type is an enum) do not care about `object`.
    pub fn ancestors_no_object(&self) -> &[ClassType] {
        match self {
            Mro::Resolved(ancestors) => ancestors,
            Mro::Cyclic => &[],
        }
    }
}

/// The field table of a TypedDict class, in terms of the class's type
/// parameters. Field order is declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypedDictMetadata {
    pub fields: SmallMap<Name, TypedDictField>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMetadata {
    pub cls: ClassType,
    /// The names of the enum's members, in declaration order.
    pub members: SmallSet<Name>,
}
