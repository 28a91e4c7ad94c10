/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use dupe::Dupe;

use crate::types::class::Class;
use crate::types::class::ClassType;
use crate::types::class::TArgs;
use crate::types::types::Type;

/// Handles to the builtin classes the engine needs to reason about, fetched
/// once from the resolver. All lookups after construction are free.
#[derive(Debug)]
pub struct Stdlib {
    object: ClassType,
    builtins_type: ClassType,
    str_: ClassType,
    int: ClassType,
    bool_: ClassType,
    float: ClassType,
    complex: ClassType,
    bytes: ClassType,
    bytearray: ClassType,
    none_type: ClassType,
    tuple: Class,
    list: Class,
    set: Class,
    frozenset: Class,
    dict: Class,
    sequence: Class,
    mapping: Class,
}

impl Stdlib {
    /// `lookup` resolves `(module, class name)` to the class descriptor.
    /// Failing to resolve a builtin is unrecoverable, so the callback is
    /// infallible and the embedder decides how to guarantee that.
    pub fn new(mut lookup: impl FnMut(&str, &str) -> Class) -> Self {
        let mut builtin = |name: &str| lookup("builtins", name);
        let primitive = |cls: Class| ClassType::new(cls, TArgs::default());
        let object = primitive(builtin("object"));
        let builtins_type = primitive(builtin("type"));
        let str_ = primitive(builtin("str"));
        let int = primitive(builtin("int"));
        let bool_ = primitive(builtin("bool"));
        let float = primitive(builtin("float"));
        let complex = primitive(builtin("complex"));
        let bytes = primitive(builtin("bytes"));
        let bytearray = primitive(builtin("bytearray"));
        let none_type = primitive(builtin("NoneType"));
        let tuple = builtin("tuple");
        let list = builtin("list");
        let set = builtin("set");
        let frozenset = builtin("frozenset");
        let dict = builtin("dict");
        let sequence = lookup("collections.abc", "Sequence");
        let mapping = lookup("collections.abc", "Mapping");
        Self {
            object,
            builtins_type,
            str_,
            int,
            bool_,
            float,
            complex,
            bytes,
            bytearray,
            none_type,
            tuple,
            list,
            set,
            frozenset,
            dict,
            sequence,
            mapping,
        }
    }

    fn apply(cls: &Class, targs: Vec<Type>) -> ClassType {
        ClassType::new(cls.dupe(), TArgs::new(targs))
    }

    pub fn object_class_type(&self) -> &ClassType {
        &self.object
    }

    /// The `type` builtin, i.e. the default metaclass.
    pub fn builtins_type(&self) -> &ClassType {
        &self.builtins_type
    }

    pub fn str(&self) -> &ClassType {
        &self.str_
    }

    pub fn int(&self) -> &ClassType {
        &self.int
    }

    pub fn bool(&self) -> &ClassType {
        &self.bool_
    }

    pub fn float(&self) -> &ClassType {
        &self.float
    }

    pub fn complex(&self) -> &ClassType {
        &self.complex
    }

    pub fn bytes(&self) -> &ClassType {
        &self.bytes
    }

    pub fn bytearray(&self) -> &ClassType {
        &self.bytearray
    }

    pub fn none_type(&self) -> &ClassType {
        &self.none_type
    }

    pub fn tuple_class_object(&self) -> &Class {
        &self.tuple
    }

    pub fn tuple(&self, x: Type) -> ClassType {
        Self::apply(&self.tuple, vec![x])
    }

    pub fn list(&self, x: Type) -> ClassType {
        Self::apply(&self.list, vec![x])
    }

    pub fn set(&self, x: Type) -> ClassType {
        Self::apply(&self.set, vec![x])
    }

    pub fn frozenset(&self, x: Type) -> ClassType {
        Self::apply(&self.frozenset, vec![x])
    }

    pub fn dict(&self, key: Type, value: Type) -> ClassType {
        Self::apply(&self.dict, vec![key, value])
    }

    pub fn sequence_class_object(&self) -> &Class {
        &self.sequence
    }

    pub fn sequence(&self, x: Type) -> ClassType {
        Self::apply(&self.sequence, vec![x])
    }

    pub fn mapping_class_object(&self) -> &Class {
        &self.mapping
    }

    pub fn mapping(&self, key: Type, value: Type) -> ClassType {
        Self::apply(&self.mapping, vec![key, value])
    }
}
