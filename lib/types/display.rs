/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::fmt;
use std::fmt::Display;

use crate::types::types::NeverStyle;
use crate::types::types::Type;
use crate::util::display::intersperse_iter;

impl Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Literal(lit) => write!(f, "Literal[{lit}]"),
            Type::ClassType(c) => write!(f, "{c}"),
            Type::TypedDict(td) => write!(f, "{td}"),
            Type::Tuple(t) => write!(f, "{t}"),
            Type::ClassDef(c) => write!(f, "type[{}]", c.name()),
            Type::Type(t) => write!(f, "type[{t}]"),
            Type::TypeAlias(ta) => write!(f, "{}", ta.name),
            Type::TypeVar(t) => write!(f, "{t}"),
            Type::TypeVarTuple(t) => write!(f, "{t}"),
            Type::ParamSpec(t) => write!(f, "{t}"),
            Type::Quantified(q) => write!(f, "{q}"),
            Type::Callable(c) => write!(f, "{c}"),
            Type::Overload(xs) => {
                write!(f, "Overload[{}]", intersperse_iter(|| xs.iter(), ", "))
            }
            Type::Union(xs) => write!(f, "{}", intersperse_iter(|| xs.iter(), " | ")),
            Type::None => write!(f, "None"),
            Type::Never(NeverStyle::Never) => write!(f, "Never"),
            Type::Never(NeverStyle::NoReturn) => write!(f, "NoReturn"),
            Type::Any(style) if style.is_unknown() => write!(f, "Unknown"),
            Type::Any(_) => write!(f, "Any"),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::types::literal::Lit;
    use crate::types::tuple::Tuple;
    use crate::types::types::Type;

    #[test]
    fn test_display_simple() {
        assert_eq!(Type::never().to_string(), "Never");
        assert_eq!(Type::any_explicit().to_string(), "Any");
        assert_eq!(Type::any_implicit().to_string(), "Unknown");
        assert_eq!(Type::None.to_string(), "None");
    }

    #[test]
    fn test_display_structured() {
        let lit = Lit::Str("x".into()).to_type();
        assert_eq!(lit.to_string(), "Literal['x']");
        let union = Type::Union(vec![Type::None, lit]);
        assert_eq!(union.to_string(), "None | Literal['x']");
        let tup = Type::Tuple(Tuple::unbounded(Type::None));
        assert_eq!(tup.to_string(), "tuple[None, ...]");
        assert_eq!(Type::tuple(Vec::new()).to_string(), "tuple[()]");
    }
}
