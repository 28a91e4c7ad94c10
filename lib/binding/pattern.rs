/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The pattern tree the narrowing engine consumes. Produced once from the
//! AST when bindings are built, and immutable afterwards.
//!
//! The split differs from the AST in one important way: a `MatchValue` is
//! either a `Literal` pattern (a literal expression, compared by identity
//! of the literal) or a `Value` pattern (a dotted name, compared via
//! `__eq__`), and the distinction is made here, once.

use ruff_python_ast::Expr;
use ruff_python_ast::Identifier;
use ruff_python_ast::Pattern as AstPattern;
use ruff_python_ast::Singleton;
use ruff_text_size::Ranged;
use ruff_text_size::TextRange;
use vec1::Vec1;

#[derive(Debug, Clone)]
pub enum Pattern {
    /// `case x:` or `case _:` - always matches, may bind a name.
    Capture(PatternCapture),
    /// `case P1 | P2:` or `case P as x:` - ordered alternatives with an
    /// optional binding for the whole match.
    As(PatternAs),
    /// `case 1:`, `case "s":`, `case None:` - a literal, matched by identity
    /// or equality of the literal value.
    Literal(PatternLiteral),
    /// `case color.RED:` - an arbitrary named value, matched via `__eq__`.
    Value(PatternValue),
    /// `case [a, *rest, b]:` - sequence destructuring.
    Sequence(PatternSequence),
    /// `case {"key": P, **rest}:` - mapping destructuring.
    Mapping(PatternMapping),
    /// `case Point(x=0):` - class destructuring.
    Class(PatternClass),
    /// Recovered from a syntax error; narrows nothing.
    Error(TextRange),
}

#[derive(Debug, Clone)]
pub struct PatternCapture {
    pub range: TextRange,
    /// `None` for the wildcard `_`.
    pub target: Option<Identifier>,
}

#[derive(Debug, Clone)]
pub struct PatternAs {
    pub range: TextRange,
    /// Alternatives are tried left to right, each against what the previous
    /// ones failed to match.
    pub patterns: Vec1<Pattern>,
    pub target: Option<Identifier>,
}

#[derive(Debug, Clone)]
pub enum LiteralValue {
    Expr(Box<Expr>),
    None,
    Bool(bool),
}

#[derive(Debug, Clone)]
pub struct PatternLiteral {
    pub range: TextRange,
    pub value: LiteralValue,
}

#[derive(Debug, Clone)]
pub struct PatternValue {
    pub range: TextRange,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct PatternSequence {
    pub range: TextRange,
    pub entries: Vec<Pattern>,
    /// Position of the star entry within `entries`, if there is one. The
    /// entry at that position is the capture the star binds.
    pub star_index: Option<usize>,
}

#[derive(Debug, Clone)]
pub enum MappingEntry {
    /// A key pattern (a literal or a value) and the pattern for its value.
    Item(Pattern, Pattern),
    /// `**rest` - binds the unmatched remainder, never narrows.
    Expand(Identifier),
}

#[derive(Debug, Clone)]
pub struct PatternMapping {
    pub range: TextRange,
    pub entries: Vec<MappingEntry>,
}

#[derive(Debug, Clone)]
pub struct PatternClassArg {
    /// `None` for positional arguments, which get their names from
    /// `__match_args__`.
    pub name: Option<Identifier>,
    pub pattern: Pattern,
}

#[derive(Debug, Clone)]
pub struct PatternClass {
    pub range: TextRange,
    pub cls: Box<Expr>,
    pub args: Vec<PatternClassArg>,
}

impl Ranged for Pattern {
    fn range(&self) -> TextRange {
        match self {
            Pattern::Capture(x) => x.range,
            Pattern::As(x) => x.range,
            Pattern::Literal(x) => x.range,
            Pattern::Value(x) => x.range,
            Pattern::Sequence(x) => x.range,
            Pattern::Mapping(x) => x.range,
            Pattern::Class(x) => x.range,
            Pattern::Error(range) => *range,
        }
    }
}

impl Pattern {
    /// A capture with no target, i.e. `_`.
    pub fn is_wildcard(&self) -> bool {
        matches!(
            self,
            Pattern::Capture(PatternCapture { target: None, .. })
        )
    }

    /// Will this pattern match any subject at all?
    pub fn is_irrefutable(&self) -> bool {
        match self {
            Pattern::Capture(_) => true,
            Pattern::As(x) => x.patterns.iter().any(|p| p.is_irrefutable()),
            _ => false,
        }
    }

    pub fn from_ast(x: &AstPattern) -> Pattern {
        match x {
            AstPattern::MatchAs(p) => match &p.pattern {
                None => Pattern::Capture(PatternCapture {
                    range: p.range,
                    target: p.name.clone(),
                }),
                Some(sub) => {
                    let patterns = match &**sub {
                        AstPattern::MatchOr(or) => {
                            or.patterns.iter().map(Pattern::from_ast).collect()
                        }
                        _ => vec![Pattern::from_ast(sub)],
                    };
                    match Vec1::try_from_vec(patterns) {
                        Ok(patterns) => Pattern::As(PatternAs {
                            range: p.range,
                            patterns,
                            target: p.name.clone(),
                        }),
                        Err(_) => Pattern::Error(p.range),
                    }
                }
            },
            AstPattern::MatchOr(p) => {
                let patterns: Vec<Pattern> = p.patterns.iter().map(Pattern::from_ast).collect();
                match Vec1::try_from_vec(patterns) {
                    Ok(patterns) => Pattern::As(PatternAs {
                        range: p.range,
                        patterns,
                        target: None,
                    }),
                    Err(_) => Pattern::Error(p.range),
                }
            }
            AstPattern::MatchValue(p) => Self::from_key_expr(&p.value, p.range),
            AstPattern::MatchSingleton(p) => Pattern::Literal(PatternLiteral {
                range: p.range,
                value: match p.value {
                    Singleton::None => LiteralValue::None,
                    Singleton::True => LiteralValue::Bool(true),
                    Singleton::False => LiteralValue::Bool(false),
                },
            }),
            AstPattern::MatchSequence(p) => {
                let mut star_index = None;
                let entries = p
                    .patterns
                    .iter()
                    .enumerate()
                    .map(|(i, entry)| match entry {
                        AstPattern::MatchStar(star) => {
                            star_index = Some(i);
                            Pattern::Capture(PatternCapture {
                                range: star.range,
                                target: star.name.clone(),
                            })
                        }
                        _ => Pattern::from_ast(entry),
                    })
                    .collect();
                Pattern::Sequence(PatternSequence {
                    range: p.range,
                    entries,
                    star_index,
                })
            }
            AstPattern::MatchMapping(p) => {
                let mut entries: Vec<MappingEntry> = p
                    .keys
                    .iter()
                    .zip(&p.patterns)
                    .map(|(key, value)| {
                        MappingEntry::Item(
                            Self::from_key_expr(key, key.range()),
                            Pattern::from_ast(value),
                        )
                    })
                    .collect();
                if let Some(rest) = &p.rest {
                    entries.push(MappingEntry::Expand(rest.clone()));
                }
                Pattern::Mapping(PatternMapping {
                    range: p.range,
                    entries,
                })
            }
            AstPattern::MatchClass(p) => {
                let mut args: Vec<PatternClassArg> = p
                    .arguments
                    .patterns
                    .iter()
                    .map(|pattern| PatternClassArg {
                        name: None,
                        pattern: Pattern::from_ast(pattern),
                    })
                    .collect();
                for keyword in &p.arguments.keywords {
                    args.push(PatternClassArg {
                        name: Some(keyword.attr.clone()),
                        pattern: Pattern::from_ast(&keyword.pattern),
                    });
                }
                Pattern::Class(PatternClass {
                    range: p.range,
                    cls: p.cls.clone(),
                    args,
                })
            }
            // A bare star pattern outside a sequence is a syntax error.
            AstPattern::MatchStar(p) => Pattern::Error(p.range),
        }
    }

    /// Classify an expression in pattern-key position: literal expressions
    /// become `Literal` patterns, dotted names become `Value` patterns.
    fn from_key_expr(e: &Expr, range: TextRange) -> Pattern {
        if is_literal_expr(e) {
            Pattern::Literal(PatternLiteral {
                range,
                value: LiteralValue::Expr(Box::new(e.clone())),
            })
        } else {
            Pattern::Value(PatternValue {
                range,
                value: Box::new(e.clone()),
            })
        }
    }
}

fn is_literal_expr(e: &Expr) -> bool {
    match e {
        Expr::NumberLiteral(_)
        | Expr::StringLiteral(_)
        | Expr::BytesLiteral(_)
        | Expr::BooleanLiteral(_)
        | Expr::NoneLiteral(_) => true,
        // Negative numbers and complex literals parse as operators.
        Expr::UnaryOp(x) => is_literal_expr(&x.operand),
        Expr::BinOp(x) => is_literal_expr(&x.left) && is_literal_expr(&x.right),
        _ => false,
    }
}
