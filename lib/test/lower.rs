/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use ruff_python_ast::name::Name;
use ruff_python_ast::Expr;
use ruff_python_ast::ExprAttribute;
use ruff_python_ast::ExprBooleanLiteral;
use ruff_python_ast::ExprContext;
use ruff_python_ast::ExprName;
use ruff_python_ast::Identifier;
use ruff_python_ast::Pattern as AstPattern;
use ruff_python_ast::PatternMatchAs;
use ruff_python_ast::PatternMatchOr;
use ruff_python_ast::PatternMatchSequence;
use ruff_python_ast::PatternMatchSingleton;
use ruff_python_ast::PatternMatchStar;
use ruff_python_ast::PatternMatchValue;
use ruff_python_ast::Singleton;
use ruff_text_size::TextRange;

use crate::binding::pattern::LiteralValue;
use crate::binding::pattern::Pattern;
use crate::binding::pattern::PatternCapture;

fn name_expr(name: &str) -> Expr {
    Expr::Name(ExprName {
        range: TextRange::default(),
        id: Name::new(name),
        ctx: ExprContext::Load,
    })
}

fn ident(name: &str) -> Identifier {
    Identifier {
        id: Name::new(name),
        range: TextRange::default(),
    }
}

#[test]
fn test_bare_name_is_a_capture() {
    let ast = AstPattern::MatchAs(PatternMatchAs {
        range: TextRange::default(),
        pattern: None,
        name: Some(ident("x")),
    });
    let pattern = Pattern::from_ast(&ast);
    match &pattern {
        Pattern::Capture(PatternCapture {
            target: Some(target),
            ..
        }) => assert_eq!(target.id.as_str(), "x"),
        _ => panic!("expected a capture"),
    }
    assert!(pattern.is_irrefutable());
    assert!(!pattern.is_wildcard());
}

#[test]
fn test_underscore_is_a_wildcard() {
    let ast = AstPattern::MatchAs(PatternMatchAs {
        range: TextRange::default(),
        pattern: None,
        name: None,
    });
    let pattern = Pattern::from_ast(&ast);
    assert!(pattern.is_wildcard());
    assert!(pattern.is_irrefutable());
}

#[test]
fn test_singletons_are_literals() {
    let ast = AstPattern::MatchSingleton(PatternMatchSingleton {
        range: TextRange::default(),
        value: Singleton::None,
    });
    match Pattern::from_ast(&ast) {
        Pattern::Literal(lit) => assert!(matches!(lit.value, LiteralValue::None)),
        _ => panic!("expected a literal"),
    }
    let ast = AstPattern::MatchSingleton(PatternMatchSingleton {
        range: TextRange::default(),
        value: Singleton::True,
    });
    match Pattern::from_ast(&ast) {
        Pattern::Literal(lit) => assert!(matches!(lit.value, LiteralValue::Bool(true))),
        _ => panic!("expected a literal"),
    }
}

#[test]
fn test_match_value_splits_literal_from_value() {
    let literal = AstPattern::MatchValue(PatternMatchValue {
        range: TextRange::default(),
        value: Box::new(Expr::BooleanLiteral(ExprBooleanLiteral {
            range: TextRange::default(),
            value: true,
        })),
    });
    assert!(matches!(Pattern::from_ast(&literal), Pattern::Literal(_)));

    let dotted = AstPattern::MatchValue(PatternMatchValue {
        range: TextRange::default(),
        value: Box::new(Expr::Attribute(ExprAttribute {
            range: TextRange::default(),
            value: Box::new(name_expr("color")),
            attr: ident("RED"),
            ctx: ExprContext::Load,
        })),
    });
    assert!(matches!(Pattern::from_ast(&dotted), Pattern::Value(_)));
}

#[test]
fn test_or_pattern_becomes_alternatives() {
    let ast = AstPattern::MatchOr(PatternMatchOr {
        range: TextRange::default(),
        patterns: vec![
            AstPattern::MatchSingleton(PatternMatchSingleton {
                range: TextRange::default(),
                value: Singleton::True,
            }),
            AstPattern::MatchSingleton(PatternMatchSingleton {
                range: TextRange::default(),
                value: Singleton::False,
            }),
        ],
    });
    match Pattern::from_ast(&ast) {
        Pattern::As(x) => {
            assert_eq!(x.patterns.len(), 2);
            assert!(x.target.is_none());
        }
        _ => panic!("expected alternatives"),
    }
}

#[test]
fn test_as_pattern_with_subpattern() {
    let ast = AstPattern::MatchAs(PatternMatchAs {
        range: TextRange::default(),
        pattern: Some(Box::new(AstPattern::MatchSingleton(
            PatternMatchSingleton {
                range: TextRange::default(),
                value: Singleton::None,
            },
        ))),
        name: Some(ident("n")),
    });
    match Pattern::from_ast(&ast) {
        Pattern::As(x) => {
            assert_eq!(x.patterns.len(), 1);
            assert_eq!(x.target.as_ref().unwrap().id.as_str(), "n");
        }
        _ => panic!("expected an as-pattern"),
    }
}

#[test]
fn test_sequence_star_index() {
    let ast = AstPattern::MatchSequence(PatternMatchSequence {
        range: TextRange::default(),
        patterns: vec![
            AstPattern::MatchAs(PatternMatchAs {
                range: TextRange::default(),
                pattern: None,
                name: Some(ident("first")),
            }),
            AstPattern::MatchStar(PatternMatchStar {
                range: TextRange::default(),
                name: Some(ident("rest")),
            }),
        ],
    });
    match Pattern::from_ast(&ast) {
        Pattern::Sequence(x) => {
            assert_eq!(x.entries.len(), 2);
            assert_eq!(x.star_index, Some(1));
            assert!(x.entries[1].is_irrefutable());
        }
        _ => panic!("expected a sequence"),
    }
}
