//! The six end-to-end scenarios exercised against the public API,
//! each driving the full lex -> parse -> resolve -> analyze pipeline
//! (or the relevant prefix of it) the way a real caller would.

use std::rc::Rc;

use veny_core::analyzer::Analyzer;
use veny_core::ast::{Program, StmtKind};
use veny_core::error::CompileError;
use veny_core::lexer::Lexer;
use veny_core::parser::Parser;
use veny_core::resolver::SourceRoot;
use veny_core::scope::GlobalScope;
use veny_core::source_map::FileSet;

fn parse_one(set: &mut FileSet, name: &str, source: &str) -> Result<veny_core::ast::File, veny_core::parser::ParseError> {
    let idx = set.add_file(name, source.len() as u32).unwrap();
    set.get_mut(idx).unwrap().populate_lines(source);
    let map = set.get(idx).unwrap();
    let tokens = Lexer::new(source, map.base()).scan_tokens();
    Parser::new(tokens, map).parse()
}

#[test]
fn scenario_1_package_enforcement() {
    let mut set = FileSet::new();
    let err = parse_one(&mut set, "Foo.veny", "class Foo {}").unwrap_err();
    assert!(err.message.contains("package"), "got: {}", err.message);
}

#[test]
fn scenario_2_minimal_class_with_entry() {
    let mut set = FileSet::new();
    let source = r#"
        package demo
        class App {
            entry(args: [Text]): void {
                Console.print("Hello")
            }
        }
        "#;
    let file = parse_one(&mut set, "demo/App.veny", source).unwrap();

    assert_eq!(file.package, "demo");
    assert_eq!(file.classes.len(), 1);
    let method = &file.classes[0].methods[0];
    assert_eq!(method.name, "entry");
    assert_eq!(method.params.len(), 1);
    assert_eq!(method.params[0].name, "args");
    assert_eq!(method.params[0].type_name.display(), "[Text]");
    assert_eq!(method.return_type.display(), "void");

    let StmtKind::Block(stmts) = &method.body.as_ref().unwrap().kind else { panic!("expected block") };
    let StmtKind::ExprStmt(expr) = &stmts[0].kind else { panic!("expected expr stmt") };
    use veny_core::ast::ExprKind;
    let ExprKind::Call(callee, args) = &expr.kind else { panic!("expected call") };
    let ExprKind::Get(receiver, field) = &callee.kind else { panic!("expected get") };
    assert!(matches!(&receiver.kind, ExprKind::Variable(n) if n.as_str() == "Console"));
    assert_eq!(field.as_str(), "print");
    assert_eq!(args.len(), 1);
    assert!(matches!(&args[0].kind, ExprKind::Literal(veny_core::token::Literal::Text(s)) if s.as_str() == "Hello"));
}

#[test]
fn scenario_3_immutable_assignment_is_an_error() {
    let mut set = FileSet::new();
    let source = r#"
        package app
        class App {
            entry(args: [Text]) {
                val x: Int = 1
                x = 2
            }
        }
        "#;
    let file = parse_one(&mut set, "app/App.veny", source).unwrap();
    let program = Program { files: vec![Rc::new(file)] };
    let global = GlobalScope::new();
    let errors = Analyzer::new(global, &set).analyze(&program);

    assert!(
        errors.iter().any(|e| e.message.contains("immutable variable") && e.message.contains("x")),
        "errors: {errors:?}"
    );
}

#[test]
fn scenario_4_circular_import_is_detected() {
    struct TwoFileRoot;
    impl SourceRoot for TwoFileRoot {
        fn locate(&self, fqcn: &str) -> Option<(String, String)> {
            match fqcn {
                "b.B" => Some((
                    "b/B.veny".to_string(),
                    "package b\nimport a.A\nclass B { entry(args: [Text]) { } }".to_string(),
                )),
                "a.A" => Some((
                    "a/A.veny".to_string(),
                    "package a\nimport b.B\nclass A { entry(args: [Text]) { } }".to_string(),
                )),
                _ => None,
            }
        }
    }

    // The own file itself isn't part of the cycle; it just seeds the
    // worklist with an import into the two files that import each
    // other, both of which the resolver has to discover on its own.
    let mut set = FileSet::new();
    let source = "package app\nimport a.A\nclass App { entry(args: [Text]) { } }";
    let file = parse_one(&mut set, "app/App.veny", source).unwrap();

    let root = TwoFileRoot;
    let roots: [&dyn SourceRoot; 1] = [&root];
    let err = veny_core::compile(&roots, vec![file], &mut set).unwrap_err();
    assert!(matches!(err, CompileError::Import(_)), "got: {err:?}");
    assert!(err.to_string().to_lowercase().contains("circular"), "got: {err}");
}

#[test]
fn scenario_5_array_literal_typing() {
    let mut set = FileSet::new();
    let source = r#"
        package app
        class App {
            entry(args: [Text]) {
                val xs: [Int] = [1, 2, 3]
            }
        }
        "#;
    let file = parse_one(&mut set, "app/App.veny", source).unwrap();
    let program = Program { files: vec![Rc::new(file)] };
    let global = GlobalScope::new();
    let errors = Analyzer::new(global, &set).analyze(&program);
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    let StmtKind::Block(stmts) = &program.files[0].classes[0].methods[0].body.as_ref().unwrap().kind else {
        panic!("expected block")
    };
    let StmtKind::LocalVar(local) = &stmts[0].kind else { panic!("expected local var") };
    use veny_core::types::{BuiltinType, Type};
    match local.init.resolved_type().as_deref() {
        Some(Type::Array(elem)) => assert!(matches!(elem.as_ref(), Type::Builtin(BuiltinType::Int))),
        other => panic!("expected Array(Int), got {other:?}"),
    }
}

#[test]
fn scenario_6_compound_assignment_desugars() {
    let mut set = FileSet::new();
    let source = r#"
        package app
        class App {
            entry(args: [Text]) {
                var x: Int = 1
                x += 2
            }
        }
        "#;
    let file = parse_one(&mut set, "app/App.veny", source).unwrap();

    let StmtKind::Block(stmts) = &file.classes[0].methods[0].body.as_ref().unwrap().kind else {
        panic!("expected block")
    };
    use veny_core::ast::{BinaryOp, ExprKind};
    let StmtKind::ExprStmt(expr) = &stmts[1].kind else { panic!("expected expr stmt") };
    match &expr.kind {
        ExprKind::Assign(name, value) => {
            assert_eq!(name, "x");
            assert!(matches!(&value.kind, ExprKind::Binary(_, BinaryOp::Add, _)));
        }
        other => panic!("expected Assign, got {other:?}"),
    }
}
