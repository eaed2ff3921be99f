use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    thread,
};

use pretty_assertions::assert_eq;
use rulexpr::{
    config::{CompilerConfig, VmConfig},
    error::{CodegenError, EvalError, ParseError, RuntimeError, Stage, VmFault},
    evaluate,
    interpreter::{
        Compiler,
        binding::{TableHost, UnitTable},
        bytecode::Program,
        value::Value,
        vm::Context,
    },
};

fn host() -> TableHost {
    TableHost::new().with_units(UnitTable::lengths())
                    .with_variable("width", 2.0)
                    .with_constant("limit", 10.0)
                    .with_constant("A", "Pad")
                    .with_field("A", "NetClass", "Power")
                    .with_field("A", "Clearance", 0.25)
                    .with_function("max", |_ctx, args, _target| {
                        let mut best = f64::NEG_INFINITY;
                        for arg in args {
                            best = best.max(arg.as_f64().ok_or("expected numbers")?);
                        }
                        Ok(Value::Numeric(best))
                    })
                    .with_function("isPower", |ctx, _args, target| {
                        let target = target.ok_or("needs a receiver")?;
                        Ok(Value::from(target.get(ctx).as_str() == Some("Power")))
                    })
}

fn assert_value(src: &str, expected: impl Into<Value>) {
    match evaluate(src, &host()) {
        Ok(value) => assert_eq!(value, expected.into(), "evaluating `{src}`"),
        Err(e) => panic!("`{src}` failed: {e}"),
    }
}

fn assert_failure(src: &str, stage: Stage, offset: usize) {
    match evaluate(src, &host()) {
        Ok(value) => panic!("`{src}` evaluated to {value} but was expected to fail"),
        Err(e) => {
            assert_eq!((e.stage(), e.offset()), (stage, offset), "`{src}` failed with {e}");
        },
    }
}

#[test]
fn precedence_and_associativity() {
    assert_value("2 + 3 * 4", 14.0);
    assert_value("(2 + 3) * 4", 20.0);
    assert_value("8 - 2 - 1", 5.0);
    assert_value("16 / 4 / 2", 2.0);
    assert_value("-2 * 3", -6.0);
    assert_value("--2", 2.0);
    assert_value("1 + 2 < 4 && 5 > 4", 1.0);
    assert_value("0 || 1 && 0", 0.0);
}

#[test]
fn comparisons_and_equality() {
    assert_value("1 == 1", 1.0);
    assert_value("1 == 2", 0.0);
    assert_value("1 != 2", 1.0);
    assert_value("'a' == 'a'", 1.0);
    assert_value("'a' != 'b'", 1.0);
    assert_value("'1' == 1", 0.0);
    assert_value("2 <= 2", 1.0);
    assert_value("3 >= 4", 0.0);
    assert_value("!0", 1.0);
    assert_value("!'text'", 0.0);
}

#[test]
fn string_ordering_is_a_runtime_error() {
    let err = evaluate("'a' < 'b'", &host()).unwrap_err();
    assert!(matches!(err, EvalError::Runtime(RuntimeError::StringOrdering { op: "<", offset: 4 })));
    assert_failure("'a' + 1", Stage::Runtime, 4);
    assert_failure("-'a'", Stage::Runtime, 0);

    let err = evaluate("1 + -'a'", &host()).unwrap_err();
    assert!(matches!(err,
                     EvalError::Runtime(RuntimeError::UnaryTypeMismatch { op: "-", offset: 4, .. })));
    assert!(err.to_string().ends_with("cannot apply '-' to string."));
}

#[test]
fn division_by_zero() {
    let err = evaluate("1 / 0", &host()).unwrap_err();
    assert_eq!(err.stage(), Stage::Runtime);
    assert!(!err.is_fatal());
    assert!(matches!(err, EvalError::Runtime(RuntimeError::DivisionByZero { offset: 2 })));
}

#[test]
fn unit_literals() {
    assert_value("10mm", 10.0);
    assert_value("10 mm", 10.0);
    assert_value("2in", 50.8);
    assert_value("2 in == 2in", 1.0);
    assert_value("1 in > 999 mil", 1.0);
    assert_value("A.Clearance < 0.5mm", 1.0);
}

#[test]
fn longest_unit_wins_and_units_need_a_boundary() {
    let units = UnitTable::new().with_unit("m", 1000.0).with_unit("mm", 1.0);
    let host = TableHost::new().with_units(units).with_variable("mmx", 7.0);
    assert_eq!(evaluate("3mm", &host).unwrap(), Value::Numeric(3.0));
    assert_eq!(evaluate("3m", &host).unwrap(), Value::Numeric(3000.0));

    let err = evaluate("3 mmx", &host).unwrap_err();
    assert!(matches!(err, EvalError::Parse(ParseError::UnexpectedTrailingTokens { offset: 2, .. })));
}

#[test]
fn unconvertible_unit_is_a_codegen_error() {
    struct Broken;
    impl rulexpr::interpreter::binding::UnitResolver for Broken {
        fn supported_units(&self) -> &[String] {
            static UNITS: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
            UNITS.get_or_init(|| vec!["qq".to_string()])
        }

        fn convert(&self, _literal: &str, _unit: usize) -> Option<f64> {
            None
        }
    }
    struct Host(Broken);
    impl rulexpr::interpreter::binding::HostBinding for Host {
        fn resolve_variable(&self,
                            _name: &str,
                            _field: Option<&str>)
                            -> Option<Arc<dyn rulexpr::interpreter::binding::VarRef>> {
            None
        }

        fn resolve_function(&self,
                            _name: &str)
                            -> Option<Arc<dyn rulexpr::interpreter::binding::HostFunction>> {
            None
        }

        fn units(&self) -> &dyn rulexpr::interpreter::binding::UnitResolver {
            &self.0
        }
    }

    let err = evaluate("1 + 4qq", &Host(Broken)).unwrap_err();
    assert!(matches!(err,
                     EvalError::Codegen(CodegenError::UnknownUnit { ref literal, offset: 4, .. })
                     if literal == "4"));
}

#[test]
fn locale_decimal_separator() {
    let host = host();
    let compiler = Compiler::new(&host).with_config(CompilerConfig::new().with_decimal_separator(','));
    assert_eq!(compiler.compile("2,5 + 0.5").unwrap().run().unwrap(), Value::Numeric(3.0));
    assert_eq!(compiler.compile("1,5mm").unwrap().run().unwrap(), Value::Numeric(1.5));
}

#[test]
fn variables_fields_and_calls() {
    assert_value("width * 2", 4.0);
    assert_value("A.NetClass == 'Power'", 1.0);
    assert_value("max(1, width, 3 mm)", 3.0);
    assert_value("max()", f64::NEG_INFINITY);
    assert_value("A.isPower()", 0.0);
    assert_value("A.NetClass.isPower()", 1.0);
}

#[test]
fn host_function_failure_names_the_function() {
    let err = evaluate("1 + max('x')", &host()).unwrap_err();
    assert_eq!(err.stage(), Stage::Runtime);
    assert!(matches!(err,
                     EvalError::Runtime(RuntimeError::HostFunction { ref name, offset: 4, .. })
                     if name == "max"));
}

#[test]
fn unresolved_names_are_codegen_errors() {
    assert_failure("foo.bar", Stage::Codegen, 0);
    assert_failure("1 + foo.bar", Stage::Codegen, 4);
    assert_failure("height", Stage::Codegen, 0);
    assert_failure("width + nope(1)", Stage::Codegen, 8);
    assert_failure("(1 + 2).isPower()", Stage::Codegen, 8);

    let err = evaluate("foo.bar", &host()).unwrap_err();
    assert!(matches!(err, EvalError::Codegen(CodegenError::UnknownField { .. })));
}

#[test]
fn parse_errors_point_at_the_problem() {
    assert_failure("'unterminated", Stage::Parse, 0);
    assert_failure("1 + 'open", Stage::Parse, 4);
    assert_failure("1 +", Stage::Parse, 3);
    assert_failure("(1 + 2", Stage::Parse, 6);
    assert_failure("1 # 2", Stage::Parse, 2);
    assert_failure("1 2", Stage::Parse, 2);

    let status = evaluate("'unterminated", &host()).unwrap_err().status();
    assert_eq!(status.stage, Stage::Parse);
    assert_eq!(status.offset, 0);
    assert!(status.message.contains("Unterminated"));
}

#[test]
fn assignment_stores_through_the_host() {
    let host = host();
    let program = Compiler::new(&host).compile("A.Clearance = width * 3").unwrap();
    assert_eq!(program.run().unwrap(), Value::Numeric(6.0));
    assert_eq!(host.value("A.Clearance"), Some(Value::Numeric(6.0)));

    let err = evaluate("limit = 1", &host).unwrap_err();
    assert!(matches!(err, EvalError::Runtime(RuntimeError::ReadOnlyVariable { offset: 0, .. })));

    let err = evaluate("A.Clearance + 1 = 2", &host).unwrap_err();
    assert!(matches!(err, EvalError::Parse(ParseError::UnexpectedTrailingTokens { offset: 16, .. })));
}

#[test]
fn programs_can_be_rerun() {
    let mut host = host();
    let program = Compiler::new(&host).compile("width * width + 1").unwrap();
    let mut ctx = Context::new();

    let first = program.run_in(&mut ctx).unwrap();
    assert_eq!(program.run_in(&mut ctx).unwrap(), first);
    assert_eq!(program.run().unwrap(), first);

    host.set_variable("width", 3.0);
    assert_eq!(program.run_in(&mut ctx).unwrap(), Value::Numeric(10.0));
}

#[test]
fn compile_into_replaces_previous_content() {
    let host = host();
    let compiler = Compiler::new(&host);
    let mut program = Program::new();

    compiler.compile_into("1 + 2 + 3", &mut program).unwrap();
    assert_eq!(program.len(), 5);
    compiler.compile_into("7", &mut program).unwrap();
    assert_eq!(program.len(), 1);
    assert_eq!(program.run().unwrap(), Value::Numeric(7.0));

    assert!(compiler.compile_into("7 +", &mut program).is_err());
    assert!(program.is_empty());
}

#[test]
fn programs_are_shared_across_threads() {
    let host = TableHost::new().with_function("scaled", |ctx, args, _target| {
                                   let factor = ctx.data::<f64>().copied().unwrap_or(1.0);
                                   Ok(Value::Numeric(args[0].as_f64().unwrap_or(0.0) * factor))
                               });
    let program = Arc::new(Compiler::new(&host).compile("scaled(2) + 1").unwrap());

    let handles: Vec<_> = [10.0_f64, 100.0].into_iter()
                                           .map(|factor| {
                                               let program = Arc::clone(&program);
                                               thread::spawn(move || {
                                                   let mut ctx = Context::new().with_data(&factor);
                                                   program.run_in(&mut ctx).unwrap()
                                               })
                                           })
                                           .collect();
    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec![Value::Numeric(21.0), Value::Numeric(201.0)]);
}

#[test]
fn logical_operators_evaluate_both_sides() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let host = TableHost::new().with_function("touch", move |_ctx, args, _target| {
                                   counter.fetch_add(1, Ordering::SeqCst);
                                   Ok(args[0].clone())
                               });

    assert_eq!(evaluate("touch(0) && touch(1)", &host).unwrap(), Value::Numeric(0.0));
    assert_eq!(evaluate("touch(1) || touch(0)", &host).unwrap(), Value::Numeric(1.0));
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

#[test]
fn stack_capacity_is_a_fault() {
    let program = Compiler::new(&host()).compile("1 + 2").unwrap();
    let mut ctx = Context::with_config(VmConfig { stack_size: 1,
                                                  heap_size:  4, });
    let err = program.run_in(&mut ctx).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.stage(), Stage::Runtime);
    assert!(matches!(err,
                     EvalError::Fault { fault: VmFault::StackOverflow { capacity: 1 },
                                        offset: 4, }));

    let mut ctx = Context::with_config(VmConfig { stack_size: 2,
                                                  heap_size:  4, });
    assert_eq!(program.run_in(&mut ctx).unwrap(), Value::Numeric(3.0));
}

#[test]
fn disassembly_lists_every_instruction() {
    let host = host();
    let program = Compiler::new(&host).compile("A.isPower() || max(width, 1) > 2").unwrap();
    let listing = program.to_string();
    assert_eq!(listing.lines().count(), program.len());
    assert!(listing.contains("CALL isPower/0 ON A"));
    assert!(listing.contains("PUSH_VAR width (numeric)"));
    assert!(listing.contains("CALL max/2"));
    assert!(listing.lines().last().unwrap().ends_with("OR"));
}

#[test]
fn deep_nesting_is_a_parse_error() {
    let deep = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let err = evaluate(&deep, &host()).unwrap_err();
    assert_eq!(err.stage(), Stage::Parse);
    assert!(matches!(err, EvalError::Parse(ParseError::NestingTooDeep { .. })));

    let negations = format!("{}1", "-".repeat(10_000));
    assert_failure(&negations, Stage::Parse, 256);

    let shallow = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_value(&shallow, 1.0);
}

#[test]
fn nesting_limit_is_configurable() {
    let host = host();
    let compiler = Compiler::new(&host).with_config(CompilerConfig::new().with_max_depth(2));
    assert!(compiler.compile("(1)").is_ok());
    let err = compiler.compile("((1))").unwrap_err();
    assert!(matches!(err, EvalError::Parse(ParseError::NestingTooDeep { offset: 2 })));
}

#[test]
fn long_operator_chains_compile() {
    let terms = 50_000;
    let chain = vec!["1"; terms].join(" + ");
    let host = host();
    let program = Compiler::new(&host).compile(&chain).unwrap();
    assert_eq!(program.len(), 2 * terms - 1);

    let mut ctx = Context::with_config(VmConfig { stack_size: 2,
                                                  heap_size:  terms, });
    assert_eq!(program.run_in(&mut ctx).unwrap(), Value::Numeric(50_000.0));
}
