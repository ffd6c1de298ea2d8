mod common;

#[cfg(test)]
mod interpreter_tests {
    use pretty_assertions::assert_eq;
    use rox::error::LoxError;
    use rox::interpreter::MAX_CALL_DEPTH;
    use rox::value::Value;

    use crate::common::{run, run_err, run_ok, session};

    /// A runtime failure: the output produced before it and its message.
    fn runtime_error(source: &str) -> (String, String) {
        let (out, err) = run_err(source);

        assert!(
            matches!(err, LoxError::Runtime { .. }),
            "expected a runtime error, got: {}",
            err
        );

        (out, err.to_string())
    }

    #[test]
    fn arithmetic_precedence() {
        assert_eq!(run_ok("print 1 + 2 * 3;"), "7\n");
        assert_eq!(run_ok("print (-1 + 2) * 3;"), "3\n");
        assert_eq!(run_ok("print -2 * -3 - 4 / 2;"), "4\n");
        assert_eq!(run_ok("print 7 / 2;"), "3.5\n");
    }

    #[test]
    fn division_by_zero_follows_ieee() {
        assert_eq!(run_ok("print 1 / 0; print -1 / 0;"), "inf\n-inf\n");
    }

    #[test]
    fn string_number_coercion() {
        assert_eq!(run_ok(r#"print "1" + "2";"#), "3\n");
        assert_eq!(run_ok(r#"print "1" + "a";"#), "1a\n");
        assert_eq!(run_ok(r#"print 1 + "2";"#), "3\n");
        assert_eq!(run_ok(r#"print "10" - 4;"#), "6\n");
        assert_eq!(run_ok(r#"print "3" < 12;"#), "true\n");
    }

    #[test]
    fn mismatched_operands() {
        let (_, message) = runtime_error(r#"print 1 + "a";"#);
        assert_eq!(
            message,
            "[line 1] Runtime error: Operands must be two numbers or two strings."
        );

        let (_, message) = runtime_error("print nil + 1;");
        assert_eq!(
            message,
            "[line 1] Runtime error: Operands must be two numbers or two strings."
        );

        let (_, message) = runtime_error(r#"print "a" * 2;"#);
        assert_eq!(message, "[line 1] Runtime error: Operand must be numbers.");

        let (_, message) = runtime_error("print true < 1;");
        assert_eq!(message, "[line 1] Runtime error: Operand must be numbers.");

        let (_, message) = runtime_error(r#"print -"a";"#);
        assert_eq!(message, "[line 1] Runtime error: Operand must be a number.");
    }

    #[test]
    fn truthiness_and_equality() {
        let source = r#"
            print !nil;
            print !0;
            print !"";
            print nil == false;
            print 1 == 1;
            print "a" == "a";
            print "1" == 1;
            print nil == nil;
        "#;

        assert_eq!(
            run_ok(source),
            "true\nfalse\nfalse\nfalse\ntrue\ntrue\nfalse\ntrue\n"
        );
    }

    #[test]
    fn logical_operators_return_operands_and_short_circuit() {
        let source = r#"
            print nil or "fallback";
            print 0 and "second";
            print false and undefined;
            print "first" or undefined;
        "#;

        assert_eq!(run_ok(source), "fallback\nsecond\nfalse\nfirst\n");
    }

    #[test]
    fn control_flow() {
        let source = r#"
            var total = 0;
            for (var i = 1; i <= 4; i = i + 1) {
                if (i == 3) total = total + 100; else total = total + i;
            }
            print total;

            var n = 3;
            while (n > 0) { print n; n = n - 1; }
        "#;

        assert_eq!(run_ok(source), "107\n3\n2\n1\n");
    }

    #[test]
    fn block_scoping_and_shadowing() {
        let source = r#"
            var a = "outer";
            {
                var a = "inner";
                print a;
            }
            print a;
        "#;

        assert_eq!(run_ok(source), "inner\nouter\n");
    }

    #[test]
    fn closures_share_captured_state() {
        let source = r#"
            fun makeCounter() {
                var count = 0;
                fun next() {
                    count = count + 1;
                    return count;
                }
                return next;
            }

            var counter = makeCounter();
            print counter();
            print counter();

            var other = makeCounter();
            print other();
        "#;

        assert_eq!(run_ok(source), "1\n2\n1\n");
    }

    #[test]
    fn closures_resolve_lexically() {
        let source = r#"
            var a = "global";
            {
                fun f() { print a; }
                { var a = "block"; f(); }
            }
        "#;

        assert_eq!(run_ok(source), "global\n");
    }

    #[test]
    fn recursion() {
        let source = r#"
            fun fib(n) {
                if (n < 2) return n;
                return fib(n - 1) + fib(n - 2);
            }
            print fib(15);
        "#;

        assert_eq!(run_ok(source), "610\n");
    }

    #[test]
    fn unbounded_recursion_is_a_runtime_error() {
        let (out, message) = runtime_error("print 1;\nfun f() { f(); }\nf();\nprint 2;");

        assert_eq!(out, "1\n");
        assert_eq!(message, "[line 2] Runtime error: Stack overflow.");
    }

    #[test]
    fn deep_recursion_below_the_limit_succeeds() {
        let source = format!(
            "fun depth(n) {{ if (n == 0) return 0; return 1 + depth(n - 1); }}\nprint depth({});",
            MAX_CALL_DEPTH - 1
        );

        assert_eq!(run_ok(&source), format!("{}\n", MAX_CALL_DEPTH - 1));
    }

    #[test]
    fn session_recovers_after_stack_overflow() {
        let (mut lox, buf) = session();

        let err = lox
            .run("fun down(n) { return down(n + 1); }\ndown(0);")
            .expect_err("recursion never ends");
        assert!(matches!(err, LoxError::Runtime { .. }));

        lox.reset_errors();
        lox.run("fun three() { return 3; } print three();")
            .expect("calls work again");

        assert_eq!(buf.contents(), "3\n");
    }

    #[test]
    fn function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
    }

    #[test]
    fn inheritance_and_super() {
        let source = r#"
            class A { greet() { return "A"; } }
            class B < A { greet() { return super.greet() + "B"; } }
            print B().greet();
        "#;

        assert_eq!(run_ok(source), "AB\n");
    }

    #[test]
    fn methods_are_inherited_through_a_chain() {
        let source = r#"
            class A { name() { return "a"; } }
            class B < A {}
            class C < B {}
            print C().name();
        "#;

        assert_eq!(run_ok(source), "a\n");
    }

    #[test]
    fn initializer_always_returns_the_instance() {
        let source = r#"
            class Point {
                init(x, y) {
                    this.x = x;
                    this.y = y;
                    if (x > 10) return;
                }
            }

            var p = Point(1, 2);
            print p.x + p.y;
            print Point(20, 0);
            print p.init(5, 6);
            print p.x;
        "#;

        assert_eq!(
            run_ok(source),
            "3\nPoint instance\nPoint instance\n5\n"
        );
    }

    #[test]
    fn bound_methods_remember_their_instance() {
        let source = r#"
            class Person {
                init(name) { this.name = name; }
                hello() { return "hi " + this.name; }
            }

            var method = Person("ann").hello;
            var bob = Person("bob");
            bob.hello = method;
            print bob.hello();
        "#;

        assert_eq!(run_ok(source), "hi ann\n");
    }

    #[test]
    fn fields_shadow_methods() {
        let source = r#"
            class Box { value() { return "method"; } }
            var b = Box();
            b.value = "field";
            print b.value;
        "#;

        assert_eq!(run_ok(source), "field\n");
    }

    #[test]
    fn stringify_callables_and_objects() {
        let source = r#"
            fun f() {}
            class K { m() {} }
            print f;
            print clock;
            print K;
            print K();
            print K().m;
            print nil;
            print 2.50;
        "#;

        assert_eq!(
            run_ok(source),
            "<fn f>\n<native fn>\nK\nK instance\n<fn m>\nnil\n2.5\n"
        );
    }

    #[test]
    fn clock_returns_seconds() {
        assert_eq!(run_ok("print clock() > 1000000000;"), "true\n");
    }

    #[test]
    fn arity_mismatch() {
        let (_, message) = runtime_error("fun add(a, b) { return a + b; }\nadd(1);");
        assert_eq!(message, "[line 2] Runtime error: Expected 2 arguments but got 1.");

        let (_, message) = runtime_error("fun add(a, b) { return a + b; }\nadd(1, 2, 3);");
        assert_eq!(message, "[line 2] Runtime error: Expected 2 arguments but got 3.");

        let (_, message) = runtime_error("class A { init(x) {} }\nA();");
        assert_eq!(message, "[line 2] Runtime error: Expected 1 arguments but got 0.");
    }

    #[test]
    fn undefined_names_are_errors() {
        let (_, message) = runtime_error("print missing;");
        assert_eq!(message, "[line 1] Runtime error: Undefined variable 'missing'.");

        let (_, message) = runtime_error("missing = 1;");
        assert_eq!(message, "[line 1] Runtime error: Undefined variable 'missing'.");

        let (_, message) = runtime_error("class A {}\nprint A().nope;");
        assert_eq!(message, "[line 2] Runtime error: Undefined property 'nope'.");
    }

    #[test]
    fn invalid_targets() {
        let (_, message) = runtime_error(r#""text"();"#);
        assert_eq!(
            message,
            "[line 1] Runtime error: Can only call functions and classes, not string."
        );

        let (_, message) = runtime_error("var x = 1;\nprint x.field;");
        assert_eq!(message, "[line 2] Runtime error: Only instances have properties.");

        let (_, message) = runtime_error("var x = 1;\nx.field = 2;");
        assert_eq!(message, "[line 2] Runtime error: Only instances have fields.");

        let (_, message) = runtime_error("var NotAClass = 1;\nclass B < NotAClass {}");
        assert_eq!(message, "[line 2] Runtime error: Superclass must be a class.");
    }

    #[test]
    fn runtime_error_aborts_remaining_statements() {
        let (out, message) = runtime_error("print 1;\nprint -nil;\nprint 3;");

        assert_eq!(out, "1\n");
        assert_eq!(message, "[line 2] Runtime error: Operand must be a number.");
    }

    #[test]
    fn runtime_error_inside_call_restores_global_scope() {
        let (mut lox, buf) = session();

        let err = lox
            .run("var a = \"global\";\nfun f() { var a = \"local\"; return -a; }\nf();")
            .expect_err("negating a string fails");
        assert!(lox.had_runtime_error());
        assert_eq!(err.to_string(), "[line 2] Runtime error: Operand must be a number.");

        lox.reset_errors();
        lox.run("print a;").expect("session keeps working");

        assert_eq!(buf.contents(), "global\n");
    }

    #[test]
    fn repl_session_keeps_state_between_runs() {
        let (mut lox, buf) = session();

        lox.run("var count = 0;").expect("first line");
        lox.run("fun bump() { count = count + 1; return count; }").expect("second line");
        lox.run("{ var local = bump(); print local; }").expect("third line");
        lox.run("class Tally { total() { return bump() * 10; } }").expect("fourth line");
        lox.run("print Tally().total();").expect("fifth line");

        assert_eq!(buf.contents(), "1\n20\n");
    }

    #[test]
    fn static_error_in_one_run_does_not_poison_the_session() {
        let (mut lox, buf) = session();

        lox.run("var x = 1;").expect("define");
        assert!(lox.run("print x").is_err());
        assert!(lox.had_error());

        lox.reset_errors();
        lox.run("print x;").expect("session still usable");

        assert!(!lox.had_error());
        assert_eq!(buf.contents(), "1\n");
    }

    #[test]
    fn evaluate_single_expression() {
        let (mut lox, _) = session();

        lox.run("var base = 40; fun inc(n) { return n + 1; }").expect("setup");

        assert_eq!(lox.evaluate("inc(base) + 1").expect("evaluates"), Value::Number(42.0));
        assert_eq!(
            lox.evaluate(r#""a" + "b""#).expect("evaluates"),
            Value::String("ab".to_string())
        );

        let err = lox.evaluate("nope").expect_err("undefined");
        assert_eq!(err.to_string(), "[line 1] Runtime error: Undefined variable 'nope'.");
    }

    #[test]
    fn execution_is_deterministic() {
        let source = r#"
            class Node {
                init(value, next) { this.value = value; this.next = next; }
            }
            var list = nil;
            for (var i = 0; i < 5; i = i + 1) list = Node(i, list);
            while (list != nil) { print list.value; list = list.next; }
        "#;

        let (first, first_result) = run(source);
        let (second, second_result) = run(source);

        assert!(first_result.is_ok() && second_result.is_ok());
        assert_eq!(first, "4\n3\n2\n1\n0\n");
        assert_eq!(first, second);
    }
}
