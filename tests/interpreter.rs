mod common;

#[cfg(test)]
mod interpreter_tests {
    use super::common::{run, run_ok, runtime_error, session};

    use rox::interpreter::{Interpreter, MAX_CALL_DEPTH};
    use rox::parser::Parser;
    use rox::scanner::scan;
    use rox::session::Failure;
    use rox::value::Value;

    fn eval(source: &str) -> Value {
        let (tokens, _) = scan(source);
        let expr = Parser::new(&tokens)
            .parse_expression()
            .expect("expression parses");
        Interpreter::with_output(Box::new(std::io::sink()))
            .evaluate(&expr)
            .expect("expression evaluates")
    }

    // ───────────────────────────── expressions ─────────────────────────────

    #[test]
    fn test_arithmetic_and_number_display() {
        let out = run_ok(
            "print 1 + 2; print 7 / 2; print 2 * 3.5; print -4 - 1; print 0.1 + 0.2; print -0;",
        );
        assert_eq!(out, "3\n3.5\n7\n-5\n0.30000000000000004\n-0\n");
    }

    #[test]
    fn test_division_by_zero_follows_ieee() {
        assert_eq!(run_ok("print 1 / 0; print -1 / 0;"), "inf\n-inf\n");
        assert_eq!(run_ok("var n = 0 / 0; print n == n;"), "false\n");
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(run_ok("print \"foo\" + \"bar\";"), "foobar\n");
    }

    #[test]
    fn test_mixed_plus_is_a_runtime_error() {
        let (out, message) = runtime_error("print \"a\" + 1;");

        assert_eq!(out, "");
        assert_eq!(
            message,
            "Operands must be two numbers or two strings.\n[line 1]"
        );
    }

    #[test]
    fn test_operand_type_errors() {
        let (_, message) = runtime_error("print -\"x\";");
        assert_eq!(message, "Operand must be a number.\n[line 1]");

        let (_, message) = runtime_error("\n\nprint 1 < \"2\";");
        assert_eq!(message, "Operands must be numbers.\n[line 3]");
    }

    #[test]
    fn test_truthiness() {
        let out = run_ok(
            "print !nil; print !false; print !0; print !\"\"; print !true;",
        );
        assert_eq!(out, "true\ntrue\nfalse\nfalse\nfalse\n");
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert!(matches!(eval("nil or \"yes\""), Value::String(s) if s == "yes"));
        assert!(matches!(eval("1 or 2"), Value::Number(n) if n == 1.0));
        assert!(matches!(eval("nil and 2"), Value::Nil));
        assert!(matches!(eval("1 and 2"), Value::Number(n) if n == 2.0));
    }

    #[test]
    fn test_logical_short_circuit() {
        let out = run_ok(
            r#"
            var calls = 0;
            fun touch() { calls = calls + 1; return true; }
            false and touch();
            true or touch();
            true and touch();
            print calls;
            "#,
        );
        assert_eq!(out, "1\n");
    }

    #[test]
    fn test_equality() {
        let out = run_ok(
            r#"
            print 1 == 1;
            print "a" == "a";
            print nil == nil;
            print nil == false;
            print 1 == "1";
            print clock == clock;
            class A {}
            var a = A();
            var b = A();
            print a == a;
            print a == b;
            "#,
        );
        assert_eq!(out, "true\ntrue\ntrue\nfalse\nfalse\ntrue\ntrue\nfalse\n");
    }

    // ─────────────────────────── control flow ──────────────────────────────

    #[test]
    fn test_if_while_for() {
        let out = run_ok(
            r#"
            if (nil) print "no"; else print "else";
            var i = 0;
            while (i < 3) { print i; i = i + 1; }
            for (var j = 0; j < 2; j = j + 1) print j * 10;
            "#,
        );
        assert_eq!(out, "else\n0\n1\n2\n0\n10\n");
    }

    #[test]
    fn test_return_from_inside_loop() {
        let out = run_ok(
            r#"
            fun find(target) {
              for (var i = 0; ; i = i + 1) {
                if (i == target) return i;
              }
            }
            print find(3);
            "#,
        );
        assert_eq!(out, "3\n");

        let out = run_ok(
            r#"
            fun first(limit) {
              var i = 0;
              while (true) {
                if (i >= limit) return i;
                i = i + 1;
              }
            }
            print first(4);
            "#,
        );
        assert_eq!(out, "4\n");
    }

    // ───────────────────────── functions & closures ────────────────────────

    #[test]
    fn test_function_without_return_yields_nil() {
        assert_eq!(run_ok("fun f() {} print f();"), "nil\n");
        assert_eq!(run_ok("fun f() { return; } print f();"), "nil\n");
    }

    #[test]
    fn test_recursion() {
        let out = run_ok(
            "fun fib(n) { if (n < 2) return n; return fib(n - 1) + fib(n - 2); } print fib(15);",
        );
        assert_eq!(out, "610\n");
    }

    #[test]
    fn test_counter_closure() {
        let out = run_ok(
            r#"
            fun makeCounter() {
              var i = 0;
              fun count() { i = i + 1; print i; }
              return count;
            }
            var counter = makeCounter();
            counter();
            counter();
            "#,
        );
        assert_eq!(out, "1\n2\n");
    }

    #[test]
    fn test_closures_share_captured_scope() {
        let out = run_ok(
            r#"
            var inc;
            var get;
            {
              var n = 0;
              fun i() { n = n + 1; }
              fun g() { return n; }
              inc = i;
              get = g;
            }
            inc();
            inc();
            print get();
            "#,
        );
        assert_eq!(out, "2\n");
    }

    /// Runs `body` on a thread with a generous stack, so the interpreter's
    /// own limit is what stops deep recursion in unoptimized test builds.
    fn with_big_stack<T, F>(body: F) -> T
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(body)
            .expect("spawn interpreter thread")
            .join()
            .expect("interpreter thread finished")
    }

    #[test]
    fn test_unbounded_recursion_is_a_runtime_error() {
        let (out, failure) = with_big_stack(|| {
            let (out, result) = run("fun f(n) { return f(n + 1); }\nprint f(0);");
            let failure = result
                .err()
                .map(|f| (matches!(f, Failure::Runtime(_)), f.exit_code(), f.to_string()));
            (out, failure)
        });

        assert_eq!(out, "");
        assert_eq!(
            failure,
            Some((true, 70, "Stack overflow.\n[line 1]".to_string()))
        );
    }

    #[test]
    fn test_call_depth_limit_is_exact() {
        let outputs = with_big_stack(|| {
            let program = "fun down(n) { if (n == 0) return 0; return down(n - 1) + 1; }";

            // down(n) builds n + 1 nested calls.
            let deepest = run(&format!("{program}\nprint down({});", MAX_CALL_DEPTH - 1));
            let too_deep = run(&format!("{program}\nprint down({});", MAX_CALL_DEPTH));

            (
                deepest.0,
                deepest.1.is_ok(),
                too_deep.1.err().map(|f| f.to_string()),
            )
        });

        assert_eq!(outputs.0, format!("{}\n", MAX_CALL_DEPTH - 1));
        assert!(outputs.1);
        assert_eq!(outputs.2.as_deref(), Some("Stack overflow.\n[line 1]"));
    }

    #[test]
    fn test_session_survives_stack_overflow() {
        let out = with_big_stack(|| {
            let (mut session, capture) = session();

            let failed = session.run("fun loop() { loop(); }\nloop();").is_err();
            let recovered = session
                .run("fun three() { return 3; } print three();")
                .is_ok();

            (failed, recovered, capture.text())
        });

        assert_eq!(out, (true, true, "3\n".to_string()));
    }

    #[test]
    fn test_arity_mismatch() {
        let (_, message) = runtime_error("fun f(a, b) {}\nf(1);");
        assert_eq!(message, "Expected 2 arguments but got 1.\n[line 2]");
    }

    #[test]
    fn test_calling_non_callable() {
        let (_, message) = runtime_error("\"not a function\"();");
        assert_eq!(message, "Can only call functions and classes.\n[line 1]");
    }

    #[test]
    fn test_undefined_variable() {
        let (_, message) = runtime_error("print nope;");
        assert_eq!(message, "Undefined variable 'nope'.\n[line 1]");

        let (_, message) = runtime_error("nope = 1;");
        assert_eq!(message, "Undefined variable 'nope'.\n[line 1]");
    }

    #[test]
    fn test_runtime_error_stops_the_batch() {
        let (out, result) = run("print 1;\nprint nil + 1;\nprint 3;");

        assert_eq!(out, "1\n");
        let failure = result.expect_err("nil + 1 fails");
        assert_eq!(failure.exit_code(), 70);
    }

    #[test]
    fn test_native_clock() {
        assert_eq!(run_ok("print clock() > 0;"), "true\n");
        assert_eq!(run_ok("print clock;"), "<native fn>\n");
    }

    #[test]
    fn test_value_display() {
        let out = run_ok(
            r#"
            fun f() {}
            class Point {}
            print f;
            print Point;
            print Point();
            print nil;
            print true;
            "#,
        );
        assert_eq!(out, "<fn f>\nPoint\nPoint instance\nnil\ntrue\n");
    }

    // ───────────────────────────── classes ─────────────────────────────────

    #[test]
    fn test_fields_and_methods() {
        let out = run_ok(
            r#"
            class Bagel {
              eat() { print "Crunch crunch crunch!"; }
            }
            var bagel = Bagel();
            bagel.topping = "seeds";
            print bagel.topping;
            bagel.eat();
            "#,
        );
        assert_eq!(out, "seeds\nCrunch crunch crunch!\n");
    }

    #[test]
    fn test_fields_shadow_methods() {
        let out = run_ok(
            r#"
            class A { m() { return "method"; } }
            var a = A();
            a.m = "field";
            print a.m;
            "#,
        );
        assert_eq!(out, "field\n");
    }

    #[test]
    fn test_bound_method_keeps_this() {
        let out = run_ok(
            r#"
            class Person {
              init(name) { this.name = name; }
              greet() { print "hi " + this.name; }
            }
            var greet = Person("ada").greet;
            greet();
            "#,
        );
        assert_eq!(out, "hi ada\n");
    }

    #[test]
    fn test_initializer_runs_once_and_returns_instance() {
        let out = run_ok(
            r#"
            var runs = 0;
            class Foo {
              init() { runs = runs + 1; return; }
            }
            var foo = Foo();
            print runs;
            print foo;
            print foo.init();
            print runs;
            "#,
        );
        assert_eq!(out, "1\nFoo instance\nFoo instance\n2\n");
    }

    #[test]
    fn test_class_arity_comes_from_init() {
        assert_eq!(run_ok("class A {} print A();"), "A instance\n");

        let (_, message) = runtime_error("class A { init(x) {} }\nA();");
        assert_eq!(message, "Expected 1 arguments but got 0.\n[line 2]");
    }

    #[test]
    fn test_inherited_initializer() {
        let out = run_ok(
            r#"
            class A { init(v) { this.v = v; } }
            class B < A {}
            print B(7).v;
            "#,
        );
        assert_eq!(out, "7\n");
    }

    #[test]
    fn test_super_dispatch() {
        let out = run_ok(
            r#"
            class A { method() { print "A method"; } }
            class B < A {
              method() { print "B method"; }
              test() { super.method(); }
            }
            class C < B {}
            C().test();
            "#,
        );
        assert_eq!(out, "A method\n");
    }

    #[test]
    fn test_super_binds_this() {
        let out = run_ok(
            r#"
            class Base {
              describe() { return "I am " + this.name; }
            }
            class Derived < Base {
              init(name) { this.name = name; }
              describe() { return super.describe() + "!"; }
            }
            print Derived("d").describe();
            "#,
        );
        assert_eq!(out, "I am d!\n");
    }

    #[test]
    fn test_property_errors() {
        let (_, message) = runtime_error("var x = 1;\nprint x.y;");
        assert_eq!(message, "Only instances have properties.\n[line 2]");

        let (_, message) = runtime_error("var x = 1;\nx.y = 2;");
        assert_eq!(message, "Only instances have fields.\n[line 2]");

        let (_, message) = runtime_error("class A {}\nprint A().missing;");
        assert_eq!(message, "Undefined property 'missing'.\n[line 2]");
    }

    #[test]
    fn test_superclass_must_be_a_class() {
        let (_, message) = runtime_error("var NotAClass = 1;\nclass A < NotAClass {}");
        assert_eq!(message, "Superclass must be a class.\n[line 2]");
    }

    #[test]
    fn test_undefined_super_method() {
        let (_, message) = runtime_error(
            "class A {}\nclass B < A { m() { return super.nope; } }\nB().m();",
        );
        assert_eq!(message, "Undefined property 'nope'.\n[line 2]");
    }
}
