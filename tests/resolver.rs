mod common;

#[cfg(test)]
mod resolver_tests {
    use super::common::{run, run_ok, static_errors};

    #[test]
    fn test_global_self_initializer_is_rejected() {
        let (out, result) = run("var x = x;");
        let failure = result.expect_err("reading x in its own initializer");

        assert_eq!(out, "");
        assert_eq!(failure.exit_code(), 65);
        assert_eq!(
            failure.to_string(),
            "[line 1] Error at 'x': Can't read local variable in its own initializer."
        );
    }

    #[test]
    fn test_local_self_initializer_is_rejected() {
        let errors = static_errors("{ var b = b; }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'b': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn test_shadowing_initializer_reads_outer_binding() {
        let out = run_ok("var a = 1; { var a = a + 1; print a; } print a;");
        assert_eq!(out, "2\n1\n");

        let out = run_ok("{ var a = 10; { var a = a * 2; print a; } print a; }");
        assert_eq!(out, "20\n10\n");
    }

    #[test]
    fn test_assignment_in_own_initializer_targets_new_slot() {
        let out = run_ok("{ var a = 1; { var a = a = 2; print a; } print a; }");
        assert_eq!(out, "2\n1\n");
    }

    #[test]
    fn test_global_redeclaration() {
        assert_eq!(run_ok("var a = 1; var a = a + 1; print a;"), "2\n");
        assert_eq!(run_ok("var a; var a; print a;"), "nil\n");
    }

    #[test]
    fn test_duplicate_local() {
        let errors = static_errors("{ var a = 1;\n var a = 2; }");
        assert_eq!(
            errors,
            vec!["[line 2] Error at 'a': Already a variable with this name in this scope."]
        );

        let errors = static_errors("fun f(a, a) {}");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_return_outside_function() {
        let errors = static_errors("return 1;");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn test_return_value_from_initializer() {
        let errors = static_errors("class A { init() { return 1; } }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn test_this_outside_class() {
        let errors = static_errors("print this;");
        assert_eq!(errors, vec!["[line 1] Error at 'this': Can't use 'this' outside of a class."]);

        let errors = static_errors("fun f() { return this; }");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_super_misuse() {
        let errors = static_errors("class A { m() { return super.m(); } }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );

        let errors = static_errors("fun f() { super.m(); }");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
    }

    #[test]
    fn test_class_cannot_inherit_from_itself() {
        let errors = static_errors("class A < A {}");
        assert_eq!(
            errors,
            vec!["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn test_every_error_is_collected() {
        let errors = static_errors("return;\nprint this;\n{ var a; var a; }");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("[line 1]"));
        assert!(errors[1].starts_with("[line 2]"));
        assert!(errors[2].starts_with("[line 3]"));
    }

    #[test]
    fn test_static_error_suppresses_whole_unit() {
        let (out, result) = run("print \"before\";\nreturn;");

        assert_eq!(out, "");
        assert_eq!(result.expect_err("top-level return").exit_code(), 65);
    }

    #[test]
    fn test_closure_captures_lexical_binding() {
        let out = run_ok(
            r#"
            var a = "global";
            {
              fun showA() { print a; }
              showA();
              var a = "block";
              showA();
            }
            "#,
        );
        assert_eq!(out, "global\nglobal\n");
    }

    #[test]
    fn test_function_may_use_later_global() {
        let out = run_ok("fun f() { return g; } var g = 3; print f();");
        assert_eq!(out, "3\n");
    }

    #[test]
    fn test_recursive_local_function() {
        let out = run_ok(
            "{ fun count(n) { if (n > 0) { print n; count(n - 1); } } count(3); }",
        );
        assert_eq!(out, "3\n2\n1\n");
    }

    /// `{ var v0 = 0; { var v1 = 1; ... print v0 + v1 + ...; } }`
    fn nested_blocks(depth: usize) -> String {
        let mut source = String::new();
        for i in 0..depth {
            source.push_str(&format!("{{ var v{i} = {i}; "));
        }

        let sum: Vec<String> = (0..depth).map(|i| format!("v{i}")).collect();
        source.push_str(&format!("print {}; ", sum.join(" + ")));

        for _ in 0..depth {
            source.push_str("} ");
        }
        source
    }

    /// `fun f0() { var a0 = 0; fun f1() { ... print a0 + ...; } f1(); } f0();`
    fn nested_functions(depth: usize) -> String {
        let mut source = String::new();
        for i in 0..depth {
            source.push_str(&format!("fun f{i}() {{ var a{i} = {i}; "));
        }

        let sum: Vec<String> = (0..depth).map(|i| format!("a{i}")).collect();
        source.push_str(&format!("print {}; ", sum.join(" + ")));

        for i in (0..depth).rev() {
            source.push_str(&format!("}} f{i}(); "));
        }
        source
    }

    #[test]
    fn test_nested_block_depths() {
        for depth in 1..=15 {
            let expected: usize = (0..depth).sum();
            assert_eq!(
                run_ok(&nested_blocks(depth)),
                format!("{expected}\n"),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn test_nested_function_depths() {
        for depth in 1..=15 {
            let expected: usize = (0..depth).sum();
            assert_eq!(
                run_ok(&nested_functions(depth)),
                format!("{expected}\n"),
                "depth {depth}"
            );
        }
    }

    #[test]
    fn test_assignment_targets_resolved_scope() {
        let out = run_ok(
            "var a = 0; { var a = 1; fun set() { a = 2; } set(); print a; } print a;",
        );
        assert_eq!(out, "2\n0\n");
    }
}
