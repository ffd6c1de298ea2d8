mod common;

#[cfg(test)]
mod resolver_tests {
    use pretty_assertions::assert_eq;
    use rox::error::LoxError;

    use crate::common::{run_err, run_ok};

    /// Every diagnostic in a rejected program, one string per error.
    fn static_errors(source: &str) -> Vec<String> {
        let (out, err) = run_err(source);

        assert_eq!(out, "", "nothing may run when static errors exist");
        assert!(err.is_static(), "expected a static error, got: {}", err);

        match err {
            LoxError::Static(errors) => errors.iter().map(ToString::to_string).collect(),
            other => vec![other.to_string()],
        }
    }

    #[test]
    fn return_at_top_level() {
        assert_eq!(
            static_errors("print 1;\nreturn 2;"),
            ["[line 2] Error at 'return': Can't return from top-level code."]
        );
    }

    #[test]
    fn return_value_from_initializer() {
        assert_eq!(
            static_errors("class A { init() { return 1; } }"),
            ["[line 1] Error at 'return': Can't return a value from an initializer."]
        );
    }

    #[test]
    fn bare_return_from_initializer_is_allowed() {
        let out = run_ok("class A { init() { this.x = 1; return; this.x = 2; } } print A().x;");

        assert_eq!(out, "1\n");
    }

    #[test]
    fn this_outside_class() {
        assert_eq!(
            static_errors("print this;"),
            ["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
        assert_eq!(
            static_errors("fun f() { return this; }"),
            ["[line 1] Error at 'this': Can't use 'this' outside of a class."]
        );
    }

    #[test]
    fn super_misuse() {
        assert_eq!(
            static_errors("fun f() { super.go(); }"),
            ["[line 1] Error at 'super': Can't use 'super' outside of a class."]
        );
        assert_eq!(
            static_errors("class A { go() { super.go(); } }"),
            ["[line 1] Error at 'super': Can't use 'super' in a class with no superclass."]
        );
    }

    #[test]
    fn class_inheriting_from_itself() {
        assert_eq!(
            static_errors("class A < A {}"),
            ["[line 1] Error at 'A': A class can't inherit from itself."]
        );
    }

    #[test]
    fn duplicate_local_declaration() {
        assert_eq!(
            static_errors("{ var a = 1; var a = 2; }"),
            ["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
        assert_eq!(
            static_errors("fun f(a, a) {}"),
            ["[line 1] Error at 'a': Already a variable with this name in this scope."]
        );
    }

    #[test]
    fn globals_may_be_redeclared() {
        assert_eq!(run_ok("var a = 1; var a = a + 1; print a;"), "2\n");
    }

    #[test]
    fn local_read_in_own_initializer() {
        assert_eq!(
            static_errors("var a = 1; { var a = a; }"),
            ["[line 1] Error at 'a': Can't read local variable in its own initializer."]
        );
    }

    #[test]
    fn all_errors_are_reported_together() {
        let errors = static_errors("return 1;\nprint this;\n{ var b; var b; }");

        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("[line 1]"));
        assert!(errors[1].starts_with("[line 2]"));
        assert!(errors[2].starts_with("[line 3]"));
    }

    #[test]
    fn parse_errors_suppress_resolution() {
        // The bad `return` is never reported because parsing already failed.
        let errors = static_errors("return 1;\nprint ;");

        assert_eq!(errors, ["[line 2] Error at ';': Expect expression."]);
    }

    #[test]
    fn closures_bind_to_the_declaration_in_scope() {
        let source = r#"
            var a = "global";
            {
                fun show() { print a; }
                show();
                var a = "block";
                show();
            }
        "#;

        assert_eq!(run_ok(source), "global\nglobal\n");
    }
}
